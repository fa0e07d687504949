//! OTP GraphQL request and response DTOs.
//!
//! Response types map directly to the itinerary planner's GraphQL
//! JSON. They use `Option` liberally because OTP omits or nulls
//! fields freely, and tolerate schema drift (a `directionId` may
//! arrive as a number or a string depending on endpoint version).

use serde::{Deserialize, Deserializer, Serialize};

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::params::{OptimizeType, PlanParams, PlanVariant, TriangleFactors};

/// Envelope every GraphQL response arrives in.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

/// One error from the GraphQL layer.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `data` payload of a plan query.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanData {
    pub plan: PlanWire,
}

/// `data` payload of a service time range query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTimeRangeData {
    pub service_time_range: ServiceTimeRangeWire,
}

/// First and last instant the timetable data covers, unix seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ServiceTimeRangeWire {
    pub start: i64,
    pub end: i64,
}

/// A routing result: the searched date plus itineraries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWire {
    /// Date the search resolved to, unix milliseconds
    pub date: Option<i64>,
    #[serde(default)]
    pub itineraries: Vec<ItineraryWire>,
}

/// One itinerary in a plan response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryWire {
    /// Departure time, unix milliseconds
    pub start_time: i64,
    /// Arrival time, unix milliseconds
    pub end_time: i64,
    /// Total duration in seconds
    pub duration: Option<i64>,
    /// Total walking distance in metres
    pub walk_distance: Option<f64>,
    #[serde(default)]
    pub legs: Vec<LegWire>,
}

/// One leg of an itinerary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegWire {
    /// Mode name, e.g. `"BUS"` or `"WALK"`
    pub mode: String,

    /// Whether this leg uses a rented city bike
    pub rented_bike: Option<bool>,

    /// Departure time, unix milliseconds
    pub start_time: i64,

    /// Arrival time, unix milliseconds
    pub end_time: i64,

    /// Length of the leg in metres
    pub distance: Option<f64>,

    /// Where the leg starts
    pub from: PlaceWire,

    /// Where the leg ends
    pub to: PlaceWire,

    /// Route ridden, for transit legs
    pub route: Option<RouteWire>,

    /// Trip ridden, for transit legs
    pub trip: Option<TripWire>,

    /// Encoded polyline of the leg
    pub leg_geometry: Option<LegGeometryWire>,

    /// Real-time status, e.g. `"SCHEDULED"` or `"CANCELED"`
    pub realtime_state: Option<String>,
}

/// Endpoint of a leg.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceWire {
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

/// Route reference on a transit leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteWire {
    pub gtfs_id: String,
    pub short_name: Option<String>,
}

/// Trip reference on a transit leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripWire {
    pub gtfs_id: String,

    /// GTFS direction. Deserialized tolerantly because some endpoint
    /// versions send `1` and others `"1"`.
    #[serde(default, deserialize_with = "deserialize_direction_id")]
    pub direction_id: Option<u8>,

    /// Stop times of the trip on the searched date. Only the first
    /// scheduled departure is used, to identify the trip in feeds
    /// that match trips fuzzily.
    #[serde(default)]
    pub stoptimes_for_date: Vec<StoptimeWire>,
}

/// One scheduled stop of a trip.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoptimeWire {
    /// Seconds from midnight; past-86400 values mean an overnight trip
    pub scheduled_departure: Option<u32>,
}

/// Encoded leg shape.
#[derive(Debug, Clone, Deserialize)]
pub struct LegGeometryWire {
    pub length: Option<usize>,
    pub points: Option<String>,
}

fn deserialize_direction_id<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u8),
        String(String),
    }

    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) => s.parse().ok(),
        None => None,
    })
}

/// A transport mode as the plan query's `transportModes` input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModeInput {
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<&'static str>,
}

impl From<crate::domain::Mode> for ModeInput {
    fn from(m: crate::domain::Mode) -> Self {
        ModeInput {
            mode: m.mode.as_str(),
            qualifier: m.qualifier.map(|q| q.as_str()),
        }
    }
}

/// An intermediate place as the plan query's `intermediatePlaces` input.
#[derive(Debug, Clone, Serialize)]
pub struct InputCoordinates {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&crate::domain::Location> for InputCoordinates {
    fn from(loc: &crate::domain::Location) -> Self {
        InputCoordinates {
            lat: loc.lat,
            lon: loc.lon,
            address: loc.name.clone(),
        }
    }
}

/// Variables for one plan query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanVariables {
    pub from_place: String,
    pub to_place: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate_places: Option<Vec<InputCoordinates>>,
    /// Local date of the search, `YYYY-MM-DD`
    pub date: String,
    /// Local time of the search, `HH:MM:SS`
    pub time: String,
    pub arrive_by: bool,
    pub num_itineraries: u32,
    pub wheelchair: bool,
    pub walk_reluctance: f64,
    pub walk_board_cost: u32,
    pub min_transfer_time: u32,
    pub transfer_penalty: u32,
    pub walk_speed: f64,
    pub bike_speed: f64,
    pub optimize: OptimizeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triangle: Option<TriangleFactors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_ticket_types: Option<Vec<String>>,
    pub itinerary_filtering: f64,
    pub locale: String,
    pub transport_modes: Vec<ModeInput>,
    pub disable_remaining_weight_heuristic: bool,
}

impl PlanVariables {
    /// Build the variables for one variant of a prepared search.
    ///
    /// `utc_offset_minutes` shifts the epoch search time into the
    /// deployment's wall clock, which is what the endpoint's `date`
    /// and `time` arguments expect.
    pub fn build(params: &PlanParams, variant: PlanVariant, utc_offset_minutes: i32) -> Self {
        let (date, time) = local_date_time(params.time_ms, utc_offset_minutes);

        let intermediate_places = if params.intermediate_places.is_empty() {
            None
        } else {
            Some(
                params
                    .intermediate_places
                    .iter()
                    .map(InputCoordinates::from)
                    .collect(),
            )
        };

        // Triangle weights are only meaningful for TRIANGLE optimisation
        let triangle = (params.optimize == OptimizeType::Triangle).then_some(params.triangle);

        PlanVariables {
            from_place: params.from.to_place_string(),
            to_place: params.to.to_place_string(),
            intermediate_places,
            date,
            time,
            arrive_by: params.arrive_by,
            num_itineraries: params.num_itineraries,
            wheelchair: params.wheelchair,
            walk_reluctance: params.walk_reluctance,
            walk_board_cost: params.walk_board_cost,
            min_transfer_time: params.min_transfer_time,
            transfer_penalty: params.transfer_penalty,
            walk_speed: params.walk_speed,
            bike_speed: params.bike_speed,
            optimize: params.optimize,
            triangle,
            allowed_ticket_types: params.ticket_types.clone().map(|t| vec![t]),
            itinerary_filtering: params.itinerary_filtering,
            locale: params.locale.clone(),
            transport_modes: params
                .modes_for(variant)
                .into_iter()
                .map(ModeInput::from)
                .collect(),
            disable_remaining_weight_heuristic: params.heuristic_disabled_for(variant),
        }
    }
}

/// Format an epoch instant as local `(date, time)` strings.
fn local_date_time(time_ms: i64, utc_offset_minutes: i32) -> (String, String) {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    let when = DateTime::from_timestamp_millis(time_ms)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&offset);
    (
        when.format("%Y-%m-%d").to_string(),
        when.format("%H:%M:%S").to_string(),
    )
}
