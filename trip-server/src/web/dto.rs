//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Itinerary, Leg, Place};
use crate::params::UserSettings;
use crate::realtime::{VehiclePosition, VehicleTopic};
use crate::summary::{PagingDirection, SummarySnapshot};
use crate::weather::WeatherInfo;

/// Request to run a summary search.
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    /// Origin in `"Name::lat,lon"` form (name optional)
    pub from: String,

    /// Destination in `"Name::lat,lon"` form (name optional)
    pub to: String,

    /// Via points, same form
    #[serde(default)]
    pub intermediate_places: Vec<String>,

    /// Departure (or arrival) time in unix milliseconds; defaults to now
    pub time: Option<i64>,

    /// Whether `time` is the required arrival time
    #[serde(default)]
    pub arrive_by: bool,

    /// Plan selection: `walk`, `bike`, `car`, `parkAndRide`,
    /// `bikeAndVehicle` or a numeric index
    pub selection: Option<String>,

    /// Itinerary index within a named selection
    pub detail: Option<String>,

    /// Response locale override
    pub locale: Option<String>,

    /// User settings; deployment defaults apply when omitted
    pub settings: Option<UserSettings>,
}

/// Request to page an existing summary later or earlier.
#[derive(Debug, Deserialize)]
pub struct PagingRequest {
    /// Summary cursor from a previous response
    pub cursor: String,

    /// Plan selection, as in [`PlanRequest`]
    pub selection: Option<String>,

    /// Itinerary index within a named selection
    pub detail: Option<String>,
}

/// A place an itinerary leg starts or ends at.
#[derive(Debug, Serialize)]
pub struct PlaceResult {
    /// Place name, when known
    pub name: Option<String>,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,
}

/// One leg of an itinerary.
#[derive(Debug, Serialize)]
pub struct LegResult {
    /// Transport mode (e.g. `BUS`, `WALK`)
    pub mode: String,

    /// Whether this leg rides public transit
    pub transit: bool,

    /// Whether this leg rides a rented city bike
    pub rented_bike: bool,

    /// Departure time, unix milliseconds
    pub start_time: i64,

    /// Arrival time, unix milliseconds
    pub end_time: i64,

    /// Length in metres
    pub distance: f64,

    /// Where the leg starts
    pub from: PlaceResult,

    /// Where the leg ends
    pub to: PlaceResult,

    /// Feed-scoped route id, for transit legs
    pub route: Option<String>,

    /// Route short name shown to the user
    pub route_short_name: Option<String>,

    /// Feed-scoped trip id, for transit legs
    pub trip: Option<String>,

    /// Encoded polyline of the leg's path
    pub geometry: Option<String>,

    /// Real-time status (e.g. `SCHEDULED`, `CANCELED`)
    pub realtime_state: String,
}

/// One itinerary in the combined list.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    /// Departure time, unix milliseconds
    pub start_time: i64,

    /// Arrival time, unix milliseconds
    pub end_time: i64,

    /// Total duration in seconds
    pub duration_seconds: i64,

    /// Total walking distance in metres
    pub walk_distance: f64,

    /// Legs in travel order
    pub legs: Vec<LegResult>,
}

/// Status of one plan variant's fetch.
#[derive(Debug, Serialize)]
pub struct SlotResult {
    /// Variant name (e.g. `default`, `walk`, `bike-park`)
    pub variant: String,

    /// `not-started`, `in-flight`, `done` or `failed`
    pub phase: String,

    /// Itineraries the variant found, once done
    pub itineraries: usize,
}

/// Whether one paging direction can still be extended.
#[derive(Debug, Serialize)]
pub struct PagingStatus {
    /// True once the direction is permanently exhausted
    pub exhausted: bool,

    /// Client-facing message id explaining the dead end
    pub message: Option<&'static str>,
}

/// Weather at the first street itinerary's start.
#[derive(Debug, Serialize)]
pub struct WeatherResult {
    /// Air temperature, degrees Celsius
    pub temperature: f64,

    /// Wind speed, m/s
    pub wind_speed: f64,

    /// Forecast symbol id
    pub icon_id: Option<i32>,
}

/// The resolved summary for one search and selection.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Cursor for paging requests against this summary
    pub cursor: String,

    /// Per-variant fetch status
    pub slots: Vec<SlotResult>,

    /// Earlier pages, the selected plan and later pages combined
    pub itineraries: Vec<ItineraryResult>,

    /// Index of the itinerary the client should highlight
    pub active_index: usize,

    /// Whether the selection addresses a single itinerary's details
    pub is_detail_view: bool,

    /// Boundary between paged-earlier and original itineraries
    pub separator_position: Option<usize>,

    /// Itineraries shown from the bike-to-park plan
    pub bike_park_count: usize,

    /// Itineraries shown from the bike-and-transit plan
    pub bike_public_count: usize,

    /// Client-facing error message id, if the summary is degraded
    pub error: Option<&'static str>,

    /// Later paging status
    pub later: PagingStatus,

    /// Earlier paging status
    pub earlier: PagingStatus,

    /// Weather hint for street itineraries
    pub weather: Option<WeatherResult>,

    /// Vehicle subscription topics for the active itinerary
    pub vehicle_topics: Vec<VehicleTopic>,
}

/// Response to a paging request.
#[derive(Debug, Serialize)]
pub struct PagingResponse {
    /// What the page did: `appended`, `prepended`, `exhausted`,
    /// `in-flight` or `stale`
    pub outcome: String,

    /// Itineraries the page added
    pub added: usize,

    /// The summary after the page was applied
    pub summary: SummaryResponse,
}

/// One live vehicle on the map.
#[derive(Debug, Serialize)]
pub struct VehicleResult {
    /// Stable vehicle identifier within its feed
    pub vehicle_id: String,

    /// GTFS feed the vehicle belongs to
    pub feed_id: String,

    /// Route id without the feed prefix
    pub route: String,

    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,

    /// Heading in degrees clockwise from north
    pub heading: Option<f64>,

    /// Report time, unix seconds
    pub timestamp: Option<i64>,
}

/// Response listing tracked vehicles.
#[derive(Debug, Serialize)]
pub struct VehiclesResponse {
    /// Latest position per tracked vehicle
    pub vehicles: Vec<VehicleResult>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message or message id
    pub error: String,
}

impl From<&Place> for PlaceResult {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            lat: place.lat,
            lon: place.lon,
        }
    }
}

impl From<&Leg> for LegResult {
    fn from(leg: &Leg) -> Self {
        Self {
            mode: leg.mode.as_str().to_string(),
            transit: leg.transit,
            rented_bike: leg.rented_bike,
            start_time: leg.start_time,
            end_time: leg.end_time,
            distance: leg.distance,
            from: PlaceResult::from(&leg.from),
            to: PlaceResult::from(&leg.to),
            route: leg.route.as_ref().map(|r| r.gtfs_id.as_str().to_string()),
            route_short_name: leg.route.as_ref().and_then(|r| r.short_name.clone()),
            trip: leg.trip.as_ref().map(|t| t.gtfs_id.as_str().to_string()),
            geometry: leg.geometry.as_ref().map(|g| g.points.clone()),
            realtime_state: leg.realtime_state.as_str().to_string(),
        }
    }
}

impl From<&Itinerary> for ItineraryResult {
    fn from(itinerary: &Itinerary) -> Self {
        Self {
            start_time: itinerary.start_time,
            end_time: itinerary.end_time,
            duration_seconds: itinerary.duration_seconds,
            walk_distance: itinerary.walk_distance,
            legs: itinerary.legs().iter().map(LegResult::from).collect(),
        }
    }
}

impl From<&WeatherInfo> for WeatherResult {
    fn from(info: &WeatherInfo) -> Self {
        Self {
            temperature: info.temperature,
            wind_speed: info.wind_speed,
            icon_id: info.icon_id,
        }
    }
}

impl From<&VehiclePosition> for VehicleResult {
    fn from(position: &VehiclePosition) -> Self {
        Self {
            vehicle_id: position.vehicle_id.clone(),
            feed_id: position.feed_id.clone(),
            route: position.route.clone(),
            lat: position.lat,
            lon: position.lon,
            heading: position.heading,
            timestamp: position.timestamp,
        }
    }
}

impl SummaryResponse {
    /// Build the response for a resolved snapshot.
    pub fn from_snapshot(
        cursor: String,
        snapshot: &SummarySnapshot,
        vehicle_topics: Vec<VehicleTopic>,
    ) -> Self {
        Self {
            cursor,
            slots: snapshot
                .slots
                .iter()
                .map(|slot| SlotResult {
                    variant: slot.variant.as_str().to_string(),
                    phase: slot.phase.to_string(),
                    itineraries: slot.itinerary_count,
                })
                .collect(),
            itineraries: snapshot
                .itineraries
                .iter()
                .map(ItineraryResult::from)
                .collect(),
            active_index: snapshot.active_index,
            is_detail_view: snapshot.is_detail_view,
            separator_position: snapshot.separator_position,
            bike_park_count: snapshot.bike_park_count,
            bike_public_count: snapshot.bike_public_count,
            error: snapshot.error.map(|e| e.message_id()),
            later: PagingStatus {
                exhausted: snapshot.later_terminal.is_some(),
                message: snapshot
                    .later_terminal
                    .map(|t| t.message_id(PagingDirection::Later)),
            },
            earlier: PagingStatus {
                exhausted: snapshot.earlier_terminal.is_some(),
                message: snapshot
                    .earlier_terminal
                    .map(|t| t.message_id(PagingDirection::Earlier)),
            },
            weather: snapshot.weather.as_ref().map(WeatherResult::from),
            vehicle_topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FeedScopedId, LegGeometry, RealtimeState, RouteRef, TransportMode, TripRef,
    };
    use crate::summary::{PlanSelection, SummaryState};

    #[test]
    fn leg_conversion_flattens_references() {
        let mut leg = Leg::new(
            TransportMode::Bus,
            0,
            600_000,
            Place::new(Some("Kamppi".to_string()), 60.168, 24.931),
            Place::new(None, 60.17, 24.94),
        )
        .unwrap();
        leg.route = Some(RouteRef {
            gtfs_id: FeedScopedId::parse("HSL:1003"),
            short_name: Some("3".to_string()),
        });
        leg.trip = Some(TripRef {
            gtfs_id: FeedScopedId::parse("HSL:1003_t1"),
            direction_id: Some(0),
            first_departure_seconds: None,
        });
        leg.geometry = Some(LegGeometry::new("abc123", 12));
        leg.realtime_state = RealtimeState::Updated;

        let result = LegResult::from(&leg);
        assert_eq!(result.mode, "BUS");
        assert!(result.transit);
        assert_eq!(result.from.name.as_deref(), Some("Kamppi"));
        assert_eq!(result.route.as_deref(), Some("HSL:1003"));
        assert_eq!(result.route_short_name.as_deref(), Some("3"));
        assert_eq!(result.trip.as_deref(), Some("HSL:1003_t1"));
        assert_eq!(result.geometry.as_deref(), Some("abc123"));
        assert_eq!(result.realtime_state, "UPDATED");
    }

    #[test]
    fn snapshot_conversion_maps_message_ids() {
        let state = SummaryState::new();
        let snapshot = state.snapshot(&PlanSelection::DEFAULT);
        let response = SummaryResponse::from_snapshot("key".to_string(), &snapshot, Vec::new());

        assert_eq!(response.cursor, "key");
        assert_eq!(response.slots.len(), 8);
        assert!(response.itineraries.is_empty());
        assert_eq!(response.error, None);
        assert!(!response.later.exhausted);
        assert_eq!(response.later.message, None);
    }

    #[test]
    fn response_json_is_snake_case() {
        let response = SummaryResponse::from_snapshot(
            "key".to_string(),
            &SummaryState::new().snapshot(&PlanSelection::DEFAULT),
            Vec::new(),
        );
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"active_index\""));
        assert!(json.contains("\"separator_position\""));
        assert!(json.contains("\"vehicle_topics\""));
    }

    #[test]
    fn plan_request_minimal_json() {
        let request: PlanRequest = serde_json::from_str(
            r#"{"from": "60.17,24.93", "to": "Pasila::60.199,24.934"}"#,
        )
        .unwrap();
        assert_eq!(request.from, "60.17,24.93");
        assert!(request.intermediate_places.is_empty());
        assert_eq!(request.time, None);
        assert!(!request.arrive_by);
        assert!(request.settings.is_none());
    }
}
