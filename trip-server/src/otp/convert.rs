//! Conversion from OTP DTOs to domain types.
//!
//! A malformed itinerary is dropped with a warning rather than
//! failing the whole plan, so one broken result never blanks a
//! summary that has four good ones.

use crate::domain::{
    DomainError, FeedScopedId, Itinerary, Leg, LegGeometry, Mode, Place, Plan, RealtimeState,
    RouteRef, TripRef,
};

use super::types::{ItineraryWire, LegWire, PlanWire};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConvertError {
    /// Leg mode string the domain does not know
    #[error("unknown leg mode: {0}")]
    UnknownMode(String),

    /// Leg rejected by domain validation
    #[error("invalid leg: {0}")]
    InvalidLeg(DomainError),

    /// Itinerary rejected by domain validation
    #[error("invalid itinerary: {0}")]
    InvalidItinerary(DomainError),
}

/// Convert a plan response to the domain type, skipping itineraries
/// that fail validation.
pub fn convert_plan(wire: PlanWire) -> Plan {
    let mut itineraries = Vec::with_capacity(wire.itineraries.len());

    for itinerary in wire.itineraries {
        match convert_itinerary(&itinerary) {
            Ok(converted) => itineraries.push(converted),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed itinerary");
            }
        }
    }

    Plan::new(wire.date, itineraries)
}

/// Convert a single itinerary to the domain type.
pub fn convert_itinerary(wire: &ItineraryWire) -> Result<Itinerary, ConvertError> {
    let mut legs = Vec::with_capacity(wire.legs.len());
    for leg in &wire.legs {
        legs.push(convert_leg(leg)?);
    }

    let duration = wire
        .duration
        .unwrap_or((wire.end_time - wire.start_time) / 1000);

    Itinerary::new(
        wire.start_time,
        wire.end_time,
        duration,
        wire.walk_distance.unwrap_or(0.0),
        legs,
    )
    .map_err(ConvertError::InvalidItinerary)
}

/// Convert a single leg to the domain type.
pub fn convert_leg(wire: &LegWire) -> Result<Leg, ConvertError> {
    // Leg modes arrive unqualified; rentals are flagged separately
    let mode = Mode::parse(&wire.mode)
        .map_err(|_| ConvertError::UnknownMode(wire.mode.clone()))?
        .mode;

    let from = Place::new(wire.from.name.clone(), wire.from.lat, wire.from.lon);
    let to = Place::new(wire.to.name.clone(), wire.to.lat, wire.to.lon);

    let mut leg = Leg::new(mode, wire.start_time, wire.end_time, from, to)
        .map_err(ConvertError::InvalidLeg)?;

    leg.rented_bike = wire.rented_bike.unwrap_or(false);
    leg.distance = wire.distance.unwrap_or(0.0);

    leg.route = wire.route.as_ref().map(|route| RouteRef {
        gtfs_id: FeedScopedId::parse(route.gtfs_id.clone()),
        short_name: route.short_name.clone(),
    });

    leg.trip = wire.trip.as_ref().map(|trip| TripRef {
        gtfs_id: FeedScopedId::parse(trip.gtfs_id.clone()),
        direction_id: trip.direction_id,
        first_departure_seconds: trip
            .stoptimes_for_date
            .first()
            .and_then(|stop| stop.scheduled_departure),
    });

    leg.geometry = wire.leg_geometry.as_ref().and_then(|geometry| {
        geometry
            .points
            .as_ref()
            .map(|points| LegGeometry::new(points.clone(), geometry.length.unwrap_or(0)))
    });

    leg.realtime_state = wire
        .realtime_state
        .as_deref()
        .map(RealtimeState::parse)
        .unwrap_or_default();

    Ok(leg)
}
