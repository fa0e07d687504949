//! Itineraries: ordered legs from origin to destination.

use super::{DomainError, Leg, TransportMode};

/// A complete way of getting from origin to destination at one time.
///
/// # Invariants
///
/// - At least one leg
/// - Legs ordered by start time
/// - `end_time >= start_time`
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    /// Departure time, unix milliseconds
    pub start_time: i64,
    /// Arrival time, unix milliseconds
    pub end_time: i64,
    /// Total duration in seconds
    pub duration_seconds: i64,
    /// Total walking distance in metres
    pub walk_distance: f64,
    legs: Vec<Leg>,
}

impl Itinerary {
    /// Construct an itinerary from pre-built legs.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the leg list is empty, the legs are not in
    /// start-time order, or the itinerary ends before it starts.
    pub fn new(
        start_time: i64,
        end_time: i64,
        duration_seconds: i64,
        walk_distance: f64,
        legs: Vec<Leg>,
    ) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }
        if end_time < start_time {
            return Err(DomainError::InvalidTimeSpan(
                "itinerary ends before it starts",
            ));
        }
        for window in legs.windows(2) {
            if window[1].start_time < window[0].start_time {
                return Err(DomainError::LegsOutOfOrder);
            }
        }
        Ok(Self {
            start_time,
            end_time,
            duration_seconds,
            walk_distance,
            legs,
        })
    }

    /// All legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// True when any leg's trip has been cancelled.
    pub fn has_cancelation(&self) -> bool {
        self.legs.iter().any(|leg| leg.is_canceled())
    }

    /// True when some leg rides scheduled public transport.
    ///
    /// Walking, cycling and driving legs do not count, so a pure
    /// bike-and-walk itinerary returns false even when it was produced
    /// by a transit query.
    pub fn contains_public_transit(&self) -> bool {
        self.legs.iter().any(|leg| leg.mode.is_transit())
    }

    /// True when every leg is a walk.
    pub fn is_walk_only(&self) -> bool {
        self.legs.iter().all(|leg| leg.mode == TransportMode::Walk)
    }

    /// True when every leg is cycling or walking, with at least one
    /// cycling leg. These are filtered from mixed bike-and-transit
    /// results, which exist to show transit connections.
    pub fn is_cycling_only(&self) -> bool {
        let mut saw_bicycle = false;
        for leg in &self.legs {
            match leg.mode {
                TransportMode::Bicycle => saw_bicycle = true,
                TransportMode::Walk => {}
                _ => return false,
            }
        }
        saw_bicycle
    }

    /// Sum of cycling leg distances in metres.
    pub fn total_biking_distance(&self) -> f64 {
        self.legs
            .iter()
            .filter(|leg| leg.mode == TransportMode::Bicycle)
            .map(|leg| leg.distance)
            .sum()
    }
}
