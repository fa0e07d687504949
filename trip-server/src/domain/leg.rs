//! Itinerary legs.
//!
//! A leg is one uninterrupted stretch of an itinerary: a walk, a ride
//! on a single vehicle, or cycling between two points. Transit legs
//! carry route and trip references so vehicle positions can be
//! subscribed to for the legs currently on screen.

use super::{DomainError, FeedScopedId, LegGeometry, TransportMode};

/// Real-time status of a leg, as reported by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RealtimeState {
    /// No real-time data; times are from the timetable
    #[default]
    Scheduled,
    /// Times updated from a real-time feed
    Updated,
    /// The trip has been cancelled
    Canceled,
    /// Extra trip not present in the timetable
    Added,
    /// Trip modified relative to the timetable
    Modified,
}

impl RealtimeState {
    /// Parse the endpoint's upper-case wire value. Unknown values fall
    /// back to `Scheduled` so a new state never breaks rendering.
    pub fn parse(s: &str) -> Self {
        match s {
            "UPDATED" => RealtimeState::Updated,
            "CANCELED" => RealtimeState::Canceled,
            "ADDED" => RealtimeState::Added,
            "MODIFIED" => RealtimeState::Modified,
            _ => RealtimeState::Scheduled,
        }
    }

    /// The upper-case wire name for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RealtimeState::Scheduled => "SCHEDULED",
            RealtimeState::Updated => "UPDATED",
            RealtimeState::Canceled => "CANCELED",
            RealtimeState::Added => "ADDED",
            RealtimeState::Modified => "MODIFIED",
        }
    }
}

/// Endpoint of a leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    pub fn new(name: Option<String>, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }
}

/// Reference to the route a transit leg rides on.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRef {
    /// Feed-scoped route id, e.g. `HSL:1003`
    pub gtfs_id: FeedScopedId,
    /// Display short name, e.g. `3`
    pub short_name: Option<String>,
}

/// Reference to the specific trip a transit leg rides on.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRef {
    /// Feed-scoped trip id
    pub gtfs_id: FeedScopedId,
    /// GTFS direction of travel (0 or 1)
    pub direction_id: Option<u8>,
    /// First scheduled departure of the trip today, in seconds from
    /// midnight. Used to identify the trip in fuzzy-matching feeds.
    pub first_departure_seconds: Option<u32>,
}

impl TripRef {
    /// The trip's first departure formatted `HH:MM`, wrapping times
    /// past midnight back into the clock (overnight trips report
    /// seconds greater than 86400).
    pub fn first_departure_hhmm(&self) -> Option<String> {
        self.first_departure_seconds.map(|secs| {
            let hours = (secs / 3600) % 24;
            let minutes = (secs % 3600) / 60;
            format!("{hours:02}:{minutes:02}")
        })
    }
}

/// One segment of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    /// Transport mode of this leg
    pub mode: TransportMode,
    /// True when this leg rides scheduled public transport
    pub transit: bool,
    /// True when this leg uses a rented city bike
    pub rented_bike: bool,
    /// Departure time, unix milliseconds
    pub start_time: i64,
    /// Arrival time, unix milliseconds
    pub end_time: i64,
    /// Length of the leg in metres
    pub distance: f64,
    /// Where the leg starts
    pub from: Place,
    /// Where the leg ends
    pub to: Place,
    /// Route reference for transit legs
    pub route: Option<RouteRef>,
    /// Trip reference for transit legs
    pub trip: Option<TripRef>,
    /// Encoded shape of the leg
    pub geometry: Option<LegGeometry>,
    /// Real-time status
    pub realtime_state: RealtimeState,
}

impl Leg {
    /// Construct a leg, validating the time span.
    pub fn new(
        mode: TransportMode,
        start_time: i64,
        end_time: i64,
        from: Place,
        to: Place,
    ) -> Result<Self, DomainError> {
        if end_time < start_time {
            return Err(DomainError::InvalidTimeSpan("leg ends before it starts"));
        }
        Ok(Self {
            mode,
            transit: mode.is_transit(),
            rented_bike: false,
            start_time,
            end_time,
            distance: 0.0,
            from,
            to,
            route: None,
            trip: None,
            geometry: None,
            realtime_state: RealtimeState::Scheduled,
        })
    }

    /// Leg duration in seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.end_time - self.start_time) / 1000
    }

    /// True when the underlying trip is cancelled.
    pub fn is_canceled(&self) -> bool {
        self.realtime_state == RealtimeState::Canceled
    }
}
