//! Domain error types.
//!
//! These errors represent validation failures in the itinerary domain
//! layer. They are distinct from API/IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Location string could not be parsed
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// Transport mode string is not recognised
    #[error("unknown transport mode: {0}")]
    UnknownMode(String),

    /// Itinerary has no legs
    #[error("itinerary must have at least one leg")]
    EmptyItinerary,

    /// Itinerary or leg times are inconsistent (end before start)
    #[error("invalid time span: {0}")]
    InvalidTimeSpan(&'static str),

    /// Legs are not ordered by start time
    #[error("legs must be ordered by start time")]
    LegsOutOfOrder,

    /// Encoded polyline could not be decoded
    #[error("invalid leg geometry: {0}")]
    InvalidGeometry(String),

    /// Service time range is inverted
    #[error("service time range end precedes start")]
    InvertedTimeRange,
}
