//! Domain types for itinerary planning.
//!
//! The core model shared by the parameter layer, the endpoint client
//! and the summary orchestration. Types enforce their invariants at
//! construction time, so code that receives them can trust validity.

mod error;
mod geometry;
mod gtfs;
mod itinerary;
mod leg;
mod location;
mod mode;
mod plan;
mod time_range;

pub use error::DomainError;
pub use geometry::{LegGeometry, estimated_distance, haversine_distance};
pub use gtfs::FeedScopedId;
pub use itinerary::Itinerary;
pub use leg::{Leg, Place, RealtimeState, RouteRef, TripRef};
pub use location::Location;
pub use mode::{Mode, Qualifier, TransportMode, parse_modes};
pub use plan::Plan;
pub use time_range::ServiceTimeRange;
