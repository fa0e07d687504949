//! Live vehicle tracking.
//!
//! The active itinerary's transit legs become subscription topics;
//! a single tracker task polls a position source for those topics and
//! keeps the latest position per vehicle.

mod client;
mod topic;

pub use client::{
    HttpPositionSource, PositionSource, PositionStore, RealtimeError, TrackerCommand,
    VehiclePosition, VehicleTracker,
};
pub use topic::{VehicleTopic, topics_for_itinerary};
