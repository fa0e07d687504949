//! Vehicle position topics.
//!
//! The map follows live vehicles for whatever itinerary the user is
//! looking at. Each transit leg of the active itinerary becomes one
//! topic, either matched to an exact trip id or fuzzily by route,
//! direction and departure time, depending on how the feed publishes
//! positions.

use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::{Itinerary, Leg};

/// Subscription key for one transit leg's vehicle positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "match", rename_all = "camelCase")]
pub enum VehicleTopic {
    /// Feeds without stable trip ids match vehicles by route,
    /// direction and the trip's scheduled first departure.
    #[serde(rename_all = "camelCase")]
    Fuzzy {
        feed_id: String,
        /// Route id without the feed prefix
        route: String,
        /// Lowercase transport mode, as feeds publish it
        mode: String,
        direction: u8,
        /// First scheduled departure, `HH:MM`
        trip_start_time: String,
    },
    /// Feeds with stable trip ids match the trip directly.
    #[serde(rename_all = "camelCase")]
    Exact {
        feed_id: String,
        /// Route id without the feed prefix
        route: String,
        /// Trip id without the feed prefix
        trip_id: String,
    },
}

impl VehicleTopic {
    pub fn feed_id(&self) -> &str {
        match self {
            VehicleTopic::Fuzzy { feed_id, .. } => feed_id,
            VehicleTopic::Exact { feed_id, .. } => feed_id,
        }
    }

    pub fn route(&self) -> &str {
        match self {
            VehicleTopic::Fuzzy { route, .. } => route,
            VehicleTopic::Exact { route, .. } => route,
        }
    }
}

/// Topics for the itinerary the user is viewing.
///
/// Only transit legs with both a route and a trip reference produce
/// topics, and only for feeds the deployment has real-time data for.
/// Legs whose feed needs fuzzy matching but which lack a direction or
/// departure time are skipped rather than subscribed incorrectly.
pub fn topics_for_itinerary(itinerary: &Itinerary, config: &AppConfig) -> Vec<VehicleTopic> {
    itinerary
        .legs()
        .iter()
        .filter_map(|leg| topic_for_leg(leg, config))
        .collect()
}

fn topic_for_leg(leg: &Leg, config: &AppConfig) -> Option<VehicleTopic> {
    if !leg.transit {
        return None;
    }
    let trip = leg.trip.as_ref()?;
    let route = leg.route.as_ref()?;
    let feed = trip.gtfs_id.feed()?;

    if !config.feed_ids.iter().any(|f| f == feed) {
        return None;
    }
    let feed_config = config.realtime.get(feed)?;
    if !feed_config.active {
        return None;
    }

    if feed_config.use_fuzzy_trip_matching {
        Some(VehicleTopic::Fuzzy {
            feed_id: feed.to_string(),
            route: route.gtfs_id.local().to_string(),
            mode: leg.mode.as_str().to_lowercase(),
            direction: trip.direction_id?,
            trip_start_time: trip.first_departure_hhmm()?,
        })
    } else {
        Some(VehicleTopic::Exact {
            feed_id: feed.to_string(),
            route: route.gtfs_id.local().to_string(),
            trip_id: trip.gtfs_id.local().to_string(),
        })
    }
}
