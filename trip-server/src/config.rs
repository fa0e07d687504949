//! Application configuration.
//!
//! One deployment of this service fronts one routing endpoint and one
//! set of GTFS feeds. Everything that varies between deployments lives
//! here; the defaults mirror a Helsinki-region setup.

use std::collections::HashMap;

use crate::domain::TransportMode;
use crate::params::UserSettings;

/// Real-time vehicle feed settings for one GTFS feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeFeedConfig {
    /// Whether the feed's vehicle positions may be subscribed to
    pub active: bool,
    /// Whether trips must be matched fuzzily (route + direction +
    /// start time) instead of by exact trip id
    pub use_fuzzy_trip_matching: bool,
}

/// Deployment configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// GTFS feeds this deployment serves, in preference order
    pub feed_ids: Vec<String>,
    /// Real-time configuration per feed id
    pub realtime: HashMap<String, RealtimeFeedConfig>,
    /// Transit modes available in this deployment
    pub transport_modes: Vec<TransportMode>,
    /// Walk suggestions are only queried under this many metres
    pub suggest_walk_max_distance: f64,
    /// Bike suggestions are only queried under this many metres
    pub suggest_bike_max_distance: f64,
    /// Car suggestions are only queried over this many metres
    pub suggest_car_min_distance: f64,
    /// Offer driving itineraries at all
    pub include_car_suggestions: bool,
    /// Offer park-and-ride itineraries
    pub include_park_and_ride_suggestions: bool,
    /// Offer bike-to-transit itineraries
    pub show_bike_and_public_itineraries: bool,
    /// Offer bike-to-park itineraries
    pub show_bike_and_park_itineraries: bool,
    /// Paging never searches further than this many days ahead, even
    /// when the routing data extends further
    pub itinerary_search_horizon_days: i64,
    /// Endpoint-side filtering aggressiveness for near-duplicate
    /// itineraries
    pub itinerary_filtering: f64,
    /// Locale sent with every query
    pub locale: String,
    /// Offset applied when formatting query dates and times, in
    /// minutes east of UTC (the endpoint interprets clock times in
    /// its own zone)
    pub utc_offset_minutes: i32,
    /// Walking speeds offered by the UI, m/s
    pub walk_speed_options: Vec<f64>,
    /// Cycling speeds offered by the UI, m/s
    pub bike_speed_options: Vec<f64>,
    /// Settings used when a request carries none
    pub default_settings: UserSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut realtime = HashMap::new();
        realtime.insert(
            "HSL".to_string(),
            RealtimeFeedConfig {
                active: true,
                use_fuzzy_trip_matching: true,
            },
        );

        Self {
            feed_ids: vec!["HSL".to_string()],
            realtime,
            transport_modes: vec![
                TransportMode::Bus,
                TransportMode::Tram,
                TransportMode::Subway,
                TransportMode::Rail,
                TransportMode::Ferry,
            ],
            suggest_walk_max_distance: 10_000.0,
            suggest_bike_max_distance: 30_000.0,
            suggest_car_min_distance: 2_000.0,
            include_car_suggestions: true,
            include_park_and_ride_suggestions: true,
            show_bike_and_public_itineraries: true,
            show_bike_and_park_itineraries: true,
            itinerary_search_horizon_days: 30,
            itinerary_filtering: 1.5,
            locale: "en".to_string(),
            utc_offset_minutes: 0,
            walk_speed_options: vec![0.69, 0.97, 1.2, 1.67, 2.22],
            bike_speed_options: vec![2.77, 4.15, 5.55, 6.94, 8.33],
            default_settings: UserSettings::default(),
        }
    }
}

impl AppConfig {
    /// Replace the feed list and give every feed the same real-time
    /// settings.
    pub fn with_feeds(mut self, feeds: &[&str], realtime: RealtimeFeedConfig) -> Self {
        self.feed_ids = feeds.iter().map(|s| s.to_string()).collect();
        self.realtime = feeds
            .iter()
            .map(|s| (s.to_string(), realtime.clone()))
            .collect();
        self
    }

    /// Set the paging horizon.
    pub fn with_horizon_days(mut self, days: i64) -> Self {
        self.itinerary_search_horizon_days = days;
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Real-time settings for a feed, if the feed is both known and
    /// configured.
    pub fn realtime_for(&self, feed_id: &str) -> Option<&RealtimeFeedConfig> {
        if !self.feed_ids.iter().any(|f| f == feed_id) {
            return None;
        }
        self.realtime.get(feed_id)
    }
}
