//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, RwLock};

use crate::analytics::AnalyticsSink;
use crate::cache::CachedOtpClient;
use crate::config::AppConfig;
use crate::domain::ServiceTimeRange;
use crate::otp::OtpClient;
use crate::params::{PlanVariant, PreparedPlan};
use crate::realtime::VehicleTracker;
use crate::summary::SummaryService;
use crate::weather::WeatherClient;

/// The production plan fetcher: the HTTP client behind the plan cache.
pub type Fetcher = CachedOtpClient<OtpClient>;

/// How long an idle summary session stays addressable for paging.
const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Maximum number of live summary sessions.
const SESSION_CAPACITY: u64 = 500;

/// Shared application state.
///
/// Contains all the services needed to handle requests. Summary
/// sessions live in a bounded cache keyed by the canonical query, so
/// paging requests find the session their summary came from and
/// repeated identical searches share one orchestration.
#[derive(Clone)]
pub struct AppState {
    /// Cached routing endpoint client
    pub fetcher: Arc<Fetcher>,

    /// Deployment configuration
    pub config: Arc<AppConfig>,

    /// Event and error reporting
    pub analytics: Arc<dyn AnalyticsSink>,

    /// Weather client, when a weather endpoint is configured
    pub weather: Option<Arc<dyn WeatherClient>>,

    /// Service time range, refreshed in the background
    pub time_range: Arc<RwLock<ServiceTimeRange>>,

    /// Vehicle tracker, when a position endpoint is configured
    pub tracker: Option<Arc<Mutex<VehicleTracker>>>,

    /// Live summary sessions by canonical query key
    pub sessions: Cache<String, Arc<SummaryService<Fetcher>>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        fetcher: Arc<Fetcher>,
        config: Arc<AppConfig>,
        analytics: Arc<dyn AnalyticsSink>,
        weather: Option<Arc<dyn WeatherClient>>,
        time_range: Arc<RwLock<ServiceTimeRange>>,
        tracker: Option<VehicleTracker>,
    ) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(SESSION_TTL)
            .max_capacity(SESSION_CAPACITY)
            .build();
        Self {
            fetcher,
            config,
            analytics,
            weather,
            time_range,
            tracker: tracker.map(|t| Arc::new(Mutex::new(t))),
            sessions,
        }
    }
}

/// Canonical key identifying one summary session.
///
/// Everything that changes what the orchestration would fetch is part
/// of the key; two requests with the same key share a session and a
/// paging history.
pub fn session_key(prepared: &PreparedPlan) -> String {
    let params = &prepared.params;
    let via = params
        .intermediate_places
        .iter()
        .map(|place| format!("{:.5},{:.5}", place.lat, place.lon))
        .collect::<Vec<_>>()
        .join(";");
    let modes = params
        .modes_for(PlanVariant::Default)
        .iter()
        .map(|mode| mode.to_string())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{:.5},{:.5}|{:.5},{:.5}|{via}|{}|{}|{modes}|{}|{:.2}|{:.2}|{:.1}|{}|{}|{}",
        params.from.lat,
        params.from.lon,
        params.to.lat,
        params.to.lon,
        params.time_ms,
        params.arrive_by,
        params.wheelchair,
        params.walk_speed,
        params.bike_speed,
        params.walk_reluctance,
        params.ticket_types.as_deref().unwrap_or(""),
        params.locale,
        params.user_changed_modes,
    )
}
