use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use trip_server::analytics::TracingSink;
use trip_server::cache::{CacheConfig, CachedOtpClient};
use trip_server::config::AppConfig;
use trip_server::domain::ServiceTimeRange;
use trip_server::otp::{OtpClient, OtpConfig, PlanFetcher};
use trip_server::realtime::{HttpPositionSource, VehicleTracker};
use trip_server::weather::{HttpWeatherClient, WeatherClient};
use trip_server::web::{AppState, create_router};

/// How often to refresh the routing service time range (10 minutes).
const TIME_RANGE_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::default();

    // Build the OTP client from environment
    let mut otp_config = OtpConfig::new().with_utc_offset(config.utc_offset_minutes);
    if let Ok(url) = std::env::var("OTP_BASE_URL") {
        otp_config = otp_config.with_base_url(url);
    }
    match std::env::var("OTP_API_KEY") {
        Ok(key) => otp_config = otp_config.with_api_key(key),
        Err(_) => eprintln!("Warning: OTP_API_KEY not set. Hosted endpoints will reject requests."),
    }
    let otp_client = OtpClient::new(otp_config).expect("Failed to create OTP client");
    let fetcher = Arc::new(CachedOtpClient::new(otp_client, &CacheConfig::default()));

    // Fetch the service time range (fall back to a fixed horizon if unavailable)
    let horizon_days = config.itinerary_search_horizon_days;
    let now = Utc::now().timestamp();
    let initial_range = match fetcher.fetch_service_time_range().await {
        Ok(range) => range.clamped(now, horizon_days),
        Err(e) => {
            eprintln!("Failed to fetch service time range, using fallback: {}", e);
            ServiceTimeRange::fallback(now, horizon_days)
        }
    };
    println!(
        "Service time range: {} - {}",
        initial_range.start, initial_range.end
    );
    let time_range = Arc::new(RwLock::new(initial_range));

    // Spawn background task to keep the time range fresh
    let range_fetcher = Arc::clone(&fetcher);
    let range_handle = Arc::clone(&time_range);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TIME_RANGE_REFRESH_INTERVAL);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match range_fetcher.fetch_service_time_range().await {
                Ok(range) => {
                    let now = Utc::now().timestamp();
                    *range_handle.write().await = range.clamped(now, horizon_days);
                }
                Err(e) => eprintln!("Failed to refresh service time range: {}", e),
            }
        }
    });

    // Optional weather service
    let weather: Option<Arc<dyn WeatherClient>> = match std::env::var("WEATHER_URL") {
        Ok(url) => {
            let client =
                HttpWeatherClient::new(url, 10).expect("Failed to create weather client");
            Some(Arc::new(client))
        }
        Err(_) => None,
    };

    // Optional vehicle position tracking
    let tracker = match std::env::var("VEHICLE_POSITIONS_URL") {
        Ok(url) => {
            let poll_secs = std::env::var("POSITION_POLL_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);
            let source =
                HttpPositionSource::new(url, 10).expect("Failed to create position source");
            Some(VehicleTracker::new(
                Arc::new(source),
                Duration::from_secs(poll_secs),
            ))
        }
        Err(_) => None,
    };

    // Build app state
    let state = AppState::new(
        fetcher,
        Arc::new(config),
        Arc::new(TracingSink),
        weather,
        time_range,
        tracker,
    );

    // Create router
    let app = create_router(state);

    // Bind and serve
    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Trip summary server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health            - Health check");
    println!("  POST /api/plan          - Run a plan summary");
    println!("  POST /api/plan/later    - Page a summary later");
    println!("  POST /api/plan/earlier  - Page a summary earlier");
    println!("  GET  /api/vehicles      - Tracked vehicle positions");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
