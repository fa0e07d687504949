//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use crate::domain::Location;
use crate::params::{PlanQuery, prepare_plan};
use crate::summary::{PagingOutcome, PagingTerminal, PlanSelection, SummaryService};

use super::dto::*;
use super::state::{AppState, Fetcher, session_key};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/plan", post(plan_summary))
        .route("/api/plan/later", post(plan_later))
        .route("/api/plan/earlier", post(plan_earlier))
        .route("/api/vehicles", get(vehicles))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Run a full summary round for a query.
///
/// Repeated identical queries address the same session, so paging
/// history survives a reload; each request still re-runs the fetch
/// round (the plan cache absorbs the repeats).
async fn plan_summary(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let selection = PlanSelection::parse(request.selection.as_deref(), request.detail.as_deref());

    let from = parse_location(&request.from)?;
    let to = parse_location(&request.to)?;
    let intermediate_places = request
        .intermediate_places
        .iter()
        .map(|place| parse_location(place))
        .collect::<Result<Vec<Location>, AppError>>()?;

    let query = PlanQuery {
        from,
        to,
        intermediate_places,
        time_ms: request.time.unwrap_or_else(|| Utc::now().timestamp_millis()),
        arrive_by: request.arrive_by,
        locale: request.locale,
    };
    let settings = request
        .settings
        .unwrap_or_else(|| state.config.default_settings.clone());
    let prepared = prepare_plan(&query, &settings, &state.config);

    let key = session_key(&prepared);
    let service = state
        .sessions
        .get_with(key.clone(), async {
            Arc::new(SummaryService::new(
                Arc::clone(&state.fetcher),
                prepared,
                Arc::clone(&state.config),
                Arc::clone(&state.analytics),
                state.weather.clone(),
                Arc::clone(&state.time_range),
            ))
        })
        .await;

    service.run().await;

    let response = summary_response(&state, key, &service, &selection).await;
    Ok(Json(response))
}

/// Page a summary later.
async fn plan_later(
    State(state): State<AppState>,
    Json(request): Json<PagingRequest>,
) -> Result<Json<PagingResponse>, AppError> {
    let selection = PlanSelection::parse(request.selection.as_deref(), request.detail.as_deref());
    let service = state
        .sessions
        .get(&request.cursor)
        .await
        .ok_or(AppError::SessionNotFound)?;

    let outcome = service.fetch_later(&selection).await;
    paging_response(&state, request.cursor, &service, &selection, outcome).await
}

/// Page a summary earlier.
async fn plan_earlier(
    State(state): State<AppState>,
    Json(request): Json<PagingRequest>,
) -> Result<Json<PagingResponse>, AppError> {
    let selection = PlanSelection::parse(request.selection.as_deref(), request.detail.as_deref());
    let service = state
        .sessions
        .get(&request.cursor)
        .await
        .ok_or(AppError::SessionNotFound)?;

    let outcome = service.fetch_earlier(&selection).await;
    paging_response(&state, request.cursor, &service, &selection, outcome).await
}

/// Latest tracked vehicle positions.
async fn vehicles(State(state): State<AppState>) -> Json<VehiclesResponse> {
    let vehicles = match &state.tracker {
        Some(tracker) => tracker
            .lock()
            .await
            .positions()
            .iter()
            .map(VehicleResult::from)
            .collect(),
        None => Vec::new(),
    };
    Json(VehiclesResponse { vehicles })
}

fn parse_location(s: &str) -> Result<Location, AppError> {
    Location::parse(s).map_err(|_| AppError::BadRequest {
        message: format!("Invalid location: {s}"),
    })
}

/// Resolve the summary for a selection and retarget the vehicle
/// tracker at whatever the client is now looking at.
async fn summary_response(
    state: &AppState,
    cursor: String,
    service: &SummaryService<Fetcher>,
    selection: &PlanSelection,
) -> SummaryResponse {
    let topics = service.vehicle_topics(selection).await;
    if let Some(tracker) = &state.tracker {
        tracker.lock().await.update(topics.clone()).await;
    }
    let snapshot = service.snapshot(selection).await;
    SummaryResponse::from_snapshot(cursor, &snapshot, topics)
}

async fn paging_response(
    state: &AppState,
    cursor: String,
    service: &SummaryService<Fetcher>,
    selection: &PlanSelection,
    outcome: PagingOutcome,
) -> Result<Json<PagingResponse>, AppError> {
    let (outcome, added) = match outcome {
        PagingOutcome::Appended { count } => ("appended", count),
        PagingOutcome::Prepended { count } => ("prepended", count),
        PagingOutcome::Terminal(PagingTerminal::NoMoreItineraries) => ("exhausted", 0),
        PagingOutcome::Terminal(PagingTerminal::OutsideServiceRange) => {
            return Err(AppError::OutOfRange {
                message: "requested time is outside the service time range",
            });
        }
        PagingOutcome::AlreadyInFlight => ("in-flight", 0),
        PagingOutcome::Stale => ("stale", 0),
        PagingOutcome::Failed { message } => {
            return Err(AppError::Upstream { message });
        }
    };

    let summary = summary_response(state, cursor, service, selection).await;
    Ok(Json(PagingResponse {
        outcome: outcome.to_string(),
        added,
        summary,
    }))
}

/// Errors returned by the web layer.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    SessionNotFound,
    OutOfRange { message: &'static str },
    Upstream { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "unknown summary cursor; run the search again".to_string(),
            ),
            AppError::OutOfRange { message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.to_string())
            }
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
        };

        tracing::warn!(status = status.as_u16(), %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use tokio::sync::RwLock;

    use crate::analytics::TracingSink;
    use crate::cache::{CacheConfig, CachedOtpClient};
    use crate::config::AppConfig;
    use crate::domain::ServiceTimeRange;
    use crate::otp::{OtpClient, OtpConfig};

    fn test_state() -> AppState {
        let client = OtpClient::new(OtpConfig::new()).unwrap();
        let fetcher = CachedOtpClient::new(client, &CacheConfig::default());
        AppState::new(
            Arc::new(fetcher),
            Arc::new(AppConfig::default()),
            Arc::new(TracingSink),
            None,
            Arc::new(RwLock::new(ServiceTimeRange::fallback(1_700_000_000, 30))),
            None,
        )
    }

    #[tokio::test]
    async fn error_status_codes() {
        let cases = [
            (
                AppError::BadRequest {
                    message: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (AppError::SessionNotFound, StatusCode::NOT_FOUND),
            (
                AppError::OutOfRange { message: "range" },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Upstream {
                    message: "boom".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn error_body_is_json() {
        let response = AppError::SessionNotFound.into_response();
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("cursor"));
    }

    #[tokio::test]
    async fn invalid_location_is_a_bad_request() {
        let request = PlanRequest {
            from: "not-a-place".to_string(),
            to: "60.19,24.95".to_string(),
            intermediate_places: Vec::new(),
            time: Some(1_700_000_000_000),
            arrive_by: false,
            selection: None,
            detail: None,
            locale: None,
            settings: None,
        };
        let result = plan_summary(State(test_state()), Json(request)).await;
        assert!(matches!(
            result,
            Err(AppError::BadRequest { ref message }) if message.contains("not-a-place")
        ));
    }

    #[tokio::test]
    async fn paging_unknown_cursor_is_not_found() {
        let request = PagingRequest {
            cursor: "nonexistent".to_string(),
            selection: None,
            detail: None,
        };
        let result = plan_later(State(test_state()), Json(request)).await;
        assert!(matches!(result, Err(AppError::SessionNotFound)));
    }

    #[tokio::test]
    async fn vehicles_endpoint_without_tracker_is_empty() {
        let Json(response) = vehicles(State(test_state())).await;
        assert!(response.vehicles.is_empty());
    }

    #[test]
    fn router_builds() {
        let _router = create_router(test_state());
    }
}
