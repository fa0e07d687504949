//! Weather hints for street-mode suggestions.
//!
//! Walking and cycling suggestions carry a small weather forecast for
//! the moment and place the journey starts. The forecast is purely
//! advisory: a fetch failure leaves the summary without weather but
//! otherwise intact.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Forecast at one itinerary's starting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherInfo {
    /// Air temperature, degrees Celsius
    pub temperature: f64,
    /// Wind speed, m/s
    pub wind_speed: f64,
    /// Forecast symbol id, when the provider reports one
    #[serde(default)]
    pub icon_id: Option<i32>,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid weather response: {message}")]
    Json { message: String },
}

/// Identity of one weather request. Responses are only applied when
/// the hash they were fetched under is still the pending one, so a
/// stale fetch can never overwrite a newer forecast.
pub fn weather_hash(time_ms: i64, lat: f64, lon: f64) -> String {
    format!("{time_ms}_{lat}_{lon}")
}

/// Source of weather forecasts.
///
/// Boxed futures keep the trait object-safe; the orchestrator holds
/// the client behind `Arc<dyn WeatherClient>`.
pub trait WeatherClient: Send + Sync {
    /// Fetch the forecast for an instant and place.
    fn fetch(
        &self,
        time_ms: i64,
        lat: f64,
        lon: f64,
    ) -> BoxFuture<'_, Result<WeatherInfo, WeatherError>>;
}

/// HTTP weather client.
///
/// Expects a JSON endpoint answering `GET <base>?time=..&lat=..&lon=..`
/// with a [`WeatherInfo`] body.
#[derive(Debug, Clone)]
pub struct HttpWeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpWeatherClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

impl WeatherClient for HttpWeatherClient {
    fn fetch(
        &self,
        time_ms: i64,
        lat: f64,
        lon: f64,
    ) -> BoxFuture<'_, Result<WeatherInfo, WeatherError>> {
        Box::pin(async move {
            let response = self
                .http
                .get(&self.base_url)
                .query(&[
                    ("time", time_ms.to_string()),
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?;

            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| WeatherError::Json {
                message: e.to_string(),
            })
        })
    }
}
