//! Mock OTP client for testing without endpoint access.
//!
//! Loads canned plan responses from JSON files and serves them as if
//! they were live GraphQL results.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Plan, ServiceTimeRange};
use crate::params::{PlanParams, PlanVariant};

use super::PlanFetcher;
use super::convert::convert_plan;
use super::error::OtpError;
use super::types::{PlanWire, ServiceTimeRangeWire};

/// File name serving the service time range query.
const TIME_RANGE_FILE: &str = "service-time-range";

/// Mock OTP client that serves plan data from JSON files.
///
/// Expects files named after plan variants (`default.json`,
/// `walk.json`, `bike.json`, ...), each holding one `plan` object.
/// An optional `service-time-range.json` holding `{start, end}`
/// backs the time range query.
#[derive(Clone)]
pub struct MockOtpClient {
    plans: Arc<RwLock<HashMap<String, PlanWire>>>,
    time_range: Arc<RwLock<Option<ServiceTimeRangeWire>>>,
}

impl MockOtpClient {
    /// Create a new mock client by loading JSON files from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, OtpError> {
        let data_dir = data_dir.as_ref();
        let mut plans = HashMap::new();
        let mut time_range = None;

        let entries = std::fs::read_dir(data_dir).map_err(|e| OtpError::Api {
            status: 0,
            message: format!("Failed to read mock data directory: {}", e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| OtpError::Api {
                status: 0,
                message: format!("Failed to read directory entry: {}", e),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| OtpError::Api {
                    status: 0,
                    message: format!("Invalid filename: {:?}", path),
                })?;

            let json = std::fs::read_to_string(&path).map_err(|e| OtpError::Api {
                status: 0,
                message: format!("Failed to read {:?}: {}", path, e),
            })?;

            if stem == TIME_RANGE_FILE {
                let range: ServiceTimeRangeWire =
                    serde_json::from_str(&json).map_err(|e| OtpError::Api {
                        status: 0,
                        message: format!("Failed to parse {:?}: {}", path, e),
                    })?;
                time_range = Some(range);
                continue;
            }

            let plan: PlanWire = serde_json::from_str(&json).map_err(|e| OtpError::Api {
                status: 0,
                message: format!("Failed to parse {:?}: {}", path, e),
            })?;

            plans.insert(stem.to_string(), plan);
        }

        if plans.is_empty() {
            return Err(OtpError::Api {
                status: 0,
                message: format!("No mock plan files found in {:?}", data_dir),
            });
        }

        Ok(Self {
            plans: Arc::new(RwLock::new(plans)),
            time_range: Arc::new(RwLock::new(time_range)),
        })
    }

    /// List the variants the mock data covers.
    pub async fn available_variants(&self) -> Vec<String> {
        let plans = self.plans.read().await;
        let mut variants: Vec<String> = plans.keys().cloned().collect();
        variants.sort();
        variants
    }

    /// Reload mock data from disk (useful for development).
    pub async fn reload(&self, data_dir: impl AsRef<Path>) -> Result<(), OtpError> {
        let new_client = Self::new(data_dir)?;

        let mut plans = self.plans.write().await;
        *plans = new_client.plans.read().await.clone();

        let mut time_range = self.time_range.write().await;
        *time_range = *new_client.time_range.read().await;

        Ok(())
    }
}

impl PlanFetcher for MockOtpClient {
    /// Serve the canned plan for a variant. Search parameters are
    /// ignored; mock data is static.
    async fn fetch_plan(
        &self,
        variant: PlanVariant,
        _params: &PlanParams,
    ) -> Result<Plan, OtpError> {
        let plans = self.plans.read().await;

        let wire = plans.get(variant.as_str()).ok_or_else(|| OtpError::Api {
            status: 404,
            message: format!(
                "No mock data for variant {}. Available: {:?}",
                variant,
                plans.keys().collect::<Vec<_>>()
            ),
        })?;

        Ok(convert_plan(wire.clone()))
    }

    async fn fetch_service_time_range(&self) -> Result<ServiceTimeRange, OtpError> {
        let time_range = self.time_range.read().await;

        let range = time_range.ok_or_else(|| OtpError::Api {
            status: 404,
            message: "No mock service time range data".to_string(),
        })?;

        ServiceTimeRange::new(range.start, range.end).map_err(|e| OtpError::Json {
            message: e.to_string(),
            body: None,
        })
    }
}
