//! OpenTripPlanner GraphQL client.
//!
//! The summary orchestration talks to OTP through the [`PlanFetcher`]
//! trait so the HTTP client, the caching wrapper and the JSON-file
//! mock are interchangeable. Plan queries fan out per variant; the
//! variant picks the mode list, the rest of the variables are shared.

use std::future::Future;

use crate::domain::{Plan, ServiceTimeRange};
use crate::params::{PlanParams, PlanVariant};

mod client;
mod convert;
mod error;
mod mock;
mod queries;
mod types;

pub use client::{OtpClient, OtpConfig};
pub use convert::{ConvertError, convert_itinerary, convert_leg, convert_plan};
pub use error::OtpError;
pub use mock::MockOtpClient;
pub use queries::{PLAN_QUERY, SERVICE_TIME_RANGE_QUERY};
pub use types::{
    GraphQlResponse, InputCoordinates, ItineraryWire, LegWire, ModeInput, PlanData, PlanVariables,
    PlanWire, ServiceTimeRangeData, ServiceTimeRangeWire,
};

/// Source of plan results.
///
/// Implemented by the HTTP client, its caching wrapper, and the mock.
pub trait PlanFetcher: Send + Sync {
    /// Fetch one plan variant for a prepared search.
    fn fetch_plan(
        &self,
        variant: PlanVariant,
        params: &PlanParams,
    ) -> impl Future<Output = Result<Plan, OtpError>> + Send;

    /// Fetch the span of dates the timetable data covers.
    fn fetch_service_time_range(
        &self,
    ) -> impl Future<Output = Result<ServiceTimeRange, OtpError>> + Send;
}
