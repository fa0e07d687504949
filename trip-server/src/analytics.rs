//! Usage and error event reporting.
//!
//! The orchestrator reports coarse events (a paging request was made,
//! an itinerary fetch failed) to a pluggable sink so deployments can
//! forward them to whatever product analytics they run. The default
//! sink writes structured log records.

use std::fmt;

/// A single reportable event: a category, an action within it, and an
/// optional free-form detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    /// Broad grouping, e.g. `"Itinerary"`
    pub category: &'static str,
    /// What happened, e.g. `"ErrorLoading"`
    pub action: &'static str,
    /// Context such as the failing plan variant
    pub name: Option<String>,
}

impl AnalyticsEvent {
    /// An itinerary fetch failed.
    pub fn error_loading(detail: impl Into<String>) -> Self {
        AnalyticsEvent {
            category: "Itinerary",
            action: "ErrorLoading",
            name: Some(detail.into()),
        }
    }

    /// The client asked for later departures.
    pub fn show_later() -> Self {
        AnalyticsEvent {
            category: "Itinerary",
            action: "ShowLaterItineraries",
            name: None,
        }
    }

    /// The client asked for earlier departures.
    pub fn show_earlier() -> Self {
        AnalyticsEvent {
            category: "Itinerary",
            action: "ShowEarlierItineraries",
            name: None,
        }
    }
}

impl fmt::Display for AnalyticsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.action)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// Where analytics events go.
///
/// Implementations must not block: `record` is called from request
/// handling paths.
pub trait AnalyticsSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: AnalyticsEvent);
}

/// Sink that writes events as `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, event: AnalyticsEvent) {
        tracing::info!(
            category = event.category,
            action = event.action,
            name = event.name.as_deref().unwrap_or(""),
            "analytics event"
        );
    }
}
