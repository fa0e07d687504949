//! Later/earlier itinerary paging.
//!
//! Paging extends the shown time window one request at a time. Each
//! direction pages sequentially (a second request while one is in
//! flight is refused), never duplicates an itinerary already shown,
//! and stops permanently once it runs out of the service time range
//! or out of new itineraries.

use crate::analytics::AnalyticsEvent;
use crate::otp::PlanFetcher;
use crate::params::PlanVariant;

use super::orchestrator::SummaryService;
use super::selection::PlanSelection;
use super::state::{PagingDirection, PagingTerminal, SummaryError};

/// Offset applied past the shown window's edge, so the next page
/// starts strictly beyond what is already displayed.
const PAGING_STEP_MS: i64 = 60_000;

/// Result of one paging request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingOutcome {
    /// New later itineraries were added to the bottom of the list
    Appended { count: usize },
    /// New earlier itineraries were added to the top of the list
    Prepended { count: usize },
    /// This direction is exhausted and will never be fetched again
    Terminal(PagingTerminal),
    /// A request in this direction is already running
    AlreadyInFlight,
    /// The fetch failed; the direction may be retried
    Failed { message: String },
    /// The query was reset while the page was in flight
    Stale,
}

impl<F: PlanFetcher> SummaryService<F> {
    /// Fetch itineraries departing after everything currently shown.
    pub async fn fetch_later(&self, selection: &PlanSelection) -> PagingOutcome {
        self.analytics.record(AnalyticsEvent::show_later());

        let range = self.current_time_range().await;

        let (next_time, generation) = {
            let mut state = self.state.lock().await;
            if let Some(terminal) = state.later_terminal {
                return PagingOutcome::Terminal(terminal);
            }
            if state.later_in_flight {
                return PagingOutcome::AlreadyInFlight;
            }

            let latest_departure = state
                .combined_itineraries(selection)
                .iter()
                .map(|itinerary| itinerary.start_time)
                .max();
            let next_time = match latest_departure {
                Some(start) => start + PAGING_STEP_MS,
                None => self.prepared.params.time_ms,
            };
            if next_time >= range.end * 1000 {
                state.later_terminal = Some(PagingTerminal::OutsideServiceRange);
                state.error = Some(SummaryError::EndDateNotInRange);
                return PagingOutcome::Terminal(PagingTerminal::OutsideServiceRange);
            }

            state.later_in_flight = true;
            (next_time, state.generation())
        };

        let params = self.prepared.params.at_time(next_time, false);
        let result = self.fetcher.fetch_plan(PlanVariant::Default, &params).await;

        let mut state = self.state.lock().await;
        if state.generation() != generation {
            // The reset already cleared the in-flight flag
            return PagingOutcome::Stale;
        }
        state.later_in_flight = false;
        match result {
            Ok(plan) => {
                let count = state.apply_later_page(plan.itineraries, selection);
                if count == 0 {
                    PagingOutcome::Terminal(PagingTerminal::NoMoreItineraries)
                } else {
                    PagingOutcome::Appended { count }
                }
            }
            Err(e) => {
                tracing::warn!(direction = PagingDirection::Later.as_str(), error = %e, "paging fetch failed");
                self.analytics
                    .record(AnalyticsEvent::error_loading(PagingDirection::Later.as_str()));
                state.error = Some(SummaryError::LoadFailed);
                PagingOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Fetch itineraries arriving before everything currently shown.
    pub async fn fetch_earlier(&self, selection: &PlanSelection) -> PagingOutcome {
        self.analytics.record(AnalyticsEvent::show_earlier());

        let range = self.current_time_range().await;

        let (next_time, generation) = {
            let mut state = self.state.lock().await;
            if let Some(terminal) = state.earlier_terminal {
                return PagingOutcome::Terminal(terminal);
            }
            if state.earlier_in_flight {
                return PagingOutcome::AlreadyInFlight;
            }

            let earliest_arrival = state
                .combined_itineraries(selection)
                .iter()
                .map(|itinerary| itinerary.end_time)
                .min();
            let next_time = match earliest_arrival {
                Some(end) => end - PAGING_STEP_MS,
                None => self.prepared.params.time_ms,
            };
            if next_time <= range.start * 1000 {
                state.earlier_terminal = Some(PagingTerminal::OutsideServiceRange);
                state.error = Some(SummaryError::StartDateTooEarly);
                return PagingOutcome::Terminal(PagingTerminal::OutsideServiceRange);
            }

            state.earlier_in_flight = true;
            (next_time, state.generation())
        };

        let params = self.prepared.params.at_time(next_time, true);
        let result = self.fetcher.fetch_plan(PlanVariant::Default, &params).await;

        let mut state = self.state.lock().await;
        if state.generation() != generation {
            return PagingOutcome::Stale;
        }
        state.earlier_in_flight = false;
        match result {
            Ok(plan) => {
                let count = state.apply_earlier_page(plan.itineraries, selection);
                if count == 0 {
                    PagingOutcome::Terminal(PagingTerminal::NoMoreItineraries)
                } else {
                    PagingOutcome::Prepended { count }
                }
            }
            Err(e) => {
                tracing::warn!(direction = PagingDirection::Earlier.as_str(), error = %e, "paging fetch failed");
                self.analytics
                    .record(AnalyticsEvent::error_loading(PagingDirection::Earlier.as_str()));
                state.error = Some(SummaryError::LoadFailed);
                PagingOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
