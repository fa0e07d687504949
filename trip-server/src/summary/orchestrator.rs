//! Summary query orchestration.
//!
//! A [`SummaryService`] runs the whole fan-out for one search: the
//! primary plan first, then (once it arrives, and only for searches
//! with distinct endpoints) the gated street-mode variants in
//! parallel, then the all-modes fallback and the weather hint when
//! their conditions hold. Every result is applied under the state
//! lock with a generation check, so a round that was reset mid-flight
//! cannot leak stale data into the new round.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::config::AppConfig;
use crate::domain::ServiceTimeRange;
use crate::otp::PlanFetcher;
use crate::params::{PlanVariant, PreparedPlan};
use crate::realtime::{VehicleTopic, topics_for_itinerary};
use crate::weather::{WeatherClient, weather_hash};

use super::selection::PlanSelection;
use super::state::{FetchState, SummaryError, SummaryState, SummarySnapshot};

/// Street-mode variants fetched alongside the primary plan, in the
/// order their results are reported.
const SECONDARY_VARIANTS: [PlanVariant; 6] = [
    PlanVariant::Walk,
    PlanVariant::Bike,
    PlanVariant::BikeAndPublic,
    PlanVariant::BikePark,
    PlanVariant::Car,
    PlanVariant::ParkRide,
];

/// Orchestrates every fetch for one prepared search.
pub struct SummaryService<F> {
    pub(super) fetcher: Arc<F>,
    pub(super) prepared: PreparedPlan,
    pub(super) config: Arc<AppConfig>,
    pub(super) analytics: Arc<dyn AnalyticsSink>,
    pub(super) weather: Option<Arc<dyn WeatherClient>>,
    pub(super) time_range: Arc<RwLock<ServiceTimeRange>>,
    pub(super) state: Mutex<SummaryState>,
}

impl<F: PlanFetcher> SummaryService<F> {
    pub fn new(
        fetcher: Arc<F>,
        prepared: PreparedPlan,
        config: Arc<AppConfig>,
        analytics: Arc<dyn AnalyticsSink>,
        weather: Option<Arc<dyn WeatherClient>>,
        time_range: Arc<RwLock<ServiceTimeRange>>,
    ) -> Self {
        Self {
            fetcher,
            prepared,
            config,
            analytics,
            weather,
            time_range,
            state: Mutex::new(SummaryState::new()),
        }
    }

    /// Run a full summary round from scratch.
    ///
    /// Resets the state (cancelling anything in flight from the
    /// previous round), fetches the primary plan, and once it has
    /// arrived launches the secondary batch, the all-modes fallback
    /// and the weather fetch as applicable. Returns when every fetch
    /// of this round has been applied or discarded.
    pub async fn run(&self) {
        let generation = {
            let mut state = self.state.lock().await;
            state.reset();
            *state.slot_mut(PlanVariant::Default) = FetchState::InFlight;
            state.generation()
        };

        let result = self
            .fetcher
            .fetch_plan(PlanVariant::Default, &self.prepared.params)
            .await;

        let launch_secondaries = {
            let mut state = self.state.lock().await;
            if state.generation() != generation {
                return;
            }
            match result {
                Ok(plan) => {
                    *state.slot_mut(PlanVariant::Default) = FetchState::Done(plan);
                    let launch = self.prepared.has_distinct_endpoints()
                        && !state.second_query_sent;
                    if launch {
                        state.second_query_sent = true;
                    }
                    launch
                }
                Err(e) => {
                    tracing::warn!(variant = %PlanVariant::Default, error = %e, "plan fetch failed");
                    self.analytics
                        .record(AnalyticsEvent::error_loading(PlanVariant::Default.as_str()));
                    *state.slot_mut(PlanVariant::Default) = FetchState::Failed(e.to_string());
                    state.error = Some(SummaryError::LoadFailed);
                    false
                }
            }
        };

        if launch_secondaries {
            let batch = SECONDARY_VARIANTS
                .into_iter()
                .filter(|&variant| self.prepared.gates.allows(variant))
                .map(|variant| self.run_secondary(generation, variant));
            join_all(batch).await;
        }

        self.maybe_fetch_alternative(generation).await;
        self.maybe_fetch_weather(generation).await;
    }

    /// Fetch one street-mode variant. Failures stay contained in the
    /// variant's own slot; the rest of the summary is unaffected.
    async fn run_secondary(&self, generation: u64, variant: PlanVariant) {
        {
            let mut state = self.state.lock().await;
            if state.generation() != generation {
                return;
            }
            *state.slot_mut(variant) = FetchState::InFlight;
        }

        let result = self.fetcher.fetch_plan(variant, &self.prepared.params).await;

        let mut state = self.state.lock().await;
        if state.generation() != generation {
            return;
        }
        match result {
            Ok(plan) => {
                *state.slot_mut(variant) = FetchState::Done(plan);
            }
            Err(e) => {
                tracing::warn!(variant = %variant, error = %e, "plan fetch failed");
                self.analytics
                    .record(AnalyticsEvent::error_loading(variant.as_str()));
                *state.slot_mut(variant) = FetchState::Failed(e.to_string());
            }
        }
    }

    /// When the user narrowed the mode selection and got nothing but
    /// walking back, probe once with every mode enabled so the client
    /// can tell "no route" apart from "no route with these modes".
    async fn maybe_fetch_alternative(&self, generation: u64) {
        {
            let mut state = self.state.lock().await;
            if state.generation() != generation {
                return;
            }
            let only_walking = state
                .slot(PlanVariant::Default)
                .plan()
                .is_some_and(|plan| {
                    !plan.itineraries.is_empty()
                        && plan.itineraries.iter().all(|i| i.is_walk_only())
                });
            let wanted = only_walking
                && self.prepared.params.user_changed_modes
                && matches!(state.slot(PlanVariant::AllModes), FetchState::NotStarted);
            if !wanted {
                return;
            }
            *state.slot_mut(PlanVariant::AllModes) = FetchState::InFlight;
        }

        let result = self
            .fetcher
            .fetch_plan(PlanVariant::AllModes, &self.prepared.params)
            .await;

        let mut state = self.state.lock().await;
        if state.generation() != generation {
            return;
        }
        match result {
            Ok(plan) => {
                *state.slot_mut(PlanVariant::AllModes) = FetchState::Done(plan);
            }
            Err(e) => {
                tracing::warn!(variant = %PlanVariant::AllModes, error = %e, "plan fetch failed");
                self.analytics
                    .record(AnalyticsEvent::error_loading(PlanVariant::AllModes.as_str()));
                *state.slot_mut(PlanVariant::AllModes) = FetchState::Failed(e.to_string());
            }
        }
    }

    /// Fetch the weather at the start of the first street-mode
    /// itinerary, if a weather client is configured and a source
    /// itinerary exists. Failures only cost the hint.
    async fn maybe_fetch_weather(&self, generation: u64) {
        let Some(client) = &self.weather else {
            return;
        };

        let (hash, time_ms, lat, lon) = {
            let mut state = self.state.lock().await;
            if state.generation() != generation {
                return;
            }
            let source = state.weather_source_itinerary().and_then(|itinerary| {
                let leg = itinerary.legs().first()?;
                Some((itinerary.start_time, leg.from.lat, leg.from.lon))
            });
            let Some((time_ms, lat, lon)) = source else {
                return;
            };
            let hash = weather_hash(time_ms, lat, lon);
            state.set_pending_weather(hash.clone());
            (hash, time_ms, lat, lon)
        };

        let weather = match client.fetch(time_ms, lat, lon).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(error = %e, "weather fetch failed");
                None
            }
        };

        let mut state = self.state.lock().await;
        if state.generation() != generation {
            return;
        }
        state.apply_weather(&hash, weather);
    }

    /// Resolve the current view for a selection.
    pub async fn snapshot(&self, selection: &PlanSelection) -> SummarySnapshot {
        self.state.lock().await.snapshot(selection)
    }

    /// Vehicle subscription topics for the itinerary a selection is
    /// viewing. Falls back to the first shown itinerary when the
    /// selected index is out of range.
    pub async fn vehicle_topics(&self, selection: &PlanSelection) -> Vec<VehicleTopic> {
        let state = self.state.lock().await;
        let itineraries = state.combined_itineraries(selection);
        let index = selection.active_index(&itineraries);
        itineraries
            .get(index)
            .or_else(|| itineraries.first())
            .map(|itinerary| topics_for_itinerary(itinerary, &self.config))
            .unwrap_or_default()
    }

    /// The service time range paging decisions are made against.
    pub async fn current_time_range(&self) -> ServiceTimeRange {
        *self.time_range.read().await
    }
}
