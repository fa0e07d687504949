//! Mutable state for one summary query.
//!
//! A [`SummaryState`] holds everything fetched for a single
//! origin/destination/time/settings combination: the primary plan,
//! the street-mode alternatives, paged earlier/later itineraries and
//! the error and weather slots. The orchestrator advances it under a
//! lock; a generation counter lets results that raced a reset be
//! recognized and dropped.

use std::collections::HashSet;

use crate::domain::{Itinerary, Leg, Plan};
use crate::params::PlanVariant;
use crate::weather::WeatherInfo;

use super::selection::{PlanSelection, SelectionKind};

/// In the merged bike-to-transit view, at most this many itineraries
/// are taken from each contributing plan.
const BIKE_AND_VEHICLE_SECTION: usize = 3;

/// Lifecycle of one plan slot.
#[derive(Debug, Clone, Default)]
pub enum FetchState {
    #[default]
    NotStarted,
    InFlight,
    Done(Plan),
    Failed(String),
}

impl FetchState {
    /// The fetched plan, when this slot completed.
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            FetchState::Done(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, FetchState::Done(_))
    }

    /// Short status name for logs and responses.
    pub fn phase(&self) -> &'static str {
        match self {
            FetchState::NotStarted => "not-started",
            FetchState::InFlight => "in-flight",
            FetchState::Done(_) => "done",
            FetchState::Failed(_) => "failed",
        }
    }
}

/// Paging direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingDirection {
    Later,
    Earlier,
}

impl PagingDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PagingDirection::Later => "later",
            PagingDirection::Earlier => "earlier",
        }
    }
}

/// Why a paging direction stopped accepting requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingTerminal {
    /// The next window would leave the service's valid time range
    OutsideServiceRange,
    /// A page came back without a single new itinerary
    NoMoreItineraries,
}

impl PagingTerminal {
    /// Client-facing message id for this dead end. The ids match the
    /// ones clients already localize.
    pub fn message_id(self, direction: PagingDirection) -> &'static str {
        match direction {
            PagingDirection::Later => "no-route-end-date-not-in-range",
            PagingDirection::Earlier => "no-route-start-date-too-early",
        }
    }
}

/// User-visible summary error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryError {
    /// A plan fetch failed; clients show a generic network error
    LoadFailed,
    /// Later paging ran past the end of the service time range
    EndDateNotInRange,
    /// Earlier paging ran past the start of the service time range
    StartDateTooEarly,
}

impl SummaryError {
    /// Client-facing message id.
    pub fn message_id(self) -> &'static str {
        match self {
            SummaryError::LoadFailed => "network-error",
            SummaryError::EndDateNotInRange => "no-route-end-date-not-in-range",
            SummaryError::StartDateTooEarly => "no-route-start-date-too-early",
        }
    }
}

/// The plan a selection resolves to.
///
/// The section counts are non-zero only for the merged
/// bike-to-transit view, which shows up to three itineraries from
/// each contributing plan.
#[derive(Debug, Clone)]
pub struct ActivePlan {
    pub plan: Plan,
    /// Itineraries shown from the bike-to-park plan
    pub bike_park_count: usize,
    /// Itineraries shown from the bike-and-transit plan
    pub bike_public_count: usize,
}

impl ActivePlan {
    fn plain(plan: Plan) -> Self {
        ActivePlan {
            plan,
            bike_park_count: 0,
            bike_public_count: 0,
        }
    }
}

/// Status of one plan slot in a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SlotSnapshot {
    pub variant: PlanVariant,
    pub phase: &'static str,
    pub itinerary_count: usize,
}

/// Point-in-time view of the state, resolved for one selection.
#[derive(Debug, Clone)]
pub struct SummarySnapshot {
    pub generation: u64,
    pub slots: Vec<SlotSnapshot>,
    /// Earlier pages, the selected plan and later pages combined
    pub itineraries: Vec<Itinerary>,
    pub active_index: usize,
    pub is_detail_view: bool,
    pub bike_park_count: usize,
    pub bike_public_count: usize,
    /// Boundary index between paged-earlier and original itineraries
    pub separator_position: Option<usize>,
    pub error: Option<SummaryError>,
    pub later_terminal: Option<PagingTerminal>,
    pub earlier_terminal: Option<PagingTerminal>,
    pub weather: Option<WeatherInfo>,
}

/// All mutable state for one summary query.
#[derive(Debug, Default)]
pub struct SummaryState {
    pub(super) generation: u64,
    pub(super) primary: FetchState,
    pub(super) walk: FetchState,
    pub(super) bike: FetchState,
    pub(super) bike_and_public: FetchState,
    pub(super) bike_park: FetchState,
    pub(super) car: FetchState,
    pub(super) park_ride: FetchState,
    pub(super) alternative: FetchState,
    /// Latch: the secondary batch launches once per reset
    pub(super) second_query_sent: bool,
    /// Paged itineraries before the selected plan, ascending
    pub(super) earlier: Vec<Itinerary>,
    /// Paged itineraries after the selected plan, ascending
    pub(super) later: Vec<Itinerary>,
    pub(super) separator_position: Option<usize>,
    pub(super) later_in_flight: bool,
    pub(super) earlier_in_flight: bool,
    pub(super) later_terminal: Option<PagingTerminal>,
    pub(super) earlier_terminal: Option<PagingTerminal>,
    pub(super) error: Option<SummaryError>,
    pub(super) weather: Option<WeatherInfo>,
    pub(super) pending_weather_hash: Option<String>,
}

impl SummaryState {
    pub fn new() -> Self {
        SummaryState::default()
    }

    /// Generation of the current query round. Results fetched under
    /// an older generation must be discarded, never applied.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Begin a new query round: clear every slot, list and latch, and
    /// bump the generation so in-flight fetches cancel themselves.
    pub fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = SummaryState {
            generation,
            ..SummaryState::default()
        };
    }

    /// The slot a variant's result lands in.
    pub fn slot(&self, variant: PlanVariant) -> &FetchState {
        match variant {
            PlanVariant::Default => &self.primary,
            PlanVariant::Walk => &self.walk,
            PlanVariant::Bike => &self.bike,
            PlanVariant::BikeAndPublic => &self.bike_and_public,
            PlanVariant::BikePark => &self.bike_park,
            PlanVariant::Car => &self.car,
            PlanVariant::ParkRide => &self.park_ride,
            PlanVariant::AllModes => &self.alternative,
        }
    }

    pub(super) fn slot_mut(&mut self, variant: PlanVariant) -> &mut FetchState {
        match variant {
            PlanVariant::Default => &mut self.primary,
            PlanVariant::Walk => &mut self.walk,
            PlanVariant::Bike => &mut self.bike,
            PlanVariant::BikeAndPublic => &mut self.bike_and_public,
            PlanVariant::BikePark => &mut self.bike_park,
            PlanVariant::Car => &mut self.car,
            PlanVariant::ParkRide => &mut self.park_ride,
            PlanVariant::AllModes => &mut self.alternative,
        }
    }

    pub fn error(&self) -> Option<SummaryError> {
        self.error
    }

    /// Resolve the plan a selection shows.
    ///
    /// Named street selections show their slot's plan once it is
    /// done. The bike-to-transit view merges two plans. The default
    /// view substitutes the all-modes alternative when the primary
    /// found nothing beyond walking.
    pub fn selected_plan(&self, selection: &PlanSelection) -> Option<ActivePlan> {
        match selection.kind() {
            SelectionKind::Walk => self.walk.plan().cloned().map(ActivePlan::plain),
            SelectionKind::Bike => self.bike.plan().cloned().map(ActivePlan::plain),
            SelectionKind::Car => self.car.plan().cloned().map(ActivePlan::plain),
            SelectionKind::ParkRide => self.park_ride.plan().cloned().map(ActivePlan::plain),
            SelectionKind::BikeAndVehicle => self.bike_and_vehicle_plan(),
            SelectionKind::Default | SelectionKind::Index(_) => self.default_plan(),
        }
    }

    /// Merge bike-to-park and bike-and-transit results.
    ///
    /// Pure bike or walk itineraries are dropped first; they exist in
    /// these results only as fallback noise. When both filtered plans
    /// contain transit the view takes up to three itineraries from
    /// each, park results first. When only one does, it is shown
    /// whole. Requires both slots to have completed.
    fn bike_and_vehicle_plan(&self) -> Option<ActivePlan> {
        let public = without_bike_and_walk_only(self.bike_and_public.plan()?);
        let park = without_bike_and_walk_only(self.bike_park.plan()?);
        let bike_public_count = public.itineraries.len().min(BIKE_AND_VEHICLE_SECTION);
        let bike_park_count = park.itineraries.len().min(BIKE_AND_VEHICLE_SECTION);
        let public_has_transit = public.has_itineraries_containing_public_transit();
        let park_has_transit = park.has_itineraries_containing_public_transit();

        let plan = if public_has_transit && park_has_transit {
            let mut itineraries: Vec<Itinerary> = park
                .itineraries
                .iter()
                .take(BIKE_AND_VEHICLE_SECTION)
                .cloned()
                .collect();
            itineraries.extend(
                public
                    .itineraries
                    .iter()
                    .take(BIKE_AND_VEHICLE_SECTION)
                    .cloned(),
            );
            Plan::new(None, itineraries)
        } else if public_has_transit {
            public
        } else if park_has_transit {
            park
        } else {
            return None;
        };
        Some(ActivePlan {
            plan,
            bike_park_count,
            bike_public_count,
        })
    }

    fn default_plan(&self) -> Option<ActivePlan> {
        let plan = self.primary.plan()?;
        let nothing_but_walks = plan.itineraries.iter().all(Itinerary::is_walk_only);
        if nothing_but_walks {
            if let Some(alternative) = self.alternative.plan() {
                if !alternative.itineraries.is_empty() {
                    return Some(ActivePlan::plain(alternative.clone()));
                }
            }
        }
        Some(ActivePlan::plain(plan.clone()))
    }

    /// Everything currently shown: earlier pages, the selected plan's
    /// itineraries, later pages.
    ///
    /// Walk-only itineraries are filtered out unless the selection
    /// keeps them, and a failed load empties the list entirely.
    pub fn combined_itineraries(&self, selection: &PlanSelection) -> Vec<Itinerary> {
        if self.error == Some(SummaryError::LoadFailed) {
            return Vec::new();
        }
        let mut combined: Vec<Itinerary> = self.earlier.clone();
        if let Some(active) = self.selected_plan(selection) {
            combined.extend(active.plan.itineraries);
        }
        combined.extend(self.later.iter().cloned());
        if !selection.keeps_walk_only() {
            combined.retain(|itinerary| !itinerary.is_walk_only());
        }
        combined
    }

    /// Signatures of everything already held, before any filtering.
    /// New pages are deduplicated against this set.
    pub(super) fn known_signatures(&self, selection: &PlanSelection) -> HashSet<String> {
        let mut seen = HashSet::new();
        for itinerary in &self.earlier {
            seen.insert(itinerary_signature(itinerary));
        }
        if let Some(active) = self.selected_plan(selection) {
            for itinerary in &active.plan.itineraries {
                seen.insert(itinerary_signature(itinerary));
            }
        }
        for itinerary in &self.later {
            seen.insert(itinerary_signature(itinerary));
        }
        seen
    }

    /// Append a later page, keeping only unseen itineraries. Returns
    /// how many were new; zero marks the direction exhausted.
    pub(super) fn apply_later_page(
        &mut self,
        page: Vec<Itinerary>,
        selection: &PlanSelection,
    ) -> usize {
        let fresh = self.unseen(page, selection);
        let count = fresh.len();
        if count == 0 {
            self.later_terminal = Some(PagingTerminal::NoMoreItineraries);
            self.error = Some(SummaryError::EndDateNotInRange);
        } else {
            self.later.extend(fresh);
            self.clear_load_error();
        }
        count
    }

    /// Prepend an earlier page. Pages arrive newest first and are
    /// reversed into ascending order before prepending; the separator
    /// advances by the number of prepended itineraries.
    pub(super) fn apply_earlier_page(
        &mut self,
        page: Vec<Itinerary>,
        selection: &PlanSelection,
    ) -> usize {
        let mut fresh = self.unseen(page, selection);
        let count = fresh.len();
        if count == 0 {
            self.earlier_terminal = Some(PagingTerminal::NoMoreItineraries);
            self.error = Some(SummaryError::StartDateTooEarly);
        } else {
            fresh.reverse();
            fresh.extend(self.earlier.drain(..));
            self.earlier = fresh;
            self.separator_position = Some(self.separator_position.unwrap_or(0) + count);
            self.clear_load_error();
        }
        count
    }

    fn unseen(&self, page: Vec<Itinerary>, selection: &PlanSelection) -> Vec<Itinerary> {
        let mut seen = self.known_signatures(selection);
        page.into_iter()
            .filter(|itinerary| seen.insert(itinerary_signature(itinerary)))
            .collect()
    }

    fn clear_load_error(&mut self) {
        if self.error == Some(SummaryError::LoadFailed) {
            self.error = None;
        }
    }

    /// The itinerary whose start a weather hint describes: the first
    /// walk itinerary, else the first bike itinerary, else the first
    /// mixed bike-to-transit itinerary that actually rides transit.
    pub fn weather_source_itinerary(&self) -> Option<&Itinerary> {
        for slot in [&self.walk, &self.bike] {
            if let Some(itinerary) = slot.plan().and_then(|plan| plan.itineraries.first()) {
                return Some(itinerary);
            }
        }
        for slot in [&self.bike_and_public, &self.bike_park] {
            if let Some(plan) = slot.plan() {
                let mixed = plan
                    .itineraries
                    .iter()
                    .find(|itinerary| !itinerary.is_walk_only() && !itinerary.is_cycling_only());
                if let Some(itinerary) = mixed {
                    return Some(itinerary);
                }
            }
        }
        None
    }

    pub(super) fn set_pending_weather(&mut self, hash: String) {
        self.pending_weather_hash = Some(hash);
    }

    /// Store a weather result if its request hash is still the
    /// pending one. A mismatch means a newer request superseded this
    /// one; the result is dropped. Returns whether it was applied.
    pub(super) fn apply_weather(&mut self, hash: &str, weather: Option<WeatherInfo>) -> bool {
        if self.pending_weather_hash.as_deref() != Some(hash) {
            return false;
        }
        self.pending_weather_hash = None;
        self.weather = weather;
        true
    }

    /// Resolve the full view for one selection.
    pub fn snapshot(&self, selection: &PlanSelection) -> SummarySnapshot {
        let active = self.selected_plan(selection);
        let itineraries = self.combined_itineraries(selection);
        let slots = [
            PlanVariant::Default,
            PlanVariant::Walk,
            PlanVariant::Bike,
            PlanVariant::BikeAndPublic,
            PlanVariant::BikePark,
            PlanVariant::Car,
            PlanVariant::ParkRide,
            PlanVariant::AllModes,
        ]
        .into_iter()
        .map(|variant| {
            let slot = self.slot(variant);
            SlotSnapshot {
                variant,
                phase: slot.phase(),
                itinerary_count: slot.plan().map_or(0, |plan| plan.itineraries.len()),
            }
        })
        .collect();

        SummarySnapshot {
            generation: self.generation,
            slots,
            active_index: selection.active_index(&itineraries),
            is_detail_view: selection.is_detail_view(&itineraries),
            bike_park_count: active.as_ref().map_or(0, |a| a.bike_park_count),
            bike_public_count: active.as_ref().map_or(0, |a| a.bike_public_count),
            itineraries,
            separator_position: self.separator_position,
            error: self.error,
            later_terminal: self.later_terminal,
            earlier_terminal: self.earlier_terminal,
            weather: self.weather.clone(),
        }
    }
}

/// Drop itineraries that never leave the saddle or the pavement.
/// Mixed bike-and-transit results include them as fallback noise.
fn without_bike_and_walk_only(plan: &Plan) -> Plan {
    let itineraries = plan
        .itineraries
        .iter()
        .filter(|itinerary| !itinerary.is_walk_only() && !itinerary.is_cycling_only())
        .cloned()
        .collect();
    Plan::new(plan.date, itineraries)
}

fn leg_signature(leg: &Leg) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        leg.mode.as_str(),
        leg.route.as_ref().map_or("", |r| r.gtfs_id.as_str()),
        leg.trip.as_ref().map_or("", |t| t.gtfs_id.as_str()),
        leg.start_time,
        leg.end_time
    )
}

/// Identity of an itinerary for paging deduplication: the modes,
/// routes, trips and times of its legs. Two itineraries with equal
/// signatures show the user the same journey.
pub(super) fn itinerary_signature(itinerary: &Itinerary) -> String {
    let parts: Vec<String> = itinerary.legs().iter().map(leg_signature).collect();
    parts.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeedScopedId, Leg, Place, RouteRef, TransportMode, TripRef};
    use crate::summary::selection::PlanSelection;

    fn place() -> Place {
        Place::new(None, 60.17, 24.93)
    }

    fn walk_leg(start: i64, end: i64) -> Leg {
        Leg::new(TransportMode::Walk, start, end, place(), place()).unwrap()
    }

    fn bike_leg(start: i64, end: i64) -> Leg {
        Leg::new(TransportMode::Bicycle, start, end, place(), place()).unwrap()
    }

    fn bus_leg(start: i64, end: i64, route: &str) -> Leg {
        let mut leg = Leg::new(TransportMode::Bus, start, end, place(), place()).unwrap();
        leg.route = Some(RouteRef {
            gtfs_id: FeedScopedId::parse(format!("HSL:{route}")),
            short_name: Some(route.to_string()),
        });
        leg.trip = Some(TripRef {
            gtfs_id: FeedScopedId::parse(format!("HSL:{route}_trip")),
            direction_id: Some(0),
            first_departure_seconds: Some(30_000),
        });
        leg
    }

    fn itinerary(legs: Vec<Leg>) -> Itinerary {
        let start = legs.first().unwrap().start_time;
        let end = legs.last().unwrap().end_time;
        Itinerary::new(start, end, (end - start) / 1000, 0.0, legs).unwrap()
    }

    fn walk_itinerary(start: i64) -> Itinerary {
        itinerary(vec![walk_leg(start, start + 900_000)])
    }

    fn bike_itinerary(start: i64) -> Itinerary {
        itinerary(vec![bike_leg(start, start + 900_000)])
    }

    fn transit_itinerary(start: i64, route: &str) -> Itinerary {
        itinerary(vec![
            walk_leg(start, start + 300_000),
            bus_leg(start + 300_000, start + 900_000, route),
        ])
    }

    fn plan(itineraries: Vec<Itinerary>) -> Plan {
        Plan::new(None, itineraries)
    }

    fn selection(hash: &str) -> PlanSelection {
        PlanSelection::parse(Some(hash), None)
    }

    #[test]
    fn reset_bumps_generation_and_clears_everything() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![transit_itinerary(0, "550")]));
        state.second_query_sent = true;
        state.later.push(transit_itinerary(1_000_000, "551"));
        state.separator_position = Some(2);
        state.error = Some(SummaryError::LoadFailed);

        state.reset();

        assert_eq!(state.generation(), 1);
        assert!(state.slot(PlanVariant::Default).plan().is_none());
        assert!(!state.second_query_sent);
        assert!(state.later.is_empty());
        assert_eq!(state.separator_position, None);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn named_selection_requires_its_slot() {
        let mut state = SummaryState::new();
        assert!(state.selected_plan(&selection("walk")).is_none());

        state.walk = FetchState::Done(plan(vec![walk_itinerary(0)]));
        let active = state.selected_plan(&selection("walk")).unwrap();
        assert_eq!(active.plan.itineraries.len(), 1);
        assert_eq!(active.bike_park_count, 0);
    }

    #[test]
    fn default_selection_shows_primary_plan() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![
            transit_itinerary(0, "550"),
            transit_itinerary(600_000, "551"),
        ]));
        let active = state.selected_plan(&PlanSelection::DEFAULT).unwrap();
        assert_eq!(active.plan.itineraries.len(), 2);
    }

    #[test]
    fn walk_only_primary_substitutes_alternative() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![walk_itinerary(0)]));
        state.alternative = FetchState::Done(plan(vec![transit_itinerary(0, "550")]));

        let active = state.selected_plan(&PlanSelection::DEFAULT).unwrap();
        assert!(active.plan.itineraries[0].contains_public_transit());
    }

    #[test]
    fn empty_alternative_does_not_substitute() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![walk_itinerary(0)]));
        state.alternative = FetchState::Done(plan(vec![]));

        let active = state.selected_plan(&PlanSelection::DEFAULT).unwrap();
        assert!(active.plan.itineraries[0].is_walk_only());
    }

    #[test]
    fn bike_and_vehicle_merges_three_from_each() {
        let mut state = SummaryState::new();
        let park: Vec<Itinerary> = (0..4)
            .map(|i| transit_itinerary(i * 100_000, "p"))
            .collect();
        let public: Vec<Itinerary> = (0..2)
            .map(|i| transit_itinerary(i * 100_000 + 50_000, "q"))
            .collect();
        state.bike_park = FetchState::Done(plan(park));
        state.bike_and_public = FetchState::Done(plan(public));

        let active = state.selected_plan(&selection("bikeAndVehicle")).unwrap();
        assert_eq!(active.plan.itineraries.len(), 5);
        assert_eq!(active.bike_park_count, 3);
        assert_eq!(active.bike_public_count, 2);
        // Park results come first in the merged list
        let first_route = active.plan.itineraries[0].legs()[1]
            .route
            .as_ref()
            .unwrap()
            .gtfs_id
            .as_str()
            .to_string();
        assert_eq!(first_route, "HSL:p");
    }

    #[test]
    fn bike_and_vehicle_falls_back_to_single_transit_side() {
        let mut state = SummaryState::new();
        state.bike_park = FetchState::Done(plan(vec![bike_itinerary(0)]));
        state.bike_and_public = FetchState::Done(plan(vec![
            transit_itinerary(0, "q"),
            transit_itinerary(100_000, "q2"),
        ]));

        let active = state.selected_plan(&selection("bikeAndVehicle")).unwrap();
        assert_eq!(active.plan.itineraries.len(), 2);
        // The filtered park plan was empty, so its section is too
        assert_eq!(active.bike_park_count, 0);
        assert_eq!(active.bike_public_count, 2);
    }

    #[test]
    fn bike_and_vehicle_without_transit_is_empty() {
        let mut state = SummaryState::new();
        state.bike_park = FetchState::Done(plan(vec![bike_itinerary(0)]));
        state.bike_and_public = FetchState::Done(plan(vec![walk_itinerary(0)]));
        assert!(state.selected_plan(&selection("bikeAndVehicle")).is_none());
    }

    #[test]
    fn bike_and_vehicle_needs_both_slots() {
        let mut state = SummaryState::new();
        state.bike_and_public = FetchState::Done(plan(vec![transit_itinerary(0, "q")]));
        // bike_park still in flight
        assert!(state.selected_plan(&selection("bikeAndVehicle")).is_none());
    }

    #[test]
    fn combined_filters_walk_only_for_default_selection() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![
            walk_itinerary(0),
            transit_itinerary(100_000, "550"),
        ]));

        let combined = state.combined_itineraries(&PlanSelection::DEFAULT);
        assert_eq!(combined.len(), 1);
        assert!(combined[0].contains_public_transit());
    }

    #[test]
    fn walk_selection_keeps_walk_only_itineraries() {
        let mut state = SummaryState::new();
        state.walk = FetchState::Done(plan(vec![walk_itinerary(0)]));
        let combined = state.combined_itineraries(&selection("walk"));
        assert_eq!(combined.len(), 1);
    }

    #[test]
    fn combined_includes_pages_in_order() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![transit_itinerary(1_000_000, "b")]));
        state.earlier = vec![transit_itinerary(0, "a")];
        state.later = vec![transit_itinerary(2_000_000, "c")];

        let combined = state.combined_itineraries(&PlanSelection::DEFAULT);
        let starts: Vec<i64> = combined.iter().map(|i| i.start_time).collect();
        assert_eq!(starts, vec![0, 1_000_000, 2_000_000]);
    }

    #[test]
    fn load_failure_empties_combined_list() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![transit_itinerary(0, "550")]));
        state.error = Some(SummaryError::LoadFailed);
        assert!(state.combined_itineraries(&PlanSelection::DEFAULT).is_empty());
    }

    #[test]
    fn range_errors_keep_the_list() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![transit_itinerary(0, "550")]));
        state.error = Some(SummaryError::EndDateNotInRange);
        assert_eq!(state.combined_itineraries(&PlanSelection::DEFAULT).len(), 1);
    }

    #[test]
    fn later_page_appends_only_unseen() {
        let mut state = SummaryState::new();
        let shown = transit_itinerary(0, "550");
        state.primary = FetchState::Done(plan(vec![shown.clone()]));

        let page = vec![shown, transit_itinerary(1_000_000, "551")];
        let count = state.apply_later_page(page, &PlanSelection::DEFAULT);

        assert_eq!(count, 1);
        assert_eq!(state.later.len(), 1);
        assert_eq!(state.later[0].start_time, 1_000_000);
        assert_eq!(state.later_terminal, None);
    }

    #[test]
    fn duplicate_only_page_is_terminal() {
        let mut state = SummaryState::new();
        let shown = transit_itinerary(0, "550");
        state.primary = FetchState::Done(plan(vec![shown.clone()]));

        let count = state.apply_later_page(vec![shown], &PlanSelection::DEFAULT);
        assert_eq!(count, 0);
        assert_eq!(
            state.later_terminal,
            Some(PagingTerminal::NoMoreItineraries)
        );
        assert_eq!(state.error(), Some(SummaryError::EndDateNotInRange));
    }

    #[test]
    fn earlier_page_reverses_and_advances_separator() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![transit_itinerary(3_000_000, "550")]));

        // Pages arrive newest first
        let page = vec![
            transit_itinerary(2_000_000, "a"),
            transit_itinerary(1_000_000, "b"),
        ];
        let count = state.apply_earlier_page(page, &PlanSelection::DEFAULT);
        assert_eq!(count, 2);
        let starts: Vec<i64> = state.earlier.iter().map(|i| i.start_time).collect();
        assert_eq!(starts, vec![1_000_000, 2_000_000]);
        assert_eq!(state.separator_position, Some(2));

        // A second page lands before the first, separator keeps counting
        let page = vec![transit_itinerary(500_000, "c")];
        state.apply_earlier_page(page, &PlanSelection::DEFAULT);
        let starts: Vec<i64> = state.earlier.iter().map(|i| i.start_time).collect();
        assert_eq!(starts, vec![500_000, 1_000_000, 2_000_000]);
        assert_eq!(state.separator_position, Some(3));
    }

    #[test]
    fn empty_earlier_page_is_terminal() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![transit_itinerary(0, "550")]));
        let count = state.apply_earlier_page(Vec::new(), &PlanSelection::DEFAULT);
        assert_eq!(count, 0);
        assert_eq!(
            state.earlier_terminal,
            Some(PagingTerminal::NoMoreItineraries)
        );
        assert_eq!(state.error(), Some(SummaryError::StartDateTooEarly));
    }

    #[test]
    fn successful_page_clears_load_error() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![transit_itinerary(0, "550")]));
        state.error = Some(SummaryError::LoadFailed);

        state.apply_later_page(
            vec![transit_itinerary(1_000_000, "551")],
            &PlanSelection::DEFAULT,
        );
        assert_eq!(state.error(), None);
    }

    #[test]
    fn signature_distinguishes_route_and_time() {
        let a = transit_itinerary(0, "550");
        let b = transit_itinerary(0, "551");
        let c = transit_itinerary(60_000, "550");
        assert_ne!(itinerary_signature(&a), itinerary_signature(&b));
        assert_ne!(itinerary_signature(&a), itinerary_signature(&c));
        assert_eq!(
            itinerary_signature(&a),
            itinerary_signature(&transit_itinerary(0, "550"))
        );
    }

    #[test]
    fn weather_source_prefers_walk_then_bike() {
        let mut state = SummaryState::new();
        assert!(state.weather_source_itinerary().is_none());

        state.bike = FetchState::Done(plan(vec![bike_itinerary(5)]));
        assert_eq!(state.weather_source_itinerary().unwrap().start_time, 5);

        state.walk = FetchState::Done(plan(vec![walk_itinerary(3)]));
        assert_eq!(state.weather_source_itinerary().unwrap().start_time, 3);
    }

    #[test]
    fn weather_source_skips_pure_bike_rides_in_mixed_plans() {
        let mut state = SummaryState::new();
        state.bike_and_public = FetchState::Done(plan(vec![
            bike_itinerary(0),
            transit_itinerary(7, "550"),
        ]));
        assert_eq!(state.weather_source_itinerary().unwrap().start_time, 7);
    }

    #[test]
    fn weather_result_applies_only_for_pending_hash() {
        let mut state = SummaryState::new();
        state.set_pending_weather("1_60.17_24.93".to_string());

        let info = WeatherInfo {
            temperature: 2.5,
            wind_speed: 7.0,
            icon_id: Some(1),
        };
        assert!(!state.apply_weather("2_60.17_24.93", Some(info.clone())));
        assert!(state.weather.is_none());

        assert!(state.apply_weather("1_60.17_24.93", Some(info)));
        assert_eq!(state.weather.as_ref().unwrap().temperature, 2.5);
        assert!(state.pending_weather_hash.is_none());
    }

    #[test]
    fn snapshot_resolves_selection() {
        let mut state = SummaryState::new();
        state.primary = FetchState::Done(plan(vec![
            transit_itinerary(0, "550"),
            transit_itinerary(600_000, "551"),
        ]));
        state.walk = FetchState::Failed("boom".to_string());

        let snapshot = state.snapshot(&selection("1"));
        assert_eq!(snapshot.itineraries.len(), 2);
        assert_eq!(snapshot.active_index, 1);
        assert!(snapshot.is_detail_view);
        let walk = snapshot
            .slots
            .iter()
            .find(|s| s.variant == PlanVariant::Walk)
            .unwrap();
        assert_eq!(walk.phase, "failed");
        let primary = snapshot
            .slots
            .iter()
            .find(|s| s.variant == PlanVariant::Default)
            .unwrap();
        assert_eq!(primary.itinerary_count, 2);
    }
}
