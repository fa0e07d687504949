//! Active plan selection.
//!
//! Clients address plans with a route-hash string: a named street
//! mode (`"walk"`, `"bike"`, `"car"`, `"parkAndRide"`,
//! `"bikeAndVehicle"`) or a numeric itinerary index into the primary
//! plan. A second segment can address one itinerary inside a named
//! plan's list. Whatever the hash says, resolution is deterministic:
//! exactly one itinerary is active for any state.

use crate::domain::Itinerary;

/// Which plan a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// The primary transit plan
    Default,
    /// A specific itinerary of the primary plan
    Index(usize),
    /// The walking-only plan
    Walk,
    /// The cycling-only plan
    Bike,
    /// The driving-only plan
    Car,
    /// The park-and-ride plan
    ParkRide,
    /// The merged bike-to-transit view
    BikeAndVehicle,
}

/// A parsed selection: the addressed plan plus an optional itinerary
/// index within it.
///
/// # Examples
///
/// ```
/// use trip_server::summary::{PlanSelection, SelectionKind};
///
/// let selection = PlanSelection::parse(Some("bikeAndVehicle"), Some("2"));
/// assert_eq!(selection.kind(), SelectionKind::BikeAndVehicle);
/// assert_eq!(selection.detail(), Some(2));
///
/// // Unrecognized hashes fall back to the default plan
/// let fallback = PlanSelection::parse(Some("scooter"), None);
/// assert_eq!(fallback.kind(), SelectionKind::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSelection {
    kind: SelectionKind,
    detail: Option<usize>,
}

impl PlanSelection {
    /// The default plan with no explicit index.
    pub const DEFAULT: PlanSelection = PlanSelection {
        kind: SelectionKind::Default,
        detail: None,
    };

    /// Parse route-hash segments.
    ///
    /// Selection is addressing, not validation: unrecognized text
    /// falls back to the default plan instead of failing, and a
    /// non-numeric detail segment is ignored.
    pub fn parse(hash: Option<&str>, second_hash: Option<&str>) -> PlanSelection {
        let kind = match hash {
            None | Some("") => SelectionKind::Default,
            Some("walk") => SelectionKind::Walk,
            Some("bike") => SelectionKind::Bike,
            Some("car") => SelectionKind::Car,
            Some("parkAndRide") => SelectionKind::ParkRide,
            Some("bikeAndVehicle") => SelectionKind::BikeAndVehicle,
            Some(other) => match other.parse::<usize>() {
                Ok(n) => SelectionKind::Index(n),
                Err(_) => SelectionKind::Default,
            },
        };
        // A detail index only means something under a named plan
        let detail = match kind {
            SelectionKind::Default | SelectionKind::Index(_) => None,
            _ => second_hash.and_then(|s| s.parse::<usize>().ok()),
        };
        PlanSelection { kind, detail }
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    /// Requested index within the selected plan's list, if any.
    pub fn detail(&self) -> Option<usize> {
        self.detail
    }

    fn explicit_index(&self) -> Option<usize> {
        match self.kind {
            SelectionKind::Index(n) => Some(n),
            _ => self.detail,
        }
    }

    /// Resolve the active itinerary index within `itineraries`.
    ///
    /// An in-range explicit index wins. Otherwise the first itinerary
    /// without a cancelled leg is active, falling back to index 0.
    pub fn active_index(&self, itineraries: &[Itinerary]) -> usize {
        if let Some(n) = self.explicit_index() {
            if n < itineraries.len() {
                return n;
            }
        }
        itineraries
            .iter()
            .position(|itinerary| !itinerary.has_cancelation())
            .unwrap_or(0)
    }

    /// True when the request addresses a single itinerary (a detail
    /// view) rather than the whole list.
    ///
    /// The street-mode plans hold one itinerary, so naming them is
    /// already a detail view; the composite views need an in-range
    /// detail index.
    pub fn is_detail_view(&self, itineraries: &[Itinerary]) -> bool {
        match self.kind {
            SelectionKind::BikeAndVehicle | SelectionKind::ParkRide => self
                .detail
                .is_some_and(|n| n < itineraries.len()),
            SelectionKind::Walk | SelectionKind::Bike | SelectionKind::Car => true,
            SelectionKind::Index(n) => n < itineraries.len(),
            SelectionKind::Default => false,
        }
    }

    /// True when walk-only itineraries stay in the combined list.
    ///
    /// The walk plan is all walking by definition, and the merged
    /// bike-to-transit view curates its own lists, so neither filters.
    pub fn keeps_walk_only(&self) -> bool {
        matches!(
            self.kind,
            SelectionKind::Walk | SelectionKind::BikeAndVehicle
        )
    }
}

impl Default for PlanSelection {
    fn default() -> Self {
        PlanSelection::DEFAULT
    }
}
