//! Plans: the result of one routing query.

use super::Itinerary;

/// The itineraries returned by a single plan query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    /// The date the endpoint resolved the query to, unix milliseconds
    pub date: Option<i64>,
    /// Returned itineraries, in the endpoint's order
    pub itineraries: Vec<Itinerary>,
}

impl Plan {
    pub fn new(date: Option<i64>, itineraries: Vec<Itinerary>) -> Self {
        Self { date, itineraries }
    }

    /// True when the plan is worth offering as a transit alternative.
    ///
    /// A plan with several itineraries is assumed to contain transit;
    /// a single-itinerary plan must actually ride public transport.
    /// Street-only fallback results (one walking or cycling itinerary)
    /// are how the endpoint says "no transit connection here".
    pub fn has_itineraries_containing_public_transit(&self) -> bool {
        match self.itineraries.len() {
            0 => false,
            1 => self.itineraries[0].contains_public_transit(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leg, Place, TransportMode};

    fn leg(mode: TransportMode, start: i64, end: i64) -> Leg {
        let place = Place::new(None, 60.17, 24.93);
        Leg::new(mode, start, end, place.clone(), place).unwrap()
    }

    fn itinerary(legs: Vec<Leg>) -> Itinerary {
        let start = legs.first().map(|l| l.start_time).unwrap_or(0);
        let end = legs.last().map(|l| l.end_time).unwrap_or(0);
        Itinerary::new(start, end, (end - start) / 1000, 0.0, legs).unwrap()
    }

    #[test]
    fn empty_plan_has_no_transit() {
        assert!(!Plan::default().has_itineraries_containing_public_transit());
    }

    #[test]
    fn single_walk_itinerary_is_not_transit() {
        let plan = Plan::new(None, vec![itinerary(vec![leg(TransportMode::Walk, 0, 1000)])]);
        assert!(!plan.has_itineraries_containing_public_transit());
    }

    #[test]
    fn single_transit_itinerary_counts() {
        let plan = Plan::new(
            None,
            vec![itinerary(vec![
                leg(TransportMode::Walk, 0, 1000),
                leg(TransportMode::Subway, 1000, 4000),
            ])],
        );
        assert!(plan.has_itineraries_containing_public_transit());
    }

    #[test]
    fn multiple_itineraries_assumed_transit() {
        // Mirrors how plans behave in practice: the endpoint only
        // returns several itineraries when transit was found.
        let plan = Plan::new(
            None,
            vec![
                itinerary(vec![leg(TransportMode::Walk, 0, 1000)]),
                itinerary(vec![leg(TransportMode::Walk, 0, 2000)]),
            ],
        );
        assert!(plan.has_itineraries_containing_public_transit());
    }
}
