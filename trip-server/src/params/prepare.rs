//! Plan query preparation.
//!
//! Turns a routing question (from, to, when) plus user settings and
//! deployment config into the full parameter set for every plan
//! variant, including the gates that decide which street-mode
//! variants are worth querying at all.

use std::fmt;

use crate::config::AppConfig;
use crate::domain::{
    Location, Mode, Qualifier, TransportMode, estimated_distance, parse_modes,
};

use super::settings::{OptimizeType, TriangleFactors, UserSettings, find_nearest_option};

/// Itineraries requested per plan query.
pub const DEFAULT_NUM_ITINERARIES: u32 = 5;

/// The distinct plan queries the summary can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanVariant {
    /// The user's selected modes
    Default,
    /// Walking only
    Walk,
    /// Cycling only
    Bike,
    /// Cycling combined with rapid transit
    BikeAndPublic,
    /// Cycling to a park-and-ride facility, then transit
    BikePark,
    /// Driving only
    Car,
    /// Driving to a park-and-ride facility, then transit
    ParkRide,
    /// Every mode the deployment offers; used to probe whether a
    /// restricted mode selection is why nothing was found
    AllModes,
}

impl PlanVariant {
    /// Stable name used for cache keys, log fields and mock data files.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanVariant::Default => "default",
            PlanVariant::Walk => "walk",
            PlanVariant::Bike => "bike",
            PlanVariant::BikeAndPublic => "bike-and-public",
            PlanVariant::BikePark => "bike-park",
            PlanVariant::Car => "car",
            PlanVariant::ParkRide => "park-ride",
            PlanVariant::AllModes => "all-modes",
        }
    }
}

impl fmt::Display for PlanVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A routing question as it arrives from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanQuery {
    pub from: Location,
    pub to: Location,
    pub intermediate_places: Vec<Location>,
    /// Departure (or arrival, when `arrive_by`) time, unix milliseconds
    pub time_ms: i64,
    pub arrive_by: bool,
    pub locale: Option<String>,
}

/// Which secondary plan variants should be queried for this search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryGates {
    pub walk: bool,
    pub bike: bool,
    pub bike_and_public: bool,
    pub bike_park: bool,
    pub car: bool,
    pub park_ride: bool,
}

impl QueryGates {
    /// Whether a variant passes its gate. The primary and all-modes
    /// queries are never gated.
    pub fn allows(&self, variant: PlanVariant) -> bool {
        match variant {
            PlanVariant::Default | PlanVariant::AllModes => true,
            PlanVariant::Walk => self.walk,
            PlanVariant::Bike => self.bike,
            PlanVariant::BikeAndPublic => self.bike_and_public,
            PlanVariant::BikePark => self.bike_park,
            PlanVariant::Car => self.car,
            PlanVariant::ParkRide => self.park_ride,
        }
    }
}

/// The complete, normalised parameter set for one search.
///
/// Shared fields apply to every variant; the per-variant mode lists
/// are selected with [`PlanParams::modes_for`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanParams {
    pub from: Location,
    pub to: Location,
    pub intermediate_places: Vec<Location>,
    pub time_ms: i64,
    pub arrive_by: bool,
    pub num_itineraries: u32,
    pub wheelchair: bool,
    pub walk_reluctance: f64,
    pub walk_board_cost: u32,
    pub min_transfer_time: u32,
    pub transfer_penalty: u32,
    pub walk_speed: f64,
    pub bike_speed: f64,
    pub optimize: OptimizeType,
    pub triangle: TriangleFactors,
    pub ticket_types: Option<String>,
    pub itinerary_filtering: f64,
    pub locale: String,
    /// Modes for the primary query (user selection plus walking)
    pub modes: Vec<Mode>,
    pub bike_and_public_modes: Vec<Mode>,
    pub bike_park_modes: Vec<Mode>,
    pub car_park_modes: Vec<Mode>,
    pub all_modes: Vec<Mode>,
    pub disable_remaining_weight_heuristic: bool,
    pub bike_and_public_disable_heuristic: bool,
    /// The user's mode selection differs from the deployment default
    pub user_changed_modes: bool,
}

impl PlanParams {
    /// The mode list a variant queries with.
    pub fn modes_for(&self, variant: PlanVariant) -> Vec<Mode> {
        match variant {
            PlanVariant::Default => self.modes.clone(),
            PlanVariant::Walk => vec![Mode::plain(TransportMode::Walk)],
            PlanVariant::Bike => vec![Mode::plain(TransportMode::Bicycle)],
            PlanVariant::BikeAndPublic => self.bike_and_public_modes.clone(),
            PlanVariant::BikePark => self.bike_park_modes.clone(),
            PlanVariant::Car => vec![Mode::plain(TransportMode::Car)],
            PlanVariant::ParkRide => self.car_park_modes.clone(),
            PlanVariant::AllModes => self.all_modes.clone(),
        }
    }

    /// Whether a variant opts out of the remaining-weight heuristic.
    /// Bike-with-transit variants have their own flag; everything
    /// else follows the rental-bike rule.
    pub fn heuristic_disabled_for(&self, variant: PlanVariant) -> bool {
        match variant {
            PlanVariant::BikeAndPublic | PlanVariant::BikePark => {
                self.bike_and_public_disable_heuristic
            }
            _ => self.disable_remaining_weight_heuristic,
        }
    }

    /// Copy of these params shifted to a new search time.
    pub fn at_time(&self, time_ms: i64, arrive_by: bool) -> PlanParams {
        let mut params = self.clone();
        params.time_ms = time_ms;
        params.arrive_by = arrive_by;
        params
    }
}

/// A prepared search: parameters plus variant gates.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPlan {
    pub params: PlanParams,
    pub gates: QueryGates,
    /// Straight-line distance estimate used by the gates, metres
    pub distance_m: f64,
}

impl PreparedPlan {
    /// True when origin and destination are distinct points or via
    /// points force a real route. Secondary variants are only worth
    /// fetching when this holds.
    pub fn has_distinct_endpoints(&self) -> bool {
        !self.params.from.same_point(&self.params.to)
            || !self.params.intermediate_places.is_empty()
    }
}

/// Normalise a query into the full parameter set.
pub fn prepare_plan(
    query: &PlanQuery,
    settings: &UserSettings,
    config: &AppConfig,
) -> PreparedPlan {
    let wheelchair = settings.wheelchair();
    let distance_m = estimated_distance(&query.from, &query.to, &query.intermediate_places);

    // User modes, restricted to what the deployment offers, with
    // walking always present for the transfers.
    let mut modes: Vec<Mode> = parse_modes(&settings.modes)
        .into_iter()
        .filter(|m| !m.is_transit() || config.transport_modes.contains(&m.mode))
        .collect();
    modes.push(Mode::plain(TransportMode::Walk));
    modes.sort();
    modes.dedup();

    let transit_modes: Vec<Mode> = modes.iter().copied().filter(Mode::is_transit).collect();

    // Rapid transit is worth cycling to; buses and trams are not.
    let mut bike_and_public_modes = vec![Mode::plain(TransportMode::Bicycle)];
    for rapid in [TransportMode::Subway, TransportMode::Rail] {
        if transit_modes.iter().any(|m| m.mode == rapid) {
            bike_and_public_modes.push(Mode::plain(rapid));
        }
    }

    let mut bike_park_modes = vec![Mode::qualified(TransportMode::Bicycle, Qualifier::Park)];
    bike_park_modes.extend(transit_modes.iter().copied());

    let mut car_park_modes = vec![Mode::qualified(TransportMode::Car, Qualifier::Park)];
    car_park_modes.extend(transit_modes.iter().copied());

    let mut all_modes: Vec<Mode> = config
        .transport_modes
        .iter()
        .map(|&m| Mode::plain(m))
        .collect();
    all_modes.push(Mode::plain(TransportMode::Walk));
    all_modes.sort();
    all_modes.dedup();

    let gates = QueryGates {
        walk: !wheelchair && distance_m < config.suggest_walk_max_distance,
        bike: !wheelchair
            && settings.include_bike_suggestions
            && distance_m < config.suggest_bike_max_distance,
        bike_and_public: !wheelchair
            && config.show_bike_and_public_itineraries
            && settings.include_bike_suggestions,
        bike_park: !wheelchair
            && config.show_bike_and_park_itineraries
            && settings.include_bike_suggestions,
        car: config.include_car_suggestions
            && settings.include_car_suggestions
            && distance_m > config.suggest_car_min_distance,
        park_ride: config.include_park_and_ride_suggestions
            && distance_m > config.suggest_car_min_distance,
    };

    let params = PlanParams {
        from: query.from.clone(),
        to: query.to.clone(),
        intermediate_places: query.intermediate_places.clone(),
        time_ms: query.time_ms,
        arrive_by: query.arrive_by,
        num_itineraries: DEFAULT_NUM_ITINERARIES,
        wheelchair,
        walk_reluctance: settings.walk_reluctance,
        walk_board_cost: settings.walk_board_cost,
        min_transfer_time: settings.min_transfer_time,
        transfer_penalty: settings.transfer_penalty,
        walk_speed: find_nearest_option(settings.walk_speed, &config.walk_speed_options),
        bike_speed: find_nearest_option(settings.bike_speed, &config.bike_speed_options),
        optimize: settings.optimize,
        triangle: settings.triangle,
        ticket_types: settings.ticket_restriction(),
        itinerary_filtering: config.itinerary_filtering,
        locale: query
            .locale
            .clone()
            .unwrap_or_else(|| config.locale.clone()),
        disable_remaining_weight_heuristic: modes.iter().any(Mode::is_bike_rental),
        bike_and_public_disable_heuristic: !query.intermediate_places.is_empty(),
        user_changed_modes: settings.has_changed_modes(&config.default_settings),
        modes,
        bike_and_public_modes,
        bike_park_modes,
        car_park_modes,
        all_modes,
    };

    PreparedPlan {
        params,
        gates,
        distance_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helsinki city centre to Pasila, roughly 3.2 km apart
    fn query() -> PlanQuery {
        PlanQuery {
            from: Location::named("Rautatientori", 60.1719, 24.9414),
            to: Location::named("Pasila", 60.1987, 24.9337),
            intermediate_places: vec![],
            time_ms: 1_756_200_000_000,
            arrive_by: false,
            locale: None,
        }
    }

    fn prepare(settings: &UserSettings) -> PreparedPlan {
        prepare_plan(&query(), settings, &AppConfig::default())
    }

    #[test]
    fn default_gates_for_city_trip() {
        let prepared = prepare(&UserSettings::default());

        assert!(prepared.gates.walk);
        assert!(prepared.gates.bike);
        assert!(prepared.gates.bike_and_public);
        assert!(prepared.gates.bike_park);
        assert!(prepared.gates.car);
        assert!(prepared.gates.park_ride);
        assert!(prepared.has_distinct_endpoints());
    }

    #[test]
    fn wheelchair_disables_street_suggestions() {
        let mut settings = UserSettings::default();
        settings.accessibility_option = 1;
        let prepared = prepare(&settings);

        assert!(prepared.params.wheelchair);
        assert!(!prepared.gates.walk);
        assert!(!prepared.gates.bike);
        assert!(!prepared.gates.bike_and_public);
        assert!(!prepared.gates.bike_park);
        // Driving is unaffected by accessibility
        assert!(prepared.gates.car);
    }

    #[test]
    fn long_trip_disables_walk_suggestion() {
        let far_query = PlanQuery {
            to: Location::named("Tampere", 61.4978, 23.7610),
            ..query()
        };
        let prepared = prepare_plan(&far_query, &UserSettings::default(), &AppConfig::default());

        assert!(prepared.distance_m > 100_000.0);
        assert!(!prepared.gates.walk);
        assert!(!prepared.gates.bike);
        assert!(prepared.gates.car);
    }

    #[test]
    fn short_trip_disables_car_suggestion() {
        // Two points a few hundred metres apart
        let near_query = PlanQuery {
            to: Location::named("Kaisaniemi", 60.1750, 24.9450),
            ..query()
        };
        let prepared = prepare_plan(&near_query, &UserSettings::default(), &AppConfig::default());

        assert!(prepared.distance_m < 2_000.0);
        assert!(!prepared.gates.car);
        assert!(!prepared.gates.park_ride);
        assert!(prepared.gates.walk);
    }

    #[test]
    fn disabled_bike_suggestions() {
        let mut settings = UserSettings::default();
        settings.include_bike_suggestions = false;
        let prepared = prepare(&settings);

        assert!(!prepared.gates.bike);
        assert!(!prepared.gates.bike_and_public);
        assert!(!prepared.gates.bike_park);
        assert!(prepared.gates.walk);
    }

    #[test]
    fn modes_include_walk_and_drop_unknown() {
        let mut settings = UserSettings::default();
        settings.modes = vec!["BUS".into(), "HOVERCRAFT".into()];
        let prepared = prepare(&settings);

        assert_eq!(
            prepared.params.modes,
            vec![
                Mode::plain(TransportMode::Bus),
                Mode::plain(TransportMode::Walk)
            ]
        );
    }

    #[test]
    fn modes_restricted_to_deployment() {
        let mut config = AppConfig::default();
        config.transport_modes = vec![TransportMode::Bus];
        let mut settings = UserSettings::default();
        settings.modes = vec!["BUS".into(), "RAIL".into()];

        let prepared = prepare_plan(&query(), &settings, &config);
        assert!(
            !prepared
                .params
                .modes
                .contains(&Mode::plain(TransportMode::Rail))
        );
    }

    #[test]
    fn bike_and_public_modes_track_rapid_transit() {
        let prepared = prepare(&UserSettings::default());
        assert_eq!(
            prepared.params.bike_and_public_modes,
            vec![
                Mode::plain(TransportMode::Bicycle),
                Mode::plain(TransportMode::Subway),
                Mode::plain(TransportMode::Rail),
            ]
        );

        let mut settings = UserSettings::default();
        settings.modes = vec!["BUS".into(), "SUBWAY".into()];
        let prepared = prepare(&settings);
        assert_eq!(
            prepared.params.bike_and_public_modes,
            vec![
                Mode::plain(TransportMode::Bicycle),
                Mode::plain(TransportMode::Subway),
            ]
        );
    }

    #[test]
    fn park_modes_prepend_parking_leg() {
        let prepared = prepare(&UserSettings::default());

        assert_eq!(
            prepared.params.bike_park_modes[0],
            Mode::qualified(TransportMode::Bicycle, Qualifier::Park)
        );
        assert_eq!(
            prepared.params.car_park_modes[0],
            Mode::qualified(TransportMode::Car, Qualifier::Park)
        );
        // Transit modes follow
        assert!(
            prepared
                .params
                .bike_park_modes
                .contains(&Mode::plain(TransportMode::Bus))
        );
    }

    #[test]
    fn rental_bikes_disable_heuristic() {
        let mut settings = UserSettings::default();
        settings.modes.push("CITYBIKE".into());
        let prepared = prepare(&settings);
        assert!(prepared.params.disable_remaining_weight_heuristic);

        let plain = prepare(&UserSettings::default());
        assert!(!plain.params.disable_remaining_weight_heuristic);
    }

    #[test]
    fn via_points_disable_bike_public_heuristic() {
        let via_query = PlanQuery {
            intermediate_places: vec![Location::new(60.18, 24.95)],
            ..query()
        };
        let prepared = prepare_plan(&via_query, &UserSettings::default(), &AppConfig::default());

        assert!(prepared.params.bike_and_public_disable_heuristic);
        assert!(
            prepared
                .params
                .heuristic_disabled_for(PlanVariant::BikeAndPublic)
        );
        assert!(!prepared.params.heuristic_disabled_for(PlanVariant::Default));
    }

    #[test]
    fn speeds_snap_to_offered_options() {
        let mut settings = UserSettings::default();
        settings.walk_speed = 1.21;
        settings.bike_speed = 6.0;
        let prepared = prepare(&settings);

        assert_eq!(prepared.params.walk_speed, 1.2);
        assert_eq!(prepared.params.bike_speed, 5.55);
    }

    #[test]
    fn variant_mode_selection() {
        let prepared = prepare(&UserSettings::default());
        let params = &prepared.params;

        assert_eq!(
            params.modes_for(PlanVariant::Walk),
            vec![Mode::plain(TransportMode::Walk)]
        );
        assert_eq!(
            params.modes_for(PlanVariant::Bike),
            vec![Mode::plain(TransportMode::Bicycle)]
        );
        assert_eq!(
            params.modes_for(PlanVariant::Car),
            vec![Mode::plain(TransportMode::Car)]
        );
        assert_eq!(params.modes_for(PlanVariant::Default), params.modes);
        assert_eq!(params.modes_for(PlanVariant::AllModes), params.all_modes);
    }

    #[test]
    fn num_itineraries_is_fixed() {
        let prepared = prepare(&UserSettings::default());
        assert_eq!(prepared.params.num_itineraries, 5);
    }

    #[test]
    fn ticket_restriction_passes_through() {
        let mut settings = UserSettings::default();
        settings.ticket_types = Some("HSL_BC".into());
        let prepared = prepare(&settings);
        assert_eq!(prepared.params.ticket_types.as_deref(), Some("HSL:BC"));
    }

    #[test]
    fn locale_falls_back_to_config() {
        let prepared = prepare(&UserSettings::default());
        assert_eq!(prepared.params.locale, "en");

        let localized = PlanQuery {
            locale: Some("sv".into()),
            ..query()
        };
        let prepared =
            prepare_plan(&localized, &UserSettings::default(), &AppConfig::default());
        assert_eq!(prepared.params.locale, "sv");
    }

    #[test]
    fn same_point_search_has_no_distinct_endpoints() {
        let same = PlanQuery {
            to: query().from,
            ..query()
        };
        let prepared = prepare_plan(&same, &UserSettings::default(), &AppConfig::default());
        assert!(!prepared.has_distinct_endpoints());

        // Unless a via point forces a route
        let with_via = PlanQuery {
            to: query().from,
            intermediate_places: vec![Location::new(60.2, 24.9)],
            ..query()
        };
        let prepared =
            prepare_plan(&with_via, &UserSettings::default(), &AppConfig::default());
        assert!(prepared.has_distinct_endpoints());
    }

    #[test]
    fn at_time_shifts_only_time() {
        let prepared = prepare(&UserSettings::default());
        let shifted = prepared.params.at_time(1_756_300_000_000, true);

        assert_eq!(shifted.time_ms, 1_756_300_000_000);
        assert!(shifted.arrive_by);
        assert_eq!(shifted.modes, prepared.params.modes);
        assert_eq!(shifted.from, prepared.params.from);
    }
}
