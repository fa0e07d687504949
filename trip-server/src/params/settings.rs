//! User routing settings.
//!
//! Settings arrive from clients as loosely validated JSON (they are
//! persisted client-side and may come from older versions), so every
//! field has a default and stored values are normalised before use:
//! speeds snap to the nearest offered option and ticket restrictions
//! are mapped from their storage encoding.

use serde::{Deserialize, Serialize};

use crate::domain::parse_modes;

/// What the routing engine should optimise a bicycle route for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizeType {
    Quick,
    Safe,
    Flat,
    Greenways,
    Triangle,
}

impl OptimizeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizeType::Quick => "QUICK",
            OptimizeType::Safe => "SAFE",
            OptimizeType::Flat => "FLAT",
            OptimizeType::Greenways => "GREENWAYS",
            OptimizeType::Triangle => "TRIANGLE",
        }
    }
}

/// Weights for `TRIANGLE` optimisation. Only sent when the optimise
/// type is `Triangle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriangleFactors {
    pub safety_factor: f64,
    pub slope_factor: f64,
    pub time_factor: f64,
}

impl Default for TriangleFactors {
    fn default() -> Self {
        Self {
            safety_factor: 0.334,
            slope_factor: 0.333,
            time_factor: 0.333,
        }
    }
}

/// Per-user routing preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    /// Walking speed in m/s; snapped to the configured options
    pub walk_speed: f64,
    /// Cycling speed in m/s; snapped to the configured options
    pub bike_speed: f64,
    /// Multiplier making walking less attractive than riding
    pub walk_reluctance: f64,
    /// Cost of boarding a vehicle, in seconds-equivalent
    pub walk_board_cost: u32,
    /// Minimum transfer slack in seconds
    pub min_transfer_time: u32,
    /// Extra cost per transfer, in seconds-equivalent
    pub transfer_penalty: u32,
    /// Bicycle route optimisation target
    pub optimize: OptimizeType,
    /// Triangle weights, used when `optimize` is `TRIANGLE`
    pub triangle: TriangleFactors,
    /// Accessibility profile; `1` requests wheelchair routing
    pub accessibility_option: u8,
    /// Fare zone restriction in storage encoding (`"HSL_AB"`),
    /// `"none"` or absent for unrestricted
    pub ticket_types: Option<String>,
    /// Selected transport modes as settings strings
    pub modes: Vec<String>,
    /// Offer cycling and bike-with-transit suggestions
    pub include_bike_suggestions: bool,
    /// Offer driving suggestions
    pub include_car_suggestions: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            walk_speed: 1.2,
            bike_speed: 5.55,
            walk_reluctance: 2.0,
            walk_board_cost: 600,
            min_transfer_time: 120,
            transfer_penalty: 0,
            optimize: OptimizeType::Quick,
            triangle: TriangleFactors::default(),
            accessibility_option: 0,
            ticket_types: None,
            modes: ["BUS", "TRAM", "SUBWAY", "RAIL", "FERRY"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            include_bike_suggestions: true,
            include_car_suggestions: true,
        }
    }
}

impl UserSettings {
    /// True when wheelchair-accessible routing was requested.
    pub fn wheelchair(&self) -> bool {
        self.accessibility_option == 1
    }

    /// The fare restriction in endpoint form: storage underscores
    /// become colons, and the `"none"` sentinel (any case) means no
    /// restriction.
    pub fn ticket_restriction(&self) -> Option<String> {
        let raw = self.ticket_types.as_deref()?;
        if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
            return None;
        }
        Some(raw.replace('_', ":"))
    }

    /// True when the selected modes differ from the deployment's
    /// defaults. Unknown mode strings are ignored on both sides.
    pub fn has_changed_modes(&self, defaults: &UserSettings) -> bool {
        parse_modes(&self.modes) != parse_modes(&defaults.modes)
    }
}

/// Snap a stored value to the nearest offered option.
///
/// Stored speeds may predate a change to the offered options, so the
/// closest remaining option is used. Ties resolve to the earlier
/// option. An empty option list returns the value unchanged.
pub fn find_nearest_option(value: f64, options: &[f64]) -> f64 {
    let mut nearest = match options.first() {
        Some(&first) => first,
        None => return value,
    };
    let mut diff = (value - nearest).abs();
    for &option in &options[1..] {
        let new_diff = (value - option).abs();
        if new_diff < diff {
            diff = new_diff;
            nearest = option;
        }
    }
    nearest
}
