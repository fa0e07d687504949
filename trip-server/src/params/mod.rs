//! Search parameter handling: user settings and plan preparation.

mod prepare;
mod settings;

pub use prepare::{
    DEFAULT_NUM_ITINERARIES, PlanParams, PlanQuery, PlanVariant, PreparedPlan, QueryGates,
    prepare_plan,
};
pub use settings::{OptimizeType, TriangleFactors, UserSettings, find_nearest_option};
