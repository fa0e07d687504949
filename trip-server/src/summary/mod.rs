//! Multi-plan summary orchestration.
//!
//! For one search this module fans out the primary plan query and its
//! gated street-mode variants, merges the results into an addressable
//! summary, pages the shown time window later and earlier, and keeps
//! the active selection, weather hint and vehicle topics derived from
//! whatever is currently shown.

mod orchestrator;
mod paging;
mod selection;
mod state;

pub use orchestrator::SummaryService;
pub use paging::PagingOutcome;
pub use selection::{PlanSelection, SelectionKind};
pub use state::{
    ActivePlan, FetchState, PagingDirection, PagingTerminal, SlotSnapshot, SummaryError,
    SummarySnapshot, SummaryState,
};
