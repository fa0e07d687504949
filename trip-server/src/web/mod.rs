//! Web layer for the trip summary server.
//!
//! Provides HTTP endpoints for running plan summaries, paging them in
//! either direction and reading tracked vehicle positions.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
