//! Web layer for the marathon planner.
//!
//! Provides HTTP endpoints for finding theaters, browsing showtimes,
//! planning marathons and exporting them to a calendar.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
