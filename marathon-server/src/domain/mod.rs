//! Domain types for the marathon planner.
//!
//! This module contains the core domain model: theaters, screenings and
//! itineraries. Types enforce their invariants at construction time, so
//! code that receives them can trust their validity.

mod error;
mod itinerary;
pub(crate) mod screening;
mod theater;
mod time;

pub use error::DomainError;
pub use itinerary::{Itinerary, ItineraryKey};
pub use screening::{DEFAULT_SCREEN_TYPE, MovieCode, Screening};
pub use theater::{InvalidTheaterCode, TheaterCode};
pub use time::{TimeError, format_clock, is_end_of_day, parse_hhmm, parse_time_bound};
