//! Theater directory.
//!
//! Provides theater code → theater lookup, name and location search, and
//! the drive-time cluster around a primary theater, loaded from
//! `theatre_list.json` at startup.

mod directory;
mod error;

pub use directory::{SearchMode, Theater, TheaterDirectory};
pub use error::DirectoryError;
