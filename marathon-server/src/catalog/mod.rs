//! Showtimes catalog.
//!
//! The catalog supplies, for one theater and date, the flat list of
//! screenings and the titles not yet playing. Documents come from the
//! theater chain's per-day showtimes JSON; this module converts them into
//! domain types and hides where they were loaded from.
//!
//! Key characteristics of the source data:
//! - Times are theater-local and carry no offset
//! - Numeric fields (duration, auditorium) arrive as strings or numbers
//! - Screen type and attributes are optional per performance

mod convert;
mod error;
mod file;
mod types;

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{MovieCode, Screening, TheaterCode};

pub use convert::{ConversionError, convert_document};
pub use error::CatalogError;
pub use file::FileCatalog;
pub use types::{
    AttributeDef, Film, FutureDate, FutureShow, MovieMeta, Performance, ShowDay,
    ShowtimesDocument, StringOrNumber,
};

/// A title with no performances on the requested day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingTitle {
    pub movie: MovieCode,
    pub title: String,
    pub rating: String,
    pub duration_minutes: u32,
    /// Opening date, when the provider gave a readable one.
    pub opening: Option<NaiveDate>,
    /// Already-scheduled dates, formatted for display ("Mar 22").
    pub scheduled_dates: Vec<String>,
}

impl UpcomingTitle {
    /// Opening date for display ("May 24, 2024"), or "TBD".
    pub fn opening_label(&self) -> String {
        self.opening
            .map_or_else(|| "TBD".to_string(), |d| d.format("%b %d, %Y").to_string())
    }
}

/// Screenings and upcoming titles for one or more theaters on one day.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub screenings: Vec<Arc<Screening>>,
    pub upcoming: Vec<UpcomingTitle>,
}

impl Catalog {
    /// Distinct titles with at least one screening, sorted.
    pub fn titles(&self) -> Vec<&str> {
        let titles: BTreeSet<&str> = self.screenings.iter().map(|s| s.title.as_str()).collect();
        titles.into_iter().collect()
    }

    /// Distinct screen types, sorted.
    pub fn screen_types(&self) -> Vec<&str> {
        let types: BTreeSet<&str> = self
            .screenings
            .iter()
            .map(|s| s.screen_type.as_str())
            .collect();
        types.into_iter().collect()
    }

    /// Combine several theaters' catalogs.
    ///
    /// Screenings are concatenated in input order. An upcoming title listed
    /// by several theaters is kept once, and titles already screening
    /// somewhere are dropped from the upcoming list.
    pub fn merge<I>(catalogs: I) -> Self
    where
        I: IntoIterator<Item = Arc<Catalog>>,
    {
        let mut merged = Catalog::default();
        for catalog in catalogs {
            merged.screenings.extend(catalog.screenings.iter().cloned());
            for title in &catalog.upcoming {
                if !merged.upcoming.iter().any(|u| u.movie == title.movie) {
                    merged.upcoming.push(title.clone());
                }
            }
        }

        let screening: BTreeSet<&MovieCode> = merged.screenings.iter().map(|s| &s.movie).collect();
        merged.upcoming.retain(|u| !screening.contains(&u.movie));
        merged.upcoming.sort_by_key(|u| (u.opening.is_none(), u.opening));
        merged
    }
}

/// Source of per-theater showtimes.
///
/// This abstraction allows the cache and web layer to be tested without
/// files on disk.
pub trait CatalogProvider: Send + Sync {
    /// Load one theater's catalog for a day.
    fn showtimes(
        &self,
        theater: &TheaterCode,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Catalog, CatalogError>> + Send;
}
