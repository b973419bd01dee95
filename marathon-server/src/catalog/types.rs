//! Showtimes document DTOs.
//!
//! These types map directly to the theater chain's per-day showtimes JSON.
//! They use `Option` liberally because the provider omits fields rather than
//! sending null values, and several numeric fields arrive as either strings
//! or numbers depending on the theater.

use std::fmt;

use serde::Deserialize;

/// One theater's showtimes for one day.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimesDocument {
    /// Attribute glossary, mapping acronyms to short names.
    pub attributes: Option<Vec<AttributeDef>>,

    /// Metadata for every movie the theater knows about, including titles
    /// not yet playing.
    pub movies: Option<Vec<MovieMeta>>,

    /// Showing days. Only the first entry is used.
    pub shows: Option<Vec<ShowDay>>,

    /// Upcoming dates for titles not yet playing.
    pub future_shows: Option<Vec<FutureShow>>,
}

/// A performance attribute definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDef {
    /// Code used in `PerformanceAttributes` (e.g., "DA").
    pub acronym: Option<String>,

    /// Display name (e.g., "Dolby Atmos").
    pub short_name: Option<String>,
}

/// Movie metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieMeta {
    /// Stable movie identifier (e.g., "HO00012345").
    pub master_movie_code: String,

    pub title: Option<String>,

    /// MPAA-style rating.
    pub rating: Option<String>,

    /// Running time in minutes.
    pub duration: Option<StringOrNumber>,

    /// Opening date; only the first ten characters (`YYYY-MM-DD`) matter.
    pub regal_opening_date: Option<String>,
}

/// A showing day.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShowDay {
    /// Films with performances on this day.
    pub film: Option<Vec<Film>>,
}

/// A film and its performances.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Film {
    pub master_movie_code: String,

    pub title: Option<String>,

    pub performances: Option<Vec<Performance>>,
}

/// One scheduled performance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Performance {
    /// Local start, `YYYY-MM-DDTHH:MM:SS`.
    pub calendar_show_time: Option<String>,

    /// Auditorium; usually a number, sometimes a label.
    pub auditorium: Option<StringOrNumber>,

    /// Screen type (e.g., "IMAX", "RPX"); absent means 2D.
    pub performance_group: Option<String>,

    /// Attribute acronyms.
    pub performance_attributes: Option<Vec<String>>,
}

/// Upcoming dates for a title.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureShow {
    /// Movie identifier, matching `MovieMeta::master_movie_code`.
    pub ho_code: Option<String>,

    pub dates: Option<Vec<FutureDate>>,
}

/// A single upcoming date.
#[derive(Debug, Clone, Deserialize)]
pub struct FutureDate {
    /// `MM-DD-YYYY`.
    pub date: Option<String>,
}

/// A JSON value the provider sends as either a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    /// Interpret as a whole number, if possible.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            StringOrNumber::String(s) => s.trim().parse().ok(),
            StringOrNumber::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        }
    }
}

impl fmt::Display for StringOrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringOrNumber::String(s) => f.write_str(s),
            StringOrNumber::Number(n) => write!(f, "{n}"),
        }
    }
}
