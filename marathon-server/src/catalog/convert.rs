//! Conversion from showtimes DTOs to domain types.
//!
//! Performances become `Screening`s joined with their movie metadata;
//! movies without performances become `UpcomingTitle`s. A malformed
//! performance is skipped with a warning and never fails the document.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::domain::{DEFAULT_SCREEN_TYPE, MovieCode, Screening, TheaterCode};

use super::types::{AttributeDef, FutureShow, MovieMeta, Performance, ShowtimesDocument};
use super::{Catalog, UpcomingTitle};

/// Format of `CalendarShowTime`.
const SHOW_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Rating shown when the provider has none.
const UNRATED: &str = "NR";

/// Title shown when the provider has none.
const UNKNOWN_TITLE: &str = "Unknown";

/// Auditorium shown when the provider has none.
const UNKNOWN_AUDITORIUM: &str = "?";

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a show time
    #[error("invalid show time: {0}")]
    InvalidShowTime(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Movie metadata after defaults are applied.
struct MovieInfo {
    title: String,
    rating: String,
    duration_minutes: u32,
    opening: Option<NaiveDate>,
}

impl MovieInfo {
    fn from_dto(movie: &MovieMeta) -> Self {
        let duration_minutes = match &movie.duration {
            None => 0,
            Some(raw) => raw.as_u32().unwrap_or_else(|| {
                warn!(movie = %movie.master_movie_code, duration = %raw, "unreadable duration");
                0
            }),
        };

        Self {
            title: movie
                .title
                .clone()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            rating: movie.rating.clone().unwrap_or_else(|| UNRATED.to_string()),
            duration_minutes,
            opening: movie.regal_opening_date.as_deref().and_then(parse_opening_date),
        }
    }
}

/// Convert one theater's showtimes document.
pub fn convert_document(doc: &ShowtimesDocument, theater: &TheaterCode) -> Catalog {
    let attributes = attribute_names(doc.attributes.as_deref().unwrap_or(&[]));

    let movies = doc.movies.as_deref().unwrap_or(&[]);
    let meta: HashMap<&str, MovieInfo> = movies
        .iter()
        .map(|m| (m.master_movie_code.as_str(), MovieInfo::from_dto(m)))
        .collect();

    let films = doc
        .shows
        .as_ref()
        .and_then(|days| days.first())
        .and_then(|day| day.film.as_deref())
        .unwrap_or(&[]);

    let mut screenings = Vec::new();
    let mut active: HashSet<&str> = HashSet::new();

    for film in films {
        active.insert(film.master_movie_code.as_str());
        let info = meta.get(film.master_movie_code.as_str());
        let title = film
            .title
            .clone()
            .or_else(|| info.map(|i| i.title.clone()))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        for perf in film.performances.as_deref().unwrap_or(&[]) {
            match convert_performance(perf, &attributes) {
                Ok(slot) => screenings.push(Arc::new(Screening {
                    title: title.clone(),
                    rating: info.map_or_else(|| UNRATED.to_string(), |i| i.rating.clone()),
                    duration_minutes: info.map_or(0, |i| i.duration_minutes),
                    start: slot.start,
                    auditorium: slot.auditorium,
                    screen_type: slot.screen_type,
                    attributes: slot.attributes,
                    theater: theater.clone(),
                    movie: MovieCode::new(film.master_movie_code.clone()),
                })),
                Err(e) => {
                    warn!(theater = %theater, title = %title, "skipping performance: {e}");
                }
            }
        }
    }

    let upcoming = upcoming_titles(
        movies,
        &meta,
        &active,
        doc.future_shows.as_deref().unwrap_or(&[]),
    );

    Catalog {
        screenings,
        upcoming,
    }
}

/// Acronym to short name.
fn attribute_names(defs: &[AttributeDef]) -> HashMap<String, String> {
    defs.iter()
        .filter_map(|def| {
            let acronym = def.acronym.as_deref()?.trim();
            if acronym.is_empty() {
                return None;
            }
            let name = def.short_name.as_deref().unwrap_or_default().trim();
            Some((acronym.to_string(), name.to_string()))
        })
        .collect()
}

/// The per-performance fields of a screening.
struct Slot {
    start: NaiveDateTime,
    auditorium: String,
    screen_type: String,
    attributes: BTreeSet<String>,
}

fn convert_performance(
    perf: &Performance,
    attributes: &HashMap<String, String>,
) -> Result<Slot, ConversionError> {
    let raw = perf
        .calendar_show_time
        .as_deref()
        .ok_or(ConversionError::MissingField("CalendarShowTime"))?;
    let start = NaiveDateTime::parse_from_str(raw, SHOW_TIME_FORMAT)
        .map_err(|_| ConversionError::InvalidShowTime(raw.to_string()))?;

    let auditorium = perf
        .auditorium
        .as_ref()
        .map_or_else(|| UNKNOWN_AUDITORIUM.to_string(), |a| a.to_string());

    let screen_type = perf
        .performance_group
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .unwrap_or(DEFAULT_SCREEN_TYPE)
        .to_string();

    // Unknown acronyms are kept verbatim
    let attributes = perf
        .performance_attributes
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|code| {
            let code = code.trim();
            attributes
                .get(code)
                .cloned()
                .unwrap_or_else(|| code.to_string())
        })
        .collect();

    Ok(Slot {
        start,
        auditorium,
        screen_type,
        attributes,
    })
}

/// Parse `YYYY-MM-DD` from the start of an opening date.
fn parse_opening_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Format an upcoming date (`MM-DD-YYYY`) as "Mar 22"; unparseable input is
/// returned unchanged.
fn format_future_date(raw: &str) -> String {
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%m-%d-%Y").ok())
        .map_or_else(|| raw.to_string(), |d| d.format("%b %d").to_string())
}

fn upcoming_titles(
    movies: &[MovieMeta],
    meta: &HashMap<&str, MovieInfo>,
    active: &HashSet<&str>,
    future_shows: &[FutureShow],
) -> Vec<UpcomingTitle> {
    let scheduled: HashMap<&str, Vec<String>> = future_shows
        .iter()
        .filter_map(|fs| {
            let code = fs.ho_code.as_deref()?;
            let dates = fs
                .dates
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .filter_map(|d| d.date.as_deref())
                .map(format_future_date)
                .collect();
            Some((code, dates))
        })
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut upcoming: Vec<UpcomingTitle> = movies
        .iter()
        .map(|m| m.master_movie_code.as_str())
        .filter(|code| !active.contains(code) && seen.insert(*code))
        .filter_map(|code| {
            let info = meta.get(code)?;
            Some(UpcomingTitle {
                movie: MovieCode::new(code),
                title: info.title.clone(),
                rating: info.rating.clone(),
                duration_minutes: info.duration_minutes,
                opening: info.opening,
                scheduled_dates: scheduled.get(code).cloned().unwrap_or_default(),
            })
        })
        .collect();

    // Undated titles sort last
    upcoming.sort_by_key(|u| (u.opening.is_none(), u.opening));
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theater() -> TheaterCode {
        TheaterCode::parse("1234").unwrap()
    }

    fn document(json: &str) -> ShowtimesDocument {
        serde_json::from_str(json).unwrap()
    }

    const SAMPLE: &str = r#"{
        "attributes": [
            {"Acronym": "DA", "ShortName": "Dolby Atmos"},
            {"Acronym": " RCL ", "ShortName": " Recliner "}
        ],
        "movies": [
            {"MasterMovieCode": "HO001", "Title": "Dune: Part Two", "Rating": "PG-13", "Duration": "166"},
            {"MasterMovieCode": "HO002", "Title": "Wonka", "Duration": 116},
            {"MasterMovieCode": "HO003", "Title": "Furiosa", "Rating": "R", "RegalOpeningDate": "2024-05-24T00:00:00"},
            {"MasterMovieCode": "HO004", "Title": "Inside Out 2", "RegalOpeningDate": "2024-06-14"},
            {"MasterMovieCode": "HO005", "Title": "Mystery Screening"}
        ],
        "shows": [{
            "Film": [
                {
                    "MasterMovieCode": "HO001",
                    "Title": "Dune: Part Two",
                    "Performances": [
                        {"CalendarShowTime": "2024-03-15T19:00:00", "Auditorium": 7, "PerformanceGroup": "IMAX", "PerformanceAttributes": ["DA", "RCL"]},
                        {"CalendarShowTime": "not a time", "Auditorium": 7},
                        {"CalendarShowTime": "2024-03-15T22:40:00", "PerformanceAttributes": ["ZZ"]}
                    ]
                },
                {
                    "MasterMovieCode": "HO002",
                    "Title": "Wonka",
                    "Performances": [
                        {"CalendarShowTime": "2024-03-15T13:15:00", "Auditorium": "3"}
                    ]
                },
                {
                    "MasterMovieCode": "HO999",
                    "Title": "Fathom Event",
                    "Performances": [
                        {"CalendarShowTime": "2024-03-15T18:00:00", "Auditorium": "2"}
                    ]
                }
            ]
        }],
        "futureShows": [
            {"hoCode": "HO004", "dates": [{"date": "06-13-2024"}, {"date": "sometime"}]}
        ]
    }"#;

    #[test]
    fn converts_screenings() {
        let catalog = convert_document(&document(SAMPLE), &theater());

        // The malformed performance is skipped
        assert_eq!(catalog.screenings.len(), 4);

        let dune = &catalog.screenings[0];
        assert_eq!(dune.title, "Dune: Part Two");
        assert_eq!(dune.rating, "PG-13");
        assert_eq!(dune.duration_minutes, 166);
        assert_eq!(dune.auditorium, "7");
        assert_eq!(dune.screen_type, "IMAX");
        assert_eq!(dune.attributes_label(), "Dolby Atmos, Recliner");
        assert_eq!(dune.theater, theater());
        assert_eq!(dune.movie.as_str(), "HO001");
        assert_eq!(
            dune.start,
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn applies_defaults() {
        let catalog = convert_document(&document(SAMPLE), &theater());

        let late_dune = &catalog.screenings[1];
        assert_eq!(late_dune.auditorium, "?");
        assert_eq!(late_dune.screen_type, "2D");
        // Unknown acronym kept verbatim
        assert!(late_dune.attributes.contains("ZZ"));

        let wonka = &catalog.screenings[2];
        assert_eq!(wonka.rating, "NR");
        assert_eq!(wonka.duration_minutes, 116);

        // No metadata at all
        let event = &catalog.screenings[3];
        assert_eq!(event.title, "Fathom Event");
        assert_eq!(event.rating, "NR");
        assert_eq!(event.duration_minutes, 0);
    }

    #[test]
    fn upcoming_sorted_by_opening() {
        let catalog = convert_document(&document(SAMPLE), &theater());

        let titles: Vec<&str> = catalog.upcoming.iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["Furiosa", "Inside Out 2", "Mystery Screening"]);

        assert_eq!(catalog.upcoming[0].opening_label(), "May 24, 2024");
        assert_eq!(catalog.upcoming[2].opening_label(), "TBD");
        assert_eq!(
            catalog.upcoming[1].scheduled_dates,
            vec!["Jun 13".to_string(), "sometime".to_string()]
        );
    }

    #[test]
    fn empty_document() {
        let catalog = convert_document(&ShowtimesDocument::default(), &theater());
        assert!(catalog.screenings.is_empty());
        assert!(catalog.upcoming.is_empty());
    }

    #[test]
    fn only_first_show_day_used() {
        let doc = document(
            r#"{"shows": [
                {"Film": [{"MasterMovieCode": "HO1", "Title": "A", "Performances": [{"CalendarShowTime": "2024-03-15T10:00:00"}]}]},
                {"Film": [{"MasterMovieCode": "HO2", "Title": "B", "Performances": [{"CalendarShowTime": "2024-03-16T10:00:00"}]}]}
            ]}"#,
        );
        let catalog = convert_document(&doc, &theater());
        assert_eq!(catalog.screenings.len(), 1);
        assert_eq!(catalog.screenings[0].title, "A");
    }

    #[test]
    fn opening_date_parsing() {
        assert_eq!(
            parse_opening_date("2024-05-24T00:00:00"),
            NaiveDate::from_ymd_opt(2024, 5, 24)
        );
        assert_eq!(parse_opening_date("soon"), None);
        assert_eq!(parse_opening_date("2024-13-01"), None);
    }

    #[test]
    fn future_date_formatting() {
        assert_eq!(format_future_date("03-22-2024"), "Mar 22");
        assert_eq!(format_future_date("2024-03-22"), "2024-03-22");
        assert_eq!(format_future_date(""), "");
    }

    #[test]
    fn bad_show_time_error() {
        let perf = Performance {
            calendar_show_time: Some("2024-03-15 19:00".into()),
            auditorium: None,
            performance_group: None,
            performance_attributes: None,
        };
        assert_eq!(
            convert_performance(&perf, &HashMap::new()).err(),
            Some(ConversionError::InvalidShowTime("2024-03-15 19:00".into()))
        );

        let perf = Performance {
            calendar_show_time: None,
            ..perf
        };
        assert_eq!(
            convert_performance(&perf, &HashMap::new()).err(),
            Some(ConversionError::MissingField("CalendarShowTime"))
        );
    }
}
