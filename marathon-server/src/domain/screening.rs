//! Screening types.
//!
//! A `Screening` is one scheduled showing of a movie, in a specific
//! auditorium and format, at a specific start time. Screenings are
//! immutable facts supplied by the catalog for one search.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::TheaterCode;

/// Screen type assumed when the provider omits one.
pub const DEFAULT_SCREEN_TYPE: &str = "2D";

/// Stable movie identifier from the provider (its master movie code).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieCode(String);

impl MovieCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MovieCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MovieCode({})", self.0)
    }
}

impl fmt::Display for MovieCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One showing of a movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screening {
    /// Movie title as displayed by the theater.
    pub title: String,
    /// MPAA-style rating ("NR" when unknown).
    pub rating: String,
    /// Running time in minutes. Zero means the provider had no metadata.
    pub duration_minutes: u32,
    /// Theater-local start time.
    pub start: NaiveDateTime,
    /// Auditorium label; usually a number but not always.
    pub auditorium: String,
    /// Format tag such as "2D", "IMAX" or "RPX".
    pub screen_type: String,
    /// Human-readable amenity tags.
    pub attributes: BTreeSet<String>,
    /// Theater hosting this screening.
    pub theater: TheaterCode,
    /// Movie identifier.
    pub movie: MovieCode,
}

impl Screening {
    /// Returns the running time as a Duration.
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Returns the end time (`start + duration`).
    pub fn end(&self) -> NaiveDateTime {
        self.start + self.duration()
    }

    /// Whether the two screenings share any instant of screen time.
    ///
    /// Back-to-back screenings (one ends exactly when the other starts)
    /// do not overlap.
    pub fn overlaps(&self, other: &Screening) -> bool {
        !(self.end() <= other.start || self.start >= other.end())
    }

    /// Returns the auditorium as a number, if it is numeric.
    pub fn auditorium_number(&self) -> Option<u32> {
        self.auditorium.parse().ok()
    }

    /// Returns the attributes joined for display ("Dolby Atmos, Recliner").
    pub fn attributes_label(&self) -> String {
        self.attributes
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Screening builders shared by tests across the crate.

    use super::*;
    use chrono::NaiveDate;

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    /// Parse "HH:MM" on the fixture date; "+HH:MM" means the next day.
    pub fn at(s: &str) -> NaiveDateTime {
        let (day, hhmm) = match s.strip_prefix('+') {
            Some(rest) => (date().succ_opt().unwrap(), rest),
            None => (date(), s),
        };
        day.and_time(crate::domain::parse_hhmm(hhmm).unwrap())
    }

    pub fn theater(s: &str) -> TheaterCode {
        TheaterCode::parse(s).unwrap()
    }

    /// A 2D screening at theater "T1" whose movie code is derived from the title.
    pub fn show(title: &str, start: &str, duration: u32) -> Screening {
        show_at("T1", title, start, duration)
    }

    pub fn show_at(theater_code: &str, title: &str, start: &str, duration: u32) -> Screening {
        Screening {
            title: title.to_string(),
            rating: "PG-13".to_string(),
            duration_minutes: duration,
            start: at(start),
            auditorium: "1".to_string(),
            screen_type: DEFAULT_SCREEN_TYPE.to_string(),
            attributes: BTreeSet::new(),
            theater: theater(theater_code),
            movie: MovieCode::new(format!("HO{}", title.to_uppercase())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn end_time() {
        let s = show("A", "19:00", 125);
        assert_eq!(s.end(), at("21:05"));
    }

    #[test]
    fn end_time_crosses_midnight() {
        let s = show("A", "23:30", 90);
        assert_eq!(s.end(), at("+01:00"));
    }

    #[test]
    fn zero_duration_ends_at_start() {
        let s = show("A", "10:00", 0);
        assert_eq!(s.end(), s.start);
    }

    #[test]
    fn overlap_detection() {
        let a = show("A", "10:00", 120);
        let b = show("B", "11:00", 90);
        let c = show("C", "12:00", 90);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Back-to-back is not an overlap
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn auditorium_number() {
        let mut s = show("A", "10:00", 90);
        assert_eq!(s.auditorium_number(), Some(1));
        s.auditorium = "IMAX".to_string();
        assert_eq!(s.auditorium_number(), None);
    }

    #[test]
    fn attributes_label_sorted() {
        let mut s = show("A", "10:00", 90);
        s.attributes.insert("Recliner".to_string());
        s.attributes.insert("Dolby Atmos".to_string());
        assert_eq!(s.attributes_label(), "Dolby Atmos, Recliner");
    }

    #[test]
    fn movie_code_display() {
        let code = MovieCode::new("HO00012345");
        assert_eq!(code.to_string(), "HO00012345");
        assert_eq!(format!("{:?}", code), "MovieCode(HO00012345)");
    }
}
