//! Itinerary types.
//!
//! An `Itinerary` is an ordered run of screenings a single viewer can
//! attend on one day, at most one per requested title.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};

use super::{DomainError, MovieCode, Screening, TheaterCode};

/// Identity of an itinerary: its `(movie, start)` pairs in order.
///
/// Two itineraries with the same screenings in the same order are the same
/// itinerary, however they were discovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItineraryKey(Vec<(MovieCode, NaiveDateTime)>);

impl fmt::Display for ItineraryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (movie, start)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{}@{}", movie, start.format("%Y%m%dT%H%M"))?;
        }
        Ok(())
    }
}

/// An ordered sequence of screenings.
///
/// # Invariants
///
/// - At least one screening
/// - Start times strictly increase
#[derive(Debug, Clone)]
pub struct Itinerary {
    screenings: Vec<Arc<Screening>>,
}

impl Itinerary {
    /// Constructs an itinerary from screenings in viewing order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the list is empty or start times do not strictly
    /// increase.
    pub fn new(screenings: Vec<Arc<Screening>>) -> Result<Self, DomainError> {
        if screenings.is_empty() {
            return Err(DomainError::EmptyItinerary);
        }

        for pair in screenings.windows(2) {
            if pair[1].start <= pair[0].start {
                return Err(DomainError::OutOfOrder {
                    earlier: pair[0].title.clone(),
                    later: pair[1].title.clone(),
                });
            }
        }

        Ok(Self { screenings })
    }

    /// Returns the screenings in viewing order.
    pub fn screenings(&self) -> &[Arc<Screening>] {
        &self.screenings
    }

    /// Number of screenings.
    pub fn len(&self) -> usize {
        self.screenings.len()
    }

    /// Always false; itineraries are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.screenings.is_empty()
    }

    /// Returns the first screening.
    pub fn first(&self) -> &Screening {
        &self.screenings[0]
    }

    /// Returns the last screening.
    pub fn last(&self) -> &Screening {
        &self.screenings[self.screenings.len() - 1]
    }

    /// When the first show starts.
    pub fn start(&self) -> NaiveDateTime {
        self.first().start
    }

    /// When the last show ends.
    pub fn end(&self) -> NaiveDateTime {
        self.last().end()
    }

    /// Returns the titles in viewing order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.screenings.iter().map(|s| s.title.as_str())
    }

    /// Whether a screening of `title` is part of this itinerary.
    pub fn contains_title(&self, title: &str) -> bool {
        self.titles().any(|t| t == title)
    }

    /// Requested titles that this itinerary does not include, in request order.
    pub fn missing_titles<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        requested
            .iter()
            .map(String::as_str)
            .filter(|t| !self.contains_title(t))
            .collect()
    }

    /// Whether every screening is hosted by `theater`.
    pub fn only_at(&self, theater: &TheaterCode) -> bool {
        self.screenings.iter().all(|s| &s.theater == theater)
    }

    /// Consecutive pairs whose theaters differ.
    pub fn theater_changes(&self) -> impl Iterator<Item = (&TheaterCode, &TheaterCode)> {
        self.screenings
            .windows(2)
            .filter(|pair| pair[0].theater != pair[1].theater)
            .map(|pair| (&pair[0].theater, &pair[1].theater))
    }

    /// Number of theater changes.
    pub fn hop_count(&self) -> usize {
        self.theater_changes().count()
    }

    /// Idle time between consecutive screenings (end of one to start of next).
    ///
    /// Negative contributions only arise when the fudge allowance let a
    /// show start before the previous one finished.
    pub fn total_gap(&self) -> Duration {
        self.screenings
            .windows(2)
            .map(|pair| pair[1].start.signed_duration_since(pair[0].end()))
            .fold(Duration::zero(), |acc, gap| acc + gap)
    }

    /// Returns the identity key.
    pub fn key(&self) -> ItineraryKey {
        ItineraryKey(
            self.screenings
                .iter()
                .map(|s| (s.movie.clone(), s.start))
                .collect(),
        )
    }
}
