//! Search entry point: validate, enumerate, rank, explain.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::Screening;
use crate::drive::DriveTimes;

use super::config::{ParamError, SearchParams};
use super::conflict::explain_missing;
use super::enumerate::Enumerator;
use super::rank::{RankedItinerary, rank_and_select};

/// Message shown when a search completes without any itinerary.
pub const NO_SCHEDULES: &str = "no valid schedules found";

/// Error from itinerary search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// A parameter is out of range
    #[error(transparent)]
    Params(#[from] ParamError),
}

/// Request for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Titles to fit in, highest priority first.
    pub titles: Vec<String>,

    /// The day being planned.
    pub date: NaiveDate,

    /// Constraints.
    pub params: SearchParams,
}

impl SearchRequest {
    /// Create a new search request.
    pub fn new(titles: Vec<String>, date: NaiveDate, params: SearchParams) -> Self {
        Self {
            titles,
            date,
            params,
        }
    }

    /// Titles with blanks and repeats removed, in priority order.
    pub fn distinct_titles(&self) -> Vec<String> {
        let mut distinct: Vec<String> = Vec::with_capacity(self.titles.len());
        for title in &self.titles {
            let title = title.trim();
            if !title.is_empty() && !distinct.iter().any(|t| t == title) {
                distinct.push(title.to_string());
            }
        }
        distinct
    }

    /// Validate the search request.
    pub fn validate(&self) -> Result<(), SearchError> {
        let count = self.distinct_titles().len();
        if count < 2 {
            return Err(SearchError::InvalidRequest(
                "select at least 2 movies".to_string(),
            ));
        }

        self.params.validate(count)?;
        Ok(())
    }
}

/// A selected itinerary plus explanations for the titles it leaves out.
#[derive(Debug, Clone)]
pub struct PlanOption {
    pub ranked: RankedItinerary,
    pub conflicts: Vec<String>,
}

/// Result of itinerary search.
#[derive(Debug, Clone)]
pub struct PlanResult {
    /// Selected options, in presentation order.
    pub options: Vec<PlanOption>,

    /// Number of maximal itineraries the enumerator produced.
    pub itineraries_found: usize,

    /// Number of (path, screening) pairs tested.
    pub candidates_checked: usize,
}

impl PlanResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self {
            options: Vec::new(),
            itineraries_found: 0,
            candidates_checked: 0,
        }
    }

    /// Whether no itinerary was found.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Itinerary planner over one cluster's screenings for a day.
pub struct Planner<'a> {
    screenings: &'a [Arc<Screening>],
    drive: &'a DriveTimes,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(screenings: &'a [Arc<Screening>], drive: &'a DriveTimes) -> Self {
        Self { screenings, drive }
    }

    /// Search for itineraries covering the requested titles.
    pub fn plan(&self, request: &SearchRequest) -> Result<PlanResult, SearchError> {
        request.validate()?;

        let titles = request.distinct_titles();
        let params = &request.params;

        let enumeration =
            Enumerator::new(&titles, self.screenings, params, request.date, self.drive).run();
        let itineraries_found = enumeration.itineraries.len();
        let candidates_checked = enumeration.candidates_checked;

        if itineraries_found == 0 {
            info!(titles = titles.len(), "{}", NO_SCHEDULES);
            return Ok(PlanResult {
                candidates_checked,
                ..PlanResult::empty()
            });
        }

        let ranked = rank_and_select(
            enumeration.itineraries,
            &titles,
            self.drive,
            params.preferred_theater(),
        );

        let options = ranked
            .into_iter()
            .map(|ranked| {
                let missing = ranked.itinerary.missing_titles(&titles);
                let conflicts =
                    explain_missing(&ranked.itinerary, &missing, self.screenings, params);
                PlanOption { ranked, conflicts }
            })
            .collect::<Vec<_>>();

        info!(
            titles = titles.len(),
            found = itineraries_found,
            options = options.len(),
            "itinerary search finished"
        );

        Ok(PlanResult {
            options,
            itineraries_found,
            candidates_checked,
        })
    }
}
