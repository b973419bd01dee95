//! Data transfer objects for the web API.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::catalog::UpcomingTitle;
use crate::domain::{InvalidTheaterCode, Screening, TheaterCode, TimeError, parse_time_bound};
use crate::explorer::{ScreeningFilter, SortKey, TimeOfDay};
use crate::planner::{PlanOption, PlanResult, SearchParams, SearchRequest};
use crate::theaters::{SearchMode, Theater};

/// Date format for request and response dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format for screening start/end in JSON.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A request field that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid theater code {code:?}: {source}")]
    Theater {
        code: String,
        #[source]
        source: InvalidTheaterCode,
    },

    #[error("Invalid {field}: {source}")]
    Time {
        field: &'static str,
        #[source]
        source: TimeError,
    },

    #[error("Invalid date {0:?}: expected YYYY-MM-DD")]
    Date(String),

    #[error("Invalid time of day {0:?}: expected morning, afternoon, evening or night")]
    TimeOfDay(String),
}

fn parse_theater(code: &str) -> Result<TheaterCode, RequestError> {
    TheaterCode::parse(code).map_err(|source| RequestError::Theater {
        code: code.to_string(),
        source,
    })
}

/// Parse a request date, falling back to `today` when absent or blank.
pub fn parse_date(date: Option<&str>, today: NaiveDate) -> Result<NaiveDate, RequestError> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(today),
        Some(d) => {
            NaiveDate::parse_from_str(d, DATE_FORMAT).map_err(|_| RequestError::Date(d.to_string()))
        }
    }
}

/// Split a comma-separated query value into trimmed, non-empty items.
fn split_list(value: Option<&str>) -> BTreeSet<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_time_of_day(s: &str) -> Result<TimeOfDay, RequestError> {
    match s.to_ascii_lowercase().as_str() {
        "morning" => Ok(TimeOfDay::Morning),
        "afternoon" => Ok(TimeOfDay::Afternoon),
        "evening" => Ok(TimeOfDay::Evening),
        "night" => Ok(TimeOfDay::Night),
        _ => Err(RequestError::TimeOfDay(s.to_string())),
    }
}

/// Request to search theaters.
#[derive(Debug, Deserialize)]
pub struct TheaterSearchRequest {
    /// Query string.
    pub q: String,

    /// How to match the query (defaults to name).
    pub by: Option<SearchMode>,

    /// Maximum results (default 10, capped at 50).
    pub limit: Option<usize>,
}

/// A theater in search results.
#[derive(Debug, Serialize)]
pub struct TheaterResult {
    pub code: String,
    pub name: String,
    pub label: String,
    pub address: String,
    pub city: String,
    pub state: String,
    /// Codes of theaters in this one's drive cluster.
    pub nearby: Vec<String>,
}

impl TheaterResult {
    pub fn from_theater(theater: &Theater) -> Self {
        Self {
            code: theater.code.to_string(),
            name: theater.name.clone(),
            label: theater.label(),
            address: theater.address.clone(),
            city: theater.city.clone(),
            state: theater.state.clone(),
            nearby: theater.nearby.iter().map(|(c, _)| c.to_string()).collect(),
        }
    }
}

/// Response for theater search.
#[derive(Debug, Serialize)]
pub struct TheaterSearchResponse {
    pub theaters: Vec<TheaterResult>,
}

/// Query for browsing a day's schedule.
///
/// List-valued filters are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct ShowtimesQuery {
    /// Primary theater code.
    pub theater: String,

    /// Day in YYYY-MM-DD (defaults to today).
    pub date: Option<String>,

    /// Include the theater's nearby cluster.
    #[serde(default)]
    pub cluster: bool,

    pub screen_types: Option<String>,
    pub ratings: Option<String>,
    pub auditoriums: Option<String>,
    pub attributes: Option<String>,

    /// Time-of-day blocks, e.g. "evening,night".
    pub times: Option<String>,

    pub sort: Option<SortKey>,

    /// Hide screenings that have already started.
    #[serde(default)]
    pub hide_past: bool,
}

impl ShowtimesQuery {
    pub fn theater_code(&self) -> Result<TheaterCode, RequestError> {
        parse_theater(&self.theater)
    }

    /// Build the screening filter. `now` is used only when hiding past shows.
    pub fn filter(&self, now: NaiveDateTime) -> Result<ScreeningFilter, RequestError> {
        let times = split_list(self.times.as_deref())
            .iter()
            .map(|t| parse_time_of_day(t))
            .collect::<Result<_, _>>()?;

        Ok(ScreeningFilter {
            screen_types: split_list(self.screen_types.as_deref()),
            ratings: split_list(self.ratings.as_deref()),
            auditoriums: split_list(self.auditoriums.as_deref()),
            attributes: split_list(self.attributes.as_deref()),
            times,
            after: self.hide_past.then_some(now),
        })
    }
}

/// A screening in API responses.
#[derive(Debug, Serialize)]
pub struct ScreeningResult {
    pub title: String,
    pub movie_code: String,
    pub rating: String,
    pub duration_minutes: u32,
    /// Start as `YYYY-MM-DDTHH:MM:SS`, theater-local.
    pub start: String,
    pub end: String,
    /// 12-hour clock, e.g. "7:30 PM".
    pub start_label: String,
    pub auditorium: String,
    pub screen_type: String,
    pub attributes: Vec<String>,
    pub theater: String,
}

impl ScreeningResult {
    pub fn from_screening(s: &Screening) -> Self {
        Self {
            title: s.title.clone(),
            movie_code: s.movie.to_string(),
            rating: s.rating.clone(),
            duration_minutes: s.duration_minutes,
            start: s.start.format(TIMESTAMP_FORMAT).to_string(),
            end: s.end().format(TIMESTAMP_FORMAT).to_string(),
            start_label: crate::domain::format_clock(s.start),
            auditorium: s.auditorium.clone(),
            screen_type: s.screen_type.clone(),
            attributes: s.attributes.iter().cloned().collect(),
            theater: s.theater.to_string(),
        }
    }
}

/// A title that is not screening yet.
#[derive(Debug, Serialize)]
pub struct UpcomingResult {
    pub title: String,
    pub rating: String,
    pub duration_minutes: u32,
    /// "Mar 15, 2024" or "TBD".
    pub opening: String,
    pub scheduled_dates: Vec<String>,
}

impl UpcomingResult {
    pub fn from_upcoming(u: &UpcomingTitle) -> Self {
        Self {
            title: u.title.clone(),
            rating: u.rating.clone(),
            duration_minutes: u.duration_minutes,
            opening: u.opening_label(),
            scheduled_dates: u.scheduled_dates.clone(),
        }
    }
}

/// Response for schedule browsing.
#[derive(Debug, Serialize)]
pub struct ShowtimesResponse {
    pub date: String,
    /// Every title screening in the loaded theaters, before filtering.
    pub titles: Vec<String>,
    /// Every screen type available, before filtering.
    pub screen_types: Vec<String>,
    pub screenings: Vec<ScreeningResult>,
    pub upcoming: Vec<UpcomingResult>,
}

fn default_buffer() -> i64 {
    SearchParams::default().buffer_mins
}

fn default_gap() -> i64 {
    SearchParams::default().gap_cap_mins
}

fn default_break() -> i64 {
    SearchParams::default().break_mins
}

/// Request to plan a marathon.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    /// Primary theater code; its cluster supplies drive times.
    pub theater: String,

    /// Day in YYYY-MM-DD (defaults to today).
    #[serde(default)]
    pub date: Option<String>,

    /// Titles, highest priority first.
    pub titles: Vec<String>,

    /// "HH:MM" or "any".
    #[serde(default)]
    pub earliest_start: Option<String>,

    /// "HH:MM" or "any".
    #[serde(default)]
    pub latest_end: Option<String>,

    #[serde(default = "default_buffer")]
    pub buffer: i64,

    #[serde(default = "default_gap")]
    pub max_gap: i64,

    #[serde(default)]
    pub unlimited: bool,

    #[serde(default)]
    pub fudge: bool,

    /// Take a long break after this many screenings.
    #[serde(default)]
    pub break_after: Option<usize>,

    #[serde(default = "default_break")]
    pub break_mins: i64,

    /// Allowed screen types; empty allows all.
    #[serde(default)]
    pub formats: Vec<String>,

    /// Allowed theater codes, most preferred first; empty allows the cluster.
    #[serde(default)]
    pub theaters: Vec<String>,
}

impl PlanRequest {
    /// The primary theater.
    pub fn theater_code(&self) -> Result<TheaterCode, RequestError> {
        parse_theater(&self.theater)
    }

    /// Convert to a planner request for the given default day.
    pub fn to_search(&self, today: NaiveDate) -> Result<SearchRequest, RequestError> {
        let date = parse_date(self.date.as_deref(), today)?;

        let bound = |field: &'static str, value: &Option<String>| {
            parse_time_bound(value.as_deref().unwrap_or_default())
                .map_err(|source| RequestError::Time { field, source })
        };

        let theaters = self
            .theaters
            .iter()
            .map(|t| parse_theater(t))
            .collect::<Result<Vec<_>, _>>()?;

        let params = SearchParams {
            earliest_start: bound("earliest start", &self.earliest_start)?,
            latest_end: bound("latest end", &self.latest_end)?,
            buffer_mins: self.buffer,
            gap_cap_mins: self.max_gap,
            unlimited: self.unlimited,
            fudge: self.fudge,
            break_after: self.break_after,
            break_mins: self.break_mins,
            formats: self.formats.iter().map(|f| f.trim().to_string()).collect(),
            theaters,
        };

        Ok(SearchRequest::new(self.titles.clone(), date, params))
    }
}

/// Request to export one planned option as a calendar.
#[derive(Debug, Deserialize)]
pub struct CalendarRequest {
    #[serde(flatten)]
    pub plan: PlanRequest,

    /// Zero-based option index from the plan response.
    pub option: usize,
}

/// One selected itinerary.
#[derive(Debug, Serialize)]
pub struct OptionResult {
    pub rationale: String,
    pub score: f64,
    pub count: usize,
    pub hops: usize,
    pub total_miles: f64,
    pub total_gap_mins: i64,
    pub screenings: Vec<ScreeningResult>,
    /// Why each requested title is missing.
    pub conflicts: Vec<String>,
}

impl OptionResult {
    pub fn from_option(option: &PlanOption) -> Self {
        let metrics = &option.ranked.metrics;
        Self {
            rationale: option.ranked.rationale.label().to_string(),
            score: metrics.score,
            count: metrics.count,
            hops: metrics.hops,
            total_miles: metrics.total_miles,
            total_gap_mins: metrics.total_gap_mins,
            screenings: option
                .ranked
                .itinerary
                .screenings()
                .iter()
                .map(|s| ScreeningResult::from_screening(s))
                .collect(),
            conflicts: option.conflicts.clone(),
        }
    }
}

/// Response for marathon planning.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub date: String,
    pub options: Vec<OptionResult>,
    pub itineraries_found: usize,
    pub candidates_checked: usize,
    /// Set when no option was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlanResponse {
    pub fn from_result(date: NaiveDate, result: &PlanResult) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            options: result.options.iter().map(OptionResult::from_option).collect(),
            itineraries_found: result.itineraries_found,
            candidates_checked: result.candidates_checked,
            message: result
                .is_empty()
                .then(|| crate::planner::NO_SCHEDULES.to_string()),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
