//! Constraint parameters for itinerary search.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::{Screening, TheaterCode, is_end_of_day};

/// Allowed buffer between shows (minutes).
pub const BUFFER_RANGE: RangeInclusive<i64> = 0..=60;

/// Allowed maximum gap between shows (minutes).
pub const GAP_CAP_RANGE: RangeInclusive<i64> = 30..=240;

/// Allowed long-break duration (minutes).
pub const BREAK_RANGE: RangeInclusive<i64> = 30..=120;

/// Minimum start-to-start spacing under the unlimited-pass rule (minutes).
pub const UNLIMITED_SPACING_MINS: i64 = 91;

/// How much earlier the previous show is treated as ending under fudge (minutes).
pub const FUDGE_MINS: i64 = 5;

/// How far past midnight the "end of day" sentinel stretches the window (hours).
pub const LATE_SHOW_GRACE_HOURS: i64 = 6;

/// Error returned when a parameter is outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("buffer must be between 0 and 60 minutes, got {0}")]
    Buffer(i64),

    #[error("maximum gap must be between 30 and 240 minutes, got {0}")]
    GapCap(i64),

    #[error("break duration must be between 30 and 120 minutes, got {0}")]
    BreakDuration(i64),

    #[error("long break position must be between 1 and {max}, got {got}")]
    BreakPosition { got: usize, max: usize },
}

/// User-supplied constraints for one itinerary search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Earliest start of the first show; `None` means midnight.
    pub earliest_start: Option<NaiveTime>,

    /// Latest end of the last show; `None` means the end-of-day sentinel.
    pub latest_end: Option<NaiveTime>,

    /// Minimum minutes between one show ending and the next starting.
    pub buffer_mins: i64,

    /// Maximum idle minutes allowed between consecutive shows.
    pub gap_cap_mins: i64,

    /// Enforce 91 minutes between consecutive start times.
    pub unlimited: bool,

    /// Treat the previous show as ending 5 minutes early.
    pub fudge: bool,

    /// Insert the long break after this many shows.
    pub break_after: Option<usize>,

    /// Length of the long break (minutes).
    pub break_mins: i64,

    /// Allowed screen types; empty allows all.
    pub formats: BTreeSet<String>,

    /// Allowed theaters in order of preference; empty allows all.
    pub theaters: Vec<TheaterCode>,
}

impl SearchParams {
    /// Check ranges. `title_count` bounds the long break position: the break
    /// must fall between two shows.
    pub fn validate(&self, title_count: usize) -> Result<(), ParamError> {
        if !BUFFER_RANGE.contains(&self.buffer_mins) {
            return Err(ParamError::Buffer(self.buffer_mins));
        }
        if !GAP_CAP_RANGE.contains(&self.gap_cap_mins) {
            return Err(ParamError::GapCap(self.gap_cap_mins));
        }
        if !BREAK_RANGE.contains(&self.break_mins) {
            return Err(ParamError::BreakDuration(self.break_mins));
        }
        if let Some(pos) = self.break_after {
            let max = title_count.saturating_sub(1);
            if pos == 0 || pos > max {
                return Err(ParamError::BreakPosition { got: pos, max });
            }
        }
        Ok(())
    }

    /// Returns the buffer as a Duration.
    pub fn buffer(&self) -> Duration {
        Duration::minutes(self.buffer_mins)
    }

    /// Returns the long break as a Duration.
    pub fn long_break(&self) -> Duration {
        Duration::minutes(self.break_mins)
    }

    /// Buffer required after a path of `placed` shows.
    pub fn required_buffer(&self, placed: usize) -> Duration {
        if self.break_after == Some(placed) {
            self.long_break()
        } else {
            self.buffer()
        }
    }

    /// The highest-preference theater, if any were requested.
    pub fn preferred_theater(&self) -> Option<&TheaterCode> {
        self.theaters.first()
    }

    /// Whether a screening passes the format and theater allow-lists.
    pub fn allows(&self, screening: &Screening) -> bool {
        (self.formats.is_empty() || self.formats.contains(&screening.screen_type))
            && (self.theaters.is_empty() || self.theaters.contains(&screening.theater))
    }

    /// Compute the viewing window for `date`.
    ///
    /// An end at or before the start wraps to the next day. The 23:59
    /// sentinel stretches six hours past it to absorb late shows.
    pub fn window(&self, date: NaiveDate) -> TimeWindow {
        let start_time = self.earliest_start.unwrap_or(NaiveTime::MIN);
        let start = date.and_time(start_time);

        let mut end = match self.latest_end {
            Some(t) => date.and_time(t),
            None => end_of_day(date),
        };

        if end <= start {
            end += Duration::days(1);
        } else if self.latest_end.is_none_or(is_end_of_day) {
            end += Duration::hours(LATE_SHOW_GRACE_HOURS);
        }

        TimeWindow { start, end }
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(23 * 60 + 59)
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            earliest_start: None,
            latest_end: None,
            buffer_mins: 15,
            gap_cap_mins: 120,
            unlimited: false,
            fudge: false,
            break_after: None,
            break_mins: 60,
            formats: BTreeSet::new(),
            theaters: Vec::new(),
        }
    }
}

/// The span of time every show must fit inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Whether the screening starts and ends inside the window.
    pub fn contains(&self, screening: &Screening) -> bool {
        screening.start >= self.start && screening.end() <= self.end
    }
}
