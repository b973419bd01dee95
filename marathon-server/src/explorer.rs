//! Schedule browsing: filtering, sorting and grouping a day's screenings.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use serde::Deserialize;

use crate::domain::Screening;

/// Sort position for auditoriums that are not numbers.
const NON_NUMERIC_AUDITORIUM: u32 = 999;

/// A block of the day, by start hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 8 AM to noon.
    Morning,
    /// Noon to 4 PM.
    Afternoon,
    /// 4 PM to 8 PM.
    Evening,
    /// 8 PM to midnight.
    Night,
}

impl TimeOfDay {
    /// Start hours covered, half-open.
    pub fn hours(&self) -> (u32, u32) {
        match self {
            TimeOfDay::Morning => (8, 12),
            TimeOfDay::Afternoon => (12, 16),
            TimeOfDay::Evening => (16, 20),
            TimeOfDay::Night => (20, 24),
        }
    }

    pub fn contains(&self, start: NaiveDateTime) -> bool {
        let (from, to) = self.hours();
        (from..to).contains(&start.hour())
    }
}

/// How to order filtered screenings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Title, then start.
    #[default]
    Title,
    /// Start, then title.
    Showtime,
    /// Auditorium number (non-numeric last), then start.
    Auditorium,
}

/// Criteria for narrowing the schedule. Empty sets match everything.
#[derive(Debug, Clone, Default)]
pub struct ScreeningFilter {
    pub screen_types: BTreeSet<String>,
    pub ratings: BTreeSet<String>,
    pub auditoriums: BTreeSet<String>,
    /// Every one of these attributes must be present.
    pub attributes: BTreeSet<String>,
    /// The start must fall in at least one of these blocks.
    pub times: BTreeSet<TimeOfDay>,
    /// Hide screenings starting at or before this instant.
    pub after: Option<NaiveDateTime>,
}

impl ScreeningFilter {
    pub fn matches(&self, s: &Screening) -> bool {
        (self.screen_types.is_empty() || self.screen_types.contains(&s.screen_type))
            && (self.ratings.is_empty() || self.ratings.contains(&s.rating))
            && (self.auditoriums.is_empty() || self.auditoriums.contains(&s.auditorium))
            && self.attributes.is_subset(&s.attributes)
            && (self.times.is_empty() || self.times.iter().any(|t| t.contains(s.start)))
            && self.after.is_none_or(|after| s.start > after)
    }
}

fn auditorium_rank(s: &Screening) -> u32 {
    s.auditorium_number().unwrap_or(NON_NUMERIC_AUDITORIUM)
}

fn compare(a: &Screening, b: &Screening, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.cmp(&b.title).then_with(|| a.start.cmp(&b.start)),
        SortKey::Showtime => a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)),
        SortKey::Auditorium => auditorium_rank(a)
            .cmp(&auditorium_rank(b))
            .then_with(|| a.start.cmp(&b.start)),
    }
}

/// Screenings matching `filter`, ordered by `sort`.
pub fn filter_screenings(
    screenings: &[Arc<Screening>],
    filter: &ScreeningFilter,
    sort: SortKey,
) -> Vec<Arc<Screening>> {
    let mut matched: Vec<Arc<Screening>> = screenings
        .iter()
        .filter(|s| filter.matches(s))
        .cloned()
        .collect();
    matched.sort_by(|a, b| compare(a, b, sort));
    matched
}

/// Attributes shared by every screening in the group.
pub fn common_attributes<'a, I>(screenings: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Screening>,
{
    let mut iter = screenings.into_iter();
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };
    iter.fold(first.attributes.clone(), |common, s| {
        common.intersection(&s.attributes).cloned().collect()
    })
}

/// Screenings of one title in one format, with the attributes they share.
#[derive(Debug, Clone)]
pub struct FormatGroup {
    pub screen_type: String,
    pub common: BTreeSet<String>,
    pub screenings: Vec<Arc<Screening>>,
}

impl FormatGroup {
    /// Attributes of `s` beyond the shared ones, sorted.
    pub fn extra_attributes<'a>(&'a self, s: &'a Screening) -> Vec<&'a str> {
        s.attributes
            .difference(&self.common)
            .map(String::as_str)
            .collect()
    }
}

/// A title's screenings split by format.
#[derive(Debug, Clone)]
pub struct TitleGroup {
    pub title: String,
    pub rating: String,
    pub duration_minutes: u32,
    /// Sorted by screen type.
    pub formats: Vec<FormatGroup>,
}

/// Group screenings by title (first-appearance order) and then by format.
pub fn group_by_title(screenings: &[Arc<Screening>]) -> Vec<TitleGroup> {
    let mut titles: Vec<&str> = Vec::new();
    for s in screenings {
        if !titles.contains(&s.title.as_str()) {
            titles.push(&s.title);
        }
    }

    titles
        .into_iter()
        .filter_map(|title| {
            let shows: Vec<&Arc<Screening>> =
                screenings.iter().filter(|s| s.title == title).collect();
            let first = shows.first()?;

            let types: BTreeSet<&str> = shows.iter().map(|s| s.screen_type.as_str()).collect();
            let formats = types
                .into_iter()
                .map(|screen_type| {
                    let group: Vec<Arc<Screening>> = shows
                        .iter()
                        .filter(|s| s.screen_type == screen_type)
                        .map(|s| Arc::clone(s))
                        .collect();
                    FormatGroup {
                        screen_type: screen_type.to_string(),
                        common: common_attributes(group.iter().map(Arc::as_ref)),
                        screenings: group,
                    }
                })
                .collect();

            Some(TitleGroup {
                title: title.to_string(),
                rating: first.rating.clone(),
                duration_minutes: first.duration_minutes,
                formats,
            })
        })
        .collect()
}
