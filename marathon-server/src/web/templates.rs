//! Askama templates for the web frontend.

use askama::Template;

use crate::catalog::UpcomingTitle;
use crate::domain::{Screening, TheaterCode, format_clock};
use crate::explorer::{FormatGroup, TitleGroup};
use crate::planner::PlanOption;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page with the planning form and schedule browser.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Default value for the date inputs (YYYY-MM-DD).
    pub today: String,
}

// ============================================================================
// Fragment Templates (AJAX responses, no base.html)
// ============================================================================

/// Planned itineraries fragment.
#[derive(Template)]
#[template(path = "itineraries.html")]
pub struct ItinerariesTemplate {
    pub date_label: String,
    pub options: Vec<OptionView>,
    pub itineraries_found: usize,
    pub candidates_checked: usize,
}

/// Schedule browser fragment.
#[derive(Template)]
#[template(path = "showtimes.html")]
pub struct ShowtimesTemplate {
    pub date_label: String,
    pub titles: Vec<TitleView>,
    pub upcoming: Vec<UpcomingView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// "2h 46m", or "46m" under an hour.
pub fn duration_display(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// One selected itinerary.
#[derive(Debug, Clone)]
pub struct OptionView {
    /// Zero-based, matches the calendar export's `option`.
    pub index: usize,
    pub rationale: String,
    pub stops: Vec<StopView>,
    pub conflicts: Vec<String>,
    pub count: usize,
    pub hops: usize,
    pub total_miles: f64,
    pub total_gap_mins: i64,
}

impl OptionView {
    /// Create from a planned option. `theater_name` resolves codes for display.
    pub fn from_option<F>(index: usize, option: &PlanOption, theater_name: F) -> Self
    where
        F: Fn(&TheaterCode) -> String,
    {
        let mut stops = Vec::new();
        let mut previous: Option<&Screening> = None;
        for s in option.ranked.itinerary.screenings() {
            stops.push(StopView::new(s, previous, &theater_name));
            previous = Some(s.as_ref());
        }

        let metrics = &option.ranked.metrics;
        Self {
            index,
            rationale: option.ranked.rationale.label().to_string(),
            stops,
            conflicts: option.conflicts.clone(),
            count: metrics.count,
            hops: metrics.hops,
            total_miles: metrics.total_miles,
            total_gap_mins: metrics.total_gap_mins,
        }
    }

    /// "3 movies, 1 theater change".
    pub fn summary(&self) -> String {
        let movies = if self.count == 1 { "movie" } else { "movies" };
        match self.hops {
            0 => format!("{} {}, one theater", self.count, movies),
            1 => format!("{} {}, 1 theater change", self.count, movies),
            n => format!("{} {}, {} theater changes", self.count, movies, n),
        }
    }

    pub fn miles_display(&self) -> String {
        format!("{:.1} mi", self.total_miles)
    }

    pub fn gap_display(&self) -> String {
        duration_display(self.total_gap_mins)
    }
}

/// One screening in an itinerary.
#[derive(Debug, Clone)]
pub struct StopView {
    pub title: String,
    pub screen_type: String,
    pub rating: String,
    pub auditorium: String,
    pub theater_name: String,
    pub start_time: String,
    pub end_time: String,
    pub attributes: String,
    /// Idle time since the previous screening ended.
    pub wait_mins: Option<i64>,
    /// Whether this stop is at a different theater than the previous one.
    pub is_move: bool,
}

impl StopView {
    fn new<F>(s: &Screening, previous: Option<&Screening>, theater_name: &F) -> Self
    where
        F: Fn(&TheaterCode) -> String,
    {
        Self {
            title: s.title.clone(),
            screen_type: s.screen_type.clone(),
            rating: s.rating.clone(),
            auditorium: s.auditorium.clone(),
            theater_name: theater_name(&s.theater),
            start_time: format_clock(s.start),
            end_time: format_clock(s.end()),
            attributes: s.attributes_label(),
            wait_mins: previous.map(|p| (s.start - p.end()).num_minutes()),
            is_move: previous.is_some_and(|p| p.theater != s.theater),
        }
    }

    /// "25m wait", or a fudged overlap when the shows overlap.
    pub fn wait_display(&self) -> Option<String> {
        let wait = self.wait_mins?;
        Some(if wait < 0 {
            format!("{} overlap", duration_display(-wait))
        } else {
            format!("{} wait", duration_display(wait))
        })
    }
}

/// A title in the schedule browser.
#[derive(Debug, Clone)]
pub struct TitleView {
    pub title: String,
    pub rating: String,
    pub duration: String,
    pub formats: Vec<FormatView>,
}

impl TitleView {
    pub fn from_group<F>(group: &TitleGroup, theater_name: F) -> Self
    where
        F: Fn(&TheaterCode) -> String,
    {
        Self {
            title: group.title.clone(),
            rating: group.rating.clone(),
            duration: duration_display(i64::from(group.duration_minutes)),
            formats: group
                .formats
                .iter()
                .map(|f| FormatView::from_group(f, &theater_name))
                .collect(),
        }
    }
}

/// One format's screenings of a title.
#[derive(Debug, Clone)]
pub struct FormatView {
    pub screen_type: String,
    /// Attributes every screening in the format shares.
    pub common: String,
    pub shows: Vec<ShowView>,
}

impl FormatView {
    fn from_group<F>(group: &FormatGroup, theater_name: &F) -> Self
    where
        F: Fn(&TheaterCode) -> String,
    {
        let shows = group
            .screenings
            .iter()
            .map(|s| ShowView {
                start_time: format_clock(s.start),
                auditorium: s.auditorium.clone(),
                theater_name: theater_name(&s.theater),
                extras: group.extra_attributes(s).join(", "),
            })
            .collect();

        Self {
            screen_type: group.screen_type.clone(),
            common: group.common.iter().cloned().collect::<Vec<_>>().join(", "),
            shows,
        }
    }
}

/// A single showtime in the browser.
#[derive(Debug, Clone)]
pub struct ShowView {
    pub start_time: String,
    pub auditorium: String,
    pub theater_name: String,
    /// Attributes beyond the format's shared ones.
    pub extras: String,
}

/// A title that is not screening yet.
#[derive(Debug, Clone)]
pub struct UpcomingView {
    pub title: String,
    pub rating: String,
    pub opening: String,
    pub scheduled_dates: String,
}

impl UpcomingView {
    pub fn from_upcoming(u: &UpcomingTitle) -> Self {
        Self {
            title: u.title.clone(),
            rating: u.rating.clone(),
            opening: u.opening_label(),
            scheduled_dates: u.scheduled_dates.join(", "),
        }
    }
}
