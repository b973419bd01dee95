//! iCalendar export of an itinerary.
//!
//! Times are written as floating local times (no `Z`, no `TZID`), which
//! calendar clients interpret in the viewer's own zone. That matches the
//! theater-local showtimes as long as the viewer is near the theater.

use crate::domain::{Itinerary, TheaterCode};

/// Product identifier written to every calendar.
pub const PRODID: &str = "-//Marathon Planner//EN";

/// Format for `DTSTART`/`DTEND`.
const STAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Escape a TEXT value (RFC 5545 §3.3.11).
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Render an itinerary as an iCalendar document, one event per screening.
///
/// `theater_name` resolves a theater code to the name shown in `LOCATION`.
pub fn render_ics<F>(itinerary: &Itinerary, theater_name: F) -> String
where
    F: Fn(&TheaterCode) -> String,
{
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        format!("PRODID:{PRODID}"),
        "CALSCALE:GREGORIAN".into(),
        "METHOD:PUBLISH".into(),
    ];

    for s in itinerary.screenings() {
        lines.push("BEGIN:VEVENT".into());
        lines.push(format!(
            "UID:{}-{}@marathon",
            s.movie,
            s.start.format(STAMP_FORMAT)
        ));
        lines.push(format!("DTSTART:{}", s.start.format(STAMP_FORMAT)));
        lines.push(format!("DTEND:{}", s.end().format(STAMP_FORMAT)));
        lines.push(format!(
            "SUMMARY:{}",
            escape_text(&format!("{} ({})", s.title, s.screen_type))
        ));
        lines.push(format!(
            "LOCATION:{}",
            escape_text(&format!("{} - Audi {}", theater_name(&s.theater), s.auditorium))
        ));
        lines.push("END:VEVENT".into());
    }

    lines.push("END:VCALENDAR".into());

    let mut doc = lines.join("\r\n");
    doc.push_str("\r\n");
    doc
}

/// A download filename for the itinerary ("marathon-2024-03-15.ics").
pub fn filename(itinerary: &Itinerary) -> String {
    format!("marathon-{}.ics", itinerary.start().format("%Y-%m-%d"))
}
