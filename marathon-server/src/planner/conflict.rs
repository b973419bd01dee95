//! Explanations for requested titles missing from an itinerary.

use std::sync::Arc;

use crate::domain::{Itinerary, Screening, format_clock};

use super::SearchParams;

/// Why a requested title could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReason {
    /// Nothing for this title passes the format and theater filters.
    NoCandidates,
    /// A candidate collides with a screening already in the itinerary.
    Overlap {
        /// Start of the missing title's show.
        start: chrono::NaiveDateTime,
        /// Title of the itinerary screening it collides with.
        with: String,
    },
    /// Candidates exist and none collide; the window, buffer, gap or travel
    /// rules excluded them.
    Unplaceable,
}

/// Classify why `title` is absent from `itinerary`.
///
/// Among overlapping candidates the one starting earliest is reported,
/// against the first itinerary screening it collides with.
pub fn missing_reason(
    itinerary: &Itinerary,
    title: &str,
    all_screenings: &[Arc<Screening>],
    params: &SearchParams,
) -> MissingReason {
    let mut candidates: Vec<&Screening> = all_screenings
        .iter()
        .map(Arc::as_ref)
        .filter(|s| s.title == title && params.allows(s))
        .collect();

    if candidates.is_empty() {
        return MissingReason::NoCandidates;
    }

    candidates.sort_by_key(|s| s.start);

    candidates
        .iter()
        .find_map(|candidate| {
            itinerary
                .screenings()
                .iter()
                .find(|placed| candidate.overlaps(placed))
                .map(|placed| MissingReason::Overlap {
                    start: candidate.start,
                    with: placed.title.clone(),
                })
        })
        .unwrap_or(MissingReason::Unplaceable)
}

/// One human-readable message per missing title, in the given order.
pub fn explain_missing(
    itinerary: &Itinerary,
    missing_titles: &[&str],
    all_screenings: &[Arc<Screening>],
    params: &SearchParams,
) -> Vec<String> {
    missing_titles
        .iter()
        .map(|title| {
            let reason = match missing_reason(itinerary, title, all_screenings, params) {
                MissingReason::NoCandidates => {
                    "no screenings match selected formats/theaters".to_string()
                }
                MissingReason::Overlap { start, with } => {
                    format!("the {} show overlaps with {}", format_clock(start), with)
                }
                MissingReason::Unplaceable => {
                    "no screening fits the specified window or buffer requirements".to_string()
                }
            };
            format!("{title}: {reason}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::fixtures::*;
    use std::collections::BTreeSet;

    fn pool(shows: Vec<Screening>) -> Vec<Arc<Screening>> {
        shows.into_iter().map(Arc::new).collect()
    }

    fn itinerary(pool: &[Arc<Screening>], indices: &[usize]) -> Itinerary {
        Itinerary::new(indices.iter().map(|&i| Arc::clone(&pool[i])).collect()).unwrap()
    }

    #[test]
    fn names_overlapping_title_and_start() {
        let shows = pool(vec![
            show("Dune", "18:00", 166),
            show("Wonka", "19:30", 116),
            show("Wonka", "20:15", 116),
        ]);
        let chosen = itinerary(&shows, &[0]);

        let messages = explain_missing(&chosen, &["Wonka"], &shows, &SearchParams::default());

        assert_eq!(messages, vec!["Wonka: the 7:30 PM show overlaps with Dune"]);
    }

    #[test]
    fn reports_earliest_overlap_regardless_of_input_order() {
        let shows = pool(vec![
            show("Dune", "10:00", 240),
            show("Wonka", "12:00", 100),
            show("Wonka", "11:00", 100),
        ]);
        let chosen = itinerary(&shows, &[0]);

        assert_eq!(
            missing_reason(&chosen, "Wonka", &shows, &SearchParams::default()),
            MissingReason::Overlap {
                start: at("11:00"),
                with: "Dune".to_string(),
            }
        );
    }

    #[test]
    fn no_candidates_under_filters() {
        let shows = pool(vec![show("Dune", "10:00", 166), show("Wonka", "14:00", 116)]);
        let chosen = itinerary(&shows, &[0]);
        let params = SearchParams {
            formats: BTreeSet::from(["IMAX".to_string()]),
            ..SearchParams::default()
        };

        let messages = explain_missing(&chosen, &["Wonka"], &shows, &params);
        assert_eq!(
            messages,
            vec!["Wonka: no screenings match selected formats/theaters"]
        );
    }

    #[test]
    fn title_never_scheduled() {
        let shows = pool(vec![show("Dune", "10:00", 166)]);
        let chosen = itinerary(&shows, &[0]);

        assert_eq!(
            missing_reason(&chosen, "Wonka", &shows, &SearchParams::default()),
            MissingReason::NoCandidates
        );
    }

    #[test]
    fn falls_back_to_window_message() {
        // Wonka does not overlap but is too far after Dune for the gap cap
        let shows = pool(vec![show("Dune", "10:00", 120), show("Wonka", "20:00", 116)]);
        let chosen = itinerary(&shows, &[0]);

        let messages = explain_missing(&chosen, &["Wonka"], &shows, &SearchParams::default());
        assert_eq!(
            messages,
            vec!["Wonka: no screening fits the specified window or buffer requirements"]
        );
    }

    #[test]
    fn one_message_per_title_in_order() {
        let shows = pool(vec![
            show("Dune", "10:00", 120),
            show("Wonka", "11:00", 90),
            show("Argylle", "21:00", 90),
        ]);
        let chosen = itinerary(&shows, &[0]);

        let messages = explain_missing(
            &chosen,
            &["Wonka", "Migration", "Argylle"],
            &shows,
            &SearchParams::default(),
        );

        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("Wonka: the 11:00 AM show"));
        assert!(messages[1].starts_with("Migration: no screenings match"));
        assert!(messages[2].starts_with("Argylle: no screening fits"));
    }
}
