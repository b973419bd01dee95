//! Itinerary ranking and selection.
//!
//! Scores every enumerated itinerary and picks a short slate of distinct
//! options, each for a different reason, so the user sees variety rather
//! than five near-identical top scorers.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::domain::{Itinerary, ItineraryKey, TheaterCode};
use crate::drive::DriveTimes;

/// Maximum number of options presented.
pub const MAX_OPTIONS: usize = 5;

/// Points per screening.
const COUNT_WEIGHT: f64 = 100.0;

/// Penalty per theater change.
const HOP_PENALTY: f64 = 40.0;

/// Penalty per mile driven.
const MILE_PENALTY: f64 = 2.0;

/// Why an itinerary was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rationale {
    /// Most screenings, regardless of travel.
    AbsoluteMarathon,
    /// Best score, balancing screenings against travel.
    SmartMarathon,
    /// Most screenings without leaving one theater.
    SingleTheaterMax,
    /// Includes both of the two most wanted titles.
    PriorityMovieMatch,
    /// Stays at the most preferred theater.
    PriorityTheaterMatch,
    /// Next best by score.
    Alternative,
}

impl Rationale {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Rationale::AbsoluteMarathon => "Absolute Marathon",
            Rationale::SmartMarathon => "Smart Marathon",
            Rationale::SingleTheaterMax => "Single-Theater Max",
            Rationale::PriorityMovieMatch => "Priority Movie Match",
            Rationale::PriorityTheaterMatch => "Priority Theater Match",
            Rationale::Alternative => "Alternative Optimized Path",
        }
    }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-itinerary measurements used for ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Number of screenings.
    pub count: usize,
    /// Number of theater changes.
    pub hops: usize,
    /// Miles driven across all theater changes.
    pub total_miles: f64,
    /// Idle minutes between screenings.
    pub total_gap_mins: i64,
    /// `100·count − 40·hops − 2·miles`.
    pub score: f64,
}

impl Metrics {
    /// Measure an itinerary.
    pub fn measure(itinerary: &Itinerary, drive: &DriveTimes) -> Self {
        let count = itinerary.len();
        let hops = itinerary.hop_count();
        let total_miles: f64 = itinerary
            .theater_changes()
            .map(|(from, to)| drive.between(from, to).miles)
            .sum();
        let total_gap_mins = itinerary.total_gap().num_minutes();
        let score = COUNT_WEIGHT * count as f64
            - HOP_PENALTY * hops as f64
            - MILE_PENALTY * total_miles;

        Self {
            count,
            hops,
            total_miles,
            total_gap_mins,
            score,
        }
    }
}

/// An itinerary with its metrics.
#[derive(Debug, Clone)]
pub struct ScoredItinerary {
    pub itinerary: Itinerary,
    pub metrics: Metrics,
    pub key: ItineraryKey,
}

impl ScoredItinerary {
    pub fn new(itinerary: Itinerary, drive: &DriveTimes) -> Self {
        let metrics = Metrics::measure(&itinerary, drive);
        let key = itinerary.key();
        Self {
            itinerary,
            metrics,
            key,
        }
    }
}

/// A selected itinerary and why it was chosen.
#[derive(Debug, Clone)]
pub struct RankedItinerary {
    pub itinerary: Itinerary,
    pub metrics: Metrics,
    pub rationale: Rationale,
}

/// Order by count (more first), then hops, miles and gap (less first).
fn by_marathon(a: &Metrics, b: &Metrics) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.hops.cmp(&b.hops))
        .then_with(|| a.total_miles.total_cmp(&b.total_miles))
        .then_with(|| a.total_gap_mins.cmp(&b.total_gap_mins))
}

/// Order by score (higher first), then count (more first), then gap.
fn by_score(a: &Metrics, b: &Metrics) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.total_gap_mins.cmp(&b.total_gap_mins))
}

/// Order by count (more first), then gap.
fn by_count(a: &Metrics, b: &Metrics) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.total_gap_mins.cmp(&b.total_gap_mins))
}

/// Order by score (higher first), then gap.
fn by_score_then_gap(a: &Metrics, b: &Metrics) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.total_gap_mins.cmp(&b.total_gap_mins))
}

/// Rank itineraries by score, best first.
///
/// Ties keep their input order.
pub fn rank_by_score(mut scored: Vec<ScoredItinerary>) -> Vec<ScoredItinerary> {
    scored.sort_by(|a, b| by_score(&a.metrics, &b.metrics));
    scored
}

/// Accumulates picks, refusing duplicates and stopping at the limit.
struct Slate<'a> {
    picks: Vec<(&'a ScoredItinerary, Rationale)>,
    seen: HashSet<&'a ItineraryKey>,
}

impl<'a> Slate<'a> {
    fn new() -> Self {
        Self {
            picks: Vec::with_capacity(MAX_OPTIONS),
            seen: HashSet::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.picks.len() >= MAX_OPTIONS
    }

    /// Offer the best candidate under `order`. Nothing happens when the
    /// slate is full, there is no candidate, or the best one was already
    /// picked.
    ///
    /// A label whose best itinerary is already on the slate is dropped, not
    /// given to its runner-up: the runner-up is not the best under that
    /// rule, so labelling it would misstate why it was chosen. Remaining
    /// slots still fill with alternatives by score.
    fn offer<I, F>(&mut self, candidates: I, order: F, rationale: Rationale)
    where
        I: Iterator<Item = &'a ScoredItinerary>,
        F: Fn(&Metrics, &Metrics) -> Ordering,
    {
        if self.is_full() {
            return;
        }

        let best = candidates.reduce(|best, next| {
            if order(&next.metrics, &best.metrics) == Ordering::Less {
                next
            } else {
                best
            }
        });

        if let Some(best) = best {
            self.push(best, rationale);
        }
    }

    fn push(&mut self, candidate: &'a ScoredItinerary, rationale: Rationale) -> bool {
        if self.is_full() || !self.seen.insert(&candidate.key) {
            return false;
        }
        self.picks.push((candidate, rationale));
        true
    }
}

/// Score every itinerary and select up to five distinct options.
///
/// Selection order: Absolute Marathon, Smart Marathon, Single-Theater Max,
/// Priority Movie Match (both top titles present), Priority Theater Match
/// (only `preferred_theater`), then alternatives by score. An itinerary
/// already chosen under one label is never repeated under another.
pub fn rank_and_select(
    itineraries: Vec<Itinerary>,
    titles: &[String],
    drive: &DriveTimes,
    preferred_theater: Option<&TheaterCode>,
) -> Vec<RankedItinerary> {
    let scored: Vec<ScoredItinerary> = itineraries
        .into_iter()
        .map(|it| ScoredItinerary::new(it, drive))
        .collect();

    if scored.is_empty() {
        return Vec::new();
    }

    let ranked = rank_by_score(scored);
    let mut slate = Slate::new();

    slate.offer(ranked.iter(), by_marathon, Rationale::AbsoluteMarathon);
    slate.offer(ranked.iter(), by_score, Rationale::SmartMarathon);
    slate.offer(
        ranked.iter().filter(|s| s.metrics.hops == 0),
        by_count,
        Rationale::SingleTheaterMax,
    );

    if let [first, second, ..] = titles {
        slate.offer(
            ranked.iter().filter(|s| {
                s.itinerary.contains_title(first) && s.itinerary.contains_title(second)
            }),
            by_score_then_gap,
            Rationale::PriorityMovieMatch,
        );
    }

    if let Some(theater) = preferred_theater {
        slate.offer(
            ranked.iter().filter(|s| s.itinerary.only_at(theater)),
            by_count,
            Rationale::PriorityTheaterMatch,
        );
    }

    for candidate in &ranked {
        if slate.is_full() {
            break;
        }
        slate.push(candidate, Rationale::Alternative);
    }

    debug!(
        candidates = ranked.len(),
        selected = slate.picks.len(),
        "itinerary selection finished"
    );

    slate
        .picks
        .into_iter()
        .map(|(s, rationale)| RankedItinerary {
            itinerary: s.itinerary.clone(),
            metrics: s.metrics,
            rationale,
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::screening::fixtures::*;
    use crate::domain::{MovieCode, Screening};
    use crate::drive::DriveTimesBuilder;
    use chrono::Duration;
    use proptest::prelude::*;
    use std::sync::Arc;

    /// (theater index, start offset from 09:00, duration) per show; titles
    /// are assigned by position so an itinerary never repeats one.
    fn itinerary_strategy() -> impl Strategy<Value = Itinerary> {
        prop::collection::vec((0usize..3, 0i64..60, 30u32..150), 1..5).prop_map(|shows| {
            let mut clock = at("09:00");
            let screenings = shows
                .into_iter()
                .enumerate()
                .map(|(i, (theater_idx, wait, duration))| {
                    let start = clock + Duration::minutes(wait + 1);
                    let screening = Screening {
                        title: format!("M{i}"),
                        rating: "PG".to_string(),
                        duration_minutes: duration,
                        start,
                        auditorium: "1".to_string(),
                        screen_type: "2D".to_string(),
                        attributes: Default::default(),
                        theater: theater(["T1", "T2", "T3"][theater_idx]),
                        movie: MovieCode::new(format!("HO{i}")),
                    };
                    clock = screening.end();
                    Arc::new(screening)
                })
                .collect();
            Itinerary::new(screenings).unwrap()
        })
    }

    fn drive() -> DriveTimes {
        DriveTimesBuilder::new("T1")
            .add("T2", 10, 3.0)
            .add("T3", 25, 12.0)
            .build()
            .unwrap()
    }

    fn titles() -> Vec<String> {
        (0..5).map(|i| format!("M{i}")).collect()
    }

    proptest! {
        #[test]
        fn at_most_five_distinct_picks(
            itineraries in prop::collection::vec(itinerary_strategy(), 0..20),
        ) {
            let picks = rank_and_select(itineraries, &titles(), &drive(), Some(&theater("T1")));

            prop_assert!(picks.len() <= MAX_OPTIONS);
            let keys: HashSet<ItineraryKey> = picks.iter().map(|p| p.itinerary.key()).collect();
            prop_assert_eq!(keys.len(), picks.len());
        }

        #[test]
        fn absolute_marathon_has_max_count(
            itineraries in prop::collection::vec(itinerary_strategy(), 1..20),
        ) {
            let max_count = itineraries.iter().map(Itinerary::len).max().unwrap();
            let picks = rank_and_select(itineraries, &titles(), &drive(), None);

            prop_assert_eq!(picks[0].rationale, Rationale::AbsoluteMarathon);
            prop_assert_eq!(picks[0].metrics.count, max_count);
            for p in &picks {
                prop_assert!(picks[0].metrics.count >= p.metrics.count);
            }
        }

        #[test]
        fn rank_by_score_is_sorted(
            itineraries in prop::collection::vec(itinerary_strategy(), 0..20),
        ) {
            let scored = itineraries
                .into_iter()
                .map(|it| ScoredItinerary::new(it, &drive()))
                .collect();
            let ranked = rank_by_score(scored);

            for pair in ranked.windows(2) {
                prop_assert!(by_score(&pair[0].metrics, &pair[1].metrics) != Ordering::Greater);
            }
        }
    }
}
