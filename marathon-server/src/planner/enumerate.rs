//! Depth-first itinerary enumeration.
//!
//! Explores every order in which the requested titles could be watched,
//! placing one screening per title, and keeps the paths that cannot be
//! extended any further.

use std::cell::Cell;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, trace};

use crate::domain::{Itinerary, Screening};
use crate::drive::DriveTimes;

use super::config::{FUDGE_MINS, SearchParams, TimeWindow, UNLIMITED_SPACING_MINS};

/// Output of one enumeration.
#[derive(Debug, Clone)]
pub struct Enumeration {
    /// Maximal feasible itineraries, in discovery order.
    pub itineraries: Vec<Itinerary>,

    /// Number of (path, screening) pairs tested.
    pub candidates_checked: usize,
}

/// Enumerate all maximal feasible itineraries.
///
/// Titles are matched exactly against `Screening::title`. Repeated titles
/// count once. A title without usable screenings is simply left out of
/// every result.
pub fn enumerate_itineraries(
    titles: &[String],
    screenings: &[Arc<Screening>],
    params: &SearchParams,
    date: NaiveDate,
    drive: &DriveTimes,
) -> Vec<Itinerary> {
    Enumerator::new(titles, screenings, params, date, drive)
        .run()
        .itineraries
}

/// Backtracking search over (title, screening) choices.
pub struct Enumerator<'a> {
    /// Candidate screenings per distinct title, sorted by start.
    pools: Vec<Vec<&'a Arc<Screening>>>,
    params: &'a SearchParams,
    window: TimeWindow,
    drive: &'a DriveTimes,
    checked: Cell<usize>,
}

impl<'a> Enumerator<'a> {
    /// Prepare a search. Screenings failing the format or theater
    /// allow-lists are dropped here.
    pub fn new(
        titles: &[String],
        screenings: &'a [Arc<Screening>],
        params: &'a SearchParams,
        date: NaiveDate,
        drive: &'a DriveTimes,
    ) -> Self {
        let mut distinct: Vec<&str> = Vec::with_capacity(titles.len());
        for title in titles {
            if !distinct.contains(&title.as_str()) {
                distinct.push(title);
            }
        }

        let pools = distinct
            .iter()
            .map(|title| {
                let mut pool: Vec<&Arc<Screening>> = screenings
                    .iter()
                    .filter(|s| s.title == *title && params.allows(s))
                    .collect();
                pool.sort_by_key(|s| s.start);
                pool
            })
            .collect();

        Self {
            pools,
            params,
            window: params.window(date),
            drive,
            checked: Cell::new(0),
        }
    }

    /// Run the search to completion.
    pub fn run(self) -> Enumeration {
        let mut itineraries = Vec::new();
        let mut path = Vec::with_capacity(self.pools.len());
        let mut placed = vec![false; self.pools.len()];

        self.extend(&mut path, &mut placed, &mut itineraries);

        debug!(
            found = itineraries.len(),
            checked = self.checked.get(),
            window_start = %self.window.start,
            window_end = %self.window.end,
            "itinerary enumeration finished"
        );

        Enumeration {
            itineraries,
            candidates_checked: self.checked.get(),
        }
    }

    /// Try every unplaced title's screenings after `path`.
    ///
    /// Returns whether any screening could be appended. When an appended
    /// screening leads nowhere further, that extended path is maximal and is
    /// pushed to `out`.
    fn extend(
        &self,
        path: &mut Vec<Arc<Screening>>,
        placed: &mut [bool],
        out: &mut Vec<Itinerary>,
    ) -> bool {
        let mut extended = false;

        for (idx, pool) in self.pools.iter().enumerate() {
            if placed[idx] {
                continue;
            }

            for &candidate in pool {
                if !self.accepts(path, candidate) {
                    continue;
                }
                extended = true;

                path.push(Arc::clone(candidate));
                placed[idx] = true;

                if !self.extend(path, placed, out) {
                    match Itinerary::new(path.clone()) {
                        Ok(itinerary) => out.push(itinerary),
                        Err(e) => debug!("dropping malformed path: {e}"),
                    }
                }

                placed[idx] = false;
                path.pop();
            }
        }

        extended
    }

    /// Whether `candidate` may follow the last screening of `path`.
    fn accepts(&self, path: &[Arc<Screening>], candidate: &Screening) -> bool {
        self.checked.set(self.checked.get() + 1);

        if !self.window.contains(candidate) {
            trace!(title = %candidate.title, start = %candidate.start, "outside window");
            return false;
        }

        let Some(prev) = path.last() else {
            return true;
        };

        if candidate.start <= prev.start {
            return false;
        }

        let mut prev_end = prev.end();
        if self.params.fudge {
            prev_end -= Duration::minutes(FUDGE_MINS);
        }

        let drive = self.drive.between(&prev.theater, &candidate.theater);
        let required_gap = drive.duration() + self.params.required_buffer(path.len());

        if self.params.unlimited
            && candidate.start < prev.start + Duration::minutes(UNLIMITED_SPACING_MINS)
        {
            trace!(title = %candidate.title, start = %candidate.start, "too soon for unlimited rule");
            return false;
        }

        if candidate.start < prev_end + required_gap {
            trace!(title = %candidate.title, start = %candidate.start, "insufficient buffer");
            return false;
        }

        if candidate.start.signed_duration_since(prev_end)
            > Duration::minutes(self.params.gap_cap_mins)
        {
            trace!(title = %candidate.title, start = %candidate.start, "gap too long");
            return false;
        }

        true
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::screening::fixtures::*;
    use crate::domain::{MovieCode, TheaterCode};
    use crate::drive::DriveTimesBuilder;
    use proptest::prelude::*;

    const TITLES: [&str; 4] = ["A", "B", "C", "D"];

    /// (title index, theater index, start minutes from 09:00, duration)
    fn screening_strategy() -> impl Strategy<Value = (usize, usize, i64, u32)> {
        (0usize..4, 0usize..2, 0i64..(15 * 60), 0u32..180)
    }

    fn build(specs: &[(usize, usize, i64, u32)]) -> Vec<Arc<Screening>> {
        specs
            .iter()
            .map(|&(title, theater_idx, offset, duration)| {
                let start = at("09:00") + Duration::minutes(offset);
                Arc::new(Screening {
                    title: TITLES[title].to_string(),
                    rating: "PG".to_string(),
                    duration_minutes: duration,
                    start,
                    auditorium: "1".to_string(),
                    screen_type: "2D".to_string(),
                    attributes: Default::default(),
                    theater: TheaterCode::parse(["T1", "T2"][theater_idx]).unwrap(),
                    movie: MovieCode::new(format!("HO{title}")),
                })
            })
            .collect()
    }

    fn params_strategy() -> impl Strategy<Value = SearchParams> {
        (0i64..=60, 30i64..=240, any::<bool>(), proptest::option::of(1usize..3))
            .prop_map(|(buffer, gap_cap, unlimited, break_after)| SearchParams {
                buffer_mins: buffer,
                gap_cap_mins: gap_cap,
                unlimited,
                break_after,
                earliest_start: Some(crate::domain::parse_hhmm("10:00").unwrap()),
                latest_end: Some(crate::domain::parse_hhmm("23:00").unwrap()),
                ..SearchParams::default()
            })
    }

    fn drive() -> DriveTimes {
        DriveTimesBuilder::new("T1").add("T2", 15, 4.0).build().unwrap()
    }

    fn all_titles() -> Vec<String> {
        TITLES.iter().map(|s| s.to_string()).collect()
    }

    proptest! {
        #[test]
        fn no_overlap_without_fudge(
            specs in prop::collection::vec(screening_strategy(), 0..10),
            params in params_strategy(),
        ) {
            let shows = build(&specs);
            let results = enumerate_itineraries(&all_titles(), &shows, &params, date(), &drive());

            for it in &results {
                for pair in it.screenings().windows(2) {
                    prop_assert!(pair[1].start >= pair[0].end());
                }
            }
        }

        #[test]
        fn every_show_inside_window(
            specs in prop::collection::vec(screening_strategy(), 0..10),
            params in params_strategy(),
        ) {
            let shows = build(&specs);
            let window = params.window(date());
            let results = enumerate_itineraries(&all_titles(), &shows, &params, date(), &drive());

            for it in &results {
                for s in it.screenings() {
                    prop_assert!(window.contains(s));
                }
            }
        }

        #[test]
        fn no_result_is_a_prefix_of_another(
            specs in prop::collection::vec(screening_strategy(), 0..10),
            params in params_strategy(),
        ) {
            let shows = build(&specs);
            let results = enumerate_itineraries(&all_titles(), &shows, &params, date(), &drive());

            for (i, a) in results.iter().enumerate() {
                for (j, b) in results.iter().enumerate() {
                    if i == j || a.len() >= b.len() {
                        continue;
                    }
                    let is_prefix = a
                        .screenings()
                        .iter()
                        .zip(b.screenings())
                        .all(|(x, y)| Arc::ptr_eq(x, y));
                    prop_assert!(!is_prefix, "result {} is a prefix of result {}", i, j);
                }
            }
        }

        #[test]
        fn titles_never_repeat(
            specs in prop::collection::vec(screening_strategy(), 0..10),
            params in params_strategy(),
        ) {
            let shows = build(&specs);
            let results = enumerate_itineraries(&all_titles(), &shows, &params, date(), &drive());

            for it in &results {
                let mut seen: Vec<&str> = it.titles().collect();
                let len = seen.len();
                seen.sort();
                seen.dedup();
                prop_assert_eq!(seen.len(), len);
            }
        }

        #[test]
        fn every_usable_screening_starts_some_path(
            specs in prop::collection::vec(screening_strategy(), 0..10),
            params in params_strategy(),
        ) {
            // Any screening inside the window is a valid one-show path, so it
            // must appear in at least one result.
            let shows = build(&specs);
            let window = params.window(date());
            let results = enumerate_itineraries(&all_titles(), &shows, &params, date(), &drive());

            for s in shows.iter().filter(|s| window.contains(s)) {
                prop_assert!(
                    results.iter().any(|it| it.screenings().iter().any(|x| Arc::ptr_eq(x, s)))
                );
            }
        }
    }
}
