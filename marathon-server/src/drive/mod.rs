//! Drive times between theaters in a cluster.
//!
//! A cluster is a primary theater plus nearby theaters whose drive time and
//! distance are known relative to the primary. This module answers "how long
//! does it take to get from this screening's theater to the next one's?".

use std::collections::HashMap;

use chrono::Duration;

use crate::domain::TheaterCode;

/// Minutes assumed when a theater has no drive-time entry.
pub const DEFAULT_DRIVE_MINUTES: i64 = 20;

/// Travel cost from the primary theater to another theater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveTime {
    /// Drive time in minutes.
    pub minutes: i64,
    /// Drive distance in miles.
    pub miles: f64,
}

impl DriveTime {
    /// No travel at all (same theater).
    pub const ZERO: DriveTime = DriveTime {
        minutes: 0,
        miles: 0.0,
    };

    /// Used when cluster data lacks an entry: 20 minutes, 0 miles.
    pub const FALLBACK: DriveTime = DriveTime {
        minutes: DEFAULT_DRIVE_MINUTES,
        miles: 0.0,
    };

    pub fn new(minutes: i64, miles: f64) -> Self {
        Self { minutes, miles }
    }

    /// Returns the drive time as a Duration.
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes)
    }
}

/// Drive-time lookup for one cluster.
///
/// Entries are measured from the primary theater. A trip between two
/// non-primary theaters is costed by the destination's entry.
#[derive(Debug, Clone)]
pub struct DriveTimes {
    primary: TheaterCode,
    entries: HashMap<TheaterCode, DriveTime>,
}

impl DriveTimes {
    /// Create a lookup with no entries for the given primary theater.
    pub fn new(primary: TheaterCode) -> Self {
        Self {
            primary,
            entries: HashMap::new(),
        }
    }

    /// Record the drive from the primary theater to `theater`.
    ///
    /// Entries for the primary itself are ignored.
    pub fn add(&mut self, theater: TheaterCode, drive: DriveTime) {
        if theater != self.primary {
            self.entries.insert(theater, drive);
        }
    }

    /// Returns the primary theater.
    pub fn primary(&self) -> &TheaterCode {
        &self.primary
    }

    /// Drive from the primary to `theater`; zero for the primary itself,
    /// the fallback when unknown.
    pub fn from_primary(&self, theater: &TheaterCode) -> DriveTime {
        if theater == &self.primary {
            return DriveTime::ZERO;
        }
        self.entries
            .get(theater)
            .copied()
            .unwrap_or(DriveTime::FALLBACK)
    }

    /// Travel cost from the theater of one screening to the next.
    ///
    /// Zero for the same theater. Otherwise a single lookup from the primary
    /// to whichever end is not the primary; when neither is, the
    /// destination `to` is looked up.
    pub fn between(&self, from: &TheaterCode, to: &TheaterCode) -> DriveTime {
        if from == to {
            return DriveTime::ZERO;
        }
        if to == &self.primary {
            return self.from_primary(from);
        }
        self.from_primary(to)
    }

    /// Theaters with a known drive time, primary first, then by drive minutes.
    pub fn theaters(&self) -> Vec<TheaterCode> {
        let mut others: Vec<(&TheaterCode, &DriveTime)> = self.entries.iter().collect();
        others.sort_by(|a, b| a.1.minutes.cmp(&b.1.minutes).then_with(|| a.0.cmp(b.0)));

        std::iter::once(self.primary.clone())
            .chain(others.into_iter().map(|(code, _)| code.clone()))
            .collect()
    }

    /// Returns the number of non-primary entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no nearby theaters are known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for creating drive-time lookups from string codes.
#[derive(Debug)]
pub struct DriveTimesBuilder {
    inner: Option<DriveTimes>,
}

impl DriveTimesBuilder {
    /// Start a builder for `primary`. Invalid codes produce an empty builder
    /// whose `build` returns `None`.
    pub fn new(primary: &str) -> Self {
        Self {
            inner: TheaterCode::parse(primary).ok().map(DriveTimes::new),
        }
    }

    /// Add a nearby theater; invalid codes are skipped.
    pub fn add(mut self, theater: &str, minutes: i64, miles: f64) -> Self {
        if let (Some(inner), Ok(code)) = (self.inner.as_mut(), TheaterCode::parse(theater)) {
            inner.add(code, DriveTime::new(minutes, miles));
        }
        self
    }

    /// Build the lookup.
    pub fn build(self) -> Option<DriveTimes> {
        self.inner
    }
}
