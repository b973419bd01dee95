//! Theater lookup and search.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::domain::TheaterCode;
use crate::drive::{DriveTime, DriveTimes};

use super::error::DirectoryError;

/// Top-level shape of `theatre_list.json`.
#[derive(Debug, Deserialize)]
struct TheaterListDto {
    theatre_list: Vec<TheaterEntryDto>,
}

#[derive(Debug, Deserialize)]
struct TheaterEntryDto {
    item: TheaterDto,
}

#[derive(Debug, Deserialize)]
struct TheaterDto {
    name: String,
    theatre_code: String,
    #[serde(default)]
    path_name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    nearby: Vec<NearbyDto>,
}

#[derive(Debug, Deserialize)]
struct NearbyDto {
    theatre_code: String,
    minutes: i64,
    #[serde(default)]
    miles: f64,
}

/// A theater and its nearby cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Theater {
    pub code: TheaterCode,
    pub name: String,
    /// URL slug on the chain's website.
    pub path_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Nearby theaters with drive cost from this one.
    pub nearby: Vec<(TheaterCode, DriveTime)>,
}

impl Theater {
    /// "Name - City".
    pub fn label(&self) -> String {
        format!("{} - {}", self.name, self.city)
    }

    fn from_dto(dto: TheaterDto) -> Option<Self> {
        let code = match TheaterCode::parse(&dto.theatre_code) {
            Ok(code) => code,
            Err(e) => {
                warn!(name = %dto.name, code = %dto.theatre_code, "skipping theater: {e}");
                return None;
            }
        };

        let nearby = dto
            .nearby
            .into_iter()
            .filter_map(|n| {
                let other = TheaterCode::parse(&n.theatre_code).ok()?;
                Some((other, DriveTime::new(n.minutes, n.miles)))
            })
            .collect();

        Some(Self {
            code,
            name: dto.name,
            path_name: dto.path_name,
            address: dto.address,
            city: dto.city,
            state: dto.state,
            latitude: dto.latitude,
            longitude: dto.longitude,
            nearby,
        })
    }
}

/// How a theater search query is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring of the name.
    Name,
    /// Case-insensitive substring of address, city or state.
    Location,
    /// Exact theater code.
    Code,
}

/// Immutable theater lookup, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct TheaterDirectory {
    theaters: Vec<Theater>,
    by_code: HashMap<TheaterCode, usize>,
}

impl TheaterDirectory {
    /// Build a directory from theaters; later duplicates of a code are ignored.
    pub fn new(theaters: Vec<Theater>) -> Self {
        let mut kept = Vec::with_capacity(theaters.len());
        let mut by_code = HashMap::with_capacity(theaters.len());

        for theater in theaters {
            if by_code.contains_key(&theater.code) {
                warn!(code = %theater.code, "duplicate theater code");
                continue;
            }
            by_code.insert(theater.code.clone(), kept.len());
            kept.push(theater);
        }

        Self {
            theaters: kept,
            by_code,
        }
    }

    /// Parse `theatre_list.json` content. Records with invalid codes are
    /// skipped.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let list: TheaterListDto = serde_json::from_str(json).map_err(|e| DirectoryError::Json {
            message: e.to_string(),
        })?;

        let theaters = list
            .theatre_list
            .into_iter()
            .filter_map(|entry| Theater::from_dto(entry.item))
            .collect();

        Ok(Self::new(theaters))
    }

    /// Load the directory from a file.
    ///
    /// Fails if the file is unreadable or yields no theaters.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let directory = Self::from_json(&json)?;
        if directory.is_empty() {
            return Err(DirectoryError::Empty);
        }
        Ok(directory)
    }

    /// Look up a theater by code.
    pub fn get(&self, code: &TheaterCode) -> Option<&Theater> {
        self.by_code.get(code).map(|&idx| &self.theaters[idx])
    }

    /// Theaters whose name contains `query`, ignoring case.
    pub fn search_name(&self, query: &str) -> Vec<&Theater> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.theaters
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Theaters whose address, city or state contains `query`, ignoring case.
    pub fn search_location(&self, query: &str) -> Vec<&Theater> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.theaters
            .iter()
            .filter(|t| {
                [&t.address, &t.city, &t.state]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Search by the given mode.
    pub fn search(&self, mode: SearchMode, query: &str) -> Vec<&Theater> {
        match mode {
            SearchMode::Name => self.search_name(query),
            SearchMode::Location => self.search_location(query),
            SearchMode::Code => TheaterCode::parse(query)
                .ok()
                .and_then(|code| self.get(&code))
                .into_iter()
                .collect(),
        }
    }

    /// Drive-time lookup for the cluster around `primary`.
    ///
    /// Returns `None` if the theater is unknown.
    pub fn cluster(&self, primary: &TheaterCode) -> Option<DriveTimes> {
        let theater = self.get(primary)?;
        let mut drive = DriveTimes::new(theater.code.clone());
        for (code, cost) in &theater.nearby {
            drive.add(code.clone(), *cost);
        }
        Some(drive)
    }

    /// Returns the number of theaters.
    pub fn len(&self) -> usize {
        self.theaters.len()
    }

    /// Check if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.theaters.is_empty()
    }

    /// All theaters in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Theater> {
        self.theaters.iter()
    }
}
