//! Catalog backed by showtimes documents on disk.
//!
//! Serves previously saved provider responses, one file per theater and
//! day, as if they were fetched live.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::TheaterCode;

use super::convert::convert_document;
use super::error::CatalogError;
use super::types::ShowtimesDocument;
use super::{Catalog, CatalogProvider};

/// Catalog that reads `{theater}_{MM-DD-YYYY}.json` files from a directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for one theater and day.
    pub fn path_for(&self, theater: &TheaterCode, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", theater, date.format("%m-%d-%Y")))
    }
}

impl CatalogProvider for FileCatalog {
    async fn showtimes(
        &self,
        theater: &TheaterCode,
        date: NaiveDate,
    ) -> Result<Catalog, CatalogError> {
        let path = self.path_for(theater, date);

        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::NotFound {
                    theater: theater.clone(),
                    date,
                });
            }
            Err(e) => {
                return Err(CatalogError::Io {
                    path,
                    message: e.to_string(),
                });
            }
        };

        let doc: ShowtimesDocument =
            serde_json::from_str(&json).map_err(|e| CatalogError::Json {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let catalog = convert_document(&doc, theater);
        debug!(
            theater = %theater,
            %date,
            screenings = catalog.screenings.len(),
            upcoming = catalog.upcoming.len(),
            "loaded showtimes from {}",
            path.display()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn theater() -> TheaterCode {
        TheaterCode::parse("1234").unwrap()
    }

    #[test]
    fn file_naming() {
        let catalog = FileCatalog::new("/data");
        assert_eq!(
            catalog.path_for(&theater(), date()),
            PathBuf::from("/data/1234_03-15-2024.json")
        );
    }

    #[tokio::test]
    async fn loads_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("1234_03-15-2024.json"),
            r#"{
                "movies": [{"MasterMovieCode": "HO1", "Title": "Dune", "Duration": "166"}],
                "shows": [{"Film": [{"MasterMovieCode": "HO1", "Title": "Dune",
                    "Performances": [{"CalendarShowTime": "2024-03-15T19:00:00", "Auditorium": 4}]}]}]
            }"#,
        )
        .unwrap();

        let catalog = FileCatalog::new(dir.path())
            .showtimes(&theater(), date())
            .await
            .unwrap();

        assert_eq!(catalog.screenings.len(), 1);
        assert_eq!(catalog.screenings[0].duration_minutes, 166);
        assert_eq!(catalog.screenings[0].auditorium, "4");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let err = FileCatalog::new(dir.path())
            .showtimes(&theater(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1234_03-15-2024.json"), "not json").unwrap();

        let err = FileCatalog::new(dir.path())
            .showtimes(&theater(), date())
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Json { .. }));
    }
}
