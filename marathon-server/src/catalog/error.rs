//! Catalog error types.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::TheaterCode;

/// Errors from loading a theater's showtimes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// No showtimes are available for this theater and date
    #[error("no showtimes for theater {theater} on {date}")]
    NotFound { theater: TheaterCode, date: NaiveDate },

    /// Reading the source failed
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The source is not a valid showtimes document
    #[error("failed to parse {}: {message}", path.display())]
    Json { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CatalogError::NotFound {
            theater: TheaterCode::parse("1234").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        };
        assert_eq!(err.to_string(), "no showtimes for theater 1234 on 2024-03-15");

        let err = CatalogError::Json {
            path: PathBuf::from("data/1234_03-15-2024.json"),
            message: "expected value".into(),
        };
        assert!(err.to_string().contains("failed to parse"));
        assert!(err.to_string().contains("expected value"));
    }
}
