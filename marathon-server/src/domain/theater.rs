//! Theater code types.

use std::fmt;

/// Error returned when parsing an invalid theater code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid theater code: {reason}")]
pub struct InvalidTheaterCode {
    reason: &'static str,
}

/// Longest theater code accepted.
const MAX_LEN: usize = 16;

/// A theater code as used by the showtimes provider (e.g. `"0123"`).
///
/// Codes are short ASCII alphanumeric strings. Surrounding whitespace is
/// trimmed during parsing; anything else outside `[A-Za-z0-9]` is rejected.
///
/// # Examples
///
/// ```
/// use marathon_server::domain::TheaterCode;
///
/// let code = TheaterCode::parse("0123").unwrap();
/// assert_eq!(code.as_str(), "0123");
///
/// assert!(TheaterCode::parse("").is_err());
/// assert!(TheaterCode::parse("01 23").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TheaterCode(String);

impl TheaterCode {
    /// Parse a theater code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidTheaterCode> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidTheaterCode {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_LEN {
            return Err(InvalidTheaterCode {
                reason: "must be at most 16 characters",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidTheaterCode {
                reason: "must be ASCII letters and digits",
            });
        }

        Ok(Self(s.to_string()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TheaterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TheaterCode({})", self.0)
    }
}

impl fmt::Display for TheaterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(TheaterCode::parse("0123").is_ok());
        assert!(TheaterCode::parse("T1").is_ok());
        assert!(TheaterCode::parse("abc9").is_ok());
    }

    #[test]
    fn trims_whitespace() {
        let code = TheaterCode::parse("  0456 ").unwrap();
        assert_eq!(code.as_str(), "0456");
    }

    #[test]
    fn reject_empty() {
        assert!(TheaterCode::parse("").is_err());
        assert!(TheaterCode::parse("   ").is_err());
    }

    #[test]
    fn reject_punctuation() {
        assert!(TheaterCode::parse("01-23").is_err());
        assert!(TheaterCode::parse("01/23").is_err());
        assert!(TheaterCode::parse("0É23").is_err());
    }

    #[test]
    fn reject_too_long() {
        assert!(TheaterCode::parse("12345678901234567").is_err());
        assert!(TheaterCode::parse("1234567890123456").is_ok());
    }

    #[test]
    fn display_and_debug() {
        let code = TheaterCode::parse("0123").unwrap();
        assert_eq!(format!("{}", code), "0123");
        assert_eq!(format!("{:?}", code), "TheaterCode(0123)");
    }
}
