//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from catalog and IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Itinerary has no screenings
    #[error("itinerary must have at least one screening")]
    EmptyItinerary,

    /// Consecutive screenings are not in strictly increasing start order
    #[error("screening of {later} does not start after {earlier}")]
    OutOfOrder { earlier: String, later: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::EmptyItinerary;
        assert_eq!(err.to_string(), "itinerary must have at least one screening");

        let err = DomainError::OutOfOrder {
            earlier: "Dune".into(),
            later: "Wicked".into(),
        };
        assert_eq!(err.to_string(), "screening of Wicked does not start after Dune");
    }
}
