//! Failure kinds of a single rate update run

use thiserror::Error;

/// Every way a run can abort. None of them leave a partial write behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("invalid response shape: {0}")]
    InvalidResponseShape(String),

    #[error("invalid rate: {0}")]
    InvalidRate(String),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl RateError {
    /// Stable label used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            RateError::Configuration(_) => "ConfigurationError",
            RateError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            RateError::InvalidResponseShape(_) => "InvalidResponseShape",
            RateError::InvalidRate(_) => "InvalidRate",
            RateError::Persistence(_) => "PersistenceError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(
            RateError::Configuration("x".into()).kind(),
            "ConfigurationError"
        );
        assert_eq!(
            RateError::UpstreamUnavailable("x".into()).kind(),
            "UpstreamUnavailable"
        );
        assert_eq!(
            RateError::InvalidResponseShape("x".into()).kind(),
            "InvalidResponseShape"
        );
        assert_eq!(RateError::InvalidRate("x".into()).kind(), "InvalidRate");
        assert_eq!(RateError::Persistence("x".into()).kind(), "PersistenceError");
    }

    #[test]
    fn test_display_includes_message() {
        let err = RateError::InvalidRate("rate must be positive, got 0".to_string());
        assert_eq!(err.to_string(), "invalid rate: rate must be positive, got 0");
    }
}
