//! Error types for rusty-exr

use crate::currency::Currency;
use thiserror::Error;

/// Main error type for rusty-exr
#[derive(Error, Debug)]
pub enum ExrError {
    /// The response has no data set or no time dimension; nothing can be decoded.
    #[error("Dataset structure error: {0}")]
    DecodeStructure(String),

    /// A single raw series could not be decoded. Never propagated past the decoder.
    #[error("Series {key} skipped: {reason}")]
    SeriesSkipped { key: String, reason: String },

    /// The series needed to rebase onto this currency is not in the dataset.
    #[error("Missing series data for base currency {0}")]
    MissingSeriesData(Currency),

    #[error("Input is not a number: {0:?}")]
    InputNotANumber(String),

    #[error("All data sources exhausted: {}", .0.join("; "))]
    AllSourcesExhausted(Vec<String>),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl ExrError {
    /// Whether the error should be shown to the user as a blocking failure.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExrError::AllSourcesExhausted(_))
    }
}

/// Result type alias for rusty-exr operations
pub type Result<T> = std::result::Result<T, ExrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_series_message() {
        let err = ExrError::MissingSeriesData(Currency::SEK);
        assert_eq!(err.to_string(), "Missing series data for base currency SEK");
        assert!(!err.is_terminal());
    }

    #[test]
    fn test_exhausted_lists_every_stage() {
        let err = ExrError::AllSourcesExhausted(vec![
            "live: Network error: offline".to_string(),
            "cached: no previous result".to_string(),
            "fixture: not bundled".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("live"));
        assert!(msg.contains("cached"));
        assert!(msg.contains("fixture"));
        assert!(err.is_terminal());
    }

    #[test]
    fn test_series_skipped_message() {
        let err = ExrError::SeriesSkipped {
            key: "0:3:0:0".to_string(),
            reason: "unknown base currency XYZ".to_string(),
        };
        assert_eq!(err.to_string(), "Series 0:3:0:0 skipped: unknown base currency XYZ");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ExrError = io.into();
        assert!(matches!(err, ExrError::IoError(_)));
    }
}
