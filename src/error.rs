//! Error types for the valuation engine

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the valuation engine
///
/// Errors here indicate caller bugs or invalid configuration.
/// Sparse or noisy business data is never an error: the sanitizer clamps
/// or drops it, the quality gate refuses with an assessment, and the hard
/// gates refuse with a categorized rejection.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Component weights for {scorer} sum to {sum:.4}, expected 1.0 ± {tolerance}")]
    WeightSum {
        scorer: &'static str,
        sum: f64,
        tolerance: f64,
    },

    // Call contract violations
    #[error("Score out of range: {name} = {value}, expected 0-100")]
    ScoreOutOfRange { name: &'static str, value: f64 },

    #[error("Invalid currency amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid percentage: {name} = {value}")]
    InvalidPercentage { name: &'static str, value: f64 },

    // Input document errors (malformed JSON fed to the CLI, not bad data)
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors (config/input file access)
    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is a configuration problem (fatal at startup)
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::WeightSum { .. })
    }

    /// Check if this error indicates a caller contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::ScoreOutOfRange { .. }
                | Error::InvalidAmount(_)
                | Error::InvalidPercentage { .. }
        )
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
