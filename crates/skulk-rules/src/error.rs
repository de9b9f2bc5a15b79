//! Error and Result types for Skulk rule construction and execution.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A convenience `Result` type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// The error type for rule operations.
///
/// Every variant except [`RuleError::Io`], [`RuleError::Json`] and
/// [`RuleError::TimestampRender`] is a configuration error raised while a rule
/// is being built, before the traversal engine gets to call any hook.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Threshold time is not a valid RFC 3339 timestamp.
    #[error("Invalid time {value:?}: {source}")]
    InvalidTime {
        /// The rejected input.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// Output format name is not one of the supported encodings.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Timestamp layout contains items that cannot be rendered.
    #[error("Invalid timestamp layout: {0:?}")]
    InvalidTimestampLayout(String),

    /// Output file could not be created.
    #[error("Failed to create output {path:?}: {source}")]
    OutputCreate {
        /// Requested output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Rules document could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Underlying I/O error while writing a report.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A timestamp could not be rendered with the configured layout.
    #[error("Timestamp render error: {0}")]
    TimestampRender(String),
}

impl RuleError {
    /// Returns true if this error was raised while constructing a rule.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidTime { .. }
                | Self::UnsupportedFormat(_)
                | Self::InvalidTimestampLayout(_)
                | Self::OutputCreate { .. }
                | Self::Config(_)
        )
    }
}
