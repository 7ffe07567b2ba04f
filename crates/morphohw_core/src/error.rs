//! Error types for the morphohw engine.
//!
//! Load-time input errors carry the offending line, contract violations and
//! substrate failures are kept distinct so callers can tell a bad chromosome
//! from a misbehaving collaborator.

use crate::substrate::SubstrateError;
use thiserror::Error;

/// Main error type for morphohw_core operations.
#[derive(Error, Debug)]
pub enum MorphoError {
    /// Malformed feature record in a chromosome description
    #[error("chromosome line {line}: {message}")]
    Chromosome { line: usize, message: String },

    /// Malformed cytoplasmic determinant line
    #[error("determinant line {line}: {message}")]
    Determinant { line: usize, message: String },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller broke an API contract
    #[error("Contract violation: {0}")]
    Contract(String),

    /// The substrate collaborator failed
    #[error("substrate failure at cell ({row},{col}): {source}")]
    Substrate {
        row: usize,
        col: usize,
        #[source]
        source: SubstrateError,
    },

    /// Snapshot does not match the grid it is restored into
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// File system errors
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for morphohw_core operations.
pub type Result<T> = std::result::Result<T, MorphoError>;

impl MorphoError {
    /// Creates a chromosome load error for the given 1-based line.
    #[must_use]
    pub fn chromosome<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::Chromosome {
            line,
            message: msg.into(),
        }
    }

    #[must_use]
    pub fn determinant<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::Determinant {
            line,
            message: msg.into(),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new contract violation.
    #[must_use]
    pub fn contract<S: Into<String>>(msg: S) -> Self {
        Self::Contract(msg.into())
    }

    /// Creates a new snapshot error.
    #[must_use]
    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        Self::Snapshot(msg.into())
    }

    #[must_use]
    pub fn substrate(row: usize, col: usize, source: SubstrateError) -> Self {
        Self::Substrate { row, col, source }
    }

    /// Returns true for load-time input errors.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Chromosome { .. } | Self::Determinant { .. })
    }
}
