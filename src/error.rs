//! Error types for experiment setup and recording.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Float, Time};

/// Errors that can occur while configuring, running or recording an experiment.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A relative error was requested against a reference of zero magnitude.
    #[error("cannot compute relative {quantity} error: reference magnitude is zero")]
    ZeroReference {
        /// Name of the quantity whose reference is zero.
        quantity: &'static str,
    },

    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(Time),

    /// Invalid body mass.
    #[error("invalid mass: {0} (must be positive and finite)")]
    InvalidMass(Float),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing to an in-memory or otherwise unnamed sink failed.
    #[error("write error: {0}")]
    Write(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Plot rendering failed.
    #[error("plot error: {0}")]
    Plot(String),
}

impl BenchError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it concerns.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::InvalidTimestep(_) | Self::InvalidMass(_)
        )
    }

    /// Check if this error comes from a degenerate conservation reference.
    #[must_use]
    pub fn is_zero_reference(&self) -> bool {
        matches!(self, Self::ZeroReference { .. })
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, BenchError>;
