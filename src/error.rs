// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for SentinelMesh
//!
//! Analytics and query resolution never fail: degenerate inputs resolve to
//! defined fallback values. Only loading events and reading configuration
//! can return an error.

use thiserror::Error;

/// Result type alias for SentinelMesh operations
pub type Result<T> = std::result::Result<T, SentinelError>;

/// Main error type for SentinelMesh operations
#[derive(Error, Debug)]
pub enum SentinelError {
    /// Event loading error
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors while loading enriched events
#[derive(Error, Debug)]
pub enum LoadError {
    /// Underlying I/O failure (missing file, unreadable stream)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid enriched event
    #[error("Invalid event at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while reading a report configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::config::ReportConfig`]
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
