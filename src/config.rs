// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Report configuration.
//!
//! Only presentation settings live here. Scoring thresholds are constants
//! in [`crate::scoring`] and are not configurable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for the fleet report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Enriched events file (JSONL).
    pub events_path: PathBuf,

    /// Number of entries in the maintenance priority section.
    pub maintenance_top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            events_path: PathBuf::from("enriched_events.jsonl"),
            maintenance_top_n: 5,
        }
    }
}

impl ReportConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maintenance_top_n == 0 {
            return Err(ConfigError::InvalidValue {
                field: "maintenance_top_n",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.events_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "events_path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_events_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.events_path = path.into();
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.maintenance_top_n = top_n;
        self
    }
}
