// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Trust replay.
//!
//! Rewinds the fleet to a point in time: for every device, the last
//! confidence score observed at or before that instant, and the devices
//! below the SLA confidence floor at that moment.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

use crate::scoring::SLA_MIN_CONFIDENCE;
use crate::store::EventStore;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an event timestamp.
///
/// Accepts RFC 3339, naive date-times (taken as UTC) and bare dates
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// One confidence observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub dev_eui: String,
    /// Display label of the device.
    pub device: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Healthy,
    AtRisk,
}

impl DeviceStatus {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence < SLA_MIN_CONFIDENCE {
            DeviceStatus::AtRisk
        } else {
            DeviceStatus::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Healthy => "Healthy",
            DeviceStatus::AtRisk => "At Risk",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one device at the replay instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    pub device: String,
    pub confidence: f64,
    pub status: DeviceStatus,
    /// When the confidence was observed.
    pub observed_at: DateTime<Utc>,
}

/// Time-ordered confidence points for a whole session.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    points: Vec<TimelinePoint>,
}

impl Timeline {
    /// Build from a store. Events whose timestamp does not parse are dropped.
    pub fn from_store(store: &EventStore) -> Self {
        let names = store.name_maps();
        let mut points = Vec::with_capacity(store.len());
        let mut dropped = 0usize;

        for event in store.events() {
            match parse_timestamp(&event.timestamp) {
                Some(timestamp) => points.push(TimelinePoint {
                    timestamp,
                    dev_eui: event.dev_eui().to_string(),
                    device: names.device_label(event.dev_eui()).to_string(),
                    confidence: event.confidence_score(),
                }),
                None => {
                    dropped += 1;
                    warn!(
                        "dropping event of {} with unparseable timestamp {:?}",
                        event.dev_eui(),
                        event.timestamp
                    );
                }
            }
        }

        // Stable: equal instants keep arrival order
        points.sort_by_key(|p| p.timestamp);
        debug!("timeline: {} points, {} dropped", points.len(), dropped);
        Self { points }
    }

    pub fn points(&self) -> &[TimelinePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest and latest instants, if any.
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.points.first()?.timestamp, self.points.last()?.timestamp))
    }

    /// Points observed at or before `at`.
    pub fn until(&self, at: DateTime<Utc>) -> &[TimelinePoint] {
        let end = self.points.partition_point(|p| p.timestamp <= at);
        &self.points[..end]
    }

    /// Latest state of every device seen by `at`, lowest confidence first.
    pub fn state_at(&self, at: DateTime<Utc>) -> Vec<DeviceState> {
        let mut latest: IndexMap<&str, &TimelinePoint> = IndexMap::new();
        for point in self.until(at) {
            latest.insert(&point.dev_eui, point);
        }

        let mut states: Vec<DeviceState> = latest
            .into_values()
            .map(|p| DeviceState {
                device: p.device.clone(),
                confidence: p.confidence,
                status: DeviceStatus::from_confidence(p.confidence),
                observed_at: p.timestamp,
            })
            .collect();
        states.sort_by(|a, b| a.confidence.total_cmp(&b.confidence));
        states
    }

    /// One line per device below the confidence floor at `at`.
    pub fn active_warnings(&self, at: DateTime<Utc>) -> Vec<String> {
        self.state_at(at)
            .into_iter()
            .filter(|s| s.status == DeviceStatus::AtRisk)
            .map(|s| format!("{} confidence dropped to {:?}", s.device, s.confidence))
            .collect()
    }
}
