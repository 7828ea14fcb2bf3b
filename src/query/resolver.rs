// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Answer resolution for classified questions.
//!
//! Device and gateway mentions are found by plain substring search of
//! lower-cased display names in the question, in name-map order. The first
//! hit wins even when a longer name would also match ("Door" shadows
//! "Door Sensor 08" if it comes first).

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use super::intent::Intent;
use crate::event::Event;
use crate::names::NameMaps;
use crate::scoring::{needs_maintenance, SLA_MIN_CONFIDENCE};
use crate::store::DeviceMetricsMap;

/// Universal fallback for anything the engine cannot answer.
pub const UNSUPPORTED_QUESTION: &str = "Unsupported question.";
pub const NO_FAULTY_DEVICES: &str = "No faulty devices detected";
pub const NO_UNSTABLE_GATEWAYS: &str = "No unstable gateways";
pub const NO_LOCATION_DATA: &str = "No location data available";

/// Resolved answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    List(Vec<String>),
    Map(Map<String, Value>),
}

impl Answer {
    pub fn unsupported() -> Self {
        Answer::Text(UNSUPPORTED_QUESTION.to_string())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Answer::Text(text) if text == UNSUPPORTED_QUESTION)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Answer::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Answer::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(text) => f.write_str(text),
            Answer::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "- {}", item)?;
                }
                Ok(())
            }
            Answer::Map(map) => write!(f, "{}", Value::Object(map.clone())),
        }
    }
}

/// Fleet scan result before sentinel rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Vec<String>),
    Empty,
}

impl Lookup {
    pub fn from_vec(items: Vec<String>) -> Self {
        if items.is_empty() {
            Lookup::Empty
        } else {
            Lookup::Found(items)
        }
    }

    /// Render, replacing an empty result with a one-element sentinel list.
    pub fn or_sentinel(self, sentinel: &str) -> Answer {
        match self {
            Lookup::Found(items) => Answer::List(items),
            Lookup::Empty => Answer::List(vec![sentinel.to_string()]),
        }
    }
}

/// Lower-cased display name -> identity, in name-map order.
///
/// Names colliding after lower-casing keep their first position and the
/// last identity.
fn reverse_names(names: &IndexMap<String, String>) -> IndexMap<String, &str> {
    let mut reverse = IndexMap::new();
    for (id, name) in names {
        reverse.insert(name.to_lowercase(), id.as_str());
    }
    reverse
}

/// First identity whose display name occurs in `text`.
pub fn find_entity<'a>(names: &'a IndexMap<String, String>, text: &str) -> Option<&'a str> {
    let text = text.to_lowercase();
    reverse_names(names)
        .into_iter()
        .find(|(name, _)| text.contains(name.as_str()))
        .map(|(_, id)| id)
}

/// Resolve a classified question against the loaded data.
///
/// Confidence averages are rendered with `{:?}`, so they always carry a
/// decimal point: an average of 87 reads `87.0`.
pub fn handle_query(
    intent: Intent,
    argument: Option<&str>,
    events: &[Event],
    metrics: &DeviceMetricsMap,
    names: &NameMaps,
) -> Answer {
    let answer = match intent {
        Intent::ListDevices => {
            // Devices sharing a display name are each listed
            let mut labels: Vec<String> = names.devices.values().cloned().collect();
            labels.sort();
            Answer::List(labels)
        }
        Intent::ListGateways => {
            Answer::List(sorted_distinct(names.gateways.values().map(String::as_str)))
        }
        Intent::CountDevices => Answer::Text(format!("There are {} devices.", names.devices.len())),
        Intent::CountGateways => {
            Answer::Text(format!("There are {} gateways.", names.gateways.len()))
        }
        Intent::FaultyDevices => Lookup::from_vec(
            metrics
                .iter()
                .filter(|(_, m)| m.avg_confidence < SLA_MIN_CONFIDENCE)
                .map(|(device, _)| names.device_label(device).to_string())
                .collect(),
        )
        .or_sentinel(NO_FAULTY_DEVICES),
        Intent::MaintenanceDevices => Answer::List(
            metrics
                .iter()
                .filter(|(_, m)| needs_maintenance(m))
                .map(|(device, _)| names.device_label(device).to_string())
                .collect(),
        ),
        Intent::WorstDevice => metrics
            .iter()
            .min_by(|a, b| a.1.avg_confidence.total_cmp(&b.1.avg_confidence))
            .map_or_else(Answer::unsupported, |(device, _)| {
                Answer::Text(names.device_label(device).to_string())
            }),
        Intent::UnstableGateways => Lookup::from_vec(
            names
                .gateways
                .iter()
                .filter(|(gateway, _)| confidence_unstable(events, gateway))
                .map(|(_, label)| label.clone())
                .collect(),
        )
        .or_sentinel(NO_UNSTABLE_GATEWAYS),
        Intent::DeviceId
        | Intent::SensorType
        | Intent::LastSeen
        | Intent::DeviceLocation
        | Intent::MessageCount
        | Intent::DeviceConfidence
        | Intent::DeviceHealth
        | Intent::DeviceGateway => find_entity(&names.devices, argument.unwrap_or_default())
            .and_then(|device| device_answer(intent, device, events, metrics, names))
            .unwrap_or_else(Answer::unsupported),
        Intent::GatewayDevices | Intent::GatewayEvents => {
            find_entity(&names.gateways, argument.unwrap_or_default())
                .map(|gateway| gateway_answer(intent, gateway, events, names))
                .unwrap_or_else(Answer::unsupported)
        }
        Intent::Unknown => Answer::unsupported(),
    };

    debug!("resolved {} (unsupported: {})", intent, answer.is_unsupported());
    answer
}

fn device_answer(
    intent: Intent,
    device: &str,
    events: &[Event],
    metrics: &DeviceMetricsMap,
    names: &NameMaps,
) -> Option<Answer> {
    let name = names.device_label(device);
    let mut own = events.iter().filter(|e| e.dev_eui() == device);

    let answer = match intent {
        Intent::DeviceId => Answer::Text(format!("{} device ID is {}", name, device)),
        Intent::SensorType => {
            let profile = &own.next()?.device.profile;
            Answer::Text(format!("{} is a {} sensor", name, profile))
        }
        Intent::LastSeen => {
            // Lexicographic, on the raw timestamp strings
            let last = own.map(|e| e.timestamp.as_str()).max()?;
            Answer::Text(format!("Last data received at {}", last))
        }
        Intent::DeviceLocation => match own.filter_map(|e| e.rf.known_location()).last() {
            Some(Value::String(location)) => Answer::Text(location.clone()),
            Some(Value::Object(location)) => Answer::Map(location.clone()),
            Some(other) => Answer::Text(other.to_string()),
            None => Answer::Text(NO_LOCATION_DATA.to_string()),
        },
        Intent::MessageCount => {
            Answer::Text(format!("{} has sent {} messages", name, own.count()))
        }
        Intent::DeviceConfidence => {
            let avg = metrics.get(device)?.avg_confidence;
            Answer::Text(format!("{} average confidence is {:?}", name, avg))
        }
        Intent::DeviceHealth => {
            let healthy = metrics.get(device)?.avg_confidence >= SLA_MIN_CONFIDENCE;
            Answer::Text(if healthy { "Healthy" } else { "At risk" }.to_string())
        }
        Intent::DeviceGateway => Answer::List(sorted_distinct(
            own.filter_map(|e| e.rf.gateway())
                .map(|gateway| names.gateway_label(gateway)),
        )),
        _ => return None,
    };
    Some(answer)
}

fn gateway_answer(intent: Intent, gateway: &str, events: &[Event], names: &NameMaps) -> Answer {
    let seen = events.iter().filter(|e| e.rf.gateway() == Some(gateway));

    match intent {
        Intent::GatewayDevices => {
            Answer::List(sorted_distinct(seen.map(|e| names.device_label(e.dev_eui()))))
        }
        Intent::GatewayEvents => Answer::Text(format!(
            "{} handled {} events",
            names.gateway_label(gateway),
            seen.count()
        )),
        _ => Answer::unsupported(),
    }
}

/// A gateway is confidence-unstable when any of its events scored below 70.
/// Unrelated to RSSI variance, see [`crate::fleet::rf_unstable`].
pub fn confidence_unstable(events: &[Event], gateway: &str) -> bool {
    events
        .iter()
        .any(|e| e.rf.gateway() == Some(gateway) && e.confidence_score() < SLA_MIN_CONFIDENCE)
}

/// Distinct, sorted.
fn sorted_distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DeviceMetrics;
    use serde_json::json;

    fn names_of(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    #[test]
    fn test_find_entity_first_match_wins() {
        let names = names_of(&[("short", "Door"), ("long", "Door Sensor 08")]);
        assert_eq!(find_entity(&names, "where is door sensor 08?"), Some("short"));

        let names = names_of(&[("long", "Door Sensor 08"), ("short", "Door")]);
        assert_eq!(find_entity(&names, "where is door sensor 08?"), Some("long"));
    }

    #[test]
    fn test_find_entity_is_case_insensitive() {
        let names = names_of(&[("d1", "Boiler Room")]);
        assert_eq!(find_entity(&names, "Is BOILER ROOM healthy"), Some("d1"));
        assert_eq!(find_entity(&names, "is the kitchen healthy"), None);
    }

    #[test]
    fn test_lowercase_collision_keeps_last_identity() {
        let names = names_of(&[("d1", "Pump"), ("d2", "Valve"), ("d3", "PUMP")]);
        assert_eq!(find_entity(&names, "pump"), Some("d3"));
    }

    #[test]
    fn test_lookup_sentinel() {
        assert_eq!(
            Lookup::from_vec(vec![]).or_sentinel(NO_FAULTY_DEVICES),
            Answer::List(vec![NO_FAULTY_DEVICES.to_string()])
        );
        assert_eq!(
            Lookup::from_vec(vec!["a".into()]).or_sentinel(NO_FAULTY_DEVICES),
            Answer::List(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_answer_display() {
        let list = Answer::List(vec!["a".into(), "b".into()]);
        assert_eq!(list.to_string(), "- a\n- b");
        assert_eq!(Answer::unsupported().to_string(), UNSUPPORTED_QUESTION);

        let mut map = Map::new();
        map.insert("lat".into(), json!(1.5));
        assert_eq!(Answer::Map(map).to_string(), r#"{"lat":1.5}"#);
    }

    #[test]
    fn test_answer_serializes_untagged() {
        let json = serde_json::to_string(&Answer::List(vec!["x".into()])).unwrap();
        assert_eq!(json, r#"["x"]"#);
        let json = serde_json::to_string(&Answer::Text("ok".into())).unwrap();
        assert_eq!(json, r#""ok""#);
    }

    #[test]
    fn test_device_confidence_keeps_decimal_point() {
        let events = vec![Event::new("t1", "d1", 90.0).with_name("Boiler")];
        let names = NameMaps::from_events(&events);
        let mut metrics = DeviceMetricsMap::new();
        metrics.insert("d1".into(), DeviceMetrics::new(87.0));

        let answer = handle_query(
            Intent::DeviceConfidence,
            Some("boiler confidence"),
            &events,
            &metrics,
            &names,
        );
        assert_eq!(answer.as_text(), Some("Boiler average confidence is 87.0"));
    }

    #[test]
    fn test_worst_device_on_empty_fleet() {
        let answer = handle_query(
            Intent::WorstDevice,
            None,
            &[],
            &DeviceMetricsMap::new(),
            &NameMaps::default(),
        );
        assert!(answer.is_unsupported());
    }

    #[test]
    fn test_missing_argument_is_unsupported() {
        let events = vec![Event::new("t1", "d1", 90.0).with_name("Boiler")];
        let names = NameMaps::from_events(&events);
        let metrics = DeviceMetricsMap::new();
        let answer = handle_query(Intent::DeviceId, None, &events, &metrics, &names);
        assert!(answer.is_unsupported());
    }
}
