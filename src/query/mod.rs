// SentinelMesh - Trust & reliability engine for IoT telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Natural-language query engine.
//!
//! A question goes through two pure stages:
//!
//! ```text
//! "Is Boiler healthy?" --parse_query--> (DeviceHealth, "is boiler healthy?")
//!                      --handle_query--> Answer::Text("Healthy")
//! ```
//!
//! [`QueryEngine`] bundles both over a loaded [`EventStore`].

pub mod intent;
pub mod resolver;

pub use intent::{parse_query, Intent, IntentRule, Matcher, ParsedQuery, INTENT_RULES};
pub use resolver::{
    confidence_unstable, find_entity, handle_query, Answer, Lookup, NO_FAULTY_DEVICES,
    NO_LOCATION_DATA, NO_UNSTABLE_GATEWAYS, UNSUPPORTED_QUESTION,
};

use crate::names::NameMaps;
use crate::store::EventStore;

/// Question answering over one event store.
#[derive(Debug, Clone)]
pub struct QueryEngine<'s> {
    store: &'s EventStore,
    names: NameMaps,
}

impl<'s> QueryEngine<'s> {
    /// Build name maps once for the whole session.
    pub fn new(store: &'s EventStore) -> Self {
        Self {
            store,
            names: store.name_maps(),
        }
    }

    pub fn names(&self) -> &NameMaps {
        &self.names
    }

    /// Classify and answer a question.
    pub fn ask(&self, question: &str) -> Answer {
        self.resolve(&parse_query(question))
    }

    pub fn resolve(&self, query: &ParsedQuery) -> Answer {
        handle_query(
            query.intent,
            query.argument.as_deref(),
            self.store.events(),
            self.store.device_metrics(),
            &self.names,
        )
    }
}
