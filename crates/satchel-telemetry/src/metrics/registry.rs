// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Identifies a counter by namespace and name (`assets.inserted`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricId {
    /// Subsystem the counter belongs to.
    pub namespace: String,
    /// Counter name inside the namespace.
    pub name: String,
}

impl MetricId {
    /// Creates a new metric identifier.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

#[derive(Debug)]
struct Counter {
    description: String,
    value: Arc<AtomicU64>,
}

/// A cheap, clonable handle to one registered counter.
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    value: Arc<AtomicU64>,
}

impl CounterHandle {
    /// The counter's identifier.
    pub fn id(&self) -> &MetricId {
        &self.id
    }

    /// Adds one.
    pub fn increment(&self) {
        self.add(1);
    }

    /// Adds `amount`.
    pub fn add(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    /// The current value.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A point-in-time copy of one counter, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    /// The counter's identifier.
    pub id: MetricId,
    /// What the counter measures.
    pub description: String,
    /// The value when the snapshot was taken.
    pub value: u64,
}

/// Registry of named counters shared between the components that report them.
///
/// Registering the same id twice returns a handle to the existing counter.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: Mutex<BTreeMap<MetricId, Counter>>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or re-opens) a counter.
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> CounterHandle {
        let id = MetricId::new(namespace, name);
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = counters.entry(id.clone()).or_insert_with(|| Counter {
            description: description.into(),
            value: Arc::new(AtomicU64::new(0)),
        });
        CounterHandle {
            id,
            value: counter.value.clone(),
        }
    }

    /// The current value of a counter, if it is registered.
    pub fn counter_value(&self, namespace: &str, name: &str) -> Option<u64> {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters
            .get(&MetricId::new(namespace, name))
            .map(|counter| counter.value.load(Ordering::Relaxed))
    }

    /// Copies every counter, sorted by id.
    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters
            .iter()
            .map(|(id, counter)| MetricSnapshot {
                id: id.clone(),
                description: counter.description.clone(),
                value: counter.value.load(Ordering::Relaxed),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let registry = MetricsRegistry::new();
        let inserted = registry.register_counter("assets", "inserted", "Assets added");
        inserted.increment();
        inserted.add(2);

        assert_eq!(inserted.get(), 3);
        assert_eq!(registry.counter_value("assets", "inserted"), Some(3));
        assert_eq!(registry.counter_value("assets", "missing"), None);
        assert_eq!(inserted.id().to_string(), "assets.inserted");
    }

    #[test]
    fn re_registering_shares_the_counter() {
        let registry = MetricsRegistry::new();
        let first = registry.register_counter("bundles", "opened", "Bundles opened");
        let second = registry.register_counter("bundles", "opened", "ignored");
        first.increment();
        second.increment();

        assert_eq!(first.get(), 2);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].description, "Bundles opened");
    }

    #[test]
    fn snapshot_is_sorted_and_serializable() {
        let registry = MetricsRegistry::new();
        registry.register_counter("bundles", "closed", "Bundles closed");
        registry.register_counter("assets", "conflicts", "Rejected adds").increment();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[0].id, MetricId::new("assets", "conflicts"));
        assert_eq!(snapshot[1].id, MetricId::new("bundles", "closed"));

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"namespace\":\"assets\""));
        assert!(json.contains("\"value\":1"));
    }
}
