//! Collector registration

use std::collections::BTreeMap;
use std::sync::Arc;

use datakeep_domain::path::validate_collector_name;
use datakeep_domain::Collector;

use crate::SchedulerError;

/// Lookup table of collectors keyed by name
///
/// Registration is the only mutation. The scheduler takes the registry at
/// construction and drives whatever it holds, so a collector's name doubles
/// as its storage namespace and must satisfy the same rules.
#[derive(Default)]
pub struct CollectorRegistry {
    collectors: BTreeMap<String, Arc<dyn Collector>>,
}

impl CollectorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collector
    ///
    /// Rejects names that cannot serve as storage namespaces, zero
    /// intervals, and names already taken.
    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<(), SchedulerError> {
        let name = collector.name().to_string();
        validate_collector_name(&name).map_err(|e| SchedulerError::Registry(e.to_string()))?;
        if collector.interval().is_zero() {
            return Err(SchedulerError::Registry(format!(
                "collector '{}' has a zero interval",
                name
            )));
        }
        if self.collectors.contains_key(&name) {
            return Err(SchedulerError::Registry(format!(
                "collector '{}' is already registered",
                name
            )));
        }
        self.collectors.insert(name, collector);
        Ok(())
    }

    /// Look up a collector by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Collector>> {
        self.collectors.get(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.collectors.keys().cloned().collect()
    }

    /// Registered collectors in name order
    pub fn collectors(&self) -> impl Iterator<Item = &Arc<dyn Collector>> {
        self.collectors.values()
    }

    /// Number of registered collectors
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// Whether anything is registered
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}
