use std::collections::HashMap;

use crate::api::config::SourceConfig;
use crate::error::Result;
use crate::sampling::{SamplingStrategy, SourceData};

/// Tracks which configured sources have arrived from the loader.
/// The engine stays inert until every expected source is present.
pub struct SourceRegistry {
    expected: Vec<SourceConfig>,
    ready: HashMap<String, SamplingStrategy>,
}

impl SourceRegistry {
    pub fn new(expected: &[SourceConfig]) -> Self {
        Self {
            expected: expected.to_vec(),
            ready: HashMap::with_capacity(expected.len()),
        }
    }

    /// Accept loaded data for `name`. Returns `Ok(false)` for names that were
    /// never configured; sampling failures (e.g. `EmptySource`) are returned.
    pub fn insert(&mut self, name: &str, data: SourceData) -> Result<bool> {
        let Some(config) = self.expected.iter().find(|s| s.name == name) else {
            log::warn!("ignoring asset for unknown source `{}`", name);
            return Ok(false);
        };
        let strategy = SamplingStrategy::build(name, &config.kind, data)?;
        if self.ready.insert(name.to_string(), strategy).is_some() {
            log::warn!("source `{}` delivered twice; keeping the latest", name);
        }
        Ok(true)
    }

    pub fn is_expected(&self, name: &str) -> bool {
        self.expected.iter().any(|s| s.name == name)
    }

    pub fn is_complete(&self) -> bool {
        self.expected.iter().all(|s| self.ready.contains_key(&s.name))
    }

    /// Names still waiting for data, in configuration order.
    pub fn missing(&self) -> Vec<&str> {
        self.expected
            .iter()
            .filter(|s| !self.ready.contains_key(&s.name))
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn strategies(&self) -> &HashMap<String, SamplingStrategy> {
        &self.ready
    }

    /// Drop all sampled data (after initialization or on teardown).
    pub fn clear(&mut self) {
        self.ready.clear();
    }
}
