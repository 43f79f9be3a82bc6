//! Engine registry keyed by stable string keys.

use std::collections::HashMap;

use engine_sdk::{EngineDescriptor, GamePosition};
use random_capture::RandomCaptureEngine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("bot engine key already registered: {0}")]
    DuplicateKey(String),
    #[error("unknown bot engine: {0}")]
    UnknownEngine(String),
}

/// Admin-facing projection of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSummary {
    pub key: String,
    pub name: String,
    pub description: String,
}

/// All engines the arena can dispatch to.
///
/// The fallback engine is always present under [`FALLBACK_KEY`](crate::FALLBACK_KEY).
/// Populate during startup; afterwards share it read-only (it is `Sync`, reads
/// need no locking).
pub struct Registry<P: GamePosition> {
    /// Registration order
    descriptors: Vec<EngineDescriptor<P>>,
    /// Key -> position in `descriptors`
    index: HashMap<String, usize>,
}

impl<P: GamePosition> Registry<P> {
    /// A registry holding only the fallback engine.
    pub fn new() -> Self {
        let mut registry = Self {
            descriptors: Vec::new(),
            index: HashMap::new(),
        };
        registry.insert(RandomCaptureEngine::descriptor());
        registry
    }

    /// Add an engine. Keys are unique; the reserved fallback key is taken
    /// from the start. A failed registration leaves the registry untouched.
    pub fn register(&mut self, descriptor: EngineDescriptor<P>) -> Result<(), RegistryError> {
        let key = descriptor.key().as_str();
        if self.index.contains_key(key) {
            return Err(RegistryError::DuplicateKey(key.to_string()));
        }
        debug!(key, name = descriptor.name(), "registered bot engine");
        self.insert(descriptor);
        Ok(())
    }

    fn insert(&mut self, descriptor: EngineDescriptor<P>) {
        self.index
            .insert(descriptor.key().as_str().to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
    }

    pub fn lookup(&self, key: &str) -> Result<&EngineDescriptor<P>, RegistryError> {
        self.index
            .get(key)
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| RegistryError::UnknownEngine(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Descriptors in registration order, fallback first.
    pub fn list(&self) -> &[EngineDescriptor<P>] {
        &self.descriptors
    }

    /// Serializable listing for an engine-selection control.
    pub fn summaries(&self) -> Vec<EngineSummary> {
        self.descriptors
            .iter()
            .map(|d| EngineSummary {
                key: d.key().to_string(),
                name: d.name().to_string(),
                description: d.description().to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Never true in practice: the fallback is always registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<P: GamePosition> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
