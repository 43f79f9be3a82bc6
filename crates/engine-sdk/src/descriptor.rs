//! Static engine records.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::{BotEngine, EngineKeyError, GamePosition};

/// Stable, non-empty identifier an engine is selected by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineKey(Cow<'static, str>);

impl EngineKey {
    /// Validate and wrap a key. Empty or whitespace-only keys are rejected.
    pub fn new(key: impl Into<String>) -> Result<Self, EngineKeyError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(EngineKeyError::Empty);
        }
        Ok(Self(Cow::Owned(key)))
    }

    /// Key known at compile time. Evaluated in a const context an empty key
    /// fails the build.
    pub const fn from_static(key: &'static str) -> Self {
        assert!(!key.is_empty(), "bot engine key must be a non-empty string");
        Self(Cow::Borrowed(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for EngineKey {
    type Error = EngineKeyError;

    fn try_from(key: &str) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

/// Everything the registry knows about one engine.
///
/// Built once at startup and never mutated afterwards. The engine itself is
/// reference counted so a dispatch can hand it to a worker thread.
pub struct EngineDescriptor<P: GamePosition> {
    key: EngineKey,
    name: String,
    description: String,
    engine: Arc<dyn BotEngine<P>>,
}

impl<P: GamePosition> EngineDescriptor<P> {
    pub fn new(key: EngineKey, name: impl Into<String>, engine: impl BotEngine<P> + 'static) -> Self {
        Self {
            key,
            name: name.into(),
            description: String::new(),
            engine: Arc::new(engine),
        }
    }

    /// Attach a one-line description shown next to the name in listings.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn key(&self) -> &EngineKey {
        &self.key
    }

    /// Human-readable label.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn engine(&self) -> &Arc<dyn BotEngine<P>> {
        &self.engine
    }
}

impl<P: GamePosition> fmt::Debug for EngineDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
