//! Explicit startup registration of the bundled engines.

use arena_core::{Registry, RegistryError};
use cozy_chess::Board;
use tracing::info;

/// Build the registry every game is served from.
///
/// Each engine crate hands over its descriptors and they are registered in a
/// fixed order. A duplicate key is an authoring mistake and fails startup.
pub fn standard_registry() -> Result<Registry<Board>, RegistryError> {
    let mut registry = Registry::new();
    for descriptor in minimax::descriptors() {
        registry.register(descriptor)?;
    }
    info!(engines = registry.len(), "bot engine registry populated");
    Ok(registry)
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod startup_tests;
