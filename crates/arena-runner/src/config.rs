//! Runner configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use arena_core::DispatchConfig;
use serde::{Deserialize, Serialize};

/// Settings for a run of games. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Games per match
    pub games: u32,
    /// Plies before a game is declared drawn
    pub max_plies: u32,
    /// Per-call engine budget in milliseconds (None = unbounded)
    pub engine_time_budget_ms: Option<u64>,
    /// Starting position (None = standard start)
    pub start_fen: Option<String>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: 2,
            max_plies: 200,
            engine_time_budget_ms: Some(1_000),
            start_fen: None,
        }
    }
}

impl ArenaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            time_budget: self.engine_time_budget_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
