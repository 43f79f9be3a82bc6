//! Per-engine dispatch tallies for spotting misbehaving engines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dispatcher::DispatchOutcome;

/// Counts for one requested engine key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineTally {
    /// Moves played as the engine proposed them
    pub honored: u64,
    /// Fallback moves, by [`FallbackReason::kind`](crate::FallbackReason::kind)
    pub fallbacks: BTreeMap<String, u64>,
}

impl EngineTally {
    pub fn total_fallbacks(&self) -> u64 {
        self.fallbacks.values().sum()
    }

    pub fn total(&self) -> u64 {
        self.honored + self.total_fallbacks()
    }

    /// Share of dispatches that needed the fallback, 0.0 when nothing was dispatched.
    pub fn fallback_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.total_fallbacks() as f64 / total as f64,
        }
    }
}

/// Tallies keyed by requested engine key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub engines: BTreeMap<String, EngineTally>,
}

impl DispatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<M>(&mut self, outcome: &DispatchOutcome<M>) {
        let tally = self.engines.entry(outcome.requested_key.clone()).or_default();
        match &outcome.fallback_reason {
            Some(reason) => *tally.fallbacks.entry(reason.kind().to_string()).or_default() += 1,
            None => tally.honored += 1,
        }
    }

    /// Fold another report (e.g. from a concurrently played game) into this one.
    pub fn merge(&mut self, other: &DispatchReport) {
        for (key, theirs) in &other.engines {
            let ours = self.engines.entry(key.clone()).or_default();
            ours.honored += theirs.honored;
            for (kind, count) in &theirs.fallbacks {
                *ours.fallbacks.entry(kind.clone()).or_default() += count;
            }
        }
    }

    pub fn tally(&self, key: &str) -> Option<&EngineTally> {
        self.engines.get(key)
    }

    /// Keys that needed the fallback at least once, alphabetically.
    pub fn misbehaving(&self) -> impl Iterator<Item = &str> {
        self.engines
            .iter()
            .filter(|(_, tally)| tally.total_fallbacks() > 0)
            .map(|(key, _)| key.as_str())
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
