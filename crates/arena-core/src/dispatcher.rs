//! Dispatch, validation and fallback.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use engine_sdk::GamePosition;
use rand::{thread_rng, Rng};
use random_capture::{RandomCaptureEngine, FALLBACK_KEY};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::boundary::{self, EngineFailure, WorkerSlot};
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Terminal position: nothing to play. The game loop should not have asked.
    #[error("no legal move in this position")]
    NoLegalMove,
}

/// Dispatcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Wall-clock budget per engine call (None = run inline, unbounded).
    pub time_budget: Option<Duration>,
}

/// Why the requested engine's move was not played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    UnknownEngine,
    EngineError(String),
    Panicked(String),
    TimedOut(Duration),
    /// Well-typed answer that is not in the legal set.
    IllegalMove(String),
}

impl FallbackReason {
    /// Stable short label, used as a tally key.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownEngine => "unknown_engine",
            Self::EngineError(_) => "engine_error",
            Self::Panicked(_) => "panicked",
            Self::TimedOut(_) => "timed_out",
            Self::IllegalMove(_) => "illegal_move",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEngine => write!(f, "engine is not registered"),
            Self::EngineError(msg) => write!(f, "engine returned an error: {msg}"),
            Self::Panicked(msg) => write!(f, "engine panicked: {msg}"),
            Self::TimedOut(budget) => write!(f, "engine exceeded its {budget:?} budget"),
            Self::IllegalMove(mv) => write!(f, "engine proposed illegal move {mv}"),
        }
    }
}

impl From<EngineFailure> for FallbackReason {
    fn from(failure: EngineFailure) -> Self {
        match failure {
            EngineFailure::Errored(err) => Self::EngineError(err.to_string()),
            EngineFailure::Panicked(msg) => Self::Panicked(msg),
            EngineFailure::TimedOut(budget) => Self::TimedOut(budget),
        }
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome<M> {
    /// Key the game asked for
    pub requested_key: String,
    /// Key of the engine whose move is returned
    pub used_key: String,
    /// Always legal in the dispatched position
    pub mv: M,
    /// True when the requested engine's move was not honored
    pub fell_back: bool,
    /// Set exactly when `fell_back` is
    pub fallback_reason: Option<FallbackReason>,
}

/// The only path from a game loop to an engine.
///
/// Looks up the requested engine, runs it behind a failure boundary, checks
/// its move against the legal set and, on any failure, plays the fallback
/// engine's move instead. The fallback runs at most once per call and is
/// never itself replaced.
pub struct Dispatcher<P: GamePosition> {
    registry: Registry<P>,
    fallback: RandomCaptureEngine,
    config: DispatchConfig,
    /// One budgeted worker slot per registered key
    slots: HashMap<String, WorkerSlot>,
}

impl<P> Dispatcher<P>
where
    P: GamePosition + Clone + Send + 'static,
{
    pub fn new(registry: Registry<P>) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    pub fn with_config(registry: Registry<P>, config: DispatchConfig) -> Self {
        let slots = registry
            .list()
            .iter()
            .map(|d| (d.key().to_string(), WorkerSlot::new()))
            .collect();
        Self {
            registry,
            fallback: RandomCaptureEngine::new(),
            config,
            slots,
        }
    }

    /// Whether a worker for `key` from an earlier, overrun call is still running.
    pub fn is_engine_busy(&self, key: &str) -> bool {
        self.slots.get(key).is_some_and(WorkerSlot::is_busy)
    }

    pub fn registry(&self) -> &Registry<P> {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Produce a legal move for `position` using the engine under `key`.
    pub fn select_move(&self, position: &P, key: &str) -> Result<DispatchOutcome<P::Move>, DispatchError> {
        self.select_move_with_rng(position, key, &mut thread_rng())
    }

    /// [`select_move`](Self::select_move) with an explicit random source for
    /// the fallback.
    pub fn select_move_with_rng<R: Rng + ?Sized>(
        &self,
        position: &P,
        key: &str,
        rng: &mut R,
    ) -> Result<DispatchOutcome<P::Move>, DispatchError> {
        let legal = position.legal_moves();
        if legal.is_empty() {
            return Err(DispatchError::NoLegalMove);
        }

        let reason = match self.registry.lookup(key).map(|d| (d, &self.slots[key])) {
            Err(_) => FallbackReason::UnknownEngine,
            Ok((descriptor, slot)) => match boundary::invoke(descriptor.engine(), position, self.config.time_budget, slot) {
                Ok(mv) if legal.contains(&mv) => {
                    trace!(key, %mv, "engine move accepted");
                    return Ok(DispatchOutcome {
                        requested_key: key.to_string(),
                        used_key: key.to_string(),
                        mv,
                        fell_back: false,
                        fallback_reason: None,
                    });
                }
                Ok(mv) => FallbackReason::IllegalMove(mv.to_string()),
                Err(failure) => failure.into(),
            },
        };

        warn!(key, reason = %reason, "bot engine failed, playing fallback move");

        let mv = self
            .fallback
            .choose(position, rng)
            .map_err(|_| DispatchError::NoLegalMove)?;

        Ok(DispatchOutcome {
            requested_key: key.to_string(),
            used_key: FALLBACK_KEY.to_string(),
            mv,
            fell_back: true,
            fallback_reason: Some(reason),
        })
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod dispatcher_tests;
