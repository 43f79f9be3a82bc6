//! Failure boundary around third-party engine code.
//!
//! Whatever an engine does (return an error, panic, never return) comes out
//! of here as a plain `Result`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_sdk::{BotEngine, EngineError, GamePosition};
use thiserror::Error;

/// Any abnormal end of an engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineFailure {
    #[error("{0}")]
    Errored(EngineError),
    #[error("engine panicked: {0}")]
    Panicked(String),
    #[error("engine exceeded its {0:?} budget")]
    TimedOut(Duration),
}

/// At most one budgeted worker per engine may be running.
///
/// Claimed when a worker starts and released when it finishes, so a hung
/// engine pins a single thread no matter how often it is dispatched.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkerSlot {
    busy: Arc<AtomicBool>,
}

impl WorkerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_claim(&self) -> Option<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop, including when the worker unwinds.
struct SlotGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Run `engine` against `position`, inline or on a worker thread when a time
/// budget is given.
pub(crate) fn invoke<P>(
    engine: &Arc<dyn BotEngine<P>>,
    position: &P,
    budget: Option<Duration>,
    slot: &WorkerSlot,
) -> Result<P::Move, EngineFailure>
where
    P: GamePosition + Clone + Send + 'static,
{
    match budget {
        None => invoke_inline(engine.as_ref(), position),
        Some(budget) => invoke_budgeted(Arc::clone(engine), position.clone(), budget, slot),
    }
}

fn invoke_inline<P: GamePosition>(engine: &dyn BotEngine<P>, position: &P) -> Result<P::Move, EngineFailure> {
    match panic::catch_unwind(AssertUnwindSafe(|| engine.select(position))) {
        Ok(Ok(mv)) => Ok(mv),
        Ok(Err(err)) => Err(EngineFailure::Errored(err)),
        Err(payload) => Err(EngineFailure::Panicked(panic_message(payload.as_ref()))),
    }
}

/// The worker is detached: if it overruns, the caller moves on and the
/// thread's eventual result is dropped with the channel. While an earlier
/// worker still holds `slot` the engine is not started again and the call
/// counts as timed out straight away.
fn invoke_budgeted<P>(
    engine: Arc<dyn BotEngine<P>>,
    position: P,
    budget: Duration,
    slot: &WorkerSlot,
) -> Result<P::Move, EngineFailure>
where
    P: GamePosition + Send + 'static,
{
    let Some(guard) = slot.try_claim() else {
        return Err(EngineFailure::TimedOut(budget));
    };

    let (tx, rx) = mpsc::sync_channel(1);
    let spawned = thread::Builder::new()
        .name("bot-engine".into())
        .spawn(move || {
            let result = invoke_inline(engine.as_ref(), &position);
            // Free the slot before answering so the caller's next dispatch can use it.
            drop(guard);
            let _ = tx.send(result);
        });
    if let Err(err) = spawned {
        return Err(EngineFailure::Errored(EngineError::Failed(format!(
            "could not start engine worker: {err}"
        ))));
    }

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(EngineFailure::TimedOut(budget)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineFailure::Panicked(
            "engine worker exited without an answer".into(),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "boundary_tests.rs"]
mod boundary_tests;
