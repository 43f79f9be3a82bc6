//! Arena core
//!
//! Turns "play a move for this bot" into a guaranteed-legal move:
//! - [`Registry`]: engines by key, populated once at startup, read-only after
//! - [`Dispatcher`]: invokes the requested engine behind a failure boundary,
//!   validates the answer and substitutes the capture-preferring fallback
//! - [`DispatchReport`]: per-engine tallies of honored moves and fallbacks
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register(my_descriptor)?;
//! let dispatcher = Dispatcher::new(registry);
//! let outcome = dispatcher.select_move(&board, "my_engine")?;
//! board.play(outcome.mv);
//! ```

mod boundary;
mod dispatcher;
mod registry;
mod report;

pub use boundary::EngineFailure;
pub use dispatcher::*;
pub use registry::*;
pub use report::*;

pub use random_capture::{RandomCaptureEngine, FALLBACK_KEY};

#[cfg(test)]
mod test_support;
