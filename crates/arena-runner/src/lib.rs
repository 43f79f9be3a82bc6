//! Arena Runner
//!
//! Wires the bundled engines into a registry at startup and plays bot games
//! through the dispatcher.
//!
//! # Usage
//!
//! ```bash
//! # Show every engine an account can be assigned
//! cargo run -p arena-runner -- list
//!
//! # Play minimax against martinbot, 4 games, 200ms per engine call
//! cargo run -p arena-runner -- play --white minimax --black martinbot --games 4 --budget-ms 200
//! ```

mod config;
mod match_runner;
mod startup;

pub use config::*;
pub use match_runner::*;
pub use startup::*;
