//! Minimax Bot Engines
//!
//! Negamax with alpha-beta pruning over `cozy-chess` boards, shipped as two
//! registrations:
//! - `minimax`: iterative deepening under a tight node and time budget
//! - `martinbot`: a lighter fork that picks among near-equal top moves for a
//!   more human feel

mod eval;
mod search;

use std::time::Duration;

use cozy_chess::{Board, Move};
use engine_sdk::{BotEngine, EngineDescriptor, EngineError, EngineKey};
use rand::thread_rng;

pub use eval::evaluate;
pub use search::{choose_move, MATE_SCORE};


/// Limits and style knobs for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Deepest iteration in plies
    pub max_depth: u8,
    /// Node budget across all iterations
    pub max_nodes: u64,
    /// Wall-clock budget
    pub max_time: Duration,
    /// Pick randomly among this many best root moves (1 = always the best)
    pub random_top: usize,
    /// Only moves within this many centipawns of the best join the pick
    pub random_margin_cp: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::minimax()
    }
}

impl SearchParams {
    pub fn minimax() -> Self {
        Self {
            max_depth: 3,
            max_nodes: 45_000,
            max_time: Duration::from_millis(450),
            random_top: 1,
            random_margin_cp: 0,
        }
    }

    pub fn martinbot() -> Self {
        Self {
            max_depth: 3,
            max_nodes: 10_000,
            max_time: Duration::from_secs(10),
            random_top: 2,
            random_margin_cp: 90,
        }
    }
}

/// Alpha-beta engine with fixed search parameters.
#[derive(Debug, Clone, Default)]
pub struct MinimaxEngine {
    params: SearchParams,
}

impl MinimaxEngine {
    pub fn new(params: SearchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }
}

impl BotEngine<Board> for MinimaxEngine {
    fn select(&self, pos: &Board) -> Result<Move, EngineError> {
        choose_move(pos, &self.params, &mut thread_rng()).ok_or(EngineError::NoLegalMove)
    }
}

pub const MINIMAX_KEY: EngineKey = EngineKey::from_static("minimax");
pub const MARTINBOT_KEY: EngineKey = EngineKey::from_static("martinbot");

/// Every engine this crate contributes, ready for registration.
pub fn descriptors() -> Vec<EngineDescriptor<Board>> {
    vec![
        EngineDescriptor::new(
            MINIMAX_KEY,
            "Minimax (alpha-beta)",
            MinimaxEngine::new(SearchParams::minimax()),
        )
        .with_description(
            "Iterative deepening alpha-beta with capture quiescence and MVV-LVA move ordering.",
        ),
        EngineDescriptor::new(
            MARTINBOT_KEY,
            "MartinBot (basic minimax fork)",
            MinimaxEngine::new(SearchParams::martinbot()),
        )
        .with_description(
            "A basic minimax fork: quick, human-like, and less precise than full minimax.",
        ),
    ]
}
