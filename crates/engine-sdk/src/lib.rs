//! Bot engine SDK
//!
//! Everything an engine author needs to plug a move-selection procedure into
//! the arena:
//! - [`GamePosition`]: the read-only view of a game an engine is asked about
//! - [`BotEngine`]: the single `select` capability every engine implements
//! - [`EngineDescriptor`]: the static record the registry stores per key
//!
//! The chess rules themselves come from `cozy-chess`; [`GamePosition`] is
//! implemented for [`cozy_chess::Board`] so engines can work with real games
//! out of the box.

mod descriptor;
mod error;
mod position;

pub use cozy_chess;
pub use descriptor::*;
pub use error::*;
pub use position::*;


// =============================================================================
// Engine trait: implemented by every bot engine
// =============================================================================

/// A move-selection procedure.
///
/// Engines are handed a position and propose a move for the side to move.
/// The arena never trusts the answer: every proposal is checked against the
/// position's legal moves before it is played, so an engine that errors,
/// panics or proposes garbage only costs its own turn.
///
/// Engines are shared between concurrently running games, hence `Send + Sync`
/// and `&self`. Any per-call state (search tables, random number generators)
/// must live inside the call.
pub trait BotEngine<P: GamePosition>: Send + Sync {
    /// Propose a move for the side to move in `position`.
    fn select(&self, position: &P) -> Result<P::Move, EngineError>;
}

impl<P, F> BotEngine<P> for F
where
    P: GamePosition,
    F: Fn(&P) -> Result<P::Move, EngineError> + Send + Sync,
{
    fn select(&self, position: &P) -> Result<P::Move, EngineError> {
        self(position)
    }
}
