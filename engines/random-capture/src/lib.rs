//! Random Capture Engine
//!
//! Picks a random legal move, but prefers captures when any exist.
//! Useful as:
//! - The fallback behind every other engine (it never fails while a legal move exists)
//! - A baseline opponent (any real engine should easily beat this)

use engine_sdk::{BotEngine, EngineDescriptor, EngineError, EngineKey, GamePosition};
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};


/// Reserved key the fallback engine is registered under.
pub const FALLBACK_KEY: EngineKey = EngineKey::from_static("random_capture");

/// Capture-preferring random mover.
///
/// Stateless: the only input besides the position is the random source, so
/// the same engine value can serve any number of games at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCaptureEngine;

impl RandomCaptureEngine {
    pub fn new() -> Self {
        Self
    }

    /// Choose uniformly among the captures, or among all legal moves when
    /// there is nothing to capture.
    pub fn choose<P, R>(&self, pos: &P, rng: &mut R) -> Result<P::Move, EngineError>
    where
        P: GamePosition,
        R: Rng + ?Sized,
    {
        let legal = pos.legal_moves();
        if legal.is_empty() {
            return Err(EngineError::NoLegalMove);
        }

        let captures: Vec<P::Move> = legal.iter().copied().filter(|&mv| pos.is_capture(mv)).collect();
        let pool = if captures.is_empty() { &legal } else { &captures };

        pool.choose(rng).copied().ok_or(EngineError::NoLegalMove)
    }

    /// The descriptor the registry seeds itself with.
    pub fn descriptor<P: GamePosition>() -> EngineDescriptor<P> {
        EngineDescriptor::new(FALLBACK_KEY, "Random (captures first)", Self)
            .with_description("Picks a random legal move, but prefers captures when available.")
    }
}

impl<P: GamePosition> BotEngine<P> for RandomCaptureEngine {
    fn select(&self, pos: &P) -> Result<P::Move, EngineError> {
        self.choose(pos, &mut thread_rng())
    }
}
