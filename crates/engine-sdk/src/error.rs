use thiserror::Error;

/// Errors an engine may report instead of a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The position has no legal move (checkmate or stalemate).
    #[error("no legal move in this position")]
    NoLegalMove,
    /// The engine gave up for a reason of its own.
    #[error("engine failed: {0}")]
    Failed(String),
}

/// Rejected engine key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineKeyError {
    #[error("bot engine key must be a non-empty string")]
    Empty,
}
