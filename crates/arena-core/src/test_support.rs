//! Tiny abstract position for exercising the pipeline without a chess board.

use engine_sdk::GamePosition;

/// Moves are plain numbers; `captures` must be a subset of `legal`.
#[derive(Debug, Clone, Default)]
pub(crate) struct TestPosition {
    pub legal: Vec<u8>,
    pub captures: Vec<u8>,
}

impl TestPosition {
    pub fn new(legal: &[u8], captures: &[u8]) -> Self {
        Self {
            legal: legal.to_vec(),
            captures: captures.to_vec(),
        }
    }

    pub fn terminal() -> Self {
        Self::default()
    }
}

impl GamePosition for TestPosition {
    type Move = u8;

    fn legal_moves(&self) -> Vec<u8> {
        self.legal.clone()
    }

    fn is_capture(&self, mv: u8) -> bool {
        self.captures.contains(&mv)
    }
}
