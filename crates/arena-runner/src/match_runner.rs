//! Match runner for playing bot games through the dispatcher

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use arena_core::{DispatchError, DispatchReport, Dispatcher};
use cozy_chess::{Board, Color, File, GameStatus, Move, Piece, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ArenaConfig;

/// How a game ended, from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

/// One finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub result: GameResult,
    /// Moves in UCI notation
    pub moves: Vec<String>,
    /// Dispatch tallies for this game only
    pub dispatch: DispatchReport,
}

/// Aggregate of a match between two engine keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub white: String,
    pub black: String,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
    pub games: Vec<GameRecord>,
    pub dispatch: DispatchReport,
}

impl MatchSummary {
    fn new(white: &str, black: &str) -> Self {
        Self {
            white: white.to_string(),
            black: black.to_string(),
            white_wins: 0,
            black_wins: 0,
            draws: 0,
            games: Vec::new(),
            dispatch: DispatchReport::new(),
        }
    }

    fn add_game(&mut self, game: GameRecord) {
        match game.result {
            GameResult::WhiteWins => self.white_wins += 1,
            GameResult::BlackWins => self.black_wins += 1,
            GameResult::Draw => self.draws += 1,
        }
        self.dispatch.merge(&game.dispatch);
        self.games.push(game);
    }
}

/// Standard UCI text for `mv`, played from `board`.
///
/// `cozy-chess` encodes castling as the king capturing its own rook (`e1h1`);
/// UCI wants the king's destination square (`e1g1`).
pub fn uci_notation(board: &Board, mv: Move) -> String {
    let castles = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    if !castles {
        return mv.to_string();
    }
    let file = if mv.to.file() as usize > mv.from.file() as usize { File::G } else { File::C };
    let to = Square::new(file, mv.from.rank());
    Move { to, ..mv }.to_string()
}

/// Parse the configured start position, or the standard one.
pub fn start_position(config: &ArenaConfig) -> Result<Board> {
    match &config.start_fen {
        Some(fen) => Board::from_fen(fen, false).map_err(|e| anyhow!("invalid start FEN {fen:?}: {e:?}")),
        None => Ok(Board::default()),
    }
}

/// Play a single game. Every move goes through the dispatcher, so a
/// misbehaving engine costs only its own turns.
pub fn play_game(
    dispatcher: &Dispatcher<Board>,
    white: &str,
    black: &str,
    start: Board,
    max_plies: u32,
) -> Result<GameRecord> {
    let mut board = start;
    let mut moves = Vec::new();
    let mut dispatch = DispatchReport::new();

    let result = loop {
        match board.status() {
            GameStatus::Won => {
                // Side to move is checkmated
                break match board.side_to_move() {
                    Color::White => GameResult::BlackWins,
                    Color::Black => GameResult::WhiteWins,
                };
            }
            GameStatus::Drawn => break GameResult::Draw,
            GameStatus::Ongoing => {}
        }
        if board.halfmove_clock() >= 100 || moves.len() as u32 >= max_plies {
            break GameResult::Draw;
        }

        let key = match board.side_to_move() {
            Color::White => white,
            Color::Black => black,
        };
        let outcome = match dispatcher.select_move(&board, key) {
            Ok(outcome) => outcome,
            Err(DispatchError::NoLegalMove) => {
                return Err(anyhow!("dispatched a terminal position after {} plies", moves.len()));
            }
        };
        dispatch.record(&outcome);
        let notation = uci_notation(&board, outcome.mv);

        board
            .try_play(outcome.mv)
            .map_err(|e| anyhow!("dispatcher returned unplayable move {}: {e:?}", outcome.mv))?;
        debug!(ply = moves.len(), key, mv = %outcome.mv, fell_back = outcome.fell_back, "move played");
        moves.push(notation);
    };

    Ok(GameRecord {
        result,
        moves,
        dispatch,
    })
}

/// Play `config.games` games concurrently on blocking worker threads, all
/// sharing one dispatcher. `white` has the white pieces in every game.
pub async fn run_match(
    dispatcher: Arc<Dispatcher<Board>>,
    config: &ArenaConfig,
    white: &str,
    black: &str,
) -> Result<MatchSummary> {
    let start = start_position(config)?;

    let mut handles = Vec::with_capacity(config.games as usize);
    for _ in 0..config.games {
        let dispatcher = Arc::clone(&dispatcher);
        let (white, black) = (white.to_string(), black.to_string());
        let start = start.clone();
        let max_plies = config.max_plies;
        handles.push(tokio::task::spawn_blocking(move || {
            play_game(&dispatcher, &white, &black, start, max_plies)
        }));
    }

    let mut summary = MatchSummary::new(white, black);
    for (game_num, handle) in handles.into_iter().enumerate() {
        let game = handle.await.context("game task panicked")??;
        info!(
            game = game_num + 1,
            of = config.games,
            result = ?game.result,
            plies = game.moves.len(),
            "game finished"
        );
        summary.add_game(game);
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "match_runner_tests.rs"]
mod match_runner_tests;
