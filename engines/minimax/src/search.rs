//! Iterative deepening negamax with alpha-beta pruning and quiescence.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::Instant;

use cozy_chess::{Board, Move, Piece};
use engine_sdk::GamePosition;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::eval::{evaluate, PIECE_VALUES};
use crate::SearchParams;

pub const MATE_SCORE: i32 = 1_000_000;
const INFINITY: i32 = MATE_SCORE + 1;

/// How often to check the clock (in nodes). Checking every node is wasteful.
const TIME_CHECK_INTERVAL: u64 = 256;

/// Scores beyond this are mates, stored relative to the node rather than the root.
const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Exact,
    /// Failed high: true score is at least this
    Lower,
    /// Failed low: true score is at most this
    Upper,
}

#[derive(Debug, Clone, Copy)]
struct TtEntry {
    depth: u8,
    score: i32,
    bound: Bound,
    best_move: Option<Move>,
}

/// Node and clock accounting for one search, plus the transposition table
/// shared by all of its iterations.
struct SearchState<'a> {
    params: &'a SearchParams,
    started: Instant,
    nodes: u64,
    stopped: bool,
    tt: HashMap<u64, TtEntry>,
}

impl<'a> SearchState<'a> {
    fn new(params: &'a SearchParams) -> Self {
        Self {
            params,
            started: Instant::now(),
            nodes: 0,
            stopped: false,
            tt: HashMap::new(),
        }
    }

    /// Latches once either budget is spent.
    fn exhausted(&mut self) -> bool {
        if !self.stopped
            && (self.nodes >= self.params.max_nodes
                || (self.nodes % TIME_CHECK_INTERVAL == 0 && self.started.elapsed() >= self.params.max_time))
        {
            self.stopped = true;
        }
        self.stopped
    }
}

/// Searches `board` within `params` and returns the chosen move, or None when
/// there is no legal move.
///
/// Only fully searched depths count: an iteration cut short by the budget is
/// discarded and the previous depth's choice stands.
pub fn choose_move<R: Rng + ?Sized>(board: &Board, params: &SearchParams, rng: &mut R) -> Option<Move> {
    let mut legal = board.legal_moves();
    if legal.is_empty() {
        return None;
    }
    order_moves(board, &mut legal);

    let mut state = SearchState::new(params);
    let mut best_move = legal[0];
    let mut root_scores: Vec<(Move, i32)> = Vec::new();

    for depth in 1..=params.max_depth.max(1) {
        if state.exhausted() {
            break;
        }

        // Previous best first, then by last iteration's score.
        let mut ordered = legal.clone();
        ordered.sort_by_cached_key(|&mv| {
            let previous = root_scores
                .iter()
                .find(|(m, _)| *m == mv)
                .map_or(-INFINITY, |&(_, s)| s);
            Reverse((mv == best_move, previous))
        });

        let mut depth_scores = Vec::with_capacity(ordered.len());
        for mv in ordered {
            if state.exhausted() {
                break;
            }
            let mut child = board.clone();
            child.play_unchecked(mv);
            state.nodes += 1;
            let score = -negamax(&child, depth - 1, -INFINITY, INFINITY, &mut state, 1);
            depth_scores.push((mv, score));
        }

        if state.stopped {
            break;
        }

        depth_scores.sort_by_key(|&(_, score)| Reverse(score));
        best_move = depth_scores[0].0;
        root_scores = depth_scores;
    }

    if params.random_top > 1 && !root_scores.is_empty() {
        let ceiling = root_scores[0].1;
        let pool: Vec<Move> = root_scores
            .iter()
            .take(params.random_top)
            .filter(|&&(_, score)| ceiling - score <= params.random_margin_cp)
            .map(|&(mv, _)| mv)
            .collect();
        if let Some(&mv) = pool.choose(rng) {
            return Some(mv);
        }
    }

    Some(best_move)
}

/// Recursive negamax with alpha-beta pruning (fail-soft).
fn negamax(board: &Board, depth: u8, mut alpha: i32, beta: i32, state: &mut SearchState, ply: i32) -> i32 {
    if state.exhausted() {
        return evaluate(board);
    }

    let mut moves = board.legal_moves();
    if moves.is_empty() {
        return if board.checkers().is_empty() {
            0 // Stalemate
        } else {
            -MATE_SCORE + ply // Checkmate
        };
    }
    if board.halfmove_clock() >= 100 {
        return 0;
    }

    if depth == 0 {
        return quiescence(board, alpha, beta, state, ply);
    }

    let key = board.hash();
    let mut tt_move = None;
    if let Some(entry) = state.tt.get(&key) {
        let score = score_from_tt(entry.score, ply);
        if entry.depth >= depth {
            match entry.bound {
                Bound::Exact => return score,
                Bound::Lower if score >= beta => return score,
                Bound::Upper if score <= alpha => return score,
                _ => {}
            }
        }
        tt_move = entry.best_move;
    }

    order_moves(board, &mut moves);
    if let Some(pos) = tt_move.and_then(|tm| moves.iter().position(|&mv| mv == tm)) {
        moves[..=pos].rotate_right(1);
    }

    let alpha_orig = alpha;
    let mut best = -INFINITY;
    let mut best_move = None;
    for mv in moves {
        let mut child = board.clone();
        child.play_unchecked(mv);
        state.nodes += 1;

        let score = -negamax(&child, depth - 1, -beta, -alpha, state, ply + 1);

        if score > best {
            best = score;
            best_move = Some(mv);
        }
        if best > alpha {
            alpha = best;
        }
        if alpha >= beta || state.stopped {
            break;
        }
    }

    // A cut-short subtree is not worth remembering.
    if !state.stopped {
        let bound = if best <= alpha_orig {
            Bound::Upper
        } else if best >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        state.tt.insert(
            key,
            TtEntry {
                depth,
                score: score_to_tt(best, ply),
                bound,
                best_move,
            },
        );
    }

    best
}

fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Resolve captures and promotions before trusting the static evaluation.
fn quiescence(board: &Board, mut alpha: i32, beta: i32, state: &mut SearchState, ply: i32) -> i32 {
    let moves = board.legal_moves();
    if moves.is_empty() {
        return if board.checkers().is_empty() { 0 } else { -MATE_SCORE + ply };
    }

    let stand_pat = evaluate(board);
    if stand_pat >= beta || state.exhausted() {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut tactical: Vec<Move> = moves
        .into_iter()
        .filter(|&mv| board.is_capture(mv) || mv.promotion.is_some())
        .collect();
    order_moves(board, &mut tactical);

    for mv in tactical {
        let mut child = board.clone();
        child.play_unchecked(mv);
        state.nodes += 1;

        let score = -quiescence(&child, -beta, -alpha, state, ply + 1);

        if score >= beta {
            return score;
        }
        if score > alpha {
            alpha = score;
        }
        if state.exhausted() {
            break;
        }
    }

    alpha
}

/// Captures first (most valuable victim, least valuable attacker), then
/// promotions, then quiet moves in generation order.
fn order_moves(board: &Board, moves: &mut [Move]) {
    moves.sort_by_cached_key(|&mv| Reverse(move_score(board, mv)));
}

fn move_score(board: &Board, mv: Move) -> i32 {
    let mut score = 0;
    if board.is_capture(mv) {
        let victim = board.piece_on(mv.to).unwrap_or(Piece::Pawn); // en passant
        let attacker = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
        score += 30_000 + PIECE_VALUES[victim as usize] * 10 - PIECE_VALUES[attacker as usize];
    }
    if let Some(promotion) = mv.promotion {
        score += 25_000 + PIECE_VALUES[promotion as usize];
    }
    score
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
