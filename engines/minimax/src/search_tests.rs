use super::*;
use cozy_chess::Square;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn params(depth: u8) -> SearchParams {
    SearchParams {
        max_depth: depth,
        max_nodes: 200_000,
        max_time: Duration::from_secs(30),
        random_top: 1,
        random_margin_cp: 0,
    }
}

fn board(fen: &str) -> Board {
    Board::from_fen(fen, false).unwrap()
}

#[test]
fn test_choose_move_start_position() {
    let pos = Board::default();
    let mv = choose_move(&pos, &params(2), &mut StdRng::seed_from_u64(0));
    assert!(pos.is_legal(mv.unwrap()));
}

#[test]
fn test_choose_move_finds_mate_in_one() {
    // Qe8# along the open e-file
    let pos = board("6k1/5ppp/8/8/8/8/5PPP/4Q1K1 w - - 0 1");
    let mv = choose_move(&pos, &params(2), &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(
        mv,
        Move {
            from: Square::E1,
            to: Square::E8,
            promotion: None,
        }
    );
}

#[test]
fn test_choose_move_wins_hanging_queen() {
    let pos = board("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let mv = choose_move(&pos, &params(2), &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(
        mv,
        Move {
            from: Square::D2,
            to: Square::D5,
            promotion: None,
        }
    );
}

#[test]
fn test_no_move_when_checkmated() {
    let pos = board("r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1");
    assert_eq!(choose_move(&pos, &params(2), &mut StdRng::seed_from_u64(0)), None);
}

#[test]
fn test_tiny_budget_still_returns_legal_move() {
    let pos = Board::default();
    let starved = SearchParams {
        max_nodes: 1,
        ..params(3)
    };
    let mv = choose_move(&pos, &starved, &mut StdRng::seed_from_u64(0)).unwrap();
    assert!(pos.is_legal(mv));
}

#[test]
fn test_captures_are_ordered_first() {
    let pos = board("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let mut moves = pos.legal_moves();
    order_moves(&pos, &mut moves);
    assert!(pos.is_capture(moves[0]));
    assert!(!pos.is_capture(moves[moves.len() - 1]));
}

#[test]
fn test_random_top_stays_within_margin() {
    // Only Rxd5 keeps the material balance; nothing else is within 90cp.
    let pos = board("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let fork = SearchParams {
        random_top: 2,
        random_margin_cp: 90,
        ..params(2)
    };
    for seed in 0..5 {
        let mv = choose_move(&pos, &fork, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_eq!(mv.to, Square::D5);
    }
}

#[test]
fn test_transposition_table_reuses_finished_subtrees() {
    let pos = board("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
    let limits = params(3);
    let mut state = SearchState::new(&limits);

    let first = negamax(&pos, 3, -INFINITY, INFINITY, &mut state, 0);
    let nodes_first = state.nodes;
    assert!(!state.tt.is_empty());
    assert_eq!(state.tt[&pos.hash()].bound, Bound::Exact);

    let second = negamax(&pos, 3, -INFINITY, INFINITY, &mut state, 0);
    assert_eq!(first, second);
    assert!(state.nodes - nodes_first < nodes_first, "warm table should cut the search short");
}

#[test]
fn test_mate_scores_survive_the_table() {
    for ply in [0, 3, 17] {
        for score in [MATE_SCORE - 2, -MATE_SCORE + 5, 123, -45] {
            assert_eq!(score_from_tt(score_to_tt(score, ply), ply), score);
        }
    }
}
