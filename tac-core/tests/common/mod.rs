//! Random play shared by the property tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::Rng;

use tac_core::{Board, PieceRef, Player, SplitRules};

/// Step counts the cards can ask for.
pub const COUNTS: [i8; 13] = [1, 2, 3, 4, 5, 6, 8, 9, 10, 12, 13, -4, 7];

fn random_ref(rng: &mut StdRng, player: Player) -> PieceRef {
    PieceRef::new(player, rng.random_range(0..4)).unwrap()
}

/// Play one random legal-or-not action for `player`. Illegal attempts leave
/// the board untouched.
pub fn random_action(board: &mut Board, player: Player, rules: SplitRules, rng: &mut StdRng) {
    match rng.random_range(0..10) {
        0..=2 => {
            board.try_enter(player, true);
        }
        3..=6 => {
            let piece = random_ref(rng, player);
            let count = COUNTS[rng.random_range(0..COUNTS.len())];
            let avoid_home = rng.random_bool(0.2);
            let sweep_all = count == 7 || rng.random_bool(0.1);
            board.try_move(piece, count, avoid_home, true, sweep_all);
        }
        7 => {
            let other = Player::from_index(rng.random_range(0..4)).unwrap();
            let a = random_ref(rng, player);
            let b = random_ref(rng, other);
            board.try_swap(a, b, true);
        }
        _ => {
            let found = board.splits_for(player, rules);
            if !found.is_empty() {
                let pick = &found[rng.random_range(0..found.len())];
                assert!(board.apply_distribution(pick), "generated split must replay: {pick}");
            }
        }
    }
}

/// Boards reached by random play from the start position.
pub fn random_boards(rng: &mut StdRng, games: usize, turns: usize) -> Vec<Board> {
    let mut boards = Vec::with_capacity(games * turns);
    for game in 0..games {
        let rules = SplitRules {
            team_moves: game % 2 == 1,
            move_blocked_teammate: game % 4 != 3,
        };
        let mut board = Board::new();
        let mut player = Player::Zero;
        for _ in 0..turns {
            random_action(&mut board, player, rules, rng);
            boards.push(board.clone());
            player = player.next();
        }
    }
    boards
}
