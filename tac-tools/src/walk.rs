//! Random self-play over legal turns.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tac_core::{Board, Distribution, PieceRef, Player, SplitRules, PIECES_PER_PLAYER};

/// Step counts of the plain movement cards.
pub const CARD_COUNTS: [i8; 12] = [1, 2, 3, 4, 5, 6, 8, 9, 10, 12, 13, -4];

/// What a player did with their turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Turn {
    Entered,
    Moved { piece: PieceRef, count: i8 },
    Swapped { a: PieceRef, b: PieceRef },
    Split(Distribution),
    /// The drawn card had no legal use.
    Passed,
}

/// Card drawn for a turn.
#[derive(Clone, Copy, Debug)]
enum Card {
    Enter,
    Step(i8),
    Swap,
    Split,
}

/// Seeded random player. The same seed replays the same games.
pub struct Walker {
    rng: StdRng,
    rules: SplitRules,
}

impl Walker {
    pub fn new(seed: u64, rules: SplitRules) -> Walker {
        Walker {
            rng: StdRng::seed_from_u64(seed),
            rules,
        }
    }

    pub fn rules(&self) -> SplitRules {
        self.rules
    }

    fn draw(&mut self) -> Card {
        match self.rng.random_range(0..16) {
            0..=2 => Card::Enter,
            3 => Card::Swap,
            4 | 5 => Card::Split,
            _ => Card::Step(CARD_COUNTS[self.rng.random_range(0..CARD_COUNTS.len())]),
        }
    }

    /// Draw a card and play the first legal use of it.
    pub fn play_turn(&mut self, board: &mut Board, player: Player) -> Turn {
        match self.draw() {
            Card::Enter => {
                if board.try_enter(player, true) {
                    Turn::Entered
                } else {
                    Turn::Passed
                }
            }
            Card::Step(count) => self.play_step(board, player, count),
            Card::Swap => self.play_swap(board, player),
            Card::Split => {
                let found = board.splits_for(player, self.rules);
                if found.is_empty() {
                    return Turn::Passed;
                }
                let pick = found[self.rng.random_range(0..found.len())].clone();
                if board.apply_distribution(&pick) {
                    Turn::Split(pick)
                } else {
                    Turn::Passed
                }
            }
        }
    }

    /// Try the player's pieces from a random rank onward.
    fn play_step(&mut self, board: &mut Board, player: Player, count: i8) -> Turn {
        let start = self.rng.random_range(0..PIECES_PER_PLAYER);
        let avoid_home = self.rng.random_bool(0.1);
        for k in 0..PIECES_PER_PLAYER {
            let rank = ((start + k) % PIECES_PER_PLAYER) as u8;
            let Some(piece) = PieceRef::new(player, rank) else {
                continue;
            };
            if board.try_move(piece, count, avoid_home, true, false) {
                return Turn::Moved { piece, count };
            }
        }
        Turn::Passed
    }

    fn play_swap(&mut self, board: &mut Board, player: Player) -> Turn {
        let other = Player::ALL[self.rng.random_range(0..Player::ALL.len())];
        let a = PieceRef::new(player, self.rng.random_range(0..PIECES_PER_PLAYER as u8));
        let b = PieceRef::new(other, self.rng.random_range(0..PIECES_PER_PLAYER as u8));
        match (a, b) {
            (Some(a), Some(b)) if board.try_swap(a, b, true) => Turn::Swapped { a, b },
            _ => Turn::Passed,
        }
    }
}
