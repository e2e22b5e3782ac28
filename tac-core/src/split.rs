//! Split generator: distribute a step budget over several pieces.
//!
//! The budget is spent one unit step at a time. Every unit step must be
//! legal at the moment it is taken (home diversion allowed, capture on
//! landing only), so the search walks the real board: step, recurse, undo.
//!
//! Two rules keep the search small:
//!
//! - once a piece has stepped and another piece stepped after it, the first
//!   piece is finished for that branch (no interleavings)
//! - complete distributions are kept only if their resulting arrangement
//!   has not been produced yet

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    forward_distance, Arrangement, Board, PieceId, Player, Position, SplitRules, Zone,
    PIECES_PER_PLAYER, SPLIT_BUDGET,
};

/// Most pieces a split can involve: a player's and the teammate's.
pub const MAX_ELIGIBLE: usize = 2 * PIECES_PER_PLAYER;

/// One piece's share of a distribution.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Where the piece stood when its segment began.
    pub from: Position,
    pub steps: i8,
    /// The segment passed the owner's entry square and stayed on the track.
    pub avoid_home: bool,
}

/// A complete split: segments in the order they were played.
#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, Serialize, Deserialize)]
pub struct Distribution {
    pub segments: Vec<Segment>,
}

impl Distribution {
    pub fn new(segments: Vec<Segment>) -> Distribution {
        Distribution { segments }
    }

    /// Sum of all segment step counts.
    pub fn total_steps(&self) -> i32 {
        self.segments.iter().map(|seg| seg.steps as i32).sum()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
struct UnitStep {
    piece: PieceId,
    from: Position,
    to: Position,
    from_blocking: bool,
}

/// Depth-first search state. The board is mutated in place and restored
/// after every branch.
struct SplitSearch<'a> {
    board: &'a mut Board,
    eligible: &'a [PieceId],
    path: Vec<UnitStep>,
    seen: HashSet<Arrangement>,
    found: Vec<Distribution>,
}

impl SplitSearch<'_> {
    /// `active` has bit `i` set while `eligible[i]` may still step; `last`
    /// is the index of the piece that took the previous step.
    fn search(&mut self, budget: u8, active: u16, last: Option<usize>) {
        if budget == 0 {
            self.record();
            return;
        }

        for i in 0..self.eligible.len() {
            if active & (1 << i) == 0 {
                continue;
            }
            let piece = self.eligible[i];
            let from = self.board.position_of(piece);
            let Some(plan) = self.board.plan_move(from, 1, false) else {
                continue;
            };

            let from_blocking = self.board.is_blocking(piece);
            let undo = self.board.commit(plan, false);
            self.path.push(UnitStep {
                piece,
                from,
                to: plan.to,
                from_blocking,
            });

            let next = match last {
                Some(prev) if prev != i => active & !(1 << prev),
                _ => active,
            };
            self.search(budget - 1, next, Some(i));

            self.path.pop();
            self.board.revert(&undo);
        }
    }

    fn record(&mut self) {
        if self.seen.insert(self.board.arrangement()) {
            let distribution = self.coalesce();
            self.found.push(distribution);
        }
    }

    /// Merge consecutive unit steps of the same piece into segments.
    fn coalesce(&self) -> Distribution {
        let segments = self
            .path
            .chunk_by(|a, b| a.piece == b.piece)
            .map(|run| {
                let first = run[0];
                let last = run[run.len() - 1];
                let steps = run.len() as i8;
                Segment {
                    from: first.from,
                    steps,
                    avoid_home: passed_entry_on_track(&first, last.to, steps),
                }
            })
            .collect();
        Distribution { segments }
    }
}

/// A track run that reached the owner's entry square with steps to spare
/// but ended on the track.
fn passed_entry_on_track(first: &UnitStep, to: Position, steps: i8) -> bool {
    match (first.from, to) {
        (Position::Track(from), Position::Track(_)) => {
            !first.from_blocking && (forward_distance(from, first.piece.owner.entry()) as i8) < steps
        }
        _ => false,
    }
}

impl Board {
    /// Pieces that may take steps of a player's split.
    ///
    /// The player's track and home pieces, plus the teammate's when the
    /// team variant is on.
    pub fn eligible_for_split(&self, player: Player, rules: SplitRules) -> Vec<PieceId> {
        let in_play = |piece: &PieceId| {
            matches!(self.position_of(*piece).zone(), Zone::Track | Zone::Home)
        };
        let own = (0..PIECES_PER_PLAYER as u8).map(|slot| PieceId::new(player, slot));
        let mut eligible: Vec<PieceId> = own.filter(in_play).collect();

        if rules.team_moves {
            let mate = player.teammate();
            eligible.extend(
                (0..PIECES_PER_PLAYER as u8)
                    .map(|slot| PieceId::new(mate, slot))
                    .filter(in_play)
                    .filter(|&piece| rules.move_blocked_teammate || !self.is_blocking(piece)),
            );
        }
        eligible
    }

    /// All distinct ways to spend `budget` unit steps over `eligible`.
    ///
    /// Distributions are returned in discovery order, one per resulting
    /// arrangement. The board is left exactly as it was.
    pub fn generate_splits(&mut self, eligible: &[PieceId], budget: u8) -> Vec<Distribution> {
        assert!(
            eligible.len() <= MAX_ELIGIBLE,
            "at most {MAX_ELIGIBLE} pieces can share a split"
        );
        debug_assert!(
            eligible
                .iter()
                .enumerate()
                .all(|(i, piece)| !eligible[..i].contains(piece)),
            "eligible pieces must be distinct"
        );

        let before = self.arrangement();
        let mut search = SplitSearch {
            board: self,
            eligible,
            path: Vec::with_capacity(budget as usize),
            seen: HashSet::new(),
            found: Vec::new(),
        };
        let active = (1u16 << eligible.len()) - 1;
        search.search(budget, active, None);
        let found = search.found;

        debug_assert_eq!(before, self.arrangement());
        self.debug_check();
        found
    }

    /// Distributions of the standard split budget for a player.
    pub fn splits_for(&mut self, player: Player, rules: SplitRules) -> Vec<Distribution> {
        let eligible = self.eligible_for_split(player, rules);
        self.generate_splits(&eligible, SPLIT_BUDGET)
    }

    /// Play a distribution's segments in order, capturing every piece
    /// passed.
    ///
    /// All segments are checked on a scratch board first; nothing is
    /// committed unless every one is legal.
    pub fn apply_distribution(&mut self, distribution: &Distribution) -> bool {
        let mut scratch = self.clone();
        for seg in &distribution.segments {
            let Some(plan) = scratch.plan_move(seg.from, seg.steps, seg.avoid_home) else {
                return false;
            };
            scratch.apply_move(plan, true);
        }
        *self = scratch;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(owner: Player, slot: u8) -> PieceId {
        PieceId::new(owner, slot)
    }

    fn board_with(placements: &[(PieceId, Position, bool)]) -> Board {
        let mut board = Board::new();
        for &(p, pos, blocking) in placements {
            board.move_piece(p, pos, blocking);
        }
        board
    }

    /// Replay every distribution and check the split laws.
    fn assert_laws(board: &Board, found: &[Distribution], budget: u8) {
        let mut arrangements = HashSet::new();
        for dist in found {
            assert_eq!(dist.total_steps(), budget as i32, "{dist:?}");
            let mut replay = board.clone();
            assert!(replay.apply_distribution(dist), "{dist:?}");
            assert!(arrangements.insert(replay.arrangement()), "duplicate {dist:?}");
        }
    }

    #[test]
    fn test_single_piece() {
        let a = piece(Player::Zero, 0);
        let mut board = board_with(&[(a, Position::Track(17), false)]);

        let found = board.generate_splits(&[a], SPLIT_BUDGET);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].segments,
            vec![Segment {
                from: Position::Track(17),
                steps: 7,
                avoid_home: false
            }]
        );

        board.apply_distribution(&found[0]);
        assert_eq!(board.position_of(a), Position::Track(24));
    }

    #[test]
    fn test_two_pieces() {
        let a = piece(Player::Zero, 0);
        let b = piece(Player::Zero, 1);
        let mut board = board_with(&[
            (a, Position::Track(1), false),
            (b, Position::Track(17), false),
        ]);
        let found = board.splits_for(Player::Zero, SplitRules::default());
        assert_eq!(found.len(), 8);
        assert_laws(&board, &found, SPLIT_BUDGET);
    }

    #[test]
    fn test_three_pieces_all_compositions() {
        let mut board = board_with(&[
            (piece(Player::Zero, 0), Position::Track(1), false),
            (piece(Player::Zero, 1), Position::Track(17), false),
            (piece(Player::Zero, 2), Position::Track(33), false),
        ]);
        let found = board.splits_for(Player::Zero, SplitRules::default());
        // Ways to write 7 as an ordered sum of 3 non-negative parts
        assert_eq!(found.len(), 36);
        assert_laws(&board, &found, SPLIT_BUDGET);
    }

    #[test]
    fn test_board_restored() {
        let a = piece(Player::Zero, 0);
        let b = piece(Player::One, 0);
        let mut board = board_with(&[
            (a, Position::Track(10), false),
            (b, Position::Track(12), false),
        ]);
        let layout = board.layout();
        board.generate_splits(&[a], SPLIT_BUDGET);
        assert_eq!(board.layout(), layout);
    }

    #[test]
    fn test_capture_along_the_way() {
        let a = piece(Player::Zero, 0);
        let b = piece(Player::One, 0);
        let mut board = board_with(&[
            (a, Position::Track(10), false),
            (b, Position::Track(12), false),
        ]);
        let found = board.generate_splits(&[a], SPLIT_BUDGET);
        assert_eq!(found.len(), 1);

        board.apply_distribution(&found[0]);
        assert_eq!(board.position_of(a), Position::Track(17));
        assert_eq!(board.position_of(b), Position::Yard(Player::One, 0));
    }

    #[test]
    fn test_blocked_path_yields_nothing() {
        let a = piece(Player::Zero, 0);
        let mut board = board_with(&[
            (a, Position::Track(14), false),
            (piece(Player::One, 0), Position::Track(16), true),
        ]);
        assert!(board.generate_splits(&[a], SPLIT_BUDGET).is_empty());
    }

    #[test]
    fn test_walks_into_home() {
        let a = piece(Player::Zero, 0);
        let mut board = board_with(&[(a, Position::Track(60), false)]);
        let found = board.generate_splits(&[a], SPLIT_BUDGET);
        assert_eq!(found.len(), 1);
        assert!(!found[0].segments[0].avoid_home);

        board.apply_distribution(&found[0]);
        assert_eq!(board.position_of(a), Position::Home(Player::Zero, 2));
    }

    #[test]
    fn test_too_close_to_full_home_yields_nothing() {
        let a = piece(Player::Zero, 0);
        let mut board = board_with(&[(a, Position::Track(62), false)]);
        // 63, 0, then home slots 0-3: only six unit steps fit
        assert!(board.generate_splits(&[a], SPLIT_BUDGET).is_empty());
    }

    #[test]
    fn test_passing_entry_sets_avoid_home() {
        let p = Player::Zero;
        let a = piece(p, 0);
        let mut board = board_with(&[
            (a, Position::Track(62), false),
            (piece(p, 1), Position::Home(p, 0), false),
        ]);
        let found = board.generate_splits(&[a], SPLIT_BUDGET);
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].segments[0],
            Segment {
                from: Position::Track(62),
                steps: 7,
                avoid_home: true
            }
        );
        board.apply_distribution(&found[0]);
        assert_eq!(board.position_of(a), Position::Track(5));
    }

    #[test]
    fn test_home_pieces_take_steps() {
        let p = Player::Zero;
        let a = piece(p, 0);
        let h = piece(p, 1);
        let mut board = board_with(&[
            (a, Position::Track(30), false),
            (h, Position::Home(p, 0), false),
        ]);
        let found = board.splits_for(p, SplitRules::default());
        // Home piece takes 0-3 steps, the track piece the rest
        assert_eq!(found.len(), 4);
        assert_laws(&board, &found, SPLIT_BUDGET);
    }

    #[test]
    fn test_team_variant() {
        let own = piece(Player::Zero, 0);
        let mate = piece(Player::Two, 0);
        let mate_blocking = piece(Player::Two, 1);
        let board = board_with(&[
            (own, Position::Track(5), false),
            (mate, Position::Track(40), false),
            (mate_blocking, Position::Track(32), true),
        ]);

        assert_eq!(
            board.eligible_for_split(Player::Zero, SplitRules::default()),
            vec![own]
        );

        let team = SplitRules {
            team_moves: true,
            move_blocked_teammate: true,
        };
        assert_eq!(
            board.eligible_for_split(Player::Zero, team),
            vec![own, mate, mate_blocking]
        );

        let no_blocked = SplitRules {
            team_moves: true,
            move_blocked_teammate: false,
        };
        assert_eq!(
            board.eligible_for_split(Player::Zero, no_blocked),
            vec![own, mate]
        );
    }

    #[test]
    fn test_team_split_counts() {
        let mut board = board_with(&[
            (piece(Player::Zero, 0), Position::Track(1), false),
            (piece(Player::Two, 0), Position::Track(40), false),
        ]);
        let team = SplitRules {
            team_moves: true,
            move_blocked_teammate: true,
        };
        let found = board.splits_for(Player::Zero, team);
        assert_eq!(found.len(), 8);
        assert_laws(&board, &found, SPLIT_BUDGET);
    }

    #[test]
    fn test_own_capture_dedup() {
        // a can land on b; different orders reach the same arrangement
        let p = Player::Zero;
        let a = piece(p, 0);
        let b = piece(p, 1);
        let mut board = board_with(&[
            (a, Position::Track(20), false),
            (b, Position::Track(22), false),
        ]);
        let found = board.generate_splits(&[a, b], SPLIT_BUDGET);
        assert_laws(&board, &found, SPLIT_BUDGET);
    }

    #[test]
    fn test_zero_budget() {
        let a = piece(Player::Zero, 0);
        let mut board = board_with(&[(a, Position::Track(3), false)]);
        let found = board.generate_splits(&[a], 0);
        assert_eq!(found, vec![Distribution::default()]);
    }

    #[test]
    fn test_apply_distribution_rejects_illegal() {
        let a = piece(Player::Zero, 0);
        let mut board = board_with(&[(a, Position::Track(3), false)]);
        let before = board.layout();
        let bogus = Distribution::new(vec![
            Segment {
                from: Position::Track(3),
                steps: 2,
                avoid_home: false,
            },
            Segment {
                from: Position::Track(40),
                steps: 5,
                avoid_home: false,
            },
        ]);
        assert!(!board.apply_distribution(&bogus));
        assert_eq!(board.layout(), before);
    }
}
