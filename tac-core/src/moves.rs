//! Single-segment moves: one piece travels a signed number of steps.
//!
//! # Track pieces
//!
//! Two outcomes are considered for a track piece moving `count` steps:
//!
//! ```text
//! diversion:     walk min(steps_to_own_entry, count) cells to the entry
//!                square, spend the rest inside the home stretch
//! continuation:  walk all `count` cells along the track
//! ```
//!
//! A legal diversion wins unless `avoid_home` is set; otherwise the
//! continuation is used if legal. Blocking pieces stop both: they cannot be
//! passed, landed on, or overtaken into the home stretch.
//!
//! # Apply & Undo
//!
//! Planning never mutates. [`Board::apply_move`] commits a [`Plan`] and
//! returns an [`Undo`] that restores the exact prior occupancy, captured
//! pieces' yard slots and the mover's blocking flag included.

use crate::board::Captures;
use crate::{
    forward_distance, track_add, Board, PieceId, PieceRef, Player, Position, HOME_LEN, TRACK_LEN,
    YARD_LEN,
};

/// A checked, not yet committed, single-segment move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Plan {
    pub piece: PieceId,
    pub from: Position,
    pub to: Position,
    /// Blocking flag the piece takes at `to`.
    pub blocking: bool,
    /// Track cells passed: everything strictly between `from` and
    /// `from + sweep` is captured by a sweeping commit.
    pub sweep: i8,
}

/// Undo information for backtracking.
#[derive(Clone, Debug)]
pub struct Undo {
    pub piece: PieceId,
    pub from: Position,
    pub was_blocking: bool,
    /// Pieces sent to the yard, with the track cell each came from.
    pub captured: Captures,
}

impl Board {
    // ========== Planning ==========

    /// Check whether the piece at `from` can travel `count` steps.
    ///
    /// Returns None for an empty cell, a yard piece, a zero count, or any
    /// move the rules forbid.
    pub fn plan_move(&self, from: Position, count: i8, avoid_home: bool) -> Option<Plan> {
        let piece = self.get(from)?;
        if count == 0 {
            return None;
        }
        match from {
            Position::Yard(..) => None,
            Position::Home(player, slot) => {
                let slot = self.plan_home_step(player, slot, count)?;
                Some(Plan {
                    piece,
                    from,
                    to: Position::Home(player, slot),
                    blocking: false,
                    sweep: 0,
                })
            }
            Position::Track(index) => {
                if !avoid_home {
                    if let Some(plan) = self.plan_diversion(piece, index, count) {
                        return Some(plan);
                    }
                }
                self.plan_continuation(piece, index, count)
            }
        }
    }

    /// Destination slot of a move inside the home stretch. No leapfrogging:
    /// every slot passed and the landing slot must be free.
    fn plan_home_step(&self, player: Player, slot: u8, count: i8) -> Option<u8> {
        if count < 0 {
            return None;
        }
        let dest = slot as i16 + count as i16;
        if dest >= HOME_LEN as i16 {
            return None;
        }
        let dest = dest as u8;
        if (slot + 1..=dest).any(|s| self.home_cell(player, s).is_some()) {
            return None;
        }
        Some(dest)
    }

    /// Leave the track at the owner's entry square and finish in the home
    /// stretch.
    fn plan_diversion(&self, piece: PieceId, index: u8, count: i8) -> Option<Plan> {
        if count <= 0 {
            return None;
        }
        let owner = piece.owner;
        let entry = owner.entry();
        // A piece that has not left its entry square must go around first
        if index == entry && self.is_blocking(piece) {
            return None;
        }

        let to_entry = forward_distance(index, entry);
        let into_home = count as i16 - to_entry as i16;
        if into_home <= 0 || into_home > HOME_LEN as i16 {
            return None;
        }
        // Cells passed on the track, entry square included
        if (1..=to_entry).any(|d| self.is_blocking_at(track_add(index, d as i8))) {
            return None;
        }
        let slot = into_home as u8 - 1;
        if (0..=slot).any(|s| self.home_cell(owner, s).is_some()) {
            return None;
        }

        Some(Plan {
            piece,
            from: Position::Track(index),
            to: Position::Home(owner, slot),
            blocking: false,
            sweep: to_entry as i8 + 1,
        })
    }

    /// Stay on the track for all `count` steps.
    fn plan_continuation(&self, piece: PieceId, index: u8, count: i8) -> Option<Plan> {
        if count.unsigned_abs() >= TRACK_LEN {
            return None;
        }
        let dir = count.signum();
        if (1..count.unsigned_abs() as i8).any(|d| self.is_blocking_at(track_add(index, dir * d)))
        {
            return None;
        }
        let to = track_add(index, count);
        if self.is_blocking_at(to) {
            return None;
        }
        Some(Plan {
            piece,
            from: Position::Track(index),
            to: Position::Track(to),
            blocking: false,
            sweep: count,
        })
    }

    /// Check whether a player can bring a yard piece onto its entry square.
    ///
    /// The lowest yard slot enters and becomes blocking. An occupant of the
    /// entry square is captured unless it is itself blocking.
    pub fn plan_enter(&self, player: Player) -> Option<Plan> {
        let slot = (0..YARD_LEN).find(|&s| self.yard_cell(player, s).is_some())?;
        let from = Position::Yard(player, slot);
        let entry = player.entry();
        if self.is_blocking_at(entry) {
            return None;
        }
        Some(Plan {
            piece: self.get(from)?,
            from,
            to: Position::Track(entry),
            blocking: true,
            sweep: 0,
        })
    }

    /// Check whether two pieces may trade places.
    ///
    /// Both must be distinct, on the track, and not blocking.
    pub fn plan_swap(&self, a: Position, b: Position) -> Option<(PieceId, PieceId)> {
        let (Position::Track(ia), Position::Track(ib)) = (a, b) else {
            return None;
        };
        if ia == ib || self.is_blocking_at(ia) || self.is_blocking_at(ib) {
            return None;
        }
        Some((self.get(a)?, self.get(b)?))
    }

    // ========== Apply & Undo ==========

    /// Commit a plan, returning undo information.
    ///
    /// An occupant of a track destination is sent to its yard. With
    /// `sweep_all`, every piece passed on the track is sent too.
    pub fn apply_move(&mut self, plan: Plan, sweep_all: bool) -> Undo {
        let undo = self.commit(plan, sweep_all);
        self.debug_check();
        undo
    }

    /// Undo a move, restoring the board to its previous state.
    ///
    /// This is the inverse of `apply_move()`.
    pub fn undo(&mut self, undo: &Undo) {
        self.revert(undo);
        self.debug_check();
    }

    /// `apply_move` without the debug invariant check, for search loops.
    pub(crate) fn commit(&mut self, plan: Plan, sweep_all: bool) -> Undo {
        debug_assert_eq!(self.get(plan.from), Some(plan.piece));
        let was_blocking = self.is_blocking(plan.piece);

        self.lift(plan.piece);
        let mut captured = Captures::new();
        if sweep_all {
            if let Position::Track(index) = plan.from {
                captured = self.sweep_between(index, plan.sweep);
            }
        }
        if let Some(victim) = self.get(plan.to) {
            debug_assert!(!self.is_blocking(victim));
            captured.push((victim, plan.to));
            self.yard_piece(victim);
        }
        self.set_down(plan.piece, plan.to, plan.blocking);

        Undo {
            piece: plan.piece,
            from: plan.from,
            was_blocking,
            captured,
        }
    }

    /// Inverse of `commit()`.
    pub(crate) fn revert(&mut self, undo: &Undo) {
        // Lift the mover first: a captured piece may need the cell it sits on
        self.lift(undo.piece);
        for &(victim, at) in undo.captured.iter().rev() {
            self.lift(victim);
            self.set_down(victim, at, false);
        }
        self.set_down(undo.piece, undo.from, undo.was_blocking);
    }

    // ========== Rules-Layer Entry Points ==========

    /// Move a referenced piece `count` steps if the rules allow it.
    ///
    /// With `commit` false this only checks legality.
    pub fn try_move(
        &mut self,
        piece: PieceRef,
        count: i8,
        avoid_home: bool,
        commit: bool,
        sweep_all: bool,
    ) -> bool {
        let from = self.resolve(piece);
        match self.plan_move(from, count, avoid_home) {
            Some(plan) => {
                if commit {
                    self.apply_move(plan, sweep_all);
                }
                true
            }
            None => false,
        }
    }

    /// Put a player's next yard piece into play if the rules allow it.
    pub fn try_enter(&mut self, player: Player, commit: bool) -> bool {
        match self.plan_enter(player) {
            Some(plan) => {
                if commit {
                    self.apply_move(plan, false);
                }
                true
            }
            None => false,
        }
    }

    /// Exchange two referenced pieces if the rules allow it.
    pub fn try_swap(&mut self, a: PieceRef, b: PieceRef, commit: bool) -> bool {
        let (pa, pb) = (self.resolve(a), self.resolve(b));
        match self.plan_swap(pa, pb) {
            Some((x, y)) => {
                if commit {
                    self.swap(x, y);
                }
                true
            }
            None => false,
        }
    }
}
