//! Board occupancy and the primitives every move is built from.
//!
//! # Representation
//!
//! ```text
//! pieces[player][slot]  -> (position, blocking)     arena, 16 entries
//! track[0..64]          -> Option<PieceId>          shared cells
//! home[player][0..4]    -> Option<PieceId>
//! yard[player][0..4]    -> Option<PieceId>
//! ```
//!
//! The arena and the cell maps are two views of the same occupancy and are
//! kept in sync by every mutating operation. [`Board::check_invariants`]
//! verifies that; debug builds run it after every committed mutation.

use std::hash::{Hash, Hasher};

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::{
    track_add, PieceId, Player, Position, Team, HOME_LEN, PIECES_PER_PLAYER, PLAYERS, TRACK_LEN,
    YARD_LEN,
};

/// Pieces removed from the track by one operation, with the track cell
/// each one was taken from, in removal order.
pub type Captures = ArrayVec<(PieceId, Position), 16>;

/// Ways the two occupancy views can disagree.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    #[error("piece {0} is recorded at invalid position {1}")]
    InvalidPosition(PieceId, Position),
    #[error("piece {0} sits in another player's cell {1}")]
    ForeignCell(PieceId, Position),
    #[error("piece {0} is recorded at {1} but that cell does not hold it")]
    Misplaced(PieceId, Position),
    #[error("cell {0} holds piece {1} which is recorded elsewhere")]
    StrayOccupant(Position, PieceId),
    #[error("piece {0} is blocking away from its entry square")]
    BlockingOffEntry(PieceId),
    #[error("cell {0} is claimed by two pieces")]
    DoubleOccupancy(Position),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct PieceState {
    pub(crate) position: Position,
    pub(crate) blocking: bool,
}

/// Cells in an [`Arrangement`]: track, then every home, then every yard.
const ARRANGEMENT_CELLS: usize =
    TRACK_LEN as usize + PLAYERS * (HOME_LEN as usize + YARD_LEN as usize);

/// Occupancy snapshot with piece identity erased.
///
/// Each cell is `0` when empty, otherwise `1 + owner`, with bit 4 set for a
/// blocking piece. Two boards are equal iff their arrangements are.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Arrangement([u8; ARRANGEMENT_CELLS]);

impl Arrangement {
    const BLOCKING_BIT: u8 = 0x10;

    /// Raw cell bytes, for hashing or fingerprinting.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// The full occupancy of the board.
///
/// Equality (and hashing) ignore which intrinsic slot a piece has: only the
/// owner and blocking flag in each cell are observable.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[PieceState; PIECES_PER_PLAYER]; PLAYERS],
    track: [Option<PieceId>; TRACK_LEN as usize],
    home: [[Option<PieceId>; HOME_LEN as usize]; PLAYERS],
    yard: [[Option<PieceId>; YARD_LEN as usize]; PLAYERS],
}

impl Board {
    /// Create the starting board: every piece in its own yard slot.
    pub fn new() -> Board {
        let mut board = Board::empty();
        for piece in PieceId::all() {
            board.set_down(piece, Position::Yard(piece.owner, piece.slot), false);
        }
        board
    }

    /// All cells empty, arena entries unset. Only valid as a scratch start.
    fn empty() -> Board {
        let unset = PieceState {
            position: Position::Track(0),
            blocking: false,
        };
        Board {
            pieces: [[unset; PIECES_PER_PLAYER]; PLAYERS],
            track: [None; TRACK_LEN as usize],
            home: [[None; HOME_LEN as usize]; PLAYERS],
            yard: [[None; YARD_LEN as usize]; PLAYERS],
        }
    }

    /// Build a board from every piece's position and blocking flag, indexed
    /// `[player][slot]`. Rejects layouts that break an invariant.
    pub fn from_layout(
        layout: [[(Position, bool); PIECES_PER_PLAYER]; PLAYERS],
    ) -> Result<Board, InvariantError> {
        let mut board = Board::empty();
        for piece in PieceId::all() {
            let (position, blocking) = layout[piece.owner.index()][piece.slot as usize];
            if !position.is_valid() {
                return Err(InvariantError::InvalidPosition(piece, position));
            }
            if position.owner().is_some_and(|owner| owner != piece.owner) {
                return Err(InvariantError::ForeignCell(piece, position));
            }
            if board.get(position).is_some() {
                return Err(InvariantError::DoubleOccupancy(position));
            }
            board.set_down(piece, position, blocking);
        }
        board.check_invariants()?;
        Ok(board)
    }

    /// Every piece's position and blocking flag, indexed `[player][slot]`.
    pub fn layout(&self) -> [[(Position, bool); PIECES_PER_PLAYER]; PLAYERS] {
        self.pieces
            .map(|row| row.map(|state| (state.position, state.blocking)))
    }

    // ========== Cell Access ==========

    /// The piece occupying a cell, if any.
    #[inline]
    pub fn get(&self, pos: Position) -> Option<PieceId> {
        debug_assert!(pos.is_valid());
        match pos {
            Position::Track(idx) => self.track[idx as usize],
            Position::Home(player, idx) => self.home[player.index()][idx as usize],
            Position::Yard(player, idx) => self.yard[player.index()][idx as usize],
        }
    }

    #[inline]
    fn cell_mut(&mut self, pos: Position) -> &mut Option<PieceId> {
        debug_assert!(pos.is_valid());
        match pos {
            Position::Track(idx) => &mut self.track[idx as usize],
            Position::Home(player, idx) => &mut self.home[player.index()][idx as usize],
            Position::Yard(player, idx) => &mut self.yard[player.index()][idx as usize],
        }
    }

    #[inline]
    pub(crate) fn state(&self, piece: PieceId) -> PieceState {
        self.pieces[piece.owner.index()][piece.slot as usize]
    }

    #[inline]
    pub fn position_of(&self, piece: PieceId) -> Position {
        self.state(piece).position
    }

    #[inline]
    pub fn is_blocking(&self, piece: PieceId) -> bool {
        self.state(piece).blocking
    }

    /// Check whether a track cell holds a blocking piece.
    #[inline]
    pub fn is_blocking_at(&self, index: u8) -> bool {
        self.track[index as usize].is_some_and(|piece| self.is_blocking(piece))
    }

    /// The piece on a track cell, if any.
    #[inline]
    pub fn track_cell(&self, index: u8) -> Option<PieceId> {
        self.track[index as usize]
    }

    /// The piece in a player's home slot, if any.
    #[inline]
    pub fn home_cell(&self, player: Player, slot: u8) -> Option<PieceId> {
        self.home[player.index()][slot as usize]
    }

    /// The piece in a player's yard slot, if any.
    #[inline]
    pub fn yard_cell(&self, player: Player, slot: u8) -> Option<PieceId> {
        self.yard[player.index()][slot as usize]
    }

    /// Every piece with its position and blocking flag.
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, Position, bool)> + '_ {
        PieceId::all().map(move |piece| {
            let state = self.state(piece);
            (piece, state.position, state.blocking)
        })
    }

    /// Number of a player's pieces in the yard.
    pub fn yard_count(&self, player: Player) -> usize {
        self.yard[player.index()].iter().flatten().count()
    }

    // ========== Raw Occupancy (no invariant checks) ==========

    /// Take a piece off its cell. The arena still records the old position
    /// until [`Board::set_down`] runs.
    #[inline]
    pub(crate) fn lift(&mut self, piece: PieceId) {
        let from = self.position_of(piece);
        debug_assert_eq!(self.get(from), Some(piece));
        *self.cell_mut(from) = None;
    }

    /// Put a lifted piece on an empty cell.
    #[inline]
    pub(crate) fn set_down(&mut self, piece: PieceId, to: Position, blocking: bool) {
        debug_assert!(self.get(to).is_none(), "cell {to} already occupied");
        *self.cell_mut(to) = Some(piece);
        self.pieces[piece.owner.index()][piece.slot as usize] = PieceState {
            position: to,
            blocking,
        };
    }

    /// Move a lifted or track-resident piece to its owner's lowest free yard
    /// slot.
    pub(crate) fn yard_piece(&mut self, piece: PieceId) -> Position {
        let owner = piece.owner;
        if self.get(self.position_of(piece)) == Some(piece) {
            self.lift(piece);
        }
        let slot = self.yard[owner.index()]
            .iter()
            .position(Option::is_none)
            .expect("a lifted piece always has a free yard slot");
        let to = Position::Yard(owner, slot as u8);
        self.set_down(piece, to, false);
        to
    }

    /// Yard every non-blocking piece strictly between `index` and
    /// `index + steps`, walking in the direction of `steps`.
    pub(crate) fn sweep_between(&mut self, index: u8, steps: i8) -> Captures {
        let mut captured = Captures::new();
        let dir = steps.signum();
        for d in 1..steps.unsigned_abs() as i8 {
            let cell = track_add(index, dir * d);
            if let Some(piece) = self.track[cell as usize] {
                if !self.is_blocking(piece) {
                    captured.push((piece, Position::Track(cell)));
                    self.yard_piece(piece);
                }
            }
        }
        captured
    }

    // ========== Board Primitives ==========

    /// Move a piece to an empty cell, setting its blocking flag.
    ///
    /// Does NOT validate game rules - the caller must ensure the destination
    /// is free and the blocking flag fits the new cell.
    pub fn move_piece(&mut self, piece: PieceId, to: Position, blocking: bool) {
        self.lift(piece);
        self.set_down(piece, to, blocking);
        self.debug_check();
    }

    /// Exchange the positions of two non-blocking track pieces.
    pub fn swap(&mut self, a: PieceId, b: PieceId) {
        let (pa, pb) = (self.position_of(a), self.position_of(b));
        debug_assert!(matches!((pa, pb), (Position::Track(_), Position::Track(_))));
        debug_assert!(!self.is_blocking(a) && !self.is_blocking(b));
        self.lift(a);
        self.lift(b);
        self.set_down(a, pb, false);
        self.set_down(b, pa, false);
        self.debug_check();
    }

    /// Return a piece to the lowest-indexed free slot of its owner's yard.
    pub fn place_in_yard(&mut self, piece: PieceId) -> Position {
        debug_assert!(!matches!(self.position_of(piece), Position::Yard(..)));
        let to = self.yard_piece(piece);
        self.debug_check();
        to
    }

    /// Remove and yard every occupied, non-blocking cell strictly between
    /// track index `index` and `index + steps` (negative `steps` walks
    /// backward). Returns what was removed, for undo.
    pub fn send_to_yard_along(&mut self, index: u8, steps: i8) -> Captures {
        let captured = self.sweep_between(index, steps);
        self.debug_check();
        captured
    }

    // ========== Equality & Invariants ==========

    /// Occupancy snapshot used for equality and deduplication.
    pub fn arrangement(&self) -> Arrangement {
        let mut cells = [0u8; ARRANGEMENT_CELLS];
        let occupants = self
            .track
            .iter()
            .chain(self.home.iter().flatten())
            .chain(self.yard.iter().flatten());
        for (cell, occupant) in cells.iter_mut().zip(occupants) {
            if let Some(piece) = occupant {
                *cell = 1 + piece.owner as u8;
                if self.is_blocking(*piece) {
                    *cell |= Arrangement::BLOCKING_BIT;
                }
            }
        }
        Arrangement(cells)
    }

    /// Verify that the arena and cell maps agree and that blocking flags
    /// only sit on their owner's entry square.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for piece in PieceId::all() {
            let PieceState { position, blocking } = self.state(piece);
            if !position.is_valid() {
                return Err(InvariantError::InvalidPosition(piece, position));
            }
            if position.owner().is_some_and(|owner| owner != piece.owner) {
                return Err(InvariantError::ForeignCell(piece, position));
            }
            if self.get(position) != Some(piece) {
                return Err(InvariantError::Misplaced(piece, position));
            }
            if blocking && position != Position::Track(piece.owner.entry()) {
                return Err(InvariantError::BlockingOffEntry(piece));
            }
        }
        for pos in Position::all() {
            if let Some(piece) = self.get(pos) {
                if self.position_of(piece) != pos {
                    return Err(InvariantError::StrayOccupant(pos, piece));
                }
            }
        }
        Ok(())
    }

    /// Halt debug builds on a corrupt board.
    #[inline]
    pub(crate) fn debug_check(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.check_invariants() {
                panic!("board invariant violated: {err}");
            }
        }
    }

    // ========== Win Evaluation ==========

    /// Check whether all four home slots of a player are occupied.
    pub fn home_full(&self, player: Player) -> bool {
        self.home[player.index()].iter().all(Option::is_some)
    }

    /// Check whether both players of a team have filled their homes.
    pub fn team_finished(&self, team: Team) -> bool {
        team.players().into_iter().all(|player| self.home_full(player))
    }

    /// The team that has finished, if any.
    pub fn winner(&self) -> Option<Team> {
        [Team::A, Team::B]
            .into_iter()
            .find(|&team| self.team_finished(team))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.arrangement() == other.arrangement()
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arrangement().hash(state);
    }
}
