//! Board model and move engine for a four-player, two-team cross-and-track game.
//!
//! # Board Layout
//!
//! ```text
//! Track: 64 shared cells (0-63), pieces travel toward higher indices (mod 64).
//!
//!   Player  Entry  Team
//!   Zero        0  A  (partner: Two)
//!   One        16  B  (partner: Three)
//!   Two        32  A
//!   Three      48  B
//!
//! A piece leaves its yard onto its player's entry square and turns into
//! its home stretch the next time it reaches that square.
//!
//! Home: 4 slots per player, slot 0 closest to the entry square.
//! Yard: 4 slots per player for pieces not in play.
//! ```
//!
//! # Blocking
//!
//! A piece freshly entered onto its own entry square is *blocking*: it can
//! neither be passed, captured, nor overtaken into the home stretch until
//! it moves off the square.
//!
//! # Modules
//!
//! - [`board`]: occupancy, primitives, invariants, win evaluation
//! - [`locate`]: `(player, rank)` resolution
//! - [`moves`]: single-segment moves, entry, swap, apply & undo
//! - [`split`]: the seven-step split generator
//! - [`notation`]: text encoding of boards and actions

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod board;
pub mod locate;
pub mod moves;
pub mod notation;
pub mod split;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use board::{Arrangement, Board, InvariantError};
pub use moves::{Plan, Undo};
pub use notation::NotationError;
pub use split::{Distribution, Segment};

/// Number of cells on the shared track.
pub const TRACK_LEN: u8 = 64;
/// Number of players at the table.
pub const PLAYERS: usize = 4;
/// Pieces owned by each player.
pub const PIECES_PER_PLAYER: usize = 4;
/// Slots in each player's home stretch.
pub const HOME_LEN: u8 = 4;
/// Slots in each player's yard.
pub const YARD_LEN: u8 = 4;
/// Distance between consecutive players' entry squares.
pub const ENTRY_SPACING: u8 = TRACK_LEN / PLAYERS as u8;
/// Step budget of the split card.
pub const SPLIT_BUDGET: u8 = 7;

/// Player identifier, in turn order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    Zero = 0,
    One = 1,
    Two = 2,
    Three = 3,
}

impl Player {
    pub const ALL: [Player; PLAYERS] = [Player::Zero, Player::One, Player::Two, Player::Three];

    /// Convert from index (0-3) to Player.
    #[inline]
    pub fn from_index(idx: usize) -> Option<Player> {
        Self::ALL.get(idx).copied()
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The next player in turn order.
    #[inline]
    pub fn next(self) -> Player {
        Self::ALL[(self.index() + 1) % PLAYERS]
    }

    /// The player sitting opposite, on the same team.
    #[inline]
    pub fn teammate(self) -> Player {
        Self::ALL[(self.index() + 2) % PLAYERS]
    }

    #[inline]
    pub fn team(self) -> Team {
        if self.index() % 2 == 0 {
            Team::A
        } else {
            Team::B
        }
    }

    /// Track index where this player's pieces enter and leave the track.
    #[inline]
    pub fn entry(self) -> u8 {
        self as u8 * ENTRY_SPACING
    }
}

/// One of the two partnerships.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Team {
    /// Players Zero and Two.
    A,
    /// Players One and Three.
    B,
}

impl Team {
    pub fn players(self) -> [Player; 2] {
        match self {
            Team::A => [Player::Zero, Player::Two],
            Team::B => [Player::One, Player::Three],
        }
    }
}

/// The three kinds of place a piece can be.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Zone {
    Track,
    Home,
    Yard,
}

/// A cell on the board.
///
/// Track cells are shared, so they carry no owner: two track positions are
/// equal iff their indices are. Home and yard cells belong to a player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Position {
    Track(u8),
    Home(Player, u8),
    Yard(Player, u8),
}

impl Position {
    #[inline]
    pub fn zone(self) -> Zone {
        match self {
            Position::Track(_) => Zone::Track,
            Position::Home(..) => Zone::Home,
            Position::Yard(..) => Zone::Yard,
        }
    }

    /// Owning player for home and yard cells.
    #[inline]
    pub fn owner(self) -> Option<Player> {
        match self {
            Position::Track(_) => None,
            Position::Home(player, _) | Position::Yard(player, _) => Some(player),
        }
    }

    /// Index within the zone.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            Position::Track(idx) | Position::Home(_, idx) | Position::Yard(_, idx) => idx,
        }
    }

    /// Iterate over every cell: track, then homes, then yards.
    pub fn all() -> impl Iterator<Item = Position> {
        let track = (0..TRACK_LEN).map(Position::Track);
        let homes = Player::ALL
            .into_iter()
            .flat_map(|player| (0..HOME_LEN).map(move |idx| Position::Home(player, idx)));
        let yards = Player::ALL
            .into_iter()
            .flat_map(|player| (0..YARD_LEN).map(move |idx| Position::Yard(player, idx)));
        track.chain(homes).chain(yards)
    }

    /// Check that the index fits its zone.
    #[inline]
    pub fn is_valid(self) -> bool {
        match self {
            Position::Track(idx) => idx < TRACK_LEN,
            Position::Home(_, idx) => idx < HOME_LEN,
            Position::Yard(_, idx) => idx < YARD_LEN,
        }
    }
}

/// Intrinsic identity of a piece: its owner and the slot it was created in.
///
/// The slot never changes and carries no game meaning; it only names the
/// piece in the board's arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId {
    pub owner: Player,
    pub slot: u8,
}

impl PieceId {
    #[inline]
    pub fn new(owner: Player, slot: u8) -> PieceId {
        debug_assert!((slot as usize) < PIECES_PER_PLAYER);
        PieceId { owner, slot }
    }

    /// Iterate over all 16 pieces, player-major.
    pub fn all() -> impl Iterator<Item = PieceId> {
        Player::ALL
            .into_iter()
            .flat_map(|owner| (0..PIECES_PER_PLAYER as u8).map(move |slot| PieceId { owner, slot }))
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}#{}", self.owner.index(), self.slot)
    }
}

/// A piece named by how far it has advanced: rank 0 is the player's most
/// advanced piece.
///
/// The rank is resolved against the current board on every use (see
/// [`Board::resolve`]); the same piece can hold different ranks over a game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct PieceRef {
    player: Player,
    rank: u8,
}

impl PieceRef {
    /// Returns None for a rank outside `0..4`.
    #[inline]
    pub fn new(player: Player, rank: u8) -> Option<PieceRef> {
        if (rank as usize) < PIECES_PER_PLAYER {
            Some(PieceRef { player, rank })
        } else {
            None
        }
    }

    #[inline]
    pub fn player(self) -> Player {
        self.player
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }
}

/// Rule variants for the split card.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitRules {
    /// Steps may also be given to the teammate's pieces.
    pub team_moves: bool,
    /// With `team_moves`, the teammate's blocking piece may take steps too.
    pub move_blocked_teammate: bool,
}

impl Default for SplitRules {
    fn default() -> Self {
        SplitRules {
            team_moves: false,
            move_blocked_teammate: true,
        }
    }
}

/// Advance a track index by a signed number of cells, wrapping around.
#[inline]
pub fn track_add(index: u8, delta: i8) -> u8 {
    (index as i16 + delta as i16).rem_euclid(TRACK_LEN as i16) as u8
}

/// Cells walked forward from `from` to reach `to` (0-63).
#[inline]
pub fn forward_distance(from: u8, to: u8) -> u8 {
    (to as i16 - from as i16).rem_euclid(TRACK_LEN as i16) as u8
}
