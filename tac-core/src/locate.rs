//! Resolve `(player, rank)` references to board positions.
//!
//! A player's pieces are ranked most advanced first:
//!
//! 1. home pieces, highest slot first
//! 2. non-blocking track pieces, by distance traveled from the entry square
//!    (walk backward from the entry square itself)
//! 3. the blocking piece on the entry square, if any
//! 4. yard pieces, lowest slot first
//!
//! The order is rebuilt from occupancy on every call; any move can change it.

use arrayvec::ArrayVec;

use crate::{
    track_add, Board, PieceId, PieceRef, Player, Position, Zone, HOME_LEN, PIECES_PER_PLAYER,
    TRACK_LEN, YARD_LEN,
};

impl Board {
    /// All of a player's piece positions in rank order.
    pub fn ranked(&self, player: Player) -> ArrayVec<Position, PIECES_PER_PLAYER> {
        let mut order = ArrayVec::new();
        let owned = |piece: Option<PieceId>| piece.is_some_and(|p| p.owner == player);

        for slot in (0..HOME_LEN).rev() {
            if self.home_cell(player, slot).is_some() {
                order.push(Position::Home(player, slot));
            }
        }

        let entry = player.entry();
        for back in 0..TRACK_LEN {
            let idx = track_add(entry, -(back as i8));
            let piece = self.track_cell(idx);
            if owned(piece) && !self.is_blocking_at(idx) {
                order.push(Position::Track(idx));
            }
        }

        if owned(self.track_cell(entry)) && self.is_blocking_at(entry) {
            order.push(Position::Track(entry));
        }

        for slot in 0..YARD_LEN {
            if self.yard_cell(player, slot).is_some() {
                order.push(Position::Yard(player, slot));
            }
        }

        debug_assert_eq!(order.len(), PIECES_PER_PLAYER);
        order
    }

    /// Position of the piece a reference currently names.
    pub fn resolve(&self, piece: PieceRef) -> Position {
        self.ranked(piece.player())[piece.rank() as usize]
    }

    /// The piece a reference currently names.
    pub fn piece_at(&self, piece: PieceRef) -> PieceId {
        self.get(self.resolve(piece))
            .expect("every ranked position is occupied")
    }

    /// Current rank of a piece.
    pub fn rank_of(&self, piece: PieceId) -> PieceRef {
        let pos = self.position_of(piece);
        let rank = self
            .ranked(piece.owner)
            .iter()
            .position(|&p| p == pos)
            .expect("a piece always appears in its owner's ranking");
        PieceRef::new(piece.owner, rank as u8).expect("rank below piece count")
    }

    /// References to a player's pieces in one zone, in rank order.
    pub fn pieces_in_zone(&self, player: Player, zone: Zone) -> Vec<PieceRef> {
        self.ranked(player)
            .iter()
            .enumerate()
            .filter(|(_, pos)| pos.zone() == zone)
            .filter_map(|(rank, _)| PieceRef::new(player, rank as u8))
            .collect()
    }
}
