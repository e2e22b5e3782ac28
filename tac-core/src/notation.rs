//! Text notation for boards, positions and split distributions.
//!
//! ```text
//! Board:         four player groups separated by '/', each listing the
//!                player's pieces by intrinsic slot, separated by ','
//!                  piece = zone letter + index, '*' when blocking
//!                  T17  track 17     H2  home slot 2     Y0  yard slot 0
//!                start: Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3
//!
//! Position:      T17, H0.2 (player 0, home slot 2), Y3.1
//!
//! Segment:       position, signed steps, '!' when avoiding home
//!                  T17+4   H0.1+2   T60+5!
//!
//! Distribution:  segments separated by spaces
//! ```
//!
//! Parsing a board validates every occupancy invariant.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{
    Board, Distribution, InvariantError, Player, Position, Segment, PIECES_PER_PLAYER, PLAYERS,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("expected {expected} player groups, found {0}", expected = PLAYERS)]
    GroupCount(usize),
    #[error("player {player} lists {count} pieces, expected {expected}", expected = PIECES_PER_PLAYER)]
    PieceCount { player: usize, count: usize },
    #[error("bad piece: {0:?}")]
    BadPiece(String),
    #[error("bad position: {0:?}")]
    BadPosition(String),
    #[error("bad segment: {0:?}")]
    BadSegment(String),
    #[error("invalid board: {0}")]
    Invalid(#[from] InvariantError),
}

fn zone_letter(pos: Position) -> char {
    match pos {
        Position::Track(_) => 'T',
        Position::Home(..) => 'H',
        Position::Yard(..) => 'Y',
    }
}

/// Build a position from a zone letter, its owner and an index, checking
/// the index range.
fn position_from(letter: char, owner: Player, index: u8) -> Option<Position> {
    let pos = match letter {
        'T' => Position::Track(index),
        'H' => Position::Home(owner, index),
        'Y' => Position::Yard(owner, index),
        _ => return None,
    };
    pos.is_valid().then_some(pos)
}

/// Split a leading zone letter off a token.
fn split_letter(token: &str) -> Option<(char, &str)> {
    let mut chars = token.chars();
    let letter = chars.next()?;
    Some((letter, chars.as_str()))
}

/// Parse a piece token of a player group: `T17*`, `H2`, `Y0`.
fn parse_piece(token: &str, owner: Player) -> Result<(Position, bool), NotationError> {
    let bad = || NotationError::BadPiece(token.to_string());
    let (body, blocking) = match token.strip_suffix('*') {
        Some(body) => (body, true),
        None => (token, false),
    };
    let (letter, digits) = split_letter(body).ok_or_else(bad)?;
    let index: u8 = digits.parse().map_err(|_| bad())?;
    let pos = position_from(letter, owner, index).ok_or_else(bad)?;
    Ok((pos, blocking))
}

// ========== Position ==========

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Position::Track(idx) => write!(f, "T{idx}"),
            Position::Home(player, idx) | Position::Yard(player, idx) => {
                write!(f, "{}{}.{}", zone_letter(*self), player.index(), idx)
            }
        }
    }
}

impl FromStr for Position {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || NotationError::BadPosition(s.to_string());
        let (letter, rest) = split_letter(s).ok_or_else(bad)?;
        let (owner, index) = match rest.split_once('.') {
            Some((player, index)) if letter != 'T' => {
                let player: usize = player.parse().map_err(|_| bad())?;
                (Player::from_index(player).ok_or_else(bad)?, index)
            }
            None if letter == 'T' => (Player::Zero, rest),
            _ => return Err(bad()),
        };
        let index: u8 = index.parse().map_err(|_| bad())?;
        position_from(letter, owner, index).ok_or_else(bad)
    }
}

// ========== Segment & Distribution ==========

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}", self.from, self.steps)?;
        if self.avoid_home {
            write!(f, "!")?;
        }
        Ok(())
    }
}

impl FromStr for Segment {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || NotationError::BadSegment(s.to_string());
        let (body, avoid_home) = match s.strip_suffix('!') {
            Some(body) => (body, true),
            None => (s, false),
        };
        let sign = body.find(['+', '-']).ok_or_else(bad)?;
        let (from, steps) = body.split_at(sign);
        let from: Position = from.parse().map_err(|_| bad())?;
        let steps: i8 = steps.parse().map_err(|_| bad())?;
        Ok(Segment {
            from,
            steps,
            avoid_home,
        })
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for Distribution {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Segment>, _>>()?;
        Ok(Distribution { segments })
    }
}

// ========== Board ==========

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (player, row) in self.layout().iter().enumerate() {
            if player > 0 {
                write!(f, "/")?;
            }
            for (slot, &(pos, blocking)) in row.iter().enumerate() {
                if slot > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}{}", zone_letter(pos), pos.index())?;
                if blocking {
                    write!(f, "*")?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = s.trim().split('/').collect();
        if groups.len() != PLAYERS {
            return Err(NotationError::GroupCount(groups.len()));
        }

        let mut layout = [[(Position::Track(0), false); PIECES_PER_PLAYER]; PLAYERS];
        for (player, group) in groups.iter().enumerate() {
            let tokens: Vec<&str> = group.split(',').map(str::trim).collect();
            if tokens.len() != PIECES_PER_PLAYER {
                return Err(NotationError::PieceCount {
                    player,
                    count: tokens.len(),
                });
            }
            let owner = Player::ALL[player];
            for (slot, token) in tokens.iter().enumerate() {
                layout[player][slot] = parse_piece(token, owner)?;
            }
        }
        Ok(Board::from_layout(layout)?)
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceId;

    const START: &str = "Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3";

    #[test]
    fn test_start_board() {
        assert_eq!(Board::new().to_string(), START);
        assert_eq!(START.parse::<Board>().unwrap(), Board::new());
    }

    #[test]
    fn test_board_roundtrip_exact() {
        let mut board = Board::new();
        board.move_piece(PieceId::new(Player::Zero, 1), Position::Track(0), true);
        board.move_piece(PieceId::new(Player::Zero, 3), Position::Home(Player::Zero, 2), false);
        board.move_piece(PieceId::new(Player::Three, 0), Position::Track(63), false);

        let text = board.to_string();
        assert_eq!(text, "Y0,T0*,Y2,H2/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/T63,Y1,Y2,Y3");
        let parsed: Board = text.parse().unwrap();
        assert_eq!(parsed, board);
        assert_eq!(parsed.layout(), board.layout());
    }

    #[test]
    fn test_board_parse_errors() {
        assert_eq!(
            "Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3".parse::<Board>(),
            Err(NotationError::GroupCount(2))
        );
        assert_eq!(
            "Y0,Y1,Y2/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3".parse::<Board>(),
            Err(NotationError::PieceCount { player: 0, count: 3 })
        );
        assert_eq!(
            "Y0,Y1,Y2,Q3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3".parse::<Board>(),
            Err(NotationError::BadPiece("Q3".to_string()))
        );
        assert_eq!(
            "Y0,Y1,Y2,T64/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3".parse::<Board>(),
            Err(NotationError::BadPiece("T64".to_string()))
        );
    }

    #[test]
    fn test_board_parse_rejects_broken_invariants() {
        // Two pieces on track 5
        let err = "T5,Y1,Y2,Y3/T5,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3".parse::<Board>();
        assert_eq!(
            err,
            Err(NotationError::Invalid(InvariantError::DoubleOccupancy(
                Position::Track(5)
            )))
        );

        // Blocking away from the entry square
        let err = "T5*,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3".parse::<Board>();
        assert_eq!(
            err,
            Err(NotationError::Invalid(InvariantError::BlockingOffEntry(
                PieceId::new(Player::Zero, 0)
            )))
        );

        // Same yard slot twice
        let err = "Y0,Y0,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3".parse::<Board>();
        assert!(matches!(err, Err(NotationError::Invalid(_))));
    }

    #[test]
    fn test_position_notation() {
        for pos in Position::all() {
            let text = pos.to_string();
            assert_eq!(text.parse::<Position>(), Ok(pos), "{text}");
        }
        assert_eq!(Position::Home(Player::Two, 3).to_string(), "H2.3");
        assert!("T64".parse::<Position>().is_err());
        assert!("H4.0".parse::<Position>().is_err());
        assert!("H1".parse::<Position>().is_err());
        assert!("T1.2".parse::<Position>().is_err());
        assert!("".parse::<Position>().is_err());
    }

    #[test]
    fn test_segment_notation() {
        let seg = Segment {
            from: Position::Track(60),
            steps: 5,
            avoid_home: true,
        };
        assert_eq!(seg.to_string(), "T60+5!");
        assert_eq!("T60+5!".parse::<Segment>(), Ok(seg));

        let back: Segment = "T2-4".parse().unwrap();
        assert_eq!(back.from, Position::Track(2));
        assert_eq!(back.steps, -4);
        assert!(!back.avoid_home);

        let home: Segment = "H1.0+2".parse().unwrap();
        assert_eq!(home.from, Position::Home(Player::One, 0));

        assert!("T60".parse::<Segment>().is_err());
        assert!("T60+x".parse::<Segment>().is_err());
    }

    #[test]
    fn test_distribution_notation() {
        let text = "T1+3 T17+4";
        let dist: Distribution = text.parse().unwrap();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.total_steps(), 7);
        assert_eq!(dist.to_string(), text);
        assert_eq!("".parse::<Distribution>(), Ok(Distribution::default()));
    }
}
