// src/board.rs
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::SquareParseError;

// --- Constants ---
pub const BOARD_SIZE: i8 = 8;

lazy_static! {
    static ref SQUARE_NAME: Regex = Regex::new(r"^([a-hA-H])([1-8])$").unwrap();
}

// --- Sides ---
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Side { White, Black }

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    pub fn opponent(&self) -> Side {
        match self { Side::White => Side::Black, Side::Black => Side::White }
    }

    /// Index into per-side tables (check flags, counters).
    pub fn index(&self) -> usize {
        match self { Side::White => 0, Side::Black => 1 }
    }

    /// Rank step a pawn of this side takes when moving forward.
    pub fn forward(&self) -> i8 {
        match self { Side::White => 1, Side::Black => -1 }
    }

    /// Rank holding this side's king, rooks and minor pieces at setup.
    pub fn back_rank(&self) -> i8 {
        match self { Side::White => 0, Side::Black => BOARD_SIZE - 1 }
    }

    /// Rank holding this side's pawns at setup.
    pub fn pawn_rank(&self) -> i8 {
        self.back_rank() + self.forward()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

// --- Offsets ---
/// Difference between two squares, destination minus source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Offset {
    pub file: i8,
    pub rank: i8,
}

impl Offset {
    pub const fn new(file: i8, rank: i8) -> Self { Offset { file, rank } }

    pub fn is_zero(&self) -> bool { self.file == 0 && self.rank == 0 }

    /// Largest absolute component; the king-step distance.
    pub fn chebyshev(&self) -> i8 { self.file.saturating_abs().max(self.rank.saturating_abs()) }
}

// --- Squares ---
/// A board cell addressed by `(file, rank)`. Off-board values are representable
/// so that callers can ask about them; `is_on_board` tells them apart.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    pub const fn new(file: i8, rank: i8) -> Self { Square { file, rank } }

    #[inline]
    pub fn is_on_board(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.file) && (0..BOARD_SIZE).contains(&self.rank)
    }

    /// Square reached by stepping `offset` from here, which may leave the board.
    #[inline]
    pub fn offset(&self, offset: Offset) -> Square {
        Square::new(self.file + offset.file, self.rank + offset.rank)
    }

    /// Every on-board square, rank by rank from a1 to h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Square::new(file, rank)))
    }
}

impl Add<Offset> for Square {
    type Output = Square;
    fn add(self, rhs: Offset) -> Square { self.offset(rhs) }
}

impl Sub for Square {
    type Output = Offset;
    fn sub(self, rhs: Square) -> Offset {
        // Saturates for far off-board squares; exact for any two on the board.
        Offset::new(self.file.saturating_sub(rhs.file), self.rank.saturating_sub(rhs.rank))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_on_board() {
            return write!(f, "({},{})", self.file, self.rank);
        }
        let file_char = (b'a' + self.file as u8) as char;
        let rank_char = (b'1' + self.rank as u8) as char;
        write!(f, "{}{}", file_char, rank_char)
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = SQUARE_NAME.captures(s.trim())
            .ok_or_else(|| SquareParseError(s.to_string()))?;
        let file = caps[1].to_ascii_lowercase().as_bytes()[0] - b'a';
        let rank = caps[2].as_bytes()[0] - b'1';
        Ok(Square::new(file as i8, rank as i8))
    }
}

impl TryFrom<String> for Square {
    type Error = SquareParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl From<Square> for String {
    fn from(sq: Square) -> String { sq.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_the_corners() {
        assert_eq!(Square::new(0, 0).to_string(), "a1");
        assert_eq!(Square::new(7, 7).to_string(), "h8");
        assert_eq!("e4".parse::<Square>().unwrap(), Square::new(4, 3));
        assert_eq!("H1".parse::<Square>().unwrap(), Square::new(7, 0));
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "i1", "a0", "a9", "e44", "4e", "ee"] {
            assert!(bad.parse::<Square>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn bounds() {
        assert!(Square::new(0, 7).is_on_board());
        assert!(!Square::new(-1, 3).is_on_board());
        assert!(!Square::new(3, 8).is_on_board());
        assert_eq!(Square::all().count(), 64);
        assert!(Square::all().all(|sq| sq.is_on_board()));
    }

    #[test]
    fn sides_face_each_other() {
        assert_eq!(Side::White.pawn_rank(), 1);
        assert_eq!(Side::Black.pawn_rank(), 6);
        assert_eq!(Side::White.forward(), -Side::Black.forward());
        assert_eq!(Side::Black.opponent(), Side::White);
    }

    #[test]
    fn offsets() {
        let d = Square::new(6, 0) - Square::new(4, 0);
        assert_eq!(d, Offset::new(2, 0));
        assert_eq!(Square::new(4, 0) + Offset::new(1, 0), Square::new(5, 0));
        assert_eq!(Offset::new(-3, 1).chebyshev(), 3);
    }

    #[test]
    fn far_off_board_offsets_saturate() {
        let d = Square::new(-128, 0) - Square::new(4, 0);
        assert_eq!(d, Offset::new(i8::MIN, 0));
        assert_eq!(d.chebyshev(), i8::MAX);
        assert_eq!(Square::new(i8::MAX, 0) - Square::new(-1, 0), Offset::new(i8::MAX, 0));
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&Square::new(2, 6)).unwrap();
        assert_eq!(json, "\"c7\"");
        let back: Square = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Square::new(2, 6));
        assert!(serde_json::from_str::<Square>("\"z9\"").is_err());
    }
}
