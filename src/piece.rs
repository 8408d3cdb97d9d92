// src/piece.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::{Side, Square};

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind { Pawn, Rook, Knight, Bishop, Queen, King }

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn, PieceKind::Rook, PieceKind::Knight,
        PieceKind::Bishop, PieceKind::Queen, PieceKind::King,
    ];

    /// Lowercase board symbol; the caller uppercases it for White.
    pub fn symbol(&self) -> char {
        match self {
            PieceKind::Pawn => 'p', PieceKind::Knight => 'n', PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r', PieceKind::Queen => 'q', PieceKind::King => 'k',
        }
    }
}

/// Stable identity of a piece: its slot in the owning game's piece list.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PieceId(pub(crate) usize);

impl PieceId {
    #[inline]
    pub fn index(&self) -> usize { self.0 }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: PieceId,
    pub side: Side,
    pub kind: PieceKind,
    /// `None` once the piece has been captured.
    pub position: Option<Square>,
    /// Set by the first committed move. Only pawns, rooks and kings care.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(id: PieceId, side: Side, kind: PieceKind, square: Square) -> Self {
        Piece { id, side, kind, position: Some(square), has_moved: false }
    }

    #[inline]
    pub fn is_live(&self) -> bool { self.position.is_some() }

    #[inline]
    pub fn is_at(&self, square: Square) -> bool { self.position == Some(square) }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.side {
            Side::White => self.kind.symbol().to_ascii_uppercase(),
            Side::Black => self.kind.symbol(),
        };
        write!(f, "{}", symbol)
    }
}

// --- Occupancy Queries ---

/// The live piece standing on `square`, if any.
#[inline]
pub fn occupant(pieces: &[Piece], square: Square) -> Option<&Piece> {
    pieces.iter().find(|p| p.is_at(square))
}

#[inline]
pub fn is_occupied(pieces: &[Piece], square: Square) -> bool {
    occupant(pieces, square).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_follow_side() {
        let white = Piece::new(PieceId(0), Side::White, PieceKind::Knight, Square::new(1, 0));
        let black = Piece::new(PieceId(1), Side::Black, PieceKind::Queen, Square::new(3, 7));
        assert_eq!(white.to_string(), "N");
        assert_eq!(black.to_string(), "q");
    }

    #[test]
    fn captured_pieces_do_not_occupy() {
        let mut rook = Piece::new(PieceId(0), Side::White, PieceKind::Rook, Square::new(0, 0));
        let pieces = vec![rook.clone()];
        assert_eq!(occupant(&pieces, Square::new(0, 0)).map(|p| p.id), Some(PieceId(0)));

        rook.position = None;
        let pieces = vec![rook];
        assert!(!is_occupied(&pieces, Square::new(0, 0)));
        assert!(!pieces[0].is_live());
    }
}
