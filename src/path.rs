// src/path.rs
//! Line-of-sight scanning between two squares.

use crate::board::{Offset, Square};
use crate::piece::{is_occupied, Piece};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Line { Horizontal, Vertical, Diagonal }

impl Line {
    /// The straight line joining `from` and `to`, or `None` when they are equal,
    /// not aligned or not both on the board.
    pub fn between(from: Square, to: Square) -> Option<Line> {
        if !from.is_on_board() || !to.is_on_board() { return None; }
        let d = to - from;
        if d.is_zero() { return None; }
        if d.rank == 0 { Some(Line::Horizontal) }
        else if d.file == 0 { Some(Line::Vertical) }
        else if d.file.abs() == d.rank.abs() { Some(Line::Diagonal) }
        else { None }
    }
}

/// Squares strictly between two aligned squares, walked from the source.
#[derive(Debug, Clone)]
pub struct Path {
    next: Square,
    step: Offset,
    remaining: i8,
}

impl Path {
    /// `None` unless both squares are on the board and aligned.
    pub fn new(from: Square, to: Square) -> Option<Path> {
        Line::between(from, to)?;
        let d = to - from;
        let step = Offset::new(d.file.signum(), d.rank.signum());
        Some(Path { next: from + step, step, remaining: d.chebyshev() - 1 })
    }
}

impl Iterator for Path {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if self.remaining <= 0 { return None; }
        let sq = self.next;
        self.next = sq + self.step;
        self.remaining -= 1;
        Some(sq)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.max(0) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Path {}

/// Nearest occupied square strictly between `from` and `to`. Unaligned squares
/// have no path and therefore no blocker.
pub fn first_blocker(from: Square, to: Square, pieces: &[Piece]) -> Option<Square> {
    Path::new(from, to)?.find(|&sq| is_occupied(pieces, sq))
}

/// True iff `from` and `to` lie on a common line with nothing standing between
/// them. Endpoint occupancy is not considered.
pub fn is_clear(from: Square, to: Square, pieces: &[Piece]) -> bool {
    match Path::new(from, to) {
        Some(mut path) => !path.any(|sq| is_occupied(pieces, sq)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Side;
    use crate::piece::{PieceId, PieceKind};

    fn sq(s: &str) -> Square { s.parse().unwrap() }

    fn pawn_at(id: usize, s: &str) -> Piece {
        Piece::new(PieceId(id), Side::White, PieceKind::Pawn, sq(s))
    }

    #[test]
    fn classifies_lines() {
        assert_eq!(Line::between(sq("a1"), sq("h1")), Some(Line::Horizontal));
        assert_eq!(Line::between(sq("d2"), sq("d7")), Some(Line::Vertical));
        assert_eq!(Line::between(sq("h8"), sq("a1")), Some(Line::Diagonal));
        assert_eq!(Line::between(sq("b1"), sq("c3")), None);
        assert_eq!(Line::between(sq("e4"), sq("e4")), None);
        assert_eq!(Line::between(sq("e1"), Square::new(-128, 0)), None);
    }

    #[test]
    fn path_excludes_endpoints() {
        let squares: Vec<_> = Path::new(sq("a1"), sq("d4")).unwrap().collect();
        assert_eq!(squares, vec![sq("b2"), sq("c3")]);

        let squares: Vec<_> = Path::new(sq("h5"), sq("e5")).unwrap().collect();
        assert_eq!(squares, vec![sq("g5"), sq("f5")]);

        assert_eq!(Path::new(sq("c3"), sq("c4")).unwrap().len(), 0);
    }

    #[test]
    fn blockers_anywhere_on_the_path() {
        let pieces = vec![pawn_at(0, "c3")];
        assert!(!is_clear(sq("a1"), sq("e5"), &pieces));
        assert_eq!(first_blocker(sq("a1"), sq("e5"), &pieces), Some(sq("c3")));
        assert!(is_clear(sq("a1"), sq("c3"), &pieces), "endpoint occupant is not a blocker");
        assert!(is_clear(sq("a2"), sq("e6"), &pieces));
    }

    #[test]
    fn captured_pieces_never_block() {
        let mut p = pawn_at(0, "d4");
        p.position = None;
        assert!(is_clear(sq("d1"), sq("d8"), &[p]));
    }

    #[test]
    fn off_board_endpoints_have_no_path() {
        assert!(Path::new(sq("e1"), Square::new(-128, 0)).is_none());
        assert!(Path::new(Square::new(i8::MAX, 0), sq("a1")).is_none());
        assert!(!is_clear(sq("a1"), Square::new(0, 8), &[]));
        assert_eq!(first_blocker(Square::new(-1, -1), sq("h8"), &[]), None);
    }

    #[test]
    fn unaligned_is_never_clear() {
        assert!(!is_clear(sq("a1"), sq("b3"), &[]));
        assert_eq!(first_blocker(sq("a1"), sq("b3"), &[]), None);
    }
}
