// src/rules.rs
//! Per-kind movement rules.
//!
//! Everything here is a pure predicate over a piece slice: no check or
//! checkmate awareness, which lives in [`crate::game`]. Castling geometry is
//! decided here; whether the king may castle out of or through check is the
//! game state's call.

use std::collections::BTreeSet;

use crate::board::{Offset, Square, BOARD_SIZE};
use crate::path;
use crate::piece::{is_occupied, occupant, Piece, PieceId, PieceKind};

// --- Castling Geometry ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastleSide { KingSide, QueenSide }

impl CastleSide {
    /// File of the rook's home corner.
    pub fn rook_file(&self) -> i8 {
        match self { CastleSide::KingSide => BOARD_SIZE - 1, CastleSide::QueenSide => 0 }
    }

    /// Castling direction for a king step of `df` files, if it is one.
    pub fn from_file_delta(df: i8) -> Option<CastleSide> {
        match df {
            2 => Some(CastleSide::KingSide),
            -2 => Some(CastleSide::QueenSide),
            _ => None,
        }
    }
}

/// A castling move as seen from the king: which rook goes along and where.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Castling {
    pub side: CastleSide,
    pub rook: PieceId,
    pub rook_from: Square,
    /// The square the king passes over, which is where the rook lands.
    pub rook_to: Square,
}

/// Rook home square for a king on `from` castling toward `side`.
pub fn castling_rook_home(from: Square, side: CastleSide) -> Square {
    Square::new(side.rook_file(), from.rank)
}

/// Recognizes a castling move by `king` to `to`: the king has not moved, steps
/// two files sideways, an unmoved rook of its side sits in that corner and
/// nothing stands between them.
pub fn castling(king: &Piece, to: Square, pieces: &[Piece]) -> Option<Castling> {
    if king.kind != PieceKind::King || king.has_moved { return None; }
    let from = king.position?;
    if !from.is_on_board() || !to.is_on_board() { return None; }
    let d = to - from;
    if d.rank != 0 { return None; }
    let side = CastleSide::from_file_delta(d.file)?;

    let rook_from = castling_rook_home(from, side);
    let rook = occupant(pieces, rook_from)?;
    if rook.kind != PieceKind::Rook || rook.side != king.side || rook.has_moved {
        return None;
    }
    if !path::is_clear(from, rook_from, pieces) { return None; }

    Some(Castling {
        side,
        rook: rook.id,
        rook_from,
        rook_to: from + Offset::new(d.file / 2, 0),
    })
}

// --- Legality Resolver ---

/// Whether `piece` may move to `to` under its movement rules, given every piece
/// on the board. Check is not considered.
pub fn is_legal_move(piece: &Piece, to: Square, pieces: &[Piece]) -> bool {
    let Some(from) = piece.position else { return false }; // Captured pieces never move
    if !to.is_on_board() { return false; }
    let d = to - from;
    if d.is_zero() { return false; }
    if occupant(pieces, to).is_some_and(|other| other.side == piece.side) { return false; }

    match piece.kind {
        PieceKind::Pawn => pawn_move(piece, from, to, d, pieces),
        PieceKind::Rook => rook_move(from, to, d, pieces),
        PieceKind::Knight => knight_move(d),
        PieceKind::Bishop => bishop_move(from, to, d, pieces),
        PieceKind::Queen => rook_move(from, to, d, pieces) || bishop_move(from, to, d, pieces),
        PieceKind::King => d.chebyshev() == 1 || castling(piece, to, pieces).is_some(),
    }
}

/// All on-board destinations `piece` may move to under [`is_legal_move`].
pub fn legal_moves_from(piece: &Piece, pieces: &[Piece]) -> BTreeSet<Square> {
    Square::all().filter(|&sq| is_legal_move(piece, sq, pieces)).collect()
}

fn pawn_move(pawn: &Piece, from: Square, to: Square, d: Offset, pieces: &[Piece]) -> bool {
    let forward = pawn.side.forward();
    match (d.file.abs(), d.rank * forward) {
        // Single push
        (0, 1) => !is_occupied(pieces, to),
        // Double push from an unmoved pawn, both squares empty
        (0, 2) => {
            !pawn.has_moved
                && !is_occupied(pieces, from + Offset::new(0, forward))
                && !is_occupied(pieces, to)
        }
        // Diagonal step only as a capture; same-side occupants were ruled out already
        (1, 1) => is_occupied(pieces, to),
        _ => false,
    }
}

fn rook_move(from: Square, to: Square, d: Offset, pieces: &[Piece]) -> bool {
    (d.file == 0 || d.rank == 0) && path::is_clear(from, to, pieces)
}

fn bishop_move(from: Square, to: Square, d: Offset, pieces: &[Piece]) -> bool {
    d.file.abs() == d.rank.abs() && path::is_clear(from, to, pieces)
}

fn knight_move(d: Offset) -> bool {
    matches!((d.file.abs(), d.rank.abs()), (1, 2) | (2, 1))
}
