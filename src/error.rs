// src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::board::{Side, Square};
use crate::piece::PieceId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid square name '{0}', expected a file a-h followed by a rank 1-8")]
pub struct SquareParseError(pub String);

/// Why a move request was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),
    #[error("piece {0} has been captured")]
    PieceCaptured(PieceId),
    #[error("{0} is not on the board")]
    OffBoard(Square),
    #[error("it is {to_move}'s turn to move")]
    NotYourTurn { to_move: Side },
    #[error("illegal move: {from} to {to}")]
    IllegalMove { from: Square, to: Square },
    #[error("illegal move {from} to {to}: leaves the king in check")]
    LeavesKingInCheck { from: Square, to: Square },
    #[error("the game is over, {winner} won by checkmate")]
    GameOver { winner: Side },
}

/// A broken board invariant. These indicate a bug in commit or simulation, or
/// a malformed starting layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("pieces {first} and {second} share square {square}")]
    SharedSquare { square: Square, first: PieceId, second: PieceId },
    #[error("piece {piece} stands off the board at {square}")]
    OffBoard { piece: PieceId, square: Square },
    #[error("{0} has no king on the board")]
    MissingKing(Side),
    #[error("{0} has more than one king on the board")]
    ExtraKing(Side),
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("I/O error with layout file '{}': {source}", path.display())]
    Io { path: PathBuf, #[source] source: io::Error },
    #[error("layout is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("placement at {0} is off the board")]
    OffBoard(Square),
    #[error("{side} has {count} pieces, at most {max} are allowed")]
    TooManyPieces { side: Side, count: usize, max: usize },
    #[error("{side} is in check while it is not their move, so their king could be taken")]
    OpponentInCheck { side: Side },
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
