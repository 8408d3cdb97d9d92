// src/lib.rs
//! Move legality, check and checkmate for two-player chess on an 8×8 board.
//!
//! [`rules`] answers "may this piece go there" from a piece list alone;
//! [`game::GameState`] owns the pieces and layers check, checkmate, castling
//! safety and move commits on top.

pub mod board;
pub mod error;
pub mod game;
pub mod layout;
pub mod path;
pub mod piece;
pub mod rules;

pub use board::{Offset, Side, Square, BOARD_SIZE};
pub use error::{InvariantViolation, LayoutError, MoveError, SquareParseError};
pub use game::{GameState, GameStatus, Hypothetical, MoveOutcome, RookRelocation, Simulation};
pub use layout::{Placement, StartingLayout, STANDARD_LAYOUT};
pub use piece::{Piece, PieceId, PieceKind};
