// src/game.rs
//! Game state: owns every piece, commits moves and answers check/checkmate.
//!
//! Queries that need to try a move out (checkmate, castling through check,
//! self-check filtering) do so in place through [`Hypothetical`] and undo it
//! before returning, which is why they take `&mut self`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Deref;
use tracing::{debug, error, info, trace, warn};

use crate::board::{Offset, Side, Square, BOARD_SIZE};
use crate::error::{InvariantViolation, LayoutError, MoveError};
use crate::layout::{StartingLayout, STANDARD_LAYOUT};
use crate::piece::{occupant, Piece, PieceId, PieceKind};
use crate::rules::{self, CastleSide};

// --- Move Results ---

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RookRelocation {
    pub rook: PieceId,
    pub from: Square,
    pub to: Square,
}

/// What a committed move did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceId>,
    /// Set when the move was a castle.
    pub rook_relocation: Option<RookRelocation>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Check(Side),
    Checkmate { loser: Side, winner: Side },
}

// --- Hypothetical Moves ---

/// Record of a move tried out by [`GameState::apply_hypothetical`]. Holds
/// exactly what [`GameState::undo`] needs to put the board back.
#[must_use = "a hypothetical move leaves the board changed until it is undone"]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Hypothetical {
    piece: PieceId,
    from: Square,
    to: Square,
    captured: Option<(PieceId, Square)>,
}

impl Hypothetical {
    pub fn piece(&self) -> PieceId { self.piece }
    pub fn from(&self) -> Square { self.from }
    pub fn to(&self) -> Square { self.to }
    pub fn captured(&self) -> Option<PieceId> { self.captured.map(|(id, _)| id) }
}

/// A hypothetical move held open for inspection. Reads go to the changed
/// board; dropping the guard (also while unwinding) restores it.
pub struct Simulation<'a> {
    state: &'a mut GameState,
    undo: Option<Hypothetical>,
}

impl Simulation<'_> {
    pub fn hypothetical(&self) -> Option<&Hypothetical> { self.undo.as_ref() }
}

impl Deref for Simulation<'_> {
    type Target = GameState;
    fn deref(&self) -> &GameState { &*self.state }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        if let Some(hypothetical) = self.undo.take() {
            self.state.undo(hypothetical);
        }
    }
}

// --- Game State ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pieces: Vec<Piece>,
    /// Check flag per side, indexed by `Side::index`. Refreshed after every commit.
    in_check: [bool; 2],
    turn: Side,
}

impl Default for GameState {
    fn default() -> Self { Self::new() }
}

impl GameState {
    /// A fresh game from the standard layout, White to move.
    pub fn new() -> Self {
        let mut state = Self::place(&STANDARD_LAYOUT);
        debug_assert!(state.check_invariants().is_ok(), "standard layout is malformed");
        state.refresh_check_flags();
        state
    }

    pub fn from_layout(layout: &StartingLayout) -> Result<Self, LayoutError> {
        layout.validate()?;
        let mut state = Self::place(layout);
        state.check_invariants()?;
        let waiting = state.turn.opponent();
        if state.is_in_check(waiting) {
            return Err(LayoutError::OpponentInCheck { side: waiting });
        }
        state.refresh_check_flags();
        debug!(pieces = state.pieces.len(), to_move = %state.turn, "game state created from layout");
        Ok(state)
    }

    fn place(layout: &StartingLayout) -> Self {
        let pieces = layout.placements.iter().enumerate()
            .map(|(i, p)| Piece {
                id: PieceId(i),
                side: p.side,
                kind: p.kind,
                position: Some(p.square),
                has_moved: p.has_moved,
            })
            .collect();
        GameState { pieces, in_check: [false; 2], turn: layout.to_move }
    }

    // --- Queries ---

    pub fn pieces(&self) -> &[Piece] { &self.pieces }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> { self.pieces.get(id.index()) }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> { occupant(&self.pieces, square) }

    pub fn king(&self, side: Side) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.side == side && p.kind == PieceKind::King && p.is_live())
    }

    /// Pieces of `side` that have been taken off the board.
    pub fn captured(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(move |p| p.side == side && !p.is_live())
    }

    pub fn turn(&self) -> Side { self.turn }

    /// Check flag as of the last commit.
    pub fn in_check_flag(&self, side: Side) -> bool { self.in_check[side.index()] }

    fn live_square(&self, id: PieceId) -> Result<Square, MoveError> {
        let piece = self.piece(id).ok_or(MoveError::UnknownPiece(id))?;
        piece.position.ok_or(MoveError::PieceCaptured(id))
    }

    // --- Check Detection ---

    /// True iff some live opposing piece could move onto `side`'s king.
    pub fn is_in_check(&self, side: Side) -> bool {
        let Some(king_sq) = self.king(side).and_then(|k| k.position) else {
            // Unreachable in a valid game; treat a missing king as attacked.
            error!(%side, "king not found on the board");
            return true;
        };
        self.pieces.iter()
            .filter(|p| p.side != side && p.is_live())
            .any(|p| rules::is_legal_move(p, king_sq, &self.pieces))
    }

    /// True iff `side` is in check and no move by any of its pieces gets it out.
    pub fn is_in_checkmate(&mut self, side: Side) -> bool {
        if !self.is_in_check(side) { return false; }

        let defenders: Vec<PieceId> = self.pieces.iter()
            .filter(|p| p.side == side && p.is_live())
            .map(|p| p.id)
            .collect();
        for id in defenders {
            for to in Square::all() {
                if self.is_safe_move(id, to) {
                    trace!(piece = %id, %to, "move out of check found");
                    return false;
                }
            }
        }
        debug!(%side, "checkmate");
        true
    }

    // --- Legality ---

    /// Movement rules plus the castling conditions only the whole board can
    /// answer: no castling out of check or across an attacked square.
    pub fn is_legal_move(&mut self, id: PieceId, to: Square) -> bool {
        let Some(piece) = self.piece(id) else { return false };
        if !rules::is_legal_move(piece, to, &self.pieces) { return false; }

        let side = piece.side;
        match rules::castling(piece, to, &self.pieces) {
            Some(castle) => {
                !self.is_in_check(side)
                    && !self.would_be_in_check(id, castle.rook_to).unwrap_or(true)
            }
            None => true,
        }
    }

    /// A legal move that does not leave the mover's own king in check.
    pub fn is_safe_move(&mut self, id: PieceId, to: Square) -> bool {
        self.is_legal_move(id, to) && !self.would_be_in_check(id, to).unwrap_or(true)
    }

    /// Destinations to offer for `id`: every safe move.
    pub fn legal_moves_from(&mut self, id: PieceId) -> BTreeSet<Square> {
        let mut moves = BTreeSet::new();
        for to in Square::all() {
            if self.is_safe_move(id, to) {
                moves.insert(to);
            }
        }
        moves
    }

    // --- Simulation ---

    /// Moves `id` to `to` without committing: any piece already there is taken
    /// off the board, nothing else changes. Pair with [`GameState::undo`].
    pub fn apply_hypothetical(&mut self, id: PieceId, to: Square) -> Result<Hypothetical, MoveError> {
        let from = self.live_square(id)?;
        if !to.is_on_board() { return Err(MoveError::OffBoard(to)); }

        let captured = self.pieces.iter()
            .find(|p| p.id != id && p.is_at(to))
            .map(|p| (p.id, to));
        if let Some((victim, _)) = captured {
            self.pieces[victim.index()].position = None;
        }
        self.pieces[id.index()].position = Some(to);

        trace!(piece = %id, %from, %to, captured = ?captured.map(|(v, _)| v), "hypothetical move applied");
        Ok(Hypothetical { piece: id, from, to, captured })
    }

    /// Reverts a hypothetical move.
    pub fn undo(&mut self, hypothetical: Hypothetical) {
        self.pieces[hypothetical.piece.index()].position = Some(hypothetical.from);
        if let Some((victim, square)) = hypothetical.captured {
            self.pieces[victim.index()].position = Some(square);
        }
    }

    /// Applies a hypothetical move behind a guard that undoes it on drop.
    pub fn simulate(&mut self, id: PieceId, to: Square) -> Result<Simulation<'_>, MoveError> {
        let hypothetical = self.apply_hypothetical(id, to)?;
        Ok(Simulation { state: self, undo: Some(hypothetical) })
    }

    /// Whether moving `id` to `to` would leave its own side in check. The
    /// board is left exactly as it was.
    pub fn would_be_in_check(&mut self, id: PieceId, to: Square) -> Result<bool, MoveError> {
        let side = self.piece(id).ok_or(MoveError::UnknownPiece(id))?.side;
        let simulation = self.simulate(id, to)?;
        Ok(simulation.is_in_check(side))
    }

    // --- Commit ---

    /// Plays an already-validated move: captures an opposing occupant, moves
    /// the piece, brings the rook along on a castle, refreshes the check flags
    /// and passes the turn. Legality is the caller's responsibility.
    pub fn commit_move(&mut self, id: PieceId, to: Square) -> Result<MoveOutcome, MoveError> {
        let from = self.live_square(id)?;
        if !to.is_on_board() { return Err(MoveError::OffBoard(to)); }
        let (side, kind) = {
            let piece = &self.pieces[id.index()];
            (piece.side, piece.kind)
        };

        let captured = self.pieces.iter()
            .find(|p| p.id != id && p.side != side && p.is_at(to))
            .map(|p| p.id);
        if let Some(victim) = captured {
            self.pieces[victim.index()].position = None;
        }

        let mover = &mut self.pieces[id.index()];
        mover.position = Some(to);
        mover.has_moved = true;

        let d = to - from;
        let rook_relocation = if kind == PieceKind::King && d.rank == 0 && d.file.abs() == 2 {
            self.relocate_castling_rook(side, from, d)
        } else {
            None
        };

        self.refresh_check_flags();
        self.turn = side.opponent();

        debug!(piece = %id, ?kind, %side, %from, %to, captured = ?captured, "move committed");
        debug_assert!(
            self.check_invariants().is_ok(),
            "board invariant broken after {from}->{to}: {:?}",
            self.check_invariants()
        );

        Ok(MoveOutcome { piece: id, from, to, captured, rook_relocation })
    }

    fn relocate_castling_rook(&mut self, side: Side, king_from: Square, d: Offset) -> Option<RookRelocation> {
        let castle_side = CastleSide::from_file_delta(d.file)?;
        let rook_from = rules::castling_rook_home(king_from, castle_side);
        let rook_to = king_from + Offset::new(d.file / 2, 0);

        let Some(rook) = self.pieces.iter()
            .find(|p| p.side == side && p.kind == PieceKind::Rook && p.is_at(rook_from))
            .map(|p| p.id)
        else {
            warn!(%side, %rook_from, "king castled with no rook in the corner");
            return None;
        };

        let piece = &mut self.pieces[rook.index()];
        piece.position = Some(rook_to);
        piece.has_moved = true;
        info!(%side, ?castle_side, %rook_from, %rook_to, "castled");
        Some(RookRelocation { rook, from: rook_from, to: rook_to })
    }

    fn refresh_check_flags(&mut self) {
        for side in Side::ALL {
            self.in_check[side.index()] = self.is_in_check(side);
        }
    }

    // --- Turn Orchestration ---

    /// Validates a move for the side to move and commits it.
    pub fn try_move(&mut self, id: PieceId, to: Square) -> Result<MoveOutcome, MoveError> {
        let from = self.live_square(id)?;
        let to_move = self.turn;
        if self.is_in_checkmate(to_move) {
            return Err(MoveError::GameOver { winner: to_move.opponent() });
        }
        if self.pieces[id.index()].side != to_move {
            return Err(MoveError::NotYourTurn { to_move });
        }
        if !to.is_on_board() { return Err(MoveError::OffBoard(to)); }
        if !self.is_legal_move(id, to) {
            return Err(MoveError::IllegalMove { from, to });
        }
        if self.would_be_in_check(id, to)? {
            return Err(MoveError::LeavesKingInCheck { from, to });
        }
        let outcome = self.commit_move(id, to)?;

        let loser = to_move.opponent();
        if self.in_check_flag(loser) && self.is_in_checkmate(loser) {
            info!(%loser, winner = %to_move, "game over by checkmate");
        }
        Ok(outcome)
    }

    /// Where the game stands for the side to move.
    pub fn status(&mut self) -> GameStatus {
        let side = self.turn;
        if self.is_in_checkmate(side) {
            debug!(loser = %side, "status polled after checkmate");
            GameStatus::Checkmate { loser: side, winner: side.opponent() }
        } else if self.in_check_flag(side) {
            GameStatus::Check(side)
        } else {
            GameStatus::Ongoing
        }
    }

    // --- Invariants ---

    /// No two live pieces on one square, every live piece on the board, one
    /// live king per side.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen: HashMap<Square, PieceId> = HashMap::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            let Some(square) = piece.position else { continue };
            if !square.is_on_board() {
                return Err(InvariantViolation::OffBoard { piece: piece.id, square });
            }
            if let Some(&first) = seen.get(&square) {
                return Err(InvariantViolation::SharedSquare { square, first, second: piece.id });
            }
            seen.insert(square, piece.id);
        }
        for side in Side::ALL {
            let kings = self.pieces.iter()
                .filter(|p| p.side == side && p.kind == PieceKind::King && p.is_live())
                .count();
            match kings {
                0 => return Err(InvariantViolation::MissingKing(side)),
                1 => {}
                _ => return Err(InvariantViolation::ExtraKing(side)),
            }
        }
        Ok(())
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in Side::ALL {
            write!(f, "Captured by {}: ", side)?;
            for piece in self.captured(side.opponent()) { write!(f, "{} ", piece)?; }
            writeln!(f)?;
        }

        writeln!(f, "  +-----------------+")?;
        for rank in (0..BOARD_SIZE).rev() {
            write!(f, "{} | ", rank + 1)?;
            for file in 0..BOARD_SIZE {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "  +-----------------+")?;
        writeln!(f, "    a b c d e f g h")?;

        write!(f, "Turn: {}", self.turn)?;
        if self.in_check_flag(self.turn) { write!(f, " (in check)")?; }
        writeln!(f)
    }
}
