// src/layout.rs
//! Starting layouts: which pieces stand where when a game begins.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::board::{Side, Square, BOARD_SIZE};
use crate::error::LayoutError;
use crate::piece::PieceKind;

pub const MAX_PIECES_PER_SIDE: usize = 16;

const BACK_RANK_ORDER: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

lazy_static! {
    pub static ref STANDARD_LAYOUT: StartingLayout = StartingLayout::standard();
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Placement {
    pub side: Side,
    pub kind: PieceKind,
    pub square: Square,
    #[serde(default)]
    pub has_moved: bool,
}

impl Placement {
    pub fn new(side: Side, kind: PieceKind, square: Square) -> Self {
        Placement { side, kind, square, has_moved: false }
    }

    pub fn moved(mut self) -> Self {
        self.has_moved = true;
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StartingLayout {
    #[serde(default = "white")]
    pub to_move: Side,
    pub placements: Vec<Placement>,
}

fn white() -> Side { Side::White }

impl StartingLayout {
    /// Sixteen pieces per side on their usual squares, White to move.
    pub fn standard() -> Self {
        let mut placements = Vec::with_capacity(2 * MAX_PIECES_PER_SIDE);
        for side in Side::ALL {
            for file in 0..BOARD_SIZE {
                placements.push(Placement::new(side, PieceKind::Pawn, Square::new(file, side.pawn_rank())));
            }
            for (file, kind) in BACK_RANK_ORDER.iter().enumerate() {
                placements.push(Placement::new(side, *kind, Square::new(file as i8, side.back_rank())));
            }
        }
        StartingLayout { to_move: Side::White, placements }
    }

    pub fn from_placements(to_move: Side, placements: Vec<Placement>) -> Self {
        StartingLayout { to_move, placements }
    }

    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        let layout: StartingLayout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|source| LayoutError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&json)
    }

    /// Checks what can be checked without building a board. Shared squares and
    /// king counts are verified by the game state it feeds.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if let Some(p) = self.placements.iter().find(|p| !p.square.is_on_board()) {
            return Err(LayoutError::OffBoard(p.square));
        }
        for side in Side::ALL {
            let count = self.placements.iter().filter(|p| p.side == side).count();
            if count > MAX_PIECES_PER_SIDE {
                return Err(LayoutError::TooManyPieces { side, count, max: MAX_PIECES_PER_SIDE });
            }
        }
        Ok(())
    }
}

impl Default for StartingLayout {
    fn default() -> Self { STANDARD_LAYOUT.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_has_sixteen_a_side() {
        let layout = StartingLayout::standard();
        assert_eq!(layout.placements.len(), 32);
        for side in Side::ALL {
            let kings = layout.placements.iter()
                .filter(|p| p.side == side && p.kind == PieceKind::King)
                .collect::<Vec<_>>();
            assert_eq!(kings.len(), 1);
            assert_eq!(kings[0].square, Square::new(4, side.back_rank()));
        }
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn parses_json_with_defaults() {
        let json = r#"{
            "placements": [
                { "side": "white", "kind": "king", "square": "e1" },
                { "side": "black", "kind": "king", "square": "e8" },
                { "side": "black", "kind": "pawn", "square": "a6", "has_moved": true }
            ]
        }"#;
        let layout = StartingLayout::from_json_str(json).unwrap();
        assert_eq!(layout.to_move, Side::White);
        assert!(!layout.placements[0].has_moved);
        assert!(layout.placements[2].has_moved);
        assert_eq!(layout.placements[2].square, "a6".parse().unwrap());
    }

    #[test]
    fn rejects_bad_json() {
        let err = StartingLayout::from_json_str(r#"{ "placements": [ { "side": "red" } ] }"#);
        assert!(matches!(err, Err(LayoutError::Json(_))));
        let err = StartingLayout::from_json_str(
            r#"{ "placements": [ { "side": "white", "kind": "king", "square": "e9" } ] }"#,
        );
        assert!(matches!(err, Err(LayoutError::Json(_))));
    }

    #[test]
    fn rejects_crowded_sides() {
        let mut layout = StartingLayout::standard();
        layout.placements.push(Placement::new(Side::Black, PieceKind::Queen, Square::new(3, 4)));
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::TooManyPieces { side: Side::Black, count: 17, .. })
        ));
    }

    #[test]
    fn rejects_off_board_placements() {
        let layout = StartingLayout::from_placements(
            Side::White,
            vec![Placement::new(Side::White, PieceKind::King, Square::new(8, 0))],
        );
        assert!(matches!(layout.validate(), Err(LayoutError::OffBoard(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StartingLayout::from_path("/nonexistent/layout.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/layout.json"));
    }
}
