use crate::game_state::chess_rules::castling_home;
use crate::game_state::chess_types::{mirror_square, Color, PieceId, PieceKind, Square};

/// A chess piece together with its location and castling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceRecord {
    /// Identity; the kind inside changes only on promotion.
    pub id: PieceId,
    /// Current square (last square held, once captured).
    pub square: Square,
    /// Set only for a king or rook that starts on its home square and has
    /// not moved since.
    pub can_castle: bool,
    /// Square the piece started the game on.
    pub initial_square: Square,
}

impl PieceRecord {
    pub fn new(id: PieceId, square: Square) -> Self {
        let can_castle = castling_home(id) == Some(square);
        Self {
            id,
            square,
            can_castle,
            initial_square: square,
        }
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.id.kind
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.id.color
    }

    /// Color-swapped record on the row-mirrored square.
    pub fn mirrored(&self) -> Self {
        Self {
            id: self.id.mirrored(),
            square: mirror_square(self.square),
            can_castle: self.can_castle,
            initial_square: mirror_square(self.initial_square),
        }
    }
}
