//! Canonical chess-rule constants and the standard starting layout.

use crate::game_state::chess_types::{square_at, Color, PieceId, PieceKind, Square};
use crate::game_state::piece_record::PieceRecord;

/// Back-rank order from the a-file to the h-file, with per-kind ordinals.
const BACK_RANK: [(PieceKind, u8); 8] = [
    (PieceKind::Rook, 1),
    (PieceKind::Knight, 1),
    (PieceKind::Bishop, 1),
    (PieceKind::Queen, 0),
    (PieceKind::King, 0),
    (PieceKind::Bishop, 2),
    (PieceKind::Knight, 2),
    (PieceKind::Rook, 2),
];

/// Column the king starts on.
pub const KING_START_COLUMN: u8 = 5;

/// Square a king or rook must stand on to hold castling rights: the king's
/// start square, or the home corner of rook 1 (a-file) and rook 2 (h-file).
pub fn castling_home(id: PieceId) -> Option<Square> {
    let column = match (id.kind, id.ordinal) {
        (PieceKind::King, _) => KING_START_COLUMN,
        (PieceKind::Rook, 1) => 1,
        (PieceKind::Rook, 2) => 8,
        _ => return None,
    };
    Some(square_at(id.color.home_row(), column))
}

/// Promotion always produces the highest-value piece.
pub const PROMOTION_KIND: PieceKind = PieceKind::Queen;

/// The 32 pieces of the standard starting position, white first.
pub fn standard_pieces() -> Vec<PieceRecord> {
    let mut pieces = Vec::with_capacity(32);
    for color in [Color::Light, Color::Dark] {
        for (column, (kind, ordinal)) in (1u8..).zip(BACK_RANK) {
            pieces.push(PieceRecord::new(
                PieceId::new(color, kind, ordinal),
                square_at(color.home_row(), column),
            ));
        }
        for column in 1u8..=8 {
            pieces.push(PieceRecord::new(
                PieceId::new(color, PieceKind::Pawn, column),
                square_at(color.pawn_row(), column),
            ));
        }
    }
    pieces
}
