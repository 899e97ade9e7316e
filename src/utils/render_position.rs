//! Terminal-oriented Unicode board renderer.
//!
//! Creates a human-readable board view from a `Position` for debugging,
//! tests, and the self-play tool.

use crate::game_state::chess_types::square_at;
use crate::game_state::piece_record::PieceRecord;
use crate::game_state::position::Position;

const FILES: &str = "  a b c d e f g h";

/// Glyphs indexed by `Color::index`, then `PieceKind::index`.
const GLYPHS: [[char; 6]; 2] = [
    ['♙', '♘', '♗', '♖', '♕', '♔'],
    ['♟', '♞', '♝', '♜', '♛', '♚'],
];

#[inline]
fn glyph(piece: &PieceRecord) -> char {
    GLYPHS[piece.color().index()][piece.kind().index()]
}

/// Render the board with white at the bottom, empty squares as `·`.
pub fn render_position(position: &Position) -> String {
    let mut lines = Vec::with_capacity(10);
    lines.push(FILES.to_owned());
    for row in (1..=8u8).rev() {
        let cells: Vec<String> = (1..=8u8)
            .map(|column| {
                position
                    .by_square(square_at(row, column))
                    .map_or('·', glyph)
                    .to_string()
            })
            .collect();
        lines.push(format!("{row} {} {row}", cells.join(" ")));
    }
    lines.push(FILES.to_owned());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::standard_pieces;

    #[test]
    fn renders_the_opening() {
        let position = Position::from_records(standard_pieces()).expect("layout should load");
        let rendered = render_position(&position);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ 8");
        assert_eq!(lines[5], "4 · · · · · · · · 4");
        assert_eq!(lines[8], "1 ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖ 1");
    }
}
