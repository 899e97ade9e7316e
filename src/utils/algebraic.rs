//! Coordinate names for mailbox squares.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and the
//! `row * 10 + column` square encoding. Moves inside the core are always
//! addressed by piece identity; these helpers exist for tests, logs and the
//! self-play tool.

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::{column_of, is_on_board, row_of, square_at, Square};

/// Convert a coordinate such as `"e4"` to a square.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, ChessErrors> {
    let &[file, rank] = square.as_bytes() else {
        return Err(ChessErrors::InvalidAlgebraic(square.to_owned()));
    };
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessErrors::InvalidAlgebraic(square.to_owned()));
    }
    Ok(square_at(rank - b'0', file - b'a' + 1))
}

/// Convert a square to its coordinate, e.g. `45` to `"e4"`.
#[inline]
pub fn square_to_algebraic(square: Square) -> Result<String, ChessErrors> {
    if !is_on_board(square) {
        return Err(ChessErrors::SquareOffBoard(square));
    }
    let file_char = char::from(b'a' + column_of(square) - 1);
    let rank_char = char::from(b'0' + row_of(square));
    Ok(format!("{file_char}{rank_char}"))
}
