//! Primitive chess types shared by every layer of the engine.
//!
//! Squares use a 10x10 mailbox style encoding, `row * 10 + column`, with
//! rows and columns in `1..=8`. File steps are `±1`, rank steps `±10` and
//! diagonal steps `±9`/`±11`; any value with column 0 or 9, or a row outside
//! `1..=8`, is an off-board sentinel.

use std::fmt;

/// Board square, encoded as `row * 10 + column`.
pub type Square = u8;

pub const FILE_STEP: i16 = 1;
pub const RANK_STEP: i16 = 10;

/// Build a square from a one-based row and column.
#[inline]
pub const fn square_at(row: u8, column: u8) -> Square {
    row * 10 + column
}

#[inline]
pub const fn row_of(square: Square) -> u8 {
    square / 10
}

#[inline]
pub const fn column_of(square: Square) -> u8 {
    square % 10
}

/// True for the 64 playable squares, false for every sentinel value.
#[inline]
pub const fn is_on_board(square: Square) -> bool {
    let row = row_of(square);
    let column = column_of(square);
    row >= 1 && row <= 8 && column >= 1 && column <= 8
}

/// Offset a square, returning `None` when the result leaves the board.
#[inline]
pub fn offset_square(square: Square, delta: i16) -> Option<Square> {
    let target = i16::from(square) + delta;
    if !(0..=99).contains(&target) {
        return None;
    }
    let target = target as Square;
    is_on_board(target).then_some(target)
}

/// Reflect a square across the board's horizontal midline (row 1 <-> row 8).
#[inline]
pub const fn mirror_square(square: Square) -> Square {
    square_at(9 - row_of(square), column_of(square))
}

/// Side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::Light => 0,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Row direction pawns of this color advance in.
    #[inline]
    pub const fn forward(self) -> i16 {
        match self {
            Color::Light => RANK_STEP,
            Color::Dark => -RANK_STEP,
        }
    }

    /// Row on which this color's pieces start (rooks, king, ...).
    #[inline]
    pub const fn home_row(self) -> u8 {
        match self {
            Color::Light => 1,
            Color::Dark => 8,
        }
    }

    /// Row a pawn of this color starts on and may double-step from.
    #[inline]
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::Light => 2,
            Color::Dark => 7,
        }
    }

    /// Farthest row, where pawns of this color promote.
    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::Light => 8,
            Color::Dark => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Light => write!(f, "white"),
            Color::Dark => write!(f, "black"),
        }
    }
}

/// Piece rank (called kind here so it is not confused with board rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        }
    }
}

/// Stable identity of a piece.
///
/// Displayed the way the piece set names its members: `whitePawn5`,
/// `blackRook2`, `whiteKing`. Ordinal 0 is used for pieces that exist once
/// per side and prints no digit. Rook ordinal 1 is the a-file rook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId {
    pub color: Color,
    pub kind: PieceKind,
    pub ordinal: u8,
}

impl PieceId {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind, ordinal: u8) -> Self {
        Self {
            color,
            kind,
            ordinal,
        }
    }

    #[inline]
    pub const fn king(color: Color) -> Self {
        Self::new(color, PieceKind::King, 0)
    }

    /// Identity of the a-file (queen-side) rook.
    #[inline]
    pub const fn queen_side_rook(color: Color) -> Self {
        Self::new(color, PieceKind::Rook, 1)
    }

    /// Identity of the h-file (king-side) rook.
    #[inline]
    pub const fn king_side_rook(color: Color) -> Self {
        Self::new(color, PieceKind::Rook, 2)
    }

    /// The same identity with a different kind; used by promotion.
    #[inline]
    pub const fn with_kind(self, kind: PieceKind) -> Self {
        Self::new(self.color, kind, self.ordinal)
    }

    #[inline]
    pub const fn mirrored(self) -> Self {
        Self::new(self.color.opposite(), self.kind, self.ordinal)
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color, self.kind.name())?;
        if self.ordinal != 0 {
            write!(f, "{}", self.ordinal)?;
        }
        Ok(())
    }
}
