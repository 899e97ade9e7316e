//! Errors used throughout the chess engine.
//!
//! `ChessErrors` is the single error type of the crate. Invalid user input
//! (an unknown piece, an illegal destination, undo on an empty history) is
//! *not* reported through this type: those calls simply answer `false` or an
//! empty list. The variants below describe either a corrupted `Position`
//! (a bug in a mutation primitive, never recoverable) or an engine that could
//! not produce a move.

use thiserror::Error;

use crate::game_state::chess_types::{PieceId, Square};

/// Unified error type for the chess engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessErrors {
    /// A mutation tried to put a piece on a square that already holds one.
    ///
    /// Payload: the contested square.
    #[error("square {0} is already occupied")]
    SquareOccupied(Square),

    /// A mutation targeted a sentinel square outside the 8x8 board.
    #[error("square {0} is off the board")]
    SquareOffBoard(Square),

    /// The handle does not name a record in this position's arena.
    #[error("unknown piece handle {0}")]
    UnknownPieceHandle(usize),

    /// The piece exists but has been captured (it is in the graveyard).
    #[error("piece {0} is not active on the board")]
    PieceNotActive(PieceId),

    /// The piece is already active; placing or reinstating it again would
    /// duplicate it in the indices.
    #[error("piece {0} is already active on the board")]
    PieceAlreadyActive(PieceId),

    /// Two active pieces would share one identity.
    #[error("identity {0} is already in use")]
    DuplicateIdentity(PieceId),

    /// The by-square or by-identity index disagrees with the active set.
    ///
    /// Payload: a diagnostic description of the first divergence found.
    #[error("position index corrupted: {0}")]
    IndexCorrupted(String),

    /// The side to move has no legal reply, so no move can be chosen.
    #[error("no legal moves are available for the side to move")]
    NoLegalMoves,

    /// The time budget expired before a single search iteration completed.
    #[error("search budget expired before any move was selected")]
    SearchProducedNoMove,

    /// The search worker thread went away without sending its result.
    #[error("search task ended without reporting a result")]
    SearchTaskDisconnected,

    /// An engine answered with a move the game rejected.
    #[error("engine chose an illegal move: {piece} to {square}")]
    IllegalEngineMove { piece: PieceId, square: Square },

    /// A coordinate string such as `"e4"` could not be parsed.
    #[error("invalid algebraic square: {0}")]
    InvalidAlgebraic(String),
}
