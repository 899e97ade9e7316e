//! Game events and the effects policy injected into the state machine.
//!
//! The same `Game` type serves both the live game and the search engine's
//! scratch board. What differs is the `Effects` value it is built with:
//! `Recording` keeps a move history and fans events out to subscribers,
//! `Silent` does neither.

use chrono::TimeDelta;

use crate::game_state::chess_types::{Color, PieceId, Square};
use crate::game_state::piece_record::PieceRecord;

/// Facts emitted by the state machine, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A piece changed square (also emitted for rook steps and undo).
    PieceMoved {
        piece: PieceId,
        from: Square,
        to: Square,
        castling: bool,
    },
    PieceCaptured { piece: PieceRecord },
    /// Undo put a captured piece back.
    PieceRestored { piece: PieceRecord },
    CheckAsserted { color: Color },
    PawnPromoted { piece: PieceRecord },
    /// Undo turned a promoted queen back into a pawn.
    PromotionReverted { piece: PieceRecord },
    CheckmateDeclared { winner: Color, duration: TimeDelta },
    StalemateDeclared { duration: TimeDelta },
    TurnChanged { turn: Color },
    CastlingPerformed {
        rook: PieceId,
        from: Square,
        to: Square,
    },
    GameReset,
}

pub type Subscriber = Box<dyn FnMut(&GameEvent) + Send>;

/// Side-effect policy of a `Game`.
pub trait Effects {
    /// Whether committed moves are pushed onto the game's history.
    fn records_history(&self) -> bool;

    /// Deliver an event. The closure is only evaluated when someone listens.
    fn emit<F>(&mut self, event: F)
    where
        F: FnOnce() -> GameEvent;
}

/// History plus synchronous fan-out to every subscriber, in subscription
/// order.
#[derive(Default)]
pub struct Recording {
    subscribers: Vec<Subscriber>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Effects for Recording {
    #[inline]
    fn records_history(&self) -> bool {
        true
    }

    fn emit<F>(&mut self, event: F)
    where
        F: FnOnce() -> GameEvent,
    {
        if self.subscribers.is_empty() {
            return;
        }
        let event = event();
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

/// No events, no history; the scratch board used by search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Effects for Silent {
    #[inline]
    fn records_history(&self) -> bool {
        false
    }

    #[inline]
    fn emit<F>(&mut self, _event: F)
    where
        F: FnOnce() -> GameEvent,
    {
    }
}
