//! Move log made of reversible sub-steps.
//!
//! One user-visible move becomes a `MoveGroup`: the facts about the move
//! (`MoveRecord`) plus the ordered atomic board mutations that produced it.
//! Undo replays the sub-steps of the last group in reverse.

use chrono::{DateTime, TimeDelta, Utc};

use crate::game_state::chess_types::{PieceId, PieceKind, Square};
use crate::game_state::position::PieceHandle;

/// One atomic board mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubStep {
    /// A piece changed square. `castling_rook` marks the rook half of a
    /// castle; `revoked_castling` records that the move cleared the piece's
    /// castling eligibility.
    Relocation {
        handle: PieceHandle,
        from: Square,
        to: Square,
        castling_rook: bool,
        revoked_castling: bool,
    },
    /// A piece was captured on `square`.
    Removal { handle: PieceHandle, square: Square },
    /// A piece changed kind in place.
    Promotion {
        handle: PieceHandle,
        from_kind: PieceKind,
        to_kind: PieceKind,
    },
}

/// Facts about one committed move, computed before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
    pub captured: Option<PieceId>,
    pub is_castling: bool,
    pub is_promotion: bool,
}

/// The sub-steps of a single move, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveGroup {
    pub record: MoveRecord,
    pub steps: Vec<SubStep>,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// One-based move number.
    pub number: usize,
    pub group: MoveGroup,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    started_at: DateTime<Utc>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl History {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            entries: Vec::with_capacity(128),
            started_at,
        }
    }

    pub fn push(&mut self, group: MoveGroup) {
        let number = self.entries.len() + 1;
        self.entries.push(HistoryEntry {
            number,
            group,
            committed_at: Utc::now(),
        });
    }

    pub fn pop(&mut self) -> Option<MoveGroup> {
        self.entries.pop().map(|entry| entry.group)
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time spent on move `index` (zero-based), measured from the previous
    /// commit or from the start of the game.
    pub fn move_duration(&self, index: usize) -> TimeDelta {
        let Some(entry) = self.entries.get(index) else {
            return TimeDelta::zero();
        };
        let previous = match index {
            0 => self.started_at,
            _ => self.entries[index - 1].committed_at,
        };
        entry.committed_at - previous
    }

    /// Mean gap between consecutive commits; zero with fewer than two moves.
    pub fn average_move_time(&self) -> TimeDelta {
        let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) else {
            return TimeDelta::zero();
        };
        if self.entries.len() < 2 {
            return TimeDelta::zero();
        }
        (last.committed_at - first.committed_at) / (self.entries.len() as i32 - 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.started_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Color;

    fn group(to: Square) -> MoveGroup {
        MoveGroup {
            record: MoveRecord {
                piece: PieceId::new(Color::Light, PieceKind::Pawn, 5),
                from: 25,
                to,
                captured: None,
                is_castling: false,
                is_promotion: false,
            },
            steps: Vec::new(),
        }
    }

    #[test]
    fn push_pop_is_last_in_first_out() {
        let mut history = History::default();
        history.push(group(35));
        history.push(group(45));

        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(|e| e.number), Some(2));
        assert_eq!(history.pop().map(|g| g.record.to), Some(45));
        assert_eq!(history.pop().map(|g| g.record.to), Some(35));
        assert!(history.pop().is_none());
    }

    #[test]
    fn durations_are_never_negative() {
        let mut history = History::default();
        history.push(group(35));
        history.push(group(45));

        assert!(history.move_duration(0) >= TimeDelta::zero());
        assert!(history.move_duration(1) >= TimeDelta::zero());
        assert_eq!(history.move_duration(7), TimeDelta::zero());
        assert!(history.average_move_time() >= TimeDelta::zero());
    }
}
