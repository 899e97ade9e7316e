//! Piece collection with constant-time lookup by square and by identity.
//!
//! Every record ever placed lives in an arena and keeps its slot for the
//! whole game, so captured pieces can be reinstated by undo and listed in the
//! graveyard. Two indices cover the active subset: a 100-slot mailbox array
//! keyed by square and a hash map keyed by `PieceId`. Each primitive
//! validates its preconditions before touching anything, so on error both
//! indices are exactly as they were.

use std::collections::HashMap;

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::{is_on_board, Color, PieceId, PieceKind, Square};
use crate::game_state::piece_record::PieceRecord;

const MAILBOX_SIZE: usize = 100;

/// Arena slot of a piece; valid for the lifetime of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceHandle(usize);

impl PieceHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Position {
    records: Vec<PieceRecord>,
    active: Vec<bool>,
    by_square: [Option<PieceHandle>; MAILBOX_SIZE],
    by_identity: HashMap<PieceId, PieceHandle>,
    graveyard: Vec<PieceHandle>,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            records: Vec::with_capacity(32),
            active: Vec::with_capacity(32),
            by_square: [None; MAILBOX_SIZE],
            by_identity: HashMap::with_capacity(32),
            graveyard: Vec::new(),
        }
    }
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a position from a list of records, rejecting overlaps.
    pub fn from_records<I>(records: I) -> Result<Self, ChessErrors>
    where
        I: IntoIterator<Item = PieceRecord>,
    {
        let mut position = Self::new();
        for record in records {
            position.place(record)?;
        }
        Ok(position)
    }

    /// Add a new piece to the board.
    pub fn place(&mut self, record: PieceRecord) -> Result<PieceHandle, ChessErrors> {
        self.ensure_free_square(record.square)?;
        if self.by_identity.contains_key(&record.id) {
            return Err(ChessErrors::DuplicateIdentity(record.id));
        }

        let handle = PieceHandle(self.records.len());
        self.records.push(record);
        self.active.push(true);
        self.by_square[usize::from(record.square)] = Some(handle);
        self.by_identity.insert(record.id, handle);
        Ok(handle)
    }

    /// Take an active piece off the board; the record moves to the graveyard.
    pub fn remove(&mut self, handle: PieceHandle) -> Result<PieceRecord, ChessErrors> {
        let record = *self.active_record(handle)?;
        self.by_square[usize::from(record.square)] = None;
        self.by_identity.remove(&record.id);
        self.active[handle.0] = false;
        self.graveyard.push(handle);
        Ok(record)
    }

    /// Put a captured piece back on the square it was captured on.
    pub fn reinstate(&mut self, handle: PieceHandle) -> Result<(), ChessErrors> {
        let record = *self.record_checked(handle)?;
        if self.active[handle.0] {
            return Err(ChessErrors::PieceAlreadyActive(record.id));
        }
        self.ensure_free_square(record.square)?;
        if self.by_identity.contains_key(&record.id) {
            return Err(ChessErrors::DuplicateIdentity(record.id));
        }

        if let Some(slot) = self.graveyard.iter().rposition(|h| *h == handle) {
            self.graveyard.remove(slot);
        }
        self.active[handle.0] = true;
        self.by_square[usize::from(record.square)] = Some(handle);
        self.by_identity.insert(record.id, handle);
        Ok(())
    }

    /// Move an active piece to an empty square, returning its previous square.
    pub fn relocate(&mut self, handle: PieceHandle, square: Square) -> Result<Square, ChessErrors> {
        let from = self.active_record(handle)?.square;
        if from == square {
            return Ok(from);
        }
        self.ensure_free_square(square)?;

        self.by_square[usize::from(from)] = None;
        self.by_square[usize::from(square)] = Some(handle);
        self.records[handle.0].square = square;
        Ok(from)
    }

    /// Change an active piece's kind (and so its identity), returning the old
    /// identity.
    pub fn promote(&mut self, handle: PieceHandle, kind: PieceKind) -> Result<PieceId, ChessErrors> {
        let old_id = self.active_record(handle)?.id;
        let new_id = old_id.with_kind(kind);
        if new_id == old_id {
            return Ok(old_id);
        }
        if self.by_identity.contains_key(&new_id) {
            return Err(ChessErrors::DuplicateIdentity(new_id));
        }

        self.by_identity.remove(&old_id);
        self.by_identity.insert(new_id, handle);
        self.records[handle.0].id = new_id;
        Ok(old_id)
    }

    pub fn set_can_castle(&mut self, handle: PieceHandle, can_castle: bool) -> Result<(), ChessErrors> {
        self.record_checked(handle)?;
        self.records[handle.0].can_castle = can_castle;
        Ok(())
    }

    /// Record behind a handle, active or captured.
    #[inline]
    pub fn record(&self, handle: PieceHandle) -> Option<&PieceRecord> {
        self.records.get(handle.0)
    }

    #[inline]
    pub fn is_active(&self, handle: PieceHandle) -> bool {
        self.active.get(handle.0).copied().unwrap_or(false)
    }

    #[inline]
    pub fn handle_of(&self, id: PieceId) -> Option<PieceHandle> {
        self.by_identity.get(&id).copied()
    }

    #[inline]
    pub fn handle_at(&self, square: Square) -> Option<PieceHandle> {
        self.by_square.get(usize::from(square)).copied().flatten()
    }

    #[inline]
    pub fn by_identity(&self, id: PieceId) -> Option<&PieceRecord> {
        self.handle_of(id).map(|h| &self.records[h.0])
    }

    #[inline]
    pub fn by_square(&self, square: Square) -> Option<&PieceRecord> {
        self.handle_at(square).map(|h| &self.records[h.0])
    }

    #[inline]
    pub fn is_empty_square(&self, square: Square) -> bool {
        self.handle_at(square).is_none()
    }

    /// Color of the piece on `square`, if any.
    #[inline]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.by_square(square).map(PieceRecord::color)
    }

    /// Handles of the active pieces of one color, in arena order.
    pub fn color_pieces(&self, color: Color) -> Vec<PieceHandle> {
        self.active_pieces()
            .filter(|(_, record)| record.color() == color)
            .map(|(handle, _)| handle)
            .collect()
    }

    pub fn active_pieces(&self) -> impl Iterator<Item = (PieceHandle, &PieceRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(|(index, _)| self.active[*index])
            .map(|(index, record)| (PieceHandle(index), record))
    }

    /// Copy of the active piece list.
    pub fn pieces(&self) -> Vec<PieceRecord> {
        self.active_pieces().map(|(_, record)| *record).collect()
    }

    pub fn count(&self, color: Color) -> usize {
        self.active_pieces()
            .filter(|(_, record)| record.color() == color)
            .count()
    }

    /// Captured pieces of one color, oldest capture first.
    pub fn graveyard(&self, color: Color) -> Vec<&PieceRecord> {
        self.graveyard
            .iter()
            .map(|h| &self.records[h.0])
            .filter(|record| record.color() == color)
            .collect()
    }

    /// Verify that both indices describe exactly the active set.
    pub fn check_invariants(&self) -> Result<(), ChessErrors> {
        let mut seen_squares = 0usize;
        for (square, slot) in self.by_square.iter().enumerate() {
            let Some(handle) = slot else { continue };
            seen_squares += 1;
            if !self.is_active(*handle) {
                return Err(ChessErrors::IndexCorrupted(format!(
                    "square {square} indexes a captured piece"
                )));
            }
            if usize::from(self.records[handle.0].square) != square {
                return Err(ChessErrors::IndexCorrupted(format!(
                    "square {square} indexes {} which stands on {}",
                    self.records[handle.0].id, self.records[handle.0].square
                )));
            }
        }

        for (id, handle) in &self.by_identity {
            if !self.is_active(*handle) || self.records[handle.0].id != *id {
                return Err(ChessErrors::IndexCorrupted(format!(
                    "identity {id} indexes the wrong record"
                )));
            }
        }

        let active = self.active.iter().filter(|a| **a).count();
        if active != seen_squares || active != self.by_identity.len() {
            return Err(ChessErrors::IndexCorrupted(format!(
                "{active} active pieces, {seen_squares} squares indexed, {} identities indexed",
                self.by_identity.len()
            )));
        }
        Ok(())
    }

    /// Colour-swapped copy reflected across the horizontal midline.
    pub fn mirrored(&self) -> Result<Self, ChessErrors> {
        Self::from_records(self.active_pieces().map(|(_, record)| record.mirrored()))
    }

    fn record_checked(&self, handle: PieceHandle) -> Result<&PieceRecord, ChessErrors> {
        self.records
            .get(handle.0)
            .ok_or(ChessErrors::UnknownPieceHandle(handle.0))
    }

    fn active_record(&self, handle: PieceHandle) -> Result<&PieceRecord, ChessErrors> {
        let record = self.record_checked(handle)?;
        if !self.active[handle.0] {
            return Err(ChessErrors::PieceNotActive(record.id));
        }
        Ok(record)
    }

    fn ensure_free_square(&self, square: Square) -> Result<(), ChessErrors> {
        if !is_on_board(square) {
            return Err(ChessErrors::SquareOffBoard(square));
        }
        if self.handle_at(square).is_some() {
            return Err(ChessErrors::SquareOccupied(square));
        }
        Ok(())
    }
}
