//! The game state machine.
//!
//! `Game` owns a `Position`, the side to move and the game status, and turns
//! `(piece, square)` requests into committed moves. One move is applied as an
//! ordered list of sub-steps (capture, castling rook, mover, promotion) that
//! is kept as a `MoveGroup`; undo and the search's `unmake_move` walk the same
//! list backwards.
//!
//! The effects policy `E` decides what happens besides the board update.
//! The live game uses `Recording` (history plus event fan-out); the search
//! uses `Silent` as a scratch board.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, info};

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_rules::{standard_pieces, PROMOTION_KIND};
use crate::game_state::chess_types::{column_of, row_of, Color, PieceId, PieceKind, Square};
use crate::game_state::events::{Effects, GameEvent, Recording, Silent, Subscriber};
use crate::game_state::history::{History, MoveGroup, MoveRecord, SubStep};
use crate::game_state::piece_record::PieceRecord;
use crate::game_state::position::{PieceHandle, Position};
use crate::game_state::undo_state::UndoState;
use crate::move_generation::legal_move_checks::{has_no_legal_moves, is_king_attacked};
use crate::move_generation::legal_move_generator::legal_targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }
}

/// Read-only summary for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub turn: Color,
    pub last_move: Option<MoveRecord>,
    pub white_pieces: usize,
    pub black_pieces: usize,
    pub in_check: bool,
    pub state: GameStatus,
    pub winner: Option<Color>,
    pub elapsed: TimeDelta,
}

/// A private copy of the board handed to a search.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub position: Position,
    pub turn: Color,
}

pub struct Game<E: Effects = Recording> {
    position: Position,
    turn: Color,
    status: GameStatus,
    winner: Option<Color>,
    in_check: bool,
    last_move: Option<MoveRecord>,
    history: History,
    effects: E,
    started_at: DateTime<Utc>,
}

/// The rules-only variant used by search.
pub type SilentGame = Game<Silent>;

impl Game<Recording> {
    /// Standard starting position, white to move.
    pub fn new_standard() -> Result<Self, ChessErrors> {
        Self::with_effects(Position::from_records(standard_pieces())?, Color::Light, Recording::new())
    }

    /// Register a listener; events are delivered in subscription order.
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.effects.subscribe(subscriber);
    }
}

impl Game<Silent> {
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Result<Self, ChessErrors> {
        Self::with_effects(snapshot.position, snapshot.turn, Silent)
    }
}

impl<E: Effects> Game<E> {
    /// Wrap an arbitrary position. The status is derived from it, so a
    /// position that is already mate or stalemate starts out terminal.
    pub fn with_effects(position: Position, turn: Color, effects: E) -> Result<Self, ChessErrors> {
        let started_at = Utc::now();
        let mut game = Self {
            position,
            turn,
            status: GameStatus::Ongoing,
            winner: None,
            in_check: false,
            last_move: None,
            history: History::new(started_at),
            effects,
            started_at,
        };
        game.in_check = is_king_attacked(&game.position, turn);
        game.settle_status()?;
        Ok(game)
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// For callers that play hypothetical moves (evaluation, ordering). They
    /// must leave the position as they found it.
    #[inline]
    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[inline]
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    #[inline]
    pub fn last_move(&self) -> Option<MoveRecord> {
        self.last_move
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn elapsed(&self) -> TimeDelta {
        Utc::now() - self.started_at
    }

    pub fn piece_at_square(&self, square: Square) -> Option<&PieceRecord> {
        self.position.by_square(square)
    }

    pub fn piece_by_identity(&self, id: PieceId) -> Option<&PieceRecord> {
        self.position.by_identity(id)
    }

    /// Captured pieces of `color`, in capture order.
    pub fn graveyard(&self, color: Color) -> Vec<&PieceRecord> {
        self.position.graveyard(color)
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            turn: self.turn,
            last_move: self.last_move,
            white_pieces: self.position.count(Color::Light),
            black_pieces: self.position.count(Color::Dark),
            in_check: self.in_check,
            state: self.status,
            winner: self.winner,
            elapsed: self.elapsed(),
        }
    }

    pub fn board_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            position: self.position.clone(),
            turn: self.turn,
        }
    }

    /// Legal destinations of a piece. Empty for unknown pieces, pieces of
    /// the side not to move and finished games.
    pub fn legal_moves(&mut self, id: PieceId) -> Result<Vec<Square>, ChessErrors> {
        let Some(handle) = self.position.handle_of(id) else {
            return Ok(Vec::new());
        };
        if id.color != self.turn || self.status.is_terminal() {
            return Ok(Vec::new());
        }
        legal_targets(&mut self.position, handle)
    }

    /// Every legal move of the side to move, piece by piece.
    pub fn all_legal_moves(&mut self) -> Result<Vec<(PieceHandle, Square)>, ChessErrors> {
        let mut moves = Vec::with_capacity(48);
        for handle in self.position.color_pieces(self.turn) {
            for square in legal_targets(&mut self.position, handle)? {
                moves.push((handle, square));
            }
        }
        Ok(moves)
    }

    /// Play `id` to `square` if that is a legal move for the side to move.
    ///
    /// `Ok(false)` means the request was rejected and nothing changed.
    /// `Err` only reports a corrupted position.
    pub fn attempt_move(&mut self, id: PieceId, square: Square) -> Result<bool, ChessErrors> {
        let Some(handle) = self.position.handle_of(id) else {
            debug!(piece = %id, square, "move rejected: unknown piece");
            return Ok(false);
        };
        if !self.legal_moves(id)?.contains(&square) {
            debug!(piece = %id, square, "move rejected: illegal destination");
            return Ok(false);
        }

        let undo = self.play(handle, square, true)?;
        debug!(
            piece = %undo.group.record.piece,
            from = undo.group.record.from,
            to = undo.group.record.to,
            "move committed"
        );
        if self.effects.records_history() {
            self.history.push(undo.group);
        }
        Ok(true)
    }

    /// Apply a move without checking legality or settling mate/stalemate.
    ///
    /// Used by search on a scratch board; the caller supplies a destination
    /// from `legal_targets` and detects terminal nodes itself.
    pub fn make_move(&mut self, handle: PieceHandle, square: Square) -> Result<UndoState, ChessErrors> {
        self.play(handle, square, false)
    }

    /// Reverse a `make_move`, restoring status fields exactly.
    pub fn unmake_move(&mut self, undo: UndoState) -> Result<(), ChessErrors> {
        self.revert_steps(&undo.group.steps, true)?;
        self.in_check = undo.prev_in_check;
        self.status = undo.prev_status;
        self.winner = undo.prev_winner;
        self.last_move = undo.prev_last_move;
        Ok(())
    }

    /// Take back the last committed move. `Ok(false)` when there is none.
    pub fn undo(&mut self) -> Result<bool, ChessErrors> {
        let Some(group) = self.history.pop() else {
            return Ok(false);
        };
        self.revert_steps(&group.steps, true)?;

        self.status = GameStatus::Ongoing;
        self.winner = None;
        self.in_check = is_king_attacked(&self.position, self.turn);
        self.last_move = self.history.last().map(|entry| entry.group.record);
        debug!(piece = %group.record.piece, from = group.record.from, to = group.record.to, "move undone");
        Ok(true)
    }

    /// Back to the standard opening with an empty history.
    pub fn full_reset(&mut self) -> Result<(), ChessErrors> {
        self.position = Position::from_records(standard_pieces())?;
        self.turn = Color::Light;
        self.status = GameStatus::Ongoing;
        self.winner = None;
        self.in_check = false;
        self.last_move = None;
        self.history.clear();
        self.started_at = self.history.started_at();
        self.effects.emit(|| GameEvent::GameReset);
        debug!("game reset");
        Ok(())
    }

    fn play(&mut self, handle: PieceHandle, to: Square, settle: bool) -> Result<UndoState, ChessErrors> {
        let mover = *self
            .position
            .record(handle)
            .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?;
        let from = mover.square;
        let captured = self.position.handle_at(to).filter(|occupant| *occupant != handle);

        let record = MoveRecord {
            piece: mover.id,
            from,
            to,
            captured: captured.and_then(|h| self.position.record(h)).map(|r| r.id),
            is_castling: mover.kind() == PieceKind::King
                && mover.can_castle
                && captured.is_none()
                && column_of(from).abs_diff(column_of(to)) == 2,
            is_promotion: mover.kind() == PieceKind::Pawn && row_of(to) == mover.color().promotion_row(),
        };

        let mut steps = Vec::with_capacity(3);
        if let Err(err) = self.apply_steps(&mover, record, captured, &mut steps) {
            if let Err(rollback) = self.revert_steps(&steps, false) {
                error!(%rollback, "failed to roll back a partially applied move");
            }
            return Err(err);
        }

        let undo = UndoState {
            group: MoveGroup { record, steps },
            prev_in_check: self.in_check,
            prev_status: self.status,
            prev_winner: self.winner,
            prev_last_move: self.last_move,
        };

        self.turn = self.turn.opposite();
        let turn = self.turn;
        self.effects.emit(|| GameEvent::TurnChanged { turn });
        self.last_move = Some(record);
        self.in_check = is_king_attacked(&self.position, turn);

        if settle {
            if self.in_check {
                info!(color = %turn, "check");
                self.effects.emit(|| GameEvent::CheckAsserted { color: turn });
            }
            self.settle_status()?;
        }
        Ok(undo)
    }

    fn apply_steps(
        &mut self,
        mover: &PieceRecord,
        record: MoveRecord,
        captured: Option<PieceHandle>,
        steps: &mut Vec<SubStep>,
    ) -> Result<(), ChessErrors> {
        let handle = self
            .position
            .handle_of(mover.id)
            .ok_or(ChessErrors::PieceNotActive(mover.id))?;

        if let Some(victim) = captured {
            let removed = self.position.remove(victim)?;
            steps.push(SubStep::Removal {
                handle: victim,
                square: record.to,
            });
            self.effects.emit(|| GameEvent::PieceCaptured { piece: removed });
        }

        if record.is_castling {
            self.castle_rook(mover.color(), record.from, record.to, steps)?;
        }

        self.position.relocate(handle, record.to)?;
        let revoked_castling = mover.can_castle;
        steps.push(SubStep::Relocation {
            handle,
            from: record.from,
            to: record.to,
            castling_rook: false,
            revoked_castling,
        });
        if revoked_castling {
            self.position.set_can_castle(handle, false)?;
        }
        self.effects.emit(|| GameEvent::PieceMoved {
            piece: mover.id,
            from: record.from,
            to: record.to,
            castling: record.is_castling,
        });

        if record.is_promotion {
            self.position.promote(handle, PROMOTION_KIND)?;
            steps.push(SubStep::Promotion {
                handle,
                from_kind: mover.kind(),
                to_kind: PROMOTION_KIND,
            });
            if let Some(promoted) = self.position.record(handle).copied() {
                self.effects.emit(|| GameEvent::PawnPromoted { piece: promoted });
            }
        }
        Ok(())
    }

    fn castle_rook(
        &mut self,
        color: Color,
        king_from: Square,
        king_to: Square,
        steps: &mut Vec<SubStep>,
    ) -> Result<(), ChessErrors> {
        let (rook_id, rook_to) = if king_to > king_from {
            (PieceId::king_side_rook(color), king_to - 1)
        } else {
            (PieceId::queen_side_rook(color), king_to + 1)
        };
        let rook = self
            .position
            .handle_of(rook_id)
            .ok_or(ChessErrors::PieceNotActive(rook_id))?;
        let revoked_castling = self.position.record(rook).is_some_and(|r| r.can_castle);

        let rook_from = self.position.relocate(rook, rook_to)?;
        steps.push(SubStep::Relocation {
            handle: rook,
            from: rook_from,
            to: rook_to,
            castling_rook: true,
            revoked_castling,
        });
        self.position.set_can_castle(rook, false)?;
        self.effects.emit(|| GameEvent::CastlingPerformed {
            rook: rook_id,
            from: rook_from,
            to: rook_to,
        });
        Ok(())
    }

    /// Replay `steps` backwards. With `flip_turns`, every relocation that is
    /// not the rook half of a castle hands the turn back once.
    fn revert_steps(&mut self, steps: &[SubStep], flip_turns: bool) -> Result<(), ChessErrors> {
        for step in steps.iter().rev() {
            match *step {
                SubStep::Relocation {
                    handle,
                    from,
                    to,
                    castling_rook,
                    revoked_castling,
                } => {
                    self.position.relocate(handle, from)?;
                    if revoked_castling {
                        self.position.set_can_castle(handle, true)?;
                    }
                    if let Some(piece) = self.position.record(handle).map(|r| r.id) {
                        self.effects.emit(|| GameEvent::PieceMoved {
                            piece,
                            from: to,
                            to: from,
                            castling: castling_rook,
                        });
                    }
                    if flip_turns && !castling_rook {
                        self.turn = self.turn.opposite();
                        let turn = self.turn;
                        self.effects.emit(|| GameEvent::TurnChanged { turn });
                    }
                }
                SubStep::Removal { handle, .. } => {
                    self.position.reinstate(handle)?;
                    if let Some(piece) = self.position.record(handle).copied() {
                        self.effects.emit(|| GameEvent::PieceRestored { piece });
                    }
                }
                SubStep::Promotion { handle, from_kind, .. } => {
                    self.position.promote(handle, from_kind)?;
                    if let Some(piece) = self.position.record(handle).copied() {
                        self.effects.emit(|| GameEvent::PromotionReverted { piece });
                    }
                }
            }
        }
        Ok(())
    }

    /// Declare mate or stalemate when the side to move is stuck.
    fn settle_status(&mut self) -> Result<(), ChessErrors> {
        if self.status.is_terminal() || !has_no_legal_moves(&mut self.position, self.turn)? {
            return Ok(());
        }
        let duration = self.elapsed();
        if self.in_check {
            let winner = self.turn.opposite();
            self.status = GameStatus::Checkmate;
            self.winner = Some(winner);
            info!(%winner, "checkmate");
            self.effects.emit(|| GameEvent::CheckmateDeclared { winner, duration });
        } else {
            self.status = GameStatus::Stalemate;
            info!(color = %self.turn, "stalemate");
            self.effects.emit(|| GameEvent::StalemateDeclared { duration });
        }
        Ok(())
    }
}
