//! King-safety queries.
//!
//! `is_king_attacked` asks whether any opposing piece can reach the king's
//! square when king safety is *not* enforced for the attacker (otherwise the
//! question would recurse). `my_king_checked` answers "would this move leave
//! my own king attacked" by playing the move on the position, asking, and
//! putting everything back through a drop guard so the position is restored
//! on every exit path.

use std::ops::{Deref, DerefMut};

use tracing::error;

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::{Color, PieceId, PieceKind, Square};
use crate::game_state::position::{PieceHandle, Position};
use crate::move_generation::legal_move_generator::{legal_targets, reachable_squares};
use crate::moves::move_rays::{candidate_rays, PAWN_ATTACK_GROUP};

/// True when `color`'s king is attacked, or when `color` has no king at all.
pub fn is_king_attacked(position: &Position, color: Color) -> bool {
    let Some(king) = position.by_identity(PieceId::king(color)) else {
        return true;
    };
    is_square_attacked(position, king.square, color.opposite())
}

/// True when a piece of `attacker` could move to (or capture on) `square`.
pub fn is_square_attacked(position: &Position, square: Square, attacker: Color) -> bool {
    position
        .active_pieces()
        .filter(|(_, record)| record.color() == attacker)
        .any(|(handle, _)| attacks_square(position, handle, square))
}

/// Whether `handle`'s unblocked moves (king safety ignored) include `square`.
pub fn attacks_square(position: &Position, handle: PieceHandle, square: Square) -> bool {
    let Some(record) = position.record(handle) else {
        return false;
    };
    let mut groups = candidate_rays(record.kind(), record.color(), record.square);
    if record.kind() == PieceKind::Pawn {
        // Forward pushes never land on an occupied square, so they cannot hit.
        groups.truncate(PAWN_ATTACK_GROUP + 1);
    }
    if !groups.iter().any(|ray| ray.contains(&square)) {
        return false;
    }
    reachable_squares(position, handle, &groups)
        .map(|targets| targets.contains(&square))
        .unwrap_or(false)
}

/// A move played on a position only to be inspected; undone on drop.
///
/// A king standing on the target square is never lifted. The mover then only
/// vacates its origin and the target keeps its king.
pub struct HypotheticalMove<'a> {
    position: &'a mut Position,
    handle: PieceHandle,
    origin: Square,
    captured: Option<PieceHandle>,
    lifted: bool,
    armed: bool,
}

impl<'a> HypotheticalMove<'a> {
    /// Move `handle` to `square`, lifting any non-king piece standing there.
    pub fn play(
        position: &'a mut Position,
        handle: PieceHandle,
        square: Square,
    ) -> Result<Self, ChessErrors> {
        let origin = position
            .record(handle)
            .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?
            .square;

        let occupant = position.handle_at(square).filter(|occupant| *occupant != handle);
        let onto_king = occupant
            .and_then(|occupant| position.record(occupant))
            .is_some_and(|record| record.kind() == PieceKind::King);
        if onto_king {
            position.remove(handle)?;
            return Ok(Self {
                position,
                handle,
                origin,
                captured: None,
                lifted: true,
                armed: true,
            });
        }

        let captured = match occupant {
            Some(occupant) => {
                position.remove(occupant)?;
                Some(occupant)
            }
            None => None,
        };

        if let Err(err) = position.relocate(handle, square) {
            if let Some(occupant) = captured {
                position.reinstate(occupant)?;
            }
            return Err(err);
        }

        Ok(Self {
            position,
            handle,
            origin,
            captured,
            lifted: false,
            armed: true,
        })
    }

    /// Undo the move and report any failure to do so.
    pub fn restore(mut self) -> Result<(), ChessErrors> {
        self.armed = false;
        self.rollback()
    }

    fn rollback(&mut self) -> Result<(), ChessErrors> {
        if self.lifted {
            return self.position.reinstate(self.handle);
        }
        self.position.relocate(self.handle, self.origin)?;
        if let Some(occupant) = self.captured {
            self.position.reinstate(occupant)?;
        }
        Ok(())
    }
}

impl Deref for HypotheticalMove<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for HypotheticalMove<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for HypotheticalMove<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.rollback() {
            error!(%err, "failed to roll back hypothetical move");
        }
    }
}

/// Would moving `handle` to `square` leave its own king attacked?
pub fn my_king_checked(
    position: &mut Position,
    handle: PieceHandle,
    square: Square,
) -> Result<bool, ChessErrors> {
    let color = position
        .record(handle)
        .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?
        .color();

    let hypothetical = HypotheticalMove::play(position, handle, square)?;
    let checked = is_king_attacked(&hypothetical, color);
    hypothetical.restore()?;
    Ok(checked)
}

/// True when no piece of `color` has a legal destination.
pub fn has_no_legal_moves(position: &mut Position, color: Color) -> Result<bool, ChessErrors> {
    for handle in position.color_pieces(color) {
        if !legal_targets(position, handle)?.is_empty() {
            return Ok(false);
        }
    }
    Ok(true)
}
