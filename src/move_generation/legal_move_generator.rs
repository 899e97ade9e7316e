//! Legal destination generation.
//!
//! Candidate rays from `moves::move_rays` are walked against the current
//! occupancy: a ray stops before a piece of the mover's own color, and stops
//! after (including) a piece of the opponent. Pawns use their two groups
//! differently: diagonals only capture, forward squares only move into empty
//! space. With king safety enforced, a reachable square is then kept only if
//! the move would not leave the mover's king attacked. Skipping an unsafe
//! square never lets a ray continue past an occupied one.

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_rules::castling_home;
use crate::game_state::chess_types::{is_on_board, PieceId, PieceKind, Square};
use crate::game_state::position::{PieceHandle, Position};
use crate::move_generation::legal_move_checks::{is_king_attacked, my_king_checked};
use crate::moves::move_rays::{
    candidate_rays, RayGroups, KING_SIDE_GROUP, PAWN_ATTACK_GROUP, PAWN_FORWARD_GROUP,
    QUEEN_SIDE_GROUP,
};

/// Squares reachable along `groups` given occupancy, ignoring king safety.
pub fn reachable_squares(
    position: &Position,
    handle: PieceHandle,
    groups: &RayGroups,
) -> Result<Vec<Square>, ChessErrors> {
    let record = position
        .record(handle)
        .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?;
    if !position.is_active(handle) {
        return Err(ChessErrors::PieceNotActive(record.id));
    }
    let own = record.color();
    let mut targets = Vec::with_capacity(groups.iter().map(Vec::len).sum());

    if record.kind() == PieceKind::Pawn {
        if let Some(attacks) = groups.get(PAWN_ATTACK_GROUP) {
            targets.extend(
                attacks
                    .iter()
                    .copied()
                    .filter(|sq| position.color_at(*sq) == Some(own.opposite())),
            );
        }
        if let Some(advances) = groups.get(PAWN_FORWARD_GROUP) {
            // The double step sits behind the single step in the same group,
            // so stopping at the first occupied square also covers it.
            targets.extend(
                advances
                    .iter()
                    .copied()
                    .take_while(|sq| position.is_empty_square(*sq)),
            );
        }
    } else {
        for ray in groups {
            for square in ray.iter().copied() {
                match position.color_at(square) {
                    Some(color) if color == own => break,
                    Some(_) => {
                        targets.push(square);
                        break;
                    }
                    None => targets.push(square),
                }
            }
        }
    }

    targets.retain(|sq| is_on_board(*sq));
    Ok(targets)
}

/// Destinations along `groups`, optionally filtered by own-king safety.
pub fn unblocked_moves(
    position: &mut Position,
    handle: PieceHandle,
    groups: &RayGroups,
    enforce_king_safety: bool,
) -> Result<Vec<Square>, ChessErrors> {
    let targets = reachable_squares(position, handle, groups)?;
    if !enforce_king_safety {
        return Ok(targets);
    }

    let mut safe = Vec::with_capacity(targets.len());
    for square in targets {
        if !my_king_checked(position, handle, square)? {
            safe.push(square);
        }
    }
    Ok(safe)
}

/// Append castling destinations for `king` to its first two groups.
///
/// Offered only for a castling-eligible king on its start square that is not
/// attacked. For each castling-eligible rook on its home corner, every square
/// strictly between
/// the two must be empty, and the squares the king crosses (including its
/// destination, two files away) must not be attacked.
pub fn castling_squares(
    position: &mut Position,
    king: PieceHandle,
    groups: &mut RayGroups,
) -> Result<(), ChessErrors> {
    let record = *position
        .record(king)
        .ok_or(ChessErrors::UnknownPieceHandle(king.index()))?;
    if record.kind() != PieceKind::King
        || !record.can_castle
        || castling_home(record.id) != Some(record.square)
    {
        return Ok(());
    }
    let color = record.color();
    if is_king_attacked(position, color) {
        return Ok(());
    }

    let sides = [
        (PieceId::king_side_rook(color), 1i16, KING_SIDE_GROUP),
        (PieceId::queen_side_rook(color), -1i16, QUEEN_SIDE_GROUP),
    ];

    for (rook_id, direction, group) in sides {
        let Some(rook) = position.by_identity(rook_id).copied() else {
            continue;
        };
        if !rook.can_castle || castling_home(rook_id) != Some(rook.square) {
            continue;
        }

        let (low, high) = if rook.square > record.square {
            (record.square, rook.square)
        } else {
            (rook.square, record.square)
        };
        if !(low + 1..high).all(|sq| position.is_empty_square(sq)) {
            continue;
        }

        let crossing = [
            i16::from(record.square) + direction,
            i16::from(record.square) + 2 * direction,
        ];
        let mut safe = true;
        for square in crossing {
            let square = square as Square;
            if !is_on_board(square)
                || !position.is_empty_square(square)
                || my_king_checked(position, king, square)?
            {
                safe = false;
                break;
            }
        }

        if safe {
            if let Some(ray) = groups.get_mut(group) {
                ray.push(crossing[1] as Square);
            }
        }
    }
    Ok(())
}

/// Every legal destination of one piece, castling included.
pub fn legal_targets(position: &mut Position, handle: PieceHandle) -> Result<Vec<Square>, ChessErrors> {
    let record = *position
        .record(handle)
        .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?;
    let mut groups = candidate_rays(record.kind(), record.color(), record.square);
    if record.kind() == PieceKind::King && record.can_castle {
        castling_squares(position, handle, &mut groups)?;
    }
    unblocked_moves(position, handle, &groups, true)
}
