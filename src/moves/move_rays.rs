//! Candidate destination rays per piece kind.
//!
//! Each group is an ordered ray walking outward from the piece, so the
//! legality layer can stop a ray at the first obstruction. Knights and kings
//! get one singleton group per direction. Pawns get exactly two groups:
//! index `PAWN_ATTACK_GROUP` holds the diagonal capture squares and
//! `PAWN_FORWARD_GROUP` the forward non-capture squares (two of them from the
//! starting row). Rays are cut at the board edge, so sentinel squares never
//! appear in the output.

use crate::game_state::chess_types::{offset_square, row_of, Color, PieceKind, Square};

pub type RayGroups = Vec<Vec<Square>>;

pub const PAWN_ATTACK_GROUP: usize = 0;
pub const PAWN_FORWARD_GROUP: usize = 1;

/// King groups start with these two so castling targets can extend them.
pub const KING_SIDE_GROUP: usize = 0;
pub const QUEEN_SIDE_GROUP: usize = 1;

const ORTHOGONAL: [i16; 4] = [1, -1, 10, -10];
const DIAGONAL: [i16; 4] = [11, 9, -9, -11];
const KNIGHT_JUMPS: [i16; 8] = [21, 19, 12, 8, -8, -12, -19, -21];
const MAX_SLIDE: usize = 7;

/// Raw candidate squares for a piece of `kind` and `color` on `square`.
pub fn candidate_rays(kind: PieceKind, color: Color, square: Square) -> RayGroups {
    match kind {
        PieceKind::Pawn => pawn_rays(color, square),
        PieceKind::Knight => step_rays(square, &KNIGHT_JUMPS),
        PieceKind::Bishop => slide_rays(square, &DIAGONAL),
        PieceKind::Rook => slide_rays(square, &ORTHOGONAL),
        PieceKind::Queen => {
            let mut groups = slide_rays(square, &ORTHOGONAL);
            groups.extend(slide_rays(square, &DIAGONAL));
            groups
        }
        PieceKind::King => {
            let mut groups = step_rays(square, &ORTHOGONAL);
            groups.extend(step_rays(square, &DIAGONAL));
            groups
        }
    }
}

fn pawn_rays(color: Color, square: Square) -> RayGroups {
    let forward = color.forward();

    let attacks = [forward + 1, forward - 1]
        .into_iter()
        .filter_map(|delta| offset_square(square, delta))
        .collect();

    let mut advances = Vec::with_capacity(2);
    if let Some(one) = offset_square(square, forward) {
        advances.push(one);
        if row_of(square) == color.pawn_row() {
            if let Some(two) = offset_square(one, forward) {
                advances.push(two);
            }
        }
    }

    vec![attacks, advances]
}

fn step_rays(square: Square, deltas: &[i16]) -> RayGroups {
    deltas
        .iter()
        .map(|delta| offset_square(square, *delta).into_iter().collect())
        .collect()
}

fn slide_rays(square: Square, deltas: &[i16]) -> RayGroups {
    deltas
        .iter()
        .map(|delta| {
            let mut ray = Vec::with_capacity(MAX_SLIDE);
            let mut current = square;
            while let Some(next) = offset_square(current, *delta) {
                ray.push(next);
                current = next;
            }
            ray
        })
        .collect()
}
