//! Static position evaluation.
//!
//! Scores are `f64` and always taken from one side's point of view: every
//! term is computed for both colors and the opponent's share is subtracted,
//! so mirroring a position across colors negates its score.

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::{column_of, row_of, Color, PieceKind, Square};
use crate::game_state::position::Position;
use crate::move_generation::legal_move_generator::legal_targets;

/// Weights of the positional terms. Material is never scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    pub center: f64,
    pub king_safety: f64,
    pub development: f64,
    pub mobility: f64,
    pub pawn_structure: f64,
    pub bishop_pair: f64,
    pub rook_open_file: f64,
    pub passed_pawn: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            center: 1.1,
            king_safety: 3.0,
            development: 2.0,
            mobility: 0.2,
            pawn_structure: 1.2,
            bishop_pair: 0.5,
            rook_open_file: 0.4,
            passed_pawn: 0.7,
        }
    }
}

impl EvalWeights {
    /// Material only; handy for search tests with predictable scores.
    pub const fn material_only() -> Self {
        Self {
            center: 0.0,
            king_safety: 0.0,
            development: 0.0,
            mobility: 0.0,
            pawn_structure: 0.0,
            bishop_pair: 0.0,
            rook_open_file: 0.0,
            passed_pawn: 0.0,
        }
    }
}

#[inline]
pub const fn piece_value(kind: PieceKind) -> f64 {
    match kind {
        PieceKind::Pawn => 1.0,
        PieceKind::Knight => 3.2,
        PieceKind::Bishop => 3.3,
        PieceKind::Rook => 5.1,
        PieceKind::Queen => 9.5,
        PieceKind::King => 100.0,
    }
}

/// Bonus for occupying a square near the middle of the board. Three rings:
/// the four central squares, the corners of the 4x4 block, and its edges.
pub fn center_weight(square: Square) -> f64 {
    match square {
        44 | 45 | 54 | 55 => 1.2,
        33 | 36 | 63 | 66 => 0.8,
        34 | 35 | 43 | 46 | 53 | 56 | 64 | 65 => 0.5,
        _ => 0.0,
    }
}

/// One side's share of the evaluation, term by term.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideScore {
    pub material: f64,
    pub center: f64,
    pub development: f64,
    pub king_safety: f64,
    pub mobility: f64,
    pub bishop_pair: f64,
    pub rook_open_file: f64,
    pub pawn_structure: f64,
}

impl SideScore {
    pub fn total(&self) -> f64 {
        self.material
            + self.center
            + self.development
            + self.king_safety
            + self.mobility
            + self.bishop_pair
            + self.rook_open_file
            + self.pawn_structure
    }
}

/// Evaluation of `position` for `perspective`: own share minus opponent's.
///
/// Needs `&mut` only because mobility plays hypothetical moves; the
/// position is unchanged on return.
pub fn evaluate(
    position: &mut Position,
    perspective: Color,
    weights: &EvalWeights,
) -> Result<f64, ChessErrors> {
    evaluate_with_known_moves(position, perspective, weights, None)
}

/// `evaluate`, reusing a legal-move count the caller already has for one
/// side instead of generating that side's moves again.
pub fn evaluate_with_known_moves(
    position: &mut Position,
    perspective: Color,
    weights: &EvalWeights,
    known: Option<(Color, usize)>,
) -> Result<f64, ChessErrors> {
    let known_for = |color: Color| known.filter(|(c, _)| *c == color).map(|(_, n)| n);
    let own = score_side(position, perspective, weights, known_for(perspective))?;
    let opponent = perspective.opposite();
    let theirs = score_side(position, opponent, weights, known_for(opponent))?;
    Ok(own.total() - theirs.total())
}

/// Number of legal moves `color` has in `position`.
pub fn legal_move_count(position: &mut Position, color: Color) -> Result<usize, ChessErrors> {
    let mut count = 0;
    for handle in position.color_pieces(color) {
        count += legal_targets(position, handle)?.len();
    }
    Ok(count)
}

/// One side's terms. Mobility uses `known_moves` when given and otherwise
/// generates the side's legal moves.
pub fn score_side(
    position: &mut Position,
    color: Color,
    weights: &EvalWeights,
    known_moves: Option<usize>,
) -> Result<SideScore, ChessErrors> {
    let mut score = SideScore::default();
    let mut bishops = 0usize;

    for handle in position.color_pieces(color) {
        let Some(piece) = position.record(handle).copied() else {
            continue;
        };
        let kind = piece.kind();
        score.material += piece_value(kind);

        let pawn_factor = if kind == PieceKind::Pawn { 0.5 } else { 1.0 };
        score.center += center_weight(piece.square) * pawn_factor * weights.center;

        match kind {
            PieceKind::Knight | PieceKind::Bishop if piece.square != piece.initial_square => {
                score.development += 0.2 * weights.development;
            }
            PieceKind::King if matches!(column_of(piece.square), 4 | 5) => {
                score.king_safety += 0.5 * weights.king_safety;
            }
            PieceKind::Rook if is_open_file_for(position, color, column_of(piece.square)) => {
                score.rook_open_file += 0.4 * weights.rook_open_file;
            }
            _ => {}
        }
        if kind == PieceKind::Bishop {
            bishops += 1;
        }

    }

    if weights.mobility != 0.0 {
        let moves = match known_moves {
            Some(moves) => moves,
            None => legal_move_count(position, color)?,
        };
        score.mobility = moves as f64 * 0.02 * weights.mobility;
    }

    if bishops >= 2 {
        score.bishop_pair = 0.5 * weights.bishop_pair;
    }
    score.pawn_structure = pawn_structure(position, color, weights);
    Ok(score)
}

/// No opposing pawn stands on `column`.
fn is_open_file_for(position: &Position, color: Color, column: u8) -> bool {
    !position.active_pieces().any(|(_, p)| {
        p.kind() == PieceKind::Pawn && p.color() != color && column_of(p.square) == column
    })
}

fn pawn_structure(position: &Position, color: Color, weights: &EvalWeights) -> f64 {
    let mut per_file = [0usize; 10];
    let mut own = Vec::with_capacity(8);
    let mut theirs = Vec::with_capacity(8);
    for (_, piece) in position.active_pieces() {
        if piece.kind() != PieceKind::Pawn {
            continue;
        }
        if piece.color() == color {
            per_file[usize::from(column_of(piece.square))] += 1;
            own.push(piece.square);
        } else {
            theirs.push(piece.square);
        }
    }

    let mut score = 0.0;
    for file in 1..=8usize {
        let count = per_file[file];
        if count == 0 {
            continue;
        }
        if count > 1 {
            score -= 0.5 * (count - 1) as f64 * weights.pawn_structure;
        }
        if per_file[file - 1] == 0 && per_file[file + 1] == 0 {
            score -= 0.5 * weights.pawn_structure;
        }
    }

    let passed = own
        .iter()
        .filter(|pawn| is_passed(**pawn, color, &theirs))
        .count();
    score + passed as f64 * 0.7 * weights.passed_pawn
}

/// No opposing pawn ahead on the same or an adjacent file.
fn is_passed(pawn: Square, color: Color, opposing_pawns: &[Square]) -> bool {
    !opposing_pawns.iter().any(|other| {
        column_of(*other).abs_diff(column_of(pawn)) <= 1
            && match color {
                Color::Light => row_of(*other) > row_of(pawn),
                Color::Dark => row_of(*other) < row_of(pawn),
            }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::standard_pieces;
    use crate::game_state::chess_types::PieceId;
    use crate::game_state::piece_record::PieceRecord;

    const EPSILON: f64 = 1e-9;

    fn record(color: Color, kind: PieceKind, ordinal: u8, square: Square) -> PieceRecord {
        PieceRecord::new(PieceId::new(color, kind, ordinal), square)
    }

    #[test]
    fn opening_position_is_balanced() {
        let mut position = Position::from_records(standard_pieces()).expect("layout should load");
        let score = evaluate(&mut position, Color::Light, &EvalWeights::default())
            .expect("evaluation should run");
        assert!(score.abs() < EPSILON, "expected 0, got {score}");
    }

    #[test]
    fn extra_queen_dominates_material_only_score() {
        let mut position = Position::from_records([
            record(Color::Light, PieceKind::King, 0, 11),
            record(Color::Light, PieceKind::Queen, 0, 12),
            record(Color::Dark, PieceKind::King, 0, 88),
        ])
        .expect("layout should load");
        let score = evaluate(&mut position, Color::Light, &EvalWeights::material_only())
            .expect("evaluation should run");
        assert!((score - 9.5).abs() < EPSILON);
        let score = evaluate(&mut position, Color::Dark, &EvalWeights::material_only())
            .expect("evaluation should run");
        assert!((score + 9.5).abs() < EPSILON);
    }

    #[test]
    fn center_rings_have_decreasing_weight() {
        assert_eq!(center_weight(45), 1.2);
        assert_eq!(center_weight(66), 0.8);
        assert_eq!(center_weight(35), 0.5);
        assert_eq!(center_weight(11), 0.0);
    }

    #[test]
    fn pawn_structure_terms() {
        // Doubled and isolated pawns on the c-file, no black pawns at all:
        // both pawns are also passed.
        let position = Position::from_records([
            record(Color::Light, PieceKind::King, 0, 15),
            record(Color::Dark, PieceKind::King, 0, 85),
            record(Color::Light, PieceKind::Pawn, 3, 23),
            record(Color::Light, PieceKind::Pawn, 4, 33),
        ])
        .expect("layout should load");
        let weights = EvalWeights::default();
        let expected = -0.5 * 1.2 - 0.5 * 1.2 + 2.0 * 0.7 * 0.7;
        assert!((pawn_structure(&position, Color::Light, &weights) - expected).abs() < EPSILON);
    }

    #[test]
    fn blocked_pawn_is_not_passed() {
        assert!(!is_passed(44, Color::Light, &[65]));
        assert!(is_passed(44, Color::Light, &[35]));
        assert!(!is_passed(55, Color::Dark, &[34]));
        assert!(is_passed(55, Color::Dark, &[77]));
    }

    #[test]
    fn known_move_count_gives_the_same_score() {
        let mut position = Position::from_records(standard_pieces()).expect("layout should load");
        let weights = EvalWeights::default();
        let moves = legal_move_count(&mut position, Color::Light).expect("generation should run");
        assert_eq!(moves, 20);

        let generated = evaluate(&mut position, Color::Dark, &weights).expect("evaluation should run");
        let reused = evaluate_with_known_moves(&mut position, Color::Dark, &weights, Some((Color::Light, moves)))
            .expect("evaluation should run");
        assert!((generated - reused).abs() < EPSILON);

        // The supplied count stands in for White's generated mobility.
        let skewed = evaluate_with_known_moves(&mut position, Color::Dark, &weights, Some((Color::Light, 0)))
            .expect("evaluation should run");
        assert!((skewed - (generated + 20.0 * 0.02 * weights.mobility)).abs() < EPSILON);
    }

    #[test]
    fn mirrored_position_negates_the_score() {
        let mut position = Position::from_records([
            record(Color::Light, PieceKind::King, 0, 17),
            record(Color::Light, PieceKind::Rook, 1, 14),
            record(Color::Light, PieceKind::Bishop, 1, 44),
            record(Color::Light, PieceKind::Bishop, 2, 36),
            record(Color::Light, PieceKind::Pawn, 6, 26),
            record(Color::Light, PieceKind::Pawn, 7, 27),
            record(Color::Dark, PieceKind::King, 0, 85),
            record(Color::Dark, PieceKind::Knight, 1, 63),
            record(Color::Dark, PieceKind::Pawn, 1, 71),
            record(Color::Dark, PieceKind::Pawn, 2, 61),
        ])
        .expect("layout should load");
        let mut mirrored = position.mirrored().expect("mirror should build");
        let weights = EvalWeights::default();

        let score = evaluate(&mut position, Color::Light, &weights).expect("evaluation should run");
        let flipped = evaluate(&mut mirrored, Color::Light, &weights).expect("evaluation should run");
        assert!(score.abs() > EPSILON, "position should not be balanced");
        assert!((score + flipped).abs() < 1e-6, "{score} vs {flipped}");
    }
}
