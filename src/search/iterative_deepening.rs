//! Iterative deepening minimax with alpha-beta pruning.
//!
//! Scores are taken from the point of view of the side to move at the root
//! (the engine's color): that side maximizes, the other minimizes. Each
//! iteration searches to its own depth limit on a silent scratch game,
//! applying and reverting moves through `make_move`/`unmake_move`.
//!
//! Move ordering visits pieces by descending value and each piece's
//! destinations by captured value plus center weight. Past a configurable
//! ply only the first few destinations of each piece are searched, so deep
//! iterations are a heuristic and not an exhaustive search.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::chess_errors::ChessErrors;
use crate::game_state::chess_types::{Color, PieceId, Square};
use crate::game_state::game_state::{BoardSnapshot, SilentGame};
use crate::game_state::position::PieceHandle;
use crate::move_generation::legal_move_checks::has_no_legal_moves;
use crate::move_generation::legal_move_generator::legal_targets;
use crate::search::board_scoring::{
    center_weight, evaluate, evaluate_with_known_moves, legal_move_count, piece_value, EvalWeights,
};
use crate::search::threading::SearchControl;

/// Magnitude of a forced win; the ply of the mate is subtracted from it.
pub const MATE_SCORE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Search parameters, passed by value into each search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Nominal depth in plies.
    pub depth: u8,
    pub time_limit: Duration,
    /// Iterations continue up to `depth + max_extra_depth` while time remains.
    pub max_extra_depth: u8,
    /// Destinations kept per piece once past `breadth_limit_after_ply`.
    pub breadth_limit: usize,
    pub breadth_limit_after_ply: u8,
    /// Sleep between iterations.
    pub iteration_pause: Duration,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Hard)
    }
}

impl SearchConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (depth, time_limit) = match difficulty {
            Difficulty::Easy => (2, Duration::from_millis(500)),
            Difficulty::Medium => (3, Duration::from_millis(1000)),
            Difficulty::Hard => (5, Duration::from_millis(2000)),
        };
        Self {
            depth,
            time_limit,
            max_extra_depth: 2,
            breadth_limit: 10,
            breadth_limit_after_ply: 2,
            iteration_pause: Duration::ZERO,
            weights: EvalWeights::default(),
        }
    }

    #[inline]
    pub fn max_depth(&self) -> u8 {
        self.depth.saturating_add(self.max_extra_depth)
    }
}

/// A move chosen by search, addressed by piece identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMove {
    pub piece: PieceId,
    pub to: Square,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchReport {
    pub best_move: SearchMove,
    pub score: f64,
    /// Depth of the last completed iteration.
    pub depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pruning {
    AlphaBeta,
    /// Plain minimax; only useful to cross-check alpha-beta.
    None,
}

/// Outcome of a single fixed-depth iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Iteration {
    Complete { best_move: SearchMove, score: f64 },
    /// Deadline or cancellation hit; the partial result is unusable.
    Interrupted,
}

/// Deepen from one ply up to `config.max_depth()` until the time budget or a
/// stop request ends it, returning the result of the deepest completed
/// iteration.
pub fn iterative_deepening_search(
    snapshot: &BoardSnapshot,
    config: &SearchConfig,
    control: &SearchControl,
) -> Result<SearchReport, ChessErrors> {
    let started = Instant::now();
    let deadline = started + config.time_limit;
    let nodes_before = control.nodes();
    let mut game = SilentGame::from_snapshot(snapshot.clone())?;
    if game.all_legal_moves()?.is_empty() {
        return Err(ChessErrors::NoLegalMoves);
    }

    let mut best: Option<(SearchMove, f64, u8)> = None;
    for depth in 1..=config.max_depth() {
        if control.should_stop() || Instant::now() >= deadline {
            break;
        }
        match search_to_depth(&mut game, depth, config, Pruning::AlphaBeta, deadline, control)? {
            Iteration::Complete { best_move, score } => {
                debug!(depth, piece = %best_move.piece, to = best_move.to, score, "iteration complete");
                best = Some((best_move, score, depth));
            }
            Iteration::Interrupted => {
                debug!(depth, "iteration interrupted, result discarded");
                break;
            }
        }
        if !config.iteration_pause.is_zero() {
            thread::sleep(config.iteration_pause);
        }
    }

    let (best_move, score, depth) = best.ok_or(ChessErrors::SearchProducedNoMove)?;
    let report = SearchReport {
        best_move,
        score,
        depth,
        nodes: control.nodes() - nodes_before,
        elapsed: started.elapsed(),
    };
    info!(
        piece = %report.best_move.piece,
        to = report.best_move.to,
        score = report.score,
        depth = report.depth,
        nodes = report.nodes,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "search finished"
    );
    Ok(report)
}

/// One search of exactly `depth` plies from the side to move of `game`.
///
/// `game` is left exactly as it was found, interrupted or not.
pub fn search_to_depth(
    game: &mut SilentGame,
    depth: u8,
    config: &SearchConfig,
    pruning: Pruning,
    deadline: Instant,
    control: &SearchControl,
) -> Result<Iteration, ChessErrors> {
    let mut searcher = Searcher {
        engine_color: game.turn(),
        game,
        config,
        pruning,
        depth,
        deadline,
        control,
        interrupted: false,
    };
    searcher.root()
}

struct Searcher<'a> {
    game: &'a mut SilentGame,
    engine_color: Color,
    config: &'a SearchConfig,
    pruning: Pruning,
    depth: u8,
    deadline: Instant,
    control: &'a SearchControl,
    interrupted: bool,
}

impl Searcher<'_> {
    fn root(&mut self) -> Result<Iteration, ChessErrors> {
        let moves = self.ordered_moves(0)?;
        if moves.is_empty() {
            return Err(ChessErrors::NoLegalMoves);
        }

        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;
        let mut best: Option<(SearchMove, f64)> = None;

        for (handle, to) in moves {
            let piece = self
                .game
                .position()
                .record(handle)
                .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?
                .id;
            let score = self.child_score(handle, to, 1, alpha, beta)?;
            if self.interrupted {
                return Ok(Iteration::Interrupted);
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((SearchMove { piece, to }, score));
            }
            if self.pruning == Pruning::AlphaBeta {
                alpha = alpha.max(score);
            }
        }

        Ok(best.map_or(Iteration::Interrupted, |(best_move, score)| {
            Iteration::Complete { best_move, score }
        }))
    }

    fn minimax(&mut self, ply: u8, mut alpha: f64, mut beta: f64) -> Result<f64, ChessErrors> {
        self.control.add_nodes(1);

        let opponent = self.engine_color.opposite();
        let position = self.game.position();
        if position.by_identity(PieceId::king(opponent)).is_none() {
            return Ok(MATE_SCORE - f64::from(ply));
        }
        if position.by_identity(PieceId::king(self.engine_color)).is_none() {
            return Ok(-MATE_SCORE + f64::from(ply));
        }

        if self.control.should_stop() || Instant::now() >= self.deadline {
            self.interrupted = true;
            return self.evaluate();
        }

        if ply >= self.depth {
            return self.leaf_score(ply);
        }

        let moves = self.ordered_moves(ply)?;
        if moves.is_empty() {
            return Ok(self.terminal_score(ply));
        }

        let maximizing = self.game.turn() == self.engine_color;
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for (handle, to) in moves {
            let score = self.child_score(handle, to, ply + 1, alpha, beta)?;
            if self.interrupted {
                return Ok(score);
            }
            if maximizing {
                best = best.max(score);
                if self.pruning == Pruning::AlphaBeta {
                    alpha = alpha.max(best);
                }
            } else {
                best = best.min(score);
                if self.pruning == Pruning::AlphaBeta {
                    beta = beta.min(best);
                }
            }
            if self.pruning == Pruning::AlphaBeta && beta <= alpha {
                break;
            }
        }
        Ok(best)
    }

    fn child_score(
        &mut self,
        handle: PieceHandle,
        to: Square,
        ply: u8,
        alpha: f64,
        beta: f64,
    ) -> Result<f64, ChessErrors> {
        let undo = self.game.make_move(handle, to)?;
        let score = self.minimax(ply, alpha, beta);
        self.game.unmake_move(undo)?;
        score
    }

    /// Side to move has no legal move: mate if it is in check, else a draw.
    fn terminal_score(&self, ply: u8) -> f64 {
        if !self.game.in_check() {
            return 0.0;
        }
        if self.game.turn() == self.engine_color {
            -MATE_SCORE + f64::from(ply)
        } else {
            MATE_SCORE - f64::from(ply)
        }
    }

    fn evaluate(&mut self) -> Result<f64, ChessErrors> {
        evaluate(self.game.position_mut(), self.engine_color, &self.config.weights)
    }

    /// Terminal score or static evaluation. The side to move's legal moves
    /// are generated once and feed both the terminal test and mobility.
    fn leaf_score(&mut self, ply: u8) -> Result<f64, ChessErrors> {
        let to_move = self.game.turn();
        let weights = self.config.weights;
        if weights.mobility == 0.0 {
            if has_no_legal_moves(self.game.position_mut(), to_move)? {
                return Ok(self.terminal_score(ply));
            }
            return self.evaluate();
        }

        let moves = legal_move_count(self.game.position_mut(), to_move)?;
        if moves == 0 {
            return Ok(self.terminal_score(ply));
        }
        evaluate_with_known_moves(
            self.game.position_mut(),
            self.engine_color,
            &weights,
            Some((to_move, moves)),
        )
    }

    fn ordered_moves(&mut self, ply: u8) -> Result<Vec<(PieceHandle, Square)>, ChessErrors> {
        let turn = self.game.turn();
        let mut pieces: Vec<(PieceHandle, f64)> = self
            .game
            .position()
            .active_pieces()
            .filter(|(_, record)| record.color() == turn)
            .map(|(handle, record)| (handle, piece_value(record.kind())))
            .collect();
        pieces.sort_by(|a, b| b.1.total_cmp(&a.1));

        let truncate = ply > self.config.breadth_limit_after_ply;
        let mut moves = Vec::with_capacity(48);
        for (handle, _) in pieces {
            let position = self.game.position_mut();
            let mut targets = legal_targets(position, handle)?;
            let key = |square: Square| {
                let captured = position
                    .by_square(square)
                    .map_or(0.0, |record| piece_value(record.kind()));
                captured + center_weight(square)
            };
            targets.sort_by(|a, b| key(*b).total_cmp(&key(*a)));
            if truncate {
                targets.truncate(self.config.breadth_limit);
            }
            moves.extend(targets.into_iter().map(|square| (handle, square)));
        }
        Ok(moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::PieceKind;
    use crate::game_state::events::Silent;
    use crate::game_state::game_state::Game;
    use crate::game_state::piece_record::PieceRecord;
    use crate::game_state::position::Position;

    fn record(color: Color, kind: PieceKind, ordinal: u8, square: Square) -> PieceRecord {
        PieceRecord::new(PieceId::new(color, kind, ordinal), square)
    }

    fn silent(records: Vec<PieceRecord>, turn: Color) -> SilentGame {
        let position = Position::from_records(records).expect("layout should load");
        Game::with_effects(position, turn, Silent).expect("game should build")
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    fn quick_config(depth: u8) -> SearchConfig {
        SearchConfig {
            depth,
            time_limit: Duration::from_secs(60),
            max_extra_depth: 0,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn difficulty_presets() {
        let easy = SearchConfig::for_difficulty(Difficulty::Easy);
        assert_eq!(easy.depth, 2);
        assert_eq!(easy.time_limit, Duration::from_millis(500));
        let hard = SearchConfig::default();
        assert_eq!(hard.depth, 5);
        assert_eq!(hard.max_depth(), 7);
        assert_eq!(hard.weights, EvalWeights::default());
    }

    #[test]
    fn takes_a_hanging_queen() {
        let mut game = silent(
            vec![
                record(Color::Light, PieceKind::King, 0, 11),
                record(Color::Light, PieceKind::Rook, 1, 14),
                record(Color::Dark, PieceKind::Queen, 0, 84),
                record(Color::Dark, PieceKind::King, 0, 88),
            ],
            Color::Light,
        );
        let config = SearchConfig {
            weights: EvalWeights::material_only(),
            ..quick_config(1)
        };
        let control = SearchControl::default();
        let iteration = search_to_depth(&mut game, 1, &config, Pruning::AlphaBeta, far_deadline(), &control)
            .expect("search should run");
        let Iteration::Complete { best_move, score } = iteration else {
            panic!("search should complete");
        };
        assert_eq!(best_move.to, 84);
        assert!((score - 5.1).abs() < 1e-9, "rook against a bare king, got {score}");
    }

    #[test]
    fn finds_back_rank_mate() {
        // White rook a1 mates on a8; black king h8 boxed in by its own pawns.
        let mut game = silent(
            vec![
                record(Color::Light, PieceKind::King, 0, 17),
                record(Color::Light, PieceKind::Rook, 1, 11),
                record(Color::Dark, PieceKind::King, 0, 88),
                record(Color::Dark, PieceKind::Pawn, 6, 76),
                record(Color::Dark, PieceKind::Pawn, 7, 77),
                record(Color::Dark, PieceKind::Pawn, 8, 78),
            ],
            Color::Light,
        );
        let control = SearchControl::default();
        let iteration = search_to_depth(&mut game, 2, &quick_config(2), Pruning::AlphaBeta, far_deadline(), &control)
            .expect("search should run");
        let Iteration::Complete { best_move, score } = iteration else {
            panic!("search should complete");
        };
        assert_eq!(best_move.to, 81);
        assert_eq!(score, MATE_SCORE - 1.0);
    }

    #[test]
    fn search_leaves_the_game_untouched() {
        let mut game = SilentGame::from_snapshot(
            Game::new_standard()
                .expect("standard game should build")
                .board_snapshot(),
        )
        .expect("silent game should build");
        let before = game.position().pieces();
        let control = SearchControl::default();
        search_to_depth(&mut game, 2, &quick_config(2), Pruning::AlphaBeta, far_deadline(), &control)
            .expect("search should run");
        assert_eq!(game.position().pieces(), before);
        assert_eq!(game.turn(), Color::Light);
        assert!(control.nodes() > 20);
    }

    #[test]
    fn stop_request_interrupts_the_iteration() {
        let mut game = SilentGame::from_snapshot(
            Game::new_standard()
                .expect("standard game should build")
                .board_snapshot(),
        )
        .expect("silent game should build");
        let control = SearchControl::default();
        control.request_stop();
        let iteration = search_to_depth(&mut game, 3, &quick_config(3), Pruning::AlphaBeta, far_deadline(), &control)
            .expect("search should run");
        assert_eq!(iteration, Iteration::Interrupted);
    }

    #[test]
    fn expired_budget_yields_no_move() {
        let snapshot = Game::new_standard()
            .expect("standard game should build")
            .board_snapshot();
        let config = SearchConfig {
            time_limit: Duration::ZERO,
            ..SearchConfig::default()
        };
        let control = SearchControl::default();
        assert_eq!(
            iterative_deepening_search(&snapshot, &config, &control),
            Err(ChessErrors::SearchProducedNoMove)
        );
    }

    #[test]
    fn no_legal_moves_is_reported() {
        // Black to move is already mated.
        let game = silent(
            vec![
                record(Color::Light, PieceKind::King, 0, 17),
                record(Color::Light, PieceKind::Rook, 1, 81),
                record(Color::Dark, PieceKind::King, 0, 88),
                record(Color::Dark, PieceKind::Pawn, 6, 76),
                record(Color::Dark, PieceKind::Pawn, 7, 77),
                record(Color::Dark, PieceKind::Pawn, 8, 78),
            ],
            Color::Dark,
        );
        let control = SearchControl::default();
        assert_eq!(
            iterative_deepening_search(&game.board_snapshot(), &quick_config(2), &control),
            Err(ChessErrors::NoLegalMoves)
        );
    }

    #[test]
    fn leaf_scores_match_a_fresh_evaluation() {
        let mut game = SilentGame::from_snapshot(
            Game::new_standard()
                .expect("standard game should build")
                .board_snapshot(),
        )
        .expect("silent game should build");
        let config = quick_config(1);
        assert!(config.weights.mobility != 0.0);

        let mut expected = f64::NEG_INFINITY;
        for (handle, to) in game.all_legal_moves().expect("generation should run") {
            let undo = game.make_move(handle, to).expect("legal move should apply");
            let score = evaluate(game.position_mut(), Color::Light, &config.weights)
                .expect("evaluation should run");
            game.unmake_move(undo).expect("unmake should succeed");
            expected = expected.max(score);
        }

        let control = SearchControl::default();
        let Iteration::Complete { score, .. } =
            search_to_depth(&mut game, 1, &config, Pruning::None, far_deadline(), &control)
                .expect("search should run")
        else {
            panic!("search should complete");
        };
        assert!((score - expected).abs() < 1e-9, "{score} vs {expected}");
    }

    #[test]
    fn alpha_beta_agrees_with_plain_minimax() {
        let mut game = silent(
            vec![
                record(Color::Light, PieceKind::King, 0, 17),
                record(Color::Light, PieceKind::Queen, 0, 14),
                record(Color::Light, PieceKind::Knight, 2, 36),
                record(Color::Light, PieceKind::Pawn, 5, 45),
                record(Color::Light, PieceKind::Pawn, 6, 26),
                record(Color::Dark, PieceKind::King, 0, 87),
                record(Color::Dark, PieceKind::Rook, 1, 84),
                record(Color::Dark, PieceKind::Bishop, 1, 63),
                record(Color::Dark, PieceKind::Pawn, 4, 54),
                record(Color::Dark, PieceKind::Pawn, 7, 77),
            ],
            Color::Light,
        );
        let config = quick_config(2);
        let control = SearchControl::default();

        let pruned = search_to_depth(&mut game, 2, &config, Pruning::AlphaBeta, far_deadline(), &control)
            .expect("alpha-beta should run");
        let pruned_nodes = control.nodes();
        let full = search_to_depth(&mut game, 2, &config, Pruning::None, far_deadline(), &control)
            .expect("minimax should run");
        let full_nodes = control.nodes() - pruned_nodes;

        assert_eq!(pruned, full);
        assert!(pruned_nodes < full_nodes, "{pruned_nodes} vs {full_nodes}");
    }
}
