//! Random-move engine.
//!
//! Selects uniformly from legal moves and is primarily used for diagnostics,
//! integration testing, and as a sparring partner in self-play.

use std::time::Instant;

use rand::prelude::IndexedRandom;

use crate::chess_errors::ChessErrors;
use crate::engines::engine_trait::{Engine, EngineOutput};
use crate::game_state::game_state::{BoardSnapshot, SilentGame};
use crate::search::iterative_deepening::SearchMove;
use crate::search::threading::SearchControl;

#[derive(Debug, Default)]
pub struct RandomEngine;

impl RandomEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_move(
        &mut self,
        snapshot: &BoardSnapshot,
        control: &SearchControl,
    ) -> Result<EngineOutput, ChessErrors> {
        let started = Instant::now();
        let mut game = SilentGame::from_snapshot(snapshot.clone())?;
        let legal_moves = game.all_legal_moves()?;
        control.add_nodes(legal_moves.len() as u64);

        let mut rng = rand::rng();
        let &(handle, to) = legal_moves
            .as_slice()
            .choose(&mut rng)
            .ok_or(ChessErrors::NoLegalMoves)?;
        let piece = game
            .position()
            .record(handle)
            .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?
            .id;

        let mut out = EngineOutput::new(SearchMove { piece, to });
        out.nodes = legal_moves.len() as u64;
        out.elapsed = started.elapsed();
        out.info_lines
            .push(format!("random_engine legal_moves {}", legal_moves.len()));
        Ok(out)
    }
}
