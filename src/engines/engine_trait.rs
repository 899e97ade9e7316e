//! Engine abstraction.
//!
//! An engine receives a private copy of the board and the control block of
//! the search it runs in, and answers with one move addressed by piece
//! identity. Engines are `Send` so a `SearchTask` can move them onto its
//! worker thread.

use std::time::Duration;

use crate::chess_errors::ChessErrors;
use crate::game_state::game_state::BoardSnapshot;
use crate::search::iterative_deepening::SearchMove;
use crate::search::threading::SearchControl;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub best_move: SearchMove,
    /// Search score from the mover's point of view, when the engine has one.
    pub score: Option<f64>,
    pub depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
    pub info_lines: Vec<String>,
}

impl EngineOutput {
    pub fn new(best_move: SearchMove) -> Self {
        Self {
            best_move,
            score: None,
            depth: 0,
            nodes: 0,
            elapsed: Duration::ZERO,
            info_lines: Vec::new(),
        }
    }
}

pub trait Engine: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) {}

    fn choose_move(
        &mut self,
        snapshot: &BoardSnapshot,
        control: &SearchControl,
    ) -> Result<EngineOutput, ChessErrors>;
}
