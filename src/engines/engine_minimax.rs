//! Minimax engine: iterative deepening alpha-beta behind the `Engine` trait.
//!
//! The engine owns its `SearchConfig`; every search runs on a copy taken at
//! the start, so `set_config` never affects a search already in flight.

use crate::chess_errors::ChessErrors;
use crate::engines::engine_trait::{Engine, EngineOutput};
use crate::game_state::game_state::BoardSnapshot;
use crate::search::iterative_deepening::{iterative_deepening_search, Difficulty, SearchConfig};
use crate::search::threading::SearchControl;

#[derive(Debug, Clone, Default)]
pub struct MinimaxEngine {
    config: SearchConfig,
}

impl MinimaxEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self::new(SearchConfig::for_difficulty(difficulty))
    }

    #[inline]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        tracing::debug!(?config, "search configuration updated");
        self.config = config;
    }
}

impl Engine for MinimaxEngine {
    fn name(&self) -> &str {
        "Minimax"
    }

    fn choose_move(
        &mut self,
        snapshot: &BoardSnapshot,
        control: &SearchControl,
    ) -> Result<EngineOutput, ChessErrors> {
        let config = self.config;
        let report = iterative_deepening_search(snapshot, &config, control)?;

        let mut out = EngineOutput::new(report.best_move);
        out.score = Some(report.score);
        out.depth = report.depth;
        out.nodes = report.nodes;
        out.elapsed = report.elapsed;
        out.info_lines.push(format!(
            "depth {} score {:.2} nodes {} time {}ms",
            report.depth,
            report.score,
            report.nodes,
            report.elapsed.as_millis()
        ));
        out.info_lines.push(format!(
            "minimax_engine nominal_depth {} time_limit {}ms",
            config.depth,
            config.time_limit.as_millis()
        ));
        Ok(out)
    }
}
