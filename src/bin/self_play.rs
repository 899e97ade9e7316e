//! Engine-vs-engine series runner.
//!
//! Run with:
//! `cargo run --release --bin self_play -- --games 10 --depth 3`
//! `RUST_LOG=debug cargo run --release --bin self_play -- --opponent random --verbose`

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mailbox_chess::chess_errors::ChessErrors;
use mailbox_chess::engines::engine_minimax::MinimaxEngine;
use mailbox_chess::engines::engine_random::RandomEngine;
use mailbox_chess::engines::engine_trait::Engine;
use mailbox_chess::search::iterative_deepening::SearchConfig;
use mailbox_chess::utils::engine_match_harness::{
    play_engine_match_series, MatchConfig, MatchSeriesConfig,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Opponent {
    Random,
    Minimax,
}

#[derive(Debug, Parser)]
#[command(about = "Play a series of engine-vs-engine games")]
struct Args {
    /// Number of games in the series.
    #[arg(long, default_value_t = 10)]
    games: u16,

    /// Seed for openings and color assignment.
    #[arg(long, default_value_t = 1234)]
    seed: u64,

    /// Games still running after this many plies are drawn.
    #[arg(long, default_value_t = 200)]
    max_plies: u16,

    /// Nominal search depth of the minimax player(s).
    #[arg(long, default_value_t = 3)]
    depth: u8,

    /// Per-move time budget in milliseconds.
    #[arg(long, default_value_t = 1000)]
    time_ms: u64,

    /// Who plays against player 1 (always minimax).
    #[arg(long, value_enum, default_value_t = Opponent::Random)]
    opponent: Opponent,

    /// Log every game's start and result.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), ChessErrors> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let search = SearchConfig {
        depth: args.depth,
        time_limit: Duration::from_millis(args.time_ms),
        iteration_pause: Duration::from_millis(50),
        ..SearchConfig::default()
    };

    let player1 = move || Box::new(MinimaxEngine::new(search)) as Box<dyn Engine>;
    let opponent = args.opponent;
    let player2 = move || match opponent {
        Opponent::Random => Box::new(RandomEngine::new()) as Box<dyn Engine>,
        Opponent::Minimax => Box::new(MinimaxEngine::new(search)) as Box<dyn Engine>,
    };

    let stats = play_engine_match_series(
        player1,
        player2,
        MatchSeriesConfig {
            games: args.games,
            base_seed: args.seed,
            per_game: MatchConfig {
                max_plies: args.max_plies,
                ..MatchConfig::default()
            },
            verbose: args.verbose,
        },
    )?;

    info!("{}", stats.report());
    info!(outcomes = ?stats.outcomes, "series finished");
    Ok(())
}
