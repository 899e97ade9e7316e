//! Minimal head-to-head engine match harness for local testing.
//!
//! Runs two `Engine` implementations against each other on a recording
//! `Game`, after an optional seeded random opening prefix. Every engine move
//! is searched through a `SearchTask` on a private board snapshot and then
//! submitted to the game like any other move request.

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::chess_errors::ChessErrors;
use crate::engines::engine_trait::Engine;
use crate::game_state::chess_types::Color;
use crate::game_state::game_state::{BoardSnapshot, Game, GameStatus};
use crate::game_state::history::MoveRecord;
use crate::search::threading::SearchTask;
use crate::utils::algebraic::square_to_algebraic;
use crate::utils::render_position::render_position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    WhiteWinCheckmate,
    BlackWinCheckmate,
    DrawStalemate,
    DrawMaxPlies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerId {
    Player1,
    Player2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOutcome {
    PlayerWinCheckmate { player: PlayerId, color: Color },
    DrawStalemate,
    DrawMaxPlies,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    pub max_plies: u16,
    pub opening_min_plies: u8,
    pub opening_max_plies: u8,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_plies: 300,
            opening_min_plies: 2,
            opening_max_plies: 8,
        }
    }
}

/// Moves made and time spent thinking by one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThinkTally {
    pub moves: u32,
    pub think_time: Duration,
}

impl ThinkTally {
    fn add_move(&mut self, elapsed: Duration) {
        self.moves = self.moves.saturating_add(1);
        self.think_time = self.think_time.saturating_add(elapsed);
    }

    fn absorb(&mut self, other: ThinkTally) {
        self.moves = self.moves.saturating_add(other.moves);
        self.think_time = self.think_time.saturating_add(other.think_time);
    }

    pub fn average_ms(&self) -> f64 {
        if self.moves == 0 {
            0.0
        } else {
            self.think_time.as_secs_f64() * 1_000.0 / f64::from(self.moves)
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub final_board: BoardSnapshot,
    pub opening_moves: Vec<String>,
    pub played_moves: Vec<String>,
    /// Indexed by `Color::index`.
    pub tallies: [ThinkTally; 2],
}

impl MatchResult {
    pub fn winner(&self) -> Option<Color> {
        match self.outcome {
            MatchOutcome::WhiteWinCheckmate => Some(Color::Light),
            MatchOutcome::BlackWinCheckmate => Some(Color::Dark),
            MatchOutcome::DrawStalemate | MatchOutcome::DrawMaxPlies => None,
        }
    }

    #[inline]
    pub fn tally(&self, color: Color) -> ThinkTally {
        self.tallies[color.index()]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchSeriesConfig {
    pub games: u16,
    pub base_seed: u64,
    pub per_game: MatchConfig,
    pub verbose: bool,
}

impl Default for MatchSeriesConfig {
    fn default() -> Self {
        Self {
            games: 9,
            base_seed: 0,
            per_game: MatchConfig::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub wins: u16,
    pub tally: ThinkTally,
}

#[derive(Debug, Clone, Default)]
pub struct MatchSeriesStats {
    pub games: u16,
    pub player1: PlayerRecord,
    pub player2: PlayerRecord,
    pub draws: u16,
    pub outcomes: Vec<SeriesOutcome>,
}

impl MatchSeriesStats {
    pub fn player(&self, id: PlayerId) -> &PlayerRecord {
        match id {
            PlayerId::Player1 => &self.player1,
            PlayerId::Player2 => &self.player2,
        }
    }

    fn player_mut(&mut self, id: PlayerId) -> &mut PlayerRecord {
        match id {
            PlayerId::Player1 => &mut self.player1,
            PlayerId::Player2 => &mut self.player2,
        }
    }

    pub fn overall_average_ms(&self) -> f64 {
        let mut both = self.player1.tally;
        both.absorb(self.player2.tally);
        both.average_ms()
    }

    pub fn report(&self) -> String {
        format!(
            "games={} player1_wins={} player2_wins={} draws={} p1_avg_ms={:.3} p2_avg_ms={:.3} overall_avg_ms={:.3}",
            self.games,
            self.player1.wins,
            self.player2.wins,
            self.draws,
            self.player1.tally.average_ms(),
            self.player2.tally.average_ms(),
            self.overall_average_ms()
        )
    }
}

/// `whitePawn5 e2-e4`, with `x` for captures.
pub fn describe_move(record: &MoveRecord) -> String {
    let square = |sq| square_to_algebraic(sq).unwrap_or_else(|_| sq.to_string());
    let joint = if record.captured.is_some() { 'x' } else { '-' };
    format!("{} {}{}{}", record.piece, square(record.from), joint, square(record.to))
}

/// Play a single seeded engine-vs-engine match from the standard opening.
///
/// `engine_white` is White, `engine_black` is Black.
pub fn play_engine_match(
    engine_white: Box<dyn Engine>,
    engine_black: Box<dyn Engine>,
    seed: u64,
    config: MatchConfig,
) -> Result<MatchResult, ChessErrors> {
    let mut game = Game::new_standard()?;
    let opening_moves = apply_seeded_random_opening(
        &mut game,
        seed,
        config.opening_min_plies,
        config.opening_max_plies,
    )?;
    play_from(game, engine_white, engine_black, opening_moves, config)
}

fn play_from(
    mut game: Game,
    engine_white: Box<dyn Engine>,
    engine_black: Box<dyn Engine>,
    opening_moves: Vec<String>,
    config: MatchConfig,
) -> Result<MatchResult, ChessErrors> {
    let mut engines = [Some(engine_white), Some(engine_black)];
    for engine in engines.iter_mut().flatten() {
        engine.new_game();
    }

    let mut played_moves = Vec::<String>::new();
    let mut tallies = [ThinkTally::default(); 2];

    let mut outcome = MatchOutcome::DrawMaxPlies;
    for _ in 0..config.max_plies {
        if let Some(terminal) = terminal_outcome(&game) {
            outcome = terminal;
            break;
        }

        let mover = game.turn();
        let Some(engine) = engines[mover.index()].take() else {
            return Err(ChessErrors::SearchTaskDisconnected);
        };
        let task = SearchTask::spawn(engine, game.board_snapshot());
        let returned = task.wait()?;
        engines[mover.index()] = Some(returned.engine);
        let out = returned.output?;

        tallies[mover.index()].add_move(out.elapsed);

        let chosen = out.best_move;
        if !game.attempt_move(chosen.piece, chosen.to)? {
            return Err(ChessErrors::IllegalEngineMove {
                piece: chosen.piece,
                square: chosen.to,
            });
        }
        if let Some(record) = game.last_move() {
            played_moves.push(describe_move(&record));
        }
    }
    if let Some(terminal) = terminal_outcome(&game) {
        outcome = terminal;
    }
    debug!(?outcome, plies = played_moves.len(), "match finished\n{}", render_position(game.position()));

    Ok(MatchResult {
        outcome,
        final_board: game.board_snapshot(),
        opening_moves,
        played_moves,
        tallies,
    })
}

fn terminal_outcome(game: &Game) -> Option<MatchOutcome> {
    match (game.status(), game.winner()) {
        (GameStatus::Checkmate, Some(Color::Light)) => Some(MatchOutcome::WhiteWinCheckmate),
        (GameStatus::Checkmate, Some(Color::Dark)) => Some(MatchOutcome::BlackWinCheckmate),
        (GameStatus::Stalemate, _) => Some(MatchOutcome::DrawStalemate),
        _ => None,
    }
}

/// Play a series of matches and aggregate win/loss/draw statistics.
///
/// Which player takes White is drawn per game from `base_seed`; game `i`
/// uses opening seed `base_seed + i`.
pub fn play_engine_match_series<F1, F2>(
    player1_factory: F1,
    player2_factory: F2,
    config: MatchSeriesConfig,
) -> Result<MatchSeriesStats, ChessErrors>
where
    F1: Fn() -> Box<dyn Engine>,
    F2: Fn() -> Box<dyn Engine>,
{
    let mut stats = MatchSeriesStats {
        games: config.games,
        ..MatchSeriesStats::default()
    };
    let mut color_rng = StdRng::seed_from_u64(config.base_seed ^ 0xA5A5_5A5A_0123_4567);

    for game_index in 0..config.games {
        let seed = config.base_seed.wrapping_add(u64::from(game_index));
        // Player seated at each color, indexed by `Color::index`.
        let seats = if color_rng.random_bool(0.5) {
            [PlayerId::Player1, PlayerId::Player2]
        } else {
            [PlayerId::Player2, PlayerId::Player1]
        };
        if config.verbose {
            info!(
                game = game_index + 1,
                games = config.games,
                seed,
                white = ?seats[0],
                black = ?seats[1],
                "series game starting"
            );
        }

        let engine_for = |id: PlayerId| match id {
            PlayerId::Player1 => player1_factory(),
            PlayerId::Player2 => player2_factory(),
        };
        let result = play_engine_match(
            engine_for(seats[0]),
            engine_for(seats[1]),
            seed,
            config.per_game,
        )?;

        for color in [Color::Light, Color::Dark] {
            stats
                .player_mut(seats[color.index()])
                .tally
                .absorb(result.tally(color));
        }

        let outcome = match (result.winner(), result.outcome) {
            (Some(color), _) => {
                let player = seats[color.index()];
                stats.player_mut(player).wins += 1;
                SeriesOutcome::PlayerWinCheckmate { player, color }
            }
            (None, MatchOutcome::DrawStalemate) => {
                stats.draws += 1;
                SeriesOutcome::DrawStalemate
            }
            (None, _) => {
                stats.draws += 1;
                SeriesOutcome::DrawMaxPlies
            }
        };
        stats.outcomes.push(outcome);

        if config.verbose {
            info!(
                game = game_index + 1,
                result = ?outcome,
                p1_wins = stats.player1.wins,
                p2_wins = stats.player2.wins,
                draws = stats.draws,
                "series game finished"
            );
        }
    }

    Ok(stats)
}

/// Play a seeded number of uniformly random legal moves on `game`.
pub fn apply_seeded_random_opening(
    game: &mut Game,
    seed: u64,
    min_plies: u8,
    max_plies: u8,
) -> Result<Vec<String>, ChessErrors> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut opening_moves = Vec::<String>::new();

    let low = min_plies.min(max_plies);
    let high = max_plies.max(min_plies);
    let target_plies = if low == high {
        low
    } else {
        rng.random_range(low..=high)
    };

    for _ in 0..target_plies {
        if game.status().is_terminal() {
            break;
        }
        let legal_moves = game.all_legal_moves()?;
        if legal_moves.is_empty() {
            break;
        }

        let (handle, to) = legal_moves[rng.random_range(0..legal_moves.len())];
        let piece = game
            .position()
            .record(handle)
            .ok_or(ChessErrors::UnknownPieceHandle(handle.index()))?
            .id;
        if !game.attempt_move(piece, to)? {
            return Err(ChessErrors::IllegalEngineMove { piece, square: to });
        }
        if let Some(record) = game.last_move() {
            opening_moves.push(describe_move(&record));
        }
    }

    Ok(opening_moves)
}
