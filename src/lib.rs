//! Crate root module declarations for the mailbox chess engine.
//!
//! Exposes the rules core (game state, ray tables, legal move generation),
//! the minimax search, the engines built on it, and a few utilities, so
//! binaries, tests and benches can import stable module paths.

pub mod chess_errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod events;
    pub mod game_state;
    pub mod history;
    pub mod piece_record;
    pub mod position;
    pub mod undo_state;
}

pub mod moves {
    pub mod move_rays;
}

pub mod move_generation {
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod threading;
}

pub mod engines {
    pub mod engine_minimax;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod utils {
    pub mod algebraic;
    pub mod engine_match_harness;
    pub mod render_position;
}
