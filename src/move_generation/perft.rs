//! Move-path enumeration for validating the move generator.
//!
//! Counts leaf nodes of the legal move tree, plus what kind of move led to
//! each leaf. Walks the tree with make/unmake on a single silent game; the
//! multi-threaded variant gives every root move its own board copy.

use std::thread;

use crate::chess_errors::ChessErrors;
use crate::game_state::game_state::{BoardSnapshot, SilentGame};
use crate::game_state::history::MoveRecord;
use crate::move_generation::legal_move_checks::has_no_legal_moves;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Number of leaf positions `depth` plies below the current one.
pub fn perft(game: &mut SilentGame, depth: u8) -> Result<u64, ChessErrors> {
    if depth == 0 {
        return Ok(1);
    }
    let moves = game.all_legal_moves()?;
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0;
    for (handle, square) in moves {
        let undo = game.make_move(handle, square)?;
        let below = perft(game, depth - 1);
        game.unmake_move(undo)?;
        nodes += below?;
    }
    Ok(nodes)
}

/// Leaf count with per-category tallies of the last move on each path.
pub fn perft_counts(game: &mut SilentGame, depth: u8) -> Result<PerftCounts, ChessErrors> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }
    let mut total = PerftCounts::default();
    perft_recurse(game, depth, &mut total)?;
    Ok(total)
}

/// `perft_counts` with each root move searched on its own thread.
pub fn perft_multi_threaded(snapshot: &BoardSnapshot, depth: u8) -> Result<PerftCounts, ChessErrors> {
    let mut root = SilentGame::from_snapshot(snapshot.clone())?;
    if depth <= 1 {
        return perft_counts(&mut root, depth);
    }

    let mut handles = Vec::new();
    for (handle, square) in root.all_legal_moves()? {
        let undo = root.make_move(handle, square)?;
        let child = root.board_snapshot();
        root.unmake_move(undo)?;

        handles.push(thread::spawn(move || {
            let mut game = SilentGame::from_snapshot(child)?;
            let mut local = PerftCounts::default();
            perft_recurse(&mut game, depth - 1, &mut local)?;
            Ok::<PerftCounts, ChessErrors>(local)
        }));
    }

    let mut total = PerftCounts::default();
    for handle in handles {
        let local = handle
            .join()
            .map_err(|_| ChessErrors::SearchTaskDisconnected)??;
        total.merge(local);
    }
    Ok(total)
}

fn perft_recurse(
    game: &mut SilentGame,
    depth: u8,
    counts: &mut PerftCounts,
) -> Result<(), ChessErrors> {
    for (handle, square) in game.all_legal_moves()? {
        let undo = game.make_move(handle, square)?;
        let result = if depth == 1 {
            tally_leaf(game, &undo.group.record, counts)
        } else {
            perft_recurse(game, depth - 1, counts)
        };
        game.unmake_move(undo)?;
        result?;
    }
    Ok(())
}

fn tally_leaf(
    game: &mut SilentGame,
    record: &MoveRecord,
    counts: &mut PerftCounts,
) -> Result<(), ChessErrors> {
    counts.nodes += 1;
    if record.captured.is_some() {
        counts.captures += 1;
    }
    if record.is_castling {
        counts.castles += 1;
    }
    if record.is_promotion {
        counts.promotions += 1;
    }
    if game.in_check() {
        counts.checks += 1;
        let turn = game.turn();
        if has_no_legal_moves(game.position_mut(), turn)? {
            counts.checkmates += 1;
        }
    }
    Ok(())
}
