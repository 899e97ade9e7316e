use crate::game_state::chess_types::Color;
use crate::game_state::game_state::GameStatus;
use crate::game_state::history::{MoveGroup, MoveRecord};

/// Everything `unmake_move` needs to restore the state before a move.
///
/// The board half lives in `group` as reversible sub-steps; the rest is the
/// scalar status that the move overwrote.
#[derive(Debug, Clone)]
pub struct UndoState {
    pub group: MoveGroup,
    pub prev_in_check: bool,
    pub prev_status: GameStatus,
    pub prev_winner: Option<Color>,
    pub prev_last_move: Option<MoveRecord>,
}
