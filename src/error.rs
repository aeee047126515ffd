use std::fmt::{Display, Formatter};

use crate::{
    board::{Color, Square},
    moves::Move,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinichessError {
    /// The origin square is empty or holds a piece of the side not on move.
    IllegalMover { square: Square },
    /// The move is well formed but the piece cannot make it.
    IllegalMove { r#move: Move },
    MalformedMoveText { text: String },
    /// Not a failure of the caller, the side on move is simply stuck.
    NoLegalMoves { side: Color },
    GameOver,
}

impl Display for MinichessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MinichessError::IllegalMover { square } => {
                write!(f, "square {square} is not occupied by a piece of the side to move")
            }
            MinichessError::IllegalMove { r#move } => write!(f, "move {} is not legal in this position", r#move),
            MinichessError::MalformedMoveText { text } => {
                write!(f, "could not parse '{text}' as a move, expected something like a2-a3")
            }
            MinichessError::NoLegalMoves { side } => write!(f, "{side} is unable to move"),
            MinichessError::GameOver => write!(f, "the game is already over"),
        }
    }
}

impl std::error::Error for MinichessError {}
