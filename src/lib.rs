pub mod bench;
pub mod board;
pub mod error;
pub mod evaluate;
pub mod imcs;
pub mod move_generator;
pub mod moves;
pub mod perft;
pub mod position;
pub mod search;

pub use board::{Board, Color, Piece, PieceType, Square};
pub use error::MinichessError;
pub use moves::Move;
pub use position::{MOVE_LIMIT, Position};
pub use search::{DEFAULT_DEPTH, KING_CAPTURE_VALUE, SearchStrategy, Searcher};

pub static STARTING_LAYOUT: &str = "kqbnr/ppppp/...../...../PPPPP/RNBQK w 1";

pub fn new_game() -> Position {
    Position::new_game()
}

/// Parses and applies move text received from outside the engine. The position is only returned
/// when the move was accepted.
pub fn apply_move(mut position: Position, move_text: &str) -> Result<Position, MinichessError> {
    position.apply_move_text(move_text)?;
    Ok(position)
}

/// `None` when the side to move has no moves or the game is already decided.
pub fn best_move(position: &Position, depth: u8, use_pruning: bool) -> Option<Move> {
    Searcher::new(position, SearchStrategy::from_pruning(use_pruning))
        .search(depth)
        .map(|result| result.best_move)
}

/// Whether the game is over, and who won it. A finished game without a winner is a draw.
pub fn is_terminal(position: &Position) -> (bool, Option<Color>) {
    (position.is_game_over(), position.winner())
}

/// Material score from the point of view of the side to move
pub fn score(position: &Position) -> i32 {
    position.evaluate_side_to_move_relative()
}
