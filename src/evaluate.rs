use crate::{
    board::{Color, PieceType},
    position::Position,
};

/// Indexed with [PieceType::index]. Kings are not counted, losing one ends the game instead.
pub static CENTIPAWN_VALUES: [i32; 6] = [100, 300, 300, 500, 900, 0];

pub fn piece_value(piece_type: PieceType) -> i32 {
    CENTIPAWN_VALUES[piece_type.index()]
}

impl Position {
    /// Material balance, positive when white is ahead
    pub fn evaluate(&self) -> i32 {
        self.board
            .pieces()
            .map(|(_, piece)| match piece.color {
                Color::White => piece_value(piece.piece_type),
                Color::Black => -piece_value(piece.piece_type),
            })
            .sum()
    }

    /// Material balance, positive when the side to move is ahead
    pub fn evaluate_side_to_move_relative(&self) -> i32 {
        match self.side_to_move {
            Color::White => self.evaluate(),
            Color::Black => -self.evaluate(),
        }
    }
}
