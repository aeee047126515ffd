use std::{fmt::Display, str::FromStr};

use log::{debug, error, info};

use crate::{
    board::{Board, Color, Piece, PieceType, Square},
    error::MinichessError,
    move_generator::generate_moves_for_square,
    position::{MOVE_LIMIT, Position},
};

/// A from/to pair. Captures and promotions are read off the board when the move is made.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Move {
        Move { from, to }
    }

    /// Works out which move turned `before` into `after`: the square that was emptied is the
    /// origin and the other changed square is the destination.
    pub fn from_board_diff(before: &Board, after: &Board) -> Option<Move> {
        let mut from = None;
        let mut to = None;

        for square in Board::squares() {
            let (old, new) = (before.get(square), after.get(square));
            if old == new {
                continue;
            }

            if old.is_some() && new.is_none() {
                if from.is_some() {
                    return None;
                }
                from = Some(square);
            } else {
                if to.is_some() {
                    return None;
                }
                to = Some(square);
            }
        }

        Some(Move::new(from?, to?))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = MinichessError;

    /// Parses `<file><rank>-<file><rank>`, for example `a2-a3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let squares: Vec<&str> = text.split('-').collect();
        if squares.len() != 2 {
            return Err(MinichessError::MalformedMoveText { text: text.to_string() });
        }

        let malformed = || MinichessError::MalformedMoveText { text: text.to_string() };
        let from = squares[0].parse::<Square>().map_err(|_| malformed())?;
        let to = squares[1].parse::<Square>().map_err(|_| malformed())?;

        Ok(Move::new(from, to))
    }
}

impl Position {
    /// Checks `r#move` against the pseudo-legal moves of the piece on its origin, then makes it.
    pub fn apply_move(&mut self, r#move: Move) -> Result<(), MinichessError> {
        if self.game_over {
            error!("Requested move {} but the game is already over", r#move);
            return Err(MinichessError::GameOver);
        }

        if !self.is_movers_piece(r#move.from) {
            error!(
                "Requested move {} but {} has no piece on {}",
                r#move, self.side_to_move, r#move.from
            );
            return Err(MinichessError::IllegalMover { square: r#move.from });
        }

        if !generate_moves_for_square(&self.board, r#move.from).contains(&r#move) {
            error!("Requested move {} but it was not found in the board state", r#move);
            debug!("{:#?}", self.board);
            return Err(MinichessError::IllegalMove { r#move });
        }

        self.make_move(&r#move);
        Ok(())
    }

    pub fn apply_move_text(&mut self, text: &str) -> Result<Move, MinichessError> {
        let r#move = text.parse::<Move>()?;
        self.apply_move(r#move)?;
        Ok(r#move)
    }

    /// Makes a move that is known to come from move generation for this position.
    pub(crate) fn make_move(&mut self, r#move: &Move) {
        let Some(mut piece) = self.board.get(r#move.from) else {
            debug_assert!(false, "make_move called with an empty origin {}", r#move.from);
            return;
        };
        let captured = self.board.get(r#move.to);

        if piece.piece_type == PieceType::Pawn && r#move.to.is_promotion_rank() {
            piece = Piece::new(PieceType::Queen, piece.color);
        }

        self.board.set(r#move.to, Some(piece));
        self.board.set(r#move.from, None);

        let mover = self.side_to_move;
        self.side_to_move = mover.opposite();

        if matches!(captured, Some(Piece { piece_type: PieceType::King, .. })) {
            self.game_over = true;
            self.winner = Some(mover);
            info!("{} wins by capturing the king with {}", mover, r#move);
            return;
        }

        if mover == Color::Black {
            if self.move_counter >= MOVE_LIMIT {
                self.game_over = true;
                self.winner = None;
                info!("Game ends in a draw after {} moves", self.move_counter);
            } else {
                self.move_counter += 1;
            }
        }
    }
}
