use std::fmt::Display;

use crate::{
    STARTING_LAYOUT,
    board::{Board, Color, Piece, PieceType, Square},
    move_generator::generate_moves,
    moves::Move,
};

/// Number of full moves after which the game is a draw
pub const MOVE_LIMIT: u16 = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
    /// Starts at 1 and goes up after each black move
    pub(crate) move_counter: u16,
    pub(crate) game_over: bool,
    pub(crate) winner: Option<Color>,
}

impl Position {
    pub fn new_game() -> Position {
        // The starting layout is a constant, so this can only fail if it was edited badly
        Position::from_layout(STARTING_LAYOUT).expect("starting layout should be valid")
    }

    /// Parses `<rows> <w|b> [move counter]`, for example `kqbnr/ppppp/...../...../PPPPP/RNBQK w 1`
    pub fn from_layout(layout: &str) -> Result<Position, String> {
        let parts: Vec<&str> = layout.split_ascii_whitespace().collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(format!(
                "Expected layout to have 2 or 3 space-delimited parts but it had {}",
                parts.len()
            ));
        }

        let board = Board::from_rows(parts[0])?;

        let side_to_move = match parts[1] {
            "w" | "W" => Color::White,
            "b" | "B" => Color::Black,
            _ => return Err(format!("Encountered unexpected side to move value '{}'", parts[1])),
        };

        let move_counter = match parts.get(2) {
            Some(counter) => match counter.parse::<u16>() {
                Ok(0) => return Err(String::from("Move counter starts at 1, got 0")),
                Ok(c) => c,
                Err(e) => {
                    return Err(format!(
                        "Encountered error while parsing move counter value '{counter}' as u16: {e}"
                    ));
                }
            },
            None => 1,
        };

        Ok(Position {
            board,
            side_to_move,
            move_counter,
            game_over: false,
            winner: None,
        })
    }

    pub fn to_layout(&self) -> String {
        format!(
            "{} {} {}",
            self.board.to_rows(),
            self.side_to_move.to_char(),
            self.move_counter
        )
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn move_counter(&self) -> u16 {
        self.move_counter
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// `None` for a game still in progress and for a draw
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn is_movers_piece(&self, square: Square) -> bool {
        self.board.get(square).is_some_and(|piece| piece.color == self.side_to_move)
    }

    /// Every pseudo-legal move for the side to move. Empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        generate_moves(self)
    }

    pub fn has_legal_moves(&self) -> bool {
        !self.legal_moves().is_empty()
    }

    pub(crate) fn captures_king(&self, r#move: &Move) -> bool {
        matches!(
            self.board.get(r#move.to),
            Some(Piece { piece_type: PieceType::King, color }) if color != self.side_to_move
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new_game()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", self.move_counter, self.side_to_move.to_char().to_ascii_uppercase())?;
        write!(f, "{}", self.board)
    }
}

#[cfg(test)]
mod position_tests {
    use super::*;

    #[test]
    pub fn new_game_has_standard_layout() {
        let position = Position::new_game();

        assert_eq!(STARTING_LAYOUT, position.to_layout());
        assert_eq!(Color::White, position.side_to_move());
        assert_eq!(1, position.move_counter());
        assert!(!position.is_game_over());
        assert_eq!(None, position.winner());
        assert_eq!(
            Some(Piece::new(PieceType::King, Color::White)),
            position.board().get(Square::new(4, 0).unwrap())
        );
        assert_eq!(
            Some(Piece::new(PieceType::King, Color::Black)),
            position.board().get(Square::new(0, 5).unwrap())
        );
    }

    #[test]
    pub fn layout_round_trips() {
        let layout = "k.r../.p.../...../..Q../P.P../....K b 17";
        assert_eq!(layout, Position::from_layout(layout).unwrap().to_layout());
    }

    #[test]
    pub fn move_counter_defaults_to_one() {
        let position = Position::from_layout("k..../...../...../...../...../....K b").unwrap();
        assert_eq!(1, position.move_counter());
        assert_eq!(Color::Black, position.side_to_move());
    }

    #[test]
    pub fn bad_layouts_are_rejected() {
        assert!(Position::from_layout("k..../...../...../...../...../....K").is_err());
        assert!(Position::from_layout("k..../...../...../...../...../....K x").is_err());
        assert!(Position::from_layout("k..../...../...../...../...../....K w 0").is_err());
        assert!(Position::from_layout("k..../...../...../...../...../....K w one").is_err());
        assert!(Position::from_layout("k..../...../...../...../...../....K w 1 extra").is_err());
    }

    #[test]
    pub fn legal_moves_run_out() {
        assert!(Position::new_game().has_legal_moves());

        // Both pawns block each other and nothing else is on the board
        let stuck = Position::from_layout("...../...../.p.../.P.../...../..... w").unwrap();
        assert!(!stuck.has_legal_moves());

        let mut finished = Position::from_layout("kq.../B..../...../...../...../....K w").unwrap();
        finished.apply_move_text("a5-a6").unwrap();
        assert!(!finished.has_legal_moves());
    }

    #[test]
    pub fn display_shows_counter_side_and_rows() {
        let position = Position::new_game();
        assert_eq!(
            "1 W\nkqbnr\nppppp\n.....\n.....\nPPPPP\nRNBQK\n",
            position.to_string()
        );
    }
}
