use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use crate::error::MinichessError;

pub const BOARD_FILES: i8 = 5;
pub const BOARD_RANKS: i8 = 6;

const FILE_NAMES: [char; BOARD_FILES as usize] = ['a', 'b', 'c', 'd', 'e'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank offset of a pawn step for this color
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Single letter used by the server protocol and layouts
    pub fn to_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub fn index(self) -> usize {
        self as usize
    }

    fn to_lowercase_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { piece_type, color }
    }

    /// Uppercase is white, lowercase is black
    pub fn from_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        let piece_type = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };

        Some(Piece::new(piece_type, color))
    }

    pub fn to_char(self) -> char {
        let c = self.piece_type.to_lowercase_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

/// A board coordinate that is always on the 5x6 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: i8,
    rank: i8,
}

impl Square {
    pub fn new(file: i8, rank: i8) -> Option<Square> {
        if (0..BOARD_FILES).contains(&file) && (0..BOARD_RANKS).contains(&rank) {
            Some(Square { file, rank })
        } else {
            None
        }
    }

    pub fn file(self) -> i8 {
        self.file
    }

    pub fn rank(self) -> i8 {
        self.rank
    }

    /// The square `(dx, dy)` away, or `None` if that steps off the board
    pub fn offset(self, dx: i8, dy: i8) -> Option<Square> {
        Square::new(self.file + dx, self.rank + dy)
    }

    pub fn is_promotion_rank(self) -> bool {
        self.rank == 0 || self.rank == BOARD_RANKS - 1
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", FILE_NAMES[self.file as usize], self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = MinichessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MinichessError::MalformedMoveText { text: s.to_string() };

        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(malformed());
        }

        let file = match chars[0] {
            'a'..='e' => chars[0] as i8 - 'a' as i8,
            _ => return Err(malformed()),
        };
        let rank = match chars[1] {
            '1'..='6' => chars[1] as i8 - '1' as i8,
            _ => return Err(malformed()),
        };

        Square::new(file, rank).ok_or_else(malformed)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Board {
    /// Indexed `[rank][file]`, rank 0 is white's back rank
    cells: [[Option<Piece>; BOARD_FILES as usize]; BOARD_RANKS as usize],
}

impl Board {
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.rank as usize][square.file as usize]
    }

    pub fn set(&mut self, square: Square, cell: Option<Piece>) {
        self.cells[square.rank as usize][square.file as usize] = cell;
    }

    pub fn is_occupied(&self, square: Square) -> bool {
        self.get(square).is_some()
    }

    /// Every square, rank 1 first and a-file first within a rank
    pub fn squares() -> impl Iterator<Item = Square> {
        (0..BOARD_RANKS).flat_map(|rank| (0..BOARD_FILES).map(move |file| Square { file, rank }))
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Board::squares().filter_map(|square| self.get(square).map(|piece| (square, piece)))
    }

    /// Parses the piece placement part of a layout, rank 6 first with rows split by '/'.
    pub fn from_rows(rows: &str) -> Result<Board, String> {
        if !rows.is_ascii() {
            return Err(String::from("Expected board rows to only contain ASCII characters"));
        }

        let row_strs: Vec<&str> = rows.split('/').collect();
        if row_strs.len() != BOARD_RANKS as usize {
            return Err(format!(
                "Expected {} '/'-delimited rows but there were {}",
                BOARD_RANKS,
                row_strs.len()
            ));
        }

        let mut board = Board::default();
        for (row_index, row) in row_strs.iter().enumerate() {
            let rank = BOARD_RANKS - 1 - row_index as i8;
            let mut file: i8 = 0;

            for c in row.chars() {
                if file >= BOARD_FILES {
                    return Err(format!("Row '{row}' for rank {} has more than {BOARD_FILES} squares", rank + 1));
                }

                match c {
                    '.' => file += 1,
                    '1'..='5' => file += c as i8 - '0' as i8,
                    _ => {
                        let Some(piece) = Piece::from_char(c) else {
                            return Err(format!(
                                "Encountered unexpected character {c} while processing row for rank {}",
                                rank + 1
                            ));
                        };
                        board.cells[rank as usize][file as usize] = Some(piece);
                        file += 1;
                    }
                }
            }

            if file != BOARD_FILES {
                return Err(format!(
                    "Row '{row}' for rank {} covers {file} squares but should cover {BOARD_FILES}",
                    rank + 1
                ));
            }
        }

        Ok(board)
    }

    pub fn to_rows(&self) -> String {
        self.cells
            .iter()
            .rev()
            .map(|row| row.iter().map(|cell| cell.map_or('.', Piece::to_char)).collect::<String>())
            .collect::<Vec<String>>()
            .join("/")
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.to_rows().split('/') {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Rank 6 printed first so it reads like viewing the board as white
        writeln!(f, "\ncells: \n{self}")
    }
}
