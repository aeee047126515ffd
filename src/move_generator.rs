use log::trace;

use crate::{
    board::{Board, PieceType, Square},
    moves::Move,
    position::Position,
};

/// Whether a scan may end on an empty square, an enemy piece, or either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePolicy {
    /// Quiet moves only, an occupied square blocks
    Never,
    /// Captures only, an empty square ends the scan without a move
    Always,
    /// Quiet moves or captures
    Optional,
}

/// Base vectors that get rotated four ways by [symmetric_scan]
const ORTHOGONAL: (i8, i8) = (0, 1);
const DIAGONAL: (i8, i8) = (1, 1);
const KNIGHT_RIGHT: (i8, i8) = (1, 2);
const KNIGHT_LEFT: (i8, i8) = (-1, 2);

/// Walks from `from` along `(dx, dy)` pushing a move for every square the piece can reach.
///
/// The walk ends at the board edge, at the first occupied square (which is only added when it is
/// an enemy piece and `capture` allows it), at an empty square when `capture` is
/// [CapturePolicy::Always], or after one step when `stop_short` is set.
pub fn scan(
    board: &Board,
    from: Square,
    (dx, dy): (i8, i8),
    stop_short: bool,
    capture: CapturePolicy,
    moves: &mut Vec<Move>,
) {
    let Some(mover) = board.get(from) else {
        return;
    };

    let mut current = from;
    loop {
        let Some(next) = current.offset(dx, dy) else {
            break;
        };
        current = next;

        let mut last_step = stop_short;
        match board.get(current) {
            Some(occupant) => {
                if occupant.color == mover.color || capture == CapturePolicy::Never {
                    break;
                }
                last_step = true;
            }
            None => {
                if capture == CapturePolicy::Always {
                    break;
                }
            }
        }

        moves.push(Move::new(from, current));

        if last_step {
            break;
        }
    }
}

/// Runs [scan] for `base` and its three quarter turns, (dx, dy) -> (dy, -dx).
pub fn symmetric_scan(
    board: &Board,
    from: Square,
    base: (i8, i8),
    stop_short: bool,
    capture: CapturePolicy,
    moves: &mut Vec<Move>,
) {
    let (mut dx, mut dy) = base;
    for _ in 0..4 {
        scan(board, from, (dx, dy), stop_short, capture, moves);
        (dx, dy) = (dy, -dx);
    }
}

/// Pseudo-legal moves for whatever piece stands on `square`. An empty square has no moves.
pub fn generate_moves_for_square(board: &Board, square: Square) -> Vec<Move> {
    let mut moves = Vec::new();
    let Some(piece) = board.get(square) else {
        return moves;
    };

    match piece.piece_type {
        PieceType::Rook => {
            symmetric_scan(board, square, ORTHOGONAL, false, CapturePolicy::Optional, &mut moves);
        }
        PieceType::Bishop => {
            // Variant rule: a quiet diagonal step plus an orthogonal slide that may capture
            symmetric_scan(board, square, DIAGONAL, true, CapturePolicy::Never, &mut moves);
            symmetric_scan(board, square, ORTHOGONAL, false, CapturePolicy::Optional, &mut moves);
        }
        PieceType::Knight => {
            symmetric_scan(board, square, KNIGHT_RIGHT, true, CapturePolicy::Optional, &mut moves);
            symmetric_scan(board, square, KNIGHT_LEFT, true, CapturePolicy::Optional, &mut moves);
        }
        PieceType::Queen => {
            symmetric_scan(board, square, ORTHOGONAL, false, CapturePolicy::Optional, &mut moves);
            symmetric_scan(board, square, DIAGONAL, false, CapturePolicy::Optional, &mut moves);
        }
        PieceType::King => {
            symmetric_scan(board, square, ORTHOGONAL, true, CapturePolicy::Optional, &mut moves);
            symmetric_scan(board, square, DIAGONAL, true, CapturePolicy::Optional, &mut moves);
        }
        PieceType::Pawn => {
            let direction = piece.color.pawn_direction();
            scan(board, square, (-1, direction), true, CapturePolicy::Always, &mut moves);
            scan(board, square, (1, direction), true, CapturePolicy::Always, &mut moves);
            scan(board, square, (0, direction), true, CapturePolicy::Never, &mut moves);
        }
    }

    moves
}

/// All pseudo-legal moves for the side to move, in board scan order.
///
/// A finished game has no moves. An empty result for a game in progress means the side to move
/// is stuck, which callers have to treat as the end of the game.
pub fn generate_moves(position: &Position) -> Vec<Move> {
    if position.game_over {
        return Vec::new();
    }

    let mut moves = Vec::new();
    for square in Board::squares() {
        if position.is_movers_piece(square) {
            moves.append(&mut generate_moves_for_square(&position.board, square));
        }
    }

    if moves.is_empty() {
        trace!("{} is unable to move", position.side_to_move);
    }

    moves
}
