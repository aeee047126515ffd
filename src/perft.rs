use std::time::Instant;

use log::info;
use num_format::{Locale, ToFormattedString};

use crate::{
    board::PieceType, move_generator::generate_moves, moves::Move, position::Position,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PerftStats {
    pub nodes: u64,
    pub captures: u64,
    pub promotions: u64,
    pub king_captures: u64,
}

impl Position {
    pub fn start_perft(&self, depth: u8, divide: bool) -> PerftStats {
        let mut stats = PerftStats::default();

        let start_time = Instant::now();
        if divide {
            for (r#move, nodes) in self.perft_divide(depth, &mut stats) {
                println!("{} {}", r#move, nodes);
            }
            println!("\n{}", stats.nodes);
        } else {
            do_perft(depth, self, &mut stats);
        }
        let elapsed = start_time.elapsed();

        let nps = stats.nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        info!(
            "depth {depth} in {elapsed:#?}. Nodes: {}. Nodes per second: {}",
            stats.nodes.to_formatted_string(&Locale::en),
            (nps as u64).to_formatted_string(&Locale::en)
        );
        info!("{:?}", stats);

        stats
    }

    /// Leaf counts below each root move, in generation order
    pub fn perft_divide(&self, depth: u8, stats: &mut PerftStats) -> Vec<(Move, u64)> {
        if depth == 0 || self.game_over {
            stats.nodes += 1;
            return Vec::new();
        }

        generate_moves(self)
            .into_iter()
            .map(|r#move| {
                let start_nodes = stats.nodes;
                perft_move(depth, self, &r#move, stats);
                (r#move, stats.nodes - start_nodes)
            })
            .collect()
    }
}

// Code referenced from https://www.chessprogramming.org/Perft
fn do_perft(draft: u8, position: &Position, stats: &mut PerftStats) {
    // A finished game is a leaf even when depth remains
    if draft == 0 || position.game_over {
        stats.nodes += 1;
        return;
    }

    for r#move in generate_moves(position) {
        perft_move(draft, position, &r#move, stats);
    }
}

fn perft_move(draft: u8, position: &Position, r#move: &Move, stats: &mut PerftStats) {
    if draft == 1 {
        check_perft_stats(r#move, position, stats);
    }

    let mut child = position.clone();
    child.make_move(r#move);
    do_perft(draft - 1, &child, stats);
}

fn check_perft_stats(r#move: &Move, position: &Position, stats: &mut PerftStats) {
    if let Some(captured) = position.board.get(r#move.to) {
        stats.captures += 1;
        if captured.piece_type == PieceType::King {
            stats.king_captures += 1;
        }
    }

    if position
        .board
        .get(r#move.from)
        .is_some_and(|piece| piece.piece_type == PieceType::Pawn)
        && r#move.to.is_promotion_rank()
    {
        stats.promotions += 1;
    }
}

#[cfg(test)]
mod perft_tests {
    use super::*;

    fn perft(layout: &str, depth: u8) -> PerftStats {
        Position::from_layout(layout).unwrap().start_perft(depth, false)
    }

    #[test]
    pub fn starting_position_depth_one() {
        let stats = Position::new_game().start_perft(1, false);
        assert_eq!(
            PerftStats {
                nodes: 7,
                ..Default::default()
            },
            stats
        );
    }

    #[test]
    pub fn starting_position_depth_two() {
        // No piece can reach the other side in one move, so every white move leaves black seven
        assert_eq!(49, Position::new_game().start_perft(2, false).nodes);
    }

    #[test]
    pub fn depth_zero_is_one_node() {
        assert_eq!(1, Position::new_game().start_perft(0, false).nodes);
    }

    #[test]
    pub fn king_capture_is_counted() {
        let stats = perft("kq.../B..../...../...../...../....K w", 1);
        assert_eq!(13, stats.nodes);
        assert_eq!(1, stats.captures);
        assert_eq!(1, stats.king_captures);
        assert_eq!(0, stats.promotions);
    }

    #[test]
    pub fn finished_game_is_a_leaf() {
        let position = Position::from_layout("kq.../B..../...../...../...../....K w").unwrap();
        let mut stats = PerftStats::default();
        let divided = position.perft_divide(3, &mut stats);

        let king_capture = "a5-a6".parse::<Move>().unwrap();
        assert_eq!(Some(&(king_capture, 1)), divided.iter().find(|(m, _)| *m == king_capture));
        assert_eq!(13, divided.len());
        assert_eq!(stats.nodes, divided.iter().map(|(_, nodes)| nodes).sum::<u64>());
    }

    #[test]
    pub fn promotions_are_counted() {
        // Only the c5-c6 push promotes, the diagonal squares are empty
        let stats = perft("...../..P../...../...../...../....K w", 1);
        assert_eq!(1, stats.promotions);
        assert_eq!(0, stats.captures);

        let stats = perft("..r../.P.../...../...../...../....K w", 1);
        assert_eq!(2, stats.promotions);
        assert_eq!(1, stats.captures);
    }
}
