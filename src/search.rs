use std::{fmt::Display, time::Instant};

use log::{debug, info, warn};
use num_format::{Locale, ToFormattedString};

use crate::{
    error::MinichessError,
    move_generator::generate_moves,
    moves::Move,
    position::Position,
};

pub const DEFAULT_DEPTH: u8 = 5;

/// Score for capturing the king. Remaining depth is added on top so sooner captures score higher.
pub const KING_CAPTURE_VALUE: i32 = 100_000;

const INFINITY: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Every node is searched
    Negamax,
    /// Negamax with an alpha-beta window, same best move with fewer nodes
    #[default]
    AlphaBeta,
}

impl SearchStrategy {
    pub fn from_pruning(use_pruning: bool) -> SearchStrategy {
        if use_pruning {
            SearchStrategy::AlphaBeta
        } else {
            SearchStrategy::Negamax
        }
    }
}

impl Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStrategy::Negamax => write!(f, "negamax"),
            SearchStrategy::AlphaBeta => write!(f, "alpha-beta"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub leaf_nodes: u64,
    pub cutoffs: u64,
    pub king_captures: u64,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Move,
    /// From the point of view of the side to move at the root
    pub score: i32,
    pub depth: u8,
    pub stats: SearchStats,
}

pub struct Searcher<'a> {
    position: &'a Position,
    strategy: SearchStrategy,
    pub stats: SearchStats,
}

impl<'a> Searcher<'a> {
    pub fn new(position: &'a Position, strategy: SearchStrategy) -> Self {
        Self {
            position,
            strategy,
            stats: SearchStats::default(),
        }
    }

    /// Searches `draft` plies deep and returns the best move for the side to move, or `None` if it
    /// has no moves or the game is over.
    pub fn search(&mut self, draft: u8) -> Option<SearchResult> {
        let draft = if draft == 0 {
            warn!("Search requested with depth 0, searching depth 1 instead");
            1
        } else {
            draft
        };

        let start_time = Instant::now();
        let moves = generate_moves(self.position);
        if moves.is_empty() {
            info!("{} has no moves to search", self.position.side_to_move);
            return None;
        }

        let mut alpha = -INFINITY;
        let mut best_value = -INFINITY;
        let mut best_move = None;
        self.stats.nodes += 1;

        for r#move in moves {
            if self.position.captures_king(&r#move) {
                self.stats.king_captures += 1;
                best_value = KING_CAPTURE_VALUE + draft as i32;
                best_move = Some(r#move);
                break;
            }

            let mut child = self.position.clone();
            child.make_move(&r#move);

            let result = match self.strategy {
                SearchStrategy::Negamax => -self.negamax(&child, draft - 1),
                SearchStrategy::AlphaBeta => -self.alpha_beta(&child, -INFINITY, -alpha, draft - 1),
            };

            debug!("root move {} scored {}", r#move, result);

            if result > best_value {
                best_value = result;
                best_move = Some(r#move);
                if result > alpha {
                    alpha = result;
                }
            }
        }

        let best_move = best_move?;
        let elapsed = start_time.elapsed();
        let nps = self.stats.nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        info!(
            "{} depth {draft} score {best_value} bestmove {best_move} nodes {} nps {} time {elapsed:#?}",
            self.strategy,
            self.stats.nodes.to_formatted_string(&Locale::en),
            (nps as u64).to_formatted_string(&Locale::en)
        );

        Some(SearchResult {
            best_move,
            score: best_value,
            depth: draft,
            stats: self.stats.clone(),
        })
    }

    fn negamax(&mut self, position: &Position, draft: u8) -> i32 {
        self.stats.nodes += 1;

        if draft == 0 || position.game_over {
            self.stats.leaf_nodes += 1;
            return position.evaluate_side_to_move_relative();
        }

        let moves = generate_moves(position);
        if moves.is_empty() {
            self.stats.leaf_nodes += 1;
            return position.evaluate_side_to_move_relative();
        }

        let mut best_value = -INFINITY;
        for r#move in moves {
            if position.captures_king(&r#move) {
                self.stats.king_captures += 1;
                return KING_CAPTURE_VALUE + draft as i32;
            }

            let mut child = position.clone();
            child.make_move(&r#move);

            let result = -self.negamax(&child, draft - 1);
            if result > best_value {
                best_value = result;
            }
        }

        best_value
    }

    /// Fail-soft, so a score outside the window is still a bound on the true score
    fn alpha_beta(&mut self, position: &Position, mut alpha: i32, beta: i32, draft: u8) -> i32 {
        self.stats.nodes += 1;

        if draft == 0 || position.game_over {
            self.stats.leaf_nodes += 1;
            return position.evaluate_side_to_move_relative();
        }

        let moves = generate_moves(position);
        if moves.is_empty() {
            self.stats.leaf_nodes += 1;
            return position.evaluate_side_to_move_relative();
        }

        let mut best_value = -INFINITY;
        for r#move in moves {
            if position.captures_king(&r#move) {
                self.stats.king_captures += 1;
                return KING_CAPTURE_VALUE + draft as i32;
            }

            let mut child = position.clone();
            child.make_move(&r#move);

            let result = -self.alpha_beta(&child, -beta, -alpha, draft - 1);

            if result > best_value {
                best_value = result;
                if result > alpha {
                    alpha = result;
                }
            }

            if result >= beta {
                self.stats.cutoffs += 1;
                return best_value;
            }
        }

        best_value
    }
}

impl Position {
    /// The move the engine would play, with [MinichessError::NoLegalMoves] when there is none.
    pub fn engine_move(&self, draft: u8, strategy: SearchStrategy) -> Result<Move, MinichessError> {
        Searcher::new(self, strategy)
            .search(draft)
            .map(|result| result.best_move)
            .ok_or(MinichessError::NoLegalMoves {
                side: self.side_to_move,
            })
    }
}
