use std::time::Instant;

use log::{error, info};
use num_format::{Locale, ToFormattedString};

use crate::{
    position::Position,
    search::{SearchStrategy, Searcher},
};

pub static BENCH_LAYOUTS: [&str; 12] = [
    "kqbnr/ppppp/...../...../PPPPP/RNBQK w 1",
    "kqbnr/pp.pp/...../..p../PPP.P/R.BQK w 3",
    "kqb.r/ppppp/...n./..N../PPPPP/R.BQK w 2",
    "k.bnr/p.ppp/.p.../.q.../P.PPP/RNBQK w 4",
    "kqbn./pppp./....r/....p/PPPPP/RNBQK b 5",
    "k...q/.pp../...../...../..PP./....K w 12",
    "k..../..P../...../...../...../....K w 30",
    "q...k/...../...../...../....R/R...K w 18",
    "..b.k/.p.p./p.n../..P.P/PP.B./K.R.. b 21",
    "kr.../pp.../..n../..N../...PP/...RK w 25",
    ".k.../..q../.p.p./.P.P./..Q../...K. w 33",
    "....K/...../...../...../...../k...q b 39",
];

/// Searches every bench layout with both strategies and reports the combined node count.
/// Returns false if the strategies ever picked different moves.
pub fn bench(depth: u8) -> bool {
    let mut nodes = [0u64; 2];
    let mut agreed = true;
    let start_time = Instant::now();

    for layout in BENCH_LAYOUTS {
        let position = match Position::from_layout(layout) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to parse bench layout '{layout}': {e}");
                agreed = false;
                continue;
            }
        };

        let mut best_moves = [None, None];
        for (i, strategy) in [SearchStrategy::Negamax, SearchStrategy::AlphaBeta].into_iter().enumerate() {
            let mut searcher = Searcher::new(&position, strategy);
            best_moves[i] = searcher.search(depth).map(|result| result.best_move);
            nodes[i] += searcher.stats.nodes;
        }

        if best_moves[0] != best_moves[1] {
            error!(
                "Strategies disagree on '{layout}': negamax {:?} alpha-beta {:?}",
                best_moves[0], best_moves[1]
            );
            agreed = false;
        }
    }

    let elapsed = start_time.elapsed();
    let total = nodes[0] + nodes[1];
    let nps = total as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    info!(
        "negamax nodes {} alpha-beta nodes {}",
        nodes[0].to_formatted_string(&Locale::en),
        nodes[1].to_formatted_string(&Locale::en)
    );
    println!("Nodes: {total} NPS: {nps:.0} Time: {elapsed:#?}");

    agreed
}

#[cfg(test)]
mod bench_tests {
    use super::*;

    #[test]
    pub fn bench_layouts_parse() {
        for layout in BENCH_LAYOUTS {
            assert!(Position::from_layout(layout).is_ok(), "{layout}");
        }
    }

    #[test]
    pub fn strategies_agree_on_the_bench_suite() {
        assert!(bench(3));
    }
}
