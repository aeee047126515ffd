use std::{path::PathBuf, time::SystemTime};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, info, warn};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use fox_minichess::{
    Color, DEFAULT_DEPTH, MinichessError, Position, STARTING_LAYOUT, SearchStrategy, Searcher,
    bench::bench,
    imcs::{DEFAULT_HOST, DEFAULT_PORT, ImcsClient, play_game},
};

#[derive(Parser, Debug)]
#[command(name = "fox-minichess", version, about = "5x6 minichess engine and IMCS client")]
struct Cli {
    /// Minimum level written to the log
    #[arg(long, global = true, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// Also append the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Offer a game on the server and play it
    Offer(ServerArgs),
    /// Accept an offered game and play it
    Accept {
        game_id: String,
        #[command(flatten)]
        server: ServerArgs,
    },
    /// Let the engine play both sides
    Selfplay {
        #[arg(long, default_value_t = STARTING_LAYOUT.to_string())]
        layout: String,
        #[command(flatten)]
        engine: EngineArgs,
        /// Random plies played before the engine takes over
        #[arg(long, default_value_t = 0)]
        random_plies: u16,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
    /// Print the engine move for a layout
    Best {
        #[arg(long, default_value_t = STARTING_LAYOUT.to_string())]
        layout: String,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Count leaf nodes of the move tree for depths 1 through `depth`
    Perft {
        #[arg(long, default_value_t = STARTING_LAYOUT.to_string())]
        layout: String,
        #[arg(long, default_value_t = 4)]
        depth: u8,
        /// Print counts per root move
        #[arg(long)]
        divide: bool,
    },
    /// Search the bench suite with both strategies
    Bench {
        #[arg(long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,

    /// Search with plain negamax instead of alpha-beta
    #[arg(long)]
    no_pruning: bool,
}

impl EngineArgs {
    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::from_pruning(!self.no_pruning)
    }
}

#[derive(Args, Debug)]
struct ServerArgs {
    #[arg(long, default_value_t = DEFAULT_HOST.to_string())]
    host: String,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
    /// Color to ask for, w or b. The server picks when left out.
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,
    #[command(flatten)]
    engine: EngineArgs,
}

fn parse_color(text: &str) -> Result<Color, String> {
    match text {
        "w" | "W" | "white" => Ok(Color::White),
        "b" | "B" | "black" => Ok(Color::Black),
        _ => Err(format!("expected w or b but got '{text}'")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.log_level, cli.log_file.as_ref())?;
    log_panics::init();

    match cli.command {
        Command::Offer(server) => {
            let mut client = ImcsClient::connect(&server.host, server.port)?;
            client.login(&server.username, &server.password)?;
            let color = client.offer(server.color)?;
            let position = play_game(&mut client, color, server.engine.depth, server.engine.strategy())?;
            println!("{position}");
        }
        Command::Accept { game_id, server } => {
            let mut client = ImcsClient::connect(&server.host, server.port)?;
            client.login(&server.username, &server.password)?;
            let color = client.accept(&game_id, server.color)?;
            let position = play_game(&mut client, color, server.engine.depth, server.engine.strategy())?;
            println!("{position}");
        }
        Command::Selfplay {
            layout,
            engine,
            random_plies,
            seed,
        } => self_play(&layout, &engine, random_plies, seed)?,
        Command::Best { layout, engine } => {
            let position = parse_layout(&layout)?;
            match Searcher::new(&position, engine.strategy()).search(engine.depth) {
                Some(result) => println!("{} {}", result.best_move, result.score),
                None => println!("none"),
            }
        }
        Command::Perft { layout, depth, divide } => {
            let position = parse_layout(&layout)?;
            for d in 1..=depth {
                let stats = position.start_perft(d, divide);
                println!("depth {d}: {}", stats.nodes);
            }
        }
        Command::Bench { depth } => {
            if !bench(depth) {
                bail!("negamax and alpha-beta chose different moves");
            }
        }
    }

    Ok(())
}

fn parse_layout(layout: &str) -> Result<Position> {
    Position::from_layout(layout).map_err(|e| anyhow!("invalid layout '{layout}': {e}"))
}

fn self_play(layout: &str, engine: &EngineArgs, random_plies: u16, seed: u64) -> Result<()> {
    let mut position = parse_layout(layout)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ply = 0;

    println!("{position}");
    while position.has_legal_moves() {
        let r#move = if ply < random_plies {
            match position.legal_moves().choose(&mut rng) {
                Some(m) => *m,
                None => break,
            }
        } else {
            match position.engine_move(engine.depth, engine.strategy()) {
                Ok(m) => m,
                Err(MinichessError::NoLegalMoves { side }) => {
                    warn!("{side} has no moves");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        };

        position.apply_move(r#move)?;
        ply += 1;
        println!("{} {}\n{position}", position.side_to_move().opposite(), r#move);
    }

    match (position.is_game_over(), position.winner()) {
        (true, Some(winner)) => println!("{winner} wins"),
        (true, None) => println!("draw"),
        (false, _) => println!("{} cannot move", position.side_to_move()),
    }
    info!("Self play finished after {ply} plies");

    Ok(())
}

fn setup_logger(level: LevelFilter, log_file: Option<&PathBuf>) -> Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_millis(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        let file = fern::log_file(path).with_context(|| format!("opening log file {}", path.display()))?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().context("installing the logger")?;
    Ok(())
}
