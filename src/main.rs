use std::time::Duration;

use clap::Parser;
use engine::agent::EngineAgent;
use engine::constant::{MAX_DEPTH, MIN_DEPTH, THINK_TIME_MS};
use engine::search::{SearchConfig, TieBreak};
use tracing_subscriber::EnvFilter;

mod game;

/// Plays one engine-vs-engine Escampe game and prints the final board.
#[derive(Parser, Debug)]
#[command(name = "escampe", version, about, long_about = None)]
struct Args {
    /// Deepest iterative-deepening pass
    #[arg(long, default_value_t = MAX_DEPTH)]
    depth: i32,

    /// First iterative-deepening pass
    #[arg(long, default_value_t = MIN_DEPTH)]
    min_depth: i32,

    /// Thinking time per move in milliseconds
    #[arg(long, default_value_t = THINK_TIME_MS)]
    time_ms: u64,

    /// Plies before the game is drawn
    #[arg(long, default_value_t = game::MAX_PLIES)]
    max_plies: usize,

    /// Break score ties randomly from this seed
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn config(&self, offset: u64) -> SearchConfig {
        SearchConfig {
            min_depth: self.min_depth,
            max_depth: self.depth,
            think_time: Duration::from_millis(self.time_ms),
            tie_break: match self.seed {
                Some(seed) => TieBreak::Random {
                    seed: seed.wrapping_add(offset),
                },
                None => TieBreak::FirstFound,
            },
            ..SearchConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        args.min_depth >= 1 && args.depth >= args.min_depth,
        "depth range {}..={} is empty",
        args.min_depth,
        args.depth
    );

    let first = EngineAgent::new("first", args.config(0));
    let second = EngineAgent::new("second", args.config(1));
    let mut game = game::Match::new(Box::new(first), Box::new(second), args.max_plies);
    let outcome = game.run();

    print!("{}", game.board());
    println!("{} after {} plies", outcome, game.history().len());
    Ok(())
}
