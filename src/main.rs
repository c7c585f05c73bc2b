//! Tetress agent command line.
//!
//! ## Usage
//!
//! - `tetress-agent` - Show a demo
//! - `tetress-agent selfplay` - Play a full game between two agents
//! - `tetress-agent demo` - Run the search demo
//!
//! Logging is controlled through `RUST_LOG`, e.g.
//! `RUST_LOG=tetress_agent=debug tetress-agent selfplay`.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tetress_agent::agent::{AgentConfig, Strategy};
use tetress_agent::board::{Board, PlayerColor};
use tetress_agent::constants::MAX_GAME_TURNS;
use tetress_agent::mcts::{MctsConfig, SearchTree};
use tetress_agent::moves::possible_moves;
use tetress_agent::referee::{run_match, MatchConfig};

/// Tetress: a tetromino-placement game agent
#[derive(Parser)]
#[command(name = "tetress-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a complete game between two configured agents
    Selfplay {
        /// Red's strategy
        #[arg(long, value_enum, default_value = "hybrid")]
        red: StrategyArg,
        /// Blue's strategy
        #[arg(long, value_enum, default_value = "hybrid")]
        blue: StrategyArg,
        /// RNG seed shared by both agents (Blue uses seed + 1)
        #[arg(long)]
        seed: Option<u64>,
        /// Ply cap before the cell-count tiebreak
        #[arg(long, default_value_t = MAX_GAME_TURNS)]
        max_turns: u32,
        /// Per-move MCTS budget in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,
        /// Total clock per player in seconds (untimed when omitted)
        #[arg(long)]
        clock_secs: Option<u64>,
        /// Random moves each agent plays after its opening
        #[arg(long, default_value_t = 0)]
        random_warmup: u32,
    },
    /// Run a short demo of the move generator and the search
    Demo,
}

/// CLI-facing mirror of [`Strategy`]; the library stays clap-free.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Minimax,
    MonteCarlo,
    Hybrid,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Minimax => Strategy::Minimax,
            StrategyArg::MonteCarlo => Strategy::MonteCarlo,
            StrategyArg::Hybrid => Strategy::Hybrid,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Selfplay {
            red,
            blue,
            seed,
            max_turns,
            time_limit_ms,
            clock_secs,
            random_warmup,
        }) => {
            let agent_config = |strategy: StrategyArg, seed: Option<u64>| {
                let mut config = AgentConfig {
                    strategy: strategy.into(),
                    random_warmup,
                    seed,
                    ..AgentConfig::default()
                };
                if let Some(ms) = time_limit_ms {
                    config.mcts.time_limit = Duration::from_millis(ms);
                }
                config
            };

            let outcome = run_match(MatchConfig {
                red: agent_config(red, seed),
                blue: agent_config(blue, seed.map(|s| s + 1)),
                max_turns,
                clock: clock_secs.map(Duration::from_secs),
            });

            println!("{}", outcome.final_board);
            match outcome.winner {
                Some(winner) => println!(
                    "{winner} wins after {} turns ({})",
                    outcome.turns, outcome.reason
                ),
                None => println!("tie after {} turns ({})", outcome.turns, outcome.reason),
            }
        }
        Some(Commands::Demo) | None => run_demo(),
    }

    Ok(())
}

fn run_demo() {
    println!("Tetress: tetromino-placement agent\n");

    println!("=== Opening Position ===");
    let mut board = Board::new();
    board = board.apply(
        tetress_agent::agent::opening_placement(PlayerColor::Red),
        PlayerColor::Red,
    );
    board = board.apply(
        tetress_agent::agent::opening_placement(PlayerColor::Blue),
        PlayerColor::Blue,
    );
    println!("{board}");

    let red_moves = possible_moves(&board, PlayerColor::Red);
    println!("Red has {} legal placements", red_moves.len());

    println!("\n=== MCTS Demo ===");
    println!("Running 100 MCTS iterations for Red...");
    let mut tree = SearchTree::new(
        board,
        PlayerColor::Red,
        2,
        MctsConfig {
            max_rollout_turns: 30,
            ..MctsConfig::default()
        },
        fastrand::Rng::new(),
    );
    tree.run_iterations(100);
    if let Some(best) = tree.best_placement(PlayerColor::Red) {
        println!("Best placement: {best}");
    }
    println!("Root visits: {}", tree.root().n);
}
