//! Tak-Rust: a small Tak engine.
//!
//! ## Usage
//!
//! - `tak-rust` - Let the engine play itself for a few plies
//! - `tak-rust pipe` - Answer TBG positions on stdin for a tournament referee
//! - `tak-rust play` - Play white against the engine on the terminal
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tak_rust::board::{Board, GameResult};
use tak_rust::command::Command;
use tak_rust::constants::{DEFAULT_DEPTH, WHITE};
use tak_rust::movegen::Move;
use tak_rust::player::{Player, SearchPlayer};
use tak_rust::protocol::PipeEngine;
use tak_rust::search::Searcher;

/// Tak-Rust: a small negamax Tak engine
#[derive(Parser)]
#[command(name = "tak-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Search depth in plies
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,

    /// Seed for the tie-break generator
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer positions from a tournament referee on stdin/stdout
    Pipe,
    /// Play white against the engine
    Play,
    /// Let the engine play itself for a few plies
    Demo {
        /// Number of plies to play
        #[arg(short, long, default_value_t = 8)]
        plies: u32,
    },
}

impl Cli {
    fn searcher(&self) -> Searcher {
        match self.seed {
            Some(seed) => Searcher::with_seed(self.depth, seed),
            None => Searcher::new(self.depth),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = SearchPlayer::new(cli.searcher());

    match cli.command {
        Some(Commands::Pipe) => PipeEngine::new(engine).run(),
        Some(Commands::Play) => run_game(HumanPlayer::new(), engine),
        Some(Commands::Demo { plies }) => run_demo(engine, plies),
        None => run_demo(engine, 8),
    }
}

/// Reads moves in the command grammar from the terminal.
struct HumanPlayer {
    input: io::StdinLock<'static>,
}

impl HumanPlayer {
    fn new() -> Self {
        Self {
            input: io::stdin().lock(),
        }
    }
}

impl Player for HumanPlayer {
    fn name(&self) -> &str {
        "human"
    }

    fn propose_move(&mut self, board: &Board) -> Option<Move> {
        loop {
            print!("move> ");
            io::stdout().flush().ok()?;

            let mut line = String::new();
            if self.input.read_line(&mut line).ok()? == 0 {
                return None;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.parse::<Command>().and_then(|cmd| cmd.resolve(board)) {
                Ok(mv) => return Some(mv),
                Err(err) => println!("{err}"),
            }
        }
    }
}

fn run_game(mut white: impl Player, mut black: impl Player) -> Result<()> {
    let mut board = Board::new();
    println!("{board}\n");

    while !board.is_terminal() {
        let player: &mut dyn Player = if board.turn == WHITE {
            &mut white
        } else {
            &mut black
        };

        let Some(mv) = player.propose_move(&board) else {
            warn!(player = player.name(), "no move, stopping");
            return Ok(());
        };
        mv.apply(&mut board);
        println!("{} plays {mv}\n{board}\n", player.name());
    }

    announce(&board);
    Ok(())
}

fn run_demo(mut engine: impl Player, plies: u32) -> Result<()> {
    println!("Tak-Rust: negamax engine self-play\n");

    let mut board = Board::new();
    for _ in 0..plies {
        let Some(mv) = engine.propose_move(&board) else {
            break;
        };
        mv.apply(&mut board);
        println!("{mv}");
    }
    println!("\n{board}");

    let round_trip: Board = board
        .to_tbg()
        .parse()
        .context("engine produced an unreadable encoding")?;
    info!(ok = round_trip == board, "encoding round trip");

    announce(&board);
    Ok(())
}

fn announce(board: &Board) {
    match board.game_result() {
        Some(GameResult::WhiteWin) => println!("White wins"),
        Some(GameResult::BlackWin) => println!("Black wins"),
        Some(GameResult::Draw) => println!("Draw"),
        None => {}
    }
}
