//! Tak-Rust: a small Tak engine.
//!
//! The engine precomputes every move shape the board allows once, checks
//! and plays them against a single mutable board, and searches with
//! fixed-depth negamax over a material and road-distance evaluation.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, reserves and engine parameters
//! - [`stack`] - A pile of pieces on one square
//! - [`board`] - Game state, square naming, hashing and game end
//! - [`movegen`] - The move catalog and reversible moves
//! - [`eval`] - Material and road-distance evaluation
//! - [`search`] - Negamax with alpha-beta pruning
//! - [`tbg`] - Textual board encoding
//! - [`command`] - Human move commands
//! - [`player`] - Move-proposing players
//! - [`protocol`] - Pipe tournament protocol
//!
//! ## Example
//!
//! ```
//! use tak_rust::board::Board;
//! use tak_rust::search::Searcher;
//!
//! let mut board = Board::new();
//! let mut searcher = Searcher::with_seed(1, 42);
//!
//! let outcome = searcher.pick_best_move(&board);
//! let mv = outcome.best_move.unwrap();
//! mv.apply(&mut board);
//!
//! println!("Played {mv}");
//! println!("{}", board.to_tbg());
//! ```

pub mod board;
pub mod command;
pub mod constants;
pub mod eval;
pub mod movegen;
pub mod player;
pub mod protocol;
pub mod search;
pub mod stack;
pub mod tbg;
