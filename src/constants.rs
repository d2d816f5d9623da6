//! Constants for board geometry, piece reserves, evaluation and search.
//!
//! The board is a flat array of `N * N` stacks, indexed `x + y * N` with
//! row 0 at the top. Every precomputed table in the crate is sized from
//! these values at compile time.
//!
//! # Board Size Configuration
//!
//! The board size is controlled by Cargo features:
//! - `board5x5` (default): 5x5 board, 21 stones and 1 capstone per side
//! - `board6x6`: 6x6 board, 30 stones and 1 capstone per side
//!
//! ```sh
//! cargo build                                             # 5x5 (default)
//! cargo build --no-default-features --features board6x6   # 6x6
//! ```

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Also the carry limit of a split.
#[cfg(feature = "board5x5")]
pub const N: usize = 5;

#[cfg(feature = "board6x6")]
pub const N: usize = 6;

#[cfg(all(feature = "board5x5", feature = "board6x6"))]
compile_error!("Cannot enable both 'board5x5' and 'board6x6' features at the same time");

#[cfg(not(any(feature = "board5x5", feature = "board6x6")))]
compile_error!("Must enable exactly one board size feature: 'board5x5' or 'board6x6'");

/// Number of squares on the board.
pub const SQUARES: usize = N * N;

/// Stones (flats and walls share one pool) each side starts with.
#[cfg(feature = "board5x5")]
pub const STARTING_STONES: u8 = 21;

#[cfg(feature = "board6x6")]
pub const STARTING_STONES: u8 = 30;

/// Capstones each side starts with.
pub const STARTING_CAPSTONES: u8 = 1;

/// Tallest stack the colour bitmap can hold.
pub const MAX_STACK_HEIGHT: usize = 64;

const _: () = assert!(
    2 * (STARTING_STONES as usize + STARTING_CAPSTONES as usize) <= MAX_STACK_HEIGHT,
    "every piece in the game must fit in a single stack"
);

// =============================================================================
// Pieces
// =============================================================================

/// A piece is `kind * color`, with white = +1 and black = -1.
pub type Piece = i8;

pub const PIECE_FLAT: Piece = 1;
pub const PIECE_WALL: Piece = 2;
pub const PIECE_CAP: Piece = 3;

pub const WHITE: i8 = 1;
pub const BLACK: i8 = -1;

// =============================================================================
// Evaluation Weights
// =============================================================================

/// Base value of a flat on top of a stack. Walls and capstones get none.
pub const FLAT_VALUE: f64 = 1.0;

/// Scale applied to the range term `(own * RANGE_OWN_FACTOR - opposing)`.
pub const RANGE_WEIGHT: f64 = 0.3;

/// Own pieces count slightly more than opposing ones in the range term.
pub const RANGE_OWN_FACTOR: f64 = 1.3;

/// Penalty per opposing piece held captive under a top.
pub const CAPTIVE_PENALTY: f64 = 0.05;

/// Bonus per orthogonal neighbour topped by the same colour.
pub const NEIGHBOR_BONUS: f64 = 0.2;

/// Bonus for a capstone sitting directly on a piece of its own colour.
pub const HARD_CAP_BONUS: f64 = 2.0;

/// Multiplier on the positional value of a capstone.
pub const CAP_POSITIONAL_FACTOR: f64 = 1.5;

/// Penalty per step of Manhattan distance from the centre.
pub const CENTER_PENALTY: f64 = 0.075;

/// Weight of the road-progress term.
pub const ROAD_WEIGHT: f64 = 4.0;

/// Material weight once the game reaches its late phase.
pub const LATE_MATERIAL_WEIGHT: f64 = 2.0;

/// The game is in its late phase once either stone reserve drops below this.
pub const LATE_GAME_RESERVES: u8 = 5;

/// Cost of crossing one of our own walls in the road metric.
pub const WALL_ROAD_COST: u32 = 2;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default negamax depth in plies.
pub const DEFAULT_DEPTH: u8 = 3;

/// Score of a decided game, scaled by remaining depth so faster wins rank higher.
pub const WIN_SCORE: f64 = 1_000_000.0;

/// Remaining depth from which moves are pre-sorted by static evaluation.
pub const ORDERING_MIN_DEPTH: u8 = 2;

/// Root window margin; keeps equal-scored siblings exact for the tie-break.
pub const ROOT_TIE_MARGIN: f64 = 1e-6;
