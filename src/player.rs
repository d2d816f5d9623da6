//! Move-proposing players.
//!
//! The engine only needs something that can look at a board and propose a
//! move. The search-driven player lives here; interactive players are thin
//! wrappers in the binary.

use tracing::info;

use crate::board::Board;
use crate::movegen::Move;
use crate::search::Searcher;

pub trait Player {
    fn name(&self) -> &str;

    /// A legal move for the side to move, or `None` if the game is over.
    fn propose_move(&mut self, board: &Board) -> Option<Move>;
}

/// Player backed by the negamax searcher.
pub struct SearchPlayer {
    searcher: Searcher,
}

impl SearchPlayer {
    pub fn new(searcher: Searcher) -> Self {
        Self { searcher }
    }
}

impl Player for SearchPlayer {
    fn name(&self) -> &str {
        "negamax"
    }

    fn propose_move(&mut self, board: &Board) -> Option<Move> {
        let outcome = self.searcher.pick_best_move(board);
        if let Some(mv) = outcome.best_move {
            info!(
                move_number = board.move_number,
                mv = %mv,
                depth = self.searcher.depth(),
                score = outcome.score,
                nodes = outcome.nodes,
                cutoffs = outcome.cutoffs,
                "engine move"
            );
        }
        outcome.best_move
    }
}
