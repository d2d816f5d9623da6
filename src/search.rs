//! Fixed-depth negamax with alpha-beta pruning.
//!
//! The search walks the move catalog against a single mutable board,
//! applying and reverting each move in place. Scores are always from the
//! perspective of the side to move at the node being scored.

use tracing::debug;

use crate::board::{Board, GameResult};
use crate::constants::{ORDERING_MIN_DEPTH, ROOT_TIE_MARGIN, WIN_SCORE};
use crate::eval::evaluate;
use crate::movegen::Move;

/// Result of a root search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Chosen move, `None` when the position is already decided.
    pub best_move: Option<Move>,
    /// Score of the chosen move for the side to move.
    pub score: f64,
    /// Nodes visited.
    pub nodes: u64,
    /// Beta cutoffs taken.
    pub cutoffs: u64,
    /// Number of root moves sharing the best score.
    pub ties: usize,
}

/// Negamax searcher with its own tie-break generator.
pub struct Searcher {
    depth: u8,
    rng: fastrand::Rng,
    nodes: u64,
    cutoffs: u64,
    /// One move list per remaining depth, reused across nodes.
    buffers: Vec<Vec<Move>>,
}

impl Searcher {
    pub fn new(depth: u8) -> Self {
        Self::with_rng(depth, fastrand::Rng::new())
    }

    /// A searcher whose tie-breaks are reproducible.
    pub fn with_seed(depth: u8, seed: u64) -> Self {
        Self::with_rng(depth, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(depth: u8, rng: fastrand::Rng) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            rng,
            nodes: 0,
            cutoffs: 0,
            buffers: vec![Vec::new(); depth as usize],
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Search `board` to the configured depth and pick a move.
    ///
    /// Moves whose exact score equals the best are chosen between uniformly
    /// at random.
    pub fn pick_best_move(&mut self, board: &Board) -> SearchOutcome {
        self.nodes = 0;
        self.cutoffs = 0;

        let mut tmp = board.clone();
        let mut moves = tmp.legal_moves();
        if tmp.is_terminal() || moves.is_empty() {
            return SearchOutcome {
                best_move: None,
                score: leaf_score(&tmp, tmp.game_result(), self.depth),
                nodes: 0,
                cutoffs: 0,
                ties: 0,
            };
        }

        if self.depth >= ORDERING_MIN_DEPTH {
            order_moves(&mut tmp, &mut moves);
        }

        let mut best_score = f64::NEG_INFINITY;
        let mut best: Vec<Move> = Vec::new();

        for mv in moves {
            // Searching just below the best keeps equal scores exact.
            let alpha = if best.is_empty() {
                f64::NEG_INFINITY
            } else {
                best_score - ROOT_TIE_MARGIN
            };

            mv.apply(&mut tmp);
            self.nodes += 1;
            let score = -self.negamax(&mut tmp, self.depth - 1, f64::NEG_INFINITY, -alpha);
            mv.revert(&mut tmp);

            if score > best_score {
                best_score = score;
                best.clear();
                best.push(mv);
            } else if score == best_score {
                best.push(mv);
            }
        }

        let choice = best[self.rng.usize(..best.len())];
        debug!(
            mv = %choice,
            score = best_score,
            nodes = self.nodes,
            cutoffs = self.cutoffs,
            ties = best.len(),
            "search finished"
        );

        SearchOutcome {
            best_move: Some(choice),
            score: best_score,
            nodes: self.nodes,
            cutoffs: self.cutoffs,
            ties: best.len(),
        }
    }

    fn negamax(&mut self, board: &mut Board, depth: u8, mut alpha: f64, beta: f64) -> f64 {
        let result = board.game_result();
        if result.is_some() || depth == 0 {
            return leaf_score(board, result, depth);
        }

        let mut moves = std::mem::take(&mut self.buffers[depth as usize - 1]);
        board.legal_moves_into(&mut moves);
        if moves.is_empty() {
            self.buffers[depth as usize - 1] = moves;
            return leaf_score(board, None, depth);
        }
        if depth >= ORDERING_MIN_DEPTH {
            order_moves(board, &mut moves);
        }

        let mut best = f64::NEG_INFINITY;
        for &mv in &moves {
            mv.apply(board);
            self.nodes += 1;
            let score = -self.negamax(board, depth - 1, -beta, -alpha);
            mv.revert(board);

            if score > best {
                best = score;
            }
            if best > alpha {
                alpha = best;
            }
            if alpha >= beta {
                self.cutoffs += 1;
                break;
            }
        }

        self.buffers[depth as usize - 1] = moves;
        best
    }
}

/// Score of a leaf for the side to move. Decided games score
/// `±WIN_SCORE` scaled by the remaining depth, so earlier wins score
/// higher; draws score 0.
fn leaf_score(board: &Board, result: Option<GameResult>, depth: u8) -> f64 {
    match result {
        Some(result) => (result.sign() * board.turn) as f64 * WIN_SCORE * (depth as f64 + 1.0),
        None => board.turn as f64 * evaluate(board),
    }
}

/// Sort moves by the static evaluation of their successor, best for the
/// mover first.
fn order_moves(board: &mut Board, moves: &mut [Move]) {
    let mover = board.turn as f64;
    let mut scored: Vec<(f64, Move)> = moves
        .iter()
        .map(|&mv| {
            mv.apply(board);
            let s = mover * evaluate(board);
            mv.revert(board);
            (s, mv)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    for (slot, (_, mv)) in moves.iter_mut().zip(scored) {
        *slot = mv;
    }
}
