//! Static position evaluation.
//!
//! Scores are from white's point of view: positive favours white. The total
//! combines a per-square material term with a road-progress term computed as
//! a shortest path over a cost field (own flats and capstones are free, own
//! walls cost [`WALL_ROAD_COST`], everything else costs 1).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::board::{Board, Square, coords, square};
use crate::constants::{
    BLACK, CAP_POSITIONAL_FACTOR, CAPTIVE_PENALTY, CENTER_PENALTY, FLAT_VALUE, HARD_CAP_BONUS,
    LATE_GAME_RESERVES, LATE_MATERIAL_WEIGHT, N, NEIGHBOR_BONUS, PIECE_FLAT,
    PIECE_WALL, RANGE_OWN_FACTOR, RANGE_WEIGHT, ROAD_WEIGHT, SQUARES, WALL_ROAD_COST, WHITE,
};

/// Road distances of one colour in both directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoadDistance {
    /// Cheapest connection from the top row to the bottom row.
    pub vertical: u32,
    /// Cheapest connection from the left column to the right column.
    pub horizontal: u32,
}

impl RoadDistance {
    #[inline]
    pub fn min(self) -> u32 {
        self.vertical.min(self.horizontal)
    }
}

/// Orthogonal neighbours of a square.
fn neighbors(sq: Square) -> impl Iterator<Item = Square> {
    let (x, y) = coords(sq);
    let mut out = [None; 4];
    if x > 0 {
        out[0] = Some(square(x - 1, y));
    }
    if x + 1 < N {
        out[1] = Some(square(x + 1, y));
    }
    if y > 0 {
        out[2] = Some(square(x, y - 1));
    }
    if y + 1 < N {
        out[3] = Some(square(x, y + 1));
    }
    out.into_iter().flatten()
}

/// Material score of the whole board.
pub fn material(board: &Board) -> f64 {
    let center = (N - 1) as f64 / 2.0;
    let mut score = 0.0;

    for (sq, st) in board.stacks.iter().enumerate() {
        let top = st.top();
        if top == 0 {
            continue;
        }
        let color = top.signum();
        let kind = top.abs();

        let own = st.color_count(color) as f64;
        let captives = st.color_count(-color) as f64;

        // Range: how much of the stack this colour commands.
        let mut positional = (own * RANGE_OWN_FACTOR - captives) * RANGE_WEIGHT;
        positional -= captives * CAPTIVE_PENALTY;

        let friends = neighbors(sq)
            .filter(|&n| board.stacks[n].top() * top > 0)
            .count();
        positional += friends as f64 * NEIGHBOR_BONUS;

        let (x, y) = coords(sq);
        positional -= ((x as f64 - center).abs() + (y as f64 - center).abs()) * CENTER_PENALTY;

        let value = match kind {
            PIECE_FLAT => FLAT_VALUE + positional,
            PIECE_WALL => positional,
            _ => {
                let mut v = positional * CAP_POSITIONAL_FACTOR;
                if st.size() >= 2 && st.color_at(st.size() - 2) == color {
                    v += HARD_CAP_BONUS;
                }
                v
            }
        };

        score += value * color as f64;
    }

    score
}

fn road_cost(board: &Board, sq: Square, color: i8) -> u32 {
    let top = board.stacks[sq].top();
    if top * color <= 0 {
        1
    } else if top.abs() == PIECE_WALL {
        WALL_ROAD_COST
    } else {
        0
    }
}

/// Multi-source Dijkstra from `sources` to the nearest of `targets`.
fn shortest_path(costs: &[u32; SQUARES], sources: &[Square], targets: &[Square]) -> u32 {
    let mut dist = [u32::MAX; SQUARES];
    let mut heap = BinaryHeap::with_capacity(SQUARES);

    for &sq in sources {
        dist[sq] = costs[sq];
        heap.push(Reverse((costs[sq], sq)));
    }

    while let Some(Reverse((d, sq))) = heap.pop() {
        if d > dist[sq] {
            continue;
        }
        if targets.contains(&sq) {
            return d;
        }
        for n in neighbors(sq) {
            let nd = d + costs[n];
            if nd < dist[n] {
                dist[n] = nd;
                heap.push(Reverse((nd, n)));
            }
        }
    }

    u32::MAX
}

/// Road distances of `color`. A distance of 0 is a completed road.
pub fn road_distances(board: &Board, color: i8) -> RoadDistance {
    let costs: [u32; SQUARES] = std::array::from_fn(|sq| road_cost(board, sq, color));

    let top: [Square; N] = std::array::from_fn(|x| square(x, 0));
    let bottom: [Square; N] = std::array::from_fn(|x| square(x, N - 1));
    let left: [Square; N] = std::array::from_fn(|y| square(0, y));
    let right: [Square; N] = std::array::from_fn(|y| square(N - 1, y));

    RoadDistance {
        vertical: shortest_path(&costs, &top, &bottom),
        horizontal: shortest_path(&costs, &left, &right),
    }
}

/// Shorter of the two road distances of `color`.
#[inline]
pub fn road_distance(board: &Board, color: i8) -> u32 {
    road_distances(board, color).min()
}

/// Whether the game has reached its late phase.
#[inline]
pub fn is_late_game(board: &Board) -> bool {
    board.reserves.iter().any(|&r| r < LATE_GAME_RESERVES)
}

/// Full static evaluation from white's point of view.
pub fn evaluate(board: &Board) -> f64 {
    let white = road_distances(board, WHITE);
    let black = road_distances(board, BLACK);

    // Progress is how far each colour is below the board width, per direction.
    let progress = |d: RoadDistance| {
        (N as f64 - d.vertical as f64) + (N as f64 - d.horizontal as f64)
    };
    let road = progress(white) - progress(black);

    let material_weight = if is_late_game(board) {
        LATE_MATERIAL_WEIGHT
    } else {
        1.0
    };

    road * ROAD_WEIGHT + material(board) * material_weight
}
