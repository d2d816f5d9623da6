//! Precomputed move catalog and the apply/revert protocol.
//!
//! Every move shape possible on an NxN board is built once into a
//! process-wide [`MoveCatalog`] and referenced by a stable id. A [`Move`] is
//! just that id plus the hash of the board it was generated on; legality is
//! always checked against the live board with [`Template::can_apply`].
//!
//! Split templates describe carrying the top `k <= N` pieces of a stack in
//! one direction and dropping a positive number of them on each square
//! passed. The drop counts are an ordered composition of `k`, nearest square
//! first. A split whose last drop is a single piece also gets a capture
//! variant, which is how a lone capstone flattens a wall.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use crate::board::{Board, Square, color_index, coords, square, square_name};
use crate::constants::{N, PIECE_CAP, PIECE_FLAT, PIECE_WALL, Piece, SQUARES};

/// Compass direction of a split. `Up` walks towards row 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Catalog registration order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    /// Column and row step.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Squares available from `sq` before walking off the board.
    pub fn range(self, sq: Square) -> usize {
        let (x, y) = coords(sq);
        match self {
            Direction::Up => y,
            Direction::Down => N - 1 - y,
            Direction::Left => x,
            Direction::Right => N - 1 - x,
        }
    }

    /// The square `steps` away from `sq`, if it is on the board.
    pub fn step(self, sq: Square, steps: usize) -> Option<Square> {
        if steps > self.range(sq) {
            return None;
        }
        let (x, y) = coords(sq);
        let (dx, dy) = self.delta();
        let nx = x as isize + dx * steps as isize;
        let ny = y as isize + dy * steps as isize;
        Some(square(nx as usize, ny as usize))
    }

    pub fn letter(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'u' => Some(Direction::Up),
            'd' => Some(Direction::Down),
            'l' => Some(Direction::Left),
            'r' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Target squares and drop counts of a split, nearest square first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spread {
    pub direction: Direction,
    len: u8,
    targets: [u8; N],
    counts: [u8; N],
}

impl Spread {
    fn new(origin: Square, direction: Direction, drops: &[u8]) -> Self {
        debug_assert!(!drops.is_empty() && drops.len() <= direction.range(origin));
        let mut targets = [0u8; N];
        let mut counts = [0u8; N];
        for (i, &drop) in drops.iter().enumerate() {
            let Some(target) = direction.step(origin, i + 1) else {
                unreachable!("spread walks off the board");
            };
            targets[i] = target as u8;
            counts[i] = drop;
        }
        Self {
            direction,
            len: drops.len() as u8,
            targets,
            counts,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn targets(&self) -> &[u8] {
        &self.targets[..self.len()]
    }

    #[inline]
    pub fn counts(&self) -> &[u8] {
        &self.counts[..self.len()]
    }

    /// Total number of pieces picked up.
    pub fn carried(&self) -> usize {
        self.counts().iter().map(|&c| c as usize).sum()
    }

    #[inline]
    pub fn last_target(&self) -> Square {
        self.targets[self.len() - 1] as Square
    }

    #[inline]
    pub fn last_count(&self) -> usize {
        self.counts[self.len() - 1] as usize
    }
}

/// One precomputed move shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Template {
    /// Place a piece of kind `piece` (unsigned) on an empty square.
    Place { square: Square, piece: Piece },
    /// Carry and drop onto empty or flat-topped squares.
    Split { origin: Square, spread: Spread },
    /// A split whose final single-piece drop is a capstone flattening a wall.
    SplitCapture { origin: Square, spread: Spread },
}

impl Template {
    /// Whether this template is legal on the live `board`.
    pub fn can_apply(&self, board: &Board) -> bool {
        match self {
            Template::Place { square, piece } => {
                if !board.stacks[*square].is_empty() {
                    return false;
                }
                let idx = color_index(board.placement_color());
                if board.move_number < 2 {
                    return *piece == PIECE_FLAT && board.reserves[idx] > 0;
                }
                if *piece == PIECE_CAP {
                    board.capstones[idx] > 0
                } else {
                    board.reserves[idx] > 0
                }
            }
            Template::Split { origin, spread } => {
                can_carry(board, *origin, spread)
                    && board.stacks[spread.last_target()].top().abs() <= PIECE_FLAT
            }
            Template::SplitCapture { origin, spread } => {
                can_carry(board, *origin, spread)
                    && board.stacks[*origin].top().abs() == PIECE_CAP
                    && board.stacks[spread.last_target()].top().abs() == PIECE_WALL
            }
        }
    }

    /// Play the template. The caller must have checked [`Template::can_apply`].
    pub fn apply(&self, board: &mut Board) {
        let color = board.placement_color();
        board.turn = -board.turn;
        board.move_number += 1;

        match self {
            Template::Place { square, piece } => {
                board.place(*square, piece * color);
                let idx = color_index(color);
                if *piece == PIECE_CAP {
                    board.capstones[idx] -= 1;
                } else {
                    board.reserves[idx] -= 1;
                }
            }
            // Farthest drop first: it takes the top of the carried run.
            // Landing on a wall buries it, which flattens it.
            Template::Split { origin, spread } | Template::SplitCapture { origin, spread } => {
                for (&target, &count) in spread.targets().iter().zip(spread.counts()).rev() {
                    board.move_pieces(*origin, target as Square, count as usize);
                }
            }
        }
    }

    /// Exact inverse of [`Template::apply`].
    pub fn revert(&self, board: &mut Board) {
        board.move_number -= 1;
        board.turn = -board.turn;

        match self {
            Template::Place { square, piece } => {
                let idx = color_index(board.placement_color());
                board.remove(*square);
                if *piece == PIECE_CAP {
                    board.capstones[idx] += 1;
                } else {
                    board.reserves[idx] += 1;
                }
            }
            Template::Split { origin, spread } => gather(board, *origin, spread),
            Template::SplitCapture { origin, spread } => {
                gather(board, *origin, spread);
                let last = spread.last_target();
                let color = board.stacks[last].top().signum();
                board.remove(last);
                board.place(last, color * PIECE_WALL);
            }
        }
    }
}

/// Ownership, height and pass-through checks shared by both split kinds.
fn can_carry(board: &Board, origin: Square, spread: &Spread) -> bool {
    let st = &board.stacks[origin];
    if board.move_number < 2 || st.top() * board.turn <= 0 || st.size() < spread.carried() {
        return false;
    }
    let passed = &spread.targets()[..spread.len() - 1];
    passed
        .iter()
        .all(|&t| board.stacks[t as Square].top().abs() <= PIECE_FLAT)
}

/// Walk the carry back to its origin, nearest square first.
fn gather(board: &mut Board, origin: Square, spread: &Spread) {
    for (&target, &count) in spread.targets().iter().zip(spread.counts()) {
        board.move_pieces(target as Square, origin, count as usize);
    }
}

fn kind_letter(piece: Piece) -> char {
    match piece {
        PIECE_WALL => 'W',
        PIECE_CAP => 'C',
        _ => 'F',
    }
}

impl fmt::Display for Template {
    /// Formats in the human command grammar, e.g. `place C3F` or `split B2r21`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Place { square, piece } => {
                write!(f, "place {}{}", square_name(*square), kind_letter(*piece))
            }
            Template::Split { origin, spread } | Template::SplitCapture { origin, spread } => {
                write!(f, "split {}{}", square_name(*origin), spread.direction.letter())?;
                for count in spread.counts() {
                    write!(f, "{count}")?;
                }
                Ok(())
            }
        }
    }
}

/// All ordered compositions of `k` into at most `max_parts` positive parts,
/// fewest parts first.
///
/// Each of the `2^(k-1)` subsets of cut points between `k` unit pieces is one
/// composition, so the enumeration needs no recursion.
pub fn compositions(k: usize, max_parts: usize) -> Vec<Vec<u8>> {
    assert!(k >= 1, "cannot compose {k}");
    let mut out = Vec::with_capacity(1 << (k - 1));
    for cuts in 0u32..1 << (k - 1) {
        if cuts.count_ones() as usize + 1 > max_parts {
            continue;
        }
        let mut parts = Vec::with_capacity(k);
        let mut run = 1u8;
        for i in 0..k - 1 {
            if cuts >> i & 1 == 1 {
                parts.push(run);
                run = 1;
            } else {
                run += 1;
            }
        }
        parts.push(run);
        out.push(parts);
    }
    out.sort_by_key(Vec::len);
    out
}

/// Every move template for the board size, plus per-square lookup tables.
pub struct MoveCatalog {
    templates: Vec<Template>,
    /// Flat, wall and capstone placement ids per square.
    placements: [[u32; 3]; SQUARES],
    /// Split ids per square, indexed by pieces carried (index 0 unused).
    splits: Vec<[Vec<u32>; N + 1]>,
    /// Capture ids per square, indexed by pieces carried (index 0 unused).
    captures: Vec<[Vec<u32>; N + 1]>,
}

static CATALOG: OnceLock<MoveCatalog> = OnceLock::new();

/// The process-wide catalog, built on first use and read-only afterwards.
pub fn catalog() -> &'static MoveCatalog {
    CATALOG.get_or_init(MoveCatalog::build)
}

impl MoveCatalog {
    fn build() -> Self {
        let mut cat = MoveCatalog {
            templates: Vec::new(),
            placements: [[0; 3]; SQUARES],
            splits: (0..SQUARES).map(|_| std::array::from_fn(|_| Vec::new())).collect(),
            captures: (0..SQUARES).map(|_| std::array::from_fn(|_| Vec::new())).collect(),
        };

        for sq in 0..SQUARES {
            for (slot, piece) in [PIECE_FLAT, PIECE_WALL, PIECE_CAP].into_iter().enumerate() {
                cat.placements[sq][slot] = cat.register(Template::Place { square: sq, piece });
            }

            for direction in Direction::ALL {
                let range = direction.range(sq);
                if range == 0 {
                    continue;
                }
                for count in 1..=N {
                    let spreads: Vec<Spread> = compositions(count, range.min(count))
                        .iter()
                        .map(|drops| Spread::new(sq, direction, drops))
                        .collect();

                    for spread in &spreads {
                        let id = cat.register(Template::Split {
                            origin: sq,
                            spread: spread.clone(),
                        });
                        cat.splits[sq][count].push(id);
                    }
                    for spread in spreads.into_iter().filter(|s| s.last_count() == 1) {
                        let id = cat.register(Template::SplitCapture { origin: sq, spread });
                        cat.captures[sq][count].push(id);
                    }
                }
            }
        }

        cat
    }

    fn register(&mut self, template: Template) -> u32 {
        let id = self.templates.len() as u32;
        self.templates.push(template);
        id
    }

    #[inline]
    pub fn template(&self, id: u32) -> &Template {
        &self.templates[id as usize]
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn placements(&self, sq: Square) -> &[u32; 3] {
        &self.placements[sq]
    }

    pub fn splits(&self, sq: Square, carried: usize) -> &[u32] {
        &self.splits[sq][carried]
    }

    pub fn captures(&self, sq: Square, carried: usize) -> &[u32] {
        &self.captures[sq][carried]
    }
}

/// A catalog template id together with the hash of the board it was
/// generated on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub board_hash: u64,
    pub id: u32,
}

impl Move {
    pub fn new(board_hash: u64, id: u32) -> Self {
        Self { board_hash, id }
    }

    #[inline]
    pub fn template(&self) -> &'static Template {
        catalog().template(self.id)
    }

    #[inline]
    pub fn apply(&self, board: &mut Board) {
        self.template().apply(board);
    }

    #[inline]
    pub fn revert(&self, board: &mut Board) {
        self.template().revert(board);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.template(), f)
    }
}

impl Board {
    /// Legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(128);
        self.legal_moves_into(&mut moves);
        moves
    }

    /// Fill `moves` with the legal moves for the side to move.
    pub fn legal_moves_into(&self, moves: &mut Vec<Move>) {
        moves.clear();
        let cat = catalog();
        let hash = self.hash();

        let mut push_legal = |ids: &[u32]| {
            for &id in ids {
                if cat.template(id).can_apply(self) {
                    moves.push(Move::new(hash, id));
                }
            }
        };

        for (sq, st) in self.stacks.iter().enumerate() {
            let top = st.top();
            if top == 0 {
                push_legal(cat.placements(sq));
            } else if top * self.turn > 0 && self.move_number >= 2 {
                for count in 1..=st.size().min(N) {
                    push_legal(cat.splits(sq, count));
                    if top.abs() == PIECE_CAP {
                        push_legal(cat.captures(sq, count));
                    }
                }
            }
        }
    }

    /// Hashes of every state reachable in one legal move.
    pub fn successor_hashes(&self) -> HashSet<u64> {
        let mut scratch = self.clone();
        self.legal_moves()
            .into_iter()
            .map(|mv| {
                mv.apply(&mut scratch);
                let h = scratch.hash();
                mv.revert(&mut scratch);
                h
            })
            .collect()
    }
}
