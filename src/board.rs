//! Board state: a grid of stacks plus turn and reserve counters.
//!
//! The board is mutated in place by [`Move::apply`](crate::movegen::Move::apply)
//! and restored by [`Move::revert`](crate::movegen::Move::revert). Equality is
//! structural over every field, which is what the apply/revert contract and
//! successor-hash validation rely on.

use std::fmt;

use crate::constants::{
    BLACK, N, PIECE_CAP, PIECE_FLAT, PIECE_WALL, Piece, SQUARES, STARTING_CAPSTONES,
    STARTING_STONES, WHITE,
};
use crate::eval;
use crate::stack::Stack;

/// A square, represented as an index `x + y * N` into the stack array.
pub type Square = usize;

/// Outcome of a finished game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameResult {
    /// +1 for a white win, -1 for a black win, 0 for a draw.
    pub fn sign(self) -> i8 {
        match self {
            GameResult::WhiteWin => WHITE,
            GameResult::BlackWin => BLACK,
            GameResult::Draw => 0,
        }
    }

    fn for_color(color: i8) -> Self {
        if color == WHITE {
            GameResult::WhiteWin
        } else {
            GameResult::BlackWin
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    /// Ply counter, 0 at the start of the game.
    pub move_number: u32,
    /// Side to move: +1 white, -1 black.
    pub turn: i8,
    /// Stones (flats and walls) left, indexed by [`color_index`].
    pub reserves: [u8; 2],
    /// Capstones left, indexed by [`color_index`].
    pub capstones: [u8; 2],
    pub stacks: [Stack; SQUARES],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Index into the per-colour counters: 0 for white, 1 for black.
#[inline]
pub fn color_index(color: i8) -> usize {
    if color > 0 { 0 } else { 1 }
}

#[inline]
pub fn square(x: usize, y: usize) -> Square {
    x + y * N
}

#[inline]
pub fn coords(sq: Square) -> (usize, usize) {
    (sq % N, sq / N)
}

/// Parse a square name such as `C3` (column letter, 1-based row).
pub fn parse_square(s: &str) -> Option<Square> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() {
        return None;
    }
    let col = bytes[0].to_ascii_uppercase().checked_sub(b'A')? as usize;
    let row: usize = s[1..].parse().ok()?;
    if col >= N || row == 0 || row > N {
        return None;
    }
    Some(square(col, row - 1))
}

/// Name of a square, e.g. `A1` for square 0.
pub fn square_name(sq: Square) -> String {
    let (x, y) = coords(sq);
    format!("{}{}", (b'A' + x as u8) as char, y + 1)
}

impl Board {
    /// Empty board, full reserves, white to move.
    pub fn new() -> Self {
        Self {
            move_number: 0,
            turn: WHITE,
            reserves: [STARTING_STONES; 2],
            capstones: [STARTING_CAPSTONES; 2],
            stacks: [Stack::new(); SQUARES],
        }
    }

    /// Colour of a piece placed this ply. During the first two plies each
    /// side places a flat of the opponent's colour.
    #[inline]
    pub fn placement_color(&self) -> i8 {
        if self.move_number < 2 {
            -self.turn
        } else {
            self.turn
        }
    }

    #[inline]
    pub fn place(&mut self, sq: Square, piece: Piece) {
        self.stacks[sq].push(piece);
    }

    #[inline]
    pub fn remove(&mut self, sq: Square) {
        self.stacks[sq].pop();
    }

    /// Transfer the top `count` pieces of `from` onto `to`, keeping their order.
    pub fn move_pieces(&mut self, from: Square, to: Square, count: usize) {
        assert!(count <= N, "carry of {count} exceeds the carry limit {N}");
        let mut carried = [0 as Piece; N];
        for slot in carried.iter_mut().take(count) {
            *slot = self.stacks[from].top();
            self.stacks[from].pop();
        }
        for &piece in carried[..count].iter().rev() {
            self.stacks[to].push(piece);
        }
    }

    /// Deterministic content hash of the full state.
    ///
    /// FNV-1a over every field; used to identify successor states, never
    /// for the correctness of search.
    pub fn hash(&self) -> u64 {
        fn mix(mut h: u64, x: u64) -> u64 {
            h ^= x;
            h.wrapping_mul(0x100000001b3)
        }

        let mut h = 0xcbf29ce484222325u64;
        h = mix(h, self.move_number as u64);
        h = mix(h, self.turn as u8 as u64);
        for i in 0..2 {
            h = mix(h, self.reserves[i] as u64);
            h = mix(h, self.capstones[i] as u64);
        }
        for st in &self.stacks {
            h = mix(h, st.top() as u8 as u64 | (st.size() as u64) << 8);
            h = mix(h, st.colors());
        }
        h
    }

    /// Number of squares topped by a flat of each colour, `[white, black]`.
    pub fn flat_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for st in &self.stacks {
            if st.top().abs() == PIECE_FLAT {
                counts[color_index(st.top())] += 1;
            }
        }
        counts
    }

    /// Result of the game, or `None` while it is still running.
    ///
    /// A road wins outright; if both colours hold one, the side that just
    /// moved wins. Otherwise the game ends when either stone reserve is empty
    /// or the board is full, and the majority of flat tops wins.
    pub fn game_result(&self) -> Option<GameResult> {
        let white_road = eval::road_distance(self, WHITE) == 0;
        let black_road = eval::road_distance(self, BLACK) == 0;
        match (white_road, black_road) {
            (true, true) => return Some(GameResult::for_color(-self.turn)),
            (true, false) => return Some(GameResult::WhiteWin),
            (false, true) => return Some(GameResult::BlackWin),
            (false, false) => {}
        }

        let exhausted = self.reserves.contains(&0);
        let full = self.stacks.iter().all(|st| !st.is_empty());
        if !exhausted && !full {
            return None;
        }

        let [white, black] = self.flat_counts();
        Some(match white.cmp(&black) {
            std::cmp::Ordering::Greater => GameResult::WhiteWin,
            std::cmp::Ordering::Less => GameResult::BlackWin,
            std::cmp::Ordering::Equal => GameResult::Draw,
        })
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.game_result().is_some()
    }

    /// +1 / -1 for the winning colour, 0 for a draw or a running game.
    #[inline]
    pub fn winner(&self) -> i8 {
        self.game_result().map_or(0, GameResult::sign)
    }
}

fn piece_code(piece: Piece) -> char {
    match piece.abs() {
        PIECE_WALL => 'S',
        PIECE_CAP => 'C',
        _ => 'F',
    }
}

/// Letters of one stack, bottom to top: buried colours then the top piece.
pub(crate) fn stack_code(st: &Stack) -> String {
    let mut s = String::with_capacity(st.size() + 1);
    for i in 0..st.size() {
        s.push(if st.color_at(i) == WHITE { 'w' } else { 'b' });
    }
    if !st.is_empty() {
        s.push(piece_code(st.top()));
    }
    s
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.turn == WHITE { "White" } else { "Black" };
        writeln!(f, "Move #{}   {side} to move", self.move_number)?;
        write!(f, "  ")?;
        for x in 0..N {
            write!(f, " {:<10}", (b'A' + x as u8) as char)?;
        }
        writeln!(f)?;
        for y in 0..N {
            write!(f, "{} ", y + 1)?;
            for x in 0..N {
                write!(f, "|{:<10}", stack_code(&self.stacks[square(x, y)]))?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "TBG: {}", self.to_tbg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board() {
        let board = Board::new();
        assert_eq!(board.move_number, 0);
        assert_eq!(board.turn, WHITE);
        assert_eq!(board.reserves, [STARTING_STONES; 2]);
        assert_eq!(board.capstones, [STARTING_CAPSTONES; 2]);
        assert!(board.stacks.iter().all(Stack::is_empty));
    }

    #[test]
    fn test_parse_square_roundtrip() {
        for sq in 0..SQUARES {
            let name = square_name(sq);
            assert_eq!(parse_square(&name), Some(sq), "Failed roundtrip for {name}");
        }
        assert_eq!(parse_square("a1"), Some(0));
        assert_eq!(parse_square("A0"), None);
        assert_eq!(parse_square("Z1"), None);
        assert_eq!(parse_square(&format!("A{}", N + 1)), None);
    }

    #[test]
    fn test_move_pieces_keeps_order() {
        let mut board = Board::new();
        board.place(0, PIECE_FLAT);
        board.place(0, -PIECE_FLAT);
        board.place(0, PIECE_CAP);

        board.move_pieces(0, 1, 2);
        assert_eq!(board.stacks[0].size(), 1);
        assert_eq!(board.stacks[0].top(), PIECE_FLAT);
        assert_eq!(board.stacks[1].size(), 2);
        assert_eq!(board.stacks[1].top(), PIECE_CAP);
        assert_eq!(board.stacks[1].color_at(0), BLACK);
    }

    #[test]
    fn test_hash_distinguishes_states() {
        let mut a = Board::new();
        let b = Board::new();
        assert_eq!(a.hash(), b.hash());
        a.place(3, PIECE_FLAT);
        assert_ne!(a.hash(), b.hash());
        a.remove(3);
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_reserve_exhaustion_majority() {
        let mut board = Board::new();
        board.reserves = [0, 3];
        board.place(0, PIECE_FLAT);
        board.place(2, PIECE_FLAT);
        board.place(4, -PIECE_FLAT);
        board.place(1, -PIECE_WALL);
        assert_eq!(board.game_result(), Some(GameResult::WhiteWin));
        assert_eq!(board.winner(), WHITE);
    }

    #[test]
    fn test_reserve_exhaustion_tie_is_draw() {
        let mut board = Board::new();
        board.reserves = [4, 0];
        board.place(0, PIECE_FLAT);
        board.place(2, -PIECE_FLAT);
        assert_eq!(board.game_result(), Some(GameResult::Draw));
        assert!(board.is_terminal());
        assert_eq!(board.winner(), 0);
    }

    #[test]
    fn test_running_game_has_no_result() {
        let mut board = Board::new();
        board.place(12, PIECE_FLAT);
        assert_eq!(board.game_result(), None);
        assert!(!board.is_terminal());
    }
}
