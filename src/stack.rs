//! A single square's stack of pieces.
//!
//! Only the top piece keeps its kind. Buried layers are always flats, so the
//! stack stores one colour bit per layer (1 = white) plus a cached signed top.

use crate::constants::{MAX_STACK_HEIGHT, PIECE_FLAT, Piece, WHITE};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stack {
    top: Piece,
    height: u8,
    /// Bit `i` is set when layer `i` (counted from the bottom) is white.
    colors: u64,
}

impl Stack {
    pub const fn new() -> Self {
        Self {
            top: 0,
            height: 0,
            colors: 0,
        }
    }

    /// Push one piece on top.
    #[inline]
    pub fn push(&mut self, piece: Piece) {
        assert!(piece != 0, "cannot push an empty piece");
        assert!(
            (self.height as usize) < MAX_STACK_HEIGHT,
            "stack overflow at height {}",
            self.height
        );
        if piece > 0 {
            self.colors |= 1 << self.height;
        }
        self.top = piece;
        self.height += 1;
    }

    /// Remove the top piece. The new top is a flat of the colour below.
    ///
    /// # Panics
    /// Popping an empty stack is a caller bug.
    #[inline]
    pub fn pop(&mut self) {
        assert!(self.height > 0, "pop from an empty stack");
        self.height -= 1;
        self.colors &= !(1 << self.height);
        self.top = match self.height {
            0 => 0,
            h => self.color_at(h as usize - 1) * PIECE_FLAT,
        };
    }

    #[inline]
    pub fn top(&self) -> Piece {
        self.top
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Colour (+1 / -1) of layer `i`, counted from the bottom.
    #[inline]
    pub fn color_at(&self, i: usize) -> i8 {
        debug_assert!(i < self.size());
        if self.colors >> i & 1 == 1 { 1 } else { -1 }
    }

    /// Raw colour bitmap, bit `i` set for a white layer `i`.
    #[inline]
    pub fn colors(&self) -> u64 {
        self.colors
    }

    /// Number of layers belonging to `color`.
    #[inline]
    pub fn color_count(&self, color: i8) -> usize {
        let white = self.colors.count_ones() as usize;
        if color == WHITE {
            white
        } else {
            self.size() - white
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BLACK, PIECE_CAP, PIECE_WALL};

    #[test]
    fn test_push_pop_tracks_top() {
        let mut st = Stack::new();
        assert_eq!(st.top(), 0);

        st.push(PIECE_FLAT);
        st.push(-PIECE_FLAT);
        st.push(PIECE_CAP);
        assert_eq!(st.size(), 3);
        assert_eq!(st.top(), PIECE_CAP);

        st.pop();
        assert_eq!(st.top(), -PIECE_FLAT);
        st.pop();
        assert_eq!(st.top(), PIECE_FLAT);
        st.pop();
        assert_eq!(st.top(), 0);
        assert!(st.is_empty());
    }

    #[test]
    fn test_pop_forgets_buried_wall() {
        let mut st = Stack::new();
        st.push(-PIECE_WALL);
        st.push(PIECE_CAP);
        st.pop();
        // Only the colour survives burial.
        assert_eq!(st.top(), -PIECE_FLAT);
    }

    #[test]
    fn test_pop_restores_equality() {
        let mut st = Stack::new();
        st.push(PIECE_FLAT);
        let before = st;
        st.push(-PIECE_FLAT);
        st.pop();
        assert_eq!(st, before);
    }

    #[test]
    fn test_color_count() {
        let mut st = Stack::new();
        for piece in [PIECE_FLAT, -PIECE_FLAT, -PIECE_FLAT, PIECE_WALL] {
            st.push(piece);
        }
        assert_eq!(st.color_count(WHITE), 2);
        assert_eq!(st.color_count(BLACK), 2);
        assert_eq!(st.color_at(0), WHITE);
        assert_eq!(st.color_at(1), BLACK);
    }

    #[test]
    #[should_panic(expected = "pop from an empty stack")]
    fn test_pop_empty_panics() {
        let mut st = Stack::new();
        st.pop();
    }
}
