//! Textual board encoding (TBG).
//!
//! ```text
//! moveNumber,turn(w|b),boardSize,whiteReserve,blackReserve,whiteCaps,blackCaps;sq0,sq1,...
//! ```
//!
//! Each square lists the colour of every layer from the bottom (`w`/`b`)
//! followed by the kind of the top piece: `F` flat, `S` wall, `C` capstone.
//! An empty square is an empty field. Squares run row by row from `A1`.
//! Decoding is case-insensitive and accepts `;` in place of `,` after the
//! first `;`.

use std::str::FromStr;

use thiserror::Error;

use crate::board::{Board, stack_code};
use crate::constants::{
    BLACK, MAX_STACK_HEIGHT, N, PIECE_CAP, PIECE_FLAT, PIECE_WALL, Piece, SQUARES,
    STARTING_CAPSTONES, STARTING_STONES, WHITE,
};

/// Reasons a TBG string can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TbgError {
    #[error("missing ';' before the square list")]
    MissingSquares,
    #[error("expected 7 header fields, found {0}")]
    HeaderFieldCount(usize),
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unsupported board size {0}")]
    BoardSize(usize),
    #[error("invalid side to move {0:?}")]
    InvalidTurn(String),
    #[error("wrong number of squares: {0}")]
    SquareCount(usize),
    #[error("square {0} has a top piece but no colour")]
    MissingColor(usize),
    #[error("invalid colour token {0:?} in square {1}")]
    InvalidColor(char, usize),
    #[error("invalid top piece code {0:?} in square {1}")]
    InvalidPiece(char, usize),
    #[error("stack of height {0} in square {1} is too tall")]
    StackTooTall(usize, usize),
    #[error("{color} accounts for {count} {kind}, more than a game holds")]
    PieceCount {
        color: &'static str,
        kind: &'static str,
        count: usize,
    },
}

fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, TbgError> {
    value.trim().parse().map_err(|_| TbgError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_color(c: char, sq: usize) -> Result<i8, TbgError> {
    match c {
        'w' => Ok(WHITE),
        'b' => Ok(BLACK),
        _ => Err(TbgError::InvalidColor(c, sq)),
    }
}

fn parse_kind(c: char, sq: usize) -> Result<Piece, TbgError> {
    match c {
        'f' => Ok(PIECE_FLAT),
        's' => Ok(PIECE_WALL),
        'c' => Ok(PIECE_CAP),
        _ => Err(TbgError::InvalidPiece(c, sq)),
    }
}

/// Pieces on the board plus those in hand may not exceed a colour's set.
fn check_piece_counts(board: &Board) -> Result<(), TbgError> {
    for (idx, color, name) in [(0, WHITE, "white"), (1, BLACK, "black")] {
        let on_board: usize = board.stacks.iter().map(|st| st.color_count(color)).sum();
        // Nothing can be stacked on a capstone, so only tops can be capstones.
        let caps_on_board = board
            .stacks
            .iter()
            .filter(|st| st.top() == color * PIECE_CAP)
            .count();

        let caps = caps_on_board + board.capstones[idx] as usize;
        if caps > STARTING_CAPSTONES as usize {
            return Err(TbgError::PieceCount {
                color: name,
                kind: "capstones",
                count: caps,
            });
        }
        let stones = on_board - caps_on_board + board.reserves[idx] as usize;
        if stones > STARTING_STONES as usize {
            return Err(TbgError::PieceCount {
                color: name,
                kind: "stones",
                count: stones,
            });
        }
    }
    Ok(())
}

impl Board {
    /// Encode the full state as a single TBG line.
    pub fn to_tbg(&self) -> String {
        let mut s = format!(
            "{},{},{},{},{},{},{}",
            self.move_number,
            if self.turn == WHITE { "w" } else { "b" },
            N,
            self.reserves[0],
            self.reserves[1],
            self.capstones[0],
            self.capstones[1],
        );
        for (i, st) in self.stacks.iter().enumerate() {
            s.push(if i == 0 { ';' } else { ',' });
            s.push_str(&stack_code(st));
        }
        s
    }

    /// Decode a TBG line produced by [`Board::to_tbg`] or an external peer.
    pub fn from_tbg(s: &str) -> Result<Self, TbgError> {
        let s = s.trim().to_ascii_lowercase();
        let (header, squares) = s.split_once(';').ok_or(TbgError::MissingSquares)?;

        let fields: Vec<&str> = header.split(',').collect();
        if fields.len() != 7 {
            return Err(TbgError::HeaderFieldCount(fields.len()));
        }

        let mut board = Board::new();
        board.move_number = parse_number("move number", fields[0])?;
        board.turn = match fields[1].trim() {
            "w" => WHITE,
            "b" => BLACK,
            other => return Err(TbgError::InvalidTurn(other.to_string())),
        };
        let size: usize = parse_number("board size", fields[2])?;
        if size != N {
            return Err(TbgError::BoardSize(size));
        }
        board.reserves = [
            parse_number("white reserve", fields[3])?,
            parse_number("black reserve", fields[4])?,
        ];
        board.capstones = [
            parse_number("white capstones", fields[5])?,
            parse_number("black capstones", fields[6])?,
        ];

        let cells: Vec<&str> = squares.split([',', ';']).collect();
        if cells.len() != SQUARES {
            return Err(TbgError::SquareCount(cells.len()));
        }

        for (sq, cell) in cells.iter().enumerate() {
            let cell = cell.trim();
            let Some(code) = cell.chars().last() else {
                continue;
            };
            let kind = parse_kind(code, sq)?;
            let layers = &cell[..cell.len() - code.len_utf8()];
            if layers.is_empty() {
                return Err(TbgError::MissingColor(sq));
            }
            let height = layers.chars().count();
            if height > MAX_STACK_HEIGHT {
                return Err(TbgError::StackTooTall(height, sq));
            }
            for (i, c) in layers.chars().enumerate() {
                let color = parse_color(c, sq)?;
                let piece = if i + 1 == height { kind } else { PIECE_FLAT };
                board.place(sq, piece * color);
            }
        }

        check_piece_counts(&board)?;
        Ok(board)
    }
}

impl FromStr for Board {
    type Err = TbgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_tbg(s)
    }
}
