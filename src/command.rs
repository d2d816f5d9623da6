//! Human move commands.
//!
//! ```text
//! place <square><F|W|C>            e.g. place C3F
//! split <square><u|d|l|r><drops>   e.g. split B2r21
//! ```
//!
//! A command is turned into a candidate successor board on a copy of the
//! current one, then accepted only if the candidate's hash is among the
//! hashes of the states reachable in one legal move.

use std::str::FromStr;

use thiserror::Error;

use crate::board::{Board, Square, color_index, parse_square, square_name};
use crate::constants::{N, PIECE_CAP, PIECE_FLAT, PIECE_WALL, Piece};
use crate::movegen::{Direction, Move};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command {0:?}, expected 'place' or 'split'")]
    Unknown(String),
    #[error("missing argument")]
    MissingArgument,
    #[error("bad square {0:?}")]
    BadSquare(String),
    #[error("unknown piece flag {0:?}, expected F, W or C")]
    BadPiece(char),
    #[error("split must have format [square][udlr][drop counts]")]
    BadSplit,
    #[error("bad drop count {0:?}")]
    BadDrop(char),
    #[error("no pieces on {0}")]
    EmptyOrigin(String),
    #[error("tried to carry {0} pieces, at most {1} allowed")]
    TooManyPieces(usize, usize),
    #[error("walked off the board")]
    OffBoard,
    #[error("not a legal move")]
    Illegal,
}

/// A parsed human command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Place {
        square: Square,
        piece: Piece,
    },
    Split {
        origin: Square,
        direction: Direction,
        drops: Vec<u8>,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        match command.as_str() {
            "place" => {
                let arg = arg.ok_or(CommandError::MissingArgument)?;
                let flag = arg.chars().last().ok_or(CommandError::MissingArgument)?;
                let name = &arg[..arg.len() - flag.len_utf8()];
                let square =
                    parse_square(name).ok_or_else(|| CommandError::BadSquare(name.to_string()))?;
                let piece = match flag.to_ascii_uppercase() {
                    'F' => PIECE_FLAT,
                    'W' | 'S' => PIECE_WALL,
                    'C' => PIECE_CAP,
                    other => return Err(CommandError::BadPiece(other)),
                };
                Ok(Command::Place { square, piece })
            }
            "split" => {
                let arg = arg.ok_or(CommandError::MissingArgument)?;
                if arg.len() < 4 || !arg.is_ascii() {
                    return Err(CommandError::BadSplit);
                }
                let origin = parse_square(&arg[..2])
                    .ok_or_else(|| CommandError::BadSquare(arg[..2].to_string()))?;
                let direction = arg[2..3]
                    .chars()
                    .next()
                    .and_then(Direction::from_letter)
                    .ok_or(CommandError::BadSplit)?;
                let drops = arg[3..]
                    .chars()
                    .map(|c| match c.to_digit(10) {
                        Some(d) if d > 0 => Ok(d as u8),
                        _ => Err(CommandError::BadDrop(c)),
                    })
                    .collect::<Result<Vec<u8>, _>>()?;
                Ok(Command::Split {
                    origin,
                    direction,
                    drops,
                })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl Command {
    /// The board after playing this command, without checking legality
    /// beyond what is needed to build it.
    pub fn candidate(&self, board: &Board) -> Result<Board, CommandError> {
        let mut next = board.clone();

        match self {
            Command::Place { square, piece } => {
                if !next.stacks[*square].is_empty() {
                    return Err(CommandError::Illegal);
                }
                let color = next.placement_color();
                let idx = color_index(color);
                let pool = if *piece == PIECE_CAP {
                    &mut next.capstones[idx]
                } else {
                    &mut next.reserves[idx]
                };
                *pool = pool.checked_sub(1).ok_or(CommandError::Illegal)?;
                next.place(*square, piece * color);
            }
            Command::Split {
                origin,
                direction,
                drops,
            } => {
                let height = next.stacks[*origin].size();
                if height == 0 {
                    return Err(CommandError::EmptyOrigin(square_name(*origin)));
                }
                let limit = height.min(N);
                let carried: usize = drops.iter().map(|&d| d as usize).sum();
                if carried > limit {
                    return Err(CommandError::TooManyPieces(carried, limit));
                }
                let targets = (1..=drops.len())
                    .map(|i| direction.step(*origin, i).ok_or(CommandError::OffBoard))
                    .collect::<Result<Vec<Square>, _>>()?;

                // The whole carry is lifted; the farthest square takes its top.
                for (&target, &drop) in targets.iter().zip(drops).rev() {
                    next.move_pieces(*origin, target, drop as usize);
                }
            }
        }

        next.turn = -next.turn;
        next.move_number += 1;
        Ok(next)
    }

    /// Play the command if it leads to a reachable successor state.
    pub fn play(&self, board: &Board) -> Result<Board, CommandError> {
        let next = self.candidate(board)?;
        if !board.successor_hashes().contains(&next.hash()) {
            return Err(CommandError::Illegal);
        }
        Ok(next)
    }

    /// The legal catalog move producing the same successor as this command.
    pub fn resolve(&self, board: &Board) -> Result<Move, CommandError> {
        let next = self.candidate(board)?;
        let mut scratch = board.clone();
        board
            .legal_moves()
            .into_iter()
            .find(|mv| {
                mv.apply(&mut scratch);
                let same = scratch == next;
                mv.revert(&mut scratch);
                same
            })
            .ok_or(CommandError::Illegal)
    }
}
