//! Engine side of the pipe tournament protocol.
//!
//! A referee process writes one TBG encoding per line; the engine answers
//! each with the encoding of the position after its move. A position that
//! is already decided is echoed back unchanged.
//!
//! ## Example
//!
//! ```ignore
//! use tak_rust::player::SearchPlayer;
//! use tak_rust::protocol::PipeEngine;
//! use tak_rust::search::Searcher;
//!
//! let mut engine = PipeEngine::new(SearchPlayer::new(Searcher::new(3)));
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::board::Board;
use crate::player::Player;

pub struct PipeEngine<P: Player> {
    player: P,
    /// Positions answered so far.
    answered: usize,
}

impl<P: Player> PipeEngine<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            answered: 0,
        }
    }

    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Run the loop on stdin and stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the loop until `input` is exhausted.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        info!(player = self.player.name(), "pipe engine ready");

        for line in input.lines() {
            let line = line.context("failed to read from the referee")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let reply = self.respond(line)?;
            writeln!(output, "{reply}").context("failed to write to the referee")?;
            output.flush()?;
            self.answered += 1;
        }

        info!(answered = self.answered, "referee closed the pipe");
        Ok(())
    }

    /// Encoding of the position after the engine's move on `line`.
    fn respond(&mut self, line: &str) -> Result<String> {
        debug!(tbg = line, "received");
        let mut board = match Board::from_tbg(line) {
            Ok(board) => board,
            Err(err) => {
                error!(tbg = line, %err, "malformed position");
                return Err(err).with_context(|| format!("malformed position {line:?}"));
            }
        };

        if board.is_terminal() {
            debug!("position already decided, echoing");
            return Ok(board.to_tbg());
        }

        match self.player.propose_move(&board) {
            Some(mv) => mv.apply(&mut board),
            None => debug!("no move proposed, echoing"),
        }

        let reply = board.to_tbg();
        debug!(tbg = %reply, "sent");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_STACK_HEIGHT, N, SQUARES};
    use crate::player::SearchPlayer;
    use crate::search::Searcher;
    use std::io::Cursor;

    fn engine() -> PipeEngine<SearchPlayer> {
        PipeEngine::new(SearchPlayer::new(Searcher::with_seed(1, 3)))
    }

    #[test]
    fn test_answers_each_line() {
        let start = Board::new().to_tbg();
        let input = format!("{start}\n\n{start}\n");
        let mut out = Vec::new();

        let mut engine = engine();
        engine.run_with(Cursor::new(input), &mut out).unwrap();
        assert_eq!(engine.answered(), 2);

        let text = String::from_utf8(out).unwrap();
        let replies: Vec<&str> = text.lines().collect();
        assert_eq!(replies.len(), 2);
        for reply in replies {
            let board = Board::from_tbg(reply).unwrap();
            assert_eq!(board.move_number, 1);
            assert_eq!(board.reserves[1], Board::new().reserves[1] - 1);
        }
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let mut out = Vec::new();
        let result = engine().run_with(Cursor::new("not a position\n"), &mut out);
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_impossible_tower_is_an_error() {
        let tower = format!("{}F", "w".repeat(MAX_STACK_HEIGHT));
        let rest = vec![""; SQUARES - 2].join(",");
        let line = format!("10,w,{N},10,10,1,1;{tower},wF,{rest}\n");

        let mut out = Vec::new();
        let result = engine().run_with(Cursor::new(line), &mut out);
        assert!(result.is_err());
        assert!(out.is_empty());
    }
}
