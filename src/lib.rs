//! Core board state and position evaluation for free-style Gomoku
//!
//! A 15x15 five-in-a-row engine core: the authoritative game state and an
//! incremental evaluator that keeps per-cell threat-pattern
//! distributions, composite threats and score vectors in lockstep with
//! the board across apply/revert.
//!
//! # Architecture
//!
//! - [`board`]: tri-state occupancy over bitboards, turn order, terminal
//!   detection, and the line-string projections ([`BoardMap`]) the
//!   matcher scans.
//! - [`rules`]: the win condition (five or more in a row, overlines
//!   included).
//! - [`eval`]: the Aho-Corasick pattern matcher and the incremental
//!   [`Evaluator`].
//!
//! Search, UI and persistence are host concerns; the core exposes only
//! in-process state and scores.
//!
//! # Quick start
//!
//! ```
//! use gomoku_core::{Evaluator, Player, Pos};
//!
//! let mut eval = Evaluator::new();
//! let next = eval.apply_move(Pos::new(7, 7));
//! assert_eq!(next, Player::White);
//! assert!(!eval.check_game_end());
//!
//! // Scores for Black's threats, seen from Black's side.
//! let scores = eval.scores(Player::Black, Player::Black);
//! assert!(scores[Pos::new(7, 7).index()] > 0);
//!
//! eval.revert_move(1);
//! assert_eq!(eval.board().cur_player(), Player::Black);
//! ```
//!
//! # Concurrency
//!
//! Boards and evaluators are single-threaded values; clone one per
//! worker for parallel search. The compiled pattern automaton and the
//! Zobrist key table are immutable and shared process-wide.

pub mod board;
pub mod eval;
pub mod rules;

// Re-export commonly used types for convenience
pub use board::{Board, BoardMap, Direction, Player, Pos, Status, BOARD_SIZE, TOTAL_CELLS};
pub use eval::{CompoundType, Evaluator, PatternScore, PatternType};

use thiserror::Error;

/// Errors surfaced by the core.
///
/// Invalid moves and reverts are deliberately not errors: they are
/// silent no-ops returning the unchanged side to move (the caller
/// compares). Only asking an exhausted board for a random move fails
/// loudly, because the caller should have consulted
/// [`Board::status`] first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("board exhausted: no legal move remains")]
    BoardExhausted,
}
