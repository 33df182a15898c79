//! Game rules for free-style Gomoku
//!
//! Only the win condition lives here: five or more in a row, overlines
//! included. Renju prohibitions (forbidden double-threes and the like)
//! are not part of this rule set; see [`crate::Board::check_move`] for
//! where they would attach.

pub mod win;

pub use win::has_five_at;
