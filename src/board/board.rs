//! Canonical game state: occupancy, turn order, terminal detection

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::rules::win;
use crate::GameError;

use super::bitboard::Bitboard;
use super::{Player, Pos, TOTAL_CELLS};

/// Snapshot of the game status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub end: bool,
    pub cur_player: Player,
    pub winner: Player,
}

/// Game board with tri-state occupancy.
///
/// One bitboard per [`Player`] value; every cell has exactly one of the
/// three bits set, so `count(Black) + count(White) + count(None)` is
/// always 225. `cur_player` is `None` exactly when the game has ended,
/// and `winner` stays `None` until then.
///
/// All mutation goes through [`Board::apply_move`] and
/// [`Board::revert_move`]. Invalid calls are silent no-ops that return
/// the unchanged side to move, so a caller detects rejection by comparing
/// the result with the side it expected to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    stones: [Bitboard; 3],
    counts: [u16; 3],
    cur_player: Player,
    winner: Player,
}

impl Board {
    pub fn new() -> Self {
        let mut stones = [Bitboard::EMPTY; 3];
        stones[Player::None.index()] = Bitboard::FULL;
        let mut counts = [0u16; 3];
        counts[Player::None.index()] = TOTAL_CELLS as u16;
        Self {
            stones,
            counts,
            cur_player: Player::Black,
            winner: Player::None,
        }
    }

    /// Current game status
    #[inline]
    pub fn status(&self) -> Status {
        Status {
            end: self.cur_player == Player::None,
            cur_player: self.cur_player,
            winner: self.winner,
        }
    }

    #[inline]
    pub fn cur_player(&self) -> Player {
        self.cur_player
    }

    #[inline]
    pub fn winner(&self) -> Player {
        self.winner
    }

    /// Occupancy set for one player state
    #[inline]
    pub fn stones(&self, player: Player) -> &Bitboard {
        &self.stones[player.index()]
    }

    /// Number of cells in the given state
    #[inline]
    pub fn count(&self, player: Player) -> usize {
        self.counts[player.index()] as usize
    }

    /// Owner of the given cell, `None` when empty.
    #[inline]
    pub fn player_at(&self, pos: Pos) -> Player {
        if self.stones[Player::Black.index()].has(pos) {
            Player::Black
        } else if self.stones[Player::White.index()].has(pos) {
            Player::White
        } else {
            Player::None
        }
    }

    /// Range and emptiness check only.
    ///
    /// TODO: renju forbidden-move checks (Black's double-three,
    /// double-four and overline) would hook in here.
    #[inline]
    pub fn check_move(&self, pos: Pos) -> bool {
        pos.in_bounds() && self.stones[Player::None.index()].has(pos)
    }

    /// Play a stone for the side to move.
    ///
    /// Returns the side to move after the call:
    /// - the opponent on a normal move,
    /// - `Player::None` when this move ended the game (win or draw),
    /// - the unchanged current side when the move was invalid
    ///   (out of range, occupied, or game already over) — state untouched.
    pub fn apply_move(&mut self, pos: Pos) -> Player {
        self.apply_move_with(pos, true)
    }

    /// [`Board::apply_move`] with the victory scan made optional; used
    /// when replaying a known-final configuration.
    pub(crate) fn apply_move_with(&mut self, pos: Pos, check_victory: bool) -> Player {
        if self.cur_player == Player::None || !self.check_move(pos) {
            return self.cur_player;
        }
        let player = self.cur_player;
        self.stones[Player::None.index()].clear(pos);
        self.counts[Player::None.index()] -= 1;
        self.stones[player.index()].set(pos);
        self.counts[player.index()] += 1;

        if check_victory && win::has_five_at(self, pos, player) {
            self.winner = player;
            self.cur_player = Player::None;
        } else if self.counts[Player::None.index()] == 0 {
            // Draw: the board filled without a five
            self.winner = Player::None;
            self.cur_player = Player::None;
        } else {
            self.cur_player = -player;
        }
        self.cur_player
    }

    /// Take back the stone at `pos`.
    ///
    /// Returns the side to move after the call: the removed stone's owner
    /// when the game had ended, otherwise the opposite of the current
    /// side. Reverting an empty or out-of-range cell is a silent no-op
    /// returning the unchanged current side.
    pub fn revert_move(&mut self, pos: Pos) -> Player {
        if !pos.in_bounds() {
            return self.cur_player;
        }
        let owner = self.player_at(pos);
        if owner == Player::None {
            return self.cur_player;
        }
        self.stones[owner.index()].clear(pos);
        self.counts[owner.index()] -= 1;
        self.stones[Player::None.index()].set(pos);
        self.counts[Player::None.index()] += 1;

        self.cur_player = if self.cur_player == Player::None {
            owner
        } else {
            -self.cur_player
        };
        self.winner = Player::None;
        self.cur_player
    }

    /// Draw uniformly from the empty cells.
    ///
    /// # Errors
    /// [`GameError::BoardExhausted`] when no empty cell remains; the
    /// caller should have checked [`Board::status`] first.
    pub fn random_move<R: Rng>(&self, rng: &mut R) -> Result<Pos, GameError> {
        self.stones[Player::None.index()]
            .iter()
            .choose(rng)
            .ok_or(GameError::BoardExhausted)
    }

    /// Whether the game is over as seen from the last move: a run of five
    /// or more through `pos` for its owner, or a full board.
    pub fn check_game_end(&self, pos: Pos) -> bool {
        if self.counts[Player::None.index()] == 0 {
            return true;
        }
        if !pos.in_bounds() {
            return false;
        }
        let owner = self.player_at(pos);
        owner != Player::None && win::has_five_at(self, pos, owner)
    }

    /// Adopt a terminal (or live) state verbatim; only for replay sync.
    pub(crate) fn set_outcome(&mut self, cur_player: Player, winner: Player) {
        self.cur_player = cur_player;
        self.winner = winner;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
