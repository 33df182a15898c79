//! Zobrist keys for incremental position hashing
//!
//! One 64-bit key per (cell, colour) pair, XORed into the running hash on
//! every set and unset. Keys come from a fixed-seed generator so hashes
//! are reproducible across runs; the table is built once and shared.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Player, Pos, TOTAL_CELLS};

const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    black: [u64; TOTAL_CELLS],
    white: [u64; TOTAL_CELLS],
}

impl ZobristKeys {
    fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut black = [0u64; TOTAL_CELLS];
        let mut white = [0u64; TOTAL_CELLS];
        for i in 0..TOTAL_CELLS {
            black[i] = rng.gen();
            white[i] = rng.gen();
        }
        Self { black, white }
    }

    /// Key for a stone of `player` on `pos`. `Player::None` keys to 0 so
    /// XORing it is a no-op.
    #[inline]
    pub fn key(&self, pos: Pos, player: Player) -> u64 {
        match player {
            Player::Black => self.black[pos.index()],
            Player::White => self.white[pos.index()],
            Player::None => 0,
        }
    }
}

/// The process-wide key table.
pub fn keys() -> &'static ZobristKeys {
    static KEYS: OnceLock<ZobristKeys> = OnceLock::new();
    KEYS.get_or_init(|| ZobristKeys::new(SEED))
}
