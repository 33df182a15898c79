//! Composite threats: double-three, four-three, double-four
//!
//! Composites are derived from single-pattern presence rather than
//! matched directly: a cell carries one when two qualifying patterns of
//! the same colour meet there on distinct directions. The per-direction
//! bits in [`Record`] make the test a couple of popcounts.

use crate::board::{Player, Pos};

use super::patterns::{PatternScore, PatternType};
use super::{group, Evaluator};

/// Composite threat types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundType {
    /// Two live threes on distinct directions.
    DoubleThree,
    /// A four and a live three on distinct directions.
    FourThree,
    /// Two fours (dead or live) on distinct directions.
    DoubleFour,
}

/// Number of composite types.
pub const COMPOUND_TYPES: usize = 3;

impl CompoundType {
    pub const ALL: [CompoundType; COMPOUND_TYPES] = [
        CompoundType::DoubleThree,
        CompoundType::FourThree,
        CompoundType::DoubleFour,
    ];

    /// Single-pattern types composites are built from.
    pub const COMPONENTS: [PatternType; 3] = [
        PatternType::LiveThree,
        PatternType::DeadFour,
        PatternType::LiveFour,
    ];

    /// All composites share one score.
    pub const BASE_SCORE: i32 = PatternScore::COMPOUND;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Whether a single-pattern type can take part in a composite.
#[inline]
pub(crate) fn is_component(kind: PatternType) -> bool {
    CompoundType::COMPONENTS.contains(&kind)
}

/// Presence test against the current single-pattern bits, together with
/// the direction set backing it.
pub(crate) fn test(ev: &Evaluator, kind: CompoundType, pos: Pos, player: Player) -> (bool, u16) {
    let idx = pos.index();
    let dist = &ev.pattern_dist;
    let threes = dist[PatternType::LiveThree.index()][idx].dirs(player, player);
    let fours = dist[PatternType::DeadFour.index()][idx].dirs(player, player)
        | dist[PatternType::LiveFour.index()][idx].dirs(player, player);
    match kind {
        CompoundType::DoubleThree => (threes.count_ones() >= 2, threes),
        CompoundType::FourThree => {
            // A four and a three that are not the same lone direction.
            let both = fours | threes;
            (fours != 0 && threes != 0 && both.count_ones() >= 2, both)
        }
        CompoundType::DoubleFour => (fours.count_ones() >= 2, fours),
    }
}

/// Recompute composite presence on `pos` for `player`, applying the
/// shared score once per composite that appears or dissolves.
pub(crate) fn update(ev: &mut Evaluator, pos: Pos, player: Player) {
    let idx = pos.index();
    for kind in CompoundType::ALL {
        let (present, mask) = test(ev, kind, pos, player);
        let before = ev.compound_dist[kind.index()][idx].count(player) > 0;
        if present != before {
            let delta = if present { 1 } else { -1 };
            ev.compound_dist[kind.index()][idx].set_count(delta, player);
            for perspective in [Player::Black, Player::White] {
                ev.scores[group(player, perspective)][idx] += delta * CompoundType::BASE_SCORE;
            }
        }
        let bits = if present { mask } else { 0 };
        let rec = &mut ev.compound_dist[kind.index()][idx];
        rec.set_dirs_mask(player, Player::Black, bits);
        rec.set_dirs_mask(player, Player::White, bits);
    }
}
