//! Threat pattern definitions and scoring weights
//!
//! Patterns are written as prototype glyph strings for the Black side;
//! the matcher builder derives the mirrored and colour-swapped variants.
//! Prototype glyphs:
//!
//! - `x` — a favoured stone
//! - `o` — a blocker: an enemy stone or the board edge
//! - `-` — a strictly empty cell
//! - `_` — an empty cell or the board edge
//! - `^` — a strictly empty cell that is also the pattern's key slot,
//!   the square whose fill realises the threat
//!
//! Patterns without a `^` are keyed on the favoured stone closest to
//! their centre. "Live" patterns have both flanks open, "dead" ones are
//! blocked on one side.

use crate::board::Player;

/// Threat pattern types in ascending strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternType {
    DeadOne,
    LiveOne,
    DeadTwo,
    LiveTwo,
    DeadThree,
    LiveThree,
    DeadFour,
    LiveFour,
    Five,
}

/// Number of pattern types.
pub const PATTERN_TYPES: usize = 9;

impl PatternType {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One threat pattern: its prototype, favoured side, type and score.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub proto: &'static str,
    pub favour: Player,
    pub kind: PatternType,
    pub score: i32,
}

/// Scoring weights per pattern type
pub struct PatternScore;

impl PatternScore {
    /// Five in a row - the game is over
    pub const FIVE: i32 = 1_000_000;
    /// Open four: unstoppable without an immediate five
    pub const LIVE_FOUR: i32 = 100_000;
    /// Blocked or gapped four: one square completes it
    pub const DEAD_FOUR: i32 = 50_000;
    /// Open three: becomes an open four if not answered
    pub const LIVE_THREE: i32 = 10_000;
    /// Blocked three
    pub const DEAD_THREE: i32 = 1_500;
    /// Open two
    pub const LIVE_TWO: i32 = 1_000;
    /// Blocked two
    pub const DEAD_TWO: i32 = 200;
    /// Lone stone with room
    pub const LIVE_ONE: i32 = 150;
    /// Lone stone against a blocker
    pub const DEAD_ONE: i32 = 50;
    /// Shared score for composite threats (double-three, four-three,
    /// double-four)
    pub const COMPOUND: i32 = 80_000;
}

/// Longest prototype, and therefore the scan radius around a move.
pub const MAX_PATTERN_LEN: usize = 7;

/// The prototype table. Mirrors and White copies are generated by the
/// matcher builder, so each entry is written left-to-right for Black.
pub const PROTOTYPES: &[(&str, PatternType, i32)] = &[
    ("xxxxx", PatternType::Five, PatternScore::FIVE),
    ("-xxxx-", PatternType::LiveFour, PatternScore::LIVE_FOUR),
    ("oxxxx^", PatternType::DeadFour, PatternScore::DEAD_FOUR),
    ("x^xxx", PatternType::DeadFour, PatternScore::DEAD_FOUR),
    ("xx^xx", PatternType::DeadFour, PatternScore::DEAD_FOUR),
    ("-xxx-", PatternType::LiveThree, PatternScore::LIVE_THREE),
    ("-xx^x-", PatternType::LiveThree, PatternScore::LIVE_THREE),
    ("oxxx^-", PatternType::DeadThree, PatternScore::DEAD_THREE),
    ("oxx^x-", PatternType::DeadThree, PatternScore::DEAD_THREE),
    ("ox^xx-", PatternType::DeadThree, PatternScore::DEAD_THREE),
    ("-xx-", PatternType::LiveTwo, PatternScore::LIVE_TWO),
    ("-x^x-", PatternType::LiveTwo, PatternScore::LIVE_TWO),
    ("oxx^-", PatternType::DeadTwo, PatternScore::DEAD_TWO),
    ("ox^x-", PatternType::DeadTwo, PatternScore::DEAD_TWO),
    ("-x-", PatternType::LiveOne, PatternScore::LIVE_ONE),
    ("ox^-", PatternType::DeadOne, PatternScore::DEAD_ONE),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_hierarchy() {
        assert!(PatternScore::FIVE > PatternScore::LIVE_FOUR);
        assert!(PatternScore::LIVE_FOUR > PatternScore::DEAD_FOUR);
        assert!(PatternScore::DEAD_FOUR > PatternScore::LIVE_THREE);
        assert!(PatternScore::LIVE_THREE > PatternScore::DEAD_THREE);
        assert!(PatternScore::DEAD_THREE > PatternScore::LIVE_TWO);
        assert!(PatternScore::LIVE_TWO > PatternScore::DEAD_TWO);
        assert!(PatternScore::DEAD_TWO > PatternScore::LIVE_ONE);
        assert!(PatternScore::LIVE_ONE > PatternScore::DEAD_ONE);
        assert!(PatternScore::COMPOUND > PatternScore::DEAD_FOUR);
    }

    #[test]
    fn prototypes_fit_scan_radius() {
        for (proto, _, _) in PROTOTYPES {
            assert!(proto.len() <= MAX_PATTERN_LEN, "{proto}");
            assert!(proto.chars().filter(|&c| c == '^').count() <= 1, "{proto}");
        }
    }

    #[test]
    fn type_order_is_ascending_strength() {
        assert!(PatternType::Five > PatternType::LiveFour);
        assert!(PatternType::LiveFour > PatternType::DeadFour);
        assert!(PatternType::LiveThree > PatternType::DeadThree);
        assert_eq!(PatternType::Five.index(), PATTERN_TYPES - 1);
    }
}
