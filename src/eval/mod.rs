//! Incremental position evaluation
//!
//! The [`Evaluator`] owns a [`BoardMap`] and keeps, in lockstep with it:
//!
//! - a per-cell [`Record`] for every pattern type, tallying the matches
//!   keyed on that cell (presence bits per group and direction, counts
//!   per colour),
//! - the same for the three composite threat types,
//! - four score vectors indexed by `(favour, perspective)` group,
//! - two stone-density vectors, one per colour.
//!
//! Each move touches at most the four lines through it, so apply and
//! revert re-scan only a window of radius `MAX_PATTERN_LEN - 1` per
//! line: matches of the pre-move window are subtracted, matches of the
//! post-move window added. Unchanged matches cancel, leaving exactly the
//! delta. Cost is independent of how many moves have been played.

pub mod compound;
pub mod matcher;
pub mod patterns;


// Re-exports
pub use compound::CompoundType;
pub use matcher::{Match, PatternSearch};
pub use patterns::{Pattern, PatternScore, PatternType};

use tracing::{debug, trace};

use crate::board::board_map::LineSegment;
use crate::board::{Board, BoardMap, Direction, Player, Pos, TOTAL_CELLS};

use compound::COMPOUND_TYPES;
use patterns::{MAX_PATTERN_LEN, PATTERN_TYPES};

/// Score vectors are grouped by the 2x2 table over `{Black, White}`:
/// `favour` is the side the pattern belongs to, `perspective` the side
/// asking.
#[inline]
pub const fn group(favour: Player, perspective: Player) -> usize {
    (((favour as i8 == Player::Black as i8) as usize) << 1)
        | ((perspective as i8 == Player::Black as i8) as usize)
}

/// Lane for per-colour vectors: White = 0, Black = 1.
#[inline]
const fn colour_lane(player: Player) -> usize {
    (player as i8 == Player::Black as i8) as usize
}

/// Per-cell, per-pattern-type tally.
///
/// `dirs` holds one presence bit per `(group, direction)`; `counts`
/// holds two 8-bit occurrence counts, one per colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    dirs: u16,
    counts: u16,
}

impl Record {
    fn set_dir(&mut self, delta: i32, favour: Player, perspective: Player, dir: Direction) {
        let bit = 1u16 << (group(favour, perspective) * 4 + dir.index());
        if delta > 0 {
            self.dirs |= bit;
        } else {
            self.dirs &= !bit;
        }
    }

    /// Replace the whole 4-bit direction nibble of one group.
    fn set_dirs_mask(&mut self, favour: Player, perspective: Player, mask: u16) {
        let shift = group(favour, perspective) * 4;
        self.dirs = (self.dirs & !(0xF << shift)) | ((mask & 0xF) << shift);
    }

    fn set_count(&mut self, delta: i32, player: Player) {
        let lane = 8 * colour_lane(player) as u16;
        let cur = i32::from((self.counts >> lane) & 0xFF);
        debug_assert!(cur + delta >= 0, "pattern count underflow");
        let new = (cur + delta).clamp(0, 0xFF) as u16;
        self.counts = (self.counts & !(0xFF << lane)) | (new << lane);
    }

    /// The 4-bit direction set of one group.
    #[inline]
    pub fn dirs(&self, favour: Player, perspective: Player) -> u16 {
        (self.dirs >> (group(favour, perspective) * 4)) & 0xF
    }

    #[inline]
    pub fn has(&self, favour: Player, perspective: Player, dir: Direction) -> bool {
        self.dirs(favour, perspective) & (1 << dir.index()) != 0
    }

    /// Total occurrences keyed here for one colour.
    #[inline]
    pub fn count(&self, player: Player) -> u32 {
        u32::from((self.counts >> (8 * colour_lane(player) as u16)) & 0xFF)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dirs == 0 && self.counts == 0
    }
}

/// Density kernel: 7x7, weighted by Chebyshev ring.
pub const BLOCK_SIZE: usize = 7;

const BLOCK_WEIGHTS: [[i32; BLOCK_SIZE]; BLOCK_SIZE] = [
    [1, 1, 1, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 1],
    [1, 2, 4, 4, 4, 2, 1],
    [1, 2, 4, 8, 4, 2, 1],
    [1, 2, 4, 4, 4, 2, 1],
    [1, 2, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 1, 1, 1],
];

/// Incremental pattern-distribution and score tracker.
///
/// The evaluator exclusively owns its board; read access is handed out
/// as a borrow and all mutation goes through [`Evaluator::apply_move`]
/// and [`Evaluator::revert_move`] so the distributions never drift from
/// the occupancy. Clone is a deep copy; clones evolve independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    board_map: BoardMap,
    pattern_dist: [Vec<Record>; PATTERN_TYPES],
    compound_dist: [Vec<Record>; COMPOUND_TYPES],
    scores: [Vec<i32>; 4],
    density: [Vec<i32>; 2],
    five_counts: [i32; 2],
    /// Cells whose component bits moved during the current update and
    /// whose composite presence must be refreshed.
    dirty: Vec<(Pos, Player)>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            board_map: BoardMap::new(),
            pattern_dist: std::array::from_fn(|_| vec![Record::default(); TOTAL_CELLS]),
            compound_dist: std::array::from_fn(|_| vec![Record::default(); TOTAL_CELLS]),
            scores: std::array::from_fn(|_| vec![0; TOTAL_CELLS]),
            density: std::array::from_fn(|_| vec![0; TOTAL_CELLS]),
            five_counts: [0; 2],
            dirty: Vec::new(),
        }
    }

    /// The board being evaluated. Do not mutate it out of band; clone it
    /// instead.
    #[inline]
    pub fn board(&self) -> &Board {
        self.board_map.board()
    }

    #[inline]
    pub fn board_map(&self) -> &BoardMap {
        &self.board_map
    }

    /// Per-cell accumulated pattern scores for one group.
    #[inline]
    pub fn scores(&self, favour: Player, perspective: Player) -> &[i32] {
        &self.scores[group(favour, perspective)]
    }

    /// Per-cell stone density of one colour.
    #[inline]
    pub fn density(&self, player: Player) -> &[i32] {
        &self.density[colour_lane(player)]
    }

    /// Tally of `kind` patterns keyed on `pos`.
    #[inline]
    pub fn pattern_at(&self, kind: PatternType, pos: Pos) -> Record {
        self.pattern_dist[kind.index()][pos.index()]
    }

    /// Whether a composite threat of `kind` is present on `pos` for
    /// `player`.
    #[inline]
    pub fn compound_at(&self, kind: CompoundType, pos: Pos, player: Player) -> bool {
        self.compound_dist[kind.index()][pos.index()].count(player) > 0
    }

    /// Play a stone for the side to move. Same contract as
    /// [`Board::apply_move`]; on rejection nothing changes.
    pub fn apply_move(&mut self, pos: Pos) -> Player {
        self.apply_move_with(pos, true)
    }

    fn apply_move_with(&mut self, pos: Pos, check_victory: bool) -> Player {
        let board = self.board_map.board();
        if board.cur_player() == Player::None || !board.check_move(pos) {
            return board.cur_player();
        }
        let player = board.cur_player();
        self.scan_lines(pos, -1);
        let next = self.board_map.apply_move_with(pos, check_victory);
        self.scan_lines(pos, 1);
        self.flush_compounds();
        self.update_block(1, pos, player);
        if next == Player::None {
            debug!(winner = ?self.board().winner(), moves = self.board_map.move_count(), "game over");
        }
        next
    }

    /// Undo the last `count` moves in LIFO order. Reverting past the
    /// start of the history stops early and leaves the rest unchanged.
    pub fn revert_move(&mut self, count: usize) -> Player {
        let mut next = self.board_map.board().cur_player();
        for _ in 0..count {
            let Some(pos) = self.board_map.last_move() else {
                break;
            };
            let owner = self.board_map.board().player_at(pos);
            self.scan_lines(pos, -1);
            next = self.board_map.revert_move(1);
            self.scan_lines(pos, 1);
            self.flush_compounds();
            self.update_block(-1, pos, owner);
        }
        next
    }

    /// Constant-time game-over check: a five is on the board for either
    /// colour, or no empty cell remains.
    #[inline]
    pub fn check_game_end(&self) -> bool {
        self.five_counts[0] > 0
            || self.five_counts[1] > 0
            || self.board().count(Player::None) == 0
    }

    /// Rebuild all incremental state to match `target`.
    ///
    /// The move order is synthesised (Black first, alternating over the
    /// two occupancy sets); the distributions depend only on the final
    /// configuration. The target's turn and winner are adopted verbatim.
    pub fn sync_with_board(&mut self, target: &Board) {
        self.reset();
        let blacks: Vec<Pos> = target.stones(Player::Black).iter().collect();
        let whites: Vec<Pos> = target.stones(Player::White).iter().collect();
        trace!(blacks = blacks.len(), whites = whites.len(), "sync with board");
        for i in 0..blacks.len().max(whites.len()) {
            if let Some(&pos) = blacks.get(i) {
                self.apply_move_with(pos, false);
            }
            if let Some(&pos) = whites.get(i) {
                self.apply_move_with(pos, false);
            }
        }
        let status = target.status();
        self.board_map
            .board_mut()
            .set_outcome(status.cur_player, status.winner);
    }

    /// Clear to the empty position, reusing allocations.
    pub fn reset(&mut self) {
        self.board_map.reset();
        for dist in &mut self.pattern_dist {
            dist.fill(Record::default());
        }
        for dist in &mut self.compound_dist {
            dist.fill(Record::default());
        }
        for scores in &mut self.scores {
            scores.fill(0);
        }
        for density in &mut self.density {
            density.fill(0);
        }
        self.five_counts = [0; 2];
        self.dirty.clear();
        trace!("evaluator reset");
    }

    /// Re-scan the four windows through `pos`, applying `delta` to every
    /// match found.
    fn scan_lines(&mut self, pos: Pos, delta: i32) {
        for dir in Direction::ALL {
            let seg = self.board_map.segment(pos, dir, MAX_PATTERN_LEN - 1);
            self.update_line(&seg, delta, dir);
        }
    }

    fn update_line(&mut self, seg: &LineSegment, delta: i32, dir: Direction) {
        let search = matcher::searcher();
        for hit in search.execute(seg.glyphs()) {
            let pat = search.pattern(hit.pattern);
            // Key slots are stones or playable empties, never sentinels,
            // so the offset is a real cell of the line.
            let offset = seg.start + hit.key_offset as isize;
            debug_assert!(offset >= 0);
            let pos = BoardMap::cell_at(seg.line, offset as usize);
            let idx = pos.index();
            {
                let rec = &mut self.pattern_dist[pat.kind.index()][idx];
                rec.set_dir(delta, pat.favour, Player::Black, dir);
                rec.set_dir(delta, pat.favour, Player::White, dir);
                rec.set_count(delta, pat.favour);
            }
            for perspective in [Player::Black, Player::White] {
                self.scores[group(pat.favour, perspective)][idx] += delta * pat.score;
            }
            if pat.kind == PatternType::Five {
                self.five_counts[colour_lane(pat.favour)] += delta;
            }
            if compound::is_component(pat.kind) {
                self.dirty.push((pos, pat.favour));
            }
        }
    }

    /// Refresh composite presence at every cell touched by the scans.
    /// Duplicate entries are harmless; the refresh is idempotent.
    fn flush_compounds(&mut self) {
        while let Some((pos, player)) = self.dirty.pop() {
            compound::update(self, pos, player);
        }
    }

    /// Add or remove one stone's density contribution.
    fn update_block(&mut self, delta: i32, pos: Pos, player: Player) {
        let lane = colour_lane(player);
        let r = (BLOCK_SIZE / 2) as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let x = i32::from(pos.x) + dx;
                let y = i32::from(pos.y) + dy;
                if Pos::is_valid(x, y) {
                    let idx = Pos::new(x as u8, y as u8).index();
                    self.density[lane][idx] +=
                        delta * BLOCK_WEIGHTS[(dy + r) as usize][(dx + r) as usize];
                }
            }
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
