//! Board plus line-string projections
//!
//! [`BoardMap`] owns the canonical [`Board`] and keeps, for every line in
//! the four scan directions, a glyph string (`'-'` / `'x'` / `'o'`) padded
//! with a `'?'` sentinel on both ends so edge patterns match without
//! special cases. A running Zobrist hash and the LIFO move history are
//! maintained alongside.
//!
//! There are 15 rows, 15 columns, 29 diagonals and 29 anti-diagonals:
//! 88 lines in total. The `(position, direction) -> (line, offset)`
//! mapping is computed analytically in [`BoardMap::parse_index`].

use super::zobrist;
use super::{Board, Direction, Player, Pos, BOARD_SIZE};

/// Number of line strings: rows + columns + two diagonal fans.
pub const LINE_COUNT: usize = 3 * (BOARD_SIZE + BOARD_SIZE) - 2; // 88

const DIAG_BASE: usize = 2 * BOARD_SIZE; // 30
const ANTI_BASE: usize = DIAG_BASE + (2 * BOARD_SIZE - 1); // 59

/// Edge sentinel glyph.
pub const SENTINEL: u8 = b'?';

/// A copied window of one padded line string, centred on a cell.
///
/// `start` is the cell offset (within the line, unpadded) of `text[0]`;
/// it is -1 when the window begins at the left sentinel.
pub(crate) struct LineSegment {
    pub text: [u8; BOARD_SIZE + 2],
    pub len: usize,
    pub line: usize,
    pub start: isize,
}

impl LineSegment {
    #[inline]
    pub fn glyphs(&self) -> &[u8] {
        &self.text[..self.len]
    }
}

/// Board state mirrored into per-line glyph strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardMap {
    board: Board,
    lines: Vec<Vec<u8>>,
    hash: u64,
    history: Vec<Pos>,
}

impl BoardMap {
    pub fn new() -> Self {
        let lines = (0..LINE_COUNT)
            .map(|li| {
                let len = Self::line_len(li);
                let mut line = vec![b'-'; len + 2];
                line[0] = SENTINEL;
                line[len + 1] = SENTINEL;
                line
            })
            .collect();
        Self {
            board: Board::new(),
            lines,
            hash: 0,
            history: Vec::with_capacity(super::TOTAL_CELLS),
        }
    }

    /// Line index and cell offset of `pos` within the line running
    /// through it along `dir`. Offsets are unpadded: the glyph lives at
    /// `offset + 1` in the stored string.
    #[inline]
    pub fn parse_index(pos: Pos, dir: Direction) -> (usize, usize) {
        let (x, y) = (pos.x as usize, pos.y as usize);
        match dir {
            Direction::Horizontal => (y, x),
            Direction::Vertical => (BOARD_SIZE + x, y),
            Direction::Diagonal => (DIAG_BASE + (y + BOARD_SIZE - 1 - x), x.min(y)),
            Direction::AntiDiagonal => (ANTI_BASE + (x + y), y.min(BOARD_SIZE - 1 - x)),
        }
    }

    /// Inverse of [`BoardMap::parse_index`]: the board cell at `offset`
    /// on line `line`.
    #[inline]
    pub fn cell_at(line: usize, offset: usize) -> Pos {
        let o = offset as u8;
        let last = (BOARD_SIZE - 1) as u8;
        if line < BOARD_SIZE {
            Pos::new(o, line as u8)
        } else if line < DIAG_BASE {
            Pos::new((line - BOARD_SIZE) as u8, o)
        } else if line < ANTI_BASE {
            let d = (line - DIAG_BASE) as u8;
            if d <= last {
                Pos::new(last - d + o, o)
            } else {
                Pos::new(o, d - last + o)
            }
        } else {
            let s = (line - ANTI_BASE) as u8;
            let x0 = s.min(last);
            Pos::new(x0 - o, s - x0 + o)
        }
    }

    /// Unpadded length of line `line`.
    #[inline]
    pub fn line_len(line: usize) -> usize {
        if line < DIAG_BASE {
            BOARD_SIZE
        } else if line < ANTI_BASE {
            let d = (line - DIAG_BASE) as i32;
            (BOARD_SIZE as i32 - (d - (BOARD_SIZE as i32 - 1)).abs()) as usize
        } else {
            let s = (line - ANTI_BASE) as i32;
            (BOARD_SIZE as i32 - (s - (BOARD_SIZE as i32 - 1)).abs()) as usize
        }
    }

    /// The padded line string containing `pos` along `dir`.
    #[inline]
    pub fn line_view(&self, pos: Pos, dir: Direction) -> &[u8] {
        let (line, _) = Self::parse_index(pos, dir);
        &self.lines[line]
    }

    /// Copy of the padded window of radius `radius` centred on `pos`
    /// along `dir`, clipped at the sentinels.
    pub(crate) fn segment(&self, pos: Pos, dir: Direction, radius: usize) -> LineSegment {
        let (line, offset) = Self::parse_index(pos, dir);
        let padded = &self.lines[line];
        let center = offset + 1;
        let lo = center.saturating_sub(radius);
        let hi = (center + radius).min(padded.len() - 1);
        let mut text = [0u8; BOARD_SIZE + 2];
        let len = hi - lo + 1;
        text[..len].copy_from_slice(&padded[lo..=hi]);
        LineSegment {
            text,
            len,
            line,
            start: lo as isize - 1,
        }
    }

    /// Forward to [`Board::apply_move`] and, on success, update the four
    /// line glyphs, the hash and the history.
    pub fn apply_move(&mut self, pos: Pos) -> Player {
        self.apply_move_with(pos, true)
    }

    pub(crate) fn apply_move_with(&mut self, pos: Pos, check_victory: bool) -> Player {
        let cur = self.board.cur_player();
        let next = self.board.apply_move_with(pos, check_victory);
        if next == cur {
            // Rejected: an accepted move always changes the side to move.
            return next;
        }
        for dir in Direction::ALL {
            let (line, offset) = Self::parse_index(pos, dir);
            self.lines[line][offset + 1] = cur.glyph();
        }
        self.hash ^= zobrist::keys().key(pos, cur);
        self.history.push(pos);
        next
    }

    /// Undo the last `count` applied moves in LIFO order. Stops early if
    /// the history runs out; returns the resulting side to move.
    pub fn revert_move(&mut self, count: usize) -> Player {
        let mut next = self.board.cur_player();
        for _ in 0..count {
            let Some(&pos) = self.history.last() else {
                break;
            };
            let owner = self.board.player_at(pos);
            next = self.board.revert_move(pos);
            for dir in Direction::ALL {
                let (line, offset) = Self::parse_index(pos, dir);
                self.lines[line][offset + 1] = b'-';
            }
            self.hash ^= zobrist::keys().key(pos, owner);
            self.history.pop();
        }
        next
    }

    /// Clear to the empty position, reusing allocations.
    pub fn reset(&mut self) {
        self.board = Board::new();
        for (li, line) in self.lines.iter_mut().enumerate() {
            let len = Self::line_len(li);
            line.fill(b'-');
            line[0] = SENTINEL;
            line[len + 1] = SENTINEL;
        }
        self.hash = 0;
        self.history.clear();
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn last_move(&self) -> Option<Pos> {
        self.history.last().copied()
    }
}

impl Default for BoardMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip_all_cells() {
        for idx in 0..super::super::TOTAL_CELLS {
            let pos = Pos::from_index(idx);
            for dir in Direction::ALL {
                let (line, offset) = BoardMap::parse_index(pos, dir);
                assert!(line < LINE_COUNT);
                assert!(offset < BoardMap::line_len(line), "{pos:?} {dir:?}");
                assert_eq!(BoardMap::cell_at(line, offset), pos, "{dir:?}");
            }
        }
    }

    #[test]
    fn every_cell_lies_on_four_lines() {
        // Summing the line lengths counts each cell once per direction.
        let total: usize = (0..LINE_COUNT).map(BoardMap::line_len).sum();
        assert_eq!(total, 4 * super::super::TOTAL_CELLS);
    }

    #[test]
    fn glyphs_follow_moves() {
        let mut map = BoardMap::new();
        let pos = Pos::new(7, 7);
        map.apply_move(pos);
        for dir in Direction::ALL {
            let (line, offset) = BoardMap::parse_index(pos, dir);
            assert_eq!(map.lines[line][offset + 1], b'x');
        }
        map.apply_move(Pos::new(8, 7));
        let (line, offset) = BoardMap::parse_index(Pos::new(8, 7), Direction::Horizontal);
        assert_eq!(map.lines[line][offset + 1], b'o');

        map.revert_move(2);
        for line in &map.lines {
            assert!(line[1..line.len() - 1].iter().all(|&g| g == b'-'));
        }
    }

    #[test]
    fn hash_reverts_to_zero() {
        let mut map = BoardMap::new();
        assert_eq!(map.hash(), 0);
        map.apply_move(Pos::new(3, 4));
        map.apply_move(Pos::new(4, 4));
        assert_ne!(map.hash(), 0);
        map.revert_move(2);
        assert_eq!(map.hash(), 0);
    }

    #[test]
    fn hash_is_position_not_path() {
        let mut a = BoardMap::new();
        a.apply_move(Pos::new(1, 1)); // black
        a.apply_move(Pos::new(2, 2)); // white
        a.apply_move(Pos::new(3, 3)); // black

        let mut b = BoardMap::new();
        b.apply_move(Pos::new(3, 3)); // black
        b.apply_move(Pos::new(2, 2)); // white
        b.apply_move(Pos::new(1, 1)); // black

        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn rejected_moves_leave_map_untouched() {
        let mut map = BoardMap::new();
        map.apply_move(Pos::new(7, 7));
        let before = map.clone();
        let next = map.apply_move(Pos::new(7, 7));
        assert_eq!(next, Player::White);
        assert_eq!(map, before);
    }

    #[test]
    fn segment_is_clipped_at_sentinels() {
        let map = BoardMap::new();
        let seg = map.segment(Pos::new(0, 0), Direction::Horizontal, 6);
        assert_eq!(seg.start, -1);
        assert_eq!(seg.len, 8);
        assert_eq!(seg.glyphs(), b"?-------");

        let seg = map.segment(Pos::new(7, 7), Direction::Horizontal, 6);
        assert_eq!(seg.start, 1);
        assert_eq!(seg.len, 13);
        assert!(seg.glyphs().iter().all(|&g| g == b'-'));
    }

    #[test]
    fn segment_on_short_diagonal() {
        let map = BoardMap::new();
        // The corner anti-diagonal through (0,0) has length 1.
        let seg = map.segment(Pos::new(0, 0), Direction::AntiDiagonal, 6);
        assert_eq!(seg.glyphs(), b"?-?");
        assert_eq!(seg.start, -1);
    }

    #[test]
    fn reset_restores_empty_state() {
        let mut map = BoardMap::new();
        map.apply_move(Pos::new(5, 5));
        map.apply_move(Pos::new(6, 6));
        map.reset();
        assert_eq!(map, BoardMap::new());
    }
}
