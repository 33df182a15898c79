//! Multi-pattern matching over line strings
//!
//! [`PatternSearch`] compiles the prototype table into an Aho-Corasick
//! automaton stored as double-array `base`/`check`/`fail` tables, giving
//! constant-time transitions over the four-glyph alphabet
//! `{'-', 'x', 'o', '?'}`.
//!
//! The builder expands each prototype four ways: left-to-right and
//! mirrored, favouring Black and favouring White (`x`/`o` swapped). Glyph
//! classes (`_` empty-or-edge, `o` blocker = enemy-or-edge) are expanded
//! into their concrete glyphs at build time, so queries see plain
//! strings. Every accepting state records the pattern index, the
//! concrete length and the key-slot offset of its variant.
//!
//! The automaton is immutable after construction; queries are read-only
//! and safe to share across threads.

use std::sync::OnceLock;

use crate::board::Player;

use super::patterns::{Pattern, PatternType, PROTOTYPES};

const ALPHABET: usize = 4;
const NONE: u32 = u32::MAX;

#[inline]
fn glyph_code(glyph: u8) -> usize {
    match glyph {
        b'-' => 0,
        b'x' => 1,
        b'o' => 2,
        _ => 3, // '?'
    }
}

/// Accepting-state payload: one concrete variant of one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MatchOut {
    pattern: u16,
    len: u8,
    key: u8,
}

/// One match produced by [`PatternSearch::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Index into the pattern list, see [`PatternSearch::pattern`].
    pub pattern: u16,
    /// Offset of the last matched glyph in the queried string.
    pub end: usize,
    /// Offset of the pattern's key slot in the queried string.
    pub key_offset: usize,
}

/// Compiled multi-pattern matcher.
pub struct PatternSearch {
    base: Vec<i32>,
    check: Vec<i32>,
    fail: Vec<u32>,
    outputs: Vec<Vec<MatchOut>>,
    out_link: Vec<u32>,
    patterns: Vec<Pattern>,
}

impl PatternSearch {
    /// Compile a prototype table.
    pub fn new(protos: &[(&'static str, PatternType, i32)]) -> Self {
        Builder::default().compile(protos)
    }

    /// All matches in `target`, lazily, including overlapping ones.
    pub fn execute<'s, 'a>(&'s self, target: &'a [u8]) -> Matches<'s, 'a> {
        Matches {
            search: self,
            target,
            at: 0,
            state: 0,
            emit: NONE,
            emit_idx: 0,
        }
    }

    /// Eager form of [`PatternSearch::execute`].
    pub fn matches(&self, target: &[u8]) -> Vec<Match> {
        self.execute(target).collect()
    }

    #[inline]
    pub fn pattern(&self, idx: u16) -> &Pattern {
        &self.patterns[idx as usize]
    }

    #[inline]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// One goto transition with fail fallback.
    #[inline]
    fn step(&self, mut state: usize, code: usize) -> usize {
        loop {
            let t = (self.base[state] + code as i32) as usize;
            if t < self.check.len() && self.check[t] == state as i32 {
                return t;
            }
            if state == 0 {
                return 0;
            }
            state = self.fail[state] as usize;
        }
    }
}

/// Lazy match iterator; walks output links so every pattern ending at
/// each position is reported.
pub struct Matches<'s, 'a> {
    search: &'s PatternSearch,
    target: &'a [u8],
    at: usize,
    state: usize,
    emit: u32,
    emit_idx: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        loop {
            while self.emit != NONE {
                let outs = &self.search.outputs[self.emit as usize];
                if let Some(&out) = outs.get(self.emit_idx) {
                    self.emit_idx += 1;
                    let end = self.at - 1;
                    return Some(Match {
                        pattern: out.pattern,
                        end,
                        key_offset: end + 1 - out.len as usize + out.key as usize,
                    });
                }
                self.emit = self.search.out_link[self.emit as usize];
                self.emit_idx = 0;
            }
            let &glyph = self.target.get(self.at)?;
            self.state = self.search.step(self.state, glyph_code(glyph));
            self.at += 1;
            self.emit = if self.search.outputs[self.state].is_empty() {
                self.search.out_link[self.state]
            } else {
                self.state as u32
            };
            self.emit_idx = 0;
        }
    }
}

/// The shared matcher compiled from [`PROTOTYPES`].
pub fn searcher() -> &'static PatternSearch {
    static SEARCH: OnceLock<PatternSearch> = OnceLock::new();
    SEARCH.get_or_init(|| PatternSearch::new(PROTOTYPES))
}

// ---------------------------------------------------------------------
// Construction

struct TrieNode {
    next: [i32; ALPHABET],
    fail: u32,
    out_link: u32,
    outputs: Vec<MatchOut>,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            next: [-1; ALPHABET],
            fail: 0,
            out_link: NONE,
            outputs: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Builder {
    nodes: Vec<TrieNode>,
    patterns: Vec<Pattern>,
}

impl Builder {
    fn compile(mut self, protos: &[(&'static str, PatternType, i32)]) -> PatternSearch {
        self.nodes.push(TrieNode::new());
        for &(proto, kind, score) in protos {
            for favour in [Player::Black, Player::White] {
                let id = self.patterns.len() as u16;
                self.patterns.push(Pattern {
                    proto,
                    favour,
                    kind,
                    score,
                });
                let classes = glyph_classes(proto, favour);
                let key = key_slot(proto);
                let len = proto.len();
                self.insert_variants(&classes, id, len as u8, key as u8);
                let mirrored: String = proto.chars().rev().collect();
                if mirrored != proto {
                    let rev: Vec<&'static [u8]> = classes.iter().rev().copied().collect();
                    self.insert_variants(&rev, id, len as u8, (len - 1 - key) as u8);
                }
            }
        }
        self.link_failures();
        self.encode()
    }

    /// Insert every concrete expansion of `classes` into the trie,
    /// depth-first over the glyph-class product.
    fn insert_variants(&mut self, classes: &[&[u8]], pattern: u16, len: u8, key: u8) {
        self.insert_rec(0, classes, MatchOut { pattern, len, key });
    }

    fn insert_rec(&mut self, node: usize, classes: &[&[u8]], out: MatchOut) {
        let Some((&class, rest)) = classes.split_first() else {
            if !self.nodes[node].outputs.contains(&out) {
                self.nodes[node].outputs.push(out);
            }
            return;
        };
        for &glyph in class {
            let code = glyph_code(glyph);
            let child = match self.nodes[node].next[code] {
                c if c >= 0 => c as usize,
                _ => {
                    let c = self.nodes.len();
                    self.nodes.push(TrieNode::new());
                    self.nodes[node].next[code] = c as i32;
                    c
                }
            };
            self.insert_rec(child, rest, out);
        }
    }

    /// BFS over the trie assigning fail links and output links.
    fn link_failures(&mut self) {
        let mut queue = std::collections::VecDeque::new();
        for code in 0..ALPHABET {
            let child = self.nodes[0].next[code];
            if child >= 0 {
                self.nodes[child as usize].fail = 0;
                queue.push_back(child as usize);
            }
        }
        while let Some(node) = queue.pop_front() {
            let node_fail = self.nodes[node].fail as usize;
            self.nodes[node].out_link = if self.nodes[node_fail].outputs.is_empty() {
                self.nodes[node_fail].out_link
            } else {
                node_fail as u32
            };
            for code in 0..ALPHABET {
                let child = self.nodes[node].next[code];
                if child < 0 {
                    continue;
                }
                let child = child as usize;
                let mut f = self.nodes[node].fail as usize;
                while f != 0 && self.nodes[f].next[code] < 0 {
                    f = self.nodes[f].fail as usize;
                }
                let target = self.nodes[f].next[code];
                self.nodes[child].fail = if target >= 0 && target as usize != child {
                    target as u32
                } else {
                    0
                };
                queue.push_back(child);
            }
        }
    }

    /// Re-encode the trie into double-array form, BFS order.
    fn encode(self) -> PatternSearch {
        let node_count = self.nodes.len();
        let mut cap = node_count * 2 + ALPHABET + 1;
        let mut base = vec![0i32; cap];
        let mut check = vec![-1i32; cap];
        let mut slot_of = vec![NONE; node_count];
        slot_of[0] = 0;

        let mut queue = std::collections::VecDeque::new();
        queue.push_back(0usize);
        while let Some(node) = queue.pop_front() {
            let slot = slot_of[node] as usize;
            let children: Vec<(usize, usize)> = (0..ALPHABET)
                .filter_map(|code| {
                    let c = self.nodes[node].next[code];
                    (c >= 0).then(|| (code, c as usize))
                })
                .collect();
            if children.is_empty() {
                continue;
            }
            // Smallest base whose child slots are all free.
            let mut b = 1usize;
            'search: loop {
                if b + ALPHABET >= cap {
                    cap = (b + ALPHABET + 1) * 2;
                    base.resize(cap, 0);
                    check.resize(cap, -1);
                }
                for &(code, _) in &children {
                    if check[b + code] != -1 {
                        b += 1;
                        continue 'search;
                    }
                }
                break;
            }
            base[slot] = b as i32;
            for &(code, child) in &children {
                let t = b + code;
                check[t] = slot as i32;
                slot_of[child] = t as u32;
                queue.push_back(child);
            }
        }

        let size = check.len();
        let mut fail = vec![0u32; size];
        let mut out_link = vec![NONE; size];
        let mut outputs = vec![Vec::new(); size];
        for (node, trie) in self.nodes.into_iter().enumerate() {
            let slot = slot_of[node] as usize;
            fail[slot] = slot_of[trie.fail as usize];
            out_link[slot] = match trie.out_link {
                NONE => NONE,
                link => slot_of[link as usize],
            };
            outputs[slot] = trie.outputs;
        }

        PatternSearch {
            base,
            check,
            fail,
            outputs,
            out_link,
            patterns: self.patterns,
        }
    }
}

/// Per-glyph candidate sets for one colour copy of a prototype.
///
/// For the Black copy, `x` is the favoured stone and `o` the blocker
/// class; the White copy swaps them. Blockers and `_` match the edge
/// sentinel as well.
fn glyph_classes(proto: &str, favour: Player) -> Vec<&'static [u8]> {
    proto
        .bytes()
        .map(|ch| -> &'static [u8] {
            match (ch, favour) {
                (b'x', Player::Black) => b"x",
                (b'x', _) => b"o",
                (b'o', Player::Black) => b"o?",
                (b'o', _) => b"x?",
                (b'-', _) | (b'^', _) => b"-",
                (b'_', _) => b"-?",
                _ => unreachable!("bad proto glyph {ch}"),
            }
        })
        .collect()
}

/// Key slot of a prototype: the `^` if present, else the favoured stone
/// closest to the centre (ties to the left).
fn key_slot(proto: &str) -> usize {
    if let Some(caret) = proto.bytes().position(|ch| ch == b'^') {
        return caret;
    }
    let len = proto.len() as i32;
    proto
        .bytes()
        .enumerate()
        .filter(|&(_, ch)| ch == b'x')
        .min_by_key(|&(i, _)| (2 * i as i32 - (len - 1)).abs())
        .map(|(i, _)| i)
        .expect("prototype without a favoured stone")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(target: &[u8]) -> Vec<(PatternType, Player, usize)> {
        searcher()
            .matches(target)
            .into_iter()
            .map(|m| {
                let p = searcher().pattern(m.pattern);
                (p.kind, p.favour, m.key_offset)
            })
            .collect()
    }

    #[test]
    fn builds_two_colour_copies_per_prototype() {
        assert_eq!(searcher().pattern_count(), 2 * PROTOTYPES.len());
    }

    #[test]
    fn finds_black_five() {
        let found = hits(b"?xxxxx?");
        assert!(found.contains(&(PatternType::Five, Player::Black, 3)));
    }

    #[test]
    fn finds_white_five() {
        let found = hits(b"?ooooo?");
        assert!(found.contains(&(PatternType::Five, Player::White, 3)));
    }

    #[test]
    fn overline_matches_twice() {
        let fives = hits(b"?xxxxxx?")
            .into_iter()
            .filter(|&(kind, _, _)| kind == PatternType::Five)
            .count();
        assert_eq!(fives, 2);
    }

    #[test]
    fn live_four_is_exactly_one_match() {
        let found = hits(b"-xxxx-");
        assert_eq!(found, vec![(PatternType::LiveFour, Player::Black, 2)]);
    }

    #[test]
    fn edge_blocked_four_is_dead() {
        // `oxxxx^` with the edge sentinel standing in for the blocker.
        let found = hits(b"?xxxx-");
        assert!(found.contains(&(PatternType::DeadFour, Player::Black, 5)));
        assert!(!found
            .iter()
            .any(|&(kind, _, _)| kind == PatternType::LiveFour));
    }

    #[test]
    fn gapped_four_keys_on_the_gap() {
        let found = hits(b"?xx-xx?");
        assert_eq!(found, vec![(PatternType::DeadFour, Player::Black, 3)]);
    }

    #[test]
    fn live_three_keys_on_centre_stone() {
        let found = hits(b"--xxx--");
        assert!(found.contains(&(PatternType::LiveThree, Player::Black, 3)));
    }

    #[test]
    fn white_copy_mirrors_blocker_class() {
        let found = hits(b"-oooo?");
        assert!(found.contains(&(PatternType::DeadFour, Player::White, 0)));
    }

    #[test]
    fn empty_line_matches_nothing() {
        assert!(hits(b"?---------------?").is_empty());
    }

    #[test]
    fn lone_stone_is_a_live_one() {
        let found = hits(b"?---x---?");
        assert!(found.contains(&(PatternType::LiveOne, Player::Black, 4)));
    }

    #[test]
    fn key_slot_prefers_caret() {
        assert_eq!(key_slot("oxx^x-"), 3);
        assert_eq!(key_slot("xxxxx"), 2);
        assert_eq!(key_slot("-xxxx-"), 2);
        assert_eq!(key_slot("-xx-"), 1);
    }
}
