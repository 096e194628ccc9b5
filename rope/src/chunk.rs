// Copyright 2016 The xi-editor Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The leaf element of text ropes: a short string with cached counts.

use std::fmt;
use std::mem;

use bigstring_unicode::{
    count_utf16_code_units, is_codepoint_boundary, len_utf8_from_first_byte,
    next_codepoint_boundary, prev_codepoint_boundary, utf16_len_from_first_byte, Breaks,
    GraphemeRecognizer,
};
use log::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::metrics::Summary;
use crate::tree::RopeElement;

/// Counts cached for a chunk. Every field fits in a byte because chunks are
/// at most `Chunk::MAX_UTF8_COUNT` bytes long.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Counts {
    utf8: u8,
    utf16: u8,
    scalars: u8,
    characters: u8,
    // Meaningful only when `characters > 0`.
    first_break: u8,
    last_break: u8,
}

/// A piece of text of at most `MAX_UTF8_COUNT` bytes, starting and ending on
/// scalar boundaries.
///
/// Besides the usual counts, a chunk caches where the first and the last
/// grapheme cluster starting inside it begin. Clusters may span chunks, so
/// these depend on the text before the chunk, and are kept up to date by the
/// string layer as it edits.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    string: String,
    counts: Counts,
}

/// What a grapheme break resynchronization did to a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResyncOutcome {
    /// How many cached breaks were added or removed.
    pub corrections: usize,
    /// Whether the old and new break sequences converged inside this chunk,
    /// so nothing after it can be affected.
    pub converged: bool,
}

fn push_break(span: &mut Option<Breaks>, offset: usize) {
    match span {
        Some(b) => {
            b.last = offset;
            b.count += 1;
        }
        None => *span = Some(Breaks { first: offset, last: offset, count: 1 }),
    }
}

impl Chunk {
    pub const MAX_UTF8_COUNT: usize = 255;
    /// Slack allowed when cutting a string near a target length, since cuts
    /// have to fall on scalar boundaries.
    pub const MAX_SLICING_ERROR: usize = 3;
    pub const MIN_UTF8_COUNT: usize = Chunk::MAX_UTF8_COUNT / 2 - Chunk::MAX_SLICING_ERROR;

    /// A chunk of `text`, whose grapheme breaks are found by feeding it to
    /// `state`.
    pub fn new(text: &str, state: &mut GraphemeRecognizer) -> Chunk {
        assert!(text.len() <= Chunk::MAX_UTF8_COUNT, "chunk text too long");
        let breaks = state.consume(text);
        Chunk::from_parts(text.to_owned(), breaks)
    }

    fn from_parts(string: String, breaks: Option<Breaks>) -> Chunk {
        debug_assert!(string.len() <= Chunk::MAX_UTF8_COUNT);
        let mut counts = Counts {
            utf8: string.len() as u8,
            utf16: count_utf16_code_units(&string) as u8,
            scalars: bytecount::num_chars(string.as_bytes()) as u8,
            ..Counts::default()
        };
        counts.set_breaks(breaks);
        Chunk { string, counts }
    }

    pub fn as_str(&self) -> &str {
        &self.string
    }

    pub fn utf8_count(&self) -> usize {
        usize::from(self.counts.utf8)
    }

    pub fn utf16_count(&self) -> usize {
        usize::from(self.counts.utf16)
    }

    pub fn scalar_count(&self) -> usize {
        usize::from(self.counts.scalars)
    }

    /// Number of grapheme clusters starting in this chunk.
    pub fn character_count(&self) -> usize {
        usize::from(self.counts.characters)
    }

    pub fn has_breaks(&self) -> bool {
        self.counts.characters > 0
    }

    pub fn first_break(&self) -> Option<usize> {
        self.break_span().map(|b| b.first)
    }

    pub fn last_break(&self) -> Option<usize> {
        self.break_span().map(|b| b.last)
    }

    pub(crate) fn break_span(&self) -> Option<Breaks> {
        if self.has_breaks() {
            Some(Breaks {
                first: usize::from(self.counts.first_break),
                last: usize::from(self.counts.last_break),
                count: self.character_count(),
            })
        } else {
            None
        }
    }

    /// Byte offsets of all grapheme breaks in this chunk, in order.
    pub fn breaks(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        // Past the first break, the chunk can be segmented on its own.
        let start = self.first_break().unwrap_or_else(|| self.string.len());
        self.string[start..].grapheme_indices(true).map(move |(offset, _)| start + offset)
    }

    /// The last break strictly before `offset`.
    pub(crate) fn break_before(&self, offset: usize) -> Option<usize> {
        match self.break_span() {
            Some(span) if span.first < offset => {
                if span.last < offset {
                    Some(span.last)
                } else {
                    self.breaks().take_while(|&b| b < offset).last()
                }
            }
            _ => None,
        }
    }

    /// The first break strictly after `offset`.
    pub(crate) fn break_after(&self, offset: usize) -> Option<usize> {
        match self.break_span() {
            Some(span) if span.last > offset => {
                if span.first > offset {
                    Some(span.first)
                } else {
                    self.breaks().find(|&b| b > offset)
                }
            }
            _ => None,
        }
    }

    pub(crate) fn is_break(&self, offset: usize) -> bool {
        match self.break_span() {
            Some(span) if span.first <= offset && offset <= span.last => {
                offset == span.first || offset == span.last || self.breaks().any(|b| b == offset)
            }
            _ => false,
        }
    }

    pub fn is_scalar_boundary(&self, offset: usize) -> bool {
        is_codepoint_boundary(self.string.as_bytes(), offset)
    }

    /// Rounds `offset` down to a scalar boundary.
    pub(crate) fn scalar_floor(&self, offset: usize) -> usize {
        if self.is_scalar_boundary(offset) {
            offset
        } else {
            prev_codepoint_boundary(self.string.as_bytes(), offset).unwrap_or(0)
        }
    }

    /// UTF-16 code units before the scalar containing `offset`.
    pub(crate) fn utf16_offset(&self, offset: usize) -> usize {
        count_utf16_code_units(&self.string[..self.scalar_floor(offset)])
    }

    /// Scalars before the scalar containing `offset`.
    pub(crate) fn scalar_offset(&self, offset: usize) -> usize {
        bytecount::num_chars(&self.string.as_bytes()[..self.scalar_floor(offset)])
    }

    /// Grapheme breaks before `offset`.
    pub(crate) fn character_offset(&self, offset: usize) -> usize {
        match self.break_span() {
            None => 0,
            Some(span) if offset > span.last => span.count,
            Some(_) => self.breaks().take_while(|&b| b < offset).count(),
        }
    }

    /// Byte offset of the scalar containing UTF-16 unit `units`, and whether
    /// the unit is a trailing surrogate.
    pub(crate) fn utf16_position(&self, units: usize) -> (usize, bool) {
        let bytes = self.string.as_bytes();
        let mut seen = 0;
        let mut offset = 0;
        while offset < bytes.len() {
            let width = utf16_len_from_first_byte(bytes[offset]);
            if units < seen + width {
                return (offset, units > seen);
            }
            seen += width;
            offset += len_utf8_from_first_byte(bytes[offset]);
        }
        (bytes.len(), false)
    }

    /// Byte offset of scalar number `n`.
    pub(crate) fn scalar_position(&self, n: usize) -> usize {
        let bytes = self.string.as_bytes();
        let mut offset = 0;
        for _ in 0..n {
            match next_codepoint_boundary(bytes, offset) {
                Some(next) => offset = next,
                None => break,
            }
        }
        offset
    }

    /// Byte offset of grapheme break number `n`.
    pub(crate) fn character_position(&self, n: usize) -> usize {
        match self.break_span() {
            Some(span) if n == 0 => span.first,
            Some(span) if n + 1 == span.count => span.last,
            _ => self.breaks().nth(n).unwrap_or_else(|| self.string.len()),
        }
    }

    /// Appends the contents of `other`. The result must fit in a chunk.
    pub(crate) fn append(&mut self, other: Chunk) {
        let base = self.string.len();
        debug_assert!(base + other.string.len() <= Chunk::MAX_UTF8_COUNT);
        let shifted = other.break_span().map(|b| Breaks {
            first: b.first + base,
            last: b.last + base,
            count: b.count,
        });
        let breaks = Chunk::join_spans(self.break_span(), shifted);
        self.string.push_str(&other.string);
        self.counts.utf8 += other.counts.utf8;
        self.counts.utf16 += other.counts.utf16;
        self.counts.scalars += other.counts.scalars;
        self.counts.set_breaks(breaks);
    }

    /// Re-derives the cached grapheme breaks of this chunk after the text
    /// before it changed.
    ///
    /// `old` must be the recognizer state at the start of the chunk for the
    /// text before the change, and `new` the state for the text after it.
    /// Both are advanced over the scanned scalars. Scanning stops as soon as
    /// the two states are bound to agree from then on.
    pub fn resync_breaks(
        &mut self,
        old: &mut GraphemeRecognizer,
        new: &mut GraphemeRecognizer,
    ) -> ResyncOutcome {
        let mut corrections = 0;
        let mut scanned: Option<Breaks> = None;
        let mut stop = None;
        for (offset, c) in self.string.char_indices() {
            let old_break = old.has_break(c);
            let new_break = new.has_break(c);
            if new_break {
                push_break(&mut scanned, offset);
            }
            if old_break != new_break {
                corrections += 1;
            } else if old_break || old.is_known_equal(new) {
                // Both states now make the same decisions.
                stop = Some(offset);
                break;
            }
        }
        let converged = stop.is_some();
        if corrections > 0 {
            let breaks = match stop {
                Some(stop) => Chunk::join_spans(scanned, self.span_after(stop)),
                None => scanned,
            };
            trace!("resynced {} grapheme breaks, converged: {}", corrections, converged);
            self.counts.set_breaks(breaks);
        }
        ResyncOutcome { corrections, converged }
    }

    /// The cached breaks strictly after `offset`.
    fn span_after(&self, offset: usize) -> Option<Breaks> {
        let span = self.break_span()?;
        if span.last <= offset {
            return None;
        }
        let before = self.breaks().take_while(|&b| b <= offset).count();
        let first = self.break_after(offset)?;
        Some(Breaks { first, last: span.last, count: span.count - before })
    }

    /// The cached breaks strictly before `offset`.
    fn span_before(&self, offset: usize) -> Option<Breaks> {
        let span = self.break_span()?;
        if span.first >= offset {
            return None;
        }
        let last = self.break_before(offset)?;
        Some(Breaks { first: span.first, last, count: self.character_offset(offset) })
    }

    fn join_spans(left: Option<Breaks>, right: Option<Breaks>) -> Option<Breaks> {
        match (left, right) {
            (Some(a), Some(b)) => Some(Breaks { first: a.first, last: b.last, count: a.count + b.count }),
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Checks the cached breaks against the text, given the recognizer state
    /// at the start of the chunk, and advances `state` past it.
    #[cfg(test)]
    pub(crate) fn verify(&self, state: &mut GraphemeRecognizer) {
        assert!(!self.string.is_empty(), "empty chunk");
        assert!(self.string.len() <= Chunk::MAX_UTF8_COUNT, "oversized chunk");
        assert_eq!(self.break_span(), state.consume(&self.string), "stale grapheme breaks");
    }
}

impl Counts {
    fn set_breaks(&mut self, breaks: Option<Breaks>) {
        match breaks {
            Some(b) => {
                self.characters = b.count as u8;
                self.first_break = b.first as u8;
                self.last_break = b.last as u8;
            }
            None => {
                self.characters = 0;
                self.first_break = 0;
                self.last_break = 0;
            }
        }
    }
}

impl RopeElement for Chunk {
    type Summary = Summary;
    type Index = usize;

    fn summary(&self) -> Summary {
        Summary {
            utf8: self.utf8_count(),
            utf16: self.utf16_count(),
            unicode_scalars: self.scalar_count(),
            characters: self.character_count(),
        }
    }

    fn is_empty(&self) -> bool {
        self.string.is_empty()
    }

    fn is_undersized(&self) -> bool {
        self.string.len() < Chunk::MIN_UTF8_COUNT
    }

    fn invariant_check(&self) {
        assert!(!self.string.is_empty(), "empty chunk");
        assert!(self.string.len() <= Chunk::MAX_UTF8_COUNT, "oversized chunk");
        assert_eq!(self.utf16_count(), count_utf16_code_units(&self.string));
        assert_eq!(self.scalar_count(), self.string.chars().count());
        if let Some(span) = self.break_span() {
            assert!(span.first <= span.last && span.last < self.string.len());
            assert!(self.is_scalar_boundary(span.first) && self.is_scalar_boundary(span.last));
        }
    }

    fn rebalance_next_neighbor(&mut self, right: &mut Chunk) -> bool {
        let total = self.string.len() + right.string.len();
        if total <= Chunk::MAX_UTF8_COUNT {
            self.append(mem::take(right));
            return true;
        }
        if !self.is_undersized() && !right.is_undersized() {
            return false;
        }
        let target = total / 2;
        if self.string.len() < target {
            let cut = right.scalar_floor(target - self.string.len());
            let rest = right.split(cut);
            let moved = mem::replace(right, rest);
            self.append(moved);
        } else {
            let cut = self.scalar_floor(target);
            let mut tail = self.split(cut);
            tail.append(mem::take(right));
            *right = tail;
        }
        false
    }

    fn rebalance_prev_neighbor(&mut self, left: &mut Chunk) -> bool {
        if left.rebalance_next_neighbor(self) {
            mem::swap(left, self);
            return true;
        }
        false
    }

    fn split(&mut self, at: usize) -> Chunk {
        assert!(self.is_scalar_boundary(at), "chunk split inside a scalar");
        let before = self.span_before(at);
        let after = if at == 0 { self.break_span() } else { self.span_after(at - 1) };
        let tail = self.string.split_off(at);
        let after = after.map(|b| Breaks { first: b.first - at, last: b.last - at, count: b.count });
        *self = Chunk::from_parts(mem::take(&mut self.string), before);
        Chunk::from_parts(tail, after)
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Chunk({:?}, {} breaks)", self.string, self.character_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk::new(text, &mut GraphemeRecognizer::new())
    }

    fn all_breaks(chunk: &Chunk) -> Vec<usize> {
        chunk.breaks().collect()
    }

    #[test]
    fn counts() {
        let c = chunk("a\u{e9}\u{1F600}e\u{301}");
        assert_eq!(c.utf8_count(), 1 + 2 + 4 + 1 + 2);
        assert_eq!(c.utf16_count(), 1 + 1 + 2 + 1 + 1);
        assert_eq!(c.scalar_count(), 5);
        assert_eq!(c.character_count(), 4);
        assert_eq!(c.first_break(), Some(0));
        assert_eq!(c.last_break(), Some(7));
        assert_eq!(all_breaks(&c), vec![0, 1, 3, 7]);
    }

    #[test]
    fn chunk_without_breaks() {
        let mut state = GraphemeRecognizer::new();
        state.consume("e");
        let c = Chunk::new("\u{301}\u{302}", &mut state);
        assert!(!c.has_breaks());
        assert_eq!(c.character_count(), 0);
        assert_eq!(all_breaks(&c), Vec::<usize>::new());
        assert_eq!(c.character_offset(4), 0);
        assert_eq!(c.character_position(0), 4);
    }

    #[test]
    fn local_conversions() {
        let c = chunk("a\u{1F600}b\u{301}c");
        assert_eq!(c.utf16_offset(5), 3);
        assert_eq!(c.utf16_position(1), (1, false));
        assert_eq!(c.utf16_position(2), (1, true));
        assert_eq!(c.utf16_position(3), (5, false));
        assert_eq!(c.scalar_offset(6), 3);
        assert_eq!(c.scalar_position(3), 6);
        assert_eq!(c.character_offset(8), 3);
        assert_eq!(c.character_position(3), 8);
        assert_eq!(c.break_before(8), Some(5));
        assert_eq!(c.break_after(5), Some(8));
        assert!(c.is_break(5));
        assert!(!c.is_break(6));
        assert_eq!(c.scalar_floor(3), 1);
    }

    #[test]
    fn split_and_append_keep_breaks() {
        let text = "ab\u{301}cd\r\nef";
        let original = chunk(text);
        for at in (0..=text.len()).filter(|&i| text.is_char_boundary(i)) {
            let mut left = original.clone();
            let right = left.split(at);
            assert_eq!(left.as_str(), &text[..at]);
            assert_eq!(right.as_str(), &text[at..]);
            let mut joined: Vec<usize> = all_breaks(&left);
            joined.extend(right.breaks().map(|b| b + at));
            assert_eq!(joined, all_breaks(&original), "split at {}", at);
            left.append(right);
            assert_eq!(left, original);
        }
    }

    #[test]
    fn rebalancing() {
        let mut left = chunk(&"x".repeat(200));
        let mut right = chunk(&"y".repeat(100));
        assert!(!left.rebalance_next_neighbor(&mut right));
        assert_eq!(left.utf8_count(), 150);
        assert_eq!(right.utf8_count(), 150);
        assert!(right.as_str().starts_with("xx"));
        assert!(right.as_str().ends_with("yy"));

        let mut left = chunk("ab");
        let mut right = chunk("cd");
        assert!(right.rebalance_prev_neighbor(&mut left));
        assert_eq!(right.as_str(), "abcd");
        assert_eq!(right.character_count(), 4);
        assert!(RopeElement::is_empty(&left));

        let mut left = chunk(&"\u{e9}".repeat(50));
        let mut right = chunk(&"z".repeat(200));
        assert!(!left.rebalance_next_neighbor(&mut right));
        assert_eq!(left.utf8_count(), 150);
        assert_eq!(right.utf8_count(), 150);
        assert_eq!(left.character_count(), 100);
        left.invariant_check();
        right.invariant_check();
    }

    #[test]
    fn resync_after_prefix_change() {
        // "e" followed by a chunk starting with a combining mark.
        let mut c = chunk("\u{301}xy");
        assert_eq!(c.character_count(), 3);
        let mut old = GraphemeRecognizer::new();
        let mut new = GraphemeRecognizer::new();
        new.consume("e");
        let outcome = c.resync_breaks(&mut old, &mut new);
        assert_eq!(outcome, ResyncOutcome { corrections: 1, converged: true });
        assert_eq!(c.character_count(), 2);
        assert_eq!(all_breaks(&c), vec![2, 3]);
        c.verify(&mut {
            let mut s = GraphemeRecognizer::new();
            s.consume("e");
            s
        });
    }

    #[test]
    fn resync_without_change_stops_early() {
        let mut c = chunk("abc");
        let mut old = GraphemeRecognizer::new();
        let mut new = GraphemeRecognizer::new();
        let outcome = c.resync_breaks(&mut old, &mut new);
        assert_eq!(outcome, ResyncOutcome { corrections: 0, converged: true });
        assert_eq!(old.last_scalar(), Some('a'));
    }

    #[test]
    fn resync_across_whole_chunk() {
        // Regional indicators pair up differently after one is prepended.
        let flags = "\u{1F1FA}\u{1F1F8}\u{1F1EB}\u{1F1F7}";
        let mut c = chunk(flags);
        assert_eq!(all_breaks(&c), vec![0, 8]);
        let mut old = GraphemeRecognizer::new();
        let mut new = GraphemeRecognizer::new();
        new.consume("\u{1F1E9}");
        let outcome = c.resync_breaks(&mut old, &mut new);
        assert_eq!(outcome.corrections, 4);
        assert!(!outcome.converged);
        assert_eq!(all_breaks(&c), vec![4, 12]);
        assert_eq!(c.character_count(), 2);
    }
}
