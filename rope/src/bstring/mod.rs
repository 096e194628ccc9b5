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

//! Text on top of a rope of chunks.
//!
//! This layer translates between the four ways of addressing text (UTF-8
//! bytes, UTF-16 code units, Unicode scalars and characters) and positions in
//! the underlying rope, and keeps the grapheme breaks cached in chunks
//! consistent across edits.

mod builder;
mod edit;
mod find;
mod index;
mod iter;

use std::borrow::Cow;
use std::ops::Range;

use bigstring_unicode::GraphemeRecognizer;
use smallvec::SmallVec;

use crate::chunk::Chunk;
use crate::metrics::{CharacterMetric, StringMetric, UnicodeScalarMetric, Utf16Metric, Utf8Metric};
use crate::tree::{self, Rope, RopeElement};

pub(crate) use self::builder::Builder;
pub use self::index::Index;
pub use self::iter::{Bytes, Characters, Chars, Chunks, Utf16Units};

pub(crate) type ChunkIndex = tree::Index<Chunk>;

/// A string stored as a rope of chunks.
#[derive(Clone, Default)]
pub(crate) struct BString {
    rope: Rope<Chunk>,
}

/// The recognizer state after the first `utf8` bytes of the text in `rope`.
pub(crate) fn recognizer_state_at(rope: &Rope<Chunk>, utf8: usize) -> GraphemeRecognizer {
    let mut state = GraphemeRecognizer::new();
    if utf8 == 0 {
        return state;
    }
    // Collect the text between the last break before `utf8` and `utf8`,
    // walking back over chunks that have no break of their own.
    let (mut index, mut end) = rope.find::<Utf8Metric>(utf8, true);
    let mut pieces: SmallVec<[&str; 4]> = SmallVec::new();
    loop {
        let chunk = rope.get(&index);
        if let Some(start) = chunk.break_before(end) {
            pieces.push(&chunk.as_str()[start..end]);
            break;
        }
        pieces.push(&chunk.as_str()[..end]);
        if index == rope.start_index() {
            break;
        }
        rope.form_index_before(&mut index);
        end = rope.get(&index).utf8_count();
    }
    for piece in pieces.iter().rev() {
        state.consume_partial_character(piece);
    }
    state
}

impl BString {
    pub(crate) fn new() -> BString {
        BString::default()
    }

    pub(crate) fn from_rope(rope: Rope<Chunk>) -> BString {
        BString { rope }
    }

    pub(crate) fn rope(&self) -> &Rope<Chunk> {
        &self.rope
    }

    pub(crate) fn into_rope(self) -> Rope<Chunk> {
        self.rope
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    pub(crate) fn utf8_count(&self) -> usize {
        self.rope.count::<Utf8Metric>()
    }

    pub(crate) fn utf16_count(&self) -> usize {
        self.rope.count::<Utf16Metric>()
    }

    pub(crate) fn scalar_count(&self) -> usize {
        self.rope.count::<UnicodeScalarMetric>()
    }

    pub(crate) fn character_count(&self) -> usize {
        self.rope.count::<CharacterMetric>()
    }

    pub(crate) fn ptr_eq(&self, other: &BString) -> bool {
        self.rope.ptr_eq(&other.rope)
    }

    pub(crate) fn start_index(&self) -> Index {
        Index::new(0).character_aligned().with_chunk(self.rope.start_index(), 0)
    }

    pub(crate) fn end_index(&self) -> Index {
        Index::new(self.utf8_count()).character_aligned().with_chunk(self.rope.end_index(), 0)
    }

    /// The index of the UTF-8 position `offset`, which may be inside a
    /// scalar.
    pub(crate) fn utf8_index(&self, offset: usize) -> Index {
        assert!(offset <= self.utf8_count(), "Index out of bounds");
        Index::new(offset)
    }

    // Resolution

    /// Finds the chunk holding `i` and the offset of `i` into it.
    ///
    /// A position on a chunk boundary is described as the end of the chunk
    /// before it when `prefer_end` is set, and as the start of the chunk
    /// after it otherwise. The end of the text is always described by the
    /// end index of the rope unless `prefer_end` is set.
    fn locate(&self, i: Index, prefer_end: bool) -> (Index, ChunkIndex, usize) {
        let utf8 = i.utf8_offset();
        assert!(utf8 <= self.utf8_count(), "Index out of bounds");
        if let Some(chunk) = i.chunk() {
            if self.rope.is_valid(&chunk) {
                let offset = i.chunk_offset();
                let fits = if self.rope.is_end(&chunk) {
                    !prefer_end || self.rope.is_empty()
                } else {
                    let len = self.rope.get(&chunk).utf8_count();
                    (offset > 0 || !prefer_end || utf8 == 0) && (offset < len || prefer_end)
                };
                if fits {
                    return (i, chunk, offset);
                }
            }
        }
        let (chunk, offset) = self.rope.find::<Utf8Metric>(utf8, prefer_end);
        (self.checked(i).with_chunk(chunk, offset), chunk, offset)
    }

    /// Returns `i` with a chunk position cached that is valid for the
    /// current state of the text.
    pub(crate) fn resolve(&self, i: Index, prefer_end: bool) -> Index {
        self.locate(i, prefer_end).0
    }

    /// Returns `i`, without its alignment flags unless its cached chunk shows
    /// they were found in the current text.
    fn checked(&self, i: Index) -> Index {
        match i.chunk() {
            Some(chunk) if self.rope.is_valid(&chunk) => i,
            _ => i.unaligned(),
        }
    }

    /// An index into the chunk at `chunk`, which starts at UTF-8 offset
    /// `chunk_start`.
    fn index_in_chunk(
        &self,
        chunk: ChunkIndex,
        chunk_start: usize,
        local: usize,
        trailing: bool,
    ) -> Index {
        if self.rope.is_end(&chunk) {
            return self.end_index();
        }
        let data = self.rope.get(&chunk);
        let mut i = Index::new(chunk_start + local).with_chunk(chunk, local);
        if trailing {
            i = i.with_trailing_surrogate();
        } else if data.is_break(local) {
            i = i.character_aligned();
        } else if data.is_scalar_boundary(local) {
            i = i.scalar_aligned();
        }
        i
    }

    // Metric translation

    fn units_at<M: StringMetric>(&self, i: &Index, chunk: &ChunkIndex, offset: usize) -> usize {
        if self.rope.is_end(chunk) {
            return 0;
        }
        let trailing = M::SPLITS_SURROGATES && i.is_trailing_surrogate();
        M::units_before(self.rope.get(chunk), offset) + usize::from(trailing)
    }

    /// The offset of `i` in metric `M`.
    pub(crate) fn offset_of<M: StringMetric>(&self, i: Index) -> usize {
        let (i, chunk, offset) = self.locate(i, false);
        if self.rope.is_end(&chunk) {
            return self.rope.count::<M>();
        }
        self.rope.offset::<M>(&chunk) + self.units_at::<M>(&i, &chunk, offset)
    }

    /// The index at `offset` in metric `M`.
    pub(crate) fn index_at_offset<M: StringMetric>(&self, offset: usize) -> Index {
        assert!(offset <= self.rope.count::<M>(), "Index out of bounds");
        let (chunk, remaining, prefix) = self.rope.find_with_prefix::<M>(offset, false);
        if self.rope.is_end(&chunk) {
            return self.end_index();
        }
        let (local, trailing) = M::locate(self.rope.get(&chunk), remaining);
        self.index_in_chunk(chunk, prefix.utf8, local, trailing)
    }

    /// The signed distance from `from` to `to` in metric `M`.
    pub(crate) fn distance<M: StringMetric>(&self, from: Index, to: Index) -> isize {
        let (from, a, a_offset) = self.locate(from, false);
        let (to, b, b_offset) = self.locate(to, false);
        let a_units = self.units_at::<M>(&from, &a, a_offset) as isize;
        let b_units = self.units_at::<M>(&to, &b, b_offset) as isize;
        if a == b {
            return b_units - a_units;
        }
        self.rope.distance::<M>(&a, &b) + b_units - a_units
    }

    /// Moves `i` by `distance` units of metric `M`.
    pub(crate) fn index_offset_by<M: StringMetric>(&self, i: Index, distance: isize) -> Index {
        let (i, chunk, offset) = self.locate(i, false);
        let chunk_start = i.utf8_offset() - offset;
        let units = self.units_at::<M>(&i, &chunk, offset) as isize;
        let target = units + distance;
        if !self.rope.is_end(&chunk) {
            let data = self.rope.get(&chunk);
            if target >= 0 && (target as usize) < M::measure(&data.summary()) {
                let (local, trailing) = M::locate(data, target as usize);
                return self.index_in_chunk(chunk, chunk_start, local, trailing);
            }
        }
        let mut landing = chunk;
        let remaining = self.rope.form_index::<M>(&mut landing, target, false);
        if self.rope.is_end(&landing) {
            return self.end_index();
        }
        let start = self.rope.offset::<Utf8Metric>(&landing);
        let (local, trailing) = M::locate(self.rope.get(&landing), remaining);
        self.index_in_chunk(landing, start, local, trailing)
    }

    // Stepping in each view

    pub(crate) fn utf8_index_after(&self, i: Index) -> Index {
        assert!(i.utf8_offset() < self.utf8_count(), "Can't advance past the end index");
        self.index_offset_by::<Utf8Metric>(i.without_trailing_surrogate(), 1)
    }

    pub(crate) fn utf8_index_before(&self, i: Index) -> Index {
        assert!(i.utf8_offset() > 0, "Can't move before the start index");
        self.index_offset_by::<Utf8Metric>(i.without_trailing_surrogate(), -1)
    }

    pub(crate) fn utf16_index_after(&self, i: Index) -> Index {
        assert!(i.utf8_offset() < self.utf8_count(), "Can't advance past the end index");
        self.index_offset_by::<Utf16Metric>(self.utf16_index_rounding_down(i), 1)
    }

    pub(crate) fn utf16_index_before(&self, i: Index) -> Index {
        let i = self.utf16_index_rounding_down(i);
        assert!(i.utf8_offset() > 0 || i.is_trailing_surrogate(), "Can't move before the start index");
        self.index_offset_by::<Utf16Metric>(i, -1)
    }

    pub(crate) fn scalar_index_after(&self, i: Index) -> Index {
        assert!(i.utf8_offset() < self.utf8_count(), "Can't advance past the end index");
        self.index_offset_by::<UnicodeScalarMetric>(self.scalar_index_rounding_down(i), 1)
    }

    pub(crate) fn scalar_index_before(&self, i: Index) -> Index {
        let i = self.scalar_index_rounding_down(i);
        assert!(i.utf8_offset() > 0, "Can't move before the start index");
        self.index_offset_by::<UnicodeScalarMetric>(i, -1)
    }

    pub(crate) fn character_index_after(&self, i: Index) -> Index {
        assert!(i.utf8_offset() < self.utf8_count(), "Can't advance past the end index");
        self.index_offset_by::<CharacterMetric>(self.character_index_rounding_down(i), 1)
    }

    pub(crate) fn character_index_before(&self, i: Index) -> Index {
        let i = self.character_index_rounding_down(i);
        assert!(i.utf8_offset() > 0, "Can't move before the start index");
        self.index_offset_by::<CharacterMetric>(i, -1)
    }

    // Rounding

    pub(crate) fn scalar_index_rounding_down(&self, i: Index) -> Index {
        let i = self.checked(i);
        if i.is_scalar_aligned() {
            return i;
        }
        let (i, chunk, offset) = self.locate(i.without_trailing_surrogate(), false);
        if self.rope.is_end(&chunk) {
            return self.end_index();
        }
        let local = self.rope.get(&chunk).scalar_floor(offset);
        self.index_in_chunk(chunk, i.utf8_offset() - offset, local, false)
    }

    pub(crate) fn scalar_index_rounding_up(&self, i: Index) -> Index {
        let down = self.scalar_index_rounding_down(i);
        if down.utf8_offset() == i.utf8_offset() && !i.is_trailing_surrogate() {
            return down;
        }
        self.index_offset_by::<UnicodeScalarMetric>(down, 1)
    }

    /// Rounds down to a scalar boundary, or keeps `i` if it addresses a
    /// trailing surrogate.
    pub(crate) fn utf16_index_rounding_down(&self, i: Index) -> Index {
        if i.is_trailing_surrogate() {
            return i;
        }
        self.scalar_index_rounding_down(i)
    }

    pub(crate) fn utf16_index_rounding_up(&self, i: Index) -> Index {
        if i.is_trailing_surrogate() {
            return i;
        }
        self.scalar_index_rounding_up(i)
    }

    pub(crate) fn character_index_rounding_down(&self, i: Index) -> Index {
        let i = self.checked(i);
        if i.is_character_aligned() {
            return i;
        }
        let i = self.scalar_index_rounding_down(i);
        let (i, mut chunk, offset) = self.locate(i, false);
        if self.rope.is_end(&chunk) {
            return self.end_index();
        }
        let mut start = i.utf8_offset() - offset;
        let data = self.rope.get(&chunk);
        if data.is_break(offset) {
            return i.character_aligned();
        }
        if let Some(b) = data.break_before(offset) {
            return self.index_in_chunk(chunk, start, b, false);
        }
        while start > 0 {
            self.rope.form_index_before(&mut chunk);
            let data = self.rope.get(&chunk);
            start -= data.utf8_count();
            if let Some(b) = data.last_break() {
                return self.index_in_chunk(chunk, start, b, false);
            }
        }
        self.start_index()
    }

    pub(crate) fn character_index_rounding_up(&self, i: Index) -> Index {
        let i = self.checked(i);
        if i.is_character_aligned() {
            return i;
        }
        let down = self.character_index_rounding_down(i);
        if down.utf8_offset() == i.utf8_offset() && !i.is_trailing_surrogate() {
            return down;
        }
        self.index_offset_by::<CharacterMetric>(down, 1)
    }

    // Random access

    pub(crate) fn utf8_byte(&self, i: Index) -> u8 {
        let (_, chunk, offset) = self.locate(i, false);
        assert!(!self.rope.is_end(&chunk), "Index out of bounds");
        self.rope.get(&chunk).as_str().as_bytes()[offset]
    }

    pub(crate) fn scalar(&self, i: Index) -> char {
        let (_, chunk, offset) = self.locate(self.scalar_index_rounding_down(i), false);
        assert!(!self.rope.is_end(&chunk), "Index out of bounds");
        match self.rope.get(&chunk).as_str()[offset..].chars().next() {
            Some(c) => c,
            None => panic!("Index out of bounds"),
        }
    }

    pub(crate) fn utf16_unit(&self, i: Index) -> u16 {
        let c = self.scalar(i);
        let mut buf = [0u16; 2];
        let units = c.encode_utf16(&mut buf);
        units[usize::from(i.is_trailing_surrogate() && units.len() > 1)]
    }

    /// The character (extended grapheme cluster) starting at `i`, rounded
    /// down to a character boundary.
    pub(crate) fn character(&self, i: Index) -> Cow<'_, str> {
        let start = self.character_index_rounding_down(i);
        let end = self.character_index_after(start);
        self.slice(start.utf8_offset()..end.utf8_offset())
    }

    /// The text in a UTF-8 range, borrowed if it lies within a single chunk.
    pub(crate) fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        assert!(range.start <= range.end && range.end <= self.utf8_count(), "Range out of bounds");
        if range.start == range.end {
            return Cow::Borrowed("");
        }
        let (_, chunk, offset) = self.locate(Index::new(range.start), false);
        let text = self.rope.get(&chunk).as_str();
        let end = offset + range.len();
        if end <= text.len() {
            Cow::Borrowed(&text[offset..end])
        } else {
            Cow::Owned(self.chunks(range).collect())
        }
    }

    pub(crate) fn is_scalar_boundary(&self, utf8: usize) -> bool {
        let (_, chunk, offset) = self.locate(Index::new(utf8), false);
        self.rope.is_end(&chunk) || self.rope.get(&chunk).is_scalar_boundary(offset)
    }

    /// The grapheme recognizer state after the text before `i`.
    pub(crate) fn recognizer_state_at(&self, i: Index) -> GraphemeRecognizer {
        recognizer_state_at(&self.rope, self.scalar_index_rounding_down(i).utf8_offset())
    }

    /// Panics if the rope is malformed or any cached break is stale.
    #[cfg(test)]
    pub(crate) fn invariant_check(&self) {
        self.rope.invariant_check();
        let mut state = GraphemeRecognizer::new();
        self.rope.for_each_while(|chunk| {
            chunk.verify(&mut state);
            true
        });
    }
}

impl<'a> From<&'a str> for BString {
    fn from(text: &'a str) -> BString {
        let mut builder = Builder::new();
        builder.append_str(text);
        builder.finalize()
    }
}
