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

//! Iterators over the text, in each of its units.

use std::borrow::Cow;
use std::ops::Range;
use std::str;

use super::{BString, ChunkIndex, Index};
use crate::chunk::Chunk;
use crate::tree::Rope;

/// The pieces of text stored in consecutive chunks, restricted to a range.
pub struct Chunks<'a> {
    rope: &'a Rope<Chunk>,
    front: ChunkIndex,
    front_offset: usize,
    back: ChunkIndex,
    // End of the unvisited text in the `back` chunk.
    back_offset: usize,
    remaining: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.remaining == 0 {
            return None;
        }
        let rope = self.rope;
        let text = rope.get(&self.front).as_str();
        let end = text.len().min(self.front_offset + self.remaining);
        let piece = &text[self.front_offset..end];
        self.remaining -= piece.len();
        if self.remaining > 0 {
            rope.form_index_after(&mut self.front);
            self.front_offset = 0;
        }
        Some(piece)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::from(self.remaining > 0), Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Chunks<'a> {
    fn next_back(&mut self) -> Option<&'a str> {
        if self.remaining == 0 {
            return None;
        }
        let rope = self.rope;
        let text = rope.get(&self.back).as_str();
        let start = self.back_offset.saturating_sub(self.remaining);
        let piece = &text[start..self.back_offset];
        self.remaining -= piece.len();
        if self.remaining > 0 {
            rope.form_index_before(&mut self.back);
            self.back_offset = rope.get(&self.back).utf8_count();
        }
        Some(piece)
    }
}

/// Flattens the chunks of a range into the items of some iterator over
/// `str`.
struct Flattened<'a, I> {
    chunks: Chunks<'a>,
    front: Option<I>,
    back: Option<I>,
    split: fn(&'a str) -> I,
}

impl<'a, I: DoubleEndedIterator> Flattened<'a, I> {
    fn new(chunks: Chunks<'a>, split: fn(&'a str) -> I) -> Flattened<'a, I> {
        Flattened { chunks, front: None, back: None, split }
    }

    fn next(&mut self) -> Option<I::Item> {
        loop {
            if let Some(item) = self.front.as_mut().and_then(Iterator::next) {
                return Some(item);
            }
            match self.chunks.next() {
                Some(piece) => self.front = Some((self.split)(piece)),
                None => return self.back.as_mut().and_then(Iterator::next),
            }
        }
    }

    fn next_back(&mut self) -> Option<I::Item> {
        loop {
            if let Some(item) = self.back.as_mut().and_then(DoubleEndedIterator::next_back) {
                return Some(item);
            }
            match self.chunks.next_back() {
                Some(piece) => self.back = Some((self.split)(piece)),
                None => return self.front.as_mut().and_then(DoubleEndedIterator::next_back),
            }
        }
    }
}

/// The UTF-8 bytes of a range of text.
pub struct Bytes<'a>(Flattened<'a, str::Bytes<'a>>);

impl<'a> Iterator for Bytes<'a> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.0.next()
    }
}

impl<'a> DoubleEndedIterator for Bytes<'a> {
    fn next_back(&mut self) -> Option<u8> {
        self.0.next_back()
    }
}

/// The Unicode scalars of a range of text.
pub struct Chars<'a>(Flattened<'a, str::Chars<'a>>);

impl<'a> Iterator for Chars<'a> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.0.next()
    }
}

impl<'a> DoubleEndedIterator for Chars<'a> {
    fn next_back(&mut self) -> Option<char> {
        self.0.next_back()
    }
}

/// The UTF-16 code units of a range of text.
pub struct Utf16Units<'a> {
    chars: Chars<'a>,
    // A trailing surrogate still to be yielded at the front.
    front: Option<u16>,
    // A leading surrogate still to be yielded at the back.
    back: Option<u16>,
}

impl<'a> Iterator for Utf16Units<'a> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if let Some(unit) = self.front.take() {
            return Some(unit);
        }
        match self.chars.next() {
            Some(c) => {
                let mut buf = [0u16; 2];
                let units = c.encode_utf16(&mut buf);
                if units.len() == 2 {
                    self.front = Some(units[1]);
                }
                Some(units[0])
            }
            None => self.back.take(),
        }
    }
}

impl<'a> DoubleEndedIterator for Utf16Units<'a> {
    fn next_back(&mut self) -> Option<u16> {
        if let Some(unit) = self.back.take() {
            return Some(unit);
        }
        match self.chars.next_back() {
            Some(c) => {
                let mut buf = [0u16; 2];
                let units = c.encode_utf16(&mut buf);
                if units.len() == 2 {
                    self.back = Some(units[0]);
                    return Some(units[1]);
                }
                Some(units[0])
            }
            None => self.front.take(),
        }
    }
}

/// The characters (extended grapheme clusters) of a range of text.
pub struct Characters<'a> {
    string: &'a BString,
    front: Index,
    back: Index,
}

impl<'a> Iterator for Characters<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Cow<'a, str>> {
        if self.front >= self.back {
            return None;
        }
        let string = self.string;
        let end = string.character_index_after(self.front).min(self.back);
        let item = string.slice(self.front.utf8_offset()..end.utf8_offset());
        self.front = end;
        Some(item)
    }
}

impl<'a> DoubleEndedIterator for Characters<'a> {
    fn next_back(&mut self) -> Option<Cow<'a, str>> {
        if self.front >= self.back {
            return None;
        }
        let string = self.string;
        let start = string.character_index_before(self.back).max(self.front);
        let item = string.slice(start.utf8_offset()..self.back.utf8_offset());
        self.back = start;
        Some(item)
    }
}

impl BString {
    /// The pieces of text in a UTF-8 range, chunk by chunk.
    pub(crate) fn chunks(&self, range: Range<usize>) -> Chunks<'_> {
        assert!(range.start <= range.end && range.end <= self.utf8_count(), "Range out of bounds");
        let (_, front, front_offset) = self.locate(Index::new(range.start), false);
        let (_, back, back_offset) = self.locate(Index::new(range.end), true);
        Chunks {
            rope: &self.rope,
            front,
            front_offset,
            back,
            back_offset,
            remaining: range.end - range.start,
        }
    }

    /// The bytes in a UTF-8 range, which may start or end inside a scalar.
    pub(crate) fn bytes(&self, range: Range<usize>) -> Bytes<'_> {
        assert!(range.start <= range.end, "Invalid range");
        let lo = self.scalar_index_rounding_down(self.utf8_index(range.start)).utf8_offset();
        let hi = self.scalar_index_rounding_up(self.utf8_index(range.end)).utf8_offset();
        let mut bytes = Bytes(Flattened::new(self.chunks(lo..hi), str::bytes));
        for _ in lo..range.start {
            bytes.next();
        }
        for _ in range.end..hi {
            bytes.next_back();
        }
        bytes
    }

    /// The scalars between two indices, rounded down to scalar boundaries.
    pub(crate) fn chars(&self, start: Index, end: Index) -> Chars<'_> {
        let start = self.scalar_index_rounding_down(start).utf8_offset();
        let end = self.scalar_index_rounding_down(end).utf8_offset().max(start);
        Chars(Flattened::new(self.chunks(start..end), str::chars))
    }

    /// The UTF-16 code units between two indices, which may address
    /// trailing surrogates.
    pub(crate) fn utf16_units(&self, start: Index, end: Index) -> Utf16Units<'_> {
        let start = self.utf16_index_rounding_down(start);
        let end = self.utf16_index_rounding_down(end);
        if end <= start {
            let empty = self.chars(start, start);
            return Utf16Units { chars: empty, front: None, back: None };
        }
        // Cover whole scalars, then trim the halves outside the range.
        let last = if end.is_trailing_surrogate() { self.scalar_index_after(end) } else { end };
        let mut units = Utf16Units {
            chars: self.chars(start.without_trailing_surrogate(), last),
            front: None,
            back: None,
        };
        if start.is_trailing_surrogate() {
            units.next();
        }
        if end.is_trailing_surrogate() {
            units.next_back();
        }
        units
    }

    /// The characters between two indices, rounded down to character
    /// boundaries.
    pub(crate) fn characters(&self, start: Index, end: Index) -> Characters<'_> {
        let front = self.character_index_rounding_down(start);
        let back = self.character_index_rounding_down(end).max(front);
        Characters { string: self, front, back }
    }
}
