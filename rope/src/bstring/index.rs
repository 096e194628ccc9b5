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

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::ChunkIndex;

const UTF8_SHIFT: u32 = 11;
const TRAILING_SURROGATE: u64 = 1 << 10;
const SCALAR_ALIGNED: u64 = 1 << 9;
const CHARACTER_ALIGNED: u64 = 1 << 8;
const CHUNK_OFFSET_MASK: u64 = 0xff;

/// A position in a [`BigString`](crate::BigString).
///
/// An index is a UTF-8 offset, plus a flag telling whether it addresses the
/// trailing surrogate of the UTF-16 encoding of the scalar at that offset.
/// Indices stay meaningful across edits, as offsets: they are compared and
/// hashed by those two values only.
///
/// Internally an index also remembers what it is known to be aligned to, and
/// caches the chunk it falls in. The cache goes stale when the string is
/// mutated, and is then recomputed on use.
#[derive(Clone, Copy)]
pub struct Index {
    // utf8 offset << 11 | trailing << 10 | scalar << 9 | character << 8 | chunk offset
    raw: u64,
    chunk: Option<ChunkIndex>,
}

impl Index {
    pub(crate) fn new(utf8_offset: usize) -> Index {
        debug_assert!((utf8_offset as u64) < 1 << (64 - UTF8_SHIFT));
        Index { raw: (utf8_offset as u64) << UTF8_SHIFT, chunk: None }
    }

    /// The UTF-8 offset of this position.
    pub fn utf8_offset(&self) -> usize {
        (self.raw >> UTF8_SHIFT) as usize
    }

    /// Returns `true` if this index addresses the second code unit of a
    /// surrogate pair.
    pub fn is_trailing_surrogate(&self) -> bool {
        self.raw & TRAILING_SURROGATE != 0
    }

    pub(crate) fn is_scalar_aligned(&self) -> bool {
        self.raw & SCALAR_ALIGNED != 0
    }

    pub(crate) fn is_character_aligned(&self) -> bool {
        self.raw & CHARACTER_ALIGNED != 0
    }

    pub(crate) fn chunk(&self) -> Option<ChunkIndex> {
        self.chunk
    }

    pub(crate) fn chunk_offset(&self) -> usize {
        (self.raw & CHUNK_OFFSET_MASK) as usize
    }

    pub(crate) fn with_chunk(mut self, chunk: ChunkIndex, offset: usize) -> Index {
        debug_assert!(offset as u64 <= CHUNK_OFFSET_MASK);
        self.raw = (self.raw & !CHUNK_OFFSET_MASK) | offset as u64;
        self.chunk = Some(chunk);
        self
    }

    pub(crate) fn scalar_aligned(mut self) -> Index {
        self.raw |= SCALAR_ALIGNED;
        self
    }

    pub(crate) fn character_aligned(mut self) -> Index {
        self.raw |= SCALAR_ALIGNED | CHARACTER_ALIGNED;
        self
    }

    /// Forgets what this index is known to be aligned to.
    pub(crate) fn unaligned(mut self) -> Index {
        self.raw &= !(SCALAR_ALIGNED | CHARACTER_ALIGNED);
        self
    }

    /// The index of the trailing surrogate of the scalar at this position.
    pub(crate) fn with_trailing_surrogate(mut self) -> Index {
        self.raw = (self.raw | TRAILING_SURROGATE) & !(SCALAR_ALIGNED | CHARACTER_ALIGNED);
        self
    }

    pub(crate) fn without_trailing_surrogate(mut self) -> Index {
        if self.is_trailing_surrogate() {
            self.raw &= !TRAILING_SURROGATE;
            self.raw |= SCALAR_ALIGNED;
        }
        self
    }

    fn ordering_value(&self) -> u64 {
        self.raw >> 10
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Index) -> bool {
        self.ordering_value() == other.ordering_value()
    }
}

impl Eq for Index {}

impl PartialOrd for Index {
    fn partial_cmp(&self, other: &Index) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Index {
    fn cmp(&self, other: &Index) -> Ordering {
        self.ordering_value().cmp(&other.ordering_value())
    }
}

impl Hash for Index {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordering_value().hash(state)
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Index({}", self.utf8_offset())?;
        if self.is_trailing_surrogate() {
            write!(f, "+trailing")?;
        }
        write!(f, ")")
    }
}
