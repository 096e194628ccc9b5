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

//! The summary of text chunks and the metrics measured on it.

use crate::chunk::Chunk;
use crate::tree::{RopeMetric, RopeSummary};

/// Counts of a stretch of text in each of the supported units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Summary {
    pub utf8: usize,
    pub utf16: usize,
    pub unicode_scalars: usize,
    /// Number of grapheme breaks, i.e. characters starting in the stretch.
    pub characters: usize,
}

impl RopeSummary for Summary {
    const MAX_NODE_SIZE: usize = 15;
    const NODE_SIZE_BIT_WIDTH: u32 = 4;

    fn zero() -> Summary {
        Summary::default()
    }

    fn is_zero(&self) -> bool {
        self.utf8 == 0
    }

    fn add(&mut self, other: &Summary) {
        self.utf8 += other.utf8;
        self.utf16 += other.utf16;
        self.unicode_scalars += other.unicode_scalars;
        self.characters += other.characters;
    }

    fn subtract(&mut self, other: &Summary) {
        self.utf8 -= other.utf8;
        self.utf16 -= other.utf16;
        self.unicode_scalars -= other.unicode_scalars;
        self.characters -= other.characters;
    }
}

/// Conversions between a metric and byte offsets inside a single chunk.
pub(crate) trait StringMetric: RopeMetric<Chunk> {
    /// Whether positions in this metric can address the trailing half of a
    /// surrogate pair.
    const SPLITS_SURROGATES: bool = false;

    /// Units of this metric in `chunk` before the scalar boundary `offset`.
    fn units_before(chunk: &Chunk, offset: usize) -> usize;

    /// Byte offset of the position `units` into `chunk`, and whether it
    /// addresses the trailing surrogate of the scalar at that offset.
    fn locate(chunk: &Chunk, units: usize) -> (usize, bool);
}

/// Measures bytes of UTF-8.
#[derive(Clone, Copy)]
pub struct Utf8Metric;

impl RopeMetric<Chunk> for Utf8Metric {
    fn measure(summary: &Summary) -> usize {
        summary.utf8
    }

    fn index_at(offset: usize, _: &Chunk) -> usize {
        offset
    }
}

impl StringMetric for Utf8Metric {
    fn units_before(_: &Chunk, offset: usize) -> usize {
        offset
    }

    fn locate(_: &Chunk, units: usize) -> (usize, bool) {
        (units, false)
    }
}

/// Measures UTF-16 code units.
#[derive(Clone, Copy)]
pub struct Utf16Metric;

impl RopeMetric<Chunk> for Utf16Metric {
    fn measure(summary: &Summary) -> usize {
        summary.utf16
    }

    fn index_at(offset: usize, chunk: &Chunk) -> usize {
        chunk.utf16_position(offset).0
    }
}

impl StringMetric for Utf16Metric {
    const SPLITS_SURROGATES: bool = true;

    fn units_before(chunk: &Chunk, offset: usize) -> usize {
        chunk.utf16_offset(offset)
    }

    fn locate(chunk: &Chunk, units: usize) -> (usize, bool) {
        chunk.utf16_position(units)
    }
}

/// Measures Unicode scalar values.
#[derive(Clone, Copy)]
pub struct UnicodeScalarMetric;

impl RopeMetric<Chunk> for UnicodeScalarMetric {
    fn measure(summary: &Summary) -> usize {
        summary.unicode_scalars
    }

    fn index_at(offset: usize, chunk: &Chunk) -> usize {
        chunk.scalar_position(offset)
    }
}

impl StringMetric for UnicodeScalarMetric {
    fn units_before(chunk: &Chunk, offset: usize) -> usize {
        chunk.scalar_offset(offset)
    }

    fn locate(chunk: &Chunk, units: usize) -> (usize, bool) {
        (chunk.scalar_position(units), false)
    }
}

/// Measures extended grapheme clusters, counted by where they start.
#[derive(Clone, Copy)]
pub struct CharacterMetric;

impl RopeMetric<Chunk> for CharacterMetric {
    fn measure(summary: &Summary) -> usize {
        summary.characters
    }

    fn index_at(offset: usize, chunk: &Chunk) -> usize {
        chunk.character_position(offset)
    }
}

impl StringMetric for CharacterMetric {
    fn units_before(chunk: &Chunk, offset: usize) -> usize {
        chunk.character_offset(offset)
    }

    fn locate(chunk: &Chunk, units: usize) -> (usize, bool) {
        (chunk.character_position(units), false)
    }
}
