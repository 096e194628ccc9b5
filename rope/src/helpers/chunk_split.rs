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

use bigstring_unicode::{is_codepoint_boundary, prev_codepoint_boundary};

use crate::chunk::Chunk;

/// The greatest scalar boundary of `s` not after `offset`.
pub(crate) fn floor_scalar_boundary(s: &str, offset: usize) -> usize {
    if offset >= s.len() {
        return s.len();
    }
    if is_codepoint_boundary(s.as_bytes(), offset) {
        offset
    } else {
        prev_codepoint_boundary(s.as_bytes(), offset).unwrap_or(0)
    }
}

/// Length of the first chunk to cut off `s` when loading it in bulk.
///
/// The text is divided into as few chunks as possible, of nearly equal
/// length. Rounding to scalar boundaries costs each cut at most
/// `Chunk::MAX_SLICING_ERROR` bytes, and the target is recomputed for every
/// cut, so all chunks but a short single one end up at least
/// `Chunk::MIN_UTF8_COUNT` long.
pub(crate) fn find_chunk_split(s: &str) -> usize {
    let max = Chunk::MAX_UTF8_COUNT;
    if s.len() <= max {
        return s.len();
    }
    let pieces = (s.len() + max - 1) / max;
    let target = (s.len() + pieces - 1) / pieces;
    let split = floor_scalar_boundary(s, target);
    debug_assert!(split + Chunk::MAX_SLICING_ERROR >= target, "split {} far from {}", split, target);
    split
}
