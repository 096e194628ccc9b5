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

//! Substring search across chunk boundaries.

use memchr::memmem;

use super::BString;

impl BString {
    /// The UTF-8 offset of the first occurrence of `needle` at or after
    /// `from`.
    pub(crate) fn find(&self, needle: &str, from: usize) -> Option<usize> {
        let len = self.utf8_count();
        assert!(from <= len, "Index out of bounds");
        if needle.is_empty() {
            return Some(from);
        }
        let finder = memmem::Finder::new(needle.as_bytes());
        // Text not yet ruled out: the tail of what was searched, too short to
        // hold a match on its own, followed by the next chunk.
        let mut window: Vec<u8> = Vec::with_capacity(needle.len() + 256);
        let mut window_start = from;
        for piece in self.chunks(from..len) {
            window.extend_from_slice(piece.as_bytes());
            if let Some(pos) = finder.find(&window) {
                return Some(window_start + pos);
            }
            let keep = (needle.len() - 1).min(window.len());
            let drop = window.len() - keep;
            window.drain(..drop);
            window_start += drop;
        }
        None
    }
}
