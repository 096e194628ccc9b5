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

//! Edits, all expressed as replacing a range of text.

use std::mem;
use std::ops::Range;

use super::{recognizer_state_at, BString, Builder};
use crate::metrics::Utf8Metric;

impl BString {
    /// Replaces the UTF-8 range `range`, whose bounds must be scalar
    /// boundaries, with whatever `fill` appends to the builder it is given.
    fn replace_with(&mut self, range: Range<usize>, fill: impl FnOnce(&mut Builder)) {
        assert!(range.start <= range.end, "Invalid range");
        assert!(range.end <= self.utf8_count(), "Range out of bounds");
        assert!(
            self.is_scalar_boundary(range.start) && self.is_scalar_boundary(range.end),
            "Range bounds must fall on scalar boundaries"
        );
        let start_state = recognizer_state_at(&self.rope, range.start);
        let end_state = if range.start == range.end {
            start_state.clone()
        } else {
            recognizer_state_at(&self.rope, range.end)
        };
        let rope = mem::take(&mut self.rope);
        let (prefix, rest) = rope.split_at::<Utf8Metric>(range.start);
        let (_, suffix) = rest.split_at::<Utf8Metric>(range.end - range.start);
        let mut builder = Builder::with_prefix(prefix, start_state);
        fill(&mut builder);
        builder.append_rope_resyncing(suffix, end_state);
        *self = builder.finalize();
    }

    pub(crate) fn replace_range(&mut self, range: Range<usize>, text: &str) {
        self.replace_with(range, |builder| builder.append_str(text));
    }

    pub(crate) fn replace_range_with(&mut self, range: Range<usize>, other: &BString) {
        self.replace_with(range, |builder| builder.append(other));
    }

    pub(crate) fn insert_str(&mut self, at: usize, text: &str) {
        self.replace_range(at..at, text);
    }

    pub(crate) fn append(&mut self, other: &BString) {
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        let end = self.utf8_count();
        self.replace_range_with(end..end, other);
    }

    pub(crate) fn remove_range(&mut self, range: Range<usize>) {
        if range.start != range.end {
            self.replace_range(range, "");
        }
    }

    /// A new string holding the text in a UTF-8 range, with its breaks
    /// recomputed for standing on its own.
    pub(crate) fn extract(&self, range: Range<usize>) -> BString {
        assert!(range.start <= range.end && range.end <= self.utf8_count(), "Range out of bounds");
        assert!(
            self.is_scalar_boundary(range.start) && self.is_scalar_boundary(range.end),
            "Range bounds must fall on scalar boundaries"
        );
        let old = recognizer_state_at(&self.rope, range.start);
        let rope = self.rope.extract::<Utf8Metric>(range);
        let mut builder = Builder::new();
        builder.append_rope_resyncing(rope, old);
        builder.finalize()
    }
}
