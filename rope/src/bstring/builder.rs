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

use bigstring_unicode::GraphemeRecognizer;
use log::trace;

use super::{recognizer_state_at, BString};
use crate::chunk::Chunk;
use crate::helpers::{find_chunk_split, floor_scalar_boundary};
use crate::metrics::Utf8Metric;
use crate::tree::{self, Rope};

/// Accumulates text into a new string, one piece at a time.
///
/// Besides the rope builder, this carries the grapheme recognizer state at
/// the end of the text appended so far, so that new chunks get their breaks
/// right without looking back.
pub(crate) struct Builder {
    base: tree::Builder<Chunk>,
    state: GraphemeRecognizer,
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

impl Builder {
    pub(crate) fn new() -> Builder {
        Builder { base: tree::Builder::new(), state: GraphemeRecognizer::new() }
    }

    /// A builder continuing after `prefix`, where `state` must be the
    /// recognizer state at the end of `prefix`.
    pub(crate) fn with_prefix(prefix: Rope<Chunk>, state: GraphemeRecognizer) -> Builder {
        let mut base = tree::Builder::new();
        base.insert_rope_before_tip(prefix);
        Builder { base, state }
    }

    pub(crate) fn append_str(&mut self, text: &str) {
        let mut text = text;
        if text.is_empty() {
            return;
        }
        // Top up the last chunk first.
        if let Some(mut tip) = self.base.take_prefix_tip() {
            let room = Chunk::MAX_UTF8_COUNT - tip.utf8_count();
            let cut = floor_scalar_boundary(text, room);
            if cut > 0 {
                tip.append(Chunk::new(&text[..cut], &mut self.state));
                text = &text[cut..];
            }
            self.base.push_before_tip_unbalanced(tip);
        }
        while !text.is_empty() {
            let split = find_chunk_split(text);
            let chunk = Chunk::new(&text[..split], &mut self.state);
            self.base.insert_before_tip(chunk);
            text = &text[split..];
        }
    }

    /// Appends the chunks of `rope`, fixing up their grapheme breaks.
    ///
    /// The breaks cached in `rope` must be right for text preceding it that
    /// leaves the recognizer in state `old`. They are resynchronized against
    /// the text appended so far, only as far as they can differ.
    pub(crate) fn append_rope_resyncing(&mut self, mut rope: Rope<Chunk>, old: GraphemeRecognizer) {
        if rope.is_empty() {
            return;
        }
        let converged = old.is_known_equal(&self.state) || self.resync(&mut rope, old);
        if converged {
            self.state = recognizer_state_at(&rope, rope.count::<Utf8Metric>());
        }
        self.base.insert_rope_before_tip(rope);
    }

    /// Rescans chunks at the start of `rope` until the old and new breaks
    /// agree. Returns `false` if they never did, in which case the scan
    /// left the state at the end of `rope` behind.
    fn resync(&mut self, rope: &mut Rope<Chunk>, mut old: GraphemeRecognizer) -> bool {
        let mut new = self.state.clone();
        let mut index = rope.start_index();
        let mut corrections = 0;
        let mut chunks = 0;
        let converged = rope
            .mutating_for_each(&mut index, |chunk| {
                let outcome = chunk.resync_breaks(&mut old, &mut new);
                corrections += outcome.corrections;
                chunks += 1;
                if outcome.converged {
                    Some(())
                } else {
                    None
                }
            })
            .is_some();
        if chunks > 1 {
            trace!("resync crossed {} chunks, {} corrections", chunks, corrections);
        }
        if !converged {
            self.state = new;
        }
        converged
    }

    /// Appends a copy of `other`.
    pub(crate) fn append(&mut self, other: &BString) {
        self.append_rope_resyncing(other.rope().clone(), GraphemeRecognizer::new());
    }

    /// Appends every piece produced by `pieces` until one fails.
    ///
    /// On failure, the builder keeps exactly the pieces before the failing
    /// one, and the error is returned.
    pub(crate) fn try_extend<S, E, I>(&mut self, pieces: I) -> Result<(), E>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = Result<S, E>>,
    {
        for piece in pieces {
            self.append_str(piece?.as_ref());
        }
        Ok(())
    }

    /// Length in UTF-8 bytes of the text accumulated so far.
    #[cfg(test)]
    pub(crate) fn utf8_count(&self) -> usize {
        self.base.prefix_summary().utf8 + self.base.suffix_summary().utf8
    }

    pub(crate) fn finalize(self) -> BString {
        BString::from_rope(self.base.finalize())
    }
}
