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

//! Unicode utilities for text that is stored in pieces.
//!
//! The main export is [`GraphemeRecognizer`], a small state machine that
//! finds extended grapheme cluster boundaries one scalar at a time, so that
//! a text split across many independently stored chunks can be segmented
//! without ever materializing it contiguously.

#![allow(clippy::new_without_default)]

extern crate unicode_segmentation;

mod codepoint;

pub use crate::codepoint::{
    count_utf16_code_units, is_codepoint_boundary, len_utf8_from_first_byte,
    next_codepoint_boundary, prev_codepoint_boundary, utf16_len_from_first_byte,
};

use unicode_segmentation::GraphemeCursor;

const ZWJ: char = '\u{200D}';
// Stand-ins used to recreate the context of the long-range rules.
const PICTOGRAPH: char = '\u{1F642}';
const REGIONAL: char = '\u{1F1FA}';
const CONSONANT: char = '\u{915}';
const LINKER: char = '\u{94D}';

/// Positions of grapheme breaks found while consuming a fragment.
///
/// All offsets are byte offsets into the consumed fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Breaks {
    /// The first break in the fragment.
    pub first: usize,
    /// The last break in the fragment. Equal to `first` if there is only one.
    pub last: usize,
    /// The number of breaks in the fragment.
    pub count: usize,
}

/// Parity of the run of regional indicators ending at the last scalar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Regional {
    #[default]
    None,
    Odd,
    Even,
}

/// Progress through `Extended_Pictographic Extend* ZWJ`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Emoji {
    #[default]
    None,
    Pictographic,
    Joiner,
}

/// Progress through `Consonant [Extend Linker]* Linker [Extend Linker]*`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Conjunct {
    #[default]
    None,
    Consonant,
    Linked,
}

/// The break properties of a scalar that the long-range rules look at.
#[derive(Clone, Copy, Default)]
struct Class {
    regional: bool,
    pictographic: bool,
    extend: bool,
    consonant: bool,
    linker: bool,
    conjunct_extend: bool,
}

impl Class {
    fn of(c: char) -> Class {
        if c.is_ascii() {
            return Class::default();
        }
        // Extend, ZWJ and SpacingMark attach to anything.
        let attaches = !is_boundary(&['a'], c);
        Class {
            regional: !attaches && !is_boundary(&[REGIONAL], c),
            pictographic: !attaches && !is_boundary(&[PICTOGRAPH, ZWJ], c),
            extend: attaches && c != ZWJ && !is_boundary(&[PICTOGRAPH, c, ZWJ], PICTOGRAPH),
            consonant: !attaches && !is_boundary(&[CONSONANT, LINKER], c),
            linker: !is_boundary(&[CONSONANT, c], CONSONANT),
            conjunct_extend: !is_boundary(&[CONSONANT, LINKER, c], CONSONANT),
        }
    }
}

/// Whether there is a grapheme break between `context` and `next`, with
/// `context` taken as the start of text.
fn is_boundary(context: &[char], next: char) -> bool {
    let mut buf = [0u8; 32];
    let mut len = 0;
    for &c in context {
        len += c.encode_utf8(&mut buf[len..]).len();
    }
    let offset = len;
    len += next.encode_utf8(&mut buf[len..]).len();
    let text = match std::str::from_utf8(&buf[..len]) {
        Ok(text) => text,
        Err(_) => return true,
    };
    GraphemeCursor::new(offset, len, true).is_boundary(text, 0).unwrap_or(true)
}

/// Incremental recognizer for extended grapheme cluster boundaries (UAX #29).
///
/// The state is the last scalar consumed plus how far the text before it
/// has progressed through each of the rules that look further back: pairs
/// of regional indicators, emoji joined by ZWJ and Indic conjuncts. It has
/// a fixed size, so every scalar is recognized in constant time no matter
/// how long the cluster in progress is. The start of text counts as a
/// break, so a fresh recognizer reports a break before the first scalar
/// it sees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphemeRecognizer {
    prev: Option<char>,
    regional: Regional,
    emoji: Emoji,
    conjunct: Conjunct,
}

impl GraphemeRecognizer {
    /// A recognizer positioned at the start of text.
    pub fn new() -> GraphemeRecognizer {
        GraphemeRecognizer::default()
    }

    /// Returns `true` if nothing has been consumed since the start of text.
    pub fn is_at_start(&self) -> bool {
        self.prev.is_none()
    }

    /// The last scalar consumed.
    pub fn last_scalar(&self) -> Option<char> {
        self.prev
    }

    /// Reports whether there is a grapheme break before `next`, then consumes it.
    pub fn has_break(&mut self, next: char) -> bool {
        let prev = match self.prev {
            Some(prev) => prev,
            None => {
                self.advance(next);
                return true;
            }
        };
        if prev.is_ascii() && next.is_ascii() {
            // GB3 is the only rule joining two ASCII scalars.
            self.prev = Some(next);
            return !(prev == '\r' && next == '\n');
        }
        let is_break = match (self.emoji, self.conjunct, self.regional) {
            (Emoji::Joiner, ..) => is_boundary(&[PICTOGRAPH, prev], next),
            (_, Conjunct::Linked, _) => is_boundary(&[CONSONANT, LINKER, prev], next),
            (.., Regional::Even) => is_boundary(&[prev, prev], next),
            _ => is_boundary(&[prev], next),
        };
        self.advance(next);
        is_break
    }

    /// Feeds all of `text`, returning the breaks found in it, if any.
    pub fn consume(&mut self, text: &str) -> Option<Breaks> {
        let mut breaks: Option<Breaks> = None;
        for (offset, c) in text.char_indices() {
            if !self.has_break(c) {
                continue;
            }
            match breaks.as_mut() {
                Some(b) => {
                    b.last = offset;
                    b.count += 1;
                }
                None => breaks = Some(Breaks { first: offset, last: offset, count: 1 }),
            }
        }
        breaks
    }

    /// Feeds scalars that are known to continue the current cluster.
    ///
    /// This is used to restore the state at some position from the text
    /// between the preceding break and that position. No boundaries are
    /// checked.
    pub fn consume_partial_character(&mut self, text: &str) {
        for c in text.chars() {
            self.advance(c);
        }
    }

    /// Returns `true` only if `self` and `other` are guaranteed to make the
    /// same decisions on any further input.
    ///
    /// A `false` result carries no information.
    pub fn is_known_equal(&self, other: &GraphemeRecognizer) -> bool {
        self == other
    }

    fn advance(&mut self, next: char) {
        let class = Class::of(next);
        self.regional = match (class.regional, self.regional) {
            (false, _) => Regional::None,
            (true, Regional::Odd) => Regional::Even,
            (true, _) => Regional::Odd,
        };
        self.emoji = match self.emoji {
            _ if class.pictographic => Emoji::Pictographic,
            Emoji::Pictographic if class.extend => Emoji::Pictographic,
            Emoji::Pictographic if next == ZWJ => Emoji::Joiner,
            _ => Emoji::None,
        };
        self.conjunct = match self.conjunct {
            _ if class.consonant => Conjunct::Consonant,
            Conjunct::None => Conjunct::None,
            _ if class.linker => Conjunct::Linked,
            state if class.conjunct_extend => state,
            _ => Conjunct::None,
        };
        self.prev = Some(next);
    }
}
