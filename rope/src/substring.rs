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

//! Substrings that share storage with their base string.

use std::fmt;
use std::ops::Range;

use bigstring_unicode::GraphemeRecognizer;

use crate::big_string::BigString;
use crate::bstring::{Bytes, Chars, Chunks, Index};

/// A range of a [`BigString`].
///
/// The substring keeps its base alive and never copies text. Character
/// boundaries inside a substring are found as if the substring were a
/// string of its own, which may differ from the base near the start.
#[derive(Clone)]
pub struct BigSubstring {
    base: BigString,
    range: Range<usize>,
}

impl BigSubstring {
    pub(crate) fn new(base: BigString, range: Range<usize>) -> BigSubstring {
        BigSubstring { base, range }
    }

    /// The string this is a substring of.
    pub fn base(&self) -> &BigString {
        &self.base
    }

    /// The start of the substring, as an index into the base.
    pub fn start_index(&self) -> Index {
        self.base.inner().resolve(Index::new(self.range.start), false)
    }

    pub fn end_index(&self) -> Index {
        self.base.inner().resolve(Index::new(self.range.end), true)
    }

    /// The length in UTF-8 bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.start == self.range.end
    }

    pub fn chunks(&self) -> Chunks<'_> {
        self.base.inner().chunks(self.range.clone())
    }

    pub fn bytes(&self) -> Bytes<'_> {
        self.base.inner().bytes(self.range.clone())
    }

    pub fn chars(&self) -> Chars<'_> {
        self.base.inner().chars(self.start_index(), self.end_index())
    }

    /// The characters of the substring, segmented from its own start.
    pub fn characters(&self) -> SubstringCharacters<'_> {
        SubstringCharacters { chars: self.chars(), state: GraphemeRecognizer::new(), pending: None }
    }

    /// Copies the substring into a string of its own.
    ///
    /// Chunks are shared with the base where possible; only the breaks near
    /// the start are recomputed.
    pub fn to_big_string(&self) -> BigString {
        BigString::from_inner(self.base.inner().extract(self.range.clone()))
    }
}

impl fmt::Display for BigSubstring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for piece in self.chunks() {
            f.write_str(piece)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BigSubstring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("BigSubstring").field(&self.to_string()).finish()
    }
}

impl PartialEq<str> for BigSubstring {
    fn eq(&self, other: &str) -> bool {
        self.len() == other.len() && self.bytes().eq(other.bytes())
    }
}

impl<'a> PartialEq<&'a str> for BigSubstring {
    fn eq(&self, other: &&'a str) -> bool {
        *self == **other
    }
}

/// Iterator over the characters of a [`BigSubstring`].
pub struct SubstringCharacters<'a> {
    chars: Chars<'a>,
    state: GraphemeRecognizer,
    // First scalar of the next character, already fed to `state`.
    pending: Option<char>,
}

impl<'a> Iterator for SubstringCharacters<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = match self.pending.take() {
            Some(c) => c,
            None => {
                let c = self.chars.next()?;
                self.state.has_break(c);
                c
            }
        };
        let mut character = String::new();
        character.push(first);
        for c in &mut self.chars {
            if self.state.has_break(c) {
                self.pending = Some(c);
                break;
            }
            character.push(c);
        }
        Some(character)
    }
}
