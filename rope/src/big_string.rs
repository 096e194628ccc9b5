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

//! The public string type.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::mem;
use std::ops::Range;
use std::str::FromStr;
use std::string::FromUtf8Error;

use crate::bstring::{BString, Builder, Bytes, Characters, Chars, Chunks, Index, Utf16Units};
use crate::metrics::CharacterMetric;
use crate::substring::BigSubstring;
use crate::views::{UnicodeScalarView, Utf16View, Utf8View};

/// Number of characters buffered by `Extend<char>` before they are handed
/// to the builder.
const CHAR_BATCH: usize = 1024;

/// A Unicode string stored as a balanced tree of small chunks.
///
/// Cloning is O(1); the clones share storage until one of them is mutated.
/// Editing anywhere in the string costs O(log n) plus the size of the
/// inserted text, and grapheme breaks are kept up to date incrementally.
///
/// Positions are [`Index`] values, which are shared by all the views of the
/// string. The string itself is a collection of characters (extended
/// grapheme clusters); [`utf8`], [`utf16`] and [`unicode_scalars`] give the
/// other views.
///
/// [`utf8`]: BigString::utf8
/// [`utf16`]: BigString::utf16
/// [`unicode_scalars`]: BigString::unicode_scalars
#[derive(Clone, Default)]
pub struct BigString {
    inner: BString,
}

impl BigString {
    /// Creates an empty string.
    pub fn new() -> BigString {
        BigString::default()
    }

    pub(crate) fn from_inner(inner: BString) -> BigString {
        BigString { inner }
    }

    pub(crate) fn inner(&self) -> &BString {
        &self.inner
    }

    /// Converts a vector of bytes to a string, checking that it is UTF-8.
    pub fn from_utf8(bytes: Vec<u8>) -> Result<BigString, FromUtf8Error> {
        String::from_utf8(bytes).map(BigString::from)
    }

    /// Builds a string from pieces produced by a fallible source.
    ///
    /// The first error stops the build and is returned.
    pub fn try_from_chunks<S, E, I>(pieces: I) -> Result<BigString, E>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = Result<S, E>>,
    {
        let mut builder = Builder::new();
        builder.try_extend(pieces)?;
        Ok(BigString { inner: builder.finalize() })
    }

    /// Appends pieces produced by a fallible source.
    ///
    /// On error, the pieces appended before the failure are kept.
    pub fn try_extend<S, E, I>(&mut self, pieces: I) -> Result<(), E>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = Result<S, E>>,
    {
        let mut result = Ok(());
        self.build_at_end(|builder| result = builder.try_extend(pieces));
        result
    }

    fn build_at_end(&mut self, f: impl FnOnce(&mut Builder)) {
        let inner = mem::take(&mut self.inner);
        let state = inner.recognizer_state_at(inner.end_index());
        let mut builder = Builder::with_prefix(inner.into_rope(), state);
        f(&mut builder);
        self.inner = builder.finalize();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The length of the string in UTF-8 bytes.
    pub fn len(&self) -> usize {
        self.inner.utf8_count()
    }

    pub fn utf16_count(&self) -> usize {
        self.inner.utf16_count()
    }

    pub fn unicode_scalar_count(&self) -> usize {
        self.inner.scalar_count()
    }

    /// The number of characters, that is, extended grapheme clusters.
    pub fn character_count(&self) -> usize {
        self.inner.character_count()
    }

    pub fn start_index(&self) -> Index {
        self.inner.start_index()
    }

    pub fn end_index(&self) -> Index {
        self.inner.end_index()
    }

    /// Returns `true` if both strings share the same storage.
    pub fn ptr_eq(&self, other: &BigString) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    // Characters

    /// The index of the character after the one at `i`.
    ///
    /// `i` is first rounded down to a character boundary.
    ///
    /// # Panics
    ///
    /// Panics if `i` is the end index.
    pub fn index_after(&self, i: Index) -> Index {
        self.inner.character_index_after(i)
    }

    /// The index of the character before the one at `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` rounds down to the start index.
    pub fn index_before(&self, i: Index) -> Index {
        self.inner.character_index_before(i)
    }

    /// Moves `i` by `distance` characters, after rounding it down to a
    /// character boundary.
    pub fn index_offset_by(&self, i: Index, distance: isize) -> Index {
        let i = self.inner.character_index_rounding_down(i);
        self.inner.index_offset_by::<CharacterMetric>(i, distance)
    }

    /// The number of characters from `from` to `to`, negative if `to` comes
    /// first. Both are rounded down to character boundaries.
    pub fn distance(&self, from: Index, to: Index) -> isize {
        let from = self.inner.character_index_rounding_down(from);
        let to = self.inner.character_index_rounding_down(to);
        self.inner.distance::<CharacterMetric>(from, to)
    }

    pub fn index_rounding_down(&self, i: Index) -> Index {
        self.inner.character_index_rounding_down(i)
    }

    pub fn index_rounding_up(&self, i: Index) -> Index {
        self.inner.character_index_rounding_up(i)
    }

    /// The index of the character at offset `offset`.
    pub fn index_at(&self, offset: usize) -> Index {
        self.inner.index_at_offset::<CharacterMetric>(offset)
    }

    /// The character at `i`, rounded down to a character boundary.
    ///
    /// Characters are returned borrowed unless they straddle chunks.
    pub fn character_at(&self, i: Index) -> Cow<'_, str> {
        self.inner.character(i)
    }

    // Views

    pub fn utf8(&self) -> Utf8View<'_> {
        Utf8View::new(&self.inner)
    }

    pub fn utf16(&self) -> Utf16View<'_> {
        Utf16View::new(&self.inner)
    }

    pub fn unicode_scalars(&self) -> UnicodeScalarView<'_> {
        UnicodeScalarView::new(&self.inner)
    }

    // Iteration

    /// The pieces of text the string is stored in.
    pub fn chunks(&self) -> Chunks<'_> {
        self.inner.chunks(0..self.len())
    }

    /// The stored pieces of text starting at `i`, rounded down to a scalar
    /// boundary.
    pub fn chunks_from(&self, i: Index) -> Chunks<'_> {
        let start = self.inner.scalar_index_rounding_down(i).utf8_offset();
        self.inner.chunks(start..self.len())
    }

    pub fn bytes(&self) -> Bytes<'_> {
        self.inner.bytes(0..self.len())
    }

    pub fn bytes_from(&self, i: Index) -> Bytes<'_> {
        self.inner.bytes(i.utf8_offset()..self.len())
    }

    pub fn utf16_units(&self) -> Utf16Units<'_> {
        self.inner.utf16_units(self.start_index(), self.end_index())
    }

    pub fn utf16_units_from(&self, i: Index) -> Utf16Units<'_> {
        self.inner.utf16_units(i, self.end_index())
    }

    /// The Unicode scalars of the string.
    pub fn chars(&self) -> Chars<'_> {
        self.inner.chars(self.start_index(), self.end_index())
    }

    pub fn chars_from(&self, i: Index) -> Chars<'_> {
        self.inner.chars(i, self.end_index())
    }

    pub fn characters(&self) -> Characters<'_> {
        self.inner.characters(self.start_index(), self.end_index())
    }

    pub fn characters_from(&self, i: Index) -> Characters<'_> {
        self.inner.characters(i, self.end_index())
    }

    // Slicing and searching

    /// A substring sharing storage with `self`. The bounds are rounded down
    /// to scalar boundaries.
    pub fn slice(&self, range: Range<Index>) -> BigSubstring {
        let range = self.utf8_range(range);
        BigSubstring::new(self.clone(), range)
    }

    /// The index of the first occurrence of `needle`.
    pub fn find(&self, needle: &str) -> Option<Index> {
        self.find_from(needle, self.start_index())
    }

    /// The index of the first occurrence of `needle` at or after `from`.
    pub fn find_from(&self, needle: &str, from: Index) -> Option<Index> {
        let from = self.inner.scalar_index_rounding_down(from).utf8_offset();
        let found = self.inner.find(needle, from)?;
        Some(self.inner.scalar_index_rounding_down(self.inner.utf8_index(found)))
    }

    // Mutation

    fn utf8_range(&self, range: Range<Index>) -> Range<usize> {
        let start = self.inner.scalar_index_rounding_down(range.start).utf8_offset();
        let end = self.inner.scalar_index_rounding_down(range.end).utf8_offset();
        assert!(start <= end, "Invalid range");
        start..end
    }

    /// Replaces the text in `range` with `text`. The bounds are rounded down
    /// to scalar boundaries.
    pub fn replace_range(&mut self, range: Range<Index>, text: &str) {
        let range = self.utf8_range(range);
        self.inner.replace_range(range, text);
    }

    /// Replaces the text in `range` with the contents of `other`.
    pub fn replace_range_with(&mut self, range: Range<Index>, other: &BigString) {
        let range = self.utf8_range(range);
        self.inner.replace_range_with(range, &other.inner);
    }

    pub fn insert(&mut self, at: Index, c: char) {
        let mut buf = [0; 4];
        self.insert_str(at, c.encode_utf8(&mut buf));
    }

    pub fn insert_str(&mut self, at: Index, text: &str) {
        let at = self.inner.scalar_index_rounding_down(at).utf8_offset();
        self.inner.insert_str(at, text);
    }

    pub fn push(&mut self, c: char) {
        let mut buf = [0; 4];
        self.push_str(c.encode_utf8(&mut buf));
    }

    pub fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.build_at_end(|builder| builder.append_str(text));
    }

    pub fn append(&mut self, other: &BigString) {
        self.inner.append(&other.inner);
    }

    /// Removes the character at `i` and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `i` is the end index.
    pub fn remove(&mut self, i: Index) -> String {
        let start = self.inner.character_index_rounding_down(i);
        let end = self.inner.character_index_after(start);
        let range = start.utf8_offset()..end.utf8_offset();
        let removed = self.inner.slice(range.clone()).into_owned();
        self.inner.remove_range(range);
        removed
    }

    pub fn remove_range(&mut self, range: Range<Index>) {
        let range = self.utf8_range(range);
        self.inner.remove_range(range);
    }

    /// Removes everything from `at` on.
    pub fn truncate(&mut self, at: Index) {
        let end = self.end_index();
        self.remove_range(at..end);
    }

    pub fn clear(&mut self) {
        self.inner = BString::new();
    }
}

fn cmp_pieces<'a, 'b>(
    mut a: impl Iterator<Item = &'a str>,
    mut b: impl Iterator<Item = &'b str>,
) -> Ordering {
    let mut x: &[u8] = &[];
    let mut y: &[u8] = &[];
    loop {
        while x.is_empty() {
            match a.next() {
                Some(piece) => x = piece.as_bytes(),
                None => break,
            }
        }
        while y.is_empty() {
            match b.next() {
                Some(piece) => y = piece.as_bytes(),
                None => break,
            }
        }
        let n = x.len().min(y.len());
        if n == 0 {
            return x.len().cmp(&y.len());
        }
        match x[..n].cmp(&y[..n]) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        x = &x[n..];
        y = &y[n..];
    }
}

impl PartialEq for BigString {
    fn eq(&self, other: &BigString) -> bool {
        self.len() == other.len()
            && (self.ptr_eq(other) || cmp_pieces(self.chunks(), other.chunks()) == Ordering::Equal)
    }
}

impl Eq for BigString {}

impl PartialEq<str> for BigString {
    fn eq(&self, other: &str) -> bool {
        self.len() == other.len() && cmp_pieces(self.chunks(), Some(other).into_iter()).is_eq()
    }
}

impl<'a> PartialEq<&'a str> for BigString {
    fn eq(&self, other: &&'a str) -> bool {
        *self == **other
    }
}

impl PartialEq<BigString> for str {
    fn eq(&self, other: &BigString) -> bool {
        *other == *self
    }
}

impl<'a> PartialEq<BigString> for &'a str {
    fn eq(&self, other: &BigString) -> bool {
        *other == **self
    }
}

impl PartialOrd for BigString {
    fn partial_cmp(&self, other: &BigString) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigString {
    fn cmp(&self, other: &BigString) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        cmp_pieces(self.chunks(), other.chunks())
    }
}

/// Hashes the bytes in fixed-size blocks, so that equal strings hash alike
/// however they are chunked.
impl Hash for BigString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut block = [0u8; 64];
        let mut filled = 0;
        for piece in self.chunks() {
            let mut bytes = piece.as_bytes();
            while !bytes.is_empty() {
                let n = bytes.len().min(block.len() - filled);
                block[filled..filled + n].copy_from_slice(&bytes[..n]);
                filled += n;
                bytes = &bytes[n..];
                if filled == block.len() {
                    state.write(&block);
                    filled = 0;
                }
            }
        }
        state.write(&block[..filled]);
        state.write_u8(0xff);
    }
}

impl fmt::Display for BigString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for piece in self.chunks() {
            f.write_str(piece)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BigString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("BigString").field(&String::from(self)).finish()
    }
}

impl fmt::Write for BigString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl<'a> From<&'a str> for BigString {
    fn from(s: &'a str) -> BigString {
        BigString { inner: BString::from(s) }
    }
}

impl From<String> for BigString {
    fn from(s: String) -> BigString {
        BigString::from(s.as_str())
    }
}

impl<'a> From<&'a BigString> for String {
    fn from(s: &'a BigString) -> String {
        let mut result = String::with_capacity(s.len());
        result.extend(s.chunks());
        result
    }
}

impl From<BigString> for String {
    fn from(s: BigString) -> String {
        String::from(&s)
    }
}

impl FromStr for BigString {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<BigString, Infallible> {
        Ok(BigString::from(s))
    }
}

impl<'a> Extend<&'a str> for BigString {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        self.build_at_end(|builder| {
            for piece in iter {
                builder.append_str(piece);
            }
        });
    }
}

impl Extend<char> for BigString {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        self.build_at_end(|builder| {
            let mut batch = String::new();
            for (n, c) in iter.into_iter().enumerate() {
                batch.push(c);
                if (n + 1) % CHAR_BATCH == 0 {
                    builder.append_str(&batch);
                    batch.clear();
                }
            }
            builder.append_str(&batch);
        });
    }
}

impl<'a> FromIterator<&'a str> for BigString {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> BigString {
        let mut result = BigString::new();
        result.extend(iter);
        result
    }
}

impl FromIterator<char> for BigString {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> BigString {
        let mut result = BigString::new();
        result.extend(iter);
        result
    }
}
