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

//! Views of a string in its encoding units.
//!
//! All views share [`Index`] with the string, so an index found in one view
//! can be used in any other.

use crate::bstring::{BString, Bytes, Chars, Index, Utf16Units};
use crate::metrics::{UnicodeScalarMetric, Utf16Metric, Utf8Metric};

/// The string as a collection of UTF-8 bytes.
#[derive(Clone, Copy)]
pub struct Utf8View<'a> {
    string: &'a BString,
}

impl<'a> Utf8View<'a> {
    pub(crate) fn new(string: &'a BString) -> Utf8View<'a> {
        Utf8View { string }
    }

    pub fn count(&self) -> usize {
        self.string.utf8_count()
    }

    /// The index at byte offset `offset`, which may be inside a scalar.
    pub fn index_at(&self, offset: usize) -> Index {
        self.string.utf8_index(offset)
    }

    pub fn offset_of(&self, i: Index) -> usize {
        i.utf8_offset()
    }

    pub fn index_after(&self, i: Index) -> Index {
        self.string.utf8_index_after(i)
    }

    pub fn index_before(&self, i: Index) -> Index {
        self.string.utf8_index_before(i)
    }

    pub fn index_offset_by(&self, i: Index, distance: isize) -> Index {
        let target = i.utf8_offset() as isize + distance;
        assert!(target >= 0 && target as usize <= self.count(), "Index out of bounds");
        self.string.index_offset_by::<Utf8Metric>(i.without_trailing_surrogate(), distance)
    }

    pub fn distance(&self, from: Index, to: Index) -> isize {
        to.utf8_offset() as isize - from.utf8_offset() as isize
    }

    /// The byte at `i`.
    pub fn get(&self, i: Index) -> u8 {
        self.string.utf8_byte(i)
    }

    pub fn iter(&self) -> Bytes<'a> {
        self.string.bytes(0..self.count())
    }

    pub fn iter_from(&self, i: Index) -> Bytes<'a> {
        self.string.bytes(i.utf8_offset()..self.count())
    }
}

/// The string as a collection of UTF-16 code units.
///
/// Indices into this view may address the trailing surrogate of a scalar
/// outside the basic multilingual plane.
#[derive(Clone, Copy)]
pub struct Utf16View<'a> {
    string: &'a BString,
}

impl<'a> Utf16View<'a> {
    pub(crate) fn new(string: &'a BString) -> Utf16View<'a> {
        Utf16View { string }
    }

    pub fn count(&self) -> usize {
        self.string.utf16_count()
    }

    pub fn index_at(&self, offset: usize) -> Index {
        self.string.index_at_offset::<Utf16Metric>(offset)
    }

    pub fn offset_of(&self, i: Index) -> usize {
        self.string.offset_of::<Utf16Metric>(self.string.utf16_index_rounding_down(i))
    }

    pub fn index_after(&self, i: Index) -> Index {
        self.string.utf16_index_after(i)
    }

    pub fn index_before(&self, i: Index) -> Index {
        self.string.utf16_index_before(i)
    }

    pub fn index_offset_by(&self, i: Index, distance: isize) -> Index {
        let i = self.string.utf16_index_rounding_down(i);
        self.string.index_offset_by::<Utf16Metric>(i, distance)
    }

    pub fn distance(&self, from: Index, to: Index) -> isize {
        let from = self.string.utf16_index_rounding_down(from);
        let to = self.string.utf16_index_rounding_down(to);
        self.string.distance::<Utf16Metric>(from, to)
    }

    /// The code unit at `i`.
    pub fn get(&self, i: Index) -> u16 {
        self.string.utf16_unit(i)
    }

    pub fn index_rounding_down(&self, i: Index) -> Index {
        self.string.utf16_index_rounding_down(i)
    }

    pub fn index_rounding_up(&self, i: Index) -> Index {
        self.string.utf16_index_rounding_up(i)
    }

    pub fn iter(&self) -> Utf16Units<'a> {
        self.string.utf16_units(self.string.start_index(), self.string.end_index())
    }

    pub fn iter_from(&self, i: Index) -> Utf16Units<'a> {
        self.string.utf16_units(i, self.string.end_index())
    }
}

/// The string as a collection of Unicode scalar values.
#[derive(Clone, Copy)]
pub struct UnicodeScalarView<'a> {
    string: &'a BString,
}

impl<'a> UnicodeScalarView<'a> {
    pub(crate) fn new(string: &'a BString) -> UnicodeScalarView<'a> {
        UnicodeScalarView { string }
    }

    pub fn count(&self) -> usize {
        self.string.scalar_count()
    }

    pub fn index_at(&self, offset: usize) -> Index {
        self.string.index_at_offset::<UnicodeScalarMetric>(offset)
    }

    pub fn offset_of(&self, i: Index) -> usize {
        self.string.offset_of::<UnicodeScalarMetric>(self.string.scalar_index_rounding_down(i))
    }

    pub fn index_after(&self, i: Index) -> Index {
        self.string.scalar_index_after(i)
    }

    pub fn index_before(&self, i: Index) -> Index {
        self.string.scalar_index_before(i)
    }

    pub fn index_offset_by(&self, i: Index, distance: isize) -> Index {
        let i = self.string.scalar_index_rounding_down(i);
        self.string.index_offset_by::<UnicodeScalarMetric>(i, distance)
    }

    pub fn distance(&self, from: Index, to: Index) -> isize {
        let from = self.string.scalar_index_rounding_down(from);
        let to = self.string.scalar_index_rounding_down(to);
        self.string.distance::<UnicodeScalarMetric>(from, to)
    }

    /// The scalar at `i`, rounded down to a scalar boundary.
    pub fn get(&self, i: Index) -> char {
        self.string.scalar(i)
    }

    pub fn index_rounding_down(&self, i: Index) -> Index {
        self.string.scalar_index_rounding_down(i)
    }

    pub fn index_rounding_up(&self, i: Index) -> Index {
        self.string.scalar_index_rounding_up(i)
    }

    pub fn iter(&self) -> Chars<'a> {
        self.string.chars(self.string.start_index(), self.string.end_index())
    }

    pub fn iter_from(&self, i: Index) -> Chars<'a> {
        self.string.chars(i, self.string.end_index())
    }
}

#[cfg(test)]
mod tests {
    use crate::BigString;

    fn sample() -> (String, BigString) {
        let text: String = (0..300).map(|i| ["x", "\u{1F600}", "e\u{301}", "\u{e9}"][i % 4]).collect();
        let string = BigString::from(text.as_str());
        (text, string)
    }

    #[test]
    fn utf8_view() {
        let (text, string) = sample();
        let utf8 = string.utf8();
        assert_eq!(utf8.count(), text.len());
        let i = utf8.index_at(2);
        assert_eq!(utf8.get(i), text.as_bytes()[2]);
        assert_eq!(utf8.get(utf8.index_after(i)), text.as_bytes()[3]);
        assert_eq!(utf8.index_before(i).utf8_offset(), 1);
        let far = utf8.index_offset_by(i, 500);
        assert_eq!(utf8.get(far), text.as_bytes()[502]);
        assert_eq!(utf8.distance(far, i), -500);
        assert!(utf8.iter_from(i).eq(text.bytes().skip(2)));
        assert!(utf8.iter().rev().eq(text.bytes().rev()));
    }

    #[test]
    fn utf16_view() {
        let (text, string) = sample();
        let units: Vec<u16> = text.encode_utf16().collect();
        let utf16 = string.utf16();
        assert_eq!(utf16.count(), units.len());
        // Unit 2 is the trailing surrogate of the emoji.
        let i = utf16.index_at(2);
        assert!(i.is_trailing_surrogate());
        assert_eq!(utf16.get(i), units[2]);
        assert_eq!(utf16.offset_of(i), 2);
        assert_eq!(utf16.index_before(i), utf16.index_at(1));
        assert_eq!(utf16.index_after(i), utf16.index_at(3));
        assert_eq!(utf16.index_rounding_down(i), i);
        let far = utf16.index_offset_by(i, 401);
        assert_eq!(utf16.get(far), units[403]);
        assert_eq!(utf16.distance(i, far), 401);
        assert!(utf16.iter_from(i).eq(units[2..].iter().cloned()));
        assert!(utf16.iter().rev().eq(units.iter().rev().cloned()));
    }

    #[test]
    fn scalar_view() {
        let (text, string) = sample();
        let chars: Vec<char> = text.chars().collect();
        let scalars = string.unicode_scalars();
        assert_eq!(scalars.count(), chars.len());
        let i = scalars.index_at(3);
        assert_eq!(scalars.get(i), chars[3]);
        assert_eq!(scalars.offset_of(i), 3);
        let inside = string.utf8().index_at(2);
        assert_eq!(scalars.index_rounding_down(inside), scalars.index_at(1));
        assert_eq!(scalars.index_rounding_up(inside), scalars.index_at(2));
        assert_eq!(scalars.get(inside), '\u{1F600}');
        let far = scalars.index_offset_by(i, 300);
        assert_eq!(scalars.get(far), chars[303]);
        assert_eq!(scalars.distance(far, i), -300);
        assert_eq!(scalars.index_before(i), scalars.index_at(2));
        assert!(scalars.iter_from(i).eq(chars[3..].iter().cloned()));
        assert!(scalars.iter().rev().eq(chars.iter().rev().cloned()));
    }
}
