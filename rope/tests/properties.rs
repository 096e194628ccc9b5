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

//! Randomized checks of `BigString` against `String`.

extern crate bigstring;
extern crate rand;
extern crate unicode_segmentation;

use bigstring::{BigString, Index};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unicode_segmentation::UnicodeSegmentation;

const PIECES: &[&str] = &[
    "a",
    "bc",
    "\u{e9}",
    "e\u{301}",
    "\u{301}",
    "\u{1F600}",
    "\u{1F1FA}",
    "\u{1F1F8}",
    "\r",
    "\n",
    "\u{1F468}\u{200D}\u{1F469}",
    "\u{ac00}\u{11a8}",
    "the quick brown fox ",
];

fn random_text(rng: &mut StdRng, pieces: usize) -> String {
    (0..pieces).map(|_| PIECES[rng.gen_range(0..PIECES.len())]).collect()
}

fn scalar_offsets(text: &str) -> Vec<usize> {
    text.char_indices().map(|(i, _)| i).chain(Some(text.len())).collect()
}

fn assert_matches(s: &BigString, text: &str) {
    assert_eq!(s, text);
    assert_eq!(s.len(), text.len());
    assert_eq!(s.utf16_count(), text.encode_utf16().count());
    assert_eq!(s.unicode_scalar_count(), text.chars().count());
    assert_eq!(s.character_count(), text.graphemes(true).count());
}

#[test]
fn empty_string() {
    let s = BigString::new();
    assert_eq!(s.start_index(), s.end_index());
    assert_eq!(s.len(), 0);
    assert_eq!(s.utf16_count(), 0);
    assert_eq!(s.unicode_scalar_count(), 0);
    assert_eq!(s.character_count(), 0);
    assert_eq!(s.chunks().count(), 0);
    assert_eq!(s.bytes().count(), 0);
    assert_eq!(s.chars().count(), 0);
    assert_eq!(s.characters().count(), 0);
    assert_eq!(s.utf16_units().count(), 0);
}

#[test]
fn random_edits_match_string() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut text = random_text(&mut rng, 400);
    let mut s = BigString::from(text.as_str());
    for _ in 0..300 {
        let offsets = scalar_offsets(&text);
        let mut a = offsets[rng.gen_range(0..offsets.len())];
        let mut b = offsets[rng.gen_range(0..offsets.len())];
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        if rng.gen_range(0..4) == 0 {
            b = a.min(text.len());
        }
        let count = rng.gen_range(0..30);
        let insert = random_text(&mut rng, count);
        let range = s.utf8().index_at(a)..s.utf8().index_at(b);
        s.replace_range(range, &insert);
        text.replace_range(a..b, &insert);
        assert_matches(&s, &text);
    }
    let expected: Vec<&str> = text.graphemes(true).collect();
    let characters: Vec<String> = s.characters().map(|c| c.into_owned()).collect();
    assert_eq!(characters, expected);
}

#[test]
fn insert_then_remove_restores() {
    let mut rng = StdRng::seed_from_u64(17);
    let text = random_text(&mut rng, 300);
    let original = BigString::from(text.as_str());
    for _ in 0..50 {
        let offsets = scalar_offsets(&text);
        let at = offsets[rng.gen_range(0..offsets.len())];
        let count = rng.gen_range(1..20);
        let insert = random_text(&mut rng, count);
        let mut s = original.clone();
        s.insert_str(s.utf8().index_at(at), &insert);
        let start = s.utf8().index_at(at);
        let end = s.utf8().index_at(at + insert.len());
        s.remove_range(start..end);
        assert_eq!(s, original);
        assert!(s.characters().eq(original.characters()));
        assert_eq!(text, original.to_string());
    }
}

#[test]
fn distances_are_additive() {
    let mut rng = StdRng::seed_from_u64(23);
    let text = random_text(&mut rng, 500);
    let s = BigString::from(text.as_str());
    for _ in 0..200 {
        let mut points: Vec<usize> =
            (0..3).map(|_| rng.gen_range(0..=s.character_count())).collect();
        points.sort();
        let [i, j, k] = [s.index_at(points[0]), s.index_at(points[1]), s.index_at(points[2])];
        assert_eq!(s.distance(i, k), s.distance(i, j) + s.distance(j, k));

        let scalars = s.unicode_scalars();
        assert_eq!(scalars.distance(i, k), scalars.distance(i, j) + scalars.distance(j, k));
        let utf16 = s.utf16();
        assert_eq!(utf16.distance(i, k), utf16.distance(i, j) + utf16.distance(j, k));
        let utf8 = s.utf8();
        assert_eq!(utf8.distance(i, k), utf8.distance(i, j) + utf8.distance(j, k));
    }
}

#[test]
fn offsets_of_ends() {
    let mut rng = StdRng::seed_from_u64(29);
    for pieces in [0, 1, 10, 1000].iter() {
        let text = random_text(&mut rng, *pieces);
        let s = BigString::from(text.as_str());
        let (start, end) = (s.start_index(), s.end_index());
        assert_eq!(s.utf8().offset_of(start), 0);
        assert_eq!(s.utf8().offset_of(end), s.len());
        assert_eq!(s.utf16().offset_of(start), 0);
        assert_eq!(s.utf16().offset_of(end), s.utf16_count());
        assert_eq!(s.unicode_scalars().offset_of(start), 0);
        assert_eq!(s.unicode_scalars().offset_of(end), s.unicode_scalar_count());
        assert_eq!(s.distance(start, end), s.character_count() as isize);
    }
}

#[test]
fn views_agree_with_string() {
    let mut rng = StdRng::seed_from_u64(31);
    let text = random_text(&mut rng, 600);
    let s = BigString::from(text.as_str());
    assert!(s.bytes().eq(text.bytes()));
    assert!(s.chars().rev().eq(text.chars().rev()));
    assert!(s.utf16_units().eq(text.encode_utf16()));

    let units: Vec<u16> = text.encode_utf16().collect();
    let utf16 = s.utf16();
    for offset in (0..units.len()).step_by(5) {
        let i = utf16.index_at(offset);
        assert_eq!(utf16.get(i), units[offset]);
        assert_eq!(utf16.offset_of(i), offset);
        assert!(utf16.iter_from(i).eq(units[offset..].iter().cloned()));
    }

    let chars: Vec<char> = text.chars().collect();
    let scalars = s.unicode_scalars();
    for offset in (0..chars.len()).step_by(3) {
        let i = scalars.index_at(offset);
        assert_eq!(scalars.get(i), chars[offset]);
        assert!(s.chars_from(i).eq(chars[offset..].iter().cloned()));
    }
}

#[test]
fn trailing_surrogate_rounding() {
    let s = BigString::from("a\u{1F600}b");
    let utf16 = s.utf16();
    let trailing = utf16.index_at(2);
    assert!(trailing.is_trailing_surrogate());
    assert_eq!(utf16.index_rounding_down(trailing), trailing);
    assert_eq!(utf16.index_rounding_up(trailing), trailing);

    let scalars = s.unicode_scalars();
    assert_eq!(scalars.index_rounding_down(trailing), scalars.index_at(1));
    assert_eq!(scalars.index_rounding_up(trailing), scalars.index_at(2));
    assert_eq!(s.index_rounding_down(trailing), s.index_at(1));
    assert_eq!(s.index_rounding_up(trailing), s.index_at(2));
}

#[test]
fn indices_survive_unrelated_copies() {
    let text = "\u{e9}a".repeat(400);
    let s = BigString::from(text.as_str());
    let i: Index = s.index_at(300);
    let copy = s.clone();
    assert_eq!(copy.character_at(i), "\u{e9}");
    assert_eq!(copy.distance(copy.start_index(), i), 300);
}
