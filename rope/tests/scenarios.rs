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

//! End-to-end editing scenarios.

extern crate bigstring;
extern crate rand;
extern crate unicode_segmentation;

use bigstring::{BigString, Chunk, GraphemeRecognizer, Rope, Utf8Metric};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unicode_segmentation::UnicodeSegmentation;

const FLAG: &str = "\u{1F1FA}\u{1F1F8}";

fn chunk_boundaries(s: &BigString) -> Vec<usize> {
    let mut offset = 0;
    let mut boundaries = Vec::new();
    for piece in s.chunks() {
        offset += piece.len();
        boundaries.push(offset);
    }
    boundaries.pop();
    boundaries
}

fn assert_characters_match(s: &BigString) {
    let text = s.to_string();
    let expected: Vec<&str> = text.graphemes(true).collect();
    assert_eq!(s.character_count(), expected.len());
    let forward: Vec<String> = s.characters().map(|c| c.into_owned()).collect();
    assert_eq!(forward, expected);
    let mut backward: Vec<String> = s.characters().rev().map(|c| c.into_owned()).collect();
    backward.reverse();
    assert_eq!(backward, expected);
}

#[test]
fn accent_after_long_ascii_run() {
    let text = "ab".repeat(25_000);
    let mut s = BigString::from(text.as_str());
    assert_eq!(s.character_count(), 50_000);

    let at = s.index_at(25_000);
    s.insert(at, '\u{301}');
    assert_eq!(s.character_count(), 50_000);
    assert_eq!(s.unicode_scalar_count(), 50_001);
    assert_eq!(s.character_at(s.index_at(24_999)), "b\u{301}");
    assert_eq!(s.character_at(s.index_at(25_000)), "a");
    assert_characters_match(&s);
}

#[test]
fn long_combining_run() {
    let marks = "\u{301}\u{316}".repeat(10_000);
    let mut s = BigString::from(format!("e{}", marks));
    assert_eq!(s.character_count(), 1);
    assert_eq!(s.unicode_scalar_count(), 20_001);

    let middle = s.unicode_scalars().index_at(10_001);
    s.insert(middle, 'x');
    assert_eq!(s.character_count(), 2);
    s.insert(s.start_index(), '\u{1F1FA}');
    assert_eq!(s.character_count(), 3);
    assert_characters_match(&s);
}

#[test]
fn accent_at_chunk_boundary() {
    let text = "ab".repeat(25_000);
    let mut s = BigString::from(text.as_str());
    let boundaries = chunk_boundaries(&s);
    assert!(!boundaries.is_empty());
    let boundary = boundaries[boundaries.len() / 2];

    let at = s.utf8().index_at(boundary);
    s.insert(at, '\u{301}');
    assert_eq!(s.character_count(), 50_000);
    let before = s.index_before(s.utf8().index_at(boundary + 2));
    assert_eq!(before.utf8_offset(), boundary - 1);
    assert_eq!(s.character_at(before).chars().count(), 2);
    assert_characters_match(&s);

    // Removing the accent splits the cluster again.
    let accent = s.utf8().index_at(boundary);
    s.remove_range(accent..s.utf8().index_at(boundary + 2));
    assert_eq!(s, text.as_str());
    assert_characters_match(&s);
}

#[test]
fn flag_across_chunk_split() {
    for prefix in 245..=255 {
        let mut s = BigString::from("x".repeat(prefix).as_str());
        s.push_str("\u{1F1FA}");
        s.push_str("\u{1F1F8}");
        assert_eq!(s.character_count(), prefix + 1, "prefix {}", prefix);
        let last = s.index_before(s.end_index());
        assert_eq!(s.character_at(last), FLAG);
        assert_eq!(s.characters().filter(|c| c == FLAG).count(), 1);
        assert_characters_match(&s);
    }

    // Pieces that fill a chunk exactly put the indicators in different
    // chunks before rebalancing moves them.
    let pieces: Vec<Result<String, ()>> =
        vec![Ok(format!("{}\u{1F1FA}", "x".repeat(251))), Ok("\u{1F1F8}".into())];
    let s = BigString::try_from_chunks(pieces).unwrap();
    assert_eq!(s.character_count(), 252);
    assert_eq!(s.characters().rev().next().unwrap(), FLAG);
    assert_characters_match(&s);
}

#[test]
fn flag_split_by_insertion() {
    let mut s = BigString::from(format!("{}\u{1F1F8}y", "x".repeat(300)).as_str());
    assert_eq!(s.character_count(), 302);
    let at = s.utf8().index_at(300);
    s.insert_str(at, "\u{1F1FA}");
    assert_eq!(s.character_count(), 302);
    assert_eq!(s.character_at(s.index_at(300)), FLAG);
    let at = s.utf8().index_at(300);
    s.insert_str(at, "\u{1F1EB}");
    // The new indicator pairs with the one after it, leaving a lone one.
    assert_eq!(s.character_count(), 303);
    assert_eq!(s.character_at(s.index_at(300)), "\u{1F1EB}\u{1F1FA}");
    assert_eq!(s.character_at(s.index_at(301)), "\u{1F1F8}");
    assert_characters_match(&s);
}

#[test]
fn split_and_join_is_identity() {
    let mut rng = StdRng::seed_from_u64(3);
    let pieces = ["a", "\u{e9}", "e\u{301}", "\u{1F600}", "\r\n", FLAG, "\u{915}\u{94d}\u{937}"];
    let text: String = (0..10_000).map(|_| pieces[rng.gen_range(0..pieces.len())]).collect();
    let s = BigString::from(text.as_str());
    for _ in 0..10 {
        let at = s.index_at(rng.gen_range(0..=s.character_count()));
        let left = s.slice(s.start_index()..at).to_big_string();
        let right = s.slice(at..s.end_index()).to_big_string();
        let mut joined = left.clone();
        joined.append(&right);
        assert_eq!(joined, s);
        assert_eq!(joined.character_count(), s.character_count());
        assert!(joined.characters().eq(s.characters()));
        assert_eq!(left.character_count() + right.character_count(), s.character_count());
    }
}

#[test]
fn copies_are_independent() {
    let text = "\u{e9}t\u{e9} ".repeat(500);
    let original = BigString::from(text.as_str());
    let mut copy = original.clone();
    assert!(copy.ptr_eq(&original));
    for _ in 0..100 {
        copy.push('z');
    }
    assert!(!copy.ptr_eq(&original));
    assert_eq!(original.character_count(), 2000);
    assert_eq!(original.to_string(), text);
    assert_eq!(copy.character_count(), original.character_count() + 100);

    let mut other = original.clone();
    let middle = other.index_at(1000);
    other.remove_range(other.start_index()..middle);
    assert_eq!(original.to_string(), text);
    assert_eq!(other.character_count(), 1000);
}

#[test]
fn seek_stress() {
    let mut rng = StdRng::seed_from_u64(5);
    let pieces = ["a", "\u{e9}", "e\u{301}", "\u{1F600}", "\r\n", FLAG, "\u{301}"];
    let mut s = BigString::new();
    while s.len() < 1200 {
        let n = rng.gen_range(1..40);
        let chunk: String = (0..n).map(|_| pieces[rng.gen_range(0..pieces.len())]).collect();
        s.push_str(&chunk);
    }
    let n = s.character_count() as isize;
    for i in 0..=n {
        let from = s.index_at(i as usize);
        for offset in -i..=n - i {
            let to = s.index_offset_by(from, offset);
            assert_eq!(s.distance(from, to), offset);
        }
    }

    let scalars = s.unicode_scalars();
    let count = scalars.count() as isize;
    for i in (0..=count).step_by(7) {
        let from = scalars.index_at(i as usize);
        for offset in -i..=count - i {
            let to = scalars.index_offset_by(from, offset);
            assert_eq!(scalars.distance(from, to), offset);
        }
    }
}

#[test]
#[should_panic(expected = "Invalid rope index")]
fn stale_rope_index_panics() {
    let mut state = GraphemeRecognizer::new();
    let mut rope: Rope<Chunk> = Rope::new();
    for _ in 0..20 {
        rope.append(Chunk::new(&"abc".repeat(50), &mut state));
    }
    let (index, _) = rope.find::<Utf8Metric>(1000, false);
    rope.remove_subrange::<Utf8Metric>(0..150);
    rope.get(&index);
}
