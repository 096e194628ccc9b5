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

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::test_support::{rope_of, values_of, Block, BlockMetric, ValueMetric};
use super::*;

#[test]
fn empty_rope() {
    let rope: Rope<Block> = Rope::new();
    assert!(rope.is_empty());
    assert_eq!(rope.count::<ValueMetric>(), 0);
    assert_eq!(rope.start_index(), rope.end_index());
    assert!(rope.is_end(&rope.start_index()));
    let (index, remaining) = rope.find::<ValueMetric>(0, false);
    assert_eq!(index, rope.end_index());
    assert_eq!(remaining, 0);
    assert_eq!(rope.iter().count(), 0);
    assert_eq!(rope.offset::<ValueMetric>(&rope.end_index()), 0);
    rope.invariant_check();
}

#[test]
fn build_and_traverse() {
    let rope = rope_of(1000);
    rope.invariant_check();
    assert_eq!(values_of(&rope), (0..1000).collect::<Vec<_>>());
    assert_eq!(rope.count::<ValueMetric>(), 1000);
    assert_eq!(rope.count::<BlockMetric>(), rope.item_count());
    assert!(rope.height() > 2);
}

#[test]
fn index_after_and_before_agree() {
    let rope = rope_of(600);
    let mut forward = Vec::new();
    let mut index = rope.start_index();
    while !rope.is_end(&index) {
        forward.push(index);
        rope.form_index_after(&mut index);
    }
    assert_eq!(forward.len(), 100);
    let mut backward = Vec::new();
    let mut index = rope.end_index();
    while index != rope.start_index() {
        rope.form_index_before(&mut index);
        backward.push(index);
    }
    backward.reverse();
    assert_eq!(forward, backward);
    for (k, index) in forward.iter().enumerate() {
        assert_eq!(rope.offset::<BlockMetric>(index), k);
        assert_eq!(rope.get(index).values[0], 6 * k as u32);
    }
}

#[test]
fn find_and_offset_agree() {
    let rope = rope_of(500);
    for offset in 0..500 {
        let (index, remaining) = rope.find::<ValueMetric>(offset, false);
        assert_eq!(rope.offset::<ValueMetric>(&index) + remaining, offset);
        assert_eq!(rope.get(&index).values[remaining], offset as u32);
    }
    let (index, remaining) = rope.find::<ValueMetric>(500, false);
    assert!(rope.is_end(&index));
    assert_eq!(remaining, 0);
}

#[test]
fn find_boundary_preference() {
    let rope = rope_of(60);
    let (index, remaining) = rope.find::<ValueMetric>(6, true);
    assert_eq!(rope.offset::<BlockMetric>(&index), 0);
    assert_eq!(remaining, 6);
    let (index, remaining) = rope.find::<ValueMetric>(6, false);
    assert_eq!(rope.offset::<BlockMetric>(&index), 1);
    assert_eq!(remaining, 0);
    let (index, remaining) = rope.find::<ValueMetric>(60, true);
    assert_eq!(rope.offset::<BlockMetric>(&index), 9);
    assert_eq!(remaining, 6);
}

#[test]
fn form_index_from_anywhere() {
    let rope = rope_of(3000);
    let total = rope.count::<ValueMetric>();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..2000 {
        let from = rng.gen_range(0..total);
        let to = rng.gen_range(0..=total);
        let prefer_end = rng.gen::<bool>();
        let (mut index, remaining) = rope.find::<ValueMetric>(from, false);
        let start = from - remaining;
        let local = rope.form_index::<ValueMetric>(
            &mut index,
            to as isize - start as isize,
            prefer_end,
        );
        assert_eq!(rope.offset::<ValueMetric>(&index) + local, to, "{} -> {}", from, to);
        let (expected, expected_local) = rope.find::<ValueMetric>(to, prefer_end);
        assert_eq!(index, expected);
        assert_eq!(local, expected_local);
    }
}

#[test]
fn distance_is_additive() {
    let rope = rope_of(2000);
    let mut rng = StdRng::seed_from_u64(7);
    let start = rope.start_index();
    let end = rope.end_index();
    assert_eq!(rope.offset::<ValueMetric>(&start), 0);
    assert_eq!(rope.offset::<ValueMetric>(&end), 2000);
    assert_eq!(rope.distance::<ValueMetric>(&start, &end), 2000);
    assert_eq!(rope.distance::<ValueMetric>(&end, &start), -2000);
    for _ in 0..500 {
        let picks: Vec<_> = (0..3)
            .map(|_| rope.find::<ValueMetric>(rng.gen_range(0..=2000), false).0)
            .collect();
        let (i, j, k) = (&picks[0], &picks[1], &picks[2]);
        assert_eq!(
            rope.distance::<ValueMetric>(i, j) + rope.distance::<ValueMetric>(j, k),
            rope.distance::<ValueMetric>(i, k)
        );
        assert_eq!(
            rope.distance::<ValueMetric>(i, j),
            rope.offset::<ValueMetric>(j) as isize - rope.offset::<ValueMetric>(i) as isize
        );
    }
}

#[test]
fn insert_then_remove_round_trips() {
    let original = rope_of(600);
    for k in 0..=100 {
        let mut rope = original.clone();
        let (index, _) = rope.find::<BlockMetric>(k, false);
        rope.insert(Block::new(vec![7, 7, 7, 7, 7]), &index);
        rope.invariant_check();
        assert_eq!(rope.count::<BlockMetric>(), 101);
        let (index, _) = rope.find::<BlockMetric>(k, false);
        assert_eq!(rope.remove(&index), Block::new(vec![7, 7, 7, 7, 7]));
        rope.invariant_check();
        assert_eq!(values_of(&rope), values_of(&original));
    }
}

#[test]
fn undersized_insert_merges_with_neighbor() {
    let mut rope = rope_of(12);
    let (index, _) = rope.find::<BlockMetric>(1, false);
    rope.insert(Block::new(vec![100]), &index);
    rope.invariant_check();
    assert_eq!(rope.count::<BlockMetric>(), 2);
    assert_eq!(rope.count::<ValueMetric>(), 13);
}

#[test]
fn append_and_remove_ends() {
    let mut rope = Rope::new();
    for i in 0..200 {
        rope.append(Block::new(vec![i; 5]));
        rope.invariant_check();
    }
    rope.prepend(Block::new(vec![999; 5]));
    assert_eq!(rope.count::<BlockMetric>(), 201);
    assert_eq!(rope.remove_first().unwrap().values[0], 999);
    let mut expected = 199;
    while let Some(block) = rope.remove_last() {
        assert_eq!(block.values[0], expected);
        rope.invariant_check();
        expected = expected.wrapping_sub(1);
    }
    assert!(rope.is_empty());
    assert_eq!(rope.remove_first(), None);
}

#[test]
fn start_index_is_lazy() {
    let rope = rope_of(600);
    let mut start = rope.start_index();
    assert!(format!("{:?}", start).contains("greased: false"));
    assert_eq!(rope.get(&start).values[0], 0);
    rope.grease(&mut start);
    assert!(format!("{:?}", start).contains("greased: true"));
    assert_eq!(start, rope.start_index());
}

#[test]
fn update_keeps_index_valid() {
    let mut rope = rope_of(600);
    let (mut index, _) = rope.find::<ValueMetric>(300, false);
    let other = rope.start_index();
    let len = rope.update(&mut index, |block| {
        block.values.push(1234);
        block.values.len()
    });
    assert_eq!(len, 7);
    assert!(rope.is_valid(&index));
    assert!(!rope.is_valid(&other));
    assert_eq!(*rope.get(&index).values.last().unwrap(), 1234);
    assert_eq!(rope.count::<ValueMetric>(), 601);
    rope.invariant_check();
}

#[test]
#[should_panic(expected = "Invalid rope index")]
fn stale_index_panics() {
    let mut rope = rope_of(100);
    let index = rope.start_index();
    rope.append(Block::new(vec![1, 2, 3, 4]));
    rope.get(&index);
}

#[test]
#[should_panic(expected = "Invalid rope index")]
fn index_from_other_rope_panics() {
    let rope = rope_of(100);
    let other = rope_of(100);
    rope.index_after(&other.start_index());
}

#[test]
fn clone_shares_until_mutation() {
    let original = rope_of(1000);
    let mut copy = original.clone();
    assert!(copy.ptr_eq(&original));
    let index = original.start_index();
    assert!(copy.is_valid(&index));
    copy.remove_subrange::<ValueMetric>(100..900);
    assert!(!copy.ptr_eq(&original));
    assert!(original.is_valid(&index));
    assert_eq!(values_of(&original), (0..1000).collect::<Vec<_>>());
    let mut expected: Vec<u32> = (0..100).collect();
    expected.extend(900..1000);
    assert_eq!(values_of(&copy), expected);
    original.invariant_check();
    copy.invariant_check();
}

#[test]
fn split_and_join_are_inverse() {
    let rope = rope_of(700);
    for at in (0..=700).step_by(13) {
        let (left, right) = rope.clone().split_at::<ValueMetric>(at);
        left.invariant_check();
        right.invariant_check();
        assert_eq!(left.count::<ValueMetric>(), at);
        assert_eq!(right.count::<ValueMetric>(), 700 - at);
        let joined = Rope::join(left, right);
        joined.invariant_check();
        assert_eq!(values_of(&joined), (0..700).collect::<Vec<_>>());
    }
}

#[test]
fn split_at_index() {
    let rope = rope_of(600);
    let (index, _) = rope.find::<BlockMetric>(40, false);
    let (left, right) = rope.split(&index);
    assert_eq!(left.count::<BlockMetric>(), 40);
    assert_eq!(right.count::<BlockMetric>(), 60);
    left.invariant_check();
    right.invariant_check();
}

#[test]
fn join_uneven_heights() {
    let small = rope_of(3);
    let large = rope_of(5000);
    let joined = Rope::join(small.clone(), large.clone());
    joined.invariant_check();
    assert_eq!(joined.count::<ValueMetric>(), 5003);
    let joined = Rope::join(large, small);
    joined.invariant_check();
    assert_eq!(joined.count::<ValueMetric>(), 5003);
}

#[test]
fn join_overflowing_leaves() {
    // An underfull leaf next to a nearly full one has to be split in two.
    for (a, b) in [(30, 84), (6, 90), (84, 30), (90, 90)].iter() {
        let joined = Rope::join(rope_of(*a), rope_of(*b));
        joined.invariant_check();
        let mut expected: Vec<u32> = (0..*a).collect();
        expected.extend(0..*b);
        assert_eq!(values_of(&joined), expected);
    }
}

#[test]
fn extract_middle() {
    let rope = rope_of(800);
    let middle = rope.extract::<ValueMetric>(123..456);
    middle.invariant_check();
    assert_eq!(values_of(&middle), (123..456).collect::<Vec<_>>());
    assert_eq!(values_of(&rope), (0..800).collect::<Vec<_>>());
}

#[test]
fn insert_at_splits_elements() {
    let mut rope = rope_of(60);
    rope.insert_at::<ValueMetric>(Block::new(vec![500, 501, 502, 503]), 3);
    rope.invariant_check();
    let values = values_of(&rope);
    assert_eq!(&values[..8], &[0, 1, 2, 500, 501, 502, 503, 3]);
    assert_eq!(values.len(), 64);
}

#[test]
fn builder_tips() {
    let mut builder = Builder::new();
    builder.insert_before_tip(Block::new(vec![1, 2]));
    builder.insert_after_tip(Block::new(vec![9]));
    builder.insert_before_tip(Block::new(vec![3]));
    builder.insert_after_tip(Block::new(vec![7, 8]));
    assert_eq!(builder.prefix_summary().values, 3);
    assert_eq!(builder.suffix_summary().values, 3);
    builder.insert_rope_before_tip(rope_of(30));
    builder.insert_rope_after_tip(rope_of(12));
    let rope = builder.finalize();
    rope.invariant_check();
    let mut expected = vec![1, 2, 3];
    expected.extend(0..30);
    expected.extend(0..12);
    expected.extend(vec![7, 8, 9]);
    assert_eq!(values_of(&rope), expected);
}

#[test]
fn mutating_for_each_stops_early() {
    let mut rope = rope_of(600);
    let mut index = rope.start_index();
    let found = rope.mutating_for_each(&mut index, |block| {
        for value in block.values.iter_mut() {
            *value += 1;
        }
        if block.values.contains(&100) {
            Some(block.values[0])
        } else {
            None
        }
    });
    assert_eq!(found, Some(97));
    assert!(rope.is_valid(&index));
    assert_eq!(rope.offset::<BlockMetric>(&index), 16);
    let values = values_of(&rope);
    assert_eq!(values[0], 1);
    assert_eq!(values[101], 102);
    assert_eq!(values[102], 102);
}

#[test]
fn for_each_while_stops() {
    let rope = rope_of(600);
    let mut seen = 0;
    let finished = rope.for_each_while(|block| {
        seen += 1;
        block.values[0] < 60
    });
    assert!(!finished);
    assert_eq!(seen, 11);
    assert!(rope.for_each_while(|_| true));
}

#[test]
fn iterates_both_ways() {
    let rope = rope_of(120);
    let firsts: Vec<u32> = rope.iter().rev().map(|block| block.values[0]).collect();
    assert_eq!(firsts, (0..20).rev().map(|k| 6 * k).collect::<Vec<_>>());
    let mut iter = rope.iter();
    assert_eq!(iter.next().unwrap().values[0], 0);
    assert_eq!(iter.next_back().unwrap().values[0], 114);
    assert_eq!(iter.count(), 18);
}

#[test]
fn capacity_bounds() {
    // Three bit slots leave room for 21 levels.
    assert_eq!(Rope::<Block>::maximum_capacity(), 5usize.pow(21));
    assert_eq!(Rope::<Block>::minimum_capacity(), 2 * 2usize.pow(20));
}

#[test]
fn random_edits_match_vec() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut rope = rope_of(300);
    let mut model: Vec<u32> = (0..300).collect();
    let mut next = 10_000;
    for _ in 0..400 {
        let len = model.len();
        match rng.gen_range(0..3) {
            0 => {
                let at = rng.gen_range(0..=len);
                let size = rng.gen_range(1..=MAX);
                let block = Block::new(next..next + size as u32);
                model.splice(at..at, block.values.iter().cloned());
                next += size as u32;
                rope.insert_at::<ValueMetric>(block, at);
            }
            1 => {
                let a = rng.gen_range(0..=len);
                let b = rng.gen_range(a..=len.min(a + 40));
                model.drain(a..b);
                rope.remove_subrange::<ValueMetric>(a..b);
            }
            _ => {
                let at = rng.gen_range(0..=len);
                let (left, right) = rope.split_at::<ValueMetric>(at);
                rope = Rope::join(right, left);
                model.rotate_left(at);
            }
        }
        rope.invariant_check();
        assert_eq!(rope.count::<ValueMetric>(), model.len());
    }
    assert_eq!(values_of(&rope), model);
}

const MAX: usize = super::test_support::MAX_BLOCK;
