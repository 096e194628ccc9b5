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

//! A small element type for exercising the tree with narrow nodes.

use std::mem;

use super::{Rope, RopeElement, RopeMetric, RopeSummary};

pub(crate) const MAX_BLOCK: usize = 8;

/// A run of numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Block {
    pub(crate) values: Vec<u32>,
}

impl Block {
    pub(crate) fn new(values: impl IntoIterator<Item = u32>) -> Block {
        Block { values: values.into_iter().collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Counts {
    pub(crate) values: usize,
    pub(crate) blocks: usize,
}

impl RopeSummary for Counts {
    const MAX_NODE_SIZE: usize = 5;
    const NODE_SIZE_BIT_WIDTH: u32 = 3;

    fn zero() -> Counts {
        Counts { values: 0, blocks: 0 }
    }

    fn is_zero(&self) -> bool {
        self.values == 0 && self.blocks == 0
    }

    fn add(&mut self, other: &Counts) {
        self.values += other.values;
        self.blocks += other.blocks;
    }

    fn subtract(&mut self, other: &Counts) {
        self.values -= other.values;
        self.blocks -= other.blocks;
    }
}

impl RopeElement for Block {
    type Summary = Counts;
    type Index = usize;

    fn summary(&self) -> Counts {
        Counts { values: self.values.len(), blocks: 1 }
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn is_undersized(&self) -> bool {
        self.values.len() < MAX_BLOCK / 2
    }

    fn invariant_check(&self) {
        assert!(self.values.len() <= MAX_BLOCK, "oversized block");
    }

    fn rebalance_next_neighbor(&mut self, right: &mut Block) -> bool {
        let total = self.values.len() + right.values.len();
        if total <= MAX_BLOCK {
            self.values.append(&mut right.values);
            return true;
        }
        if !self.is_undersized() && !right.is_undersized() {
            return false;
        }
        let mut all = mem::take(&mut self.values);
        all.append(&mut right.values);
        right.values = all.split_off(total / 2);
        self.values = all;
        false
    }

    fn rebalance_prev_neighbor(&mut self, left: &mut Block) -> bool {
        if left.rebalance_next_neighbor(self) {
            mem::swap(left, self);
            return true;
        }
        false
    }

    fn split(&mut self, at: usize) -> Block {
        Block { values: self.values.split_off(at) }
    }
}

pub(crate) struct ValueMetric;

impl RopeMetric<Block> for ValueMetric {
    fn measure(summary: &Counts) -> usize {
        summary.values
    }

    fn index_at(offset: usize, _: &Block) -> usize {
        offset
    }
}

pub(crate) struct BlockMetric;

impl RopeMetric<Block> for BlockMetric {
    fn measure(summary: &Counts) -> usize {
        summary.blocks
    }

    fn index_at(_: usize, _: &Block) -> usize {
        0
    }
}

/// The numbers `0..n` in blocks of six.
pub(crate) fn rope_of(n: u32) -> Rope<Block> {
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + 6).min(n);
        blocks.push(Block::new(start..end));
        start = end;
    }
    blocks.into_iter().collect()
}

pub(crate) fn values_of(rope: &Rope<Block>) -> Vec<u32> {
    rope.iter().flat_map(|block| block.values.iter().cloned()).collect()
}
