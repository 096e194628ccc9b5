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

//! Building ropes from a sequence of items and subtrees.

use std::cmp::Ordering;
use std::mem;

use log::trace;

use super::node::Item;
use super::{Node, Rope, RopeElement, RopeSummary};

/// Stack of partially built trees, appended to from the left.
struct TreeStack<E: RopeElement> {
    // A stack of partially built trees. These are kept in order of
    // strictly descending height, and all vectors have a length less
    // than MAX_NODE_SIZE and greater than zero.
    //
    // In addition, there is a balancing invariant: for each vector
    // of length greater than one, all elements satisfy `is_ok_child`.
    stack: Vec<Vec<Node<E>>>,
    // Items not yet packed into a leaf.
    leaf: Vec<Item<E>>,
}

impl<E: RopeElement> TreeStack<E> {
    fn new() -> TreeStack<E> {
        TreeStack { stack: Vec::new(), leaf: Vec::new() }
    }

    fn push_item(&mut self, value: E) {
        debug_assert!(!value.is_empty());
        self.leaf.push(Item::new(value));
        if self.leaf.len() == E::Summary::MAX_NODE_SIZE {
            self.flush_leaf();
        }
    }

    fn push(&mut self, node: Node<E>) {
        self.flush_leaf();
        self.push_node(node);
    }

    fn flush_leaf(&mut self) {
        if !self.leaf.is_empty() {
            let items = mem::take(&mut self.leaf);
            self.push_node(Node::from_items(items));
        }
    }

    fn push_node(&mut self, mut n: Node<E>) {
        loop {
            let ord = if let Some(last) = self.stack.last() {
                last[0].height().cmp(&n.height())
            } else {
                Ordering::Greater
            };
            match ord {
                Ordering::Less => {
                    n = Node::concat(self.pop(), n);
                }
                Ordering::Equal => {
                    let tos = self.stack.last_mut().unwrap();
                    if tos.last().unwrap().is_ok_child() && n.is_ok_child() {
                        tos.push(n);
                    } else {
                        let last = tos.pop().unwrap();
                        let (left, right) = Node::merge_siblings(last, n);
                        tos.push(left);
                        if let Some(right) = right {
                            tos.push(right);
                        }
                    }
                    if tos.len() < E::Summary::MAX_NODE_SIZE {
                        break;
                    }
                    n = self.pop()
                }
                Ordering::Greater => {
                    self.stack.push(vec![n]);
                    break;
                }
            }
        }
    }

    /// Build the final tree.
    ///
    /// The tree is the concatenation of all the nodes and items that have
    /// been pushed, in order.
    fn build(mut self) -> Option<Node<E>> {
        self.flush_leaf();
        if self.stack.is_empty() {
            return None;
        }
        let mut n = self.pop();
        while !self.stack.is_empty() {
            n = Node::concat(self.pop(), n);
        }
        Some(n)
    }

    /// Pop the last vec-of-nodes off the stack, resulting in a node.
    fn pop(&mut self) -> Node<E> {
        let nodes = self.stack.pop().unwrap();
        if nodes.len() == 1 {
            nodes.into_iter().next().unwrap()
        } else {
            Node::from_nodes(nodes)
        }
    }
}

/// Assembles a rope around an insertion point, the "tip".
///
/// Content is added on either side of the tip: items and ropes inserted
/// before the tip extend the prefix, those inserted after it extend the
/// suffix towards the tip. The items directly adjacent to the tip on each
/// side are held back so that new neighbors can be rebalanced with them.
pub struct Builder<E: RopeElement> {
    prefix: TreeStack<E>,
    prefix_tip: Option<E>,
    prefix_summary: E::Summary,
    // Items following the tip, nearest to the tip last.
    suffix_leaf: Vec<Item<E>>,
    // Subtrees following `suffix_leaf`, nearest to the tip last.
    suffix: Vec<Node<E>>,
    suffix_tip: Option<E>,
    suffix_summary: E::Summary,
}

impl<E: RopeElement> Default for Builder<E> {
    fn default() -> Builder<E> {
        Builder::new()
    }
}

impl<E: RopeElement> Builder<E> {
    pub fn new() -> Builder<E> {
        Builder {
            prefix: TreeStack::new(),
            prefix_tip: None,
            prefix_summary: E::Summary::zero(),
            suffix_leaf: Vec::new(),
            suffix: Vec::new(),
            suffix_tip: None,
            suffix_summary: E::Summary::zero(),
        }
    }

    /// Summary of everything before the tip.
    pub fn prefix_summary(&self) -> &E::Summary {
        &self.prefix_summary
    }

    /// Summary of everything after the tip.
    pub fn suffix_summary(&self) -> &E::Summary {
        &self.suffix_summary
    }

    pub fn is_prefix_empty(&self) -> bool {
        self.prefix_tip.is_none() && self.prefix.stack.is_empty() && self.prefix.leaf.is_empty()
    }

    /// The item directly before the tip, if it is still held back.
    pub fn prefix_tip(&self) -> Option<&E> {
        self.prefix_tip.as_ref()
    }

    /// The item directly after the tip, if it is still held back.
    pub fn suffix_tip(&self) -> Option<&E> {
        self.suffix_tip.as_ref()
    }

    /// Removes and returns the item held directly before the tip.
    pub fn take_prefix_tip(&mut self) -> Option<E> {
        let tip = self.prefix_tip.take()?;
        self.prefix_summary.subtract(&tip.summary());
        Some(tip)
    }

    /// Removes and returns the item held directly after the tip.
    pub fn take_suffix_tip(&mut self) -> Option<E> {
        let tip = self.suffix_tip.take()?;
        self.suffix_summary.subtract(&tip.summary());
        Some(tip)
    }

    /// Appends an item to the prefix.
    pub fn insert_before_tip(&mut self, item: E) {
        if item.is_empty() {
            return;
        }
        self.prefix_summary.add(&item.summary());
        let mut item = item;
        if let Some(mut tip) = self.prefix_tip.take() {
            if (tip.is_undersized() || item.is_undersized())
                && tip.rebalance_next_neighbor(&mut item)
            {
                self.prefix_tip = Some(tip);
                return;
            }
            if !tip.is_empty() {
                self.prefix.push_item(tip);
            }
        }
        self.prefix_tip = Some(item);
    }

    /// Prepends an item to the suffix.
    pub fn insert_after_tip(&mut self, item: E) {
        if item.is_empty() {
            return;
        }
        self.suffix_summary.add(&item.summary());
        let mut item = item;
        if let Some(mut tip) = self.suffix_tip.take() {
            if (tip.is_undersized() || item.is_undersized())
                && tip.rebalance_prev_neighbor(&mut item)
            {
                self.suffix_tip = Some(tip);
                return;
            }
            if !tip.is_empty() {
                self.push_suffix_item(tip);
            }
        }
        self.suffix_tip = Some(item);
    }

    /// Appends an item that is already balanced against the prefix tip.
    pub(crate) fn push_before_tip_unbalanced(&mut self, item: E) {
        self.prefix_summary.add(&item.summary());
        if let Some(tip) = self.prefix_tip.replace(item) {
            self.prefix.push_item(tip);
        }
    }

    /// Prepends an item that is already balanced against the suffix tip.
    pub(crate) fn push_after_tip_unbalanced(&mut self, item: E) {
        self.suffix_summary.add(&item.summary());
        if let Some(tip) = self.suffix_tip.replace(item) {
            self.push_suffix_item(tip);
        }
    }

    /// Appends all items of `rope` to the prefix.
    pub fn insert_rope_before_tip(&mut self, mut rope: Rope<E>) {
        let last = match rope.remove_last() {
            Some(last) => last,
            None => return,
        };
        if let Some(first) = rope.remove_first() {
            self.insert_before_tip(first);
            if let Some(root) = rope.take_root() {
                self.prefix_summary.add(root.summary());
                self.push_prefix_node(root);
            }
        }
        self.insert_before_tip(last);
    }

    /// Prepends all items of `rope` to the suffix.
    pub fn insert_rope_after_tip(&mut self, mut rope: Rope<E>) {
        let first = match rope.remove_first() {
            Some(first) => first,
            None => return,
        };
        if let Some(last) = rope.remove_last() {
            self.insert_after_tip(last);
            if let Some(root) = rope.take_root() {
                self.suffix_summary.add(root.summary());
                self.push_suffix_node(root);
            }
        }
        self.insert_after_tip(first);
    }

    /// Appends a subtree whose first item needs no rebalancing against the
    /// prefix. The summary is accounted for by the caller.
    pub(crate) fn push_prefix_node(&mut self, node: Node<E>) {
        if let Some(tip) = self.prefix_tip.take() {
            self.prefix.push_item(tip);
        }
        self.prefix.push(node);
    }

    /// Prepends a subtree whose last item needs no rebalancing against the
    /// suffix. The summary is accounted for by the caller.
    pub(crate) fn push_suffix_node(&mut self, node: Node<E>) {
        if let Some(tip) = self.suffix_tip.take() {
            self.push_suffix_item(tip);
        }
        self.flush_suffix_leaf();
        self.suffix.push(node);
    }

    pub(crate) fn add_prefix_summary(&mut self, summary: &E::Summary) {
        self.prefix_summary.add(summary);
    }

    pub(crate) fn add_suffix_summary(&mut self, summary: &E::Summary) {
        self.suffix_summary.add(summary);
    }

    fn push_suffix_item(&mut self, value: E) {
        self.suffix_leaf.push(Item::new(value));
        if self.suffix_leaf.len() == E::Summary::MAX_NODE_SIZE {
            self.flush_suffix_leaf();
        }
    }

    fn flush_suffix_leaf(&mut self) {
        if !self.suffix_leaf.is_empty() {
            let mut items = mem::take(&mut self.suffix_leaf);
            items.reverse();
            self.suffix.push(Node::from_items(items));
        }
    }

    fn build_suffix(&mut self, into: &mut TreeStack<E>) {
        if let Some(tip) = self.suffix_tip.take() {
            into.push_item(tip);
        }
        let mut leaf = mem::take(&mut self.suffix_leaf);
        leaf.reverse();
        for item in leaf {
            into.push_item(item.value);
        }
        while let Some(node) = self.suffix.pop() {
            into.push(node);
        }
    }

    /// Joins both sides into a single rope, rebalancing the items on either
    /// side of the tip.
    pub fn finalize(mut self) -> Rope<E> {
        match (self.prefix_tip.take(), self.suffix_tip.take()) {
            (Some(mut left), Some(mut right)) => {
                let merged = (left.is_undersized() || right.is_undersized())
                    && left.rebalance_next_neighbor(&mut right);
                self.prefix.push_item(left);
                if !merged {
                    self.suffix_tip = Some(right);
                }
            }
            (Some(left), None) => self.prefix.push_item(left),
            (None, Some(right)) => self.suffix_tip = Some(right),
            (None, None) => {}
        }
        let mut stack = mem::replace(&mut self.prefix, TreeStack::new());
        self.build_suffix(&mut stack);
        trace!("finalizing rope builder with {} pending levels", stack.stack.len());
        Rope::from_root(stack.build())
    }

    /// Finishes the two sides separately, returning the rope before the tip
    /// and the rope after it.
    pub fn split_finalize(mut self) -> (Rope<E>, Rope<E>) {
        let mut prefix = mem::replace(&mut self.prefix, TreeStack::new());
        if let Some(tip) = self.prefix_tip.take() {
            prefix.push_item(tip);
        }
        let mut suffix = TreeStack::new();
        self.build_suffix(&mut suffix);
        (Rope::from_root(prefix.build()), Rope::from_root(suffix.build()))
    }
}
