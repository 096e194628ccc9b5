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

//! Structural edits: inserting, removing, updating, splitting and joining.

use std::iter::FromIterator;
use std::mem;
use std::ops::Range;

use super::node::{Item, NodeVal};
use super::{Builder, Index, Node, Path, Rope, RopeElement, RopeMetric};

impl<E: RopeElement> Rope<E> {
    /// Inserts `item` before the item at `index`, or at the end of the rope
    /// if `index` is the end index.
    pub fn insert(&mut self, item: E, index: &Index<E>) {
        assert!(!item.is_empty(), "Can't insert an empty element");
        let at_end = self.is_end(index);
        self.root = match self.root.take() {
            None => Some(Node::from_items(vec![Item::new(item)])),
            Some(mut root) => match root.insert_item(&index.path, at_end, item) {
                None => Some(root),
                Some(sibling) => {
                    assert!(root.height() < Path::<E::Summary>::max_height(), "Rope is full");
                    Some(Node::from_nodes(vec![root, sibling]))
                }
            },
        };
        self.bump_version();
    }

    /// Inserts `item` at `offset` in metric `M`, splitting the element at
    /// that position if it falls inside one.
    pub fn insert_at<M: RopeMetric<E>>(&mut self, item: E, offset: usize) {
        let (index, remaining) = self.find::<M>(offset, false);
        if remaining == 0 {
            self.insert(item, &index);
            return;
        }
        let (left, right) = mem::take(self).split_at::<M>(offset);
        let mut builder = Builder::new();
        builder.insert_rope_before_tip(left);
        builder.insert_before_tip(item);
        builder.insert_rope_before_tip(right);
        *self = builder.finalize();
    }

    pub fn append(&mut self, item: E) {
        let end = self.end_index();
        self.insert(item, &end);
    }

    pub fn prepend(&mut self, item: E) {
        let start = self.start_index();
        self.insert(item, &start);
    }

    /// Removes and returns the item at `index`.
    pub fn remove(&mut self, index: &Index<E>) -> E {
        assert!(!self.is_end(index), "Can't remove the end index");
        let mut root = match self.root.take() {
            Some(root) => root,
            None => panic!("Can't remove from an empty rope"),
        };
        let removed = root.remove_item(&index.path);
        self.root = Rope::collapse(root);
        self.bump_version();
        removed
    }

    /// Removes the item containing `offset` in metric `M`.
    pub fn remove_at<M: RopeMetric<E>>(&mut self, offset: usize) -> E {
        let (index, _) = self.find::<M>(offset, false);
        self.remove(&index)
    }

    pub fn remove_first(&mut self) -> Option<E> {
        if self.is_empty() {
            return None;
        }
        let start = self.start_index();
        Some(self.remove(&start))
    }

    pub fn remove_last(&mut self) -> Option<E> {
        if self.is_empty() {
            return None;
        }
        let last = self.index_before(&self.end_index());
        Some(self.remove(&last))
    }

    // Drops root levels left with a single child.
    fn collapse(mut root: Node<E>) -> Option<Node<E>> {
        loop {
            if root.child_count() > 1 || (root.is_leaf() && root.child_count() == 1) {
                return Some(root);
            }
            match root.into_val() {
                NodeVal::Internal(mut children) => match children.pop() {
                    Some(child) => root = child,
                    None => return None,
                },
                NodeVal::Leaf(_) => return None,
            }
        }
    }

    /// Mutates the item at `index` in place.
    ///
    /// The rope gets a new version, and `index` is updated to stay valid;
    /// all other indices are invalidated. The item must not become empty.
    pub fn update<R>(&mut self, index: &mut Index<E>, f: impl FnOnce(&mut E) -> R) -> R {
        assert!(!self.is_end(index), "Can't update the end index");
        let result = match &mut self.root {
            Some(root) => root.update_item(&index.path, f),
            None => panic!("Can't update an empty rope"),
        };
        self.bump_version();
        index.version = self.version;
        self.grease(index);
        result
    }

    /// Dismantles the rope into a builder whose tip sits before the item at
    /// `index`.
    pub fn builder_at(mut self, index: &Index<E>) -> Builder<E> {
        self.validate(index);
        let mut builder = Builder::new();
        if let Some(root) = self.root.take() {
            Rope::split_node_into(root, &index.path, &mut builder);
        }
        builder
    }

    fn split_node_into(node: Node<E>, path: &Path<E::Summary>, builder: &mut Builder<E>) {
        let slot = path.slot(node.height());
        match node.into_val() {
            NodeVal::Leaf(items) => {
                let mut after = Vec::new();
                for (i, item) in items.into_iter().enumerate() {
                    if i < slot {
                        builder.push_before_tip_unbalanced(item.value);
                    } else {
                        after.push(item.value);
                    }
                }
                for value in after.into_iter().rev() {
                    builder.push_after_tip_unbalanced(value);
                }
            }
            NodeVal::Internal(children) => {
                let mut children = children.into_iter();
                for child in children.by_ref().take(slot) {
                    builder.add_prefix_summary(child.summary());
                    builder.push_prefix_node(child);
                }
                let current = children.next();
                let rest: Vec<Node<E>> = children.collect();
                for child in rest.into_iter().rev() {
                    builder.add_suffix_summary(child.summary());
                    builder.push_suffix_node(child);
                }
                if let Some(child) = current {
                    Rope::split_node_into(child, path, builder);
                }
            }
        }
    }

    /// Splits the rope before the item at `index`.
    pub fn split(self, index: &Index<E>) -> (Rope<E>, Rope<E>) {
        self.builder_at(index).split_finalize()
    }

    /// Splits the rope at `offset` in metric `M`, splitting the element at
    /// that position if it falls inside one.
    pub fn split_at<M: RopeMetric<E>>(self, offset: usize) -> (Rope<E>, Rope<E>) {
        let (index, remaining) = self.find::<M>(offset, false);
        let mut builder = self.builder_at(&index);
        if remaining > 0 {
            if let Some(mut item) = builder.take_suffix_tip() {
                let at = M::index_at(remaining, &item);
                let tail = item.split(at);
                builder.insert_after_tip(tail);
                builder.insert_before_tip(item);
            }
        }
        builder.split_finalize()
    }

    /// Concatenates two ropes, rebalancing the items where they meet.
    pub fn join(left: Rope<E>, right: Rope<E>) -> Rope<E> {
        let mut builder = Builder::new();
        builder.insert_rope_before_tip(left);
        builder.insert_rope_before_tip(right);
        builder.finalize()
    }

    /// Removes the part of the rope covered by `range` in metric `M`.
    pub fn remove_subrange<M: RopeMetric<E>>(&mut self, range: Range<usize>) {
        assert!(range.start <= range.end, "Invalid range");
        assert!(range.end <= self.count::<M>(), "Position out of bounds");
        if range.start == range.end {
            return;
        }
        let (left, rest) = mem::take(self).split_at::<M>(range.start);
        let (_, right) = rest.split_at::<M>(range.end - range.start);
        *self = Rope::join(left, right);
    }

    /// A new rope holding the part of this one covered by `range` in metric
    /// `M`.
    pub fn extract<M: RopeMetric<E>>(&self, range: Range<usize>) -> Rope<E> {
        assert!(range.start <= range.end, "Invalid range");
        assert!(range.end <= self.count::<M>(), "Position out of bounds");
        let (_, rest) = self.clone().split_at::<M>(range.start);
        let (middle, _) = rest.split_at::<M>(range.end - range.start);
        middle
    }
}

impl<E: RopeElement> FromIterator<E> for Rope<E> {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Rope<E> {
        let mut builder = Builder::new();
        for item in iter {
            builder.insert_before_tip(item);
        }
        builder.finalize()
    }
}

impl<E: RopeElement> Extend<E> for Rope<E> {
    fn extend<T: IntoIterator<Item = E>>(&mut self, iter: T) {
        let mut builder = Builder::new();
        builder.insert_rope_before_tip(mem::take(self));
        for item in iter {
            builder.insert_before_tip(item);
        }
        *self = builder.finalize();
    }
}
