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

//! A general b-tree structure over variable sized elements, suitable for
//! ropes and the like.
//!
//! The tree stores a sequence of [`RopeElement`]s in its leaves and keeps a
//! [`RopeSummary`] for every subtree, so positions in any [`RopeMetric`] can
//! be located in logarithmic time. Nodes are shared between clones and
//! copied on first write.

mod builder;
mod edit;
mod index;
mod iter;
mod node;
mod seek;

use std::fmt;

use log::debug;

pub use self::builder::Builder;
pub use self::index::Index;
pub use self::iter::Iter;

pub(crate) use self::index::{Path, Version};
pub(crate) use self::node::{Node, NodeBody};

/// A commutative monoid describing some subtree of a rope.
///
/// `add` must be associative, and `subtract` must undo `add`. The node size
/// constants tune the fan-out of the tree built over this summary.
pub trait RopeSummary: Clone + PartialEq + fmt::Debug {
    /// Maximum number of children (or items) in a node.
    const MAX_NODE_SIZE: usize;
    /// Bits needed to store a child slot. `1 << NODE_SIZE_BIT_WIDTH` must be
    /// greater than `MAX_NODE_SIZE`, because the end of a node is a slot too.
    const NODE_SIZE_BIT_WIDTH: u32;
    /// Minimum number of children in a non-root node.
    const MIN_NODE_SIZE: usize = Self::MAX_NODE_SIZE / 2;

    fn zero() -> Self;
    fn is_zero(&self) -> bool;
    fn add(&mut self, other: &Self);
    fn subtract(&mut self, other: &Self);
}

/// An item stored in the leaves of a rope.
pub trait RopeElement: Clone {
    type Summary: RopeSummary;
    /// A position inside a single element.
    type Index: Copy + Ord + fmt::Debug;

    fn summary(&self) -> Self::Summary;

    /// Empty elements are never stored in a rope.
    fn is_empty(&self) -> bool;

    /// Whether this element is small enough that it should be merged with a
    /// neighbor when one is at hand.
    fn is_undersized(&self) -> bool;

    fn invariant_check(&self) {}

    /// Moves contents between `self` and its right neighbor so that neither
    /// is undersized if possible. Returns `true` if `right` ended up empty,
    /// with all of its contents appended to `self`.
    fn rebalance_next_neighbor(&mut self, right: &mut Self) -> bool;

    /// Mirror image of `rebalance_next_neighbor`. Returns `true` if `left`
    /// ended up empty.
    fn rebalance_prev_neighbor(&mut self, left: &mut Self) -> bool;

    /// Splits the element at `at`, keeping the head in `self` and returning
    /// the tail.
    fn split(&mut self, at: Self::Index) -> Self;
}

/// A measure on the summary of a rope, such as a count of bytes or lines.
pub trait RopeMetric<E: RopeElement> {
    /// The size of a subtree in this metric.
    fn measure(summary: &E::Summary) -> usize;

    /// The position inside `element` that lies `offset` units from its start.
    /// `offset` is less than the element's measure.
    fn index_at(offset: usize, element: &E) -> E::Index;
}

/// A persistent sequence of elements, stored in a balanced b-tree.
///
/// Cloning a rope is O(1); the clones share nodes until one of them is
/// mutated.
pub struct Rope<E: RopeElement> {
    root: Option<Node<E>>,
    version: Version,
}

impl<E: RopeElement> Clone for Rope<E> {
    fn clone(&self) -> Rope<E> {
        Rope { root: self.root.clone(), version: self.version }
    }
}

impl<E: RopeElement> Default for Rope<E> {
    fn default() -> Rope<E> {
        Rope::new()
    }
}

impl<E: RopeElement> Rope<E> {
    pub fn new() -> Rope<E> {
        debug_assert!(
            (1usize << E::Summary::NODE_SIZE_BIT_WIDTH) > E::Summary::MAX_NODE_SIZE,
            "node slots don't fit in their bit width"
        );
        Rope { root: None, version: Version::fresh() }
    }

    pub(crate) fn from_root(root: Option<Node<E>>) -> Rope<E> {
        let rope = Rope { root, version: Version::fresh() };
        if let Some(root) = &rope.root {
            debug!("built rope of height {}", root.height());
        }
        rope
    }

    pub(crate) fn root(&self) -> Option<&Node<E>> {
        self.root.as_ref()
    }

    pub(crate) fn take_root(&mut self) -> Option<Node<E>> {
        self.bump_version();
        self.root.take()
    }

    pub(crate) fn bump_version(&mut self) {
        self.version = Version::fresh();
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; a single leaf has height zero.
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |root| usize::from(root.height()))
    }

    /// The summary of the whole rope.
    pub fn summary(&self) -> E::Summary {
        self.root.as_ref().map_or_else(E::Summary::zero, |root| root.summary().clone())
    }

    /// The size of the whole rope in metric `M`.
    pub fn count<M: RopeMetric<E>>(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.measure::<M>())
    }

    /// Number of elements, by traversal.
    pub fn item_count(&self) -> usize {
        fn count_items<E: RopeElement>(node: &Node<E>) -> usize {
            if node.is_leaf() {
                node.child_count()
            } else {
                node.children().iter().map(count_items).sum()
            }
        }
        self.root.as_ref().map_or(0, count_items)
    }

    /// Returns `true` if both ropes share the same root node.
    pub fn ptr_eq(&self, other: &Rope<E>) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns `true` if `index` was created for the current state of this
    /// rope.
    pub fn is_valid(&self, index: &Index<E>) -> bool {
        index.version == self.version
    }

    /// Panics unless `index` is valid for this rope.
    pub fn validate(&self, index: &Index<E>) {
        assert!(self.is_valid(index), "Invalid rope index");
    }

    /// The index of the first element. Not greased; see [`Rope::grease`].
    pub fn start_index(&self) -> Index<E> {
        Index::new(self.version, Path::new())
    }

    pub fn end_index(&self) -> Index<E> {
        let mut path = Path::new();
        if let Some(root) = &self.root {
            path.set_slot(root.height(), root.child_count());
        }
        Index::new(self.version, path)
    }

    pub fn is_end(&self, index: &Index<E>) -> bool {
        self.validate(index);
        match &self.root {
            None => true,
            Some(root) => index.path.slot(root.height()) >= root.child_count(),
        }
    }

    /// Refreshes the cached leaf pointer of a valid index.
    pub fn grease(&self, index: &mut Index<E>) {
        self.validate(index);
        index.leaf = self.leaf_for(&index.path).map(|leaf| leaf.into());
    }

    /// The leaf addressed by `path`, or `None` for the end position.
    fn leaf_for(&self, path: &Path<E::Summary>) -> Option<&NodeBody<E>> {
        let mut node = self.root.as_ref()?;
        loop {
            if node.is_leaf() {
                return if path.slot(0) < node.child_count() { Some(node.body()) } else { None };
            }
            let children = node.children();
            node = children.get(path.slot(node.height()))?;
        }
    }

    /// The leaf addressed by a valid index, using its cached pointer when
    /// present.
    pub(crate) fn leaf(&self, index: &Index<E>) -> Option<&NodeBody<E>> {
        self.validate(index);
        match index.leaf {
            // SAFETY: the version check above guarantees the tree has not been
            // mutated since the pointer was taken, and `self` keeps every node
            // of that tree alive for the duration of the borrow.
            Some(ptr) => Some(unsafe { ptr.as_ref() }),
            None => self.leaf_for(&index.path),
        }
    }

    /// The element at a valid, non-end index.
    pub fn get(&self, index: &Index<E>) -> &E {
        match self.leaf(index) {
            Some(leaf) => &leaf.items()[index.item_slot()].value,
            None => panic!("Can't access the end index"),
        }
    }

    /// Number of elements this rope can hold at the very least, given the
    /// depth limit imposed by index paths.
    pub fn minimum_capacity() -> usize {
        let levels = usize::from(Path::<E::Summary>::max_height()) + 1;
        let mut capacity: usize = 2;
        for _ in 1..levels {
            capacity = capacity.saturating_mul(E::Summary::MIN_NODE_SIZE);
        }
        capacity
    }

    /// Number of elements this rope can hold at most.
    pub fn maximum_capacity() -> usize {
        let levels = usize::from(Path::<E::Summary>::max_height()) + 1;
        let mut capacity: usize = 1;
        for _ in 0..levels {
            capacity = capacity.saturating_mul(E::Summary::MAX_NODE_SIZE);
        }
        capacity
    }

    /// Panics if the tree is unbalanced, a node is over- or underfull, a
    /// cached summary is stale, or an element is empty or fails its own
    /// check.
    pub fn invariant_check(&self) {
        if let Some(root) = &self.root {
            assert!(root.height() <= Path::<E::Summary>::max_height(), "rope is too deep");
            root.invariant_check(true);
        }
    }
}

impl<E: RopeElement + fmt::Debug> fmt::Debug for Rope<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests;
