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

//! Navigation: stepping between items, metric offsets and distances.

use smallvec::SmallVec;

use super::{Index, Node, NodeBody, Path, Rope, RopeElement, RopeMetric, RopeSummary};

type NodeStack<'a, E> = SmallVec<[&'a Node<E>; 16]>;

/// Picks the child containing `*remaining`, subtracting the sizes of the
/// children before it. A position exactly at a boundary goes to the earlier
/// child when `prefer_end` is set, to the later one otherwise.
fn pick_forward(
    sizes: impl Iterator<Item = usize>,
    remaining: &mut usize,
    prefer_end: bool,
) -> Option<usize> {
    for (slot, size) in sizes.enumerate() {
        if *remaining < size || (prefer_end && *remaining == size) {
            return Some(slot);
        }
        *remaining -= size;
    }
    None
}

impl<E: RopeElement> Rope<E> {
    /// Nodes on the path to the leaf addressed by a non-end index.
    fn stack_for(&self, path: &Path<E::Summary>) -> NodeStack<'_, E> {
        let mut stack = NodeStack::new();
        let mut node = match self.root() {
            Some(root) => root,
            None => return stack,
        };
        loop {
            stack.push(node);
            if node.is_leaf() {
                return stack;
            }
            node = &node.children()[path.slot(node.height())];
        }
    }

    /// Descends from `node` to the leaf containing `*remaining`, recording
    /// slots in `path`. Leaves `*remaining` as the offset into the item.
    fn descend<'a, M: RopeMetric<E>>(
        mut node: &'a Node<E>,
        path: &mut Path<E::Summary>,
        remaining: &mut usize,
        prefer_end: bool,
    ) -> &'a NodeBody<E> {
        loop {
            let height = node.height();
            if node.is_leaf() {
                let items = node.items();
                let sizes = items.iter().map(|item| M::measure(&item.summary));
                let slot = pick_forward(sizes, remaining, prefer_end).unwrap_or_else(|| {
                    debug_assert_eq!(*remaining, 0);
                    items.len() - 1
                });
                path.set_slot(0, slot);
                return node.body();
            }
            let children = node.children();
            let sizes = children.iter().map(|child| child.measure::<M>());
            let slot = pick_forward(sizes, remaining, prefer_end).unwrap_or(children.len() - 1);
            path.set_slot(height, slot);
            node = &children[slot];
        }
    }

    /// Descends to the first or last item under `node`.
    fn descend_to_edge<'a>(
        mut node: &'a Node<E>,
        path: &mut Path<E::Summary>,
        last: bool,
    ) -> &'a NodeBody<E> {
        loop {
            let slot = if last { node.child_count() - 1 } else { 0 };
            path.set_slot(node.height(), slot);
            if node.is_leaf() {
                return node.body();
            }
            node = &node.children()[slot];
        }
    }

    /// Finds the item containing `offset` in metric `M`, and the remaining
    /// offset into it.
    ///
    /// With `prefer_end`, a position on the boundary between two items
    /// resolves to the end of the first; otherwise to the start of the
    /// second. The end of the rope resolves to the end index (with
    /// remainder zero) unless `prefer_end` is set and the rope is not empty.
    pub fn find<M: RopeMetric<E>>(&self, offset: usize, prefer_end: bool) -> (Index<E>, usize) {
        let (index, remaining, _) = self.find_with_prefix::<M>(offset, prefer_end);
        (index, remaining)
    }

    /// Like `find`, also returning the summary of everything before the
    /// found item.
    pub fn find_with_prefix<M: RopeMetric<E>>(
        &self,
        offset: usize,
        prefer_end: bool,
    ) -> (Index<E>, usize, E::Summary) {
        let total = self.count::<M>();
        assert!(offset <= total, "Position out of bounds");
        let root = match self.root() {
            Some(root) if offset < total || prefer_end => root,
            _ => return (self.end_index(), 0, self.summary()),
        };
        let mut path = Path::new();
        let mut prefix = E::Summary::zero();
        let mut remaining = offset;
        let mut node = root;
        let leaf = loop {
            let height = node.height();
            if node.is_leaf() {
                let items = node.items();
                let mut slot = items.len() - 1;
                for (i, item) in items.iter().enumerate() {
                    let size = M::measure(&item.summary);
                    if remaining < size || (prefer_end && remaining == size) {
                        slot = i;
                        break;
                    }
                    remaining -= size;
                    prefix.add(&item.summary);
                }
                path.set_slot(0, slot);
                break node.body();
            }
            let children = node.children();
            let mut slot = children.len() - 1;
            for (i, child) in children.iter().enumerate() {
                let size = child.measure::<M>();
                if remaining < size || (prefer_end && remaining == size) {
                    slot = i;
                    break;
                }
                remaining -= size;
                prefix.add(child.summary());
            }
            path.set_slot(height, slot);
            node = &children[slot];
        };
        let mut index = Index::new(self.version, path);
        index.leaf = Some(leaf.into());
        (index, remaining, prefix)
    }

    /// Moves `index` by `distance` units of metric `M`, measured from the
    /// start of the item it addresses. Returns the remaining offset into the
    /// item the position falls in. Boundaries resolve as in `find`, so the
    /// result matches `find` on the absolute position.
    pub fn form_index<M: RopeMetric<E>>(
        &self,
        index: &mut Index<E>,
        distance: isize,
        prefer_end: bool,
    ) -> usize {
        self.validate(index);
        if distance == 0 && !prefer_end {
            return 0;
        }
        let root = match self.root() {
            Some(root) => root,
            None => {
                assert_eq!(distance, 0, "Position out of bounds");
                return 0;
            }
        };
        let mut path = index.path;
        // A zero distance that prefers the end backs into the previous item.
        if distance > 0 {
            let mut remaining = distance as usize;
            match Rope::seek_forward::<M>(root, &mut path, &mut remaining, prefer_end) {
                Some(leaf) => {
                    *index = Index::new(self.version, path);
                    index.leaf = Some(leaf.into());
                    remaining
                }
                None => {
                    assert_eq!(remaining, 0, "Position out of bounds");
                    *index = self.end_index();
                    0
                }
            }
        } else {
            let mut remaining = distance.unsigned_abs();
            match Rope::seek_backward::<M>(root, &mut path, &mut remaining, prefer_end) {
                Some(leaf) => {
                    *index = Index::new(self.version, path);
                    index.leaf = Some(leaf.into());
                    remaining
                }
                None => {
                    assert_eq!(remaining, 0, "Position out of bounds");
                    *index = self.start_index();
                    0
                }
            }
        }
    }

    fn seek_forward<'a, M: RopeMetric<E>>(
        node: &'a Node<E>,
        path: &mut Path<E::Summary>,
        remaining: &mut usize,
        prefer_end: bool,
    ) -> Option<&'a NodeBody<E>> {
        let height = node.height();
        let slot = path.slot(height);
        if node.is_leaf() {
            let items = node.items();
            let sizes = items.iter().skip(slot).map(|item| M::measure(&item.summary));
            let found = pick_forward(sizes, remaining, prefer_end)?;
            path.set_slot(0, slot + found);
            return Some(node.body());
        }
        let children = node.children();
        if slot < children.len() {
            if let Some(leaf) = Rope::seek_forward::<M>(&children[slot], path, remaining, prefer_end)
            {
                return Some(leaf);
            }
        }
        for next in slot + 1..children.len() {
            let size = children[next].measure::<M>();
            if *remaining < size || (prefer_end && *remaining == size) {
                path.set_slot(height, next);
                path.clear_below(height);
                return Some(Rope::descend::<M>(&children[next], path, remaining, prefer_end));
            }
            *remaining -= size;
        }
        None
    }

    fn seek_backward<'a, M: RopeMetric<E>>(
        node: &'a Node<E>,
        path: &mut Path<E::Summary>,
        remaining: &mut usize,
        prefer_end: bool,
    ) -> Option<&'a NodeBody<E>> {
        let height = node.height();
        let slot = path.slot(height);
        if node.is_leaf() {
            let items = node.items();
            for prev in (0..slot.min(items.len())).rev() {
                let size = M::measure(&items[prev].summary);
                if *remaining < size || (!prefer_end && *remaining == size) {
                    path.set_slot(0, prev);
                    *remaining = size - *remaining;
                    return Some(node.body());
                }
                *remaining -= size;
            }
            return None;
        }
        let children = node.children();
        if slot < children.len() {
            if let Some(leaf) =
                Rope::seek_backward::<M>(&children[slot], path, remaining, prefer_end)
            {
                return Some(leaf);
            }
        }
        for prev in (0..slot.min(children.len())).rev() {
            let size = children[prev].measure::<M>();
            if *remaining < size || (!prefer_end && *remaining == size) {
                path.set_slot(height, prev);
                path.clear_below(height);
                let mut offset = size - *remaining;
                let leaf = Rope::descend::<M>(&children[prev], path, &mut offset, prefer_end);
                *remaining = offset;
                return Some(leaf);
            }
            *remaining -= size;
        }
        None
    }

    /// Steps a non-end index to the next item, or to the end index.
    pub fn form_index_after(&self, index: &mut Index<E>) {
        assert!(!self.is_end(index), "Can't advance past the end index");
        if let Some(leaf) = self.leaf(index) {
            let slot = index.item_slot();
            if slot + 1 < leaf.child_count() {
                index.path.set_slot(0, slot + 1);
                index.leaf = Some(leaf.into());
                return;
            }
        }
        let stack = self.stack_for(&index.path);
        for (depth, node) in stack.iter().enumerate().rev() {
            let height = node.height();
            let slot = index.path.slot(height);
            if slot + 1 < node.child_count() {
                index.path.set_slot(height, slot + 1);
                let leaf = if node.is_leaf() {
                    node.body()
                } else {
                    debug_assert!(depth + 1 < stack.len());
                    Rope::descend_to_edge(&node.children()[slot + 1], &mut index.path, false)
                };
                index.leaf = Some(leaf.into());
                return;
            }
        }
        *index = self.end_index();
    }

    /// Steps an index other than the start index to the previous item.
    pub fn form_index_before(&self, index: &mut Index<E>) {
        self.validate(index);
        let root = match self.root() {
            Some(root) => root,
            None => panic!("Can't move before the start index"),
        };
        if self.is_end(index) {
            let mut path = Path::new();
            let leaf = Rope::descend_to_edge(root, &mut path, true);
            *index = Index::new(self.version, path);
            index.leaf = Some(leaf.into());
            return;
        }
        let slot = index.item_slot();
        if slot > 0 {
            if let Some(leaf) = self.leaf(index) {
                index.path.set_slot(0, slot - 1);
                index.leaf = Some(leaf.into());
                return;
            }
        }
        let stack = self.stack_for(&index.path);
        for node in stack.iter().rev() {
            let height = node.height();
            let slot = index.path.slot(height);
            if slot > 0 {
                index.path.set_slot(height, slot - 1);
                let leaf = if node.is_leaf() {
                    node.body()
                } else {
                    Rope::descend_to_edge(&node.children()[slot - 1], &mut index.path, true)
                };
                index.leaf = Some(leaf.into());
                return;
            }
        }
        panic!("Can't move before the start index");
    }

    pub fn index_after(&self, index: &Index<E>) -> Index<E> {
        let mut result = *index;
        self.form_index_after(&mut result);
        result
    }

    pub fn index_before(&self, index: &Index<E>) -> Index<E> {
        let mut result = *index;
        self.form_index_before(&mut result);
        result
    }

    /// Size in metric `M` of everything under `node` that lies before `path`.
    fn prefix_measure<M: RopeMetric<E>>(node: &Node<E>, path: &Path<E::Summary>) -> usize {
        let mut total = 0;
        let mut node = node;
        loop {
            let slot = path.slot(node.height());
            if node.is_leaf() {
                let items = node.items();
                let end = slot.min(items.len());
                return total + items[..end].iter().map(|i| M::measure(&i.summary)).sum::<usize>();
            }
            let children = node.children();
            let end = slot.min(children.len());
            total += children[..end].iter().map(|c| c.measure::<M>()).sum::<usize>();
            match children.get(slot) {
                Some(child) => node = child,
                None => return total,
            }
        }
    }

    /// The offset in metric `M` of the start of the item at `index`.
    pub fn offset<M: RopeMetric<E>>(&self, index: &Index<E>) -> usize {
        self.validate(index);
        match self.root() {
            Some(root) => Rope::prefix_measure::<M>(root, &index.path),
            None => 0,
        }
    }

    /// The signed distance in metric `M` between the starts of the items at
    /// two indices.
    pub fn distance<M: RopeMetric<E>>(&self, from: &Index<E>, to: &Index<E>) -> isize {
        self.validate(from);
        self.validate(to);
        if from.path == to.path {
            return 0;
        }
        if from.path < to.path {
            self.distance_forward::<M>(from, to) as isize
        } else {
            -(self.distance_forward::<M>(to, from) as isize)
        }
    }

    fn distance_forward<M: RopeMetric<E>>(&self, from: &Index<E>, to: &Index<E>) -> usize {
        if let (Some(a), Some(b)) = (from.leaf, to.leaf) {
            if a == b {
                // SAFETY: both indices were validated against this rope.
                let leaf = unsafe { a.as_ref() };
                let items = &leaf.items()[from.item_slot()..to.item_slot()];
                return items.iter().map(|item| M::measure(&item.summary)).sum();
            }
        }
        let mut node = match self.root() {
            Some(root) => root,
            None => return 0,
        };
        // Walk down while both paths go through the same child.
        loop {
            let height = node.height();
            let (a, b) = (from.path.slot(height), to.path.slot(height));
            if a != b || node.is_leaf() {
                break;
            }
            node = &node.children()[a];
        }
        let height = node.height();
        let (a, b) = (from.path.slot(height), to.path.slot(height));
        if node.is_leaf() {
            return node.items()[a..b].iter().map(|item| M::measure(&item.summary)).sum();
        }
        let children = node.children();
        let first = &children[a];
        let mut total = first.measure::<M>() - Rope::prefix_measure::<M>(first, &from.path);
        total += children[a + 1..b.min(children.len())].iter().map(|c| c.measure::<M>()).sum::<usize>();
        if let Some(last) = children.get(b) {
            total += Rope::prefix_measure::<M>(last, &to.path);
        }
        total
    }
}
