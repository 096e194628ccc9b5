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

//! Copy-on-write tree nodes and the balancing primitives shared by every
//! structural operation.

use std::cmp::{min, Ordering};
use std::sync::Arc;

use super::{RopeElement, RopeMetric, RopeSummary};

/// A leaf item together with its cached summary.
#[derive(Clone)]
pub(crate) struct Item<E: RopeElement> {
    pub(crate) value: E,
    pub(crate) summary: E::Summary,
}

impl<E: RopeElement> Item<E> {
    pub(crate) fn new(value: E) -> Item<E> {
        let summary = value.summary();
        Item { value, summary }
    }

    pub(crate) fn refresh(&mut self) {
        self.summary = self.value.summary();
    }
}

/// A b-tree node. Leaves (height 0) hold items, inner nodes hold nodes one
/// level shorter. Nodes are reference counted and cloned on first write, so
/// cloning a whole tree is cheap and a uniquely held tree mutates in place.
#[derive(Clone)]
pub(crate) struct Node<E: RopeElement> {
    arc: Arc<NodeBody<E>>,
}

#[derive(Clone)]
pub(crate) struct NodeBody<E: RopeElement> {
    pub(crate) height: u8,
    pub(crate) summary: E::Summary,
    pub(crate) val: NodeVal<E>,
}

#[derive(Clone)]
pub(crate) enum NodeVal<E: RopeElement> {
    Leaf(Vec<Item<E>>),
    Internal(Vec<Node<E>>),
}

fn max_children<E: RopeElement>() -> usize {
    E::Summary::MAX_NODE_SIZE
}

fn min_children<E: RopeElement>() -> usize {
    E::Summary::MIN_NODE_SIZE
}

impl<E: RopeElement> NodeVal<E> {
    pub(crate) fn len(&self) -> usize {
        match self {
            NodeVal::Leaf(items) => items.len(),
            NodeVal::Internal(children) => children.len(),
        }
    }

    fn split_off(&mut self, at: usize) -> NodeVal<E> {
        match self {
            NodeVal::Leaf(items) => NodeVal::Leaf(items.split_off(at)),
            NodeVal::Internal(children) => NodeVal::Internal(children.split_off(at)),
        }
    }

    fn append(&mut self, other: NodeVal<E>) {
        match (self, other) {
            (NodeVal::Leaf(items), NodeVal::Leaf(mut more)) => items.append(&mut more),
            (NodeVal::Internal(children), NodeVal::Internal(mut more)) => {
                children.append(&mut more)
            }
            _ => panic!("appending nodes of different heights"),
        }
    }
}

impl<E: RopeElement> NodeBody<E> {
    fn new(height: u8, val: NodeVal<E>) -> NodeBody<E> {
        let mut body = NodeBody { height, summary: E::Summary::zero(), val };
        body.refresh_summary();
        body
    }

    pub(crate) fn child_count(&self) -> usize {
        self.val.len()
    }

    pub(crate) fn refresh_summary(&mut self) {
        let mut summary = E::Summary::zero();
        match &self.val {
            NodeVal::Leaf(items) => {
                for item in items {
                    summary.add(&item.summary);
                }
            }
            NodeVal::Internal(children) => {
                for child in children {
                    summary.add(child.summary());
                }
            }
        }
        self.summary = summary;
    }

    /// Moves the children from `at` onwards into a new sibling body.
    pub(crate) fn split_off(&mut self, at: usize) -> NodeBody<E> {
        let rest = self.val.split_off(at);
        self.refresh_summary();
        NodeBody::new(self.height, rest)
    }

    pub(crate) fn items(&self) -> &[Item<E>] {
        match &self.val {
            NodeVal::Leaf(items) => items,
            NodeVal::Internal(_) => panic!("items called on internal node"),
        }
    }

    pub(crate) fn children(&self) -> &[Node<E>] {
        match &self.val {
            NodeVal::Internal(children) => children,
            NodeVal::Leaf(_) => panic!("children called on leaf node"),
        }
    }
}

impl<E: RopeElement> Node<E> {
    fn from_body(body: NodeBody<E>) -> Node<E> {
        Node { arc: Arc::new(body) }
    }

    /// A leaf node. `items` must be non-empty and no longer than the maximum
    /// node size.
    pub(crate) fn from_items(items: Vec<Item<E>>) -> Node<E> {
        debug_assert!(!items.is_empty());
        debug_assert!(items.len() <= max_children::<E>());
        Node::from_body(NodeBody::new(0, NodeVal::Leaf(items)))
    }

    /// Create a node from a vec of nodes.
    ///
    /// The input must satisfy the following balancing requirements:
    /// * The length of `nodes` must be <= MAX_NODE_SIZE and > 1.
    /// * All the nodes are the same height.
    /// * All the nodes must satisfy is_ok_child.
    pub(crate) fn from_nodes(nodes: Vec<Node<E>>) -> Node<E> {
        debug_assert!(nodes.len() > 1);
        debug_assert!(nodes.len() <= max_children::<E>());
        let height = nodes[0].height() + 1;
        debug_assert!(nodes.iter().all(|n| n.height() + 1 == height && n.is_ok_child()));
        Node::from_body(NodeBody::new(height, NodeVal::Internal(nodes)))
    }

    #[inline]
    pub(crate) fn body(&self) -> &NodeBody<E> {
        &self.arc
    }

    /// Mutable access, cloning the body first if it is shared.
    #[inline]
    pub(crate) fn body_mut(&mut self) -> &mut NodeBody<E> {
        Arc::make_mut(&mut self.arc)
    }

    pub(crate) fn ptr_eq(&self, other: &Node<E>) -> bool {
        Arc::ptr_eq(&self.arc, &other.arc)
    }

    /// Takes the children out, cloning them only if the body is shared.
    pub(crate) fn into_val(self) -> NodeVal<E> {
        match Arc::try_unwrap(self.arc) {
            Ok(body) => body.val,
            Err(arc) => arc.val.clone(),
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.body().height
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.height() == 0
    }

    #[inline]
    pub(crate) fn summary(&self) -> &E::Summary {
        &self.body().summary
    }

    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.body().child_count()
    }

    pub(crate) fn measure<M: RopeMetric<E>>(&self) -> usize {
        M::measure(self.summary())
    }

    pub(crate) fn is_ok_child(&self) -> bool {
        self.child_count() >= min_children::<E>()
    }

    pub(crate) fn items(&self) -> &[Item<E>] {
        self.body().items()
    }

    pub(crate) fn children(&self) -> &[Node<E>] {
        self.body().children()
    }

    /// Joins two lists of siblings into one node, or into a parent of two
    /// nodes if they don't fit.
    fn merge_nodes(children1: &[Node<E>], children2: &[Node<E>]) -> Node<E> {
        let n_children = children1.len() + children2.len();
        if n_children <= max_children::<E>() {
            Node::from_nodes([children1, children2].concat())
        } else {
            let (left, right) = Self::split_siblings(children1, children2);
            Node::from_nodes(vec![Node::from_nodes(left), Node::from_nodes(right)])
        }
    }

    fn merge_leaves(items1: &[Item<E>], items2: &[Item<E>]) -> Node<E> {
        let n_items = items1.len() + items2.len();
        if n_items <= max_children::<E>() {
            Node::from_items([items1, items2].concat())
        } else {
            let (left, right) = Self::split_siblings(items1, items2);
            Node::from_nodes(vec![Node::from_items(left), Node::from_items(right)])
        }
    }

    // Note: this leans left. Splitting at midpoint is also an option
    fn split_siblings<T: Clone>(first: &[T], second: &[T]) -> (Vec<T>, Vec<T>) {
        let total = first.len() + second.len();
        let splitpoint = min(max_children::<E>(), total - min_children::<E>());
        let mut iter = first.iter().chain(second.iter()).cloned();
        let left = iter.by_ref().take(splitpoint).collect();
        let right = iter.collect();
        (left, right)
    }

    /// Joins two sibling nodes of the same height into one or two nodes of
    /// that height, preserving order.
    pub(crate) fn merge_siblings(left: Node<E>, right: Node<E>) -> (Node<E>, Option<Node<E>>) {
        debug_assert_eq!(left.height(), right.height());
        let height = left.height();
        let mut val = left.into_val();
        val.append(right.into_val());
        let mut body = NodeBody::new(height, val);
        if body.child_count() <= max_children::<E>() {
            return (Node::from_body(body), None);
        }
        let total = body.child_count();
        let rest = body.split_off(min(max_children::<E>(), total - min_children::<E>()));
        (Node::from_body(body), Some(Node::from_body(rest)))
    }

    pub(crate) fn concat(rope1: Node<E>, rope2: Node<E>) -> Node<E> {
        let h1 = rope1.height();
        let h2 = rope2.height();

        match h1.cmp(&h2) {
            Ordering::Less => {
                let children2 = rope2.children();
                if h1 == h2 - 1 && rope1.is_ok_child() {
                    return Node::merge_nodes(&[rope1], children2);
                }
                let newrope = Node::concat(rope1, children2[0].clone());
                if newrope.height() == h2 - 1 {
                    Node::merge_nodes(&[newrope], &children2[1..])
                } else {
                    Node::merge_nodes(newrope.children(), &children2[1..])
                }
            }
            Ordering::Equal => {
                if rope1.is_ok_child() && rope2.is_ok_child() {
                    return Node::from_nodes(vec![rope1, rope2]);
                }
                if h1 == 0 {
                    return Node::merge_leaves(rope1.items(), rope2.items());
                }
                Node::merge_nodes(rope1.children(), rope2.children())
            }
            Ordering::Greater => {
                let children1 = rope1.children();
                if h2 == h1 - 1 && rope2.is_ok_child() {
                    return Node::merge_nodes(children1, &[rope2]);
                }
                let lastix = children1.len() - 1;
                let newrope = Node::concat(children1[lastix].clone(), rope2);
                if newrope.height() == h1 - 1 {
                    Node::merge_nodes(&children1[..lastix], &[newrope])
                } else {
                    Node::merge_nodes(&children1[..lastix], newrope.children())
                }
            }
        }
    }

    /// Splits an overflowing node in half, returning the new right sibling.
    fn split_if_overflowing(body: &mut NodeBody<E>) -> Option<Node<E>> {
        let count = body.child_count();
        if count <= max_children::<E>() {
            return None;
        }
        Some(Node::from_body(body.split_off(count / 2)))
    }

    /// Inserts `value` before the item at `path`, or after the last item of
    /// this subtree when `at_end` is set. Returns a new right sibling if this
    /// node had to split.
    pub(crate) fn insert_item(
        &mut self,
        path: &super::Path<E::Summary>,
        at_end: bool,
        value: E,
    ) -> Option<Node<E>> {
        let body = self.body_mut();
        let height = body.height;
        match &mut body.val {
            NodeVal::Leaf(items) => {
                let slot = if at_end { items.len() } else { path.slot(0) };
                insert_leaf_item(items, slot, value);
            }
            NodeVal::Internal(children) => {
                let mut slot = path.slot(height);
                let mut at_end = at_end;
                if at_end || slot >= children.len() {
                    slot = children.len() - 1;
                    at_end = true;
                }
                if let Some(sibling) = children[slot].insert_item(path, at_end, value) {
                    children.insert(slot + 1, sibling);
                }
            }
        }
        body.refresh_summary();
        Node::split_if_overflowing(body)
    }

    /// Removes the item at `path`, merging or redistributing any child that
    /// drops below the minimum size.
    pub(crate) fn remove_item(&mut self, path: &super::Path<E::Summary>) -> E {
        let body = self.body_mut();
        let height = body.height;
        let removed = match &mut body.val {
            NodeVal::Leaf(items) => items.remove(path.slot(0)).value,
            NodeVal::Internal(children) => {
                let slot = path.slot(height);
                let removed = children[slot].remove_item(path);
                if !children[slot].is_ok_child() {
                    fix_underflow(children, slot);
                }
                removed
            }
        };
        body.refresh_summary();
        removed
    }

    /// Runs `f` on the item at `path`, refreshing cached summaries on the way
    /// back up.
    pub(crate) fn update_item<R>(
        &mut self,
        path: &super::Path<E::Summary>,
        f: impl FnOnce(&mut E) -> R,
    ) -> R {
        let body = self.body_mut();
        let height = body.height;
        let result = match &mut body.val {
            NodeVal::Leaf(items) => {
                let item = &mut items[path.slot(0)];
                let result = f(&mut item.value);
                assert!(!item.value.is_empty(), "Rope elements must not become empty");
                item.refresh();
                result
            }
            NodeVal::Internal(children) => children[path.slot(height)].update_item(path, f),
        };
        body.refresh_summary();
        result
    }

    pub(crate) fn invariant_check(&self, is_root: bool) {
        let body = self.body();
        let count = body.child_count();
        assert!(count <= max_children::<E>(), "node has {} children", count);
        if !is_root {
            assert!(count >= min_children::<E>(), "node has {} children", count);
        } else if body.height > 0 {
            assert!(count >= 2, "inner root has a single child");
        } else {
            assert!(count >= 1, "empty root leaf");
        }
        let mut summary = E::Summary::zero();
        match &body.val {
            NodeVal::Leaf(items) => {
                for item in items {
                    assert!(!item.value.is_empty(), "empty rope element");
                    assert!(item.summary == item.value.summary(), "stale item summary");
                    item.value.invariant_check();
                    summary.add(&item.summary);
                }
            }
            NodeVal::Internal(children) => {
                for child in children {
                    assert_eq!(child.height() + 1, body.height, "unbalanced tree");
                    child.invariant_check(false);
                    summary.add(child.summary());
                }
            }
        }
        assert!(summary == body.summary, "stale node summary");
    }
}

/// Inserts a new item into a leaf, letting an undersized item rebalance with
/// a neighbor.
fn insert_leaf_item<E: RopeElement>(items: &mut Vec<Item<E>>, slot: usize, value: E) {
    items.insert(slot, Item::new(value));
    if !items[slot].value.is_undersized() {
        return;
    }
    if slot + 1 < items.len() {
        let (head, tail) = items.split_at_mut(slot + 1);
        let (item, next) = (&mut head[slot], &mut tail[0]);
        let emptied = item.value.rebalance_next_neighbor(&mut next.value);
        item.refresh();
        next.refresh();
        if emptied {
            items.remove(slot + 1);
        }
    } else if slot > 0 {
        let (head, tail) = items.split_at_mut(slot);
        let (prev, item) = (&mut head[slot - 1], &mut tail[0]);
        let emptied = item.value.rebalance_prev_neighbor(&mut prev.value);
        item.refresh();
        prev.refresh();
        if emptied {
            items.remove(slot - 1);
        }
    }
}

/// Restores the minimum size of `children[slot]` by merging it with a
/// neighbor, then splitting the result in half if it is too large.
fn fix_underflow<E: RopeElement>(children: &mut Vec<Node<E>>, slot: usize) {
    if children.len() < 2 {
        return;
    }
    let left = if slot + 1 < children.len() { slot } else { slot - 1 };
    let right = children.remove(left + 1);
    let body = children[left].body_mut();
    body.val.append(right.into_val());
    let rest = if body.child_count() > max_children::<E>() {
        let count = body.child_count();
        Some(body.split_off(count / 2))
    } else {
        body.refresh_summary();
        None
    };
    if let Some(rest) = rest {
        children.insert(left + 1, Node::from_body(rest));
    }
}
