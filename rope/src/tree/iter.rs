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

use super::{Index, Node, Rope, RopeElement};

/// Double-ended iterator over the elements of a rope.
pub struct Iter<'a, E: RopeElement> {
    rope: &'a Rope<E>,
    front: Index<E>,
    back: Index<E>,
}

impl<'a, E: RopeElement> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        if self.front == self.back {
            return None;
        }
        let rope = self.rope;
        let item = rope.get(&self.front);
        rope.form_index_after(&mut self.front);
        Some(item)
    }
}

impl<'a, E: RopeElement> DoubleEndedIterator for Iter<'a, E> {
    fn next_back(&mut self) -> Option<&'a E> {
        if self.front == self.back {
            return None;
        }
        let rope = self.rope;
        rope.form_index_before(&mut self.back);
        Some(rope.get(&self.back))
    }
}

impl<E: RopeElement> Rope<E> {
    pub fn iter(&self) -> Iter<'_, E> {
        self.iter_from(&self.start_index())
    }

    /// Iterates from the item at `index` to the end.
    pub fn iter_from(&self, index: &Index<E>) -> Iter<'_, E> {
        self.validate(index);
        Iter { rope: self, front: *index, back: self.end_index() }
    }

    /// Calls `f` on each element in order until it returns `false`. Returns
    /// `false` if the traversal was cut short.
    pub fn for_each_while(&self, mut f: impl FnMut(&E) -> bool) -> bool {
        fn visit<E: RopeElement>(node: &Node<E>, f: &mut impl FnMut(&E) -> bool) -> bool {
            if node.is_leaf() {
                node.items().iter().all(|item| f(&item.value))
            } else {
                node.children().iter().all(|child| visit(child, f))
            }
        }
        match self.root() {
            Some(root) => visit(root, &mut f),
            None => true,
        }
    }

    /// Calls `f` on each element starting at `from`, mutating it in place,
    /// until `f` returns a value. On return `from` addresses the element that
    /// produced the value (or the end index), and is valid for the mutated
    /// rope.
    pub fn mutating_for_each<R>(
        &mut self,
        from: &mut Index<E>,
        mut f: impl FnMut(&mut E) -> Option<R>,
    ) -> Option<R> {
        while !self.is_end(from) {
            if let Some(result) = self.update(from, &mut f) {
                return Some(result);
            }
            self.form_index_after(from);
        }
        None
    }
}
