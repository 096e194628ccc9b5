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

//! Versioned positions in a rope.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::node::NodeBody;
use super::{RopeElement, RopeSummary};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Identifies one particular state of a rope. Every mutation draws a version
/// that has never been handed out before.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Version(u64);

impl Version {
    pub(crate) fn fresh() -> Version {
        Version(NEXT_VERSION.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Child slots from the root down to a leaf item, packed into a `u64`.
///
/// The slot at height `h` occupies bits `h * W .. (h + 1) * W`, where `W` is
/// the summary's `NODE_SIZE_BIT_WIDTH`. Higher levels are more significant,
/// so comparing the packed integers compares positions in the tree.
pub(crate) struct Path<S> {
    bits: u64,
    _summary: PhantomData<fn() -> S>,
}

impl<S: RopeSummary> Path<S> {
    pub(crate) fn new() -> Path<S> {
        Path { bits: 0, _summary: PhantomData }
    }

    /// Deepest tree height whose slot still fits in the path.
    pub(crate) fn max_height() -> u8 {
        (64 / S::NODE_SIZE_BIT_WIDTH - 1) as u8
    }

    #[inline]
    fn mask() -> u64 {
        (1u64 << S::NODE_SIZE_BIT_WIDTH) - 1
    }

    #[inline]
    fn shift(height: u8) -> u32 {
        u32::from(height) * S::NODE_SIZE_BIT_WIDTH
    }

    #[inline]
    pub(crate) fn slot(&self, height: u8) -> usize {
        ((self.bits >> Path::<S>::shift(height)) & Path::<S>::mask()) as usize
    }

    #[inline]
    pub(crate) fn set_slot(&mut self, height: u8, slot: usize) {
        debug_assert!((slot as u64) <= Path::<S>::mask());
        let shift = Path::<S>::shift(height);
        self.bits = (self.bits & !(Path::<S>::mask() << shift)) | ((slot as u64) << shift);
    }

    /// Zeroes the slots of every level below `height`.
    #[inline]
    pub(crate) fn clear_below(&mut self, height: u8) {
        let shift = Path::<S>::shift(height);
        if shift < 64 {
            self.bits &= !((1u64 << shift) - 1);
        }
    }
}

impl<S> Clone for Path<S> {
    fn clone(&self) -> Path<S> {
        *self
    }
}

impl<S> Copy for Path<S> {}

impl<S> PartialEq for Path<S> {
    fn eq(&self, other: &Path<S>) -> bool {
        self.bits == other.bits
    }
}

impl<S> Eq for Path<S> {}

impl<S> PartialOrd for Path<S> {
    fn partial_cmp(&self, other: &Path<S>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for Path<S> {
    fn cmp(&self, other: &Path<S>) -> Ordering {
        self.bits.cmp(&other.bits)
    }
}

impl<S> Hash for Path<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state)
    }
}

impl<S> fmt::Debug for Path<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Path({:#x})", self.bits)
    }
}

/// A position in a [`Rope`](super::Rope): the address of an item, or the end
/// of the rope.
///
/// An index is only valid for the rope state it was created for. Any
/// mutation of the rope invalidates all outstanding indices except the one
/// passed to the mutating call, and using a stale index panics.
///
/// Indices may also carry a cached pointer to the leaf they address, which
/// makes stepping to a neighboring item within the same leaf O(1).
pub struct Index<E: RopeElement> {
    pub(crate) version: Version,
    pub(crate) path: Path<E::Summary>,
    pub(crate) leaf: Option<NonNull<NodeBody<E>>>,
}

impl<E: RopeElement> Index<E> {
    pub(crate) fn new(version: Version, path: Path<E::Summary>) -> Index<E> {
        Index { version, path, leaf: None }
    }

    /// Slot of the addressed item within its leaf.
    pub(crate) fn item_slot(&self) -> usize {
        self.path.slot(0)
    }
}

// The leaf pointer is only dereferenced through a shared borrow of a rope
// whose version matches, so an index is as thread safe as the rope itself.
unsafe impl<E: RopeElement + Send + Sync> Send for Index<E> {}
unsafe impl<E: RopeElement + Send + Sync> Sync for Index<E> {}

impl<E: RopeElement> Clone for Index<E> {
    fn clone(&self) -> Index<E> {
        *self
    }
}

impl<E: RopeElement> Copy for Index<E> {}

impl<E: RopeElement> PartialEq for Index<E> {
    fn eq(&self, other: &Index<E>) -> bool {
        self.path == other.path
    }
}

impl<E: RopeElement> Eq for Index<E> {}

impl<E: RopeElement> PartialOrd for Index<E> {
    fn partial_cmp(&self, other: &Index<E>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E: RopeElement> Ord for Index<E> {
    fn cmp(&self, other: &Index<E>) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl<E: RopeElement> Hash for Index<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state)
    }
}

impl<E: RopeElement> fmt::Debug for Index<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Index")
            .field("version", &self.version.0)
            .field("path", &self.path)
            .field("greased", &self.leaf.is_some())
            .finish()
    }
}
