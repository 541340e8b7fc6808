// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable node pool with an intrusive free list.
//!
//! Nodes are addressed by dense indices into a single `Vec`. Freed slots are
//! threaded through `next_free` so allocation and deallocation are O(1); when the
//! list runs dry the pool appends `growth` fresh slots. Growth only ever appends,
//! so indices handed out earlier stay valid.

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::types::{Aabb2D, Scalar};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    pub(crate) const fn new(i: usize) -> Self {
        Self(i)
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// Payload carried by leaf nodes.
pub(crate) struct Leaf<K, T> {
    pub(crate) key: K,
    /// Box last supplied by the caller. The node's own `aabb` may be fatter.
    pub(crate) tight: Aabb2D<T>,
}

pub(crate) struct Node<K, T> {
    pub(crate) aabb: Aabb2D<T>,
    pub(crate) leaf: Option<Leaf<K, T>>,
    pub(crate) parent: Option<NodeIdx>,
    pub(crate) left: Option<NodeIdx>,
    pub(crate) right: Option<NodeIdx>,
    pub(crate) next_free: Option<NodeIdx>,
}

impl<K, T: Scalar> Node<K, T> {
    fn vacant(next_free: Option<NodeIdx>) -> Self {
        Self {
            aabb: Aabb2D::zero(),
            leaf: None,
            parent: None,
            left: None,
            right: None,
            next_free,
        }
    }
}

impl<K, T> Node<K, T> {
    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

pub(crate) struct NodeArena<K, T> {
    nodes: Vec<Node<K, T>>,
    free_head: Option<NodeIdx>,
    allocated: usize,
    growth: usize,
}

impl<K, T: Scalar> NodeArena<K, T> {
    pub(crate) fn new(initial_capacity: usize, growth: usize) -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            free_head: None,
            allocated: 0,
            growth: growth.max(1),
        };
        arena.grow(initial_capacity);
        arena
    }

    /// Take a slot off the free list, growing the pool if needed.
    ///
    /// The returned node is detached: no parent, no children, no leaf payload.
    ///
    /// # Panics
    ///
    /// Panics if the pool would need more than `usize::MAX` slots.
    pub(crate) fn allocate(&mut self) -> NodeIdx {
        loop {
            if let Some(idx) = self.free_head {
                let node = &mut self.nodes[idx.get()];
                self.free_head = node.next_free.take();
                node.parent = None;
                node.left = None;
                node.right = None;
                node.leaf = None;
                self.allocated += 1;
                return idx;
            }
            self.grow(self.growth);
        }
    }

    /// Return a slot to the free list. Drops any leaf payload; the box is left as is.
    pub(crate) fn deallocate(&mut self, idx: NodeIdx) {
        debug_assert!(self.allocated > 0, "deallocate on an empty arena");
        let node = &mut self.nodes[idx.get()];
        node.leaf = None;
        node.parent = None;
        node.left = None;
        node.right = None;
        node.next_free = self.free_head;
        self.free_head = Some(idx);
        self.allocated -= 1;
    }

    /// Make sure at least `additional` more nodes can be allocated without growing.
    pub(crate) fn reserve(&mut self, additional: usize) {
        let free = self.free_len();
        if additional > free {
            self.grow(additional - free);
        }
    }

    /// Put every slot back on the free list, keeping the capacity.
    pub(crate) fn reset(&mut self) {
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let next = (i + 1 < len).then(|| NodeIdx::new(i + 1));
            *node = Node::vacant(next);
        }
        self.free_head = (len > 0).then(|| NodeIdx::new(0));
        self.allocated = 0;
    }

    fn grow(&mut self, additional: usize) {
        if additional == 0 {
            return;
        }
        let start = self.nodes.len();
        let end = start
            .checked_add(additional)
            .expect("node arena capacity overflow");
        self.nodes.reserve_exact(additional);
        // New slots are linked in ascending order and end at the previous head.
        for i in start..end {
            let next = if i + 1 < end {
                Some(NodeIdx::new(i + 1))
            } else {
                self.free_head
            };
            self.nodes.push(Node::vacant(next));
        }
        self.free_head = Some(NodeIdx::new(start));
        log::debug!("aabb tree arena grew from {start} to {end} nodes");
    }
}

impl<K, T> NodeArena<K, T> {
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn allocated(&self) -> usize {
        self.allocated
    }

    #[inline]
    pub(crate) fn free_len(&self) -> usize {
        self.nodes.len() - self.allocated
    }

    /// Walk the free list from its head.
    ///
    /// The walk stops after `capacity` steps so a corrupted (cyclic) list cannot
    /// spin forever; callers compare the yielded count against [`Self::free_len`].
    pub(crate) fn free_slots(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        let mut cursor = self.free_head;
        let mut budget = self.nodes.len();
        core::iter::from_fn(move || {
            if budget == 0 {
                return None;
            }
            let idx = cursor?;
            budget -= 1;
            cursor = self.nodes.get(idx.get()).and_then(|n| n.next_free);
            Some(idx)
        })
    }
}

impl<K, T> Index<NodeIdx> for NodeArena<K, T> {
    type Output = Node<K, T>;

    #[inline]
    fn index(&self, idx: NodeIdx) -> &Self::Output {
        &self.nodes[idx.get()]
    }
}

impl<K, T> IndexMut<NodeIdx> for NodeArena<K, T> {
    #[inline]
    fn index_mut(&mut self, idx: NodeIdx) -> &mut Self::Output {
        &mut self.nodes[idx.get()]
    }
}
