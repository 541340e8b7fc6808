// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree core: leaf insertion, removal, refit, and overlap traversal.
//!
//! The tree owns a [`NodeArena`] and a root index. It knows nothing about object
//! identity beyond the key stored in each leaf; the object map lives in
//! [`AabbTree`](crate::AabbTree).

use alloc::vec;
use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::arena::{NodeArena, NodeIdx};
use crate::error::InvariantViolation;
use crate::types::{Aabb2D, Scalar, cost, union_aabb};

/// Inline traversal stack depth. Deeper (degenerate) trees spill to the heap.
const STACK_INLINE: usize = 64;

type Stack = SmallVec<[NodeIdx; STACK_INLINE]>;

pub(crate) struct DynamicTree<K, T> {
    pub(crate) root: Option<NodeIdx>,
    pub(crate) arena: NodeArena<K, T>,
}

impl<K, T: Scalar> DynamicTree<K, T> {
    pub(crate) fn new(initial_capacity: usize, growth: usize) -> Self {
        Self {
            root: None,
            arena: NodeArena::new(initial_capacity, growth),
        }
    }

    /// Link a detached leaf (its `aabb` already set) into the tree.
    ///
    /// Descends from the root picking the child whose enlargement costs least, and
    /// stops early when making the current node the sibling is cheaper than
    /// descending into either child.
    pub(crate) fn insert_leaf(&mut self, leaf: NodeIdx) {
        let Some(root) = self.root else {
            self.arena[leaf].parent = None;
            self.root = Some(leaf);
            return;
        };

        let leaf_aabb = self.arena[leaf].aabb;
        let sibling = self.pick_sibling(root, &leaf_aabb);

        let old_parent = self.arena[sibling].parent;
        let sibling_aabb = self.arena[sibling].aabb;
        let new_parent = self.arena.allocate();
        {
            let node = &mut self.arena[new_parent];
            node.parent = old_parent;
            node.aabb = union_aabb(leaf_aabb, sibling_aabb);
        }

        match old_parent {
            Some(p) => {
                if self.arena[p].left == Some(sibling) {
                    self.arena[p].left = Some(new_parent);
                } else {
                    self.arena[p].right = Some(new_parent);
                }
            }
            None => self.root = Some(new_parent),
        }

        self.arena[new_parent].left = Some(sibling);
        self.arena[new_parent].right = Some(leaf);
        self.arena[sibling].parent = Some(new_parent);
        self.arena[leaf].parent = Some(new_parent);

        log::trace!(
            "aabb tree: leaf {} spliced beside {} under {}",
            leaf.get(),
            sibling.get(),
            new_parent.get()
        );
        self.fix_upward(Some(new_parent));
    }

    fn pick_sibling(&self, root: NodeIdx, leaf_aabb: &Aabb2D<T>) -> NodeIdx {
        let mut index = root;
        loop {
            let node = &self.arena[index];
            let (Some(left), Some(right)) = (node.left, node.right) else {
                return index;
            };

            let area = cost(&node.aabb);
            let combined = cost(&union_aabb(node.aabb, *leaf_aabb));

            // Making `index` the sibling creates a parent with the combined box.
            let stop = combined + combined;
            // Every ancestor of a deeper sibling grows by the same amount.
            let inherit = (combined - area) + (combined - area);

            let cost_left = self.descend_cost(left, leaf_aabb) + inherit;
            let cost_right = self.descend_cost(right, leaf_aabb) + inherit;

            if stop < cost_left && stop < cost_right {
                return index;
            }
            index = if cost_right < cost_left { right } else { left };
        }
    }

    fn descend_cost(&self, child: NodeIdx, leaf_aabb: &Aabb2D<T>) -> T::Acc {
        let node = &self.arena[child];
        let merged = cost(&union_aabb(*leaf_aabb, node.aabb));
        if node.is_leaf() {
            merged
        } else {
            merged - cost(&node.aabb)
        }
    }

    /// Unlink a leaf and collapse its parent. The leaf slot itself stays allocated.
    pub(crate) fn remove_leaf(&mut self, leaf: NodeIdx) {
        if self.root == Some(leaf) {
            self.root = None;
            return;
        }

        let Some(parent) = self.arena[leaf].parent else {
            debug_assert!(false, "non-root leaf without a parent");
            return;
        };
        let grandparent = self.arena[parent].parent;
        let sibling = if self.arena[parent].left == Some(leaf) {
            self.arena[parent].right
        } else {
            self.arena[parent].left
        };
        let Some(sibling) = sibling else {
            debug_assert!(false, "internal node with a single child");
            return;
        };

        match grandparent {
            Some(g) => {
                if self.arena[g].left == Some(parent) {
                    self.arena[g].left = Some(sibling);
                } else {
                    self.arena[g].right = Some(sibling);
                }
                self.arena[sibling].parent = Some(g);
                self.arena.deallocate(parent);
                self.fix_upward(Some(g));
            }
            None => {
                self.root = Some(sibling);
                self.arena[sibling].parent = None;
                self.arena.deallocate(parent);
            }
        }
        self.arena[leaf].parent = None;

        log::trace!(
            "aabb tree: leaf {} removed, parent {} collapsed",
            leaf.get(),
            parent.get()
        );
    }

    /// Recompute boxes from `start` up to the root.
    pub(crate) fn fix_upward(&mut self, start: Option<NodeIdx>) {
        let mut cursor = start;
        while let Some(index) = cursor {
            let node = &self.arena[index];
            let (Some(left), Some(right)) = (node.left, node.right) else {
                break;
            };
            let merged = union_aabb(self.arena[left].aabb, self.arena[right].aabb);
            let node = &mut self.arena[index];
            node.aabb = merged;
            cursor = node.parent;
        }
    }

    /// Visit every leaf whose tight box overlaps `query` (inclusive), skipping `skip`.
    ///
    /// Subtrees whose box misses `query` are never entered. Leaves are reported in
    /// traversal order.
    pub(crate) fn query<F>(&self, query: &Aabb2D<T>, skip: Option<NodeIdx>, mut f: F)
    where
        F: FnMut(NodeIdx, &K),
    {
        let Some(root) = self.root else {
            return;
        };
        let mut stack: Stack = SmallVec::new();
        stack.push(root);
        while let Some(index) = stack.pop() {
            let node = &self.arena[index];
            if !node.aabb.overlaps(query) || Some(index) == skip {
                continue;
            }
            match (&node.leaf, node.left, node.right) {
                (Some(leaf), None, _) => {
                    if leaf.tight.overlaps(query) {
                        f(index, &leaf.key);
                    }
                }
                (_, Some(left), Some(right)) => {
                    stack.push(left);
                    stack.push(right);
                }
                _ => debug_assert!(false, "node {} is neither leaf nor internal", index.get()),
            }
        }
    }

    /// Number of levels; zero for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut max_depth = 0;
        let mut stack: SmallVec<[(NodeIdx, usize); STACK_INLINE]> = SmallVec::new();
        stack.push((root, 1));
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = &self.arena[index];
            if let (Some(left), Some(right)) = (node.left, node.right) {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    /// Check links, boxes, and slot accounting. Returns the reachable leaves.
    pub(crate) fn validate(&self) -> Result<Vec<NodeIdx>, InvariantViolation> {
        const UNSEEN: u8 = 0;
        const IN_TREE: u8 = 1;
        const FREE: u8 = 2;

        let capacity = self.arena.capacity();
        let mut state = vec![UNSEEN; capacity];
        let mut leaves = Vec::new();
        let mut reachable = 0_usize;

        if let Some(root) = self.root {
            if self.arena[root].parent.is_some() {
                return Err(InvariantViolation::at(root.get(), "root has a parent"));
            }
            let mut stack: Stack = SmallVec::new();
            stack.push(root);
            while let Some(index) = stack.pop() {
                let i = index.get();
                if i >= capacity {
                    return Err(InvariantViolation::at(i, "link points outside the arena"));
                }
                if state[i] != UNSEEN {
                    return Err(InvariantViolation::at(i, "node reachable twice"));
                }
                state[i] = IN_TREE;
                reachable += 1;

                let node = &self.arena[index];
                match (node.left, node.right) {
                    (None, None) => {
                        let Some(leaf) = &node.leaf else {
                            return Err(InvariantViolation::at(i, "leaf without an object"));
                        };
                        if !node.aabb.contains(&leaf.tight) {
                            return Err(InvariantViolation::at(
                                i,
                                "leaf box does not contain its object's box",
                            ));
                        }
                        leaves.push(index);
                    }
                    (Some(left), Some(right)) => {
                        if node.leaf.is_some() {
                            return Err(InvariantViolation::at(i, "internal node holds an object"));
                        }
                        if left == right {
                            return Err(InvariantViolation::at(i, "both children are the same node"));
                        }
                        for child in [left, right] {
                            if child.get() >= capacity {
                                return Err(InvariantViolation::at(i, "link points outside the arena"));
                            }
                            if self.arena[child].parent != Some(index) {
                                return Err(InvariantViolation::at(
                                    child.get(),
                                    "child does not point back to its parent",
                                ));
                            }
                        }
                        let merged = union_aabb(self.arena[left].aabb, self.arena[right].aabb);
                        if node.aabb != merged {
                            return Err(InvariantViolation::at(
                                i,
                                "internal box is not the union of its children",
                            ));
                        }
                        stack.push(left);
                        stack.push(right);
                    }
                    (None, Some(_)) => {
                        return Err(InvariantViolation::at(i, "leaf has a right child"));
                    }
                    (Some(_), None) => {
                        return Err(InvariantViolation::at(i, "internal node has one child"));
                    }
                }
            }
        }

        if reachable != self.arena.allocated() {
            return Err(InvariantViolation::global(
                "allocated node count does not match reachable nodes",
            ));
        }

        let mut free = 0_usize;
        for index in self.arena.free_slots() {
            let i = index.get();
            if i >= capacity {
                return Err(InvariantViolation::at(i, "free list points outside the arena"));
            }
            if state[i] != UNSEEN {
                return Err(InvariantViolation::at(i, "slot is both free and in use"));
            }
            state[i] = FREE;
            free += 1;
        }
        if free != self.arena.free_len() || reachable + free != capacity {
            return Err(InvariantViolation::global(
                "free list does not cover the unused slots",
            ));
        }

        Ok(leaves)
    }
}
