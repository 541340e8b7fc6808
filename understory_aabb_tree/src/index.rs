// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public [`AabbTree`] API: objects keyed by identity over the dynamic tree.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::arena::{Leaf, NodeIdx};
use crate::config::TreeConfig;
use crate::error::{InvariantViolation, TreeError};
use crate::tree::DynamicTree;
use crate::types::{Aabb2D, HasAabb, Scalar};

/// A dynamic AABB tree keyed by object identity.
///
/// `K` is the caller's handle for an object: anything cheap to clone, hashable and
/// comparable (an entity id, an interned handle, ...). Its `Hash`/`Eq` must not
/// depend on the object's position, since the box changes while the key stays put.
///
/// Each registered object owns exactly one leaf. Inserting, removing, and moving an
/// object are `O(log n)` for reasonably balanced input; queries visit only subtrees
/// whose boxes overlap the query box.
///
/// All queries are inclusive: boxes that merely touch count as overlapping.
pub struct AabbTree<K, T> {
    tree: DynamicTree<K, T>,
    objects: HashMap<K, NodeIdx>,
    margin: T,
    tight: bool,
}

impl<K, T> AabbTree<K, T>
where
    K: Clone + Eq + Hash,
    T: Scalar,
{
    /// Create an empty tree with the default [`TreeConfig`] (tight leaves).
    pub fn new() -> Self {
        let config = TreeConfig::default();
        Self::from_checked_config(&config)
    }

    /// Create an empty tree with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidConfig`] if `growth` is zero or `margin` is
    /// negative or not finite.
    pub fn with_config(config: TreeConfig<T>) -> Result<Self, TreeError> {
        if let Err(err) = config.check() {
            log::warn!("rejecting aabb tree config {config:?}: {err}");
            return Err(err);
        }
        Ok(Self::from_checked_config(&config))
    }

    fn from_checked_config(config: &TreeConfig<T>) -> Self {
        Self {
            tree: DynamicTree::new(config.initial_capacity, config.growth),
            objects: HashMap::new(),
            margin: config.margin,
            tight: config.margin == T::zero(),
        }
    }

    /// Register a new object with its current box.
    ///
    /// # Errors
    ///
    /// - [`TreeError::InvalidAabb`] if `aabb` has a NaN or infinite coordinate or is inverted.
    /// - [`TreeError::AlreadyRegistered`] if `key` is already in the tree. The tree is unchanged.
    pub fn insert(&mut self, key: K, aabb: Aabb2D<T>) -> Result<(), TreeError> {
        Self::check_aabb(&aabb)?;
        let slot = match self.objects.entry(key) {
            Entry::Occupied(_) => return Err(TreeError::AlreadyRegistered),
            Entry::Vacant(slot) => slot,
        };

        let idx = self.tree.arena.allocate();
        let node = &mut self.tree.arena[idx];
        node.aabb = aabb.inflate(self.margin);
        node.leaf = Some(Leaf {
            key: slot.key().clone(),
            tight: aabb,
        });
        self.tree.insert_leaf(idx);
        let _ = slot.insert(idx);
        Ok(())
    }

    /// Unregister an object. Returns `false` (and does nothing) if it was not registered.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(idx) = self.objects.remove(key) else {
            return false;
        };
        self.tree.remove_leaf(idx);
        self.tree.arena.deallocate(idx);
        true
    }

    /// Move a registered object to `aabb`.
    ///
    /// Returns `Ok(false)` without touching the tree if `key` is not registered.
    ///
    /// If the leaf's stored box already contains `aabb`, the tree keeps its shape:
    /// with a fattening margin only the object's tight box is recorded, and with
    /// tight leaves the leaf box is replaced and its ancestors are refit. Otherwise
    /// the leaf is unlinked and reinserted at the best position for its new box.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidAabb`] if `aabb` has a NaN or infinite coordinate
    /// or is inverted. The object keeps its previous box.
    pub fn update(&mut self, key: &K, aabb: Aabb2D<T>) -> Result<bool, TreeError> {
        Self::check_aabb(&aabb)?;
        let Some(&idx) = self.objects.get(key) else {
            return Ok(false);
        };

        let node = &mut self.tree.arena[idx];
        if let Some(leaf) = node.leaf.as_mut() {
            leaf.tight = aabb;
        }
        if node.aabb.contains(&aabb) {
            if self.tight && node.aabb != aabb {
                node.aabb = aabb;
                let parent = node.parent;
                self.tree.fix_upward(parent);
            }
            return Ok(true);
        }

        self.tree.remove_leaf(idx);
        self.tree.arena[idx].aabb = aabb.inflate(self.margin);
        self.tree.insert_leaf(idx);
        Ok(true)
    }

    /// All other registered objects whose boxes overlap `key`'s box.
    ///
    /// Returns an empty list if `key` is not registered. Order is unspecified.
    pub fn query_overlaps(&self, key: &K) -> Vec<K> {
        let mut out = Vec::new();
        let Some(&idx) = self.objects.get(key) else {
            return out;
        };
        let Some(leaf) = &self.tree.arena[idx].leaf else {
            return out;
        };
        self.tree
            .query(&leaf.tight, Some(idx), |_, k| out.push(k.clone()));
        out
    }

    /// All registered objects whose boxes overlap `rect`. Order is unspecified.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> Vec<K> {
        let mut out = Vec::new();
        self.tree.query(&rect, None, |_, k| out.push(k.clone()));
        out
    }

    /// All registered objects whose boxes contain the point. Order is unspecified.
    pub fn query_point(&self, x: T, y: T) -> Vec<K> {
        self.query_rect(Aabb2D::new(x, y, x, y))
    }

    /// Every unordered pair of registered objects whose boxes overlap, each pair once.
    ///
    /// This is the broad-phase candidate set; order is unspecified.
    pub fn overlapping_pairs(&self) -> Vec<(K, K)> {
        let mut out = Vec::new();
        for &idx in self.objects.values() {
            let Some(leaf) = &self.tree.arena[idx].leaf else {
                continue;
            };
            self.tree.query(&leaf.tight, Some(idx), |other, k| {
                if other.get() > idx.get() {
                    out.push((leaf.key.clone(), k.clone()));
                }
            });
        }
        out
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &K) -> bool {
        self.objects.contains_key(key)
    }

    /// The box last supplied for `key`.
    pub fn aabb(&self, key: &K) -> Option<Aabb2D<T>> {
        let idx = *self.objects.get(key)?;
        self.tree.arena[idx].leaf.as_ref().map(|leaf| leaf.tight)
    }

    /// The box the tree stores for `key`'s leaf (the fattened box, if a margin is set).
    pub fn fat_aabb(&self, key: &K) -> Option<Aabb2D<T>> {
        let idx = *self.objects.get(key)?;
        Some(self.tree.arena[idx].aabb)
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if no objects are registered.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Unregister every object. Node capacity is kept for reuse.
    pub fn clear(&mut self) {
        log::debug!("clearing aabb tree with {} objects", self.objects.len());
        self.objects.clear();
        self.tree.root = None;
        self.tree.arena.reset();
    }

    /// Reserve room for at least `additional` more objects without reallocating.
    pub fn reserve(&mut self, additional: usize) {
        self.objects.reserve(additional);
        // Each object costs one leaf plus, past the first, one internal node.
        self.tree.arena.reserve(additional.saturating_mul(2));
    }

    /// The configured fattening margin.
    pub fn margin(&self) -> T {
        self.margin
    }

    /// Box enclosing every registered object, or `None` if the tree is empty.
    pub fn root_aabb(&self) -> Option<Aabb2D<T>> {
        self.tree.root.map(|root| self.tree.arena[root].aabb)
    }

    /// Number of levels in the tree; zero when empty, one for a single object.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Total node slots in the arena.
    pub fn node_capacity(&self) -> usize {
        self.tree.arena.capacity()
    }

    /// Node slots currently in use (leaves plus internal nodes).
    pub fn allocated_nodes(&self) -> usize {
        self.tree.arena.allocated()
    }

    /// Node slots on the free list.
    pub fn free_nodes(&self) -> usize {
        self.tree.arena.free_len()
    }

    /// Check every structural invariant of the tree.
    ///
    /// This walks the whole arena and is meant for tests and debugging.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let leaves = self.tree.validate()?;
        if leaves.len() != self.objects.len() {
            return Err(InvariantViolation::global(
                "leaf count does not match registered objects",
            ));
        }
        let capacity = self.tree.arena.capacity();
        for (key, &idx) in &self.objects {
            if idx.get() >= capacity {
                return Err(InvariantViolation::at(
                    idx.get(),
                    "object maps outside the arena",
                ));
            }
            let node = &self.tree.arena[idx];
            let Some(leaf) = node.leaf.as_ref().filter(|leaf| leaf.key == *key) else {
                return Err(InvariantViolation::at(
                    idx.get(),
                    "object does not map to its own leaf",
                ));
            };
            if self.tight && node.aabb != leaf.tight {
                return Err(InvariantViolation::at(
                    idx.get(),
                    "tight leaf box differs from its object's box",
                ));
            }
        }
        Ok(())
    }

    fn check_aabb(aabb: &Aabb2D<T>) -> Result<(), TreeError> {
        if aabb.is_valid() {
            Ok(())
        } else {
            log::warn!("rejecting invalid AABB {aabb:?}");
            Err(TreeError::InvalidAabb)
        }
    }
}

impl<K, T> AabbTree<K, T>
where
    K: Clone + Eq + Hash + HasAabb<T>,
    T: Scalar,
{
    /// Register an object using its own [`HasAabb::aabb`].
    ///
    /// # Errors
    ///
    /// Same as [`AabbTree::insert`].
    pub fn insert_object(&mut self, object: K) -> Result<(), TreeError> {
        let aabb = object.aabb();
        self.insert(object, aabb)
    }

    /// Refresh a registered object's box from its own [`HasAabb::aabb`].
    ///
    /// # Errors
    ///
    /// Same as [`AabbTree::update`].
    pub fn update_object(&mut self, object: &K) -> Result<bool, TreeError> {
        self.update(object, object.aabb())
    }
}

impl<K, T> Default for AabbTree<K, T>
where
    K: Clone + Eq + Hash,
    T: Scalar,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T: Debug> Debug for AabbTree<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AabbTree")
            .field("objects", &self.objects.len())
            .field("allocated_nodes", &self.tree.arena.allocated())
            .field("node_capacity", &self.tree.arena.capacity())
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

/// Dynamic tree with f32 coordinates and f64 costs.
pub type AabbTreeF32<K> = AabbTree<K, f32>;

/// Dynamic tree with f64 coordinates and f64 costs.
pub type AabbTreeF64<K> = AabbTree<K, f64>;

/// Dynamic tree with i64 coordinates and i128 costs.
pub type AabbTreeI64<K> = AabbTree<K, i64>;
