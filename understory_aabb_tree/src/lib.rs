// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_aabb_tree --heading-base-level=0

//! Understory AABB Tree: a dynamic 2D bounding-volume hierarchy for broad-phase queries.
//!
//! Understory AABB Tree indexes moving objects by their axis-aligned bounding boxes (AABBs).
//!
//! - Insert, move, and remove objects keyed by your own identity type.
//! - Ask which objects overlap a given object, a rectangle, or a point.
//! - Collect every overlapping pair as a broad-phase candidate set.
//!
//! It answers box-vs-box overlap only; exact shape tests on the candidates are up to the caller.
//! Boxes that merely touch count as overlapping.
//!
//! # Example
//!
//! ```rust
//! use understory_aabb_tree::{AabbTree, Aabb2D};
//!
//! let mut tree: AabbTree<&str, f64> = AabbTree::new();
//! tree.insert("a", Aabb2D::new(0.0, 0.0, 10.0, 10.0)).unwrap();
//! tree.insert("b", Aabb2D::new(5.0, 5.0, 15.0, 15.0)).unwrap();
//! tree.insert("c", Aabb2D::new(100.0, 100.0, 110.0, 110.0)).unwrap();
//!
//! assert_eq!(tree.query_overlaps(&"a"), ["b"]);
//!
//! // Move "c" next to "a".
//! tree.update(&"c", Aabb2D::new(0.0, 0.0, 1.0, 1.0)).unwrap();
//! let mut hits = tree.query_overlaps(&"a");
//! hits.sort();
//! assert_eq!(hits, ["b", "c"]);
//! ```
//!
//! ## How it works
//!
//! Every object owns a leaf; every internal node has exactly two children and a box that is
//! the union of theirs. A new leaf walks down from the root, choosing at each level the child
//! whose box grows least (measured by perimeter, the 2D stand-in for surface area), and is
//! paired with the node where it stops. Removing a leaf collapses its parent into the sibling.
//! Nodes live in an index-addressed arena with a free list, so the tree never allocates per
//! node and indices stay valid as the arena grows.
//!
//! ## Fattening
//!
//! By default leaves store exactly the box you supply. Set [`TreeConfig::margin`] to store
//! leaves inflated by that margin: objects that jitter inside their fat box are then updated
//! without touching the tree's shape. Queries always test the exact box at the leaves.
//!
//! ```rust
//! use understory_aabb_tree::{AabbTree, Aabb2D, TreeConfig};
//!
//! let config = TreeConfig::default().with_margin(4.0);
//! let mut tree: AabbTree<u32, f32> = AabbTree::with_config(config).unwrap();
//! tree.insert(1, Aabb2D::<f32>::from_xywh(0.0, 0.0, 8.0, 8.0)).unwrap();
//!
//! // Small move: absorbed by the fat box.
//! tree.update(&1, Aabb2D::<f32>::from_xywh(1.0, 0.5, 8.0, 8.0)).unwrap();
//! assert_eq!(tree.fat_aabb(&1), Some(Aabb2D::new(-4.0, -4.0, 12.0, 12.0)));
//! assert_eq!(tree.query_point(0.5, 0.5), Vec::<u32>::new());
//! ```
//!
//! ## Errors
//!
//! Boxes with NaN or infinite coordinates, or with `min > max`, are rejected with
//! [`TreeError::InvalidAabb`]: a NaN merged into an ancestor would silently hide whole subtrees
//! from later queries. Removing or updating an object that is not registered is a no-op.
//!
//! ## Scalars
//!
//! The tree is generic over the coordinate type: `f32`, `f64`, and `i64` are supported, with
//! costs computed in a widened accumulator (f32→f64, f64→f64, i64→i128).
//!
//! ## Features
//!
//! - `kurbo`: [`HasAabb`] for Kurbo shapes and conversions between `kurbo::Rect` and `Aabb2D<f64>`.
//!
//! This crate is `no_std` and uses `alloc`. It is single-threaded by construction: wrap it in
//! your own lock if several threads need to mutate it.

#![no_std]

extern crate alloc;

mod arena;
pub mod config;
pub mod error;
pub mod index;
#[cfg(feature = "kurbo")]
mod kurbo_interop;
mod tree;
pub mod types;

pub use config::TreeConfig;
pub use error::{InvariantViolation, TreeError};
pub use index::{AabbTree, AabbTreeF32, AabbTreeF64, AabbTreeI64};
pub use types::{Aabb2D, HasAabb, Scalar};
