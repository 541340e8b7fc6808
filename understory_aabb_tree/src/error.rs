// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types returned by the tree.

use core::fmt;

/// Error returned by fallible [`AabbTree`](crate::AabbTree) operations.
///
/// Removing or updating an object that is not registered is not an error; those
/// calls are no-ops.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The supplied box has a NaN or infinite coordinate, or `min > max` on some axis.
    InvalidAabb,
    /// The object is already registered; use `update` to move it.
    AlreadyRegistered,
    /// A [`TreeConfig`](crate::TreeConfig) field is out of range.
    InvalidConfig(&'static str),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAabb => f.write_str("AABB has non-finite or inverted bounds"),
            Self::AlreadyRegistered => f.write_str("object is already registered in the tree"),
            Self::InvalidConfig(reason) => write!(f, "invalid tree configuration: {reason}"),
        }
    }
}

impl core::error::Error for TreeError {}

/// A broken structural invariant found by [`AabbTree::validate`](crate::AabbTree::validate).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Arena slot where the problem was detected, if it is tied to one node.
    pub node: Option<usize>,
    /// What went wrong.
    pub reason: &'static str,
}

impl InvariantViolation {
    pub(crate) const fn at(node: usize, reason: &'static str) -> Self {
        Self {
            node: Some(node),
            reason,
        }
    }

    pub(crate) const fn global(reason: &'static str) -> Self {
        Self { node: None, reason }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(node) => write!(f, "tree invariant violated at node {node}: {}", self.reason),
            None => write!(f, "tree invariant violated: {}", self.reason),
        }
    }
}

impl core::error::Error for InvariantViolation {}
