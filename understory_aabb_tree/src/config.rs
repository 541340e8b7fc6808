// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning knobs for [`AabbTree`](crate::AabbTree).

use crate::error::TreeError;
use crate::types::{Scalar, le};

/// Configuration for an [`AabbTree`](crate::AabbTree).
///
/// None of these settings affect query results; they trade memory for fewer
/// allocations and fewer restructures.
///
/// ## Fattening
///
/// With the default `margin` of zero, every leaf stores exactly the box most
/// recently supplied for its object, and any move that leaves the old box
/// refits the ancestors or reinserts the leaf.
///
/// With a positive `margin`, a leaf stores its box inflated by `margin` on every
/// side. Later updates whose box still fits inside that fat box only record the
/// new tight box; the tree structure is untouched. Queries always test the tight
/// box at the leaves, so fattening never produces extra results.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreeConfig<T> {
    /// Number of node slots allocated up front.
    pub initial_capacity: usize,
    /// Number of node slots appended each time the arena runs out. Must be non-zero.
    pub growth: usize,
    /// Padding added on every side of a leaf box. Must be finite and non-negative.
    pub margin: T,
}

impl<T: Scalar> Default for TreeConfig<T> {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            growth: 16,
            margin: T::zero(),
        }
    }
}

impl<T: Scalar> TreeConfig<T> {
    /// Set the number of node slots allocated up front.
    #[must_use]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set the arena growth increment.
    #[must_use]
    pub fn with_growth(mut self, growth: usize) -> Self {
        self.growth = growth;
        self
    }

    /// Set the fattening margin.
    #[must_use]
    pub fn with_margin(mut self, margin: T) -> Self {
        self.margin = margin;
        self
    }

    pub(crate) fn check(&self) -> Result<(), TreeError> {
        if self.growth == 0 {
            return Err(TreeError::InvalidConfig("growth must be non-zero"));
        }
        if !T::is_finite(self.margin) || !le(T::zero(), self.margin) {
            return Err(TreeError::InvalidConfig(
                "margin must be finite and non-negative",
            ));
        }
        Ok(())
    }
}
