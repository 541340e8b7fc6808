// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between Kurbo shapes and [`Aabb2D<f64>`].

use kurbo::{Circle, Rect, RoundedRect, Shape};

use crate::types::{Aabb2D, HasAabb};

impl From<Rect> for Aabb2D<f64> {
    /// Converts a rectangle, normalizing negative widths and heights.
    fn from(rect: Rect) -> Self {
        let r = rect.abs();
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }
}

impl From<Aabb2D<f64>> for Rect {
    fn from(aabb: Aabb2D<f64>) -> Self {
        Self::new(aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y)
    }
}

impl HasAabb<f64> for Rect {
    fn aabb(&self) -> Aabb2D<f64> {
        (*self).into()
    }
}

impl HasAabb<f64> for RoundedRect {
    fn aabb(&self) -> Aabb2D<f64> {
        self.rect().into()
    }
}

impl HasAabb<f64> for Circle {
    fn aabb(&self) -> Aabb2D<f64> {
        self.bounding_box().into()
    }
}
