//! Axis-aligned placement rectangles.

use std::{cmp, fmt};

use embedded_graphics::prelude::*;
use itertools::Itertools;

/// An axis-aligned rectangle in view coordinates.
///
/// This is the type handed to a [`DrawTarget`][crate::sprite::DrawTarget] as the destination area
/// of an accessory bitmap. Coordinates are signed so that placements may hang off the visible
/// preview area; rectangles are allowed to have zero width and/or height.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub(crate) rect: embedded_graphics::primitives::Rectangle,
}

impl Rect {
    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub fn from_top_left(top_left_x: i32, top_left_y: i32, width: u32, height: u32) -> Self {
        Self {
            rect: embedded_graphics::primitives::Rectangle {
                top_left: Point {
                    x: top_left_x,
                    y: top_left_y,
                },
                size: Size { width, height },
            },
        }
    }

    /// Creates a rectangle from two opposing corner points (both inclusive).
    ///
    /// # Panics
    ///
    /// Panics if `bottom_right` lies above or to the left of `top_left`.
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        let (x_min, y_min) = top_left;
        let (x_max, y_max) = bottom_right;
        assert!(x_min <= x_max, "x_min={}, x_max={}", x_min, x_max);
        assert!(y_min <= y_max, "y_min={}, y_max={}", y_min, y_max);
        Self::from_top_left(
            x_min,
            y_min,
            (x_max - x_min + 1) as _,
            (y_max - y_min + 1) as _,
        )
    }

    /// Returns the X coordinate of the left side of the rectangle.
    #[inline]
    pub fn x(&self) -> i32 {
        self.rect.top_left.x
    }

    /// Returns the Y coordinate of the top side of the rectangle.
    #[inline]
    pub fn y(&self) -> i32 {
        self.rect.top_left.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.size.height
    }

    /// Returns whether this rectangle covers no pixels at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Computes the intersection of `self` and `other`.
    ///
    /// Returns `None` when the intersection is empty (ie. the rectangles do not overlap).
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = self.x().max(other.x());
        let y_min = self.y().max(other.y());
        let x_max = (i64::from(self.x()) + i64::from(self.width()))
            .min(i64::from(other.x()) + i64::from(other.width())) as i32
            - 1;
        let y_max = (i64::from(self.y()) + i64::from(self.height()))
            .min(i64::from(other.y()) + i64::from(other.height())) as i32
            - 1;
        if x_min > x_max || y_min > y_max {
            return None;
        }
        Some(Rect::from_corners((x_min, y_min), (x_max, y_max)))
    }

    /// Returns whether `self` fully contains `other`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x() <= other.x()
            && self.y() <= other.y()
            && i64::from(self.x()) + i64::from(self.width())
                >= i64::from(other.x()) + i64::from(other.width())
            && i64::from(self.y()) + i64::from(self.height())
                >= i64::from(other.y()) + i64::from(other.height())
    }

    /// Returns an iterator over all X,Y coordinates contained in this `Rect`.
    pub fn iter_coords(&self) -> impl Iterator<Item = (i64, i64)> {
        let x = i64::from(self.x());
        let y = i64::from(self.y());
        let w = i64::from(self.width());
        let h = i64::from(self.height());

        (x..x + w).cartesian_product(y..y + h)
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.rect.top_left.x;
        let y = self.rect.top_left.y;
        let w = self.rect.size.width;
        let h = self.rect.size.height;
        let bx = i64::from(x) + i64::from(w);
        let by = i64::from(y) + i64::from(h);
        write!(f, "Rect @ ({x},{y})-({bx},{by})/{w}x{h}")
    }
}

/// Converts float edge coordinates into a placement [`Rect`].
///
/// Returns `None` when the described area has non-positive extent in either dimension. Degenerate
/// placements are a normal occurrence under extreme head roll and simply mean that nothing should
/// be drawn.
pub fn rect_from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Option<Rect> {
    if !(right > left && bottom > top) {
        return None;
    }
    let x = left as i32;
    let y = top as i32;
    let w = cmp::max(right as i32 - x, 0) as u32;
    let h = cmp::max(bottom as i32 - y, 0) as u32;
    if w == 0 || h == 0 {
        return None;
    }
    Some(Rect::from_top_left(x, y, w, h))
}
