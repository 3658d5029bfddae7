//! Tilt-compensated eye region geometry.
//!
//! [`EyeRegion`] is the leaf of the placement pipeline: given the two mapped eye positions, an eye
//! radius, and the head roll angle, it derives the axis-aligned box a two-eye accessory (glasses)
//! should occupy, plus a roll-corrected anchor that keeps the bitmap visually centered while the
//! head tilts. It performs no coordinate-space conversion and no I/O; every accessor is a pure
//! function of the fields and is recomputed on each call.

use std::time::Duration;

use nalgebra::{Point2, Vector2};

/// The rectangular region spanned by both eyes, in view coordinates.
///
/// Construction is a plain value assignment with no validation; callers are responsible for
/// passing finite, already-mapped coordinates. A fresh `EyeRegion` is built for every draw pass,
/// so no state is shared between frames.
#[derive(Debug, Clone, Copy)]
pub struct EyeRegion {
    left_eye: Point2<f32>,
    right_eye: Point2<f32>,
    eye_radius: f32,
    roll: f32,
}

impl EyeRegion {
    /// Fixed horizontal padding added around each eye, in view units.
    pub const WIDTH_MARGIN: f32 = 40.0;

    /// Fixed vertical padding added around each eye, in view units.
    pub const HEIGHT_MARGIN: f32 = 80.0;

    /// Scales the absolute roll angle into the anchor shift applied by
    /// [`tilt_adjusted_left`][Self::tilt_adjusted_left] and
    /// [`tilt_adjusted_top`][Self::tilt_adjusted_top].
    pub const TILT_MULTIPLIER: f32 = 2.3;

    /// Creates an eye region from mapped eye positions, an eye radius, and the roll angle.
    ///
    /// `roll` is the head's in-plane rotation in degrees; its sign selects which eye anchors the
    /// top and bottom edges.
    pub fn new(left_eye: Point2<f32>, right_eye: Point2<f32>, eye_radius: f32, roll: f32) -> Self {
        Self {
            left_eye,
            right_eye,
            eye_radius,
            roll,
        }
    }

    /// The horizontal reach of a single eye: eye radius plus the fixed width margin.
    pub fn eye_width_radius(&self) -> f32 {
        self.eye_radius + Self::WIDTH_MARGIN
    }

    /// The vertical reach of a single eye, shrunk by the absolute roll angle.
    ///
    /// Shrinking models the foreshortening of the eye region as the head tilts. The value is
    /// deliberately not clamped: for extreme roll it goes negative, which downstream placement
    /// treats as a degenerate (zero-area) region.
    pub fn eye_height_radius(&self) -> f32 {
        self.eye_radius + Self::HEIGHT_MARGIN - self.roll_abs()
    }

    pub fn left(&self) -> f32 {
        self.left_eye.x - self.eye_width_radius()
    }

    pub fn right(&self) -> f32 {
        self.right_eye.x + self.eye_width_radius()
    }

    /// The top edge, anchored to whichever eye rides higher under the current roll.
    ///
    /// Positive roll means the head is tilted clockwise with the left eye higher, so `top` follows
    /// the left eye; for zero or negative roll it follows the right eye.
    pub fn top(&self) -> f32 {
        if self.roll > 0.0 {
            self.left_eye.y - self.eye_height_radius()
        } else {
            self.right_eye.y - self.eye_height_radius()
        }
    }

    /// The bottom edge; anchoring mirrors [`top`][Self::top].
    pub fn bottom(&self) -> f32 {
        if self.roll > 0.0 {
            self.right_eye.y + self.eye_height_radius()
        } else {
            self.left_eye.y + self.eye_height_radius()
        }
    }

    pub fn width(&self) -> f32 {
        self.right() - self.left()
    }

    pub fn height(&self) -> f32 {
        self.bottom() - self.top()
    }

    /// The left edge shifted outward proportionally to the absolute roll, for anchoring a single
    /// contiguous accessory bitmap.
    pub fn tilt_adjusted_left(&self) -> f32 {
        self.left() - self.roll_abs() * Self::TILT_MULTIPLIER
    }

    /// The top edge shifted upward proportionally to the absolute roll.
    pub fn tilt_adjusted_top(&self) -> f32 {
        self.top() - self.roll_abs() * Self::TILT_MULTIPLIER
    }

    /// The signed roll angle this region was built with, in degrees.
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// The magnitude of the roll angle, in degrees.
    pub fn roll_abs(&self) -> f32 {
        self.roll.abs()
    }
}

/// Extension seam for simulated iris movement inside an [`EyeRegion`].
///
/// Nothing in the crate implements or drives this yet; it exists so that a future cartoon-eye
/// renderer can plug in per-eye motion (each eye would own its own state) without changing the
/// placement pipeline.
pub trait IrisMotion {
    /// Returns the iris offset from the eye center for the next frame.
    fn next_iris_offset(&mut self, region: &EyeRegion, elapsed: Duration) -> Vector2<f32>;
}
