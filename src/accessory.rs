//! Accessory kinds, placement derivations, and the selection/asset boundary.
//!
//! Each accessory derives its placement rectangle independently from the mapped landmarks of the
//! current frame. All derivations are pure; a placement of `None` means the accessory is skipped
//! for this frame (degenerate geometry, or an inverted box after camera mirroring).

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::Point2;

use crate::{
    eye::EyeRegion,
    rect::{rect_from_edges, Rect},
    sprite::Sprite,
    view::CameraFacing,
};

/// Roll angle, in degrees, above which the roll-gated accessory becomes active.
///
/// The comparison is strict: a roll of exactly this value keeps the accessory suppressed.
pub const ROLL_GATE_DEGREES: f32 = 20.0;

/// Pixel margin added on every side of the eye region for the roll-gated accessory.
pub const GATED_MARGIN: f32 = 50.0;

/// Width of the pig nose relative to the face bounding box width.
pub const NOSE_FACE_WIDTH_RATIO: f32 = 1.0 / 5.0;

/// Returns whether the roll-gated accessory is active at the given roll angle.
pub fn roll_gate_active(roll: f32) -> bool {
    roll.abs() > ROLL_GATE_DEGREES
}

/// Placement of a two-eye accessory: the eye region's size at its tilt-adjusted anchor.
pub fn glasses_rect(region: &EyeRegion) -> Option<Rect> {
    let left = region.tilt_adjusted_left();
    let top = region.tilt_adjusted_top();
    rect_from_edges(left, top, left + region.width(), top + region.height())
}

/// Placement of the roll-gated accessory.
///
/// The eye region box grown by [`GATED_MARGIN`] on all sides, with top and bottom additionally
/// perturbed by the raw signed roll. Coupling the edges to the roll sign is what produces the
/// lifted look on one side as the head tilts.
pub fn gated_rect(region: &EyeRegion) -> Option<Rect> {
    let roll = region.roll();
    rect_from_edges(
        region.left() - GATED_MARGIN,
        region.top() - GATED_MARGIN - roll,
        region.right() + GATED_MARGIN,
        region.bottom() + GATED_MARGIN + roll,
    )
}

/// Placement of the pig nose.
///
/// A fifth of the face width, centered on the nose base, reaching from the eye line down to the
/// nose base.
pub fn nose_rect(
    nose_base: Point2<f32>,
    left_eye: Point2<f32>,
    right_eye: Point2<f32>,
    face_width: f32,
) -> Option<Rect> {
    let nose_width = face_width * NOSE_FACE_WIDTH_RATIO;
    rect_from_edges(
        nose_base.x - nose_width / 2.0,
        (left_eye.y + right_eye.y) / 2.0,
        nose_base.x + nose_width / 2.0,
        nose_base.y,
    )
}

/// Placement of the mustache, spanning the mouth corners below the nose base.
///
/// The mustache bitmap is drawn between the subject's *own* left and right mouth corners. With a
/// front camera the mapped corners already appear in subject order; with a back camera they are
/// swapped, so the horizontal bounds swap with them.
pub fn mustache_rect(
    nose_base: Point2<f32>,
    mouth_left: Point2<f32>,
    mouth_right: Point2<f32>,
    facing: CameraFacing,
) -> Option<Rect> {
    let (left, right) = match facing {
        CameraFacing::Front => (mouth_left.x, mouth_right.x),
        CameraFacing::Back => (mouth_right.x, mouth_left.x),
    };
    rect_from_edges(left, nose_base.y, right, mouth_left.y.min(mouth_right.y))
}

/// Source of the persisted accessory selection for the roll-gated slot.
///
/// The selection is owned externally (user preferences) and may change between frames without
/// notification; the renderer polls it once per draw.
pub trait SelectionStore: Send + Sync {
    /// The index of the currently selected accessory graphic.
    fn selected(&self) -> usize;
}

/// A [`SelectionStore`] backed by an atomic, for hosts without persistent preferences.
#[derive(Debug, Default)]
pub struct InMemorySelection {
    key: AtomicUsize,
}

impl InMemorySelection {
    pub fn new(key: usize) -> Self {
        Self {
            key: AtomicUsize::new(key),
        }
    }

    pub fn set(&self, key: usize) {
        self.key.store(key, Ordering::Relaxed);
    }
}

impl SelectionStore for InMemorySelection {
    fn selected(&self) -> usize {
        self.key.load(Ordering::Relaxed)
    }
}

/// The decoded accessory graphics available to the renderer.
///
/// Every slot is optional; a missing bitmap simply means nothing is drawn for that accessory.
#[derive(Default)]
pub struct AccessoryLibrary {
    glasses: Option<Sprite>,
    pig_nose: Option<Sprite>,
    mustache: Option<Sprite>,
    selectable: Vec<Sprite>,
}

impl AccessoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glasses(mut self, sprite: Sprite) -> Self {
        self.glasses = Some(sprite);
        self
    }

    pub fn with_pig_nose(mut self, sprite: Sprite) -> Self {
        self.pig_nose = Some(sprite);
        self
    }

    pub fn with_mustache(mut self, sprite: Sprite) -> Self {
        self.mustache = Some(sprite);
        self
    }

    /// Adds a graphic to the set selectable for the roll-gated slot, returning its index.
    pub fn add_selectable(&mut self, sprite: Sprite) -> usize {
        self.selectable.push(sprite);
        self.selectable.len() - 1
    }

    pub fn glasses(&self) -> Option<&Sprite> {
        self.glasses.as_ref()
    }

    pub fn pig_nose(&self) -> Option<&Sprite> {
        self.pig_nose.as_ref()
    }

    pub fn mustache(&self) -> Option<&Sprite> {
        self.mustache.as_ref()
    }

    /// The bitmap for the roll-gated slot under the given selection key.
    ///
    /// An out-of-range key falls back to the glasses graphic, matching the behavior of the
    /// preference default.
    pub fn gated_sprite(&self, key: usize) -> Option<&Sprite> {
        self.selectable.get(key).or(self.glasses.as_ref())
    }
}
