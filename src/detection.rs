//! The per-frame face detection snapshot.
//!
//! A [`FaceDetection`] is produced once per processed camera frame by an external detector and
//! pushed into the [`OverlayController`][crate::overlay::OverlayController]. All positions are in
//! *detector space*; mapping to view space happens at draw time.

use nalgebra::Point2;

/// A detected face, as delivered by the upstream detector for a single frame.
///
/// Landmark positions are optional because detectors routinely lose individual landmarks for a
/// frame or two. Consumers must treat a detection as usable only when *all* landmarks required for
/// placement are present; [`required_landmarks`][Self::required_landmarks] encodes that rule.
/// Partial detections are never partially rendered.
#[derive(Debug, Clone)]
pub struct FaceDetection {
    position: Option<Point2<f32>>,
    width: f32,
    height: f32,
    left_eye: Option<Point2<f32>>,
    right_eye: Option<Point2<f32>>,
    nose_base: Option<Point2<f32>>,
    mouth_left: Option<Point2<f32>>,
    mouth_right: Option<Point2<f32>>,
    mouth_bottom: Option<Point2<f32>>,
    euler_y: f32,
    euler_z: f32,
    left_eye_open: bool,
    right_eye_open: bool,
    smiling: bool,
}

impl FaceDetection {
    /// Creates a detection with the face bounding box size and head rotation angles.
    ///
    /// `euler_y` and `euler_z` are in degrees; `euler_z` is the in-plane roll, with its sign
    /// indicating the tilt direction. All landmarks start out absent.
    pub fn new(width: f32, height: f32, euler_y: f32, euler_z: f32) -> Self {
        Self {
            position: None,
            width,
            height,
            left_eye: None,
            right_eye: None,
            nose_base: None,
            mouth_left: None,
            mouth_right: None,
            mouth_bottom: None,
            euler_y,
            euler_z,
            left_eye_open: true,
            right_eye_open: true,
            smiling: false,
        }
    }

    /// Sets the top-left corner of the face bounding box.
    pub fn with_position(mut self, position: Point2<f32>) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets both eye landmarks (from the perspective of the input image, not the depicted person).
    pub fn with_eyes(mut self, left: Point2<f32>, right: Point2<f32>) -> Self {
        self.left_eye = Some(left);
        self.right_eye = Some(right);
        self
    }

    pub fn with_nose_base(mut self, nose_base: Point2<f32>) -> Self {
        self.nose_base = Some(nose_base);
        self
    }

    /// Sets the mouth-corner and mouth-bottom landmarks.
    pub fn with_mouth(self, left: Point2<f32>, right: Point2<f32>, bottom: Point2<f32>) -> Self {
        self.with_mouth_left(left)
            .with_mouth_right(right)
            .with_mouth_bottom(bottom)
    }

    pub fn with_mouth_left(mut self, left: Point2<f32>) -> Self {
        self.mouth_left = Some(left);
        self
    }

    pub fn with_mouth_right(mut self, right: Point2<f32>) -> Self {
        self.mouth_right = Some(right);
        self
    }

    pub fn with_mouth_bottom(mut self, bottom: Point2<f32>) -> Self {
        self.mouth_bottom = Some(bottom);
        self
    }

    pub fn with_eyes_open(mut self, left_open: bool, right_open: bool) -> Self {
        self.left_eye_open = left_open;
        self.right_eye_open = right_open;
        self
    }

    pub fn with_smiling(mut self, smiling: bool) -> Self {
        self.smiling = smiling;
        self
    }

    pub fn position(&self) -> Option<Point2<f32>> {
        self.position
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn left_eye(&self) -> Option<Point2<f32>> {
        self.left_eye
    }

    pub fn right_eye(&self) -> Option<Point2<f32>> {
        self.right_eye
    }

    pub fn nose_base(&self) -> Option<Point2<f32>> {
        self.nose_base
    }

    pub fn mouth_left(&self) -> Option<Point2<f32>> {
        self.mouth_left
    }

    pub fn mouth_right(&self) -> Option<Point2<f32>> {
        self.mouth_right
    }

    pub fn mouth_bottom(&self) -> Option<Point2<f32>> {
        self.mouth_bottom
    }

    /// Estimated sideways head rotation (yaw) in degrees.
    pub fn euler_y(&self) -> f32 {
        self.euler_y
    }

    /// Estimated in-plane head rotation (roll) in degrees.
    pub fn euler_z(&self) -> f32 {
        self.euler_z
    }

    pub fn is_left_eye_open(&self) -> bool {
        self.left_eye_open
    }

    pub fn is_right_eye_open(&self) -> bool {
        self.right_eye_open
    }

    pub fn is_smiling(&self) -> bool {
        self.smiling
    }

    /// Returns the landmarks required for accessory placement, or `None` if any of them is absent.
    ///
    /// A frame with an incomplete landmark set is skipped entirely by the overlay renderer.
    pub fn required_landmarks(&self) -> Option<RequiredLandmarks> {
        Some(RequiredLandmarks {
            position: self.position?,
            left_eye: self.left_eye?,
            right_eye: self.right_eye?,
            nose_base: self.nose_base?,
            mouth_left: self.mouth_left?,
            mouth_right: self.mouth_right?,
            mouth_bottom: self.mouth_bottom?,
        })
    }
}

/// The full landmark set needed to place every accessory, in detector space.
#[derive(Debug, Clone, Copy)]
pub struct RequiredLandmarks {
    pub position: Point2<f32>,
    pub left_eye: Point2<f32>,
    pub right_eye: Point2<f32>,
    pub nose_base: Point2<f32>,
    pub mouth_left: Point2<f32>,
    pub mouth_right: Point2<f32>,
    pub mouth_bottom: Point2<f32>,
}
