//! Detector-space to view-space coordinate mapping.
//!
//! The face detector reports positions in the coordinate system of the camera frame it processed;
//! the overlay is drawn onto a preview surface with its own size. The hosting view supplies a
//! [`ViewMapper`] that bridges the two. The mapping must stay affine and consistent for the
//! lifetime of a given camera/preview pairing, and must mirror X when the active camera is
//! front-facing so the overlay is not flipped relative to the subject.

use nalgebra::Point2;

use crate::rect::Rect;

/// Which way the active camera points.
///
/// A front-facing camera produces a mirrored preview, which affects both coordinate mapping and
/// the left/right role of eye and mouth landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    Front,
    Back,
}

/// Maps detector-space coordinates and extents into view space.
pub trait ViewMapper {
    /// Scales a horizontal extent (a width) from detector space to view space.
    fn scale_x(&self, extent: f32) -> f32;

    /// Scales a vertical extent (a height) from detector space to view space.
    fn scale_y(&self, extent: f32) -> f32;

    /// Maps a horizontal coordinate from detector space to view space, mirroring if required.
    fn translate_x(&self, x: f32) -> f32;

    /// Maps a vertical coordinate from detector space to view space.
    fn translate_y(&self, y: f32) -> f32;

    /// Maps a detector-space point into view space.
    fn map_point(&self, point: Point2<f32>) -> Point2<f32> {
        Point2::new(self.translate_x(point.x), self.translate_y(point.y))
    }

    /// The rectangle covered by the preview in view coordinates.
    ///
    /// Accessory placements are clipped against this before drawing.
    fn view_rect(&self) -> Rect;
}

/// The stock affine [`ViewMapper`] for a camera preview stretched to fill a view.
#[derive(Debug, Clone, Copy)]
pub struct PreviewMapper {
    scale_x: f32,
    scale_y: f32,
    offset_x: f32,
    offset_y: f32,
    view_width: f32,
    view_height: f32,
    facing: CameraFacing,
}

impl PreviewMapper {
    /// Creates a mapper for a detector frame of `detector_size` displayed in a view of
    /// `view_size` (both `(width, height)`).
    pub fn new(detector_size: (f32, f32), view_size: (f32, f32), facing: CameraFacing) -> Self {
        Self {
            scale_x: view_size.0 / detector_size.0,
            scale_y: view_size.1 / detector_size.1,
            offset_x: 0.0,
            offset_y: 0.0,
            view_width: view_size.0,
            view_height: view_size.1,
            facing,
        }
    }

    /// Adds a fixed view-space translation, for previews not anchored at the view origin.
    pub fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

impl ViewMapper for PreviewMapper {
    fn view_rect(&self) -> Rect {
        Rect::from_top_left(
            self.offset_x as i32,
            self.offset_y as i32,
            self.view_width as u32,
            self.view_height as u32,
        )
    }

    fn scale_x(&self, extent: f32) -> f32 {
        extent * self.scale_x
    }

    fn scale_y(&self, extent: f32) -> f32 {
        extent * self.scale_y
    }

    fn translate_x(&self, x: f32) -> f32 {
        match self.facing {
            CameraFacing::Front => self.offset_x + self.view_width - self.scale_x(x),
            CameraFacing::Back => self.offset_x + self.scale_x(x),
        }
    }

    fn translate_y(&self, y: f32) -> f32 {
        self.offset_y + self.scale_y(y)
    }
}
