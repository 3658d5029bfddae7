//! Accessory bitmap preparation and the draw-target boundary.
//!
//! Accessory graphics are ordinary RGBA bitmaps. Most accessories hand their bitmap to the
//! [`DrawTarget`] as-is; the roll-gated slot additionally goes through [`Sprite::prepare`]
//! (scale to a fixed working resolution, apply the small fixed rotation, crop against the
//! placement rectangle) first. The [`DrawTarget`] owns actual pixel composition; nothing here
//! touches the preview surface directly.

use anyhow::Context;
use image::{
    imageops::{self, FilterType},
    RgbaImage,
};

use crate::rect::Rect;

/// Side length, in pixels, that accessory bitmaps are scaled to before the per-frame transform.
pub const WORKING_RESOLUTION: u32 = 1000;

/// The small fixed rotation applied to the prepared bitmap, in degrees.
pub const ROTATION_DEGREES: f32 = 1.0;

/// A decoded accessory graphic.
#[derive(Clone)]
pub struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    /// Decodes a sprite from an encoded image (PNG, JPEG, or GIF).
    pub fn decode(data: &[u8]) -> anyhow::Result<Self> {
        let image = image::load_from_memory(data)
            .context("failed to decode accessory sprite")?
            .to_rgba8();
        Ok(Self { image })
    }

    /// Wraps an already-decoded bitmap.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the raw bitmap, unscaled and unrotated.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Produces the roll-gated slot's bitmap to composite into `dest`.
    ///
    /// The sprite is scaled to [`WORKING_RESOLUTION`], rotated by [`ROTATION_DEGREES`], and
    /// cropped to the destination size (clamped to the working bitmap, so oversized placements
    /// receive the whole bitmap and leave the final stretch to the draw target). Returns `None`
    /// for an empty destination.
    pub fn prepare(&self, dest: &Rect) -> Option<RgbaImage> {
        if dest.is_empty() {
            return None;
        }

        let scaled = imageops::resize(
            &self.image,
            WORKING_RESOLUTION,
            WORKING_RESOLUTION,
            FilterType::Triangle,
        );
        let rotated = rotate_about_center(&scaled, ROTATION_DEGREES);

        let w = dest.width().min(rotated.width());
        let h = dest.height().min(rotated.height());
        Some(imageops::crop_imm(&rotated, 0, 0, w, h).to_image())
    }
}

/// Rotates `src` around its center, keeping its dimensions.
///
/// Nearest-neighbour sampling; destination pixels that map outside the source stay transparent.
fn rotate_about_center(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();

    let mut out = RgbaImage::new(w, h);
    for (x, y) in Rect::from_top_left(0, 0, w, h).iter_coords() {
        // Inverse-map each destination pixel into the source.
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let sx = cx + dx * cos + dy * sin;
        let sy = cy - dx * sin + dy * cos;
        if sx >= 0.0 && sy >= 0.0 && (sx as u32) < w && (sy as u32) < h {
            out.put_pixel(x as u32, y as u32, *src.get_pixel(sx as u32, sy as u32));
        }
    }
    out
}

/// Receives prepared accessory bitmaps for composition onto the preview surface.
///
/// Implementations are responsible for the actual pixel work (alpha blending, stretching the
/// bitmap into `dest` if the sizes differ). The overlay renderer only ever calls this with
/// non-empty destination rectangles.
pub trait DrawTarget {
    fn draw_bitmap(&mut self, bitmap: &RgbaImage, dest: Rect);
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn solid(w: u32, h: u32, color: Rgba<u8>) -> Sprite {
        Sprite::from_image(RgbaImage::from_pixel(w, h, color))
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Sprite::decode(&[0, 1, 2, 3]).is_err());
    }

    #[test]
    fn rotation_preserves_dimensions() {
        let src = RgbaImage::from_pixel(64, 32, Rgba([10, 20, 30, 255]));
        let out = rotate_about_center(&src, 1.0);
        assert_eq!(out.dimensions(), (64, 32));
    }

    #[test]
    fn zero_rotation_keeps_pixels() {
        let mut src = RgbaImage::new(8, 8);
        src.put_pixel(3, 5, Rgba([1, 2, 3, 4]));
        let out = rotate_about_center(&src, 0.0);
        assert_eq!(out.get_pixel(3, 5), &Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn prepare_crops_to_destination_size() {
        let sprite = solid(16, 16, Rgba([255, 0, 0, 255]));
        let dest = Rect::from_top_left(100, 100, 300, 200);
        let out = sprite.prepare(&dest).unwrap();
        assert_eq!(out.dimensions(), (300, 200));
    }

    #[test]
    fn prepare_clamps_oversized_destinations() {
        let sprite = solid(16, 16, Rgba([255, 0, 0, 255]));
        let dest = Rect::from_top_left(0, 0, 5000, 200);
        let out = sprite.prepare(&dest).unwrap();
        assert_eq!(out.dimensions(), (WORKING_RESOLUTION, 200));
    }

    #[test]
    fn prepare_skips_empty_destinations() {
        let sprite = solid(16, 16, Rgba([255, 0, 0, 255]));
        assert!(sprite.prepare(&Rect::from_top_left(0, 0, 0, 10)).is_none());
    }
}
