//! The per-frame overlay controller.
//!
//! [`OverlayController`] sits between a detection-producing thread and a rendering thread. The
//! producer pushes one [`FaceDetection`] per processed camera frame via [`submit`]; the renderer,
//! on its own schedule, calls [`draw`] with a [`DrawTarget`] and gets the frame's accessory
//! bitmaps placed onto it. The two sides share exactly one piece of state, the most recent
//! detection, replaced wholesale on every submit (last write wins, intermediate detections may be
//! skipped). Neither side ever blocks on the other beyond the momentary snapshot-slot lock.
//!
//! [`submit`]: OverlayController::submit
//! [`draw`]: OverlayController::draw

use std::{
    io,
    sync::{Arc, Mutex},
};

use pawawwewism::Worker;

use crate::{
    accessory::{
        gated_rect, glasses_rect, mustache_rect, nose_rect, roll_gate_active, AccessoryLibrary,
        SelectionStore,
    },
    detection::FaceDetection,
    eye::EyeRegion,
    rect::Rect,
    sprite::{DrawTarget, Sprite},
    view::{CameraFacing, ViewMapper},
};

/// Eye radius as a fraction of the interocular distance.
///
/// Tying the radius to the distance between the eyes (rather than the face width) keeps accessory
/// sizes stable across face sizes and distances from the camera.
pub const EYE_RADIUS_PROPORTION: f32 = 0.45;

/// Derives the eye and iris radii from the view-space interocular distance.
pub fn derive_radii(interocular_distance: f32) -> (f32, f32) {
    let eye_radius = EYE_RADIUS_PROPORTION * interocular_distance;
    (eye_radius, eye_radius / 2.0)
}

/// Orchestrates one render cycle from an incoming detection to placed accessory bitmaps.
pub struct OverlayController<M> {
    snapshot: Mutex<Option<Arc<FaceDetection>>>,
    mapper: M,
    facing: CameraFacing,
    library: AccessoryLibrary,
    selection: Arc<dyn SelectionStore>,
    redraw: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<M: ViewMapper> OverlayController<M> {
    /// Creates a controller drawing through `mapper` for a camera facing `facing`.
    ///
    /// `selection` is polled once per draw for the roll-gated accessory choice.
    pub fn new(
        mapper: M,
        facing: CameraFacing,
        library: AccessoryLibrary,
        selection: Arc<dyn SelectionStore>,
    ) -> Self {
        Self {
            snapshot: Mutex::new(None),
            mapper,
            facing,
            library,
            selection,
            redraw: None,
        }
    }

    /// Registers a hook invoked after every [`submit`][Self::submit], typically to request a
    /// redraw from the compositor.
    pub fn with_redraw_hook<F: Fn() + Send + Sync + 'static>(mut self, hook: F) -> Self {
        self.redraw = Some(Box::new(hook));
        self
    }

    /// Accepts a new detection, replacing the previous snapshot, and requests a redraw.
    ///
    /// The replacement is a single reference swap; a renderer concurrently inside
    /// [`draw`][Self::draw] keeps operating on the snapshot it already read and never observes a
    /// half-updated detection.
    pub fn submit(&self, detection: FaceDetection) {
        *self.snapshot.lock().unwrap() = Some(Arc::new(detection));
        if let Some(redraw) = &self.redraw {
            redraw();
        }
    }

    /// Returns the most recently submitted detection, if any.
    pub fn snapshot(&self) -> Option<Arc<FaceDetection>> {
        self.snapshot.lock().unwrap().clone()
    }

    /// Renders the current snapshot's accessories onto `target`.
    ///
    /// If there is no snapshot yet, or the snapshot is missing any required landmark, nothing is
    /// drawn for this frame. Individual accessories are likewise skipped when their placement is
    /// degenerate, clipped away entirely, or their bitmap is not loaded.
    pub fn draw<T: DrawTarget>(&self, target: &mut T) {
        // Read the snapshot exactly once; everything below works on this local so a concurrent
        // submit cannot mix landmarks from two detections into one frame.
        let Some(detection) = self.snapshot() else {
            return;
        };
        let Some(landmarks) = detection.required_landmarks() else {
            log::trace!("skipping frame: incomplete landmark set");
            return;
        };

        // With a front camera the preview is mirrored, so the detector's "left eye" appears on
        // the right side of the view. Swap before mapping so the overlay matches the subject.
        let (left_eye_src, right_eye_src) = match self.facing {
            CameraFacing::Front => (landmarks.right_eye, landmarks.left_eye),
            CameraFacing::Back => (landmarks.left_eye, landmarks.right_eye),
        };
        let left_eye = self.mapper.map_point(left_eye_src);
        let right_eye = self.mapper.map_point(right_eye_src);
        let nose_base = self.mapper.map_point(landmarks.nose_base);
        let mouth_left = self.mapper.map_point(landmarks.mouth_left);
        let mouth_right = self.mapper.map_point(landmarks.mouth_right);
        let face_width = self.mapper.scale_x(detection.width());

        let distance = nalgebra::distance(&left_eye, &right_eye);
        let (eye_radius, iris_radius) = derive_radii(distance);
        log::trace!(
            "interocular distance {distance:.1} -> eye radius {eye_radius:.1}, iris radius {iris_radius:.1}"
        );

        let roll = detection.euler_z();
        let region = EyeRegion::new(left_eye, right_eye, eye_radius, roll);

        if let Some(rect) = glasses_rect(&region) {
            self.blit(target, self.library.glasses(), rect);
        }

        if let Some(rect) = nose_rect(nose_base, left_eye, right_eye, face_width) {
            self.blit(target, self.library.pig_nose(), rect);
        }

        if let Some(rect) = mustache_rect(nose_base, mouth_left, mouth_right, self.facing) {
            self.blit(target, self.library.mustache(), rect);
        }

        // The gated slot only appears at a sufficiently jaunty head tilt.
        if roll_gate_active(roll) {
            if let Some(rect) = gated_rect(&region) {
                let key = self.selection.selected();
                self.blit_prepared(target, self.library.gated_sprite(key), rect);
            }
        } else {
            log::trace!("roll {roll:.1} below gate, suppressing gated accessory");
        }
    }

    /// Clips `rect` to the preview and hands the sprite's bitmap to the target, which stretches
    /// it into the destination.
    fn blit<T: DrawTarget>(&self, target: &mut T, sprite: Option<&Sprite>, rect: Rect) {
        let Some(sprite) = sprite else {
            return;
        };
        let Some(dest) = self.clip(rect) else {
            return;
        };
        target.draw_bitmap(sprite.image(), dest);
    }

    /// Like [`blit`][Self::blit], but runs the working-resolution/rotation/crop pipeline first.
    /// Only the roll-gated slot takes this path.
    fn blit_prepared<T: DrawTarget>(&self, target: &mut T, sprite: Option<&Sprite>, rect: Rect) {
        let Some(sprite) = sprite else {
            return;
        };
        let Some(dest) = self.clip(rect) else {
            return;
        };
        if let Some(bitmap) = sprite.prepare(&dest) {
            target.draw_bitmap(&bitmap, dest);
        }
    }

    fn clip(&self, rect: Rect) -> Option<Rect> {
        let dest = rect.intersection(&self.mapper.view_rect());
        if dest.is_none() {
            log::trace!("placement {rect:?} entirely outside the preview");
        }
        dest
    }
}

/// Spawns a worker thread that feeds submitted detections into `controller`.
///
/// This is the detection-actor seam: a capture/detector pipeline sends one [`FaceDetection`] per
/// processed frame into the returned [`Worker`], decoupling its thread from whoever renders.
pub fn detection_worker<M>(
    controller: Arc<OverlayController<M>>,
) -> io::Result<Worker<FaceDetection>>
where
    M: ViewMapper + Send + Sync + 'static,
{
    Worker::builder()
        .name("face detections")
        .spawn(move |detection| controller.submit(detection))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};
    use nalgebra::Point2;

    use crate::accessory::InMemorySelection;
    use crate::sprite::Sprite;
    use crate::view::PreviewMapper;

    use super::*;

    struct RecordingTarget {
        calls: Vec<(Rect, (u32, u32))>,
    }

    impl RecordingTarget {
        fn new() -> Self {
            Self { calls: Vec::new() }
        }
    }

    impl DrawTarget for RecordingTarget {
        fn draw_bitmap(&mut self, bitmap: &RgbaImage, dest: Rect) {
            self.calls.push((dest, bitmap.dimensions()));
        }
    }

    fn pt(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    fn sprite() -> Sprite {
        Sprite::from_image(RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255])))
    }

    fn full_library() -> AccessoryLibrary {
        let mut library = AccessoryLibrary::new()
            .with_glasses(sprite())
            .with_pig_nose(sprite())
            .with_mustache(sprite());
        library.add_selectable(sprite());
        library
    }

    fn complete_detection(roll: f32) -> FaceDetection {
        // Subject-ordered landmarks: in an unmirrored view the subject's left mouth corner
        // appears on the viewer's right.
        FaceDetection::new(300.0, 350.0, 0.0, roll)
            .with_position(pt(250.0, 150.0))
            .with_eyes(pt(300.0, 300.0), pt(400.0, 300.0))
            .with_nose_base(pt(350.0, 380.0))
            .with_mouth(pt(380.0, 430.0), pt(320.0, 430.0), pt(350.0, 450.0))
    }

    fn controller(facing: CameraFacing) -> OverlayController<PreviewMapper> {
        // Identity mapping over a large preview so geometry tests aren't clipped.
        let mapper = PreviewMapper::new((2000.0, 2000.0), (2000.0, 2000.0), facing);
        OverlayController::new(
            mapper,
            facing,
            full_library(),
            Arc::new(InMemorySelection::new(0)),
        )
    }

    #[test]
    fn radii_scale_linearly_with_interocular_distance() {
        let (eye, iris) = derive_radii(100.0);
        assert_relative_eq!(eye, 45.0);
        assert_relative_eq!(iris, 22.5);

        let (eye2, iris2) = derive_radii(200.0);
        assert_relative_eq!(eye2, 2.0 * eye);
        assert_relative_eq!(iris2, 2.0 * iris);
    }

    #[test]
    fn no_snapshot_draws_nothing() {
        let controller = controller(CameraFacing::Back);
        let mut target = RecordingTarget::new();
        controller.draw(&mut target);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn missing_mouth_bottom_aborts_the_frame() {
        let controller = controller(CameraFacing::Back);
        let detection = FaceDetection::new(300.0, 350.0, 0.0, 5.0)
            .with_position(pt(250.0, 150.0))
            .with_eyes(pt(300.0, 300.0), pt(400.0, 300.0))
            .with_nose_base(pt(350.0, 380.0))
            .with_mouth_left(pt(380.0, 430.0))
            .with_mouth_right(pt(320.0, 430.0));
        controller.submit(detection);

        let mut target = RecordingTarget::new();
        controller.draw(&mut target);
        assert!(target.calls.is_empty(), "partial detection must not render");
    }

    #[test]
    fn level_head_draws_ungated_accessories() {
        let controller = controller(CameraFacing::Back);
        controller.submit(complete_detection(0.0));

        let mut target = RecordingTarget::new();
        controller.draw(&mut target);
        // Glasses, pig nose, mustache; the gated slot stays suppressed at zero roll.
        assert_eq!(target.calls.len(), 3);
        // Mustache spans the (subject-ordered, so viewer-swapped) mouth corners below the nose.
        assert_eq!(target.calls[2].0, Rect::from_top_left(320, 380, 60, 50));
    }

    #[test]
    fn roll_gate_controls_the_fourth_accessory() {
        for (roll, expected) in [(25.0, 4), (15.0, 3), (20.0, 3), (-25.0, 4)] {
            let controller = controller(CameraFacing::Back);
            controller.submit(complete_detection(roll));

            let mut target = RecordingTarget::new();
            controller.draw(&mut target);
            assert_eq!(target.calls.len(), expected, "roll={roll}");
        }
    }

    #[test]
    fn glasses_placement_matches_eye_region() {
        let controller = controller(CameraFacing::Back);
        controller.submit(complete_detection(0.0));

        let mut target = RecordingTarget::new();
        controller.draw(&mut target);

        // Interocular distance 100 -> eye radius 45; level head, so the glasses rect is the
        // unshifted eye region box: (215,175)-(485,425). The graphic itself is handed over
        // untouched; the target stretches it into the destination.
        let (glasses, size) = target.calls[0];
        assert_eq!(glasses, Rect::from_top_left(215, 175, 270, 250));
        assert_eq!(size, (8, 8));
    }

    #[test]
    fn front_camera_swaps_and_mirrors_eyes() {
        let mapper = PreviewMapper::new((1000.0, 1000.0), (1000.0, 1000.0), CameraFacing::Front);
        let controller = OverlayController::new(
            mapper,
            CameraFacing::Front,
            full_library(),
            Arc::new(InMemorySelection::new(0)),
        );
        controller.submit(complete_detection(0.0));

        let mut target = RecordingTarget::new();
        controller.draw(&mut target);

        // Detector eyes at x=300/x=400 mirror to x=700/x=600 and swap roles, so the region spans
        // the same interocular distance and the glasses box sits mirrored about x=500.
        let (glasses, _) = target.calls[0];
        assert_eq!(glasses, Rect::from_top_left(515, 175, 270, 250));
    }

    #[test]
    fn placements_are_clipped_to_the_preview() {
        // Small preview; the face sits near the right edge so the glasses box overhangs it.
        let mapper = PreviewMapper::new((500.0, 500.0), (500.0, 500.0), CameraFacing::Back);
        let controller = OverlayController::new(
            mapper,
            CameraFacing::Back,
            full_library(),
            Arc::new(InMemorySelection::new(0)),
        );
        let detection = FaceDetection::new(300.0, 350.0, 0.0, 0.0)
            .with_position(pt(250.0, 150.0))
            .with_eyes(pt(400.0, 300.0), pt(480.0, 300.0))
            .with_nose_base(pt(440.0, 380.0))
            .with_mouth(pt(470.0, 430.0), pt(410.0, 430.0), pt(440.0, 450.0));
        controller.submit(detection);

        let mut target = RecordingTarget::new();
        controller.draw(&mut target);

        // Interocular distance 80 -> eye radius 36; the raw glasses box (324,184)-(556,416) gets
        // its right side cut off at the preview edge.
        let (glasses, _) = target.calls[0];
        assert_eq!(glasses, Rect::from_top_left(324, 184, 176, 232));

        let view = Rect::from_top_left(0, 0, 500, 500);
        assert!(!target.calls.is_empty());
        for (dest, _) in &target.calls {
            assert!(view.contains_rect(dest), "{dest:?} escapes the preview");
        }
    }

    #[test]
    fn ungated_accessories_receive_their_full_graphic() {
        struct ContentTarget {
            calls: Vec<((u32, u32), bool)>,
        }

        impl DrawTarget for ContentTarget {
            fn draw_bitmap(&mut self, bitmap: &RgbaImage, _dest: Rect) {
                let visible = bitmap.pixels().any(|px| px[3] != 0);
                self.calls.push((bitmap.dimensions(), visible));
            }
        }

        // A graphic whose only visible content sits in its lower-right quadrant.
        let mut image = RgbaImage::new(8, 8);
        for (x, y, px) in image.enumerate_pixels_mut() {
            if x >= 4 && y >= 4 {
                *px = Rgba([255, 0, 0, 255]);
            }
        }
        let quadrant = Sprite::from_image(image);
        let mut library = AccessoryLibrary::new()
            .with_glasses(quadrant.clone())
            .with_pig_nose(quadrant.clone())
            .with_mustache(quadrant.clone());
        library.add_selectable(quadrant);

        let mapper = PreviewMapper::new((2000.0, 2000.0), (2000.0, 2000.0), CameraFacing::Back);
        let controller = OverlayController::new(
            mapper,
            CameraFacing::Back,
            library,
            Arc::new(InMemorySelection::new(0)),
        );
        controller.submit(complete_detection(25.0));

        let mut target = ContentTarget { calls: Vec::new() };
        controller.draw(&mut target);
        assert_eq!(target.calls.len(), 4);

        // Glasses, nose, and mustache pass their graphic through untouched, so its content
        // reaches the target instead of a transparent corner crop.
        for (dims, visible) in &target.calls[..3] {
            assert_eq!(*dims, (8, 8));
            assert!(*visible, "ungated graphic content lost on the way to the target");
        }

        // The gated slot alone goes through the working-resolution pipeline and is cropped to
        // its placement: roll 25 puts the eye region at (215,200)-(485,400), so the gated rect
        // is (165,125)-(535,475).
        let (dims, _) = target.calls[3];
        assert_eq!(dims, (370, 350));
    }

    #[test]
    fn submit_replaces_snapshot_and_requests_redraw() {
        let redraws = Arc::new(AtomicUsize::new(0));
        let counter = redraws.clone();
        let controller = controller(CameraFacing::Back)
            .with_redraw_hook(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        controller.submit(complete_detection(1.0));
        controller.submit(complete_detection(2.0));

        assert_eq!(redraws.load(Ordering::SeqCst), 2);
        let snapshot = controller.snapshot().unwrap();
        assert_relative_eq!(snapshot.euler_z(), 2.0);
    }
}
