//! Face-anchored cartoon accessory overlays for live camera previews.
//!
//! The heart of this crate is a small, fully deterministic geometry pipeline: per camera frame, a
//! face detector hands us eye/nose/mouth landmarks in *detector space*, and we derive the
//! rectangles in *view space* that accessory bitmaps (glasses, a pig nose, a mustache, a
//! user-selected extra) should occupy, correcting for head roll and front-camera mirroring along
//! the way.
//!
//! Face detection itself, camera capture, and pixel composition are external collaborators:
//! detections are pushed in via [`OverlayController::submit`], and finished bitmaps leave through
//! the [`DrawTarget`] trait.
//!
//! [`OverlayController::submit`]: overlay::OverlayController::submit
//! [`DrawTarget`]: sprite::DrawTarget

use log::LevelFilter;

pub mod accessory;
pub mod detection;
pub mod eye;
pub mod overlay;
pub mod rect;
pub mod sprite;
pub mod view;

pub type Error = Box<dyn std::error::Error + Sync + Send>;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this crate will log at *trace*
/// level. Otherwise, they will log at *debug* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
