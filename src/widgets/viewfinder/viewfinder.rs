//! Viewfinder overlay - state and style.
//! The host binds a `GeometrySource` once at setup, the decoder pushes
//! candidate points through a `PointFeed` clone, and the render loop calls
//! `render`/`paint` every frame. `show_result`/`reset_to_live` switch
//! between the live scanning animation and the decoded-result display;
//! both mark the overlay dirty so the host knows to request a repaint.

use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{Color32, TextureHandle};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::geometry::{GeometrySource, ScanGeometry};
use crate::core::points::{PointFeed, PointTrail};
use crate::core::sweep::SweepBeam;

/// Repaint cadence of the live animation.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(80);
/// Radius of a fresh candidate marker; the previous generation draws at
/// half this.
pub const POINT_RADIUS: f32 = 6.0;
/// Alpha of fresh markers and of the result image blit.
pub const CURRENT_POINT_OPACITY: u8 = 0xA0;
/// Alpha of previous-generation markers.
pub const LAST_POINT_OPACITY: u8 = 0x50;

/// Overlay colors and bracket proportions.
///
/// Everything here is visual design, not scanning behavior; the host may
/// persist it with the rest of its settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewfinderStyle {
    /// Dimming outside the scan window while scanning.
    pub mask_color: Color32,
    /// Dimming outside the scan window once a result is shown.
    pub result_color: Color32,
    /// Corner brackets and the sweep beam tint.
    pub bracket_color: Color32,
    /// Candidate markers; alpha is replaced per generation, so keep this
    /// opaque.
    pub point_color: Color32,
    /// Corner bracket arm length along each edge.
    pub bracket_arm: f32,
    /// Corner bracket arm thickness.
    pub bracket_thickness: f32,
}

impl Default for ViewfinderStyle {
    fn default() -> Self {
        Self {
            mask_color: Color32::from_rgba_unmultiplied(0, 0, 0, 0x60),
            result_color: Color32::from_rgba_unmultiplied(0, 0, 0, 0xB0),
            bracket_color: Color32::GREEN,
            point_color: Color32::from_rgb(0xFF, 0xBD, 0x21),
            bracket_arm: 45.0,
            bracket_thickness: 15.0,
        }
    }
}

/// Runtime state of the viewfinder overlay.
///
/// Owned by the hosting screen and not itself shared across threads; the
/// decoder side only ever holds a [`PointFeed`] clone.
#[derive(Default)]
pub struct ViewfinderState {
    pub(crate) source: Option<Arc<dyn GeometrySource + Send + Sync>>,
    pub(crate) trail: PointTrail,
    pub(crate) sweep: SweepBeam,
    pub(crate) result: Option<TextureHandle>,
    pub(crate) sweep_tex: Option<(Color32, TextureHandle)>,
    dirty: bool,
}

impl ViewfinderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the camera-side geometry provider. Until this is called,
    /// painting is a no-op.
    pub fn bind(&mut self, source: Arc<dyn GeometrySource + Send + Sync>) {
        self.sweep.reset();
        self.source = Some(source);
    }

    /// Current geometry, if bound and established.
    pub fn geometry(&self) -> Option<ScanGeometry> {
        self.source.as_ref().and_then(|s| s.scan_geometry())
    }

    /// Producer handle for pushing candidate points from the decoder.
    pub fn feed(&self) -> PointFeed {
        self.trail.feed()
    }

    /// Switch to the decoded-result display: the next paint draws `image`
    /// inside the frame instead of the live animation.
    pub fn show_result(&mut self, image: TextureHandle) {
        debug!("Showing decode result");
        self.result = Some(image);
        self.dirty = true;
    }

    /// Back to live scanning. Drops the result texture, freeing it once
    /// the last handle is gone. Safe to call when no result is shown.
    pub fn reset_to_live(&mut self) {
        if self.result.take().is_some() {
            debug!("Result cleared, back to live view");
        }
        self.dirty = true;
    }

    /// Whether a decoded result is currently displayed.
    pub fn showing_result(&self) -> bool {
        self.result.is_some()
    }

    /// True once after a mode switch; the host should request a repaint.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
