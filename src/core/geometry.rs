//! Scan-frame geometry: where the viewfinder frame sits on screen and how
//! decoder coordinates map into it.
//!
//! The camera side owns the numbers: a `GeometrySource` yields the current
//! display-space frame rect together with the matching rect in the camera's
//! native preview space. The overlay re-queries it every frame and treats
//! `None` as "camera still configuring" (skip drawing, try again next
//! frame). The framing-rect helpers at the bottom are for hosts that need
//! to build such geometry from a display area.

use eframe::egui::{Pos2, Rect, Vec2, pos2};

use crate::core::points::ResultPoint;

/// Smallest framing rect width a host should use.
pub const MIN_FRAME_WIDTH: f32 = 240.0;
/// Largest framing rect width a host should use.
pub const MAX_FRAME_WIDTH: f32 = 1200.0;
/// Smallest framing rect height a host should use.
pub const MIN_FRAME_HEIGHT: f32 = 240.0;
/// Largest framing rect height a host should use.
pub const MAX_FRAME_HEIGHT: f32 = 675.0;

/// Current geometry of the scan frame.
///
/// `frame` is in display coordinates (the same space as the overlay's view
/// rect); `preview` is the matching region in the camera's native preview
/// space. Decoder points are relative to `preview`'s origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanGeometry {
    pub frame: Rect,
    pub preview: Rect,
}

impl ScanGeometry {
    pub fn new(frame: Rect, preview: Rect) -> Self {
        Self { frame, preview }
    }

    /// Preview-to-display scale factors.
    ///
    /// The preview rect must have positive dimensions; that is part of the
    /// provider contract, not something the overlay recovers from.
    pub fn scale(&self) -> Vec2 {
        debug_assert!(
            self.preview.width() > 0.0 && self.preview.height() > 0.0,
            "preview rect must have positive dimensions"
        );
        Vec2::new(
            self.frame.width() / self.preview.width(),
            self.frame.height() / self.preview.height(),
        )
    }

    /// Map a preview-space point into display coordinates inside the frame.
    pub fn project(&self, point: ResultPoint) -> Pos2 {
        let scale = self.scale();
        pos2(
            self.frame.min.x + point.x * scale.x,
            self.frame.min.y + point.y * scale.y,
        )
    }
}

/// Source of the current scan-frame geometry, implemented by the camera
/// side of the host application.
pub trait GeometrySource {
    /// Current geometry, or `None` while the camera is still configuring.
    /// When `Some`, the preview rect has strictly positive dimensions.
    fn scan_geometry(&self) -> Option<ScanGeometry>;
}

/// One framing dimension: 5/8 of the display dimension, clamped.
fn desired_dimension(resolution: f32, hard_min: f32, hard_max: f32) -> f32 {
    (resolution * 5.0 / 8.0).clamp(hard_min, hard_max)
}

/// Framing rect for a display area: 5/8 of each dimension (width clamped
/// to 240..1200, height to 240..675), centered in the display.
///
/// Returns `None` for an empty display rect (layout not done yet).
pub fn framing_rect(display: Rect) -> Option<Rect> {
    if display.width() <= 0.0 || display.height() <= 0.0 {
        return None;
    }
    let width = desired_dimension(display.width(), MIN_FRAME_WIDTH, MAX_FRAME_WIDTH);
    let height = desired_dimension(display.height(), MIN_FRAME_HEIGHT, MAX_FRAME_HEIGHT);
    let left = display.min.x + (display.width() - width) / 2.0;
    let top = display.min.y + (display.height() - height) / 2.0;
    Some(Rect::from_min_size(pos2(left, top), Vec2::new(width, height)))
}

/// Map a display-space framing rect into camera preview space.
pub fn framing_rect_in_preview(frame: Rect, display: Rect, preview_size: Vec2) -> Rect {
    let sx = preview_size.x / display.width();
    let sy = preview_size.y / display.height();
    Rect::from_min_max(
        pos2(
            (frame.min.x - display.min.x) * sx,
            (frame.min.y - display.min.y) * sy,
        ),
        pos2(
            (frame.max.x - display.min.x) * sx,
            (frame.max.y - display.min.y) * sy,
        ),
    )
}
