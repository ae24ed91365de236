//! Scan-line sweep animation state.
//!
//! Pure offset arithmetic, kept separate from drawing so the wrap behavior
//! is testable without a UI. The offset advances a fixed step each live
//! frame and wraps back to the frame top shortly above the frame bottom.

use eframe::egui::{Rect, pos2};

/// Vertical advance per animation frame, in display pixels.
pub const SWEEP_STEP: f32 = 20.0;
/// Wrap margin above the frame bottom; the beam resets once it gets here.
pub const SWEEP_BOTTOM_MARGIN: f32 = 50.0;
/// Offsets more than this far above the frame top are stale (the frame
/// moved) and restart from the top before advancing.
pub const SWEEP_TOP_SLACK: f32 = 80.0;
/// Drawn thickness of the beam rect.
pub const SWEEP_THICKNESS: f32 = 18.0;

/// Scan-line offset state machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct SweepBeam {
    offset: Option<f32>,
}

impl SweepBeam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one animation frame against the current frame rect.
    ///
    /// An unset or stale offset restarts from the frame top, so the first
    /// drawn offset is `top + SWEEP_STEP`. The result stays within
    /// `[top, bottom - SWEEP_BOTTOM_MARGIN)` for any frame taller than
    /// `SWEEP_BOTTOM_MARGIN + SWEEP_STEP`.
    pub fn advance(&mut self, frame: Rect) -> f32 {
        let mut offset = self.offset.unwrap_or(frame.top());
        if offset < frame.top() - SWEEP_TOP_SLACK {
            offset = frame.top();
        }
        offset += SWEEP_STEP;
        if offset >= frame.bottom() - SWEEP_BOTTOM_MARGIN {
            offset = frame.top();
        }
        self.offset = Some(offset);
        offset
    }

    /// Beam rect for a given offset, spanning the frame width.
    pub fn line_rect(frame: Rect, offset: f32) -> Rect {
        Rect::from_min_max(
            pos2(frame.left(), offset),
            pos2(frame.right(), offset + SWEEP_THICKNESS),
        )
    }

    /// Forget accumulated state; the next advance restarts from the top.
    pub fn reset(&mut self) {
        self.offset = None;
    }
}
