//! Drawing sink for the overlay.
//!
//! The overlay paints through the `Surface` trait instead of talking to a
//! toolkit painter directly. `PainterSurface` forwards to `egui::Painter`
//! and maps the deferred frame request onto `Context::request_repaint_after`;
//! `RecordingSurface` captures the command stream for headless tests.

use std::time::Duration;

use eframe::egui::{Color32, Context, Painter, Pos2, Rect, TextureId, pos2};

/// Draw calls the overlay can issue, plus the one scheduling call.
pub trait Surface {
    /// Fill an axis-aligned rect.
    fn fill_rect(&mut self, rect: Rect, color: Color32);
    /// Fill a circle.
    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);
    /// Draw a whole texture stretched into `dest`, faded by `opacity`
    /// (255 = opaque).
    fn blit(&mut self, texture: TextureId, dest: Rect, opacity: u8);
    /// Ask the host to paint another frame after `after`. `region` bounds
    /// the area that will change; hosts may ignore it and repaint fully.
    fn request_frame(&mut self, after: Duration, region: Rect);
}

/// `Surface` backed by an egui painter.
pub struct PainterSurface<'a> {
    painter: &'a Painter,
    ctx: &'a Context,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter, ctx: &'a Context) -> Self {
        Self { painter, ctx }
    }
}

impl Surface for PainterSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(rect, 0.0, color);
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.painter.circle_filled(center, radius, color);
    }

    fn blit(&mut self, texture: TextureId, dest: Rect, opacity: u8) {
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        self.painter
            .image(texture, dest, uv, Color32::from_white_alpha(opacity));
    }

    fn request_frame(&mut self, after: Duration, _region: Rect) {
        // egui repaints whole viewports; the region hint has no mapping here
        self.ctx.request_repaint_after(after);
    }
}

/// One recorded `Surface` call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Rect {
        rect: Rect,
        color: Color32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        color: Color32,
    },
    Blit {
        texture: TextureId,
        dest: Rect,
        opacity: u8,
    },
    Frame {
        after: Duration,
        region: Rect,
    },
}

/// Records the command stream instead of drawing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub cmds: Vec<DrawCmd>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded rect fills, in draw order.
    pub fn rects(&self) -> Vec<(Rect, Color32)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Rect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    /// Recorded circle fills, in draw order.
    pub fn circles(&self) -> Vec<(Pos2, f32, Color32)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Circle {
                    center,
                    radius,
                    color,
                } => Some((*center, *radius, *color)),
                _ => None,
            })
            .collect()
    }

    /// Recorded texture blits, in draw order.
    pub fn blits(&self) -> Vec<(TextureId, Rect, u8)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Blit {
                    texture,
                    dest,
                    opacity,
                } => Some((*texture, *dest, *opacity)),
                _ => None,
            })
            .collect()
    }

    /// Recorded deferred-frame requests.
    pub fn frame_requests(&self) -> Vec<(Duration, Rect)> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Frame { after, region } => Some((*after, *region)),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.cmds.push(DrawCmd::Rect { rect, color });
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    fn blit(&mut self, texture: TextureId, dest: Rect, opacity: u8) {
        self.cmds.push(DrawCmd::Blit {
            texture,
            dest,
            opacity,
        });
    }

    fn request_frame(&mut self, after: Duration, region: Rect) {
        self.cmds.push(DrawCmd::Frame { after, region });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_preserves_order() {
        let mut surface = RecordingSurface::new();
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0));
        surface.fill_rect(rect, Color32::RED);
        surface.fill_circle(pos2(5.0, 5.0), 2.0, Color32::GREEN);
        surface.blit(TextureId::User(7), rect, 0xA0);
        surface.request_frame(Duration::from_millis(80), rect);

        assert_eq!(surface.cmds.len(), 4);
        assert_eq!(surface.rects(), vec![(rect, Color32::RED)]);
        assert_eq!(surface.circles(), vec![(pos2(5.0, 5.0), 2.0, Color32::GREEN)]);
        assert_eq!(surface.blits(), vec![(TextureId::User(7), rect, 0xA0)]);
        assert_eq!(
            surface.frame_requests(),
            vec![(Duration::from_millis(80), rect)]
        );
        assert!(matches!(surface.cmds[0], DrawCmd::Rect { .. }));
        assert!(matches!(surface.cmds[3], DrawCmd::Frame { .. }));
    }
}
