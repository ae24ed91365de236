//! Viewfinder overlay - drawing.
//!
//! `paint` runs against the abstract `Surface` so the whole frame is
//! testable headless; `render` is the egui glue that allocates the widget
//! rect and forwards to it through a `PainterSurface`.

use eframe::egui::{Color32, ColorImage, Context, Rect, Response, Sense, TextureOptions, Ui, pos2};

use crate::core::geometry::ScanGeometry;
use crate::core::points::TrailFrame;
use crate::core::surface::{PainterSurface, Surface};
use crate::core::sweep::SweepBeam;

use super::viewfinder::{
    CURRENT_POINT_OPACITY, FRAME_INTERVAL, LAST_POINT_OPACITY, POINT_RADIUS, ViewfinderState,
    ViewfinderStyle,
};

/// Embed the overlay as an egui widget filling the available space.
///
/// Draw the camera preview underneath before calling this; the overlay
/// only paints the viewfinder chrome on top.
pub fn render(ui: &mut Ui, state: &mut ViewfinderState, style: &ViewfinderStyle) -> Response {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    ensure_sweep_texture(state, ui.ctx(), style);
    let mut surface = PainterSurface::new(&painter, ui.ctx());
    paint(state, response.rect, style, &mut surface);
    response
}

/// Paint one overlay frame onto `surface`.
///
/// Without geometry (unbound, or camera still configuring) this paints
/// nothing and schedules nothing. With a result texture installed it takes
/// the result path: window strips in the result color plus the result
/// image blitted into the frame. Otherwise it runs the live path:
/// brackets, sweep beam, window mask, candidate markers, and one deferred
/// repaint request.
pub fn paint(
    state: &mut ViewfinderState,
    view: Rect,
    style: &ViewfinderStyle,
    surface: &mut dyn Surface,
) {
    let Some(geom) = state.geometry() else {
        return;
    };
    let frame = geom.frame;

    if let Some(result) = &state.result {
        draw_mask(view, frame, style.result_color, surface);
        surface.blit(result.id(), frame, CURRENT_POINT_OPACITY);
        return;
    }

    draw_corner_brackets(frame, style, surface);

    let offset = state.sweep.advance(frame);
    if let Some((_, tex)) = &state.sweep_tex {
        surface.blit(tex.id(), SweepBeam::line_rect(frame, offset), 0xFF);
    }

    draw_mask(view, frame, style.mask_color, surface);

    let points = state.trail.rotate();
    draw_trail(&geom, &points, style.point_color, surface);

    surface.request_frame(FRAME_INTERVAL, frame.expand(POINT_RADIUS));
}

/// Create or refresh the sweep-beam texture when the style color changed.
pub fn ensure_sweep_texture(state: &mut ViewfinderState, ctx: &Context, style: &ViewfinderStyle) {
    let current = state.sweep_tex.as_ref().map(|(color, _)| *color);
    if current != Some(style.bracket_color) {
        let image = sweep_stripe(style.bracket_color);
        let handle = ctx.load_texture("viewfinder-sweep", image, TextureOptions::LINEAR);
        state.sweep_tex = Some((style.bracket_color, handle));
    }
}

/// Four L-shaped brackets hugging the frame corners, two arm rects each.
fn draw_corner_brackets(frame: Rect, style: &ViewfinderStyle, surface: &mut dyn Surface) {
    let arm = style.bracket_arm;
    let t = style.bracket_thickness;
    let corners = [
        (frame.left_top(), 1.0, 1.0),
        (frame.right_top(), -1.0, 1.0),
        (frame.left_bottom(), 1.0, -1.0),
        (frame.right_bottom(), -1.0, -1.0),
    ];
    for (corner, dx, dy) in corners {
        let along = Rect::from_two_pos(corner, pos2(corner.x + dx * arm, corner.y + dy * t));
        let down = Rect::from_two_pos(
            pos2(corner.x, corner.y + dy * t),
            pos2(corner.x + dx * t, corner.y + dy * arm),
        );
        surface.fill_rect(along, style.bracket_color);
        surface.fill_rect(down, style.bracket_color);
    }
}

/// Scan-window bounds: as wide as the frame, window height equal to the
/// frame width, centered vertically in the view.
fn mask_window(view: Rect, frame: Rect) -> (f32, f32) {
    let half = frame.width() / 2.0;
    (view.center().y - half, view.center().y + half)
}

/// Fill the four strips surrounding the scan window. Degenerate strips
/// (window touching a view edge) are skipped.
fn draw_mask(view: Rect, frame: Rect, color: Color32, surface: &mut dyn Surface) {
    let (win_top, win_bottom) = mask_window(view, frame);
    let strips = [
        Rect::from_min_max(view.left_top(), pos2(view.right(), win_top)),
        Rect::from_min_max(pos2(view.left(), win_top), pos2(frame.left(), win_bottom)),
        Rect::from_min_max(pos2(frame.right(), win_top), pos2(view.right(), win_bottom)),
        Rect::from_min_max(pos2(view.left(), win_bottom), view.right_bottom()),
    ];
    for strip in strips {
        if strip.is_positive() {
            surface.fill_rect(strip, color);
        }
    }
}

/// Draw both marker generations: fresh points full size, the previous
/// frame's at half radius and half opacity.
fn draw_trail(
    geom: &ScanGeometry,
    points: &TrailFrame,
    color: Color32,
    surface: &mut dyn Surface,
) {
    let fresh = with_alpha(color, CURRENT_POINT_OPACITY);
    for p in &points.current {
        surface.fill_circle(geom.project(*p), POINT_RADIUS, fresh);
    }
    let faint = with_alpha(color, LAST_POINT_OPACITY);
    for p in &points.last {
        surface.fill_circle(geom.project(*p), POINT_RADIUS / 2.0, faint);
    }
}

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Procedural sweep-beam stripe: the style color with alpha peaking at
/// the vertical center and falling off to transparent edges.
fn sweep_stripe(color: Color32) -> ColorImage {
    const W: usize = 64;
    const H: usize = 16;
    let mut rgba = Vec::with_capacity(W * H * 4);
    for y in 0..H {
        let fy = (y as f32 + 0.5) / H as f32;
        let intensity = 1.0 - (2.0 * fy - 1.0).abs();
        let alpha = (255.0 * intensity) as u8;
        for _x in 0..W {
            rgba.extend_from_slice(&[color.r(), color.g(), color.b(), alpha]);
        }
    }
    ColorImage::from_rgba_unmultiplied([W, H], &rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::core::geometry::GeometrySource;
    use crate::core::points::ResultPoint;
    use crate::core::surface::RecordingSurface;

    struct FixedGeometry(ScanGeometry);

    impl GeometrySource for FixedGeometry {
        fn scan_geometry(&self) -> Option<ScanGeometry> {
            Some(self.0)
        }
    }

    struct NotReady;

    impl GeometrySource for NotReady {
        fn scan_geometry(&self) -> Option<ScanGeometry> {
            None
        }
    }

    fn test_geometry() -> ScanGeometry {
        ScanGeometry::new(
            Rect::from_min_max(pos2(10.0, 10.0), pos2(210.0, 310.0)),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 150.0)),
        )
    }

    fn square_geometry() -> ScanGeometry {
        ScanGeometry::new(
            Rect::from_min_max(pos2(10.0, 10.0), pos2(210.0, 210.0)),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0)),
        )
    }

    fn view() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(480.0, 640.0))
    }

    fn load_test_texture(ctx: &Context, name: &str) -> eframe::egui::TextureHandle {
        let image = ColorImage::from_rgba_unmultiplied([2, 2], &[0xFF; 16]);
        ctx.load_texture(name, image, TextureOptions::LINEAR)
    }

    #[test]
    fn test_paint_without_binding_draws_nothing() {
        let mut state = ViewfinderState::new();
        let mut surface = RecordingSurface::new();
        paint(&mut state, view(), &ViewfinderStyle::default(), &mut surface);
        assert!(surface.is_empty());
    }

    #[test]
    fn test_paint_without_geometry_draws_nothing() {
        let mut state = ViewfinderState::new();
        state.bind(Arc::new(NotReady));
        let mut surface = RecordingSurface::new();
        paint(&mut state, view(), &ViewfinderStyle::default(), &mut surface);
        assert!(surface.is_empty());
    }

    #[test]
    fn test_live_path_inventory() {
        let mut state = ViewfinderState::new();
        state.bind(Arc::new(FixedGeometry(test_geometry())));
        let style = ViewfinderStyle::default();
        let ctx = Context::default();
        ensure_sweep_texture(&mut state, &ctx, &style);

        let mut surface = RecordingSurface::new();
        paint(&mut state, view(), &style, &mut surface);

        // 8 bracket arms + 4 mask strips
        let rects = surface.rects();
        assert_eq!(rects.len(), 12);
        for (_, color) in &rects[..8] {
            assert_eq!(*color, style.bracket_color);
        }
        for (_, color) in &rects[8..] {
            assert_eq!(*color, style.mask_color);
        }

        // Sweep beam blit at full opacity, first offset = top + step
        let blits = surface.blits();
        assert_eq!(blits.len(), 1);
        assert_eq!(blits[0].1, Rect::from_min_max(pos2(10.0, 30.0), pos2(210.0, 48.0)));
        assert_eq!(blits[0].2, 0xFF);

        // No candidate points yet
        assert!(surface.circles().is_empty());

        // One deferred repaint covering the frame plus marker radius
        let frames = surface.frame_requests();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, Duration::from_millis(80));
        assert_eq!(frames[0].1, test_geometry().frame.expand(POINT_RADIUS));
    }

    #[test]
    fn test_mask_strips_surround_window() {
        let mut state = ViewfinderState::new();
        state.bind(Arc::new(FixedGeometry(test_geometry())));
        let style = ViewfinderStyle::default();

        let mut surface = RecordingSurface::new();
        paint(&mut state, view(), &style, &mut surface);

        // Frame width 200 centered in a 640-tall view: window y = 220..420
        let strips = &surface.rects()[8..];
        assert_eq!(strips[0].0, Rect::from_min_max(pos2(0.0, 0.0), pos2(480.0, 220.0)));
        assert_eq!(strips[1].0, Rect::from_min_max(pos2(0.0, 220.0), pos2(10.0, 420.0)));
        assert_eq!(strips[2].0, Rect::from_min_max(pos2(210.0, 220.0), pos2(480.0, 420.0)));
        assert_eq!(strips[3].0, Rect::from_min_max(pos2(0.0, 420.0), pos2(480.0, 640.0)));
    }

    #[test]
    fn test_candidate_markers_fade_over_two_frames() {
        let mut state = ViewfinderState::new();
        state.bind(Arc::new(FixedGeometry(square_geometry())));
        let style = ViewfinderStyle::default();
        let feed = state.feed();
        for i in 0..25 {
            feed.push(ResultPoint::new(i as f32, i as f32));
        }

        // Trimmed once at the 21st push: points 11..=24 survive
        let mut first = RecordingSurface::new();
        paint(&mut state, view(), &style, &mut first);
        let circles = first.circles();
        assert_eq!(circles.len(), 14);
        for (slot, i) in (11..25).enumerate() {
            let (center, radius, color) = circles[slot];
            assert_eq!(center, pos2(10.0 + 2.0 * i as f32, 10.0 + 2.0 * i as f32));
            assert_eq!(radius, POINT_RADIUS);
            assert_eq!(color, Color32::from_rgba_unmultiplied(0xFF, 0xBD, 0x21, 0xA0));
        }

        // Next frame: the same points return once, half size and fainter
        let mut second = RecordingSurface::new();
        paint(&mut state, view(), &style, &mut second);
        let faint = second.circles();
        assert_eq!(faint.len(), 14);
        for (slot, i) in (11..25).enumerate() {
            let (center, radius, color) = faint[slot];
            assert_eq!(center, pos2(10.0 + 2.0 * i as f32, 10.0 + 2.0 * i as f32));
            assert_eq!(radius, POINT_RADIUS / 2.0);
            assert_eq!(color, Color32::from_rgba_unmultiplied(0xFF, 0xBD, 0x21, 0x50));
        }

        // And are gone on the frame after that
        let mut third = RecordingSurface::new();
        paint(&mut state, view(), &style, &mut third);
        assert!(third.circles().is_empty());
    }

    #[test]
    fn test_result_path_replaces_live_animation() {
        let mut state = ViewfinderState::new();
        state.bind(Arc::new(FixedGeometry(test_geometry())));
        let style = ViewfinderStyle::default();
        let ctx = Context::default();
        ensure_sweep_texture(&mut state, &ctx, &style);
        state.feed().push(ResultPoint::new(5.0, 5.0));

        let tex = load_test_texture(&ctx, "decoded");
        let result_id = tex.id();
        state.show_result(tex);
        assert!(state.take_dirty());
        assert!(state.showing_result());

        let mut surface = RecordingSurface::new();
        paint(&mut state, view(), &style, &mut surface);

        // Only the window strips, in the result color
        let rects = surface.rects();
        assert_eq!(rects.len(), 4);
        for (_, color) in &rects {
            assert_eq!(*color, style.result_color);
        }

        // The decoded image fills the frame at reduced opacity
        let blits = surface.blits();
        assert_eq!(blits.len(), 1);
        assert_eq!(blits[0].0, result_id);
        assert_eq!(blits[0].1, test_geometry().frame);
        assert_eq!(blits[0].2, CURRENT_POINT_OPACITY);

        // Not animated: no markers, no re-request
        assert!(surface.circles().is_empty());
        assert!(surface.frame_requests().is_empty());
    }

    #[test]
    fn test_reset_to_live_resumes_animation() {
        let mut state = ViewfinderState::new();
        state.bind(Arc::new(FixedGeometry(test_geometry())));
        let style = ViewfinderStyle::default();
        let ctx = Context::default();

        state.show_result(load_test_texture(&ctx, "decoded"));
        state.take_dirty();
        state.reset_to_live();
        assert!(state.take_dirty());
        assert!(!state.showing_result());

        let mut surface = RecordingSurface::new();
        paint(&mut state, view(), &style, &mut surface);
        assert_eq!(surface.frame_requests().len(), 1);

        // Reset with nothing shown marks dirty and changes nothing else
        state.reset_to_live();
        assert!(state.take_dirty());
        assert!(!state.showing_result());
    }

    #[test]
    fn test_mask_skips_degenerate_strips() {
        // Frame hugging the view's left and right edges: the side strips
        // collapse to zero width and are dropped
        let mut state = ViewfinderState::new();
        state.bind(Arc::new(FixedGeometry(ScanGeometry::new(
            Rect::from_min_max(pos2(0.0, 100.0), pos2(200.0, 300.0)),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0)),
        ))));
        let style = ViewfinderStyle::default();
        let ctx = Context::default();
        state.show_result(load_test_texture(&ctx, "decoded"));

        let narrow_view = Rect::from_min_max(pos2(0.0, 0.0), pos2(200.0, 400.0));
        let mut surface = RecordingSurface::new();
        paint(&mut state, narrow_view, &style, &mut surface);
        assert_eq!(surface.rects().len(), 2);
    }

    #[test]
    fn test_sweep_texture_follows_style_color() {
        let ctx = Context::default();
        let mut state = ViewfinderState::new();
        let mut style = ViewfinderStyle::default();

        ensure_sweep_texture(&mut state, &ctx, &style);
        let first = state.sweep_tex.as_ref().map(|(_, t)| t.id());
        assert!(first.is_some());

        // Same color: texture is reused
        ensure_sweep_texture(&mut state, &ctx, &style);
        assert_eq!(state.sweep_tex.as_ref().map(|(_, t)| t.id()), first);

        // New color: texture is rebuilt
        style.bracket_color = Color32::RED;
        ensure_sweep_texture(&mut state, &ctx, &style);
        assert_ne!(state.sweep_tex.as_ref().map(|(_, t)| t.id()), first);
    }
}
