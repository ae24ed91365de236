//! Shared scaffolding for the demo binary.
//!
//! Provides logger setup plus a simulated capture stack: a camera
//! (geometry provider + preview backdrop) and a decoder thread that feeds
//! candidate points into the overlay and reports decodes over a channel,
//! standing in for real camera/decoder collaborators.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender, bounded};
use eframe::egui::{Rect, Vec2};
use image::{Rgba, RgbaImage};
use log::{debug, info};

use crate::core::geometry::{GeometrySource, ScanGeometry, framing_rect, framing_rect_in_preview};
use crate::core::points::{PointFeed, ResultPoint};

/// Decoder simulation tick.
const TICK: Duration = Duration::from_millis(60);

/// Initialize logging; the `-v` count raises the default filter.
pub fn init_logger(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
        .format_timestamp_millis()
        .init();
}

/// Load a user-supplied backdrop, or fall back to the synthetic feed.
pub fn load_preview(path: Option<&Path>) -> anyhow::Result<RgbaImage> {
    match path {
        Some(p) => {
            info!("Loading preview backdrop: {}", p.display());
            let img = image::open(p)
                .with_context(|| format!("Failed to load preview image {}", p.display()))?;
            Ok(img.to_rgba8())
        }
        None => Ok(synthetic_preview(640, 480)),
    }
}

/// Simulated camera: fixed preview resolution, display rect updated by
/// the app every frame.
pub struct CameraSim {
    preview_size: Vec2,
    display: Mutex<Option<Rect>>,
}

impl CameraSim {
    pub fn new(preview_size: Vec2) -> Self {
        Self {
            preview_size,
            display: Mutex::new(None),
        }
    }

    /// Update the display area the overlay occupies (once per frame).
    pub fn set_display_rect(&self, rect: Rect) {
        *self.display.lock().unwrap_or_else(|e| e.into_inner()) = Some(rect);
    }

    pub fn preview_size(&self) -> Vec2 {
        self.preview_size
    }
}

impl GeometrySource for CameraSim {
    fn scan_geometry(&self) -> Option<ScanGeometry> {
        let display = (*self.display.lock().unwrap_or_else(|e| e.into_inner()))?;
        let frame = framing_rect(display)?;
        let preview = framing_rect_in_preview(frame, display, self.preview_size);
        Some(ScanGeometry::new(frame, preview))
    }
}

/// Messages from the decoder thread to the UI.
pub enum DecodeEvent {
    /// Scan succeeded; carries the highlighted result image.
    Decoded { image: RgbaImage },
}

/// Handle to the decoder simulation thread.
///
/// While `scanning` is set the thread pushes jittered candidate points
/// around the synthetic finder patterns, and after `decode_after` of
/// uninterrupted scanning it emits one [`DecodeEvent::Decoded`] and
/// pauses itself; the host re-enables scanning when it returns to the
/// live view.
pub struct DecoderSim {
    pub events: Receiver<DecodeEvent>,
    scanning: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DecoderSim {
    pub fn spawn(
        camera: Arc<CameraSim>,
        feed: PointFeed,
        preview: Arc<RgbaImage>,
        decode_after: Duration,
    ) -> Self {
        let (tx, rx) = bounded(8);
        let scanning = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(AtomicBool::new(false));

        let scan_flag = Arc::clone(&scanning);
        let stop_flag = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name("scanview-decoder".to_string())
            .spawn(move || decoder_loop(camera, feed, preview, tx, scan_flag, stop_flag, decode_after))
            .expect("Failed to spawn decoder thread");

        Self {
            events: rx,
            scanning,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Pause or resume candidate-point production.
    pub fn set_scanning(&self, on: bool) {
        self.scanning.store(on, Ordering::Relaxed);
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Relaxed)
    }
}

impl Drop for DecoderSim {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn decoder_loop(
    camera: Arc<CameraSim>,
    feed: PointFeed,
    preview: Arc<RgbaImage>,
    events: Sender<DecodeEvent>,
    scanning: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    decode_after: Duration,
) {
    debug!("Decoder simulation started");
    let preview_size = camera.preview_size();
    let centers = finder_centers(preview_size);
    let mut scan_started = Instant::now();
    let mut was_scanning = false;
    let mut tick: u64 = 0;

    loop {
        thread::sleep(TICK);
        tick += 1;

        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        if !scanning.load(Ordering::Relaxed) {
            was_scanning = false;
            continue;
        }
        if !was_scanning {
            scan_started = Instant::now();
            was_scanning = true;
        }

        let Some(geom) = camera.scan_geometry() else {
            continue;
        };
        let crop = geom.preview;

        // 1-3 jittered hits around the finder patterns per tick
        let hits = 1 + jitter(tick, 7) % 3;
        for k in 0..hits {
            let center = centers[(jitter(tick, 11 + k) % 3) as usize];
            let dx = (jitter(tick, k) % 17) as f32 - 8.0;
            let dy = (jitter(tick, k + 5) % 17) as f32 - 8.0;
            let point = ResultPoint::new(
                center.x + dx - crop.min.x,
                center.y + dy - crop.min.y,
            );
            if point.x >= 0.0
                && point.y >= 0.0
                && point.x <= crop.width()
                && point.y <= crop.height()
            {
                feed.push(point);
            }
        }

        if scan_started.elapsed() >= decode_after {
            info!("Decode simulated after {:.1}s", scan_started.elapsed().as_secs_f32());
            let image = result_snapshot(&preview, crop, &centers);
            if events.send(DecodeEvent::Decoded { image }).is_err() {
                break;
            }
            scanning.store(false, Ordering::Relaxed);
            was_scanning = false;
        }
    }
    debug!("Decoder simulation stopped");
}

/// Demo scaffolding: the simulated camera and decoder plus their shared
/// preview backdrop.
pub struct Shell {
    pub camera: Arc<CameraSim>,
    pub decoder: DecoderSim,
    pub preview: Arc<RgbaImage>,
}

impl Shell {
    /// Wire the simulation around a preview image and the overlay's feed.
    pub fn new(feed: PointFeed, preview: RgbaImage, decode_after: Duration) -> Self {
        let preview = Arc::new(preview);
        let camera = Arc::new(CameraSim::new(Vec2::new(
            preview.width() as f32,
            preview.height() as f32,
        )));
        let decoder = DecoderSim::spawn(
            Arc::clone(&camera),
            feed,
            Arc::clone(&preview),
            decode_after,
        );
        Self {
            camera,
            decoder,
            preview,
        }
    }
}

/// Deterministic stand-in for the camera feed: dark noisy background with
/// a QR-style code in the middle (three finder squares over a module
/// speckle).
pub fn synthetic_preview(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let v = 40 + (jitter(x as u64, y as u64) % 24) as u8;
        *pixel = Rgba([v, v, v + 6, 255]);
    }

    let side = (width.min(height) as f32 * 0.5) as u32;
    let left = (width - side) / 2;
    let top = (height - side) / 2;
    let module = (side / 29).max(2);

    // Quiet zone
    fill_rect_px(&mut img, left, top, side, side, Rgba([235, 235, 235, 255]));

    // Data-area speckle
    for my in 0..side / module {
        for mx in 0..side / module {
            if jitter(mx as u64, my as u64) % 5 < 2 {
                fill_rect_px(
                    &mut img,
                    left + mx * module,
                    top + my * module,
                    module,
                    module,
                    Rgba([20, 20, 24, 255]),
                );
            }
        }
    }

    // Finder patterns over the speckle
    let margin = module;
    let far = side - margin - 7 * module;
    for (fx, fy) in [(margin, margin), (far, margin), (margin, far)] {
        draw_finder(&mut img, left + fx, top + fy, module);
    }

    img
}

/// Centers of the three synthetic finder patterns, in preview pixels.
pub fn finder_centers(preview: Vec2) -> [ResultPoint; 3] {
    let side = (preview.x.min(preview.y) * 0.5).floor();
    let left = ((preview.x - side) / 2.0).floor();
    let top = ((preview.y - side) / 2.0).floor();
    let module = (side / 29.0).floor().max(2.0);
    let margin = module;
    let far = side - margin - 7.0 * module;
    let half = 3.5 * module;
    [
        ResultPoint::new(left + margin + half, top + margin + half),
        ResultPoint::new(left + far + half, top + margin + half),
        ResultPoint::new(left + margin + half, top + far + half),
    ]
}

/// Result image: the preview crop with the detected points joined up,
/// the way a scanner highlights the found code.
fn result_snapshot(preview: &RgbaImage, crop: Rect, centers: &[ResultPoint; 3]) -> RgbaImage {
    let x0 = (crop.min.x.max(0.0) as u32).min(preview.width().saturating_sub(1));
    let y0 = (crop.min.y.max(0.0) as u32).min(preview.height().saturating_sub(1));
    let w = (crop.width() as u32).clamp(1, preview.width() - x0);
    let h = (crop.height() as u32).clamp(1, preview.height() - y0);
    let mut img = image::imageops::crop_imm(preview, x0, y0, w, h).to_image();

    let green = Rgba([0x60, 0xFF, 0x70, 0xFF]);
    let rel: Vec<(f32, f32)> = centers
        .iter()
        .map(|c| (c.x - x0 as f32, c.y - y0 as f32))
        .collect();
    draw_line(&mut img, rel[0], rel[1], green);
    draw_line(&mut img, rel[0], rel[2], green);
    draw_line(&mut img, rel[1], rel[2], green);
    img
}

/// 7x7-module finder pattern: dark ring, light ring, dark center.
fn draw_finder(img: &mut RgbaImage, x: u32, y: u32, module: u32) {
    let dark = Rgba([20, 20, 24, 255]);
    let light = Rgba([235, 235, 235, 255]);
    fill_rect_px(img, x, y, 7 * module, 7 * module, dark);
    fill_rect_px(img, x + module, y + module, 5 * module, 5 * module, light);
    fill_rect_px(img, x + 2 * module, y + 2 * module, 3 * module, 3 * module, dark);
}

fn fill_rect_px(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

/// Bresenham line, 3 pixels thick.
fn draw_line(img: &mut RgbaImage, a: (f32, f32), b: (f32, f32), color: Rgba<u8>) {
    let (mut x0, mut y0) = (a.0 as i64, a.1 as i64);
    let (x1, y1) = (b.0 as i64, b.1 as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        for oy in -1..=1 {
            for ox in -1..=1 {
                let (px, py) = (x0 + ox, y0 + oy);
                if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                    img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn jitter(a: u64, b: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    (a, b).hash(&mut hasher);
    hasher.finish()
}
