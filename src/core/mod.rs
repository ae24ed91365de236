//! Core overlay modules - geometry, points, sweep animation, draw sink
//!
//! These modules hold the scanning-overlay logic, independent of egui
//! widget plumbing.

pub mod geometry;
pub mod points;
pub mod surface;
pub mod sweep;

// Re-exports for convenience
pub use geometry::{GeometrySource, ScanGeometry, framing_rect, framing_rect_in_preview};
pub use points::{MAX_POINTS, PointFeed, PointTrail, ResultPoint, TrailFrame};
pub use surface::{DrawCmd, PainterSurface, RecordingSurface, Surface};
pub use sweep::SweepBeam;
