//! SCANVIEW - barcode scanner viewfinder overlay library
//!
//! Re-exports all modules for use by binary targets and embedders.

// Core overlay engine (geometry, points, sweep, draw sink)
pub mod core;

// App modules
pub mod cli;
pub mod shell;
pub mod widgets;

// Re-export commonly used types from core
pub use core::geometry::{framing_rect, GeometrySource, ScanGeometry};
pub use core::points::{PointFeed, ResultPoint};
pub use core::surface::{PainterSurface, RecordingSurface, Surface};

// Re-export the widget entry points
pub use widgets::viewfinder::{render, ViewfinderState, ViewfinderStyle};
