//! Viewfinder overlay widget - scan frame, sweep animation, result display
//!
//! Draws over the camera preview; decoder feedback arrives as candidate
//! points while scanning and as a result image once a decode lands.

mod viewfinder;
mod viewfinder_ui;

pub use viewfinder::{
    CURRENT_POINT_OPACITY,
    FRAME_INTERVAL,
    LAST_POINT_OPACITY,
    POINT_RADIUS,
    ViewfinderState,
    ViewfinderStyle,
};
pub use viewfinder_ui::{ensure_sweep_texture, paint, render};
