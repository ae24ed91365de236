//! Possible result points reported by the decoder while scanning.
//!
//! The decoder appends points from its own thread through a `PointFeed`
//! handle; the overlay drains them on the render thread once per live
//! frame via `PointTrail::rotate`. The shared buffer is the only
//! cross-thread state in the crate. Its mutex is held for the whole
//! append-and-trim and for the drain itself, never while drawing.

use std::sync::{Arc, Mutex};

/// Maximum points kept in the shared buffer; exceeding it trims to the
/// newest half.
pub const MAX_POINTS: usize = 20;

/// Candidate point in preview space, relative to the preview rect origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResultPoint {
    pub x: f32,
    pub y: f32,
}

impl ResultPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Cloneable producer handle for the shared possible-points buffer.
///
/// Safe to call from any thread; obtained via [`PointTrail::feed`].
#[derive(Clone)]
pub struct PointFeed {
    queue: Arc<Mutex<Vec<ResultPoint>>>,
}

impl PointFeed {
    /// Append a candidate point.
    ///
    /// When the push makes the buffer exceed [`MAX_POINTS`], the oldest
    /// entries are dropped down to the newest half-capacity.
    pub fn push(&self, point: ResultPoint) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.push(point);
        let len = queue.len();
        if len > MAX_POINTS {
            queue.drain(0..len - MAX_POINTS / 2);
        }
    }

    /// Number of points currently buffered.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Points drained for one render: the fresh generation plus the previous
/// one, which gets a single faint redraw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrailFrame {
    pub current: Vec<ResultPoint>,
    pub last: Vec<ResultPoint>,
}

/// Two-generation point trail: the shared "possible" buffer plus the
/// previous frame's generation.
pub struct PointTrail {
    queue: Arc<Mutex<Vec<ResultPoint>>>,
    last: Vec<ResultPoint>,
}

impl PointTrail {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(Vec::new())),
            last: Vec::new(),
        }
    }

    /// Producer handle for the decoder side.
    pub fn feed(&self) -> PointFeed {
        PointFeed {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Drain the shared buffer and rotate generations.
    ///
    /// The drained points become the next frame's "last" generation; when
    /// nothing arrived since the previous rotate, the old generation is
    /// returned one final time and then dropped.
    pub fn rotate(&mut self) -> TrailFrame {
        let current = {
            let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *queue)
        };
        let last = std::mem::take(&mut self.last);
        if !current.is_empty() {
            self.last = current.clone();
        }
        TrailFrame { current, last }
    }
}

impl Default for PointTrail {
    fn default() -> Self {
        Self::new()
    }
}
