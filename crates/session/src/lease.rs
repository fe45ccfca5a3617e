//! Frame leases — single-use ownership grants over decoded frames.
//!
//! The engine owns a bounded pool of frame buffers; every frame it hands
//! out must come back exactly once or the pool starves. A lease makes the
//! return path unforgeable: [`release`](FrameLease::release) consumes the
//! lease by value, and a lease that merely goes out of scope returns its
//! frame from `Drop`. There is no way to return the same frame twice.

use std::sync::Arc;

use parking_lot::Mutex;

use fg_common::{Resolution, TimestampUs};

use crate::engine::{DecodeEngine, DecodedFrame};
use crate::session::PipelineState;

/// Exclusive handle to one decoded frame.
///
/// The frame's pixel data stays inside the engine; the lease carries the
/// geometry and timestamp so callers can schedule presentation without
/// touching the pipeline lock.
pub struct FrameLease<E: DecodeEngine> {
    pipeline: Arc<Mutex<PipelineState<E>>>,
    frame: Option<E::Frame>,
    resolution: Resolution,
    pts: TimestampUs,
}

impl<E: DecodeEngine> FrameLease<E> {
    pub(crate) fn new(pipeline: Arc<Mutex<PipelineState<E>>>, frame: E::Frame) -> Self {
        let resolution = Resolution::new(frame.width(), frame.height());
        let pts = frame.timestamp();
        Self {
            pipeline,
            frame: Some(frame),
            resolution,
            pts,
        }
    }

    pub fn width(&self) -> u32 {
        self.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Presentation timestamp of the leased frame.
    pub fn timestamp(&self) -> TimestampUs {
        self.pts
    }

    /// Borrow the underlying frame. `None` once released.
    pub(crate) fn frame(&self) -> Option<&E::Frame> {
        self.frame.as_ref()
    }

    /// Return the frame to the engine.
    ///
    /// Consuming the lease is the release; dropping it without calling
    /// this has the same effect.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.pipeline.lock().release_lease_frame(frame);
        }
    }
}

impl<E: DecodeEngine> Drop for FrameLease<E> {
    fn drop(&mut self) {
        self.release_inner();
    }
}
