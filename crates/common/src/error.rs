//! Central error types for the bridge (thiserror-based).

use thiserror::Error;

use crate::color::PixelFormat;

/// Top-level bridge error.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Errors from session lifecycle and queueing operations.
///
/// `TryAgain` from the engine is deliberately absent: it is in-protocol
/// backpressure, absorbed by the feed/drain loop and never surfaced to
/// the caller. Per-unit decode failures are likewise recovered locally
/// (drop, count, continue).
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("input queue is full ({capacity} units pending)")]
    QueueFull { capacity: usize },

    #[error("allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },

    #[error("session is closed")]
    Closed,
}

impl SessionError {
    /// Whether the caller may retry the same operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}

/// Errors from rendering a leased frame into a surface.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no surface attached")]
    NoSurface,

    #[error("unsupported frame format: {bit_depth}-bit {format:?}")]
    UnsupportedFormat { bit_depth: u32, format: PixelFormat },

    #[error("surface buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    #[error("surface lock failed: {0}")]
    Lock(String),

    #[error("lease was already released")]
    LeaseReleased,
}
