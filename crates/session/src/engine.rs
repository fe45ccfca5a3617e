//! Engine facade — the seam between the session and an opaque decoder.
//!
//! The engine is an external library with try-again/EOF semantics: it may
//! buffer several access units internally before emitting a frame
//! (lookahead/reordering), and it may refuse further input until output is
//! consumed (bounded internal frame pool). The session only ever talks to
//! it through [`DecodeEngine`].
//!
//! Closing the engine is expressed as `Drop`: the engine value is a
//! single-owner handle, so a freed handle is unreachable rather than
//! guarded by sentinel checks.

use fg_common::{AccessUnit, PixelFormat, TimestampUs};

/// Status of one engine call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// Input was accepted (or the drain call made progress).
    Ok,
    /// The engine needs output drained before it accepts more input.
    TryAgain,
    /// No further input is accepted for the current stream segment.
    Eof,
    /// The supplied unit is unrecoverable.
    Error,
}

/// Result of one `feed`/`flush` call: a status plus an optional frame the
/// engine emitted alongside it.
#[derive(Debug)]
pub struct EngineResponse<F> {
    pub status: EngineStatus,
    pub frame: Option<F>,
}

impl<F> EngineResponse<F> {
    pub fn ok(frame: Option<F>) -> Self {
        Self {
            status: EngineStatus::Ok,
            frame,
        }
    }

    pub fn try_again(frame: Option<F>) -> Self {
        Self {
            status: EngineStatus::TryAgain,
            frame,
        }
    }

    pub fn eof(frame: Option<F>) -> Self {
        Self {
            status: EngineStatus::Eof,
            frame,
        }
    }

    pub fn error(frame: Option<F>) -> Self {
        Self {
            status: EngineStatus::Error,
            frame,
        }
    }
}

/// One pixel plane of a decoded frame: a borrowed byte slice plus its row
/// stride. Rows are `stride` bytes apart; only the leading `width` bytes of
/// each row carry pixels.
#[derive(Copy, Clone, Debug)]
pub struct FramePlane<'a> {
    pub data: &'a [u8],
    pub stride: usize,
}

/// A decoded picture owned by the engine and exposed by reference.
///
/// Frames are never copied by the session; they move from the engine
/// through the output queue into a [`FrameLease`](crate::lease::FrameLease)
/// and back to the engine on release.
pub trait DecodedFrame {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Bits per sample (8 for the supported render fast path).
    fn bit_depth(&self) -> u32;
    fn pixel_format(&self) -> PixelFormat;
    fn timestamp(&self) -> TimestampUs;
    /// Plane `index` in Y, U, V order for planar formats.
    fn plane(&self, index: usize) -> FramePlane<'_>;
}

/// The decoding engine consumed by the session.
///
/// All calls are non-blocking. The session serializes access behind its
/// pipeline lock; implementations need not be thread-safe themselves.
pub trait DecodeEngine {
    type Frame: DecodedFrame;

    /// Feed one access unit, or drain output with `None`.
    ///
    /// On `TryAgain` the unit was **not** consumed and must be re-offered
    /// after output is drained. On `Ok`/`Eof`/`Error` the unit is done
    /// with. Any status may carry a frame alongside.
    fn feed(&mut self, unit: Option<&AccessUnit>) -> EngineResponse<Self::Frame>;

    /// Discard internal state and surrender buffered frames. Repeatable;
    /// the engine keeps answering until it reports non-`Ok`.
    fn flush(&mut self) -> EngineResponse<Self::Frame>;

    /// Return a frame to the engine's pool. Called exactly once per frame
    /// the engine handed out.
    fn release_frame(&mut self, frame: Self::Frame);

    /// Human-readable engine/library version string.
    fn version(&self) -> String;
}
