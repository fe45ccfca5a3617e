//! `fg-session` — Bridges a block-oriented, backpressure-sensitive decoding
//! engine to a pull-based playback pipeline.
//!
//! The session buffers compressed access units with bounded capacity and
//! explicit backpressure, drives a non-blocking feed/drain protocol against
//! the engine's try-again/EOF semantics, hands decoded frames to the caller
//! as single-use leases, and renders leased frames into a lockable surface
//! with stride-aware plane copies.
//!
//! # Architecture
//!
//! The session has no threads of its own: caller threads (typically one
//! feed thread and one render thread) invoke it directly. All engine
//! interaction is serialized by one pipeline lock; the surface target sits
//! behind an independent lock so render cadence never waits on decode
//! cadence.
//!
//! ## Module overview
//!
//! - [`engine`] — the `DecodeEngine` facade trait the session drives
//! - [`queue`] — bounded FIFO of pending access units
//! - [`lease`] — single-use ownership grant over one decoded frame
//! - [`surface`] — lockable render target and planar pixel copy
//! - [`session`] — the session itself: lifecycle, protocol, diagnostics
//!
//! ## Usage
//!
//! ```ignore
//! use fg_common::{SessionConfig, TimestampUs};
//! use fg_session::DecoderSession;
//!
//! let engine = MyEngine::open(config.threads)?;
//! let session = DecoderSession::new(engine, SessionConfig::default());
//!
//! while session.has_capacity() {
//!     session.enqueue(&unit_bytes, TimestampUs::from_micros(pts))?;
//! }
//! if let Some(lease) = session.dequeue_frame() {
//!     session.render(&lease)?;
//!     lease.release();
//! }
//! ```

pub mod engine;
pub mod lease;
pub mod queue;
pub mod session;
pub mod surface;

// Re-export commonly used items at crate root
pub use engine::{DecodeEngine, DecodedFrame, EngineResponse, EngineStatus, FramePlane};
pub use lease::FrameLease;
pub use queue::InputQueue;
pub use session::{DecoderSession, SessionStats};
pub use surface::{BufferSurface, Surface, SurfaceBuffer};
