//! The decoder session: lifecycle, feed/drain protocol, and diagnostics.
//!
//! One pipeline lock serializes the engine, both queues, the counters and
//! the lifecycle flag; the surface sink lives behind its own lock in
//! [`DecoderSession`] so rendering never contends with decoding. Every
//! entry point returns immediately: backpressure is reported, never
//! waited out.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use fg_common::{AccessUnit, RenderError, SessionConfig, SessionError, TimestampUs};

use crate::engine::{DecodeEngine, DecodedFrame, EngineStatus};
use crate::lease::FrameLease;
use crate::queue::InputQueue;
use crate::surface::{Surface, SurfaceSink};

/// One-way session lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Closed,
}

/// Observability counters for one session.
///
/// Snapshot semantics: [`DecoderSession::stats`] returns a copy taken
/// under the locks, internally consistent at that instant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Access units accepted into the input queue.
    pub units_enqueued: u64,
    /// Units the engine consumed (`Ok`/`Eof`).
    pub units_consumed: u64,
    /// Units the engine rejected as unrecoverable.
    pub units_failed: u64,
    /// Units discarded before the engine saw them (flush or close).
    pub units_not_decoded: u64,
    /// Units discarded specifically by `flush`.
    pub dropped_at_flush: u64,
    /// Feed attempts the engine answered with try-again.
    pub feed_try_again: u64,
    /// Frames handed to the caller as leases.
    pub frames_dequeued: u64,
    /// Frames copied into the surface target.
    pub frames_presented: u64,
    /// Leases still unreleased when the session closed.
    pub frames_force_released: u64,
    /// Leases currently held by the caller.
    pub leases_outstanding: u64,
    /// Timestamp of the last unit the engine consumed.
    pub last_in_pts: TimestampUs,
    /// Timestamp of the last frame handed out.
    pub last_out_pts: TimestampUs,
}

/// Everything the pipeline lock protects.
pub(crate) struct PipelineState<E: DecodeEngine> {
    /// `None` once the session closed and the handle was dropped.
    engine: Option<E>,
    pending: InputQueue,
    ready: VecDeque<E::Frame>,
    lifecycle: Lifecycle,
    eos: bool,
    stats: SessionStats,
}

impl<E: DecodeEngine> PipelineState<E> {
    fn new(engine: E, capacity: usize) -> Self {
        Self {
            engine: Some(engine),
            pending: InputQueue::new(capacity),
            ready: VecDeque::new(),
            lifecycle: Lifecycle::Active,
            eos: false,
            stats: SessionStats::default(),
        }
    }

    /// Feed queued units to the engine until it pushes back.
    ///
    /// On `TryAgain` the front unit stays queued for the next attempt. A
    /// unit the engine rejects is dropped and counted; decoding continues
    /// with the next one.
    fn pump(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        while let Some(unit) = self.pending.front() {
            let resp = engine.feed(Some(unit));
            match resp.status {
                EngineStatus::TryAgain => {
                    self.stats.feed_try_again += 1;
                    if let Some(frame) = resp.frame {
                        self.ready.push_back(frame);
                    }
                    break;
                }
                EngineStatus::Error => {
                    let unit = self.pending.pop_front().expect("front checked");
                    warn!(pts = %unit.pts, bytes = unit.len(), "engine rejected access unit, dropping");
                    self.stats.units_failed += 1;
                    // A frame returned alongside a failed unit is suspect;
                    // hand it straight back to the pool.
                    if let Some(frame) = resp.frame {
                        engine.release_frame(frame);
                    }
                }
                EngineStatus::Ok | EngineStatus::Eof => {
                    let unit = self.pending.pop_front().expect("front checked");
                    self.stats.units_consumed += 1;
                    self.stats.last_in_pts = unit.pts;
                    if let Some(frame) = resp.frame {
                        self.ready.push_back(frame);
                    }
                    if resp.status == EngineStatus::Eof {
                        break;
                    }
                }
            }
        }
    }

    /// Up to `budget` drain-only calls to pull out frames the engine is
    /// sitting on. Stops on the first call that yields no frame.
    fn drain(&mut self, budget: usize) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        for _ in 0..budget {
            let resp = engine.feed(None);
            match resp.status {
                EngineStatus::Ok => match resp.frame {
                    Some(frame) => self.ready.push_back(frame),
                    // Ok without a frame means no progress is coming from
                    // more drain calls right now.
                    None => break,
                },
                EngineStatus::TryAgain | EngineStatus::Eof => {
                    if let Some(frame) = resp.frame {
                        self.ready.push_back(frame);
                    }
                    break;
                }
                EngineStatus::Error => {
                    warn!("engine error during drain");
                    if let Some(frame) = resp.frame {
                        engine.release_frame(frame);
                    }
                    break;
                }
            }
        }
    }

    /// Return a leased frame to the engine pool. After close the engine
    /// is gone and the frame is simply dropped.
    pub(crate) fn release_lease_frame(&mut self, frame: E::Frame) {
        self.stats.leases_outstanding = self.stats.leases_outstanding.saturating_sub(1);
        match self.engine.as_mut() {
            Some(engine) => engine.release_frame(frame),
            None => drop(frame),
        }
    }

    fn flush(&mut self, max_iterations: usize) {
        if self.lifecycle == Lifecycle::Closed {
            return;
        }
        let dropped = self.pending.clear() as u64;
        self.stats.dropped_at_flush += dropped;
        self.stats.units_not_decoded += dropped;

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        while let Some(frame) = self.ready.pop_front() {
            engine.release_frame(frame);
        }
        // The engine keeps answering Ok while it still has state to shed;
        // the bound guards against one that never stops.
        for _ in 0..max_iterations {
            let resp = engine.flush();
            if let Some(frame) = resp.frame {
                engine.release_frame(frame);
            }
            if resp.status != EngineStatus::Ok {
                break;
            }
        }
        self.eos = false;
        info!(dropped_units = dropped, "session flushed");
    }

    /// Tear down the pipeline. Returns false if already closed.
    fn close(&mut self) -> bool {
        if self.lifecycle == Lifecycle::Closed {
            return false;
        }
        let pending = self.pending.clear() as u64;
        self.stats.units_not_decoded += pending;

        if let Some(mut engine) = self.engine.take() {
            while let Some(frame) = self.ready.pop_front() {
                engine.release_frame(frame);
            }
            // Dropping the handle closes the engine.
        }
        self.ready.clear();
        self.stats.frames_force_released += self.stats.leases_outstanding;
        self.lifecycle = Lifecycle::Closed;
        true
    }
}

/// A decoding session bridging a push-style unit source to a pull-style
/// frame consumer.
///
/// The session owns no threads; the caller's feed and render threads call
/// straight into it. All methods take `&self` and are safe to call from
/// any thread.
pub struct DecoderSession<E: DecodeEngine> {
    pipeline: Arc<Mutex<PipelineState<E>>>,
    sink: Mutex<SurfaceSink>,
    engine_version: String,
    config: SessionConfig,
}

impl<E: DecodeEngine> DecoderSession<E> {
    /// Wrap an already-opened engine.
    pub fn new(engine: E, config: SessionConfig) -> Self {
        let engine_version = engine.version();
        info!(
            version = %engine_version,
            threads = config.threads,
            capacity = config.max_pending_units,
            "decoder session created"
        );
        Self {
            pipeline: Arc::new(Mutex::new(PipelineState::new(
                engine,
                config.max_pending_units,
            ))),
            sink: Mutex::new(SurfaceSink::default()),
            engine_version,
            config,
        }
    }

    /// Copy one compressed access unit into the input queue and advance
    /// the feed protocol.
    ///
    /// Returns [`SessionError::QueueFull`] when the queue is at capacity;
    /// the caller should drain frames and retry. The payload is only
    /// copied after the capacity check passes.
    pub fn enqueue(&self, payload: &[u8], pts: TimestampUs) -> Result<(), SessionError> {
        if payload.is_empty() {
            return Err(SessionError::InvalidArgument("empty access unit payload"));
        }
        let mut pl = self.pipeline.lock();
        if pl.lifecycle == Lifecycle::Closed {
            return Err(SessionError::Closed);
        }
        if !pl.pending.has_capacity() {
            return Err(SessionError::QueueFull {
                capacity: pl.pending.capacity(),
            });
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(payload.len())
            .map_err(|_| SessionError::AllocationFailed {
                bytes: payload.len(),
            })?;
        buf.extend_from_slice(payload);

        let capacity = pl.pending.capacity();
        pl.pending
            .push(AccessUnit::new(buf, pts))
            .map_err(|_| SessionError::QueueFull { capacity })?;
        pl.stats.units_enqueued += 1;
        debug!(%pts, bytes = payload.len(), queued = pl.pending.len(), "access unit enqueued");

        pl.pump();
        Ok(())
    }

    /// Whether `enqueue` would currently be accepted.
    pub fn has_capacity(&self) -> bool {
        let pl = self.pipeline.lock();
        pl.lifecycle == Lifecycle::Active && pl.pending.has_capacity()
    }

    /// Pull the next decoded frame, if any is ready.
    ///
    /// Advances the feed protocol first, then spends at most the
    /// configured drain budget coaxing buffered output from the engine.
    /// Returns `None` when no frame is available yet (or after close).
    pub fn dequeue_frame(&self) -> Option<FrameLease<E>> {
        let mut pl = self.pipeline.lock();
        if pl.lifecycle == Lifecycle::Closed {
            return None;
        }
        pl.pump();
        if pl.ready.is_empty() {
            pl.drain(self.config.drain_budget);
        }
        let frame = pl.ready.pop_front()?;
        pl.stats.frames_dequeued += 1;
        pl.stats.last_out_pts = frame.timestamp();
        pl.stats.leases_outstanding += 1;
        debug!(pts = %frame.timestamp(), "frame dequeued");
        drop(pl);
        Some(FrameLease::new(Arc::clone(&self.pipeline), frame))
    }

    /// Copy a leased frame into the attached surface and present it.
    ///
    /// Takes only the surface lock; a concurrent feed thread is never
    /// blocked by rendering.
    pub fn render(&self, lease: &FrameLease<E>) -> Result<(), RenderError> {
        let frame = lease.frame().ok_or(RenderError::LeaseReleased)?;
        self.sink.lock().present(frame)
    }

    /// Attach, replace or detach the render target. The previous target
    /// is released and cached geometry is reset.
    pub fn set_surface(&self, surface: Option<Box<dyn Surface>>) {
        let closed = self.pipeline.lock().lifecycle == Lifecycle::Closed;
        if closed {
            warn!("set_surface on a closed session, ignoring");
            return;
        }
        self.sink.lock().set_target(surface);
    }

    /// Whether a render target is currently attached.
    pub fn has_surface(&self) -> bool {
        self.sink.lock().has_target()
    }

    /// Discard all in-flight data for a seek: pending units, ready
    /// frames, engine-internal state. Outstanding leases stay valid. The
    /// EOS flag is cleared. No-op once closed.
    pub fn flush(&self) {
        self.pipeline.lock().flush(self.config.max_flush_iterations);
    }

    /// Mark that no further input will arrive for this stream.
    pub fn signal_eof(&self) {
        let mut pl = self.pipeline.lock();
        if pl.lifecycle == Lifecycle::Closed {
            return;
        }
        if !pl.eos {
            debug!("end of stream signaled");
        }
        pl.eos = true;
    }

    pub fn is_eos(&self) -> bool {
        self.pipeline.lock().eos
    }

    /// Tear the session down. Idempotent; every other entry point is
    /// defined (and inert) afterwards. Outstanding leases become inert
    /// and are counted as force-released.
    pub fn close(&self) {
        let stats = {
            let mut pl = self.pipeline.lock();
            if !pl.close() {
                return;
            }
            pl.stats
        };
        let mut sink = self.sink.lock();
        let frames_presented = sink.frames_presented();
        sink.set_target(None);
        info!(
            units_enqueued = stats.units_enqueued,
            units_consumed = stats.units_consumed,
            units_failed = stats.units_failed,
            units_not_decoded = stats.units_not_decoded,
            dropped_at_flush = stats.dropped_at_flush,
            frames_dequeued = stats.frames_dequeued,
            frames_presented,
            frames_force_released = stats.frames_force_released,
            last_in_pts = %stats.last_in_pts,
            last_out_pts = %stats.last_out_pts,
            "decoder session closed"
        );
    }

    /// Engine/library version, captured at construction so it stays
    /// answerable after close.
    pub fn version(&self) -> &str {
        &self.engine_version
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the diagnostic counters.
    pub fn stats(&self) -> SessionStats {
        let mut stats = self.pipeline.lock().stats;
        stats.frames_presented = self.sink.lock().frames_presented();
        stats
    }
}

impl<E: DecodeEngine> Drop for DecoderSession<E> {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Tests ────────────────────────────────────────────────────────────
