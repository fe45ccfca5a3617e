//! Configuration for a decoder bridge session.

use serde::{Deserialize, Serialize};

/// Session configuration.
///
/// The defaults match the reference behavior: a 16-unit input queue and a
/// small bounded drain budget so a single dequeue call never does unbounded
/// work against the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Decode threads requested from the engine (0 = single-threaded).
    pub threads: u32,
    /// Input queue capacity in access units.
    pub max_pending_units: usize,
    /// Maximum number of extra drain-only engine calls per dequeue.
    pub drain_budget: usize,
    /// Maximum engine flush iterations before giving up (guards against
    /// an engine that keeps answering `Ok` during a flush).
    pub max_flush_iterations: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            max_pending_units: 16,
            drain_budget: 4,
            max_flush_iterations: 64,
        }
    }
}

impl SessionConfig {
    /// Config with an explicit thread hint, everything else default.
    pub fn with_threads(threads: u32) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }
}
