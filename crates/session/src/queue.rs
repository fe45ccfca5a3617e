//! Bounded FIFO of access units awaiting engine acceptance.
//!
//! Backpressure is explicit: the queue never blocks and never grows past
//! its capacity. Callers are expected to poll
//! [`has_capacity`](InputQueue::has_capacity) before enqueueing; a push
//! against a full queue is rejected, returning the unit to the caller.

use std::collections::VecDeque;

use fg_common::AccessUnit;

/// Bounded FIFO input queue.
///
/// Feed order is preserved; timestamps are not required to be monotonic.
#[derive(Debug)]
pub struct InputQueue {
    units: VecDeque<AccessUnit>,
    capacity: usize,
}

impl InputQueue {
    /// Create a queue with the given hard capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            units: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Whether another unit can be enqueued right now.
    pub fn has_capacity(&self) -> bool {
        self.units.len() < self.capacity
    }

    /// Append a unit in FIFO order. Rejects (returning the unit) if the
    /// queue is full.
    pub fn push(&mut self, unit: AccessUnit) -> Result<(), AccessUnit> {
        if self.units.len() >= self.capacity {
            return Err(unit);
        }
        self.units.push_back(unit);
        Ok(())
    }

    /// The unit the feed loop should offer to the engine next.
    pub fn front(&self) -> Option<&AccessUnit> {
        self.units.front()
    }

    /// Remove and return the front unit.
    pub fn pop_front(&mut self) -> Option<AccessUnit> {
        self.units.pop_front()
    }

    /// Drop every queued unit, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        let n = self.units.len();
        self.units.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use fg_common::TimestampUs;

    fn unit(pts: i64) -> AccessUnit {
        AccessUnit::new(vec![0u8; 8], TimestampUs::from_micros(pts))
    }

    // ── Construction ─────────────────────────────────────────────

    #[test]
    fn new_queue_is_empty() {
        let q = InputQueue::new(16);
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert_eq!(q.capacity(), 16);
        assert!(q.has_capacity());
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = InputQueue::new(0);
    }

    // ── Capacity / backpressure ──────────────────────────────────

    #[test]
    fn size_never_exceeds_capacity() {
        let mut q = InputQueue::new(16);
        for i in 0..16 {
            assert!(q.push(unit(i)).is_ok());
        }
        assert_eq!(q.len(), 16);
        assert!(!q.has_capacity());

        // The 17th push is rejected and the unit comes back.
        let rejected = q.push(unit(16));
        assert!(rejected.is_err());
        assert_eq!(rejected.unwrap_err().pts, TimestampUs::from_micros(16));
        assert_eq!(q.len(), 16);
    }

    #[test]
    fn pop_frees_capacity() {
        let mut q = InputQueue::new(2);
        q.push(unit(0)).unwrap();
        q.push(unit(1)).unwrap();
        assert!(!q.has_capacity());

        q.pop_front();
        assert!(q.has_capacity());
        assert!(q.push(unit(2)).is_ok());
    }

    // ── FIFO order ───────────────────────────────────────────────

    #[test]
    fn fifo_order_preserved() {
        let mut q = InputQueue::new(8);
        for i in [3, 1, 2] {
            q.push(unit(i)).unwrap();
        }
        // Non-monotonic timestamps are fine; feed order rules.
        assert_eq!(q.pop_front().unwrap().pts, TimestampUs::from_micros(3));
        assert_eq!(q.pop_front().unwrap().pts, TimestampUs::from_micros(1));
        assert_eq!(q.pop_front().unwrap().pts, TimestampUs::from_micros(2));
        assert!(q.pop_front().is_none());
    }

    #[test]
    fn front_does_not_consume() {
        let mut q = InputQueue::new(4);
        q.push(unit(7)).unwrap();
        assert_eq!(q.front().unwrap().pts, TimestampUs::from_micros(7));
        assert_eq!(q.len(), 1);
    }

    // ── Clear ────────────────────────────────────────────────────

    #[test]
    fn clear_reports_count() {
        let mut q = InputQueue::new(8);
        for i in 0..5 {
            q.push(unit(i)).unwrap();
        }
        assert_eq!(q.clear(), 5);
        assert!(q.is_empty());
        assert_eq!(q.clear(), 0);
    }
}
