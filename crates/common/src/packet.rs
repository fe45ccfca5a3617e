//! Access units — compressed input to the decoder session.

use crate::types::TimestampUs;

/// One coded bitstream packet plus its presentation timestamp.
///
/// Owned by the input queue from enqueue until the feed loop consumes it,
/// drops it, or the session closes.
#[derive(Clone, Debug)]
pub struct AccessUnit {
    /// Compressed payload bytes.
    pub payload: Vec<u8>,
    /// Presentation timestamp (may be `TimestampUs::UNSET`).
    pub pts: TimestampUs,
}

impl AccessUnit {
    pub fn new(payload: Vec<u8>, pts: TimestampUs) -> Self {
        Self { payload, pts }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_holds_payload_and_pts() {
        let au = AccessUnit::new(vec![1, 2, 3], TimestampUs::from_micros(40_000));
        assert_eq!(au.len(), 3);
        assert!(!au.is_empty());
        assert_eq!(au.pts.as_micros(), 40_000);
    }
}
