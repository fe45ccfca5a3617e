//! Core types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation timestamp in microseconds (signed 64-bit).
///
/// A timestamp may be absent; the reference value for "unset" is `-1`,
/// kept as a named constant so call sites never compare against a bare
/// sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimestampUs(pub i64);

impl TimestampUs {
    pub const ZERO: Self = Self(0);
    /// Sentinel for "no timestamp attached".
    pub const UNSET: Self = Self(-1);

    pub fn from_micros(us: i64) -> Self {
        Self(us)
    }

    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Whether a real timestamp is attached.
    pub fn is_set(self) -> bool {
        self.0 >= 0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl Default for TimestampUs {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Display for TimestampUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "{}us", self.0)
        } else {
            write!(f, "unset")
        }
    }
}

/// Video/image resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const HD: Self = Self {
        width: 1920,
        height: 1080,
    };
    pub const UHD: Self = Self {
        width: 3840,
        height: 2160,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Chroma plane dimensions for 4:2:0 subsampling (rounded up for
    /// odd luma dimensions).
    pub fn chroma_420(self) -> Self {
        Self {
            width: (self.width + 1) / 2,
            height: (self.height + 1) / 2,
        }
    }

    /// Tight byte size for 8-bit planar 4:2:0 pixel data (Y + U + V).
    pub fn yuv420_byte_size(self) -> usize {
        let y = self.width as usize * self.height as usize;
        let c = self.chroma_420();
        y + 2 * (c.width as usize * c.height as usize)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
