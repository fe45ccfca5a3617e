//! Pixel layout types for decoded frames and render targets.

use serde::{Deserialize, Serialize};

/// Pixel format of a decoded frame as reported by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0 — three separate planes, chroma at half resolution
    /// both ways. The supported render fast path at 8-bit depth.
    Yuv420Planar,
    /// Planar YUV 4:2:2 — chroma at half horizontal resolution.
    Yuv422Planar,
    /// Planar YUV 4:4:4 — full-resolution chroma.
    Yuv444Planar,
    /// NV12: Y plane + interleaved UV at half resolution.
    Nv12,
}

impl PixelFormat {
    pub fn is_planar(self) -> bool {
        matches!(self, Self::Yuv420Planar | Self::Yuv422Planar | Self::Yuv444Planar)
    }

    /// Number of separately addressable planes.
    pub fn plane_count(self) -> usize {
        match self {
            Self::Yuv420Planar | Self::Yuv422Planar | Self::Yuv444Planar => 3,
            Self::Nv12 => 2,
        }
    }
}

/// Pixel layout of a render target's locked buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceFormat {
    /// YV12: planar 4:2:0 with the V plane stored before the U plane and
    /// chroma rows padded to a 16-byte aligned stride.
    Yv12,
}

impl SurfaceFormat {
    /// FourCC code of this layout.
    pub fn fourcc(self) -> u32 {
        match self {
            // 'YV12'
            Self::Yv12 => 0x3231_5659,
        }
    }

    /// Chroma row stride for a given luma row stride.
    pub fn chroma_stride(self, luma_stride: usize) -> usize {
        match self {
            Self::Yv12 => ((luma_stride / 2) + 15) & !15,
        }
    }

    /// Total buffer size in bytes for the given geometry and luma stride.
    pub fn buffer_size(self, width: u32, height: u32, luma_stride: usize) -> usize {
        match self {
            Self::Yv12 => {
                let chroma_h = ((height + 1) / 2) as usize;
                let _ = width;
                luma_stride * height as usize + 2 * self.chroma_stride(luma_stride) * chroma_h
            }
        }
    }
}
