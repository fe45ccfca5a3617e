//! Surface sink — renders decoded planes into a lockable pixel target.
//!
//! The target's geometry can change at any time (window resize, format
//! renegotiation), so the sink caches the last configured geometry and
//! only reconfigures when the incoming frame differs. Plane copies honor
//! the destination row stride and zero-fill trailing pad bytes so a
//! partially reused buffer never shows stale pixels.

use tracing::{debug, warn};

use fg_common::{PixelFormat, RenderError, SurfaceFormat};

use crate::engine::{DecodedFrame, FramePlane};

/// A locked surface buffer: the writable bytes plus the luma row stride
/// the target chose.
#[derive(Debug)]
pub struct SurfaceBuffer<'a> {
    pub data: &'a mut [u8],
    pub stride: usize,
}

/// A lockable render target with reconfigurable geometry.
///
/// Implementations wrap whatever the platform hands out (a native window,
/// a shared texture, a plain buffer). All calls arrive serialized under
/// the sink's lock.
pub trait Surface: Send {
    /// Set the target's geometry. Only called when it actually changed.
    fn configure(
        &mut self,
        width: u32,
        height: u32,
        format: SurfaceFormat,
    ) -> Result<(), RenderError>;

    /// Lock the pixel buffer for writing.
    fn lock(&mut self) -> Result<SurfaceBuffer<'_>, RenderError>;

    /// Unlock the buffer and queue it for presentation.
    fn unlock_and_present(&mut self);
}

/// The session's render target slot: optional surface, cached geometry,
/// and the presented-frame counter.
///
/// Guarded by its own lock in the session, independent of the pipeline
/// lock, so rendering never waits on decode progress.
#[derive(Default)]
pub(crate) struct SurfaceSink {
    target: Option<Box<dyn Surface>>,
    configured: Option<(u32, u32, SurfaceFormat)>,
    frames_presented: u64,
}

impl SurfaceSink {
    /// Replace the target. The previous one (if any) is released and the
    /// cached geometry is reset so the next render reconfigures.
    pub(crate) fn set_target(&mut self, target: Option<Box<dyn Surface>>) {
        let had = self.target.is_some();
        self.target = target;
        self.configured = None;
        debug!(
            attached = self.target.is_some(),
            replaced = had,
            "surface target updated"
        );
    }

    pub(crate) fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Copy a decoded frame's planes into the target and present it.
    ///
    /// Only the 8-bit planar 4:2:0 fast path is supported; anything else
    /// fails with `UnsupportedFormat` before the target is touched.
    pub(crate) fn present<F: DecodedFrame>(&mut self, frame: &F) -> Result<(), RenderError> {
        if frame.bit_depth() != 8 || frame.pixel_format() != PixelFormat::Yuv420Planar {
            warn!(
                bit_depth = frame.bit_depth(),
                format = ?frame.pixel_format(),
                "frame format outside the render fast path"
            );
            return Err(RenderError::UnsupportedFormat {
                bit_depth: frame.bit_depth(),
                format: frame.pixel_format(),
            });
        }

        let target = self.target.as_mut().ok_or(RenderError::NoSurface)?;

        let width = frame.width();
        let height = frame.height();
        let format = SurfaceFormat::Yv12;

        if self.configured != Some((width, height, format)) {
            target.configure(width, height, format)?;
            self.configured = Some((width, height, format));
            debug!(%width, %height, ?format, "surface geometry reconfigured");
        }

        {
            let buf = target.lock()?;
            blit_yuv420_to_yv12(frame, buf.data, buf.stride)?;
        }
        target.unlock_and_present();
        self.frames_presented += 1;
        Ok(())
    }
}

/// Copy the three planes of an 8-bit 4:2:0 frame into a YV12 buffer
/// (Y plane, then V, then U, chroma rows on a 16-byte aligned stride).
fn blit_yuv420_to_yv12<F: DecodedFrame>(
    frame: &F,
    dst: &mut [u8],
    luma_stride: usize,
) -> Result<(), RenderError> {
    let w = frame.width() as usize;
    let h = frame.height() as usize;
    let chroma = fg_common::Resolution::new(frame.width(), frame.height()).chroma_420();
    let (cw, ch) = (chroma.width as usize, chroma.height as usize);
    let chroma_stride = SurfaceFormat::Yv12.chroma_stride(luma_stride);

    if luma_stride < w || chroma_stride < cw {
        return Err(RenderError::Lock(format!(
            "target stride {luma_stride} narrower than frame width {w}"
        )));
    }

    let needed = SurfaceFormat::Yv12.buffer_size(frame.width(), frame.height(), luma_stride);
    if dst.len() < needed {
        return Err(RenderError::BufferTooSmall {
            needed,
            got: dst.len(),
        });
    }

    let (y_region, rest) = dst.split_at_mut(luma_stride * h);
    let (v_region, u_region) = rest.split_at_mut(chroma_stride * ch);

    copy_plane(y_region, luma_stride, frame.plane(0), w, h);
    // YV12 stores V before U.
    copy_plane(v_region, chroma_stride, frame.plane(2), cw, ch);
    copy_plane(u_region, chroma_stride, frame.plane(1), cw, ch);

    Ok(())
}

/// Row-by-row plane copy honoring both strides, zero-filling destination
/// pad bytes past the tight row width.
fn copy_plane(dst: &mut [u8], dst_stride: usize, src: FramePlane<'_>, width: usize, rows: usize) {
    for r in 0..rows {
        let src_start = r * src.stride;
        let dst_start = r * dst_stride;
        if src_start + width > src.data.len() || dst_start + dst_stride > dst.len() {
            break;
        }
        let dst_row = &mut dst[dst_start..dst_start + dst_stride];
        dst_row[..width].copy_from_slice(&src.data[src_start..src_start + width]);
        dst_row[width..].fill(0);
    }
}

/// In-memory [`Surface`] with a configurable stride alignment.
///
/// Useful for headless callers and tests: it behaves like a real lockable
/// target (geometry, stride, lock/present accounting) but renders into a
/// plain byte buffer that can be inspected afterwards.
#[derive(Debug)]
pub struct BufferSurface {
    buffer: Vec<u8>,
    stride: usize,
    stride_align: usize,
    geometry: Option<(u32, u32, SurfaceFormat)>,
    configure_calls: u64,
    present_calls: u64,
}

impl BufferSurface {
    /// A surface whose luma stride is the tight row width.
    pub fn new() -> Self {
        Self::with_stride_align(1)
    }

    /// A surface that pads each luma row up to a multiple of `align`.
    ///
    /// # Panics
    ///
    /// Panics if `align` is zero.
    pub fn with_stride_align(align: usize) -> Self {
        assert!(align > 0, "stride alignment must be > 0");
        Self {
            buffer: Vec::new(),
            stride: 0,
            stride_align: align,
            geometry: None,
            configure_calls: 0,
            present_calls: 0,
        }
    }

    /// The rendered bytes (valid after a present).
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Current luma row stride.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn geometry(&self) -> Option<(u32, u32, SurfaceFormat)> {
        self.geometry
    }

    /// How many times `configure` was invoked.
    pub fn configure_calls(&self) -> u64 {
        self.configure_calls
    }

    /// How many frames were presented.
    pub fn present_calls(&self) -> u64 {
        self.present_calls
    }
}

impl Default for BufferSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for BufferSurface {
    fn configure(
        &mut self,
        width: u32,
        height: u32,
        format: SurfaceFormat,
    ) -> Result<(), RenderError> {
        self.configure_calls += 1;
        let stride = (width as usize).div_ceil(self.stride_align) * self.stride_align;
        self.stride = stride;
        self.buffer
            .resize(format.buffer_size(width, height, stride), 0);
        self.geometry = Some((width, height, format));
        Ok(())
    }

    fn lock(&mut self) -> Result<SurfaceBuffer<'_>, RenderError> {
        if self.geometry.is_none() {
            return Err(RenderError::Lock("surface not configured".into()));
        }
        Ok(SurfaceBuffer {
            data: &mut self.buffer,
            stride: self.stride,
        })
    }

    fn unlock_and_present(&mut self) {
        self.present_calls += 1;
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use fg_common::TimestampUs;

    /// Minimal 8-bit 4:2:0 frame backed by owned plane buffers.
    struct TestFrame {
        width: u32,
        height: u32,
        bit_depth: u32,
        format: PixelFormat,
        planes: [Vec<u8>; 3],
        strides: [usize; 3],
    }

    impl TestFrame {
        /// Planes filled with distinct byte values, with source rows padded
        /// by 2 bytes so stride-aware reads are exercised.
        fn yuv420(width: u32, height: u32) -> Self {
            let (cw, ch) = ((width as usize + 1) / 2, (height as usize + 1) / 2);
            let (w, h) = (width as usize, height as usize);
            let y_stride = w + 2;
            let c_stride = cw + 2;
            Self {
                width,
                height,
                bit_depth: 8,
                format: PixelFormat::Yuv420Planar,
                planes: [
                    vec![0x11; y_stride * h],
                    vec![0x22; c_stride * ch],
                    vec![0x33; c_stride * ch],
                ],
                strides: [y_stride, c_stride, c_stride],
            }
        }
    }

    impl DecodedFrame for TestFrame {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn bit_depth(&self) -> u32 {
            self.bit_depth
        }
        fn pixel_format(&self) -> PixelFormat {
            self.format
        }
        fn timestamp(&self) -> TimestampUs {
            TimestampUs::ZERO
        }
        fn plane(&self, index: usize) -> FramePlane<'_> {
            FramePlane {
                data: &self.planes[index],
                stride: self.strides[index],
            }
        }
    }

    fn sink_with_surface(align: usize) -> SurfaceSink {
        let mut sink = SurfaceSink::default();
        sink.set_target(Some(Box::new(BufferSurface::with_stride_align(align))));
        sink
    }

    // ── Plane copy ───────────────────────────────────────────────

    #[test]
    fn copy_plane_zero_fills_padding() {
        let src_data = vec![0xAB; 4 * 10];
        let src = FramePlane {
            data: &src_data,
            stride: 10,
        };
        let mut dst = vec![0xFF; 4 * 16];

        copy_plane(&mut dst, 16, src, 10, 4);

        for r in 0..4 {
            let row = &dst[r * 16..(r + 1) * 16];
            assert!(row[..10].iter().all(|&b| b == 0xAB), "row {r} pixels");
            assert!(row[10..].iter().all(|&b| b == 0), "row {r} padding");
        }
    }

    #[test]
    fn copy_plane_respects_source_stride() {
        // 2 rows, width 3, source stride 5: pad bytes must not leak.
        let src_data = vec![1, 2, 3, 9, 9, 4, 5, 6, 9, 9];
        let src = FramePlane {
            data: &src_data,
            stride: 5,
        };
        let mut dst = vec![0u8; 2 * 4];

        copy_plane(&mut dst, 4, src, 3, 2);

        assert_eq!(&dst[..4], &[1, 2, 3, 0]);
        assert_eq!(&dst[4..], &[4, 5, 6, 0]);
    }

    #[test]
    fn copy_plane_stops_at_short_source() {
        let src_data = vec![7u8; 4];
        let src = FramePlane {
            data: &src_data,
            stride: 4,
        };
        let mut dst = vec![0u8; 12];

        // Source only covers one row of the three requested.
        copy_plane(&mut dst, 4, src, 4, 3);
        assert_eq!(&dst[..4], &[7, 7, 7, 7]);
        assert!(dst[4..].iter().all(|&b| b == 0));
    }

    // ── Sink format gate ─────────────────────────────────────────

    #[test]
    fn present_without_target_is_no_device() {
        let mut sink = SurfaceSink::default();
        let frame = TestFrame::yuv420(16, 16);
        assert!(matches!(
            sink.present(&frame),
            Err(RenderError::NoSurface)
        ));
    }

    #[test]
    fn present_rejects_high_bit_depth() {
        let mut sink = sink_with_surface(16);
        let mut frame = TestFrame::yuv420(16, 16);
        frame.bit_depth = 10;
        assert!(matches!(
            sink.present(&frame),
            Err(RenderError::UnsupportedFormat { bit_depth: 10, .. })
        ));
    }

    #[test]
    fn present_rejects_non_420() {
        let mut sink = sink_with_surface(16);
        let mut frame = TestFrame::yuv420(16, 16);
        frame.format = PixelFormat::Nv12;
        assert!(matches!(
            sink.present(&frame),
            Err(RenderError::UnsupportedFormat { .. })
        ));
    }

    // ── Geometry caching ─────────────────────────────────────────

    #[test]
    fn geometry_configured_lazily_once() {
        use std::sync::atomic::{AtomicU64, Ordering};
        use std::sync::Arc;

        struct Counting {
            inner: BufferSurface,
            configures: Arc<AtomicU64>,
        }
        impl Surface for Counting {
            fn configure(
                &mut self,
                w: u32,
                h: u32,
                f: SurfaceFormat,
            ) -> Result<(), RenderError> {
                self.configures.fetch_add(1, Ordering::Relaxed);
                self.inner.configure(w, h, f)
            }
            fn lock(&mut self) -> Result<SurfaceBuffer<'_>, RenderError> {
                self.inner.lock()
            }
            fn unlock_and_present(&mut self) {
                self.inner.unlock_and_present();
            }
        }

        let configures = Arc::new(AtomicU64::new(0));
        let mut sink = SurfaceSink::default();
        sink.set_target(Some(Box::new(Counting {
            inner: BufferSurface::with_stride_align(16),
            configures: configures.clone(),
        })));

        let frame = TestFrame::yuv420(32, 16);
        sink.present(&frame).unwrap();
        sink.present(&frame).unwrap();
        sink.present(&frame).unwrap();
        assert_eq!(configures.load(Ordering::Relaxed), 1);

        // A different geometry reconfigures exactly once more.
        let bigger = TestFrame::yuv420(64, 32);
        sink.present(&bigger).unwrap();
        assert_eq!(configures.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn replacing_target_resets_geometry_cache() {
        let mut sink = sink_with_surface(16);
        let frame = TestFrame::yuv420(32, 16);
        sink.present(&frame).unwrap();

        sink.set_target(Some(Box::new(BufferSurface::with_stride_align(16))));
        // Same geometry must reconfigure the fresh target.
        sink.present(&frame).unwrap();
        assert_eq!(sink.frames_presented(), 2);
    }

    // ── Full blit ────────────────────────────────────────────────

    #[test]
    fn blit_writes_yv12_layout_with_padding() {
        // Width 10 with 16-alignment: luma stride 16, 6 pad bytes per row.
        let mut surface = BufferSurface::with_stride_align(16);
        let frame = TestFrame::yuv420(10, 4);

        surface.configure(10, 4, SurfaceFormat::Yv12).unwrap();
        let stride = surface.stride();
        assert_eq!(stride, 16);
        {
            let buf = surface.lock().unwrap();
            blit_yuv420_to_yv12(&frame, buf.data, stride).unwrap();
        }
        surface.unlock_and_present();

        let chroma_stride = SurfaceFormat::Yv12.chroma_stride(stride);
        let data = surface.data();

        // Y rows: 10 pixel bytes then zeros.
        for r in 0..4 {
            let row = &data[r * stride..r * stride + stride];
            assert!(row[..10].iter().all(|&b| b == 0x11));
            assert!(row[10..].iter().all(|&b| b == 0));
        }
        // V plane precedes U in YV12.
        let v_base = stride * 4;
        let u_base = v_base + chroma_stride * 2;
        for r in 0..2 {
            let v_row = &data[v_base + r * chroma_stride..v_base + r * chroma_stride + 5];
            let u_row = &data[u_base + r * chroma_stride..u_base + r * chroma_stride + 5];
            assert!(v_row.iter().all(|&b| b == 0x33));
            assert!(u_row.iter().all(|&b| b == 0x22));
        }
    }

    #[test]
    fn blit_rejects_undersized_buffer() {
        let frame = TestFrame::yuv420(16, 16);
        let mut tiny = vec![0u8; 64];
        assert!(matches!(
            blit_yuv420_to_yv12(&frame, &mut tiny, 16),
            Err(RenderError::BufferTooSmall { .. })
        ));
    }

    // ── BufferSurface ────────────────────────────────────────────

    #[test]
    fn buffer_surface_lock_before_configure_fails() {
        let mut s = BufferSurface::new();
        assert!(matches!(s.lock(), Err(RenderError::Lock(_))));
    }

    #[test]
    fn buffer_surface_counts_presents() {
        let mut s = BufferSurface::new();
        s.configure(8, 8, SurfaceFormat::Yv12).unwrap();
        s.unlock_and_present();
        s.unlock_and_present();
        assert_eq!(s.present_calls(), 2);
        assert_eq!(s.configure_calls(), 1);
    }

    #[test]
    #[should_panic(expected = "stride alignment must be > 0")]
    fn zero_alignment_panics() {
        let _ = BufferSurface::with_stride_align(0);
    }
}
