//! Color types, RGB → YCbCr conversion and planar channel buffers.
//!
//! The encoder works on planes: one buffer of 8-bit samples per component,
//! padded so that every plane tiles exactly into 8×8 blocks.

use crate::error::{Error, Result};

/// Pixel layout of the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    /// Grayscale, 1 byte per pixel.
    Gray,
    /// Interleaved RGB, 3 bytes per pixel.
    Rgb,
}

impl ColorType {
    /// Map a raw channel count onto a color type.
    ///
    /// Only 1 (gray) and 3 (RGB) are encodable as baseline JPEG.
    pub fn from_channels(channels: u8) -> Result<Self> {
        match channels {
            1 => Ok(ColorType::Gray),
            3 => Ok(ColorType::Rgb),
            n => Err(Error::InvalidChannelCount(n)),
        }
    }

    /// Bytes per pixel in the input buffer.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Gray => 1,
            ColorType::Rgb => 3,
        }
    }

    /// Number of components written to the frame header.
    #[inline]
    pub const fn num_components(self) -> u8 {
        self.bytes_per_pixel() as u8
    }
}

/// Convert one RGB pixel to YCbCr (JFIF / BT.601 full range).
///
/// Each component is rounded to nearest and clamped to `[0, 255]`.
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32;
    let g = g as f32;
    let b = b as f32;

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;

    (clamp_u8(y), clamp_u8(cb), clamp_u8(cr))
}

#[inline]
fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// One component's samples, padded to whole 8×8 blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    /// Padded width in samples (multiple of 8).
    pub width: usize,
    /// Padded height in samples (multiple of 8).
    pub height: usize,
    /// Row-major samples.
    pub data: Vec<u8>,
}

impl Plane {
    /// Copy a grayscale image into a plane of `padded_width × padded_height`,
    /// replicating the last column and row into the padding.
    ///
    /// The caller guarantees a non-empty image.
    pub(crate) fn from_gray(
        data: &[u8],
        width: usize,
        height: usize,
        padded_width: usize,
        padded_height: usize,
    ) -> Self {
        debug_assert!(width > 0 && height > 0);
        debug_assert!(padded_width >= width && padded_height >= height);
        let mut out = Vec::with_capacity(padded_width * padded_height);
        for y in 0..padded_height {
            let row = &data[y.min(height - 1) * width..][..width];
            out.extend_from_slice(row);
            let last = row[width - 1];
            out.resize(out.len() + (padded_width - width), last);
        }
        Self {
            width: padded_width,
            height: padded_height,
            data: out,
        }
    }

    /// Halve the plane in both directions by averaging each 2×2 group
    /// (rounded to nearest).
    pub fn downsample_2x2(&self) -> Self {
        let width = self.width / 2;
        let height = self.height / 2;
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            let top = &self.data[(2 * y) * self.width..][..self.width];
            let bottom = &self.data[(2 * y + 1) * self.width..][..self.width];
            for x in 0..width {
                let sum = top[2 * x] as u16
                    + top[2 * x + 1] as u16
                    + bottom[2 * x] as u16
                    + bottom[2 * x + 1] as u16;
                data.push(((sum + 2) / 4) as u8);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Number of 8×8 blocks per row.
    #[inline]
    pub fn blocks_wide(&self) -> usize {
        self.width / 8
    }

    /// Number of 8×8 block rows.
    #[inline]
    pub fn blocks_high(&self) -> usize {
        self.height / 8
    }

    /// Extract block `(block_x, block_y)` level-shifted by −128.
    pub fn block(&self, block_x: usize, block_y: usize) -> [f64; 64] {
        let mut block = [0.0f64; 64];
        for dy in 0..8 {
            let row = &self.data[(block_y * 8 + dy) * self.width + block_x * 8..][..8];
            for (dx, &sample) in row.iter().enumerate() {
                block[dy * 8 + dx] = sample as f64 - 128.0;
            }
        }
        block
    }
}

/// Convert interleaved RGB to three full-resolution Y, Cb, Cr planes padded to
/// `padded_width × padded_height` by edge replication. The image must be
/// non-empty.
pub(crate) fn ycbcr_planes(
    data: &[u8],
    width: usize,
    height: usize,
    padded_width: usize,
    padded_height: usize,
) -> [Plane; 3] {
    debug_assert!(width > 0 && height > 0);
    let len = padded_width * padded_height;
    let mut y_plane = Vec::with_capacity(len);
    let mut cb_plane = Vec::with_capacity(len);
    let mut cr_plane = Vec::with_capacity(len);

    for y in 0..padded_height {
        let src_y = y.min(height - 1);
        for x in 0..padded_width {
            let idx = (src_y * width + x.min(width - 1)) * 3;
            let (yc, cb, cr) = rgb_to_ycbcr(data[idx], data[idx + 1], data[idx + 2]);
            y_plane.push(yc);
            cb_plane.push(cb);
            cr_plane.push(cr);
        }
    }

    let plane = |data: Vec<u8>| Plane {
        width: padded_width,
        height: padded_height,
        data,
    };
    [plane(y_plane), plane(cb_plane), plane(cr_plane)]
}
