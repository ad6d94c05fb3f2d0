//! Baseline JPEG encoder.
//!
//! Produces sequential-DCT (SOF0) JFIF files with the standard Annex K
//! quantization and Huffman tables. Supports:
//! - Grayscale (one component)
//! - YCbCr with 4:2:0 or 4:4:4 chroma sampling
//!
//! The pipeline runs in two stages. Every 8×8 block is transformed and
//! quantized independently (in parallel when the `parallel` feature is on).
//! A single sequential pass then walks the MCUs in scan order, applying DC
//! prediction, run-length planning, Huffman coding and bit packing.

pub mod dct;
pub mod entropy;
pub mod huffman;
pub mod quantize;

use std::io::Write;

use log::{debug, trace, warn};

use crate::bits::BitWriterMsb;
use crate::color::{ycbcr_planes, ColorType, Plane};
use crate::error::{Error, Result};

use dct::dct_2d;
use entropy::{plan_block, DcPredictor};
use huffman::{encode_block, HuffmanSpec, HuffmanTable, HuffmanTables};
use quantize::{clamp_quality, quantize_block, QuantizationTable, QuantizationTables};

/// Maximum supported image dimension (SOF0 stores 16-bit sizes).
pub const MAX_DIMENSION: u32 = 65535;

/// JPEG markers.
const SOI: u16 = 0xFFD8; // Start of Image
const EOI: u16 = 0xFFD9; // End of Image
const APP0: u16 = 0xFFE0; // JFIF marker
const DQT: u16 = 0xFFDB; // Define Quantization Table
const SOF0: u16 = 0xFFC0; // Start of Frame (baseline DCT)
const DHT: u16 = 0xFFC4; // Define Huffman Table
const SOS: u16 = 0xFFDA; // Start of Scan

/// Quantized blocks of one component, zigzag order, row-major block order.
type DctCoefficients = Vec<[i16; 64]>;

/// Chroma subsampling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subsampling {
    /// 4:4:4, no subsampling.
    S444,
    /// 4:2:0, 2x2 chroma downsample.
    #[default]
    S420,
}

impl Subsampling {
    /// Luma sampling factors `(h, v)`.
    fn luma_factors(self) -> (usize, usize) {
        match self {
            Subsampling::S444 => (1, 1),
            Subsampling::S420 => (2, 2),
        }
    }

    /// Luma plane padding granularity in pixels.
    fn luma_padding(self) -> usize {
        match self {
            Subsampling::S444 => 8,
            Subsampling::S420 => 16,
        }
    }
}

/// JPEG encoding options.
///
/// Use [`JpegOptions::builder`] to create options with a fluent API.
///
/// # Example
///
/// ```rust
/// use bjpeg::jpeg::{encode, JpegOptions};
/// use bjpeg::ColorType;
///
/// let pixels = vec![255, 0, 0]; // 1x1 RGB red pixel
/// let options = JpegOptions::builder(1, 1)
///     .color_type(ColorType::Rgb)
///     .quality(85)
///     .build();
/// let jpeg_bytes = encode(&pixels, &options).unwrap();
/// assert_eq!(&jpeg_bytes[..2], &[0xFF, 0xD8]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegOptions {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Color type of the pixel data (Rgb or Gray).
    pub color_type: ColorType,
    /// Quality level 1-100. Values outside the range are clamped.
    pub quality: u8,
    /// Chroma subsampling. Ignored for grayscale.
    pub subsampling: Subsampling,
}

impl Default for JpegOptions {
    fn default() -> Self {
        Self {
            // Default dimensions (must be set via builder)
            width: 0,
            height: 0,
            color_type: ColorType::Rgb,
            quality: 75,
            subsampling: Subsampling::S420,
        }
    }
}

impl JpegOptions {
    /// Grayscale preset.
    pub fn gray(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            color_type: ColorType::Gray,
            quality,
            subsampling: Subsampling::S444,
        }
    }

    /// RGB preset with 4:2:0 chroma subsampling.
    pub fn rgb(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            color_type: ColorType::Rgb,
            quality,
            subsampling: Subsampling::S420,
        }
    }

    /// Options for a raw buffer with `channels` interleaved samples per pixel.
    ///
    /// Fails with [`Error::InvalidChannelCount`] unless `channels` is 1 or 3.
    pub fn for_channels(width: u32, height: u32, channels: u8, quality: u8) -> Result<Self> {
        Ok(match ColorType::from_channels(channels)? {
            ColorType::Gray => Self::gray(width, height, quality),
            ColorType::Rgb => Self::rgb(width, height, quality),
        })
    }

    /// Create a builder for [`JpegOptions`].
    ///
    /// The source dimensions are required; color type defaults to RGB,
    /// quality to 75 and subsampling to 4:2:0.
    pub fn builder(width: u32, height: u32) -> JpegOptionsBuilder {
        JpegOptionsBuilder::new(width, height)
    }
}

/// Builder for [`JpegOptions`].
#[derive(Debug, Clone)]
pub struct JpegOptionsBuilder {
    options: JpegOptions,
}

impl JpegOptionsBuilder {
    /// Create a new builder with image dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            options: JpegOptions {
                width,
                height,
                ..Default::default()
            },
        }
    }

    /// Set the color type of the pixel data.
    pub fn color_type(mut self, color_type: ColorType) -> Self {
        self.options.color_type = color_type;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.options.quality = quality;
        self
    }

    pub fn subsampling(mut self, subsampling: Subsampling) -> Self {
        self.options.subsampling = subsampling;
        self
    }

    /// Build the [`JpegOptions`].
    #[must_use]
    pub fn build(self) -> JpegOptions {
        self.options
    }
}

/// Encode raw pixel data as JPEG.
///
/// # Arguments
///
/// * `data` - Raw pixel data (row-major, interleaved for RGB)
/// * `options` - JPEG encoding options (includes width, height, color type, quality)
///
/// # Returns
///
/// Complete JPEG file as bytes.
///
/// # Example
///
/// ```rust
/// use bjpeg::jpeg::{encode, JpegOptions};
///
/// let pixels = vec![128u8; 16 * 8];
/// let jpeg_bytes = encode(&pixels, &JpegOptions::gray(16, 8, 50)).unwrap();
/// assert_eq!(&jpeg_bytes[jpeg_bytes.len() - 2..], &[0xFF, 0xD9]);
/// ```
#[must_use = "encoding produces a JPEG file that should be used"]
pub fn encode(data: &[u8], options: &JpegOptions) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    encode_into(&mut output, data, options)?;
    Ok(output)
}

/// Encode raw pixel data as JPEG into a caller-provided buffer.
///
/// The `output` buffer is cleared and reused, allowing callers to avoid
/// repeated allocations across multiple encodes. On error its contents are
/// unspecified and must not be treated as an image.
#[must_use = "this `Result` may indicate an encoding error"]
pub fn encode_into(output: &mut Vec<u8>, data: &[u8], options: &JpegOptions) -> Result<()> {
    let width = options.width;
    let height = options.height;
    let color_type = options.color_type;

    // Validate dimensions
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::ImageTooLarge {
            width,
            height,
            max: MAX_DIMENSION,
        });
    }

    // Validate data length
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(color_type.bytes_per_pixel()))
        .ok_or(Error::InvalidDataLength {
            expected: usize::MAX,
            actual: data.len(),
        })?;
    if data.len() != expected_len {
        return Err(Error::InvalidDataLength {
            expected: expected_len,
            actual: data.len(),
        });
    }

    let quality = clamp_quality(options.quality);
    if quality != options.quality {
        warn!(
            "quality {} out of range, clamped to {}",
            options.quality, quality
        );
    }

    // Subsampling only applies to color images
    let subsampling = match color_type {
        ColorType::Gray => Subsampling::S444,
        ColorType::Rgb => options.subsampling,
    };

    debug!(
        "encoding {}x{} {:?} at quality {} ({:?})",
        width, height, color_type, quality, subsampling
    );

    let quant_tables = QuantizationTables::with_quality(quality);
    let huff_tables = HuffmanTables::shared()?;

    let planes = color_planes(
        data,
        width as usize,
        height as usize,
        color_type,
        subsampling,
    );
    let coefficients: Vec<DctCoefficients> = planes
        .iter()
        .enumerate()
        .map(|(i, plane)| {
            let table = if i == 0 {
                &quant_tables.luminance
            } else {
                &quant_tables.chrominance
            };
            compute_coefficients(plane, table)
        })
        .collect();

    let components = scan_components(&planes, &coefficients, subsampling, huff_tables);
    let scan = encode_scan(&components)?;

    output.clear();
    output.reserve(scan.len() + 1024);

    // Write JPEG headers
    write_soi(output);
    write_app0(output);
    write_dqt(output, &quant_tables, color_type);
    write_sof0(output, width, height, color_type, subsampling);
    write_dht(output, huff_tables, color_type);
    write_sos(output, color_type);
    output.extend_from_slice(&scan);
    write_eoi(output);

    debug!(
        "encoded {} bytes ({} scan bytes)",
        output.len(),
        scan.len()
    );
    Ok(())
}

/// Encode raw pixel data as JPEG and write it to `sink`.
///
/// The whole file is assembled in memory before the first byte is written,
/// so an encoding error never leaves a partial image in the sink.
pub fn encode_to<W: Write>(sink: &mut W, data: &[u8], options: &JpegOptions) -> Result<()> {
    let bytes = encode(data, options)?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    Ok(())
}

/// Build the padded planes for each component.
///
/// Gray and 4:4:4 planes are padded to multiples of 8. Under 4:2:0 the luma
/// plane is padded to a multiple of 16 and chroma is the 2×2 average of the
/// equally padded full-resolution chroma planes.
fn color_planes(
    data: &[u8],
    width: usize,
    height: usize,
    color_type: ColorType,
    subsampling: Subsampling,
) -> Vec<Plane> {
    let pad = match color_type {
        ColorType::Gray => 8,
        ColorType::Rgb => subsampling.luma_padding(),
    };
    let padded_width = width.div_ceil(pad) * pad;
    let padded_height = height.div_ceil(pad) * pad;

    match (color_type, subsampling) {
        (ColorType::Gray, _) => vec![Plane::from_gray(
            data,
            width,
            height,
            padded_width,
            padded_height,
        )],
        (ColorType::Rgb, Subsampling::S444) => {
            ycbcr_planes(data, width, height, padded_width, padded_height).into()
        }
        (ColorType::Rgb, Subsampling::S420) => {
            let [y, cb, cr] = ycbcr_planes(data, width, height, padded_width, padded_height);
            vec![y, cb.downsample_2x2(), cr.downsample_2x2()]
        }
    }
}

/// Transform and quantize every block of a plane.
///
/// Uses parallel processing with Rayon when the `parallel` feature is enabled.
fn compute_coefficients(plane: &Plane, table: &QuantizationTable) -> DctCoefficients {
    #[cfg(feature = "parallel")]
    {
        compute_coefficients_parallel(plane, table)
    }

    #[cfg(not(feature = "parallel"))]
    {
        compute_coefficients_sequential(plane, table)
    }
}

#[inline]
fn transform_block(plane: &Plane, index: usize, table: &QuantizationTable) -> [i16; 64] {
    let blocks_wide = plane.blocks_wide();
    let block = plane.block(index % blocks_wide, index / blocks_wide);
    quantize_block(&dct_2d(&block), table)
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn compute_coefficients_sequential(plane: &Plane, table: &QuantizationTable) -> DctCoefficients {
    let count = plane.blocks_wide() * plane.blocks_high();
    (0..count)
        .map(|i| transform_block(plane, i, table))
        .collect()
}

#[cfg(feature = "parallel")]
fn compute_coefficients_parallel(plane: &Plane, table: &QuantizationTable) -> DctCoefficients {
    use rayon::prelude::*;

    let count = plane.blocks_wide() * plane.blocks_high();
    (0..count)
        .into_par_iter()
        .map(|i| transform_block(plane, i, table))
        .collect()
}

/// One component as seen by the scan encoder.
struct ScanComponent<'a> {
    coefficients: &'a [[i16; 64]],
    blocks_wide: usize,
    /// Horizontal and vertical sampling factors.
    h: usize,
    v: usize,
    dc_table: &'a HuffmanTable,
    ac_table: &'a HuffmanTable,
}

fn scan_components<'a>(
    planes: &[Plane],
    coefficients: &'a [DctCoefficients],
    subsampling: Subsampling,
    tables: &'a HuffmanTables,
) -> Vec<ScanComponent<'a>> {
    planes
        .iter()
        .zip(coefficients)
        .enumerate()
        .map(|(i, (plane, coeffs))| {
            let (h, v) = if i == 0 {
                subsampling.luma_factors()
            } else {
                (1, 1)
            };
            let (dc_table, ac_table) = if i == 0 {
                (&tables.dc_luminance, &tables.ac_luminance)
            } else {
                (&tables.dc_chrominance, &tables.ac_chrominance)
            };
            ScanComponent {
                coefficients: coeffs,
                blocks_wide: plane.blocks_wide(),
                h,
                v,
                dc_table,
                ac_table,
            }
        })
        .collect()
}

/// Entropy-code all MCUs into stuffed scan bytes.
///
/// Each MCU holds `h × v` blocks of every component, row-major within the
/// component, components in order. Each component keeps its own DC predictor.
fn encode_scan(components: &[ScanComponent]) -> Result<Vec<u8>> {
    let Some(first) = components.first() else {
        return Ok(Vec::new());
    };
    let mcus_wide = first.blocks_wide / first.h;
    let mcus_high = first.coefficients.len() / first.blocks_wide / first.v;
    trace!(
        "scan: {} components, {}x{} MCUs",
        components.len(),
        mcus_wide,
        mcus_high
    );

    let mut writer = BitWriterMsb::with_capacity(first.coefficients.len() * 16);
    let mut predictors = vec![DcPredictor::new(); components.len()];

    for mcu_y in 0..mcus_high {
        for mcu_x in 0..mcus_wide {
            for (component, predictor) in components.iter().zip(predictors.iter_mut()) {
                for v in 0..component.v {
                    for h in 0..component.h {
                        let row = mcu_y * component.v + v;
                        let col = mcu_x * component.h + h;
                        let block = &component.coefficients[row * component.blocks_wide + col];
                        let symbols = plan_block(block, predictor)?;
                        encode_block(
                            &mut writer,
                            &symbols,
                            component.dc_table,
                            component.ac_table,
                        )?;
                    }
                }
            }
        }
    }

    let scan = writer.finish();
    trace!("scan: {} bytes", scan.len());
    Ok(scan)
}

fn write_soi(output: &mut Vec<u8>) {
    output.extend_from_slice(&SOI.to_be_bytes());
}

fn write_eoi(output: &mut Vec<u8>) {
    output.extend_from_slice(&EOI.to_be_bytes());
}

fn write_app0(output: &mut Vec<u8>) {
    output.extend_from_slice(&APP0.to_be_bytes());

    // Length (16 bytes including length field)
    output.extend_from_slice(&16u16.to_be_bytes());

    // JFIF identifier
    output.extend_from_slice(b"JFIF\0");

    // Version 1.01
    output.push(1);
    output.push(1);

    // Units: 0 = no units (aspect ratio only)
    output.push(0);

    // X and Y density
    output.extend_from_slice(&1u16.to_be_bytes());
    output.extend_from_slice(&1u16.to_be_bytes());

    // No thumbnail
    output.push(0);
    output.push(0);
}

fn write_dqt(output: &mut Vec<u8>, tables: &QuantizationTables, color_type: ColorType) {
    write_quantization_table(output, 0, &tables.luminance);
    if color_type == ColorType::Rgb {
        write_quantization_table(output, 1, &tables.chrominance);
    }
}

fn write_quantization_table(output: &mut Vec<u8>, table_id: u8, table: &QuantizationTable) {
    output.extend_from_slice(&DQT.to_be_bytes());
    output.extend_from_slice(&67u16.to_be_bytes()); // Length: 2 + 1 + 64
    output.push(table_id); // 8-bit precision in the high nibble
    output.extend_from_slice(&table.zigzag_bytes());
}

fn write_sof0(
    output: &mut Vec<u8>,
    width: u32,
    height: u32,
    color_type: ColorType,
    subsampling: Subsampling,
) {
    output.extend_from_slice(&SOF0.to_be_bytes());

    let num_components = color_type.num_components();

    // Length: 8 + 3*num_components
    let length = 8 + 3 * num_components as u16;
    output.extend_from_slice(&length.to_be_bytes());

    // Precision: 8 bits
    output.push(8);

    // Height and width
    output.extend_from_slice(&(height as u16).to_be_bytes());
    output.extend_from_slice(&(width as u16).to_be_bytes());

    output.push(num_components);

    match color_type {
        ColorType::Gray => {
            output.push(1); // Component ID
            output.push(0x11); // Sampling factor (1x1)
            output.push(0); // Quantization table 0
        }
        ColorType::Rgb => {
            let (h, v) = subsampling.luma_factors();
            output.push(1);
            output.push(((h as u8) << 4) | v as u8);
            output.push(0); // Luminance table

            // Cb, Cr
            for id in [2, 3] {
                output.push(id);
                output.push(0x11);
                output.push(1); // Chrominance table
            }
        }
    }
}

fn write_dht(output: &mut Vec<u8>, tables: &HuffmanTables, color_type: ColorType) {
    // Class in the high nibble (0 = DC, 1 = AC), table ID in the low nibble
    write_huffman_table(output, 0x00, tables.dc_luminance.spec());
    if color_type == ColorType::Rgb {
        write_huffman_table(output, 0x01, tables.dc_chrominance.spec());
    }
    write_huffman_table(output, 0x10, tables.ac_luminance.spec());
    if color_type == ColorType::Rgb {
        write_huffman_table(output, 0x11, tables.ac_chrominance.spec());
    }
}

fn write_huffman_table(output: &mut Vec<u8>, table_id: u8, spec: &HuffmanSpec) {
    output.extend_from_slice(&DHT.to_be_bytes());

    // Length: 2 + 1 + 16 + num_values
    let length = 2 + 1 + 16 + spec.values.len();
    output.extend_from_slice(&(length as u16).to_be_bytes());

    output.push(table_id);
    output.extend_from_slice(&spec.bits);
    output.extend_from_slice(spec.values);
}

fn write_sos(output: &mut Vec<u8>, color_type: ColorType) {
    output.extend_from_slice(&SOS.to_be_bytes());

    let num_components = color_type.num_components();

    // Length: 6 + 2*num_components
    let length = 6 + 2 * num_components as u16;
    output.extend_from_slice(&length.to_be_bytes());

    output.push(num_components);

    // Component ID, then DC/AC table selectors
    output.push(1);
    output.push(0x00);
    if color_type == ColorType::Rgb {
        output.push(2);
        output.push(0x11);
        output.push(3);
        output.push(0x11);
    }

    // Spectral selection and successive approximation
    output.push(0); // Start of spectral selection
    output.push(63); // End of spectral selection
    output.push(0); // Successive approximation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_encode(data: &[u8], width: u32, height: u32, quality: u8) -> crate::Result<Vec<u8>> {
        let options = JpegOptions::builder(width, height)
            .color_type(ColorType::Rgb)
            .quality(quality)
            .build();
        encode(data, &options)
    }

    /// Offsets of every marker segment before the scan data.
    fn segments(jpeg: &[u8]) -> Vec<(u8, usize)> {
        let mut found = Vec::new();
        let mut pos = 2;
        while pos + 4 <= jpeg.len() && jpeg[pos] == 0xFF {
            let marker = jpeg[pos + 1];
            found.push((marker, pos));
            if marker == 0xDA {
                break;
            }
            let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
            pos += 2 + len;
        }
        found
    }

    fn gradient_rgb(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 255 / width.max(1)) as u8);
                data.push((y * 255 / height.max(1)) as u8);
                data.push(((x + y) * 7 % 256) as u8);
            }
        }
        data
    }

    #[test]
    fn test_encode_1x1_rgb() {
        let pixels = vec![255, 0, 0];
        let result = test_encode(&pixels, 1, 1, 85).unwrap();

        assert_eq!(&result[0..2], &[0xFF, 0xD8]);
        assert_eq!(&result[result.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_8x8_rgb() {
        let pixels = gradient_rgb(8, 8);
        let result = test_encode(&pixels, 8, 8, 85).unwrap();
        assert_eq!(&result[0..2], &[0xFF, 0xD8]);
        assert_eq!(&result[result.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_marker_order_color() {
        let pixels = gradient_rgb(16, 16);
        let jpeg = test_encode(&pixels, 16, 16, 75).unwrap();
        let markers: Vec<u8> = segments(&jpeg).into_iter().map(|(m, _)| m).collect();
        assert_eq!(
            markers,
            vec![0xE0, 0xDB, 0xDB, 0xC0, 0xC4, 0xC4, 0xC4, 0xC4, 0xDA]
        );
    }

    #[test]
    fn test_marker_order_gray() {
        let pixels = vec![100u8; 64];
        let jpeg = encode(&pixels, &JpegOptions::gray(8, 8, 75)).unwrap();
        let markers: Vec<u8> = segments(&jpeg).into_iter().map(|(m, _)| m).collect();
        assert_eq!(markers, vec![0xE0, 0xDB, 0xC0, 0xC4, 0xC4, 0xDA]);
    }

    #[test]
    fn test_sof0_sampling_factors() {
        let pixels = gradient_rgb(20, 12);
        for (subsampling, y_sampling) in [(Subsampling::S420, 0x22), (Subsampling::S444, 0x11)] {
            let options = JpegOptions::builder(20, 12)
                .subsampling(subsampling)
                .build();
            let jpeg = encode(&pixels, &options).unwrap();
            let (_, sof) = segments(&jpeg)
                .into_iter()
                .find(|&(m, _)| m == 0xC0)
                .unwrap();
            let sof = &jpeg[sof..];
            assert_eq!(&sof[2..4], &17u16.to_be_bytes());
            assert_eq!(sof[4], 8);
            assert_eq!(&sof[5..7], &12u16.to_be_bytes());
            assert_eq!(&sof[7..9], &20u16.to_be_bytes());
            assert_eq!(sof[9], 3);
            assert_eq!(&sof[10..13], &[1, y_sampling, 0]);
            assert_eq!(&sof[13..16], &[2, 0x11, 1]);
            assert_eq!(&sof[16..19], &[3, 0x11, 1]);
        }
    }

    #[test]
    fn test_dqt_is_zigzag_ordered() {
        let pixels = vec![0u8; 64];
        let jpeg = encode(&pixels, &JpegOptions::gray(8, 8, 50)).unwrap();
        let (_, dqt) = segments(&jpeg)
            .into_iter()
            .find(|&(m, _)| m == 0xDB)
            .unwrap();
        assert_eq!(&jpeg[dqt + 2..dqt + 5], &[0, 67, 0]);
        assert_eq!(&jpeg[dqt + 5..dqt + 11], &[16, 11, 12, 14, 12, 10]);
    }

    #[test]
    fn test_sos_header_gray() {
        let pixels = vec![0u8; 64];
        let jpeg = encode(&pixels, &JpegOptions::gray(8, 8, 50)).unwrap();
        let (_, sos) = segments(&jpeg)
            .into_iter()
            .find(|&(m, _)| m == 0xDA)
            .unwrap();
        assert_eq!(&jpeg[sos..sos + 10], &[0xFF, 0xDA, 0, 8, 1, 1, 0x00, 0, 63, 0]);
    }

    #[test]
    fn test_flat_gray_block_scan() {
        // Level-shifted zero block: DC "00", EOB "1010", padding "11"
        let pixels = vec![128u8; 64];
        let jpeg = encode(&pixels, &JpegOptions::gray(8, 8, 50)).unwrap();
        assert_eq!(&jpeg[jpeg.len() - 3..], &[0b0010_1011, 0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_grayscale() {
        let pixels = vec![128u8; 64];
        let result = encode(&pixels, &JpegOptions::gray(8, 8, 85)).unwrap();
        assert_eq!(&result[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_invalid_dimensions() {
        let pixels = vec![255, 0, 0];
        let result = test_encode(&pixels, 0, 1, 85);
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_image_too_large() {
        let result = test_encode(&[], MAX_DIMENSION + 1, 1, 85);
        assert!(matches!(result, Err(Error::ImageTooLarge { .. })));
    }

    #[test]
    fn test_encode_invalid_data_length() {
        let pixels = vec![255, 0];
        let result = test_encode(&pixels, 1, 1, 85);
        assert!(matches!(
            result,
            Err(Error::InvalidDataLength {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_quality_is_clamped() {
        let pixels = gradient_rgb(8, 8);
        let zero = test_encode(&pixels, 8, 8, 0).unwrap();
        let one = test_encode(&pixels, 8, 8, 1).unwrap();
        assert_eq!(zero, one);
        let high = test_encode(&pixels, 8, 8, 250).unwrap();
        let hundred = test_encode(&pixels, 8, 8, 100).unwrap();
        assert_eq!(high, hundred);
    }

    #[test]
    fn test_for_channels() {
        let opts = JpegOptions::for_channels(4, 4, 1, 90).unwrap();
        assert_eq!(opts.color_type, ColorType::Gray);
        let opts = JpegOptions::for_channels(4, 4, 3, 90).unwrap();
        assert_eq!(opts.color_type, ColorType::Rgb);
        assert_eq!(opts.subsampling, Subsampling::S420);
        assert!(matches!(
            JpegOptions::for_channels(4, 4, 4, 90),
            Err(Error::InvalidChannelCount(4))
        ));
    }

    #[test]
    fn test_builder_defaults() {
        let opts = JpegOptions::builder(10, 20).build();
        assert_eq!((opts.width, opts.height), (10, 20));
        assert_eq!(opts.color_type, ColorType::Rgb);
        assert_eq!(opts.quality, 75);
        assert_eq!(opts.subsampling, Subsampling::S420);
    }

    #[test]
    fn test_encode_into_reuses_buffer() {
        let pixels = gradient_rgb(8, 8);
        let options = JpegOptions::builder(8, 8).quality(80).build();
        let mut output = vec![1, 2, 3];
        encode_into(&mut output, &pixels, &options).unwrap();
        assert_eq!(&output[0..2], &[0xFF, 0xD8]);
        let first = output.clone();
        encode_into(&mut output, &pixels, &options).unwrap();
        assert_eq!(output, first);
    }

    #[test]
    fn test_encode_to_writer() {
        let pixels = gradient_rgb(9, 7);
        let options = JpegOptions::rgb(9, 7, 60);
        let mut sink = Vec::new();
        encode_to(&mut sink, &pixels, &options).unwrap();
        assert_eq!(sink, encode(&pixels, &options).unwrap());
    }

    #[test]
    fn test_encode_to_leaves_sink_empty_on_error() {
        let mut sink = Vec::new();
        let result = encode_to(&mut sink, &[0u8; 5], &JpegOptions::gray(2, 2, 50));
        assert!(result.is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_encode_to_propagates_io_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let result = encode_to(&mut Broken, &[0u8; 4], &JpegOptions::gray(2, 2, 50));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_encode_non_multiple_of_8_dimensions() {
        for (w, h) in [(1, 1), (7, 9), (15, 17), (17, 15), (33, 1)] {
            let pixels = gradient_rgb(w, h);
            for subsampling in [Subsampling::S420, Subsampling::S444] {
                let options = JpegOptions::builder(w as u32, h as u32)
                    .subsampling(subsampling)
                    .build();
                let jpeg = encode(&pixels, &options).unwrap();
                assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
            }
        }
    }

    #[test]
    fn test_color_planes_dimensions() {
        let pixels = gradient_rgb(17, 9);
        let planes = color_planes(&pixels, 17, 9, ColorType::Rgb, Subsampling::S420);
        assert_eq!((planes[0].width, planes[0].height), (32, 16));
        assert_eq!((planes[1].width, planes[1].height), (16, 8));
        assert_eq!((planes[2].width, planes[2].height), (16, 8));

        let planes = color_planes(&pixels, 17, 9, ColorType::Rgb, Subsampling::S444);
        assert!(planes.iter().all(|p| (p.width, p.height) == (24, 16)));

        let gray = vec![0u8; 17 * 9];
        for subsampling in [Subsampling::S420, Subsampling::S444] {
            let planes = color_planes(&gray, 17, 9, ColorType::Gray, subsampling);
            assert_eq!(planes.len(), 1);
            assert_eq!((planes[0].width, planes[0].height), (24, 16));
        }
    }

    #[test]
    fn test_gray_ignores_requested_subsampling() {
        let gray: Vec<u8> = (0..20 * 12).map(|i| (i * 7 % 256) as u8).collect();
        let s420 = JpegOptions {
            subsampling: Subsampling::S420,
            ..JpegOptions::gray(20, 12, 80)
        };
        assert_eq!(
            encode(&gray, &s420).unwrap(),
            encode(&gray, &JpegOptions::gray(20, 12, 80)).unwrap()
        );
    }

    #[test]
    fn test_420_component_layout() {
        // Left half black, right half white, one 16x16 MCU: luma blocks are
        // stored row-major as black, white, black, white.
        let mut pixels = Vec::new();
        for _y in 0..16 {
            for x in 0..16 {
                let v = if x < 8 { 0 } else { 255 };
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        let planes = color_planes(&pixels, 16, 16, ColorType::Rgb, Subsampling::S420);
        let tables = QuantizationTables::with_quality(90);
        let coeffs: Vec<DctCoefficients> = planes
            .iter()
            .map(|p| compute_coefficients(p, &tables.luminance))
            .collect();
        let huff = HuffmanTables::standard().unwrap();
        let components = scan_components(&planes, &coeffs, Subsampling::S420, &huff);
        assert_eq!((components[0].h, components[0].v), (2, 2));
        assert_eq!(components[0].blocks_wide, 2);
        let y = components[0].coefficients;
        assert!(y[0][0] < 0 && y[1][0] > 0 && y[2][0] < 0 && y[3][0] > 0);
        assert_eq!(components[1].coefficients.len(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pixels = gradient_rgb(40, 24);
        let planes = color_planes(&pixels, 40, 24, ColorType::Rgb, Subsampling::S444);
        let tables = QuantizationTables::with_quality(75);
        for plane in &planes {
            assert_eq!(
                compute_coefficients(plane, &tables.chrominance),
                compute_coefficients_sequential(plane, &tables.chrominance)
            );
        }
    }

    #[test]
    fn test_deterministic_output() {
        let pixels = gradient_rgb(31, 23);
        let options = JpegOptions::rgb(31, 23, 70);
        assert_eq!(
            encode(&pixels, &options).unwrap(),
            encode(&pixels, &options).unwrap()
        );
    }

    #[test]
    fn test_encode_various_quality_levels() {
        let pixels = gradient_rgb(16, 16);
        let mut sizes = Vec::new();
        for quality in [10, 50, 90, 100] {
            sizes.push(test_encode(&pixels, 16, 16, quality).unwrap().len());
        }
        assert!(sizes[0] < sizes[3], "sizes: {sizes:?}");
    }
}
