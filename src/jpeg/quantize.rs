//! Quantization tables, quality scaling and zigzag reordering.

use super::dct::DCT_SCALE;

/// Zigzag scan order: `ZIGZAG[i]` is the natural (row-major) index of the
/// `i`-th coefficient in zigzag order.
pub const ZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Standard luminance quantization table (ITU-T T.81 Annex K.1), natural order.
pub const LUMINANCE_BASE: [u8; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Standard chrominance quantization table (ITU-T T.81 Annex K.1), natural order.
pub const CHROMINANCE_BASE: [u8; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, //
    18, 21, 26, 66, 99, 99, 99, 99, //
    24, 26, 56, 99, 99, 99, 99, 99, //
    47, 66, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Clamp a quality factor into `[1, 100]`.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(1, 100)
}

/// Percentage applied to the base table for a quality factor.
///
/// Below 50 the table grows as `5000 / q`; from 50 up it shrinks linearly to
/// zero at 100 (every entry then clamps to 1).
#[inline]
pub fn quality_scale(quality: u8) -> u32 {
    let q = clamp_quality(quality) as u32;
    if q < 50 {
        5000 / q
    } else {
        200 - 2 * q
    }
}

/// A quantization table in natural order. Entries are always in `[1, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizationTable {
    values: [u8; 64],
}

impl QuantizationTable {
    /// Scale `base` for `quality` (clamped to `[1, 100]`).
    pub fn with_quality(base: &[u8; 64], quality: u8) -> Self {
        let scale = quality_scale(quality);
        let mut values = [0u8; 64];
        for (v, &b) in values.iter_mut().zip(base.iter()) {
            let scaled = (b as u32 * scale + 50) / 100;
            *v = scaled.clamp(1, 255) as u8;
        }
        Self { values }
    }

    /// Entries in natural order.
    #[inline]
    pub fn values(&self) -> &[u8; 64] {
        &self.values
    }

    /// Entries in zigzag order, as written to a DQT segment.
    pub fn zigzag_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        for (i, &natural) in ZIGZAG.iter().enumerate() {
            out[i] = self.values[natural];
        }
        out
    }
}

/// Luminance and chrominance tables for one encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizationTables {
    /// Table 0, used by Y.
    pub luminance: QuantizationTable,
    /// Table 1, used by Cb and Cr.
    pub chrominance: QuantizationTable,
}

impl QuantizationTables {
    /// Build both standard tables for a quality factor.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            luminance: QuantizationTable::with_quality(&LUMINANCE_BASE, quality),
            chrominance: QuantizationTable::with_quality(&CHROMINANCE_BASE, quality),
        }
    }
}

/// Quantize a block of [`super::dct::dct_2d`] output and reorder it to zigzag.
///
/// `level = round(coeff / (q * 4))`, rounding half away from zero.
pub fn quantize_block(coeffs: &[f64; 64], table: &QuantizationTable) -> [i16; 64] {
    let mut out = [0i16; 64];
    for (i, &natural) in ZIGZAG.iter().enumerate() {
        let divisor = table.values[natural] as f64 * DCT_SCALE;
        out[i] = (coeffs[natural] / divisor).round() as i16;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Natural index to zigzag position.
    const UNZIGZAG: [usize; 64] = {
        let mut table = [0usize; 64];
        let mut i = 0;
        while i < 64 {
            table[ZIGZAG[i]] = i;
            i += 1;
        }
        table
    };

    fn unzigzag(block: &[i16; 64]) -> [i16; 64] {
        let mut out = [0i16; 64];
        for (i, &natural) in ZIGZAG.iter().enumerate() {
            out[natural] = block[i];
        }
        out
    }

    #[test]
    fn test_zigzag_is_bijection() {
        let mut seen = [false; 64];
        for &idx in &ZIGZAG {
            assert!(!seen[idx], "duplicate natural index {idx}");
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s));
        for i in 0..64 {
            assert_eq!(UNZIGZAG[ZIGZAG[i]], i);
            assert_eq!(ZIGZAG[UNZIGZAG[i]], i);
        }
    }

    #[test]
    fn test_zigzag_known_positions() {
        assert_eq!(ZIGZAG[0], 0);
        assert_eq!(ZIGZAG[1], 1);
        assert_eq!(ZIGZAG[2], 8);
        assert_eq!(ZIGZAG[3], 16);
        assert_eq!(ZIGZAG[63], 63);
    }

    #[test]
    fn test_forward_then_inverse_scan_is_identity() {
        let mut natural = [0i16; 64];
        for (i, v) in natural.iter_mut().enumerate() {
            *v = i as i16 * 3 - 90;
        }
        let mut zz = [0i16; 64];
        for i in 0..64 {
            zz[i] = natural[ZIGZAG[i]];
        }
        assert_eq!(unzigzag(&zz), natural);
    }

    #[test]
    fn test_quality_50_is_base_table() {
        let table = QuantizationTable::with_quality(&LUMINANCE_BASE, 50);
        assert_eq!(table.values(), &LUMINANCE_BASE);
        let table = QuantizationTable::with_quality(&CHROMINANCE_BASE, 50);
        assert_eq!(table.values(), &CHROMINANCE_BASE);
    }

    #[test]
    fn test_quality_100_is_mostly_ones() {
        let tables = QuantizationTables::with_quality(100);
        for table in [tables.luminance, tables.chrominance] {
            assert!(table.values().iter().all(|&v| v >= 1));
            let ones = table.values().iter().filter(|&&v| v == 1).count();
            assert!(ones >= 32, "only {ones} entries are 1");
        }
    }

    #[test]
    fn test_quality_1_saturates() {
        let tables = QuantizationTables::with_quality(1);
        for table in [tables.luminance, tables.chrominance] {
            let saturated = table.values().iter().filter(|&&v| v == 255).count();
            assert!(saturated >= 60, "only {saturated} entries saturated");
            assert!(table.values().iter().all(|&v| v >= 200));
        }
    }

    #[test]
    fn test_entries_never_zero() {
        for q in 0..=255u8 {
            let tables = QuantizationTables::with_quality(q);
            assert!(tables.luminance.values().iter().all(|&v| v >= 1));
            assert!(tables.chrominance.values().iter().all(|&v| v >= 1));
        }
    }

    #[test]
    fn test_out_of_range_quality_is_clamped() {
        assert_eq!(
            QuantizationTables::with_quality(0),
            QuantizationTables::with_quality(1)
        );
        assert_eq!(
            QuantizationTables::with_quality(200),
            QuantizationTables::with_quality(100)
        );
    }

    #[test]
    fn test_quality_scale() {
        assert_eq!(quality_scale(1), 5000);
        assert_eq!(quality_scale(10), 500);
        assert_eq!(quality_scale(49), 102);
        assert_eq!(quality_scale(50), 100);
        assert_eq!(quality_scale(75), 50);
        assert_eq!(quality_scale(100), 0);
    }

    #[test]
    fn test_quality_75_entries() {
        let table = QuantizationTable::with_quality(&LUMINANCE_BASE, 75);
        // (16 * 50 + 50) / 100 = 8, (11 * 50 + 50) / 100 = 6
        assert_eq!(table.values()[0], 8);
        assert_eq!(table.values()[1], 6);
    }

    #[test]
    fn test_zigzag_bytes_order() {
        let table = QuantizationTable::with_quality(&LUMINANCE_BASE, 50);
        let zz = table.zigzag_bytes();
        assert_eq!(&zz[..6], &[16, 11, 12, 14, 12, 10]);
        assert_eq!(zz[63], 99);
    }

    #[test]
    fn test_quantize_rounds_half_away_from_zero() {
        let table = QuantizationTable::with_quality(&[1; 64], 50);
        let mut coeffs = [0.0f64; 64];
        coeffs[0] = 2.5 * DCT_SCALE;
        coeffs[1] = -2.5 * DCT_SCALE;
        coeffs[8] = 1.4 * DCT_SCALE;
        coeffs[63] = -0.49 * DCT_SCALE;
        let q = quantize_block(&coeffs, &table);
        assert_eq!(q[0], 3);
        assert_eq!(q[1], -3);
        // natural 8 is zigzag 2
        assert_eq!(q[2], 1);
        assert_eq!(q[63], 0);
    }

    #[test]
    fn test_quantize_outputs_zigzag_order() {
        let table = QuantizationTable::with_quality(&[2; 64], 50);
        let mut coeffs = [0.0f64; 64];
        for (i, c) in coeffs.iter_mut().enumerate() {
            *c = i as f64 * 2.0 * DCT_SCALE;
        }
        let q = quantize_block(&coeffs, &table);
        for i in 0..64 {
            assert_eq!(q[i] as usize, ZIGZAG[i]);
        }
    }
}
