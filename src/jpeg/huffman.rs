//! Canonical Huffman tables and block encoding.
//!
//! Only the example tables from ITU-T T.81 Annex K.3 are used; codes are
//! derived from the code-length counts the same way a decoder derives them
//! from a DHT segment.

use std::sync::OnceLock;

use super::entropy::{BlockSymbols, RleSymbol};
use crate::bits::BitWriterMsb;
use crate::error::{Error, Result};

/// Code-length counts plus symbols, in DHT layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanSpec {
    /// `bits[i]` is the number of codes of length `i + 1`.
    pub bits: [u8; 16],
    /// Symbols in order of increasing code length.
    pub values: &'static [u8],
}

/// Luminance DC (K.3.1).
pub const DC_LUMINANCE: HuffmanSpec = HuffmanSpec {
    bits: [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    values: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
};

/// Chrominance DC (K.3.1).
pub const DC_CHROMINANCE: HuffmanSpec = HuffmanSpec {
    bits: [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
    values: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
};

/// Luminance AC (K.3.2).
pub const AC_LUMINANCE: HuffmanSpec = HuffmanSpec {
    bits: [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7d],
    values: &[
        0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, //
        0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08, //
        0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0, 0x24, 0x33, 0x62, 0x72, //
        0x82, 0x09, 0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28, //
        0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, //
        0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, //
        0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, 0x75, //
        0x76, 0x77, 0x78, 0x79, 0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, //
        0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, //
        0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, //
        0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, //
        0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2, //
        0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf1, 0xf2, 0xf3, 0xf4, //
        0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa,
    ],
};

/// Chrominance AC (K.3.2).
pub const AC_CHROMINANCE: HuffmanSpec = HuffmanSpec {
    bits: [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77],
    values: &[
        0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, //
        0x51, 0x07, 0x61, 0x71, 0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, //
        0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0, 0x15, 0x62, 0x72, 0xd1, //
        0x0a, 0x16, 0x24, 0x34, 0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26, //
        0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, //
        0x45, 0x46, 0x47, 0x48, 0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, //
        0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x73, 0x74, //
        0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, //
        0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, //
        0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, //
        0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, //
        0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, //
        0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf2, 0xf3, 0xf4, //
        0xf5, 0xf6, 0xf7, 0xf8, 0xf9, 0xfa,
    ],
};

/// A code word. `length == 0` means the symbol has no code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    pub code: u16,
    pub length: u8,
}

/// Symbol → code lookup built from a [`HuffmanSpec`].
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    codes: [HuffmanCode; 256],
    spec: HuffmanSpec,
}

impl HuffmanTable {
    /// Assign canonical codes: within each length, consecutive values in
    /// symbol order; moving to the next length shifts the counter left.
    pub fn from_spec(spec: &HuffmanSpec) -> Result<Self> {
        let total: usize = spec.bits.iter().map(|&n| n as usize).sum();
        if total != spec.values.len() {
            return Err(Error::InvalidHuffmanTable(
                "code counts do not match number of values",
            ));
        }
        if total > 256 {
            return Err(Error::InvalidHuffmanTable("more than 256 values"));
        }

        let mut codes = [HuffmanCode::default(); 256];
        let mut next_code: u32 = 0;
        let mut values = spec.values.iter();

        for (i, &count) in spec.bits.iter().enumerate() {
            let length = (i + 1) as u8;
            for _ in 0..count {
                if next_code >= (1u32 << length) {
                    return Err(Error::InvalidHuffmanTable("code lengths over-subscribed"));
                }
                let symbol = *values
                    .next()
                    .ok_or(Error::InvalidHuffmanTable("missing value"))?;
                let slot = &mut codes[symbol as usize];
                if slot.length != 0 {
                    return Err(Error::InvalidHuffmanTable("duplicate value"));
                }
                *slot = HuffmanCode {
                    code: next_code as u16,
                    length,
                };
                next_code += 1;
            }
            next_code <<= 1;
        }

        Ok(Self { codes, spec: *spec })
    }

    /// Code for `symbol`, if it has one.
    #[inline]
    pub fn code(&self, symbol: u8) -> Option<HuffmanCode> {
        let code = self.codes[symbol as usize];
        (code.length != 0).then_some(code)
    }

    /// Spec the table was built from, for the DHT segment.
    pub fn spec(&self) -> &HuffmanSpec {
        &self.spec
    }

    #[inline]
    fn write_symbol(&self, writer: &mut BitWriterMsb, symbol: u8) -> Result<()> {
        let code = self
            .code(symbol)
            .ok_or(Error::InvalidHuffmanTable("symbol has no code"))?;
        writer.write_bits(code.code as u32, code.length);
        Ok(())
    }
}

/// The four tables a color baseline scan uses.
#[derive(Debug, Clone)]
pub struct HuffmanTables {
    pub dc_luminance: HuffmanTable,
    pub ac_luminance: HuffmanTable,
    pub dc_chrominance: HuffmanTable,
    pub ac_chrominance: HuffmanTable,
}

impl HuffmanTables {
    /// Build the Annex K tables.
    pub fn standard() -> Result<Self> {
        Ok(Self {
            dc_luminance: HuffmanTable::from_spec(&DC_LUMINANCE)?,
            ac_luminance: HuffmanTable::from_spec(&AC_LUMINANCE)?,
            dc_chrominance: HuffmanTable::from_spec(&DC_CHROMINANCE)?,
            ac_chrominance: HuffmanTable::from_spec(&AC_CHROMINANCE)?,
        })
    }

    /// The Annex K tables, built on first use and shared by every encode.
    pub fn shared() -> Result<&'static Self> {
        static TABLES: OnceLock<HuffmanTables> = OnceLock::new();

        if let Some(tables) = TABLES.get() {
            return Ok(tables);
        }
        let tables = Self::standard()?;
        Ok(TABLES.get_or_init(|| tables))
    }
}

/// Raw magnitude bits following a code.
///
/// Non-negative values are written as-is; negative values as the one's
/// complement, `value + 2^category - 1`.
#[inline]
pub fn additional_bits(value: i16, category: u8) -> u32 {
    if value >= 0 {
        value as u32
    } else {
        let v = value as i32 + (1i32 << category) - 1;
        v as u32
    }
}

#[inline]
fn write_additional(writer: &mut BitWriterMsb, symbol: &RleSymbol) {
    if symbol.category > 0 {
        writer.write_bits(
            additional_bits(symbol.value, symbol.category),
            symbol.category,
        );
    }
}

/// Write one planned block: the DC symbol through `dc_table`, every further
/// symbol through `ac_table`.
pub fn encode_block(
    writer: &mut BitWriterMsb,
    symbols: &BlockSymbols,
    dc_table: &HuffmanTable,
    ac_table: &HuffmanTable,
) -> Result<()> {
    if let Some(dc) = symbols.dc() {
        dc_table.write_symbol(writer, dc.category)?;
        write_additional(writer, dc);
    }
    for symbol in symbols.ac() {
        ac_table.write_symbol(writer, symbol.ac_symbol())?;
        write_additional(writer, symbol);
    }
    Ok(())
}
