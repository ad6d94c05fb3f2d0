//! Run-length planning of quantized blocks into Huffman symbols.
//!
//! Each block becomes one DC symbol (the category of the difference from the
//! previous block of the same component) followed by AC symbols of the form
//! `(zero run, category, value)`, with `ZRL` for runs of 16 zeros and `EOB`
//! once only zeros remain.

use crate::error::{Error, Result};

/// Largest DC difference category a baseline table can code.
pub const MAX_DC_CATEGORY: u8 = 11;
/// Largest AC coefficient category a baseline table can code.
pub const MAX_AC_CATEGORY: u8 = 10;
/// Capacity of [`BlockSymbols`]. One DC symbol plus at most 63 AC values,
/// 3 ZRLs and an EOB fits well inside this.
pub const MAX_BLOCK_SYMBOLS: usize = 128;

/// One entropy-coding symbol.
///
/// For DC, `run` is always 0 and `category`/`value` describe the difference.
/// For AC, `(run, category)` forms the Huffman symbol `run << 4 | category`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RleSymbol {
    pub run: u8,
    pub category: u8,
    pub value: i16,
}

impl RleSymbol {
    /// Sixteen zeros.
    pub const ZRL: RleSymbol = RleSymbol {
        run: 15,
        category: 0,
        value: 0,
    };
    /// End of block.
    pub const EOB: RleSymbol = RleSymbol {
        run: 0,
        category: 0,
        value: 0,
    };

    /// AC Huffman symbol byte.
    #[inline]
    pub fn ac_symbol(self) -> u8 {
        (self.run << 4) | self.category
    }
}

/// Fixed-capacity symbol list for a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSymbols {
    symbols: [RleSymbol; MAX_BLOCK_SYMBOLS],
    len: usize,
}

impl Default for BlockSymbols {
    fn default() -> Self {
        Self {
            symbols: [RleSymbol::default(); MAX_BLOCK_SYMBOLS],
            len: 0,
        }
    }
}

impl BlockSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol, failing once the buffer is full.
    #[inline]
    pub fn push(&mut self, symbol: RleSymbol) -> Result<()> {
        let slot = self
            .symbols
            .get_mut(self.len)
            .ok_or(Error::SymbolOverflow)?;
        *slot = symbol;
        self.len += 1;
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[RleSymbol] {
        &self.symbols[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RleSymbol> {
        self.as_slice().iter()
    }

    /// The DC symbol, if the block has been planned.
    pub fn dc(&self) -> Option<&RleSymbol> {
        self.as_slice().first()
    }

    /// AC symbols following the DC symbol.
    pub fn ac(&self) -> &[RleSymbol] {
        self.as_slice().get(1..).unwrap_or(&[])
    }
}

impl<'a> IntoIterator for &'a BlockSymbols {
    type Item = &'a RleSymbol;
    type IntoIter = std::slice::Iter<'a, RleSymbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Previous quantized DC value of one component. Starts at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DcPredictor(i16);

impl DcPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn value(self) -> i16 {
        self.0
    }
}

/// Number of bits needed for `|value|` (0 for 0).
#[inline]
pub fn category(value: i32) -> u8 {
    (32 - value.unsigned_abs().leading_zeros()) as u8
}

/// Plan one zigzag-ordered quantized block.
///
/// Updates `predictor` to this block's DC value.
pub fn plan_block(block: &[i16; 64], predictor: &mut DcPredictor) -> Result<BlockSymbols> {
    let mut symbols = BlockSymbols::new();

    let diff = block[0] as i32 - predictor.0 as i32;
    let dc_category = category(diff);
    if dc_category > MAX_DC_CATEGORY {
        return Err(Error::CoefficientOverflow {
            category: dc_category,
            max: MAX_DC_CATEGORY,
        });
    }
    symbols.push(RleSymbol {
        run: 0,
        category: dc_category,
        value: diff as i16,
    })?;
    predictor.0 = block[0];

    let mut run = 0u8;
    for &coeff in &block[1..] {
        if coeff == 0 {
            run += 1;
            continue;
        }
        while run > 15 {
            symbols.push(RleSymbol::ZRL)?;
            run -= 16;
        }
        let ac_category = category(coeff as i32);
        if ac_category > MAX_AC_CATEGORY {
            return Err(Error::CoefficientOverflow {
                category: ac_category,
                max: MAX_AC_CATEGORY,
            });
        }
        symbols.push(RleSymbol {
            run,
            category: ac_category,
            value: coeff,
        })?;
        run = 0;
    }

    if run > 0 {
        symbols.push(RleSymbol::EOB)?;
    }

    Ok(symbols)
}
