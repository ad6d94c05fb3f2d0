//! MSB-first bit packing for the entropy-coded segment.
//!
//! JPEG packs Huffman codes most-significant bit first. Any `0xFF` byte that
//! lands in the entropy-coded data is followed by a stuffed `0x00` so that a
//! decoder never mistakes it for a marker prefix.

/// Bit writer for JPEG scan data.
///
/// Holds a single accumulator byte plus the number of valid bits in it. One
/// writer owns the whole scan; completed bytes go to an internal buffer.
#[derive(Debug, Default)]
pub struct BitWriterMsb {
    buffer: Vec<u8>,
    current: u8,
    bit_count: u8,
}

impl BitWriterMsb {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with `capacity` bytes preallocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append the low `length` bits of `code`, most significant bit first.
    ///
    /// `length` must be at most 32.
    #[inline]
    pub fn write_bits(&mut self, code: u32, length: u8) {
        debug_assert!(length <= 32, "bit length {length} too large");
        let mut remaining = length;
        while remaining > 0 {
            let free = 8 - self.bit_count;
            let take = remaining.min(free);
            let shift = remaining - take;
            let chunk = ((code >> shift) & ((1u32 << take) - 1)) as u8;
            self.current |= chunk << (free - take);
            self.bit_count += take;
            remaining -= take;

            if self.bit_count == 8 {
                self.emit_byte();
            }
        }
    }

    #[inline]
    fn emit_byte(&mut self) {
        let byte = self.current;
        self.buffer.push(byte);
        if byte == 0xFF {
            self.buffer.push(0x00);
        }
        self.current = 0;
        self.bit_count = 0;
    }

    /// Pad the partial byte with 1-bits and emit it.
    ///
    /// The padding value is not fixed by every encoder in the wild (some pad
    /// with zeros). Ones are used here because a decoder reading past the end
    /// of the data then sees an all-ones prefix, which is never a valid code.
    pub fn flush(&mut self) {
        if self.bit_count > 0 {
            let pad = 8 - self.bit_count;
            self.write_bits((1u32 << pad) - 1, pad);
        }
    }

    /// Flush and return the packed bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.buffer
    }

    /// Number of complete bytes emitted so far (stuffing included).
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when no bits have been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.bit_count == 0
    }

    #[cfg(test)]
    fn pending_bits(&self) -> u8 {
        self.bit_count
    }
}
