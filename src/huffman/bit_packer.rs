// src/huffman/bit_packer.rs

//! Packs symbol codes into bytes, most significant bit first.

use crate::huffman::tree::{Code, PrefixTable};
use crate::utils::error::{HuffError, Result};
use log::debug;

/// Packed code bits plus the number of meaningful bits in the final byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub bytes: Vec<u8>,
    /// Valid bits in the last byte, 1..=8. A fully used last byte is 8, never 0.
    pub valid_bits: u8,
}

impl EncodedPayload {
    /// Total number of meaningful bits across all bytes.
    pub fn total_bits(&self) -> usize {
        usable_bits(self.bytes.len(), self.valid_bits)
    }
}

/// `(len - 1) * 8 + valid_bits`, or zero for an empty buffer.
pub(crate) fn usable_bits(len: usize, valid_bits: u8) -> usize {
    match len {
        0 => 0,
        n => (n - 1) * 8 + valid_bits as usize,
    }
}

/// A bit-level writer that accumulates into an in-memory buffer.
pub struct BitWriter {
    bytes: Vec<u8>,
    current_byte: u8,
    bits_in_current: u8,
    total_bits: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current_byte: 0,
            bits_in_current: 0,
            total_bits: 0,
        }
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.current_byte |= 1 << (7 - self.bits_in_current);
        }
        self.bits_in_current += 1;
        self.total_bits += 1;

        if self.bits_in_current == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bits_in_current = 0;
        }
    }

    /// Writes every bit of `code` in order.
    pub fn write_code(&mut self, code: &Code) {
        for bit in code.iter() {
            self.write_bit(bit);
        }
    }

    pub fn bit_count(&self) -> usize {
        self.total_bits
    }

    /// Flushes the partial byte, zero-padded in its low bits.
    pub fn finish(mut self) -> EncodedPayload {
        if self.bits_in_current > 0 {
            self.bytes.push(self.current_byte);
        }
        let valid_bits = match (self.total_bits % 8) as u8 {
            0 => 8,
            rem => rem,
        };
        EncodedPayload {
            bytes: self.bytes,
            valid_bits,
        }
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes `symbols` with `table`.
///
/// Fails with [`HuffError::UnknownSymbol`] if any symbol has no code.
pub fn pack<I>(symbols: I, table: &PrefixTable) -> Result<EncodedPayload>
where
    I: IntoIterator<Item = char>,
{
    let mut writer = BitWriter::new();
    for symbol in symbols {
        let code = table.get(symbol).ok_or(HuffError::UnknownSymbol(symbol))?;
        writer.write_code(code);
    }
    let bits = writer.bit_count();
    let payload = writer.finish();
    debug!(
        "packed {} bits into {} bytes ({} valid in last)",
        bits,
        payload.bytes.len(),
        payload.valid_bits
    );
    Ok(payload)
}
