// src/huffman/bit_unpacker.rs

//! Turns a packed bitstream back into symbols.
//!
//! Two decoders are provided and must agree on every input:
//! - [`decode_tree_walk`] follows the tree one bit at a time and restarts at
//!   the root after each leaf. This is the one the codec uses by default.
//! - [`decode_table_scan`] grows a candidate code bit by bit and looks it up
//!   in the inverse prefix table after every bit.

use crate::huffman::bit_packer::usable_bits;
use crate::huffman::tree::{Code, HuffmanNode, PrefixTable};
use crate::utils::error::{HuffError, Result};
use bitvec::prelude::*;
use log::debug;
use std::collections::HashMap;

/// Which decoding algorithm to run over a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// Descend the tree per bit, emit at each leaf.
    #[default]
    TreeWalk,
    /// Match an accumulating candidate code against the inverse table.
    TableScan,
}

/// Code to symbol lookup, the inverse of a prefix table.
#[derive(Debug, Clone, Default)]
pub struct CodeLookup {
    symbols: HashMap<Code, char>,
}

impl CodeLookup {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Code, char)>,
    {
        Self {
            symbols: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, code: &Code) -> Option<char> {
        self.symbols.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// The meaningful bits of `bytes`, honoring `valid_bits` in the last byte.
fn usable_slice(bytes: &[u8], valid_bits: u8) -> &BitSlice<u8, Msb0> {
    let bits = bytes.view_bits::<Msb0>();
    let usable = usable_bits(bytes.len(), valid_bits).min(bits.len());
    &bits[..usable]
}

/// Decodes by walking `root` for each bit.
///
/// `root` must be an internal node; a lone leaf has no codes to walk.
pub fn decode_tree_walk(bytes: &[u8], valid_bits: u8, root: &HuffmanNode) -> Result<String> {
    if root.is_leaf() {
        return Err(HuffError::InsufficientSymbols);
    }

    let bits = usable_slice(bytes, valid_bits);
    let mut out = String::new();
    let mut current = root;
    let mut pending = 0usize;

    for bit in bits.iter().by_vals() {
        if let HuffmanNode::Internal { left, right, .. } = current {
            current = if bit { right } else { left };
            pending += 1;
        }
        if let HuffmanNode::Leaf { symbol, .. } = current {
            out.push(*symbol);
            current = root;
            pending = 0;
        }
    }

    if pending > 0 {
        return Err(HuffError::UndecodableBitstream {
            pending_bits: pending,
        });
    }
    debug!("tree-walk decoded {} bits into {} symbols", bits.len(), out.chars().count());
    Ok(out)
}

/// Decodes by matching a growing candidate code against `lookup`.
pub fn decode_table_scan(bytes: &[u8], valid_bits: u8, lookup: &CodeLookup) -> Result<String> {
    let bits = usable_slice(bytes, valid_bits);
    let mut out = String::new();
    let mut candidate = Code::new();

    for bit in bits.iter().by_vals() {
        candidate.push(bit);
        if let Some(symbol) = lookup.get(&candidate) {
            out.push(symbol);
            candidate.clear();
        }
    }

    if !candidate.is_empty() {
        return Err(HuffError::UndecodableBitstream {
            pending_bits: candidate.len(),
        });
    }
    debug!("table-scan decoded {} bits into {} symbols", bits.len(), out.chars().count());
    Ok(out)
}

/// Decodes packed `bytes` against the tree rooted at `root` using `strategy`.
pub fn unpack(
    bytes: &[u8],
    valid_bits: u8,
    root: &HuffmanNode,
    strategy: DecodeStrategy,
) -> Result<String> {
    match strategy {
        DecodeStrategy::TreeWalk => decode_tree_walk(bytes, valid_bits, root),
        DecodeStrategy::TableScan => {
            if root.is_leaf() {
                return Err(HuffError::InsufficientSymbols);
            }
            let lookup = PrefixTable::from_tree(root).inverse();
            decode_table_scan(bytes, valid_bits, &lookup)
        }
    }
}
