// src/codec.rs

//! High-level compress / decompress entry points and their configuration.

use crate::container::ContainerBlob;
use crate::huffman::bit_packer::{pack, usable_bits};
use crate::huffman::bit_unpacker::{unpack, DecodeStrategy};
use crate::huffman::frequency::{decode_text, FrequencyMap};
use crate::huffman::tree::HuffmanTree;
use crate::huffman::tree_codec::{deserialize_tree, serialize_tree};
use crate::utils::error::{HuffError, Result};
use log::debug;

/// Builder for a [`Codec`].
///
/// ```
/// use huffcode::{CodecBuilder, DecodeStrategy};
///
/// let codec = CodecBuilder::new()
///     .with_decode_strategy(DecodeStrategy::TableScan)
///     .with_max_input_len(1 << 20)
///     .build();
/// let blob = codec.compress(b"abracadabra").unwrap();
/// assert_eq!(codec.decompress(&blob).unwrap(), b"abracadabra");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodecBuilder {
    decode_strategy: DecodeStrategy,
    max_input_len: Option<usize>,
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the payload decoder. Both produce identical output.
    pub fn with_decode_strategy(mut self, strategy: DecodeStrategy) -> Self {
        self.decode_strategy = strategy;
        self
    }

    /// Rejects compress inputs and decompress blobs longer than `max` bytes.
    pub fn with_max_input_len(mut self, max: usize) -> Self {
        self.max_input_len = Some(max);
        self
    }

    pub fn build(self) -> Codec {
        Codec {
            decode_strategy: self.decode_strategy,
            max_input_len: self.max_input_len,
        }
    }
}

/// A configured compressor. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    decode_strategy: DecodeStrategy,
    max_input_len: Option<usize>,
}

/// Shape of a blob, read without decoding its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobSummary {
    pub valid_bits: u8,
    pub tree_len: usize,
    pub payload_len: usize,
    pub payload_bits: usize,
    pub leaf_count: usize,
    pub tree_depth: usize,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> CodecBuilder {
        CodecBuilder::new()
    }

    pub fn decode_strategy(&self) -> DecodeStrategy {
        self.decode_strategy
    }

    pub fn max_input_len(&self) -> Option<usize> {
        self.max_input_len
    }

    /// Compresses UTF-8 `input` into a container blob.
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.check_len(input.len())?;
        let text = decode_text(input)?;
        self.compress_text(text)
    }

    pub fn compress_str(&self, input: &str) -> Result<Vec<u8>> {
        self.check_len(input.len())?;
        self.compress_text(input)
    }

    fn compress_text(&self, text: &str) -> Result<Vec<u8>> {
        let frequencies = FrequencyMap::from_text(text);
        let tree = HuffmanTree::build(&frequencies)?;
        let tree_bytes = serialize_tree(Some(tree.root()))?;
        let payload = pack(text.chars(), tree.prefix_table())?;

        let blob = ContainerBlob::assemble(payload.valid_bits, &tree_bytes, &payload.bytes);
        debug!(
            "compressed {} bytes ({} symbols) into {} bytes",
            text.len(),
            frequencies.total().unwrap_or_default(),
            blob.len()
        );
        Ok(blob)
    }

    /// Restores the original bytes from a container blob.
    pub fn decompress(&self, blob: &[u8]) -> Result<Vec<u8>> {
        self.decompress_to_string(blob).map(String::into_bytes)
    }

    pub fn decompress_to_string(&self, blob: &[u8]) -> Result<String> {
        self.check_len(blob.len())?;
        let parsed = ContainerBlob::parse(blob)?;
        let root = deserialize_tree(parsed.tree)?;
        let text = unpack(parsed.payload, parsed.valid_bits, &root, self.decode_strategy)?;
        debug!(
            "decompressed {} bytes into {} bytes using {:?}",
            blob.len(),
            text.len(),
            self.decode_strategy
        );
        Ok(text)
    }

    /// Parses the container and tree of `blob` and reports their sizes.
    pub fn inspect(&self, blob: &[u8]) -> Result<BlobSummary> {
        self.check_len(blob.len())?;
        let parsed = ContainerBlob::parse(blob)?;
        let root = deserialize_tree(parsed.tree)?;
        if root.is_leaf() {
            return Err(HuffError::InsufficientSymbols);
        }
        Ok(BlobSummary {
            valid_bits: parsed.valid_bits,
            tree_len: parsed.tree.len(),
            payload_len: parsed.payload.len(),
            payload_bits: usable_bits(parsed.payload.len(), parsed.valid_bits),
            leaf_count: root.leaf_count(),
            tree_depth: root.depth(),
        })
    }

    fn check_len(&self, len: usize) -> Result<()> {
        match self.max_input_len {
            Some(max) if len > max => Err(HuffError::InputTooLarge { len, max }),
            _ => Ok(()),
        }
    }
}
