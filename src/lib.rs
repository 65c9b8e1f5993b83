//! A lossless text compressor built on canonical Huffman coding.
//!
//! Input is UTF-8 text. Symbols are Unicode code points, not bytes, so the
//! code tree adapts to the characters actually used. Compression produces a
//! single self-describing blob holding both the serialized tree and the
//! packed payload; decompression reverses it exactly.
//!
//! # Quick Start
//!
//! ```
//! let blob = huffcode::compress("aaaa bbb cc d".as_bytes())?;
//! assert_eq!(blob[0], 5); // valid bits in the last payload byte
//!
//! let text = huffcode::decompress(&blob)?;
//! assert_eq!(text, b"aaaa bbb cc d");
//! # Ok::<(), huffcode::HuffError>(())
//! ```
//!
//! # Determinism
//!
//! Tree construction breaks ties by weight, then code point, then creation
//! order, so the same input always compresses to the same bytes.
//!
//! # Blob Layout
//!
//! | Offset | Field |
//! |---|---|
//! | 0 | valid bits in the final payload byte, 1..=8 |
//! | 1 | tree start marker `0x1F` |
//! | 2.. | pre-order tree: `0x00` internal, `0x01` + UTF-8 symbol for a leaf |
//! | after tree | delimiter `%%` |
//! | rest | payload, MSB-first |
//!
//! The codec never touches storage and never installs a logger; it reports
//! through the `log` facade only.

pub mod codec;
pub mod container;
pub mod huffman;
pub mod utils;

pub use codec::{BlobSummary, Codec, CodecBuilder};
pub use container::ContainerBlob;
pub use huffman::{Code, DecodeStrategy, FrequencyMap, HuffmanNode, HuffmanTree, PrefixTable};
pub use utils::error::{HuffError, Result};

/// Compresses UTF-8 `input` with the default [`Codec`].
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    Codec::default().compress(input)
}

/// Decompresses a blob produced by [`compress`] with the default [`Codec`].
pub fn decompress(blob: &[u8]) -> Result<Vec<u8>> {
    Codec::default().decompress(blob)
}
