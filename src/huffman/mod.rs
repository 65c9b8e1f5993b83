//! Canonical Huffman coding over Unicode code points.
//!
//! ## Pipeline
//!
//! Compression: `frequency` -> `tree` -> `tree_codec` + `bit_packer`.
//! Decompression: `tree_codec` -> `bit_unpacker`.
//!
//! ## Module Map
//!
//! - `frequency` - UTF-8 decoding and per-symbol counts
//! - `tree` - greedy tree build with a total tie-break, prefix codes
//! - `tree_codec` - marker-prefixed pre-order tree bytes
//! - `bit_packer` - MSB-first code packing
//! - `bit_unpacker` - tree-walk and table-scan decoders

pub mod bit_packer;
pub mod bit_unpacker;
pub mod frequency;
pub mod tree;
pub mod tree_codec;

pub use bit_packer::{pack, BitWriter, EncodedPayload};
pub use bit_unpacker::{decode_table_scan, decode_tree_walk, unpack, CodeLookup, DecodeStrategy};
pub use frequency::{analyze, FrequencyMap};
pub use tree::{Code, HuffmanNode, HuffmanTree, ParseCodeError, PrefixTable};
pub use tree_codec::{deserialize_tree, serialize_tree, TreeDecoder, MAX_TREE_DEPTH};
