// src/huffman/tree_codec.rs

//! Structural (de)serialization of Huffman trees.
//!
//! Pre-order layout: `0x00` opens an internal node and is followed by its left
//! then right subtree; `0x01` opens a leaf and is followed by the symbol's
//! UTF-8 bytes. Weights are not stored.

use crate::huffman::tree::HuffmanNode;
use crate::utils::error::{HuffError, Result};
use std::collections::BTreeSet;

pub const INTERNAL_MARKER: u8 = 0x00;
pub const LEAF_MARKER: u8 = 0x01;

/// Deepest tree accepted from serialized bytes.
///
/// A Huffman tree of depth `d` needs a total weight of at least the
/// `(d + 2)`th Fibonacci number, which caps trees over `u64` weights well
/// below this value.
pub const MAX_TREE_DEPTH: usize = 128;

/// Serializes the tree rooted at `root`.
///
/// `None` means the caller has no tree at all, which is a codec bug rather
/// than bad input.
pub fn serialize_tree(root: Option<&HuffmanNode>) -> Result<Vec<u8>> {
    let root = root.ok_or(HuffError::NullNode)?;
    let mut out = Vec::new();
    write_node(root, &mut out);
    Ok(out)
}

fn write_node(node: &HuffmanNode, out: &mut Vec<u8>) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            out.push(LEAF_MARKER);
            let mut buf = [0u8; 4];
            out.extend_from_slice(symbol.encode_utf8(&mut buf).as_bytes());
        }
        HuffmanNode::Internal { left, right, .. } => {
            out.push(INTERNAL_MARKER);
            write_node(left, out);
            write_node(right, out);
        }
    }
}

/// Parses a complete tree from `bytes`, requiring every byte to be consumed.
pub fn deserialize_tree(bytes: &[u8]) -> Result<HuffmanNode> {
    let mut decoder = TreeDecoder::new(bytes);
    let root = decoder.read_tree()?;
    if decoder.position() != bytes.len() {
        return Err(HuffError::TrailingTreeBytes {
            offset: decoder.position(),
        });
    }
    Ok(root)
}

/// Recursive-descent reader over serialized tree bytes.
pub struct TreeDecoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    seen: BTreeSet<char>,
}

impl<'a> TreeDecoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            seen: BTreeSet::new(),
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads one tree starting at the current position.
    ///
    /// Each call decodes an independent tree, so symbol-uniqueness is checked
    /// per call.
    pub fn read_tree(&mut self) -> Result<HuffmanNode> {
        self.seen.clear();
        self.read_node(0)
    }

    fn read_node(&mut self, depth: usize) -> Result<HuffmanNode> {
        if depth > MAX_TREE_DEPTH {
            return Err(HuffError::TreeTooDeep {
                max: MAX_TREE_DEPTH,
            });
        }

        let offset = self.pos;
        let marker = self.next_byte()?;
        match marker {
            INTERNAL_MARKER => {
                let left = self.read_node(depth + 1)?;
                let right = self.read_node(depth + 1)?;
                Ok(HuffmanNode::Internal {
                    weight: 0,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            LEAF_MARKER => {
                let symbol = self.read_symbol()?;
                if !self.seen.insert(symbol) {
                    return Err(HuffError::DuplicateTreeSymbol(symbol));
                }
                Ok(HuffmanNode::leaf(symbol, 0))
            }
            marker => Err(HuffError::MalformedTreeMarker { marker, offset }),
        }
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(HuffError::TruncatedTree { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_symbol(&mut self) -> Result<char> {
        let start = self.pos;
        let lead = *self
            .bytes
            .get(start)
            .ok_or(HuffError::TruncatedTree { offset: start })?;
        let width = utf8_width(lead).ok_or(HuffError::InvalidSymbolEncoding { offset: start })?;
        let end = start + width;
        if end > self.bytes.len() {
            return Err(HuffError::TruncatedTree {
                offset: self.bytes.len(),
            });
        }

        let symbol = std::str::from_utf8(&self.bytes[start..end])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(HuffError::InvalidSymbolEncoding { offset: start })?;
        self.pos = end;
        Ok(symbol)
    }
}

/// Encoded width implied by a UTF-8 lead byte, or `None` if it cannot start a
/// code point.
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::frequency::FrequencyMap;
    use crate::huffman::tree::HuffmanTree;

    const REFERENCE_TREE: &[u8] = &[0, 0, 0, 1, b'd', 1, b'c', 1, b' ', 0, 1, b'b', 1, b'a'];

    fn reference_tree() -> HuffmanTree {
        let map = FrequencyMap::from_counts([(' ', 3), ('a', 4), ('b', 3), ('c', 2), ('d', 1)]);
        HuffmanTree::build(&map).unwrap()
    }

    #[test]
    fn test_serialize_reference_tree() {
        let tree = reference_tree();
        assert_eq!(serialize_tree(Some(tree.root())).unwrap(), REFERENCE_TREE);
    }

    #[test]
    fn test_serialize_absent_root() {
        assert_eq!(serialize_tree(None).unwrap_err(), HuffError::NullNode);
    }

    #[test]
    fn test_deserialize_preserves_structure() {
        let root = deserialize_tree(REFERENCE_TREE).unwrap();
        assert_eq!(root.leaf_count(), 5);
        let rebuilt = HuffmanTree::from_root(root);
        assert_eq!(rebuilt.prefix_table(), reference_tree().prefix_table());
    }

    #[test]
    fn test_multibyte_symbols() {
        let root = HuffmanNode::merge(HuffmanNode::leaf('€', 1), HuffmanNode::leaf('😀', 2)).unwrap();
        let bytes = serialize_tree(Some(&root)).unwrap();
        assert_eq!(bytes, [0, 1, 0xE2, 0x82, 0xAC, 1, 0xF0, 0x9F, 0x98, 0x80]);

        let decoded = deserialize_tree(&bytes).unwrap();
        let HuffmanNode::Internal { left, right, .. } = decoded else {
            panic!("expected internal root");
        };
        assert_eq!(*left, HuffmanNode::leaf('€', 0));
        assert_eq!(*right, HuffmanNode::leaf('😀', 0));
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(
            deserialize_tree(&[0, 1, b'a']).unwrap_err(),
            HuffError::TruncatedTree { offset: 3 }
        );
        assert_eq!(
            deserialize_tree(&[0, 1, b'a', 1]).unwrap_err(),
            HuffError::TruncatedTree { offset: 4 }
        );
        // Lead byte of a 3-byte sequence with only one continuation byte.
        assert_eq!(
            deserialize_tree(&[0, 1, b'a', 1, 0xE2, 0x82]).unwrap_err(),
            HuffError::TruncatedTree { offset: 6 }
        );
    }

    #[test]
    fn test_bad_marker() {
        assert_eq!(
            deserialize_tree(&[0, 2, b'a']).unwrap_err(),
            HuffError::MalformedTreeMarker {
                marker: 2,
                offset: 1
            }
        );
    }

    #[test]
    fn test_bad_symbol_encoding() {
        assert_eq!(
            deserialize_tree(&[0, 1, 0xFF, 1, b'a']).unwrap_err(),
            HuffError::InvalidSymbolEncoding { offset: 2 }
        );
        // Valid lead byte, invalid continuation.
        assert_eq!(
            deserialize_tree(&[0, 1, 0xC3, b'a', 1, b'b']).unwrap_err(),
            HuffError::InvalidSymbolEncoding { offset: 2 }
        );
        // Surrogate range is not a code point.
        assert_eq!(
            deserialize_tree(&[0, 1, 0xED, 0xA0, 0x80, 1, b'b']).unwrap_err(),
            HuffError::InvalidSymbolEncoding { offset: 2 }
        );
    }

    #[test]
    fn test_trailing_and_duplicate() {
        assert_eq!(
            deserialize_tree(&[0, 1, b'a', 1, b'b', 1]).unwrap_err(),
            HuffError::TrailingTreeBytes { offset: 5 }
        );
        assert_eq!(
            deserialize_tree(&[0, 1, b'a', 1, b'a']).unwrap_err(),
            HuffError::DuplicateTreeSymbol('a')
        );
    }

    #[test]
    fn test_depth_limit() {
        let bytes = vec![INTERNAL_MARKER; MAX_TREE_DEPTH + 2];
        assert_eq!(
            deserialize_tree(&bytes).unwrap_err(),
            HuffError::TreeTooDeep {
                max: MAX_TREE_DEPTH
            }
        );
    }

    #[test]
    fn test_decoder_reports_position() {
        let mut bytes = REFERENCE_TREE.to_vec();
        bytes.extend_from_slice(b"%%");
        let mut decoder = TreeDecoder::new(&bytes);
        decoder.read_tree().unwrap();
        assert_eq!(decoder.position(), REFERENCE_TREE.len());
    }
}
