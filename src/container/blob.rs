// src/container/blob.rs

//! Assembly and parsing of the container byte layout.
//!
//! ```text
//! [valid_bits: u8] [0x1F] [serialized tree ...] [0x25 0x25] [payload ...]
//! ```
//!
//! Parsing never looks backwards: each section ends where a scan for the
//! next delimiter stops.

use crate::huffman::tree_codec::TreeDecoder;
use crate::utils::error::{HuffError, Result};
use log::{debug, trace};

pub const TREE_START: u8 = 0x1F;
pub const TREE_END: [u8; 2] = *b"%%";

/// Borrowed view of the three sections of a container blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerBlob<'a> {
    pub valid_bits: u8,
    pub tree: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> ContainerBlob<'a> {
    /// Joins the sections into one owned buffer.
    pub fn assemble(valid_bits: u8, tree: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + tree.len() + TREE_END.len() + payload.len());
        out.push(valid_bits);
        out.push(TREE_START);
        out.extend_from_slice(tree);
        out.extend_from_slice(&TREE_END);
        out.extend_from_slice(payload);
        out
    }

    /// Splits `blob` into its sections, validating framing only.
    ///
    /// The tree span is not decoded here beyond what is needed to tell a
    /// trailing `%` leaf from the delimiter that follows it.
    pub fn parse(blob: &'a [u8]) -> Result<Self> {
        if blob.len() < 2 {
            return Err(HuffError::InputTooShort);
        }

        let valid_bits = blob[0];
        if !(1..=8).contains(&valid_bits) {
            return Err(HuffError::InvalidBitLength(valid_bits));
        }

        let tree_start = find_byte(blob, 1, TREE_START).ok_or(HuffError::TreeStartNotFound)? + 1;
        let mut tree_end = find_delimiter(blob, tree_start).ok_or(HuffError::TreeEndNotFound)?;
        if tree_end == tree_start {
            return Err(HuffError::EmptyTreeBytes);
        }
        if needs_realignment(blob, tree_start, tree_end) {
            trace!("tree ends in a '%' leaf, delimiter moved from {} to {}", tree_end, tree_end + 1);
            tree_end += 1;
        }

        let payload_start = tree_end + TREE_END.len();
        if payload_start >= blob.len() {
            return Err(HuffError::EncodedDataNotFound);
        }

        let parsed = Self {
            valid_bits,
            tree: &blob[tree_start..tree_end],
            payload: &blob[payload_start..],
        };
        debug!(
            "container: valid_bits={}, tree {}..{}, payload {} bytes",
            valid_bits,
            tree_start,
            tree_end,
            parsed.payload.len()
        );
        Ok(parsed)
    }
}

fn find_byte(haystack: &[u8], from: usize, needle: u8) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn find_delimiter(haystack: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(TREE_END.len())
        .position(|w| w == TREE_END)
        .map(|i| from + i)
}

/// A leaf for `%` is serialized as `0x01 0x25`; when it is the last leaf, the
/// first `%%` match begins at its symbol byte. That case shows up as `%%%`
/// where the span before the match is an incomplete tree and the span one
/// byte longer is a complete one.
fn needs_realignment(blob: &[u8], tree_start: usize, tree_end: usize) -> bool {
    if blob.get(tree_end + 2) != Some(&TREE_END[0]) {
        return false;
    }
    !is_complete_tree(&blob[tree_start..tree_end]) && is_complete_tree(&blob[tree_start..=tree_end])
}

fn is_complete_tree(span: &[u8]) -> bool {
    let mut decoder = TreeDecoder::new(span);
    decoder.read_tree().is_ok() && decoder.position() == span.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_BLOB: &[u8] = &[
        5, 31, 0, 0, 0, 1, b'd', 1, b'c', 1, b' ', 0, 1, b'b', 1, b'a', 37, 37, 255, 106, 73, 64,
    ];

    #[test]
    fn test_parse_reference_blob() {
        let blob = ContainerBlob::parse(REFERENCE_BLOB).unwrap();
        assert_eq!(blob.valid_bits, 5);
        assert_eq!(blob.tree, &REFERENCE_BLOB[2..16]);
        assert_eq!(blob.payload, &[255, 106, 73, 64]);
    }

    #[test]
    fn test_assemble_matches_parse() {
        let tree = &REFERENCE_BLOB[2..16];
        let bytes = ContainerBlob::assemble(5, tree, &[255, 106, 73, 64]);
        assert_eq!(bytes, REFERENCE_BLOB);
    }

    #[test]
    fn test_framing_errors() {
        assert_eq!(ContainerBlob::parse(&[]).unwrap_err(), HuffError::InputTooShort);
        assert_eq!(ContainerBlob::parse(&[5]).unwrap_err(), HuffError::InputTooShort);
        assert_eq!(
            ContainerBlob::parse(&[0, 31, 0, 37, 37, 1]).unwrap_err(),
            HuffError::InvalidBitLength(0)
        );
        assert_eq!(
            ContainerBlob::parse(&[9, 31, 0, 37, 37, 1]).unwrap_err(),
            HuffError::InvalidBitLength(9)
        );
        assert_eq!(
            ContainerBlob::parse(&[3, 0, 1, 2]).unwrap_err(),
            HuffError::TreeStartNotFound
        );
        assert_eq!(
            ContainerBlob::parse(&[3, 31, 0, 1, b'a', 37]).unwrap_err(),
            HuffError::TreeEndNotFound
        );
        assert_eq!(
            ContainerBlob::parse(&[3, 31, 37, 37, 1]).unwrap_err(),
            HuffError::EmptyTreeBytes
        );
        assert_eq!(
            ContainerBlob::parse(&[3, 31, 0, 1, b'a', 1, b'b', 37, 37]).unwrap_err(),
            HuffError::EncodedDataNotFound
        );
    }

    #[test]
    fn test_trailing_percent_leaf() {
        // Tree: internal(a, %), payload starts with a non-'%' byte.
        let tree = [0, 1, b'a', 1, b'%'];
        let bytes = ContainerBlob::assemble(2, &tree, &[0b0100_0000]);
        let blob = ContainerBlob::parse(&bytes).unwrap();
        assert_eq!(blob.tree, &tree);
        assert_eq!(blob.payload, &[0b0100_0000]);
    }

    #[test]
    fn test_payload_starting_with_percent_is_not_realigned() {
        let tree = [0, 1, b'a', 1, b'b'];
        let bytes = ContainerBlob::assemble(8, &tree, &[b'%', 0x01]);
        let blob = ContainerBlob::parse(&bytes).unwrap();
        assert_eq!(blob.tree, &tree);
        assert_eq!(blob.payload, &[b'%', 0x01]);
    }

    #[test]
    fn test_trailing_percent_leaf_and_percent_payload() {
        let tree = [0, 1, b'a', 1, b'%'];
        let bytes = ContainerBlob::assemble(8, &tree, &[b'%']);
        let blob = ContainerBlob::parse(&bytes).unwrap();
        assert_eq!(blob.tree, &tree);
        assert_eq!(blob.payload, &[b'%']);
    }
}
