//! Frequency analysis over Unicode code points.
//!
//! Input text is decoded from UTF-8 before counting, so a multi-byte code
//! point contributes exactly one occurrence of one symbol.

use crate::utils::error::{HuffError, Result};
use log::debug;
use std::collections::BTreeMap;

/// Occurrence counts per symbol.
///
/// Backed by an ordered map so iteration is always in ascending code point
/// order, independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    counts: BTreeMap<char, u64>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every code point in `text`.
    pub fn from_text(text: &str) -> Self {
        let mut map = Self::new();
        for symbol in text.chars() {
            *map.counts.entry(symbol).or_insert(0) += 1;
        }
        map
    }

    /// Builds a map from explicit `(symbol, count)` pairs.
    ///
    /// Counts are taken as given, zero included; validation happens when a
    /// tree is built from the map. Later pairs for the same symbol replace
    /// earlier ones.
    pub fn from_counts<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, u64)>,
    {
        Self {
            counts: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, symbol: char) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, or `None` on overflow.
    pub fn total(&self) -> Option<u64> {
        self.counts
            .values()
            .try_fold(0u64, |acc, &count| acc.checked_add(count))
    }

    /// Iterates `(symbol, count)` in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }
}

/// Decodes `input` as UTF-8 and counts its code points.
///
/// Fails with [`HuffError::InvalidEncoding`] at the first byte that does not
/// start or continue a valid code point.
pub fn analyze(input: &[u8]) -> Result<FrequencyMap> {
    let text = decode_text(input)?;
    let map = FrequencyMap::from_text(text);
    debug!(
        "frequency analysis: {} bytes, {} distinct symbols",
        input.len(),
        map.len()
    );
    Ok(map)
}

/// Validates `input` as UTF-8 text.
pub(crate) fn decode_text(input: &[u8]) -> Result<&str> {
    std::str::from_utf8(input).map_err(|e| HuffError::InvalidEncoding {
        offset: e.valid_up_to(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_code_points_not_bytes() {
        let map = analyze("aé€😀a".as_bytes()).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.get('a'), Some(2));
        assert_eq!(map.get('é'), Some(1));
        assert_eq!(map.get('€'), Some(1));
        assert_eq!(map.get('😀'), Some(1));
        assert_eq!(map.total(), Some(5));
    }

    #[test]
    fn test_reference_text() {
        let map = analyze(b"aaaa bbb cc d").unwrap();
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(' ', 3), ('a', 4), ('b', 3), ('c', 2), ('d', 1)]);
    }

    #[test]
    fn test_invalid_utf8_reports_offset() {
        let err = analyze(&[b'a', b'b', 0xFF, b'c']).unwrap_err();
        assert_eq!(err, HuffError::InvalidEncoding { offset: 2 });

        // Truncated multi-byte sequence at the end.
        let err = analyze(&[b'x', 0xE2, 0x82]).unwrap_err();
        assert_eq!(err, HuffError::InvalidEncoding { offset: 1 });
    }

    #[test]
    fn test_empty_input_gives_empty_map() {
        let map = analyze(b"").unwrap();
        assert!(map.is_empty());
        assert_eq!(map.total(), Some(0));
    }

    #[test]
    fn test_total_overflow() {
        let map = FrequencyMap::from_counts([('a', u64::MAX), ('b', 1)]);
        assert_eq!(map.total(), None);
    }
}
