// src/utils/error.rs

use thiserror::Error;

/// The error type for every compress and decompress operation in this crate.
///
/// Errors fall into three groups: input validation (bad text or frequencies),
/// container parsing (a blob that does not follow the layout), and decode
/// integrity (a payload that does not match its tree). None of them are
/// recoverable; the whole input should be rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HuffError {
    // Input validation
    #[error("input is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidEncoding { offset: usize },

    #[error("frequency map is empty")]
    EmptyFrequencyMap,

    #[error("frequency for symbol {symbol:?} must be greater than zero")]
    NonPositiveFrequency { symbol: char },

    #[error("at least two distinct symbols are required to build a prefix code")]
    InsufficientSymbols,

    #[error("symbol weights overflow a 64-bit counter")]
    FrequencyOverflow,

    #[error("input of {len} bytes exceeds the configured limit of {max} bytes")]
    InputTooLarge { len: usize, max: usize },

    // Container parsing
    #[error("blob is too short to hold a header")]
    InputTooShort,

    #[error("invalid valid-bit count {0}, expected 1..=8")]
    InvalidBitLength(u8),

    #[error("tree start marker not found")]
    TreeStartNotFound,

    #[error("tree end delimiter not found")]
    TreeEndNotFound,

    #[error("serialized tree is empty")]
    EmptyTreeBytes,

    #[error("no encoded data after the tree delimiter")]
    EncodedDataNotFound,

    #[error("serialized tree is truncated at offset {offset}")]
    TruncatedTree { offset: usize },

    #[error("unexpected tree marker {marker:#04x} at offset {offset}")]
    MalformedTreeMarker { marker: u8, offset: usize },

    #[error("leaf symbol at offset {offset} is not a valid UTF-8 code point")]
    InvalidSymbolEncoding { offset: usize },

    #[error("serialized tree has trailing bytes starting at offset {offset}")]
    TrailingTreeBytes { offset: usize },

    #[error("symbol {0:?} appears more than once in the serialized tree")]
    DuplicateTreeSymbol(char),

    #[error("serialized tree exceeds the maximum depth of {max}")]
    TreeTooDeep { max: usize },

    #[error("attempted to serialize an absent tree node")]
    NullNode,

    // Decode integrity
    #[error("bitstream ended with {pending_bits} bits that match no code")]
    UndecodableBitstream { pending_bits: usize },

    #[error("symbol {0:?} has no entry in the prefix table")]
    UnknownSymbol(char),
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, HuffError>;
