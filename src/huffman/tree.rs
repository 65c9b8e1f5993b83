// src/huffman/tree.rs

//! Huffman tree construction and prefix-code derivation.
//!
//! The builder is a greedy merge over a min-priority queue. Ties are broken
//! by an explicit total order so identical frequency maps always produce
//! identical trees, and therefore identical serialized bytes:
//!
//! 1. lower weight first
//! 2. lower tie symbol first (a leaf's own code point; `U+0000` for internal nodes)
//! 3. lower creation sequence first (leaves in ascending symbol order, then
//!    internal nodes in the order they were merged)

use crate::huffman::bit_unpacker::CodeLookup;
use crate::huffman::frequency::FrequencyMap;
use crate::utils::error::{HuffError, Result};
use bitvec::prelude::*;
use log::{debug, trace};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A binary Huffman tree node.
///
/// Trees rebuilt from serialized bytes carry structure only; their weights
/// are all zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        symbol: char,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    pub fn leaf(symbol: char, weight: u64) -> Self {
        HuffmanNode::Leaf { symbol, weight }
    }

    /// Joins two subtrees under a new internal node whose weight is their sum.
    pub fn merge(left: HuffmanNode, right: HuffmanNode) -> Result<Self> {
        let weight = left
            .weight()
            .checked_add(right.weight())
            .ok_or(HuffError::FrequencyOverflow)?;
        Ok(HuffmanNode::Internal {
            weight,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { weight, .. } => *weight,
            HuffmanNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            HuffmanNode::Leaf { .. } => 1,
            HuffmanNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Length of the longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        match self {
            HuffmanNode::Leaf { .. } => 0,
            HuffmanNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// A single prefix code, most significant bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Code(BitVec<u8, Msb0>);

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, bit: bool) {
        self.0.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().by_vals()
    }

    /// True when `prefix` is a (not necessarily proper) prefix of `self`.
    pub fn starts_with(&self, prefix: &Code) -> bool {
        prefix.len() <= self.len() && self.0[..prefix.len()] == prefix.0[..]
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid bit character {0:?}, expected '0' or '1'")]
pub struct ParseCodeError(pub char);

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut code = Code::new();
        for c in s.chars() {
            match c {
                '0' => code.push(false),
                '1' => code.push(true),
                other => return Err(ParseCodeError(other)),
            }
        }
        Ok(code)
    }
}

/// Symbol to code mapping derived from the leaves of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTable {
    codes: BTreeMap<char, Code>,
}

impl PrefixTable {
    /// Derives codes by a pre-order walk: `0` for left, `1` for right.
    pub fn from_tree(root: &HuffmanNode) -> Self {
        let mut codes = BTreeMap::new();
        let mut prefix = Code::new();
        assign_codes(root, &mut prefix, &mut codes);
        Self { codes }
    }

    pub fn get(&self, symbol: char) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Code)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// Checks that no code is a prefix of another.
    ///
    /// Sorting the textual codes puts any prefix immediately before some
    /// code that extends it, so adjacent pairs are enough.
    pub fn is_prefix_free(&self) -> bool {
        let mut rendered: Vec<String> = self.codes.values().map(Code::to_string).collect();
        rendered.sort();
        rendered.windows(2).all(|pair| !pair[1].starts_with(pair[0].as_str()))
    }

    /// Code to symbol lookup for the table-scan decoder.
    pub fn inverse(&self) -> CodeLookup {
        CodeLookup::from_pairs(self.iter().map(|(symbol, code)| (code.clone(), symbol)))
    }
}

fn assign_codes(node: &HuffmanNode, prefix: &mut Code, codes: &mut BTreeMap<char, Code>) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            codes.insert(*symbol, prefix.clone());
        }
        HuffmanNode::Internal { left, right, .. } => {
            prefix.push(false);
            assign_codes(left, prefix, codes);
            prefix.pop();

            prefix.push(true);
            assign_codes(right, prefix, codes);
            prefix.pop();
        }
    }
}

/// A tree together with the prefix table derived from it.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    root: HuffmanNode,
    table: PrefixTable,
}

impl HuffmanTree {
    /// Runs the greedy merge over `frequencies`.
    ///
    /// Rejects empty maps, zero counts, and maps with fewer than two symbols.
    pub fn build(frequencies: &FrequencyMap) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(HuffError::EmptyFrequencyMap);
        }
        if let Some((symbol, _)) = frequencies.iter().find(|&(_, count)| count == 0) {
            return Err(HuffError::NonPositiveFrequency { symbol });
        }
        if frequencies.len() < 2 {
            return Err(HuffError::InsufficientSymbols);
        }

        let mut queue = BinaryHeap::with_capacity(frequencies.len());
        let mut seq = 0usize;
        for (symbol, count) in frequencies.iter() {
            queue.push(Reverse(QueueEntry::new(HuffmanNode::leaf(symbol, count), seq)));
            seq += 1;
        }

        while queue.len() > 1 {
            let (Some(Reverse(left)), Some(Reverse(right))) = (queue.pop(), queue.pop()) else {
                break;
            };
            trace!(
                "merge #{}: {:?}/{} + {:?}/{}",
                seq,
                left.tie,
                left.weight,
                right.tie,
                right.weight
            );
            let merged = HuffmanNode::merge(left.node, right.node)?;
            queue.push(Reverse(QueueEntry::new(merged, seq)));
            seq += 1;
        }

        let root = queue
            .pop()
            .map(|Reverse(entry)| entry.node)
            .ok_or(HuffError::EmptyFrequencyMap)?;
        let tree = Self::from_root(root);
        debug!(
            "built tree: {} leaves, depth {}, root weight {}",
            tree.table.len(),
            tree.root.depth(),
            tree.root.weight()
        );
        Ok(tree)
    }

    /// Wraps an existing tree and derives its prefix table.
    pub fn from_root(root: HuffmanNode) -> Self {
        let table = PrefixTable::from_tree(&root);
        Self { root, table }
    }

    pub fn root(&self) -> &HuffmanNode {
        &self.root
    }

    pub fn prefix_table(&self) -> &PrefixTable {
        &self.table
    }

    pub fn into_parts(self) -> (HuffmanNode, PrefixTable) {
        (self.root, self.table)
    }
}

/// Priority queue entry ordered by `(weight, tie, seq)`.
struct QueueEntry {
    weight: u64,
    tie: char,
    seq: usize,
    node: HuffmanNode,
}

impl QueueEntry {
    fn new(node: HuffmanNode, seq: usize) -> Self {
        let tie = match &node {
            HuffmanNode::Leaf { symbol, .. } => *symbol,
            HuffmanNode::Internal { .. } => '\0',
        };
        Self {
            weight: node.weight(),
            tie,
            seq,
            node,
        }
    }

    fn key(&self) -> (u64, char, usize) {
        (self.weight, self.tie, self.seq)
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
