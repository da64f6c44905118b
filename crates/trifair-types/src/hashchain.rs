// Path: crates/trifair-types/src/hashchain.rs
//! Hash-chain record shape (§4.6).

use crate::entropy::Digest32;
use serde::{Deserialize, Serialize};

/// An ordered sequence `h[0..L-1]` with `h[L-1] = SHA256(terminalSeed)` and
/// `h[i] = SHA256(h[i+1])` for `i < L-1`. `h[0]` is published as the initial
/// commitment; later links are revealed one at a time, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashChain {
    pub links: Vec<Digest32>,
}

impl HashChain {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The commitment published before any reveal: `h[0]`.
    pub fn commitment(&self) -> Option<&Digest32> {
        self.links.first()
    }

    pub fn link(&self, index: usize) -> Option<&Digest32> {
        self.links.get(index)
    }
}

/// Outcome of verifying a partially revealed chain (§4.6, §8 scenario 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainVerification {
    pub valid: bool,
    /// Index of the first link that failed to hash back to its predecessor,
    /// if any.
    pub invalid_index: Option<usize>,
}
