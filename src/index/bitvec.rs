//! Packed bit vector
//!
//! Bits are stored LSB-first in `u64` words. Words past the last set bit are
//! never allocated; reads beyond the backing words return zero, so a vector is
//! implicitly zero-extended to whatever logical length its owner tracks.

use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 64;

/// Growable packed bit set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitVector {
    words: Vec<u64>,
}

impl BitVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bit at `pos`, growing as needed
    pub fn set(&mut self, pos: usize) {
        let word = pos / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (pos % WORD_BITS);
    }

    pub fn get(&self, pos: usize) -> bool {
        self.words
            .get(pos / WORD_BITS)
            .map_or(false, |w| (w >> (pos % WORD_BITS)) & 1 == 1)
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Bitwise AND
    pub fn intersect(&self, other: &Self) -> Self {
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| a & b)
            .collect();
        Self { words }
    }

    /// Set positions in ascending order
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }

    /// `"0"`/`"1"` rendering of the first `len` bits
    pub fn to_bit_string(&self, len: usize) -> String {
        (0..len).map(|pos| if self.get(pos) { '1' } else { '0' }).collect()
    }
}
