// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content checksums used to confirm two simulation states are identical.
//!
//! Two flavours exist:
//! - [`fletcher32`] runs over a value's canonical byte encoding and is used
//!   for array-like aggregates (matrices, object lists, whole worlds);
//! - [`CombiningHash`] folds raw field words with a `31` multiplier and is
//!   used for small field-structured values (transforms, contact points).
//!
//! Neither is cryptographic. [`crate::PhysWorld::state_hash`] provides a
//! BLAKE3 digest where collision resistance matters.
use std::cell::OnceCell;

/// Fletcher-32 over little-endian 16-bit words; an odd trailing byte is
/// zero-padded.
pub fn fletcher32(bytes: &[u8]) -> u32 {
    let mut sum1: u32 = 0xffff;
    let mut sum2: u32 = 0xffff;
    for chunk in bytes.chunks(2) {
        let lo = u32::from(chunk[0]);
        let hi = chunk.get(1).map_or(0, |b| u32::from(*b));
        sum1 = (sum1 + (lo | (hi << 8))) % 0xffff;
        sum2 = (sum2 + sum1) % 0xffff;
    }
    (sum2 << 16) | sum1
}

/// Order-sensitive combining hash over 64-bit words.
///
/// `h = h * 31 + fold(word)` starting from `17`, where `fold` xors the high
/// half of the word into the low half.
#[derive(Debug, Clone, Copy)]
pub struct CombiningHash {
    state: u32,
}

impl Default for CombiningHash {
    fn default() -> Self {
        Self::new()
    }
}

impl CombiningHash {
    /// Starts a fresh hash.
    pub const fn new() -> Self {
        Self { state: 17 }
    }

    /// Folds an unsigned word.
    pub fn word(mut self, w: u64) -> Self {
        let folded = (w ^ (w >> 32)) as u32;
        self.state = self.state.wrapping_mul(31).wrapping_add(folded);
        self
    }

    /// Folds a signed word (fixed-point raw values).
    pub fn signed(self, w: i64) -> Self {
        self.word(w as u64)
    }

    /// Folds a sequence of signed words.
    pub fn signed_all(self, words: &[i64]) -> Self {
        words.iter().fold(self, |h, w| h.signed(*w))
    }

    /// Returns the accumulated value.
    pub const fn finish(self) -> u32 {
        self.state
    }
}

/// Lazily computed checksum slot, cleared by every mutation of its owner.
///
/// The cache never participates in equality: two owners with identical
/// content compare equal whether or not either has computed its checksum.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChecksumCache(OnceCell<u32>);

impl ChecksumCache {
    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> u32) -> u32 {
        *self.0.get_or_init(compute)
    }

    pub(crate) fn invalidate(&mut self) {
        self.0.take();
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self) -> bool {
        self.0.get().is_some()
    }
}

impl PartialEq for ChecksumCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ChecksumCache {}
