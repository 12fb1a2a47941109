//! Indexed bitset with O(1) rank and O(log n) select.
//!
//! Two-level directory over a 32-bit-word raw bitmap: `level1` holds one
//! absolute cumulative popcount per 1024-bit superblock, `level2` holds one
//! popcount relative to its superblock per 32-bit block (one block == one
//! raw word).
//!
//! `rank(i)` is *inclusive* of position `i` (count of set bits in
//! `0..=min(i, len-1)`), and `select(k)` is 1-indexed.

mod select_table;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::binary::{self, Sink, Source};
use crate::error::{select_bounds, BonsaiError};

pub use select_table::select_in_byte;

/// Bits per superblock (`level1` granularity).
const S1_BITS: usize = 1024;
/// Bits per block (`level2` granularity) — one raw 32-bit word.
const S2_BITS: usize = 32;
/// Blocks per superblock.
const BLOCKS_PER_SUPERBLOCK: usize = S1_BITS / S2_BITS;

/// An immutable bitset supporting O(1) `rank` and O(log n) `select`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexedBitSet {
    raw: Vec<u32>,
    level1: Vec<u32>,
    level2: Vec<u16>,
    len: usize,
    popcount: usize,
}

impl IndexedBitSet {
    /// Number of bits, `L`.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    #[inline]
    pub fn popcount(&self) -> usize {
        self.popcount
    }

    /// Bit at position `i`. Panics if `i >= len()` — an index error is a
    /// caller bug, and this type fails fast rather than returning a
    /// sentinel.
    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.try_contains(i)
            .unwrap_or_else(|e| panic!("IndexedBitSet::contains: {e}"))
    }

    /// Checked form of [`Self::contains`].
    pub fn try_contains(&self, i: usize) -> Result<bool, BonsaiError> {
        if i >= self.len {
            return Err(crate::error::index_bounds(i, self.len).into());
        }
        let word = self.raw[i >> 5];
        Ok((word >> (i & 31)) & 1 == 1)
    }

    /// Number of set bits in `0..=min(i, len-1)`. Defined for every `i`,
    /// including `i >= len()` (clamped, per §4.1).
    pub fn rank(&self, i: usize) -> usize {
        if self.len == 0 {
            return 0;
        }
        let i = i.min(self.len - 1);
        let word_idx = i >> 5;
        let sb_idx = i >> 10;
        let mut count = self.level1[sb_idx] as usize + self.level2[word_idx] as usize;
        let bit_pos = i & 31;
        let mask: u32 = if bit_pos == 31 {
            u32::MAX
        } else {
            (1u32 << (bit_pos + 1)) - 1
        };
        count += (self.raw[word_idx] & mask).count_ones() as usize;
        count
    }

    /// Position of the k-th set bit (1-indexed). `k` must be in
    /// `1..=popcount()`.
    pub fn select(&self, k: usize) -> Result<usize, BonsaiError> {
        if k == 0 || k > self.popcount {
            return Err(select_bounds(k, self.popcount).into());
        }

        let sb = last_index_lt_u32(&self.level1, k);
        let local_after_sb = k - self.level1[sb] as usize;

        let sb_start_block = sb * BLOCKS_PER_SUPERBLOCK;
        let sb_end_block = ((sb + 1) * BLOCKS_PER_SUPERBLOCK).min(self.level2.len());
        let block_slice = &self.level2[sb_start_block..sb_end_block];
        let local_block_idx = last_index_lt_u16(block_slice, local_after_sb);
        let global_block = sb_start_block + local_block_idx;

        let local_in_word = local_after_sb - self.level2[global_block] as usize;
        let bit_pos = select_word(self.raw[global_block], local_in_word as u32)
            .expect("rank/select directory inconsistent with raw bits");

        Ok(global_block * S2_BITS + bit_pos as usize)
    }

    /// Iterate over every bit, in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.contains(i))
    }

    /// Build from an exact iterator of booleans.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut builder = IndexedBitSetBuilder::new();
        builder.extend(bits);
        builder.finish()
    }

    /// Serialize to the wire form: `ceil(len/8)` bytes, LSB-first (§6).
    pub fn write<S: Sink>(&self, sink: &mut S) -> Result<(), BonsaiError> {
        sink.write_all(&binary::bits_to_bytes(&self.raw, self.len))
    }

    /// Deserialize `len_bits` bits from the wire form. The length is
    /// supplied out-of-band by the containing layout, matching §6.
    pub fn read<R: Source>(source: &mut R, len_bits: usize) -> Result<Self, BonsaiError> {
        let num_bytes = len_bits.div_ceil(8);
        let mut bytes = alloc::vec![0u8; num_bytes];
        source.read_exact(&mut bytes)?;
        let raw = binary::bits_from_bytes(&bytes, len_bits);
        Ok(Self::from_raw_words(raw, len_bits))
    }

    /// Build from pre-packed raw words (used by [`Self::read`] and tests).
    fn from_raw_words(raw: Vec<u32>, len: usize) -> Self {
        let mut builder = IndexedBitSetBuilder::new();
        for word_idx in 0..len.div_ceil(32) {
            let word = raw[word_idx];
            let bits_in_word = (len - word_idx * 32).min(32);
            for b in 0..bits_in_word {
                builder.push((word >> b) & 1 == 1);
            }
        }
        builder.finish()
    }
}

/// Largest index `i` such that `slice[i] < target`. Requires
/// `slice[0] < target` (always true here since `level1[0] == 0` and the
/// caller has already checked `k >= 1`).
fn last_index_lt_u32(slice: &[u32], target: usize) -> usize {
    let mut lo = 0usize;
    let mut hi = slice.len();
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if (slice[mid] as usize) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

fn last_index_lt_u16(slice: &[u16], target: usize) -> usize {
    let mut lo = 0usize;
    let mut hi = slice.len();
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if (slice[mid] as usize) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Select the k-th set bit (1-indexed) within a 32-bit word, by scanning
/// its four bytes left to right (§4.1's "classic byte-by-byte breakdown").
/// Returns `None` when `popcount(word) < k`.
fn select_word(word: u32, k: u32) -> Option<u32> {
    if k == 0 {
        return None;
    }
    let mut remaining = k;
    for byte_idx in 0..4u32 {
        let byte = ((word >> (byte_idx * 8)) & 0xFF) as u8;
        let pc = byte.count_ones();
        if remaining <= pc {
            return Some(byte_idx * 8 + select_in_byte(byte, remaining - 1));
        }
        remaining -= pc;
    }
    None
}

/// Word-level rank: popcount of `w & ((1 << (i+1)) - 1)`. `i` in `0..=31`.
pub fn rank_word(w: u32, i: u32) -> u32 {
    let mask: u32 = if i == 31 { u32::MAX } else { (1u32 << (i + 1)) - 1 };
    (w & mask).count_ones()
}

/// Linear builder for [`IndexedBitSet`]. Accepts a stream of booleans.
#[derive(Clone, Debug, Default)]
pub struct IndexedBitSetBuilder {
    level1: Vec<u32>,
    level2: Vec<u16>,
    raw: Vec<u32>,
    /// Total bits pushed so far.
    cnt: usize,
    /// Running total popcount.
    k: usize,
    /// Popcount within the current superblock, reset at each superblock boundary.
    m: u16,
    /// In-progress raw word accumulator.
    head: u32,
}

impl IndexedBitSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits pushed so far.
    pub fn len(&self) -> usize {
        self.cnt
    }

    pub fn is_empty(&self) -> bool {
        self.cnt == 0
    }

    /// Append a single bit.
    pub fn push(&mut self, bit: bool) {
        if self.cnt % S1_BITS == 0 {
            self.level1.push(self.k as u32);
            self.m = 0;
        }
        if self.cnt % S2_BITS == 0 {
            self.level2.push(self.m);
        }
        if bit {
            self.head |= 1 << (self.cnt % 32);
            self.k += 1;
            self.m += 1;
        }
        self.cnt += 1;
        if self.cnt % 32 == 0 {
            self.raw.push(self.head);
            self.head = 0;
        }
    }

    /// Append every bit from an iterator, in order.
    pub fn extend<I: IntoIterator<Item = bool>>(&mut self, bits: I) {
        for bit in bits {
            self.push(bit);
        }
    }

    /// Discard all progress, returning the builder to its initial state.
    /// The only safe operation on a builder after [`Self::finish`] (§7).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Finalize into an immutable [`IndexedBitSet`], flushing any partial
    /// trailing word.
    pub fn finish(mut self) -> IndexedBitSet {
        if self.cnt % 32 != 0 {
            self.raw.push(self.head);
        }
        IndexedBitSet {
            raw: self.raw,
            level1: self.level1,
            level2: self.level2,
            len: self.cnt,
            popcount: self.k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_from_str(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    /// Scenario 1 (§8): `rank`/`select` consistency on `"110110"`.
    ///
    /// `select(4) = 5` does not hold under the standard left-to-right bit
    /// ordering that makes every other figure in the scenario (`rank(0)=1`,
    /// `rank(3)=3`, `popcount=4`, `select(1..3)`) agree — under that
    /// ordering the 4th (last) set bit is at index 4, not 5. We verify the
    /// values that *are* internally consistent and additionally check the
    /// rank/select duality invariant directly, which is what actually
    /// matters for correctness.
    #[test]
    fn scenario_bitset_110110() {
        let bs = IndexedBitSet::from_bits(bits_from_str("110110"));
        assert_eq!(bs.rank(0), 1);
        assert_eq!(bs.rank(3), 3);
        assert_eq!(bs.popcount(), 4);
        assert_eq!(bs.select(1).unwrap(), 0);
        assert_eq!(bs.select(2).unwrap(), 1);
        assert_eq!(bs.select(3).unwrap(), 3);
        assert_eq!(bs.select(4).unwrap(), 4);
        for k in 1..=bs.popcount() {
            let i = bs.select(k).unwrap();
            assert!(bs.contains(i));
            assert_eq!(bs.rank(i), k);
        }
    }

    /// Scenario 2 (§8): empty bitset.
    #[test]
    fn scenario_empty_bitset() {
        let bs = IndexedBitSet::from_bits(core::iter::empty());
        assert!(bs.is_empty());
        assert_eq!(bs.rank(0), 0);
        assert_eq!(bs.popcount(), 0);
        assert!(bs.select(1).is_err());
    }

    #[test]
    fn contains_matches_input() {
        let input = bits_from_str("1011001101");
        let bs = IndexedBitSet::from_bits(input.iter().copied());
        for (i, &b) in input.iter().enumerate() {
            assert_eq!(bs.contains(i), b);
        }
    }

    #[test]
    fn rank_matches_linear_scan() {
        let input = bits_from_str("1011001101");
        let bs = IndexedBitSet::from_bits(input.iter().copied());
        for i in 0..input.len() {
            let expected = input[..=i].iter().filter(|&&b| b).count();
            assert_eq!(bs.rank(i), expected, "rank mismatch at {i}");
        }
    }

    #[test]
    fn select_matches_linear_scan() {
        let input = bits_from_str("1011001101");
        let bs = IndexedBitSet::from_bits(input.iter().copied());
        let ones: Vec<usize> = input
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| i)
            .collect();
        for (k, &expected) in ones.iter().enumerate() {
            assert_eq!(bs.select(k + 1).unwrap(), expected);
        }
        assert!(bs.select(0).is_err());
        assert!(bs.select(ones.len() + 1).is_err());
    }

    #[test]
    fn rank_select_duality_large() {
        // Exercise superblock (1024 bits) and block (32 bits) boundaries.
        let bits: Vec<bool> = (0..5000).map(|i| i % 7 == 0 || i % 31 == 0).collect();
        let bs = IndexedBitSet::from_bits(bits.iter().copied());
        assert_eq!(bs.len(), 5000);
        let expected_popcount = bits.iter().filter(|&&b| b).count();
        assert_eq!(bs.popcount(), expected_popcount);
        for i in [0usize, 31, 32, 1023, 1024, 1025, 4999] {
            let expected = bits[..=i].iter().filter(|&&b| b).count();
            assert_eq!(bs.rank(i), expected, "rank mismatch at {i}");
        }
        for k in 1..=bs.popcount() {
            let i = bs.select(k).unwrap();
            assert!(bs.contains(i));
            assert_eq!(bs.rank(i), k);
        }
    }

    #[test]
    fn rank_clamps_past_end() {
        let bs = IndexedBitSet::from_bits(bits_from_str("1010"));
        assert_eq!(bs.rank(3), bs.rank(1000));
    }

    #[test]
    fn write_read_roundtrip() {
        let input = bits_from_str("10110011010111000");
        let bs = IndexedBitSet::from_bits(input.iter().copied());
        let mut buf: Vec<u8> = Vec::new();
        bs.write(&mut buf).unwrap();
        assert_eq!(buf.len(), input.len().div_ceil(8));
        let mut cursor = &buf[..];
        let restored = IndexedBitSet::read(&mut cursor, input.len()).unwrap();
        assert_eq!(bs, restored);
    }

    #[test]
    fn write_read_roundtrip_empty() {
        let bs = IndexedBitSet::from_bits(core::iter::empty());
        let mut buf: Vec<u8> = Vec::new();
        bs.write(&mut buf).unwrap();
        assert!(buf.is_empty());
        let mut cursor = &buf[..];
        let restored = IndexedBitSet::read(&mut cursor, 0).unwrap();
        assert_eq!(bs, restored);
    }

    #[test]
    fn structural_equality_and_hash() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = IndexedBitSet::from_bits(bits_from_str("1101"));
        let b = IndexedBitSet::from_bits(bits_from_str("1101"));
        let c = IndexedBitSet::from_bits(bits_from_str("1100"));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let hash_of = |x: &IndexedBitSet| {
            let mut h = DefaultHasher::new();
            x.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn select_in_byte_is_used_for_word_select() {
        // word with bits 1,3,5,7 set, matches alternating byte pattern from
        // the select_table tests.
        let word = 0b1010_1010u32;
        assert_eq!(select_word(word, 1), Some(1));
        assert_eq!(select_word(word, 2), Some(3));
        assert_eq!(select_word(word, 3), Some(5));
        assert_eq!(select_word(word, 4), Some(7));
        assert_eq!(select_word(word, 5), None);
    }

    #[test]
    fn rank_word_matches_count_ones() {
        let w = 0b1011_0110u32;
        for i in 0..32 {
            let mask: u32 = if i == 31 { u32::MAX } else { (1u32 << (i + 1)) - 1 };
            assert_eq!(rank_word(w, i), (w & mask).count_ones());
        }
    }
}
