//! Binary serialization primitives shared by every wire form in §6.
//!
//! All multi-byte integers and floats are big-endian; the one exception is
//! the indexed bitset's raw bits, which are packed LSB-first *within each
//! byte* (a bit-addressing convention, not a word endianness choice — see
//! [`bits_to_bytes`]).

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{BonsaiError, FormatError, FormatErrorKind};

/// A byte sink. Implemented for `std::io::Write` under `feature = "std"`;
/// `no_std` callers can implement it directly for their own buffer type.
pub trait Sink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), BonsaiError>;
}

#[cfg(feature = "std")]
impl<W: std::io::Write> Sink for W {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), BonsaiError> {
        std::io::Write::write_all(self, bytes).map_err(BonsaiError::from)
    }
}

/// A byte source. Implemented for `std::io::Read` under `feature = "std"`.
pub trait Source {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BonsaiError>;
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Source for R {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BonsaiError> {
        std::io::Read::read_exact(self, buf).map_err(BonsaiError::from)
    }
}

macro_rules! be_rw {
    ($write_name:ident, $read_name:ident, $ty:ty) => {
        pub fn $write_name<S: Sink>(sink: &mut S, value: $ty) -> Result<(), BonsaiError> {
            sink.write_all(&value.to_be_bytes())
        }

        pub fn $read_name<R: Source>(source: &mut R) -> Result<$ty, BonsaiError> {
            let mut buf = [0u8; core::mem::size_of::<$ty>()];
            source.read_exact(&mut buf)?;
            Ok(<$ty>::from_be_bytes(buf))
        }
    };
}

be_rw!(write_u8, read_u8, u8);
be_rw!(write_u16, read_u16, u16);
be_rw!(write_u32, read_u32, u32);
be_rw!(write_u64, read_u64, u64);
be_rw!(write_i8, read_i8, i8);
be_rw!(write_i16, read_i16, i16);
be_rw!(write_i32, read_i32, i32);
be_rw!(write_i64, read_i64, i64);

pub fn write_f32<S: Sink>(sink: &mut S, value: f32) -> Result<(), BonsaiError> {
    write_u32(sink, value.to_bits())
}

pub fn read_f32<R: Source>(source: &mut R) -> Result<f32, BonsaiError> {
    Ok(f32::from_bits(read_u32(source)?))
}

pub fn write_f64<S: Sink>(sink: &mut S, value: f64) -> Result<(), BonsaiError> {
    write_u64(sink, value.to_bits())
}

pub fn read_f64<R: Source>(source: &mut R) -> Result<f64, BonsaiError> {
    Ok(f64::from_bits(read_u64(source)?))
}

pub fn write_bool<S: Sink>(sink: &mut S, value: bool) -> Result<(), BonsaiError> {
    sink.write_all(&[value as u8])
}

pub fn read_bool<R: Source>(source: &mut R) -> Result<bool, BonsaiError> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf)?;
    Ok(buf[0] != 0)
}

/// Length-prefixed UTF-8 string using a `u16` byte length, the "modified
/// UTF-8" `writeUTF` convention named in §6.
pub fn write_str<S: Sink>(sink: &mut S, value: &str) -> Result<(), BonsaiError> {
    let bytes = value.as_bytes();
    write_u16(sink, bytes.len() as u16)?;
    sink.write_all(bytes)
}

pub fn read_str<R: Source>(source: &mut R) -> Result<alloc::string::String, BonsaiError> {
    let len = read_u16(source)? as usize;
    let mut buf = alloc::vec![0u8; len];
    source.read_exact(&mut buf)?;
    alloc::string::String::from_utf8(buf)
        .map_err(|_| FormatError::new(FormatErrorKind::InvalidUtf8).into())
}

/// Pack bits LSB-first into `ceil(len_bits / 8)` bytes.
///
/// `words` holds `len_bits` logical bits, 32 per word, bit `i` at
/// `words[i >> 5]` bit `i & 31`. Because `u32::to_le_bytes` always yields
/// the bytes in increasing-significance order regardless of host
/// endianness, concatenating each word's little-endian bytes reproduces
/// exactly the "byte `i/8`, position `i%8`, LSB = bit 0" rule from §6 on
/// every platform.
pub fn bits_to_bytes(words: &[u32], len_bits: usize) -> Vec<u8> {
    let total_bytes = len_bits.div_ceil(8);
    let mut out = Vec::with_capacity(total_bytes);
    for word in words {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out.truncate(total_bytes);
    out
}

/// Inverse of [`bits_to_bytes`]: unpack `len_bits` bits from their byte form
/// into 32-bit words, zero-padding the final partial word.
pub fn bits_from_bytes(bytes: &[u8], len_bits: usize) -> Vec<u32> {
    let num_words = len_bits.div_ceil(32);
    let mut out = Vec::with_capacity(num_words);
    for w in 0..num_words {
        let mut buf = [0u8; 4];
        let start = w * 4;
        let end = (start + 4).min(bytes.len());
        if start < bytes.len() {
            buf[..end - start].copy_from_slice(&bytes[start..end]);
        }
        out.push(u32::from_le_bytes(buf));
    }
    out
}

/// Reinterpret a whole `&[u32]` buffer as bytes, exactly-sized (`len * 4`),
/// via a zero-copy `bytemuck` cast. Host-endian, unlike [`bits_to_bytes`]:
/// this pair is for passing a word buffer to something that will read it
/// back with [`bytes_to_words`] on the same host (e.g. a memory-mapped
/// scratch file), not for the portable bit-addressed wire encoding above.
pub fn words_to_bytes(words: &[u32]) -> &[u8] {
    bytemuck::cast_slice(words)
}

/// Inverse of [`words_to_bytes`]. Panics if `bytes.len()` is not a multiple
/// of 4 (word-aligned).
pub fn bytes_to_words(bytes: &[u8]) -> &[u32] {
    bytemuck::cast_slice(bytes)
}

/// Owned form of [`bytes_to_words`], for sources that don't already hold an
/// aligned `&[u8]` (e.g. a freshly read `Vec<u8>`).
pub fn bytes_to_words_vec(bytes: &[u8]) -> Vec<u32> {
    bytes_to_words(bytes).to_vec()
}

/// Checked form of [`bytes_to_words`]: `None` if `bytes.len()` is not a
/// multiple of 4, instead of panicking.
pub fn try_bytes_to_words(bytes: &[u8]) -> Option<&[u32]> {
    bytemuck::try_cast_slice(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_roundtrip_partial_byte() {
        // 6 bits: 0b11_0110 with bit0 = LSB => the "110110" scenario.
        let mut word = 0u32;
        for (i, bit) in [true, true, false, true, true, false].iter().enumerate() {
            if *bit {
                word |= 1 << i;
            }
        }
        let bytes = bits_to_bytes(&[word], 6);
        assert_eq!(bytes.len(), 1);
        let words = bits_from_bytes(&bytes, 6);
        assert_eq!(words[0] & 0b11_1111, word & 0b11_1111);
    }

    #[test]
    fn bits_roundtrip_multi_word() {
        let words = [0xDEAD_BEEFu32, 0x0000_0001u32];
        let len_bits = 40; // 32 + 8
        let bytes = bits_to_bytes(&words, len_bits);
        assert_eq!(bytes.len(), 5);
        let back = bits_from_bytes(&bytes, len_bits);
        assert_eq!(back[0], words[0]);
        assert_eq!(back[1] & 0xFF, words[1] & 0xFF);
    }

    #[test]
    fn be_integers_roundtrip() {
        let mut buf: Vec<u8> = Vec::new();
        write_u32(&mut buf, 0x0102_0304).unwrap();
        assert_eq!(buf, vec![0x01, 0x02, 0x03, 0x04]);
        let mut cursor = &buf[..];
        assert_eq!(read_u32(&mut cursor).unwrap(), 0x0102_0304);
    }

    #[test]
    fn string_roundtrip() {
        let mut buf: Vec<u8> = Vec::new();
        write_str(&mut buf, "hello").unwrap();
        let mut cursor = &buf[..];
        assert_eq!(read_str(&mut cursor).unwrap(), "hello");
    }

    #[test]
    fn words_bytes_roundtrip() {
        let words: Vec<u32> = vec![0xDEAD_BEEF, 0x1234_5678, 0];
        let bytes = words_to_bytes(&words);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes_to_words(bytes), &words[..]);
        assert_eq!(bytes_to_words_vec(bytes), words);
    }

    #[test]
    fn try_bytes_to_words_rejects_misaligned_length() {
        assert!(try_bytes_to_words(&[0u8; 7]).is_none());
        assert!(try_bytes_to_words(&[0u8; 8]).is_some());
    }
}
