//! Dense primitive layouts (§4.2): `bool`, the fixed-width integers and
//! floats, a UTF-16-code-unit `char`, and length-prefixed strings.
//!
//! Every primitive's [`Layout::Repr`] is a plain decoded array — dictionary
//! encoding is purely a wire-format space optimization chosen by
//! [`Layout::write`], not a distinct in-memory shape, so there is nothing to
//! rematerialize between the two: reading either wire form always yields the
//! same [`PrimitiveVec`].

#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::hash::Hash;
use core::marker::PhantomData;

use indexmap::IndexMap;

use super::{checked_index, ColumnVec, Layout, LayoutBuilder};
use crate::binary::{self, Sink, Source};
use crate::config::Config;
use crate::error::{BonsaiError, FormatError, FormatErrorKind};

const TAG_PLAIN: u8 = 0;
const TAG_DICTIONARY: u8 = 1;

/// The wire format's hard ceiling on distinct dictionary entries: indices
/// are encoded as a single `u8`, so a column with 256 or more distinct
/// values cannot be addressed by dictionary and falls back to plain.
const DICTIONARY_CEILING: usize = 256;

/// A fixed-width or length-prefixed primitive value that the dense layout
/// knows how to read/write and (for dictionary encoding) deduplicate.
///
/// `DictKey` exists separately from `Self` because floats are not `Eq`/
/// `Hash` — `f32`/`f64` key on their bit pattern instead.
pub trait PrimitiveElement: Clone + PartialEq {
    type DictKey: Eq + Hash + Clone;

    fn dict_key(&self) -> Self::DictKey;
    fn write_one<S: Sink>(&self, sink: &mut S) -> Result<(), BonsaiError>;
    fn read_one<R: Source>(source: &mut R) -> Result<Self, BonsaiError>;
}

macro_rules! primitive_element_via_be {
    ($ty:ty, $write:ident, $read:ident) => {
        impl PrimitiveElement for $ty {
            type DictKey = $ty;

            fn dict_key(&self) -> Self::DictKey {
                *self
            }

            fn write_one<S: Sink>(&self, sink: &mut S) -> Result<(), BonsaiError> {
                binary::$write(sink, *self)
            }

            fn read_one<R: Source>(source: &mut R) -> Result<Self, BonsaiError> {
                binary::$read(source)
            }
        }
    };
}

primitive_element_via_be!(bool, write_bool, read_bool);
primitive_element_via_be!(i8, write_i8, read_i8);
primitive_element_via_be!(i16, write_i16, read_i16);
primitive_element_via_be!(i32, write_i32, read_i32);
primitive_element_via_be!(i64, write_i64, read_i64);

impl PrimitiveElement for f32 {
    type DictKey = u32;

    fn dict_key(&self) -> u32 {
        self.to_bits()
    }

    fn write_one<S: Sink>(&self, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_f32(sink, *self)
    }

    fn read_one<R: Source>(source: &mut R) -> Result<Self, BonsaiError> {
        binary::read_f32(source)
    }
}

impl PrimitiveElement for f64 {
    type DictKey = u64;

    fn dict_key(&self) -> u64 {
        self.to_bits()
    }

    fn write_one<S: Sink>(&self, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_f64(sink, *self)
    }

    fn read_one<R: Source>(source: &mut R) -> Result<Self, BonsaiError> {
        binary::read_f64(source)
    }
}

/// A single UTF-16 code unit. Distinct from Rust's own `char` (a full
/// Unicode scalar value) to keep the wire width honest at 2 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Char16(pub u16);

impl PrimitiveElement for Char16 {
    type DictKey = u16;

    fn dict_key(&self) -> u16 {
        self.0
    }

    fn write_one<S: Sink>(&self, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_u16(sink, self.0)
    }

    fn read_one<R: Source>(source: &mut R) -> Result<Self, BonsaiError> {
        Ok(Char16(binary::read_u16(source)?))
    }
}

impl PrimitiveElement for String {
    type DictKey = String;

    fn dict_key(&self) -> String {
        self.clone()
    }

    fn write_one<S: Sink>(&self, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_str(sink, self)
    }

    fn read_one<R: Source>(source: &mut R) -> Result<Self, BonsaiError> {
        binary::read_str(source)
    }
}

/// Physical representation for every dense primitive layout: a plain,
/// fully-decoded array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimitiveVec<T>(pub(crate) Vec<T>);

impl<T: Clone> ColumnVec<T> for PrimitiveVec<T> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn try_get(&self, i: usize) -> Result<T, BonsaiError> {
        checked_index(i, self.0.len())?;
        Ok(self.0[i].clone())
    }
}

/// Builder for [`PrimitiveVec`].
#[derive(Clone, Debug, Default)]
pub struct PrimitiveBuilder<T> {
    values: Vec<T>,
}

impl<T> LayoutBuilder<T> for PrimitiveBuilder<T> {
    type Repr = PrimitiveVec<T>;

    fn push(&mut self, value: T) {
        self.values.push(value);
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn finish(self) -> Self::Repr {
        PrimitiveVec(self.values)
    }
}

/// Layout for a dense array of `T`, choosing plain vs. byte-dictionary
/// encoding on write per §4.2. `max_dictionary_len` is captured at
/// construction (defaulting to the wire format's 256-entry ceiling) so that
/// `write`/`is_safe_to_cast` can honor [`Config::max_dictionary_len`] without
/// needing a `Config` argument of their own.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveLayout<T> {
    max_dictionary_len: usize,
    _marker: PhantomData<T>,
}

impl<T> Default for PrimitiveLayout<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PrimitiveLayout<T> {
    pub fn new() -> Self {
        Self {
            max_dictionary_len: DICTIONARY_CEILING,
            _marker: PhantomData,
        }
    }

    /// Build a layout honoring `config`'s byte-dictionary ceiling.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_dictionary_len: (config.max_dictionary_len as usize).min(DICTIONARY_CEILING),
            _marker: PhantomData,
        }
    }
}

impl<T: PrimitiveElement> Layout<T> for PrimitiveLayout<T> {
    type Repr = PrimitiveVec<T>;
    type Builder = PrimitiveBuilder<T>;

    fn new_builder(&self, _config: &Config) -> Self::Builder {
        PrimitiveBuilder::default()
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        let values = &repr.0;
        let ceiling = self.max_dictionary_len;
        let mut dict: IndexMap<T::DictKey, u32> = IndexMap::new();
        let mut indices: Vec<u32> = Vec::with_capacity(values.len());
        let mut overflowed = false;
        for v in values {
            let key = v.dict_key();
            let next_index = dict.len() as u32;
            let idx = *dict.entry(key).or_insert(next_index);
            if dict.len() >= ceiling {
                overflowed = true;
                break;
            }
            indices.push(idx);
        }

        if overflowed || dict.len() >= ceiling {
            binary::write_u8(sink, TAG_PLAIN)?;
            binary::write_u32(sink, values.len() as u32)?;
            for v in values {
                v.write_one(sink)?;
            }
            return Ok(());
        }

        binary::write_u8(sink, TAG_DICTIONARY)?;
        binary::write_u32(sink, dict.len() as u32)?;
        // Recover each dictionary entry's value in insertion order. We kept
        // only keys in `dict`; reconstruct owned values by scanning once
        // more (cheap relative to the dictionary's own construction cost).
        let mut ordered_values: Vec<Option<T>> = (0..dict.len()).map(|_| None).collect();
        for v in values {
            let idx = dict[&v.dict_key()] as usize;
            if ordered_values[idx].is_none() {
                ordered_values[idx] = Some(v.clone());
            }
        }
        for entry in ordered_values {
            entry
                .expect("every dictionary slot is populated by construction")
                .write_one(sink)?;
        }
        binary::write_u32(sink, indices.len() as u32)?;
        for idx in &indices {
            binary::write_u8(sink, *idx as u8)?;
        }
        Ok(())
    }

    fn read<R: Source>(&self, source: &mut R, _config: &Config) -> Result<Self::Repr, BonsaiError> {
        let tag = binary::read_u8(source)?;
        match tag {
            TAG_PLAIN => {
                let len = binary::read_u32(source)? as usize;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(T::read_one(source)?);
                }
                Ok(PrimitiveVec(values))
            }
            TAG_DICTIONARY => {
                let dict_len = binary::read_u32(source)? as usize;
                if dict_len >= DICTIONARY_CEILING {
                    return Err(FormatError::new(FormatErrorKind::DictionaryTooLarge {
                        len: dict_len as u32,
                    })
                    .into());
                }
                let mut dict = Vec::with_capacity(dict_len);
                for _ in 0..dict_len {
                    dict.push(T::read_one(source)?);
                }
                let idx_len = binary::read_u32(source)? as usize;
                let mut values = Vec::with_capacity(idx_len);
                for _ in 0..idx_len {
                    let idx = binary::read_u8(source)? as usize;
                    values.push(dict.get(idx).cloned().ok_or_else(|| {
                        FormatError::new(FormatErrorKind::DictionaryIndexOutOfRange {
                            index: idx as u32,
                            dict_len: dict_len as u32,
                        })
                    })?);
                }
                Ok(PrimitiveVec(values))
            }
            other => Err(FormatError::new(FormatErrorKind::UnknownPrimitiveTag { tag: other }).into()),
        }
    }

    /// Reports whether `write` would choose plain encoding (`true`) rather
    /// than paying the dictionary-construction cost — the one place this
    /// trait method still has non-trivial behavior, since primitive is the
    /// only layout with two wire-level encodings for one `Repr` shape.
    fn is_safe_to_cast(&self, repr: &Self::Repr) -> bool {
        distinct_count_at_least(&repr.0, self.max_dictionary_len)
    }
}

/// Whether `values` has at least `ceiling` distinct `dict_key()`s, without
/// building a dictionary any larger than necessary to answer that.
fn distinct_count_at_least<T: PrimitiveElement>(values: &[T], ceiling: usize) -> bool {
    let mut dict: IndexMap<T::DictKey, ()> = IndexMap::new();
    for v in values {
        dict.insert(v.dict_key(), ());
        if dict.len() >= ceiling {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: PrimitiveElement + core::fmt::Debug>(values: Vec<T>) -> PrimitiveVec<T> {
        let layout = PrimitiveLayout::<T>::new();
        let repr = PrimitiveVec(values);
        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        let mut cursor = &buf[..];
        let restored = layout.read(&mut cursor, &Config::default()).unwrap();
        assert_eq!(restored.0, repr.0);
        restored
    }

    #[test]
    fn bool_roundtrip() {
        roundtrip(vec![true, false, true, true, false]);
    }

    #[test]
    fn i32_roundtrip_uses_dictionary_for_repeats() {
        let layout = PrimitiveLayout::<i32>::new();
        let repr = PrimitiveVec(vec![1, 1, 1, 2, 2, 1]);
        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        assert_eq!(buf[0], TAG_DICTIONARY);
    }

    #[test]
    fn i32_roundtrip_plain_for_all_distinct() {
        let layout = PrimitiveLayout::<i32>::new();
        let repr = PrimitiveVec((0..10).collect());
        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        assert_eq!(buf[0], TAG_PLAIN);
    }

    /// §8: "Primitive dense layouts do not use byte-dictionary encoding
    /// when the input has exactly 256 distinct values."
    #[test]
    fn exactly_256_distinct_values_uses_plain() {
        let layout = PrimitiveLayout::<i32>::new();
        let repr = PrimitiveVec((0..256).collect());
        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        assert_eq!(buf[0], TAG_PLAIN);
        assert!(layout.is_safe_to_cast(&repr));
    }

    #[test]
    fn fewer_than_256_distinct_values_uses_dictionary() {
        let layout = PrimitiveLayout::<i32>::new();
        let values: Vec<i32> = (0..255).chain(core::iter::once(0)).collect();
        let repr = PrimitiveVec(values);
        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        assert_eq!(buf[0], TAG_DICTIONARY);
        assert!(!layout.is_safe_to_cast(&repr));
    }

    #[test]
    fn float_roundtrip() {
        roundtrip(vec![1.5f32, -2.25, f32::NAN, 0.0, -0.0]);
    }

    #[test]
    fn char16_roundtrip() {
        roundtrip(vec![Char16(b'a' as u16), Char16(0x4e2d)]);
    }

    #[test]
    fn string_roundtrip() {
        roundtrip(vec![
            String::from("hello"),
            String::from(""),
            String::from("世界"),
        ]);
    }

    #[test]
    fn empty_roundtrip() {
        let restored = roundtrip::<i32>(vec![]);
        assert!(restored.0.is_empty());
    }

    #[test]
    fn unknown_tag_is_format_error() {
        let layout = PrimitiveLayout::<i32>::new();
        let buf: Vec<u8> = vec![0x7f, 0, 0, 0, 0];
        let mut cursor = &buf[..];
        let err = layout.read(&mut cursor, &Config::default()).unwrap_err();
        assert!(matches!(err, BonsaiError::Format(_)));
    }
}
