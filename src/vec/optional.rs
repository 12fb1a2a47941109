//! Optional layout (§4.2): `Vec<Option<A>>` backed by an inner column plus a
//! presence [`IndexedBitSet`].

use super::{ColumnVec, Layout, LayoutBuilder};
use crate::bits::{IndexedBitSet, IndexedBitSetBuilder};
use crate::binary::{self, Sink, Source};
use crate::config::Config;
use crate::error::{index_bounds, BonsaiError, FormatError, FormatErrorKind};

const TAG_OPTIONAL: u8 = 1;

/// Physical representation of an [`OptionalLayout`]: the inner child
/// `Repr` holding only the present values, plus a presence bitset.
pub struct OptionalVec<A, LA: Layout<A>> {
    inner: LA::Repr,
    presence: IndexedBitSet,
}

impl<A, LA: Layout<A>> ColumnVec<Option<A>> for OptionalVec<A, LA> {
    fn len(&self) -> usize {
        self.presence.len()
    }

    fn try_get(&self, i: usize) -> Result<Option<A>, BonsaiError> {
        if i >= self.presence.len() {
            return Err(index_bounds(i, self.presence.len()).into());
        }
        if self.presence.contains(i) {
            let inner_idx = self.presence.rank(i) - 1;
            Ok(Some(self.inner.try_get(inner_idx)?))
        } else {
            Ok(None)
        }
    }
}

pub struct OptionalBuilder<A, LA: Layout<A>> {
    inner: LA::Builder,
    presence: IndexedBitSetBuilder,
}

impl<A, LA: Layout<A>> LayoutBuilder<Option<A>> for OptionalBuilder<A, LA> {
    type Repr = OptionalVec<A, LA>;

    fn push(&mut self, value: Option<A>) {
        match value {
            Some(a) => {
                self.inner.push(a);
                self.presence.push(true);
            }
            None => self.presence.push(false),
        }
    }

    fn clear(&mut self) {
        self.inner.clear();
        self.presence = IndexedBitSetBuilder::new();
    }

    fn finish(self) -> Self::Repr {
        OptionalVec {
            inner: self.inner.finish(),
            presence: self.presence.finish(),
        }
    }
}

/// Layout combinator: wraps a child layout `LA` as `Vec<Option<A>>`.
pub struct OptionalLayout<A, LA: Layout<A>> {
    pub inner: LA,
}

impl<A, LA: Layout<A>> OptionalLayout<A, LA> {
    pub fn new(inner: LA) -> Self {
        Self { inner }
    }
}

impl<A, LA: Layout<A>> Layout<Option<A>> for OptionalLayout<A, LA> {
    type Repr = OptionalVec<A, LA>;
    type Builder = OptionalBuilder<A, LA>;

    fn new_builder(&self, config: &Config) -> Self::Builder {
        OptionalBuilder {
            inner: self.inner.new_builder(config),
            presence: IndexedBitSetBuilder::new(),
        }
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_u8(sink, TAG_OPTIONAL)?;
        self.inner.write(&repr.inner, sink)?;
        binary::write_u32(sink, repr.presence.len() as u32)?;
        repr.presence.write(sink)
    }

    fn read<R: Source>(&self, source: &mut R, config: &Config) -> Result<Self::Repr, BonsaiError> {
        let tag = binary::read_u8(source)?;
        if tag != TAG_OPTIONAL {
            return Err(FormatError::new(FormatErrorKind::UnknownLayoutTag { tag }).into());
        }
        let inner = self.inner.read(source, config)?;
        let len = binary::read_u32(source)? as usize;
        let presence = IndexedBitSet::read(source, len)?;
        Ok(OptionalVec { inner, presence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::PrimitiveLayout;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    /// §8 scenario 4: `[Some(1), None, Some(2), None, None, Some(3)]` has
    /// presence bitset `101001`, popcount 3, and reconstructs the input.
    #[test]
    fn scenario_optional() {
        let layout = OptionalLayout::new(PrimitiveLayout::<i32>::new());
        let config = Config::default();
        let mut builder = layout.new_builder(&config);
        let input = vec![Some(1), None, Some(2), None, None, Some(3)];
        builder.push_all(input.clone());
        let repr = builder.finish();

        assert_eq!(repr.presence.popcount(), 3);
        for (i, expected) in [true, false, true, false, false, true].into_iter().enumerate() {
            assert_eq!(repr.presence.contains(i), expected);
        }
        for (i, expected) in input.iter().enumerate() {
            assert_eq!(repr.try_get(i).unwrap(), *expected);
        }

        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        let mut cursor = &buf[..];
        let restored = layout.read(&mut cursor, &config).unwrap();
        for (i, expected) in input.iter().enumerate() {
            assert_eq!(restored.try_get(i).unwrap(), *expected);
        }
    }

    #[test]
    fn all_none_roundtrips() {
        let layout = OptionalLayout::new(PrimitiveLayout::<i32>::new());
        let config = Config::default();
        let mut builder = layout.new_builder(&config);
        builder.push_all([None, None, None]);
        let repr = builder.finish();
        assert_eq!(repr.presence.popcount(), 0);
        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        let mut cursor = &buf[..];
        let restored = layout.read(&mut cursor, &config).unwrap();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.try_get(0).unwrap(), None);
    }
}
