//! Transformed layout (§4.2): a lazy map over an inner layout via a pure
//! function pair. Builder pre-applies `to_inner`; reader post-applies
//! `from_inner`. Physically identical to the inner layout.

use super::{ColumnVec, Layout, LayoutBuilder};
use crate::binary::{Sink, Source};
use crate::config::Config;
use crate::error::BonsaiError;

/// Physical representation of a [`TransformedLayout`]: the inner child
/// `Repr` plus the function that maps its elements out to `B`.
pub struct TransformedVec<A, B, LA: Layout<A>> {
    inner: LA::Repr,
    from_inner: fn(A) -> B,
}

impl<A, B, LA: Layout<A>> ColumnVec<B> for TransformedVec<A, B, LA> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn try_get(&self, i: usize) -> Result<B, BonsaiError> {
        Ok((self.from_inner)(self.inner.try_get(i)?))
    }
}

pub struct TransformedBuilder<A, B, LA: Layout<A>> {
    inner: LA::Builder,
    to_inner: fn(B) -> A,
    from_inner: fn(A) -> B,
}

impl<A, B, LA: Layout<A>> LayoutBuilder<B> for TransformedBuilder<A, B, LA> {
    type Repr = TransformedVec<A, B, LA>;

    fn push(&mut self, value: B) {
        self.inner.push((self.to_inner)(value));
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn finish(self) -> Self::Repr {
        TransformedVec {
            inner: self.inner.finish(),
            from_inner: self.from_inner,
        }
    }
}

/// Layout combinator: maps a child layout `LA: Layout<A>` to `Layout<B>`
/// via a pure function pair.
pub struct TransformedLayout<A, B, LA: Layout<A>> {
    pub inner: LA,
    pub to_inner: fn(B) -> A,
    pub from_inner: fn(A) -> B,
}

impl<A, B, LA: Layout<A>> TransformedLayout<A, B, LA> {
    pub fn new(inner: LA, to_inner: fn(B) -> A, from_inner: fn(A) -> B) -> Self {
        Self {
            inner,
            to_inner,
            from_inner,
        }
    }
}

impl<A, B, LA: Layout<A>> Layout<B> for TransformedLayout<A, B, LA> {
    type Repr = TransformedVec<A, B, LA>;
    type Builder = TransformedBuilder<A, B, LA>;

    fn new_builder(&self, config: &Config) -> Self::Builder {
        TransformedBuilder {
            inner: self.inner.new_builder(config),
            to_inner: self.to_inner,
            from_inner: self.from_inner,
        }
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        self.inner.write(&repr.inner, sink)
    }

    fn read<R: Source>(&self, source: &mut R, config: &Config) -> Result<Self::Repr, BonsaiError> {
        Ok(TransformedVec {
            inner: self.inner.read(source, config)?,
            from_inner: self.from_inner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::PrimitiveLayout;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Meters(f64);

    fn to_inner(m: Meters) -> f64 {
        m.0
    }
    fn from_inner(x: f64) -> Meters {
        Meters(x)
    }

    #[test]
    fn transformed_roundtrip() {
        let layout = TransformedLayout::new(PrimitiveLayout::<f64>::new(), to_inner, from_inner);
        let config = Config::default();
        let mut builder = layout.new_builder(&config);
        builder.push_all([Meters(1.0), Meters(2.5), Meters(3.75)]);
        let repr = builder.finish();
        assert_eq!(repr.try_get(1).unwrap(), Meters(2.5));

        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        let mut cursor = &buf[..];
        let restored = layout.read(&mut cursor, &config).unwrap();
        for i in 0..repr.len() {
            assert_eq!(restored.try_get(i).unwrap(), repr.try_get(i).unwrap());
        }
    }
}
