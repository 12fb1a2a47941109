//! Product and Product3 layouts (§4.2): parallel columnar fields packed
//! into/unpacked from a composite `T` via a user-supplied pure function
//! pair (triple for `Product3Layout`).
//!
//! Each side keeps its child layout's own `Repr` rather than a flattened
//! plain array, so a product of products nests without any intermediate
//! rematerialization step.

use super::{ColumnVec, Layout, LayoutBuilder};
use crate::binary::{self, Sink, Source};
use crate::config::Config;
use crate::error::{BonsaiError, FormatError, FormatErrorKind};

const TAG_PRODUCT: u8 = 1;

/// Physical representation of a [`ProductLayout`]: the two child `Repr`s
/// plus the pure constructor used to pack a pair into `T`.
pub struct ProductVec<A, B, T, LA: Layout<A>, LB: Layout<B>> {
    left: LA::Repr,
    right: LB::Repr,
    pack: fn(A, B) -> T,
}

impl<A, B, T, LA: Layout<A>, LB: Layout<B>> ColumnVec<T> for ProductVec<A, B, T, LA, LB> {
    fn len(&self) -> usize {
        self.left.len()
    }

    fn try_get(&self, i: usize) -> Result<T, BonsaiError> {
        let a = self.left.try_get(i)?;
        let b = self.right.try_get(i)?;
        Ok((self.pack)(a, b))
    }
}

pub struct ProductBuilder<A, B, T, LA: Layout<A>, LB: Layout<B>> {
    left: LA::Builder,
    right: LB::Builder,
    pack: fn(A, B) -> T,
    unpack: fn(&T) -> (A, B),
}

impl<A, B, T, LA: Layout<A>, LB: Layout<B>> LayoutBuilder<T> for ProductBuilder<A, B, T, LA, LB> {
    type Repr = ProductVec<A, B, T, LA, LB>;

    fn push(&mut self, value: T) {
        let (a, b) = (self.unpack)(&value);
        self.left.push(a);
        self.right.push(b);
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    fn finish(self) -> Self::Repr {
        ProductVec {
            left: self.left.finish(),
            right: self.right.finish(),
            pack: self.pack,
        }
    }
}

/// Layout combinator: zips child layouts `LA`/`LB` into a columnar product
/// of `T`.
pub struct ProductLayout<A, B, T, LA: Layout<A>, LB: Layout<B>> {
    pub left: LA,
    pub right: LB,
    pub pack: fn(A, B) -> T,
    pub unpack: fn(&T) -> (A, B),
}

impl<A, B, T, LA: Layout<A>, LB: Layout<B>> ProductLayout<A, B, T, LA, LB> {
    pub fn new(left: LA, right: LB, pack: fn(A, B) -> T, unpack: fn(&T) -> (A, B)) -> Self {
        Self {
            left,
            right,
            pack,
            unpack,
        }
    }
}

impl<A, B, T, LA: Layout<A>, LB: Layout<B>> Layout<T> for ProductLayout<A, B, T, LA, LB> {
    type Repr = ProductVec<A, B, T, LA, LB>;
    type Builder = ProductBuilder<A, B, T, LA, LB>;

    fn new_builder(&self, config: &Config) -> Self::Builder {
        ProductBuilder {
            left: self.left.new_builder(config),
            right: self.right.new_builder(config),
            pack: self.pack,
            unpack: self.unpack,
        }
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_u8(sink, TAG_PRODUCT)?;
        self.left.write(&repr.left, sink)?;
        self.right.write(&repr.right, sink)?;
        Ok(())
    }

    fn read<R: Source>(&self, source: &mut R, config: &Config) -> Result<Self::Repr, BonsaiError> {
        let tag = binary::read_u8(source)?;
        if tag != TAG_PRODUCT {
            return Err(FormatError::new(FormatErrorKind::UnknownLayoutTag { tag }).into());
        }
        Ok(ProductVec {
            left: self.left.read(source, config)?,
            right: self.right.read(source, config)?,
            pack: self.pack,
        })
    }
}

/// Physical representation of a [`Product3Layout`].
pub struct Product3Vec<A, B, C, T, LA: Layout<A>, LB: Layout<B>, LC: Layout<C>> {
    first: LA::Repr,
    second: LB::Repr,
    third: LC::Repr,
    pack: fn(A, B, C) -> T,
}

impl<A, B, C, T, LA: Layout<A>, LB: Layout<B>, LC: Layout<C>> ColumnVec<T>
    for Product3Vec<A, B, C, T, LA, LB, LC>
{
    fn len(&self) -> usize {
        self.first.len()
    }

    fn try_get(&self, i: usize) -> Result<T, BonsaiError> {
        let a = self.first.try_get(i)?;
        let b = self.second.try_get(i)?;
        let c = self.third.try_get(i)?;
        Ok((self.pack)(a, b, c))
    }
}

pub struct Product3Builder<A, B, C, T, LA: Layout<A>, LB: Layout<B>, LC: Layout<C>> {
    first: LA::Builder,
    second: LB::Builder,
    third: LC::Builder,
    pack: fn(A, B, C) -> T,
    unpack: fn(&T) -> (A, B, C),
}

impl<A, B, C, T, LA: Layout<A>, LB: Layout<B>, LC: Layout<C>> LayoutBuilder<T>
    for Product3Builder<A, B, C, T, LA, LB, LC>
{
    type Repr = Product3Vec<A, B, C, T, LA, LB, LC>;

    fn push(&mut self, value: T) {
        let (a, b, c) = (self.unpack)(&value);
        self.first.push(a);
        self.second.push(b);
        self.third.push(c);
    }

    fn clear(&mut self) {
        self.first.clear();
        self.second.clear();
        self.third.clear();
    }

    fn finish(self) -> Self::Repr {
        Product3Vec {
            first: self.first.finish(),
            second: self.second.finish(),
            third: self.third.finish(),
            pack: self.pack,
        }
    }
}

/// Layout combinator: zips three child layouts into a columnar triple.
pub struct Product3Layout<A, B, C, T, LA: Layout<A>, LB: Layout<B>, LC: Layout<C>> {
    pub first: LA,
    pub second: LB,
    pub third: LC,
    pub pack: fn(A, B, C) -> T,
    pub unpack: fn(&T) -> (A, B, C),
}

impl<A, B, C, T, LA: Layout<A>, LB: Layout<B>, LC: Layout<C>> Product3Layout<A, B, C, T, LA, LB, LC> {
    pub fn new(
        first: LA,
        second: LB,
        third: LC,
        pack: fn(A, B, C) -> T,
        unpack: fn(&T) -> (A, B, C),
    ) -> Self {
        Self {
            first,
            second,
            third,
            pack,
            unpack,
        }
    }
}

impl<A, B, C, T, LA: Layout<A>, LB: Layout<B>, LC: Layout<C>> Layout<T>
    for Product3Layout<A, B, C, T, LA, LB, LC>
{
    type Repr = Product3Vec<A, B, C, T, LA, LB, LC>;
    type Builder = Product3Builder<A, B, C, T, LA, LB, LC>;

    fn new_builder(&self, config: &Config) -> Self::Builder {
        Product3Builder {
            first: self.first.new_builder(config),
            second: self.second.new_builder(config),
            third: self.third.new_builder(config),
            pack: self.pack,
            unpack: self.unpack,
        }
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_u8(sink, TAG_PRODUCT)?;
        self.first.write(&repr.first, sink)?;
        self.second.write(&repr.second, sink)?;
        self.third.write(&repr.third, sink)?;
        Ok(())
    }

    fn read<R: Source>(&self, source: &mut R, config: &Config) -> Result<Self::Repr, BonsaiError> {
        let tag = binary::read_u8(source)?;
        if tag != TAG_PRODUCT {
            return Err(FormatError::new(FormatErrorKind::UnknownLayoutTag { tag }).into());
        }
        Ok(Product3Vec {
            first: self.first.read(source, config)?,
            second: self.second.read(source, config)?,
            third: self.third.read(source, config)?,
            pack: self.pack,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::PrimitiveLayout;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    type IntBoolLayout =
        ProductLayout<i32, bool, (i32, bool), PrimitiveLayout<i32>, PrimitiveLayout<bool>>;

    fn int_bool_layout() -> IntBoolLayout {
        ProductLayout::new(
            PrimitiveLayout::new(),
            PrimitiveLayout::new(),
            |a, b| (a, b),
            |t: &(i32, bool)| (t.0, t.1),
        )
    }

    #[test]
    fn product_roundtrip() {
        let layout = int_bool_layout();
        let config = Config::default();
        let mut builder = layout.new_builder(&config);
        builder.push_all([(1, true), (2, false), (3, true)]);
        let repr = builder.finish();
        assert_eq!(repr.len(), 3);
        assert_eq!(repr.try_get(1).unwrap(), (2, false));

        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        let mut cursor = &buf[..];
        let restored = layout.read(&mut cursor, &config).unwrap();
        assert_eq!(restored.len(), repr.len());
        for i in 0..repr.len() {
            assert_eq!(restored.try_get(i).unwrap(), repr.try_get(i).unwrap());
        }
    }

    /// §8 scenario 6: Product3 reconstructs `(i, b, f)` triples pointwise,
    /// all three underlying vecs sharing `len = 3`.
    #[test]
    fn product3_scenario() {
        let layout = Product3Layout::new(
            PrimitiveLayout::<i32>::new(),
            PrimitiveLayout::<bool>::new(),
            PrimitiveLayout::<f64>::new(),
            |a, b, c| (a, b, c),
            |t: &(i32, bool, f64)| (t.0, t.1, t.2),
        );
        let config = Config::default();
        let mut builder = layout.new_builder(&config);
        builder.push_all([(1, true, 0.5), (2, false, 1.5), (3, true, 2.5)]);
        let repr = builder.finish();
        assert_eq!(repr.first.len(), 3);
        assert_eq!(repr.second.len(), 3);
        assert_eq!(repr.third.len(), 3);
        assert_eq!(repr.try_get(0).unwrap(), (1, true, 0.5));
        assert_eq!(repr.try_get(2).unwrap(), (3, true, 2.5));
    }
}
