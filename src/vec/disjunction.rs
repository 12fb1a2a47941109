//! Disjunction layout (§4.2): a tagged union of two columns, routed by a
//! discriminator [`IndexedBitSet`].

use super::{ColumnVec, Layout, LayoutBuilder};
use crate::bits::{IndexedBitSet, IndexedBitSetBuilder};
use crate::binary::{Sink, Source};
use crate::config::Config;
use crate::error::{index_bounds, BonsaiError};

/// The natural element type of a [`DisjunctionLayout`]: a value tagged as
/// belonging to the left or right column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Either<A, B> {
    Left(A),
    Right(B),
}

/// Physical representation of a [`DisjunctionLayout`]: the left and right
/// child `Repr`s plus a discriminator bitset (`true` = left).
pub struct DisjunctionVec<A, B, LA: Layout<A>, LB: Layout<B>> {
    left: LA::Repr,
    right: LB::Repr,
    discriminator: IndexedBitSet,
}

impl<A, B, LA: Layout<A>, LB: Layout<B>> ColumnVec<Either<A, B>> for DisjunctionVec<A, B, LA, LB> {
    fn len(&self) -> usize {
        self.discriminator.len()
    }

    fn try_get(&self, i: usize) -> Result<Either<A, B>, BonsaiError> {
        if i >= self.discriminator.len() {
            return Err(index_bounds(i, self.discriminator.len()).into());
        }
        if self.discriminator.contains(i) {
            let left_idx = self.discriminator.rank(i) - 1;
            Ok(Either::Left(self.left.try_get(left_idx)?))
        } else {
            let right_idx = i - self.discriminator.rank(i);
            Ok(Either::Right(self.right.try_get(right_idx)?))
        }
    }
}

pub struct DisjunctionBuilder<A, B, LA: Layout<A>, LB: Layout<B>> {
    left: LA::Builder,
    right: LB::Builder,
    discriminator: IndexedBitSetBuilder,
}

impl<A, B, LA: Layout<A>, LB: Layout<B>> LayoutBuilder<Either<A, B>>
    for DisjunctionBuilder<A, B, LA, LB>
{
    type Repr = DisjunctionVec<A, B, LA, LB>;

    fn push(&mut self, value: Either<A, B>) {
        match value {
            Either::Left(a) => {
                self.left.push(a);
                self.discriminator.push(true);
            }
            Either::Right(b) => {
                self.right.push(b);
                self.discriminator.push(false);
            }
        }
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.discriminator = IndexedBitSetBuilder::new();
    }

    fn finish(self) -> Self::Repr {
        DisjunctionVec {
            left: self.left.finish(),
            right: self.right.finish(),
            discriminator: self.discriminator.finish(),
        }
    }
}

/// Layout combinator: routes each `Either<A, B>` to the matching child
/// layout, tracking the routing decision in a discriminator bitset.
pub struct DisjunctionLayout<A, B, LA: Layout<A>, LB: Layout<B>> {
    pub left: LA,
    pub right: LB,
}

impl<A, B, LA: Layout<A>, LB: Layout<B>> DisjunctionLayout<A, B, LA, LB> {
    pub fn new(left: LA, right: LB) -> Self {
        Self { left, right }
    }
}

impl<A, B, LA: Layout<A>, LB: Layout<B>> Layout<Either<A, B>> for DisjunctionLayout<A, B, LA, LB> {
    type Repr = DisjunctionVec<A, B, LA, LB>;
    type Builder = DisjunctionBuilder<A, B, LA, LB>;

    fn new_builder(&self, config: &Config) -> Self::Builder {
        DisjunctionBuilder {
            left: self.left.new_builder(config),
            right: self.right.new_builder(config),
            discriminator: IndexedBitSetBuilder::new(),
        }
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        self.left.write(&repr.left, sink)?;
        self.right.write(&repr.right, sink)?;
        repr.discriminator.write(sink)
    }

    fn read<R: Source>(&self, source: &mut R, config: &Config) -> Result<Self::Repr, BonsaiError> {
        let left = self.left.read(source, config)?;
        let right = self.right.read(source, config)?;
        let total_len = left.len() + right.len();
        let discriminator = IndexedBitSet::read(source, total_len)?;
        Ok(DisjunctionVec {
            left,
            right,
            discriminator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::PrimitiveLayout;

    #[cfg(not(feature = "std"))]
    use alloc::{string::String, vec::Vec};

    /// §8 scenario 5: `[Left(1), Right("a"), Left(2), Right("b")]` stores
    /// `left=[1,2]`, `right=["a","b"]`, discriminator `1010`, and
    /// reconstructs the input.
    #[test]
    fn scenario_left_right() {
        let layout = DisjunctionLayout::new(PrimitiveLayout::<i32>::new(), PrimitiveLayout::<String>::new());
        let config = Config::default();
        let mut builder = layout.new_builder(&config);
        let input = vec![
            Either::Left(1),
            Either::Right(String::from("a")),
            Either::Left(2),
            Either::Right(String::from("b")),
        ];
        builder.push_all(input.clone());
        let repr = builder.finish();

        assert_eq!(repr.left.len(), 2);
        assert_eq!(repr.right.len(), 2);
        assert_eq!(repr.discriminator.popcount(), 2);
        for (i, expected) in [true, false, true, false].into_iter().enumerate() {
            assert_eq!(repr.discriminator.contains(i), expected);
        }

        for (i, expected) in input.iter().enumerate() {
            assert_eq!(&repr.try_get(i).unwrap(), expected);
        }

        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        let mut cursor = &buf[..];
        let restored = layout.read(&mut cursor, &config).unwrap();
        for (i, expected) in input.iter().enumerate() {
            assert_eq!(&restored.try_get(i).unwrap(), expected);
        }
    }

    #[test]
    fn empty_disjunction_roundtrips() {
        let layout = DisjunctionLayout::new(PrimitiveLayout::<i32>::new(), PrimitiveLayout::<i32>::new());
        let config = Config::default();
        let repr = layout.new_builder(&config).finish();
        let mut buf: Vec<u8> = Vec::new();
        layout.write(&repr, &mut buf).unwrap();
        let mut cursor = &buf[..];
        let restored = layout.read(&mut cursor, &config).unwrap();
        assert_eq!(restored.len(), 0);
    }
}
