//! Columnar `Vec`/`Layout` algebra (§4.2).
//!
//! A [`Layout<T>`] is a pure, composable description of how to build, read,
//! write, and structurally identify a typed columnar container. Each kind of
//! layout (dense primitive, product, disjunction, optional, transformed,
//! nested sequence, unit) owns its own concrete representation type rather
//! than sharing one dynamically-tagged container — the representation type
//! *is* the tag, enforced at compile time instead of matched at run time.
//!
//! Every representation type implements [`ColumnVec<T>`]: `len`, `get`/
//! `try_get`, iteration, plus `PartialEq`/`Hash` wherever `T` allows it for
//! structural vec equality (§3, "Structural equality for Vec").

pub mod col;
pub mod disjunction;
pub mod optional;
pub mod primitive;
pub mod product;
pub mod transformed;
pub mod unit;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::binary::{Sink, Source};
use crate::config::Config;
use crate::error::{index_bounds, BonsaiError};

pub use col::{ColLayout, ColVec};
pub use disjunction::{DisjunctionLayout, DisjunctionVec, Either};
pub use optional::{OptionalLayout, OptionalVec};
pub use primitive::{Char16, PrimitiveElement, PrimitiveLayout, PrimitiveVec};
pub use product::{Product3Layout, Product3Vec, ProductLayout, ProductVec};
pub use transformed::{TransformedLayout, TransformedVec};
pub use unit::{UnitLayout, UnitVec};

/// An immutable, random-access, length-typed columnar sequence.
///
/// `T` is returned by value from [`Self::get`]/[`Self::try_get`]; callers
/// working with non-`Copy` element types should expect a clone per access.
pub trait ColumnVec<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `i`. `Err` iff `i >= len()`.
    fn try_get(&self, i: usize) -> Result<T, BonsaiError>;

    /// Element at `i`. Panics iff `i >= len()` (§7's fail-fast bounds policy).
    fn get(&self, i: usize) -> T {
        self.try_get(i)
            .unwrap_or_else(|e| panic!("ColumnVec::get: {e}"))
    }

    /// Iterate over every element, in order.
    fn iter(&self) -> ColumnVecIter<'_, T, Self>
    where
        Self: Sized,
    {
        ColumnVecIter {
            vec: self,
            pos: 0,
            _marker: core::marker::PhantomData,
        }
    }
}

/// Bounds-checked index helper shared by every `ColumnVec` implementation.
pub(crate) fn checked_index(i: usize, len: usize) -> Result<(), BonsaiError> {
    if i >= len {
        Err(index_bounds(i, len).into())
    } else {
        Ok(())
    }
}

/// Iterator over a [`ColumnVec`], yielding owned elements in order.
pub struct ColumnVecIter<'a, T, V: ColumnVec<T>> {
    vec: &'a V,
    pos: usize,
    _marker: core::marker::PhantomData<T>,
}

impl<'a, T, V: ColumnVec<T>> Iterator for ColumnVecIter<'a, T, V> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.pos >= self.vec.len() {
            return None;
        }
        let v = self.vec.get(self.pos);
        self.pos += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vec.len() - self.pos;
        (remaining, Some(remaining))
    }
}

/// Linear state machine that accepts values of type `T` in sequence and
/// publishes an immutable [`Layout::Repr`] on [`Self::finish`].
///
/// Not reentrant: calling `finish` twice without an intervening `clear` is
/// builder misuse (§7) and implementations may panic if they detect it.
pub trait LayoutBuilder<T> {
    type Repr;

    fn push(&mut self, value: T);

    fn push_all<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for v in values {
            self.push(v);
        }
    }

    /// Discard all progress. The only safe operation after [`Self::finish`].
    fn clear(&mut self);

    fn finish(self) -> Self::Repr;
}

/// A constructive description of how to build, read, write, and structurally
/// identify a `ColumnVec<T>`.
pub trait Layout<T> {
    type Repr: ColumnVec<T>;
    type Builder: LayoutBuilder<T, Repr = Self::Repr>;

    fn new_builder(&self, config: &Config) -> Self::Builder;

    /// Convenience over [`Self::new_builder`] using [`Config::default`].
    fn new_builder_default(&self) -> Self::Builder {
        self.new_builder(&Config::default())
    }

    fn empty(&self, config: &Config) -> Self::Repr {
        self.new_builder(config).finish()
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError>;

    fn read<R: Source>(&self, source: &mut R, config: &Config) -> Result<Self::Repr, BonsaiError>;

    /// Whether `repr` already has this layout's natural physical shape, so
    /// that `write` (or a composite builder adopting `repr` as a child) can
    /// skip rebuilding it. Every `Self::Repr` produced by this crate already
    /// has that shape by construction (the representation type *is* the
    /// shape), so the default is unconditionally `true`; [`PrimitiveLayout`]
    /// overrides it to report whether the plain-vs-dictionary choice
    /// `write` would make is the cheap one (see its impl for why that is the
    /// one place this still does real work once the shape itself can't
    /// vary).
    fn is_safe_to_cast(&self, repr: &Self::Repr) -> bool {
        let _ = repr;
        true
    }
}

/// Combinator: zips two child layouts into a columnar product of pairs.
pub fn zip<A: Clone, B: Clone, LA: Layout<A>, LB: Layout<B>>(
    left: LA,
    right: LB,
) -> ProductLayout<A, B, (A, B), LA, LB> {
    ProductLayout::new(left, right, |a, b| (a, b), |t: &(A, B)| {
        (t.0.clone(), t.1.clone())
    })
}

/// Combinator: routes values to one of two child layouts via a discriminator.
pub fn either<A, B, LA: Layout<A>, LB: Layout<B>>(
    left: LA,
    right: LB,
) -> DisjunctionLayout<A, B, LA, LB> {
    DisjunctionLayout::new(left, right)
}

/// Combinator: wraps a child layout as `Option<A>`, presence-tracked.
pub fn optional<A, LA: Layout<A>>(inner: LA) -> OptionalLayout<A, LA> {
    OptionalLayout::new(inner)
}

/// Combinator: maps a child layout through a pure function pair, leaving the
/// physical representation unchanged.
pub fn transform<A, B, LA: Layout<A>>(
    inner: LA,
    to_inner: fn(B) -> A,
    from_inner: fn(A) -> B,
) -> TransformedLayout<A, B, LA> {
    TransformedLayout::new(inner, to_inner, from_inner)
}
