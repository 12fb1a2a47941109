//! ColLayout (§4.2): nested sequences. Each row is an iterable of `A`;
//! physically, rows are concatenated into one flat column plus an offsets
//! column marking row boundaries.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::primitive::PrimitiveLayout;
use super::{checked_index, ColumnVec, Layout, LayoutBuilder};
use crate::binary::{self, Sink, Source};
use crate::config::Config;
use crate::error::{BonsaiError, FormatError, FormatErrorKind};

const TAG_COL: u8 = 1;

/// Physical representation of a [`ColLayout`]: an `i32` offsets column (one
/// entry per row, plus an implicit final offset at `flat.len()`) over a
/// flat child `Repr`.
pub struct ColVec<A, LA: Layout<A>> {
    offsets: Vec<i32>,
    flat: LA::Repr,
}

impl<A, LA: Layout<A>> ColumnVec<Vec<A>> for ColVec<A, LA> {
    fn len(&self) -> usize {
        self.offsets.len()
    }

    fn try_get(&self, i: usize) -> Result<Vec<A>, BonsaiError> {
        checked_index(i, self.offsets.len())?;
        let start = self.offsets[i] as usize;
        let end = if i + 1 < self.offsets.len() {
            self.offsets[i + 1] as usize
        } else {
            self.flat.len()
        };
        let mut row = Vec::with_capacity(end - start);
        for j in start..end {
            row.push(self.flat.try_get(j)?);
        }
        Ok(row)
    }
}

pub struct ColBuilder<A, LA: Layout<A>> {
    offsets: Vec<i32>,
    flat: LA::Builder,
    flat_len: i32,
}

impl<A, LA: Layout<A>> LayoutBuilder<Vec<A>> for ColBuilder<A, LA> {
    type Repr = ColVec<A, LA>;

    fn push(&mut self, row: Vec<A>) {
        self.offsets.push(self.flat_len);
        self.flat_len += row.len() as i32;
        self.flat.push_all(row);
    }

    fn clear(&mut self) {
        self.offsets.clear();
        self.flat.clear();
        self.flat_len = 0;
    }

    fn finish(self) -> Self::Repr {
        ColVec {
            offsets: self.offsets,
            flat: self.flat.finish(),
        }
    }
}

/// Layout combinator: nests a child layout `LA: Layout<A>` as rows of
/// `Vec<A>`.
pub struct ColLayout<A, LA: Layout<A>> {
    pub flat: LA,
}

impl<A, LA: Layout<A>> ColLayout<A, LA> {
    pub fn new(flat: LA) -> Self {
        Self { flat }
    }
}

impl<A, LA: Layout<A>> Layout<Vec<A>> for ColLayout<A, LA> {
    type Repr = ColVec<A, LA>;
    type Builder = ColBuilder<A, LA>;

    fn new_builder(&self, config: &Config) -> Self::Builder {
        ColBuilder {
            offsets: Vec::new(),
            flat: self.flat.new_builder(config),
            flat_len: 0,
        }
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_u8(sink, TAG_COL)?;
        let offsets_layout = PrimitiveLayout::<i32>::new();
        let offsets_repr = super::primitive::PrimitiveVec(repr.offsets.clone());
        offsets_layout.write(&offsets_repr, sink)?;
        self.flat.write(&repr.flat, sink)
    }

    fn read<R: Source>(&self, source: &mut R, config: &Config) -> Result<Self::Repr, BonsaiError> {
        let tag = binary::read_u8(source)?;
        if tag != TAG_COL {
            return Err(FormatError::new(FormatErrorKind::UnknownLayoutTag { tag }).into());
        }
        let offsets_layout = PrimitiveLayout::<i32>::new();
        let offsets_repr = offsets_layout.read(source, config)?;
        let offsets = offsets_repr.0;
        let flat = self.flat.read(source, config)?;
        Ok(ColVec { offsets, flat })
    }
}
