//! UnitLayout (§4.2): stores only a length; every element is `()`.

use super::{checked_index, ColumnVec, Layout, LayoutBuilder};
use crate::binary::{self, Sink, Source};
use crate::config::Config;
use crate::error::BonsaiError;

/// Physical representation of a [`UnitLayout`]: just a length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitVec {
    len: usize,
}

impl ColumnVec<()> for UnitVec {
    fn len(&self) -> usize {
        self.len
    }

    fn try_get(&self, i: usize) -> Result<(), BonsaiError> {
        checked_index(i, self.len)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UnitBuilder {
    len: usize,
}

impl LayoutBuilder<()> for UnitBuilder {
    type Repr = UnitVec;

    fn push(&mut self, _value: ()) {
        self.len += 1;
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn finish(self) -> Self::Repr {
        UnitVec { len: self.len }
    }
}

/// Layout for `Vec<()>`: carries no payload at all, only a count.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitLayout;

impl Layout<()> for UnitLayout {
    type Repr = UnitVec;
    type Builder = UnitBuilder;

    fn new_builder(&self, _config: &Config) -> Self::Builder {
        UnitBuilder::default()
    }

    fn write<S: Sink>(&self, repr: &Self::Repr, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_u32(sink, repr.len as u32)
    }

    fn read<R: Source>(&self, source: &mut R, _config: &Config) -> Result<Self::Repr, BonsaiError> {
        let len = binary::read_u32(source)? as usize;
        Ok(UnitVec { len })
    }
}
