//! # Bonsai
//!
//! Compact, immutable representations of labeled trees and columnar
//! sequences of composite values.
//!
//! ## Module Organization
//!
//! - [`bits`] - Indexed bitset with O(1) rank and O(log n) select
//! - [`vec`] - Columnar `Layout`/`ColumnVec` algebra: primitives, products,
//!   disjunctions, optionals, transformed values, nested sequences
//! - [`trees`] - Compact k-ary and full-binary tree encodings built on
//!   [`bits::IndexedBitSet`]
//! - [`binary`] - Shared big-endian/bit-packing wire primitives
//! - [`error`] - Structured error types (format and bounds failures)
//! - [`config`] - Tunable limits for builders (dictionary size ceiling)
//! - [`mmap`] - Memory-mapped word buffers (`feature = "mmap"`)
//!
//! ## Quick Start
//!
//! ```
//! use bonsai::bits::{IndexedBitSet, IndexedBitSetBuilder};
//!
//! let mut builder = IndexedBitSetBuilder::new();
//! builder.extend([true, true, false, true, true, false]);
//! let bits = builder.finish();
//!
//! assert_eq!(bits.rank(0), 1);
//! assert_eq!(bits.select(2).unwrap(), 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default) - Enables `Sink`/`Source` impls over `std::io`
//! - `serde` - `Config` gains `Serialize`/`Deserialize`

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

pub mod binary;
pub mod bits;
pub mod config;
pub mod error;
#[cfg(feature = "mmap")]
pub mod mmap;
pub mod trees;
pub mod vec;

pub use bits::IndexedBitSet;
pub use config::Config;
pub use error::BonsaiError;
pub use trees::{FullBinaryTree, KaryTree};
pub use vec::{ColumnVec, Layout, LayoutBuilder};

#[cfg(test)]
mod send_sync_assertions {
    use super::*;
    use crate::vec::PrimitiveVec;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn built_values_are_send_sync() {
        assert_send_sync::<IndexedBitSet>();
        assert_send_sync::<PrimitiveVec<i32>>();
        assert_send_sync::<KaryTree<i32, vec::PrimitiveLayout<i32>>>();
        assert_send_sync::<FullBinaryTree<i32, i32, vec::PrimitiveLayout<i32>, vec::PrimitiveLayout<i32>>>();
    }
}
