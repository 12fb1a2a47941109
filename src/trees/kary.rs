//! Compact k-ary Tree<L> (§4.4): a k-ary tree stored as one
//! [`IndexedBitSet`] (the left-child/right-sibling transform's shape) plus
//! one label column.

#[cfg(not(feature = "std"))]
use alloc::{collections::VecDeque, vec::Vec};
#[cfg(feature = "std")]
use std::collections::VecDeque;

use crate::bits::{IndexedBitSet, IndexedBitSetBuilder};
use crate::binary::{self, Sink, Source};
use crate::config::Config;
use crate::error::{BonsaiError, FormatError, FormatErrorKind};
use crate::vec::{ColumnVec, Layout};

use super::Traversal;

/// Magic number for the k-ary tree wire form: "BONSAI/1".
pub const KARY_TREE_MAGIC: u64 = 0x0066_7978_8365_7301;

/// A node in the source tree, paired with the siblings still owed a binary
/// slot after it (used to drive the left-child/right-sibling BFS).
struct SiblingChain<N> {
    first: N,
    rest: Vec<N>,
}

/// Compact k-ary tree: node identity is a bitset position `i` with
/// `shape.contains(i)`; its label lives at `labels[shape.rank(i) - 1]`.
/// First-child/next-sibling slots are at `2i + 1` / `2i + 2`.
pub struct KaryTree<L, LL: Layout<L>> {
    shape: IndexedBitSet,
    labels: LL::Repr,
}

impl<L, LL: Layout<L>> KaryTree<L, LL> {
    /// Build from any source tree presenting the [`Traversal`] interface.
    pub fn build<T>(source: &T, label_layout: &LL, config: &Config) -> Self
    where
        T: Traversal<Label = L>,
    {
        let mut shape_builder = IndexedBitSetBuilder::new();
        let mut label_builder = label_layout.new_builder(config);

        let mut queue: VecDeque<Option<SiblingChain<T::Node>>> = VecDeque::new();
        if let Some(root) = source.root() {
            queue.push_back(Some(SiblingChain {
                first: root,
                rest: Vec::new(),
            }));
        }

        while let Some(slot) = queue.pop_front() {
            match slot {
                None => shape_builder.push(false),
                Some(chain) => {
                    shape_builder.push(true);
                    label_builder.push(source.label(chain.first));

                    let mut children = source.children(chain.first);
                    let left = if children.is_empty() {
                        None
                    } else {
                        let first = children.remove(0);
                        Some(SiblingChain {
                            first,
                            rest: children,
                        })
                    };
                    let right = if chain.rest.is_empty() {
                        None
                    } else {
                        let mut rest = chain.rest;
                        let first = rest.remove(0);
                        Some(SiblingChain { first, rest })
                    };
                    queue.push_back(left);
                    queue.push_back(right);
                }
            }
        }

        KaryTree {
            shape: shape_builder.finish(),
            labels: label_builder.finish(),
        }
    }

    /// The root's bitset position, if the tree is non-empty.
    pub fn root(&self) -> Option<usize> {
        if self.shape.len() > 0 && self.shape.contains(0) {
            Some(0)
        } else {
            None
        }
    }

    pub fn node_count(&self) -> usize {
        self.shape.popcount()
    }

    /// Label at bitset position `node`. `node` must satisfy
    /// `shape.contains(node)`.
    pub fn label(&self, node: usize) -> Result<L, BonsaiError> {
        self.labels.try_get(self.shape.rank(node) - 1)
    }

    /// First child's bitset position, if present.
    pub fn first_child(&self, node: usize) -> Option<usize> {
        let slot = 2 * node + 1;
        (slot < self.shape.len() && self.shape.contains(slot)).then_some(slot)
    }

    /// Next sibling's bitset position, if present.
    pub fn next_sibling(&self, node: usize) -> Option<usize> {
        let slot = 2 * node + 2;
        (slot < self.shape.len() && self.shape.contains(slot)).then_some(slot)
    }

    /// All children of `node`, in order, via the right-sibling chain.
    pub fn children(&self, node: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self.first_child(node);
        while let Some(n) = cur {
            out.push(n);
            cur = self.next_sibling(n);
        }
        out
    }

    pub fn write<S: Sink>(&self, label_layout: &LL, sink: &mut S) -> Result<(), BonsaiError> {
        binary::write_u64(sink, KARY_TREE_MAGIC)?;
        binary::write_u32(sink, self.shape.len() as u32)?;
        self.shape.write(sink)?;
        label_layout.write(&self.labels, sink)
    }

    pub fn read<R: Source>(
        source: &mut R,
        label_layout: &LL,
        config: &Config,
    ) -> Result<Self, BonsaiError> {
        let magic = binary::read_u64(source)?;
        if magic != KARY_TREE_MAGIC {
            return Err(FormatError::new(FormatErrorKind::BadTreeMagic { found: magic }).into());
        }
        let shape_len = binary::read_u32(source)? as usize;
        let shape = IndexedBitSet::read(source, shape_len)?;
        let labels = label_layout.read(source, config)?;
        Ok(KaryTree { shape, labels })
    }
}
