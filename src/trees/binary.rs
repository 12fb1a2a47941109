//! Compact full-binary Tree<Br, Lf> (§4.5): a full binary tree stored as a
//! balanced-parentheses-style shape bitset, an is-leaf bitset, and two label
//! columns (one per branch, one per leaf).

#[cfg(not(feature = "std"))]
use alloc::{collections::VecDeque, vec::Vec};
#[cfg(feature = "std")]
use std::collections::VecDeque;

use crate::bits::{IndexedBitSet, IndexedBitSetBuilder};
use crate::binary::{self, Sink, Source};
use crate::config::Config;
use crate::error::{BonsaiError, FormatError, FormatErrorKind};
use crate::vec::{ColumnVec, Layout};

use super::{FullBinaryTraversal, NodeKind};

/// Magic number for the full-binary tree wire form: "BONSAI/2".
pub const FULL_BINARY_TREE_MAGIC: u64 = 0x0066_7978_8365_7302;

/// Compact full-binary tree. Node identity is a *live index*: the rank
/// (0-based) among set bits of `shape`. Its shape *position* is
/// `shape.select(live + 1)`; children live at shape positions `2p + 1` and
/// `2p + 2`, converted back to live indices via `shape.rank(pos) - 1`.
pub struct FullBinaryTree<Br, Lf, LBr: Layout<Br>, LLf: Layout<Lf>> {
    shape: IndexedBitSet,
    is_leaf: IndexedBitSet,
    branch_labels: LBr::Repr,
    leaf_labels: LLf::Repr,
}

/// One node as exposed by navigation: either a branch with two live child
/// indices, or a leaf.
pub enum Node<Br, Lf> {
    Branch { left: usize, right: usize, label: Br },
    Leaf(Lf),
}

impl<Br, Lf, LBr: Layout<Br>, LLf: Layout<Lf>> FullBinaryTree<Br, Lf, LBr, LLf> {
    /// Build from any source tree presenting the [`FullBinaryTraversal`]
    /// interface, via a breadth-first walk over shape positions.
    pub fn build<T>(
        source: &T,
        branch_layout: &LBr,
        leaf_layout: &LLf,
        config: &Config,
    ) -> Self
    where
        T: FullBinaryTraversal<Branch = Br, Leaf = Lf>,
    {
        let mut shape_builder = IndexedBitSetBuilder::new();
        let mut is_leaf_builder = IndexedBitSetBuilder::new();
        let mut branch_builder = branch_layout.new_builder(config);
        let mut leaf_builder = leaf_layout.new_builder(config);

        let mut queue: VecDeque<Option<T::Node>> = VecDeque::new();
        if let Some(root) = source.root() {
            queue.push_back(Some(root));
        }

        while let Some(slot) = queue.pop_front() {
            match slot {
                None => shape_builder.push(false),
                Some(node) => {
                    shape_builder.push(true);
                    match source.fold_node(node) {
                        NodeKind::Branch { left, right, label } => {
                            is_leaf_builder.push(false);
                            branch_builder.push(label);
                            queue.push_back(Some(left));
                            queue.push_back(Some(right));
                        }
                        NodeKind::Leaf(label) => {
                            is_leaf_builder.push(true);
                            leaf_builder.push(label);
                            // A leaf still reserves its two (absent) child
                            // slots in the ambient complete binary tree, so
                            // that every node's shape *position* — not just
                            // its BFS arrival order — satisfies the
                            // `2p + 1` / `2p + 2` child formula used by
                            // `node()` below.
                            queue.push_back(None);
                            queue.push_back(None);
                        }
                    }
                }
            }
        }

        FullBinaryTree {
            shape: shape_builder.finish(),
            is_leaf: is_leaf_builder.finish(),
            branch_labels: branch_builder.finish(),
            leaf_labels: leaf_builder.finish(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shape.len() == 0 || !self.shape.contains(0)
    }

    /// Live index of the root, if the tree is non-empty.
    pub fn root(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn shape_position(&self, live: usize) -> usize {
        self.shape.select(live + 1).expect("live index out of range")
    }

    fn live_index(&self, shape_pos: usize) -> usize {
        self.shape.rank(shape_pos) - 1
    }

    /// Fetch the node at live index `live`: a branch with its two children's
    /// live indices and label, or a leaf with its label.
    pub fn node(&self, live: usize) -> Result<Node<Br, Lf>, BonsaiError> {
        if self.is_leaf.contains(live) {
            let leaf_idx = self.is_leaf.rank(live) - 1;
            Ok(Node::Leaf(self.leaf_labels.try_get(leaf_idx)?))
        } else {
            let branch_idx = live - self.is_leaf.rank(live);
            let label = self.branch_labels.try_get(branch_idx)?;
            let p = self.shape_position(live);
            let left = self.live_index(2 * p + 1);
            let right = self.live_index(2 * p + 2);
            Ok(Node::Branch { left, right, label })
        }
    }

    pub fn node_count(&self) -> usize {
        self.shape.popcount()
    }

    /// Iterative (non-recursive) postorder fold: leaves map through `leaf_fn`,
    /// branches combine their two already-folded children through `branch_fn`.
    /// Uses an explicit work/value stack rather than native recursion so the
    /// depth of the source tree cannot blow the call stack.
    pub fn fold<R, FL, FB>(&self, leaf_fn: FL, branch_fn: FB) -> Option<R>
    where
        Lf: Clone,
        Br: Clone,
        FL: Fn(&Lf) -> R,
        FB: Fn(&Br, R, R) -> R,
    {
        enum WorkItem<Br> {
            Enter(usize),
            Combine(Br),
        }

        let root = self.root()?;
        let mut work: Vec<WorkItem<Br>> = alloc::vec![WorkItem::Enter(root)];
        let mut values: Vec<R> = Vec::new();

        while let Some(item) = work.pop() {
            match item {
                WorkItem::Enter(live) => match self.node(live).expect("valid live index") {
                    Node::Leaf(label) => values.push(leaf_fn(&label)),
                    Node::Branch { left, right, label } => {
                        work.push(WorkItem::Combine(label));
                        work.push(WorkItem::Enter(right));
                        work.push(WorkItem::Enter(left));
                    }
                },
                WorkItem::Combine(label) => {
                    // Children were pushed left-then-right but popped
                    // right-then-left, so their results land on `values` in
                    // right, left order: pop right first.
                    let right = values.pop().expect("right child folded");
                    let left = values.pop().expect("left child folded");
                    values.push(branch_fn(&label, left, right));
                }
            }
        }

        values.pop()
    }

    pub fn write<S: Sink>(
        &self,
        branch_layout: &LBr,
        leaf_layout: &LLf,
        sink: &mut S,
    ) -> Result<(), BonsaiError> {
        binary::write_u64(sink, FULL_BINARY_TREE_MAGIC)?;
        branch_layout.write(&self.branch_labels, sink)?;
        leaf_layout.write(&self.leaf_labels, sink)?;
        binary::write_u32(sink, self.is_leaf.len() as u32)?;
        self.is_leaf.write(sink)?;
        binary::write_u32(sink, self.shape.len() as u32)?;
        self.shape.write(sink)
    }

    pub fn read<R: Source>(
        source: &mut R,
        branch_layout: &LBr,
        leaf_layout: &LLf,
        config: &Config,
    ) -> Result<Self, BonsaiError> {
        let magic = binary::read_u64(source)?;
        if magic != FULL_BINARY_TREE_MAGIC {
            return Err(FormatError::new(FormatErrorKind::BadTreeMagic { found: magic }).into());
        }
        let branch_labels = branch_layout.read(source, config)?;
        let leaf_labels = leaf_layout.read(source, config)?;
        let is_leaf_len = binary::read_u32(source)? as usize;
        let is_leaf = IndexedBitSet::read(source, is_leaf_len)?;
        let shape_len = binary::read_u32(source)? as usize;
        let shape = IndexedBitSet::read(source, shape_len)?;
        Ok(FullBinaryTree {
            shape,
            is_leaf,
            branch_labels,
            leaf_labels,
        })
    }
}
