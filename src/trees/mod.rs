//! Traversal adapter interface (§4.3): the abstract shape a source tree
//! must present to be compacted, and the result produced by reconstructing
//! one back out.

pub mod binary;
pub mod kary;

pub use binary::FullBinaryTree;
pub use kary::KaryTree;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A general (k-ary) source tree: `root`, `children`, `label`.
///
/// `Node` is a small copyable handle into the source tree (an index, a
/// pointer wrapper, whatever the caller's own tree type uses).
pub trait Traversal {
    type Node: Copy;
    type Label;

    fn root(&self) -> Option<Self::Node>;

    /// Children of `node`, in order. Returned as a `Vec` rather than an
    /// arbitrary iterator so the k-ary build algorithm (§4.4) can look ahead
    /// at the remaining siblings while transforming the list into a
    /// left-child/right-sibling chain.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    fn label(&self, node: Self::Node) -> Self::Label;
}

/// Either a branch (two children, a branch label) or a leaf (a leaf label),
/// as reported by [`FullBinaryTraversal::fold_node`].
pub enum NodeKind<N, Br, Lf> {
    Branch { left: N, right: N, label: Br },
    Leaf(Lf),
}

/// A source full-binary tree, specialized per §4.3: every node is either a
/// branch with exactly two children or a leaf, reported in one call via
/// [`Self::fold_node`] — the only capability the compact full-binary tree
/// constructor needs.
pub trait FullBinaryTraversal {
    type Node: Copy;
    type Branch;
    type Leaf;

    fn root(&self) -> Option<Self::Node>;

    fn fold_node(&self, node: Self::Node) -> NodeKind<Self::Node, Self::Branch, Self::Leaf>;
}
