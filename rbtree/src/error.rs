use thiserror::Error;

use crate::node::TreeId;

/// Misuse of a [`Cursor`] in a mutating call.
///
/// These are reported before the tree is touched, so the tree is unchanged
/// after any of them.
///
/// [`Cursor`]: crate::Cursor
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The cursor was obtained from a different tree.
    #[error("cursor belongs to {found}, but the operation targets {expected}")]
    ForeignCursor { expected: TreeId, found: TreeId },

    /// The cursor is at the limit position and does not denote an element.
    #[error("cursor is at the limit position")]
    Limit,

    /// The element the cursor referred to has already been deleted.
    #[error("cursor refers to an element that has been deleted")]
    StaleCursor,
}

pub type Result<T> = std::result::Result<T, Error>;

/// A broken structural invariant found by [`RbTree::check_invariants`].
///
/// Nodes are identified by their arena slot.
///
/// [`RbTree::check_invariants`]: crate::RbTree::check_invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("root node is red")]
    RedRoot,

    #[error("root node {node} has a parent link")]
    RootHasParent { node: usize },

    #[error("node {node} and its parent disagree about their link")]
    BrokenParentLink { node: usize },

    #[error("red node {node} has a red child")]
    RedRed { node: usize },

    #[error("black height below node {node} differs: left {left}, right {right}")]
    BlackHeight {
        node: usize,
        left: usize,
        right: usize,
    },

    #[error("node {node} is out of order with respect to its ancestors")]
    OutOfOrder { node: usize },

    #[error("node {node} is tagged with another tree")]
    ForeignNode { node: usize },

    #[error("cached {bound} node is not the {bound} of the tree")]
    StaleBound { bound: &'static str },

    #[error("tree reports {reported} elements but {reachable} are reachable from the root")]
    LenMismatch { reported: usize, reachable: usize },
}
