use thiserror::Error;

use crate::node::Handle;

/// A broken structural invariant of a [`SearchTree`](crate::SearchTree).
///
/// These never occur in a correctly working tree. Insertion panics with the
/// `BalanceFactor` message instead of continuing on a corrupted tree;
/// [`SearchTree::validate`](crate::SearchTree::validate) reports any of them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("invalid balance factor for node {handle}: {balance}")]
    BalanceFactor { handle: Handle, balance: isize },

    #[error("node {handle} caches height {stored} but its subtree has height {expected}")]
    Height {
        handle: Handle,
        stored: usize,
        expected: usize,
    },

    #[error("child {child} of node {handle} is on the wrong side of its parent")]
    Order { handle: Handle, child: Handle },

    #[error("child {child} of node {handle} does not link back to its parent")]
    ParentLink { handle: Handle, child: Handle },

    #[error("root node {handle} has a parent")]
    RootParent { handle: Handle },

    #[error("{reached} of {allocated} nodes are reachable from the root")]
    Unreachable { reached: usize, allocated: usize },
}
