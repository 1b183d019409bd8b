//! An ordered set of distinct values implemented with an AVL tree.
//!
//! [`SearchTree`] stores its nodes in an arena and links them by [`Handle`].
//! Membership tests and insertions take O(log n) steps; values are never removed.
//!
//! ```
//! use avl_search_tree::SearchTree;
//!
//! let tree: SearchTree<_> = [20, 11, 25, 12, 8].into_iter().collect();
//! assert!(tree.contains(&12));
//! assert!(!tree.contains(&13));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [8, 11, 12, 20, 25]);
//! ```
//!
//! Enable the `tracing` feature to emit trace events for node attachment and rotations.

mod error;
mod iter;
mod node;
mod tree;

pub use error::InvariantViolation;
pub use iter::Iter;
pub use node::Handle;
pub use tree::SearchTree;
