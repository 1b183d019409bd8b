use std::fmt;
use std::iter::FusedIterator;

use crate::node::{leftmost, Link, Node};

/// An iterator over the values of a tree in ascending order.
///
/// The iterator is a one-shot cursor: once exhausted it stays exhausted,
/// and iterating again requires a fresh one from
/// [`SearchTree::iter`](crate::SearchTree::iter).
pub struct Iter<'a, T> {
    nodes: &'a [Node<T>],
    current: Link,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    /// Creates a cursor over the subtree rooted at `root`, positioned at its smallest value.
    pub(crate) fn new(nodes: &'a [Node<T>], root: Link, len: usize) -> Self {
        Self {
            nodes,
            current: leftmost(nodes, root),
            remaining: len,
        }
    }

    fn node(&self, link: Link) -> Option<&'a Node<T>> {
        let nodes = self.nodes;
        link.map(|handle| &nodes[handle.index()])
    }

    // In-order successor of the current position.
    fn successor(&self) -> Link {
        let mut handle = self.current?;
        let node = &self.nodes[handle.index()];
        if node.right.is_some() {
            return leftmost(self.nodes, node.right);
        }

        // Climb while we arrive from a right child; the first parent reached
        // through a left link is the successor.
        while let Some(parent) = self.nodes[handle.index()].parent {
            if self.nodes[parent.index()].left == Some(handle) {
                return Some(parent);
            }
            handle = parent;
        }
        None
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node(self.current)?;
        self.current = self.successor();
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
