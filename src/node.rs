use std::fmt;

/// A stable reference to a node in the tree's arena.
///
/// Handles are assigned in insertion order and are never reused,
/// since nodes are never removed from the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(usize);

impl Handle {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Returns the position of the node in the arena.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type Link = Option<Handle>;

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Link,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) height: usize,
}

impl<T> Node<T> {
    pub(crate) fn leaf(value: T, parent: Link) -> Self {
        Node {
            value,
            parent,
            left: None,
            right: None,
            height: 0,
        }
    }
}

/// Returns the height of the subtree behind `link`; a missing subtree has height -1.
pub(crate) fn subtree_height<T>(nodes: &[Node<T>], link: Link) -> isize {
    match link {
        None => -1,
        Some(handle) => nodes[handle.index()].height as isize,
    }
}

/// Returns the leftmost node of the subtree rooted at `root`.
pub(crate) fn leftmost<T>(nodes: &[Node<T>], root: Link) -> Link {
    let mut current = root?;
    while let Some(left) = nodes[current.index()].left {
        current = left;
    }
    Some(current)
}

/// Returns the rightmost node of the subtree rooted at `root`.
pub(crate) fn rightmost<T>(nodes: &[Node<T>], root: Link) -> Link {
    let mut current = root?;
    while let Some(right) = nodes[current.index()].right {
        current = right;
    }
    Some(current)
}
