use std::cmp::{self, Ordering};
use std::fmt;

use crate::error::InvariantViolation;
use crate::iter::Iter;
use crate::node::{leftmost, rightmost, subtree_height, Handle, Link, Node};

/// An ordered set of distinct values implemented with an AVL tree.
///
/// Nodes live in an arena and refer to each other by [`Handle`].
/// Nodes are never removed, so a handle stays valid for the lifetime of the tree.
///
/// ```
/// use avl_search_tree::SearchTree;
/// let mut tree = SearchTree::new();
/// tree.insert(2);
/// tree.insert(1);
/// tree.insert(3);
/// assert!(tree.contains(&1));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// ```
#[derive(Clone)]
pub struct SearchTree<T> {
    nodes: Vec<Node<T>>,
    root: Link,
}

impl<T: Ord> SearchTree<T> {
    /// Creates an empty tree.
    /// No memory is allocated until the first value is inserted.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Creates an empty tree with room for `capacity` values before the arena reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns true if the tree contains the value.
    pub fn contains(&self, value: &T) -> bool {
        match self.locate(value) {
            None => false,
            Some(handle) => self.node(handle).value == *value,
        }
    }

    /// Searches for a value.
    ///
    /// Returns the handle of the node holding `value` if present. Otherwise returns
    /// the handle of the node a new `value` would be attached to, or `None` if the
    /// tree is empty.
    pub fn locate(&self, value: &T) -> Option<Handle> {
        let mut current = self.root;
        let mut last = None;
        while let Some(handle) = current {
            last = current;
            current = match value.cmp(&self.node(handle).value) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => self.node(handle).left,
                Ordering::Greater => self.node(handle).right,
            };
        }
        last
    }

    /// Returns the value itself if present, else the value of the node
    /// `value` would be attached to.
    pub fn closest(&self, value: &T) -> Option<&T> {
        self.locate(value).map(|handle| &self.node(handle).value)
    }

    /// Inserts a value into the tree.
    /// Returns whether the value was newly inserted; a value already present leaves the tree unchanged.
    pub fn insert(&mut self, value: T) -> bool {
        let parent = self.locate(&value);
        let handle = Handle::from_index(self.nodes.len());
        match parent {
            None => self.root = Some(handle),
            Some(parent) => match value.cmp(&self.node(parent).value) {
                Ordering::Equal => return false,
                Ordering::Less => self.node_mut(parent).left = Some(handle),
                Ordering::Greater => self.node_mut(parent).right = Some(handle),
            },
        }
        self.nodes.push(Node::leaf(value, parent));

        #[cfg(feature = "tracing")]
        tracing::trace!(%handle, parent = ?parent, "attached node");

        self.propagate_heights(handle);

        let mut current = Some(handle);
        while let Some(handle) = current {
            if !self.is_balanced(handle) {
                self.rebalance(handle);
            }
            current = self.node(handle).parent;
        }
        true
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        if let Err(violation) = self.validate() {
            panic!("inconsistent tree: {}", violation);
        }
    }

    /// Checks every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let root = match self.root {
            None => {
                return match self.nodes.len() {
                    0 => Ok(()),
                    allocated => Err(InvariantViolation::Unreachable {
                        reached: 0,
                        allocated,
                    }),
                }
            }
            Some(root) => root,
        };
        if self.node(root).parent.is_some() {
            return Err(InvariantViolation::RootParent { handle: root });
        }

        let mut reached = 0;
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            reached += 1;
            if reached > self.nodes.len() {
                break;
            }

            let node = self.node(handle);
            for (child, expected) in [(node.left, Ordering::Less), (node.right, Ordering::Greater)] {
                if let Some(child) = child {
                    if self.node(child).parent != Some(handle) {
                        return Err(InvariantViolation::ParentLink { handle, child });
                    }
                    if self.node(child).value.cmp(&node.value) != expected {
                        return Err(InvariantViolation::Order { handle, child });
                    }
                    stack.push(child);
                }
            }

            let expected = Self::compute_height(&self.nodes, node.left, node.right);
            if node.height != expected {
                return Err(InvariantViolation::Height {
                    handle,
                    stored: node.height,
                    expected,
                });
            }

            let balance = self.balance_factor(handle);
            if !(-1..=1).contains(&balance) {
                return Err(InvariantViolation::BalanceFactor { handle, balance });
            }
        }

        if reached != self.nodes.len() {
            return Err(InvariantViolation::Unreachable {
                reached,
                allocated: self.nodes.len(),
            });
        }
        Ok(())
    }

    // Recomputes the heights of all ancestors of `start`, bottom-up.
    fn propagate_heights(&mut self, start: Handle) {
        let mut current = self.node(start).parent;
        while let Some(handle) = current {
            self.adjust_height(handle);
            current = self.node(handle).parent;
        }
    }

    fn compute_height(nodes: &[Node<T>], left: Link, right: Link) -> usize {
        (1 + cmp::max(subtree_height(nodes, left), subtree_height(nodes, right))) as usize
    }

    fn adjust_height(&mut self, handle: Handle) {
        let node = self.node(handle);
        let height = Self::compute_height(&self.nodes, node.left, node.right);
        self.node_mut(handle).height = height;
    }

    fn balance_factor(&self, handle: Handle) -> isize {
        let node = self.node(handle);
        subtree_height(&self.nodes, node.left) - subtree_height(&self.nodes, node.right)
    }

    fn is_balanced(&self, handle: Handle) -> bool {
        self.balance_factor(handle).abs() < 2
    }

    // Replaces `old` by `new` in the child links of `parent`, or as root.
    fn replace_child(&mut self, parent: Link, old: Handle, new: Handle) {
        match parent {
            None => self.root = Some(new),
            Some(parent) => {
                if self.node(parent).left == Some(old) {
                    self.node_mut(parent).left = Some(new);
                } else {
                    self.node_mut(parent).right = Some(new);
                }
            }
        }
    }

    //       A (handle)               B (right)
    //      / \                      / \
    //     X   B (right)   =>  (handle) A   C
    //        / \                  / \
    //       Y   C                X   Y
    fn rotate_left(&mut self, handle: Handle) {
        if let Some(right) = self.node(handle).right {
            #[cfg(feature = "tracing")]
            tracing::trace!(pivot = %handle, "rotate left");

            let right_left = self.node(right).left;
            self.node_mut(handle).right = right_left;
            if let Some(right_left) = right_left {
                self.node_mut(right_left).parent = Some(handle);
            }

            let parent = self.node(handle).parent;
            self.node_mut(right).left = Some(handle);
            self.replace_child(parent, handle, right);

            self.adjust_height(handle);
            self.adjust_height(right);
            self.node_mut(right).parent = parent;
            self.node_mut(handle).parent = Some(right);
            self.propagate_heights(handle);
        }
    }

    //           A (handle)         B (left)
    //          / \                / \
    //  (left) B   X      =>      C   A (handle)
    //        / \                    / \
    //       C   Y                  Y   X
    fn rotate_right(&mut self, handle: Handle) {
        if let Some(left) = self.node(handle).left {
            #[cfg(feature = "tracing")]
            tracing::trace!(pivot = %handle, "rotate right");

            let left_right = self.node(left).right;
            self.node_mut(handle).left = left_right;
            if let Some(left_right) = left_right {
                self.node_mut(left_right).parent = Some(handle);
            }

            let parent = self.node(handle).parent;
            self.node_mut(left).right = Some(handle);
            self.replace_child(parent, handle, left);

            self.adjust_height(handle);
            self.adjust_height(left);
            self.node_mut(left).parent = parent;
            self.node_mut(handle).parent = Some(left);
            self.propagate_heights(handle);
        }
    }

    fn rotate_right_left(&mut self, handle: Handle) {
        if let Some(right) = self.node(handle).right {
            self.rotate_right(right);
            self.rotate_left(handle);
        }
    }

    fn rotate_left_right(&mut self, handle: Handle) {
        if let Some(left) = self.node(handle).left {
            self.rotate_left(left);
            self.rotate_right(handle);
        }
    }

    /// Restores the AVL condition at `handle`.
    /// The balance factor must be within [-2, 2], which always holds after a single insertion step.
    ///
    /// # Panics
    ///
    /// Panics if the balance factor is outside [-2, 2].
    fn rebalance(&mut self, handle: Handle) {
        match self.balance_factor(handle) {
            -2 => {
                // Right heavy
                let right_heavy_child = self
                    .node(handle)
                    .right
                    .map_or(false, |right| self.balance_factor(right) == -1);

                #[cfg(feature = "tracing")]
                tracing::debug!(%handle, single = right_heavy_child, "rebalance right heavy node");

                if right_heavy_child {
                    self.rotate_left(handle);
                } else {
                    self.rotate_right_left(handle);
                }
            }
            2 => {
                // Left heavy
                let left_heavy_child = self
                    .node(handle)
                    .left
                    .map_or(false, |left| self.balance_factor(left) == 1);

                #[cfg(feature = "tracing")]
                tracing::debug!(%handle, single = left_heavy_child, "rebalance left heavy node");

                if left_heavy_child {
                    self.rotate_right(handle);
                } else {
                    self.rotate_left_right(handle);
                }
            }
            balance if !(-1..=1).contains(&balance) => {
                let violation = InvariantViolation::BalanceFactor { handle, balance };

                #[cfg(feature = "tracing")]
                tracing::error!(%violation, "tree invariant broken");

                panic!("{}", violation);
            }
            _ => {}
        }
    }
}

impl<T> SearchTree<T> {
    /// Returns true if the tree contains no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of values in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the height of the tree.
    /// Both an empty tree and a tree with a single value have height 0.
    pub fn height(&self) -> usize {
        self.root.map_or(0, |root| self.node(root).height)
    }

    /// Returns the handle of the root node.
    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns the value stored at `handle`, if the handle belongs to this tree.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.nodes.get(handle.index()).map(|node| &node.value)
    }

    /// Returns the smallest value in the tree.
    pub fn first(&self) -> Option<&T> {
        leftmost(&self.nodes, self.root).map(|handle| &self.node(handle).value)
    }

    /// Returns the largest value in the tree.
    pub fn last(&self) -> Option<&T> {
        rightmost(&self.nodes, self.root).map(|handle| &self.node(handle).value)
    }

    /// Gets an iterator over the values of the tree in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes, self.root, self.nodes.len())
    }

    fn node(&self, handle: Handle) -> &Node<T> {
        &self.nodes[handle.index()]
    }

    fn node_mut(&mut self, handle: Handle) -> &mut Node<T> {
        &mut self.nodes[handle.index()]
    }

    #[cfg(test)]
    pub(crate) fn subtree_height_at(&self, handle: Handle) -> usize {
        self.node(handle).height
    }
}

impl<T: Ord> Default for SearchTree<T> {
    /// Creates an empty tree.
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for SearchTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for SearchTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |value| {
            self.insert(value);
        });
    }
}

impl<'a, T> Extend<&'a T> for SearchTree<T>
where
    T: Ord + Copy + 'a,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T> IntoIterator for &'a SearchTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for SearchTree<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: usize) -> Handle {
        Handle::from_index(index)
    }

    #[test]
    #[should_panic(expected = "invalid balance factor for node #0: 3")]
    fn rebalance_rejects_corrupted_heights() {
        // The left child claims a height its subtree cannot have
        let mut tree = SearchTree {
            nodes: vec![
                Node {
                    value: 10,
                    parent: None,
                    left: Some(handle(1)),
                    right: None,
                    height: 3,
                },
                Node {
                    value: 5,
                    parent: Some(handle(0)),
                    left: None,
                    right: None,
                    height: 2,
                },
            ],
            root: Some(handle(0)),
        };
        tree.rebalance(handle(0));
    }

    #[test]
    fn validate_reports_violations() {
        let mut tree: SearchTree<_> = [2, 1, 3].into_iter().collect();
        assert_eq!(tree.validate(), Ok(()));

        tree.nodes[0].height = 4;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::Height {
                handle: handle(0),
                stored: 4,
                expected: 1,
            })
        );
        tree.nodes[0].height = 1;

        tree.nodes[2].parent = Some(handle(1));
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::ParentLink {
                handle: handle(0),
                child: handle(2),
            })
        );
        tree.nodes[2].parent = Some(handle(0));

        tree.nodes[1].value = 7;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::Order {
                handle: handle(0),
                child: handle(1),
            })
        );
        tree.nodes[1].value = 1;

        tree.nodes[0].parent = Some(handle(2));
        assert_eq!(tree.validate(), Err(InvariantViolation::RootParent { handle: handle(0) }));
        tree.nodes[0].parent = None;

        tree.nodes[0].right = None;
        tree.nodes[0].height = 1;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::Unreachable {
                reached: 2,
                allocated: 3,
            })
        );
    }

    #[test]
    fn rotations_relink_parents() {
        //  1                 2
        //   \               / \
        //    2      ->     1   3
        //     \
        //      3
        let tree: SearchTree<_> = [1, 2, 3].into_iter().collect();
        assert_eq!(tree.root, Some(handle(1)));
        assert_eq!(tree.nodes[1].parent, None);
        assert_eq!(tree.nodes[0].parent, Some(handle(1)));
        assert_eq!(tree.nodes[2].parent, Some(handle(1)));
        assert_eq!(tree.nodes[1].left, Some(handle(0)));
        assert_eq!(tree.nodes[1].right, Some(handle(2)));
        assert_eq!(tree.nodes[0].right, None);
        assert_eq!(tree.nodes[1].height, 1);
        assert_eq!(tree.nodes[0].height, 0);
    }
}
