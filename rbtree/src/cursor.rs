//! Positions in a tree.
//!
//! A [`Cursor`] is a plain value: it names an element of one particular tree
//! (or the limit position) without borrowing the tree. Reading through it and
//! moving it are methods on the tree. The invalidation rule is the one of
//! C++ `std::map` iterators: deleting the element a cursor refers to makes
//! that cursor stale, every other cursor keeps working.
//!
//! ```
//! use rbtree::RbTree;
//!
//! let mut tree = RbTree::new();
//! for k in [5, 1, 3] {
//!     tree.insert(k, k * 10);
//! }
//!
//! let mut keys = Vec::new();
//! let mut cursor = tree.min();
//! while !cursor.is_limit() {
//!     keys.push(*tree.key(cursor));
//!     cursor = tree.next(cursor);
//! }
//! assert_eq!(keys, [1, 3, 5]);
//! ```

use tracing::debug;

use crate::compare::Comparator;
use crate::error::{Error, Result};
use crate::node::{NodeId, TreeId};
use crate::tree::RbTree;

/// Handle to an element of a tree, or to the limit position.
///
/// The limit stands for both "before the first" and "after the last"
/// element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    tree: TreeId,
    node: Option<NodeId>,
}

impl Cursor {
    #[inline]
    pub(crate) fn new(tree: TreeId, node: Option<NodeId>) -> Self {
        Self { tree, node }
    }

    /// Returns `true` if the cursor doesn't denote an element.
    #[inline]
    pub fn is_limit(&self) -> bool {
        self.node.is_none()
    }

    /// The tree this cursor was obtained from.
    #[inline]
    pub fn tree_id(&self) -> TreeId {
        self.tree
    }

    #[inline]
    pub fn node_id(&self) -> Option<NodeId> {
        self.node
    }
}

impl<K, V, C> RbTree<K, V, C>
where
    C: Comparator<K>,
{
    /// Returns `true` if `cursor` was obtained from this tree.
    #[inline]
    pub fn owns(&self, cursor: Cursor) -> bool {
        cursor.tree == self.id
    }

    pub(crate) fn try_resolve(&self, cursor: Cursor) -> Result<usize> {
        if !self.owns(cursor) {
            return Err(Error::ForeignCursor {
                expected: self.id,
                found: cursor.tree,
            });
        }
        let id = cursor.node.ok_or(Error::Limit)?;
        let n = self.nodes.resolve(id).ok_or(Error::StaleCursor)?;
        debug_assert_eq!(self.nodes[n].tree, self.id);
        Ok(n)
    }

    /// Panicking counterpart of [`try_resolve`] for the read paths, where a
    /// bad cursor is a broken precondition.
    ///
    /// [`try_resolve`]: RbTree::try_resolve
    #[track_caller]
    fn resolve(&self, cursor: Cursor) -> usize {
        match self.try_resolve(cursor) {
            Ok(n) => n,
            Err(e) => panic!("invalid cursor: {e}"),
        }
    }

    /// Cursor to the next element in order, or the limit after the last one.
    ///
    /// # Panics
    ///
    /// If `cursor` is the limit, stale or from another tree.
    #[track_caller]
    pub fn next(&self, cursor: Cursor) -> Cursor {
        let n = self.resolve(cursor);
        self.cursor_at(self.nodes.successor(n))
    }

    /// Cursor to the previous element in order, or the limit before the
    /// first one.
    ///
    /// # Panics
    ///
    /// If `cursor` is the limit, stale or from another tree.
    #[track_caller]
    pub fn prev(&self, cursor: Cursor) -> Cursor {
        let n = self.resolve(cursor);
        self.cursor_at(self.nodes.predecessor(n))
    }

    /// # Panics
    ///
    /// If `cursor` is the limit, stale or from another tree.
    #[track_caller]
    pub fn key(&self, cursor: Cursor) -> &K {
        &self.nodes[self.resolve(cursor)].key
    }

    /// # Panics
    ///
    /// If `cursor` is the limit, stale or from another tree.
    #[track_caller]
    pub fn value(&self, cursor: Cursor) -> &V {
        &self.nodes[self.resolve(cursor)].value
    }

    /// # Panics
    ///
    /// If `cursor` is the limit, stale or from another tree.
    #[track_caller]
    pub fn value_mut(&mut self, cursor: Cursor) -> &mut V {
        let n = self.resolve(cursor);
        &mut self.nodes[n].value
    }

    /// The element under `cursor`, or `None` if the cursor doesn't denote a
    /// live element of this tree.
    pub fn entry(&self, cursor: Cursor) -> Option<(&K, &V)> {
        self.try_resolve(cursor).ok().map(|n| {
            let node = &self.nodes[n];
            (&node.key, &node.value)
        })
    }

    /// Removes the element under `cursor` and returns it.
    ///
    /// Only `cursor` (and copies of it) become stale. Nothing is modified if
    /// an error is returned.
    pub fn delete(&mut self, cursor: Cursor) -> Result<(K, V)> {
        match self.try_resolve(cursor) {
            Ok(n) => Ok(self.delete_node(n)),
            Err(e) => {
                debug!(tree = %self.id, cursor = ?cursor, error = %e, "rejected delete");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[i32]) -> RbTree<i32, i32> {
        let mut tree = RbTree::new();
        for &k in keys {
            tree.insert(k, k);
        }
        tree
    }

    #[test]
    fn walk_both_ways() {
        let tree = tree_of(&[8, 2, 6, 0, 4]);

        let mut items = Vec::new();
        let mut cursor = tree.min();
        while !cursor.is_limit() {
            items.push(*tree.key(cursor));
            cursor = tree.next(cursor);
        }
        assert_eq!(items, [0, 2, 4, 6, 8]);

        items.clear();
        let mut cursor = tree.max();
        while !cursor.is_limit() {
            items.push(*tree.value(cursor));
            cursor = tree.prev(cursor);
        }
        assert_eq!(items, [8, 6, 4, 2, 0]);
    }

    #[test]
    fn next_then_prev_returns() {
        let tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
        let mut cursor = tree.min();
        while cursor != tree.max() {
            let next = tree.next(cursor);
            assert_eq!(tree.prev(next), cursor);
            cursor = next;
        }
        assert!(tree.next(tree.max()).is_limit());
        assert!(tree.prev(tree.min()).is_limit());
    }

    #[test]
    fn limit_equality() {
        let tree = tree_of(&[1]);
        assert_eq!(tree.find(&2), tree.limit());
        assert_eq!(tree.next(tree.min()), tree.limit());
        assert!(tree.owns(tree.limit()));
        assert_eq!(tree.limit().tree_id(), tree.id());
        assert_eq!(tree.limit().node_id(), None);
    }

    #[test]
    fn value_mut_through_cursor() {
        let mut tree = tree_of(&[1, 2, 3]);
        let cursor = tree.find(&2);
        *tree.value_mut(cursor) += 40;
        assert_eq!(tree.get(&2), Some(&42));
        assert_eq!(tree.entry(cursor), Some((&2, &42)));
        assert_eq!(tree.entry(tree.limit()), None);
    }

    #[test]
    #[should_panic(expected = "limit")]
    fn next_at_limit_panics() {
        let tree = tree_of(&[1]);
        tree.next(tree.limit());
    }

    #[test]
    #[should_panic(expected = "limit")]
    fn key_at_limit_panics() {
        let tree = tree_of(&[]);
        tree.key(tree.min());
    }

    #[test]
    #[should_panic(expected = "deleted")]
    fn stale_cursor_panics() {
        let mut tree = tree_of(&[1, 2, 3]);
        let cursor = tree.find(&2);
        tree.delete(cursor).unwrap();
        tree.value(cursor);
    }

    #[test]
    fn stale_cursor_after_slot_reuse() {
        let mut tree = tree_of(&[1, 2, 3]);
        let cursor = tree.find(&2);
        assert_eq!(tree.delete(cursor), Ok((2, 2)));
        // the freed slot is handed to the new node
        let (fresh, inserted) = tree.insert(10, 10);
        assert!(inserted);
        assert_ne!(fresh, cursor);
        assert_eq!(tree.entry(cursor), None);
        assert_eq!(tree.delete(cursor), Err(Error::StaleCursor));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn delete_from_wrong_tree_is_rejected() {
        let mut a = tree_of(&[1, 2, 3]);
        let mut b = tree_of(&[1, 2, 3]);
        let cursor = a.find(&2);

        assert_eq!(
            b.delete(cursor),
            Err(Error::ForeignCursor {
                expected: b.id(),
                found: a.id(),
            })
        );
        assert_eq!(b.len(), 3);
        assert!(b.contains_key(&2));
        assert!(b.check_invariants().is_ok());

        assert_eq!(a.delete(cursor), Ok((2, 2)));
        assert_eq!(a.delete(a.limit()), Err(Error::Limit));
    }

    #[test]
    #[should_panic(expected = "cursor belongs to")]
    fn read_through_foreign_cursor_panics() {
        let a = tree_of(&[1]);
        let b = tree_of(&[1]);
        b.key(a.min());
    }

    #[test]
    fn cursors_survive_predecessor_swap() {
        // 20 has two children, deleting it moves 15 into its place
        let mut tree = tree_of(&[20, 10, 30, 5, 15, 25, 35, 12]);
        let held: Vec<_> = [5, 10, 12, 15, 25, 30, 35]
            .iter()
            .map(|k| (*k, tree.find(k)))
            .collect();

        let doomed = tree.find(&20);
        assert_eq!(tree.delete(doomed), Ok((20, 20)));
        tree.check_invariants().unwrap();

        for (k, cursor) in &held {
            assert_eq!(tree.key(*cursor), k);
        }
        // neighbours are still linked in order
        let c15 = tree.find(&15);
        assert_eq!(held[3].1, c15);
        assert_eq!(tree.key(tree.next(c15)), &25);
        assert_eq!(tree.key(tree.prev(c15)), &12);
    }

    #[test]
    fn delete_every_element_through_cursors() {
        let mut tree = tree_of(&[9, 3, 7, 1, 5, 8, 2, 6, 4, 0]);
        let cursors: Vec<_> = (0..10).map(|k| tree.find(&k)).collect();
        for (i, cursor) in cursors.iter().enumerate().rev() {
            assert_eq!(tree.delete(*cursor), Ok((i as i32, i as i32)));
            tree.check_invariants().unwrap();
            for (j, other) in cursors.iter().enumerate().take(i) {
                assert_eq!(*tree.key(*other), j as i32);
            }
        }
        assert!(tree.is_empty());
        assert!(tree.min().is_limit());
        assert!(tree.max().is_limit());
    }
}
