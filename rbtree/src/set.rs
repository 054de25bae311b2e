use core::fmt;

use crate::compare::{Comparator, Natural};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::iter::Keys;
use crate::tree::RbTree;

/// Ordered set, backed by a [`RbTree`] with unit values.
pub struct RbSet<K, C = Natural> {
    tree: RbTree<K, (), C>,
}

impl<K> RbSet<K, Natural>
where
    K: Ord,
{
    pub fn new() -> Self {
        Self {
            tree: RbTree::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: RbTree::with_capacity(capacity),
        }
    }
}

impl<K> Default for RbSet<K, Natural>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> RbSet<K, C>
where
    C: Comparator<K>,
{
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            tree: RbTree::with_comparator(cmp),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Adds `key`. Returns `true` if it wasn't present yet.
    pub fn insert(&mut self, key: K) -> bool {
        self.tree.insert(key, ()).1
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Removes `key`. Returns `true` iff it was present.
    pub fn delete_with_key(&mut self, key: &K) -> bool {
        self.tree.delete_with_key(key)
    }

    pub fn take(&mut self, key: &K) -> Option<K> {
        self.tree.remove(key).map(|(k, ())| k)
    }

    /// Removes the item under `cursor`. See [`RbTree::delete`].
    pub fn delete(&mut self, cursor: Cursor) -> Result<K> {
        self.tree.delete(cursor).map(|(k, ())| k)
    }

    pub fn min(&self) -> Cursor {
        self.tree.min()
    }

    pub fn max(&self) -> Cursor {
        self.tree.max()
    }

    pub fn limit(&self) -> Cursor {
        self.tree.limit()
    }

    pub fn find(&self, key: &K) -> Cursor {
        self.tree.find(key)
    }

    pub fn find_ge(&self, key: &K) -> Cursor {
        self.tree.find_ge(key)
    }

    pub fn find_le(&self, key: &K) -> Cursor {
        self.tree.find_le(key)
    }

    /// Returns `true` if `cursor` was obtained from this set.
    pub fn owns(&self, cursor: Cursor) -> bool {
        self.tree.owns(cursor)
    }

    #[track_caller]
    pub fn next(&self, cursor: Cursor) -> Cursor {
        self.tree.next(cursor)
    }

    #[track_caller]
    pub fn prev(&self, cursor: Cursor) -> Cursor {
        self.tree.prev(cursor)
    }

    /// The item under `cursor`.
    ///
    /// # Panics
    ///
    /// If `cursor` is the limit, stale or from another set.
    #[track_caller]
    pub fn item(&self, cursor: Cursor) -> &K {
        self.tree.key(cursor)
    }

    pub fn iter(&self) -> Keys<'_, K, ()> {
        self.tree.keys()
    }

    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
    {
        self.tree.dump()
    }

    pub fn as_tree(&self) -> &RbTree<K, (), C> {
        &self.tree
    }
}

impl<K, C> Clone for RbSet<K, C>
where
    K: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K, C> fmt::Debug for RbSet<K, C>
where
    K: fmt::Debug,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, C> Extend<K> for RbSet<K, C>
where
    C: Comparator<K>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K> FromIterator<K> for RbSet<K, Natural>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, K, C> IntoIterator for &'a RbSet<K, C>
where
    C: Comparator<K>,
{
    type Item = &'a K;
    type IntoIter = Keys<'a, K, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
