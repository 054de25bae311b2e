use core::fmt;

use crate::compare::{Comparator, Natural};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::iter::{Iter, Keys, Values};
use crate::tree::RbTree;

/// Ordered map with unique keys, backed by a [`RbTree`].
///
/// ```
/// use rbtree::RbMap;
///
/// let mut map = RbMap::new();
/// map.set(10, "value10");
/// map.set(12, "value12");
///
/// assert_eq!(map.get(&10), Some(&"value10"));
/// assert_eq!(map.get(&11), None);
///
/// let ge = map.find_ge(&11);
/// assert!(!ge.is_limit());
/// assert_eq!(map.value(ge), &"value12");
/// assert!(map.find_ge(&13).is_limit());
/// ```
pub struct RbMap<K, V, C = Natural> {
    tree: RbTree<K, V, C>,
}

impl<K, V> RbMap<K, V, Natural>
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

impl<K, V> Default for RbMap<K, V, Natural>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RbMap<K, V, C>
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

    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Inserts or updates the value under `key`. Returns the previous value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.tree.insert_or_update(key, value).1
    }

    /// Removes `key`. Returns `true` iff it was present.
    pub fn delete_with_key(&mut self, key: &K) -> bool {
        self.tree.delete_with_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.remove(key).map(|(_, v)| v)
    }

    /// Removes the entry under `cursor`. See [`RbTree::delete`].
    pub fn delete(&mut self, cursor: Cursor) -> Result<(K, V)> {
        self.tree.delete(cursor)
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

    /// Returns `true` if `cursor` was obtained from this map.
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

    #[track_caller]
    pub fn key(&self, cursor: Cursor) -> &K {
        self.tree.key(cursor)
    }

    #[track_caller]
    pub fn value(&self, cursor: Cursor) -> &V {
        self.tree.value(cursor)
    }

    #[track_caller]
    pub fn value_mut(&mut self, cursor: Cursor) -> &mut V {
        self.tree.value_mut(cursor)
    }

    pub fn entry(&self, cursor: Cursor) -> Option<(&K, &V)> {
        self.tree.entry(cursor)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        self.tree.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.tree.values()
    }

    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
    {
        self.tree.dump()
    }

    /// The underlying tree, e.g. for [`RbTree::check_invariants`].
    pub fn as_tree(&self) -> &RbTree<K, V, C> {
        &self.tree
    }
}

impl<K, V, C> Clone for RbMap<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K, V, C> fmt::Debug for RbMap<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> Extend<(K, V)> for RbMap<K, V, C>
where
    C: Comparator<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RbMap<K, V, Natural>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, C> IntoIterator for &'a RbMap<K, V, C>
where
    C: Comparator<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn assert_contents(map: &RbMap<i32, i32>, expected: &[i32]) {
        let mut cursor = map.min();
        for k in expected {
            assert_eq!(map.key(cursor), k);
            assert_eq!(map.value(cursor), k);
            cursor = map.next(cursor);
        }
        assert!(cursor.is_limit());
        map.as_tree().check_invariants().unwrap();
    }

    #[test]
    fn set_get() {
        let mut map = RbMap::new();
        assert_eq!(map.len(), 0);
        assert_eq!(map.set(0, 10), None);
        map.set(1, 11);
        map.set(2, 12);
        assert_eq!(map.set(0, 13), Some(10));
        assert_eq!(map.len(), 3);

        assert_eq!(map.get(&-1), None);
        assert_eq!(map.get(&0), Some(&13));
        assert_eq!(map.get(&1), Some(&11));
        assert_eq!(map.get(&2), Some(&12));

        assert!(!map.delete_with_key(&-1));
        assert!(map.delete_with_key(&1));
        assert_eq!(map.get(&1), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn delete() {
        let mut map = RbMap::new();
        for i in 0..10 {
            map.set(i, i);
        }
        assert_contents(&map, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

        map.delete_with_key(&7);
        assert_contents(&map, &[0, 1, 2, 3, 4, 5, 6, 8, 9]);

        map.delete_with_key(&0);
        assert_contents(&map, &[1, 2, 3, 4, 5, 6, 8, 9]);

        let cursor = map.find(&4);
        assert_eq!(map.delete(cursor), Ok((4, 4)));
        assert_contents(&map, &[1, 2, 3, 5, 6, 8, 9]);
        assert_eq!(map.remove(&9), Some(9));
        assert_eq!(map.remove(&9), None);
    }

    #[test]
    fn find() {
        let mut map = RbMap::new();
        map.set(0, 0);
        map.set(2, 1);
        map.set(3, 2);
        map.set(7, 3);
        map.set(9, 4);

        assert_eq!(map.key(map.find(&3)), &3);
        assert_eq!(map.find(&1), map.limit());

        assert_eq!(map.key(map.find_ge(&3)), &3);
        assert_eq!(map.key(map.find_ge(&4)), &7);
        assert_eq!(map.find_ge(&10), map.limit());

        assert_eq!(map.key(map.find_le(&3)), &3);
        assert_eq!(map.key(map.find_le(&4)), &3);
        assert_eq!(map.key(map.find_le(&10)), &9);
        assert_eq!(map.find_le(&-1), map.limit());
    }

    #[test]
    fn order() {
        let mut keys: Vec<i32> = (0..10).collect();
        keys.shuffle(&mut ChaCha8Rng::seed_from_u64(7));

        let mut map = RbMap::new();
        for v in &keys {
            map.set(*v, *v);
        }

        let mut order = 0;
        let mut cursor = map.min();
        while !cursor.is_limit() {
            assert_eq!(map.key(cursor), &order);
            assert_eq!(map.value(cursor), &order);
            order += 1;
            cursor = map.next(cursor);
        }

        order -= 1;
        let mut cursor = map.max();
        while !cursor.is_limit() {
            assert_eq!(map.key(cursor), &order);
            order -= 1;
            cursor = map.prev(cursor);
        }
        assert_eq!(order, -1);
    }

    #[test]
    fn custom_comparator() {
        let mut map = RbMap::with_comparator(|a: &String, b: &String| {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        });
        map.set("ccc".to_owned(), 3);
        map.set("a".to_owned(), 1);
        map.set("bb".to_owned(), 2);
        map.set("aa".to_owned(), 22);

        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "aa", "bb", "ccc"]);
        assert_eq!(map.value(map.find_le(&"zz".to_owned())), &2);
    }

    #[test]
    fn mutate_values() {
        let mut map: RbMap<_, _> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
        *map.get_mut(&1).unwrap() = 100;
        let cursor = map.find(&3);
        *map.value_mut(cursor) = 300;
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [100, 2, 300]);
        assert_eq!(map.entry(cursor), Some((&3, &300)));
        assert_eq!(format!("{map:?}"), "{1: 100, 2: 2, 3: 300}");
    }

    #[test]
    fn clone_is_independent() {
        let mut map: RbMap<_, _> = (0..5).map(|k| (k, k)).collect();
        let copy = map.clone();
        let cursor = map.find(&2);
        assert!(map.owns(cursor));
        assert!(!copy.owns(cursor));

        map.delete(cursor).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(copy.len(), 5);
        assert_eq!(copy.get(&2), Some(&2));
        copy.as_tree().check_invariants().unwrap();
    }
}
