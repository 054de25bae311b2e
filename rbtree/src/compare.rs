//! Key ordering strategies.
//!
//! A tree is given its ordering once, at construction, and keeps it for its
//! whole lifetime. The ordering must be a strict total order that stays
//! consistent for every key while it is stored. Breaking that contract does
//! not cause memory unsafety, but lookups and traversal return unspecified
//! results.

use core::cmp::Ordering;

/// Three-way comparison of two keys.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The key type's own [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<K> Comparator<K> for Natural
where
    K: Ord + ?Sized,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, F> Comparator<K> for F
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Adapts a C-style comparison function returning a negative number, zero or
/// a positive number.
///
/// ```
/// use rbtree::{RbSet, ThreeWay};
///
/// let mut set = RbSet::with_comparator(ThreeWay(|a: &i32, b: &i32| b - a));
/// set.insert(1);
/// set.insert(3);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 1]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ThreeWay<F>(pub F);

impl<K, F> Comparator<K> for ThreeWay<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> i32,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b).cmp(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural() {
        assert_eq!(Natural.compare(&1, &2), Ordering::Less);
        assert_eq!(Natural.compare("b", "a"), Ordering::Greater);
        assert_eq!(Natural.compare(&3u8, &3u8), Ordering::Equal);
    }

    #[test]
    fn closure() {
        let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
        assert_eq!(by_len.compare(&"aaa", &"b"), Ordering::Greater);
        assert_eq!(by_len.compare(&"aa", &"bb"), Ordering::Equal);
    }

    #[test]
    fn three_way() {
        let cmp = ThreeWay(|a: &i32, b: &i32| a - b);
        assert_eq!(cmp.compare(&-5, &7), Ordering::Less);
        assert_eq!(cmp.compare(&7, &7), Ordering::Equal);
        assert_eq!(cmp.compare(&9, &7), Ordering::Greater);
    }
}
