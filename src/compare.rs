//! Key ordering supplied by the caller.

use std::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// Every key stored in one map is compared through the same comparator, so it
/// must be consistent: antisymmetric, transitive and stable for the lifetime of
/// the map. A comparator that changes its answers corrupts the tree ordering.
///
/// Any `Fn(&K, &K) -> Ordering` is a comparator:
///
/// ```
/// use avlmap::AvlTreeMap;
/// let mut map = AvlTreeMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.first_key_value(), Some((&2, &"two")));
/// ```
pub trait Comparator<K: ?Sized> {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

impl<K, F> Comparator<K> for F
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}

/// Orders keys by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Adapts a sign-returning comparison: negative means less, zero means equal,
/// positive means greater.
///
/// ```
/// use avlmap::{AvlTreeSet, BySign};
/// let mut set = AvlTreeSet::with_comparator(BySign(|a: &u8, b: &u8| *a as i32 - *b as i32));
/// set.insert(3);
/// set.insert(1);
/// assert_eq!(set.first(), Some(&1));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BySign<F>(pub F);

impl<K, F> Comparator<K> for BySign<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> i32,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        (self.0)(lhs, rhs).cmp(&0)
    }
}
