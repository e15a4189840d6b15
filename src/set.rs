//! An ordered set implemented with an AVL tree.

use std::fmt;
use std::iter::{FromIterator, FusedIterator};

use tracing::debug;

use crate::compare::{Comparator, Natural};
use crate::error::{Error, Result};
use crate::iter::Keys;
use crate::map::AvlTreeMap;

/// An ordered set implemented with an AVL tree.
///
/// ```
/// use avlmap::AvlTreeSet;
/// let mut set = AvlTreeSet::new();
/// set.insert(0);
/// set.insert(1);
/// set.insert(2);
/// assert_eq!(set.get(&1), Some(&1));
/// set.remove(&1);
/// assert!(set.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeSet<T, C = Natural> {
    map: AvlTreeMap<T, (), C>,
}

/// An iterator over the values of a set, in ascending order.
pub struct Iter<'a, T> {
    keys: Keys<'a, T, ()>,
}

impl<T: Ord> AvlTreeSet<T> {
    /// Creates an empty set ordered by `T: Ord`.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            map: AvlTreeMap::new(),
        }
    }
}

impl<T, C: Comparator<T>> AvlTreeSet<T, C> {
    /// Creates an empty set ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            map: AvlTreeMap::with_comparator(cmp),
        }
    }

    /// Returns a reference to the value in the set that is equal to the given value.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.map.get_key_value(value).map(|kv| kv.0)
    }

    /// Returns true if the set contains a value.
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Inserts a value into the set.
    /// Returns whether the value was newly inserted.
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Inserts a value into the set, reporting allocation failure instead of
    /// aborting. On error the set is unchanged.
    pub fn try_insert(&mut self, value: T) -> Result<bool> {
        Ok(self.map.try_insert(value, ())?.is_none())
    }

    /// Removes a value from the set.
    /// Returns whether the value was previously in the set.
    pub fn remove(&mut self, value: &T) -> bool {
        self.map.remove(value).is_some()
    }

    /// Removes a value from the set.
    /// Returns the value if it was previously in the set.
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.map.remove_entry(value).map(|(k, _)| k)
    }

    /// Returns a new set with all values in `self` or `other`.
    ///
    /// The result is ordered by a clone of `self`'s comparator.
    pub fn union(&self, other: &Self) -> Self
    where
        T: Clone,
        C: Clone,
    {
        let mut result = self.empty_like();
        for value in self.iter().chain(other.iter()) {
            result.insert(value.clone());
        }
        debug!(lhs = self.len(), rhs = other.len(), len = result.len(), "computed set union");
        result
    }

    /// Returns a new set with the values that are both in `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self
    where
        T: Clone,
        C: Clone,
    {
        let mut result = self.empty_like();
        for value in self.iter().chain(other.iter()) {
            if self.contains(value) && other.contains(value) {
                result.insert(value.clone());
            }
        }
        debug!(lhs = self.len(), rhs = other.len(), len = result.len(), "computed set intersection");
        result
    }

    /// Returns a new set with the values in `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self
    where
        T: Clone,
        C: Clone,
    {
        let mut result = self.empty_like();
        for value in self.iter() {
            if !other.contains(value) {
                result.insert(value.clone());
            }
        }
        debug!(lhs = self.len(), rhs = other.len(), len = result.len(), "computed set difference");
        result
    }

    /// Like [`union`](Self::union), but reports allocation failure instead of
    /// aborting. On error the partial result is dropped and both inputs are
    /// unchanged.
    pub fn try_union(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        C: Clone,
    {
        let mut result = self.empty_like();
        for source in [self, other] {
            source.map.try_for_each(|value, _| result.try_insert(value.clone()).map(drop))?;
        }
        debug!(lhs = self.len(), rhs = other.len(), len = result.len(), "computed set union");
        Ok(result)
    }

    /// Like [`intersection`](Self::intersection), but reports allocation
    /// failure instead of aborting.
    pub fn try_intersection(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        C: Clone,
    {
        let mut result = self.empty_like();
        for source in [self, other] {
            source.map.try_for_each(|value, _| {
                if self.contains(value) && other.contains(value) {
                    result.try_insert(value.clone())?;
                }
                Ok::<(), Error>(())
            })?;
        }
        debug!(lhs = self.len(), rhs = other.len(), len = result.len(), "computed set intersection");
        Ok(result)
    }

    /// Like [`difference`](Self::difference), but reports allocation failure
    /// instead of aborting.
    pub fn try_difference(&self, other: &Self) -> Result<Self>
    where
        T: Clone,
        C: Clone,
    {
        let mut result = self.empty_like();
        self.map.try_for_each(|value, _| {
            if !other.contains(value) {
                result.try_insert(value.clone())?;
            }
            Ok::<(), Error>(())
        })?;
        debug!(lhs = self.len(), rhs = other.len(), len = result.len(), "computed set difference");
        Ok(result)
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.iter().all(|value| !large.contains(value))
    }

    /// Returns `true` if every element of `self` is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|value| other.contains(value))
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.map.check_consistency()
    }

    fn empty_like(&self) -> Self
    where
        C: Clone,
    {
        Self::with_comparator(self.map.comparator().clone())
    }
}

impl<T, C> AvlTreeSet<T, C> {
    /// Returns true if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Clears the set, deallocating all memory.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the smallest value in the set.
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|kv| kv.0)
    }

    /// Returns the largest value in the set.
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|kv| kv.0)
    }

    /// Removes and returns the smallest value in the set.
    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|kv| kv.0)
    }

    /// Removes and returns the largest value in the set.
    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|kv| kv.0)
    }

    /// Calls `f` on every value in ascending order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        self.map.for_each(|value, _| f(value));
    }

    /// Gets an iterator over the values of the set in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            keys: self.map.keys(),
        }
    }
}

impl<T, C> Default for AvlTreeSet<T, C>
where
    C: Comparator<T> + Default,
{
    /// Creates an empty set.
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C> FromIterator<T> for AvlTreeSet<T, C>
where
    C: Comparator<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C> Extend<T> for AvlTreeSet<T, C>
where
    C: Comparator<T>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().for_each(move |value| {
            self.insert(value);
        });
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTreeSet<T, C> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C> IntoIterator for &'a AvlTreeSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Iter<'_, T> {
    /// Returns true if another value is pending.
    pub fn has_next(&self) -> bool {
        self.keys.has_next()
    }
}

// Auto derived clone seems to have an invalid type bound of T: Clone
impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        self.keys.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
