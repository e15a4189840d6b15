//! An ordered map implemented with an AVL tree.

use std::fmt;
use std::iter::FromIterator;
use std::mem;

use tracing::{debug, warn};

use crate::compare::{Comparator, Natural};
use crate::error::{Error, Result};
use crate::tree::{Search, Tree};

pub use crate::iter::{Iter, Keys, Values};

/// An ordered map implemented with an AVL tree.
///
/// Keys are ordered by the comparator `C`, which defaults to the keys' `Ord`
/// implementation.
///
/// ```
/// use avlmap::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTreeMap<K, V, C = Natural> {
    tree: Tree<K, V>,
    cmp: C,
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Creates an empty map ordered by `K: Ord`.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, V, C: Comparator<K>> AvlTreeMap<K, V, C> {
    /// Creates an empty map ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            tree: Tree::new(),
            cmp,
        }
    }

    /// Creates an empty map ordered by `cmp` with room for `capacity` entries.
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            tree: Tree::with_capacity(capacity),
            cmp,
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let node = self.tree.node(self.tree.find(key, &self.cmp)?);
        Some((&node.key, &node.value))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let handle = self.tree.find(key, &self.cmp)?;
        Some(&mut self.tree.node_mut(handle).value)
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.find(key, &self.cmp).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already had the key, its value is overwritten in place and the
    /// old value is returned; the stored key is kept and the tree shape does not
    /// change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.search(&key, &self.cmp) {
            Search::Found(handle) => Some(mem::replace(&mut self.tree.node_mut(handle).value, value)),
            Search::Vacant(vacancy) => {
                self.tree.insert_at(vacancy, key, value);
                None
            }
        }
    }

    /// Inserts a key-value pair into the map, reporting allocation failure
    /// instead of aborting.
    ///
    /// On error the map is unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        match self.tree.search(&key, &self.cmp) {
            Search::Found(handle) => Ok(Some(mem::replace(&mut self.tree.node_mut(handle).value, value))),
            Search::Vacant(vacancy) => match self.tree.try_insert_at(vacancy, key, value) {
                Ok(_) => Ok(None),
                Err(err) => {
                    warn!(len = self.len(), "failed to allocate map node: {err}");
                    Err(err.into())
                }
            },
        }
    }

    /// Replaces the value of an existing key and returns the old value.
    ///
    /// Fails with [`Error::KeyNotFound`] without inserting if the key is absent.
    pub fn update(&mut self, key: &K, value: V) -> Result<V> {
        match self.get_mut(key) {
            Some(slot) => Ok(mem::replace(slot, value)),
            None => Err(Error::KeyNotFound),
        }
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map.
    /// Returns the stored key and value if the key was previously in the map.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let handle = self.tree.find(key, &self.cmp)?;
        let entry = self.tree.remove(handle);
        debug_assert!(self.get(key).is_none());
        Some(entry)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_consistency(&self.cmp);
    }
}

impl<K, V, C> AvlTreeMap<K, V, C> {
    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.root().is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the comparator that orders the keys.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of entries the map can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.tree.reserve(additional);
    }

    /// Reserves room for at least `additional` more entries, reporting
    /// allocation failure instead of aborting.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        Ok(self.tree.try_reserve(additional)?)
    }

    #[cfg(test)]
    pub(crate) fn height(&self) -> usize {
        self.tree.height()
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        debug!(len = self.len(), capacity = self.capacity(), "clearing map");
        self.tree.clear();
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let node = self.tree.node(self.tree.first()?);
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let node = self.tree.node(self.tree.last()?);
        Some((&node.key, &node.value))
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.tree.first()?;
        Some(self.tree.remove(handle))
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.tree.last()?;
        Some(self.tree.remove(handle))
    }

    /// Calls `f` on every entry in ascending key order.
    /// Walks the parent links of the tree, so no extra memory is needed.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V),
    {
        self.tree.for_each(f);
    }

    /// Calls `f` on every entry in ascending key order until it returns an
    /// error, which is passed on to the caller.
    /// Like `for_each`, the walk itself allocates nothing.
    pub fn try_for_each<E, F>(&self, f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&K, &V) -> std::result::Result<(), E>,
    {
        self.tree.try_for_each(f)
    }

    /// Calls `f` on every entry in ascending key order, with mutable access to
    /// the values.
    pub fn for_each_mut<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V),
    {
        self.tree.for_each_mut(f);
    }

    /// Calls `f` on every entry in level order, starting at the root.
    pub fn for_each_level_order<F>(&self, f: F)
    where
        F: FnMut(&K, &V),
    {
        self.tree.for_each_level_order(f);
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }
}

impl<K, V, C> Default for AvlTreeMap<K, V, C>
where
    C: Comparator<K> + Default,
{
    /// Creates an empty map.
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for AvlTreeMap<K, V, C> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> FromIterator<(K, V)> for AvlTreeMap<K, V, C>
where
    C: Comparator<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C> Extend<(K, V)> for AvlTreeMap<K, V, C>
where
    C: Comparator<K>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        iter.into_iter().for_each(move |(key, value)| {
            self.insert(key, value);
        });
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
