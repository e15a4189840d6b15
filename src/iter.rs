//! Resumable in-order iteration.

use std::collections::HashSet;
use std::fmt;
use std::iter::FusedIterator;

use crate::arena::Handle;
use crate::tree::Tree;

/// An iterator over the entries of a map, sorted by key.
///
/// The iterator keeps a stack of pending nodes and remembers which nodes it has
/// already produced, so it can be paused between elements. It borrows the map,
/// which therefore cannot be modified while the iterator is alive.
pub struct Iter<'a, K, V> {
    tree: &'a Tree<K, V>,
    frontier: Vec<Handle>,
    seen: HashSet<Handle>,
    remaining: usize,
}

/// An iterator over the keys of a map, in ascending order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a map, in ascending key order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a Tree<K, V>) -> Self {
        Self {
            tree,
            frontier: tree.root().into_iter().collect(),
            seen: HashSet::new(),
            remaining: tree.len(),
        }
    }

    /// Returns true if another entry is pending.
    pub fn has_next(&self) -> bool {
        !self.frontier.is_empty()
    }

    fn unseen(&self, link: Option<Handle>) -> Option<Handle> {
        link.filter(|handle| !self.seen.contains(handle))
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let top = *self.frontier.last()?;
            let node = tree.node(top);

            // Descend to the smallest pending key first
            if let Some(left) = self.unseen(node.left) {
                self.frontier.push(left);
                continue;
            }

            self.frontier.pop();
            self.seen.insert(top);
            if let Some(right) = self.unseen(node.right) {
                self.frontier.push(right);
            }
            self.remaining -= 1;
            return Some((&node.key, &node.value));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

// Auto derived clone seems to have an invalid type bound of K: Clone
impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            frontier: self.frontier.clone(),
            seen: self.seen.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }

    /// Returns true if another key is pending.
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }

    /// Returns true if another value is pending.
    pub fn has_next(&self) -> bool {
        self.inner.has_next()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::map::AvlTreeMap;

    #[test]
    fn seen_set_grows_with_the_walk() {
        let map: AvlTreeMap<i32, i32> = (0..1_000).map(|k| (k, k)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.seen.capacity(), 0);

        assert_eq!(iter.by_ref().take(3).count(), 3);
        assert_eq!(iter.seen.len(), 3);
        assert!(iter.seen.capacity() < map.len());

        let snapshot = iter.clone();
        assert_eq!(snapshot.seen.len(), 3);
        assert_eq!(snapshot.count(), 997);
    }
}
