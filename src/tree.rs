use std::cmp::{self, Ordering};
use std::collections::{TryReserveError, VecDeque};

use tracing::trace;

use crate::arena::{Arena, Handle};
use crate::compare::Comparator;

pub(crate) type Link = Option<Handle>;

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
    pub(crate) height: usize,
}

impl<K, V> Node<K, V> {
    fn new(parent: Link, key: K, value: V) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        }
    }
}

/// Result of descending the tree for a key.
pub(crate) enum Search {
    Found(Handle),
    Vacant(Vacancy),
}

/// The empty child slot where a missing key belongs.
#[derive(Clone, Copy)]
pub(crate) struct Vacancy {
    parent: Link,
    side: Ordering,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    Pre,
    In,
}

#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

/// Depth-first walk over parent links, needing no stack.
pub(crate) struct Walk {
    cursor: Option<(Handle, Direction)>,
}

impl Walk {
    pub(crate) fn new(root: Link) -> Self {
        Self {
            cursor: root.map(|handle| (handle, Direction::FromParent)),
        }
    }

    /// Advances to the next preorder or inorder visit.
    pub(crate) fn step<K, V>(&mut self, tree: &Tree<K, V>) -> Option<(Handle, Visit)> {
        loop {
            let (handle, dir) = self.cursor?;
            let node = tree.node(handle);
            match dir {
                Direction::FromParent => {
                    self.cursor = Some(match node.left {
                        Some(left) => (left, Direction::FromParent),
                        None => (handle, Direction::FromLeft),
                    });
                    return Some((handle, Visit::Pre));
                }
                Direction::FromLeft => {
                    self.cursor = Some(match node.right {
                        Some(right) => (right, Direction::FromParent),
                        None => (handle, Direction::FromRight),
                    });
                    return Some((handle, Visit::In));
                }
                Direction::FromRight => {
                    self.cursor = node.parent.map(|parent| {
                        if tree.node(parent).left == Some(handle) {
                            (parent, Direction::FromLeft)
                        } else {
                            (parent, Direction::FromRight)
                        }
                    });
                }
            }
        }
    }
}

/// AVL tree over an arena of nodes linked by handles.
///
/// The tree does not own a comparator; every operation that orders keys takes
/// one, and callers must pass the same comparator for the life of the tree.
#[derive(Clone)]
pub(crate) struct Tree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Link,
    num_nodes: usize,
}

impl<K, V> Tree<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            num_nodes: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            num_nodes: 0,
        }
    }

    pub(crate) fn root(&self) -> Link {
        self.root
    }

    pub(crate) fn len(&self) -> usize {
        self.num_nodes
    }

    #[cfg(test)]
    pub(crate) fn height(&self) -> usize {
        self.height_of(self.root)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.nodes.try_reserve(additional)
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Releases every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.num_nodes = 0;
    }

    pub(crate) fn search<C>(&self, key: &K, cmp: &C) -> Search
    where
        C: Comparator<K>,
    {
        let mut vacancy = Vacancy {
            parent: None,
            side: Ordering::Equal,
        };
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            vacancy = Vacancy {
                parent: Some(handle),
                side: cmp.compare(key, &node.key),
            };
            current = match vacancy.side {
                Ordering::Equal => return Search::Found(handle),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        Search::Vacant(vacancy)
    }

    pub(crate) fn find<C>(&self, key: &K, cmp: &C) -> Link
    where
        C: Comparator<K>,
    {
        match self.search(key, cmp) {
            Search::Found(handle) => Some(handle),
            Search::Vacant(_) => None,
        }
    }

    /// Leftmost node, holding the smallest key.
    pub(crate) fn first(&self) -> Link {
        let mut current = self.root?;
        while let Some(left) = self.node(current).left {
            current = left;
        }
        Some(current)
    }

    /// Rightmost node, holding the largest key.
    pub(crate) fn last(&self) -> Link {
        let mut current = self.root?;
        while let Some(right) = self.node(current).right {
            current = right;
        }
        Some(current)
    }

    /// Inserts a new node into the vacancy found by `search`.
    pub(crate) fn insert_at(&mut self, vacancy: Vacancy, key: K, value: V) -> Handle {
        let handle = self.nodes.alloc(Node::new(vacancy.parent, key, value));
        self.link_new(vacancy, handle);
        handle
    }

    /// Like `insert_at`, but leaves the tree untouched if the node cannot be
    /// allocated.
    pub(crate) fn try_insert_at(
        &mut self,
        vacancy: Vacancy,
        key: K,
        value: V,
    ) -> Result<Handle, TryReserveError> {
        let handle = self
            .nodes
            .try_alloc(Node::new(vacancy.parent, key, value))?;
        self.link_new(vacancy, handle);
        Ok(handle)
    }

    /// Unlinks a node from the tree, restores balance and returns its payload.
    pub(crate) fn remove(&mut self, handle: Handle) -> (K, V) {
        debug_assert!(self.num_nodes >= 1);
        self.unlink_node(handle);
        let node = self.nodes.take(handle);
        self.num_nodes -= 1;
        debug_assert_eq!(self.num_nodes, self.nodes.len());
        (node.key, node.value)
    }

    pub(crate) fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        let mut walk = Walk::new(self.root);
        while let Some((handle, visit)) = walk.step(self) {
            if visit == Visit::In {
                let node = self.node(handle);
                f(&node.key, &node.value);
            }
        }
    }

    /// In-order walk that stops at the first error returned by `f`.
    pub(crate) fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&K, &V) -> Result<(), E>,
    {
        let mut walk = Walk::new(self.root);
        while let Some((handle, visit)) = walk.step(self) {
            if visit == Visit::In {
                let node = self.node(handle);
                f(&node.key, &node.value)?;
            }
        }
        Ok(())
    }

    pub(crate) fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        let mut walk = Walk::new(self.root);
        while let Some((handle, visit)) = walk.step(self) {
            if visit == Visit::In {
                let node = self.node_mut(handle);
                f(&node.key, &mut node.value);
            }
        }
    }

    pub(crate) fn for_each_level_order<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        let mut queue: VecDeque<Handle> = self.root.into_iter().collect();
        while let Some(handle) = queue.pop_front() {
            let node = self.node(handle);
            f(&node.key, &node.value);
            queue.extend(node.left);
            queue.extend(node.right);
        }
    }

    /// Asserts ordering, balance, height, link and size invariants.
    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_consistency<C>(&self, cmp: &C)
    where
        C: Comparator<K>,
    {
        // Check root link
        if let Some(root) = self.root {
            assert!(self.node(root).parent.is_none());
        }

        let mut num_nodes = 0;
        let mut previous: Link = None;
        let mut walk = Walk::new(self.root);
        while let Some((handle, visit)) = walk.step(self) {
            let node = self.node(handle);
            if visit == Visit::In {
                // Check global order
                if let Some(previous) = previous {
                    assert_eq!(cmp.compare(&self.node(previous).key, &node.key), Ordering::Less);
                }
                previous = Some(handle);
                continue;
            }

            // Check link for left child node
            if let Some(left) = node.left {
                assert_eq!(self.node(left).parent, Some(handle));
                assert_eq!(cmp.compare(&self.node(left).key, &node.key), Ordering::Less);
            }

            // Check link for right child node
            if let Some(right) = node.right {
                assert_eq!(self.node(right).parent, Some(handle));
                assert_eq!(cmp.compare(&self.node(right).key, &node.key), Ordering::Greater);
            }

            // Check height
            let left_height = self.height_of(node.left);
            let right_height = self.height_of(node.right);
            assert_eq!(node.height, 1 + cmp::max(left_height, right_height));

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            num_nodes += 1;
        }

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);
        assert_eq!(num_nodes, self.nodes.len());
    }

    fn link_new(&mut self, vacancy: Vacancy, handle: Handle) {
        match vacancy.parent {
            None => self.root = Some(handle),
            Some(parent) => {
                let parent = self.node_mut(parent);
                if vacancy.side == Ordering::Less {
                    parent.left = Some(handle);
                } else {
                    parent.right = Some(handle);
                }
            }
        }
        self.num_nodes += 1;
        // The new leaf is balanced; start from its parent.
        self.rebalance(vacancy.parent);
    }

    /// Points the child slot of `parent` that holds `old` at `new`, or replaces
    /// the root when `parent` is absent.
    fn replace_child(&mut self, parent: Link, old: Handle, new: Link) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let parent = self.node_mut(parent);
                if parent.left == Some(old) {
                    parent.left = new;
                } else {
                    parent.right = new;
                }
            }
        }
    }

    fn unlink_node(&mut self, handle: Handle) {
        let node = self.node(handle);
        let (parent, left, right, height) = (node.parent, node.left, node.right, node.height);

        match (left, right) {
            (Some(left), Some(right)) => {
                trace!("unlinking inner node");

                // Find largest node in left sub tree
                let mut max_parent = handle;
                let mut max = left;
                while let Some(next) = self.node(max).right {
                    max_parent = max;
                    max = next;
                }

                // Largest node has no right child, unlink it from its parent
                let max_left = self.node(max).left;
                if max_parent == handle {
                    self.node_mut(max_parent).left = max_left;
                } else {
                    self.node_mut(max_parent).right = max_left;
                }
                if let Some(max_left) = max_left {
                    self.node_mut(max_left).parent = Some(max_parent);
                }

                // Move largest node into the place of the node to-unlink
                let left = self.node(handle).left;
                if let Some(left) = left {
                    self.node_mut(left).parent = Some(max);
                }
                self.node_mut(right).parent = Some(max);
                let moved = self.node_mut(max);
                moved.left = left;
                moved.right = Some(right);
                moved.parent = parent;
                moved.height = height;
                self.replace_child(parent, handle, Some(max));

                // Former parent of largest node might be out of balance now
                let rebalance_from = if max_parent == handle { max } else { max_parent };
                self.rebalance(Some(rebalance_from));
            }
            (Some(child), None) | (None, Some(child)) => {
                trace!("unlinking stem node");
                self.node_mut(child).parent = parent;
                self.replace_child(parent, handle, Some(child));
                self.rebalance(parent);
            }
            (None, None) => {
                trace!("unlinking leaf node");
                self.replace_child(parent, handle, None);
                self.rebalance(parent);
            }
        }
    }

    fn height_of(&self, link: Link) -> usize {
        link.map_or(0, |handle| self.node(handle).height)
    }

    fn balance_factor(&self, handle: Handle) -> isize {
        let node = self.node(handle);
        self.height_of(node.left) as isize - self.height_of(node.right) as isize
    }

    fn adjust_height(&mut self, handle: Handle) {
        let node = self.node(handle);
        let height = 1 + cmp::max(self.height_of(node.left), self.height_of(node.right));
        self.node_mut(handle).height = height;
    }

    //   x             r
    //  / \           / \
    // a   r   ->    x   c
    //    / \       / \
    //   b   c     a   b
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let Some(right) = self.node(handle).right else {
            return handle;
        };

        let right_left = self.node(right).left;
        self.node_mut(handle).right = right_left;
        if let Some(right_left) = right_left {
            self.node_mut(right_left).parent = Some(handle);
        }

        let parent = self.node(handle).parent;
        self.node_mut(right).parent = parent;
        self.replace_child(parent, handle, Some(right));

        self.node_mut(right).left = Some(handle);
        self.node_mut(handle).parent = Some(right);

        self.adjust_height(handle);
        self.adjust_height(right);
        trace!(direction = "left", "rotated subtree");
        right
    }

    //     x         l
    //    / \       / \
    //   l   c ->  a   x
    //  / \           / \
    // a   b         b   c
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let Some(left) = self.node(handle).left else {
            return handle;
        };

        let left_right = self.node(left).right;
        self.node_mut(handle).left = left_right;
        if let Some(left_right) = left_right {
            self.node_mut(left_right).parent = Some(handle);
        }

        let parent = self.node(handle).parent;
        self.node_mut(left).parent = parent;
        self.replace_child(parent, handle, Some(left));

        self.node_mut(left).right = Some(handle);
        self.node_mut(handle).parent = Some(left);

        self.adjust_height(handle);
        self.adjust_height(left);
        trace!(direction = "right", "rotated subtree");
        left
    }

    /// Rebalances nodes starting from given position towards the root node.
    /// Stops once a subtree keeps the height it had before the update, since
    /// no ancestor can be affected beyond that point.
    fn rebalance(&mut self, start_from: Link) {
        let mut current = start_from;
        while let Some(handle) = current {
            let old_height = self.node(handle).height;
            let subtree = self.rebalance_node(handle);
            let node = self.node(subtree);
            if node.height == old_height {
                break;
            }
            current = node.parent;
        }
    }

    /// Restores AVL condition (balance) at given node if necessary and adjusts height.
    /// Resulting balance will be +1, 0 or -1 height difference between left and right subtree.
    /// Initial balance must not exceed +2 or -2, which always holds after a single update.
    /// Returns the root of the rebalanced subtree.
    fn rebalance_node(&mut self, handle: Handle) -> Handle {
        self.adjust_height(handle);
        let balance = self.balance_factor(handle);
        debug_assert!((-2..=2).contains(&balance));

        let node = self.node(handle);
        match (node.left, node.right) {
            (Some(left), _) if balance > 1 => {
                // Left heavy, left-right case needs a pre-rotation
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(handle)
            }
            (_, Some(right)) if balance < -1 => {
                // Right heavy, right-left case needs a pre-rotation
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(handle)
            }
            _ => handle,
        }
    }
}
