//! An ordered map and an ordered set backed by an AVL tree.
//!
//! Nodes live in an index arena and are linked to their parent and children by
//! handles, so the tree can be rebalanced and walked without recursion. Keys
//! are ordered by a [`Comparator`] chosen when the collection is created.
//!
//! ```
//! use avlmap::{AvlTreeMap, AvlTreeSet};
//!
//! let mut map = AvlTreeMap::new();
//! for key in [5, 3, 8, 1, 4] {
//!     map.insert(key, key * 10);
//! }
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 8]);
//! assert_eq!(map.pop_first(), Some((1, 10)));
//!
//! let lhs: AvlTreeSet<_> = [1, 2, 3].into_iter().collect();
//! let rhs: AvlTreeSet<_> = [2, 3, 4].into_iter().collect();
//! assert_eq!(lhs.difference(&rhs).iter().copied().collect::<Vec<_>>(), [1]);
//! ```
//!
//! Collections are single-threaded. A map must not be modified while one of
//! its iterators is alive, which the borrow checker enforces.

mod arena;
mod compare;
mod error;
mod iter;
mod tree;

pub mod map;
pub mod set;

pub use compare::{BySign, Comparator, Natural};
pub use error::{Error, Result};
pub use map::AvlTreeMap;
pub use set::AvlTreeSet;
