//! Slot storage for tree nodes.
//!
//! Nodes never move once allocated: a `Handle` stays valid until the node is
//! taken out of the arena, and freed slots are reused by later allocations.

use std::collections::TryReserveError;
use std::num::NonZeroU32;

/// Identity of an allocated slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZeroU32);

impl Handle {
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        match NonZeroU32::new((index + 1) as u32) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of elements the arena can hold without reallocating.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        let missing = additional.saturating_sub(self.free.len());
        self.slots.reserve(missing);
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let missing = additional.saturating_sub(self.free.len());
        self.slots.try_reserve(missing)
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        self.reserve(1);
        self.place(element)
    }

    /// Allocates a slot, reporting allocation failure instead of aborting.
    /// On failure the arena is unchanged and `element` is dropped.
    pub(crate) fn try_alloc(&mut self, element: T) -> Result<Handle, TryReserveError> {
        self.try_reserve(1)?;
        Ok(self.place(element))
    }

    // Capacity for one more element must already be available.
    fn place(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()]
            .as_ref()
            .expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()]
            .as_mut()
            .expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()]
            .take()
            .expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    /// Drops every element and releases the slot buffers.
    pub(crate) fn clear(&mut self) {
        self.slots = Vec::new();
        self.free = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn handle_round_trip() {
        for index in [0, 1, 41, Handle::MAX] {
            assert_eq!(Handle::from_index(index).to_index(), index);
        }
        assert_eq!(
            std::mem::size_of::<Option<Handle>>(),
            std::mem::size_of::<Handle>()
        );
    }

    #[test]
    #[should_panic(expected = "`Handle::from_index()` - `index` > `Handle::MAX`!")]
    fn invalid_handle() {
        let _ = Handle::from_index(Handle::MAX + 1);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = Arena::with_capacity(4);
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(arena.take(a), "a");
        assert_eq!(arena.len(), 1);
        let c = arena.try_alloc("c").unwrap();
        assert_eq!(c, a);
        assert_eq!(*arena.get(c), "c");
        assert_eq!(*arena.get(b), "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn freed_slots_keep_capacity() {
        let mut arena: Arena<u32> = Arena::new();
        arena.reserve(8);
        assert!(arena.capacity() >= 8);
        let handles: Vec<Handle> = (0..8).map(|v| arena.alloc(v)).collect();
        for handle in handles {
            arena.take(handle);
        }
        assert_eq!(arena.len(), 0);
        let capacity = arena.capacity();
        for value in 0..8 {
            arena.alloc(value);
        }
        assert_eq!(arena.capacity(), capacity);
    }

    #[test]
    fn clear_releases_slots() {
        let mut arena: Arena<String> = Arena::new();
        let handles: Vec<Handle> = (0..100).map(|v| arena.alloc(v.to_string())).collect();
        arena.take(handles[7]);
        arena.clear();
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.alloc(String::from("a")).to_index(), 0);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        prop_assert!(model.iter().all(|&(h, _)| h != handle));
                        model.push((handle, value));
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        *arena.get_mut(model[index].0) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        let (handle, expected) = model.swap_remove(index);
                        prop_assert_eq!(arena.take(handle), expected);
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            8 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
