//! Append-only, ID-indexed storage for components and endpoints.
//!
//! Entries are never removed or reordered, so an ID handed out once stays
//! valid for the whole life of the hierarchy. Detaching a sub-hierarchy only
//! flags its entries; it never recycles their IDs.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// ID newtypes that can key an [`Arena`].
pub trait ArenaId: Copy {
    /// Wraps a raw slot index.
    fn from_raw(index: u32) -> Self;

    /// The raw slot index.
    fn as_raw(self) -> u32;
}

/// Dense storage where the `n`th allocation gets ID `n`.
///
/// Indexing with an ID from another arena panics.
#[derive(Debug, Clone)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    /// An empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Stores `item` and returns the ID it lives under.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Number of entries ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` before the first allocation.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }
}
