use ahash::AHashMap;

use crate::heap::HeapId;

/// Identity map from source objects to their copies.
///
/// An entry is registered as soon as the copy is allocated, before any of its
/// children are copied, so a reference cycle finds the (still empty) copy
/// instead of recursing forever. Entries are never overwritten.
#[derive(Debug, Default, Clone)]
pub struct Memo {
    copies: AHashMap<HeapId, HeapId>,
}

impl Memo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the copy already made for `source`, if any.
    #[must_use]
    pub fn lookup(&self, source: HeapId) -> Option<HeapId> {
        self.copies.get(&source).copied()
    }

    /// Records `copy` as the copy of `source`.
    ///
    /// Returns `false` and leaves the existing entry untouched if `source` was
    /// already registered.
    pub fn register(&mut self, source: HeapId, copy: HeapId) -> bool {
        match self.copies.entry(source) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(copy);
                true
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    /// Drops every entry whose copy was allocated at or after `first_discarded`.
    ///
    /// Used after a heap rollback so the memo never points at freed slots.
    pub(crate) fn forget_copies_from(&mut self, first_discarded: usize) {
        self.copies.retain(|_, copy| copy.index() < first_discarded);
    }
}
