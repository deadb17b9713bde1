//! Sequence-shaped containers: ordered lists, unique sets and FIFO queues.

use std::collections::VecDeque;

use indexmap::IndexSet;

use crate::value::Value;

/// An ordered, resizable sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct List {
    items: Vec<Value>,
}

impl List {
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn set(&mut self, index: usize, value: Value) -> Option<Value> {
        self.items.get_mut(index).map(|slot| std::mem::replace(slot, value))
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }
}

/// A set of unique elements.
///
/// Heap values are members by identity, scalars by content. No iteration order
/// is promised; the backing store happens to keep insertion order, which keeps
/// snapshots of a set and its copy comparable.
#[derive(Debug, Clone, Default)]
pub struct Set {
    items: IndexSet<Value, ahash::RandomState>,
}

impl Set {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`, returning `false` if an equal element was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        self.items.insert(value)
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        self.items.shift_remove(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, Value> {
        self.items.iter()
    }
}

impl FromIterator<Value> for Set {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// A first-in, first-out queue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    items: VecDeque<Value>,
}

impl Queue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` at the tail.
    pub fn push(&mut self, value: Value) {
        self.items.push_back(value);
    }

    /// Removes the head element.
    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop_front()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&Value> {
        self.items.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Value> {
        self.items.iter()
    }
}

impl FromIterator<Value> for Queue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
