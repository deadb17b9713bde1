//! Associative containers: hash, insertion-ordered and key-sorted maps.
//!
//! All three share the same small surface (`insert`, `get`, `remove`, `iter`)
//! so the copy engine can treat them uniformly through [`HeapData`](crate::HeapData).
//! `SortedDict::insert` alone can fail, on a key with no stable order.

use std::collections::BTreeMap;

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::{error::KeyError, value::Value};

/// An unordered hash map.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: AHashMap<Value, Value>,
}

impl Dict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair, returning the value previously stored under `key`.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }
}

/// A map that iterates in insertion order.
///
/// Re-inserting an existing key replaces its value without moving it.
#[derive(Debug, Clone, Default)]
pub struct OrderedDict {
    entries: IndexMap<Value, Value, ahash::RandomState>,
}

impl OrderedDict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys()
    }
}

/// A map that iterates in ascending key order.
///
/// Keys are ordered by [`Value`]'s total order: by kind first, then by content.
/// Only scalar keys (and `null`) are accepted. A heap value would sort by its
/// handle, and its copy gets a different handle, so a copied map could come
/// out in a different order than its source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedDict {
    entries: BTreeMap<Value, Value>,
}

impl SortedDict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `pairs`, failing on the first heap-valued key.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Result<Self, KeyError> {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert(key, value)?;
        }
        Ok(map)
    }

    /// Inserts a pair, returning the value previously stored under `key`.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<Option<Value>, KeyError> {
        if let Value::Ref(_) = key {
            return Err(KeyError::Unordered {
                found: key.kind_name(),
            });
        }
        Ok(self.entries.insert(key, value))
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys()
    }
}

macro_rules! impl_from_pairs {
    ($($map:ty),*) => {
        $(
            impl FromIterator<(Value, Value)> for $map {
                fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
                    let mut map = Self::new();
                    for (key, value) in iter {
                        map.insert(key, value);
                    }
                    map
                }
            }
        )*
    };
}

impl_from_pairs!(Dict, OrderedDict);
