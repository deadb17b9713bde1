//! Fixed-length, element-typed arrays.

use crate::{
    error::ArrayError,
    value::{Value, ValueType},
};

/// A fixed-size indexable block with a declared element type.
///
/// The length is set at construction and never changes; every element always
/// satisfies `element_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    element_type: ValueType,
    items: Box<[Value]>,
}

impl Array {
    /// Creates an array of `len` elements, each holding the element type's default.
    #[must_use]
    pub fn new(element_type: ValueType, len: usize) -> Self {
        Self {
            element_type,
            items: vec![element_type.default_value(); len].into_boxed_slice(),
        }
    }

    /// Creates an array holding `items`, checking each against `element_type`.
    pub fn from_items(element_type: ValueType, items: Vec<Value>) -> Result<Self, ArrayError> {
        if let Some(bad) = items.iter().find(|item| !element_type.accepts(item)) {
            return Err(ArrayError::TypeMismatch {
                expected: element_type,
                found: bad.kind_name(),
            });
        }
        Ok(Self {
            element_type,
            items: items.into_boxed_slice(),
        })
    }

    #[must_use]
    pub fn element_type(&self) -> ValueType {
        self.element_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Stores `value` at `index`, returning the previous element.
    pub fn set(&mut self, index: usize, value: Value) -> Result<Value, ArrayError> {
        let len = self.items.len();
        if !self.element_type.accepts(&value) {
            return Err(ArrayError::TypeMismatch {
                expected: self.element_type,
                found: value.kind_name(),
            });
        }
        let slot = self.items.get_mut(index).ok_or(ArrayError::OutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Name used in diagnostics, e.g. `int[]`.
    #[must_use]
    pub fn type_name(&self) -> String {
        format!("{}[]", self.element_type)
    }
}
