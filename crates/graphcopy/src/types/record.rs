//! Instances of registered classes.

use crate::{
    class::{ClassId, FieldAccessor, FieldDescriptor},
    error::FieldError,
    value::Value,
};

/// A composite record: one slot per instance field of its class layout.
///
/// Slots are addressed through [`FieldDescriptor`] accessors, which ignore the
/// field's visibility. Name-based, visibility-checked access lives on the heap
/// (`Heap::field` / `Heap::set_field`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    class_id: ClassId,
    slots: Vec<Value>,
}

impl Record {
    #[must_use]
    pub fn new(class_id: ClassId, slots: Vec<Value>) -> Self {
        Self { class_id, slots }
    }

    #[must_use]
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    #[must_use]
    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    /// Reads the instance field described by `field`.
    pub fn read(&self, field: &FieldDescriptor) -> Result<&Value, FieldError> {
        let slot = instance_slot(field)?;
        self.slots.get(slot).ok_or_else(|| FieldError::MissingSlot {
            field: field.name().to_owned(),
            slot,
        })
    }

    /// Writes the instance field described by `field`, returning the old value.
    ///
    /// The value is checked against the field's declared type.
    pub fn write(&mut self, field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
        let slot = instance_slot(field)?;
        if !field.value_type().accepts(&value) {
            return Err(FieldError::TypeMismatch {
                field: field.name().to_owned(),
                expected: field.value_type(),
                found: value.kind_name(),
            });
        }
        let target = self.slots.get_mut(slot).ok_or_else(|| FieldError::MissingSlot {
            field: field.name().to_owned(),
            slot,
        })?;
        Ok(std::mem::replace(target, value))
    }
}

fn instance_slot(field: &FieldDescriptor) -> Result<usize, FieldError> {
    match field.accessor() {
        FieldAccessor::Slot(slot) => Ok(slot),
        FieldAccessor::Static { .. } => Err(FieldError::Static {
            field: field.name().to_owned(),
        }),
    }
}
