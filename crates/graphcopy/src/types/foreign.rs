//! Containers implemented outside the closed set of recreatable variants.

use crate::value::Value;

/// The contents of a foreign container, as visible to traversal.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignShape {
    /// Behaves like a sequence, set or queue.
    Sequence(Vec<Value>),
    /// Behaves like a key-to-value map.
    Mapping(Vec<(Value, Value)>),
}

/// A host-defined container type.
///
/// Foreign containers can be stored, snapshotted and classified like any other
/// container, but the instance factory has no constructor for them, so a copy
/// that reaches one fails naming `type_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Foreign {
    type_name: String,
    shape: ForeignShape,
}

impl Foreign {
    #[must_use]
    pub fn sequence(type_name: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            shape: ForeignShape::Sequence(items),
        }
    }

    #[must_use]
    pub fn mapping(type_name: impl Into<String>, entries: Vec<(Value, Value)>) -> Self {
        Self {
            type_name: type_name.into(),
            shape: ForeignShape::Mapping(entries),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn shape(&self) -> &ForeignShape {
        &self.shape
    }

    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self.shape, ForeignShape::Mapping(_))
    }
}
