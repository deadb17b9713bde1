//! Coarse classification of values, resolved once per value by the copy engine.

use crate::{
    heap::{Heap, HeapData},
    resource::ResourceTracker,
    types::ForeignShape,
    value::Value,
};

/// How a value is handled by a deep copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TypeCategory {
    /// The absent value; copied as itself.
    Null,
    /// Inline, immutable values shared between source and copy.
    ImmutableScalar,
    /// Fixed-length typed array.
    Array,
    /// List, set, queue or a sequence-shaped foreign container.
    SequenceContainer,
    /// One of the map types or a map-shaped foreign container.
    AssociativeContainer,
    /// Instance of a registered class.
    CompositeRecord,
}

impl TypeCategory {
    /// Whether values of this category have identity and go through the memo.
    #[must_use]
    pub fn is_tracked(self) -> bool {
        !matches!(self, Self::Null | Self::ImmutableScalar)
    }
}

impl HeapData {
    #[must_use]
    pub fn category(&self) -> TypeCategory {
        match self {
            Self::Array(_) => TypeCategory::Array,
            Self::List(_) | Self::Set(_) | Self::Queue(_) => TypeCategory::SequenceContainer,
            Self::Dict(_) | Self::OrderedDict(_) | Self::SortedDict(_) => TypeCategory::AssociativeContainer,
            Self::Foreign(foreign) => match foreign.shape() {
                ForeignShape::Sequence(_) => TypeCategory::SequenceContainer,
                ForeignShape::Mapping(_) => TypeCategory::AssociativeContainer,
            },
            Self::Record(_) => TypeCategory::CompositeRecord,
        }
    }
}

/// Classifies `value`, looking through references into `heap`.
///
/// # Panics
/// Panics if `value` references an id that does not belong to `heap`.
#[must_use]
pub fn classify<T: ResourceTracker>(value: &Value, heap: &Heap<T>) -> TypeCategory {
    match value {
        Value::None => TypeCategory::Null,
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Char(_) | Value::Str(_) => {
            TypeCategory::ImmutableScalar
        }
        Value::Ref(id) => heap.get(*id).category(),
    }
}
