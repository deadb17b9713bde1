//! Creation of empty containers of the same concrete variant as a source.

use crate::{
    error::{CopyError, CopyResult},
    heap::HeapData,
    types::{Dict, List, OrderedDict, Queue, Set, SortedDict},
};

/// The container variants the factory knows how to recreate.
///
/// Adding support for another container means adding a variant here and a
/// match arm in [`ContainerVariant::of`] and [`ContainerVariant::empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum ContainerVariant {
    List,
    Set,
    Queue,
    Dict,
    OrderedDict,
    SortedDict,
}

impl ContainerVariant {
    /// The variant of `data`, or `None` if `data` is not a supported container.
    #[must_use]
    pub fn of(data: &HeapData) -> Option<Self> {
        match data {
            HeapData::List(_) => Some(Self::List),
            HeapData::Set(_) => Some(Self::Set),
            HeapData::Queue(_) => Some(Self::Queue),
            HeapData::Dict(_) => Some(Self::Dict),
            HeapData::OrderedDict(_) => Some(Self::OrderedDict),
            HeapData::SortedDict(_) => Some(Self::SortedDict),
            HeapData::Array(_) | HeapData::Foreign(_) | HeapData::Record(_) => None,
        }
    }

    #[must_use]
    pub fn is_associative(self) -> bool {
        matches!(self, Self::Dict | Self::OrderedDict | Self::SortedDict)
    }

    /// A fresh, empty container of this variant.
    #[must_use]
    pub fn empty(self) -> HeapData {
        match self {
            Self::List => HeapData::List(List::default()),
            Self::Set => HeapData::Set(Set::new()),
            Self::Queue => HeapData::Queue(Queue::new()),
            Self::Dict => HeapData::Dict(Dict::new()),
            Self::OrderedDict => HeapData::OrderedDict(OrderedDict::new()),
            Self::SortedDict => HeapData::SortedDict(SortedDict::new()),
        }
    }
}

/// The variant of `source`, failing with `UnsupportedVariant` for anything the
/// factory cannot recreate. `type_name` is the runtime name put in the error.
pub fn variant_of(source: &HeapData, type_name: &str) -> CopyResult<ContainerVariant> {
    ContainerVariant::of(source).ok_or_else(|| CopyError::unsupported(type_name))
}

/// Creates an empty container of the same variant as `source`.
pub fn create(source: &HeapData, type_name: &str) -> CopyResult<HeapData> {
    variant_of(source, type_name).map(ContainerVariant::empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{types::Foreign, value::Value};

    #[test]
    fn recreates_same_variant_empty() {
        let source = HeapData::OrderedDict([(Value::Int(1), Value::Int(2))].into_iter().collect());
        let created = create(&source, "OrderedDict").unwrap();
        match created {
            HeapData::OrderedDict(map) => assert!(map.is_empty()),
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn foreign_is_unsupported() {
        let source = HeapData::Foreign(Foreign::sequence("RingBuffer", vec![]));
        assert_eq!(
            create(&source, "RingBuffer").unwrap_err(),
            CopyError::UnsupportedVariant {
                type_name: "RingBuffer".to_owned()
            }
        );
    }

    #[test]
    fn variant_names_and_shapes() {
        assert_eq!(ContainerVariant::SortedDict.to_string(), "SortedDict");
        assert!(ContainerVariant::Dict.is_associative());
        assert!(!ContainerVariant::Queue.is_associative());
    }
}
