//! Error types for heap access, class registration and deep copying.
//!
//! Every failure is a programming or configuration error (an unsupported type
//! was reachable from the graph, a class cannot be constructed); nothing here
//! is retried. A [`CopyError`] aborts the whole copy.

use std::fmt;

use crate::{resource::ResourceError, value::ValueType};

/// Result type alias for operations that can fail while copying.
pub type CopyResult<T> = Result<T, CopyError>;

/// Failure of a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyError {
    /// A container whose concrete variant the instance factory cannot recreate.
    UnsupportedVariant { type_name: String },
    /// A record could not be constructed, or one of its fields could not be
    /// read or written.
    ConstructionFailure { type_name: String, cause: ConstructionCause },
    /// A configured resource limit was hit.
    Resource(ResourceError),
}

impl CopyError {
    pub(crate) fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedVariant {
            type_name: type_name.into(),
        }
    }

    pub(crate) fn construction(type_name: impl Into<String>, cause: impl Into<ConstructionCause>) -> Self {
        Self::ConstructionFailure {
            type_name: type_name.into(),
            cause: cause.into(),
        }
    }

    /// Name of the runtime type implicated in the failure, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::UnsupportedVariant { type_name } | Self::ConstructionFailure { type_name, .. } => Some(type_name),
            Self::Resource(_) => None,
        }
    }
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVariant { type_name } => write!(f, "unsupported container type: {type_name}"),
            Self::ConstructionFailure { type_name, cause } => {
                write!(f, "failed to deep copy an instance of {type_name}: {cause}")
            }
            Self::Resource(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CopyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConstructionFailure { cause, .. } => Some(cause),
            Self::Resource(err) => Some(err),
            Self::UnsupportedVariant { .. } => None,
        }
    }
}

impl From<ResourceError> for CopyError {
    fn from(err: ResourceError) -> Self {
        Self::Resource(err)
    }
}

/// Underlying reason a record could not be copied.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructionCause {
    /// The class was registered without a constructor.
    NoConstructor,
    /// The class's factory function reported an error.
    Constructor(String),
    /// The factory returned the wrong number of slot values.
    ConstructorArity { expected: usize, got: usize },
    /// Reading or writing a field failed.
    Field(FieldError),
    /// Writing an array element failed.
    Array(ArrayError),
    /// Inserting a key into a sorted map failed.
    Key(KeyError),
}

impl fmt::Display for ConstructionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoConstructor => f.write_str("no no-argument constructor"),
            Self::Constructor(msg) => write!(f, "constructor failed: {msg}"),
            Self::ConstructorArity { expected, got } => {
                write!(f, "constructor produced {got} slots, expected {expected}")
            }
            Self::Field(err) => write!(f, "{err}"),
            Self::Array(err) => write!(f, "{err}"),
            Self::Key(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConstructionCause {}

impl From<FieldError> for ConstructionCause {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

impl From<ArrayError> for ConstructionCause {
    fn from(err: ArrayError) -> Self {
        Self::Array(err)
    }
}

impl From<KeyError> for ConstructionCause {
    fn from(err: KeyError) -> Self {
        Self::Key(err)
    }
}

/// Failure to read or write a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No field with this name exists on the class or its ancestors.
    Unknown { class: String, field: String },
    /// The field is private and was accessed through the public API.
    Private { class: String, field: String },
    /// The value does not fit the field's declared type.
    TypeMismatch {
        field: String,
        expected: ValueType,
        found: &'static str,
    },
    /// Instance access to a static field.
    Static { field: String },
    /// Static access to an instance field.
    NotStatic { field: String },
    /// The record has no slot for this field.
    MissingSlot { field: String, slot: usize },
    /// The target value is not a record.
    NotARecord { found: &'static str },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { class, field } => write!(f, "'{class}' has no field '{field}'"),
            Self::Private { class, field } => write!(f, "field '{class}.{field}' is private"),
            Self::TypeMismatch { field, expected, found } => {
                write!(f, "field '{field}' is declared {expected}, cannot hold {found}")
            }
            Self::Static { field } => write!(f, "field '{field}' is static"),
            Self::NotStatic { field } => write!(f, "field '{field}' is not static"),
            Self::MissingSlot { field, slot } => write!(f, "field '{field}' has no slot {slot}"),
            Self::NotARecord { found } => write!(f, "expected a record, found {found}"),
        }
    }
}

impl std::error::Error for FieldError {}

/// Failure to write an array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    OutOfBounds { index: usize, len: usize },
    TypeMismatch { expected: ValueType, found: &'static str },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { index, len } => write!(f, "index {index} out of bounds for length {len}"),
            Self::TypeMismatch { expected, found } => write!(f, "cannot store {found} in {expected} array"),
        }
    }
}

impl std::error::Error for ArrayError {}

/// Failure to insert a key into a sorted map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Heap objects only compare by handle, which a copy does not preserve.
    Unordered { found: &'static str },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unordered { found } => write!(f, "sorted map keys must be scalars, found {found}"),
        }
    }
}

impl std::error::Error for KeyError {}

/// Failure to register a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassError {
    /// A class with this name is already registered.
    Duplicate(String),
    /// The parent class handle does not belong to this registry.
    UnknownParent(String),
    /// A static field's initial value does not fit its declared type.
    StaticTypeMismatch { field: String, expected: ValueType },
}

impl fmt::Display for ClassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "class '{name}' is already registered"),
            Self::UnknownParent(name) => write!(f, "class '{name}' extends an unknown class"),
            Self::StaticTypeMismatch { field, expected } => {
                write!(f, "static field '{field}' is declared {expected}, initial value does not fit")
            }
        }
    }
}

impl std::error::Error for ClassError {}
