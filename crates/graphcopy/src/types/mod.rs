//! Payload types stored in heap entries.

pub mod array;
pub mod foreign;
pub mod map;
pub mod record;
pub mod sequence;

pub use array::Array;
pub use foreign::{Foreign, ForeignShape};
pub use map::{Dict, OrderedDict, SortedDict};
pub use record::Record;
pub use sequence::{List, Queue, Set};
