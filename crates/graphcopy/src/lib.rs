#![doc = include_str!("../../../README.md")]

mod class;
mod classify;
mod copy;
mod error;
mod factory;
mod heap;
mod memo;
mod object;
mod resource;
mod tracer;
mod types;
mod value;

pub use crate::{
    class::{
        ClassBuilder, ClassDef, ClassId, ClassRegistry, Constructor, FactoryFn, FieldAccessor, FieldDescriptor,
        Visibility,
    },
    classify::{TypeCategory, classify},
    copy::{CopyStats, DeepCopier, deep_copy, deep_copy_traced},
    error::{ArrayError, ClassError, ConstructionCause, CopyError, CopyResult, FieldError, KeyError},
    factory::{ContainerVariant, create, variant_of},
    heap::{Heap, HeapData, HeapId, HeapStats},
    memo::Memo,
    object::Object,
    resource::{LimitedTracker, NoLimitTracker, ResourceError, ResourceLimits, ResourceTracker},
    tracer::{CopyTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
    types::{Array, Dict, Foreign, ForeignShape, List, OrderedDict, Queue, Record, Set, SortedDict},
    value::{Value, ValueType},
};
