//! Copy tracing.
//!
//! The copy engine carries its tracer as a type parameter, so with
//! [`NoopTracer`] every hook is inlined to nothing, the same way
//! [`NoLimitTracker`](crate::NoLimitTracker) removes limit checks.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No output (default) |
//! | [`StderrTracer`] | Human-readable copy log on stderr |
//! | [`RecordingTracer`] | Collects [`TraceEvent`]s for inspection in tests |
//!
//! ```
//! use graphcopy::{Heap, RecordingTracer, TraceEvent, Value, deep_copy_traced};
//!
//! let mut heap = Heap::default();
//! let list = heap.new_list([Value::Int(1)]).unwrap();
//! let mut tracer = RecordingTracer::new();
//! deep_copy_traced(&mut heap, &list, &mut tracer).unwrap();
//! assert!(matches!(tracer.events()[0], TraceEvent::Enter { depth: 0, .. }));
//! ```

use crate::{classify::TypeCategory, error::CopyError, factory::ContainerVariant, heap::HeapId, value::Value};

/// Event captured by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// The engine started copying a heap object not seen before.
    Enter {
        source: HeapId,
        category: TypeCategory,
        depth: usize,
    },
    /// A reference resolved to a copy already made (alias or cycle).
    Alias { source: HeapId, copy: HeapId },
    /// A copy was allocated and recorded, before its contents were copied.
    Register {
        source: HeapId,
        copy: HeapId,
        category: TypeCategory,
    },
    /// Two source keys collapsed onto one key in the copied map.
    KeyCollision { variant: ContainerVariant, key: String },
    /// The copy failed and was rolled back.
    Abort { error: String },
}

/// Hooks invoked by the copy engine.
///
/// Every method has an empty default, so implementations override only what
/// they need.
pub trait CopyTracer: std::fmt::Debug {
    /// Called before copying a heap object that has no copy yet.
    #[inline(always)]
    fn on_enter(&mut self, _source: HeapId, _category: TypeCategory, _depth: usize) {}

    /// Called when `source` already has a copy.
    #[inline(always)]
    fn on_alias(&mut self, _source: HeapId, _copy: HeapId) {}

    /// Called when the copy of `source` has been allocated and registered.
    #[inline(always)]
    fn on_register(&mut self, _source: HeapId, _copy: HeapId, _category: TypeCategory) {}

    /// Called when inserting a copied key replaced an earlier copied key.
    #[inline(always)]
    fn on_key_collision(&mut self, _variant: ContainerVariant, _key: &Value) {}

    /// Called once when the copy fails, before the heap is rolled back.
    #[inline(always)]
    fn on_abort(&mut self, _error: &CopyError) {}
}

impl<Tr: CopyTracer + ?Sized> CopyTracer for &mut Tr {
    fn on_enter(&mut self, source: HeapId, category: TypeCategory, depth: usize) {
        (**self).on_enter(source, category, depth);
    }

    fn on_alias(&mut self, source: HeapId, copy: HeapId) {
        (**self).on_alias(source, copy);
    }

    fn on_register(&mut self, source: HeapId, copy: HeapId, category: TypeCategory) {
        (**self).on_register(source, copy, category);
    }

    fn on_key_collision(&mut self, variant: ContainerVariant, key: &Value) {
        (**self).on_key_collision(variant, key);
    }

    fn on_abort(&mut self, error: &CopyError) {
        (**self).on_abort(error);
    }
}

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl CopyTracer for NoopTracer {}

/// Tracer that prints one line per event to stderr.
///
/// ```text
/// --> #0 composite_record depth=0
///     #0 => #3
///   --> #1 sequence_container depth=1
///       #1 => #4
///   === #2 -> #5
/// ```
#[derive(Debug, Default)]
pub struct StderrTracer {
    /// Maximum number of lines to print. None = unlimited.
    limit: Option<usize>,
    count: usize,
    depth: usize,
}

impl StderrTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracer that goes quiet after `limit` lines.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if self.limit.is_some_and(|limit| self.count >= limit) {
            return;
        }
        let indent = self.depth * 2;
        eprintln!("{:indent$}{line}", "");
        self.count += 1;
        if let Some(limit) = self.limit
            && self.count == limit
        {
            eprintln!("--- trace limit reached ({limit} lines) ---");
        }
    }
}

impl CopyTracer for StderrTracer {
    fn on_enter(&mut self, source: HeapId, category: TypeCategory, depth: usize) {
        self.depth = depth;
        self.emit(format_args!("--> {source} {category} depth={depth}"));
    }

    fn on_alias(&mut self, source: HeapId, copy: HeapId) {
        self.emit(format_args!("=== {source} -> {copy}"));
    }

    fn on_register(&mut self, source: HeapId, copy: HeapId, _category: TypeCategory) {
        self.emit(format_args!("    {source} => {copy}"));
    }

    fn on_key_collision(&mut self, variant: ContainerVariant, key: &Value) {
        self.emit(format_args!("!!! {variant} key collision on {key}"));
    }

    fn on_abort(&mut self, error: &CopyError) {
        self.depth = 0;
        self.emit(format_args!("xxx copy aborted: {error}"));
    }
}

/// Tracer that records every event.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
    limit: Option<usize>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracer that stops recording after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    fn record(&mut self, event: TraceEvent) {
        if self.limit.is_some_and(|limit| self.events.len() >= limit) {
            return;
        }
        self.events.push(event);
    }
}

impl CopyTracer for RecordingTracer {
    fn on_enter(&mut self, source: HeapId, category: TypeCategory, depth: usize) {
        self.record(TraceEvent::Enter {
            source,
            category,
            depth,
        });
    }

    fn on_alias(&mut self, source: HeapId, copy: HeapId) {
        self.record(TraceEvent::Alias { source, copy });
    }

    fn on_register(&mut self, source: HeapId, copy: HeapId, category: TypeCategory) {
        self.record(TraceEvent::Register { source, copy, category });
    }

    fn on_key_collision(&mut self, variant: ContainerVariant, key: &Value) {
        self.record(TraceEvent::KeyCollision {
            variant,
            key: key.to_string(),
        });
    }

    fn on_abort(&mut self, error: &CopyError) {
        self.record(TraceEvent::Abort {
            error: error.to_string(),
        });
    }
}
