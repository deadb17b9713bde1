//! The deep copy engine.
//!
//! A copy walks the source graph depth first. Every heap object is copied at
//! most once per [`DeepCopier`]: its empty copy is allocated and recorded in the
//! [`Memo`] before any child is visited, so aliases resolve to one copy and
//! cycles close onto the copy under construction.
//!
//! A failed copy rolls the heap back to where it was when [`DeepCopier::copy`]
//! was called. Nothing allocated by the failed call stays reachable.

use crate::{
    class::{ClassId, FieldDescriptor},
    classify::TypeCategory,
    error::{CopyError, CopyResult},
    factory::{self, ContainerVariant},
    heap::{Heap, HeapData, HeapId},
    memo::Memo,
    resource::ResourceTracker,
    tracer::{CopyTracer, NoopTracer},
    types::{Array, Record},
    value::{Value, ValueType},
};

/// Deep-copies the graph reachable from `root`.
///
/// Scalars are returned as they are. On error the heap is left exactly as it
/// was before the call.
///
/// ```
/// use graphcopy::{Heap, Value, deep_copy};
///
/// let mut heap = Heap::default();
/// let inner = heap.new_list([Value::Int(1)]).unwrap();
/// let outer = heap.new_list([inner.clone(), inner]).unwrap();
///
/// let copy = deep_copy(&mut heap, &outer).unwrap();
/// let items = heap.as_list(&copy).unwrap();
/// assert_eq!(items.get(0), items.get(1));
/// assert_ne!(items.get(0), heap.as_list(&outer).unwrap().get(0));
/// ```
pub fn deep_copy<T: ResourceTracker>(heap: &mut Heap<T>, root: &Value) -> CopyResult<Value> {
    DeepCopier::new(heap).copy(root)
}

/// Like [`deep_copy`], reporting progress to `tracer`.
pub fn deep_copy_traced<T: ResourceTracker, Tr: CopyTracer>(
    heap: &mut Heap<T>,
    root: &Value,
    tracer: Tr,
) -> CopyResult<Value> {
    DeepCopier::with_tracer(heap, tracer).copy(root)
}

impl<T: ResourceTracker> Heap<T> {
    /// Deep-copies the graph reachable from `root`. See [`deep_copy`].
    pub fn deep_copy(&mut self, root: &Value) -> CopyResult<Value> {
        deep_copy(self, root)
    }
}

/// Counters collected by a [`DeepCopier`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Heap objects allocated as copies.
    pub objects_copied: usize,
    /// References resolved through the memo (aliases and cycles).
    pub alias_hits: usize,
    /// Scalars passed through unchanged.
    pub scalars: usize,
    /// Deepest nesting of heap objects reached, the root being depth 0.
    pub max_depth: usize,
}

/// What the engine needs from a source object, taken out of the heap before
/// the heap is mutated.
enum CopySource {
    Array {
        element_type: ValueType,
        items: Vec<Value>,
    },
    /// `empty` is the factory-made container the copy starts from.
    Sequence {
        variant: ContainerVariant,
        empty: HeapData,
        items: Vec<Value>,
    },
    Mapping {
        variant: ContainerVariant,
        empty: HeapData,
        entries: Vec<(Value, Value)>,
    },
    Record(ClassId),
}

/// Deep copier that keeps one memo across several roots.
///
/// Roots that share sub-objects keep sharing them in their copies:
///
/// ```
/// use graphcopy::{DeepCopier, Heap, Value};
///
/// let mut heap = Heap::default();
/// let shared = heap.new_list([]).unwrap();
/// let a = heap.new_list([shared.clone()]).unwrap();
/// let b = heap.new_list([shared]).unwrap();
///
/// let mut copier = DeepCopier::new(&mut heap);
/// let a2 = copier.copy(&a).unwrap();
/// let b2 = copier.copy(&b).unwrap();
/// let stats = copier.finish();
/// assert_eq!(stats.objects_copied, 3);
/// assert_eq!(heap.as_list(&a2).unwrap().get(0), heap.as_list(&b2).unwrap().get(0));
/// ```
#[derive(Debug)]
pub struct DeepCopier<'h, T: ResourceTracker, Tr: CopyTracer = NoopTracer> {
    heap: &'h mut Heap<T>,
    memo: Memo,
    tracer: Tr,
    stats: CopyStats,
    depth: usize,
}

impl<'h, T: ResourceTracker> DeepCopier<'h, T> {
    pub fn new(heap: &'h mut Heap<T>) -> Self {
        Self::with_tracer(heap, NoopTracer)
    }
}

impl<'h, T: ResourceTracker, Tr: CopyTracer> DeepCopier<'h, T, Tr> {
    pub fn with_tracer(heap: &'h mut Heap<T>, tracer: Tr) -> Self {
        Self {
            heap,
            memo: Memo::new(),
            tracer,
            stats: CopyStats::default(),
            depth: 0,
        }
    }

    /// Deep-copies `root`, reusing copies made by earlier calls on this copier.
    ///
    /// On error, everything this call allocated is discarded and the memo and
    /// counters are restored; copies returned by earlier calls stay valid.
    pub fn copy(&mut self, root: &Value) -> CopyResult<Value> {
        let mark = self.heap.mark();
        let stats = self.stats;
        match self.copy_value(root) {
            Ok(copy) => Ok(copy),
            Err(err) => {
                self.tracer.on_abort(&err);
                self.heap.rollback(mark);
                self.memo.forget_copies_from(mark.first_discarded());
                self.stats = stats;
                self.depth = 0;
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn heap(&self) -> &Heap<T> {
        self.heap
    }

    #[must_use]
    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    #[must_use]
    pub fn stats(&self) -> CopyStats {
        self.stats
    }

    #[must_use]
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    /// Ends the copy session, returning its counters.
    pub fn finish(self) -> CopyStats {
        self.stats
    }

    fn copy_value(&mut self, value: &Value) -> CopyResult<Value> {
        let source = match value {
            Value::Ref(id) => *id,
            Value::None => return Ok(Value::None),
            scalar => {
                self.stats.scalars += 1;
                return Ok(scalar.clone());
            }
        };
        if let Some(copy) = self.memo.lookup(source) {
            self.stats.alias_hits += 1;
            self.tracer.on_alias(source, copy);
            return Ok(Value::Ref(copy));
        }

        self.heap.tracker().check_recursion_depth(self.depth)?;
        let category = self.heap.get(source).category();
        self.tracer.on_enter(source, category, self.depth);
        self.stats.max_depth = self.stats.max_depth.max(self.depth);

        self.depth += 1;
        let result = self.copy_object(source, category);
        self.depth -= 1;
        result.map(Value::Ref)
    }

    fn copy_object(&mut self, source: HeapId, category: TypeCategory) -> CopyResult<HeapId> {
        match self.extract(source)? {
            CopySource::Array { element_type, items } => {
                let empty = HeapData::Array(Array::new(element_type, items.len()));
                let copy = self.allocate_registered(source, category, empty)?;
                for (index, item) in items.iter().enumerate() {
                    let element = self.copy_value(item)?;
                    let HeapData::Array(array) = self.heap.get_mut(copy) else {
                        unreachable!("array copy replaced with non-array data");
                    };
                    array
                        .set(index, element)
                        .map_err(|err| CopyError::construction(array.type_name(), err))?;
                }
                Ok(copy)
            }
            CopySource::Sequence { variant, empty, items } => {
                let copy = self.allocate_registered(source, category, empty)?;
                for item in &items {
                    let element = self.copy_value(item)?;
                    if !self.heap.get_mut(copy).push_item(element.clone()) {
                        self.tracer.on_key_collision(variant, &element);
                    }
                }
                Ok(copy)
            }
            CopySource::Mapping { variant, empty, entries } => {
                let copy = self.allocate_registered(source, category, empty)?;
                for (key, value) in &entries {
                    let key = self.copy_value(key)?;
                    let value = self.copy_value(value)?;
                    let inserted = self
                        .heap
                        .get_mut(copy)
                        .insert_entry(key.clone(), value)
                        .map_err(|err| CopyError::construction(variant.to_string(), err))?;
                    if !inserted {
                        self.tracer.on_key_collision(variant, &key);
                    }
                }
                Ok(copy)
            }
            CopySource::Record(class) => self.copy_record(source, class, category),
        }
    }

    /// Runs the class constructor, then copies every instance field, inherited
    /// and private ones included. Static fields stay on the class.
    fn copy_record(&mut self, source: HeapId, class: ClassId, category: TypeCategory) -> CopyResult<HeapId> {
        let def = self.heap.class(class);
        let type_name = def.name().to_owned();
        let slots = def
            .construct()
            .map_err(|cause| CopyError::construction(&type_name, cause))?;
        let copy = self.allocate_registered(source, category, HeapData::Record(Record::new(class, slots)))?;

        let fields: Vec<FieldDescriptor> = self
            .heap
            .fields_of(class)
            .iter()
            .filter(|field| !field.is_static())
            .cloned()
            .collect();
        for field in &fields {
            let value = self
                .heap
                .read_field(source, field)
                .map_err(|err| CopyError::construction(&type_name, err))?
                .clone();
            let value = self.copy_value(&value)?;
            self.heap
                .write_field(copy, field, value)
                .map_err(|err| CopyError::construction(&type_name, err))?;
        }
        Ok(copy)
    }

    fn extract(&self, source: HeapId) -> CopyResult<CopySource> {
        let data = self.heap.get(source);
        let extracted = match data {
            HeapData::Array(array) => CopySource::Array {
                element_type: array.element_type(),
                items: array.as_slice().to_vec(),
            },
            HeapData::Record(record) => CopySource::Record(record.class_id()),
            _ => {
                let empty = factory::create(data, &self.heap.type_name(source))?;
                let Some(variant) = ContainerVariant::of(&empty) else {
                    unreachable!("factory created an unsupported container");
                };
                if variant.is_associative() {
                    CopySource::Mapping {
                        variant,
                        empty,
                        entries: data.entries().unwrap_or_default(),
                    }
                } else {
                    CopySource::Sequence {
                        variant,
                        empty,
                        items: data.items().unwrap_or_default(),
                    }
                }
            }
        };
        Ok(extracted)
    }

    /// Allocates the empty copy of `source` and records it in the memo before
    /// any of its contents are copied.
    fn allocate_registered(&mut self, source: HeapId, category: TypeCategory, data: HeapData) -> CopyResult<HeapId> {
        let copy = self.heap.allocate(data)?;
        let fresh = self.memo.register(source, copy);
        debug_assert!(fresh, "{source} was copied twice");
        self.stats.objects_copied += 1;
        self.tracer.on_register(source, copy, category);
        Ok(copy)
    }
}
