use std::{collections::BTreeMap, fmt};

use crate::{
    class::{ClassBuilder, ClassDef, ClassId, ClassRegistry, FieldDescriptor, Visibility},
    error::{ClassError, CopyError, CopyResult, FieldError, KeyError},
    resource::{NoLimitTracker, ResourceError, ResourceTracker},
    types::{Array, Dict, Foreign, ForeignShape, List, OrderedDict, Queue, Record, Set, SortedDict},
    value::Value,
};

/// Unique identifier for values stored inside the heap arena.
///
/// Two values are the same object exactly when their `HeapId`s are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct HeapId(usize);

impl HeapId {
    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// HeapData captures every identity-bearing value that lives in the arena.
#[derive(Debug, Clone, strum::IntoStaticStr)]
pub enum HeapData {
    Array(Array),
    List(List),
    Set(Set),
    Queue(Queue),
    Dict(Dict),
    OrderedDict(OrderedDict),
    SortedDict(SortedDict),
    Foreign(Foreign),
    Record(Record),
}

impl HeapData {
    /// Snapshot of the elements of a sequence-shaped container, in iteration order.
    ///
    /// Returns `None` for maps, arrays and records.
    #[must_use]
    pub fn items(&self) -> Option<Vec<Value>> {
        match self {
            Self::List(list) => Some(list.iter().cloned().collect()),
            Self::Set(set) => Some(set.iter().cloned().collect()),
            Self::Queue(queue) => Some(queue.iter().cloned().collect()),
            Self::Foreign(foreign) => match foreign.shape() {
                ForeignShape::Sequence(items) => Some(items.clone()),
                ForeignShape::Mapping(_) => None,
            },
            _ => None,
        }
    }

    /// Snapshot of the pairs of a map-shaped container, in iteration order.
    #[must_use]
    pub fn entries(&self) -> Option<Vec<(Value, Value)>> {
        fn pairs<'a>(iter: impl Iterator<Item = (&'a Value, &'a Value)>) -> Vec<(Value, Value)> {
            iter.map(|(k, v)| (k.clone(), v.clone())).collect()
        }
        match self {
            Self::Dict(dict) => Some(pairs(dict.iter())),
            Self::OrderedDict(dict) => Some(pairs(dict.iter())),
            Self::SortedDict(dict) => Some(pairs(dict.iter())),
            Self::Foreign(foreign) => match foreign.shape() {
                ForeignShape::Mapping(entries) => Some(entries.clone()),
                ForeignShape::Sequence(_) => None,
            },
            _ => None,
        }
    }

    /// Appends an element to a sequence-shaped container.
    ///
    /// Returns `false` when the element was not added because an equal one was
    /// already present (sets only).
    ///
    /// # Panics
    /// Panics if called on data that is not a list, set or queue.
    pub(crate) fn push_item(&mut self, value: Value) -> bool {
        match self {
            Self::List(list) => {
                list.push(value);
                true
            }
            Self::Set(set) => set.insert(value),
            Self::Queue(queue) => {
                queue.push(value);
                true
            }
            other => unreachable!("push_item on {}", <&'static str>::from(&*other)),
        }
    }

    /// Inserts a pair into a map, returning `Ok(false)` if the key was already present.
    ///
    /// # Panics
    /// Panics if called on data that is not one of the map types.
    pub(crate) fn insert_entry(&mut self, key: Value, value: Value) -> Result<bool, KeyError> {
        let previous = match self {
            Self::Dict(dict) => dict.insert(key, value),
            Self::OrderedDict(dict) => dict.insert(key, value),
            Self::SortedDict(dict) => dict.insert(key, value)?,
            other => unreachable!("insert_entry on {}", <&'static str>::from(&*other)),
        };
        Ok(previous.is_none())
    }
}

/// Snapshot of heap state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStats {
    /// Total number of objects on the heap.
    pub live_objects: usize,
    /// Breakdown of objects by `HeapData` variant name.
    pub objects_by_type: BTreeMap<&'static str, usize>,
    /// Number of registered classes.
    pub classes: usize,
    /// Allocation count reported by the tracker, if it records one.
    pub tracker_allocations: Option<usize>,
}

/// Heap length recorded before a copy, used to discard a failed copy's allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeapMark(usize);

impl HeapMark {
    /// Index of the first entry that a rollback to this mark discards.
    pub(crate) fn first_discarded(self) -> usize {
        self.0
    }
}

/// Arena holding every identity-bearing value of one object graph, plus the
/// classes describing its records.
///
/// The arena only grows while a graph is being built or copied; the one
/// exception is [`Heap::rollback`], which drops everything allocated after a
/// mark and is what keeps a failed copy from leaving a partial graph behind.
#[derive(Debug)]
pub struct Heap<T: ResourceTracker = NoLimitTracker> {
    entries: Vec<HeapData>,
    classes: ClassRegistry,
    tracker: T,
}

impl Default for Heap<NoLimitTracker> {
    fn default() -> Self {
        Self::new(0, NoLimitTracker)
    }
}

macro_rules! typed_accessors {
    ($($variant:ident => $ty:ty, $get:ident, $get_mut:ident;)*) => {
        $(
            #[doc = concat!("Returns the `", stringify!($variant), "` referenced by `value`, if it is one.")]
            #[must_use]
            pub fn $get(&self, value: &Value) -> Option<&$ty> {
                match self.get_if_live(value.ref_id()?)? {
                    HeapData::$variant(data) => Some(data),
                    _ => None,
                }
            }

            #[doc = concat!("Mutable form of [`Heap::", stringify!($get), "`].")]
            pub fn $get_mut(&mut self, value: &Value) -> Option<&mut $ty> {
                match self.entries.get_mut(value.ref_id()?.index())? {
                    HeapData::$variant(data) => Some(data),
                    _ => None,
                }
            }
        )*
    };
}

impl<T: ResourceTracker> Heap<T> {
    /// Creates a new heap with the given resource tracker.
    pub fn new(capacity: usize, tracker: T) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            classes: ClassRegistry::new(),
            tracker,
        }
    }

    /// Allocates a new heap entry.
    ///
    /// Returns `Err(ResourceError)` if the tracker refuses the allocation.
    pub fn allocate(&mut self, data: HeapData) -> Result<HeapId, ResourceError> {
        self.tracker.on_allocate()?;
        let id = HeapId(self.entries.len());
        self.entries.push(data);
        Ok(id)
    }

    /// Returns the data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the ID does not belong to this heap.
    #[must_use]
    pub fn get(&self, id: HeapId) -> &HeapData {
        self.entries.get(id.index()).expect("Heap::get: slot missing")
    }

    /// Returns the data stored at the given ID, or `None` if there is none.
    #[must_use]
    pub fn get_if_live(&self, id: HeapId) -> Option<&HeapData> {
        self.entries.get(id.index())
    }

    /// Returns a mutable reference to the data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the ID does not belong to this heap.
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        self.entries.get_mut(id.index()).expect("Heap::get_mut: slot missing")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    pub(crate) fn mark(&self) -> HeapMark {
        HeapMark(self.entries.len())
    }

    /// Drops every entry allocated after `mark`.
    pub(crate) fn rollback(&mut self, mark: HeapMark) {
        for _ in mark.0..self.entries.len() {
            self.tracker.on_free();
        }
        self.entries.truncate(mark.0);
    }

    /// Returns a snapshot of the heap's current state.
    #[must_use]
    pub fn stats(&self) -> HeapStats {
        let mut objects_by_type = BTreeMap::new();
        for data in &self.entries {
            let name: &'static str = data.into();
            *objects_by_type.entry(name).or_insert(0) += 1;
        }
        HeapStats {
            live_objects: self.entries.len(),
            objects_by_type,
            classes: self.classes.len(),
            tracker_allocations: self.tracker.allocation_count(),
        }
    }

    // ------------------------------------------------------------------
    // Classes and field introspection
    // ------------------------------------------------------------------

    pub fn register_class(&mut self, builder: ClassBuilder) -> Result<ClassId, ClassError> {
        self.classes.register(builder)
    }

    #[must_use]
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// # Panics
    /// Panics if `id` was not registered on this heap.
    #[must_use]
    pub fn class(&self, id: ClassId) -> &ClassDef {
        self.classes.get(id)
    }

    #[must_use]
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.classes.by_name(name)
    }

    /// Every field of `class`, including inherited and static ones, walking
    /// from the class itself up through its ancestors.
    #[must_use]
    pub fn fields_of(&self, class: ClassId) -> &[FieldDescriptor] {
        self.classes.get(class).layout()
    }

    /// Reads a field through its descriptor, regardless of visibility.
    pub fn read_field(&self, target: HeapId, field: &FieldDescriptor) -> Result<&Value, FieldError> {
        if field.is_static() {
            return self.classes.static_value(field);
        }
        match self.get(target) {
            HeapData::Record(record) => record.read(field),
            other => Err(FieldError::NotARecord { found: other.into() }),
        }
    }

    /// Writes a field through its descriptor, regardless of visibility.
    pub fn write_field(&mut self, target: HeapId, field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
        if field.is_static() {
            return self.classes.set_static_value(field, value);
        }
        match self.get_mut(target) {
            HeapData::Record(record) => record.write(field, value),
            other => Err(FieldError::NotARecord {
                found: (&*other).into(),
            }),
        }
    }

    /// Reads a public field by name.
    pub fn field(&self, target: &Value, name: &str) -> Result<&Value, FieldError> {
        let (id, field) = self.public_field(target, name)?;
        self.read_field(id, &field)
    }

    /// Writes a public field by name, returning the old value.
    pub fn set_field(&mut self, target: &Value, name: &str, value: Value) -> Result<Value, FieldError> {
        let (id, field) = self.public_field(target, name)?;
        self.write_field(id, &field, value)
    }

    fn public_field(&self, target: &Value, name: &str) -> Result<(HeapId, FieldDescriptor), FieldError> {
        let Some(id) = target.ref_id() else {
            return Err(FieldError::NotARecord {
                found: target.kind_name(),
            });
        };
        let record = match self.get(id) {
            HeapData::Record(record) => record,
            other => return Err(FieldError::NotARecord { found: other.into() }),
        };
        let class = self.classes.get(record.class_id());
        let field = class.field(name).ok_or_else(|| FieldError::Unknown {
            class: class.name().to_owned(),
            field: name.to_owned(),
        })?;
        if field.visibility() == Visibility::Private {
            return Err(FieldError::Private {
                class: class.name().to_owned(),
                field: name.to_owned(),
            });
        }
        Ok((id, field.clone()))
    }

    /// Runtime type name of a heap value: the class name for records, the
    /// host type name for foreign containers, the variant name otherwise.
    #[must_use]
    pub fn type_name(&self, id: HeapId) -> String {
        match self.get(id) {
            HeapData::Record(record) => self.classes.get(record.class_id()).name().to_owned(),
            HeapData::Foreign(foreign) => foreign.type_name().to_owned(),
            HeapData::Array(array) => array.type_name(),
            other => <&'static str>::from(other).to_owned(),
        }
    }

    // ------------------------------------------------------------------
    // Allocation helpers
    // ------------------------------------------------------------------

    /// Creates an instance of `class` using its registered constructor.
    pub fn instantiate(&mut self, class: ClassId) -> CopyResult<Value> {
        let def = self.classes.get(class);
        let slots = def
            .construct()
            .map_err(|cause| CopyError::construction(def.name(), cause))?;
        let id = self.allocate(HeapData::Record(Record::new(class, slots)))?;
        Ok(Value::Ref(id))
    }

    /// Allocates a record of `class` with the given slots, bypassing the
    /// class constructor. Slots follow [`ClassDef::instance_fields`] order.
    pub fn new_record(&mut self, class: ClassId, slots: Vec<Value>) -> CopyResult<Value> {
        let def = self.classes.get(class);
        def.check_slots(&slots)
            .map_err(|cause| CopyError::construction(def.name(), cause))?;
        let id = self.allocate(HeapData::Record(Record::new(class, slots)))?;
        Ok(Value::Ref(id))
    }

    pub fn new_list(&mut self, items: impl IntoIterator<Item = Value>) -> Result<Value, ResourceError> {
        self.alloc_value(HeapData::List(List::new(items.into_iter().collect())))
    }

    pub fn new_set(&mut self, items: impl IntoIterator<Item = Value>) -> Result<Value, ResourceError> {
        self.alloc_value(HeapData::Set(items.into_iter().collect()))
    }

    pub fn new_queue(&mut self, items: impl IntoIterator<Item = Value>) -> Result<Value, ResourceError> {
        self.alloc_value(HeapData::Queue(items.into_iter().collect()))
    }

    pub fn new_dict(&mut self, pairs: impl IntoIterator<Item = (Value, Value)>) -> Result<Value, ResourceError> {
        self.alloc_value(HeapData::Dict(pairs.into_iter().collect()))
    }

    pub fn new_ordered_dict(
        &mut self,
        pairs: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<Value, ResourceError> {
        self.alloc_value(HeapData::OrderedDict(pairs.into_iter().collect()))
    }

    /// Allocates a sorted map. Keys must be scalars or `null`; see [`SortedDict`].
    pub fn new_sorted_dict(&mut self, pairs: impl IntoIterator<Item = (Value, Value)>) -> CopyResult<Value> {
        let map = SortedDict::from_pairs(pairs).map_err(|err| CopyError::construction("SortedDict", err))?;
        Ok(self.alloc_value(HeapData::SortedDict(map))?)
    }

    pub fn new_array(&mut self, array: Array) -> Result<Value, ResourceError> {
        self.alloc_value(HeapData::Array(array))
    }

    pub fn new_foreign(&mut self, foreign: Foreign) -> Result<Value, ResourceError> {
        self.alloc_value(HeapData::Foreign(foreign))
    }

    fn alloc_value(&mut self, data: HeapData) -> Result<Value, ResourceError> {
        self.allocate(data).map(Value::Ref)
    }

    typed_accessors! {
        Array => Array, as_array, as_array_mut;
        List => List, as_list, as_list_mut;
        Set => Set, as_set, as_set_mut;
        Queue => Queue, as_queue, as_queue_mut;
        Dict => Dict, as_dict, as_dict_mut;
        OrderedDict => OrderedDict, as_ordered_dict, as_ordered_dict_mut;
        SortedDict => SortedDict, as_sorted_dict, as_sorted_dict_mut;
        Record => Record, as_record, as_record_mut;
    }
}
