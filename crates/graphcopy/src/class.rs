//! Class registry and field introspection.
//!
//! Records have no runtime reflection to lean on, so every record type is
//! registered up front with a [`ClassBuilder`]. Registration computes the
//! class's full field layout once: the class's own declared fields first, then
//! each ancestor's, from the most-derived class up to the root of the chain.
//! The copy engine walks that layout through [`FieldDescriptor`] accessors,
//! which reach every field regardless of its [`Visibility`].

use std::rc::Rc;

use ahash::AHashMap;

use crate::{
    error::{ClassError, ConstructionCause, FieldError},
    value::{Value, ValueType},
};

/// Handle to a registered class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Where a field's value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAccessor {
    /// Instance field: index into the record's slots.
    Slot(usize),
    /// Static field: stored once on the declaring class.
    Static { class: ClassId, index: usize },
}

/// One field of a class layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: Rc<str>,
    value_type: ValueType,
    visibility: Visibility,
    declared_in: ClassId,
    accessor: FieldAccessor,
}

impl FieldDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The class whose declaration introduced this field.
    #[must_use]
    pub fn declared_in(&self) -> ClassId {
        self.declared_in
    }

    #[must_use]
    pub fn accessor(&self) -> FieldAccessor {
        self.accessor
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.accessor, FieldAccessor::Static { .. })
    }
}

/// Factory producing the initial slot values of a new instance.
///
/// Receives the class definition (and through it the layout) and returns one
/// value per instance field, in layout order.
pub type FactoryFn = fn(&ClassDef) -> Result<Vec<Value>, String>;

/// How instances of a class are created before their fields are populated.
#[derive(Debug, Clone, Copy)]
pub enum Constructor {
    /// Every instance field starts at its type's default value.
    Default,
    /// A registered factory function supplies the initial slots.
    Factory(FactoryFn),
}

/// A field as declared by one class, before layout.
#[derive(Debug, Clone)]
struct FieldDecl {
    name: Rc<str>,
    value_type: ValueType,
    visibility: Visibility,
    /// `Some(initial)` marks a static field.
    static_initial: Option<Value>,
}

/// Describes a class to register.
///
/// ```
/// use graphcopy::{ClassBuilder, Heap, ValueType};
///
/// let mut heap = Heap::default();
/// let person = heap
///     .register_class(
///         ClassBuilder::new("Person")
///             .field("name", ValueType::Str)
///             .private_field("age", ValueType::Int),
///     )
///     .unwrap();
/// assert_eq!(heap.fields_of(person).len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    parent: Option<ClassId>,
    fields: Vec<FieldDecl>,
    constructor: Option<Constructor>,
}

impl ClassBuilder {
    /// Starts a class with the default constructor and no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            constructor: Some(Constructor::Default),
        }
    }

    #[must_use]
    pub fn extends(mut self, parent: ClassId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declares a public instance field.
    #[must_use]
    pub fn field(self, name: &str, value_type: ValueType) -> Self {
        self.declare(name, value_type, Visibility::Public, None)
    }

    /// Declares a private instance field.
    #[must_use]
    pub fn private_field(self, name: &str, value_type: ValueType) -> Self {
        self.declare(name, value_type, Visibility::Private, None)
    }

    /// Declares a static field holding `initial`.
    #[must_use]
    pub fn static_field(self, name: &str, value_type: ValueType, initial: Value) -> Self {
        self.declare(name, value_type, Visibility::Public, Some(initial))
    }

    #[must_use]
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Registers the class with no way to construct instances.
    ///
    /// Instances can still be allocated directly from slot values, but copying
    /// one fails with a construction error.
    #[must_use]
    pub fn without_constructor(mut self) -> Self {
        self.constructor = None;
        self
    }

    fn declare(
        mut self,
        name: &str,
        value_type: ValueType,
        visibility: Visibility,
        static_initial: Option<Value>,
    ) -> Self {
        self.fields.push(FieldDecl {
            name: Rc::from(name),
            value_type,
            visibility,
            static_initial,
        });
        self
    }
}

/// A registered class.
#[derive(Debug, Clone)]
pub struct ClassDef {
    id: ClassId,
    name: Rc<str>,
    parent: Option<ClassId>,
    constructor: Option<Constructor>,
    /// Own fields first, then every ancestor's.
    layout: Vec<FieldDescriptor>,
    instance_slots: usize,
    /// Values of the static fields this class declares.
    statics: Vec<Value>,
}

impl ClassDef {
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// All fields, including inherited and static ones, most-derived first.
    #[must_use]
    pub fn layout(&self) -> &[FieldDescriptor] {
        &self.layout
    }

    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.layout.iter().filter(|field| !field.is_static())
    }

    /// Number of slots an instance of this class holds.
    #[must_use]
    pub fn instance_slots(&self) -> usize {
        self.instance_slots
    }

    #[must_use]
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Looks up a field by name.
    ///
    /// A subclass field shadows an ancestor field of the same name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.layout.iter().find(|field| field.name() == name)
    }

    /// Produces the initial slots of a new instance.
    pub fn construct(&self) -> Result<Vec<Value>, ConstructionCause> {
        match self.constructor {
            None => Err(ConstructionCause::NoConstructor),
            Some(Constructor::Default) => Ok(self
                .instance_fields()
                .map(|field| field.value_type().default_value())
                .collect()),
            Some(Constructor::Factory(factory)) => {
                let slots = factory(self).map_err(ConstructionCause::Constructor)?;
                self.check_slots(&slots)?;
                Ok(slots)
            }
        }
    }

    /// Checks that `slots` has one value per instance field, each fitting the
    /// field's declared type.
    pub fn check_slots(&self, slots: &[Value]) -> Result<(), ConstructionCause> {
        if slots.len() != self.instance_slots {
            return Err(ConstructionCause::ConstructorArity {
                expected: self.instance_slots,
                got: slots.len(),
            });
        }
        for (field, value) in self.instance_fields().zip(slots) {
            if !field.value_type().accepts(value) {
                return Err(FieldError::TypeMismatch {
                    field: field.name().to_owned(),
                    expected: field.value_type(),
                    found: value.kind_name(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// All classes known to a heap.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDef>,
    by_name: AHashMap<Rc<str>, ClassId>,
}

impl ClassRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class and computes its layout.
    pub fn register(&mut self, builder: ClassBuilder) -> Result<ClassId, ClassError> {
        if self.by_name.contains_key(builder.name.as_str()) {
            return Err(ClassError::Duplicate(builder.name));
        }
        let parent = match builder.parent {
            Some(parent_id) => match self.classes.get(parent_id.index()) {
                Some(parent) => Some(parent),
                None => return Err(ClassError::UnknownParent(builder.name)),
            },
            None => None,
        };

        let id = ClassId(self.classes.len());
        let mut layout = Vec::with_capacity(builder.fields.len() + parent.map_or(0, |p| p.layout.len()));
        let mut statics = Vec::new();
        let mut next_slot = 0;

        for decl in builder.fields {
            let accessor = if let Some(initial) = decl.static_initial {
                if !decl.value_type.accepts(&initial) {
                    return Err(ClassError::StaticTypeMismatch {
                        field: decl.name.to_string(),
                        expected: decl.value_type,
                    });
                }
                statics.push(initial);
                FieldAccessor::Static {
                    class: id,
                    index: statics.len() - 1,
                }
            } else {
                next_slot += 1;
                FieldAccessor::Slot(next_slot - 1)
            };
            layout.push(FieldDescriptor {
                name: decl.name,
                value_type: decl.value_type,
                visibility: decl.visibility,
                declared_in: id,
                accessor,
            });
        }

        // Inherited instance fields follow the class's own, renumbered in order.
        if let Some(parent) = parent {
            for inherited in &parent.layout {
                let mut field = inherited.clone();
                if let FieldAccessor::Slot(_) = field.accessor {
                    field.accessor = FieldAccessor::Slot(next_slot);
                    next_slot += 1;
                }
                layout.push(field);
            }
        }

        let name: Rc<str> = Rc::from(builder.name);
        self.classes.push(ClassDef {
            id,
            name: Rc::clone(&name),
            parent: builder.parent,
            constructor: builder.constructor,
            layout,
            instance_slots: next_slot,
            statics,
        });
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Returns the class registered under `id`.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this registry.
    #[must_use]
    pub fn get(&self, id: ClassId) -> &ClassDef {
        self.classes.get(id.index()).expect("ClassRegistry::get: unknown class id")
    }

    #[must_use]
    pub fn get_if_known(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index())
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Reads a static field.
    pub fn static_value(&self, field: &FieldDescriptor) -> Result<&Value, FieldError> {
        let (class, index) = static_location(field)?;
        self.get_if_known(class)
            .and_then(|def| def.statics.get(index))
            .ok_or_else(|| FieldError::MissingSlot {
                field: field.name().to_owned(),
                slot: index,
            })
    }

    /// Writes a static field, returning the old value.
    pub fn set_static_value(&mut self, field: &FieldDescriptor, value: Value) -> Result<Value, FieldError> {
        let (class, index) = static_location(field)?;
        if !field.value_type().accepts(&value) {
            return Err(FieldError::TypeMismatch {
                field: field.name().to_owned(),
                expected: field.value_type(),
                found: value.kind_name(),
            });
        }
        let slot = self
            .classes
            .get_mut(class.index())
            .and_then(|def| def.statics.get_mut(index))
            .ok_or_else(|| FieldError::MissingSlot {
                field: field.name().to_owned(),
                slot: index,
            })?;
        Ok(std::mem::replace(slot, value))
    }
}

fn static_location(field: &FieldDescriptor) -> Result<(ClassId, usize), FieldError> {
    match field.accessor() {
        FieldAccessor::Static { class, index } => Ok((class, index)),
        FieldAccessor::Slot(_) => Err(FieldError::NotStatic {
            field: field.name().to_owned(),
        }),
    }
}
