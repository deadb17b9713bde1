//! Owned, heap-free snapshots of value graphs.
//!
//! An [`Object`] is what a caller looks at: it can be printed, compared with
//! another snapshot and serialized, none of which needs the heap. Snapshots of
//! a graph and of its deep copy compare equal, because they hold no handles.

use std::fmt::{self, Write};

use crate::{
    heap::{Heap, HeapData, HeapId},
    resource::ResourceTracker,
    types::ForeignShape,
    value::{Value, ValueType},
};

/// Snapshot of a value and everything reachable from it.
///
/// Shared sub-objects appear once per reference. A reference back to an object
/// that is still being expanded becomes [`Object::Cycle`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Object {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    Array {
        element_type: ValueType,
        items: Vec<Self>,
    },
    List(Vec<Self>),
    Set(Vec<Self>),
    Queue(Vec<Self>),
    /// Entries sorted by the display form of their keys.
    Dict(Vec<(Self, Self)>),
    OrderedDict(Vec<(Self, Self)>),
    SortedDict(Vec<(Self, Self)>),
    Foreign {
        type_name: String,
        items: Vec<Self>,
        entries: Vec<(Self, Self)>,
    },
    /// A record with its instance fields in layout order, private ones included.
    Record {
        class: String,
        fields: Vec<(String, Self)>,
    },
    /// Back-reference to an ancestor, holding its placeholder text
    /// (`[...]`, `{...}` or `Class{...}`).
    Cycle(String),
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Char(c) => f.write_char(*c),
            Self::Str(s) => f.write_str(s),
            Self::Array { items, .. } | Self::List(items) | Self::Queue(items) => write_items(f, "[", items, "]"),
            Self::Set(items) => write_items(f, "{", items, "}"),
            Self::Dict(entries) | Self::OrderedDict(entries) | Self::SortedDict(entries) => write_entries(f, entries),
            Self::Foreign {
                type_name,
                items,
                entries,
            } => {
                f.write_str(type_name)?;
                if entries.is_empty() {
                    write_items(f, "[", items, "]")
                } else {
                    write_entries(f, entries)
                }
            }
            Self::Record { class, fields } => {
                write!(f, "{class}{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_char('}')
            }
            Self::Cycle(placeholder) => f.write_str(placeholder),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, open: &str, items: &[Object], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[(Object, Object)]) -> fmt::Result {
    f.write_char('{')?;
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}={value}")?;
    }
    f.write_char('}')
}

impl Object {
    /// Converts the snapshot to plain JSON.
    ///
    /// - `None` → `null`, numbers and booleans as themselves (non-finite floats → `null`)
    /// - `Char` and `Str` → JSON string
    /// - `Array`, `List`, `Queue` → JSON array
    /// - `Set` → `{"$set": [...]}`
    /// - maps → JSON object, string keys used as they are, other keys by display form
    /// - `Record` → JSON object of its fields plus `"$class"`
    /// - `Foreign` → `{"$foreign": {"type": ..., "items": [...]}}`
    /// - `Cycle` → `{"$cycle": placeholder}`
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        use serde_json::{Value as JV, json};
        match self {
            Self::None => JV::Null,
            Self::Bool(b) => JV::Bool(*b),
            Self::Int(i) => json!(i),
            Self::Float(x) => serde_json::Number::from_f64(*x).map_or(JV::Null, JV::Number),
            Self::Char(c) => JV::String(c.to_string()),
            Self::Str(s) => JV::String(s.clone()),
            Self::Array { items, .. } | Self::List(items) | Self::Queue(items) => json_array(items),
            Self::Set(items) => json!({ "$set": json_array(items) }),
            Self::Dict(entries) | Self::OrderedDict(entries) | Self::SortedDict(entries) => {
                JV::Object(json_entries(entries))
            }
            Self::Foreign {
                type_name,
                items,
                entries,
            } => {
                if entries.is_empty() {
                    json!({ "$foreign": { "type": type_name, "items": json_array(items) } })
                } else {
                    json!({ "$foreign": { "type": type_name, "entries": json_entries(entries) } })
                }
            }
            Self::Record { class, fields } => {
                let mut map = serde_json::Map::with_capacity(fields.len() + 1);
                map.insert("$class".to_owned(), JV::String(class.clone()));
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json_value());
                }
                JV::Object(map)
            }
            Self::Cycle(placeholder) => json!({ "$cycle": placeholder }),
        }
    }
}

fn json_array(items: &[Object]) -> serde_json::Value {
    serde_json::Value::Array(items.iter().map(Object::to_json_value).collect())
}

fn json_entries(entries: &[(Object, Object)]) -> serde_json::Map<String, serde_json::Value> {
    entries
        .iter()
        .map(|(key, value)| {
            let key = match key {
                Object::Str(s) => s.clone(),
                other => other.to_string(),
            };
            (key, value.to_json_value())
        })
        .collect()
}

impl<T: ResourceTracker> Heap<T> {
    /// Takes a snapshot of `value` and everything reachable from it.
    ///
    /// # Panics
    /// Panics if the graph references an id that does not belong to this heap.
    #[must_use]
    pub fn to_object(&self, value: &Value) -> Object {
        let mut path = Vec::new();
        self.snapshot(value, &mut path)
    }

    fn snapshot(&self, value: &Value, path: &mut Vec<HeapId>) -> Object {
        let id = match value {
            Value::None => return Object::None,
            Value::Bool(b) => return Object::Bool(*b),
            Value::Int(i) => return Object::Int(*i),
            Value::Float(x) => return Object::Float(*x),
            Value::Char(c) => return Object::Char(*c),
            Value::Str(s) => return Object::Str(s.to_string()),
            Value::Ref(id) => *id,
        };
        if path.contains(&id) {
            return Object::Cycle(self.placeholder(id));
        }

        path.push(id);
        let data = self.get(id);
        let items = |path: &mut Vec<HeapId>| -> Vec<Object> {
            data.items()
                .unwrap_or_default()
                .iter()
                .map(|item| self.snapshot(item, path))
                .collect()
        };
        let object = match data {
            HeapData::Array(array) => Object::Array {
                element_type: array.element_type(),
                items: array.iter().map(|item| self.snapshot(item, path)).collect(),
            },
            HeapData::List(_) => Object::List(items(path)),
            HeapData::Set(_) => Object::Set(items(path)),
            HeapData::Queue(_) => Object::Queue(items(path)),
            HeapData::Dict(_) => {
                let mut entries = self.snapshot_entries(data, path);
                entries.sort_by_cached_key(|(key, _)| key.to_string());
                Object::Dict(entries)
            }
            HeapData::OrderedDict(_) => Object::OrderedDict(self.snapshot_entries(data, path)),
            HeapData::SortedDict(_) => Object::SortedDict(self.snapshot_entries(data, path)),
            HeapData::Foreign(foreign) => Object::Foreign {
                type_name: foreign.type_name().to_owned(),
                items: items(path),
                entries: self.snapshot_entries(data, path),
            },
            HeapData::Record(record) => {
                let class = self.class(record.class_id());
                let fields = class
                    .instance_fields()
                    .zip(record.slots())
                    .map(|(field, slot)| (field.name().to_owned(), self.snapshot(slot, path)))
                    .collect();
                Object::Record {
                    class: class.name().to_owned(),
                    fields,
                }
            }
        };
        path.pop();
        object
    }

    fn snapshot_entries(&self, data: &HeapData, path: &mut Vec<HeapId>) -> Vec<(Object, Object)> {
        data.entries()
            .unwrap_or_default()
            .iter()
            .map(|(key, value)| (self.snapshot(key, path), self.snapshot(value, path)))
            .collect()
    }

    fn placeholder(&self, id: HeapId) -> String {
        match self.get(id) {
            HeapData::Array(_) | HeapData::List(_) | HeapData::Queue(_) => "[...]".to_owned(),
            HeapData::Set(_) | HeapData::Dict(_) | HeapData::OrderedDict(_) | HeapData::SortedDict(_) => {
                "{...}".to_owned()
            }
            HeapData::Foreign(foreign) => match foreign.shape() {
                ForeignShape::Sequence(_) => format!("{}[...]", foreign.type_name()),
                ForeignShape::Mapping(_) => format!("{}{{...}}", foreign.type_name()),
            },
            HeapData::Record(_) => format!("{}{{...}}", self.type_name(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{class::ClassBuilder, types::Array};

    #[test]
    fn record_display_lists_fields_in_layout_order() {
        let mut heap = Heap::default();
        let class = heap
            .register_class(
                ClassBuilder::new("Person")
                    .field("name", ValueType::Str)
                    .field("age", ValueType::Int)
                    .field("books", ValueType::Object),
            )
            .unwrap();
        let books = heap.new_list([Value::str("Book1"), Value::str("Book2")]).unwrap();
        let person = heap
            .new_record(class, vec![Value::str("John Doe"), Value::Int(30), books])
            .unwrap();
        assert_eq!(
            heap.to_object(&person).to_string(),
            "Person{name=John Doe, age=30, books=[Book1, Book2]}"
        );
    }

    #[test]
    fn cycles_become_placeholders() {
        let mut heap = Heap::default();
        let list = heap.new_list([Value::Int(1)]).unwrap();
        heap.as_list_mut(&list).unwrap().push(list.clone());
        let object = heap.to_object(&list);
        assert_eq!(
            object,
            Object::List(vec![Object::Int(1), Object::Cycle("[...]".to_owned())])
        );
        assert_eq!(object.to_string(), "[1, [...]]");
    }

    #[test]
    fn shared_children_are_expanded_each_time() {
        let mut heap = Heap::default();
        let shared = heap.new_array(Array::new(ValueType::Bool, 1)).unwrap();
        let pair = heap.new_queue([shared.clone(), shared]).unwrap();
        assert_eq!(heap.to_object(&pair).to_string(), "[[false], [false]]");
    }

    #[test]
    fn json_uses_plain_shapes() {
        let mut heap = Heap::default();
        let tags = heap.new_set([Value::str("a")]).unwrap();
        let map = heap
            .new_ordered_dict([(Value::str("tags"), tags), (Value::Int(2), Value::Float(f64::NAN))])
            .unwrap();
        assert_eq!(
            heap.to_object(&map).to_json_value(),
            serde_json::json!({ "tags": { "$set": ["a"] }, "2": null })
        );
    }
}
