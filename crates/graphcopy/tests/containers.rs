//! Every supported container variant is recreated as the same variant with
//! the same contents.

use graphcopy::{
    Array, ClassBuilder, ConstructionCause, ContainerVariant, CopyError, Heap, HeapData, KeyError, Object, Value,
    ValueType, create, deep_copy,
};
use pretty_assertions::assert_eq;

/// Returns the `HeapData` variant name of the value's target.
fn variant_name(heap: &Heap, value: &Value) -> &'static str {
    heap.get(value.ref_id().unwrap()).into()
}

/// Insertion-ordered maps keep their order.
#[test]
fn ordered_dict_keeps_insertion_order() {
    let mut heap = Heap::default();
    let map = heap
        .new_ordered_dict([
            (Value::str("zeta"), Value::Int(1)),
            (Value::str("alpha"), Value::Int(2)),
            (Value::str("mid"), Value::Int(3)),
        ])
        .unwrap();
    let copy = deep_copy(&mut heap, &map).unwrap();

    assert_eq!(variant_name(&heap, &copy), "OrderedDict");
    let keys: Vec<_> = heap.as_ordered_dict(&copy).unwrap().keys().cloned().collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"].map(Value::str));
}

/// Sorted maps stay sorted and keep their entries.
#[test]
fn sorted_dict_stays_sorted() {
    let mut heap = Heap::default();
    let map = heap
        .new_sorted_dict([(Value::Int(3), Value::str("c")), (Value::Int(1), Value::str("a"))])
        .unwrap();
    let copy = deep_copy(&mut heap, &map).unwrap();

    assert_eq!(variant_name(&heap, &copy), "SortedDict");
    assert_eq!(heap.to_object(&copy).to_string(), "{1=a, 3=c}");
}

/// Registers `Holder { first: Object, map: Object }`, used to make the copy
/// reach a map's contents through an earlier field first.
fn holder_class(heap: &mut Heap) -> graphcopy::ClassId {
    heap.register_class(
        ClassBuilder::new("Holder")
            .field("first", ValueType::Object)
            .field("map", ValueType::Object),
    )
    .unwrap()
}

/// Heap keys that were already copied before the map is reached keep their
/// insertion position in the copied map.
#[test]
fn ordered_dict_heap_keys_keep_order_when_copied_early() {
    let mut heap = Heap::default();
    let holder = holder_class(&mut heap);
    let a = heap.new_list([Value::str("a")]).unwrap();
    let b = heap.new_list([Value::str("b")]).unwrap();
    let map = heap
        .new_ordered_dict([(a, Value::Int(1)), (b.clone(), Value::Int(2))])
        .unwrap();
    let root = heap.new_record(holder, vec![b, map]).unwrap();

    let copy = deep_copy(&mut heap, &root).unwrap();
    assert_eq!(heap.to_object(&copy), heap.to_object(&root));
    let copied_map = heap.field(&copy, "map").unwrap().clone();
    assert_eq!(heap.to_object(&copied_map).to_string(), "{[a]=1, [b]=2}");

    let first = heap.field(&copy, "first").unwrap().clone();
    let last_key = heap.as_ordered_dict(&copied_map).unwrap().keys().last().cloned();
    assert_eq!(last_key, Some(first), "the early copy is reused as the key");
}

/// Sorted maps keep their key order when their values were copied earlier
/// through another field.
#[test]
fn sorted_dict_order_survives_early_copies() {
    let mut heap = Heap::default();
    let holder = holder_class(&mut heap);
    let a = heap.new_list([Value::Int(1)]).unwrap();
    let b = heap.new_list([Value::Int(2)]).unwrap();
    let map = heap
        .new_sorted_dict([(Value::str("b"), b.clone()), (Value::str("a"), a)])
        .unwrap();
    let root = heap.new_record(holder, vec![b, map]).unwrap();

    let copy = deep_copy(&mut heap, &root).unwrap();
    assert_eq!(heap.to_object(&copy), heap.to_object(&root));
    let copied_map = heap.field(&copy, "map").unwrap().clone();
    let keys: Vec<_> = heap.as_sorted_dict(&copied_map).unwrap().keys().cloned().collect();
    assert_eq!(keys, ["a", "b"].map(Value::str));
    assert_eq!(
        heap.as_sorted_dict(&copied_map).unwrap().get(&Value::str("b")),
        Some(heap.field(&copy, "first").unwrap())
    );
}

/// Heap objects have no order that survives a copy, so sorted maps refuse them
/// as keys.
#[test]
fn sorted_dict_refuses_heap_keys() {
    let mut heap = Heap::default();
    let key = heap.new_list([]).unwrap();
    let before = heap.len();

    let err = heap
        .new_sorted_dict([(Value::Int(1), Value::None), (key.clone(), Value::None)])
        .unwrap_err();
    assert_eq!(
        err,
        CopyError::ConstructionFailure {
            type_name: "SortedDict".to_owned(),
            cause: ConstructionCause::Key(KeyError::Unordered { found: "object" }),
        }
    );
    assert_eq!(heap.len(), before);

    let map = heap.new_sorted_dict([]).unwrap();
    let inserted = heap.as_sorted_dict_mut(&map).unwrap().insert(key, Value::None);
    assert_eq!(inserted, Err(KeyError::Unordered { found: "object" }));
    assert!(heap.as_sorted_dict(&map).unwrap().is_empty());
}

/// Hash maps keep every entry, with heap values copied on both sides.
#[test]
fn dict_copies_keys_and_values() {
    let mut heap = Heap::default();
    let key = heap.new_list([Value::Int(1)]).unwrap();
    let value = heap.new_set([Value::Char('v')]).unwrap();
    let map = heap
        .new_dict([(key.clone(), value), (Value::str("plain"), Value::Bool(false))])
        .unwrap();
    let copy = deep_copy(&mut heap, &map).unwrap();

    let dict = heap.as_dict(&copy).unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get(&Value::str("plain")), Some(&Value::Bool(false)));
    assert_eq!(dict.get(&key), None, "keys with identity are copied too");
    assert_eq!(heap.to_object(&copy), heap.to_object(&map));
}

/// Sets keep membership; queues keep FIFO order.
#[test]
fn set_and_queue_fidelity() {
    let mut heap = Heap::default();
    let set = heap
        .new_set([Value::Int(1), Value::str("one"), Value::Float(1.0)])
        .unwrap();
    let queue = heap.new_queue([Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap();
    let root = heap.new_list([set, queue]).unwrap();
    let copy = deep_copy(&mut heap, &root).unwrap();

    let copied = heap.as_list(&copy).unwrap().as_slice().to_vec();
    let copied_set = heap.as_set(&copied[0]).unwrap();
    assert_eq!(copied_set.len(), 3);
    assert!(copied_set.contains(&Value::str("one")));
    assert!(copied_set.contains(&Value::Float(1.0)));

    let copied_queue = heap.as_queue_mut(&copied[1]).unwrap();
    assert_eq!(copied_queue.pop(), Some(Value::Int(1)));
    assert_eq!(copied_queue.pop(), Some(Value::Int(2)));
    assert_eq!(heap.to_object(&root).to_string(), "[{1, one, 1.0}, [1, 2, 3]]");
}

/// A set holding distinct heap objects keeps them distinct after the copy.
#[test]
fn set_of_heap_objects_keeps_cardinality() {
    let mut heap = Heap::default();
    let a = heap.new_list([]).unwrap();
    let b = heap.new_list([]).unwrap();
    let set = heap.new_set([a, b]).unwrap();
    let copy = deep_copy(&mut heap, &set).unwrap();
    assert_eq!(heap.as_set(&copy).unwrap().len(), 2);
}

/// Arrays keep element type and length; object arrays copy their elements.
#[test]
fn arrays_keep_type_and_length() {
    let mut heap = Heap::default();
    let ints = heap
        .new_array(Array::from_items(ValueType::Int, vec![Value::Int(4), Value::Int(5)]).unwrap())
        .unwrap();
    let empty = heap.new_array(Array::new(ValueType::Char, 0)).unwrap();
    let objects = heap
        .new_array(Array::from_items(ValueType::Object, vec![ints.clone(), empty, Value::None]).unwrap())
        .unwrap();

    let copy = deep_copy(&mut heap, &objects).unwrap();
    let copied = heap.as_array(&copy).unwrap().clone();
    assert_eq!(copied.element_type(), ValueType::Object);
    assert_eq!(copied.type_name(), "object[]");
    assert_eq!(copied.len(), 3);
    assert_ne!(copied.get(0), Some(&ints));

    let inner = heap.as_array(&copied.as_slice()[0]).unwrap();
    assert_eq!(inner.element_type(), ValueType::Int);
    assert_eq!(inner.as_slice(), [Value::Int(4), Value::Int(5)]);
    assert!(heap.as_array(&copied.as_slice()[1]).unwrap().is_empty());

    let object = heap.to_object(&copy);
    assert!(matches!(
        object,
        Object::Array {
            element_type: ValueType::Object,
            ..
        }
    ));
    assert_eq!(object.to_string(), "[[4, 5], [], null]");
}

/// Empty containers come back as empty containers of the same variant.
#[test]
fn empty_containers() {
    let mut heap = Heap::default();
    let values = [
        heap.new_list([]).unwrap(),
        heap.new_set([]).unwrap(),
        heap.new_queue([]).unwrap(),
        heap.new_dict([]).unwrap(),
        heap.new_ordered_dict([]).unwrap(),
        heap.new_sorted_dict([]).unwrap(),
    ];
    for value in &values {
        let copy = deep_copy(&mut heap, value).unwrap();
        assert_eq!(variant_name(&heap, &copy), variant_name(&heap, value));
        assert_eq!(heap.to_object(&copy), heap.to_object(value));
    }
}

/// The factory maps each supported variant to an empty instance of itself.
#[test]
fn factory_covers_every_variant() {
    let mut heap = Heap::default();
    let list = heap.new_list([Value::Int(1)]).unwrap();
    let data = heap.get(list.ref_id().unwrap());
    assert_eq!(ContainerVariant::of(data), Some(ContainerVariant::List));
    match create(data, "List").unwrap() {
        HeapData::List(list) => assert!(list.is_empty()),
        other => panic!("expected a list, got {other:?}"),
    }
}
