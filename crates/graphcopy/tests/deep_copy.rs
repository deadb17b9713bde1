//! Structural properties of deep copies: independence, aliasing, cycles and
//! failure atomicity.

use std::rc::Rc;

use graphcopy::{
    Array, CopyError, DeepCopier, Foreign, Heap, HeapData, Object, TypeCategory, Value, ValueType, classify, deep_copy,
};
use pretty_assertions::assert_eq;

/// Returns the element at `index` of the list referenced by `list`.
fn item(heap: &Heap, list: &Value, index: usize) -> Value {
    heap.as_list(list)
        .and_then(|list| list.get(index))
        .cloned()
        .expect("list element")
}

// =============================================================================
// 1. Independence
// =============================================================================

/// Mutating the copy of a nested structure leaves the source unchanged, and vice versa.
#[test]
fn nested_lists_are_independent() {
    let mut heap = Heap::default();
    let inner = heap.new_list([Value::Int(1), Value::Int(2)]).unwrap();
    let outer = heap.new_list([inner.clone(), Value::str("tail")]).unwrap();

    let copy = deep_copy(&mut heap, &outer).unwrap();
    assert_eq!(heap.to_object(&copy), heap.to_object(&outer));

    let inner_copy = item(&heap, &copy, 0);
    assert_ne!(inner_copy, inner, "inner list must be a new object");
    heap.as_list_mut(&inner_copy).unwrap().push(Value::Int(3));
    heap.as_list_mut(&outer).unwrap().push(Value::None);

    assert_eq!(heap.to_object(&outer).to_string(), "[[1, 2], tail, null]");
    assert_eq!(heap.to_object(&copy).to_string(), "[[1, 2, 3], tail]");
}

/// No heap object of the copy is also part of the source graph.
#[test]
fn copy_shares_no_heap_objects_with_source() {
    let mut heap = Heap::default();
    let leaf = heap.new_set([Value::Int(1)]).unwrap();
    let map = heap.new_dict([(Value::str("leaf"), leaf)]).unwrap();
    let root = heap.new_queue([map]).unwrap();
    let before = heap.len();

    let copy = deep_copy(&mut heap, &root).unwrap();
    assert_eq!(heap.len(), before * 2, "each of the three objects is copied once");
    let copy_id = copy.ref_id().unwrap();
    assert!(copy_id.index() >= before, "copies are fresh allocations");
}

// =============================================================================
// 2. Scalars
// =============================================================================

/// Scalars come back as the very same value; strings share their buffer.
#[test]
fn scalars_pass_through_unchanged() {
    let mut heap = Heap::default();
    let text = Value::str("shared");
    assert_eq!(deep_copy(&mut heap, &text).unwrap(), text);
    assert_eq!(deep_copy(&mut heap, &Value::Int(42)).unwrap(), Value::Int(42));
    assert_eq!(deep_copy(&mut heap, &Value::None).unwrap(), Value::None);
    assert!(heap.is_empty(), "scalars never allocate");

    let list = heap.new_list([text.clone()]).unwrap();
    let copy = deep_copy(&mut heap, &list).unwrap();
    match (item(&heap, &copy, 0), text) {
        (Value::Str(copied), Value::Str(original)) => assert!(Rc::ptr_eq(&copied, &original)),
        other => panic!("expected strings, got {other:?}"),
    }
}

// =============================================================================
// 3. Aliasing
// =============================================================================

/// Two references to one source object resolve to one copied object.
#[test]
fn aliases_resolve_to_one_copy() {
    let mut heap = Heap::default();
    let shared = heap.new_list([Value::Int(1)]).unwrap();
    let root = heap.new_list([shared.clone(), shared.clone()]).unwrap();

    let copy = deep_copy(&mut heap, &root).unwrap();
    let first = item(&heap, &copy, 0);
    let second = item(&heap, &copy, 1);
    assert_eq!(first, second, "aliases must stay aliased");
    assert_ne!(first, shared);

    heap.as_list_mut(&first).unwrap().push(Value::Int(2));
    assert_eq!(heap.to_object(&second).to_string(), "[1, 2]");
}

/// A map whose key and value are the same object keeps that identity in the copy.
#[test]
fn key_and_value_alias_is_preserved() {
    let mut heap = Heap::default();
    let node = heap.new_list([]).unwrap();
    let map = heap.new_ordered_dict([(node.clone(), node)]).unwrap();

    let copy = deep_copy(&mut heap, &map).unwrap();
    let (key, value) = heap.as_ordered_dict(&copy).unwrap().iter().next().unwrap();
    assert_eq!(key, value);
}

// =============================================================================
// 4. Cycles
// =============================================================================

/// A list containing itself is copied into a list containing its copy.
#[test]
fn self_cycle_is_reproduced() {
    let mut heap = Heap::default();
    let list = heap.new_list([Value::Int(1)]).unwrap();
    heap.as_list_mut(&list).unwrap().push(list.clone());

    let copy = deep_copy(&mut heap, &list).unwrap();
    assert_eq!(item(&heap, &copy, 1), copy);
    assert_eq!(heap.to_object(&copy), heap.to_object(&list));
}

/// Two objects referencing each other keep their mutual reference in the copy.
#[test]
fn mutual_cycle_is_reproduced() {
    let mut heap = Heap::default();
    let a = heap.new_list([]).unwrap();
    let b = heap.new_sorted_dict([(Value::str("back"), a.clone())]).unwrap();
    heap.as_list_mut(&a).unwrap().push(b.clone());

    let a2 = deep_copy(&mut heap, &a).unwrap();
    let b2 = item(&heap, &a2, 0);
    assert_ne!(b2, b);
    assert_eq!(heap.as_sorted_dict(&b2).unwrap().get(&Value::str("back")), Some(&a2));
    assert_eq!(heap.to_object(&a2).to_string(), "[{back=[...]}]");
}

/// An array whose element refers back to the array itself.
#[test]
fn array_cycle_is_reproduced() {
    let mut heap = Heap::default();
    let array = heap.new_array(Array::new(ValueType::Object, 2)).unwrap();
    heap.as_array_mut(&array).unwrap().set(1, array.clone()).unwrap();

    let copy = deep_copy(&mut heap, &array).unwrap();
    let copied = heap.as_array(&copy).unwrap();
    assert_eq!(copied.element_type(), ValueType::Object);
    assert_eq!(copied.len(), 2);
    assert_eq!(copied.get(0), Some(&Value::None));
    assert_eq!(copied.get(1), Some(&copy));
}

// =============================================================================
// 5. Failure atomicity
// =============================================================================

/// An unsupported container anywhere in the graph fails the whole copy and
/// leaves the heap exactly as it was.
#[test]
fn unsupported_variant_rolls_back() {
    let mut heap = Heap::default();
    let ring = heap
        .new_foreign(Foreign::sequence("RingBuffer", vec![Value::Int(1)]))
        .unwrap();
    let good = heap.new_list([Value::Int(1), Value::Int(2)]).unwrap();
    let root = heap.new_list([good, ring]).unwrap();
    let before = heap.stats();

    let err = deep_copy(&mut heap, &root).unwrap_err();
    assert_eq!(
        err,
        CopyError::UnsupportedVariant {
            type_name: "RingBuffer".to_owned()
        }
    );
    assert_eq!(heap.stats(), before, "no partial graph may survive");
}

/// A foreign container at the root is classified but not copyable.
#[test]
fn foreign_root_is_unsupported() {
    let mut heap = Heap::default();
    let weak = heap.new_foreign(Foreign::mapping("WeakMap", vec![])).unwrap();
    assert_eq!(classify(&weak, &heap), TypeCategory::AssociativeContainer);
    let err = heap.deep_copy(&weak).unwrap_err();
    assert_eq!(err.to_string(), "unsupported container type: WeakMap");
    assert_eq!(heap.len(), 1);
}

// =============================================================================
// 6. Shared memo across roots
// =============================================================================

/// Copying several roots with one copier keeps objects they share shared.
#[test]
fn copier_shares_memo_between_roots() {
    let mut heap = Heap::default();
    let shared = heap.new_set([Value::Int(9)]).unwrap();
    let left = heap.new_list([shared.clone()]).unwrap();
    let right = heap.new_queue([shared]).unwrap();

    let mut copier = DeepCopier::new(&mut heap);
    let left2 = copier.copy(&left).unwrap();
    let right2 = copier.copy(&right).unwrap();
    let stats = copier.finish();

    assert_eq!(stats.objects_copied, 3);
    assert_eq!(stats.alias_hits, 1);
    assert_eq!(stats.max_depth, 1);
    let shared_via_left = item(&heap, &left2, 0);
    let shared_via_right = heap.as_queue(&right2).unwrap().peek().cloned().unwrap();
    assert_eq!(shared_via_left, shared_via_right);
}

/// Independent calls do not share a memo.
#[test]
fn separate_calls_copy_again() {
    let mut heap = Heap::default();
    let list = heap.new_list([]).unwrap();
    let first = deep_copy(&mut heap, &list).unwrap();
    let second = deep_copy(&mut heap, &list).unwrap();
    assert_ne!(first, second);
    assert!(matches!(heap.get(second.ref_id().unwrap()), HeapData::List(_)));
    assert_eq!(heap.to_object(&first), Object::List(vec![]));
}
