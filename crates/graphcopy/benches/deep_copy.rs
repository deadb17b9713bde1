// Use codspeed-criterion-compat when running on CodSpeed (CI), real criterion otherwise
#[cfg(codspeed)]
use codspeed_criterion_compat::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
#[cfg(not(codspeed))]
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use graphcopy::{ClassBuilder, Heap, Value, ValueType, deep_copy};

/// A list of `len` records, each holding a name, a number and a list of tags,
/// where every record also points at the shared `owner` record.
fn build_records(heap: &mut Heap, len: usize) -> Value {
    let class = heap
        .register_class(
            ClassBuilder::new("Item")
                .field("name", ValueType::Str)
                .field("rank", ValueType::Int)
                .field("tags", ValueType::Object)
                .field("owner", ValueType::Object),
        )
        .unwrap();
    let owner = heap.instantiate(class).unwrap();
    let mut items = Vec::with_capacity(len);
    for i in 0..len {
        let tags = heap.new_set([Value::str("a"), Value::Int(i64::try_from(i).unwrap())]).unwrap();
        let item = heap
            .new_record(
                class,
                vec![Value::str(format!("item{i}")), Value::Int(1), tags, owner.clone()],
            )
            .unwrap();
        items.push(item);
    }
    heap.new_list(items).unwrap()
}

/// A ring of `len` lists, each pointing at the next, the last one closing the cycle.
fn build_ring(heap: &mut Heap, len: usize) -> Value {
    let first = heap.new_list([]).unwrap();
    let mut previous = first.clone();
    for _ in 1..len {
        let next = heap.new_list([]).unwrap();
        heap.as_list_mut(&previous).unwrap().push(next.clone());
        previous = next;
    }
    heap.as_list_mut(&previous).unwrap().push(first.clone());
    first
}

fn bench_deep_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_copy");
    group.bench_function("records_1000", |b| {
        b.iter_batched(
            || {
                let mut heap = Heap::default();
                let root = build_records(&mut heap, 1000);
                (heap, root)
            },
            |(mut heap, root)| black_box(deep_copy(&mut heap, &root).unwrap()),
            BatchSize::LargeInput,
        );
    });
    group.bench_function("ordered_dict_10000", |b| {
        b.iter(|| {
            let mut heap = Heap::default();
            let map = heap
                .new_ordered_dict((0..10_000).map(|i| (Value::Int(i), Value::str("v"))))
                .unwrap();
            black_box(deep_copy(&mut heap, &map).unwrap());
        });
    });
    group.bench_function("ring_1000", |b| {
        b.iter(|| {
            let mut heap = Heap::default();
            let ring = build_ring(&mut heap, 1000);
            black_box(deep_copy(&mut heap, &ring).unwrap());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_deep_copy);
criterion_main!(benches);
