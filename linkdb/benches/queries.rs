use criterion::{black_box, criterion_group, criterion_main, Criterion};
use linkdb::schema::{FieldType, StoreSchema, TypeDefinition};
use linkdb::store::Store;

fn pet_schema() -> StoreSchema {
    StoreSchema::new("bench")
        .with_type(
            TypeDefinition::new("Dog")
                .field("name", FieldType::String)
                .field("age", FieldType::Int),
        )
        .with_type(
            TypeDefinition::new("Owner")
                .field("name", FieldType::String)
                .relation_many("dogs", "Dog"),
        )
}

/// One owner per ten dogs, ages cycling 0..15.
fn build_store(dog_count: usize) -> Store {
    let store = Store::in_memory(pet_schema()).unwrap();
    let mut txn = store.begin().unwrap();

    let mut owner = None;
    for i in 0..dog_count {
        if i % 10 == 0 {
            let id = txn.create("Owner").unwrap();
            txn.set(id, "name", format!("owner-{}", i / 10)).unwrap();
            owner = Some(id);
        }
        let dog = txn.create("Dog").unwrap();
        txn.set(dog, "age", (i % 15) as i32).unwrap();
        if let Some(owner) = owner {
            txn.push_link(owner, "dogs", dog).unwrap();
        }
    }
    txn.commit().unwrap();
    store
}

fn bench_direct_field_scan(c: &mut Criterion) {
    let store = build_store(10_000);
    c.bench_function("direct_field_scan_10k", |b| {
        b.iter(|| {
            let results = store
                .query("Dog")
                .unwrap()
                .greater_than("age", black_box(7))
                .unwrap()
                .find_all()
                .unwrap();
            black_box(results.len())
        })
    });
}

fn bench_to_many_scan(c: &mut Criterion) {
    let store = build_store(10_000);
    c.bench_function("to_many_existential_scan_1k_owners", |b| {
        b.iter(|| {
            let results = store
                .query("Owner")
                .unwrap()
                .greater_than("dogs.age", black_box(13))
                .unwrap()
                .find_all()
                .unwrap();
            black_box(results.len())
        })
    });
}

criterion_group!(benches, bench_direct_field_scan, bench_to_many_scan);
criterion_main!(benches);
