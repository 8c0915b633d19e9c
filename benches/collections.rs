//! Benchmarks for spark-observables
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spark_observables::{ObservableBag, ObservableList, ObservableMap};

// =============================================================================
// PUBLISH BENCHMARKS
// =============================================================================

fn bench_insert_without_subscribers(c: &mut Criterion) {
    c.bench_function("bag_insert_no_subscribers", |b| {
        b.iter(|| {
            let mut bag: ObservableBag<u32> = ObservableBag::new();
            for i in 0..100 {
                bag.insert(black_box(i));
            }
            bag
        })
    });
}

fn bench_publish_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_push_fan_out");

    for subscribers in [1usize, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &subscribers| {
                let mut list: ObservableList<u32> = ObservableList::new();
                let subscriptions: Vec<_> = (0..subscribers)
                    .map(|_| list.subscribe(|op| {
                        black_box(op);
                    }))
                    .collect();
                b.iter(|| {
                    list.push(black_box(1));
                });
                drop(subscriptions);
            },
        );
    }

    group.finish();
}

// =============================================================================
// LIST BULK BENCHMARKS
// =============================================================================

fn bench_list_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_bulk");

    for size in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("retain_half", size), &size, |b, &size| {
            b.iter(|| {
                let mut list: ObservableList<u32> = ObservableList::from_iter(0..size);
                let mut changes = list.changes();
                list.retain(|x| x % 2 == 0);
                black_box(changes.drain().len())
            })
        });

        group.bench_with_input(BenchmarkId::new("sub_list_clear", size), &size, |b, &size| {
            b.iter(|| {
                let mut list: ObservableList<u32> = ObservableList::from_iter(0..size);
                let mut changes = list.list_changes();
                let quarter = size as usize / 4;
                if let Ok(mut window) = list.sub_list(quarter, quarter * 3) {
                    window.clear();
                }
                black_box(changes.drain().len())
            })
        });
    }

    group.finish();
}

// =============================================================================
// MAP BENCHMARKS
// =============================================================================

fn bench_map_insert_all(c: &mut Criterion) {
    c.bench_function("map_insert_all_1000", |b| {
        b.iter(|| {
            let mut map: ObservableMap<u32, u32> = ObservableMap::new();
            let mut changes = map.changes();
            map.insert_all((0..1_000).map(|i| (i % 500, i)));
            black_box(changes.drain().len())
        })
    });
}

criterion_group!(
    benches,
    bench_insert_without_subscribers,
    bench_publish_fan_out,
    bench_list_bulk,
    bench_map_insert_all,
);
criterion_main!(benches);
