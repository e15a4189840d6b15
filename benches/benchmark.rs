use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avlmap::{AvlTreeMap, AvlTreeSet};

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("map_insert", |b| {
        let mut map = AvlTreeMap::new();
        b.iter(|| {
            for value in &values {
                map.insert(*value, *value);
            }
        })
    });

    let mut map = AvlTreeMap::new();
    for value in &values {
        map.insert(*value, *value);
    }

    c.bench_function("map_get", |b| {
        b.iter(|| {
            for value in &values {
                black_box(map.get(value));
            }
        })
    });

    c.bench_function("map_iter", |b| {
        b.iter(|| {
            for (k, v) in &map {
                black_box((k, v));
            }
        })
    });

    c.bench_function("map_for_each", |b| {
        b.iter(|| {
            map.for_each(|k, v| {
                black_box((k, v));
            })
        })
    });

    c.bench_function("map_remove", |b| {
        let mut map = map.clone();
        b.iter(|| {
            for value in &values {
                map.remove(value);
            }
        })
    });

    let lhs: AvlTreeSet<i32> = values.iter().step_by(2).copied().collect();
    let rhs: AvlTreeSet<i32> = values.iter().step_by(3).copied().collect();

    c.bench_function("set_union", |b| b.iter(|| black_box(lhs.union(&rhs))));
    c.bench_function("set_intersection", |b| b.iter(|| black_box(lhs.intersection(&rhs))));
    c.bench_function("set_difference", |b| b.iter(|| black_box(lhs.difference(&rhs))));
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
