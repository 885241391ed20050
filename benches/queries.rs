use std::ops::Range;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::prelude::*;
use rand::rngs::SmallRng;

use rusting_runs::{Intersection, RunContainer, Union};

const SEED0: u64 = 0x0304_0106_0308_0600;
const SEED1: u64 = 0x0905_0407_0608_0102;

/// Fill `range` and randomly remove values until `count` remain
fn generate_seeded_data(range: Range<u32>, count: usize, seed: u64) -> Vec<u16> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut result: Vec<u16> = range.map(|i| i as u16).collect();

    while result.len() > count {
        let index = rng.gen_range(0..result.len());
        result.swap_remove(index);
    }

    result.sort_unstable();
    result.dedup();

    result
}

fn build(data: &[u16]) -> RunContainer {
    let mut container = RunContainer::new();
    for value in data {
        container.add(*value).unwrap();
    }

    container
}

/// Dense data so most values collapse into long runs
fn setup() -> (RunContainer, RunContainer) {
    let data_a = generate_seeded_data(0..65_536, 60_000, SEED0);
    let data_b = generate_seeded_data(0..65_536, 60_000, SEED1);

    (build(&data_a), build(&data_b))
}

fn union(c: &mut Criterion) {
    let (a, b) = setup();
    let mut out = RunContainer::new();

    c.bench_function("union", move |bench| {
        bench.iter(|| a.union_with(black_box(&b), &mut out))
    });
}

fn intersection(c: &mut Criterion) {
    let (a, b) = setup();
    let mut out = RunContainer::new();

    c.bench_function("intersection", move |bench| {
        bench.iter(|| a.intersect_with(black_box(&b), &mut out))
    });
}

fn contains(c: &mut Criterion) {
    let (a, _b) = setup();

    c.bench_function("contains", move |bench| {
        bench.iter(|| (0..=u16::MAX).filter(|v| a.contains(black_box(*v))).count())
    });
}

fn cardinality(c: &mut Criterion) {
    let (a, _b) = setup();

    c.bench_function("cardinality", move |bench| {
        bench.iter(|| black_box(&a).cardinality())
    });
}

criterion_group!(benches, union, intersection, contains, cardinality);
criterion_main!(benches);
