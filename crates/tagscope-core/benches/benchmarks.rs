use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tagscope_core::{HandlerKind, PlanCache, VariableDescriptor, VariableScope, compute_plan};

fn generate_descriptors(count: usize) -> Vec<VariableDescriptor> {
    (0..count)
        .map(|i| {
            let scope = VariableScope::ALL[i % VariableScope::ALL.len()];
            VariableDescriptor::new(format!("var{}", i), "java.lang.Object", i % 2 == 0, scope)
                .expect("generated descriptor is valid")
        })
        .collect()
}

fn bench_compute_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_plan");

    for count in [1usize, 8, 64] {
        let descriptors = generate_descriptors(count);
        group.throughput(Throughput::Elements(count as u64));

        for kind in HandlerKind::ALL {
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), count),
                &descriptors,
                |b, descriptors| b.iter(|| compute_plan(black_box(descriptors), kind)),
            );
        }
    }

    group.finish();
}

fn bench_plan_cache(c: &mut Criterion) {
    let descriptors = generate_descriptors(8);
    let cache = PlanCache::new();

    c.bench_function("plan_cache_hit", |b| {
        b.iter(|| cache.get_or_compute(black_box(&descriptors), HandlerKind::BodyBuffering))
    });
}

criterion_group!(benches, bench_compute_plan, bench_plan_cache);
criterion_main!(benches);
