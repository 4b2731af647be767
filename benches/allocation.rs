use blocksim::{AllocationStrategy, MAX_DISK_SIZE, Simulation, SimulationBuilder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn simulation(strategy: AllocationStrategy) -> Simulation {
    SimulationBuilder::new()
        .disk_size(MAX_DISK_SIZE)
        .strategy(strategy)
        .seed(42)
        .build()
        .unwrap()
}

/// Benchmark filling the largest disk with 4-block files
fn bench_fill_disk(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_disk");

    for strategy in AllocationStrategy::ALL {
        group.bench_function(strategy.as_str(), |b| {
            b.iter(|| {
                let mut sim = simulation(strategy);
                // Indexed files take 5 blocks, stop on the first failure
                for i in 0.. {
                    if sim.allocate(&format!("f{}", i), 4).is_err() {
                        break;
                    }
                }
                black_box(sim.store().count_free());
            });
        });
    }

    group.finish();
}

/// Benchmark allocation + delete cycles (fragmentation test)
fn bench_alloc_delete_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_delete_cycle");

    for strategy in AllocationStrategy::ALL {
        group.bench_function(strategy.as_str(), |b| {
            b.iter(|| {
                let mut sim = simulation(strategy);
                for i in 0..40 {
                    sim.allocate(&format!("f{}", i), 3).unwrap();
                }
                // Free every other file, then refill the holes
                for i in (0..40).step_by(2) {
                    sim.delete_file(&format!("f{}", i)).unwrap();
                }
                for i in 0..20 {
                    black_box(sim.allocate(&format!("g{}", i), 2).unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark a single allocation at different request sizes
fn bench_request_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_size");

    for strategy in AllocationStrategy::ALL {
        for k in [1usize, 16, 128] {
            group.bench_with_input(BenchmarkId::new(strategy.as_str(), k), &k, |b, &k| {
                b.iter(|| {
                    let mut sim = simulation(strategy);
                    black_box(sim.allocate("f", k).unwrap());
                });
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fill_disk,
    bench_alloc_delete_cycle,
    bench_request_size
);
criterion_main!(benches);
