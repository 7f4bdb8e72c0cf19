use criterion::{black_box, criterion_group, criterion_main, Criterion};
use populace_core::potential::PotentialField;
use populace_data::BlockPos;

fn grid_field(count: i32) -> PotentialField {
    let mut field = PotentialField::new();
    for i in 0..count {
        field.add_charge(BlockPos::new((i % 32) * 4, 64, (i / 32) * 4), 0.7);
    }
    field
}

fn bench_potential_build(c: &mut Criterion) {
    c.bench_function("potential_build_1000", |b| {
        b.iter(|| {
            let field = grid_field(1000);
            black_box(field)
        })
    });
}

fn bench_potential_delta(c: &mut Criterion) {
    let field = grid_field(1000);

    c.bench_function("potential_delta_1000", |b| {
        b.iter(|| {
            let delta = field.potential_delta(black_box(BlockPos::new(63, 65, 63)), 0.7);
            black_box(delta)
        })
    });
}

fn bench_potential_delta_small(c: &mut Criterion) {
    let field = grid_field(70);

    c.bench_function("potential_delta_70", |b| {
        b.iter(|| {
            let delta = field.potential_delta(black_box(BlockPos::new(10, 65, 10)), 0.15);
            black_box(delta)
        })
    });
}

criterion_group!(
    benches,
    bench_potential_build,
    bench_potential_delta,
    bench_potential_delta_small
);
criterion_main!(benches);
