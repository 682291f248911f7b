use criterion::{black_box, criterion_group, criterion_main, Criterion};

use molsynth::{from_notation, layout, rebond, synthesize};

fn bench_synthesize(c: &mut Criterion) {
    let chain = from_notation("C+ Q- C+; 0-1 1-2").unwrap();
    let bent = from_notation("Q- T+ C-; 0-1:2 1-2").unwrap();
    let split_a = from_notation("C+ Q- C+ T-; 0-1 1-2").unwrap();
    let split_b = from_notation("T+ C+ Q- C+; 1-2 2-3").unwrap();
    let stuck_a = from_notation("C+ Q-; 0-1").unwrap();
    let stuck_b = from_notation("C- T+").unwrap();

    let mut group = c.benchmark_group("synthesize");
    group.bench_function("single_product", |b| {
        b.iter(|| black_box(synthesize(black_box(&chain), black_box(&bent))))
    });
    group.bench_function("split_products", |b| {
        b.iter(|| black_box(synthesize(black_box(&split_a), black_box(&split_b))))
    });
    group.bench_function("cannot_rebond", |b| {
        b.iter(|| black_box(synthesize(black_box(&stuck_a), black_box(&stuck_b))))
    });
    group.finish();
}

fn bench_rebond(c: &mut Criterion) {
    let loose = from_notation("P+ T- T- Q- C- C-").unwrap();

    c.bench_function("rebond_six_loose", |b| {
        b.iter(|| black_box(rebond(black_box(&loose))))
    });
}

fn bench_layout(c: &mut Criterion) {
    let ring = from_notation("P+ Q+ T- T-; 0-2:2 0-3:2 1-2 1-3").unwrap();
    let star = from_notation("T+ C- C- C-; 0-1 0-2 0-3").unwrap();

    let mut group = c.benchmark_group("layout");
    group.bench_function("ring", |b| {
        b.iter(|| {
            let mut mol = ring.clone();
            layout(&mut mol);
            black_box(mol)
        })
    });
    group.bench_function("star", |b| {
        b.iter(|| {
            let mut mol = star.clone();
            layout(&mut mol);
            black_box(mol)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_synthesize, bench_rebond, bench_layout);
criterion_main!(benches);
