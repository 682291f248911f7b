use criterion::{black_box, criterion_group, criterion_main, Criterion};

use molsynth::{analyze_structure, fingerprint, generate, ParticleType};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for mass in [3, 4, 5] {
        group.bench_function(format!("mass_{mass}"), |b| {
            b.iter(|| black_box(generate(None, black_box(mass)).unwrap()))
        });
    }
    group.bench_function("mass_4_pentagon", |b| {
        b.iter(|| black_box(generate(Some(ParticleType::Pentagon), black_box(4)).unwrap()))
    });
    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let molecules: Vec<_> = generate(None, 4)
        .unwrap()
        .molecules
        .into_iter()
        .map(|g| g.molecule)
        .collect();

    c.bench_function("analyze_mass_4_catalog", |b| {
        b.iter(|| {
            for mol in &molecules {
                black_box(analyze_structure(black_box(mol)));
            }
        })
    });
    c.bench_function("fingerprint_mass_4_catalog", |b| {
        b.iter(|| {
            for mol in &molecules {
                black_box(fingerprint(black_box(mol)));
            }
        })
    });
}

criterion_group!(benches, bench_generate, bench_analysis);
criterion_main!(benches);
