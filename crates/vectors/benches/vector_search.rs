//! Benchmarks for vectorization and nearest-neighbour search
//!
//! Run with: cargo bench --package vectors
//!
//! Uses a seeded synthetic catalog so runs are comparable.

use catalog::{Item, PreferenceSnapshot};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vectors::{CosineSimilarity, FeatureVectorFactory, NearestNeighborRanker, SimilarityMetric};

const BRANDS: &[&str] = &["Audi", "BMW", "Volkswagen", "Toyota", "Kia", "Volvo", "Peugeot"];
const FUELS: &[&str] = &["Petrol", "Diesel", "Hybrid", "Electric"];
const GEARBOXES: &[&str] = &["Manual", "Automatic"];
const BODIES: &[&str] = &["Sedan", "Hatchback", "SUV", "Station"];

fn synthetic_catalog(n: u32) -> Vec<Item> {
    let mut rng = StdRng::seed_from_u64(7);
    (1..=n)
        .map(|id| Item {
            id,
            brand: BRANDS[rng.random_range(0..BRANDS.len())].to_string(),
            model: format!("Model {}", id % 40),
            power: rng.random_range(50..300),
            fuel: FUELS[rng.random_range(0..FUELS.len())].to_string(),
            price: rng.random_range(5_000.0..80_000.0),
            year: rng.random_range(2005..2025),
            transmission: GEARBOXES[rng.random_range(0..GEARBOXES.len())].to_string(),
            body_type: BODIES[rng.random_range(0..BODIES.len())].to_string(),
        })
        .collect()
}

fn bench_create_vectors(c: &mut Criterion) {
    let catalog = synthetic_catalog(5_000);
    let factory = FeatureVectorFactory::from_catalog(&catalog);
    let items: Vec<&Item> = catalog.iter().collect();

    c.bench_function("create_vectors_5k", |b| {
        b.iter(|| {
            let vectors = factory.create_vectors(black_box(&items)).unwrap();
            black_box(vectors)
        })
    });
}

fn bench_knn_search(c: &mut Criterion) {
    let catalog = synthetic_catalog(5_000);
    let factory = FeatureVectorFactory::from_catalog(&catalog);
    let ranker = NearestNeighborRanker::new(&factory);
    let items: Vec<&Item> = catalog.iter().collect();
    let target = &catalog[0];

    c.bench_function("knn_k10_5k", |b| {
        b.iter(|| {
            let neighbors = ranker
                .find_nearest_neighbors(black_box(target), black_box(&items), 10)
                .unwrap();
            black_box(neighbors)
        })
    });
}

fn bench_cosine_against_ideal(c: &mut Criterion) {
    let catalog = synthetic_catalog(5_000);
    let factory = FeatureVectorFactory::from_catalog(&catalog);
    let items: Vec<&Item> = catalog.iter().collect();
    let prefs = PreferenceSnapshot::new()
        .with_max_budget(30_000.0)
        .with_fuel("Hybrid")
        .with_body_type("SUV");
    let ideal = factory.create_ideal_vector(&prefs, &items).unwrap();
    let vectors = factory.create_vectors(&items).unwrap();

    c.bench_function("cosine_vs_ideal_5k", |b| {
        b.iter(|| {
            let total: f64 = vectors
                .iter()
                .map(|v| CosineSimilarity.similarity(black_box(v), &ideal).unwrap())
                .sum();
            black_box(total)
        })
    });
}

criterion_group!(
    benches,
    bench_create_vectors,
    bench_knn_search,
    bench_cosine_against_ideal
);
criterion_main!(benches);
