//! Quadrangulation benchmarks.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use prism_graphics::computation::{BufferData, BufferSource};
use prism_graphics::mesh::quadrangulate::{QuadIndexBuilder, QuadInfoBuilder, QuadrangulateCpu};
use prism_graphics::mesh::MeshTopology;
use prism_graphics::scene::ScenePath;
use prism_graphics::types::ElementType;

/// 10k disjoint pentagons; every face needs quadrangulation.
fn pentagon_topology() -> Arc<MeshTopology> {
    const FACES: i32 = 10_000;
    Arc::new(MeshTopology::new(
        ScenePath::new("/bench/mesh"),
        vec![5; FACES as usize],
        (0..FACES * 5).collect(),
        (FACES * 5) as usize,
    ))
}

fn bench_quadrangulate(c: &mut Criterion) {
    let topology = pentagon_topology();
    let quad_info_builder = Arc::new(QuadInfoBuilder::new(
        Some(topology.clone()),
        topology.id().clone(),
    ));
    assert!(quad_info_builder.resolve());

    let positions: Vec<f32> = (0..topology.num_points() * 3)
        .map(|i| (i as f32 * 0.13).sin())
        .collect();
    let source = Arc::new(BufferData::new_f32(
        "points",
        ElementType::Float32Vec3,
        positions,
    ));

    c.bench_function("quadrangulate_cpu_10k_pentagons", |b| {
        b.iter(|| {
            let computation = QuadrangulateCpu::new(
                Some(topology.clone()),
                source.clone(),
                quad_info_builder.clone(),
                topology.id().clone(),
            );
            assert!(computation.resolve());
            black_box(computation.result())
        })
    });

    c.bench_function("quad_indices_10k_pentagons", |b| {
        b.iter(|| {
            let builder = QuadIndexBuilder::new(
                Some(topology.clone()),
                quad_info_builder.clone(),
                topology.id().clone(),
            );
            assert!(builder.resolve());
            black_box(builder.result())
        })
    });
}

criterion_group!(benches, bench_quadrangulate);
criterion_main!(benches);
