use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voxisle_core::constants::CHUNK_VOLUME;
use voxisle_core::ChunkPos;
use voxisle_world::{ChunkMesher, CloudLayer, TerrainGenerator, World, WorldConfig, WorldDims};

const SEED: u64 = 0x5eed;

fn bench_generation(c: &mut Criterion) {
    let dims = WorldDims::new(8, 2, 8);
    let generator = TerrainGenerator::with_seed(SEED, dims);
    let mut voxels = vec![0u8; CHUNK_VOLUME];

    let mut group = c.benchmark_group("generate_chunk");
    for pos in [ChunkPos::new(4, 0, 4), ChunkPos::new(4, 1, 4), ChunkPos::new(0, 0, 0)] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{pos:?}")), &pos, |b, &pos| {
            b.iter(|| generator.generate_chunk(black_box(pos), &mut voxels));
        });
    }
    group.finish();
}

fn bench_meshing(c: &mut Criterion) {
    let config = WorldConfig::default().with_seed(SEED).with_dims(4, 2, 4);
    let Ok(world) = World::new(config) else {
        return;
    };
    let mut mesher = ChunkMesher::new();

    c.bench_function("mesh_surface_chunk", |b| {
        b.iter(|| mesher.build(world.arena(), black_box(ChunkPos::new(2, 0, 2))));
    });
}

fn bench_world(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_build");
    group.sample_size(10);
    group.bench_function("4x2x4", |b| {
        b.iter(|| World::new(WorldConfig::default().with_seed(SEED).with_dims(4, 2, 4)));
    });
    group.finish();
}

fn bench_clouds(c: &mut Criterion) {
    let dims = WorldDims::new(8, 2, 8);
    let generator = TerrainGenerator::with_seed(SEED, dims);
    let layer = CloudLayer::generate(generator.noise(), dims);
    c.bench_function("cloud_mesh", |b| b.iter(|| black_box(&layer).build_mesh()));
}

criterion_group!(benches, bench_generation, bench_meshing, bench_world, bench_clouds);
criterion_main!(benches);
