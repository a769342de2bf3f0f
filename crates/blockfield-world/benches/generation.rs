use std::hint::black_box;
use std::sync::Arc;

use blockfield_core::ChunkCoord;
use blockfield_world::{Chunk, ChunkStreamer, NullScene, StreamingConfig, TerrainField};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_chunk_generation(c: &mut Criterion) {
    let field = TerrainField::with_seed(42);
    let mut group = c.benchmark_group("chunk_generate");
    for size in [8u32, 16, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| Chunk::generate(black_box(ChunkCoord::new(3, -7)), size, &field));
        });
    }
    group.finish();
}

fn bench_stream_step(c: &mut Criterion) {
    let terrain = Arc::new(TerrainField::with_seed(42));
    c.bench_function("stream_step_radius_4", |b| {
        let mut streamer = ChunkStreamer::new(StreamingConfig::default(), Arc::clone(&terrain));
        let mut scene = NullScene::new();
        let mut x = 0;
        b.iter(|| {
            x += 1;
            black_box(streamer.update(ChunkCoord::new(x, 0), &mut scene));
        });
    });
}

criterion_group!(benches, bench_chunk_generation, bench_stream_step);
criterion_main!(benches);
