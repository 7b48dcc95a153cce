use criterion::{criterion_group, criterion_main};

use rand::Rng;
use roam_terrain::{Config, Heightmap, Landscape, Vec3};

fn random_heightmap(map_size: u32) -> Heightmap {
    let mut rng = rand::thread_rng();
    let mut bytes = vec![0u8; (map_size * map_size) as usize];
    for b in bytes.iter_mut() {
        *b = rng.gen();
    }
    Heightmap::from_bytes(&bytes, map_size).expect("synthetic heightmap to load")
}

fn criterion_benchmark(c: &mut criterion::Criterion) {
    let config = Config {
        map_size: 512,
        patches_per_side: 8,
        variance_depth: 9,
        max_tris: 20_000,
        wanted_tris: 10_000,
        variance_tolerance: 2.0,
        tri_node_pool: 40_000,
    };
    let heightmap = random_heightmap(config.map_size);
    let mut landscape = Landscape::new(config, heightmap).expect("valid configuration");
    landscape.set_camera(Vec3::new(256.0, 400.0, 256.0), Vec3::new(0.0, -1.0, 0.3));

    c.bench_function("landscape reset", |b| {
        b.iter(|| landscape.reset());
    });

    c.bench_function("landscape tessellate", |b| {
        b.iter(|| {
            landscape.reset();
            landscape.tessellate();
        });
    });

    c.bench_function("landscape full frame", |b| {
        b.iter(|| {
            landscape.reset();
            landscape.tessellate();
            landscape.render();
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
