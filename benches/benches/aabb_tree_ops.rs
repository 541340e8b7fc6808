// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_aabb_tree::{Aabb2D, AabbTree, AabbTreeF64, TreeConfig};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::<f64>::from_xywh(x0, y0, cell * 0.9, cell * 0.9));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, extent: f64, max_side: f64, seed: u64) -> Vec<Aabb2D<f64>> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let x = rng.next_f64() * extent;
            let y = rng.next_f64() * extent;
            let w = 1.0 + rng.next_f64() * max_side;
            let h = 1.0 + rng.next_f64() * max_side;
            Aabb2D::<f64>::from_xywh(x, y, w, h)
        })
        .collect()
}

fn build(rects: &[Aabb2D<f64>], config: TreeConfig<f64>) -> AabbTreeF64<u32> {
    let mut tree = AabbTree::with_config(config).unwrap();
    for (i, r) in rects.iter().enumerate() {
        tree.insert(i as u32, *r).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("aabb_tree_insert");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || (),
                |()| black_box(build(&rects, TreeConfig::default())),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("grid_reserved_n{}", n), |b| {
            b.iter_batched(
                || (),
                |()| {
                    let config = TreeConfig::default().with_initial_capacity(2 * n * n);
                    black_box(build(&rects, config))
                },
                BatchSize::SmallInput,
            )
        });
    }

    let rects = gen_random_rects(10_000, 2_000.0, 30.0, 0xA11CE);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("random_10k", |b| {
        b.iter_batched(
            || (),
            |()| black_box(build(&rects, TreeConfig::default())),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("aabb_tree_update");
    let rects = gen_random_rects(4_096, 1_000.0, 20.0, 0xBEEF);
    group.throughput(Throughput::Elements(rects.len() as u64));

    for &margin in &[0.0, 2.0, 8.0] {
        group.bench_function(format!("jitter_margin{}", margin), |b| {
            b.iter_batched(
                || {
                    let config = TreeConfig::default().with_margin(margin);
                    (build(&rects, config), Rng::new(99))
                },
                |(mut tree, mut rng)| {
                    for (i, r) in rects.iter().enumerate() {
                        let dx = rng.next_f64() * 2.0 - 1.0;
                        let dy = rng.next_f64() * 2.0 - 1.0;
                        let moved = Aabb2D::new(r.min_x + dx, r.min_y + dy, r.max_x + dx, r.max_y + dy);
                        let _ = tree.update(&(i as u32), moved);
                    }
                    black_box(tree.height());
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("aabb_tree_query");
    let rects = gen_grid_rects(128, 10.0);
    let tree = build(&rects, TreeConfig::default());

    group.bench_function("query_overlaps_all_n128", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for i in 0..rects.len() as u32 {
                hits += tree.query_overlaps(&i).len();
            }
            black_box(hits)
        })
    });

    let window = Aabb2D::<f64>::from_xywh(300.0, 300.0, 200.0, 200.0);
    group.bench_function("query_rect_window_n128", |b| {
        b.iter(|| black_box(tree.query_rect(black_box(window)).len()))
    });

    group.bench_function("query_point_n128", |b| {
        b.iter(|| black_box(tree.query_point(black_box(642.0), black_box(517.0)).len()))
    });

    let random = build(&gen_random_rects(8_192, 1_500.0, 25.0, 0xC0FFEE), TreeConfig::default());
    group.bench_function("overlapping_pairs_random_8k", |b| {
        b.iter(|| black_box(random.overlapping_pairs().len()))
    });
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("aabb_tree_remove");
    let rects = gen_random_rects(8_192, 1_500.0, 25.0, 0xD00D);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("remove_all_random_8k", |b| {
        b.iter_batched(
            || build(&rects, TreeConfig::default()),
            |mut tree| {
                for i in 0..rects.len() as u32 {
                    let _ = tree.remove(&i);
                }
                black_box(tree.free_nodes())
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_query, bench_remove);
criterion_main!(benches);
