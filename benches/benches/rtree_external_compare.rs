// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_aabb_tree::{Aabb2D, AabbTree, AabbTreeF64};

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

type Tagged = GeomWithData<Rectangle<[f64; 2]>, u32>;

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::<f64>::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

fn to_rstar(r: &Aabb2D<f64>, id: u32) -> Tagged {
    GeomWithData::new(
        Rectangle::from_corners([r.min_x, r.min_y], [r.max_x, r.max_y]),
        id,
    )
}

fn build_tree(rects: &[Aabb2D<f64>]) -> AabbTreeF64<u32> {
    let mut tree = AabbTree::new();
    for (i, r) in rects.iter().enumerate() {
        let _ = tree.insert(i as u32, *r);
    }
    tree
}

fn bench_build_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare_f64");
    for &n in &[64usize, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let aabb_query = Aabb2D::<f64>::from_xywh(100.0, 100.0, 400.0, 400.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("understory_build_query_n{}", n), |b| {
            b.iter_batched(
                || (),
                |()| {
                    let tree = build_tree(&rects);
                    black_box(tree.query_rect(aabb_query).len());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_incremental_n{}", n), |b| {
            b.iter_batched(
                || (),
                |()| {
                    let mut tree = RTree::new();
                    for (i, r) in rects.iter().enumerate() {
                        tree.insert(to_rstar(r, i as u32));
                    }
                    let aabb = AABB::from_corners(
                        [aabb_query.min_x, aabb_query.min_y],
                        [aabb_query.max_x, aabb_query.max_y],
                    );
                    black_box(tree.locate_in_envelope_intersecting(&aabb).count());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || {
                    rects
                        .iter()
                        .enumerate()
                        .map(|(i, r)| to_rstar(r, i as u32))
                        .collect::<Vec<_>>()
                },
                |entries| {
                    let tree = RTree::bulk_load(entries);
                    let aabb = AABB::from_corners(
                        [aabb_query.min_x, aabb_query.min_y],
                        [aabb_query.max_x, aabb_query.max_y],
                    );
                    black_box(tree.locate_in_envelope_intersecting(&aabb).count());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_move_all(c: &mut Criterion) {
    // Dynamic workload: every object shifts once, then one window query.
    let mut group = c.benchmark_group("rtree_external_compare_move_f64");
    let n = 64usize;
    let rects = gen_grid_rects(n, 10.0);
    let shifted: Vec<_> = rects
        .iter()
        .map(|r| Aabb2D::new(r.min_x + 3.0, r.min_y + 1.0, r.max_x + 3.0, r.max_y + 1.0))
        .collect();
    let window = Aabb2D::<f64>::from_xywh(200.0, 200.0, 100.0, 100.0);
    group.throughput(Throughput::Elements((n * n) as u64));

    group.bench_function("understory_update_n64", |b| {
        b.iter_batched(
            || build_tree(&rects),
            |mut tree| {
                for (i, r) in shifted.iter().enumerate() {
                    let _ = tree.update(&(i as u32), *r);
                }
                black_box(tree.query_rect(window).len());
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function("rstar_remove_insert_n64", |b| {
        b.iter_batched(
            || {
                let entries: Vec<_> = rects
                    .iter()
                    .enumerate()
                    .map(|(i, r)| to_rstar(r, i as u32))
                    .collect();
                RTree::bulk_load(entries)
            },
            |mut tree| {
                for (i, (old, new)) in rects.iter().zip(&shifted).enumerate() {
                    let _ = tree.remove(&to_rstar(old, i as u32));
                    tree.insert(to_rstar(new, i as u32));
                }
                let aabb = AABB::from_corners(
                    [window.min_x, window.min_y],
                    [window.max_x, window.max_y],
                );
                black_box(tree.locate_in_envelope_intersecting(&aabb).count());
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_build_query, bench_move_all);
criterion_main!(benches);
