// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! AABB tree basics.
//!
//! Insert a few boxes, query overlaps, move one, and remove one.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example aabb_tree_basics`

use understory_aabb_tree::{Aabb2D, AabbTree, TreeConfig, TreeError};

fn main() {
    env_logger::init();

    // A small initial capacity so the arena growth shows up in the debug log.
    let config = TreeConfig::default().with_initial_capacity(2).with_growth(4);
    let mut tree: AabbTree<&str, f64> = AabbTree::with_config(config).unwrap();

    tree.insert("a", Aabb2D::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    tree.insert("b", Aabb2D::new(5.0, 5.0, 15.0, 15.0)).unwrap();
    tree.insert("c", Aabb2D::new(100.0, 100.0, 110.0, 110.0)).unwrap();
    println!("{tree:?}");
    println!("a overlaps {:?}", tree.query_overlaps(&"a"));
    println!("c overlaps {:?}", tree.query_overlaps(&"c"));

    // Move C onto A.
    tree.update(&"c", Aabb2D::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    let mut hits = tree.query_overlaps(&"a");
    hits.sort();
    println!("after moving c, a overlaps {hits:?}");

    // Touching edges count as overlap.
    tree.insert("d", Aabb2D::new(15.0, 0.0, 20.0, 5.0)).unwrap();
    println!("d overlaps {:?}", tree.query_overlaps(&"d"));

    println!("point (7, 7) hits {:?}", {
        let mut v = tree.query_point(7.0, 7.0);
        v.sort();
        v
    });

    assert!(tree.remove(&"b"));
    assert!(!tree.remove(&"b"), "second remove is a no-op");
    println!("after removing b, a overlaps {:?}", tree.query_overlaps(&"a"));

    // Bad input is rejected rather than poisoning the tree.
    match tree.insert("nan", Aabb2D::new(f64::NAN, 0.0, 1.0, 1.0)) {
        Err(TreeError::InvalidAabb) => println!("NaN box rejected"),
        other => println!("unexpected: {other:?}"),
    }
    match tree.insert("a", Aabb2D::new(0.0, 0.0, 1.0, 1.0)) {
        Err(e) => println!("duplicate insert: {e}"),
        Ok(()) => println!("unexpected: duplicate accepted"),
    }

    tree.validate().unwrap();
    println!(
        "len={} height={} nodes={}/{}",
        tree.len(),
        tree.height(),
        tree.allocated_nodes(),
        tree.node_capacity()
    );
}
