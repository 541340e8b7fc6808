// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad phase for moving circles.
//!
//! Circles drift inside a square arena. Each step refreshes their boxes in a fattened
//! tree, collects candidate pairs, and confirms them with an exact circle test.
//!
//! Run:
//! - `cargo run -p understory_demos --example aabb_tree_broad_phase`

use kurbo::{Circle, Point, Rect, Vec2};
use understory_aabb_tree::{Aabb2D, AabbTreeF64, HasAabb, TreeConfig};

const ARENA: f64 = 400.0;
const STEPS: usize = 60;

struct Body {
    circle: Circle,
    velocity: Vec2,
}

fn spawn(count: usize) -> Vec<Body> {
    // Deterministic scatter; no RNG needed for a demo.
    (0..count)
        .map(|i| {
            let t = i as f64;
            let center = Point::new((t * 37.0) % ARENA, (t * 91.0) % ARENA);
            let velocity = Vec2::new(((t * 13.0) % 7.0) - 3.0, ((t * 29.0) % 5.0) - 2.0);
            Body {
                circle: Circle::new(center, 4.0 + (t % 5.0)),
                velocity,
            }
        })
        .collect()
}

fn step(body: &mut Body) {
    let mut c = body.circle.center + body.velocity;
    if !(0.0..=ARENA).contains(&c.x) {
        body.velocity.x = -body.velocity.x;
        c.x = c.x.clamp(0.0, ARENA);
    }
    if !(0.0..=ARENA).contains(&c.y) {
        body.velocity.y = -body.velocity.y;
        c.y = c.y.clamp(0.0, ARENA);
    }
    body.circle.center = c;
}

fn main() {
    env_logger::init();

    let mut bodies = spawn(300);
    let config = TreeConfig::default()
        .with_margin(3.0)
        .with_initial_capacity(2 * bodies.len());
    let mut tree: AabbTreeF64<usize> = AabbTreeF64::with_config(config).unwrap();
    for (id, body) in bodies.iter().enumerate() {
        tree.insert(id, body.circle.aabb()).unwrap();
    }

    let mut total_candidates = 0;
    let mut total_contacts = 0;
    for frame in 0..STEPS {
        for (id, body) in bodies.iter_mut().enumerate() {
            step(body);
            tree.update(&id, body.circle.aabb()).unwrap();
        }

        let candidates = tree.overlapping_pairs();
        let contacts = candidates
            .iter()
            .filter(|(a, b)| {
                let (ca, cb) = (bodies[*a].circle, bodies[*b].circle);
                ca.center.distance(cb.center) <= ca.radius + cb.radius
            })
            .count();
        total_candidates += candidates.len();
        total_contacts += contacts;
        if frame % 10 == 0 {
            log::info!(
                "frame {frame}: {} candidates, {contacts} contacts, height {}",
                candidates.len(),
                tree.height()
            );
        }
    }

    let view = Rect::new(100.0, 100.0, 200.0, 200.0);
    let visible = tree.query_rect(Aabb2D::from(view));
    println!("{} bodies intersect the view {view:?}", visible.len());
    println!(
        "{STEPS} frames: {total_candidates} candidate pairs, {total_contacts} contacts, {} nodes",
        tree.allocated_nodes()
    );
    tree.validate().unwrap();
}
