//! Flow-field generation benchmarks: open ground and a maze-like map.

use criterion::{criterion_group, criterion_main, Criterion};
use drover_core::{Cell, MapVersion, MoveClass};
use drover_field::{build_escape_field, plan_flow_field, FlowTarget};
use drover_grid::ObstacleMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SIZE: u32 = 64;

fn open_map() -> ObstacleMap {
    ObstacleMap::new(SIZE, SIZE, MoveClass::Ground, MapVersion(1)).unwrap()
}

fn maze_map() -> ObstacleMap {
    // Seeded scatter plus corridor walls; roughly a quarter blocked.
    let mut rng = ChaCha8Rng::seed_from_u64(0xD20_5EED);
    ObstacleMap::from_fn(SIZE, SIZE, MoveClass::Ground, MapVersion(1), |c| {
        if c == Cell::new(1, 1) {
            return false; // keep the bench target open
        }
        let wall = c.x % 8 == 4 && c.y % 11 != 0;
        wall || rng.random_bool(0.1)
    })
    .unwrap()
}

fn bench_plan_flow(c: &mut Criterion) {
    let open = open_map();
    let maze = maze_map();
    let target = FlowTarget::Cell(Cell::new(1, 1));

    c.bench_function("plan_flow_open_64", |b| {
        b.iter(|| plan_flow_field(&open, &target).unwrap())
    });
    c.bench_function("plan_flow_maze_64", |b| {
        b.iter(|| plan_flow_field(&maze, &target).unwrap())
    });
}

fn bench_escape(c: &mut Criterion) {
    let maze = maze_map();
    c.bench_function("build_escape_maze_64", |b| b.iter(|| build_escape_field(&maze)));
}

criterion_group!(benches, bench_plan_flow, bench_escape);
criterion_main!(benches);
