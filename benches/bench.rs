use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use sudoku_solver::puzzle::grid::{EXAMPLE_NINE, EXAMPLE_SIXTEEN, Grid};
use sudoku_solver::solver::engine::Engine;

fn bench_solve_nine(c: &mut Criterion) {
    let engine = Engine::<u32>::new(9).unwrap();
    let puzzle: Grid = EXAMPLE_NINE.parse().unwrap();

    c.bench_function("solve_nine", |b| {
        b.iter(|| {
            let mut grid = black_box(&puzzle).clone();
            assert!(engine.solve(&mut grid));
            grid
        });
    });
}

fn bench_solve_sixteen_sparse(c: &mut Criterion) {
    let engine = Engine::<u32>::new(16).unwrap();
    let puzzle: Grid = EXAMPLE_SIXTEEN.parse().unwrap();

    let mut group = c.benchmark_group("sixteen");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("solve_sixteen_sparse", |b| {
        b.iter(|| {
            let mut grid = black_box(&puzzle).clone();
            assert!(engine.solve(&mut grid));
            grid
        });
    });
    group.finish();
}

fn bench_parse_nine(c: &mut Criterion) {
    c.bench_function("parse_nine", |b| {
        b.iter(|| black_box(EXAMPLE_NINE).parse::<Grid>().unwrap());
    });
}

fn bench_engine_construction(c: &mut Criterion) {
    c.bench_function("engine_new_twenty_five", |b| {
        b.iter(|| Engine::<u32>::new(black_box(25)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_solve_nine,
    bench_solve_sixteen_sparse,
    bench_parse_nine,
    bench_engine_construction
);
criterion_main!(benches);
