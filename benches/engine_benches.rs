use std::hint::black_box;

use avalanche::{
    prelude::*,
    search::{
        canonical::{NodeKey, canonical_key, clean},
        move_ordering::sort_moves,
    },
};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

const POSITIONS: &[(&str, &str)] = &[
    ("Start", START_PERCEPTS),
    (
        "Midgame",
        "0,0,2,0,0,0,0,0,0/0,-2,0,1,-1,0,0,0,0/0,-1,2,0,1,-1,1,0,0/0,1,0,3,-1,0,-2,1,-1/1,-1,1,0,0,-1,1,0,2/-1,0,-3,1,0,1,-1,1,0/0,0,1,0,1,-2,0,-1,0/0,0,0,0,-1,2,0,1,0/0,0,0,0,0,-1,1,0,0",
    ),
    (
        "Endgame",
        "0,0,5,0,0,0,0,0,0/0,-3,0,0,-4,0,0,0,0/0,0,0,2,0,0,1,0,0/0,1,0,0,0,-2,0,0,-1/0,0,0,0,0,0,3,0,0/-5,0,0,1,0,0,0,0,0/0,0,0,0,0,-1,0,2,0/0,0,0,0,0,0,0,0,0/0,0,0,0,0,0,-1,0,0",
    ),
];

fn boards() -> Vec<(&'static str, Board)> {
    POSITIONS
        .iter()
        .map(|(name, percepts)| {
            let board = Board::from_percepts(percepts).expect("Bench percepts are valid");
            (*name, board)
        })
        .collect()
}

fn bench_move_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("actions");
    for (name, board) in boards() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &board, |b, board| {
            b.iter(|| black_box(board.actions()))
        });
    }
    group.finish();
}

fn bench_canonicalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical");
    for (name, board) in boards() {
        group.bench_with_input(BenchmarkId::new("clean", name), &board, |b, board| {
            b.iter(|| black_box(clean(board)))
        });
        let cleaned = clean(&board).grid;
        group.bench_with_input(BenchmarkId::new("key", name), &cleaned, |b, grid| {
            b.iter(|| black_box(canonical_key(grid)))
        });
        group.bench_with_input(BenchmarkId::new("node_key", name), &board, |b, board| {
            b.iter(|| black_box(NodeKey::of(board)))
        });
    }
    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let eval = FrozenMaterial::default();
    let mut group = c.benchmark_group("evaluate");
    for (name, board) in boards() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &board, |b, board| {
            b.iter(|| black_box(eval.evaluate(board)))
        });
    }
    group.finish();
}

fn bench_move_ordering(c: &mut Criterion) {
    let board = Board::new();
    c.bench_function("sort_moves_start", |b| {
        b.iter_batched(
            || board.actions(),
            |mut moves| {
                sort_moves(&mut moves, Cell::new(4, 4));
                black_box(moves)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    for (name, board) in boards() {
        for depth in [1u16, 2] {
            group.bench_with_input(
                BenchmarkId::new(name, format!("depth_{depth}")),
                &board,
                |b, board| {
                    b.iter_batched(
                        || {
                            AlphaBetaSearch::with_config(
                                Box::new(FrozenMaterial::default()),
                                SearchConfig::fixed_depth(depth).with_seed(1),
                            )
                        },
                        |mut search| black_box(search.search_depth(board, depth)),
                        BatchSize::SmallInput,
                    )
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_move_generation,
    bench_canonicalization,
    bench_evaluation,
    bench_move_ordering,
    bench_search
);
criterion_main!(benches);
