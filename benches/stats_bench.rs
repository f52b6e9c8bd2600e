use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ndarray::{Array1, Array2};

use dnms_rs::MutationStats;
use pedigree::genotype::GENOTYPE_COUNT;
use peel::{founder_matrix, TransitionMatrixVector, Workspace};

const NUM_NODES: usize = 20;
const FIRST_NONFOUNDER: usize = 5;

/// A dense 20-node workspace: smooth, fully-populated messages so the
/// benches exercise the full arithmetic rather than sparse shortcuts.
fn dense_workspace() -> Workspace {
    let g = GENOTYPE_COUNT;
    let mut work = Workspace::new(NUM_NODES, FIRST_NONFOUNDER, 0..NUM_NODES, g);
    work.forward_result = -2.0;
    for node in 0..NUM_NODES {
        work.lower[node] = Array1::from_iter((0..g).map(|i| 1.0 / (i + node + 1) as f64));
        work.upper[node] = Some(Array1::from_iter((0..g).map(|i| (i + 1) as f64 / g as f64)));
        if node >= FIRST_NONFOUNDER {
            work.above[node] =
                Some(Array1::from_iter((0..g * g).map(|i| 1.0 / (i + 1) as f64)));
        }
    }
    work
}

fn dense_matrices() -> TransitionMatrixVector {
    let g = GENOTYPE_COUNT;
    (0..NUM_NODES)
        .map(|node| {
            if node < FIRST_NONFOUNDER {
                founder_matrix()
            } else {
                Array2::from_shape_fn((g * g, g), |(row, col)| {
                    1e-8 / ((row + col + node) as f64 + 1.0)
                })
            }
        })
        .collect()
}

fn bench_posterior_probabilities(c: &mut Criterion) {
    let work = dense_workspace();
    c.bench_function("set_posterior_probabilities/20-nodes", |b| {
        b.iter(|| {
            let mut stats = MutationStats::new(0.01);
            stats.set_posterior_probabilities(black_box(&work));
            stats
        })
    });
}

fn bench_node_mutation(c: &mut Criterion) {
    let work = dense_workspace();
    let matrices = dense_matrices();
    c.bench_function("calculate_node_mutation/20-nodes", |b| {
        b.iter(|| {
            let mut stats = MutationStats::new(0.01);
            stats.calculate_node_mutation(black_box(&work), black_box(&matrices));
            stats
        })
    });
}

criterion_group!(benches, bench_posterior_probabilities, bench_node_mutation);
criterion_main!(benches);
