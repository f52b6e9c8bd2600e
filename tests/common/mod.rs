//! Shared trio fixture for the end-to-end statistics scenarios: two founder
//! parents, one germline child, with hand-filled peeling messages so every
//! derived statistic has a closed-form expectation.

use ndarray::{Array1, Array2};

use pedigree::genotype::GENOTYPE_COUNT;
use pedigree::{Node, RelationshipGraph};
use peel::{founder_matrix, TransitionMatrixVector, Workspace};

pub const LN_NOMUT: f64 = -2.5;
pub const LN_FULL: f64 = -2.0;

pub fn trio_graph() -> RelationshipGraph {
    RelationshipGraph::new(vec![
        Node::founder("dad"),
        Node::founder("mom"),
        Node::germline("child", 0, 1),
    ])
    .expect("valid trio graph")
}

/// A trio workspace under a given model log-likelihood. Parents carry flat
/// forward messages and informative backward messages; the child carries a
/// point-mass parental-pair message on (AA, AA) and a forward message
/// favoring AC, with no backward message (terminal node).
pub fn trio_workspace(forward_result: f64) -> Workspace {
    let g = GENOTYPE_COUNT;
    let mut work = Workspace::new(3, 2, 0..3, g);
    work.forward_result = forward_result;

    for parent in 0..2 {
        work.upper[parent] = Some(Array1::from_iter((0..g).map(|i| 1.0 / (i + 1) as f64)));
        work.lower[parent] = Array1::from_iter((0..g).map(|i| (i + 1) as f64 / 10.0));
    }

    let mut above = Array1::zeros(g * g);
    above[0] = 1.0;
    work.above[2] = Some(above);

    let mut lower = Array1::zeros(g);
    lower[1] = 1.0;
    work.lower[2] = lower;

    work.validate().expect("structurally consistent fixture");
    work
}

/// One-mutation transition matrices with a single reachable child cell:
/// parental pair (AA, AA) to offspring AC, with weight `w`.
pub fn single_cell_matrices(w: f64) -> TransitionMatrixVector {
    let g = GENOTYPE_COUNT;
    let mut onemut = Array2::zeros((g * g, g));
    onemut[[0, 1]] = w;
    vec![founder_matrix(), founder_matrix(), onemut]
}
