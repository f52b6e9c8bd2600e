//! Interface types produced by the external peeling (message-passing)
//! engine and consumed by the statistics component.
//!
//! The engine itself lives outside this repository: it is responsible for
//! computing, per pedigree node, the forward and backward probability
//! messages over genotype classes, and the total log-likelihood of the
//! observed data under a given mutation model. This crate only pins down
//! the shape of those results.

mod workspace;
pub use workspace::{GenotypeArray, Workspace, WorkspaceError};

mod transition;
pub use transition::{founder_matrix, TransitionMatrix, TransitionMatrixVector};
