//! Pedigree-side interfaces consumed by the statistics engine:
//! the relationship graph (node ordering, founder partition, labels) and
//! the diploid genotype alphabet over the four-letter base set.

pub mod genotype;

mod graph;
pub use graph::{GraphError, Node, NodeKind, RelationshipGraph};
