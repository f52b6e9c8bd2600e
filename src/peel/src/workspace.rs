use std::ops::Range;

use ndarray::Array1;
use thiserror::Error;

/// A probability vector over genotype classes (canonically 10 entries for
/// diploid genotypes over a four-letter alphabet).
pub type GenotypeArray = Array1<f64>;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("workspace holds {found} {field} message(s) for {expected} node(s)")]
    MessageCountMismatch { field: &'static str, expected: usize, found: usize },

    #[error("founder node {0} carries a parental-pair message")]
    FounderWithAboveMessage(usize),

    #[error("non-founder node {0} is missing its parental-pair message")]
    MissingAboveMessage(usize),

    #[error("library span {span:?} exceeds the node count ({num_nodes})")]
    LibrarySpanOutOfBounds { span: Range<usize>, num_nodes: usize },
}

/// One fully-materialized set of peeling results for a single site, under a
/// single mutation model.
///
/// # Fields
/// - `num_nodes`      : number of pedigree nodes, shared with the relationship
///                      graph and every transition-matrix collection.
/// - `founder_span`   : the founder prefix of the node ordering
///                      (`0..first_nonfounder_index`).
/// - `library_span`   : the contiguous run of nodes carrying read-depth
///                      observations (genotype likelihoods exist only there).
/// - `upper`          : per-node backward message. `None` marks a message the
///                      engine never computes for that node (e.g. a terminal
///                      node with no downstream message).
/// - `lower`          : per-node forward message.
/// - `above`          : per-node distribution over the node's parental
///                      genotype pair(s). `None` for founders. Length is the
///                      squared genotype-class count for two-parent nodes and
///                      the plain count for single-parent nodes.
/// - `forward_result` : total log-likelihood of the data under the model that
///                      produced this workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub num_nodes: usize,
    pub founder_span: Range<usize>,
    pub library_span: Range<usize>,
    pub upper: Vec<Option<GenotypeArray>>,
    pub lower: Vec<GenotypeArray>,
    pub above: Vec<Option<GenotypeArray>>,
    pub forward_result: f64,
}

impl Workspace {
    /// Allocate a workspace skeleton: forward messages initialized to ones,
    /// backward and parental-pair messages absent, log-likelihood zero.
    /// The peeling engine overwrites these in place before any statistics
    /// method reads them.
    pub fn new(
        num_nodes: usize,
        first_nonfounder: usize,
        library_span: Range<usize>,
        genotype_count: usize,
    ) -> Self {
        Self {
            num_nodes,
            founder_span: 0..first_nonfounder,
            library_span,
            upper: vec![None; num_nodes],
            lower: vec![GenotypeArray::ones(genotype_count); num_nodes],
            above: vec![None; num_nodes],
            forward_result: 0.0,
        }
    }

    /// Index of the first non-founder node.
    pub fn first_nonfounder_index(&self) -> usize {
        self.founder_span.end
    }

    /// Check that the workspace is structurally consistent: one message slot
    /// per node, parental-pair messages present exactly on non-founders, and
    /// a library span within bounds.
    ///
    /// # Errors
    /// - on the first structural inconsistency found.
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        for (field, found) in [
            ("backward", self.upper.len()),
            ("forward", self.lower.len()),
            ("parental-pair", self.above.len()),
        ] {
            if found != self.num_nodes {
                return Err(WorkspaceError::MessageCountMismatch {
                    field,
                    expected: self.num_nodes,
                    found,
                });
            }
        }
        for (node, above) in self.above.iter().enumerate() {
            let is_founder = self.founder_span.contains(&node);
            match (is_founder, above) {
                (true, Some(_)) => return Err(WorkspaceError::FounderWithAboveMessage(node)),
                (false, None) => return Err(WorkspaceError::MissingAboveMessage(node)),
                _ => (),
            }
        }
        if self.library_span.end > self.num_nodes {
            return Err(WorkspaceError::LibrarySpanOutOfBounds {
                span: self.library_span.clone(),
                num_nodes: self.num_nodes,
            });
        }
        Ok(())
    }
}
