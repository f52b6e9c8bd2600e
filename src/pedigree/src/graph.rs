use log::debug;
use thiserror::Error;

/// Position of a node within the pedigree topology.
///
/// Nodes are stored in a canonical order: all founders first, then every
/// non-founder, each preceded by its parent(s). The statistics engine relies
/// on this ordering for its founder-prefix sentinel handling and for the
/// determinism of the de novo localization scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An individual with no modeled parents. Mutation attribution is not
    /// defined for founders.
    Founder,
    /// An individual inheriting from two modeled parents.
    Germline { dad: usize, mom: usize },
    /// A node inheriting from a single parent node (e.g. a sequencing
    /// library attached to an individual).
    Somatic { parent: usize },
}

impl NodeKind {
    pub fn is_founder(&self) -> bool {
        matches!(self, NodeKind::Founder)
    }
}

/// A single pedigree node: its display label and its topological kind.
#[derive(Debug, Clone)]
pub struct Node {
    pub label: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn founder(label: &str) -> Self {
        Self { label: label.to_owned(), kind: NodeKind::Founder }
    }

    pub fn germline(label: &str, dad: usize, mom: usize) -> Self {
        Self { label: label.to_owned(), kind: NodeKind::Germline { dad, mom } }
    }

    pub fn somatic(label: &str, parent: usize) -> Self {
        Self { label: label.to_owned(), kind: NodeKind::Somatic { parent } }
    }
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("founder node {0} appears after the first non-founder node")]
    FounderAfterNonFounder(usize),

    #[error("node {child} references parent {parent}, which does not precede it")]
    ParentOrder { child: usize, parent: usize },
}

/// The pedigree relationship graph, as consumed by the statistics engine:
/// node count, founder/non-founder partition and per-node labels.
///
/// Construction validates the canonical ordering once, so consumers may
/// index freely without re-checking topology.
#[derive(Debug, Clone)]
pub struct RelationshipGraph {
    nodes: Vec<Node>,
    first_nonfounder: usize,
}

impl RelationshipGraph {
    /// Build a graph from an ordered node list.
    ///
    /// # Errors
    /// - if a founder appears after the first non-founder node.
    /// - if any node references a parent that does not precede it.
    pub fn new(nodes: Vec<Node>) -> Result<Self, GraphError> {
        let first_nonfounder = nodes
            .iter()
            .position(|node| !node.kind.is_founder())
            .unwrap_or(nodes.len());

        for (child, node) in nodes.iter().enumerate().skip(first_nonfounder) {
            match node.kind {
                NodeKind::Founder => return Err(GraphError::FounderAfterNonFounder(child)),
                NodeKind::Germline { dad, mom } => {
                    for parent in [dad, mom] {
                        if parent >= child {
                            return Err(GraphError::ParentOrder { child, parent });
                        }
                    }
                }
                NodeKind::Somatic { parent } => {
                    if parent >= child {
                        return Err(GraphError::ParentOrder { child, parent });
                    }
                }
            }
        }

        debug!(
            "Built relationship graph: {} node(s), {} founder(s)",
            nodes.len(),
            first_nonfounder
        );
        Ok(Self { nodes, first_nonfounder })
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the first non-founder node. Founders occupy `0..this`.
    pub fn first_nonfounder_index(&self) -> usize {
        self.first_nonfounder
    }

    pub fn is_founder(&self, node: usize) -> bool {
        node < self.first_nonfounder
    }

    pub fn label_of(&self, node: usize) -> &str {
        &self.nodes[node].label
    }

    pub fn kind_of(&self, node: usize) -> &NodeKind {
        &self.nodes[node].kind
    }
}
