//! DNMS-rs: per-site, per-individual de novo mutation detection statistics.
//!
//! This crate is the statistics stage of a pedigree mutation-calling
//! pipeline. An external peeling engine evaluates the observed sequencing
//! data under several mutation models (no-mutation, exactly-one-mutation,
//! unrestricted) and hands over one [`peel::Workspace`] per model;
//! [`MutationStats`] reduces those workspaces, together with per-node
//! transition matrices and the [`pedigree::RelationshipGraph`], into the
//! scalar and per-node statistics an output-record writer serializes:
//! overall mutation probability, de novo localization and quality, genotype
//! posteriors, likelihoods, calls and qualities.
//!
//! One [`MutationStats`] instance is created per analyzed site, populated by
//! its calculation methods, read through its accessors, then discarded. It
//! holds no state across sites.

pub mod missing;
pub mod stats;

pub use stats::{MutationStats, StatsError};
