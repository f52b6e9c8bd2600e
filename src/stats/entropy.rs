//! Entropy-based confidence scoring for the de novo location call.
//!
//! Optional subsystem: the driving pipeline may skip this call entirely, and
//! nothing else in the statistics engine depends on it. When invoked, it
//! replaces the phred-derived `dnq` with a bounded concentration score of
//! the mutation-location posterior.

use std::f64::consts::LN_2;

use log::trace;

use peel::{TransitionMatrixVector, Workspace};

use super::MutationStats;

impl MutationStats {
    /// Shannon-entropy score of the (node, parental genotype-pair, offspring
    /// genotype) coefficient distribution under the exactly-one-mutation
    /// model.
    ///
    /// The raw entropy (in bits) of the normalized coefficient distribution
    /// is divided by `max_entropies[ref_index]`, the maximum achievable
    /// entropy for the site's reference allele, and expressed as
    /// `dnq = round(100 * (1 - h))`: 100 means the location posterior is
    /// fully concentrated on one cell, 0 that it is as diffuse as possible.
    ///
    /// # Panics
    /// - if the workspace and transition matrices disagree on node count.
    pub fn calculate_entropy(
        &mut self,
        work_nomut: &Workspace,
        onemut_matrices: &TransitionMatrixVector,
        max_entropies: &[f64; 5],
        ref_index: usize,
    ) {
        assert_eq!(
            work_nomut.num_nodes,
            onemut_matrices.len(),
            "workspace and transition matrices disagree on node count"
        );
        let mut total = 0.0;
        let mut entropy = 0.0;
        for node in work_nomut.first_nonfounder_index()..work_nomut.num_nodes {
            let mat = Self::node_coefficients(work_nomut, &onemut_matrices[node], node);
            total += mat.sum();
            entropy += mat
                .iter()
                .filter(|&&coeff| coeff > 0.0)
                .map(|&coeff| coeff * coeff.ln())
                .sum::<f64>();
        }

        // Entropy of the normalized distribution, in bits:
        // H(p/total) = -sum(p ln p)/total + ln(total), rescaled by ln 2.
        let mut scaled = (-entropy / total + total.ln()) / LN_2;
        scaled /= max_entropies[ref_index];
        self.dnq = (100.0 * (1.0 - scaled)).round() as i32;
        trace!("Location entropy score: DNQ = {}", self.dnq);
    }
}
