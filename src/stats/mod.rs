//! Per-site mutation-detection statistics, derived from peeling results.
//!
//! [`MutationStats`] is the single aggregate of this crate: one instance per
//! analyzed site, populated by a fixed sequence of calculation calls driven
//! by the external per-site loop, then read by the output-record writer.
//! Every method is a deterministic transformation of fully-materialized
//! inputs; calling any `set_*`/`calculate_*` method twice with identical
//! inputs yields identical outputs.
//!
//! Numerical ground rules:
//! - log-likelihood differences always go through `exp_m1`, never through a
//!   subtraction of two exponentials;
//! - founder entries of node-level arrays are the
//!   [`FLOAT_MISSING`](crate::missing::FLOAT_MISSING) sentinel, never `0.0`;
//! - size mismatches between collaborators (workspace, transition matrices,
//!   relationship graph) are programmer errors and fail fast.

use std::f64::consts::LN_10;

use log::{debug, trace};
use ndarray::Array2;

use pedigree::genotype;
use pedigree::RelationshipGraph;
use peel::{GenotypeArray, TransitionMatrix, TransitionMatrixVector, Workspace};

use crate::missing::FLOAT_MISSING;

mod entropy;

mod error;
pub use error::StatsError;

/// Hard cap on phred-scaled quality scores, matching the output encoding.
const MAX_QUALITY: i32 = 255;

/// Phred-scale an error probability, clamped to `[0, cap]`.
fn phred_from_error(prob: f64, cap: i32) -> i32 {
    if prob <= 0.0 {
        return cap;
    }
    let quality = (-10.0 * prob.log10()).round() as i32;
    quality.clamp(0, cap)
}

/// Running maximum of the de novo localization scan: the largest coefficient
/// seen so far and the (node, parental-pair row, offspring column) cell that
/// produced it.
#[derive(Debug, Clone, Copy)]
struct MaxCell {
    coeff: f64,
    node: usize,
    row: usize,
    col: usize,
}

/// All mutation-detection statistics for a single site.
///
/// Scalar outputs:
/// - `mup`  : overall probability that a mutation occurred anywhere in the
///            pedigree.
/// - `lld`  : scaled log10-likelihood of the data (unrestricted model).
/// - `lls`  : scaled log10-likelihood of the data (no-mutation model).
/// - `mux`  : expected number of mutation events.
/// - `mu1p` : probability that exactly one mutation occurred.
/// - `dnt`, `dnl`, `dnq`, `dnc`: de novo call descriptors (type label,
///            location label, quality, single-event share).
///
/// Per-node outputs: genotype posteriors and likelihoods, node-level
/// mutation probabilities, best-genotype calls, genotype qualities, and the
/// flattened GP/GL score arrays handed to the record writer. Consumers only
/// see these through accessors; nothing is mutable from the outside once
/// computed.
#[derive(Debug, Clone)]
pub struct MutationStats {
    min_prob: f64,
    logdata: f64,
    logdata_nomut: f64,

    mup: f32,
    lld: f32,
    lls: f32,
    mux: f32,

    has_single_mut: bool,
    mu1p: f32,

    dnt: String,
    dnl: String,
    dnq: i32,
    dnc: i32,

    posterior_probabilities: Vec<GenotypeArray>,
    genotype_likelihoods: Vec<Option<GenotypeArray>>,
    node_mup: Vec<f32>,
    node_mu1p: Vec<f32>,

    best_genotypes: Vec<i32>,
    genotype_qualities: Vec<i32>,
    gp_scores: Vec<f32>,
    gl_scores: Vec<f32>,
}

impl MutationStats {
    /// Create a blank per-site aggregate. `min_prob` gates whether a computed
    /// probability is treated as a genuine call versus "no call".
    pub fn new(min_prob: f64) -> Self {
        Self {
            min_prob,
            logdata: f64::NAN,
            logdata_nomut: f64::NAN,
            mup: 0.0,
            lld: 0.0,
            lls: 0.0,
            mux: 0.0,
            has_single_mut: false,
            mu1p: 0.0,
            dnt: String::new(),
            dnl: String::new(),
            dnq: 0,
            dnc: 0,
            posterior_probabilities: Vec::new(),
            genotype_likelihoods: Vec::new(),
            node_mup: Vec::new(),
            node_mu1p: Vec::new(),
            best_genotypes: Vec::new(),
            genotype_qualities: Vec::new(),
            gp_scores: Vec::new(),
            gl_scores: Vec::new(),
        }
    }

    /// Overall mutation probability from the no-mutation and unrestricted
    /// model likelihoods.
    ///
    /// With `d = ln P(nomut) - ln P(full)`, the probability is computed as
    /// `-exp_m1(d)`. The naive `1 - exp(ln_nomut)/exp(ln_full)` form loses
    /// all precision once both likelihoods are large-magnitude and close,
    /// and must not be reintroduced.
    ///
    /// Returns whether the site clears the `min_prob` calling threshold.
    ///
    /// # Errors
    /// - [`StatsError::DegenerateSite`] when the unrestricted-model
    ///   log-likelihood is not finite (zero or NaN likelihood). The caller
    ///   must skip the site.
    pub fn calculate_mutation_prob(
        &mut self,
        work_nomut: &Workspace,
        work_full: &Workspace,
    ) -> Result<bool, StatsError> {
        if !work_full.forward_result.is_finite() {
            debug!("Skipping site: non-finite full-model log-likelihood");
            return Err(StatsError::DegenerateSite(work_full.forward_result));
        }
        self.logdata = work_full.forward_result;
        self.logdata_nomut = work_nomut.forward_result;
        self.mup = (-(self.logdata_nomut - self.logdata).exp_m1()) as f32;
        trace!(
            "ln P(full) = {}, ln P(nomut) = {}, P(mutation) = {}",
            self.logdata,
            self.logdata_nomut,
            self.mup
        );
        Ok(f64::from(self.mup) >= self.min_prob)
    }

    /// Rescale both stored log-likelihoods into log10 space, shifted by a
    /// caller-supplied normalization constant.
    pub fn set_scaled_log_likelihood(&mut self, scale: f64) {
        self.lld = ((self.logdata + scale) / LN_10) as f32;
        self.lls = ((self.logdata_nomut + scale) / LN_10) as f32;
    }

    /// Genotype log10-likelihoods for the first `depth_size` library nodes.
    /// Nodes without read-depth observations carry no likelihood and are
    /// rendered as the missing sentinel in [`gl_scores`](Self::gl_scores).
    pub fn set_genotype_likelihoods(&mut self, workspace: &Workspace, depth_size: usize) {
        assert!(
            depth_size <= workspace.library_span.len(),
            "depth count ({depth_size}) exceeds the library span ({:?})",
            workspace.library_span
        );
        self.genotype_likelihoods = vec![None; workspace.num_nodes];
        for offset in 0..depth_size {
            let node = workspace.library_span.start + offset;
            self.genotype_likelihoods[node] =
                Some(workspace.lower[node].mapv(|p| p.ln() / LN_10));
        }
    }

    /// Per-node genotype posteriors: the normalized elementwise product of
    /// the node's backward and forward messages.
    ///
    /// A structurally absent backward message is substituted with a vector of
    /// all ones, so the posterior degenerates to the normalized forward
    /// distribution alone. This policy is unconditional; it does not depend
    /// on any build configuration.
    pub fn set_posterior_probabilities(&mut self, workspace: &Workspace) {
        self.posterior_probabilities = Vec::with_capacity(workspace.num_nodes);
        for node in 0..workspace.num_nodes {
            let lower = &workspace.lower[node];
            let product = match &workspace.upper[node] {
                Some(upper) => {
                    assert_eq!(
                        upper.len(),
                        lower.len(),
                        "node {node}: backward/forward message length mismatch"
                    );
                    upper * lower
                }
                None => lower.clone(),
            };
            let sum = product.sum();
            assert!(
                sum > 0.0,
                "node {node}: genotype posterior normalizes to zero"
            );
            self.posterior_probabilities.push(product / sum);
        }
    }

    /// Expected number of mutation events across the pedigree, from the
    /// mean-mutation-count transition matrices.
    pub fn calculate_expected_mutation(
        &mut self,
        work_full: &Workspace,
        mean_matrices: &TransitionMatrixVector,
    ) {
        assert_eq!(
            work_full.num_nodes,
            mean_matrices.len(),
            "workspace and transition matrices disagree on node count"
        );
        let mut mux = 0.0;
        for node in work_full.first_nonfounder_index()..work_full.num_nodes {
            mux += Self::node_event_weight(work_full, &mean_matrices[node], node);
        }
        self.mux = mux as f32;
    }

    /// Node-level mutation attribution, from transition matrices constructed
    /// under a "position has mutated" constraint.
    ///
    /// Populates [`node_mup`](Self::node_mup) with the absolute per-node
    /// mutation probabilities, derives the exactly-one-mutation probability
    /// `mu1p` from their total, and, when a single mutation is supported,
    /// populates [`node_mu1p`](Self::node_mu1p) with the per-node
    /// probabilities conditional on exactly one event.
    pub fn calculate_node_mutation(
        &mut self,
        work_full: &Workspace,
        posmut_matrices: &TransitionMatrixVector,
    ) {
        assert_eq!(
            work_full.num_nodes,
            posmut_matrices.len(),
            "workspace and transition matrices disagree on node count"
        );
        let first_nonfounder = work_full.first_nonfounder_index();
        let mut event = vec![0.0; work_full.num_nodes];
        let mut total = 0.0;
        for node in first_nonfounder..work_full.num_nodes {
            let weight = Self::node_event_weight(work_full, &posmut_matrices[node], node);
            event[node] = weight;
            total += weight;
        }
        self.set_node_mup(&event, first_nonfounder);
        self.set_exactly_one_mutation(total);
        if self.has_single_mut {
            self.set_node_mu1p(&event, total, first_nonfounder);
        }
    }

    /// Locate the single most probable de novo mutation under the
    /// exactly-one-mutation model, and derive its call descriptors.
    ///
    /// The scan order is pinned: ascending node index, then row-major over
    /// each node's (parental genotype-pair x offspring genotype) coefficient
    /// matrix, with strict greater-than replacement. Ties therefore keep the
    /// earliest-scanned cell; this is a defined tie-break, not an accident
    /// of traversal.
    ///
    /// A no-op when the site does not support a single mutation (see
    /// [`has_single_mut`](Self::has_single_mut)).
    pub fn calculate_denovo_mutation(
        &mut self,
        work_nomut: &Workspace,
        onemut_matrices: &TransitionMatrixVector,
        graph: &RelationshipGraph,
    ) {
        assert_eq!(
            work_nomut.num_nodes,
            graph.num_nodes(),
            "workspace and relationship graph disagree on node count"
        );
        assert_eq!(
            work_nomut.num_nodes,
            onemut_matrices.len(),
            "workspace and transition matrices disagree on node count"
        );
        if !self.has_single_mut {
            trace!("No single-mutation support: skipping de novo localization");
            return;
        }

        let mut best = MaxCell { coeff: -1.0, node: 0, row: 0, col: 0 };
        let mut total = 0.0;
        for node in work_nomut.first_nonfounder_index()..work_nomut.num_nodes {
            let mat = Self::node_coefficients(work_nomut, &onemut_matrices[node], node);
            total += mat.sum();
            Self::update_max_denovo_mutation(&mat, node, &mut best);
        }

        self.dnt = genotype::denovo_type_label(
            best.row,
            best.col,
            onemut_matrices[best.node].nrows(),
        );
        self.dnl = graph.label_of(best.node).to_owned();
        self.dnq = phred_from_error(1.0 - best.coeff / total, MAX_QUALITY);
        self.dnc = (100.0 * f64::from(self.mu1p) / f64::from(self.mup)).round() as i32;
        trace!(
            "De novo call: {} at {} (DNQ = {}, DNC = {})",
            self.dnt,
            self.dnl,
            self.dnq,
            self.dnc
        );
    }

    /// Copy absolute per-node mutation probabilities from `event`, leaving
    /// every index before `first_nonfounder_index` as the missing sentinel.
    pub fn set_node_mup(&mut self, event: &[f64], first_nonfounder_index: usize) {
        self.node_mup = Self::set_node_core(event, first_nonfounder_index, 1.0);
    }

    /// Store `event[i] / total` for each non-founder node: the probability
    /// that, given exactly one mutation occurred, it occurred at node `i`.
    /// Founder entries remain the missing sentinel.
    ///
    /// Precondition (caller-guaranteed): `total` is the nonzero sum of the
    /// non-founder event weights.
    pub fn set_node_mu1p(&mut self, event: &[f64], total: f64, first_nonfounder_index: usize) {
        debug_assert!(total != 0.0, "event weights sum to zero");
        self.node_mu1p = Self::set_node_core(event, first_nonfounder_index, total);
    }

    /// Genotype calls, qualities and the flattened GP/GL score arrays, in
    /// the ref/alt allele ordering of the output record.
    ///
    /// # Arguments
    /// - `acgt_to_refalt_allele`: per base (A, C, G, T, N), the ref/alt
    ///   allele index at this site, or `-1` when the base is not among them.
    /// - `refalt_to_acgt_allele`: the inverse mapping.
    /// - `n_alleles`     : number of ref/alt alleles at the site.
    /// - `num_nodes`     : pedigree node count.
    /// - `library_start` : first node carrying genotype likelihoods; GL
    ///   entries before it are the missing sentinel.
    ///
    /// # Panics
    /// - if posteriors have not been computed, or if a ref/alt allele maps
    ///   to no base (inconsistent translation tables).
    pub fn set_genotype_related_stats(
        &mut self,
        acgt_to_refalt_allele: &[i8; 5],
        refalt_to_acgt_allele: &[i8; 5],
        n_alleles: usize,
        num_nodes: usize,
        library_start: usize,
    ) {
        assert_eq!(
            self.posterior_probabilities.len(),
            num_nodes,
            "posterior probabilities must be computed before genotype calls"
        );
        let gt_count = n_alleles * (n_alleles + 1) / 2;
        self.best_genotypes = Vec::with_capacity(2 * num_nodes);
        self.genotype_qualities = Vec::with_capacity(num_nodes);
        self.gp_scores = vec![0.0; gt_count * num_nodes];
        self.gl_scores = vec![FLOAT_MISSING; gt_count * num_nodes];

        for node in 0..num_nodes {
            let posterior = &self.posterior_probabilities[node];

            // ---- Best genotype: argmax of the posterior. Earliest index
            //      wins ties, mirroring the de novo scan.
            let (best, best_prob) = posterior.iter().enumerate().fold(
                (0, f64::MIN),
                |(best, best_prob), (index, &prob)| {
                    if prob > best_prob { (index, prob) } else { (best, best_prob) }
                },
            );
            let (a, b) = genotype::allele_pair(best);
            self.best_genotypes.push(i32::from(acgt_to_refalt_allele[a]));
            self.best_genotypes.push(i32::from(acgt_to_refalt_allele[b]));
            self.genotype_qualities.push(phred_from_error(1.0 - best_prob, MAX_QUALITY));

            // ---- Re-order posterior/likelihood entries into the record's
            //      ref/alt genotype order.
            for gt in 0..gt_count {
                let (x, y) = genotype::vcf_allele_pair(gt);
                let base_x = refalt_to_acgt_allele[x];
                let base_y = refalt_to_acgt_allele[y];
                assert!(
                    base_x >= 0 && base_y >= 0,
                    "ref/alt allele {x}/{y} maps to no base"
                );
                let acgt_gt = genotype::genotype_index(base_x as usize, base_y as usize);
                self.gp_scores[node * gt_count + gt] = posterior[acgt_gt] as f32;
                if node >= library_start {
                    if let Some(likelihoods) = &self.genotype_likelihoods[node] {
                        self.gl_scores[node * gt_count + gt] = likelihoods[acgt_gt] as f32;
                    }
                }
            }
        }
    }

    // ---- Internal helpers -------------------------------------------------

    /// Shared traversal of [`set_node_mup`](Self::set_node_mup) and
    /// [`set_node_mu1p`](Self::set_node_mu1p): sentinel fill for the founder
    /// prefix, scaled numeric assignment for the remainder. Keeping a single
    /// helper guarantees the two outputs never diverge in boundary handling.
    fn set_node_core(event: &[f64], first_nonfounder_index: usize, scale: f64) -> Vec<f32> {
        let mut stats = vec![FLOAT_MISSING; event.len()];
        for (slot, weight) in stats.iter_mut().zip(event).skip(first_nonfounder_index) {
            *slot = (weight / scale) as f32;
        }
        stats
    }

    /// `mu1p = total * (1 - mup)`: the event weights are relative to the
    /// no-mutation likelihood, so scaling by `P(no mutation | data)` turns
    /// their total into the posterior probability of exactly one event.
    fn set_exactly_one_mutation(&mut self, total: f64) {
        self.mu1p = (total * (1.0 - f64::from(self.mup))) as f32;
        self.has_single_mut = self.mup > 0.0
            && f64::from(self.mu1p) / f64::from(self.mup) >= self.min_prob;
    }

    /// Contribution of a single node: `above . (M . lower)`, the total
    /// probability mass the node's transition matrix routes between its
    /// parental-pair message and its forward message.
    fn node_event_weight(workspace: &Workspace, matrix: &TransitionMatrix, node: usize) -> f64 {
        let above = Self::above_message(workspace, node);
        debug_assert_eq!(matrix.nrows(), above.len());
        debug_assert_eq!(matrix.ncols(), workspace.lower[node].len());
        above.dot(&matrix.dot(&workspace.lower[node]))
    }

    /// Dense per-cell coefficients for one node:
    /// `above[row] * lower[col] * M[row, col]`, row-major.
    fn node_coefficients(
        workspace: &Workspace,
        matrix: &TransitionMatrix,
        node: usize,
    ) -> TransitionMatrix {
        let above = Self::above_message(workspace, node);
        let lower = &workspace.lower[node];
        debug_assert_eq!(matrix.nrows(), above.len());
        debug_assert_eq!(matrix.ncols(), lower.len());
        Array2::from_shape_fn(matrix.dim(), |(row, col)| {
            above[row] * lower[col] * matrix[[row, col]]
        })
    }

    fn above_message<'w>(workspace: &'w Workspace, node: usize) -> &'w GenotypeArray {
        workspace.above[node].as_ref().unwrap_or_else(|| {
            panic!("node {node}: parental-pair message was never materialized")
        })
    }

    /// Keep the running maximum of the localization scan. Strict
    /// greater-than: the earliest-scanned cell survives ties.
    fn update_max_denovo_mutation(mat: &TransitionMatrix, node: usize, best: &mut MaxCell) {
        for ((row, col), &coeff) in mat.indexed_iter() {
            if coeff > best.coeff {
                *best = MaxCell { coeff, node, row, col };
            }
        }
    }

    // ---- Accessors --------------------------------------------------------

    /// Overall probability that a mutation occurred anywhere in the pedigree.
    pub fn mup(&self) -> f32 {
        self.mup
    }

    /// Scaled log10-likelihood of the data under the unrestricted model.
    pub fn lld(&self) -> f32 {
        self.lld
    }

    /// Scaled log10-likelihood of the data under the no-mutation model.
    pub fn lls(&self) -> f32 {
        self.lls
    }

    /// Expected number of mutation events.
    pub fn mux(&self) -> f32 {
        self.mux
    }

    /// Whether the site supports an exactly-one-mutation call.
    pub fn has_single_mut(&self) -> bool {
        self.has_single_mut
    }

    /// Probability that exactly one mutation occurred.
    pub fn mu1p(&self) -> f32 {
        self.mu1p
    }

    /// De novo mutation type label (e.g. `GGxGT>TT`).
    pub fn dnt(&self) -> &str {
        &self.dnt
    }

    /// De novo mutation location label (pedigree node label).
    pub fn dnl(&self) -> &str {
        &self.dnl
    }

    /// De novo call quality (phred-scaled, capped at 255).
    pub fn dnq(&self) -> i32 {
        self.dnq
    }

    /// Share of the mutation probability carried by a single event, in
    /// percent.
    pub fn dnc(&self) -> i32 {
        self.dnc
    }

    /// Per-node genotype posterior distributions.
    pub fn posterior_probabilities(&self) -> &[GenotypeArray] {
        &self.posterior_probabilities
    }

    /// Per-node genotype log10-likelihoods (`None` for zero-depth nodes).
    pub fn genotype_likelihoods(&self) -> &[Option<GenotypeArray>] {
        &self.genotype_likelihoods
    }

    /// Per-node mutation probability (missing sentinel for founders).
    pub fn node_mup(&self) -> &[f32] {
        &self.node_mup
    }

    /// Per-node single-mutation probability (missing sentinel for founders).
    pub fn node_mu1p(&self) -> &[f32] {
        &self.node_mu1p
    }

    /// Best-genotype calls: two ref/alt allele indices per node.
    pub fn best_genotypes(&self) -> &[i32] {
        &self.best_genotypes
    }

    /// Per-node genotype quality (phred-scaled, capped at 255).
    pub fn genotype_qualities(&self) -> &[i32] {
        &self.genotype_qualities
    }

    /// Flattened per-node genotype posteriors in record order.
    pub fn gp_scores(&self) -> &[f32] {
        &self.gp_scores
    }

    /// Flattened per-node genotype log10-likelihoods in record order, with
    /// the missing sentinel where no likelihood exists.
    pub fn gl_scores(&self) -> &[f32] {
        &self.gl_scores
    }
}
