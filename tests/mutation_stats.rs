mod common;
use common::{single_cell_matrices, trio_graph, trio_workspace, LN_FULL, LN_NOMUT};

use float_cmp::assert_approx_eq;
use itertools::iproduct;
use pretty_assertions::assert_eq;

use dnms_rs::missing::{is_missing, FLOAT_MISSING};
use dnms_rs::{MutationStats, StatsError};
use pedigree::genotype::GENOTYPE_COUNT;

const MIN_PROB: f64 = 0.01;

#[test]
fn trio_mutation_probability() -> anyhow::Result<()> {
    let work_nomut = trio_workspace(LN_NOMUT);
    let work_full = trio_workspace(LN_FULL);

    let mut stats = MutationStats::new(MIN_PROB);
    let is_call = stats.calculate_mutation_prob(&work_nomut, &work_full)?;

    // ln difference of -0.5: P(mutation) = 1 - exp(-0.5) ~= 0.3935.
    let expected = -(-0.5_f64).exp_m1();
    assert_approx_eq!(f64, expected, f64::from(stats.mup()), epsilon = expected * 1e-4);
    assert!(is_call);
    Ok(())
}

#[test]
fn degenerate_site_is_skippable() {
    let work_nomut = trio_workspace(LN_NOMUT);
    let mut work_full = trio_workspace(f64::NEG_INFINITY);
    work_full.forward_result = f64::NEG_INFINITY;

    let mut stats = MutationStats::new(MIN_PROB);
    let result = stats.calculate_mutation_prob(&work_nomut, &work_full);
    assert!(matches!(result, Err(StatsError::DegenerateSite(_))));
}

#[test]
fn node_attribution_scenario() {
    // Event vector: 5 founder slots, then each node's own index as weight.
    let first_nonfounder = 5;
    let mut event = vec![f64::from(FLOAT_MISSING); 20];
    for (i, slot) in event.iter_mut().enumerate().skip(first_nonfounder) {
        *slot = i as f64;
    }
    let total: f64 = (first_nonfounder..20).map(|i| i as f64).sum();
    assert_eq!(total, 180.0);

    let mut stats = MutationStats::new(MIN_PROB);
    stats.set_node_mup(&event, first_nonfounder);
    stats.set_node_mu1p(&event, total, first_nonfounder);

    for (node, array) in iproduct!(0..first_nonfounder, [stats.node_mup(), stats.node_mu1p()]) {
        assert!(is_missing(array[node]), "founder {node} must stay missing");
    }
    assert_eq!(stats.node_mup()[7], 7.0);
    assert_eq!(stats.node_mu1p()[7], (7.0 / 180.0) as f32);
}

/// The full per-site calculation sequence, as the driving pipeline runs it.
#[test]
fn trio_full_pipeline() -> anyhow::Result<()> {
    let work_nomut = trio_workspace(LN_NOMUT);
    let work_full = trio_workspace(LN_FULL);
    let graph = trio_graph();
    let matrices = single_cell_matrices(0.5);

    let mut stats = MutationStats::new(MIN_PROB);
    let is_call = stats.calculate_mutation_prob(&work_nomut, &work_full)?;
    assert!(is_call);

    stats.set_scaled_log_likelihood(0.0);
    assert_approx_eq!(f64, LN_FULL / std::f64::consts::LN_10, f64::from(stats.lld()), epsilon = 1e-6);
    assert_approx_eq!(f64, LN_NOMUT / std::f64::consts::LN_10, f64::from(stats.lls()), epsilon = 1e-6);

    // ---- Posteriors: parents flat (upper and lower cancel), child a point
    //      mass on AC.
    stats.set_posterior_probabilities(&work_full);
    for posterior in stats.posterior_probabilities() {
        assert!((posterior.sum() - 1.0).abs() < 1e-6);
    }
    for parent in 0..2 {
        for &p in stats.posterior_probabilities()[parent].iter() {
            assert!((p - 0.1).abs() < 1e-12);
        }
    }
    assert_eq!(stats.posterior_probabilities()[2][1], 1.0);

    // ---- Likelihoods exist for the two parents only (depth on 2 nodes).
    stats.set_genotype_likelihoods(&work_full, 2);
    assert!(stats.genotype_likelihoods()[0].is_some());
    assert!(stats.genotype_likelihoods()[1].is_some());
    assert!(stats.genotype_likelihoods()[2].is_none());

    // ---- Expected count and node attribution.
    stats.calculate_expected_mutation(&work_full, &matrices);
    assert_eq!(stats.mux(), 0.5);

    stats.calculate_node_mutation(&work_full, &matrices);
    assert!(is_missing(stats.node_mup()[0]));
    assert!(is_missing(stats.node_mup()[1]));
    assert_eq!(stats.node_mup()[2], 0.5);
    assert!(stats.has_single_mut());
    assert_eq!(stats.node_mu1p()[2], 1.0);

    let expected_mu1p = 0.5 * (-0.5_f64).exp();
    assert_approx_eq!(f64, expected_mu1p, f64::from(stats.mu1p()), epsilon = expected_mu1p * 1e-4);

    // ---- De novo localization: the single reachable cell.
    stats.calculate_denovo_mutation(&work_nomut, &matrices, &graph);
    assert_eq!(stats.dnt(), "AAxAA>AC");
    assert_eq!(stats.dnl(), "child");
    assert_eq!(stats.dnq(), 255);
    assert_eq!(stats.dnc(), 77); // round(100 * mu1p / mup)

    // ---- Entropy rescoring: one cell has zero entropy.
    stats.calculate_entropy(&work_nomut, &matrices, &[1.0; 5], 0);
    assert_eq!(stats.dnq(), 100);

    // ---- Genotype calls on a biallelic A/C site.
    let acgt_to_refalt: [i8; 5] = [0, 1, -1, -1, -1];
    let refalt_to_acgt: [i8; 5] = [0, 1, -1, -1, -1];
    stats.set_genotype_related_stats(&acgt_to_refalt, &refalt_to_acgt, 2, 3, 0);

    // Parents call ref/ref (flat posterior, earliest genotype wins), the
    // child calls ref/alt.
    assert_eq!(stats.best_genotypes().to_vec(), vec![0, 0, 0, 0, 0, 1]);
    let gt_count = 3;
    assert_eq!(stats.gp_scores().len(), gt_count * 3);
    assert!((stats.gp_scores()[2 * gt_count + 1] - 1.0).abs() < 1e-6); // child AC
    assert!(!is_missing(stats.gl_scores()[0]));
    assert!(stats.gl_scores()[2 * gt_count..].iter().all(|&v| is_missing(v)));
    Ok(())
}

#[test]
fn repeated_computation_is_stable() -> anyhow::Result<()> {
    let work_nomut = trio_workspace(LN_NOMUT);
    let work_full = trio_workspace(LN_FULL);
    let matrices = single_cell_matrices(0.5);

    let mut stats = MutationStats::new(MIN_PROB);
    stats.calculate_mutation_prob(&work_nomut, &work_full)?;
    stats.set_posterior_probabilities(&work_full);
    stats.calculate_node_mutation(&work_full, &matrices);
    let first_mup = stats.node_mup().to_vec();
    let first_posteriors = stats.posterior_probabilities().to_vec();

    stats.set_posterior_probabilities(&work_full);
    stats.calculate_node_mutation(&work_full, &matrices);

    assert_eq!(first_posteriors, stats.posterior_probabilities());
    assert_eq!(
        first_mup.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        stats.node_mup().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn genotype_class_count_matches_fixture() {
    // The fixture is wired for the canonical 10-genotype diploid alphabet.
    let work = trio_workspace(LN_FULL);
    assert_eq!(work.lower[0].len(), GENOTYPE_COUNT);
}
