//! The diploid genotype alphabet over the four-letter base set {A, C, G, T}.
//!
//! Two genotype orderings coexist in this crate, and must never be confused:
//! - **ACGT-lexicographic order**: the fixed ordering used by the peeling
//!   engine's genotype-probability arrays, i.e.
//!   `AA, AC, AG, AT, CC, CG, CT, GG, GT, TT`.
//! - **VCF (colex) order**: the ordering of genotype fields within an output
//!   record, over the site's ref/alt alleles, i.e. index `b*(b+1)/2 + a`
//!   for the unordered allele pair `{a, b}` with `a <= b`.

/// Number of alleles in the base alphabet.
pub const ALLELE_COUNT: usize = 4;

/// Number of unordered diploid genotypes over [`ALLELE_COUNT`] alleles.
pub const GENOTYPE_COUNT: usize = 10;

/// Genotype labels, in ACGT-lexicographic order.
pub const GENOTYPE_LABELS: [&str; GENOTYPE_COUNT] = [
    "AA", "AC", "AG", "AT", "CC", "CG", "CT", "GG", "GT", "TT",
];

/// Index of the unordered genotype `{a, b}` in ACGT-lexicographic order.
///
/// # Panics
/// - if either allele index is out of bounds.
pub fn genotype_index(a: usize, b: usize) -> usize {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    assert!(b < ALLELE_COUNT, "allele index {b} out of bounds");
    a * ALLELE_COUNT - a * (a + 1) / 2 + b
}

/// Allele pair `(a, b)` (with `a <= b`) of a genotype in ACGT-lexicographic order.
///
/// # Panics
/// - if `index >= GENOTYPE_COUNT`
pub fn allele_pair(index: usize) -> (usize, usize) {
    assert!(index < GENOTYPE_COUNT, "genotype index {index} out of bounds");
    let mut a = 0;
    let mut row_start = 0;
    while row_start + (ALLELE_COUNT - a) <= index {
        row_start += ALLELE_COUNT - a;
        a += 1;
    }
    (a, a + (index - row_start))
}

/// Index of the unordered genotype `{a, b}` in VCF (colex) order.
pub fn vcf_genotype_index(a: usize, b: usize) -> usize {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    b * (b + 1) / 2 + a
}

/// Allele pair `(a, b)` (with `a <= b`) of a genotype in VCF (colex) order.
pub fn vcf_allele_pair(index: usize) -> (usize, usize) {
    let mut b = 0;
    while (b + 1) * (b + 2) / 2 <= index {
        b += 1;
    }
    (index - b * (b + 1) / 2, b)
}

/// Label of a genotype in ACGT-lexicographic order (e.g. `"AC"`).
pub fn genotype_label(index: usize) -> &'static str {
    GENOTYPE_LABELS[index]
}

/// Format a de novo mutation type label from a (parental genotype-pair row,
/// offspring genotype column) coefficient-matrix cell.
///
/// Two-parent nodes carry a `GENOTYPE_COUNT^2`-row matrix and yield labels of
/// the form `GGxGT>TT`; single-parent nodes carry a `GENOTYPE_COUNT`-row
/// matrix and yield labels of the form `GG>GT`.
///
/// # Panics
/// - if `pair_rows` matches neither matrix shape.
pub fn denovo_type_label(pair_index: usize, child_index: usize, pair_rows: usize) -> String {
    let child = genotype_label(child_index);
    if pair_rows == GENOTYPE_COUNT * GENOTYPE_COUNT {
        let parent1 = genotype_label(pair_index / GENOTYPE_COUNT);
        let parent2 = genotype_label(pair_index % GENOTYPE_COUNT);
        format!("{parent1}x{parent2}>{child}")
    } else {
        assert_eq!(
            pair_rows, GENOTYPE_COUNT,
            "coefficient matrix rows ({pair_rows}) match no known transition shape"
        );
        format!("{}>{child}", genotype_label(pair_index))
    }
}
