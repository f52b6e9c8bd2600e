use ndarray::Array2;

/// A per-node genotype transition matrix under a specific mutation model
/// (no-mutation, exactly-one-mutation, or unrestricted).
///
/// Rows index the parental genotype state: the row-major genotype pair
/// `parent1 * GENOTYPE_COUNT + parent2` for two-parent nodes, or the plain
/// genotype index for single-parent nodes. Columns index the offspring
/// genotype.
pub type TransitionMatrix = Array2<f64>;

/// One transition matrix per pedigree node, aligned with the node ordering
/// of the relationship graph. Founder entries are empty (0x0) matrices.
pub type TransitionMatrixVector = Vec<TransitionMatrix>;

/// The empty matrix stored at founder indices.
pub fn founder_matrix() -> TransitionMatrix {
    TransitionMatrix::zeros((0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn founder_matrix_is_empty() {
        let mat = founder_matrix();
        assert_eq!(mat.nrows(), 0);
        assert_eq!(mat.ncols(), 0);
        assert_eq!(mat.sum(), 0.0);
    }
}
