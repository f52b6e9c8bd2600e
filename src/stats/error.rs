use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    /// The unrestricted-model likelihood is zero or NaN. No usable
    /// statistics can be derived for the site; the caller must skip it.
    #[error("degenerate site: log-likelihood under the unrestricted model is not finite ({0})")]
    DegenerateSite(f64),
}
