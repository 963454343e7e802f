pub mod ekf;
pub mod particle;

use crate::error::Result;

/// Recursive Bayesian filter over a scalar hidden state.
///
/// `update` must be called once per observation, in the order the model
/// generated them. Out-of-order or skipped observations are a caller error
/// and are not detected here.
pub trait BayesFilter {
    /// Consume the next observation and advance the belief one step.
    fn update(&mut self, y: f64) -> Result<()>;

    /// Point estimates, one per consumed observation.
    fn estimates(&self) -> &[f64];

    /// Expected mean squared error, one per consumed observation.
    fn mses(&self) -> &[f64];

    /// Number of observations consumed so far.
    fn steps(&self) -> usize;

    fn name(&self) -> String;
}
