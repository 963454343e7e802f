use crate::error::{EstimationError, Result};
use crate::filter::BayesFilter;
use crate::model::{FilterModel, StateFn};
use std::rc::Rc;

/// Extended Kalman filter over a scalar Gaussian belief `(x, sig)`.
///
/// Process and observation noise variances are captured from the model at
/// construction and assumed stationary for the whole run. The linear Kalman
/// filter is the same recursion built from a linear model, see
/// [`ExtendedKalmanFilter::kalman`].
#[derive(Clone)]
pub struct ExtendedKalmanFilter {
    x: f64,
    sig: f64,
    Q: f64,
    R: f64,
    f: Rc<StateFn>,
    F: Rc<StateFn>,
    h: Rc<StateFn>,
    H: Rc<StateFn>,
    k: usize,
    xs: Vec<f64>,
    mses: Vec<f64>,
    label: &'static str,
}

impl ExtendedKalmanFilter {
    pub fn new(model: &FilterModel) -> Self {
        Self::with_label(model, "Extended Kalman")
    }

    /// Linear Kalman filter: identical recursion, intended for models built
    /// with [`FilterModel::linear`] whose Jacobians are constants.
    pub fn kalman(model: &FilterModel) -> Self {
        Self::with_label(model, "Kalman")
    }

    fn with_label(model: &FilterModel, label: &'static str) -> Self {
        let X0 = model.X0();
        ExtendedKalmanFilter {
            x: X0.expectation(),
            sig: X0.variance(),
            Q: model.V().variance(),
            R: model.W().variance(),
            f: model.f(),
            F: model.F(),
            h: model.h(),
            H: model.H(),
            k: 0,
            xs: Vec::new(),
            mses: Vec::new(),
            label,
        }
    }

    /// Current belief as (mean, variance).
    pub fn belief(&self) -> (f64, f64) {
        (self.x, self.sig)
    }
}

impl BayesFilter for ExtendedKalmanFilter {
    fn update(&mut self, y: f64) -> Result<()> {
        // Predict
        self.x = (self.f)(self.x);
        let F = (self.F)(self.x);
        self.sig = F * self.sig * F + self.Q;

        // Innovation covariance and gain
        let H = (self.H)(self.x);
        let S = H * self.sig * H + self.R;
        if S == 0.0 {
            return Err(EstimationError::DegenerateInnovation);
        }
        let K = self.sig * H / S;

        // Correct, with the observation Jacobian re-linearized at the
        // corrected mean for the covariance update
        self.x += K * (y - (self.h)(self.x));
        self.sig *= 1.0 - K * (self.H)(self.x);

        self.xs.push(self.x);
        self.mses.push(self.sig);
        self.k += 1;

        Ok(())
    }

    fn estimates(&self) -> &[f64] {
        &self.xs
    }

    fn mses(&self) -> &[f64] {
        &self.mses
    }

    fn steps(&self) -> usize {
        self.k
    }

    fn name(&self) -> String {
        self.label.to_string()
    }
}
