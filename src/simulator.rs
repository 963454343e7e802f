//! Replay-aware observation generation and the filter driver.

use crate::error::Result;
use crate::filter::ekf::ExtendedKalmanFilter;
use crate::filter::particle::ParticleFilter;
use crate::filter::BayesFilter;
use crate::model::FilterModel;

/// Observation for step `i`: replayed from history when already generated,
/// generated on demand otherwise. Filters fed through this never see data
/// beyond step `i`.
pub fn observation(model: &mut FilterModel, i: usize) -> f64 {
    if i < model.len() {
        model.observations()[i]
    } else {
        model.generate()
    }
}

/// Feed the first `n` observations of `model` to `filter`, in step order.
/// Several filters driven over the same model replay an identical prefix.
pub fn filter_data(filter: &mut dyn BayesFilter, model: &mut FilterModel, n: usize) -> Result<()> {
    for i in 0..n {
        let y = observation(model, i);
        filter.update(y)?;
    }
    Ok(())
}

/// Run an extended Kalman filter and a particle filter over the same `n`
/// observations of `model`.
pub fn simulate(
    model: &mut FilterModel,
    n: usize,
    n_particles: usize,
    resample_threshold: f64,
) -> Result<(ExtendedKalmanFilter, ParticleFilter)> {
    let mut ekf = ExtendedKalmanFilter::new(model);
    let mut pf = ParticleFilter::new(model, n_particles, resample_threshold)?;

    log::info!(
        "simulating {} steps of '{}' ({} particles, resample threshold {})",
        n,
        model.name(),
        n_particles,
        resample_threshold
    );
    filter_data(&mut ekf, model, n)?;
    filter_data(&mut pf, model, n)?;

    Ok((ekf, pf))
}
