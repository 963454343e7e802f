use crate::distribution::{Discrete, Distribution};
use crate::error::{EstimationError, Result};
use crate::filter::BayesFilter;
use crate::model::{FilterModel, StateFn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub value: f64,
    pub weight: f64,
}

/// Sequential importance resampling particle filter.
///
/// The posterior is approximated by `N` weighted particles. Each update
/// propagates the particles through the process model, reweights them by the
/// measurement likelihood, and resamples when the effective sample size
/// drops below `resample_threshold * N`. A snapshot of the population is
/// kept per step for external visualization.
#[derive(Clone)]
pub struct ParticleFilter {
    f: Rc<StateFn>,
    h: Rc<StateFn>,
    V: Rc<dyn Distribution>,
    W: Rc<dyn Distribution>,
    X0: Rc<dyn Distribution>,
    N: usize,
    particles: Vec<Particle>,
    history: Vec<Vec<Particle>>,
    resample_threshold: f64,
    rng: StdRng,
    x: f64,
    k: usize,
    xs: Vec<f64>,
    mses: Vec<f64>,
}

impl ParticleFilter {
    pub fn new(model: &FilterModel, N: usize, resample_threshold: f64) -> Result<Self> {
        if N == 0 {
            return Err(EstimationError::InvalidParameter(
                "particle count must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&resample_threshold) {
            return Err(EstimationError::InvalidParameter(format!(
                "resample threshold {} outside [0, 1]",
                resample_threshold
            )));
        }

        let X0 = model.X0();
        let mut rng = StdRng::from_entropy();
        let weight = 1.0 / N as f64;
        let particles: Vec<Particle> = (0..N)
            .map(|_| Particle {
                value: X0.draw(&mut rng),
                weight,
            })
            .collect();
        let x = particles.iter().map(|p| p.value * p.weight).sum();

        Ok(ParticleFilter {
            f: model.f(),
            h: model.h(),
            V: model.V(),
            W: model.W(),
            X0,
            N,
            particles,
            history: Vec::new(),
            resample_threshold,
            rng,
            x,
            k: 0,
            xs: Vec::new(),
            mses: Vec::new(),
        })
    }

    /// Replace the random source, redrawing the initial population when no
    /// observations have been consumed yet. Useful for reproducible runs.
    pub fn with_rng(mut self, mut rng: StdRng) -> Self {
        if self.k == 0 {
            let weight = 1.0 / self.N as f64;
            let particles: Vec<Particle> = (0..self.N)
                .map(|_| Particle {
                    value: self.X0.draw(&mut rng),
                    weight,
                })
                .collect();
            self.x = particles.iter().map(|p| p.value * p.weight).sum();
            self.particles = particles;
        }
        self.rng = rng;
        self
    }

    /// Effective sample size `1 / sum(w^2)`, in `(0, N]`.
    pub fn effective_particles(&self) -> f64 {
        1.0 / self
            .particles
            .iter()
            .map(|p| p.weight.powi(2))
            .sum::<f64>()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// One population snapshot per consumed observation.
    pub fn particle_history(&self) -> &[Vec<Particle>] {
        &self.history
    }

    fn resample(&mut self) -> Result<()> {
        let weighted: Vec<(f64, f64)> = self
            .particles
            .iter()
            .map(|p| (p.value, p.weight))
            .collect();
        let empirical = Discrete::new(weighted)?;
        let weight = 1.0 / self.N as f64;
        let resampled: Vec<Particle> = (0..self.N)
            .map(|_| Particle {
                value: empirical.draw(&mut self.rng),
                weight,
            })
            .collect();
        self.particles = resampled;
        Ok(())
    }
}

impl BayesFilter for ParticleFilter {
    fn update(&mut self, y: f64) -> Result<()> {
        // Propagate each particle through the process model
        for p in &mut self.particles {
            p.value = (self.f)(p.value) + self.V.draw(&mut self.rng);
        }

        // Reweight by the measurement likelihood
        let mut total = 0.0;
        for p in &mut self.particles {
            p.weight *= self.W.pdf(y - (self.h)(p.value))?;
            total += p.weight;
        }
        // NaN fails this too
        if !(total > 0.0) {
            return Err(EstimationError::DegenerateWeights(total));
        }
        for p in &mut self.particles {
            p.weight /= total;
        }

        // Weighted mean and weighted variance around it
        self.x = self.particles.iter().map(|p| p.value * p.weight).sum();
        self.xs.push(self.x);
        self.mses.push(
            self.particles
                .iter()
                .map(|p| p.weight * (p.value - self.x).powi(2))
                .sum(),
        );

        let ess = self.effective_particles();
        if ess / (self.N as f64) < self.resample_threshold {
            log::debug!("resampling at step {} (ESS = {:.1})", self.k, ess);
            self.resample()?;
        }

        // Snapshot after the optional resample so the history holds the
        // population the next step starts from
        self.history.push(self.particles.clone());

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
        format!("Particle ({})", self.N)
    }
}
