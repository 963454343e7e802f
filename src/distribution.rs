//! Scalar probability distributions used for sampling and density
//! evaluation. Every variant is usable behind `dyn Distribution`; operations
//! a variant cannot support report `Unsupported` instead of a sentinel.

use crate::error::{EstimationError, Result};
use rand::{Rng, RngCore};
use rand_distr::Distribution as _;
use std::f64::consts::PI;

pub trait Distribution {
    fn expectation(&self) -> f64;

    fn variance(&self) -> f64;

    /// Draw one sample using the caller-supplied random source.
    fn draw(&self, rng: &mut dyn RngCore) -> f64;

    fn pdf(&self, _x: f64) -> Result<f64> {
        Err(EstimationError::Unsupported("pdf"))
    }

    fn cdf(&self, _x: f64) -> Result<f64> {
        Err(EstimationError::Unsupported("cdf"))
    }
}

#[derive(Debug, Clone)]
pub struct Normal {
    mu: f64,
    sigma: f64,
    sampler: rand_distr::Normal<f64>,
}

impl Normal {
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !(sigma > 0.0) || !sigma.is_finite() || !mu.is_finite() {
            return Err(EstimationError::InvalidParameter(format!(
                "normal distribution needs finite mu and sigma > 0, got N({}, {})",
                mu, sigma
            )));
        }
        let sampler = rand_distr::Normal::new(mu, sigma)
            .map_err(|e| EstimationError::InvalidParameter(e.to_string()))?;
        Ok(Normal { mu, sigma, sampler })
    }
}

impl Distribution for Normal {
    fn expectation(&self) -> f64 {
        self.mu
    }

    fn variance(&self) -> f64 {
        self.sigma.powi(2)
    }

    fn draw(&self, rng: &mut dyn RngCore) -> f64 {
        self.sampler.sample(rng)
    }

    fn pdf(&self, x: f64) -> Result<f64> {
        let d = (-(x - self.mu).powi(2) / (2.0 * self.sigma.powi(2))).exp()
            / (self.sigma * (2.0 * PI).sqrt());
        Ok(d)
    }
}

/// Zero-mean additive noise, used for both process and measurement noise.
#[derive(Debug, Clone)]
pub struct Noise {
    inner: Normal,
}

impl Noise {
    pub fn new(sigma: f64) -> Result<Self> {
        Ok(Noise {
            inner: Normal::new(0.0, sigma)?,
        })
    }
}

impl Distribution for Noise {
    fn expectation(&self) -> f64 {
        self.inner.expectation()
    }

    fn variance(&self) -> f64 {
        self.inner.variance()
    }

    fn draw(&self, rng: &mut dyn RngCore) -> f64 {
        self.inner.draw(rng)
    }

    fn pdf(&self, x: f64) -> Result<f64> {
        self.inner.pdf(x)
    }
}

/// Weighted finite support. Weights are normalized to sum to 1 at
/// construction; draws go through inverse-CDF search.
#[derive(Debug, Clone)]
pub struct Discrete {
    values: Vec<(f64, f64)>,
    u01: Uniform,
}

impl Discrete {
    pub fn new(mut values: Vec<(f64, f64)>) -> Result<Self> {
        let total: f64 = values.iter().map(|&(_, w)| w).sum();
        if !(total > 0.0) || !total.is_finite() {
            return Err(EstimationError::InvalidParameter(format!(
                "discrete distribution needs a positive finite total weight, got {}",
                total
            )));
        }
        for value in values.iter_mut() {
            value.1 /= total;
        }
        Ok(Discrete {
            values,
            u01: Uniform::new(0.0, 1.0)?,
        })
    }

    pub fn values(&self) -> &[(f64, f64)] {
        &self.values
    }
}

impl Distribution for Discrete {
    fn expectation(&self) -> f64 {
        self.values.iter().map(|&(x, w)| w * x).sum()
    }

    fn variance(&self) -> f64 {
        let e = self.expectation();
        self.values.iter().map(|&(x, w)| w * (x - e).powi(2)).sum()
    }

    fn draw(&self, rng: &mut dyn RngCore) -> f64 {
        let u = self.u01.draw(rng);
        let mut s = 0.0;
        for &(x, w) in &self.values {
            if s + w > u {
                return x;
            }
            s += w;
        }
        // Normalized weights sum to 1 and u < 1, so falling through here is
        // only possible via floating-point round-off. Clamp to the last value.
        debug_assert!(false, "discrete draw fell through: u = {}, sum = {}", u, s);
        log::warn!("discrete draw fell through (u = {}), clamping to last value", u);
        self.values[self.values.len() - 1].0
    }
}

#[derive(Debug, Clone)]
pub struct Uniform {
    a: f64,
    b: f64,
}

impl Uniform {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !(a < b) || !a.is_finite() || !b.is_finite() {
            return Err(EstimationError::InvalidParameter(format!(
                "uniform distribution needs finite a < b, got [{}, {}]",
                a, b
            )));
        }
        Ok(Uniform { a, b })
    }
}

impl Distribution for Uniform {
    fn expectation(&self) -> f64 {
        (self.b + self.a) / 2.0
    }

    fn variance(&self) -> f64 {
        (self.b - self.a).powi(2) / 12.0
    }

    fn draw(&self, rng: &mut dyn RngCore) -> f64 {
        rng.gen_range(self.a..self.b)
    }

    fn pdf(&self, x: f64) -> Result<f64> {
        if self.a <= x && x <= self.b {
            Ok(1.0 / (self.b - self.a))
        } else {
            Ok(0.0)
        }
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        if x < self.a {
            Ok(0.0)
        } else if x <= self.b {
            Ok((x - self.a) / (self.b - self.a))
        } else {
            Ok(1.0)
        }
    }
}

/// Point mass at `q`.
#[derive(Debug, Clone)]
pub struct Static {
    q: f64,
}

impl Static {
    pub fn new(q: f64) -> Self {
        Static { q }
    }
}

impl Distribution for Static {
    fn expectation(&self) -> f64 {
        self.q
    }

    fn variance(&self) -> f64 {
        0.0
    }

    fn draw(&self, _rng: &mut dyn RngCore) -> f64 {
        self.q
    }

    fn pdf(&self, x: f64) -> Result<f64> {
        if x == self.q {
            Ok(f64::INFINITY)
        } else {
            Ok(0.0)
        }
    }

    fn cdf(&self, x: f64) -> Result<f64> {
        if x < self.q {
            Ok(0.0)
        } else {
            Ok(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_normal_rejects_bad_sigma() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
        assert!(Normal::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_normal_pdf_peak() {
        let n = Normal::new(0.0, 1.0).unwrap();
        let peak = n.pdf(0.0).unwrap();
        assert!((peak - 0.3989422804014327).abs() < 1e-12);
    }

    #[test]
    fn test_normal_cdf_unsupported() {
        let n = Normal::new(0.0, 1.0).unwrap();
        assert!(matches!(
            n.cdf(0.0),
            Err(EstimationError::Unsupported("cdf"))
        ));
    }

    #[test]
    fn test_noise_is_zero_mean() {
        let w = Noise::new(2.0).unwrap();
        assert_eq!(w.expectation(), 0.0);
        assert_eq!(w.variance(), 4.0);
        let symmetric = w.pdf(1.5).unwrap() - w.pdf(-1.5).unwrap();
        assert!(symmetric.abs() < 1e-15);
    }

    #[test]
    fn test_uniform_rejects_bad_range() {
        assert!(Uniform::new(1.0, 1.0).is_err());
        assert!(Uniform::new(2.0, 1.0).is_err());
    }

    #[test]
    fn test_uniform_cdf_bounds_and_monotonicity() {
        let u = Uniform::new(-1.0, 3.0).unwrap();
        assert_eq!(u.cdf(-1.5).unwrap(), 0.0);
        assert_eq!(u.cdf(3.5).unwrap(), 1.0);
        assert!((u.cdf(-1.0).unwrap() - 0.0).abs() < 1e-15);
        assert!((u.cdf(3.0).unwrap() - 1.0).abs() < 1e-15);
        let mut prev = 0.0;
        for i in 0..=100 {
            let x = -1.0 + 4.0 * i as f64 / 100.0;
            let c = u.cdf(x).unwrap();
            assert!(c >= prev);
            prev = c;
        }
        assert!((u.pdf(0.0).unwrap() - 0.25).abs() < 1e-15);
        assert_eq!(u.pdf(5.0).unwrap(), 0.0);
    }

    #[test]
    fn test_discrete_normalizes_weights() {
        let d = Discrete::new(vec![(1.0, 2.0), (2.0, 2.0)]).unwrap();
        assert!((d.values()[0].1 - 0.5).abs() < 1e-15);
        assert!((d.values()[1].1 - 0.5).abs() < 1e-15);
        assert!((d.expectation() - 1.5).abs() < 1e-15);
        assert!((d.variance() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_discrete_normalization_is_idempotent() {
        let d = Discrete::new(vec![(0.0, 0.25), (1.0, 0.75)]).unwrap();
        let d2 = Discrete::new(d.values().to_vec()).unwrap();
        for (a, b) in d.values().iter().zip(d2.values()) {
            assert!((a.1 - b.1).abs() < 1e-12);
        }
    }

    #[test]
    fn test_discrete_rejects_zero_total_weight() {
        assert!(Discrete::new(vec![(1.0, 0.0), (2.0, 0.0)]).is_err());
        assert!(Discrete::new(vec![]).is_err());
    }

    #[test]
    fn test_discrete_pdf_unsupported() {
        let d = Discrete::new(vec![(1.0, 1.0)]).unwrap();
        assert!(matches!(
            d.pdf(1.0),
            Err(EstimationError::Unsupported("pdf"))
        ));
    }

    #[test]
    fn test_discrete_draws_match_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let d = Discrete::new(vec![(0.0, 0.2), (1.0, 0.8)]).unwrap();
        let n = 20_000;
        let ones = (0..n).filter(|_| d.draw(&mut rng) == 1.0).count();
        let frac = ones as f64 / n as f64;
        assert!((frac - 0.8).abs() < 0.02, "fraction of ones was {}", frac);
    }

    #[test]
    fn test_static_point_mass() {
        let mut rng = StdRng::seed_from_u64(0);
        let s = Static::new(3.0);
        assert_eq!(s.expectation(), 3.0);
        assert_eq!(s.variance(), 0.0);
        assert_eq!(s.draw(&mut rng), 3.0);
        assert_eq!(s.pdf(3.0).unwrap(), f64::INFINITY);
        assert_eq!(s.pdf(2.0).unwrap(), 0.0);
        assert_eq!(s.cdf(2.0).unwrap(), 0.0);
        assert_eq!(s.cdf(3.0).unwrap(), 1.0);
    }
}
