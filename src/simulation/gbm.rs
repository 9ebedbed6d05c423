//! # Geometric Brownian Motion
//!
//! $$
//! S_{t+\Delta t} = S_t \exp\!\left((\mu-\tfrac12\sigma^2)\Delta t + \sigma\,\Delta W_t\right)
//! $$
//!
use ndarray::Array1;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::LogNormal;

use super::noise::Gn;
use crate::traits::ProcessExt;
use crate::Error;
use crate::Result;

/// Brownian motion with drift on the log price, sampled with the exact
/// log-Euler scheme.
#[derive(Clone, Debug)]
pub struct Gbm {
  pub mu: f64,
  pub sigma: f64,
  /// Path length, including the starting point.
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
}

impl Gbm {
  pub fn new(mu: f64, sigma: f64, n: usize, x0: Option<f64>, t: Option<f64>) -> Self {
    Self {
      mu,
      sigma,
      n,
      x0,
      t,
    }
  }

  /// Law of `S_T`: `ln S_T ~ N(ln S_0 + (μ − σ²/2)T, σ²T)`.
  pub fn terminal_distribution(&self) -> Result<LogNormal> {
    let s0 = self.x0.unwrap_or(1.0);
    let t = self.t.unwrap_or(1.0);
    if s0 <= 0.0 || t <= 0.0 {
      return Err(Error::InvalidInput(format!(
        "terminal law needs positive s0 and horizon, got s0 = {s0}, t = {t}"
      )));
    }
    let location = s0.ln() + (self.mu - 0.5 * self.sigma.powi(2)) * t;
    LogNormal::new(location, self.sigma * t.sqrt())
      .map_err(|e| Error::InvalidInput(e.to_string()))
  }

  /// Terminal price quantiles at probabilities `lower` and `upper`.
  pub fn terminal_band(&self, lower: f64, upper: f64) -> Result<(f64, f64)> {
    let dist = self.terminal_distribution()?;
    Ok((dist.inverse_cdf(lower), dist.inverse_cdf(upper)))
  }
}

impl ProcessExt for Gbm {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let x0 = self.x0.unwrap_or(1.0);
    if self.n < 2 {
      return Array1::from_elem(self.n, x0);
    }

    let gn = Gn::new(self.n - 1, self.t);
    let drift = (self.mu - 0.5 * self.sigma.powi(2)) * gn.dt();
    let dw = gn.sample();

    let mut gbm = Array1::<f64>::zeros(self.n);
    gbm[0] = x0;
    for i in 1..self.n {
      gbm[i] = gbm[i - 1] * (drift + self.sigma * dw[i - 1]).exp();
    }

    gbm
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use statrs::statistics::Distribution;

  use super::*;

  #[test]
  fn gbm_starts_with_x0_and_has_length_n() {
    let path = Gbm::new(0.05, 0.2, 101, Some(17.5), Some(1.0)).sample();
    assert_eq!(path.len(), 101);
    assert_eq!(path[0], 17.5);
    assert!(path.iter().all(|p| *p > 0.0));
  }

  #[test]
  fn zero_volatility_is_deterministic() {
    let path = Gbm::new(0.1, 0.0, 11, Some(100.0), Some(2.0)).sample();
    assert_relative_eq!(path[10], 100.0 * (0.2f64).exp(), max_relative = 1e-12);
  }

  #[test]
  fn terminal_mean_matches_lognormal() {
    let gbm = Gbm::new(0.08, 0.25, 50, Some(10.0), Some(1.0));
    let dist = gbm.terminal_distribution().unwrap();
    assert_relative_eq!(dist.mean().unwrap(), 10.0 * 0.08f64.exp(), max_relative = 1e-12);

    let paths = gbm.sample_par(4000);
    let empirical = paths.iter().map(|p| p[49]).sum::<f64>() / paths.len() as f64;
    assert_relative_eq!(empirical, 10.0 * 0.08f64.exp(), max_relative = 0.03);
  }

  #[test]
  fn band_brackets_the_median() {
    let gbm = Gbm::new(0.0, 0.3, 10, Some(1.0), Some(0.5));
    let (lo, hi) = gbm.terminal_band(0.05, 0.95).unwrap();
    let median = (-(0.5 * 0.09 * 0.5f64)).exp();
    assert!(lo < median && median < hi);
  }

  #[test]
  fn degenerate_paths() {
    assert!(Gbm::new(0.1, 0.2, 0, Some(1.0), None).sample().is_empty());
    assert_eq!(Gbm::new(0.1, 0.2, 1, Some(3.0), None).sample().to_vec(), vec![3.0]);
  }
}
