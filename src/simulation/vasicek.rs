//! # Vasicek
//!
//! $$
//! dX_t=\theta(\mu-X_t)\,dt+\sigma\,dW_t
//! $$
//!
use ndarray::Array1;

use super::noise::Gn;
use crate::traits::ProcessExt;

/// Ornstein–Uhlenbeck mean reversion, Euler scheme. Can go negative.
#[derive(Clone, Debug)]
pub struct Vasicek {
  pub theta: f64,
  pub mu: f64,
  pub sigma: f64,
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
}

impl Vasicek {
  pub fn new(theta: f64, mu: f64, sigma: f64, n: usize, x0: Option<f64>, t: Option<f64>) -> Self {
    Self {
      theta,
      mu,
      sigma,
      n,
      x0,
      t,
    }
  }

  /// Stationary standard deviation `σ / sqrt(2θ)`.
  pub fn stationary_std(&self) -> f64 {
    self.sigma / (2.0 * self.theta).sqrt()
  }
}

impl ProcessExt for Vasicek {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let x0 = self.x0.unwrap_or(self.mu);
    if self.n < 2 {
      return Array1::from_elem(self.n, x0);
    }

    let gn = Gn::new(self.n - 1, self.t);
    let dt = gn.dt();
    let dw = gn.sample();

    let mut ou = Array1::<f64>::zeros(self.n);
    ou[0] = x0;
    for i in 1..self.n {
      ou[i] = ou[i - 1] + self.theta * (self.mu - ou[i - 1]) * dt + self.sigma * dw[i - 1];
    }

    ou
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;

  #[test]
  fn zero_noise_decays_geometrically() {
    let v = Vasicek::new(1.0, 0.03, 0.0, 101, Some(0.10), Some(1.0));
    let path = v.sample();
    let expected = 0.03 + 0.07 * (1.0f64 - 0.01).powi(100);
    assert_relative_eq!(path[100], expected, max_relative = 1e-12);
  }

  #[test]
  fn long_run_spread_matches_stationary_law() {
    let v = Vasicek::new(2.0, 0.0, 0.4, 400, Some(0.0), Some(20.0));
    let ends: Vec<f64> = v.sample_par(3000).iter().map(|p| p[399]).collect();
    let std = (ends.iter().map(|x| x * x).sum::<f64>() / ends.len() as f64).sqrt();
    assert!((std / v.stationary_std() - 1.0).abs() < 0.1, "std = {std}");
  }
}
