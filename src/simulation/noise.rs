//! # Gaussian Increments
//!
//! $$
//! \Delta W_i \sim \mathcal N(0, \Delta t),\qquad
//! \Delta W^{(2)}_i = \rho\,\Delta W^{(1)}_i + \sqrt{1-\rho^2}\,\Delta Z_i
//! $$
//!
//! Gaussian increment generators shared by the diffusion simulators.

use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand_distr::StandardNormal;

use crate::traits::ProcessExt;
use crate::Error;
use crate::Result;

/// `n` Brownian increments over a horizon `t` (default 1).
#[derive(Copy, Clone, Debug)]
pub struct Gn {
  pub n: usize,
  pub t: Option<f64>,
}

impl Gn {
  pub fn new(n: usize, t: Option<f64>) -> Self {
    Gn { n, t }
  }

  pub fn dt(&self) -> f64 {
    self.t.unwrap_or(1.0) / self.n.max(1) as f64
  }
}

impl ProcessExt for Gn {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    Array1::<f64>::random(self.n, StandardNormal) * self.dt().sqrt()
  }
}

/// Pair of correlated Brownian increment series.
#[derive(Copy, Clone, Debug)]
pub struct Cgns {
  pub rho: f64,
  pub n: usize,
  pub t: Option<f64>,
}

impl Cgns {
  pub fn new(rho: f64, n: usize, t: Option<f64>) -> Result<Self> {
    if !(-1.0..=1.0).contains(&rho) {
      return Err(Error::InvalidInput(format!(
        "correlation must be in [-1, 1], got {rho}"
      )));
    }
    Ok(Self { rho, n, t })
  }

  pub fn dt(&self) -> f64 {
    Gn::new(self.n, self.t).dt()
  }
}

impl ProcessExt for Cgns {
  type Output = [Array1<f64>; 2];

  fn sample(&self) -> Self::Output {
    let gn = Gn::new(self.n, self.t);
    let gn1 = gn.sample();
    let z = gn.sample();
    let c = (1.0 - self.rho.powi(2)).sqrt();
    let gn2 = &gn1 * self.rho + &z * c;
    [gn1, gn2]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn increments_have_step_variance() {
    let gn = Gn::new(20_000, Some(2.0));
    let x = gn.sample();
    let var = x.mapv(|v| v * v).mean().unwrap();
    assert!((var / gn.dt() - 1.0).abs() < 0.05);
  }

  #[test]
  fn correlated_pair_has_target_correlation() {
    let [a, b] = Cgns::new(-0.7, 20_000, None).unwrap().sample();
    let corr = a.dot(&b) / (a.dot(&a).sqrt() * b.dot(&b).sqrt());
    assert!((corr + 0.7).abs() < 0.03, "corr = {corr}");
  }

  #[test]
  fn correlation_out_of_range_is_rejected() {
    assert!(Cgns::new(1.5, 10, None).is_err());
  }
}
