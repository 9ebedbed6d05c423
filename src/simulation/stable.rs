//! # Symmetric α-Stable Walk
//!
//! $$
//! X=\frac{\sin(\alpha U)}{(\cos U)^{1/\alpha}}\left(\frac{\cos((1-\alpha)U)}{W}\right)^{\frac{1-\alpha}{\alpha}},
//! \quad U\sim\mathcal U(-\tfrac\pi2,\tfrac\pi2),\ W\sim\operatorname{Exp}(1)
//! $$
//!
//! Chambers–Mallows–Stuck sampler, increments scaled by `Δt^{1/α}`.

use std::f64::consts::FRAC_PI_2;

use ndarray::Array1;
use rand::Rng;
use rand_distr::Exp1;

use crate::traits::ProcessExt;
use crate::Error;
use crate::Result;

/// One standard symmetric α-stable draw.
pub fn stable_draw<R: Rng>(alpha: f64, rng: &mut R) -> f64 {
  let u: f64 = rng.gen_range(-FRAC_PI_2..FRAC_PI_2);
  if (alpha - 1.0).abs() < 1e-12 {
    return u.tan();
  }
  let w: f64 = rng.sample(Exp1);
  let head = (alpha * u).sin() / u.cos().powf(1.0 / alpha);
  let tail = (((1.0 - alpha) * u).cos() / w).powf((1.0 - alpha) / alpha);
  head * tail
}

#[derive(Clone, Debug)]
pub struct AlphaStable {
  pub mu: f64,
  pub sigma: f64,
  /// Stability index in `(0, 2]`; 2 is Gaussian.
  pub alpha: f64,
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
}

impl AlphaStable {
  pub fn new(
    mu: f64,
    sigma: f64,
    alpha: f64,
    n: usize,
    x0: Option<f64>,
    t: Option<f64>,
  ) -> Result<Self> {
    if !(alpha > 0.0 && alpha <= 2.0) {
      return Err(Error::InvalidInput(format!(
        "stability index must be in (0, 2], got {alpha}"
      )));
    }
    Ok(Self {
      mu,
      sigma,
      alpha,
      n,
      x0,
      t,
    })
  }
}

impl ProcessExt for AlphaStable {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let x0 = self.x0.unwrap_or(1.0);
    if self.n < 2 {
      return Array1::from_elem(self.n, x0);
    }

    let dt = self.t.unwrap_or(1.0) / (self.n - 1) as f64;
    let drift = (self.mu - 0.5 * self.sigma.powi(2)) * dt;
    let scale = self.sigma * dt.powf(1.0 / self.alpha);
    let mut rng = rand::thread_rng();

    let mut path = Array1::<f64>::zeros(self.n);
    path[0] = x0;
    for i in 1..self.n {
      let step = drift + scale * stable_draw(self.alpha, &mut rng);
      path[i] = path[i - 1] * step.exp();
    }

    path
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn alpha_two_is_gaussian_with_variance_two() {
    let mut rng = rand::thread_rng();
    let draws: Vec<f64> = (0..40_000).map(|_| stable_draw(2.0, &mut rng)).collect();
    let var = draws.iter().map(|x| x * x).sum::<f64>() / draws.len() as f64;
    assert!((var - 2.0).abs() < 0.1, "var = {var}");
  }

  #[test]
  fn draws_are_symmetric() {
    let mut rng = rand::thread_rng();
    let positive = (0..20_000)
      .filter(|_| stable_draw(1.5, &mut rng) > 0.0)
      .count();
    assert!((positive as f64 / 20_000.0 - 0.5).abs() < 0.02);
  }

  #[test]
  fn invalid_index_is_rejected() {
    assert!(AlphaStable::new(0.0, 0.2, 2.5, 10, None, None).is_err());
    assert!(AlphaStable::new(0.0, 0.2, 0.0, 10, None, None).is_err());
  }

  #[test]
  fn path_starts_at_x0() {
    let path = AlphaStable::new(0.01, 0.2, 1.7, 64, Some(5.0), Some(0.1))
      .unwrap()
      .sample();
    assert_eq!(path.len(), 64);
    assert_eq!(path[0], 5.0);
  }
}
