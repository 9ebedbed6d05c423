//! # Lévy Flight
//!
//! $$
//! S_{t+\Delta t} = S_t \exp\!\left((\mu-\tfrac12\sigma^2)\Delta t + \sigma\sqrt{\Delta t}\,Z_t\right),\quad Z_t\sim t_\alpha
//! $$
//!
use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand_distr::StudentT;

use crate::traits::ProcessExt;
use crate::Error;
use crate::Result;

/// Log-price walk with Student-t shocks; `alpha` is the degrees of freedom,
/// smaller values give heavier tails.
#[derive(Clone, Debug)]
pub struct LevyFlight {
  pub mu: f64,
  pub sigma: f64,
  pub alpha: f64,
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
  shocks: StudentT<f64>,
}

impl LevyFlight {
  pub fn new(
    mu: f64,
    sigma: f64,
    alpha: f64,
    n: usize,
    x0: Option<f64>,
    t: Option<f64>,
  ) -> Result<Self> {
    let shocks = StudentT::new(alpha)
      .map_err(|e| Error::InvalidInput(format!("levy alpha {alpha}: {e}")))?;
    Ok(Self {
      mu,
      sigma,
      alpha,
      n,
      x0,
      t,
      shocks,
    })
  }
}

impl ProcessExt for LevyFlight {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let x0 = self.x0.unwrap_or(1.0);
    if self.n < 2 {
      return Array1::from_elem(self.n, x0);
    }

    let dt = self.t.unwrap_or(1.0) / (self.n - 1) as f64;
    let drift = (self.mu - 0.5 * self.sigma.powi(2)) * dt;
    let scale = self.sigma * dt.sqrt();
    let z = Array1::random(self.n - 1, &self.shocks);

    let mut levy = Array1::<f64>::zeros(self.n);
    levy[0] = x0;
    for i in 1..self.n {
      levy[i] = levy[i - 1] * (drift + scale * z[i - 1]).exp();
    }

    levy
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn levy_path_is_positive() {
    let levy = LevyFlight::new(0.01, 0.3, 1.5, 200, Some(19.2), Some(1.0 / 24.0)).unwrap();
    let path = levy.sample();
    assert_eq!(path.len(), 200);
    assert_eq!(path[0], 19.2);
    assert!(path.iter().all(|p| p.is_finite() && *p > 0.0));
  }

  #[test]
  fn non_positive_alpha_is_rejected() {
    assert!(matches!(
      LevyFlight::new(0.0, 0.2, 0.0, 10, None, None),
      Err(Error::InvalidInput(_))
    ));
  }
}
