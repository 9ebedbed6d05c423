//! # Random Walk
//!
//! $$
//! S_{t+\Delta t} = S_t \exp\!\left((\mu-\tfrac12\sigma^2)\Delta t + \sigma\sqrt{\Delta t}\,\epsilon_t\right),\quad \epsilon_t\in\{-1,1\}
//! $$
//!
use ndarray::Array1;
use rand::Rng;

use crate::traits::ProcessExt;

/// Log-price walk with fair coin-flip steps of fixed size.
#[derive(Clone, Debug)]
pub struct RandomWalk {
  pub mu: f64,
  pub sigma: f64,
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
}

impl RandomWalk {
  pub fn new(mu: f64, sigma: f64, n: usize, x0: Option<f64>, t: Option<f64>) -> Self {
    Self {
      mu,
      sigma,
      n,
      x0,
      t,
    }
  }
}

impl ProcessExt for RandomWalk {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let x0 = self.x0.unwrap_or(1.0);
    if self.n < 2 {
      return Array1::from_elem(self.n, x0);
    }

    let dt = self.t.unwrap_or(1.0) / (self.n - 1) as f64;
    let drift = (self.mu - 0.5 * self.sigma.powi(2)) * dt;
    let step = self.sigma * dt.sqrt();
    let mut rng = rand::thread_rng();

    let mut walk = Array1::<f64>::zeros(self.n);
    walk[0] = x0;
    for i in 1..self.n {
      let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
      walk[i] = walk[i - 1] * (drift + sign * step).exp();
    }

    walk
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;

  #[test]
  fn every_step_has_the_same_magnitude() {
    let walk = RandomWalk::new(0.0, 0.4, 50, Some(2.0), Some(1.0)).sample();
    let dt = 1.0 / 49.0;
    let expected = 0.4 * f64::sqrt(dt);
    for w in walk.windows(2) {
      let log_step = (w[1] / w[0]).ln() + 0.5 * 0.16 * dt;
      assert_relative_eq!(log_step.abs(), expected, max_relative = 1e-9);
    }
  }
}
