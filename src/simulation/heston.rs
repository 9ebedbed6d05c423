//! # Heston
//!
//! $$
//! \begin{aligned}
//! dS_t&=\mu S_t\,dt+\sqrt{v_t}S_t\,dW^1_t\\
//! dv_t&=\kappa(\theta-v_t)\,dt+\sigma\sqrt{v_t}\,dW^2_t,\qquad d\langle W^1,W^2\rangle_t=\rho\,dt
//! \end{aligned}
//! $$
//!
//! Stochastic-volatility price paths. The variance is floored at zero inside
//! the drift and diffusion terms (full truncation).

use ndarray::Array1;

use super::noise::Cgns;
use crate::traits::ProcessExt;
use crate::Error;
use crate::Result;

/// Stochastic-volatility price model, full-truncation Euler scheme.
#[derive(Clone, Debug)]
pub struct Heston {
  /// Initial stock price
  pub s0: Option<f64>,
  /// Initial variance
  pub v0: Option<f64>,
  /// Mean reversion rate
  pub kappa: f64,
  /// Long-run variance
  pub theta: f64,
  /// Volatility of variance
  pub sigma: f64,
  /// Correlation between price and variance shocks
  pub rho: f64,
  /// Drift of the stock price
  pub mu: f64,
  /// Path length, including the starting point
  pub n: usize,
  /// Horizon
  pub t: Option<f64>,
  cgns: Cgns,
}

impl Heston {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    s0: Option<f64>,
    v0: Option<f64>,
    kappa: f64,
    theta: f64,
    sigma: f64,
    rho: f64,
    mu: f64,
    n: usize,
    t: Option<f64>,
  ) -> Result<Self> {
    if kappa < 0.0 || theta < 0.0 || sigma < 0.0 || v0.is_some_and(|v| v < 0.0) {
      return Err(Error::InvalidInput(
        "heston kappa, theta, sigma and v0 must be non-negative".into(),
      ));
    }

    Ok(Self {
      s0,
      v0,
      kappa,
      theta,
      sigma,
      rho,
      mu,
      n,
      t,
      cgns: Cgns::new(rho, n.saturating_sub(1), t)?,
    })
  }
}

impl ProcessExt for Heston {
  /// `[price, variance]`
  type Output = [Array1<f64>; 2];

  fn sample(&self) -> Self::Output {
    let s0 = self.s0.unwrap_or(1.0);
    let v0 = self.v0.unwrap_or(self.theta);
    if self.n < 2 {
      return [Array1::from_elem(self.n, s0), Array1::from_elem(self.n, v0)];
    }

    let dt = self.cgns.dt();
    let [dw1, dw2] = self.cgns.sample();

    let mut s = Array1::<f64>::zeros(self.n);
    let mut v = Array1::<f64>::zeros(self.n);
    s[0] = s0;
    v[0] = v0;

    let mut v_raw = v0;
    for i in 1..self.n {
      let v_pos = v_raw.max(0.0);
      s[i] = s[i - 1] * ((self.mu - 0.5 * v_pos) * dt + v_pos.sqrt() * dw1[i - 1]).exp();
      v_raw += self.kappa * (self.theta - v_pos) * dt + self.sigma * v_pos.sqrt() * dw2[i - 1];
      v[i] = v_raw.max(0.0);
    }

    [s, v]
  }
}
