//! # Cox–Ingersoll–Ross
//!
//! $$
//! dX_t=\theta(\mu-X_t)\,dt+\sigma\sqrt{X_t}\,dW_t
//! $$
//!
use ndarray::Array1;

use super::noise::Gn;
use crate::traits::ProcessExt;

/// Square-root mean reversion. Negative Euler steps are reflected
/// (`use_sym`) or truncated at zero.
#[derive(Clone, Debug)]
pub struct Cir {
  pub theta: f64,
  pub mu: f64,
  pub sigma: f64,
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
  pub use_sym: Option<bool>,
}

impl Cir {
  pub fn new(
    theta: f64,
    mu: f64,
    sigma: f64,
    n: usize,
    x0: Option<f64>,
    t: Option<f64>,
    use_sym: Option<bool>,
  ) -> Self {
    Self {
      theta,
      mu,
      sigma,
      n,
      x0,
      t,
      use_sym,
    }
  }

  /// `2θμ ≥ σ²`, the process never touches zero.
  pub fn feller_holds(&self) -> bool {
    2.0 * self.theta * self.mu >= self.sigma.powi(2)
  }
}

impl ProcessExt for Cir {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let x0 = self.x0.unwrap_or(0.0);
    if self.n < 2 {
      return Array1::from_elem(self.n, x0);
    }

    let gn = Gn::new(self.n - 1, self.t);
    let dt = gn.dt();
    let dw = gn.sample();

    let mut cir = Array1::<f64>::zeros(self.n);
    cir[0] = x0;
    for i in 1..self.n {
      let dcir =
        self.theta * (self.mu - cir[i - 1]) * dt + self.sigma * cir[i - 1].abs().sqrt() * dw[i - 1];

      cir[i] = match self.use_sym.unwrap_or(false) {
        true => (cir[i - 1] + dcir).abs(),
        false => (cir[i - 1] + dcir).max(0.0),
      };
    }

    cir
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cir_is_non_negative_even_without_feller() {
    let cir = Cir::new(0.5, 0.02, 0.6, 1000, Some(0.01), Some(5.0), None);
    assert!(!cir.feller_holds());
    assert!(cir.sample().iter().all(|x| *x >= 0.0));
  }

  #[test]
  fn cir_reverts_toward_mu() {
    let cir = Cir::new(5.0, 0.05, 0.05, 500, Some(0.2), Some(5.0), Some(true));
    assert!(cir.feller_holds());
    let paths = cir.sample_par(200);
    let mean_end = paths.iter().map(|p| p[499]).sum::<f64>() / paths.len() as f64;
    assert!((mean_end - 0.05).abs() < 0.01, "mean_end = {mean_end}");
  }
}
