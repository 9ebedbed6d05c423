//! # Weight Optimizers
//!
//! $$
//! \min_{\mathbf w}\ \mathbf w^\top\Sigma\mathbf w
//! \quad\text{or}\quad
//! \min_{\mathbf w}\ -\frac{\mathbf w^\top(\mu-r_f)}{\sqrt{\mathbf w^\top\Sigma\mathbf w}}
//! \qquad\text{s.t. } \mathbf 1^\top\mathbf w=1,\ 0\le w_i\le 1
//! $$
//!
//! Minimum variance is a QP on the simplex. Maximum Sharpe is solved exactly
//! through its homogenized QP
//!
//! $$
//! \min_{\mathbf y\ge 0}\ \mathbf y^\top\Sigma\mathbf y\quad\text{s.t. }(\mu-r_f)^\top\mathbf y=1,
//! \qquad \mathbf w=\mathbf y/\mathbf 1^\top\mathbf y
//! $$
//!
//! which needs one asset above the risk-free rate. Otherwise the ratio is
//! minimized over `w = softmax(z)` with Nelder-Mead.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ndarray::Array2;
use tracing::debug;

use super::qp::SolverConfig;
use super::qp::VarianceQp;
use super::types::portfolio_variance;
use super::types::OptimizerMethod;
use crate::Error;
use crate::Result;

/// Negative Sharpe ratio of `softmax(z)`, so every `z` maps to long-only
/// weights.
#[derive(Clone, Debug)]
pub struct NegSharpeCost {
  pub cov: Array2<f64>,
  pub excess: Array1<f64>,
}

impl CostFunction for NegSharpeCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, z: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let w = softmax(z);
    let var = portfolio_variance(&w, &self.cov);
    if !(var > 1e-30) {
      return Err(anyhow::anyhow!("portfolio volatility vanished (variance {var})"));
    }
    Ok(-self.excess.dot(&w) / var.sqrt())
  }
}

pub(crate) fn softmax(z: &[f64]) -> Array1<f64> {
  let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
  let e: Array1<f64> = z.iter().map(|v| (v - max).exp()).collect();
  let total = e.sum();
  e / total
}

/// `n` copies of `1/n`.
pub fn equal_weight(n: usize) -> Array1<f64> {
  if n == 0 {
    return Array1::zeros(0);
  }
  Array1::from_elem(n, 1.0 / n as f64)
}

/// Long-only weights for `method` with the default solver settings.
pub fn optimize_weights(
  cov: &Array2<f64>,
  mean: Option<&Array1<f64>>,
  method: OptimizerMethod,
  risk_free: f64,
) -> Result<Array1<f64>> {
  optimize_weights_with(cov, mean, method, risk_free, &SolverConfig::default())
}

pub fn optimize_weights_with(
  cov: &Array2<f64>,
  mean: Option<&Array1<f64>>,
  method: OptimizerMethod,
  risk_free: f64,
  config: &SolverConfig,
) -> Result<Array1<f64>> {
  let n = cov.nrows();
  if cov.ncols() != n {
    return Err(Error::InvalidInput(format!(
      "covariance must be square, got {}x{}",
      n,
      cov.ncols()
    )));
  }
  if n == 0 {
    return Err(Error::InsufficientData("no assets to allocate".into()));
  }
  if let Some(mu) = mean {
    if mu.len() != n {
      return Err(Error::InvalidInput(format!(
        "mean has {} entries for a {n}x{n} covariance",
        mu.len()
      )));
    }
  }
  if cov.iter().chain(mean.into_iter().flatten()).any(|v| !v.is_finite()) {
    return Err(Error::InvalidInput("non-finite optimizer input".into()));
  }

  match method {
    OptimizerMethod::EqualWeight => Ok(equal_weight(n)),
    OptimizerMethod::MinVariance => min_variance(cov, config),
    OptimizerMethod::MaxSharpe => {
      let mu = mean.ok_or_else(|| {
        Error::MissingInput("max_sharpe requires expected returns".into())
      })?;
      max_sharpe(cov, &(mu - risk_free), config)
    }
  }
}

pub(crate) fn min_variance(cov: &Array2<f64>, config: &SolverConfig) -> Result<Array1<f64>> {
  let n = cov.nrows();
  if n == 1 {
    return Ok(equal_weight(1));
  }
  let raw = VarianceQp::new(cov)
    .with_equality(std::iter::repeat(1.0).take(n), 1.0)
    .solve(config)?;
  Ok(normalize_long_only(raw.into_iter()))
}

fn max_sharpe(
  cov: &Array2<f64>,
  excess: &Array1<f64>,
  config: &SolverConfig,
) -> Result<Array1<f64>> {
  let n = cov.nrows();
  if n == 1 {
    return Ok(equal_weight(1));
  }
  if excess.iter().all(|e| *e <= 0.0) {
    debug!("no asset beats the risk-free rate, minimizing the ratio directly");
    return least_negative_sharpe(cov, excess, config);
  }

  let y = VarianceQp::new(cov)
    .with_equality(excess.iter().copied(), 1.0)
    .solve(config)?;
  let scale = y.iter().map(|v| v.max(0.0)).sum::<f64>();
  if !(scale > 0.0) {
    return Err(Error::OptimizationFailed(
      "tangency portfolio has no positive weight".into(),
    ));
  }
  Ok(normalize_long_only(y.into_iter().map(|v| v / scale)))
}

/// Nelder-Mead over softmax logits, simplex spanned by the unit vectors.
fn least_negative_sharpe(
  cov: &Array2<f64>,
  excess: &Array1<f64>,
  config: &SolverConfig,
) -> Result<Array1<f64>> {
  let n = excess.len();
  let x0 = vec![0.0; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0.clone());
  for i in 0..n {
    let mut point = x0.clone();
    point[i] = 1.0;
    simplex.push(point);
  }

  let cost = NegSharpeCost {
    cov: cov.clone(),
    excess: excess.clone(),
  };
  let solver = NelderMead::new(simplex)
    .with_sd_tolerance(1e-10)
    .map_err(|e| Error::OptimizationFailed(e.to_string()))?;
  let res = Executor::new(cost, solver)
    .configure(|state| state.max_iters(config.simplex_iters))
    .run()
    .map_err(|e| Error::OptimizationFailed(e.to_string()))?;

  let z = res
    .state
    .best_param
    .ok_or_else(|| Error::OptimizationFailed("nelder-mead returned no parameters".into()))?;
  Ok(normalize_long_only(softmax(&z).into_iter()))
}

/// Clamp solver noise back into `[0, 1]` and rescale to sum 1.
pub(crate) fn normalize_long_only(raw: impl Iterator<Item = f64>) -> Array1<f64> {
  let clipped: Array1<f64> = raw.map(|v| v.clamp(0.0, 1.0)).collect();
  let total = clipped.sum();
  if total <= f64::EPSILON {
    return equal_weight(clipped.len());
  }
  clipped / total
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use ndarray_rand::RandomExt;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use rand_distr::Normal;
  use rand_distr::Uniform;

  use super::*;

  fn two_asset() -> (Array1<f64>, Array2<f64>) {
    (array![0.10, 0.20], array![[0.04, 0.01], [0.01, 0.09]])
  }

  fn five_asset_cov() -> Array2<f64> {
    let a = array![
      [0.20, 0.05, 0.00, 0.10, -0.05],
      [0.00, 0.15, 0.05, 0.00, 0.02],
      [0.10, 0.00, 0.25, 0.05, 0.00],
      [0.00, 0.08, 0.00, 0.12, 0.03],
      [0.05, 0.00, 0.04, 0.00, 0.30]
    ];
    a.dot(&a.t()) + Array2::<f64>::eye(5) * 0.01
  }

  fn assert_long_only(w: &Array1<f64>) {
    assert!((w.sum() - 1.0).abs() <= 1e-6, "sum {}", w.sum());
    assert!(w.iter().all(|&x| (0.0..=1.0).contains(&x)), "{w}");
  }

  #[test]
  fn min_variance_tilts_to_low_risk_asset() {
    let (mu, cov) = two_asset();
    let w = optimize_weights(&cov, Some(&mu), OptimizerMethod::MinVariance, 0.02).unwrap();

    assert_long_only(&w);
    assert!(w[0] > 0.5);
    // closed form (σ₂² − σ₁₂) / (σ₁² + σ₂² − 2σ₁₂)
    assert_abs_diff_eq!(w[0], 0.08 / 0.11, epsilon = 1e-4);
  }

  #[test]
  fn max_sharpe_matches_tangency_portfolio() {
    let (mu, cov) = two_asset();
    let w = optimize_weights(&cov, Some(&mu), OptimizerMethod::MaxSharpe, 0.02).unwrap();

    assert_long_only(&w);
    // Σ⁻¹(μ − r_f) ∝ [0.0054, 0.0064]
    assert_abs_diff_eq!(w[0], 0.0054 / 0.0118, epsilon = 1e-4);
    assert_abs_diff_eq!(w[1], 0.0064 / 0.0118, epsilon = 1e-4);
  }

  #[test]
  fn max_sharpe_without_mean_is_missing_input() {
    let (_, cov) = two_asset();
    assert!(matches!(
      optimize_weights(&cov, None, OptimizerMethod::MaxSharpe, 0.02),
      Err(Error::MissingInput(_))
    ));
  }

  #[test]
  fn equal_weight_ignores_mean() {
    let (_, cov) = two_asset();
    let w = optimize_weights(&cov, None, OptimizerMethod::EqualWeight, 0.02).unwrap();
    assert_eq!(w, array![0.5, 0.5]);
  }

  #[test]
  fn equal_weight_sizes() {
    for n in [1usize, 2, 10, 100] {
      let w = equal_weight(n);
      assert_eq!(w.len(), n);
      assert!(w.iter().all(|&x| x == 1.0 / n as f64));
      assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn five_assets_respect_constraints() {
    let cov = five_asset_cov();
    let mu = array![0.05, 0.12, 0.08, -0.02, 0.15];

    for method in OptimizerMethod::ALL {
      let w = optimize_weights(&cov, Some(&mu), method, 0.02).unwrap();
      assert_long_only(&w);
    }
  }

  #[test]
  fn sharpe_without_positive_excess_stays_long_only() {
    let cov = array![[0.04, 0.0, 0.0], [0.0, 0.09, 0.0], [0.0, 0.0, 0.16]];
    let mu = array![0.01, -0.05, -0.01];
    let w = optimize_weights(&cov, Some(&mu), OptimizerMethod::MaxSharpe, 0.02).unwrap();

    assert_long_only(&w);
    // -0.01 / 0.2 beats every mix that adds the worse assets
    let sharpe = |w: &Array1<f64>| (w.dot(&mu) - 0.02) / portfolio_variance(w, &cov).sqrt();
    assert!(sharpe(&w) >= sharpe(&array![1.0, 0.0, 0.0]) - 1e-3);
    assert!(sharpe(&w) > sharpe(&equal_weight(3)));
  }

  /// Factor-model covariance with idiosyncratic noise and spread-out means.
  fn random_market(n: usize, seed: u64) -> (Array1<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let loadings = Array2::random_using((n, 3), Normal::new(0.0, 0.15).unwrap(), &mut rng);
    let idio = Array1::random_using(n, Uniform::new(0.005, 0.04), &mut rng);
    let cov = loadings.dot(&loadings.t()) + Array2::from_diag(&idio);
    let mu = Array1::random_using(n, Uniform::new(-0.05, 0.25), &mut rng);
    (mu, cov)
  }

  #[test]
  fn random_markets_respect_constraints() {
    for n in [10usize, 20, 40] {
      for seed in 0..3 {
        let (mu, cov) = random_market(n, seed);
        let ew_var = portfolio_variance(&equal_weight(n), &cov);
        for method in OptimizerMethod::ALL {
          let w = optimize_weights(&cov, Some(&mu), method, 0.02)
            .unwrap_or_else(|e| panic!("n={n} seed={seed} {method:?}: {e}"));
          assert_eq!(w.len(), n);
          assert_long_only(&w);
        }
        let mv = optimize_weights(&cov, Some(&mu), OptimizerMethod::MinVariance, 0.02).unwrap();
        assert!(portfolio_variance(&mv, &cov) <= ew_var + 1e-12);
      }
    }
  }

  #[test]
  fn tangency_beats_min_variance_on_sharpe() {
    let (mu, cov) = random_market(20, 7);
    let sharpe = |w: &Array1<f64>| (w.dot(&mu) - 0.02) / portfolio_variance(w, &cov).sqrt();
    let ms = optimize_weights(&cov, Some(&mu), OptimizerMethod::MaxSharpe, 0.02).unwrap();
    for method in [OptimizerMethod::MinVariance, OptimizerMethod::EqualWeight] {
      let other = optimize_weights(&cov, Some(&mu), method, 0.02).unwrap();
      assert!(sharpe(&ms) >= sharpe(&other) - 1e-6, "{method:?}");
    }
  }

  #[test]
  fn negative_excess_assets_get_no_sharpe_weight() {
    let cov = array![[0.04, 0.0, 0.0], [0.0, 0.04, 0.0], [0.0, 0.0, 0.04]];
    let mu = array![0.12, 0.10, -0.30];
    let w = optimize_weights(&cov, Some(&mu), OptimizerMethod::MaxSharpe, 0.02).unwrap();

    assert_long_only(&w);
    assert!(w[2] < 1e-6);
    assert!(w[0] > w[1]);
  }

  #[test]
  fn single_asset_is_fully_invested() {
    let w = optimize_weights(&array![[0.09]], None, OptimizerMethod::MinVariance, 0.02).unwrap();
    assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn shape_problems_are_invalid_input() {
    let (mu, _) = two_asset();
    let rect = Array2::<f64>::zeros((2, 3));
    assert!(matches!(
      optimize_weights(&rect, None, OptimizerMethod::MinVariance, 0.02),
      Err(Error::InvalidInput(_))
    ));
    let cov3 = Array2::<f64>::eye(3);
    assert!(matches!(
      optimize_weights(&cov3, Some(&mu), OptimizerMethod::MaxSharpe, 0.02),
      Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
      optimize_weights(&Array2::zeros((0, 0)), None, OptimizerMethod::MinVariance, 0.02),
      Err(Error::InsufficientData(_))
    ));
  }
}
