//! # Return/Covariance Estimator
//!
//! $$
//! \hat\mu = 252\,\bar r,\qquad \hat\Sigma = \frac{252}{T-1}\sum_t (r_t-\bar r)(r_t-\bar r)^\top + \varepsilon I
//! $$
//!
//! Annualized moments of a return matrix with diagonal regularization.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use super::frontier::ZERO_VARIANCE;
use crate::market::prices::ReturnMatrix;
use crate::Error;
use crate::Result;
use crate::COV_EPSILON;
use crate::TRADING_DAYS;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorConfig {
  /// Periods per year used to annualize.
  pub periods_per_year: f64,
  /// Diagonal loading applied to the covariance.
  pub epsilon: f64,
}

impl Default for EstimatorConfig {
  fn default() -> Self {
    Self {
      periods_per_year: TRADING_DAYS,
      epsilon: COV_EPSILON,
    }
  }
}

/// Annualized mean vector and regularized covariance over `symbols`.
#[derive(Clone, Debug)]
pub struct MarketEstimate {
  pub symbols: Vec<String>,
  pub mean: Array1<f64>,
  pub cov: Array2<f64>,
  /// Annualized sample variances before regularization.
  pub sample_variances: Array1<f64>,
}

impl MarketEstimate {
  /// Per-asset standard deviations.
  pub fn volatilities(&self) -> Array1<f64> {
    self.cov.diag().mapv(|v| v.max(0.0).sqrt())
  }

  pub fn n_assets(&self) -> usize {
    self.symbols.len()
  }

  /// First asset whose unregularized variance is numerically zero.
  pub fn zero_variance(&self) -> Option<usize> {
    self
      .sample_variances
      .iter()
      .position(|v| v.abs() <= ZERO_VARIANCE)
  }
}

/// `cov + epsilon * I`, off-diagonal entries untouched.
pub fn regularize(cov: &Array2<f64>, epsilon: f64) -> Array2<f64> {
  let mut out = cov.clone();
  out.diag_mut().mapv_inplace(|v| v + epsilon);
  out
}

/// Sample covariance (ddof = 1) of the columns of `returns`.
pub fn sample_covariance(returns: &Array2<f64>) -> Result<Array2<f64>> {
  let t = returns.nrows();
  if t < 2 {
    return Err(Error::InsufficientData(format!(
      "covariance needs at least 2 periods, got {t}"
    )));
  }
  let mean = returns
    .mean_axis(Axis(0))
    .ok_or_else(|| Error::InsufficientData("empty return matrix".into()))?;
  let centered = returns - &mean;
  Ok(centered.t().dot(&centered) / (t - 1) as f64)
}

/// Estimate annualized mean returns and covariance from `returns`.
pub fn estimate(returns: &ReturnMatrix, config: &EstimatorConfig) -> Result<MarketEstimate> {
  let r = returns.returns();
  if r.ncols() == 0 {
    return Err(Error::InsufficientData("no symbols in return matrix".into()));
  }
  if r.nrows() < 2 {
    return Err(Error::InsufficientData(format!(
      "at least 2 return periods required, got {}",
      r.nrows()
    )));
  }

  let incomplete: Vec<&str> = r
    .axis_iter(Axis(1))
    .zip(returns.symbols())
    .filter(|(col, _)| col.iter().any(|v| !v.is_finite()))
    .map(|(_, s)| s.as_str())
    .collect();
  if !incomplete.is_empty() {
    return Err(Error::InsufficientData(format!(
      "missing returns for {}",
      incomplete.join(", ")
    )));
  }

  let mean = r
    .mean_axis(Axis(0))
    .ok_or_else(|| Error::InsufficientData("empty return matrix".into()))?
    * config.periods_per_year;
  let cov = sample_covariance(r)? * config.periods_per_year;

  Ok(MarketEstimate {
    symbols: returns.symbols().to_vec(),
    mean,
    sample_variances: cov.diag().to_owned(),
    cov: regularize(&cov, config.epsilon),
  })
}
