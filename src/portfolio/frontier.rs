//! # Efficient Frontier
//!
//! $$
//! \begin{aligned}
//! A&=\mathbf 1^\top\Sigma^{-1}\mathbf 1,\quad B=\mathbf 1^\top\Sigma^{-1}\mu,\quad C=\mu^\top\Sigma^{-1}\mu,\quad D=AC-B^2\\
//! \mathbf w(t)&=\frac{C-Bt}{D}\,\Sigma^{-1}\mathbf 1+\frac{At-B}{D}\,\Sigma^{-1}\mu
//! \end{aligned}
//! $$
//!
//! Closed-form mean-variance frontier (short sales allowed) and the long-only
//! frontier solved per target return.

use nalgebra::DMatrix;
use nalgebra::DVector;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::QuantileExt;
use tracing::debug;
use tracing::warn;

use super::optimizers::equal_weight;
use super::optimizers::min_variance;
use super::optimizers::normalize_long_only;
use super::qp::SolverConfig;
use super::qp::VarianceQp;
use super::types::portfolio_variance;
use super::types::Frontier;
use super::types::FrontierDegeneracy;
use super::types::FrontierPoint;
use crate::Error;
use crate::Result;

/// Variances at or below this are treated as a constant-price asset.
pub const ZERO_VARIANCE: f64 = 1e-8;
const ZERO_D: f64 = 1e-8;

fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
  DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

fn to_dvector(a: &Array1<f64>) -> DVector<f64> {
  DVector::from_iterator(a.len(), a.iter().copied())
}

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
  match n {
    0 => Vec::new(),
    1 => vec![start],
    _ => {
      let step = (end - start) / (n - 1) as f64;
      let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
      out[n - 1] = end;
      out
    }
  }
}

/// Solutions of `Σx = 1` and `Σx = μ`, or why they do not exist.
fn solve_pair(
  cov: &DMatrix<f64>,
  mu: &DVector<f64>,
) -> std::result::Result<(DVector<f64>, DVector<f64>), FrontierDegeneracy> {
  let ones = DVector::from_element(mu.len(), 1.0);

  let (x1, xmu) = match cov.clone().cholesky() {
    Some(chol) => (chol.solve(&ones), chol.solve(mu)),
    None => {
      debug!("cholesky failed, falling back to LU");
      let lu = cov.clone().lu();
      let pivots = lu.u().diagonal().abs();
      if pivots.min() <= 1e-12 * pivots.max() {
        return Err(FrontierDegeneracy::SingularCovariance);
      }
      match (lu.solve(&ones), lu.solve(mu)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(FrontierDegeneracy::SingularCovariance),
      }
    }
  };

  if x1.iter().chain(xmu.iter()).any(|v| !v.is_finite()) {
    return Err(FrontierDegeneracy::SingularCovariance);
  }
  Ok((x1, xmu))
}

fn check_inputs(
  mean: &Array1<f64>,
  cov: &Array2<f64>,
) -> std::result::Result<(), FrontierDegeneracy> {
  let n = mean.len();
  if n == 0
    || cov.dim() != (n, n)
    || mean.iter().chain(cov.iter()).any(|v| !v.is_finite())
  {
    return Err(FrontierDegeneracy::InvalidShape);
  }
  if let Some(index) = cov.diag().iter().position(|v| v.abs() <= ZERO_VARIANCE) {
    return Err(FrontierDegeneracy::ZeroVariance { index });
  }
  Ok(())
}

/// Unconstrained mean-variance frontier with `num_points` targets spread
/// evenly between the smallest and largest expected return.
///
/// Degenerate inputs yield an empty frontier tagged with the reason; this
/// never fails.
pub fn efficient_frontier(mean: &Array1<f64>, cov: &Array2<f64>, num_points: usize) -> Frontier {
  match closed_form(mean, cov, num_points) {
    Ok(frontier) => frontier,
    Err(reason) => {
      warn!(%reason, "efficient frontier is degenerate, returning empty frontier");
      Frontier::empty(reason)
    }
  }
}

fn closed_form(
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  num_points: usize,
) -> std::result::Result<Frontier, FrontierDegeneracy> {
  check_inputs(mean, cov)?;

  let mu = to_dvector(mean);
  let (x1, xmu) = solve_pair(&to_dmatrix(cov), &mu)?;

  let a = x1.sum();
  let b = xmu.sum();
  let c = mu.dot(&xmu);
  let d = a * c - b * b;
  if !d.is_finite() || d.abs() <= ZERO_D || d <= 1e-10 * (a * c).abs() {
    return Err(FrontierDegeneracy::FlatReturns);
  }

  let (lo, hi) = match (mean.min(), mean.max()) {
    (Ok(lo), Ok(hi)) => (*lo, *hi),
    _ => return Err(FrontierDegeneracy::InvalidShape),
  };

  let points = linspace(lo, hi, num_points)
    .into_iter()
    .map(|t| {
      let lambda1 = (c - b * t) / d;
      let lambda2 = (a * t - b) / d;
      let w = &x1 * lambda1 + &xmu * lambda2;
      let weights = Array1::from_iter(w.iter().copied());
      FrontierPoint {
        risk: portfolio_variance(&weights, cov).max(0.0).sqrt(),
        target_return: t,
        weights,
      }
    })
    .collect();

  Ok(Frontier::new(points))
}

/// Long-only frontier: for each target `t`, minimize `wᵀΣw` subject to
/// `1ᵀw = 1`, `μᵀw = t` and `w ≥ 0` (`w ≤ 1` follows).
///
/// The two end targets only admit the assets whose mean equals them, so those
/// points are the minimum-variance mix of the tied assets.
pub fn long_only_frontier(
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  num_points: usize,
  config: &SolverConfig,
) -> Result<Frontier> {
  let n = mean.len();
  if n == 0 {
    return Err(Error::InsufficientData("no assets for a frontier".into()));
  }
  if cov.dim() != (n, n) {
    return Err(Error::InvalidInput(format!(
      "covariance {:?} does not match {n} expected returns",
      cov.dim()
    )));
  }

  let lo = *mean.min().map_err(|e| Error::InvalidInput(e.to_string()))?;
  let hi = *mean.max().map_err(|e| Error::InvalidInput(e.to_string()))?;
  if hi - lo <= 1e-12 {
    warn!("expected returns are flat, long-only frontier is empty");
    return Ok(Frontier::empty(FrontierDegeneracy::FlatReturns));
  }
  let tie = 1e-12 * lo.abs().max(hi.abs()).max(1.0);

  let mut points = Vec::with_capacity(num_points);
  for t in linspace(lo, hi, num_points) {
    let weights = if t - lo <= tie || hi - t <= tie {
      tied_min_variance(mean, cov, t, tie, config)?
    } else {
      let raw = VarianceQp::new(cov)
        .with_equality(std::iter::repeat(1.0).take(n), 1.0)
        .with_equality(mean.iter().copied(), t)
        .solve(config)
        .map_err(|e| match e {
          Error::OptimizationFailed(msg) => {
            Error::OptimizationFailed(format!("long-only target {t:.6}: {msg}"))
          }
          other => other,
        })?;
      normalize_long_only(raw.into_iter())
    };
    points.push(FrontierPoint {
      risk: portfolio_variance(&weights, cov).max(0.0).sqrt(),
      target_return: t,
      weights,
    });
  }

  Ok(Frontier::new(points))
}

/// Minimum-variance mix of the assets with `μᵢ = t`, zero elsewhere.
fn tied_min_variance(
  mean: &Array1<f64>,
  cov: &Array2<f64>,
  t: f64,
  tie: f64,
  config: &SolverConfig,
) -> Result<Array1<f64>> {
  let tied: Vec<usize> = (0..mean.len())
    .filter(|&i| (mean[i] - t).abs() <= tie)
    .collect();
  let sub = cov.select(Axis(0), &tied).select(Axis(1), &tied);
  let w = min_variance(&sub, config)?;

  let mut weights = Array1::zeros(mean.len());
  for (k, &i) in tied.iter().enumerate() {
    weights[i] = w[k];
  }
  Ok(weights)
}

/// Zero out short positions and rescale to sum 1.
///
/// This is an approximation: the result generally no longer lies on either
/// frontier and its return differs from the original target.
pub fn clip_long_only(weights: &Array1<f64>) -> Array1<f64> {
  let clipped = weights.mapv(|w| w.max(0.0));
  let total = clipped.sum();
  if total <= 0.0 {
    return equal_weight(weights.len());
  }
  clipped / total
}
