//! # Non-negative Variance QP
//!
//! $$
//! \min_{\mathbf x\ge 0}\ \mathbf x^\top\Sigma\mathbf x
//! \qquad\text{s.t. } \mathbf a_k^\top\mathbf x=b_k,\ k=1,\dots,m
//! $$
//!
//! Quadratic programs over the non-negative orthant, solved with the clarabel
//! interior-point solver. Equalities go into a zero cone and `x ≥ 0` into a
//! non-negative cone.

use clarabel::algebra::CscMatrix;
use clarabel::solver::DefaultSettingsBuilder;
use clarabel::solver::DefaultSolver;
use clarabel::solver::IPSolver;
use clarabel::solver::SolverStatus;
use clarabel::solver::SupportedConeT;
use ndarray::Array1;
use ndarray::Array2;
use tracing::debug;

use crate::Error;
use crate::Result;

/// Solver settings shared by every portfolio QP.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
  /// Interior-point iteration limit.
  pub max_iter: u32,
  /// Absolute and relative duality gap, and feasibility tolerance.
  pub tolerance: f64,
  /// Iteration limit of the Nelder-Mead fallback for max-Sharpe when no
  /// asset beats the risk-free rate.
  pub simplex_iters: u64,
}

impl Default for SolverConfig {
  fn default() -> Self {
    Self {
      max_iter: 200,
      tolerance: 1e-9,
      simplex_iters: 5000,
    }
  }
}

/// `min xᵀΣx` subject to linear equalities and `x ≥ 0`.
#[derive(Clone, Debug)]
pub struct VarianceQp<'a> {
  cov: &'a Array2<f64>,
  rows: Vec<Vec<f64>>,
  rhs: Vec<f64>,
}

impl<'a> VarianceQp<'a> {
  pub fn new(cov: &'a Array2<f64>) -> Self {
    Self {
      cov,
      rows: Vec::new(),
      rhs: Vec::new(),
    }
  }

  /// Adds `rowᵀx = rhs`.
  pub fn with_equality(mut self, row: impl IntoIterator<Item = f64>, rhs: f64) -> Self {
    self.rows.push(row.into_iter().collect());
    self.rhs.push(rhs);
    self
  }

  pub fn n(&self) -> usize {
    self.cov.nrows()
  }

  /// Upper triangle of `2Σ`, so clarabel's `½xᵀPx` equals `xᵀΣx`.
  fn quadratic(&self) -> CscMatrix<f64> {
    let n = self.n();
    let mut colptr = Vec::with_capacity(n + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    colptr.push(0);
    for j in 0..n {
      for i in 0..=j {
        let v = self.cov[[i, j]];
        if v != 0.0 || i == j {
          rowval.push(i);
          nzval.push(2.0 * v);
        }
      }
      colptr.push(nzval.len());
    }
    CscMatrix::new(n, n, colptr, rowval, nzval)
  }

  /// Equality rows stacked over `-I`.
  fn constraints(&self) -> CscMatrix<f64> {
    let n = self.n();
    let m = self.rows.len();
    let mut colptr = Vec::with_capacity(n + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    colptr.push(0);
    for j in 0..n {
      for (k, row) in self.rows.iter().enumerate() {
        if row[j] != 0.0 {
          rowval.push(k);
          nzval.push(row[j]);
        }
      }
      rowval.push(m + j);
      nzval.push(-1.0);
      colptr.push(nzval.len());
    }
    CscMatrix::new(m + n, n, colptr, rowval, nzval)
  }

  pub fn solve(&self, config: &SolverConfig) -> Result<Array1<f64>> {
    let n = self.n();
    if self.cov.ncols() != n {
      return Err(Error::InvalidInput(format!(
        "quadratic term must be square, got {:?}",
        self.cov.dim()
      )));
    }
    if let Some(row) = self.rows.iter().find(|r| r.len() != n) {
      return Err(Error::InvalidInput(format!(
        "constraint row has {} entries for {n} variables",
        row.len()
      )));
    }

    let p = self.quadratic();
    let a = self.constraints();
    let q = vec![0.0; n];
    let mut b = self.rhs.clone();
    b.extend(std::iter::repeat(0.0).take(n));
    let cones = [
      SupportedConeT::ZeroConeT(self.rows.len()),
      SupportedConeT::NonnegativeConeT(n),
    ];

    let settings = DefaultSettingsBuilder::default()
      .max_iter(config.max_iter)
      .tol_gap_abs(config.tolerance)
      .tol_gap_rel(config.tolerance)
      .tol_feas(config.tolerance)
      .verbose(false)
      .build()
      .map_err(|e| Error::OptimizationFailed(format!("solver settings: {e}")))?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
      .map_err(|e| Error::OptimizationFailed(format!("solver setup: {e:?}")))?;
    solver.solve();

    let status = &solver.solution.status;
    debug!(
      n,
      equalities = self.rows.len(),
      iterations = solver.info.iterations,
      status = ?status,
      "variance qp finished"
    );
    match status {
      SolverStatus::Solved | SolverStatus::AlmostSolved => {
        Ok(Array1::from_vec(solver.solution.x.clone()))
      }
      other => Err(Error::OptimizationFailed(format!("qp status {other:?}"))),
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn budget_constraint_gives_inverse_variance_weights() {
    let cov = array![[0.04, 0.0], [0.0, 0.01]];
    let x = VarianceQp::new(&cov)
      .with_equality([1.0, 1.0], 1.0)
      .solve(&SolverConfig::default())
      .unwrap();
    assert_abs_diff_eq!(x[0], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(x[1], 0.8, epsilon = 1e-6);
  }

  #[test]
  fn non_negativity_binds() {
    // unconstrained optimum shorts the second asset
    let cov = array![[0.01, 0.018], [0.018, 0.04]];
    let x = VarianceQp::new(&cov)
      .with_equality([1.0, 1.0], 1.0)
      .solve(&SolverConfig::default())
      .unwrap();
    assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-6);
    assert!(x[1].abs() < 1e-6);
  }

  #[test]
  fn infeasible_equalities_fail() {
    let cov = array![[0.04, 0.0], [0.0, 0.09]];
    let err = VarianceQp::new(&cov)
      .with_equality([1.0, 1.0], 1.0)
      .with_equality([0.1, 0.2], 0.5)
      .solve(&SolverConfig::default())
      .unwrap_err();
    assert!(matches!(err, Error::OptimizationFailed(_)), "{err}");
  }

  #[test]
  fn ragged_row_is_invalid_input() {
    let cov = array![[0.04, 0.0], [0.0, 0.09]];
    let err = VarianceQp::new(&cov)
      .with_equality([1.0], 1.0)
      .solve(&SolverConfig::default())
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
  }
}
