//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared enums and result containers for portfolio optimization.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use ndarray::Array2;

use crate::Error;

/// Supported allocation methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptimizerMethod {
  /// Minimize `wᵀΣw` on the long-only simplex.
  MinVariance,
  /// Maximize the Sharpe ratio on the long-only simplex. Needs mean returns.
  MaxSharpe,
  /// `1/N` baseline, no optimization.
  EqualWeight,
}

impl OptimizerMethod {
  pub const ALL: [OptimizerMethod; 3] = [Self::MinVariance, Self::MaxSharpe, Self::EqualWeight];

  /// Stable tag used on the command line and as a result key.
  pub fn name(&self) -> &'static str {
    match self {
      Self::MinVariance => "min_variance",
      Self::MaxSharpe => "max_sharpe",
      Self::EqualWeight => "equal_weight",
    }
  }

  /// Column header used in reports.
  pub fn label(&self) -> &'static str {
    match self {
      Self::MinVariance => "Minimum Variance",
      Self::MaxSharpe => "Tangent (Sharpe)",
      Self::EqualWeight => "Equal Weight",
    }
  }

  pub fn requires_mean(&self) -> bool {
    matches!(self, Self::MaxSharpe)
  }
}

impl fmt::Display for OptimizerMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for OptimizerMethod {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().replace('-', "_").as_str() {
      "min_variance" | "min_var" | "minvar" => Ok(Self::MinVariance),
      "max_sharpe" | "sharpe" | "tangent" => Ok(Self::MaxSharpe),
      "equal_weight" | "equal" | "1/n" => Ok(Self::EqualWeight),
      other => Err(Error::InvalidInput(format!(
        "unknown objective '{other}', use min_variance, max_sharpe or equal_weight"
      ))),
    }
  }
}

/// Output of a portfolio optimization run.
#[derive(Clone, Debug, Default)]
pub struct PortfolioResult {
  /// Final portfolio weights.
  pub weights: Array1<f64>,
  /// Model expected portfolio return (annualized if inputs are annualized).
  pub expected_return: f64,
  /// Model portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
}

impl PortfolioResult {
  pub fn evaluate(
    weights: Array1<f64>,
    mean: &Array1<f64>,
    cov: &Array2<f64>,
    risk_free: f64,
  ) -> Self {
    let expected_return = weights.dot(mean);
    let volatility = portfolio_variance(&weights, cov).max(0.0).sqrt();
    let sharpe = if volatility > 1e-15 {
      (expected_return - risk_free) / volatility
    } else {
      0.0
    };

    Self {
      weights,
      expected_return,
      volatility,
      sharpe,
    }
  }
}

/// `wᵀΣw`.
pub fn portfolio_variance(weights: &Array1<f64>, cov: &Array2<f64>) -> f64 {
  weights.dot(&cov.dot(weights))
}

/// One point of an efficient frontier.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierPoint {
  /// Portfolio standard deviation.
  pub risk: f64,
  pub target_return: f64,
  pub weights: Array1<f64>,
}

/// Why a frontier came back empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrontierDegeneracy {
  /// A covariance diagonal entry is numerically zero.
  ZeroVariance { index: usize },
  /// The covariance matrix could not be factorized.
  SingularCovariance,
  /// `D = AC - B²` vanishes, e.g. all expected returns are equal.
  FlatReturns,
  /// Mean and covariance dimensions disagree or contain non-finite values.
  InvalidShape,
}

impl fmt::Display for FrontierDegeneracy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::ZeroVariance { index } => write!(f, "zero variance for asset #{index}"),
      Self::SingularCovariance => write!(f, "covariance matrix is not invertible"),
      Self::FlatReturns => write!(f, "efficient set is degenerate (D ≈ 0)"),
      Self::InvalidShape => write!(f, "mean/covariance shapes are inconsistent"),
    }
  }
}

/// Frontier points ordered by increasing target return.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frontier {
  points: Vec<FrontierPoint>,
  degeneracy: Option<FrontierDegeneracy>,
}

impl Frontier {
  pub fn new(points: Vec<FrontierPoint>) -> Self {
    Self {
      points,
      degeneracy: None,
    }
  }

  pub fn empty(reason: FrontierDegeneracy) -> Self {
    Self {
      points: Vec::new(),
      degeneracy: Some(reason),
    }
  }

  pub fn points(&self) -> &[FrontierPoint] {
    &self.points
  }

  pub fn degeneracy(&self) -> Option<FrontierDegeneracy> {
    self.degeneracy
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn risks(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.risk).collect()
  }

  pub fn returns(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.target_return).collect()
  }

  /// `(risks, returns, weights)` columns.
  pub fn into_parts(self) -> (Vec<f64>, Vec<f64>, Vec<Array1<f64>>) {
    let mut risks = Vec::with_capacity(self.points.len());
    let mut returns = Vec::with_capacity(self.points.len());
    let mut weights = Vec::with_capacity(self.points.len());
    for p in self.points {
      risks.push(p.risk);
      returns.push(p.target_return);
      weights.push(p.weights);
    }
    (risks, returns, weights)
  }

  pub fn min_risk_point(&self) -> Option<&FrontierPoint> {
    self
      .points
      .iter()
      .min_by(|a, b| a.risk.total_cmp(&b.risk))
  }

  pub fn max_return_point(&self) -> Option<&FrontierPoint> {
    self.points.last()
  }
}
