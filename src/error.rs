//! # Errors
//!
//! $$
//! \text{estimate}:\ R\in\mathbb R^{T\times N},\ T<2 \Rightarrow \texttt{InsufficientData}
//! $$
//!
//! Error taxonomy shared by the estimator, the optimizers and the data layer.
//! The frontier generator never returns these for degenerate numerics; it
//! yields an empty frontier instead.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  /// Not enough periods or symbols to compute a statistic.
  #[error("insufficient data: {0}")]
  InsufficientData(String),

  /// A parameter required by the selected method was not supplied.
  #[error("missing input: {0}")]
  MissingInput(String),

  /// The constrained solver did not converge.
  #[error("optimization failed: {0}")]
  OptimizationFailed(String),

  /// Shapes or values violate the documented preconditions.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A price or fundamentals provider could not serve the request.
  #[error("data source error: {0}")]
  DataSource(String),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Whether a batch run should skip the affected group and keep going.
  pub fn is_skippable(&self) -> bool {
    matches!(
      self,
      Error::InsufficientData(_) | Error::OptimizationFailed(_) | Error::MissingInput(_)
    )
  }
}
