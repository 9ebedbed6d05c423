//! # efficient-frontier
//!
//! $$
//! \min_{\mathbf w}\ \mathbf w^\top\Sigma\mathbf w\quad\text{s.t.}\quad \mathbf 1^\top\mathbf w=1,\ 0\le w_i\le 1
//! $$
//!
//! Portfolio construction from historical prices.
//!
//! | Module         | Description                                                                 |
//! |----------------|-----------------------------------------------------------------------------|
//! | [`market`]     | Price tables, simple returns, ticker catalogs, price/fundamentals sources.  |
//! | [`portfolio`]  | Estimator, QP weight optimizers, closed-form and long-only frontiers.       |
//! | [`simulation`] | Forward price-path simulators (GBM, Lévy, α-stable, Heston, CIR, ...).      |
//! | [`report`]     | HTML reports with sortable tables and plotly charts, console tables.        |
//!
//! ## Features
//!
//! - `yahoo`: enables [`market::yahoo::YahooPriceSource`].

pub mod error;
pub mod market;
pub mod portfolio;
pub mod report;
pub mod simulation;
pub mod traits;

pub use error::Error;
pub use error::Result;

/// Trading days per year used to annualize per-period statistics.
pub const TRADING_DAYS: f64 = 252.0;
/// Diagonal loading added to every covariance estimate.
pub const COV_EPSILON: f64 = 1e-6;
/// Default risk-free rate for Sharpe computations.
pub const RISK_FREE: f64 = 0.02;
