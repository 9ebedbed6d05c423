//! # Portfolio
//!
//! $$
//! \mathcal F=\{(\sigma(t), t)\ :\ \sigma(t)=\min_{\mathbf 1^\top\mathbf w=1,\ \mu^\top\mathbf w=t}\sqrt{\mathbf w^\top\Sigma\mathbf w}\}
//! $$
//!
//! Moment estimation, constrained weight optimization and efficient frontiers.

pub mod engine;
pub mod estimator;
pub mod frontier;
pub mod optimizers;
pub mod qp;
pub mod types;

pub use engine::BatchOutcome;
pub use engine::GroupAnalysis;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use engine::SkippedGroup;
pub use estimator::estimate;
pub use estimator::regularize;
pub use estimator::EstimatorConfig;
pub use estimator::MarketEstimate;
pub use frontier::clip_long_only;
pub use frontier::efficient_frontier;
pub use frontier::linspace;
pub use frontier::long_only_frontier;
pub use optimizers::equal_weight;
pub use optimizers::optimize_weights;
pub use optimizers::optimize_weights_with;
pub use qp::SolverConfig;
pub use qp::VarianceQp;
pub use types::Frontier;
pub use types::FrontierDegeneracy;
pub use types::FrontierPoint;
pub use types::OptimizerMethod;
pub use types::PortfolioResult;
