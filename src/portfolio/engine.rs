//! # Portfolio Engine
//!
//! $$
//! R_g \mapsto (\hat\mu_g, \hat\Sigma_g) \mapsto \{\mathbf w_g^{(m)}\}_m,\ \mathcal F_g
//! $$
//!
//! Orchestrates estimation, optimization and frontier generation per symbol
//! group, sequentially or across groups in parallel.

use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use ndarray::Array1;
use rayon::prelude::*;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::estimator::estimate;
use super::estimator::EstimatorConfig;
use super::estimator::MarketEstimate;
use super::frontier::clip_long_only;
use super::frontier::efficient_frontier;
use super::frontier::long_only_frontier;
use super::optimizers::optimize_weights_with;
use super::qp::SolverConfig;
use super::types::Frontier;
use super::types::FrontierDegeneracy;
use super::types::OptimizerMethod;
use super::types::PortfolioResult;
use crate::market::catalog::TickerCatalog;
use crate::market::prices::ReturnMatrix;
use crate::Error;
use crate::Result;
use crate::RISK_FREE;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Risk-free rate used by the Sharpe objective and reported ratios.
  pub risk_free: f64,
  /// Number of target returns on each frontier.
  pub frontier_points: usize,
  pub estimator: EstimatorConfig,
  /// Methods evaluated for every group, in report column order.
  pub methods: Vec<OptimizerMethod>,
  /// Also solve the bounded long-only frontier.
  pub long_only_frontier: bool,
  pub solver: SolverConfig,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      risk_free: RISK_FREE,
      frontier_points: 100,
      estimator: EstimatorConfig::default(),
      methods: OptimizerMethod::ALL.to_vec(),
      long_only_frontier: true,
      solver: SolverConfig::default(),
    }
  }
}

/// Everything computed for one symbol group.
#[derive(Clone, Debug)]
pub struct GroupAnalysis {
  pub name: String,
  pub estimate: MarketEstimate,
  /// One entry per configured method, in configuration order.
  pub portfolios: Vec<(OptimizerMethod, PortfolioResult)>,
  /// Closed-form frontier, short sales allowed.
  pub frontier: Frontier,
  pub long_only: Option<Frontier>,
  /// Max-return frontier point with shorts clipped and renormalized.
  /// Approximate: it is not on either frontier.
  pub suggested_mix: Option<Array1<f64>>,
}

impl GroupAnalysis {
  pub fn symbols(&self) -> &[String] {
    &self.estimate.symbols
  }

  pub fn portfolio(&self, method: OptimizerMethod) -> Option<&PortfolioResult> {
    self
      .portfolios
      .iter()
      .find(|(m, _)| *m == method)
      .map(|(_, r)| r)
  }
}

/// A group left out of the batch and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedGroup {
  pub name: String,
  pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
  pub analyses: Vec<GroupAnalysis>,
  pub skipped: Vec<SkippedGroup>,
}

/// Single entry point for per-group portfolio analysis.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  pub fn estimate(&self, returns: &ReturnMatrix) -> Result<MarketEstimate> {
    estimate(returns, &self.config.estimator)
  }

  /// Run every configured method on `est`. The first failure aborts.
  pub fn optimize(&self, est: &MarketEstimate) -> Result<Vec<(OptimizerMethod, PortfolioResult)>> {
    self
      .config
      .methods
      .iter()
      .map(|&method| {
        let weights = optimize_weights_with(
          &est.cov,
          Some(&est.mean),
          method,
          self.config.risk_free,
          &self.config.solver,
        )?;
        let result = PortfolioResult::evaluate(weights, &est.mean, &est.cov, self.config.risk_free);
        Ok((method, result))
      })
      .collect()
  }

  /// Estimate, optimize and build the frontiers for one group.
  pub fn analyze(&self, name: &str, returns: &ReturnMatrix) -> Result<GroupAnalysis> {
    if returns.n_symbols() == 0 {
      return Err(Error::InsufficientData(format!(
        "no price data for any symbol of {name}"
      )));
    }

    let est = self.estimate(returns)?;
    let portfolios = self.optimize(&est)?;
    if let Some(index) = est.zero_variance() {
      warn!(
        group = name,
        symbol = %est.symbols[index],
        "constant prices, frontiers are degenerate"
      );
      return Ok(GroupAnalysis {
        name: name.to_string(),
        estimate: est,
        portfolios,
        frontier: Frontier::empty(FrontierDegeneracy::ZeroVariance { index }),
        long_only: None,
        suggested_mix: None,
      });
    }

    let frontier = efficient_frontier(&est.mean, &est.cov, self.config.frontier_points);
    let long_only = if self.config.long_only_frontier {
      match long_only_frontier(
        &est.mean,
        &est.cov,
        self.config.frontier_points,
        &self.config.solver,
      ) {
        Ok(f) => Some(f),
        Err(err) => {
          warn!(group = name, %err, "long-only frontier failed");
          None
        }
      }
    } else {
      None
    };

    let suggested_mix = frontier.max_return_point().map(|p| clip_long_only(&p.weights));

    Ok(GroupAnalysis {
      name: name.to_string(),
      estimate: est,
      portfolios,
      frontier,
      long_only,
      suggested_mix,
    })
  }

  /// Analyze every catalog group in order, skipping the ones that fail.
  pub fn run(&self, catalog: &TickerCatalog, returns: &ReturnMatrix) -> BatchOutcome {
    let groups = catalog.groups();
    let pb = ProgressBar::new(groups.len() as u64);
    pb.set_style(
      ProgressStyle::with_template("[{bar:50}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#-"),
    );

    let mut outcome = BatchOutcome::default();
    for (name, symbols) in &groups {
      pb.set_message(name.clone());
      let result = self.analyze(name, &returns.select(symbols));
      record(&mut outcome, name, result);
      pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
      analyzed = outcome.analyses.len(),
      skipped = outcome.skipped.len(),
      "portfolio batch finished"
    );
    outcome
  }

  /// Same as [`run`](Self::run) with groups analyzed on the rayon pool.
  pub fn run_par(&self, catalog: &TickerCatalog, returns: &ReturnMatrix) -> BatchOutcome {
    let results: Vec<(String, Result<GroupAnalysis>)> = catalog
      .groups()
      .into_par_iter()
      .map(|(name, symbols)| {
        let result = self.analyze(&name, &returns.select(&symbols));
        (name, result)
      })
      .collect();

    let mut outcome = BatchOutcome::default();
    for (name, result) in results {
      record(&mut outcome, &name, result);
    }
    info!(
      analyzed = outcome.analyses.len(),
      skipped = outcome.skipped.len(),
      "parallel portfolio batch finished"
    );
    outcome
  }
}

fn record(outcome: &mut BatchOutcome, name: &str, result: Result<GroupAnalysis>) {
  match result {
    Ok(analysis) => outcome.analyses.push(analysis),
    Err(err) => {
      if err.is_skippable() {
        warn!(group = name, %err, "skipping group");
      } else {
        error!(group = name, %err, "group analysis failed, skipping group");
      }
      outcome.skipped.push(SkippedGroup {
        name: name.to_string(),
        reason: err.to_string(),
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::s;
  use ndarray::Array2;
  use tracing_test::traced_test;

  use super::*;

  fn synthetic_returns(symbols: &[&str], periods: usize) -> ReturnMatrix {
    let n = symbols.len();
    let data = Array2::from_shape_fn((periods, n), |(t, j)| {
      let k = (j + 1) as f64;
      0.0004 * k + 0.01 * (t as f64 * 0.7 * k + j as f64).sin() + 0.004 * (t as f64 * 1.3).cos()
    });
    ReturnMatrix::new(symbols.iter().map(|s| s.to_string()).collect(), data).unwrap()
  }

  fn small_engine() -> PortfolioEngine {
    PortfolioEngine::new(PortfolioEngineConfig {
      frontier_points: 12,
      ..PortfolioEngineConfig::default()
    })
  }

  #[test]
  fn analyze_produces_every_method_and_frontier() {
    let analysis = small_engine()
      .analyze("Tech", &synthetic_returns(&["AAA", "BBB", "CCC"], 120))
      .unwrap();

    assert_eq!(analysis.portfolios.len(), 3);
    for (_, res) in &analysis.portfolios {
      assert_abs_diff_eq!(res.weights.sum(), 1.0, epsilon = 1e-6);
      assert!(res.weights.iter().all(|w| (0.0..=1.0).contains(w)));
      assert!(res.volatility > 0.0);
    }
    assert_eq!(
      analysis.portfolio(OptimizerMethod::EqualWeight).unwrap().weights.to_vec(),
      vec![1.0 / 3.0; 3]
    );
    assert_eq!(analysis.frontier.len(), 12);
    assert_eq!(analysis.long_only.as_ref().map(Frontier::len), Some(12));

    let mix = analysis.suggested_mix.unwrap();
    assert_abs_diff_eq!(mix.sum(), 1.0, epsilon = 1e-12);
    assert!(mix.iter().all(|w| *w >= 0.0));
  }

  #[test]
  fn min_variance_beats_equal_weight_on_risk() {
    let analysis = small_engine()
      .analyze("G", &synthetic_returns(&["A", "B", "C", "D"], 200))
      .unwrap();
    let mv = analysis.portfolio(OptimizerMethod::MinVariance).unwrap();
    let ew = analysis.portfolio(OptimizerMethod::EqualWeight).unwrap();
    assert!(mv.volatility <= ew.volatility + 1e-9);
  }

  #[test]
  #[traced_test]
  fn constant_price_symbol_degenerates_the_frontier() {
    let base = synthetic_returns(&["B", "C"], 120);
    let mut data = Array2::zeros((120, 3));
    data.slice_mut(s![.., 1..]).assign(base.returns());
    let returns = ReturnMatrix::new(vec!["FLAT".into(), "B".into(), "C".into()], data).unwrap();

    let analysis = small_engine().analyze("G", &returns).unwrap();

    assert_eq!(
      analysis.frontier.degeneracy(),
      Some(FrontierDegeneracy::ZeroVariance { index: 0 })
    );
    assert!(analysis.frontier.is_empty());
    assert!(analysis.long_only.is_none());
    assert!(analysis.suggested_mix.is_none());
    assert_eq!(analysis.portfolios.len(), 3);
    assert!(logs_contain("constant prices"));
  }

  #[test]
  #[traced_test]
  fn batch_skips_groups_without_data() {
    let mut catalog = TickerCatalog::new();
    catalog.insert("AAA", "Alpha", "Tech");
    catalog.insert("BBB", "Beta", "Tech");
    catalog.insert("ZZZ", "Ghost", "Delisted");
    let returns = synthetic_returns(&["AAA", "BBB"], 80);

    let outcome = small_engine().run(&catalog, &returns);

    assert_eq!(outcome.analyses.len(), 1);
    assert_eq!(outcome.analyses[0].name, "Tech");
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].name, "Delisted");
    assert!(logs_contain("skipping group"));
  }

  #[test]
  fn short_history_is_skipped_not_fatal() {
    let mut catalog = TickerCatalog::new();
    catalog.insert("AAA", "Alpha", "Tech");
    let outcome = small_engine().run(&catalog, &synthetic_returns(&["AAA"], 1));
    assert!(outcome.analyses.is_empty());
    assert!(outcome.skipped[0].reason.contains("insufficient data"));
  }

  #[test]
  fn parallel_run_keeps_group_order() {
    let mut catalog = TickerCatalog::new();
    for (sym, group) in [("A", "One"), ("B", "One"), ("C", "Two"), ("D", "Two"), ("E", "Three")] {
      catalog.insert(sym, sym, group);
    }
    let returns = synthetic_returns(&["A", "B", "C", "D", "E"], 90);

    let engine = small_engine();
    let seq = engine.run(&catalog, &returns);
    let par = engine.run_par(&catalog, &returns);

    let names = |o: &BatchOutcome| o.analyses.iter().map(|a| a.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&seq), vec!["One", "Two", "Three"]);
    assert_eq!(names(&seq), names(&par));
  }
}
