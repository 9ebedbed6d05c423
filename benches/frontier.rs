use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use efficient_frontier::market::ReturnMatrix;
use efficient_frontier::portfolio::efficient_frontier;
use efficient_frontier::portfolio::estimate;
use efficient_frontier::portfolio::long_only_frontier;
use efficient_frontier::portfolio::optimize_weights;
use efficient_frontier::portfolio::EstimatorConfig;
use efficient_frontier::portfolio::MarketEstimate;
use efficient_frontier::portfolio::OptimizerMethod;
use efficient_frontier::portfolio::SolverConfig;
use efficient_frontier::simulation::Gbm;
use efficient_frontier::traits::ProcessExt;
use ndarray::Array2;

const PERIODS: usize = 750;

fn market(n: usize) -> MarketEstimate {
  let returns = Array2::from_shape_fn((PERIODS, n), |(t, j)| {
    let (t, j) = (t as f64, j as f64);
    0.0002 * (j + 1.0) + 0.01 * (t * (0.37 + 0.11 * j)).sin() + 0.004 * (t * 1.7 + j).cos()
  });
  let symbols = (0..n).map(|j| format!("S{j}")).collect();
  let matrix = ReturnMatrix::new(symbols, returns).expect("matching columns");
  estimate(&matrix, &EstimatorConfig::default()).expect("enough periods")
}

fn bench_optimizers(c: &mut Criterion) {
  let mut group = c.benchmark_group("optimize_weights");

  for &n in &[5, 20, 50] {
    let est = market(n);
    for method in [OptimizerMethod::MinVariance, OptimizerMethod::MaxSharpe] {
      group.bench_with_input(BenchmarkId::new(method.name(), n), &est, |b, est| {
        b.iter(|| black_box(optimize_weights(&est.cov, Some(&est.mean), method, 0.02)))
      });
    }
  }

  group.finish();
}

fn bench_frontiers(c: &mut Criterion) {
  let mut group = c.benchmark_group("frontier");
  group.sample_size(20);

  for &n in &[5, 20] {
    let est = market(n);
    group.bench_with_input(BenchmarkId::new("closed_form", n), &est, |b, est| {
      b.iter(|| black_box(efficient_frontier(&est.mean, &est.cov, 100)))
    });
    group.bench_with_input(BenchmarkId::new("long_only", n), &est, |b, est| {
      b.iter(|| black_box(long_only_frontier(&est.mean, &est.cov, 25, &SolverConfig::default())))
    });
  }

  group.finish();
}

fn bench_paths(c: &mut Criterion) {
  let gbm = Gbm::new(0.05, 0.2, 252, Some(100.0), Some(1.0));
  c.bench_function("gbm_sample_par_1000", |b| {
    b.iter(|| black_box(gbm.sample_par(1000)))
  });
}

criterion_group!(benches, bench_optimizers, bench_frontiers, bench_paths);
criterion_main!(benches);
