//! # Price Forecast
//!
//! $$
//! \hat\mu = L\cdot\overline{r},\qquad \hat\sigma = \sqrt{L}\cdot s_r,\qquad r_i=\ln\frac{P_{i+1}}{P_i},\ L=\#\{P_i\}
//! $$
//!
//! Calibrates the price models on a closing-price history and draws one
//! forward path per model from the last close.

use ndarray::Array1;
use tracing::debug;

use super::cox::CoxJump;
use super::gbm::Gbm;
use super::heston::Heston;
use super::levy::LevyFlight;
use super::random_walk::RandomWalk;
use super::stable::AlphaStable;
use crate::market::log_returns;
use crate::traits::ProcessExt;
use crate::Error;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForecastModel {
  Levy,
  Brownian,
  Stable,
  Cox,
  RandomWalk,
  Heston,
}

impl ForecastModel {
  pub const ALL: [ForecastModel; 6] = [
    ForecastModel::Levy,
    ForecastModel::Brownian,
    ForecastModel::Stable,
    ForecastModel::Cox,
    ForecastModel::RandomWalk,
    ForecastModel::Heston,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      ForecastModel::Levy => "Levy",
      ForecastModel::Brownian => "Brownian",
      ForecastModel::Stable => "Stable",
      ForecastModel::Cox => "Cox",
      ForecastModel::RandomWalk => "Random Walk",
      ForecastModel::Heston => "Heston",
    }
  }

  /// Trace color used by the forecast chart.
  pub fn color(&self) -> &'static str {
    match self {
      ForecastModel::Levy => "#FF0000",
      ForecastModel::Brownian => "#00FF00",
      ForecastModel::Stable => "#0000FF",
      ForecastModel::Cox => "#FF6600",
      ForecastModel::RandomWalk => "#000000",
      ForecastModel::Heston => "#FF00FF",
    }
  }

  /// One path of `config.steps` points starting at `s0`.
  pub fn simulate(
    &self,
    s0: f64,
    mu: f64,
    sigma: f64,
    config: &ForecastConfig,
  ) -> Result<Array1<f64>> {
    let n = config.steps;
    let x0 = Some(s0);
    let t = Some(config.horizon);

    let path = match self {
      ForecastModel::Levy => LevyFlight::new(mu, sigma, config.alpha, n, x0, t)?.sample(),
      ForecastModel::Brownian => Gbm::new(mu, sigma, n, x0, t).sample(),
      ForecastModel::Stable => AlphaStable::new(mu, sigma, config.alpha, n, x0, t)?.sample(),
      ForecastModel::Cox => CoxJump::new(mu, sigma, config.kappa, config.theta, n, x0, t).sample(),
      ForecastModel::RandomWalk => RandomWalk::new(mu, sigma, n, x0, t).sample(),
      ForecastModel::Heston => {
        let v0 = sigma.powi(2);
        let [price, _] = Heston::new(
          x0,
          Some(v0),
          config.heston_kappa,
          v0,
          config.heston_vol_of_vol,
          config.heston_rho,
          mu,
          n,
          t,
        )?
        .sample();
        price
      }
    };

    Ok(path)
  }
}

#[derive(Clone, Debug)]
pub struct ForecastConfig {
  /// Points per simulated path, the last close included.
  pub steps: usize,
  /// Horizon in years.
  pub horizon: f64,
  /// Drift fed to the models. `None` uses the calibrated drift.
  pub drift: Option<f64>,
  /// Tail index for the Lévy and stable models.
  pub alpha: f64,
  /// Cox shock standard deviation.
  pub kappa: f64,
  /// Cox shock loading.
  pub theta: f64,
  pub heston_kappa: f64,
  pub heston_vol_of_vol: f64,
  pub heston_rho: f64,
  pub models: Vec<ForecastModel>,
}

impl Default for ForecastConfig {
  fn default() -> Self {
    Self {
      steps: 100,
      horizon: 1.0 / 24.0,
      drift: Some(0.01),
      alpha: 1.5,
      kappa: 0.2,
      theta: 0.1,
      heston_kappa: 2.0,
      heston_vol_of_vol: 0.3,
      heston_rho: -0.5,
      models: ForecastModel::ALL.to_vec(),
    }
  }
}

/// Calibrated `(mu, sigma)` from a closing-price history.
///
/// Non-finite and non-positive closes are dropped first. Moments scale with
/// the number of valid closes. A single return gives `sigma = 0`.
pub fn calibrate(closes: &[f64]) -> Result<(f64, f64)> {
  let valid: Vec<f64> = closes
    .iter()
    .copied()
    .filter(|c| c.is_finite() && *c > 0.0)
    .collect();
  if valid.len() < 2 {
    return Err(Error::InsufficientData(format!(
      "forecast needs at least 2 valid closes, got {}",
      valid.len()
    )));
  }

  let lr = Array1::from(log_returns(&valid));
  let len = valid.len() as f64;
  let mu = lr.mean().unwrap_or(0.0) * len;
  let sigma = if lr.len() < 2 { 0.0 } else { lr.std(1.0) * len.sqrt() };

  Ok((mu, sigma))
}

#[derive(Clone, Debug)]
pub struct PriceForecast {
  /// Last valid close, the start of every path.
  pub s0: f64,
  pub mu: f64,
  pub sigma: f64,
  pub paths: Vec<(ForecastModel, Array1<f64>)>,
  /// 5% and 95% terminal quantiles of the Brownian model, when defined.
  pub band: Option<(f64, f64)>,
}

impl PriceForecast {
  pub fn from_closes(closes: &[f64], horizon: f64, n: usize) -> Result<Self> {
    let config = ForecastConfig {
      steps: n,
      horizon,
      ..Default::default()
    };
    Self::with_config(closes, &config)
  }

  pub fn with_config(closes: &[f64], config: &ForecastConfig) -> Result<Self> {
    let (mu, sigma) = calibrate(closes)?;
    let s0 = closes
      .iter()
      .rev()
      .copied()
      .find(|c| c.is_finite() && *c > 0.0)
      .ok_or_else(|| Error::InsufficientData("no valid close".into()))?;
    let drift = config.drift.unwrap_or(mu);
    debug!(s0, mu, sigma, drift, "calibrated forecast models");

    let paths = config
      .models
      .iter()
      .map(|m| Ok((*m, m.simulate(s0, drift, sigma, config)?)))
      .collect::<Result<Vec<_>>>()?;

    let band = match sigma > 0.0 {
      true => Gbm::new(drift, sigma, config.steps, Some(s0), Some(config.horizon))
        .terminal_band(0.05, 0.95)
        .ok(),
      false => None,
    };

    Ok(Self {
      s0,
      mu,
      sigma,
      paths,
      band,
    })
  }

  pub fn path(&self, model: ForecastModel) -> Option<&Array1<f64>> {
    self.paths.iter().find(|(m, _)| *m == model).map(|(_, p)| p)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;

  #[test]
  fn calibration_scales_by_close_count() {
    let closes = [100.0, 110.0, 99.0, 108.9];
    let lr = [1.1f64.ln(), 0.9f64.ln(), 1.1f64.ln()];
    let mean = lr.iter().sum::<f64>() / 3.0;
    let var = lr.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 2.0;

    let (mu, sigma) = calibrate(&closes).unwrap();
    assert_relative_eq!(mu, mean * 4.0, max_relative = 1e-12);
    assert_relative_eq!(sigma, var.sqrt() * 2.0, max_relative = 1e-12);

    // dropped closes do not count
    let (mu_gap, _) = calibrate(&[100.0, f64::NAN, 110.0, 99.0, 108.9]).unwrap();
    assert_relative_eq!(mu_gap, mu, max_relative = 1e-12);
  }

  #[test]
  fn too_few_closes_is_insufficient() {
    assert!(matches!(
      PriceForecast::from_closes(&[10.0, f64::NAN, -1.0], 1.0, 10),
      Err(Error::InsufficientData(_))
    ));
  }

  #[test]
  fn single_return_has_zero_volatility() {
    let f = PriceForecast::from_closes(&[50.0, 55.0], 1.0 / 24.0, 20).unwrap();
    assert_eq!(f.sigma, 0.0);
    assert!(f.band.is_none());
    // with sigma = 0 the Brownian path is the deterministic drift
    let gbm = f.path(ForecastModel::Brownian).unwrap();
    assert_relative_eq!(gbm[19], 55.0 * (0.01f64 / 24.0).exp(), max_relative = 1e-12);
  }

  #[test]
  fn every_model_starts_at_last_close() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0).collect();
    let f = PriceForecast::from_closes(&closes, 1.0 / 24.0, 100).unwrap();

    assert_eq!(f.paths.len(), ForecastModel::ALL.len());
    for (model, path) in &f.paths {
      assert_eq!(path.len(), 100, "{}", model.name());
      assert_eq!(path[0], *closes.last().unwrap());
      assert!(path.iter().all(|p| p.is_finite() && *p > 0.0), "{}", model.name());
    }
    let (lo, hi) = f.band.unwrap();
    assert!(lo < f.s0 && f.s0 < hi);
  }

  #[test]
  fn model_colors_are_distinct() {
    let mut colors: Vec<&str> = ForecastModel::ALL.iter().map(|m| m.color()).collect();
    colors.sort_unstable();
    colors.dedup();
    assert_eq!(colors.len(), ForecastModel::ALL.len());
  }
}
