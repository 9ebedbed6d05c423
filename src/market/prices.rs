//! # Price Tables
//!
//! $$
//! r_{t,i} = \frac{p_{t,i}}{p_{t-1,i}} - 1
//! $$
//!
//! Aligned price tables and the simple-return matrix derived from them.

use std::collections::BTreeSet;
use std::collections::HashSet;

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::Axis;
use tracing::warn;

use crate::Error;
use crate::Result;

/// One symbol's ordered price history.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceSeries {
  pub symbol: String,
  pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
  pub fn new(symbol: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
    Self {
      symbol: symbol.into(),
      points,
    }
  }

  /// Dates must be strictly increasing and prices positive and finite.
  pub fn validate(&self) -> Result<()> {
    for pair in self.points.windows(2) {
      if pair[1].0 <= pair[0].0 {
        return Err(Error::InvalidInput(format!(
          "{}: dates not strictly increasing at {}",
          self.symbol, pair[1].0
        )));
      }
    }
    if let Some((date, price)) = self
      .points
      .iter()
      .find(|(_, p)| !p.is_finite() || *p <= 0.0)
    {
      return Err(Error::InvalidInput(format!(
        "{}: non-positive price {price} on {date}",
        self.symbol
      )));
    }
    Ok(())
  }

  pub fn closes(&self) -> Vec<f64> {
    self.points.iter().map(|(_, p)| *p).collect()
  }
}

/// Dates x symbols table of prices, `NaN` marking a missing observation.
#[derive(Clone, Debug)]
pub struct PriceTable {
  dates: Vec<NaiveDate>,
  symbols: Vec<String>,
  prices: Array2<f64>,
}

impl PriceTable {
  pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>, prices: Array2<f64>) -> Result<Self> {
    if prices.dim() != (dates.len(), symbols.len()) {
      return Err(Error::InvalidInput(format!(
        "price table shape {:?} does not match {} dates x {} symbols",
        prices.dim(),
        dates.len(),
        symbols.len()
      )));
    }
    if dates.windows(2).any(|d| d[1] <= d[0]) {
      return Err(Error::InvalidInput(
        "price table dates not strictly increasing".into(),
      ));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = symbols.iter().find(|s| !seen.insert(s.as_str())) {
      return Err(Error::InvalidInput(format!("duplicate symbol {dup}")));
    }
    if prices.iter().any(|p| !p.is_nan() && (!p.is_finite() || *p <= 0.0)) {
      return Err(Error::InvalidInput(
        "prices must be positive and finite".into(),
      ));
    }

    Ok(Self {
      dates,
      symbols,
      prices,
    })
  }

  /// Align several series on the union of their dates.
  pub fn from_series(series: &[PriceSeries]) -> Result<Self> {
    for s in series {
      s.validate()?;
    }

    let dates: Vec<NaiveDate> = series
      .iter()
      .flat_map(|s| s.points.iter().map(|(d, _)| *d))
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect();

    let mut prices = Array2::from_elem((dates.len(), series.len()), f64::NAN);
    for (j, s) in series.iter().enumerate() {
      let mut row = 0;
      for (date, price) in &s.points {
        // both sequences are sorted, so the cursor only moves forward
        while dates[row] < *date {
          row += 1;
        }
        prices[[row, j]] = *price;
      }
    }

    let symbols = series.iter().map(|s| s.symbol.clone()).collect();
    Self::new(dates, symbols, prices)
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  pub fn prices(&self) -> &Array2<f64> {
    &self.prices
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty() || self.dates.is_empty()
  }

  pub fn column(&self, symbol: &str) -> Option<ArrayView1<'_, f64>> {
    let j = self.symbols.iter().position(|s| s == symbol)?;
    Some(self.prices.column(j))
  }

  /// Observed (non-missing) points of one symbol.
  pub fn series(&self, symbol: &str) -> Option<PriceSeries> {
    let col = self.column(symbol)?;
    let points = self
      .dates
      .iter()
      .zip(col.iter())
      .filter(|(_, p)| p.is_finite())
      .map(|(d, p)| (*d, *p))
      .collect();
    Some(PriceSeries::new(symbol, points))
  }

  /// Symbols with at least `min_obs` observed prices.
  pub fn active_symbols(&self, min_obs: usize) -> Vec<String> {
    self
      .symbols
      .iter()
      .enumerate()
      .filter(|(j, _)| {
        self
          .prices
          .column(*j)
          .iter()
          .filter(|p| p.is_finite())
          .count()
          >= min_obs
      })
      .map(|(_, s)| s.clone())
      .collect()
  }

  /// Drop symbols with fewer than `min_obs` observations in range.
  pub fn retain_active(&self, min_obs: usize) -> PriceTable {
    let active = self.active_symbols(min_obs);
    for symbol in self.symbols.iter().filter(|s| !active.contains(s)) {
      warn!(%symbol, min_obs, "symbol has no usable data in range, dropping");
    }
    self.select(&active)
  }

  /// Column subset in the requested order; unknown symbols are ignored.
  pub fn select(&self, symbols: &[String]) -> PriceTable {
    let idx: Vec<usize> = symbols
      .iter()
      .filter_map(|s| self.symbols.iter().position(|x| x == s))
      .collect();
    Self {
      dates: self.dates.clone(),
      symbols: idx.iter().map(|&j| self.symbols[j].clone()).collect(),
      prices: self.prices.select(Axis(1), &idx),
    }
  }
}

/// Periods x symbols matrix of simple returns without missing cells.
#[derive(Clone, Debug)]
pub struct ReturnMatrix {
  symbols: Vec<String>,
  dates: Vec<NaiveDate>,
  returns: Array2<f64>,
}

impl ReturnMatrix {
  /// Wrap raw returns (rows = periods, columns = symbols).
  pub fn new(symbols: Vec<String>, returns: Array2<f64>) -> Result<Self> {
    if returns.ncols() != symbols.len() {
      return Err(Error::InvalidInput(format!(
        "{} return columns for {} symbols",
        returns.ncols(),
        symbols.len()
      )));
    }
    Ok(Self {
      symbols,
      dates: Vec::new(),
      returns,
    })
  }

  /// Simple returns of `prices`, dropping every period with a missing cell.
  pub fn from_prices(prices: &PriceTable) -> Self {
    let p = prices.prices();
    let n = p.ncols();
    let mut rows: Vec<f64> = Vec::new();
    let mut dates = Vec::new();

    for t in 1..p.nrows() {
      let row: Vec<f64> = (0..n).map(|j| p[[t, j]] / p[[t - 1, j]] - 1.0).collect();
      if row.iter().all(|r| r.is_finite()) {
        rows.extend(row);
        dates.push(prices.dates()[t]);
      }
    }

    let returns = Array2::from_shape_vec((dates.len(), n), rows)
      .unwrap_or_else(|_| Array2::zeros((0, n)));

    Self {
      symbols: prices.symbols().to_vec(),
      dates,
      returns,
    }
  }

  pub fn symbols(&self) -> &[String] {
    &self.symbols
  }

  /// Period end dates; empty when built from raw returns.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn returns(&self) -> &Array2<f64> {
    &self.returns
  }

  pub fn n_periods(&self) -> usize {
    self.returns.nrows()
  }

  pub fn n_symbols(&self) -> usize {
    self.returns.ncols()
  }

  /// Column subset in the requested order; unknown symbols are ignored.
  pub fn select(&self, symbols: &[String]) -> ReturnMatrix {
    let idx: Vec<usize> = symbols
      .iter()
      .filter_map(|s| self.symbols.iter().position(|x| x == s))
      .collect();
    Self {
      symbols: idx.iter().map(|&j| self.symbols[j].clone()).collect(),
      dates: self.dates.clone(),
      returns: self.returns.select(Axis(1), &idx),
    }
  }
}

/// Convert close prices to log-return series.
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
  for i in 1..closes.len() {
    if closes[i - 1] > 0.0 && closes[i] > 0.0 {
      out.push((closes[i] / closes[i - 1]).ln());
    }
  }
  out
}
