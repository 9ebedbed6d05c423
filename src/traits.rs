//! # Traits
//!
//! $$
//! \text{Trait contracts: }\mathcal{A}:\text{inputs}\to\text{paths/prices/fundamentals}
//! $$
//!
//! Seams between the engine and its collaborators: path simulators, price
//! providers and fundamentals lookups.

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::market::fundamentals::Fundamentals;
use crate::market::prices::PriceTable;
use crate::Result;

/// A simulator of forward paths.
pub trait ProcessExt: Send + Sync {
  type Output: Send;

  fn sample(&self) -> Self::Output;

  fn sample_par(&self, m: usize) -> Vec<Self::Output> {
    (0..m).into_par_iter().map(|_| self.sample()).collect()
  }
}

/// Historical price provider.
///
/// Returns adjusted closes for `symbols` on `[start, end)`. Symbols the
/// provider knows nothing about are omitted from the table rather than
/// failing the whole request.
pub trait PriceSource {
  fn price_history(&self, symbols: &[String], start: NaiveDate, end: NaiveDate)
    -> Result<PriceTable>;
}

/// Per-symbol fundamentals provider, consumed only as report annotation.
pub trait FundamentalsSource {
  fn fundamentals(&self, symbol: &str) -> Result<Fundamentals>;
}
