//! # Fundamentals
//!
//! $$
//! \text{symbol}\mapsto\{\text{P/E},\ \text{EPS},\ \beta,\ \dots\}
//! $$
//!
//! Opaque per-symbol key/value attributes shown next to portfolio weights.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use tracing::warn;

use crate::traits::FundamentalsSource;
use crate::Error;
use crate::Result;

/// Report column order.
pub const FUNDAMENTAL_KEYS: [&str; 10] = [
  "P/E", "EPS", "BV", "Div Yld", "Div/Sh", "D/E", "Beta", "ROI", "ROE", "Vol",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fundamentals {
  values: Vec<(String, f64)>,
}

impl Fundamentals {
  /// Every report key set to zero, used when a lookup fails.
  pub fn zeroed() -> Self {
    Self {
      values: FUNDAMENTAL_KEYS
        .iter()
        .map(|k| (k.to_string(), 0.0))
        .collect(),
    }
  }

  pub fn get(&self, key: &str) -> Option<f64> {
    self.values.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
  }

  pub fn set(&mut self, key: &str, value: f64) {
    match self.values.iter_mut().find(|(k, _)| k == key) {
      Some((_, v)) => *v = value,
      None => self.values.push((key.to_string(), value)),
    }
  }

  /// Values for [`FUNDAMENTAL_KEYS`], zero where absent.
  pub fn report_values(&self) -> Vec<f64> {
    FUNDAMENTAL_KEYS
      .iter()
      .map(|k| self.get(k).unwrap_or(0.0))
      .collect()
  }
}

/// In-memory fundamentals, typically loaded from a CSV export.
#[derive(Clone, Debug, Default)]
pub struct StaticFundamentals {
  data: HashMap<String, Fundamentals>,
}

impl StaticFundamentals {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, symbol: &str, fundamentals: Fundamentals) {
    self.data.insert(symbol.to_string(), fundamentals);
  }

  /// Header `symbol,<key>,<key>,...`; unparsable or empty cells read as zero.
  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut out = Self::new();

    for record in rdr.records() {
      let record = record?;
      let Some(symbol) = record.get(0) else {
        continue;
      };
      let mut f = Fundamentals::default();
      for (key, cell) in headers.iter().zip(record.iter()).skip(1) {
        f.set(key, cell.parse::<f64>().unwrap_or(0.0));
      }
      out.insert(symbol, f);
    }

    Ok(out)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_reader(std::fs::File::open(path)?)
  }
}

impl FundamentalsSource for StaticFundamentals {
  fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
    self
      .data
      .get(symbol)
      .cloned()
      .ok_or_else(|| Error::DataSource(format!("no fundamentals for {symbol}")))
  }
}

/// Look up every symbol once; failures are logged and zero-filled.
pub fn collect_fundamentals<S: FundamentalsSource + ?Sized>(
  source: &S,
  symbols: &[String],
) -> HashMap<String, Fundamentals> {
  let pb = ProgressBar::new(symbols.len() as u64);
  pb.set_style(
    ProgressStyle::with_template("[{bar:50}] {percent}% {msg}")
      .unwrap_or_else(|_| ProgressStyle::default_bar())
      .progress_chars("#-"),
  );

  let mut out = HashMap::with_capacity(symbols.len());
  for symbol in symbols {
    let f = match source.fundamentals(symbol) {
      Ok(f) => f,
      Err(err) => {
        warn!(%symbol, %err, "fundamentals lookup failed, using zeros");
        Fundamentals::zeroed()
      }
    };
    out.insert(symbol.clone(), f);
    pb.inc(1);
  }
  pb.finish_and_clear();

  out
}
