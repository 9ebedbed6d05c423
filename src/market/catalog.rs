//! # Ticker Catalog
//!
//! $$
//! \text{symbol}\mapsto(\text{name},\ \text{category})
//! $$
//!
//! Pass-through metadata used to group symbols and label report rows.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerInfo {
  pub symbol: String,
  pub name: String,
  pub category: String,
}

/// Ordered symbol metadata. Later definitions of a symbol replace earlier ones.
#[derive(Clone, Debug, Default)]
pub struct TickerCatalog {
  entries: Vec<TickerInfo>,
}

impl TickerCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, symbol: &str, name: &str, category: &str) {
    let info = TickerInfo {
      symbol: symbol.to_string(),
      name: name.to_string(),
      category: category.to_string(),
    };
    match self.entries.iter_mut().find(|e| e.symbol == symbol) {
      Some(existing) => *existing = info,
      None => self.entries.push(info),
    }
  }

  /// Read `symbol,name,category` rows (header required).
  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut catalog = Self::new();
    for record in rdr.records() {
      let record = record?;
      let field = |i: usize| record.get(i).unwrap_or_default();
      catalog.insert(field(0), field(1), field(2));
    }
    debug!(entries = catalog.len(), "loaded ticker catalog");
    Ok(catalog)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let file = std::fs::File::open(path)?;
    Self::from_reader(file)
  }

  pub fn get(&self, symbol: &str) -> Option<&TickerInfo> {
    self.entries.iter().find(|e| e.symbol == symbol)
  }

  /// Display name, falling back to the symbol itself.
  pub fn name_of<'a>(&'a self, symbol: &'a str) -> &'a str {
    self.get(symbol).map(|e| e.name.as_str()).unwrap_or(symbol)
  }

  pub fn symbols(&self) -> Vec<String> {
    self.entries.iter().map(|e| e.symbol.clone()).collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Categories in first-seen order, each with its symbols.
  pub fn groups(&self) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for e in &self.entries {
      match groups.iter_mut().find(|(c, _)| *c == e.category) {
        Some((_, symbols)) => symbols.push(e.symbol.clone()),
        None => groups.push((e.category.clone(), vec![e.symbol.clone()])),
      }
    }
    groups
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CSV: &str = "symbol,name,category
AAPL,Apple Inc.,Technology
JPM,JPMorgan Chase & Co.,Finance
MSFT,Microsoft Corporation,Technology
ARCB,ArcBest Corporation,Industrials
ARCB,ArcBest Corporation,Logistics
";

  #[test]
  fn groups_keep_first_seen_order() {
    let catalog = TickerCatalog::from_reader(CSV.as_bytes()).unwrap();
    let groups = catalog.groups();

    assert_eq!(groups[0].0, "Technology");
    assert_eq!(groups[0].1, vec!["AAPL".to_string(), "MSFT".to_string()]);
    assert_eq!(groups[1].0, "Finance");
    assert_eq!(groups[2].0, "Logistics");
    assert_eq!(groups.len(), 3);
  }

  #[test]
  fn name_falls_back_to_symbol() {
    let catalog = TickerCatalog::from_reader(CSV.as_bytes()).unwrap();
    assert_eq!(catalog.name_of("JPM"), "JPMorgan Chase & Co.");
    assert_eq!(catalog.name_of("XYZ"), "XYZ");
  }
}
