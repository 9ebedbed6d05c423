//! # Console Tables
//!
//! $$
//! w_{(1)}\ge w_{(2)}\ge\cdots\ge w_{(N)}
//! $$
//!
//! Terminal tables for the suggested allocation of each group.

use ndarray::Array1;
use prettytable::format;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;

use super::html::percent;
use crate::market::TickerCatalog;
use crate::portfolio::GroupAnalysis;

/// `(symbol, weight)` sorted by weight, largest first. Ties keep input order.
pub fn sorted_mix(symbols: &[String], weights: &Array1<f64>) -> Vec<(String, f64)> {
  let mut mix: Vec<(String, f64)> = symbols.iter().cloned().zip(weights.iter().copied()).collect();
  mix.sort_by(|a, b| b.1.total_cmp(&a.1));
  mix
}

pub fn mix_table(catalog: &TickerCatalog, mix: &[(String, f64)]) -> Table {
  let mut table = Table::new();
  table.set_format(*format::consts::FORMAT_BOX_CHARS);
  table.set_titles(Row::new(vec![
    Cell::new("Asset"),
    Cell::new("Ticker"),
    Cell::new("Weight"),
  ]));
  for (symbol, weight) in mix {
    table.add_row(Row::new(vec![
      Cell::new(catalog.name_of(symbol)),
      Cell::new(symbol),
      Cell::new(&percent(*weight)).style_spec("r"),
    ]));
  }
  table
}

/// Suggested (approx.) long-only mix of a group, `None` when the group has no
/// frontier to draw it from.
pub fn suggested_mix_table(catalog: &TickerCatalog, analysis: &GroupAnalysis) -> Option<Table> {
  let weights = analysis.suggested_mix.as_ref()?;
  Some(mix_table(catalog, &sorted_mix(analysis.symbols(), weights)))
}
