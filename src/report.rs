//! # Reporting
//!
//! $$
//! \text{BatchOutcome}\ \mapsto\ \text{HTML}
//! $$
//!
//! Turns engine output into an HTML document (index, one section per group,
//! sortable weight tables and charts) or console tables.

pub mod charts;
pub mod console;
pub mod html;

use std::collections::HashMap;

pub use charts::forecast_chart;
pub use charts::frontier_chart;
pub use console::mix_table;
pub use console::sorted_mix;
pub use console::suggested_mix_table;
pub use html::HtmlReport;
pub use html::Table;

use crate::market::Fundamentals;
use crate::market::TickerCatalog;
use crate::market::FUNDAMENTAL_KEYS;
use crate::portfolio::BatchOutcome;
use crate::portfolio::GroupAnalysis;
use crate::simulation::PriceForecast;

pub const SUGGESTED_MIX_LABEL: &str = "Suggested mix (approx.)";

/// Asset, Ticker, fundamentals, then one `%` column per method and the
/// clipped suggested mix when present.
pub fn group_table(
  analysis: &GroupAnalysis,
  catalog: &TickerCatalog,
  fundamentals: &HashMap<String, Fundamentals>,
) -> Table {
  let mut headers: Vec<String> = vec!["Asset".into(), "Ticker".into()];
  headers.extend(FUNDAMENTAL_KEYS.iter().map(|k| k.to_string()));
  headers.extend(analysis.portfolios.iter().map(|(m, _)| m.label().to_string()));
  if analysis.suggested_mix.is_some() {
    headers.push(SUGGESTED_MIX_LABEL.into());
  }

  let zeroed = Fundamentals::zeroed();
  let mut table = Table::new(headers);
  for (i, symbol) in analysis.symbols().iter().enumerate() {
    let mut row = vec![catalog.name_of(symbol).to_string(), symbol.clone()];
    let f = fundamentals.get(symbol).unwrap_or(&zeroed);
    row.extend(f.report_values().iter().map(|v| format!("{v:.2}")));
    row.extend(
      analysis
        .portfolios
        .iter()
        .map(|(_, r)| html::percent(r.weights[i])),
    );
    if let Some(mix) = &analysis.suggested_mix {
      row.push(html::percent(mix[i]));
    }
    table.push_row(row);
  }
  table
}

pub fn portfolio_report(
  outcome: &BatchOutcome,
  catalog: &TickerCatalog,
  fundamentals: &HashMap<String, Fundamentals>,
) -> HtmlReport {
  let mut report = HtmlReport::new("Portfolio Optimization");

  for analysis in &outcome.analyses {
    let section = report.section(format!("{} Industry", analysis.name));
    section.table(group_table(analysis, catalog, fundamentals));
    if let Some(reason) = analysis.frontier.degeneracy() {
      section.paragraph(format!("No efficient frontier: {reason}."));
    }
    section.chart(&frontier_chart(analysis));
  }

  if !outcome.skipped.is_empty() {
    let mut table = Table::new(["Group", "Reason"]);
    for skipped in &outcome.skipped {
      table.push_row([skipped.name.clone(), skipped.reason.clone()]);
    }
    report.section("Skipped groups").table(table);
  }

  report
}

pub fn forecast_report(symbol: &str, history: &[f64], forecast: &PriceForecast) -> HtmlReport {
  let mut report = HtmlReport::new(format!("{symbol} Forecast"));

  let mut table = Table::new(["Model", "Final price", "Change"]);
  for (model, path) in &forecast.paths {
    let last = path.last().copied().unwrap_or(forecast.s0);
    table.push_row([
      model.name().to_string(),
      format!("{last:.4}"),
      html::percent(last / forecast.s0 - 1.0),
    ]);
  }

  let section = report.section(symbol);
  section.paragraph(format!(
    "Last close {:.4}, calibrated drift {:.4}, volatility {:.4}.",
    forecast.s0, forecast.mu, forecast.sigma
  ));
  section.table(table);
  section.chart(&forecast_chart(symbol, history, forecast));
  report
}
