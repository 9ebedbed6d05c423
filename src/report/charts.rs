//! # Charts
//!
//! $$
//! (\sigma_i,\mu_i)_{i=1}^N\ \cup\ \{(\sigma_p(t),t)\}_{t}
//! $$
//!
//! Plotly figures embedded in the HTML reports.

use plotly::common::DashType;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::Mode;
use plotly::common::Position;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;

use crate::portfolio::GroupAnalysis;
use crate::simulation::PriceForecast;

/// Assets as labelled markers at `(σᵢ, μᵢ)`, the unconstrained frontier as a
/// solid line, the long-only frontier dashed and one marker per optimized
/// portfolio.
pub fn frontier_chart(analysis: &GroupAnalysis) -> Plot {
  let est = &analysis.estimate;
  let mut plot = Plot::new();

  let assets = Scatter::new(est.volatilities().to_vec(), est.mean.to_vec())
    .name("Assets")
    .mode(Mode::MarkersText)
    .text_array(est.symbols.clone())
    .text_position(Position::TopCenter)
    .marker(Marker::new().size(8).color("#1f77b4"));
  plot.add_trace(assets);

  if !analysis.frontier.is_empty() {
    let frontier = Scatter::new(analysis.frontier.risks(), analysis.frontier.returns())
      .name("Efficient frontier")
      .mode(Mode::Lines)
      .line(Line::new().color("#2ca02c").width(2.0));
    plot.add_trace(frontier);
  }

  if let Some(long_only) = analysis.long_only.as_ref().filter(|f| !f.is_empty()) {
    let trace = Scatter::new(long_only.risks(), long_only.returns())
      .name("Long-only frontier")
      .mode(Mode::Lines)
      .line(Line::new().color("#d62728").dash(DashType::Dash));
    plot.add_trace(trace);
  }

  for (method, result) in &analysis.portfolios {
    let trace = Scatter::new(vec![result.volatility], vec![result.expected_return])
      .name(method.label())
      .mode(Mode::Markers)
      .marker(Marker::new().size(12));
    plot.add_trace(trace);
  }

  plot.set_layout(
    Layout::new()
      .title(Title::from(format!("{} efficient frontier", analysis.name).as_str()))
      .x_axis(Axis::new().title("Risk (annualized σ)"))
      .y_axis(Axis::new().title("Expected return (annualized)")),
  );
  plot
}

/// Price history followed by one simulated path per model, a dotted
/// last-price line and, when defined, the Brownian 90% terminal band.
pub fn forecast_chart(symbol: &str, history: &[f64], forecast: &PriceForecast) -> Plot {
  let mut plot = Plot::new();
  let start = history.len().saturating_sub(1);

  let hist = Scatter::new((0..history.len()).collect::<Vec<_>>(), history.to_vec())
    .name("History")
    .mode(Mode::Lines)
    .line(Line::new().color("#808080"));
  plot.add_trace(hist);

  let mut end = start;
  for (model, path) in &forecast.paths {
    let x: Vec<usize> = (start..start + path.len()).collect();
    end = end.max(start + path.len().saturating_sub(1));
    let trace = Scatter::new(x, path.to_vec())
      .name(model.name())
      .mode(Mode::Lines)
      .line(Line::new().color(model.color()).width(1.0));
    plot.add_trace(trace);
  }

  let last = Scatter::new(vec![0, end], vec![forecast.s0, forecast.s0])
    .name("Last price")
    .mode(Mode::Lines)
    .line(Line::new().color("#000000").dash(DashType::Dot));
  plot.add_trace(last);

  if let Some((lo, hi)) = forecast.band {
    for (label, level) in [("5% quantile", lo), ("95% quantile", hi)] {
      let trace = Scatter::new(vec![start, end], vec![forecast.s0, level])
        .name(label)
        .mode(Mode::Lines)
        .line(Line::new().color("#00AA00").dash(DashType::Dot));
      plot.add_trace(trace);
    }
  }

  plot.set_layout(
    Layout::new()
      .title(Title::from(format!("{symbol} price forecast").as_str()))
      .x_axis(Axis::new().title("Step"))
      .y_axis(Axis::new().title("Price")),
  );
  plot
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;
  use crate::market::ReturnMatrix;
  use crate::portfolio::PortfolioEngine;
  use crate::simulation::ForecastModel;

  #[test]
  fn frontier_chart_carries_assets_and_curves() {
    let returns = array![
      [0.010, -0.004, 0.002],
      [-0.006, 0.008, 0.001],
      [0.004, 0.002, -0.003],
      [0.007, -0.005, 0.004],
      [-0.002, 0.006, 0.000],
      [0.005, 0.001, -0.002],
    ];
    let symbols = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
    let matrix = ReturnMatrix::new(symbols, returns).unwrap();
    let analysis = PortfolioEngine::default().analyze("Tech", &matrix).unwrap();

    let json = frontier_chart(&analysis).to_json();
    assert!(json.contains("AAA") && json.contains("CCC"));
    assert!(json.contains("Efficient frontier"));
    assert!(json.contains("Tech efficient frontier"));
  }

  #[test]
  fn forecast_chart_uses_model_colors() {
    let history = vec![10.0, 10.5, 10.2, 10.8, 11.0];
    let forecast = PriceForecast::from_closes(&history, 1.0 / 24.0, 20).unwrap();
    let json = forecast_chart("ABC", &history, &forecast).to_json();

    for model in ForecastModel::ALL {
      assert!(json.contains(model.color()), "{}", model.name());
    }
    assert!(json.contains("Last price"));
  }
}
