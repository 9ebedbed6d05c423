use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use efficient_frontier::market::collect_fundamentals;
use efficient_frontier::market::CsvPriceSource;
use efficient_frontier::market::ReturnMatrix;
use efficient_frontier::market::StaticFundamentals;
use efficient_frontier::market::TickerCatalog;
use efficient_frontier::portfolio::EstimatorConfig;
use efficient_frontier::portfolio::OptimizerMethod;
use efficient_frontier::portfolio::PortfolioEngine;
use efficient_frontier::portfolio::PortfolioEngineConfig;
use efficient_frontier::report;
use efficient_frontier::simulation::ForecastConfig;
use efficient_frontier::simulation::PriceForecast;
use efficient_frontier::traits::PriceSource;
use efficient_frontier::RISK_FREE;
use efficient_frontier::TRADING_DAYS;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "efficient-frontier")]
#[command(about = "Mean-variance portfolios, efficient frontiers and price forecasts")]
struct Cli {
  /// Log level when RUST_LOG is unset
  #[arg(short, long, global = true, default_value = "info")]
  log_level: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Optimize every catalog group and write an HTML report
  Optimize(OptimizeArgs),
  /// Simulate forward price paths for one symbol
  Forecast(ForecastArgs),
}

#[derive(Args, Debug)]
struct PriceArgs {
  /// Wide price CSV (`date,<symbol>,...`)
  #[arg(short, long)]
  prices: Option<PathBuf>,

  /// Download adjusted closes from Yahoo Finance instead of reading a CSV
  #[cfg(feature = "yahoo")]
  #[arg(long, conflicts_with = "prices")]
  yahoo: bool,

  /// First date, inclusive
  #[arg(long, default_value = "2020-01-01")]
  start: NaiveDate,

  /// Last date, exclusive. Defaults to today.
  #[arg(long)]
  end: Option<NaiveDate>,
}

impl PriceArgs {
  fn source(&self) -> anyhow::Result<Box<dyn PriceSource>> {
    #[cfg(feature = "yahoo")]
    if self.yahoo {
      return Ok(Box::new(efficient_frontier::market::yahoo::YahooPriceSource::new()?));
    }
    match &self.prices {
      Some(path) => Ok(Box::new(CsvPriceSource::new(path))),
      None => bail!("no price source, pass --prices <csv>"),
    }
  }

  fn range(&self) -> (NaiveDate, NaiveDate) {
    let end = self.end.unwrap_or_else(|| chrono::Local::now().date_naive());
    (self.start, end)
  }
}

#[derive(Args, Debug)]
struct OptimizeArgs {
  #[command(flatten)]
  prices: PriceArgs,

  /// Ticker catalog CSV (`symbol,name,category`)
  #[arg(short, long)]
  catalog: PathBuf,

  /// Fundamentals CSV (`symbol,<key>,...`) shown next to the weights
  #[arg(short, long)]
  fundamentals: Option<PathBuf>,

  #[arg(short, long, default_value = "portfolios_optimized.html")]
  out: PathBuf,

  #[arg(long, default_value_t = RISK_FREE)]
  risk_free: f64,

  #[arg(long, default_value_t = 100)]
  frontier_points: usize,

  #[arg(long, default_value_t = TRADING_DAYS)]
  periods_per_year: f64,

  /// Comma separated: min_variance, max_sharpe, equal_weight
  #[arg(long, value_delimiter = ',', default_value = "min_variance,max_sharpe,equal_weight")]
  methods: Vec<OptimizerMethod>,

  /// Skip the bounded long-only frontier
  #[arg(long)]
  no_long_only: bool,

  /// Minimum observed prices for a symbol to be kept
  #[arg(long, default_value_t = 2)]
  min_obs: usize,

  /// Analyze groups on the rayon pool
  #[arg(long)]
  parallel: bool,
}

#[derive(Args, Debug)]
struct ForecastArgs {
  #[command(flatten)]
  prices: PriceArgs,

  #[arg(short, long)]
  symbol: String,

  /// Points per simulated path
  #[arg(long, default_value_t = 100)]
  steps: usize,

  /// Horizon in years
  #[arg(long, default_value_t = 1.0 / 24.0)]
  horizon: f64,

  #[arg(long, default_value_t = 0.01)]
  drift: f64,

  /// Use the calibrated drift instead of --drift
  #[arg(long)]
  calibrated_drift: bool,

  #[arg(short, long, default_value = "forecast.html")]
  out: PathBuf,
}

fn optimize(args: OptimizeArgs) -> anyhow::Result<()> {
  let catalog = TickerCatalog::from_path(&args.catalog)
    .with_context(|| format!("reading catalog {}", args.catalog.display()))?;
  let symbols = catalog.symbols();
  let (start, end) = args.prices.range();

  let prices = args
    .prices
    .source()?
    .price_history(&symbols, start, end)
    .context("loading price history")?
    .retain_active(args.min_obs);
  let returns = ReturnMatrix::from_prices(&prices);
  info!(
    symbols = returns.n_symbols(),
    periods = returns.n_periods(),
    "return matrix ready"
  );

  let engine = PortfolioEngine::new(PortfolioEngineConfig {
    risk_free: args.risk_free,
    frontier_points: args.frontier_points,
    estimator: EstimatorConfig {
      periods_per_year: args.periods_per_year,
      ..Default::default()
    },
    methods: args.methods,
    long_only_frontier: !args.no_long_only,
    ..Default::default()
  });
  let outcome = match args.parallel {
    true => engine.run_par(&catalog, &returns),
    false => engine.run(&catalog, &returns),
  };

  let fundamentals = match &args.fundamentals {
    Some(path) => {
      let source = StaticFundamentals::from_path(path)
        .with_context(|| format!("reading fundamentals {}", path.display()))?;
      collect_fundamentals(&source, &symbols)
    }
    None => HashMap::new(),
  };

  for analysis in &outcome.analyses {
    if let Some(table) = report::suggested_mix_table(&catalog, analysis) {
      println!("{} ({})", analysis.name, report::SUGGESTED_MIX_LABEL);
      table.printstd();
    }
  }

  report::portfolio_report(&outcome, &catalog, &fundamentals)
    .write_to(&args.out)
    .with_context(|| format!("writing {}", args.out.display()))?;
  info!(path = %args.out.display(), "portfolio report written");
  Ok(())
}

fn forecast(args: ForecastArgs) -> anyhow::Result<()> {
  let (start, end) = args.prices.range();
  let table = args
    .prices
    .source()?
    .price_history(std::slice::from_ref(&args.symbol), start, end)
    .context("loading price history")?;
  let Some(series) = table.series(&args.symbol) else {
    bail!("no prices for {}", args.symbol);
  };
  let closes = series.closes();

  let config = ForecastConfig {
    steps: args.steps,
    horizon: args.horizon,
    drift: (!args.calibrated_drift).then_some(args.drift),
    ..Default::default()
  };
  let forecast = PriceForecast::with_config(&closes, &config)
    .with_context(|| format!("forecasting {}", args.symbol))?;
  info!(
    symbol = %args.symbol,
    mu = forecast.mu,
    sigma = forecast.sigma,
    "models calibrated"
  );

  report::forecast_report(&args.symbol, &closes, &forecast)
    .write_to(&args.out)
    .with_context(|| format!("writing {}", args.out.display()))?;
  info!(path = %args.out.display(), "forecast report written");
  Ok(())
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
    )
    .with_target(false)
    .init();

  match cli.command {
    Command::Optimize(args) => optimize(args),
    Command::Forecast(args) => forecast(args),
  }
}
