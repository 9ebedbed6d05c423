//! # Market Data
//!
//! $$
//! \{(t, p_{t,i})\}_{i=1}^N \mapsto R\in\mathbb R^{T\times N}
//! $$
//!
//! Price tables, simple returns, ticker metadata and the data sources that
//! feed the portfolio engine.

pub mod catalog;
pub mod csv_source;
pub mod fundamentals;
pub mod prices;
#[cfg(feature = "yahoo")]
pub mod yahoo;

pub use catalog::TickerCatalog;
pub use catalog::TickerInfo;
pub use csv_source::read_price_table;
pub use csv_source::CsvPriceSource;
pub use fundamentals::collect_fundamentals;
pub use fundamentals::Fundamentals;
pub use fundamentals::StaticFundamentals;
pub use fundamentals::FUNDAMENTAL_KEYS;
pub use prices::log_returns;
pub use prices::PriceSeries;
pub use prices::PriceTable;
pub use prices::ReturnMatrix;
