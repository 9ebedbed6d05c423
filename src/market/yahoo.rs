//! # Yahoo Finance Source
//!
//! $$
//! p_t = \text{adjclose}_t
//! $$
//!
//! Daily adjusted closes downloaded per symbol. A symbol whose download fails
//! or comes back empty is logged and left out of the table.

use chrono::NaiveDate;
use chrono::NaiveTime;
use time::OffsetDateTime;
use tracing::info;
use tracing::warn;
use yahoo_finance_api::YahooConnector;

use super::prices::PriceSeries;
use super::prices::PriceTable;
use crate::traits::PriceSource;
use crate::Error;
use crate::Result;

pub struct YahooPriceSource {
  provider: YahooConnector,
}

impl YahooPriceSource {
  pub fn new() -> Result<Self> {
    let provider = YahooConnector::new().map_err(|e| Error::DataSource(e.to_string()))?;
    Ok(Self { provider })
  }

  fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
    let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(ts).map_err(|e| Error::InvalidInput(e.to_string()))
  }

  fn fetch(&self, symbol: &str, start: OffsetDateTime, end: OffsetDateTime) -> Result<PriceSeries> {
    let response = tokio_test::block_on(self.provider.get_quote_history(symbol, start, end))
      .map_err(|e| Error::DataSource(format!("{symbol}: {e}")))?;
    let quotes = response
      .quotes()
      .map_err(|e| Error::DataSource(format!("{symbol}: {e}")))?;

    let mut points: Vec<(NaiveDate, f64)> = Vec::with_capacity(quotes.len());
    for q in quotes {
      let Some(date) = chrono::DateTime::from_timestamp(q.timestamp as i64, 0).map(|dt| dt.date_naive())
      else {
        continue;
      };
      if !(q.adjclose.is_finite() && q.adjclose > 0.0) {
        continue;
      }
      // intraday duplicates collapse onto the last quote of the day
      match points.last_mut() {
        Some(last) if last.0 == date => last.1 = q.adjclose,
        _ => points.push((date, q.adjclose)),
      }
    }

    Ok(PriceSeries::new(symbol, points))
  }
}

impl PriceSource for YahooPriceSource {
  fn price_history(
    &self,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<PriceTable> {
    let (start, end) = (Self::to_offset(start)?, Self::to_offset(end)?);
    let mut series = Vec::with_capacity(symbols.len());

    for symbol in symbols {
      match self.fetch(symbol, start, end) {
        Ok(s) if s.points.is_empty() => warn!(%symbol, "no quotes in range"),
        Ok(s) => {
          info!(%symbol, quotes = s.points.len(), "downloaded price history");
          series.push(s);
        }
        Err(err) => warn!(%symbol, %err, "price download failed"),
      }
    }

    PriceTable::from_series(&series)
  }
}
