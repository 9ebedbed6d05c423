//! # CSV Price Source
//!
//! $$
//! \texttt{date},\ p_{t,1},\ \dots,\ p_{t,N}
//! $$
//!
//! Wide CSV files of adjusted closes: one `date` column (ISO `YYYY-MM-DD`)
//! followed by one column per symbol. Empty cells are missing observations.

use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;
use ndarray::Array2;

use super::prices::PriceTable;
use crate::traits::PriceSource;
use crate::Error;
use crate::Result;

/// Parse a wide price CSV from any reader.
pub fn read_price_table<R: std::io::Read>(reader: R) -> Result<PriceTable> {
  let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
  let headers = rdr.headers()?.clone();
  let symbols: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

  let mut dates = Vec::new();
  let mut cells = Vec::new();
  for record in rdr.records() {
    let record = record?;
    let raw_date = record.get(0).unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
      .map_err(|e| Error::InvalidInput(format!("bad date '{raw_date}': {e}")))?;
    dates.push(date);

    for j in 0..symbols.len() {
      let cell = record.get(j + 1).unwrap_or_default();
      let price = if cell.is_empty() {
        f64::NAN
      } else {
        cell
          .parse::<f64>()
          .map_err(|e| Error::InvalidInput(format!("bad price '{cell}' on {date}: {e}")))?
      };
      cells.push(price);
    }
  }

  let prices = Array2::from_shape_vec((dates.len(), symbols.len()), cells)
    .map_err(|e| Error::InvalidInput(e.to_string()))?;
  PriceTable::new(dates, symbols, prices)
}

/// [`PriceSource`] backed by a wide CSV file on disk.
#[derive(Clone, Debug)]
pub struct CsvPriceSource {
  path: PathBuf,
}

impl CsvPriceSource {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
    }
  }
}

impl PriceSource for CsvPriceSource {
  fn price_history(
    &self,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<PriceTable> {
    let table = read_price_table(std::fs::File::open(&self.path)?)?.select(symbols);
    let rows: Vec<usize> = table
      .dates()
      .iter()
      .enumerate()
      .filter(|(_, d)| **d >= start && **d < end)
      .map(|(i, _)| i)
      .collect();

    PriceTable::new(
      rows.iter().map(|&i| table.dates()[i]).collect(),
      table.symbols().to_vec(),
      table.prices().select(ndarray::Axis(0), &rows),
    )
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  const CSV: &str = "date,AAA,BBB
2024-01-02,10.0,20.0
2024-01-03,10.5,
2024-01-04,11.0,21.0
2024-01-05,11.5,22.0
";

  #[test]
  fn empty_cells_become_missing() {
    let table = read_price_table(CSV.as_bytes()).unwrap();
    assert_eq!(table.symbols(), &["AAA".to_string(), "BBB".to_string()]);
    assert_eq!(table.dates().len(), 4);
    assert!(table.prices()[[1, 1]].is_nan());
  }

  #[test]
  fn bad_dates_are_reported() {
    let csv = "date,AAA\n02/01/2024,10.0\n";
    assert!(matches!(
      read_price_table(csv.as_bytes()),
      Err(Error::InvalidInput(_))
    ));
  }

  #[test]
  fn source_filters_symbols_and_half_open_range() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();

    let source = CsvPriceSource::new(file.path());
    let table = source
      .price_history(
        &["BBB".to_string(), "MISSING".to_string()],
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
      )
      .unwrap();

    assert_eq!(table.symbols(), &["BBB".to_string()]);
    assert_eq!(table.dates().len(), 2);
    assert_eq!(table.prices()[[1, 0]], 21.0);
  }
}
