//! CSV file data adapter.
//!
//! Input files carry a header row. Columns are matched by name
//! (case-insensitive): `date` is required, `open`, `high`, `low`, `close`
//! and `volume` fill the bar fields, and any other column becomes a named
//! field. Empty cells leave the field absent.

use crate::domain::error::TechindError;
use crate::domain::indicator::Column;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fs;
use std::io;
use std::path::PathBuf;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

fn data_error(reason: impl Into<String>) -> TechindError {
    TechindError::Data {
        reason: reason.into(),
    }
}

/// Accepts `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM:SS`.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

enum Slot {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    Named(String),
}

impl Slot {
    fn from_header(header: &str) -> Self {
        match header.trim().to_lowercase().as_str() {
            "date" => Slot::Date,
            "open" => Slot::Open,
            "high" => Slot::High,
            "low" => Slot::Low,
            "close" => Slot::Close,
            "volume" => Slot::Volume,
            _ => Slot::Named(header.trim().to_string()),
        }
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, source: &str) -> PathBuf {
        let path = self.base_path.join(source);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension("csv")
        }
    }

    /// Parses bars from CSV text. Rows are sorted by date; a repeated date
    /// is an error.
    pub fn parse_bars<R: io::Read>(
        reader: R,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TechindError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let slots: Vec<Slot> = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error: {}", e)))?
            .iter()
            .map(Slot::from_header)
            .collect();
        if !slots.iter().any(|s| matches!(s, Slot::Date)) {
            return Err(data_error("missing date column"));
        }

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let line = row + 2;
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;

            let mut date = None;
            let mut values: Vec<(&Slot, f64)> = Vec::new();
            for (slot, cell) in slots.iter().zip(record.iter()) {
                if let Slot::Date = slot {
                    date = Some(parse_date(cell).ok_or_else(|| {
                        data_error(format!("line {}: invalid date '{}'", line, cell))
                    })?);
                    continue;
                }
                if cell.is_empty() {
                    continue;
                }
                let value: f64 = cell.parse().map_err(|_| {
                    data_error(format!("line {}: invalid number '{}'", line, cell))
                })?;
                values.push((slot, value));
            }
            let date = date.ok_or_else(|| data_error(format!("line {}: missing date", line)))?;

            let day = date.date();
            if start.is_some_and(|s| day < s) || end.is_some_and(|e| day > e) {
                continue;
            }

            let mut bar = OhlcvBar::empty(date);
            for (slot, value) in values {
                match slot {
                    Slot::Open => bar.open = Some(value),
                    Slot::High => bar.high = Some(value),
                    Slot::Low => bar.low = Some(value),
                    Slot::Close => bar.close = Some(value),
                    Slot::Volume => bar.volume = Some(value),
                    Slot::Named(name) => {
                        bar.fields.insert(name.clone(), value);
                    }
                    Slot::Date => {}
                }
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(data_error(format!("duplicate date {}", pair[0].date)));
        }
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        source: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TechindError> {
        let path = self.csv_path(source);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let bars = Self::parse_bars(content.as_bytes(), start, end)?;
        tracing::debug!(path = %path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }

    fn list_sources(&self) -> Result<Vec<String>, TechindError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut sources = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    sources.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        sources.sort();
        Ok(sources)
    }
}

/// Output formatting for [`write_columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Fixed number of decimals; shortest round-trip form when `None`.
    pub precision: Option<usize>,
    pub header: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            precision: None,
            header: true,
        }
    }
}

/// Writes one row per date with a `date` column followed by `columns`.
/// Absent values are written as empty cells.
pub fn write_columns<W: io::Write>(
    writer: W,
    dates: &[NaiveDateTime],
    columns: &[Column],
    options: WriteOptions,
) -> Result<(), TechindError> {
    let intraday = dates.iter().any(|d| d.time() != NaiveTime::MIN);
    let date_format = if intraday { DATETIME_FORMAT } else { DATE_FORMAT };

    let mut wtr = csv::Writer::from_writer(writer);
    let csv_error = |e: csv::Error| data_error(format!("CSV write error: {}", e));

    if options.header {
        let mut header = vec!["date".to_string()];
        header.extend(columns.iter().map(|c| c.name.clone()));
        wtr.write_record(&header).map_err(csv_error)?;
    }

    for (i, date) in dates.iter().enumerate() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(date.format(date_format).to_string());
        for column in columns {
            let cell = match (column.values.get(i).copied().flatten(), options.precision) {
                (Some(v), Some(p)) => format!("{:.*}", p, v),
                (Some(v), None) => v.to_string(),
                (None, _) => String::new(),
            };
            row.push(cell);
        }
        wtr.write_record(&row).map_err(csv_error)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("CBA.csv"), "date,close\n").unwrap();
        fs::write(path.join("notes.txt"), "not data").unwrap();

        (dir, path)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn fetch_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("BHP", None, None).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, day(15).and_time(NaiveTime::MIN));
        assert_eq!(bars[0].open, Some(100.0));
        assert_eq!(bars[0].high, Some(110.0));
        assert_eq!(bars[0].low, Some(90.0));
        assert_eq!(bars[0].close, Some(105.0));
        assert_eq!(bars[0].volume, Some(50000.0));
        assert_eq!(bars[2].close, Some(115.0));
    }

    #[test]
    fn fetch_bars_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter
            .fetch_bars("BHP.csv", Some(day(16)), Some(day(16)))
            .unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date.date(), day(16));

        let bars = adapter.fetch_bars("BHP", Some(day(16)), None).unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn fetch_bars_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_bars("XYZ", None, None).unwrap_err();
        assert!(matches!(err, TechindError::Data { .. }));
    }

    #[test]
    fn list_sources_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_sources().unwrap(), vec!["BHP", "CBA"]);
    }

    #[test]
    fn parse_bars_empty_cells_and_named_fields() {
        let content = "Date,Close,Spread\n\
            2024-01-01 09:30:00,10.5,\n\
            2024-01-01 09:31:00,,0.25\n";
        let bars = CsvAdapter::parse_bars(content.as_bytes(), None, None).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, Some(10.5));
        assert_eq!(bars[0].open, None);
        assert!(bars[0].fields.is_empty());
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[1].fields.get("Spread"), Some(&0.25));
        assert_eq!(bars[1].date, day(1).and_hms_opt(9, 31, 0).unwrap());
    }

    #[test]
    fn parse_bars_rejects_duplicates_and_bad_values() {
        let duplicate = "date,close\n2024-01-01,1\n2024-01-01,2\n";
        let err = CsvAdapter::parse_bars(duplicate.as_bytes(), None, None).unwrap_err();
        assert!(err.to_string().contains("duplicate date"));

        let bad_number = "date,close\n2024-01-01,abc\n";
        let err = CsvAdapter::parse_bars(bad_number.as_bytes(), None, None).unwrap_err();
        assert!(err.to_string().contains("line 2: invalid number 'abc'"));

        let bad_date = "date,close\n01/02/2024,1\n";
        assert!(CsvAdapter::parse_bars(bad_date.as_bytes(), None, None).is_err());

        let no_date = "close\n1\n";
        let err = CsvAdapter::parse_bars(no_date.as_bytes(), None, None).unwrap_err();
        assert!(err.to_string().contains("missing date column"));
    }

    #[test]
    fn write_columns_leaves_gaps_empty() {
        let dates = vec![day(1).and_time(NaiveTime::MIN), day(2).and_time(NaiveTime::MIN)];
        let columns = vec![
            Column {
                name: "SMA(2)".to_string(),
                values: vec![None, Some(1.5)],
            },
            Column {
                name: "MACD(1,2,1).signal".to_string(),
                values: vec![Some(0.25), None],
            },
        ];

        let mut out = Vec::new();
        write_columns(&mut out, &dates, &columns, WriteOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "date,SMA(2),\"MACD(1,2,1).signal\"\n2024-01-01,,0.25\n2024-01-02,1.5,\n"
        );
    }

    #[test]
    fn write_columns_intraday_and_precision() {
        let dates = vec![day(1).and_hms_opt(9, 30, 0).unwrap()];
        let columns = vec![Column {
            name: "VWAP".to_string(),
            values: vec![Some(10.0 / 3.0)],
        }];

        let mut out = Vec::new();
        let options = WriteOptions {
            precision: Some(2),
            header: true,
        };
        write_columns(&mut out, &dates, &columns, options).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "date,VWAP\n2024-01-01 09:30:00,3.33\n");

        let mut out = Vec::new();
        let options = WriteOptions {
            precision: None,
            header: false,
        };
        write_columns(&mut out, &dates, &columns, options).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("2024-01-01 09:30:00,3.333"));
    }
}
