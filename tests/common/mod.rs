#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use techind::domain::error::TechindError;
pub use techind::domain::ohlcv::OhlcvBar;
use techind::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, source: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(source.to_string(), bars);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        source: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TechindError> {
        let bars = self.data.get(source).ok_or_else(|| TechindError::Data {
            reason: format!("unknown source {source}"),
        })?;
        Ok(bars
            .iter()
            .filter(|b| start.is_none_or(|s| b.date.date() >= s))
            .filter(|b| end.is_none_or(|e| b.date.date() <= e))
            .cloned()
            .collect())
    }

    fn list_sources(&self) -> Result<Vec<String>, TechindError> {
        let mut sources: Vec<String> = self.data.keys().cloned().collect();
        sources.sort();
        Ok(sources)
    }
}

pub fn date(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset as i64)
}

pub fn intraday(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Daily bars with `close` as every price and a constant volume.
pub fn flat_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| OhlcvBar::daily(date(i), c, c, c, c, 1000.0))
        .collect()
}

/// Daily bars with a one point range around `close`.
pub fn ranged_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| OhlcvBar::daily(date(i), c, c + 1.0, c - 1.0, c, 1000.0))
        .collect()
}

/// A deterministic wavy series with a slow uptrend.
pub fn wavy_bars(n: usize) -> Vec<OhlcvBar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.4).sin() * 8.0 + i as f64 * 0.2;
            let open = close - (i as f64 * 0.9).cos();
            OhlcvBar::daily(
                date(i),
                open,
                open.max(close) + 1.5,
                open.min(close) - 1.5,
                close,
                1000.0 + (i % 7) as f64 * 150.0,
            )
        })
        .collect()
}

pub const BARS_CSV: &str = "\
date,open,high,low,close,volume
2024-01-03,12,13,11,12,300
2024-01-01,10,11,9,10,100
2024-01-02,11,12,10,11,200
2024-01-04,13,14,12,13,400
2024-01-05,14,15,13,14,500
";
