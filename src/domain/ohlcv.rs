//! Bar records read by every indicator.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// A time-indexed record with optional numeric fields.
///
/// Implement this on your own candle type to feed it to indicators without
/// conversion. Every price accessor defaults to `None`, so sparse records
/// (ticks, trades, synthetic value series) only override what they carry.
///
/// Within a series, `date` must be strictly increasing.
pub trait Bar {
    fn date(&self) -> NaiveDateTime;

    fn open(&self) -> Option<f64> {
        None
    }

    fn high(&self) -> Option<f64> {
        None
    }

    fn low(&self) -> Option<f64> {
        None
    }

    fn close(&self) -> Option<f64> {
        None
    }

    fn volume(&self) -> Option<f64> {
        None
    }

    /// A generic named field such as `value`, `price` or `spread`.
    fn field(&self, _name: &str) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub fields: BTreeMap<String, f64>,
}

impl OhlcvBar {
    /// A fully populated bar.
    pub fn new(date: NaiveDateTime, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
            fields: BTreeMap::new(),
        }
    }

    /// A bar with no fields set.
    pub fn empty(date: NaiveDateTime) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            fields: BTreeMap::new(),
        }
    }

    /// A daily bar stamped at midnight.
    pub fn daily(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN), open, high, low, close, volume)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

impl Bar for OhlcvBar {
    fn date(&self) -> NaiveDateTime {
        self.date
    }

    fn open(&self) -> Option<f64> {
        self.open
    }

    fn high(&self) -> Option<f64> {
        self.high
    }

    fn low(&self) -> Option<f64> {
        self.low
    }

    fn close(&self) -> Option<f64> {
        self.close
    }

    fn volume(&self) -> Option<f64> {
        self.volume
    }

    fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}
