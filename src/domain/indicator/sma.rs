//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = (V[i-n+1] + ... + V[i]) / n
//! Warmup: first (n-1) bars are undefined.
//!
//! A window containing an absent value is undefined as a whole; it is never
//! averaged over fewer points.

use crate::domain::accessor::{Accessor, Field};
use crate::domain::error::IndicatorError;
use crate::domain::indicator::{Indicator, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Sma {
    period: usize,
    source: Field,
}

impl Default for Sma {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            source: Field::Close,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn source(&self) -> &Field {
        &self.source
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_source(mut self, source: Field) -> Self {
        self.source = source;
        self
    }

    /// Runs the moving average over an already extracted series.
    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let period = self.period;
        if period == 0 {
            return vec![None; values.len()];
        }

        (0..values.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = &values[i + 1 - period..=i];
                let sum = window.iter().copied().sum::<Option<f64>>()?;
                Some(sum / period as f64)
            })
            .collect()
    }
}

impl Indicator for Sma {
    type Output = Option<f64>;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Sma {
            period: self.period,
            source: self.source.clone(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("SMA", "period", self.period)
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<Option<f64>> {
        self.apply(&self.source.series(bars))
    }
}
