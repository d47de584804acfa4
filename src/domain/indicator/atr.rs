//! True range and Average True Range.
//!
//! TR[i] = max(H - L, |H - C[i-1]|, |L - C[i-1]|), TR[0] = H - L.
//! ATR(n) is the SMA (default) or Wilder average of TR.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{Ema, Indicator, IndicatorType, Sma};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AtrAverage {
    #[default]
    Simple,
    Wilder,
}

/// True range per bar. Absent when high or low is absent, or when the bar has
/// a predecessor whose close is absent.
pub fn true_range<B: Bar>(bars: &[B]) -> Vec<Option<f64>> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high()? - bar.low()?;
            if i == 0 {
                return Some(hl);
            }
            let prev_close = bars[i - 1].close()?;
            let hc = (bar.high()? - prev_close).abs();
            let lc = (bar.low()? - prev_close).abs();
            Some(hl.max(hc).max(lc))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atr {
    period: usize,
    average: AtrAverage,
}

impl Default for Atr {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            average: AtrAverage::Simple,
        }
    }

    pub fn wilder(period: usize) -> Self {
        Self {
            period,
            average: AtrAverage::Wilder,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn average(&self) -> AtrAverage {
        self.average
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_average(mut self, average: AtrAverage) -> Self {
        self.average = average;
        self
    }

    /// Smooths an already computed true range series.
    pub fn apply(&self, true_ranges: &[Option<f64>]) -> Vec<Option<f64>> {
        match self.average {
            AtrAverage::Simple => Sma::new(self.period).apply(true_ranges),
            AtrAverage::Wilder => Ema::wilder(self.period).apply(true_ranges),
        }
    }
}

impl Indicator for Atr {
    type Output = Option<f64>;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Atr {
            period: self.period,
            average: self.average,
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("ATR", "period", self.period)
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<Option<f64>> {
        self.apply(&true_range(bars))
    }
}
