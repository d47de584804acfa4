//! Exponential Moving Average indicator.
//!
//! k = alpha(n), seed with first SMA, then EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.
//!
//! The smoothing constant is chosen at construction: `2/(n+1)` for the
//! standard EMA, `1/n` for Wilder's moving average (used by ATR, RSI, ADX).
//! An absent value restarts the recurrence: that bar is undefined and the
//! next seed needs n consecutive values again.

use crate::domain::accessor::{Accessor, Field};
use crate::domain::error::IndicatorError;
use crate::domain::indicator::{Indicator, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Smoothing {
    /// `2 / (period + 1)`
    #[default]
    Exponential,
    /// `1 / period`
    Wilder,
}

impl Smoothing {
    pub fn alpha(self, period: usize) -> f64 {
        match self {
            Smoothing::Exponential => 2.0 / (period as f64 + 1.0),
            Smoothing::Wilder => 1.0 / period as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    period: usize,
    smoothing: Smoothing,
    source: Field,
}

impl Default for Ema {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Ema {
    /// Standard EMA, `alpha = 2/(period+1)`.
    pub fn new(period: usize) -> Self {
        Self::with_smoothing(period, Smoothing::Exponential)
    }

    /// Wilder's moving average, `alpha = 1/period`.
    pub fn wilder(period: usize) -> Self {
        Self::with_smoothing(period, Smoothing::Wilder)
    }

    pub fn with_smoothing(period: usize, smoothing: Smoothing) -> Self {
        Self {
            period,
            smoothing,
            source: Field::Close,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    pub fn source(&self) -> &Field {
        &self.source
    }

    pub fn alpha(&self) -> f64 {
        self.smoothing.alpha(self.period)
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_source(mut self, source: Field) -> Self {
        self.source = source;
        self
    }

    /// Runs the recurrence over an already extracted series.
    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let period = self.period;
        if period == 0 {
            return vec![None; values.len()];
        }

        let k = self.alpha();
        let mut out = Vec::with_capacity(values.len());
        let mut ema: Option<f64> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for value in values {
            let Some(v) = *value else {
                ema = None;
                sum = 0.0;
                count = 0;
                out.push(None);
                continue;
            };

            match ema {
                Some(prev) => {
                    let next = v * k + prev * (1.0 - k);
                    ema = Some(next);
                }
                None => {
                    sum += v;
                    count += 1;
                    if count == period {
                        ema = Some(sum / period as f64);
                    }
                }
            }
            out.push(ema);
        }

        out
    }
}

impl Indicator for Ema {
    type Output = Option<f64>;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Ema {
            period: self.period,
            smoothing: self.smoothing,
            source: self.source.clone(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        let name = match self.smoothing {
            Smoothing::Exponential => "EMA",
            Smoothing::Wilder => "WILDER",
        };
        IndicatorError::check_period(name, "period", self.period)
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<Option<f64>> {
        self.apply(&self.source.series(bars))
    }
}
