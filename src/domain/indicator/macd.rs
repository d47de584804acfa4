//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Divergence = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line is defined from index slow-1, signal and divergence from
//! slow-1 + signal-1.

use crate::domain::accessor::{Accessor, Field};
use crate::domain::error::IndicatorError;
use crate::domain::indicator::{Ema, Indicator, IndicatorType, OutputFields};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdValue {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub divergence: Option<f64>,
}

impl OutputFields for MacdValue {
    fn field_names() -> &'static [&'static str] {
        &["macd", "signal", "divergence"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![self.macd, self.signal, self.divergence]
    }
}

/// MACD built from three exponential EMAs. The fast and slow EMAs read from
/// `source`; the signal EMA runs over the MACD line.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    source: Field,
}

impl Default for Macd {
    fn default() -> Self {
        Self::with_periods(DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
    }
}

impl Macd {
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
            source: Field::Close,
        }
    }

    pub fn fast(&self) -> usize {
        self.fast.period()
    }

    pub fn slow(&self) -> usize {
        self.slow.period()
    }

    pub fn signal(&self) -> usize {
        self.signal.period()
    }

    pub fn source(&self) -> &Field {
        &self.source
    }

    pub fn with_fast(mut self, period: usize) -> Self {
        self.fast = self.fast.with_period(period);
        self
    }

    pub fn with_slow(mut self, period: usize) -> Self {
        self.slow = self.slow.with_period(period);
        self
    }

    pub fn with_signal(mut self, period: usize) -> Self {
        self.signal = self.signal.with_period(period);
        self
    }

    pub fn with_source(mut self, source: Field) -> Self {
        self.source = source;
        self
    }

    pub fn apply(&self, values: &[Option<f64>]) -> Vec<MacdValue> {
        let fast = self.fast.apply(values);
        let slow = self.slow.apply(values);

        let line: Vec<Option<f64>> = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();
        let signal = self.signal.apply(&line);

        line.into_iter()
            .zip(signal)
            .map(|(macd, signal)| MacdValue {
                macd,
                signal,
                divergence: macd.zip(signal).map(|(m, s)| m - s),
            })
            .collect()
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.fast(),
            slow: self.slow(),
            signal: self.signal(),
            source: self.source.clone(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("MACD", "fast", self.fast())?;
        IndicatorError::check_period("MACD", "slow", self.slow())?;
        IndicatorError::check_period("MACD", "signal", self.signal())?;
        if self.fast() >= self.slow() {
            return Err(IndicatorError::InvalidParameter {
                indicator: "MACD",
                reason: format!(
                    "fast period ({}) must be shorter than slow period ({})",
                    self.fast(),
                    self.slow()
                ),
            });
        }
        Ok(())
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<MacdValue> {
        self.apply(&self.source.series(bars))
    }
}
