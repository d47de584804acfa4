//! Aroon indicator.
//!
//! Looks at the last n+1 bars (the current bar and n before it):
//! Up = 100 * (n - bars since highest high) / n
//! Down = 100 * (n - bars since lowest low) / n
//! Oscillator = Up - Down
//!
//! Warmup: first n bars are undefined.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::window::{periods_since_highest, periods_since_lowest};
use crate::domain::indicator::{Indicator, IndicatorType, Levels, OutputFields};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_LEVELS: Levels = Levels::new(70.0, 30.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AroonValue {
    pub up: Option<f64>,
    pub down: Option<f64>,
    pub oscillator: Option<f64>,
    pub levels: Levels,
}

impl OutputFields for AroonValue {
    fn field_names() -> &'static [&'static str] {
        &["up", "down", "oscillator"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![self.up, self.down, self.oscillator]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aroon {
    period: usize,
    levels: Levels,
}

impl Default for Aroon {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Aroon {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            levels: DEFAULT_LEVELS,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn levels(&self) -> Levels {
        self.levels
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    fn score(&self, since: Option<usize>) -> Option<f64> {
        let p = self.period as f64;
        since.map(|since| 100.0 * (p - since as f64) / p)
    }
}

impl Indicator for Aroon {
    type Output = AroonValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Aroon {
            period: self.period,
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("AROON", "period", self.period)
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<AroonValue> {
        let highs: Vec<Option<f64>> = bars.iter().map(Bar::high).collect();
        let lows: Vec<Option<f64>> = bars.iter().map(Bar::low).collect();
        let window = self.period + 1;

        periods_since_highest(&highs, window)
            .into_iter()
            .zip(periods_since_lowest(&lows, window))
            .map(|(since_high, since_low)| {
                let up = self.score(since_high);
                let down = self.score(since_low);
                AroonValue {
                    up,
                    down,
                    oscillator: up.zip(down).map(|(u, d)| u - d),
                    levels: self.levels,
                }
            })
            .collect()
    }
}
