//! ATR trailing stop.
//!
//! A stop `d = multiplier * ATR` away from the close that only ratchets in
//! the direction of the trend:
//! - long: stop = max(prev_stop, C - d) while C >= prev_stop, else flip short
//!   with stop = C + d
//! - short: stop = min(prev_stop, C + d) while C <= prev_stop, else flip long
//!   with stop = C - d
//!
//! The first bar with a defined ATR starts long unless the close fell versus
//! the previous close. A bar with undefined ATR or close restarts the fold.
//!
//! Default parameters: ATR(14), multiplier=3

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    true_range, Atr, FloatParam, Indicator, IndicatorType, OutputFields,
};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_MULTIPLIER: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrailingStopValue {
    /// Stop below price while long.
    pub up: Option<f64>,
    /// Stop above price while short.
    pub down: Option<f64>,
}

impl OutputFields for TrailingStopValue {
    fn field_names() -> &'static [&'static str] {
        &["up", "down"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![self.up, self.down]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Trend {
    Long(f64),
    Short(f64),
}

impl Trend {
    fn start(close: f64, prev_close: Option<f64>, distance: f64) -> Self {
        match prev_close {
            Some(prev) if close < prev => Trend::Short(close + distance),
            _ => Trend::Long(close - distance),
        }
    }

    fn next(self, close: f64, distance: f64) -> Self {
        match self {
            Trend::Long(stop) if close >= stop => Trend::Long(stop.max(close - distance)),
            Trend::Long(_) => Trend::Short(close + distance),
            Trend::Short(stop) if close <= stop => Trend::Short(stop.min(close + distance)),
            Trend::Short(_) => Trend::Long(close - distance),
        }
    }

    fn value(self) -> TrailingStopValue {
        match self {
            Trend::Long(stop) => TrailingStopValue {
                up: Some(stop),
                down: None,
            },
            Trend::Short(stop) => TrailingStopValue {
                up: None,
                down: Some(stop),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtrTrailingStop {
    atr: Atr,
    multiplier: f64,
}

impl Default for AtrTrailingStop {
    fn default() -> Self {
        Self::new(Atr::default(), DEFAULT_MULTIPLIER)
    }
}

impl AtrTrailingStop {
    pub fn new(atr: Atr, multiplier: f64) -> Self {
        Self { atr, multiplier }
    }

    pub fn atr(&self) -> &Atr {
        &self.atr
    }

    pub fn period(&self) -> usize {
        self.atr.period()
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn with_atr(mut self, atr: Atr) -> Self {
        self.atr = atr;
        self
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.atr = self.atr.with_period(period);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }
}

impl Indicator for AtrTrailingStop {
    type Output = TrailingStopValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::AtrTrailingStop {
            period: self.atr.period(),
            average: self.atr.average(),
            multiplier: FloatParam::new(self.multiplier),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        self.atr.validate()?;
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(IndicatorError::InvalidParameter {
                indicator: "ATR_TRAILING_STOP",
                reason: format!("multiplier must be positive, got {}", self.multiplier),
            });
        }
        Ok(())
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<TrailingStopValue> {
        let atr = self.atr.apply(&true_range(bars));
        let mut trend: Option<Trend> = None;
        let mut prev_close: Option<f64> = None;

        bars.iter()
            .zip(atr)
            .map(|(bar, atr)| {
                let close = bar.close();
                let value = match (close, atr) {
                    (Some(close), Some(atr)) => {
                        let distance = atr * self.multiplier;
                        let next = match trend {
                            Some(t) => t.next(close, distance),
                            None => Trend::start(close, prev_close, distance),
                        };
                        trend = Some(next);
                        next.value()
                    }
                    _ => {
                        trend = None;
                        TrailingStopValue::default()
                    }
                };
                prev_close = close;
                value
            })
            .collect()
    }
}
