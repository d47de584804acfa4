//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1)
//! over the same window as the SMA.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::accessor::{Accessor, Field};
use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    FloatParam, Indicator, IndicatorType, OutputFields, Sma, StdDev,
};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BollingerValue {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

impl OutputFields for BollingerValue {
    fn field_names() -> &'static [&'static str] {
        &["upper", "middle", "lower"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![self.upper, self.middle, self.lower]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bollinger {
    middle: Sma,
    multiplier: f64,
}

impl Default for Bollinger {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Bollinger {
    pub fn new(period: usize) -> Self {
        Self::from_sma(Sma::new(period), DEFAULT_MULTIPLIER)
    }

    /// Bands around `middle`; the deviation uses the SMA's period and source.
    pub fn from_sma(middle: Sma, multiplier: f64) -> Self {
        Self { middle, multiplier }
    }

    pub fn period(&self) -> usize {
        self.middle.period()
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn source(&self) -> &Field {
        self.middle.source()
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.middle = self.middle.with_period(period);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_source(mut self, source: Field) -> Self {
        self.middle = self.middle.with_source(source);
        self
    }

    pub fn apply(&self, values: &[Option<f64>]) -> Vec<BollingerValue> {
        let middle = self.middle.apply(values);
        let deviation = StdDev::new(self.period()).around(values, &middle);

        middle
            .into_iter()
            .zip(deviation)
            .map(|(middle, sd)| {
                let band = sd.map(|sd| self.multiplier * sd);
                BollingerValue {
                    upper: middle.zip(band).map(|(m, b)| m + b),
                    middle,
                    lower: middle.zip(band).map(|(m, b)| m - b),
                }
            })
            .collect()
    }
}

impl Indicator for Bollinger {
    type Output = BollingerValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Bollinger {
            period: self.period(),
            multiplier: FloatParam::new(self.multiplier),
            source: self.source().clone(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("BOLLINGER", "period", self.period())?;
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(IndicatorError::InvalidParameter {
                indicator: "BOLLINGER",
                reason: format!(
                    "multiplier must be a non-negative number, got {}",
                    self.multiplier
                ),
            });
        }
        Ok(())
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<BollingerValue> {
        self.apply(&self.source().series(bars))
    }
}
