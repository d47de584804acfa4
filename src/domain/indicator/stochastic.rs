//! Stochastic oscillator.
//!
//! %K = 100 * (C - LL) / (HH - LL) over n bars; 50 when HH == LL.
//! %D = SMA(d) of %K.
//!
//! Default parameters: n=14, d=3
//! Warmup: %K from index n-1, %D from index n+d-2.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::window::{highest, lowest};
use crate::domain::indicator::{Indicator, IndicatorType, Levels, OutputFields, Sma};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_PERIOD_D: usize = 3;
pub const DEFAULT_LEVELS: Levels = Levels::new(80.0, 20.0, 50.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticValue {
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub levels: Levels,
}

impl OutputFields for StochasticValue {
    fn field_names() -> &'static [&'static str] {
        &["k", "d"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![self.k, self.d]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stochastic {
    period: usize,
    smoothing: Sma,
    levels: Levels,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD, DEFAULT_PERIOD_D)
    }
}

impl Stochastic {
    pub fn new(period: usize, period_d: usize) -> Self {
        Self::from_smoothing(period, Sma::new(period_d))
    }

    /// %D is `smoothing` applied to %K.
    pub fn from_smoothing(period: usize, smoothing: Sma) -> Self {
        Self {
            period,
            smoothing,
            levels: DEFAULT_LEVELS,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn period_d(&self) -> usize {
        self.smoothing.period()
    }

    pub fn levels(&self) -> Levels {
        self.levels
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_period_d(mut self, period_d: usize) -> Self {
        self.smoothing = self.smoothing.with_period(period_d);
        self
    }

    pub fn with_levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }
}

impl Indicator for Stochastic {
    type Output = StochasticValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Stochastic {
            period: self.period,
            period_d: self.period_d(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("STOCHASTIC", "period", self.period)?;
        IndicatorError::check_period("STOCHASTIC", "period_d", self.period_d())
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<StochasticValue> {
        let highs: Vec<Option<f64>> = bars.iter().map(Bar::high).collect();
        let lows: Vec<Option<f64>> = bars.iter().map(Bar::low).collect();

        let k: Vec<Option<f64>> = highest(&highs, self.period)
            .into_iter()
            .zip(lowest(&lows, self.period))
            .zip(bars)
            .map(|((hh, ll), bar)| {
                let (hh, ll, close) = (hh?, ll?, bar.close()?);
                if hh == ll {
                    Some(50.0)
                } else {
                    Some(100.0 * (close - ll) / (hh - ll))
                }
            })
            .collect();
        let d = self.smoothing.apply(&k);

        k.into_iter()
            .zip(d)
            .map(|(k, d)| StochasticValue {
                k,
                d,
                levels: self.levels,
            })
            .collect()
    }
}
