//! Williams %R.
//!
//! %R = -100 * (HH - C) / (HH - LL) over n bars; -50 when HH == LL.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::window::{highest, lowest};
use crate::domain::indicator::{Indicator, IndicatorType, Levels, OutputFields};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_LEVELS: Levels = Levels::new(-20.0, -80.0, -50.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilliamsValue {
    pub williams: Option<f64>,
    pub levels: Levels,
}

impl OutputFields for WilliamsValue {
    fn field_names() -> &'static [&'static str] {
        &["williams"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![self.williams]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Williams {
    period: usize,
    levels: Levels,
}

impl Default for Williams {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Williams {
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
}

fn percent_r(hh: Option<f64>, ll: Option<f64>, close: Option<f64>) -> Option<f64> {
    let (hh, ll, close) = (hh?, ll?, close?);
    if hh == ll {
        Some(-50.0)
    } else {
        Some(-100.0 * (hh - close) / (hh - ll))
    }
}

impl Indicator for Williams {
    type Output = WilliamsValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Williams {
            period: self.period,
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("WILLIAMS", "period", self.period)
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<WilliamsValue> {
        let highs: Vec<Option<f64>> = bars.iter().map(Bar::high).collect();
        let lows: Vec<Option<f64>> = bars.iter().map(Bar::low).collect();

        highest(&highs, self.period)
            .into_iter()
            .zip(lowest(&lows, self.period))
            .zip(bars)
            .map(|((hh, ll), bar)| WilliamsValue {
                williams: percent_r(hh, ll, bar.close()),
                levels: self.levels,
            })
            .collect()
    }
}
