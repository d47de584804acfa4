//! Ichimoku Kinko Hyo.
//!
//! Tenkan-sen, kijun-sen and senkou span B are midpoints of the highest high
//! and lowest low over their periods. Senkou span A = (tenkan + kijun) / 2.
//! Chikou span is the close.
//!
//! Every value is reported on the bar it is computed from. Consumers plot
//! the spans `displacement()` bars forward and chikou the same distance back.
//!
//! Default parameters: tenkan=9, kijun=26, senkou_b=52

use crate::domain::error::IndicatorError;
use crate::domain::indicator::window::midpoint;
use crate::domain::indicator::{Indicator, IndicatorType, OutputFields};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_TENKAN: usize = 9;
pub const DEFAULT_KIJUN: usize = 26;
pub const DEFAULT_SENKOU_B: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IchimokuValue {
    pub tenkan_sen: Option<f64>,
    pub kijun_sen: Option<f64>,
    pub senkou_span_a: Option<f64>,
    pub senkou_span_b: Option<f64>,
    pub chikou_span: Option<f64>,
}

impl OutputFields for IchimokuValue {
    fn field_names() -> &'static [&'static str] {
        &[
            "tenkan_sen",
            "kijun_sen",
            "senkou_span_a",
            "senkou_span_b",
            "chikou_span",
        ]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![
            self.tenkan_sen,
            self.kijun_sen,
            self.senkou_span_a,
            self.senkou_span_b,
            self.chikou_span,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ichimoku {
    tenkan: usize,
    kijun: usize,
    senkou_b: usize,
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self::new(DEFAULT_TENKAN, DEFAULT_KIJUN, DEFAULT_SENKOU_B)
    }
}

impl Ichimoku {
    pub fn new(tenkan: usize, kijun: usize, senkou_b: usize) -> Self {
        Self {
            tenkan,
            kijun,
            senkou_b,
        }
    }

    pub fn tenkan(&self) -> usize {
        self.tenkan
    }

    pub fn kijun(&self) -> usize {
        self.kijun
    }

    pub fn senkou_b(&self) -> usize {
        self.senkou_b
    }

    /// Bars to shift the senkou spans forward and chikou back when plotting.
    pub fn displacement(&self) -> usize {
        self.kijun
    }

    pub fn with_tenkan(mut self, period: usize) -> Self {
        self.tenkan = period;
        self
    }

    pub fn with_kijun(mut self, period: usize) -> Self {
        self.kijun = period;
        self
    }

    pub fn with_senkou_b(mut self, period: usize) -> Self {
        self.senkou_b = period;
        self
    }
}

impl Indicator for Ichimoku {
    type Output = IchimokuValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Ichimoku {
            tenkan: self.tenkan,
            kijun: self.kijun,
            senkou_b: self.senkou_b,
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("ICHIMOKU", "tenkan", self.tenkan)?;
        IndicatorError::check_period("ICHIMOKU", "kijun", self.kijun)?;
        IndicatorError::check_period("ICHIMOKU", "senkou_b", self.senkou_b)
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<IchimokuValue> {
        let highs: Vec<Option<f64>> = bars.iter().map(Bar::high).collect();
        let lows: Vec<Option<f64>> = bars.iter().map(Bar::low).collect();

        let tenkan = midpoint(&highs, &lows, self.tenkan);
        let kijun = midpoint(&highs, &lows, self.kijun);
        let senkou_b = midpoint(&highs, &lows, self.senkou_b);

        tenkan
            .into_iter()
            .zip(kijun)
            .zip(senkou_b)
            .zip(bars)
            .map(|(((tenkan_sen, kijun_sen), senkou_span_b), bar)| IchimokuValue {
                tenkan_sen,
                kijun_sen,
                senkou_span_a: tenkan_sen.zip(kijun_sen).map(|(t, k)| (t + k) / 2.0),
                senkou_span_b,
                chikou_span: bar.close(),
            })
            .collect()
    }
}
