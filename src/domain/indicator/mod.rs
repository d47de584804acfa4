//! Technical indicator implementations.
//!
//! This module provides the shared indicator protocol and output types:
//! - `Indicator`: configuration, validation and compute contract
//! - `IndicatorPoint` / `IndicatorSeries`: date-aligned output, one slot per bar
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `OutputFields` / `Column`: named access to output records for consumers
//!
//! Primitives (`sma`, `ema`, `stddev`, `atr`, `window`) are built from
//! accessors and arithmetic only. Composites hold the primitives they depend
//! on and never re-implement a recurrence.

pub mod adx;
pub mod aroon;
pub mod atr;
pub mod atr_trailing_stop;
pub mod bollinger;
pub mod ema;
pub mod ichimoku;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod vwap;
pub mod williams;
pub mod window;

pub use adx::{Adx, AdxValue};
pub use aroon::{Aroon, AroonValue};
pub use atr::{true_range, Atr, AtrAverage};
pub use atr_trailing_stop::{AtrTrailingStop, TrailingStopValue};
pub use bollinger::{Bollinger, BollingerValue};
pub use ema::{Ema, Smoothing};
pub use ichimoku::{Ichimoku, IchimokuValue};
pub use macd::{Macd, MacdValue};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stddev::StdDev;
pub use stochastic::{Stochastic, StochasticValue};
pub use vwap::{Vwap, VwapReset};
pub use williams::{Williams, WilliamsValue};

use crate::domain::accessor::Field;
use crate::domain::error::IndicatorError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDateTime;
use std::fmt;

/// A configured, reusable computation over a bar series.
///
/// Implementations are plain configuration values: `compute` borrows the
/// series for the duration of the call and keeps no state between calls, so
/// the same instance always yields the same output for the same input.
pub trait Indicator {
    /// Per-bar output. `Option<f64>` for single-value indicators, a struct of
    /// `Option<f64>` fields for multi-value ones.
    type Output: Clone + fmt::Debug + OutputFields;

    /// Identity derived from the current configuration.
    fn indicator_type(&self) -> IndicatorType;

    /// Checks every parameter, including those of dependency indicators.
    fn validate(&self) -> Result<(), IndicatorError>;

    /// One output per bar, aligned with `bars`. Callers must validate first;
    /// an invalid configuration yields warm-up values rather than a panic.
    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<Self::Output>;

    fn compute<B: Bar>(&self, bars: &[B]) -> Result<IndicatorSeries<Self::Output>, IndicatorError> {
        self.validate()?;
        let outputs = self.evaluate(bars);
        Ok(IndicatorSeries::from_parts(self.indicator_type(), bars, outputs))
    }
}

/// Computes `indicator` over `bars`.
pub fn compute<I: Indicator, B: Bar>(
    indicator: &I,
    bars: &[B],
) -> Result<IndicatorSeries<I::Output>, IndicatorError> {
    indicator.compute(bars)
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint<T> {
    pub date: NaiveDateTime,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries<T> {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint<T>>,
}

impl<T> IndicatorSeries<T> {
    pub fn from_parts<B: Bar>(indicator_type: IndicatorType, bars: &[B], outputs: Vec<T>) -> Self {
        let values = bars
            .iter()
            .zip(outputs)
            .map(|(bar, value)| IndicatorPoint {
                date: bar.date(),
                value,
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Output values without their dates.
    pub fn outputs(&self) -> impl Iterator<Item = &T> {
        self.values.iter().map(|p| &p.value)
    }
}

impl<T: OutputFields> IndicatorSeries<T> {
    /// Flattens the series into one column per output field.
    ///
    /// Single-field outputs are named after the indicator (`SMA(20)`),
    /// multi-field outputs get a suffix (`MACD(12,26,9).signal`).
    pub fn to_columns(&self) -> Vec<Column> {
        let names = T::field_names();
        let mut columns: Vec<Column> = names
            .iter()
            .map(|field| Column {
                name: if names.len() == 1 {
                    self.indicator_type.to_string()
                } else {
                    format!("{}.{}", self.indicator_type, field)
                },
                values: Vec::with_capacity(self.values.len()),
            })
            .collect();

        for point in &self.values {
            for (column, value) in columns.iter_mut().zip(point.value.field_values()) {
                column.values.push(value);
            }
        }
        columns
    }
}

/// Named access to the fields of an output record.
pub trait OutputFields {
    fn field_names() -> &'static [&'static str];
    fn field_values(&self) -> Vec<Option<f64>>;
}

impl OutputFields for Option<f64> {
    fn field_names() -> &'static [&'static str] {
        &["value"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![*self]
    }
}

/// One named output column, aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Reference lines drawn with an oscillator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub overbought: f64,
    pub oversold: f64,
    pub middle: f64,
}

impl Levels {
    pub const fn new(overbought: f64, oversold: f64, middle: f64) -> Self {
        Self {
            overbought,
            oversold,
            middle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma {
        period: usize,
        source: Field,
    },
    Ema {
        period: usize,
        smoothing: Smoothing,
        source: Field,
    },
    Stddev {
        period: usize,
        source: Field,
    },
    Atr {
        period: usize,
        average: AtrAverage,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        source: Field,
    },
    Rsi {
        period: usize,
        source: Field,
    },
    Bollinger {
        period: usize,
        multiplier: FloatParam,
        source: Field,
    },
    Adx {
        period: usize,
    },
    Aroon {
        period: usize,
    },
    Stochastic {
        period: usize,
        period_d: usize,
    },
    Williams {
        period: usize,
    },
    Ichimoku {
        tenkan: usize,
        kijun: usize,
        senkou_b: usize,
    },
    AtrTrailingStop {
        period: usize,
        average: AtrAverage,
        multiplier: FloatParam,
    },
    Vwap {
        reset: VwapReset,
        source: Field,
        volume: Field,
    },
}

/// A float parameter inside an identity, compared and hashed by its exact
/// bits. `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct FloatParam(f64);

impl FloatParam {
    pub fn new(value: f64) -> Self {
        Self(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for FloatParam {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatParam {}

impl std::hash::Hash for FloatParam {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for FloatParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn source_suffix(f: &mut fmt::Formatter<'_>, source: &Field, default: &Field) -> fmt::Result {
    if source == default {
        Ok(())
    } else {
        write!(f, "@{}", source)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma { period, source } => {
                write!(f, "SMA({})", period)?;
                source_suffix(f, source, &Field::Close)
            }
            IndicatorType::Ema {
                period,
                smoothing,
                source,
            } => {
                match smoothing {
                    Smoothing::Exponential => write!(f, "EMA({})", period)?,
                    Smoothing::Wilder => write!(f, "WILDER({})", period)?,
                }
                source_suffix(f, source, &Field::Close)
            }
            IndicatorType::Stddev { period, source } => {
                write!(f, "STDDEV({})", period)?;
                source_suffix(f, source, &Field::Close)
            }
            IndicatorType::Atr { period, average } => match average {
                AtrAverage::Simple => write!(f, "ATR({})", period),
                AtrAverage::Wilder => write!(f, "ATR_WILDER({})", period),
            },
            IndicatorType::Macd {
                fast,
                slow,
                signal,
                source,
            } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)?;
                source_suffix(f, source, &Field::Close)
            }
            IndicatorType::Rsi { period, source } => {
                write!(f, "RSI({})", period)?;
                source_suffix(f, source, &Field::Close)
            }
            IndicatorType::Bollinger {
                period,
                multiplier,
                source,
            } => {
                write!(f, "BOLLINGER({},{})", period, multiplier)?;
                source_suffix(f, source, &Field::Close)
            }
            IndicatorType::Adx { period } => write!(f, "ADX({})", period),
            IndicatorType::Aroon { period } => write!(f, "AROON({})", period),
            IndicatorType::Stochastic { period, period_d } => {
                write!(f, "STOCHASTIC({},{})", period, period_d)
            }
            IndicatorType::Williams { period } => write!(f, "WILLIAMS({})", period),
            IndicatorType::Ichimoku {
                tenkan,
                kijun,
                senkou_b,
            } => write!(f, "ICHIMOKU({},{},{})", tenkan, kijun, senkou_b),
            IndicatorType::AtrTrailingStop {
                period,
                average,
                multiplier,
            } => {
                let name = match average {
                    AtrAverage::Simple => "ATR_TRAILING_STOP",
                    AtrAverage::Wilder => "ATR_TRAILING_STOP_WILDER",
                };
                write!(f, "{}({},{})", name, period, multiplier)
            }
            IndicatorType::Vwap {
                reset,
                source,
                volume,
            } => {
                match reset {
                    VwapReset::Never => write!(f, "VWAP")?,
                    VwapReset::Daily => write!(f, "VWAP_DAILY")?,
                    VwapReset::At(anchor) => write!(f, "VWAP_ANCHORED({})", anchor)?,
                }
                if *volume == Field::Volume {
                    source_suffix(f, source, &Field::Typical)
                } else {
                    write!(f, "@{}/{}", source, volume)
                }
            }
        }
    }
}
