//! Runtime dispatch from an `IndicatorType` to the concrete indicator.
//!
//! Indicators parsed from text or config are only known by identity. These
//! helpers rebuild the configured indicator, run it, and flatten its output
//! into named columns.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{
    Adx, Aroon, Atr, AtrTrailingStop, Bollinger, Column, Ema, Ichimoku, Indicator,
    IndicatorType, Macd, Rsi, Sma, StdDev, Stochastic, Vwap, Williams,
};
use crate::domain::ohlcv::Bar;
use std::collections::HashSet;

/// Any configured indicator, built from its identity.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyIndicator {
    Sma(Sma),
    Ema(Ema),
    StdDev(StdDev),
    Atr(Atr),
    Macd(Macd),
    Rsi(Rsi),
    Bollinger(Bollinger),
    Adx(Adx),
    Aroon(Aroon),
    Stochastic(Stochastic),
    Williams(Williams),
    Ichimoku(Ichimoku),
    AtrTrailingStop(AtrTrailingStop),
    Vwap(Vwap),
}

impl AnyIndicator {
    pub fn from_type(indicator_type: &IndicatorType) -> Self {
        match indicator_type {
            IndicatorType::Sma { period, source } => {
                AnyIndicator::Sma(Sma::new(*period).with_source(source.clone()))
            }
            IndicatorType::Ema {
                period,
                smoothing,
                source,
            } => AnyIndicator::Ema(
                Ema::with_smoothing(*period, *smoothing).with_source(source.clone()),
            ),
            IndicatorType::Stddev { period, source } => {
                AnyIndicator::StdDev(StdDev::new(*period).with_source(source.clone()))
            }
            IndicatorType::Atr { period, average } => {
                AnyIndicator::Atr(Atr::new(*period).with_average(*average))
            }
            IndicatorType::Macd {
                fast,
                slow,
                signal,
                source,
            } => AnyIndicator::Macd(
                Macd::with_periods(*fast, *slow, *signal).with_source(source.clone()),
            ),
            IndicatorType::Rsi { period, source } => {
                AnyIndicator::Rsi(Rsi::new(*period).with_source(source.clone()))
            }
            IndicatorType::Bollinger {
                period,
                multiplier,
                source,
            } => AnyIndicator::Bollinger(
                Bollinger::new(*period)
                    .with_multiplier(multiplier.value())
                    .with_source(source.clone()),
            ),
            IndicatorType::Adx { period } => AnyIndicator::Adx(Adx::new(*period)),
            IndicatorType::Aroon { period } => AnyIndicator::Aroon(Aroon::new(*period)),
            IndicatorType::Stochastic { period, period_d } => {
                AnyIndicator::Stochastic(Stochastic::new(*period, *period_d))
            }
            IndicatorType::Williams { period } => AnyIndicator::Williams(Williams::new(*period)),
            IndicatorType::Ichimoku {
                tenkan,
                kijun,
                senkou_b,
            } => AnyIndicator::Ichimoku(Ichimoku::new(*tenkan, *kijun, *senkou_b)),
            IndicatorType::AtrTrailingStop {
                period,
                average,
                multiplier,
            } => AnyIndicator::AtrTrailingStop(AtrTrailingStop::new(
                Atr::new(*period).with_average(*average),
                multiplier.value(),
            )),
            IndicatorType::Vwap {
                reset,
                source,
                volume,
            } => AnyIndicator::Vwap(
                Vwap::new(reset.clone())
                    .with_source(source.clone())
                    .with_volume(volume.clone()),
            ),
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        match self {
            AnyIndicator::Sma(i) => i.indicator_type(),
            AnyIndicator::Ema(i) => i.indicator_type(),
            AnyIndicator::StdDev(i) => i.indicator_type(),
            AnyIndicator::Atr(i) => i.indicator_type(),
            AnyIndicator::Macd(i) => i.indicator_type(),
            AnyIndicator::Rsi(i) => i.indicator_type(),
            AnyIndicator::Bollinger(i) => i.indicator_type(),
            AnyIndicator::Adx(i) => i.indicator_type(),
            AnyIndicator::Aroon(i) => i.indicator_type(),
            AnyIndicator::Stochastic(i) => i.indicator_type(),
            AnyIndicator::Williams(i) => i.indicator_type(),
            AnyIndicator::Ichimoku(i) => i.indicator_type(),
            AnyIndicator::AtrTrailingStop(i) => i.indicator_type(),
            AnyIndicator::Vwap(i) => i.indicator_type(),
        }
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        match self {
            AnyIndicator::Sma(i) => i.validate(),
            AnyIndicator::Ema(i) => i.validate(),
            AnyIndicator::StdDev(i) => i.validate(),
            AnyIndicator::Atr(i) => i.validate(),
            AnyIndicator::Macd(i) => i.validate(),
            AnyIndicator::Rsi(i) => i.validate(),
            AnyIndicator::Bollinger(i) => i.validate(),
            AnyIndicator::Adx(i) => i.validate(),
            AnyIndicator::Aroon(i) => i.validate(),
            AnyIndicator::Stochastic(i) => i.validate(),
            AnyIndicator::Williams(i) => i.validate(),
            AnyIndicator::Ichimoku(i) => i.validate(),
            AnyIndicator::AtrTrailingStop(i) => i.validate(),
            AnyIndicator::Vwap(i) => i.validate(),
        }
    }

    /// Validates, computes and flattens the output into columns.
    pub fn compute_columns<B: Bar>(&self, bars: &[B]) -> Result<Vec<Column>, IndicatorError> {
        let columns = match self {
            AnyIndicator::Sma(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Ema(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::StdDev(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Atr(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Macd(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Rsi(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Bollinger(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Adx(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Aroon(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Stochastic(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Williams(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Ichimoku(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::AtrTrailingStop(i) => i.compute(bars)?.to_columns(),
            AnyIndicator::Vwap(i) => i.compute(bars)?.to_columns(),
        };
        Ok(columns)
    }
}

/// Checks the parameters of `indicator_type` without any bars.
pub fn validate_indicator(indicator_type: &IndicatorType) -> Result<(), IndicatorError> {
    AnyIndicator::from_type(indicator_type).validate()
}

/// Computes one indicator by identity and returns its output columns.
pub fn compute_indicator<B: Bar>(
    indicator_type: &IndicatorType,
    bars: &[B],
) -> Result<Vec<Column>, IndicatorError> {
    let columns = AnyIndicator::from_type(indicator_type).compute_columns(bars)?;
    tracing::debug!(
        indicator = %indicator_type,
        bars = bars.len(),
        columns = columns.len(),
        "computed indicator"
    );
    Ok(columns)
}

/// Computes each distinct indicator once, in first-seen order.
///
/// Repeated identities are skipped, so the result never holds two entries
/// for the same `IndicatorType`.
pub fn compute_indicators<B: Bar>(
    indicator_types: &[IndicatorType],
    bars: &[B],
) -> Result<Vec<(IndicatorType, Vec<Column>)>, IndicatorError> {
    let mut seen: HashSet<&IndicatorType> = HashSet::new();
    let mut results = Vec::with_capacity(indicator_types.len());

    for indicator_type in indicator_types {
        if !seen.insert(indicator_type) {
            tracing::debug!(indicator = %indicator_type, "skipping duplicate indicator");
            continue;
        }
        let columns = compute_indicator(indicator_type, bars)?;
        results.push((indicator_type.clone(), columns));
    }

    Ok(results)
}
