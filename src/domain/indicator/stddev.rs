//! Standard Deviation indicator.
//!
//! Population standard deviation over n values around their SMA.
//! STDDEV(n)[i] = sqrt(sum((V[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are undefined. Absent values poison the window.

use crate::domain::accessor::{Accessor, Field};
use crate::domain::error::IndicatorError;
use crate::domain::indicator::{Indicator, IndicatorType, Sma};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct StdDev {
    period: usize,
    source: Field,
}

impl Default for StdDev {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl StdDev {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            source: Field::Close,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn source(&self) -> &Field {
        &self.source
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_source(mut self, source: Field) -> Self {
        self.source = source;
        self
    }

    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let means = Sma::new(self.period).apply(values);
        self.around(values, &means)
    }

    /// Deviation around precomputed window means (as produced by an SMA of
    /// the same period), so callers that already hold the SMA reuse it.
    ///
    /// Means that do not line up with `values` yield `None`.
    pub fn around(&self, values: &[Option<f64>], means: &[Option<f64>]) -> Vec<Option<f64>> {
        let period = self.period;
        if means.len() != values.len() {
            return vec![None; values.len()];
        }
        means
            .iter()
            .enumerate()
            .map(|(i, mean)| {
                let mean = (*mean)?;
                let start = (i + 1).checked_sub(period)?;
                let window = values.get(start..=i)?;
                let variance = window
                    .iter()
                    .map(|v| v.map(|v| (v - mean) * (v - mean)))
                    .sum::<Option<f64>>()?
                    / period as f64;
                Some(variance.sqrt())
            })
            .collect()
    }
}

impl Indicator for StdDev {
    type Output = Option<f64>;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Stddev {
            period: self.period,
            source: self.source.clone(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("STDDEV", "period", self.period)
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<Option<f64>> {
        self.apply(&self.source.series(bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                OhlcvBar::daily(
                    NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                    close,
                    close,
                    close,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    #[test]
    fn stddev_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = StdDev::new(3).compute(&bars).unwrap();

        assert!(series.values[0].value.is_none());
        assert!(series.values[1].value.is_none());
        assert!(series.values[2].value.is_some());
        assert!(series.values[4].value.is_some());
    }

    #[test]
    fn around_ignores_means_inside_warmup() {
        let values = [Some(1.0), Some(2.0)];
        assert_eq!(StdDev::new(5).around(&values, &[None, Some(1.5)]), vec![None, None]);
    }

    #[test]
    fn around_rejects_misaligned_means() {
        let values = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(StdDev::new(2).around(&values, &[Some(1.5)]), vec![None; 3]);
        assert_eq!(
            StdDev::new(2).around(&values, &[None, Some(1.5), Some(2.5)]),
            vec![None, Some(0.5), Some(0.5)]
        );
    }

    #[test]
    fn stddev_constant_values_is_zero() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let series = StdDev::new(3).compute(&bars).unwrap();

        for point in &series.values[2..] {
            assert!(point.value.unwrap().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn stddev_population_not_sample() {
        let bars = make_bars(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let series = StdDev::new(8).compute(&bars).unwrap();

        // Classic example: population sd = 2, sample sd would be ~2.138
        assert!((series.values[7].value.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stddev_absent_value_poisons_window() {
        let sd = StdDev::new(2);
        let out = sd.apply(&[Some(1.0), Some(3.0), None, Some(4.0)]);
        assert_eq!(out, vec![None, Some(1.0), None, None]);
    }

    #[test]
    fn stddev_zero_period() {
        let bars = make_bars(&[10.0, 20.0]);
        assert!(StdDev::new(0).compute(&bars).is_err());
        assert_eq!(StdDev::new(0).apply(&[Some(1.0)]), vec![None]);
    }

    #[test]
    fn stddev_indicator_type() {
        assert_eq!(StdDev::new(5).indicator_type().to_string(), "STDDEV(5)");
    }
}
