//! RSI (Relative Strength Index) indicator.
//!
//! Gains and losses of close-to-close changes are each smoothed with Wilder's
//! moving average (seeded with the simple mean of the first n changes).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (need n price changes).

use crate::domain::accessor::{Accessor, Field};
use crate::domain::error::IndicatorError;
use crate::domain::indicator::{Ema, Indicator, IndicatorType, Levels};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_LEVELS: Levels = Levels::new(70.0, 30.0, 50.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Rsi {
    average: Ema,
    source: Field,
    levels: Levels,
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            average: Ema::wilder(period),
            source: Field::Close,
            levels: DEFAULT_LEVELS,
        }
    }

    pub fn period(&self) -> usize {
        self.average.period()
    }

    pub fn source(&self) -> &Field {
        &self.source
    }

    /// Overbought/oversold/middle reference lines for display.
    pub fn levels(&self) -> Levels {
        self.levels
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.average = self.average.with_period(period);
        self
    }

    pub fn with_source(mut self, source: Field) -> Self {
        self.source = source;
        self
    }

    pub fn with_levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    pub fn apply(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let changes: Vec<Option<f64>> = (0..values.len())
            .map(|i| {
                if i == 0 {
                    return None;
                }
                Some(values[i]? - values[i - 1]?)
            })
            .collect();

        let gains: Vec<Option<f64>> = changes.iter().map(|c| c.map(|c| c.max(0.0))).collect();
        let losses: Vec<Option<f64>> = changes.iter().map(|c| c.map(|c| (-c).max(0.0))).collect();

        self.average
            .apply(&gains)
            .into_iter()
            .zip(self.average.apply(&losses))
            .map(|(avg_gain, avg_loss)| {
                let (avg_gain, avg_loss) = (avg_gain?, avg_loss?);
                if avg_loss == 0.0 {
                    Some(100.0)
                } else {
                    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
                }
            })
            .collect()
    }
}

impl Indicator for Rsi {
    type Output = Option<f64>;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Rsi {
            period: self.period(),
            source: self.source.clone(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("RSI", "period", self.period())
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

    fn make_bar(date: &str, close: f64) -> OhlcvBar {
        OhlcvBar::daily(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            close,
            close,
            close,
            close,
            1000.0,
        )
    }

    fn outputs(bars: &[OhlcvBar], rsi: &Rsi) -> Vec<Option<f64>> {
        rsi.compute(bars).unwrap().outputs().copied().collect()
    }

    #[test]
    fn rsi_empty_bars() {
        let bars: Vec<OhlcvBar> = vec![];
        assert!(outputs(&bars, &Rsi::new(14)).is_empty());
    }

    #[test]
    fn rsi_single_bar() {
        let bars = vec![make_bar("2024-01-01", 100.0)];
        assert_eq!(outputs(&bars, &Rsi::new(14)), vec![None]);
    }

    #[test]
    fn rsi_warmup_period() {
        let bars: Vec<OhlcvBar> = (1..=15)
            .map(|i| {
                let date = format!("2024-01-{:02}", i);
                make_bar(&date, 100.0 + (i as f64 % 5.0) * 2.0)
            })
            .collect();

        let values = outputs(&bars, &Rsi::new(14));
        assert_eq!(values.len(), 15);

        for (i, value) in values.iter().enumerate().take(14) {
            assert!(value.is_none(), "Bar {} should be undefined", i);
        }
        assert!(values[14].is_some(), "Bar 14 should be defined");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let bars: Vec<OhlcvBar> = (0..15)
            .map(|i| make_bar(&format!("2024-01-{:02}", i + 1), 100.0 + i as f64))
            .collect();

        let values = outputs(&bars, &Rsi::new(14));
        assert_eq!(values[14], Some(100.0));
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let bars: Vec<OhlcvBar> = (0..15)
            .map(|i| make_bar(&format!("2024-01-{:02}", i + 1), 100.0 - i as f64))
            .collect();

        let rsi = outputs(&bars, &Rsi::new(14))[14].unwrap();
        assert!(rsi.abs() < f64::EPSILON, "RSI should be 0 when all losses");
    }

    #[test]
    fn rsi_in_range() {
        let bars: Vec<OhlcvBar> = (1..=20)
            .map(|i| {
                let date = format!("2024-01-{:02}", i);
                let close = 100.0 + (i as f64 % 7.0 - 3.0) * 2.0;
                make_bar(&date, close)
            })
            .collect();

        for rsi in outputs(&bars, &Rsi::new(14)).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
        }
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let bars: Vec<OhlcvBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(&format!("2024-01-{:02}", i + 1), c))
            .collect();

        let rsi = outputs(&bars, &Rsi::new(14))[14].unwrap();

        // gains sum 4.0, losses sum 1.5 over 14 changes
        let expected = 100.0 - 100.0 / (1.0 + 4.0 / 1.5);
        assert!((rsi - expected).abs() < 1e-9);
        assert!(rsi > 50.0 && rsi < 100.0);
    }

    #[test]
    fn rsi_wilder_smoothing_after_seed() {
        let bars = vec![
            make_bar("2024-01-01", 10.0),
            make_bar("2024-01-02", 12.0),
            make_bar("2024-01-03", 11.0),
            make_bar("2024-01-04", 13.0),
        ];
        let values = outputs(&bars, &Rsi::new(2));

        // seed: gains [2, 0] -> 1, losses [0, 1] -> 0.5
        // next: gain (1 * 1 + 2) / 2 = 1.5, loss (0.5 * 1 + 0) / 2 = 0.25
        let expected_seed = 100.0 - 100.0 / (1.0 + 1.0 / 0.5);
        let expected_next = 100.0 - 100.0 / (1.0 + 1.5 / 0.25);
        assert!((values[2].unwrap() - expected_seed).abs() < 1e-9);
        assert!((values[3].unwrap() - expected_next).abs() < 1e-9);
    }

    #[test]
    fn rsi_indicator_type_and_levels() {
        let rsi = Rsi::default();
        assert_eq!(rsi.indicator_type().to_string(), "RSI(14)");
        assert_eq!(rsi.levels(), DEFAULT_LEVELS);

        let rsi = rsi.with_levels(Levels::new(80.0, 20.0, 50.0)).with_period(7);
        assert_eq!(rsi.period(), 7);
        assert_eq!(rsi.levels().overbought, 80.0);
    }

    #[test]
    fn rsi_zero_period() {
        let bars = vec![make_bar("2024-01-01", 100.0), make_bar("2024-01-02", 101.0)];
        let err = Rsi::new(0).compute(&bars).unwrap_err();
        assert_eq!(err, IndicatorError::invalid_period("RSI", "period", 0));
    }
}
