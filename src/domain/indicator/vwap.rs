//! Volume Weighted Average Price.
//!
//! VWAP = sum(price * volume) / sum(volume), accumulated from the last reset.
//! Price defaults to the typical price (H + L + C) / 3 and volume to the
//! bar volume; both accessors can be rebound.
//!
//! A bar with absent price or volume is undefined and does not contribute.
//! A zero cumulative volume is undefined.

use crate::domain::accessor::{Accessor, Field};
use crate::domain::error::IndicatorError;
use crate::domain::indicator::{Indicator, IndicatorType};
use crate::domain::ohlcv::Bar;
use chrono::NaiveDateTime;

/// When the running sums start over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VwapReset {
    /// Accumulate from the first bar of the series.
    #[default]
    Never,
    /// Start over whenever the calendar day changes.
    Daily,
    /// Undefined before the anchor, accumulating from the first bar at or
    /// after it.
    At(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vwap {
    source: Field,
    volume: Field,
    reset: VwapReset,
}

impl Default for Vwap {
    fn default() -> Self {
        Self::new(VwapReset::Never)
    }
}

impl Vwap {
    pub fn new(reset: VwapReset) -> Self {
        Self {
            source: Field::Typical,
            volume: Field::Volume,
            reset,
        }
    }

    pub fn daily() -> Self {
        Self::new(VwapReset::Daily)
    }

    pub fn anchored(anchor: NaiveDateTime) -> Self {
        Self::new(VwapReset::At(anchor))
    }

    pub fn source(&self) -> &Field {
        &self.source
    }

    pub fn volume(&self) -> &Field {
        &self.volume
    }

    pub fn reset(&self) -> &VwapReset {
        &self.reset
    }

    pub fn with_source(mut self, source: Field) -> Self {
        self.source = source;
        self
    }

    pub fn with_volume(mut self, volume: Field) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_reset(mut self, reset: VwapReset) -> Self {
        self.reset = reset;
        self
    }

    fn starts_session(&self, date: NaiveDateTime, prev: Option<NaiveDateTime>) -> bool {
        match self.reset {
            VwapReset::Daily => prev.is_some_and(|prev| prev.date() != date.date()),
            VwapReset::Never | VwapReset::At(_) => false,
        }
    }

    fn before_anchor(&self, date: NaiveDateTime) -> bool {
        matches!(self.reset, VwapReset::At(anchor) if date < anchor)
    }
}

impl Indicator for Vwap {
    type Output = Option<f64>;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Vwap {
            reset: self.reset.clone(),
            source: self.source.clone(),
            volume: self.volume.clone(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        Ok(())
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<Option<f64>> {
        let mut price_volume = 0.0;
        let mut volume = 0.0;
        let mut prev_date: Option<NaiveDateTime> = None;

        bars.iter()
            .map(|bar| {
                let date = bar.date();
                if self.starts_session(date, prev_date) {
                    price_volume = 0.0;
                    volume = 0.0;
                }
                prev_date = Some(date);

                if self.before_anchor(date) {
                    return None;
                }
                let price = self.source.extract(bar)?;
                let v = self.volume.extract(bar)?;
                price_volume += price * v;
                volume += v;

                if volume == 0.0 {
                    None
                } else {
                    Some(price_volume / volume)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn make_bar(date: NaiveDateTime, price: f64, volume: f64) -> OhlcvBar {
        OhlcvBar::new(date, price, price, price, price, volume)
    }

    fn outputs(bars: &[OhlcvBar], vwap: &Vwap) -> Vec<Option<f64>> {
        vwap.compute(bars).unwrap().outputs().copied().collect()
    }

    #[test]
    fn vwap_cumulative() {
        let bars = vec![
            make_bar(at(1, 9), 10.0, 100.0),
            make_bar(at(1, 10), 20.0, 300.0),
            make_bar(at(2, 9), 30.0, 100.0),
        ];
        let values = outputs(&bars, &Vwap::default());

        assert_eq!(values[0], Some(10.0));
        assert_eq!(values[1], Some(17.5));
        assert_eq!(values[2], Some(20.0));
    }

    #[test]
    fn vwap_uses_typical_price() {
        let bar = OhlcvBar::new(at(1, 9), 1.0, 12.0, 6.0, 9.0, 10.0);
        assert_eq!(outputs(&[bar.clone()], &Vwap::default()), vec![Some(9.0)]);
        assert_eq!(
            outputs(&[bar], &Vwap::default().with_source(Field::Open)),
            vec![Some(1.0)]
        );
    }

    #[test]
    fn vwap_named_volume_field() {
        let bars = vec![
            OhlcvBar::empty(at(1, 9)).with_field("price", 10.0).with_field("size", 1.0),
            OhlcvBar::empty(at(1, 10)).with_field("price", 40.0).with_field("size", 2.0),
        ];
        let vwap = Vwap::default()
            .with_source(Field::Named("price".into()))
            .with_volume(Field::Named("size".into()));
        assert_eq!(outputs(&bars, &vwap), vec![Some(10.0), Some(30.0)]);
        assert_eq!(vwap.indicator_type().to_string(), "VWAP@price/size");
    }

    #[test]
    fn vwap_daily_reset() {
        let bars = vec![
            make_bar(at(1, 9), 10.0, 100.0),
            make_bar(at(1, 10), 20.0, 100.0),
            make_bar(at(2, 9), 40.0, 100.0),
            make_bar(at(2, 10), 50.0, 300.0),
        ];
        let values = outputs(&bars, &Vwap::daily());

        assert_eq!(values[1], Some(15.0));
        assert_eq!(values[2], Some(40.0));
        assert_eq!(values[3], Some(47.5));
    }

    #[test]
    fn vwap_anchored() {
        let bars = vec![
            make_bar(at(1, 9), 10.0, 100.0),
            make_bar(at(1, 10), 20.0, 100.0),
            make_bar(at(1, 11), 30.0, 100.0),
        ];
        let values = outputs(&bars, &Vwap::anchored(at(1, 10)));
        assert_eq!(values, vec![None, Some(20.0), Some(25.0)]);
    }

    #[test]
    fn vwap_skips_bars_without_volume() {
        let mut bars = vec![
            make_bar(at(1, 9), 10.0, 100.0),
            make_bar(at(1, 10), 99.0, 100.0),
            make_bar(at(1, 11), 30.0, 100.0),
        ];
        bars[1].volume = None;
        let values = outputs(&bars, &Vwap::default());
        assert_eq!(values, vec![Some(10.0), None, Some(20.0)]);
    }

    #[test]
    fn vwap_zero_volume_is_undefined() {
        let bars = vec![
            make_bar(at(1, 9), 10.0, 0.0),
            make_bar(at(1, 10), 20.0, 50.0),
        ];
        assert_eq!(outputs(&bars, &Vwap::default()), vec![None, Some(20.0)]);
    }

    #[test]
    fn vwap_indicator_type() {
        assert_eq!(Vwap::default().indicator_type().to_string(), "VWAP");
        assert_eq!(Vwap::daily().indicator_type().to_string(), "VWAP_DAILY");
        assert_eq!(
            Vwap::anchored(at(1, 10)).indicator_type().to_string(),
            "VWAP_ANCHORED(2024-01-01 10:00:00)"
        );
    }
}
