//! ADX (Average Directional Index) with the directional indicators.
//!
//! +DM = H - H[i-1] when that beats L[i-1] - L and is positive, else 0.
//! -DM = L[i-1] - L when that beats H - H[i-1] and is positive, else 0.
//! +DM, -DM and TR are Wilder-smoothed; +DI/-DI = 100 * sm(DM) / sm(TR).
//! DX = 100 * |+DI - -DI| / (+DI + -DI), ADX = Wilder(DX).
//!
//! Warmup: DI from index n, ADX from index 2n-1.

use crate::domain::error::IndicatorError;
use crate::domain::indicator::{true_range, Ema, Indicator, IndicatorType, OutputFields};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdxValue {
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
}

impl OutputFields for AdxValue {
    fn field_names() -> &'static [&'static str] {
        &["adx", "plus_di", "minus_di"]
    }

    fn field_values(&self) -> Vec<Option<f64>> {
        vec![self.adx, self.plus_di, self.minus_di]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Adx {
    smoothing: Ema,
}

impl Default for Adx {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        100.0 * numerator / denominator
    }
}

impl Adx {
    /// DM, TR and DX are all Wilder-smoothed over `period`.
    pub fn new(period: usize) -> Self {
        Self {
            smoothing: Ema::wilder(period),
        }
    }

    pub fn period(&self) -> usize {
        self.smoothing.period()
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.smoothing = self.smoothing.with_period(period);
        self
    }
}

/// Raw upward and downward extension of `bar` past `prev`.
fn moves<B: Bar>(prev: &B, bar: &B) -> Option<(f64, f64)> {
    Some((bar.high()? - prev.high()?, prev.low()? - bar.low()?))
}

/// Directional movement per bar; the first bar has none.
fn directional_movement<B: Bar>(bars: &[B]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                return (None, None);
            }
            match moves(&bars[i - 1], bar) {
                Some((up, down)) => {
                    let plus = if up > down && up > 0.0 { up } else { 0.0 };
                    let minus = if down > up && down > 0.0 { down } else { 0.0 };
                    (Some(plus), Some(minus))
                }
                None => (None, None),
            }
        })
        .unzip()
}

impl Indicator for Adx {
    type Output = AdxValue;

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Adx {
            period: self.period(),
        }
    }

    fn validate(&self) -> Result<(), IndicatorError> {
        IndicatorError::check_period("ADX", "period", self.period())
    }

    fn evaluate<B: Bar>(&self, bars: &[B]) -> Vec<AdxValue> {
        let (plus_dm, minus_dm) = directional_movement(bars);
        let mut tr = true_range(bars);
        if let Some(first) = tr.first_mut() {
            *first = None;
        }

        let smoothed_tr = self.smoothing.apply(&tr);
        let plus_di: Vec<Option<f64>> = self
            .smoothing
            .apply(&plus_dm)
            .into_iter()
            .zip(&smoothed_tr)
            .map(|(dm, tr)| Some(ratio(dm?, (*tr)?)))
            .collect();
        let minus_di: Vec<Option<f64>> = self
            .smoothing
            .apply(&minus_dm)
            .into_iter()
            .zip(&smoothed_tr)
            .map(|(dm, tr)| Some(ratio(dm?, (*tr)?)))
            .collect();

        let dx: Vec<Option<f64>> = plus_di
            .iter()
            .zip(&minus_di)
            .map(|(p, m)| {
                let (p, m) = ((*p)?, (*m)?);
                Some(ratio((p - m).abs(), p + m))
            })
            .collect();

        self.smoothing
            .apply(&dx)
            .into_iter()
            .zip(plus_di.into_iter().zip(minus_di))
            .map(|(adx, (plus_di, minus_di))| AdxValue {
                adx,
                plus_di,
                minus_di,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;

    fn make_bar(i: usize, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar::daily(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
            close,
            high,
            low,
            close,
            1000.0,
        )
    }

    fn uptrend(n: usize) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                make_bar(i, base + 1.0, base - 1.0, base)
            })
            .collect()
    }

    fn outputs(bars: &[OhlcvBar], adx: &Adx) -> Vec<AdxValue> {
        adx.compute(bars).unwrap().outputs().copied().collect()
    }

    #[test]
    fn adx_warmup() {
        let values = outputs(&uptrend(12), &Adx::new(3));

        for (i, value) in values.iter().enumerate() {
            assert_eq!(value.plus_di.is_some(), i >= 3, "+DI at {}", i);
            assert_eq!(value.minus_di.is_some(), i >= 3, "-DI at {}", i);
            assert_eq!(value.adx.is_some(), i >= 5, "ADX at {}", i);
        }
    }

    #[test]
    fn adx_pure_uptrend() {
        let values = outputs(&uptrend(12), &Adx::new(3));
        let last = values[11];

        // +DM = 2 each bar, TR = 3 each bar, no -DM
        assert!((last.plus_di.unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(last.minus_di, Some(0.0));
        assert!((last.adx.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn adx_flat_market_is_zero() {
        let bars: Vec<OhlcvBar> = (0..8).map(|i| make_bar(i, 100.0, 100.0, 100.0)).collect();
        let values = outputs(&bars, &Adx::new(2));

        for value in &values[3..] {
            assert_eq!(value.plus_di, Some(0.0));
            assert_eq!(value.minus_di, Some(0.0));
            assert_eq!(value.adx, Some(0.0));
        }
    }

    #[test]
    fn adx_bounded() {
        let bars: Vec<OhlcvBar> = (0..30)
            .map(|i| {
                let base = 100.0 + ((i * 7) % 11) as f64 - 5.0;
                make_bar(i, base + 2.0, base - 1.5, base)
            })
            .collect();

        for value in outputs(&bars, &Adx::default().with_period(5)) {
            for v in [value.adx, value.plus_di, value.minus_di].into_iter().flatten() {
                assert!((0.0..=100.0).contains(&v), "{} out of range", v);
            }
        }
    }

    #[test]
    fn directional_movement_inside_bar_is_zero() {
        let bars = vec![make_bar(0, 110.0, 90.0, 100.0), make_bar(1, 105.0, 95.0, 100.0)];
        let (plus, minus) = directional_movement(&bars);
        assert_eq!(plus, vec![None, Some(0.0)]);
        assert_eq!(minus, vec![None, Some(0.0)]);
    }

    #[test]
    fn adx_indicator_type_and_validation() {
        assert_eq!(Adx::default().indicator_type().to_string(), "ADX(14)");
        let bars = uptrend(3);
        assert_eq!(
            Adx::new(0).compute(&bars).unwrap_err(),
            IndicatorError::invalid_period("ADX", "period", 0)
        );
    }
}
