//! Rolling window extremes shared by the range-based indicators
//! (Aroon, Stochastic, Williams %R, Ichimoku).
//!
//! Windows are fail-closed like SMA: any absent value in the window makes
//! the output for that index absent.

fn rolling<F>(values: &[Option<f64>], period: usize, pick: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    (0..values.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            values[i + 1 - period..=i]
                .iter()
                .try_fold(None, |acc: Option<f64>, v| {
                    let v = (*v)?;
                    Some(Some(acc.map_or(v, |a| pick(a, v))))
                })
                .flatten()
        })
        .collect()
}

/// Highest value over the trailing `period` values.
pub fn highest(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, f64::max)
}

/// Lowest value over the trailing `period` values.
pub fn lowest(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    rolling(values, period, f64::min)
}

/// Number of bars since the extreme of the trailing `period` values, where
/// `prefer(candidate, best)` says whether a value replaces the current best.
/// Ties resolve to the most recent bar.
fn periods_since<F>(values: &[Option<f64>], period: usize, prefer: F) -> Vec<Option<usize>>
where
    F: Fn(f64, f64) -> bool,
{
    (0..values.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let start = i + 1 - period;
            let mut best: Option<(usize, f64)> = None;
            for (j, v) in values[start..=i].iter().enumerate() {
                let v = (*v)?;
                match best {
                    Some((_, b)) if !prefer(v, b) => {}
                    _ => best = Some((j, v)),
                }
            }
            best.map(|(j, _)| period - 1 - j)
        })
        .collect()
}

pub fn periods_since_highest(values: &[Option<f64>], period: usize) -> Vec<Option<usize>> {
    periods_since(values, period, |candidate, best| candidate >= best)
}

pub fn periods_since_lowest(values: &[Option<f64>], period: usize) -> Vec<Option<usize>> {
    periods_since(values, period, |candidate, best| candidate <= best)
}

/// `(highest + lowest) / 2` over the trailing `period` values.
pub fn midpoint(highs: &[Option<f64>], lows: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    highest(highs, period)
        .into_iter()
        .zip(lowest(lows, period))
        .map(|(h, l)| Some((h? + l?) / 2.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn highest_and_lowest() {
        let values = some(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        assert_eq!(
            highest(&values, 3),
            vec![None, None, Some(4.0), Some(4.0), Some(5.0)]
        );
        assert_eq!(
            lowest(&values, 3),
            vec![None, None, Some(1.0), Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn absent_value_poisons_window() {
        let values = vec![Some(1.0), None, Some(3.0), Some(2.0)];
        assert_eq!(highest(&values, 2), vec![None, None, None, Some(3.0)]);
    }

    #[test]
    fn zero_period_is_all_absent() {
        assert_eq!(highest(&some(&[1.0, 2.0]), 0), vec![None, None]);
        assert_eq!(periods_since_lowest(&some(&[1.0]), 0), vec![None]);
    }

    #[test]
    fn periods_since_prefers_most_recent_tie() {
        let values = some(&[5.0, 2.0, 5.0, 1.0]);
        // window [5, 2, 5, 1]: latest high at index 2 -> 1 bar ago
        assert_eq!(periods_since_highest(&values, 4), vec![None, None, None, Some(1)]);
        assert_eq!(periods_since_lowest(&values, 4), vec![None, None, None, Some(0)]);
    }

    #[test]
    fn midpoint_of_range() {
        let highs = some(&[10.0, 12.0, 11.0]);
        let lows = some(&[8.0, 9.0, 7.0]);
        assert_eq!(midpoint(&highs, &lows, 2), vec![None, Some(10.0), Some(9.5)]);
    }
}
