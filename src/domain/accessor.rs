//! Field accessors over [`Bar`] records.
//!
//! Indicators never read bar fields directly; they go through an [`Accessor`]
//! so the same computation runs over close prices, volume or any named
//! series. A missing field is `None`, and each indicator documents what it
//! does with it.

use crate::domain::ohlcv::Bar;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Pure mapping from a bar to one numeric value.
pub trait Accessor {
    fn extract<B: Bar + ?Sized>(&self, bar: &B) -> Option<f64>;

    /// Extracts the field from every bar, preserving alignment.
    fn series<B: Bar>(&self, bars: &[B]) -> Vec<Option<f64>> {
        bars.iter().map(|bar| self.extract(bar)).collect()
    }
}

/// The field an indicator reads from each bar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Field {
    Open,
    High,
    Low,
    #[default]
    Close,
    Volume,
    /// `(high + low) / 2`
    Median,
    /// `(high + low + close) / 3`
    Typical,
    /// `(open + high + low + close) / 4`
    Average,
    /// A generic named field, see [`Bar::field`].
    Named(String),
}

impl Accessor for Field {
    fn extract<B: Bar + ?Sized>(&self, bar: &B) -> Option<f64> {
        match self {
            Field::Open => bar.open(),
            Field::High => bar.high(),
            Field::Low => bar.low(),
            Field::Close => bar.close(),
            Field::Volume => bar.volume(),
            Field::Median => Some((bar.high()? + bar.low()?) / 2.0),
            Field::Typical => Some((bar.high()? + bar.low()? + bar.close()?) / 3.0),
            Field::Average => {
                Some((bar.open()? + bar.high()? + bar.low()? + bar.close()?) / 4.0)
            }
            Field::Named(name) => bar.field(name),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Open => write!(f, "open"),
            Field::High => write!(f, "high"),
            Field::Low => write!(f, "low"),
            Field::Close => write!(f, "close"),
            Field::Volume => write!(f, "volume"),
            Field::Median => write!(f, "median"),
            Field::Typical => write!(f, "typical"),
            Field::Average => write!(f, "average"),
            Field::Named(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for Field {
    type Err = Infallible;

    /// Known names are case-insensitive; anything else is a named field.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "open" | "o" => Field::Open,
            "high" | "h" => Field::High,
            "low" | "l" => Field::Low,
            "close" | "c" => Field::Close,
            "volume" | "v" => Field::Volume,
            "median" | "hl2" => Field::Median,
            "typical" | "hlc3" => Field::Typical,
            "average" | "avgprice" | "ohlc4" => Field::Average,
            _ => Field::Named(s.to_string()),
        })
    }
}
