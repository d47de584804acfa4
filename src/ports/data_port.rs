//! Bar data access port trait.

use crate::domain::error::TechindError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars of `source` dated within `[start, end]` (inclusive, either bound
    /// optional), sorted by date.
    fn fetch_bars(
        &self,
        source: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, TechindError>;

    /// Names accepted by `fetch_bars`.
    fn list_sources(&self) -> Result<Vec<String>, TechindError>;
}
