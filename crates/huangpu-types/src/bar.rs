//! Daily bar representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day's unadjusted OHLCV record for a single instrument.
///
/// Bars are keyed by `(symbol, trade_date)` per provider and are produced
/// by the ingestion path; the audit core only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument identifier (e.g. "600519").
    pub symbol: String,
    /// Trading date of this bar.
    pub trade_date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest traded price.
    pub high: f64,
    /// Lowest traded price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume in shares.
    pub volume: u64,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        symbol: String,
        trade_date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol,
            trade_date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLC field is non-positive or low exceeds high.
    ///
    /// This is the price-sanity predicate used by the rule engine; a bar
    /// failing it is reported as a price anomaly.
    #[must_use]
    pub fn is_price_anomalous(&self) -> bool {
        self.open <= 0.0
            || self.high <= 0.0
            || self.low <= 0.0
            || self.close <= 0.0
            || self.low > self.high
    }

    /// Returns the signed fractional close-to-close change from `prev`.
    ///
    /// Returns `None` when the previous close is zero (the change is
    /// undefined, not infinite).
    #[must_use]
    pub fn close_change_from(&self, prev: &Self) -> Option<f64> {
        if prev.close == 0.0 {
            return None;
        }
        Some(self.close / prev.close - 1.0)
    }
}
