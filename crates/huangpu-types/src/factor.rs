//! Price-adjustment factor types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative price-adjustment factors for one instrument and date.
///
/// Both factors are strictly positive. For an instrument with no corporate
/// actions in range, both are `1.0` on every date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorPoint {
    /// Instrument identifier.
    pub symbol: String,
    /// Trading date of this point.
    pub trade_date: NaiveDate,
    /// Forward-looking (price-as-of-today) cumulative multiplier.
    pub forward_factor: f64,
    /// Backward-looking (price-as-of-listing) cumulative multiplier.
    pub back_factor: f64,
}

impl FactorPoint {
    /// Creates a new factor point.
    #[must_use]
    pub const fn new(
        symbol: String,
        trade_date: NaiveDate,
        forward_factor: f64,
        back_factor: f64,
    ) -> Self {
        Self {
            symbol,
            trade_date,
            forward_factor,
            back_factor,
        }
    }

    /// Creates a neutral point (both factors `1.0`).
    #[must_use]
    pub const fn neutral(symbol: String, trade_date: NaiveDate) -> Self {
        Self::new(symbol, trade_date, 1.0, 1.0)
    }
}

/// A sparse corporate-action ratio event, one per ex-date.
///
/// The ratios are single-day adjustment multipliers, not cumulative; the
/// factor synthesizer turns a sequence of these into dense [`FactorPoint`]
/// series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateAction {
    /// Instrument identifier.
    pub symbol: String,
    /// Ex-date of the corporate action.
    pub event_date: NaiveDate,
    /// Single-day forward adjustment ratio (reciprocal is applied).
    pub fore_ratio: f64,
    /// Single-day backward adjustment ratio (applied as-is).
    pub back_ratio: f64,
}

impl CorporateAction {
    /// Creates a new corporate-action event.
    #[must_use]
    pub const fn new(
        symbol: String,
        event_date: NaiveDate,
        fore_ratio: f64,
        back_ratio: f64,
    ) -> Self {
        Self {
            symbol,
            event_date,
            fore_ratio,
            back_ratio,
        }
    }
}
