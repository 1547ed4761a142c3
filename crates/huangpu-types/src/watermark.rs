//! Audit watermark representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Provider;

/// Last fully-checked trading date for a (symbol, provider) pair.
///
/// Watermarks are monotonically non-decreasing and only advance after a
/// scan for that instrument completes and its issues are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    /// Instrument identifier.
    pub symbol: String,
    /// Provider the scan covered.
    pub provider: Provider,
    /// Last trading date fully examined.
    pub last_checked: NaiveDate,
}

impl Watermark {
    /// Creates a new watermark.
    #[must_use]
    pub const fn new(symbol: String, provider: Provider, last_checked: NaiveDate) -> Self {
        Self {
            symbol,
            provider,
            last_checked,
        }
    }

    /// Advances the watermark, never moving it backwards.
    pub fn advance_to(&mut self, date: NaiveDate) {
        if date > self.last_checked {
            self.last_checked = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let d1 = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
        let mut mark = Watermark::new("600519".to_string(), Provider::Eastmoney, d2);

        mark.advance_to(d1);
        assert_eq!(mark.last_checked, d2);

        let d3 = NaiveDate::from_ymd_opt(2023, 7, 3).unwrap();
        mark.advance_to(d3);
        assert_eq!(mark.last_checked, d3);
    }
}
