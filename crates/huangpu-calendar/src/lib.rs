//! Trading-calendar provider for the huangpu audit toolkit.
//!
//! A [`TradingCalendar`] is the immutable, ordered set of valid trading
//! dates for the market. It is fetched at most once per worker lifetime
//! through a [`CalendarSource`] and passed explicitly into every task that
//! needs it; there is no process-wide lazily-mutated cache.
//!
//! Calendar unavailability is a degraded mode, not a failure: an empty
//! calendar disables continuity and gap checks while leaving price-anomaly
//! checks untouched.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use huangpu_types::Result;
use tracing::warn;

/// Source of the market-wide trading-day list.
///
/// Implementations wrap a provider endpoint (or a local file) and return
/// every known trading date. Returning an error marks the calendar as
/// unavailable for the worker's lifetime.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Fetches all known trading dates, in any order.
    ///
    /// # Errors
    ///
    /// Returns an error only on genuine transport failure.
    async fn trading_days(&self) -> Result<Vec<NaiveDate>>;
}

/// Immutable ordered set of valid trading dates.
#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl TradingCalendar {
    /// Builds a calendar from a list of dates.
    #[must_use]
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Builds an empty calendar (degraded mode).
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            dates: BTreeSet::new(),
        }
    }

    /// Loads the calendar from a source, degrading to empty on failure.
    ///
    /// This is the once-per-worker fetch: callers construct the calendar at
    /// worker startup and keep it for the worker's lifetime.
    pub async fn load<S: CalendarSource>(source: &S) -> Self {
        match source.trading_days().await {
            Ok(dates) => Self::from_dates(dates),
            Err(e) => {
                warn!(error = %e, "calendar fetch failed, continuity checks disabled");
                Self::unavailable()
            }
        }
    }

    /// Returns true if the calendar could not be fetched.
    ///
    /// Callers must treat calendar-dependent checks as skippable when this
    /// holds, not as failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Returns the number of known trading dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if the given date is a trading day.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Returns all trading dates in the closed range `[start, end]`.
    #[must_use]
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.dates.range(start..=end).copied().collect()
    }

    /// Returns trading dates in `[start, end]` absent from `actual`.
    #[must_use]
    pub fn missing_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        actual: &BTreeSet<NaiveDate>,
    ) -> Vec<NaiveDate> {
        self.dates
            .range(start..=end)
            .filter(|d| !actual.contains(d))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huangpu_types::HuangpuError;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    struct FixedSource(Vec<NaiveDate>);

    #[async_trait]
    impl CalendarSource for FixedSource {
        async fn trading_days(&self) -> Result<Vec<NaiveDate>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CalendarSource for FailingSource {
        async fn trading_days(&self) -> Result<Vec<NaiveDate>> {
            Err(HuangpuError::Calendar("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let source = FixedSource(vec![d(2023, 1, 3), d(2023, 1, 2), d(2023, 1, 4)]);
        let calendar = TradingCalendar::load(&source).await;
        assert_eq!(calendar.len(), 3);
        assert!(calendar.contains(d(2023, 1, 3)));
    }

    #[tokio::test]
    async fn test_load_degrades_to_empty_on_failure() {
        let calendar = TradingCalendar::load(&FailingSource).await;
        assert!(calendar.is_empty());
    }

    #[test]
    fn test_between_is_ordered_and_inclusive() {
        let calendar =
            TradingCalendar::from_dates([d(2023, 1, 4), d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 6)]);
        assert_eq!(
            calendar.between(d(2023, 1, 2), d(2023, 1, 4)),
            vec![d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4)]
        );
    }

    #[test]
    fn test_missing_between() {
        let calendar = TradingCalendar::from_dates([d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4)]);
        let actual: BTreeSet<_> = [d(2023, 1, 2), d(2023, 1, 4)].into_iter().collect();
        assert_eq!(
            calendar.missing_between(d(2023, 1, 2), d(2023, 1, 4), &actual),
            vec![d(2023, 1, 3)]
        );
    }
}
