//! Suspension expansion: halt announcements to per-day suspension sets.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use huangpu_calendar::TradingCalendar;
use serde::{Deserialize, Serialize};

/// One halt announcement for an instrument.
///
/// `resumption` is the first day trading resumes; a missing resumption
/// means the halt covered `start` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaltAnnouncement {
    /// Instrument identifier.
    pub symbol: String,
    /// First halted day.
    pub start: NaiveDate,
    /// First day trading resumes, if announced.
    pub resumption: Option<NaiveDate>,
}

impl HaltAnnouncement {
    /// Last halted day: the day before resumption, or `start` itself.
    #[must_use]
    pub fn last_halted_day(&self) -> NaiveDate {
        match self.resumption {
            Some(resumption) => resumption
                .checked_sub_days(Days::new(1))
                .unwrap_or(self.start),
            None => self.start,
        }
    }
}

/// Expands halt announcements into per-symbol suspension trading days.
///
/// Each announcement contributes the calendar trading days in its halted
/// window, clamped to `horizon` so an open-ended halt does not run past the
/// audit window. Days are deduplicated and ordered per symbol.
#[must_use]
pub fn expand_suspensions(
    calendar: &TradingCalendar,
    announcements: &[HaltAnnouncement],
    horizon: NaiveDate,
) -> HashMap<String, Vec<NaiveDate>> {
    let mut expanded: HashMap<String, Vec<NaiveDate>> = HashMap::new();
    for announcement in announcements {
        let end = announcement.last_halted_day().min(horizon);
        if end < announcement.start {
            continue;
        }
        expanded
            .entry(announcement.symbol.clone())
            .or_default()
            .extend(calendar.between(announcement.start, end));
    }
    for days in expanded.values_mut() {
        days.sort_unstable();
        days.dedup();
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn week_calendar() -> TradingCalendar {
        // Mon 2023-01-02 through Fri 2023-01-06, skipping nothing.
        TradingCalendar::from_dates((2..=6).map(|day| d(2023, 1, day)))
    }

    #[test]
    fn test_halt_with_resumption_excludes_resumption_day() {
        let halts = vec![HaltAnnouncement {
            symbol: "600519".to_string(),
            start: d(2023, 1, 3),
            resumption: Some(d(2023, 1, 5)),
        }];
        let expanded = expand_suspensions(&week_calendar(), &halts, d(2023, 1, 31));
        assert_eq!(expanded["600519"], vec![d(2023, 1, 3), d(2023, 1, 4)]);
    }

    #[test]
    fn test_open_ended_halt_is_single_day() {
        let halts = vec![HaltAnnouncement {
            symbol: "600519".to_string(),
            start: d(2023, 1, 4),
            resumption: None,
        }];
        let expanded = expand_suspensions(&week_calendar(), &halts, d(2023, 1, 31));
        assert_eq!(expanded["600519"], vec![d(2023, 1, 4)]);
    }

    #[test]
    fn test_halt_clamped_to_horizon() {
        let halts = vec![HaltAnnouncement {
            symbol: "600519".to_string(),
            start: d(2023, 1, 3),
            resumption: Some(d(2023, 2, 1)),
        }];
        let expanded = expand_suspensions(&week_calendar(), &halts, d(2023, 1, 4));
        assert_eq!(expanded["600519"], vec![d(2023, 1, 3), d(2023, 1, 4)]);
    }

    #[test]
    fn test_overlapping_halts_deduplicate() {
        let halts = vec![
            HaltAnnouncement {
                symbol: "600519".to_string(),
                start: d(2023, 1, 3),
                resumption: Some(d(2023, 1, 5)),
            },
            HaltAnnouncement {
                symbol: "600519".to_string(),
                start: d(2023, 1, 4),
                resumption: Some(d(2023, 1, 6)),
            },
        ];
        let expanded = expand_suspensions(&week_calendar(), &halts, d(2023, 1, 31));
        assert_eq!(
            expanded["600519"],
            vec![d(2023, 1, 3), d(2023, 1, 4), d(2023, 1, 5)]
        );
    }

    #[test]
    fn test_non_trading_days_dropped() {
        let halts = vec![HaltAnnouncement {
            symbol: "600519".to_string(),
            start: d(2023, 1, 7),
            resumption: Some(d(2023, 1, 9)),
        }];
        let expanded = expand_suspensions(&week_calendar(), &halts, d(2023, 1, 31));
        assert!(expanded["600519"].is_empty());
    }

    #[test]
    fn test_halt_before_horizon_start_continues() {
        let halts = vec![HaltAnnouncement {
            symbol: "600519".to_string(),
            start: d(2023, 1, 5),
            resumption: None,
        }];
        // Horizon before the halt start drops the announcement entirely.
        let expanded = expand_suspensions(&week_calendar(), &halts, d(2023, 1, 4));
        assert!(expanded.is_empty());
    }
}
