//! Single-source rule engine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use huangpu_calendar::TradingCalendar;
use huangpu_types::{Bar, IssueDraft, IssueKind, Severity};

/// Absolute close-to-close change above which a bar is a price jump.
pub const VOLATILITY_THRESHOLD: f64 = 0.30;

/// Inputs for one single-source scan of one instrument.
#[derive(Debug)]
pub struct ScanInput<'a> {
    /// Bar series ascending by date. When scanning incrementally this may
    /// include one seed bar strictly before `check_from`; the seed only
    /// feeds the first percentage-change computation and is never reported.
    pub bars: &'a [Bar],
    /// Dates carrying a corporate-action/factor event for this instrument.
    pub factor_event_dates: &'a BTreeSet<NaiveDate>,
    /// Known suspension dates for this instrument.
    pub suspensions: &'a BTreeSet<NaiveDate>,
    /// Inclusive reporting floor; findings below it are suppressed even
    /// when computed. `None` reports the whole series.
    pub check_from: Option<NaiveDate>,
    /// Market trading calendar; empty disables continuity checks only.
    pub calendar: &'a TradingCalendar,
}

impl ScanInput<'_> {
    fn in_window(&self, date: NaiveDate) -> bool {
        self.check_from.is_none_or(|floor| date >= floor)
    }
}

/// Scans one instrument's bar series and returns its issue drafts.
///
/// Evaluates three rules: price sanity and volatility spikes per bar, and
/// calendar continuity over the whole series. The engine is stateless;
/// symbol, check type, and run identity are stamped by the caller.
#[must_use]
pub fn scan_bars(input: &ScanInput<'_>) -> Vec<IssueDraft> {
    let mut drafts = Vec::new();
    if input.bars.is_empty() {
        return drafts;
    }

    let mut prev: Option<&Bar> = None;
    for bar in input.bars {
        let change = prev.and_then(|p| bar.close_change_from(p));
        prev = Some(bar);

        if !input.in_window(bar.trade_date) {
            continue;
        }

        if bar.is_price_anomalous() {
            drafts.push(IssueDraft::new(
                bar.trade_date,
                IssueKind::PriceAnomaly,
                Severity::Error,
                format!(
                    "O={}, H={}, L={}, C={}",
                    bar.open, bar.high, bar.low, bar.close
                ),
            ));
        }

        if let Some(change) = change {
            if change.abs() > VOLATILITY_THRESHOLD {
                let pct = format!("{:+.2}%", change * 100.0);
                if input.factor_event_dates.contains(&bar.trade_date) {
                    drafts.push(IssueDraft::new(
                        bar.trade_date,
                        IssueKind::PriceJump,
                        Severity::Warning,
                        format!("change: {pct}, adjustment event on this day"),
                    ));
                } else {
                    drafts.push(IssueDraft::new(
                        bar.trade_date,
                        IssueKind::PriceJump,
                        Severity::Error,
                        format!("change: {pct}"),
                    ));
                }
            }
        }
    }

    drafts.extend(continuity_drafts(input));
    drafts
}

/// Whole-series calendar-continuity check.
///
/// Skipped entirely when the calendar is unavailable; a missing calendar
/// must not abort the per-bar checks.
fn continuity_drafts(input: &ScanInput<'_>) -> Vec<IssueDraft> {
    if input.calendar.is_empty() {
        return Vec::new();
    }

    let first = input.bars[0].trade_date;
    let last = input.bars[input.bars.len() - 1].trade_date;
    let actual: BTreeSet<NaiveDate> = input.bars.iter().map(|b| b.trade_date).collect();

    input
        .calendar
        .missing_between(first, last, &actual)
        .into_iter()
        .filter(|date| input.in_window(*date))
        .map(|date| {
            if input.suspensions.contains(&date) {
                IssueDraft::new(
                    date,
                    IssueKind::MissingDay,
                    Severity::Warning,
                    "suspension day, gap is expected".to_string(),
                )
            } else {
                IssueDraft::new(
                    date,
                    IssueKind::MissingDay,
                    Severity::Error,
                    "no bar for this trading day".to_string(),
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bar(date: NaiveDate, close: f64) -> Bar {
        Bar::new("600519".to_string(), date, close, close, close, close, 1_000)
    }

    fn scan(
        bars: &[Bar],
        factor_dates: &[NaiveDate],
        suspensions: &[NaiveDate],
        check_from: Option<NaiveDate>,
        calendar: &TradingCalendar,
    ) -> Vec<IssueDraft> {
        let factor_event_dates: BTreeSet<_> = factor_dates.iter().copied().collect();
        let suspensions: BTreeSet<_> = suspensions.iter().copied().collect();
        scan_bars(&ScanInput {
            bars,
            factor_event_dates: &factor_event_dates,
            suspensions: &suspensions,
            check_from,
            calendar,
        })
    }

    #[test]
    fn test_price_anomaly_single_error() {
        let mut bad = bar(d(2023, 1, 3), 10.0);
        bad.low = 12.0; // low > high
        let bars = vec![bar(d(2023, 1, 2), 10.0), bad, bar(d(2023, 1, 4), 10.0)];
        let calendar = TradingCalendar::unavailable();

        let drafts = scan(&bars, &[], &[], None, &calendar);
        let anomalies: Vec<_> = drafts
            .iter()
            .filter(|i| i.kind == IssueKind::PriceAnomaly)
            .collect();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].trade_date, d(2023, 1, 3));
        assert_eq!(anomalies[0].severity, Severity::Error);
        assert!(anomalies[0].details.contains("L=12"));
    }

    #[test]
    fn test_price_jump_error_without_event() {
        let bars = vec![
            bar(d(2023, 1, 2), 10.0),
            bar(d(2023, 1, 3), 10.0),
            bar(d(2023, 1, 4), 14.0),
        ];
        let calendar = TradingCalendar::unavailable();

        let drafts = scan(&bars, &[], &[], None, &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, IssueKind::PriceJump);
        assert_eq!(drafts[0].severity, Severity::Error);
        assert_eq!(drafts[0].trade_date, d(2023, 1, 4));
        assert!(drafts[0].details.contains("+40.00%"));
    }

    #[test]
    fn test_price_jump_warning_with_event() {
        let bars = vec![bar(d(2023, 1, 3), 10.0), bar(d(2023, 1, 4), 14.0)];
        let calendar = TradingCalendar::unavailable();

        let drafts = scan(&bars, &[d(2023, 1, 4)], &[], None, &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].severity, Severity::Warning);
        assert!(drafts[0].details.contains("adjustment event"));
    }

    #[test]
    fn test_first_bar_is_never_a_jump() {
        let bars = vec![bar(d(2023, 1, 3), 1000.0)];
        let calendar = TradingCalendar::unavailable();
        assert!(scan(&bars, &[], &[], None, &calendar).is_empty());
    }

    #[test]
    fn test_seed_bar_feeds_change_but_is_not_reported() {
        // Seed bar is itself anomalous and precedes the floor: it must seed
        // the jump computation for Jan 4 without being reported.
        let mut seed = bar(d(2023, 1, 3), 10.0);
        seed.open = -1.0;
        let bars = vec![seed, bar(d(2023, 1, 4), 14.0)];
        let calendar = TradingCalendar::unavailable();

        let drafts = scan(&bars, &[], &[], Some(d(2023, 1, 4)), &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, IssueKind::PriceJump);
        assert_eq!(drafts[0].trade_date, d(2023, 1, 4));
    }

    #[test]
    fn test_calendar_gap_error() {
        let calendar =
            TradingCalendar::from_dates([d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4)]);
        let bars = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 4), 10.0)];

        let drafts = scan(&bars, &[], &[], None, &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, IssueKind::MissingDay);
        assert_eq!(drafts[0].severity, Severity::Error);
        assert_eq!(drafts[0].trade_date, d(2023, 1, 3));
    }

    #[test]
    fn test_calendar_gap_on_suspension_day_is_warning() {
        let calendar =
            TradingCalendar::from_dates([d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4)]);
        let bars = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 4), 10.0)];

        let drafts = scan(&bars, &[], &[d(2023, 1, 3)], None, &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_empty_calendar_skips_continuity_only() {
        let bars = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 6), 14.0)];
        let calendar = TradingCalendar::unavailable();

        let drafts = scan(&bars, &[], &[], None, &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, IssueKind::PriceJump);
    }

    #[test]
    fn test_floor_suppresses_old_findings() {
        let calendar =
            TradingCalendar::from_dates([d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4)]);
        let mut old_bad = bar(d(2023, 1, 2), 10.0);
        old_bad.close = -5.0;
        let bars = vec![old_bad, bar(d(2023, 1, 4), 10.0)];

        let drafts = scan(&bars, &[], &[], Some(d(2023, 1, 4)), &calendar);
        // Jan 2 anomaly and Jan 3 gap both fall below the floor; the jump
        // from a negative close is undefined territory but still in-window.
        assert!(drafts.iter().all(|i| i.trade_date >= d(2023, 1, 4)));
    }
}
