//! Cross-source reconciliation of two providers' bar series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use huangpu_calendar::TradingCalendar;
use huangpu_types::{Bar, IssueDraft, IssueKind, Provider, Severity};

/// Relative close-price difference above which providers disagree.
pub const CLOSE_DIVERGENCE_THRESHOLD: f64 = 0.001;

/// Inputs for one cross-source reconciliation of one instrument.
#[derive(Debug)]
pub struct ReconcileInput<'a> {
    /// Bar series from provider A, ascending by date.
    pub bars_a: &'a [Bar],
    /// Bar series from provider B, ascending by date.
    pub bars_b: &'a [Bar],
    /// Provider that produced `bars_a`.
    pub provider_a: Provider,
    /// Provider that produced `bars_b`.
    pub provider_b: Provider,
    /// Known suspension dates for this instrument.
    pub suspensions: &'a BTreeSet<NaiveDate>,
    /// Market trading calendar; empty disables both-sides-missing checks.
    pub calendar: &'a TradingCalendar,
}

/// Outer-joins both series by date and returns divergence drafts.
///
/// Emits one draft per date: an Error when both providers have the day but
/// their closes diverge, a Warning when exactly one side is missing a day
/// that was not suspended, and a single Critical when a calendar trading
/// day inside the joined span is absent from both sides.
#[must_use]
pub fn reconcile_bars(input: &ReconcileInput<'_>) -> Vec<IssueDraft> {
    let mut joined: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for bar in input.bars_a {
        joined.entry(bar.trade_date).or_default().0 = Some(bar.close);
    }
    for bar in input.bars_b {
        joined.entry(bar.trade_date).or_default().1 = Some(bar.close);
    }

    let (Some((&first, _)), Some((&last, _))) =
        (joined.first_key_value(), joined.last_key_value())
    else {
        return Vec::new();
    };

    let mut drafts = Vec::new();
    for (&date, &(close_a, close_b)) in &joined {
        match (close_a, close_b) {
            (Some(a), Some(b)) => {
                // A zero close on side A leaves the relative difference
                // undefined; treat it as agreement rather than divide.
                let diff = if a == 0.0 { 0.0 } else { (a - b).abs() / a };
                if diff > CLOSE_DIVERGENCE_THRESHOLD {
                    drafts.push(IssueDraft::new(
                        date,
                        IssueKind::PriceMismatch,
                        Severity::Error,
                        format!(
                            "{} close={a}, {} close={b}",
                            input.provider_a, input.provider_b
                        ),
                    ));
                }
            }
            (Some(_), None) => drafts.extend(one_sided(input, date, input.provider_b)),
            (None, Some(_)) => drafts.extend(one_sided(input, date, input.provider_a)),
            // Entries are only created from a bar on one side.
            (None, None) => {}
        }
    }

    // A day can only be missing from both sides if the calendar says it
    // should exist inside the joined span.
    for date in input.calendar.between(first, last) {
        if !joined.contains_key(&date) && !input.suspensions.contains(&date) {
            drafts.push(IssueDraft::new(
                date,
                IssueKind::BothSidesMissing,
                Severity::Critical,
                "no bar from either provider on a trading day".to_string(),
            ));
        }
    }

    drafts.sort_by_key(|draft| draft.trade_date);
    drafts
}

fn one_sided(
    input: &ReconcileInput<'_>,
    date: NaiveDate,
    missing: Provider,
) -> Option<IssueDraft> {
    if input.suspensions.contains(&date) {
        return None;
    }
    Some(IssueDraft::new(
        date,
        IssueKind::OneSidedGap,
        Severity::Warning,
        format!("missing from {missing}"),
    ))
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

    fn reconcile(
        bars_a: &[Bar],
        bars_b: &[Bar],
        suspensions: &[NaiveDate],
        calendar: &TradingCalendar,
    ) -> Vec<IssueDraft> {
        let suspensions: BTreeSet<_> = suspensions.iter().copied().collect();
        reconcile_bars(&ReconcileInput {
            bars_a,
            bars_b,
            provider_a: Provider::Eastmoney,
            provider_b: Provider::Baostock,
            suspensions: &suspensions,
            calendar,
        })
    }

    #[test]
    fn test_divergent_close_is_error() {
        // 0.2% relative difference, well over the 0.1% threshold.
        let a = vec![bar(d(2023, 1, 3), 10.0)];
        let b = vec![bar(d(2023, 1, 3), 10.02)];
        let calendar = TradingCalendar::unavailable();

        let drafts = reconcile(&a, &b, &[], &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, IssueKind::PriceMismatch);
        assert_eq!(drafts[0].severity, Severity::Error);
        assert!(drafts[0].details.contains("eastmoney close=10"));
        assert!(drafts[0].details.contains("baostock close=10.02"));
    }

    #[test]
    fn test_tiny_divergence_is_silent() {
        // 0.05% relative difference stays under the threshold.
        let a = vec![bar(d(2023, 1, 3), 10.0)];
        let b = vec![bar(d(2023, 1, 3), 10.005)];
        let calendar = TradingCalendar::unavailable();
        assert!(reconcile(&a, &b, &[], &calendar).is_empty());
    }

    #[test]
    fn test_zero_close_does_not_divide() {
        let a = vec![bar(d(2023, 1, 3), 0.0)];
        let b = vec![bar(d(2023, 1, 3), 10.0)];
        let calendar = TradingCalendar::unavailable();
        assert!(reconcile(&a, &b, &[], &calendar).is_empty());
    }

    #[test]
    fn test_one_sided_gap_names_missing_provider() {
        let a = vec![bar(d(2023, 1, 3), 10.0), bar(d(2023, 1, 4), 10.0)];
        let b = vec![bar(d(2023, 1, 3), 10.0)];
        let calendar = TradingCalendar::unavailable();

        let drafts = reconcile(&a, &b, &[], &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, IssueKind::OneSidedGap);
        assert_eq!(drafts[0].severity, Severity::Warning);
        assert_eq!(drafts[0].trade_date, d(2023, 1, 4));
        assert!(drafts[0].details.contains("baostock"));
    }

    #[test]
    fn test_one_sided_gap_on_suspension_day_is_silent() {
        let a = vec![bar(d(2023, 1, 3), 10.0), bar(d(2023, 1, 4), 10.0)];
        let b = vec![bar(d(2023, 1, 3), 10.0)];
        let calendar = TradingCalendar::unavailable();
        assert!(reconcile(&a, &b, &[d(2023, 1, 4)], &calendar).is_empty());
    }

    #[test]
    fn test_both_sides_missing_single_critical() {
        let calendar =
            TradingCalendar::from_dates([d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4)]);
        let a = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 4), 10.0)];
        let b = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 4), 10.0)];

        let drafts = reconcile(&a, &b, &[], &calendar);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, IssueKind::BothSidesMissing);
        assert_eq!(drafts[0].severity, Severity::Critical);
        assert_eq!(drafts[0].trade_date, d(2023, 1, 3));
    }

    #[test]
    fn test_both_sides_missing_suspended_is_silent() {
        let calendar =
            TradingCalendar::from_dates([d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4)]);
        let a = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 4), 10.0)];
        let b = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 4), 10.0)];
        assert!(reconcile(&a, &b, &[d(2023, 1, 3)], &calendar).is_empty());
    }

    #[test]
    fn test_empty_inputs_emit_nothing() {
        let calendar = TradingCalendar::from_dates([d(2023, 1, 2)]);
        assert!(reconcile(&[], &[], &[], &calendar).is_empty());
    }

    #[test]
    fn test_drafts_are_date_ordered() {
        let calendar =
            TradingCalendar::from_dates([d(2023, 1, 2), d(2023, 1, 3), d(2023, 1, 4), d(2023, 1, 5)]);
        let a = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 5), 10.2)];
        let b = vec![bar(d(2023, 1, 2), 10.0), bar(d(2023, 1, 4), 10.0), bar(d(2023, 1, 5), 10.0)];

        let drafts = reconcile(&a, &b, &[], &calendar);
        let dates: Vec<_> = drafts.iter().map(|i| i.trade_date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        // Jan 3 missing from both, Jan 4 one-sided, Jan 5 mismatch.
        assert_eq!(drafts.len(), 3);
    }
}
