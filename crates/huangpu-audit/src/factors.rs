//! Dense adjustment-factor synthesis from sparse corporate actions.

use std::collections::HashMap;

use chrono::NaiveDate;
use huangpu_types::{CorporateAction, FactorPoint, HuangpuError, Result};

/// Synthesizes dense cumulative factor series from sparse events.
///
/// `skeleton` is the instrument's own ordered list of trading dates;
/// `events` is the sparse list of corporate actions. Every skeleton date
/// appears exactly once in the output:
///
/// - the forward factor at date `d` is the product of `1 / fore_ratio`
///   over all event dates `>= d` (it grows going into the past);
/// - the backward factor at date `d` is the product of `back_ratio` over
///   all event dates `<= d`.
///
/// With no events both series are identically `1.0`. Events dated outside
/// the skeleton are ignored.
///
/// # Errors
///
/// Returns [`HuangpuError::NonPositiveRatio`] if any event carries a ratio
/// that is zero or negative; a non-positive multiplier is corrupt input,
/// never expected data.
pub fn synthesize_factors(
    symbol: &str,
    skeleton: &[NaiveDate],
    events: &[CorporateAction],
) -> Result<Vec<FactorPoint>> {
    // Most instruments have no actions in an incremental window.
    if events.is_empty() {
        return Ok(skeleton
            .iter()
            .map(|date| FactorPoint::neutral(symbol.to_string(), *date))
            .collect());
    }

    let mut by_date: HashMap<NaiveDate, (f64, f64)> = HashMap::with_capacity(events.len());
    for event in events {
        for ratio in [event.fore_ratio, event.back_ratio] {
            if ratio <= 0.0 {
                return Err(HuangpuError::NonPositiveRatio {
                    symbol: symbol.to_string(),
                    date: event.event_date,
                    ratio,
                });
            }
        }
        by_date.insert(event.event_date, (event.fore_ratio, event.back_ratio));
    }

    // Forward pass runs newest to oldest so the multiplier accumulates
    // into the past.
    let mut forward = vec![1.0; skeleton.len()];
    let mut acc = 1.0;
    for (i, date) in skeleton.iter().enumerate().rev() {
        if let Some((fore, _)) = by_date.get(date) {
            acc *= 1.0 / fore;
        }
        forward[i] = acc;
    }

    let mut points = Vec::with_capacity(skeleton.len());
    let mut acc = 1.0;
    for (i, date) in skeleton.iter().enumerate() {
        if let Some((_, back)) = by_date.get(date) {
            acc *= back;
        }
        points.push(FactorPoint::new(symbol.to_string(), *date, forward[i], acc));
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn skeleton() -> Vec<NaiveDate> {
        vec![
            d(2023, 1, 2),
            d(2023, 1, 3),
            d(2023, 1, 4),
            d(2023, 1, 5),
            d(2023, 1, 6),
        ]
    }

    #[test]
    fn test_no_events_is_all_neutral() {
        let points = synthesize_factors("600519", &skeleton(), &[]).unwrap();
        assert_eq!(points.len(), 5);
        for point in &points {
            assert_relative_eq!(point.forward_factor, 1.0);
            assert_relative_eq!(point.back_factor, 1.0);
        }
    }

    #[test]
    fn test_forward_cumulative_product() {
        // Per-day forward ratios of 2.0 and 1.5: stored fore_ratio is the
        // reciprocal of the applied per-day multiplier.
        let events = vec![
            CorporateAction::new("600519".to_string(), d(2023, 1, 3), 0.5, 2.0),
            CorporateAction::new("600519".to_string(), d(2023, 1, 5), 2.0 / 3.0, 1.5),
        ];
        let points = synthesize_factors("600519", &skeleton(), &events).unwrap();

        // Before both events: 2.0 * 1.5.
        assert_relative_eq!(points[0].forward_factor, 3.0, max_relative = 1e-12);
        // Between the two events: only the later one applies.
        assert_relative_eq!(points[2].forward_factor, 1.5, max_relative = 1e-12);
        // After both events: unadjusted.
        assert_relative_eq!(points[4].forward_factor, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_backward_cumulative_product() {
        let events = vec![
            CorporateAction::new("600519".to_string(), d(2023, 1, 3), 0.5, 2.0),
            CorporateAction::new("600519".to_string(), d(2023, 1, 5), 2.0 / 3.0, 1.5),
        ];
        let points = synthesize_factors("600519", &skeleton(), &events).unwrap();

        assert_relative_eq!(points[0].back_factor, 1.0);
        assert_relative_eq!(points[1].back_factor, 2.0);
        // Between the two events only the first applies.
        assert_relative_eq!(points[2].back_factor, 2.0);
        assert_relative_eq!(points[4].back_factor, 3.0, max_relative = 1e-12);
    }

    #[test]
    fn test_every_skeleton_date_appears_once() {
        let events = vec![CorporateAction::new(
            "600519".to_string(),
            d(2023, 1, 4),
            0.8,
            1.25,
        )];
        let points = synthesize_factors("600519", &skeleton(), &events).unwrap();
        let dates: Vec<_> = points.iter().map(|p| p.trade_date).collect();
        assert_eq!(dates, skeleton());
        assert!(points.iter().all(|p| p.forward_factor > 0.0 && p.back_factor > 0.0));
    }

    #[test]
    fn test_event_outside_skeleton_is_ignored() {
        let events = vec![CorporateAction::new(
            "600519".to_string(),
            d(2022, 12, 30),
            0.5,
            2.0,
        )];
        let points = synthesize_factors("600519", &skeleton(), &events).unwrap();
        assert!(points.iter().all(|p| p.forward_factor == 1.0 && p.back_factor == 1.0));
    }

    #[test]
    fn test_non_positive_ratio_is_rejected() {
        let events = vec![CorporateAction::new(
            "600519".to_string(),
            d(2023, 1, 4),
            0.0,
            1.0,
        )];
        let err = synthesize_factors("600519", &skeleton(), &events).unwrap_err();
        assert!(matches!(err, HuangpuError::NonPositiveRatio { .. }));
    }
}
