//! Property tests for the day-of-week threshold policy

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use ddwatch_core::policy::{AlertThreshold, ThresholdPolicy, threshold_for_date};
use proptest::prelude::*;

/// Strategy for calendar dates between 1990 and 2100
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..40_000).prop_map(|days| {
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + Duration::days(days)
    })
}

proptest! {
    /// Property: 93 on Fridays, 95 otherwise, for any date
    #[test]
    fn friday_is_93_everything_else_95(date in date_strategy()) {
        let expected = if date.weekday() == Weekday::Fri { 93 } else { 95 };
        prop_assert_eq!(threshold_for_date(date).percent(), expected);
    }

    /// Property: a full week starting anywhere has exactly one 93 day
    #[test]
    fn every_week_has_one_friday(start in date_strategy()) {
        let lowered = (0..7)
            .map(|d| threshold_for_date(start + Duration::days(d)).percent())
            .filter(|t| *t == 93)
            .count();
        prop_assert_eq!(lowered, 1);
    }

    /// Property: the instant is judged by its date in the configured offset
    #[test]
    fn instant_uses_local_date(
        secs in 0i64..4_000_000_000,
        offset in -12i32..=14,
    ) {
        let instant = Utc.timestamp_opt(secs, 0).unwrap();
        let policy = ThresholdPolicy::new(offset, 93, 95);
        let local = (instant + Duration::hours(i64::from(offset))).date_naive();
        prop_assert_eq!(policy.local_date(instant), local);
        prop_assert_eq!(policy.at(instant), policy.for_date(local));
    }

    /// Property: a threshold is met exactly by percentages at or above it
    #[test]
    fn threshold_is_inclusive(threshold in 0u8..=100, percent in -1000i64..1000) {
        let t = AlertThreshold::new(threshold);
        prop_assert_eq!(t.is_met_by(percent), percent >= i64::from(threshold));
    }
}
