//! Property tests for the capacity report parser

use ddwatch_core::report::{CapacityReportParser, DEFAULT_MARKER, ParseError, ParseMode};
use proptest::prelude::*;

/// Strategy for capacities as the appliance prints them
fn capacity_strategy() -> impl Strategy<Value = f64> {
    (0u64..100_000_000_000, 0u32..100).prop_map(|(whole, frac)| whole as f64 + f64::from(frac) / 100.0)
}

/// Strategy for report lines that never contain the marker
fn unrelated_line_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9/ %.:-]{0,60}".prop_filter("must not contain the marker", |l| {
        !l.contains(DEFAULT_MARKER)
    })
}

fn marker_line(total: f64, used: f64, avail: f64, percent: i64, reclaim: f64) -> String {
    format!("{DEFAULT_MARKER}   {total}   {used}   {avail}   {percent}%   {reclaim}")
}

proptest! {
    /// Property: every field is read from its documented token position
    #[test]
    fn fields_come_from_documented_positions(
        total in capacity_strategy(),
        used in capacity_strategy(),
        avail in capacity_strategy(),
        percent in 0i64..=100,
        reclaim in capacity_strategy(),
        before in prop::collection::vec(unrelated_line_strategy(), 0..5),
        after in prop::collection::vec(unrelated_line_strategy(), 0..5),
    ) {
        let mut lines = before;
        lines.push(marker_line(total, used, avail, percent, reclaim));
        lines.extend(after);
        let report = lines.join("\n");

        let parsed = CapacityReportParser::default().parse(&report).unwrap();
        prop_assert_eq!(parsed.figures.total_gb.to_bits(), total.to_bits());
        prop_assert_eq!(parsed.figures.used_gb.to_bits(), used.to_bits());
        prop_assert_eq!(parsed.figures.available_gb.to_bits(), avail.to_bits());
        prop_assert_eq!(parsed.figures.use_percent, percent);
        prop_assert_eq!(parsed.figures.reclaimable_gb.to_bits(), reclaim.to_bits());
        prop_assert!(parsed.anomalies.is_empty());
    }

    /// Property: a report without the marker fails with no partial reading
    #[test]
    fn missing_marker_always_fails(
        lines in prop::collection::vec(unrelated_line_strategy(), 0..20),
    ) {
        let report = lines.join("\n");
        let result = CapacityReportParser::default().parse(&report);
        let is_missing_marker = matches!(result, Err(ParseError::MissingMarker { .. }));
        prop_assert!(is_missing_marker);
    }

    /// Property: parsing is deterministic down to the bit
    #[test]
    fn reparsing_is_bit_identical(
        total in capacity_strategy(),
        used in capacity_strategy(),
        percent in -50i64..500,
        junk in "[a-z]{1,6}",
    ) {
        let report = format!("{DEFAULT_MARKER} {total} {used} {junk} {percent}% 0.5");
        let parser = CapacityReportParser::default();
        let first = parser.parse(&report).unwrap();
        let second = parser.parse(&report).unwrap();
        prop_assert_eq!(first.figures.total_gb.to_bits(), second.figures.total_gb.to_bits());
        prop_assert_eq!(first.figures.available_gb.to_bits(), second.figures.available_gb.to_bits());
        prop_assert_eq!(first, second);
    }

    /// Property: a short marker line is rejected and carried in the error
    #[test]
    fn short_marker_line_is_rejected(extra in 0usize..5) {
        let tokens: Vec<String> = (0..extra).map(|i| format!("{i}.0")).collect();
        let line = format!("{DEFAULT_MARKER} {}", tokens.join(" "));
        let err = CapacityReportParser::default().parse(&line).unwrap_err();
        let is_too_few = matches!(err, ParseError::TooFewColumns { found, .. } if found == extra + 2);
        prop_assert!(is_too_few);
        prop_assert_eq!(err.line(), Some(line.trim()));
    }

    /// Property: lenient mode coerces non-numeric tokens, strict mode refuses them
    #[test]
    fn lenient_coerces_and_strict_fails(token in "[a-z-]{1,8}") {
        let report = format!("{DEFAULT_MARKER} 100 {token} 40 60% 1");

        let lenient = CapacityReportParser::new(DEFAULT_MARKER, ParseMode::Lenient)
            .parse(&report)
            .unwrap();
        prop_assert_eq!(lenient.figures.used_gb.to_bits(), 0f64.to_bits());
        prop_assert_eq!(lenient.anomalies.len(), 1);
        prop_assert_eq!(&lenient.anomalies[0].token, &token);

        let strict = CapacityReportParser::new(DEFAULT_MARKER, ParseMode::Strict).parse(&report);
        let is_invalid_number = matches!(strict, Err(ParseError::InvalidNumber { .. }));
        prop_assert!(is_invalid_number);
    }
}
