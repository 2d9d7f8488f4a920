//! Property tests for the cycle result fold and the notification trigger

use ddwatch_core::cycle::{CycleResult, FailureStage, TargetFailure, TargetOutcome};
use ddwatch_core::models::{
    CapacityFigures, CapacityReading, HostReading, ServerId, TargetIdentity,
};
use ddwatch_core::policy::{AlertThreshold, NotifyTrigger};
use proptest::prelude::*;

/// Strategy for one target outcome: `Some(percent)` or a failure
fn outcome_strategy() -> impl Strategy<Value = Option<i64>> {
    prop::option::weighted(0.7, 0i64..=110)
}

fn outcome(id: usize, percent: Option<i64>) -> TargetOutcome {
    let host = TargetIdentity {
        id: ServerId(id as i64),
        hostname: format!("dd-{:03}", (id * 7919) % 1000),
        address: format!("10.0.{}.{}", id / 250, id % 250),
    };
    match percent {
        Some(p) => TargetOutcome::Recorded(HostReading {
            host,
            reading: CapacityReading::new(
                ServerId(id as i64),
                CapacityFigures {
                    total_gb: 100.0,
                    used_gb: p as f64,
                    available_gb: 100.0 - p as f64,
                    use_percent: p,
                    reclaimable_gb: 0.0,
                },
            ),
        }),
        None => TargetOutcome::Failed(TargetFailure {
            host,
            stage: FailureStage::Execute,
            error: "timed out".to_string(),
        }),
    }
}

proptest! {
    /// Property: N targets with K failures fold into N-K readings
    #[test]
    fn fold_keeps_every_success(percents in prop::collection::vec(outcome_strategy(), 0..40)) {
        let successes = percents.iter().filter(|p| p.is_some()).count();
        let result = CycleResult::from_outcomes(
            percents.iter().enumerate().map(|(i, p)| outcome(i, *p)),
        );
        prop_assert_eq!(result.readings().len(), successes);
        prop_assert_eq!(result.failures().len(), percents.len() - successes);
    }

    /// Property: the result is sorted by hostname then id regardless of input order
    #[test]
    fn fold_output_is_sorted(
        percents in prop::collection::vec(outcome_strategy(), 0..40),
        seed in any::<u64>(),
    ) {
        let mut outcomes: Vec<_> = percents.iter().enumerate().map(|(i, p)| outcome(i, *p)).collect();
        let len = outcomes.len().max(1);
        outcomes.rotate_left((seed as usize) % len);
        let result = CycleResult::from_outcomes(outcomes);
        prop_assert!(result.readings().windows(2).all(|w| w[0].sort_key() <= w[1].sort_key()));
    }

    /// Property: the threshold trigger fires exactly when some reading meets it
    #[test]
    fn trigger_matches_alert_warranted(
        percents in prop::collection::vec(outcome_strategy(), 0..20),
        threshold in 1u8..=100,
    ) {
        let threshold = AlertThreshold::new(threshold);
        let result = CycleResult::from_outcomes(
            percents.iter().enumerate().map(|(i, p)| outcome(i, *p)),
        );
        let expected = percents
            .iter()
            .flatten()
            .any(|p| *p >= i64::from(threshold.percent()));

        prop_assert_eq!(result.alert_warranted(threshold), expected);
        let warranted = result.alert_warranted(threshold);
        prop_assert_eq!(
            NotifyTrigger::Threshold.should_notify(result.readings().len(), warranted),
            expected
        );
        prop_assert_eq!(
            NotifyTrigger::Always.should_notify(result.readings().len(), warranted),
            !result.readings().is_empty()
        );
    }
}
