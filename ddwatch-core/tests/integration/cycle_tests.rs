//! Monitoring cycle scenarios against in-memory collaborators

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use ddwatch_core::cycle::{
    CycleError, CycleOptions, FailureStage, MonitoringCycle, NotificationStatus,
};
use ddwatch_core::models::{CapacityFigures, CapacityReading, ServerId, StoredReading};
use ddwatch_core::policy::{NotifyTrigger, ReportPayload};
use ddwatch_core::report::{CapacityReportParser, ParseMode};
use ddwatch_core::store::StoreError;

use super::support::{
    FixedInventory, MemoryStore, RecordingNotifier, ScriptedExecutor, target,
};

/// Monday 2024-06-03, 10:00 in Lima
fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap()
}

/// Friday 2024-06-07, 10:00 in Lima
fn friday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 7, 15, 0, 0).unwrap()
}

struct Harness {
    executor: Arc<ScriptedExecutor>,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    cycle: MonitoringCycle,
}

fn harness(
    targets: Vec<ddwatch_core::models::ServerTarget>,
    executor: ScriptedExecutor,
    store: MemoryStore,
    notifier: RecordingNotifier,
) -> Harness {
    let executor = Arc::new(executor);
    let store = Arc::new(store);
    let notifier = Arc::new(notifier);
    let cycle = MonitoringCycle::new(
        Arc::new(FixedInventory(Ok(targets))),
        executor.clone(),
        store.clone(),
        notifier.clone(),
    );
    Harness {
        executor,
        store,
        notifier,
        cycle,
    }
}

#[tokio::test]
async fn test_failed_target_is_skipped_and_report_covers_the_rest() {
    let (a, b, c) = (target(1, "dd-a"), target(2, "dd-b"), target(3, "dd-c"));
    let executor = ScriptedExecutor::new()
        .reports(&a, 96)
        .unreachable(&b)
        .reports(&c, 40);
    let h = harness(
        vec![c.clone(), b.clone(), a.clone()],
        executor,
        MemoryStore::new(),
        RecordingNotifier::new(),
    );

    let report = h.cycle.run_at(monday()).await.unwrap();

    assert_eq!(report.targets, 3);
    assert_eq!(report.readings.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].host.hostname, "dd-b");
    assert_eq!(report.failures[0].stage, FailureStage::Execute);
    assert_eq!(h.store.recorded().len(), 2);
    assert_eq!(report.notification, NotificationStatus::Sent);

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    let hosts: Vec<_> = sent[0]
        .readings
        .iter()
        .map(|r| r.host.hostname.as_str())
        .collect();
    assert_eq!(hosts, vec!["dd-a", "dd-c"]);
    assert_eq!(sent[0].threshold.percent(), 95);
}

#[tokio::test]
async fn test_below_threshold_never_notifies() {
    let (a, b) = (target(1, "dd-a"), target(2, "dd-b"));
    let executor = ScriptedExecutor::new().reports(&a, 94).reports(&b, 12);
    let h = harness(
        vec![a, b],
        executor,
        MemoryStore::new(),
        RecordingNotifier::new(),
    );

    let report = h.cycle.run_at(monday()).await.unwrap();

    assert_eq!(report.readings.len(), 2);
    assert_eq!(report.notification, NotificationStatus::NotWarranted);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_friday_threshold_applies() {
    let a = target(1, "dd-a");

    let h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 94),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );
    let report = h.cycle.run_at(friday()).await.unwrap();
    assert_eq!(report.threshold.percent(), 93);
    assert_eq!(report.notification, NotificationStatus::Sent);

    let h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 94),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );
    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(report.threshold.percent(), 95);
    assert_eq!(report.notification, NotificationStatus::NotWarranted);
}

#[tokio::test]
async fn test_threshold_is_fixed_at_cycle_start() {
    // Friday 23:59:59 in Lima; the cycle is judged as Friday throughout
    let late_friday = Utc.with_ymd_and_hms(2024, 6, 8, 4, 59, 59).unwrap();
    let a = target(1, "dd-a");
    let h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 93),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );

    let report = h.cycle.run_at(late_friday).await.unwrap();
    assert_eq!(report.local_date.to_string(), "2024-06-07");
    assert_eq!(report.threshold.percent(), 93);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_inventory_failure_aborts_before_any_target() {
    let executor = Arc::new(ScriptedExecutor::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let cycle = MonitoringCycle::new(
        Arc::new(FixedInventory(Err(StoreError::Inventory(
            "no such table: servers".to_string(),
        )))),
        executor.clone(),
        Arc::new(MemoryStore::new()),
        notifier.clone(),
    );

    let err = cycle.run_at(monday()).await.unwrap_err();
    assert!(matches!(err, CycleError::InventoryUnavailable(_)));
    assert_eq!(executor.calls(), 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_no_readings_never_notifies_even_when_always() {
    let (a, b) = (target(1, "dd-a"), target(2, "dd-b"));
    let mut h = harness(
        vec![a.clone(), b.clone()],
        ScriptedExecutor::new().unreachable(&a).unreachable(&b),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );
    h.cycle = h.cycle.with_options(CycleOptions {
        trigger: NotifyTrigger::Always,
        ..CycleOptions::default()
    });

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.notification, NotificationStatus::NoReadings);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_always_trigger_reports_below_threshold() {
    let a = target(1, "dd-a");
    let mut h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 10),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );
    h.cycle = h.cycle.with_options(CycleOptions {
        trigger: NotifyTrigger::Always,
        ..CycleOptions::default()
    });

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(report.notification, NotificationStatus::Sent);
    assert_eq!(h.notifier.sent()[0].offenders().count(), 0);
}

#[tokio::test]
async fn test_malformed_report_is_isolated() {
    let (a, b) = (target(1, "dd-a"), target(2, "dd-b"));
    let executor = ScriptedExecutor::new()
        .prints(&a, "Filesystem Size Used Avail Use% Mounted on\n/dev/sda1 50G 20G 30G 40% /\n")
        .reports(&b, 97);
    let h = harness(
        vec![a, b],
        executor,
        MemoryStore::new(),
        RecordingNotifier::new(),
    );

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, FailureStage::Parse);
    assert!(report.failures[0].error.contains("/data: post-comp"));
    assert_eq!(h.notifier.sent()[0].readings.len(), 1);
}

#[tokio::test]
async fn test_strict_parser_rejects_non_numeric_field() {
    let a = target(1, "dd-a");
    let output = "/data: post-comp  160508.5  -  8508.5  95%  12000.3\n";

    let h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().prints(&a, output),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );
    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(report.readings.len(), 1);
    assert!(report.readings[0].reading.figures.used_gb.abs() < f64::EPSILON);

    let mut h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().prints(&a, output),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );
    h.cycle = h
        .cycle
        .with_parser(CapacityReportParser::new("/data: post-comp", ParseMode::Strict));
    let report = h.cycle.run_at(monday()).await.unwrap();
    assert!(report.readings.is_empty());
    assert_eq!(report.failures[0].stage, FailureStage::Parse);
}

#[tokio::test]
async fn test_unpersisted_reading_is_left_out_of_decision() {
    let (a, b) = (target(1, "dd-a"), target(2, "dd-b"));
    let h = harness(
        vec![a.clone(), b.clone()],
        ScriptedExecutor::new().reports(&a, 99).reports(&b, 50),
        MemoryStore::new().rejecting(a.id),
        RecordingNotifier::new(),
    );

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(report.readings.len(), 1);
    assert_eq!(report.readings[0].host.hostname, "dd-b");
    assert_eq!(report.persistence_failures.len(), 1);
    assert_eq!(report.persistence_failures[0].reading.use_percent(), 99);
    assert_eq!(h.store.recorded().len(), 1);
    assert_eq!(report.notification, NotificationStatus::NotWarranted);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_unpersisted_reading_is_not_mailed() {
    let (a, b) = (target(1, "dd-a"), target(2, "dd-b"));
    let h = harness(
        vec![a.clone(), b.clone()],
        ScriptedExecutor::new().reports(&a, 99).reports(&b, 97),
        MemoryStore::new().rejecting(a.id),
        RecordingNotifier::new(),
    );

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(report.notification, NotificationStatus::Sent);
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    let hosts: Vec<_> = sent[0].readings.iter().map(|r| r.host.hostname.as_str()).collect();
    assert_eq!(hosts, vec!["dd-b"]);
}

#[tokio::test]
async fn test_every_reading_rejected_sends_nothing() {
    let a = target(1, "dd-a");
    let mut h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 99),
        MemoryStore::new().rejecting(a.id),
        RecordingNotifier::new(),
    );
    h.cycle = h.cycle.with_options(CycleOptions {
        trigger: NotifyTrigger::Always,
        ..CycleOptions::default()
    });

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert!(report.readings.is_empty());
    assert_eq!(report.notification, NotificationStatus::NoReadings);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_cycle() {
    let a = target(1, "dd-a");
    let h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 98),
        MemoryStore::new(),
        RecordingNotifier::failing(),
    );

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert!(matches!(report.notification, NotificationStatus::Failed(_)));
    assert_eq!(h.store.recorded().len(), 1);
}

#[tokio::test]
async fn test_out_of_range_percent_is_persisted_and_evaluated() {
    let a = target(1, "dd-a");
    let h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 104),
        MemoryStore::new(),
        RecordingNotifier::new(),
    );

    let report = h.cycle.run_at(monday()).await.unwrap();
    assert_eq!(h.store.recorded()[0].use_percent(), 104);
    assert_eq!(report.notification, NotificationStatus::Sent);
}

#[tokio::test]
async fn test_history_payload_summarizes_stored_readings() {
    let a = target(1, "dd-a");
    let stored = |day: u32, percent: i64| StoredReading {
        recorded_at: Utc.with_ymd_and_hms(2024, 6, day, 15, 0, 0).unwrap(),
        reading: CapacityReading::new(
            ServerId(1),
            CapacityFigures {
                total_gb: 100.0,
                used_gb: percent as f64,
                available_gb: 100.0 - percent as f64,
                use_percent: percent,
                reclaimable_gb: 0.0,
            },
        ),
    };
    let store = MemoryStore::new().with_history(a.id, vec![stored(1, 90), stored(2, 97)]);
    let mut h = harness(
        vec![a.clone()],
        ScriptedExecutor::new().reports(&a, 96),
        store,
        RecordingNotifier::new(),
    );
    h.cycle = h.cycle.with_options(CycleOptions {
        payload: ReportPayload::TableWithHistory,
        history_days: 14,
        ..CycleOptions::default()
    });

    h.cycle.run_at(monday()).await.unwrap();
    let sent = h.notifier.sent();
    assert_eq!(sent[0].history_days, 14);
    assert_eq!(sent[0].history.len(), 1);
    assert_eq!(sent[0].history[0].min_percent, 90);
    assert_eq!(sent[0].history[0].max_percent, 97);
}

#[tokio::test]
async fn test_every_failure_subset_yields_remaining_readings() {
    let targets: Vec<_> = (1..=5).map(|i| target(i, &format!("dd-{i:02}"))).collect();

    for mask in 0u32..32 {
        let mut executor = ScriptedExecutor::new();
        for (bit, t) in targets.iter().enumerate() {
            executor = if mask & (1 << bit) == 0 {
                executor.reports(t, 95)
            } else {
                executor.unreachable(t)
            };
        }
        let failed = mask.count_ones() as usize;

        let mut h = harness(
            targets.clone(),
            executor,
            MemoryStore::new(),
            RecordingNotifier::new(),
        );
        h.cycle = h.cycle.with_options(CycleOptions {
            concurrency: 2,
            ..CycleOptions::default()
        });
        let report = h.cycle.run_at(monday()).await.unwrap();

        assert_eq!(report.readings.len(), 5 - failed, "mask {mask:05b}");
        assert_eq!(h.store.recorded().len(), 5 - failed, "mask {mask:05b}");
        assert_eq!(h.executor.calls(), 5);

        let sent = h.notifier.sent();
        if failed == 5 {
            assert!(sent.is_empty());
        } else {
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].readings.len(), 5 - failed);
        }
    }
}
