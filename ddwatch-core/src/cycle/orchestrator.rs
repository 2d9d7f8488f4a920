//! The monitoring cycle.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::CycleError;
use super::outcome::{
    CyclePhase, CycleReport, CycleResult, FailureStage, NotificationStatus, PersistenceFailure,
    TargetFailure, TargetOutcome,
};
use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_HISTORY_DAYS, MAX_CONCURRENCY, Settings};
use crate::models::{CapacityReading, HostReading, ServerTarget};
use crate::notify::{AlertReport, HostHistory, Notifier};
use crate::policy::{AlertThreshold, NotifyTrigger, ReportPayload, ThresholdPolicy};
use crate::remote::RemoteExecutor;
use crate::report::{CapacityReportParser, DEFAULT_COMMAND};
use crate::store::{Inventory, MetricsStore};
use crate::tracing::span_names;

/// Cycle behaviour chosen once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOptions {
    /// Command run on every target
    pub command: String,
    /// Targets polled at the same time
    pub concurrency: usize,
    /// When to notify
    pub trigger: NotifyTrigger,
    /// What the report contains
    pub payload: ReportPayload,
    /// History window of the trend payload
    pub history_days: u32,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            trigger: NotifyTrigger::default(),
            payload: ReportPayload::default(),
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

impl CycleOptions {
    /// Options from the `[monitor]` and `[notify]` sections
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            command: settings.monitor.command.clone(),
            concurrency: settings.monitor.effective_concurrency(),
            trigger: settings.notify.trigger,
            payload: settings.notify.payload,
            history_days: settings.notify.history_days,
        }
    }
}

/// One pass over the fleet: poll, persist, decide, notify
pub struct MonitoringCycle {
    inventory: Arc<dyn Inventory>,
    executor: Arc<dyn RemoteExecutor>,
    store: Arc<dyn MetricsStore>,
    notifier: Arc<dyn Notifier>,
    parser: CapacityReportParser,
    policy: ThresholdPolicy,
    options: CycleOptions,
}

impl MonitoringCycle {
    /// Creates a cycle with the default parser, policy and options
    pub fn new(
        inventory: Arc<dyn Inventory>,
        executor: Arc<dyn RemoteExecutor>,
        store: Arc<dyn MetricsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inventory,
            executor,
            store,
            notifier,
            parser: CapacityReportParser::default(),
            policy: ThresholdPolicy::default(),
            options: CycleOptions::default(),
        }
    }

    /// Sets the report parser
    #[must_use]
    pub fn with_parser(mut self, parser: CapacityReportParser) -> Self {
        self.parser = parser;
        self
    }

    /// Sets the threshold policy
    #[must_use]
    pub const fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the cycle options
    #[must_use]
    pub fn with_options(mut self, options: CycleOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &CycleOptions {
        &self.options
    }

    /// Runs one cycle now
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InventoryUnavailable`] if the target list cannot
    /// be fetched. Per-target failures never fail the cycle.
    pub async fn run(&self) -> Result<CycleReport, CycleError> {
        self.run_at(Utc::now()).await
    }

    /// Runs one cycle as if started at `now`
    ///
    /// `now` fixes the threshold for the whole cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InventoryUnavailable`] if the target list cannot
    /// be fetched.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let span = info_span!(span_names::CYCLE_RUN);
        self.run_inner(now).instrument(span).await
    }

    async fn run_inner(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let local_date = self.policy.local_date(now);
        let threshold = self.policy.for_date(local_date);
        info!(%threshold, date = %local_date, "Starting monitoring cycle");

        debug!(phase = %CyclePhase::FetchingInventory);
        let targets = self.inventory.list_targets().await.map_err(|e| {
            error!(error = %e, "Inventory unavailable, cycle aborted");
            CycleError::InventoryUnavailable(e)
        })?;
        info!(targets = targets.len(), "Inventory loaded");

        debug!(phase = %CyclePhase::IteratingTargets, concurrency = self.concurrency());
        let outcomes: Vec<TargetOutcome> = stream::iter(&targets)
            .map(|target| self.poll_target(target, threshold))
            .buffer_unordered(self.concurrency())
            .collect()
            .await;

        debug!(phase = %CyclePhase::Aggregating);
        let result = CycleResult::from_outcomes(outcomes);

        debug!(phase = %CyclePhase::Deciding);
        let notification = if result.readings().is_empty() {
            info!("No readings stored, no notification sent");
            NotificationStatus::NoReadings
        } else if self
            .options
            .trigger
            .should_notify(result.readings().len(), result.alert_warranted(threshold))
        {
            debug!(phase = %CyclePhase::Notifying);
            self.notify(&result, local_date, threshold).await
        } else {
            info!(%threshold, "No server reached the threshold, no notification sent");
            NotificationStatus::NotWarranted
        };

        let (readings, failures, persistence_failures) = result.into_parts();
        let elapsed = started.elapsed();
        info!(
            phase = %CyclePhase::Done,
            targets = targets.len(),
            readings = readings.len(),
            failed = failures.len(),
            persistence_failed = persistence_failures.len(),
            notified = notification.attempted(),
            duration_ms = elapsed.as_millis() as u64,
            "Monitoring cycle completed in {:.2} seconds",
            elapsed.as_secs_f64()
        );

        Ok(CycleReport {
            started_at: now,
            local_date,
            threshold,
            targets: targets.len(),
            readings,
            failures,
            persistence_failures,
            notification,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    fn concurrency(&self) -> usize {
        self.options.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    async fn poll_target(&self, target: &ServerTarget, threshold: AlertThreshold) -> TargetOutcome {
        let span = info_span!(
            span_names::TARGET_POLL,
            host = %target.hostname,
            address = %target.address,
            server_id = %target.id
        );
        self.poll_target_inner(target, threshold)
            .instrument(span)
            .await
    }

    async fn poll_target_inner(
        &self,
        target: &ServerTarget,
        threshold: AlertThreshold,
    ) -> TargetOutcome {
        let host = target.identity();

        let output = match self.executor.execute(target, &self.options.command).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, transport = e.is_transport(), "Remote command failed, skipping target");
                return TargetOutcome::Failed(TargetFailure {
                    host,
                    stage: FailureStage::Execute,
                    error: e.to_string(),
                });
            }
        };

        let parsed = match self.parser.parse(&output) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, line = e.line().unwrap_or(""), "Malformed report, skipping target");
                return TargetOutcome::Failed(TargetFailure {
                    host,
                    stage: FailureStage::Parse,
                    error: e.to_string(),
                });
            }
        };

        for anomaly in &parsed.anomalies {
            warn!(
                anomaly = "numeric_coercion",
                field = %anomaly.field,
                token = %anomaly.token,
                line = %parsed.line,
                "Non-numeric field coerced to 0"
            );
        }
        if !parsed.figures.percent_in_range() {
            warn!(
                anomaly = "percent_out_of_range",
                use_percent = parsed.figures.use_percent,
                "Utilization outside 0-100, recording as reported"
            );
        }

        let reading = CapacityReading::new(target.id, parsed.figures);
        if threshold.is_met_by(reading.use_percent()) {
            warn!(use_percent = reading.use_percent(), %threshold, "Server reached the threshold");
        } else {
            debug!(use_percent = reading.use_percent(), "Reading obtained");
        }

        match self.store.record(&reading).await {
            Ok(()) => TargetOutcome::Recorded(HostReading { host, reading }),
            Err(e) => {
                let record = serde_json::to_string(&reading).unwrap_or_default();
                warn!(error = %e, %record, "Failed to persist reading, skipping target");
                TargetOutcome::Unpersisted(PersistenceFailure {
                    host,
                    reading,
                    error: e.to_string(),
                })
            }
        }
    }

    async fn notify(
        &self,
        result: &CycleResult,
        generated_on: chrono::NaiveDate,
        threshold: AlertThreshold,
    ) -> NotificationStatus {
        let history = if self.options.payload.includes_history() {
            self.collect_history(result.readings()).await
        } else {
            Vec::new()
        };

        let report = AlertReport {
            generated_on,
            threshold,
            readings: result.readings().to_vec(),
            history,
            history_days: self.options.history_days,
        };

        let span = info_span!(span_names::NOTIFY_SEND, readings = report.readings.len());
        match self.notifier.send(&report).instrument(span).await {
            Ok(()) => {
                info!(readings = report.readings.len(), "Notification sent");
                NotificationStatus::Sent
            }
            Err(e) => {
                error!(error = %e, "Failed to send notification");
                NotificationStatus::Failed(e.to_string())
            }
        }
    }

    async fn collect_history(&self, readings: &[HostReading]) -> Vec<HostHistory> {
        let mut trends = Vec::with_capacity(readings.len());
        for reading in readings {
            match self
                .store
                .history(reading.host.id, self.options.history_days)
                .await
            {
                Ok(stored) => trends.extend(HostHistory::summarize(reading.host.clone(), &stored)),
                Err(e) => {
                    warn!(host = %reading.host.hostname, error = %e, "History unavailable for report");
                }
            }
        }
        trends
    }
}
