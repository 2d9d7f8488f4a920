//! Dry-run notifier that writes the report to the log.

use async_trait::async_trait;
use tracing::info;

use super::render::{render_text, subject};
use super::{AlertReport, Notifier, NotifyResult};

/// Renders the plain-text report and logs it instead of mailing it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a new dry-run notifier
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, report: &AlertReport) -> NotifyResult<()> {
        info!(
            subject = %subject(report),
            readings = report.readings.len(),
            offenders = report.offenders().count(),
            dry_run = true,
            "Alert report (not mailed)\n{}",
            render_text(report)
        );
        Ok(())
    }
}
