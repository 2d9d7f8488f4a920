//! Settings file schema
//!
//! Every section and key is optional; a missing file yields the built-in
//! defaults.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::models::ServerTarget;
use crate::notify::SmtpTls;
use crate::policy::{
    DEFAULT_THRESHOLD, FRIDAY_THRESHOLD, NotifyTrigger, OPERATIONAL_UTC_OFFSET_HOURS,
    ReportPayload, ThresholdPolicy,
};
use crate::remote::{DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::report::{
    CapacityReportParser, DEFAULT_COMMAND, DEFAULT_MARKER, MARKER_TOKENS, ParseMode,
};
use crate::tracing::{TracingConfig, TracingLevel, TracingOutput};

/// Default number of targets polled at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound for `monitor.concurrency`
pub const MAX_CONCURRENCY: usize = 64;

/// Upper bound for `monitor.command_timeout_secs`
pub const MAX_COMMAND_TIMEOUT_SECS: u64 = 600;

/// Default history window for trend payloads
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Longest history window accepted for trend payloads
pub const MAX_HISTORY_DAYS: u32 = 3650;

/// Root of the settings file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Polling behaviour
    #[serde(default)]
    pub monitor: MonitorSettings,
    /// Notification policy
    #[serde(default)]
    pub notify: NotifySettings,
    /// Mail relay
    #[serde(default)]
    pub smtp: SmtpSettings,
    /// Metrics store
    #[serde(default)]
    pub store: StoreSettings,
    /// Logging
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Static inventory; replaces the store's server table when non-empty
    #[serde(default)]
    pub targets: Vec<ServerTarget>,
}

impl Settings {
    /// Parses settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text does not match the schema.
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks everything a monitoring run depends on
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first invalid key.
    pub fn validate(&self) -> ConfigResult<()> {
        self.monitor.validate()?;

        if !(1..=MAX_HISTORY_DAYS).contains(&self.notify.history_days) {
            return Err(invalid(
                "notify.history_days",
                &format!(
                    "{} is outside 1..={MAX_HISTORY_DAYS}",
                    self.notify.history_days
                ),
            ));
        }

        if !self.notify.dry_run {
            if self.smtp.host.trim().is_empty() {
                return Err(invalid("smtp.host", "required unless notify.dry_run is set"));
            }
            if self.smtp.to.is_empty() {
                return Err(invalid("smtp.to", "at least one recipient is required"));
            }
            if self.smtp.from.as_deref().is_none_or(|f| f.trim().is_empty()) {
                return Err(invalid("smtp.from", "required unless notify.dry_run is set"));
            }
        }

        let mut ids: Vec<_> = self.targets.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(invalid("targets.id", &format!("duplicate id {}", pair[0])));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// `[monitor]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSettings {
    /// Command run on every target
    pub command: String,
    /// Marker substring of the data-volume row
    pub marker: String,
    /// Targets polled at the same time (1–64)
    pub concurrency: usize,
    /// Bound on one remote command, connection included (1–600 s)
    pub command_timeout_secs: u64,
    /// SSH connect timeout
    pub connect_timeout_secs: u64,
    /// Handling of non-numeric report fields
    pub parse_mode: ParseMode,
    /// UTC offset of the operational locale, in hours
    pub utc_offset_hours: i32,
    /// Threshold applied on Fridays
    pub friday_threshold: u8,
    /// Threshold applied on other days
    pub default_threshold: u8,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            parse_mode: ParseMode::default(),
            utc_offset_hours: OPERATIONAL_UTC_OFFSET_HOURS,
            friday_threshold: FRIDAY_THRESHOLD,
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MonitorSettings {
    /// Validates the keys the parser and policy depend on
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty command, a marker
    /// not spanning exactly two columns, a threshold outside 1–100, or an
    /// offset beyond ±14 hours.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.command.trim().is_empty() {
            return Err(invalid("monitor.command", "must not be empty"));
        }
        if self.marker.is_empty() {
            return Err(invalid("monitor.marker", "must not be empty"));
        }
        if self.marker.split_whitespace().count() != MARKER_TOKENS {
            return Err(invalid(
                "monitor.marker",
                &format!("must span {MARKER_TOKENS} columns, like \"{DEFAULT_MARKER}\""),
            ));
        }
        for (field, value) in [
            ("monitor.friday_threshold", self.friday_threshold),
            ("monitor.default_threshold", self.default_threshold),
        ] {
            if !(1..=100).contains(&value) {
                return Err(invalid(field, &format!("{value} is outside 1..=100")));
            }
        }
        if !(-14..=14).contains(&self.utc_offset_hours) {
            return Err(invalid(
                "monitor.utc_offset_hours",
                &format!("{} is outside -14..=14", self.utc_offset_hours),
            ));
        }
        Ok(())
    }

    /// Concurrency clamped to 1–64
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// Command timeout clamped to 1–600 seconds
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.clamp(1, MAX_COMMAND_TIMEOUT_SECS))
    }

    /// Connect timeout, at least one second and never above the command timeout
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1)).min(self.command_timeout())
    }

    /// Parser configured with the marker and mode
    #[must_use]
    pub fn parser(&self) -> CapacityReportParser {
        CapacityReportParser::new(self.marker.clone(), self.parse_mode)
    }

    /// Threshold policy configured with the locale and thresholds
    #[must_use]
    pub fn threshold_policy(&self) -> ThresholdPolicy {
        ThresholdPolicy::new(
            self.utc_offset_hours,
            self.friday_threshold,
            self.default_threshold,
        )
    }
}

/// `[notify]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifySettings {
    /// When a report is sent
    pub trigger: NotifyTrigger,
    /// What the report contains
    pub payload: ReportPayload,
    /// Days of history summarized in the trend payload
    pub history_days: u32,
    /// Log the report instead of mailing it
    pub dry_run: bool,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            trigger: NotifyTrigger::default(),
            payload: ReportPayload::default(),
            history_days: DEFAULT_HISTORY_DAYS,
            dry_run: false,
        }
    }
}

/// `[smtp]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtpSettings {
    /// Relay host
    pub host: String,
    /// Relay port
    pub port: u16,
    /// Transport security
    pub tls: SmtpTls,
    /// Accept self-signed relay certificates
    pub accept_invalid_certs: bool,
    /// Login, when the relay requires authentication
    pub username: Option<String>,
    /// Password for `username`
    pub password: Option<SecretString>,
    /// Sender mailbox
    pub from: Option<String>,
    /// Recipient mailboxes
    pub to: Vec<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 25,
            tls: SmtpTls::default(),
            accept_invalid_certs: true,
            username: None,
            password: None,
            from: None,
            to: Vec::new(),
        }
    }
}

/// `[store]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// SQLite database file
    pub path: Option<PathBuf>,
}

impl StoreSettings {
    /// Database path, defaulting to `<data dir>/ddwatch/ddwatch.db`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDirectory`] when no path is configured and the
    /// platform data directory is unknown.
    pub fn resolved_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("ddwatch").join("ddwatch.db"))
            .ok_or(ConfigError::NoDirectory("data"))
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Base level, raised by `-v` flags
    pub level: TracingLevel,
    /// Full filter directive, overriding `level`
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl LoggingSettings {
    /// Builds the subscriber configuration
    ///
    /// `verbosity` raises the configured level; `quiet` drops it to errors.
    #[must_use]
    pub fn tracing_config(&self, verbosity: u8, quiet: bool) -> TracingConfig {
        let level = if quiet {
            TracingLevel::Error
        } else {
            self.level.raised_by(verbosity)
        };
        let output = self
            .file
            .as_ref()
            .map_or(TracingOutput::Stderr, |path| TracingOutput::File {
                path: path.clone(),
            });

        let mut config = TracingConfig::new().with_level(level).with_output(output);
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter.clone());
        }
        config
    }
}
