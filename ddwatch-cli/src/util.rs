//! Shared utility functions used across command modules.

use std::path::Path;
use std::sync::Arc;

use ddwatch_core::config::{ConfigManager, Settings};
use ddwatch_core::notify::{LogNotifier, Notifier, SmtpNotifier};
use ddwatch_core::store::{Inventory, SqliteStore, StaticInventory};
use ddwatch_core::tracing::{TracingError, init_tracing};

use crate::error::CliError;

/// Creates a `ConfigManager` for the `--config` file, or the default location
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_file(path)),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads the settings file without validating it
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, CliError> {
    let manager = create_config_manager(config_path)?;
    Ok(manager.load()?)
}

/// Installs the log subscriber from `[logging]` and the `-v`/`-q` flags.
///
/// A logging failure never stops the command.
pub fn init_logging(settings: &Settings, verbose: u8, quiet: bool) {
    let config = settings.logging.tracing_config(verbose, quiet);
    match init_tracing(&config) {
        Ok(()) | Err(TracingError::AlreadyInitialized) => {}
        Err(e) => eprintln!("Warning: logging disabled: {e}"),
    }
}

/// Opens the metrics store named by `[store]`
pub fn open_store(settings: &Settings) -> Result<Arc<SqliteStore>, CliError> {
    let path = settings.store.resolved_path()?;
    let store = SqliteStore::open_at(&path)?;
    tracing::debug!(path = %path.display(), "Metrics store opened");
    Ok(Arc::new(store))
}

/// The `[[targets]]` inventory, if the settings file lists any
pub fn static_inventory(settings: &Settings) -> Option<Arc<dyn Inventory>> {
    if settings.targets.is_empty() {
        None
    } else {
        Some(Arc::new(StaticInventory::new(settings.targets.clone())))
    }
}

/// Static `[[targets]]` when present, otherwise the store's `servers` table
pub fn build_inventory(settings: &Settings, store: &Arc<SqliteStore>) -> Arc<dyn Inventory> {
    static_inventory(settings).unwrap_or_else(|| Arc::clone(store) as Arc<dyn Inventory>)
}

/// Log notifier for dry runs, SMTP otherwise
pub fn build_notifier(settings: &Settings, dry_run: bool) -> Result<Arc<dyn Notifier>, CliError> {
    if dry_run {
        return Ok(Arc::new(LogNotifier::new()));
    }
    let notifier =
        SmtpNotifier::from_settings(&settings.smtp).map_err(|e| CliError::Notify(e.to_string()))?;
    Ok(Arc::new(notifier))
}

/// Truncates `text` to `max` characters, marking the cut with `~`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
