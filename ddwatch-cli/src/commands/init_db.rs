//! Database bootstrap.

use ddwatch_core::config::Settings;

use crate::error::CliError;
use crate::util::open_store;

/// Creates the schema and copies `[[targets]]` into the `servers` table
pub fn cmd_init_db(settings: &Settings) -> Result<(), CliError> {
    let path = settings.store.resolved_path()?;
    let store = open_store(settings)?;
    for target in &settings.targets {
        store.upsert_server(target)?;
    }
    println!(
        "Initialized {} with {} target(s)",
        path.display(),
        settings.targets.len()
    );
    Ok(())
}
