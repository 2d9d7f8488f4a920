//! Command handlers, one module per subcommand.

mod history;
mod init_db;
mod parse;
mod run;
mod targets;
mod threshold;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::error::CliError;
use crate::util::{init_logging, load_settings};

/// Dispatches a parsed command line; no subcommand means `run`
pub fn dispatch(cli: &Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(&settings, cli.verbose, cli.quiet);

    match &cli.command {
        None => run::cmd_run(settings, false, OutputFormat::Table),
        Some(Commands::Run { dry_run, format }) => run::cmd_run(settings, *dry_run, *format),
        Some(Commands::Targets { format }) => targets::cmd_targets(&settings, *format),
        Some(Commands::Parse {
            file,
            strict,
            format,
        }) => parse::cmd_parse(&settings, file.as_deref(), *strict, *format),
        Some(Commands::Threshold { date }) => {
            threshold::cmd_threshold(&settings, *date);
            Ok(())
        }
        Some(Commands::History {
            server_id,
            days,
            format,
        }) => history::cmd_history(&settings, *server_id, *days, *format),
        Some(Commands::InitDb) => init_db::cmd_init_db(&settings),
    }
}
