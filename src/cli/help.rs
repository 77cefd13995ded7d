//! CLI help: stable command names for logging.

use crate::cli::parse::Commands;

/// Command name string for log records (e.g. "list", "history").
pub fn command_name(command: Option<&Commands>) -> &'static str {
    match command {
        None | Some(Commands::Hook) => "hook",
        Some(Commands::List { .. }) => "list",
        Some(Commands::Show { .. }) => "show",
        Some(Commands::History { .. }) => "history",
        Some(Commands::Record { .. }) => "record",
        Some(Commands::Sync { .. }) => "sync",
        Some(Commands::Debug { .. }) => "debug",
    }
}

/// Hook mode must never fail the calling tool.
pub fn is_hook_mode(command: Option<&Commands>) -> bool {
    matches!(command, None | Some(Commands::Hook))
}
