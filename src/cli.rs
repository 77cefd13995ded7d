//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod history_view;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, is_hook_mode};
pub use history_view::{key_to_event, run_history_view};
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_block_list_json, format_block_list_text, format_debug_report, format_history_json,
    format_history_text, format_sync_summary, format_version_view, render_patch,
};
pub use route::RunContext;
