//! CLI presentation: text and json formatters per command family.

mod blocks;
mod debug;
mod history;

pub use blocks::{format_block_list_json, format_block_list_text, format_sync_summary};
pub use debug::format_debug_report;
pub use history::{
    format_history_json, format_history_text, format_version_view, render_patch,
};
