//! Block presentation: list table and sync summaries.

use crate::api::{BlockSummary, SyncSummary};
use comfy_table::Table;
use serde_json::json;

pub fn format_block_list_text(blocks: &[BlockSummary]) -> String {
    if blocks.is_empty() {
        return "No memory blocks tracked yet.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Block", "Size", "History", "Updated"]);
    for block in blocks {
        table.add_row(vec![
            block.name.clone(),
            format!("{} chars", block.size),
            format!("{} change(s)", block.history_count),
            block.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_block_list_json(blocks: &[BlockSummary]) -> String {
    let out = json!({ "blocks": blocks, "total": blocks.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_sync_summary(agent_id: &str, summary: &SyncSummary) -> String {
    let observed = summary.initialized + summary.unchanged + summary.recorded + summary.failed;
    if observed == 0 {
        return format!("No blocks observed for agent '{}'.", agent_id);
    }
    let mut output = format!(
        "Agent '{}': {} new, {} changed, {} unchanged",
        agent_id, summary.initialized, summary.recorded, summary.unchanged
    );
    if summary.failed > 0 {
        output.push_str(&format!(", {} failed (see log)", summary.failed));
    }
    output
}
