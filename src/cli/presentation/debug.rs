//! Debug presentation: credential resolution and fetched block previews.

use crate::api::Observation;
use crate::config::{KeySource, ResolvedLetta};
use crate::source::mask_key;

const PREVIEW_CHARS: usize = 60;

fn preview(content: &str) -> String {
    let flat = content.replace('\n', "\\n");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let head: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

pub fn format_debug_report(
    agent_id: &str,
    letta: &ResolvedLetta,
    blocks: &[Observation],
) -> String {
    let mut output = format!("Agent: {}\nBase URL: {}\n", agent_id, letta.base_url);
    match &letta.api_key {
        Some((key, source)) => {
            output.push_str(&format!("API Key: {} (from {})\n", mask_key(key), source));
            if *source == KeySource::LettaSettings {
                output.push_str("  Note: set LETTA_API_KEY to override the Letta CLI key\n");
            }
        }
        None => output.push_str("API Key: not found\n"),
    }
    output.push_str(&format!("Timeout: {}s\n", letta.timeout_secs));

    if blocks.is_empty() {
        output.push_str("\nNo blocks fetched.");
        return output;
    }
    output.push_str(&format!("\nBlocks ({}):\n", blocks.len()));
    for block in blocks {
        output.push_str(&format!(
            "  {:<20} {:>6} chars  {}\n",
            block.name,
            block.content.chars().count(),
            preview(&block.content)
        ));
    }
    output.trim_end().to_string()
}
