//! History presentation: version pages, plain dumps and colored patches.

use crate::history::Version;
use crate::patch::{serialize, Patch};
use owo_colors::OwoColorize;
use serde_json::json;

/// Key help shown under every page of the interactive viewer.
pub const NAVIGATION_HELP: &str =
    "[<-/p] previous  [->/n] next  [g] first  [G] last  [d] diff  [q] quit";

/// Unified-diff text of `patch`, one color per line kind when `color` is set.
pub fn render_patch(patch: &Patch, color: bool) -> String {
    if patch.is_empty() {
        return "(no changes)".to_string();
    }
    let text = serialize(patch);
    if !color {
        return text;
    }
    text.lines()
        .map(|line| match line.chars().next() {
            Some('+') => line.green().to_string(),
            Some('-') => line.red().to_string(),
            Some('@') => line.cyan().to_string(),
            Some('\\') => line.dimmed().to_string(),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn version_title(name: &str, versions: &[Version], index: usize) -> String {
    let version = &versions[index];
    format!(
        "{}: version {} of {} ({})",
        name,
        index + 1,
        versions.len(),
        version.timestamp
    )
}

/// One page of the interactive viewer. `index` must be in range.
pub fn format_version_view(name: &str, versions: &[Version], index: usize, color: bool) -> String {
    let title = version_title(name, versions, index);
    let title = if color {
        title.bold().to_string()
    } else {
        title
    };
    let rule = "-".repeat(60);
    format!(
        "{}\n{}\n{}\n{}\n{}",
        title, rule, versions[index].content, rule, NAVIGATION_HELP
    )
}

/// Every version, oldest first, each followed by the patch that produced the
/// next one.
pub fn format_history_text(name: &str, versions: &[Version], color: bool) -> String {
    if versions.len() <= 1 {
        let content = versions.first().map(|v| v.content.as_str()).unwrap_or("");
        return format!("No history for '{}'. Current content:\n\n{}", name, content);
    }

    let mut output = String::new();
    for (index, version) in versions.iter().enumerate() {
        let title = format!("=== {} ===", version_title(name, versions, index));
        let title = if color {
            title.bold().to_string()
        } else {
            title
        };
        output.push_str(&title);
        output.push('\n');
        output.push_str(&version.content);
        if !version.content.ends_with('\n') {
            output.push('\n');
        }
        if let Some(patch) = &version.patch {
            output.push_str("\n--- change to next version ---\n");
            output.push_str(&render_patch(patch, color));
            output.push('\n');
        }
        output.push('\n');
    }
    output.trim_end().to_string()
}

pub fn format_history_json(name: &str, versions: &[Version]) -> String {
    let list: Vec<_> = versions
        .iter()
        .enumerate()
        .map(|(index, version)| {
            json!({
                "index": index,
                "timestamp": version.timestamp.to_string(),
                "current": version.is_current(),
                "content": version.content,
                "patch": version.patch.as_ref().map(serialize),
            })
        })
        .collect();
    let out = json!({ "block": name, "versions": list });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
