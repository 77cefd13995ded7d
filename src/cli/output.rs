//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::BlockNotFound { name, available } => {
            let mut message = format!("Memory block '{}' not found.", name);
            if !available.is_empty() {
                message.push_str(&format!("\nAvailable blocks: {}", available.join(", ")));
            }
            message
        }
        ApiError::CorruptHistory { name, source } => {
            format!("History is corrupted for block '{}': {}", name, source)
        }
        other if other.is_corruption() => format!("History is corrupted: {}", other),
        other => other.to_string(),
    }
}
