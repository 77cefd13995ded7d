//! CLI parse: clap types for memlog. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// memlog - version history for Letta memory blocks
///
/// Without a subcommand, memlog runs as a post-tool-use hook and reads the
/// hook event from stdin.
#[derive(Parser)]
#[command(name = "memlog")]
#[command(about = "Patch-based version history for Letta memory blocks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tracked memory blocks
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the current content of a block
    Show {
        /// Block name
        name: String,
    },
    /// Browse the version history of a block
    History {
        /// Block name (prompted for when omitted in a terminal)
        name: Option<String>,
        /// Print every version instead of opening the interactive viewer
        #[arg(long)]
        plain: bool,
        /// Output format for plain mode (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Record one observation of a block from a file or stdin
    Record {
        /// Block name
        name: String,
        /// Read content from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Block description stored with the snapshot
        #[arg(long)]
        description: Option<String>,
    },
    /// Fetch and record every block of an agent
    Sync {
        /// Letta agent id
        agent_id: String,
    },
    /// Run as a post-tool-use hook (reads the event from stdin)
    Hook,
    /// Show credential resolution and a preview of an agent's blocks
    Debug {
        /// Letta agent id
        agent_id: String,
    },
}
