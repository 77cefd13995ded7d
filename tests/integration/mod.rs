//! Integration tests for memlog

mod cli_commands;
mod config_integration;
mod hook_cli;
mod persistence_layout;
mod scenarios;
mod test_utils;

pub use test_utils::with_xdg_env;
