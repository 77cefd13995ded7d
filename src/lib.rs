//! memlog: Version History for Memory Blocks
//!
//! Records every observed change to a named text block as a unified-diff patch
//! in an append-only log next to a single current snapshot. Any past version is
//! rebuilt on demand by undoing patches from the snapshot backwards.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod hook;
pub mod logging;
pub mod patch;
pub mod source;
pub mod store;
