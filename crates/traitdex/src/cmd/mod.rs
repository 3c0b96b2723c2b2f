//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by thin wrapper binaries.

pub mod check;
pub mod completions;
pub mod format;
pub mod merge;
pub mod query_cmd;
