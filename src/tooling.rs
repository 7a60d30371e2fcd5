//! Tooling & Integration Layer
//!
//! Command-line access to a store for inspection and maintenance: reading and
//! writing values, editing metadata, and exporting or importing subtrees as
//! snapshot JSON.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, MetaCommands};
