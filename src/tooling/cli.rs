//! CLI Tooling
//!
//! Command-line interface over a single store root.

use crate::config::{ConfigLoader, StoreConfig};
use crate::error::{Result, StoreError};
use crate::metadata::MetaKey;
use crate::snapshot::TreeSnapshot;
use crate::store::Store;
use crate::tooling::format::{format_children_json, format_children_table, format_value};
use crate::value::Value;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Pathstore CLI - inspect and edit a path-addressed document store
#[derive(Parser)]
#[command(name = "pathstore")]
#[command(about = "Inspect and edit a path-addressed, filesystem-backed document store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store root directory (overrides configuration)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the value at a path
    Get {
        path: String,
        /// Fail when the value is missing or undecodable
        #[arg(long)]
        strict: bool,
        /// Value printed when the path is missing
        #[arg(long)]
        default: Option<String>,
    },
    /// Write a value at a path
    Set {
        path: String,
        value: String,
        /// Parse the value as JSON and store it as a structured literal
        #[arg(long)]
        json: bool,
    },
    /// Append text to the value at a path
    Push { path: String, text: String },
    /// Delete a node
    Rm {
        path: String,
        /// Leave the metadata side file in place
        #[arg(long)]
        keep_metadata: bool,
    },
    /// Create a directory
    Mkdir { path: String },
    /// List the children of a directory
    Ls {
        #[arg(default_value = "")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Read or edit node metadata
    Meta {
        #[command(subcommand)]
        command: MetaCommands,
    },
    /// Print a snapshot of a subtree as JSON
    Export {
        #[arg(default_value = "")]
        path: String,
    },
    /// Merge a snapshot JSON file into a path
    Import { path: String, file: PathBuf },
    /// Reset a directory, optionally keeping named children
    Clear {
        path: String,
        /// Child names to keep
        #[arg(long = "keep")]
        keep: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum MetaCommands {
    /// Print metadata (whole document when no key is given)
    Get {
        path: String,
        #[arg(default_value = "")]
        key: String,
    },
    /// Set a metadata key
    Set {
        path: String,
        key: String,
        value: String,
        /// Parse the value as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a metadata key
    Delete { path: String, key: String },
}

/// CLI context holding the opened store
pub struct CliContext {
    store: Store,
}

impl CliContext {
    /// Load configuration from `config_path` (when given) and the environment.
    pub fn load_config(config_path: Option<&Path>) -> Result<StoreConfig> {
        ConfigLoader::load(config_path)
    }

    /// Open the store described by `config`, with an optional root override.
    pub fn new(mut config: StoreConfig, root: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = root {
            config.root = root;
        }
        let store = Store::from_config(&config)?;
        info!(root = %store.root().display(), "cli context ready");
        Ok(Self { store })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Execute a CLI command, returning the text to print.
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Get {
                path,
                strict,
                default,
            } => {
                let node = self.store.node(path)?;
                let value = if *strict {
                    node.value_or_fail()?
                } else {
                    match (node.value_opt(), default) {
                        (Some(value), _) => value,
                        (None, Some(default)) => Value::from(default.as_str()),
                        (None, None) => return Ok(String::new()),
                    }
                };
                Ok(format_value(&value))
            }
            Commands::Set { path, value, json } => {
                let value = parse_value(value, *json)?;
                self.store.node(path)?.set_value(value)?;
                Ok(format!("Set {}", display_path(path)))
            }
            Commands::Push { path, text } => {
                self.store.node(path)?.push_value(text)?;
                Ok(format!("Appended to {}", display_path(path)))
            }
            Commands::Rm {
                path,
                keep_metadata,
            } => {
                self.store.node(path)?.delete(!keep_metadata)?;
                Ok(format!("Deleted {}", display_path(path)))
            }
            Commands::Mkdir { path } => {
                self.store.node(path)?.make_directory()?;
                Ok(format!("Created {}", display_path(path)))
            }
            Commands::Ls { path, format } => {
                let rows: Vec<_> = self
                    .store
                    .node(path)?
                    .list_children()?
                    .into_iter()
                    .map(|child| (child.name().to_string(), child.kind()))
                    .collect();
                match format.as_str() {
                    "json" => Ok(format_children_json(&rows)),
                    "text" => Ok(format_children_table(&rows)),
                    other => Err(StoreError::ConfigError(format!(
                        "Invalid format: {} (must be 'text' or 'json')",
                        other
                    ))),
                }
            }
            Commands::Meta { command } => self.execute_meta(command),
            Commands::Export { path } => {
                let snapshot = self.store.node(path)?.extract()?.ok_or_else(|| {
                    StoreError::missing(display_path(path), "node does not exist")
                })?;
                Ok(serde_json::to_string_pretty(&snapshot)?)
            }
            Commands::Import { path, file } => {
                let content = std::fs::read_to_string(file)?;
                let snapshot: TreeSnapshot = serde_json::from_str(&content)?;
                let count = snapshot.node_count();
                self.store.node(path)?.merge(snapshot)?;
                Ok(format!(
                    "Merged {} node(s) into {}",
                    count,
                    display_path(path)
                ))
            }
            Commands::Clear { path, keep } => {
                let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
                self.store.node(path)?.clear(&keep)?;
                Ok(format!("Cleared {}", display_path(path)))
            }
        }
    }

    fn execute_meta(&self, command: &MetaCommands) -> Result<String> {
        match command {
            MetaCommands::Get { path, key } => {
                let mut metadata = self.store.node(path)?.metadata();
                let key = MetaKey::parse(key);
                let value = if key.is_root() {
                    Some(serde_json::Value::Object(metadata.all()))
                } else {
                    metadata.read(&key)
                };
                match value {
                    Some(value) => Ok(serde_json::to_string_pretty(&value)?),
                    None => Ok(String::new()),
                }
            }
            MetaCommands::Set {
                path,
                key,
                value,
                json,
            } => {
                let value = parse_value(value, *json)?.into_json();
                self.store
                    .node(path)?
                    .metadata()
                    .set(&MetaKey::parse(key), value)?;
                Ok(format!("Set {} on {}", key, display_path(path)))
            }
            MetaCommands::Delete { path, key } => {
                let removed = self
                    .store
                    .node(path)?
                    .metadata()
                    .delete(&MetaKey::parse(key))?;
                Ok(if removed {
                    format!("Deleted {} on {}", key, display_path(path))
                } else {
                    format!("No key {} on {}", key, display_path(path))
                })
            }
        }
    }
}

fn parse_value(raw: &str, json: bool) -> Result<Value> {
    if json {
        let parsed: serde_json::Value = serde_json::from_str(raw)?;
        Ok(Value::from(parsed))
    } else {
        Ok(Value::from(raw))
    }
}

fn display_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
