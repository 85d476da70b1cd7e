pub mod agents;
pub mod backfill;
pub mod classify;
pub mod completions;
pub mod config;
pub mod context;
pub mod messages;
pub mod stats;

use eyre::Result;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::history::store::FileStore;

/// History store at the configured location
pub fn open_store(config: &Config) -> FileStore {
    FileStore::new(config.history_dir())
}

/// Print `value` as JSON or YAML; returns false for text so the caller renders it
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => return Ok(false),
    }
    Ok(true)
}

/// Get terminal width, defaulting to 80 if not available
pub fn terminal_width() -> usize {
    terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(80)
}

/// Collapse content onto one line that fits in `width` characters
pub fn one_line(content: &str, width: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    crate::history::preview(&flat, width.saturating_sub(3).max(1))
}
