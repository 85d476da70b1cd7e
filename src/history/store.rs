//! History persistence
//!
//! One JSON array per user: `<history_dir>/<user_id>.json`

use eyre::{Context, Result};
use lazy_regex::regex_is_match;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::History;

/// Whole-history persistence for user ids
pub trait HistoryBackend {
    /// Full history for `user_id`; empty when nothing is stored
    fn load(&self, user_id: &str) -> Result<History>;

    /// Replace the stored history for `user_id`
    fn save(&self, user_id: &str, history: &History) -> Result<()>;

    /// Every user id with a stored history, sorted
    fn users(&self) -> Result<Vec<String>>;
}

/// File-backed history store
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, user_id: &str) -> Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.base_path.join(format!("{}.json", user_id)))
    }
}

impl HistoryBackend for FileStore {
    fn load(&self, user_id: &str) -> Result<History> {
        let path = self.path_for(user_id)?;
        if !path.exists() {
            log::debug!("No history for {} at {}", user_id, path.display());
            return Ok(History::new());
        }

        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read history file {}", path.display()))?;
        let history: History = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history file {}", path.display()))?;

        log::info!("Loaded {} messages for {} from {}", history.len(), user_id, path.display());
        Ok(history)
    }

    fn save(&self, user_id: &str, history: &History) -> Result<()> {
        let path = self.path_for(user_id)?;
        fs::create_dir_all(&self.base_path).context("Failed to create history directory")?;

        let json = serde_json::to_string_pretty(history).context("Failed to serialize history")?;

        // Write beside the target and rename so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(&self.base_path).context("Failed to create temp file")?;
        tmp.write_all(json.as_bytes()).context("Failed to write history")?;
        tmp.write_all(b"\n").context("Failed to write history")?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace history file {}", path.display()))?;

        log::info!("Saved {} messages for {} to {}", history.len(), user_id, path.display());
        Ok(())
    }

    fn users(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        for entry in WalkDir::new(&self.base_path).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read history directory")?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_user_id(stem).is_ok()
            {
                users.push(stem.to_string());
            }
        }
        users.sort();
        Ok(users)
    }
}

/// Reject ids that could resolve outside the history directory
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id == "." || user_id == ".." || !regex_is_match!(r"^[A-Za-z0-9._-]+$", user_id) {
        eyre::bail!("Invalid user id: '{}' (allowed: letters, digits, '.', '_', '-')", user_id);
    }
    Ok(())
}
