use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main chattag configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub history: HistoryConfig,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `<user_id>.json` histories
    pub history: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// How many of an agent's latest messages make up its recent window
    pub per_agent_limit: usize,
    /// Characters kept when previewing message content
    pub preview_chars: usize,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            _ => eyre::bail!("Invalid log level: {} (use trace, debug, info, warn, error or off)", s),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            history: Config::app_dir().join("chat_history"),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            per_agent_limit: 5,
            preview_chars: 100,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check CHATTAG_CONFIG env var
        if let Ok(env_path) = std::env::var("CHATTAG_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from CHATTAG_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try CHATTAG_DIR/chattag.yaml, then ~/.config/chattag/chattag.yaml
        let mut candidates = Vec::new();
        if let Ok(app_dir) = std::env::var("CHATTAG_DIR") {
            candidates.push(PathBuf::from(app_dir).join("chattag.yaml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("chattag").join("chattag.yaml"));
        }
        // ./chattag.yaml (for development)
        candidates.push(PathBuf::from("chattag.yaml"));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Check values that serde alone can't constrain
    pub fn validate(&self) -> Result<()> {
        if self.history.per_agent_limit == 0 {
            eyre::bail!("history.per_agent_limit must be greater than zero");
        }
        Ok(())
    }

    /// Write this configuration as YAML
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, yaml).with_context(|| format!("Failed to write config to {}", path.display()))?;
        log::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Where `config set` writes when no explicit path is given
    pub fn default_config_path() -> PathBuf {
        std::env::var("CHATTAG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::app_dir().join("chattag.yaml"))
    }

    /// Get the chattag directory (config and default history location)
    pub fn app_dir() -> PathBuf {
        std::env::var("CHATTAG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("chattag"))
    }

    /// Directory for log files
    pub fn log_dir() -> PathBuf {
        match std::env::var("CHATTAG_DIR") {
            Ok(dir) => PathBuf::from(dir).join("logs"),
            Err(_) => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("chattag")
                .join("logs"),
        }
    }

    /// History directory with ~ and env vars expanded
    pub fn history_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.history)
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
