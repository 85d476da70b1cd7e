use colored::*;
use eyre::{Context, Result};
use std::path::Path;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config_path: Option<&Path>, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config_path, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "chattag Configuration".bold());
            println!();

            println!("{}:", "paths".cyan());
            println!("  history: {}", config.paths.history.display());
            println!();

            println!("{}:", "history".cyan());
            println!("  per_agent_limit: {}", config.history.per_agent_limit);
            println!("  preview_chars: {}", config.history.preview_chars);
            println!();

            println!("{}: {}", "log_level".cyan(), config.log_level.as_filter());
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "paths.history" => Some(config.paths.history.display().to_string()),
        "history.per_agent_limit" => Some(config.history.per_agent_limit.to_string()),
        "history.preview_chars" => Some(config.history.preview_chars.to_string()),
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}

/// Apply `key = value` to a copy of `config`
fn apply(key: &str, value: &str, config: &Config) -> Result<Config> {
    let mut new_config = config.clone();

    match key {
        "paths.history" => new_config.paths.history = value.into(),
        "history.per_agent_limit" => {
            new_config.history.per_agent_limit = value.parse().context("Invalid number")?;
        }
        "history.preview_chars" => {
            new_config.history.preview_chars = value.parse().context("Invalid number")?;
        }
        "log_level" | "log-level" => new_config.log_level = value.parse()?,
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }

    new_config.validate()?;
    Ok(new_config)
}

fn set(key: &str, value: &str, config_path: Option<&Path>, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let new_config = apply(key, value, config)?;

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_config_path);
    new_config.save_to_file(&path)?;

    println!("  {} Saved to {}", "✓".green(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_apply_limit() {
        let config = apply("history.per_agent_limit", "8", &Config::default()).unwrap();
        assert_eq!(config.history.per_agent_limit, 8);
    }

    #[test]
    fn test_apply_zero_limit_rejected() {
        assert!(apply("history.per_agent_limit", "0", &Config::default()).is_err());
    }

    #[test]
    fn test_apply_log_level() {
        let config = apply("log_level", "debug", &Config::default()).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_apply_unknown_key() {
        assert!(apply("paths.plugins", "/x", &Config::default()).is_err());
    }

    #[test]
    fn test_lookup() {
        let config = Config::default();
        assert_eq!(lookup("history.preview_chars", &config).as_deref(), Some("100"));
        assert!(lookup("nope", &config).is_none());
    }
}
