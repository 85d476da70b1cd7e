use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;

mod cli;
mod commands;
mod config;
mod history;
mod migrate;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn setup_logging(log_level: LogLevel) -> Result<()> {
    let log_dir = Config::log_dir();

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("chattag.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.to_level_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let config_path = cli.config.clone();
    match cli.command {
        Commands::Messages {
            user_id,
            agent,
            last,
            grep,
            format,
        } => commands::messages::run(&user_id, agent, last, grep.as_deref(), format, &config),
        Commands::Agents { user_id, format } => commands::agents::run(&user_id, format, &config),
        Commands::Stats { user_id, agent, format } => commands::stats::run(&user_id, agent, format, &config),
        Commands::Backfill {
            user_ids,
            all,
            dry_run,
            format,
        } => commands::backfill::run(user_ids, all, dry_run, format, cli.quiet, &config),
        Commands::Classify { text } => commands::classify::run(&text),
        Commands::Context {
            user_id,
            agent,
            question,
            last,
        } => commands::context::run(&user_id, agent, &question, last, &config),
        Commands::Labels => commands::classify::labels(),
        Commands::Config { action } => commands::config::run(action, config_path.as_deref(), &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let log_level = if cli.verbose { LogLevel::Debug } else { config.log_level };
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("Starting chattag with config from: {:?}", cli.config);

    // Run the command
    run(cli, config).context("Command failed")?;

    Ok(())
}
