use colored::*;
use eyre::{Context, Result};
use regex::Regex;

use super::{one_line, open_store, print_structured, terminal_width};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::history::store::HistoryBackend;
use crate::history::{AgentLabel, Message};

pub fn run(
    user_id: &str,
    agent: AgentLabel,
    last: Option<usize>,
    grep: Option<&str>,
    format: Option<OutputFormat>,
    config: &Config,
) -> Result<()> {
    let history = open_store(config).load(user_id)?;

    let mut messages: Vec<&Message> = match grep {
        Some(pattern) => {
            let regex = Regex::new(pattern).context("Invalid regex pattern")?;
            history.search(agent, &regex)
        }
        None => history.by_agent(agent),
    };

    if let Some(n) = last {
        let skip = messages.len().saturating_sub(n);
        messages.drain(..skip);
    }

    log::debug!("{} messages from {} for {}", messages.len(), agent, user_id);

    if print_structured(&messages, OutputFormat::resolve(format))? {
        return Ok(());
    }

    println!(
        "{} {} messages from {} for {}:",
        "💬".blue(),
        messages.len(),
        agent.as_str().cyan(),
        user_id.bold()
    );
    println!();

    if messages.is_empty() {
        println!("  {}", "(no messages)".dimmed());
        return Ok(());
    }

    let width = terminal_width().saturating_sub(6);
    for (i, message) in messages.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, one_line(&message.content, width));
    }

    Ok(())
}
