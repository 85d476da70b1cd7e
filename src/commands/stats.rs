use colored::*;
use eyre::Result;
use std::collections::BTreeMap;

use super::{open_store, print_structured};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::history::store::HistoryBackend;
use crate::history::{AgentLabel, AgentSummary};

pub fn run(user_id: &str, agent: Option<AgentLabel>, format: Option<OutputFormat>, config: &Config) -> Result<()> {
    let history = open_store(config).load(user_id)?;
    let format = OutputFormat::resolve(format);

    match agent {
        Some(agent) => {
            let summary = history.agent_summary(agent, config.history.per_agent_limit, config.history.preview_chars);
            if !print_structured(&summary, format)? {
                print_summary(user_id, &summary);
            }
        }
        None => {
            let stats = history.stats();
            if !print_structured(&stats, format)? {
                print_counts(user_id, &stats, history.untagged_count());
            }
        }
    }

    Ok(())
}

/// Counts sorted by frequency, then name
fn ranked(stats: &BTreeMap<AgentLabel, usize>) -> Vec<(AgentLabel, usize)> {
    let mut ranked: Vec<(AgentLabel, usize)> = stats.iter().map(|(a, c)| (*a, *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

fn print_counts(user_id: &str, stats: &BTreeMap<AgentLabel, usize>, untagged: usize) {
    println!("{} {}", "Agent usage for".bold(), user_id.bold());
    println!();

    if stats.is_empty() {
        println!("  {}", "(no tagged messages)".dimmed());
    } else {
        for (agent, count) in ranked(stats) {
            println!("  {:22} {}", agent.as_str().cyan(), count);
        }
        println!();
        println!("  {:22} {}", "total".bold(), stats.values().sum::<usize>());
    }

    if untagged > 0 {
        println!("  {:22} {}", "untagged".yellow(), untagged);
    }
}

fn print_summary(user_id: &str, summary: &AgentSummary) {
    println!("{} {} {}", summary.agent.as_str().cyan().bold(), "for".bold(), user_id.bold());
    println!();
    println!("  total messages:  {}", summary.total_messages);
    println!("  recent messages: {} (limit {})", summary.recent_messages, summary.limit);
    if let Some(first) = &summary.first_message {
        println!("  first recent:    {}", first.dimmed());
    }
    if let Some(last) = &summary.last_message {
        println!("  last recent:     {}", last.dimmed());
    }
}
