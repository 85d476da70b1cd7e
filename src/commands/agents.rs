use colored::*;
use eyre::Result;

use super::{open_store, print_structured};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::history::AgentLabel;
use crate::history::store::HistoryBackend;

pub fn run(user_id: &str, format: Option<OutputFormat>, config: &Config) -> Result<()> {
    let history = open_store(config).load(user_id)?;
    let agents: Vec<AgentLabel> = history.agents().into_iter().collect();

    if print_structured(&agents, OutputFormat::resolve(format))? {
        return Ok(());
    }

    println!("{} {}", "Agents used for".bold(), user_id.bold());
    println!();

    if agents.is_empty() {
        println!("  {}", "(no tagged messages)".dimmed());
    } else {
        for agent in &agents {
            println!("  {}", agent.as_str().cyan());
        }
    }

    let untagged = history.untagged_count();
    if untagged > 0 {
        println!();
        println!(
            "  {} {} untagged assistant messages (run `chattag backfill {}`)",
            "!".yellow(),
            untagged,
            user_id
        );
    }

    Ok(())
}
