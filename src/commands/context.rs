use eyre::Result;

use super::open_store;
use crate::config::Config;
use crate::history::AgentLabel;
use crate::history::store::HistoryBackend;

pub fn run(user_id: &str, agent: AgentLabel, question: &str, last: Option<usize>, config: &Config) -> Result<()> {
    let limit = last.unwrap_or(config.history.per_agent_limit);
    if limit == 0 {
        eyre::bail!("--last must be greater than zero");
    }

    let history = open_store(config).load(user_id)?;
    if history.is_empty() {
        log::warn!("No history for {}, context holds only the question", user_id);
    }
    let context = history.context_for_agent(agent, question, limit);

    log::info!(
        "Built {} message context for {} ({}, last {})",
        context.len(),
        user_id,
        agent,
        limit
    );

    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}
