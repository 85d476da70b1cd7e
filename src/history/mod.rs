//! Chat history records and agent queries
//!
//! A history is the ordered list of messages exchanged with one user. Assistant
//! messages may carry an `agent` tag; every query here looks only at tagged
//! assistant messages.
//!
//! Stored shape: `[{"role": "assistant", "content": "...", "agent": "emprestimo_agent"}, ...]`

pub mod classify;
pub mod label;
pub mod store;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use label::AgentLabel;

/// Who wrote a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Any other role (e.g. `tool`), kept verbatim and ignored by every query
    #[serde(untagged)]
    Other(String),
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentLabel>,
    /// Any other stored fields, kept so rewrites don't drop them
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            agent: None,
            extra: IndexMap::new(),
        }
    }

    #[cfg(test)]
    pub fn system(content: &str) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant message, tagged or not
    pub fn assistant(content: &str, agent: Option<AgentLabel>) -> Self {
        Self {
            agent,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Agent tag of an assistant message; `None` for other roles
    pub fn tag(&self) -> Option<AgentLabel> {
        match self.role {
            Role::Assistant => self.agent,
            _ => None,
        }
    }

    /// Assistant message still waiting for a tag
    pub fn needs_tag(&self) -> bool {
        self.role == Role::Assistant && self.agent.is_none()
    }
}

/// Summary of one agent's activity in a history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub agent: AgentLabel,
    pub total_messages: usize,
    pub recent_messages: usize,
    pub limit: usize,
    pub first_message: Option<String>,
    pub last_message: Option<String>,
}

/// Ordered message history for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    messages: Vec<Message>,
}

impl From<Vec<Message>> for History {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn tagged(&self) -> impl Iterator<Item = (AgentLabel, &Message)> {
        self.messages.iter().filter_map(|m| m.tag().map(|agent| (agent, m)))
    }

    /// Assistant messages tagged with `agent`, in order
    pub fn by_agent(&self, agent: AgentLabel) -> Vec<&Message> {
        self.tagged().filter(|(a, _)| *a == agent).map(|(_, m)| m).collect()
    }

    /// Messages tagged with `agent` whose content matches `pattern`
    pub fn search(&self, agent: AgentLabel, pattern: &Regex) -> Vec<&Message> {
        self.by_agent(agent)
            .into_iter()
            .filter(|m| pattern.is_match(&m.content))
            .collect()
    }

    /// Last `limit` messages tagged with `agent`
    pub fn recent_by_agent(&self, agent: AgentLabel, limit: usize) -> Vec<&Message> {
        let messages = self.by_agent(agent);
        let skip = messages.len().saturating_sub(limit);
        messages.into_iter().skip(skip).collect()
    }

    /// Distinct agents present in the history
    pub fn agents(&self) -> BTreeSet<AgentLabel> {
        self.tagged().map(|(agent, _)| agent).collect()
    }

    /// Number of tagged assistant messages per agent
    pub fn stats(&self) -> BTreeMap<AgentLabel, usize> {
        let mut stats = BTreeMap::new();
        for (agent, _) in self.tagged() {
            *stats.entry(agent).or_insert(0) += 1;
        }
        stats
    }

    pub fn untagged_count(&self) -> usize {
        self.messages.iter().filter(|m| m.needs_tag()).count()
    }

    /// Totals plus previews of the recent window for one agent
    pub fn agent_summary(&self, agent: AgentLabel, limit: usize, preview_chars: usize) -> AgentSummary {
        let recent = self.recent_by_agent(agent, limit);

        AgentSummary {
            agent,
            total_messages: self.by_agent(agent).len(),
            recent_messages: recent.len(),
            limit,
            first_message: recent.first().map(|m| preview(&m.content, preview_chars)),
            last_message: recent.last().map(|m| preview(&m.content, preview_chars)),
        }
    }

    /// Prompt context for answering `question` as `agent`.
    ///
    /// System messages first, then each of the agent's last `limit` replies preceded
    /// by the user message that prompted it, then the new question. Replies with no
    /// user message directly before them are left out.
    pub fn context_for_agent(&self, agent: AgentLabel, question: &str, limit: usize) -> Vec<Message> {
        let mut context: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .cloned()
            .collect();

        let positions: Vec<usize> = self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.tag() == Some(agent))
            .map(|(i, _)| i)
            .collect();
        let skip = positions.len().saturating_sub(limit);

        for &i in positions.iter().skip(skip) {
            if i > 0 && self.messages[i - 1].role == Role::User {
                context.push(self.messages[i - 1].clone());
                context.push(self.messages[i].clone());
            }
        }

        context.push(Message::user(question));
        context
    }
}

/// First `max_chars` characters of `s`, with an ellipsis when cut
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
