//! Agent labels
//!
//! The closed set of logical agents an assistant message can be attributed to.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Logical agent that produced an assistant message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentLabel {
    AssistantInicial,
    AssistantGeral,
    EmprestimoAgent,
    AnaliseRiscoAgent,
    WebSearchAgent,
    FileSearchAgent,
    Guardrail,
    AssistantErro,
}

impl AgentLabel {
    /// Every label, in declaration order
    pub const ALL: [AgentLabel; 8] = [
        AgentLabel::AssistantInicial,
        AgentLabel::AssistantGeral,
        AgentLabel::EmprestimoAgent,
        AgentLabel::AnaliseRiscoAgent,
        AgentLabel::WebSearchAgent,
        AgentLabel::FileSearchAgent,
        AgentLabel::Guardrail,
        AgentLabel::AssistantErro,
    ];

    /// Stored name of this label
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentLabel::AssistantInicial => "assistant_inicial",
            AgentLabel::AssistantGeral => "assistant_geral",
            AgentLabel::EmprestimoAgent => "emprestimo_agent",
            AgentLabel::AnaliseRiscoAgent => "analise_risco_agent",
            AgentLabel::WebSearchAgent => "web_search_agent",
            AgentLabel::FileSearchAgent => "file_search_agent",
            AgentLabel::Guardrail => "guardrail",
            AgentLabel::AssistantErro => "assistant_erro",
        }
    }

    /// Whether the keyword classifier can ever assign this label.
    ///
    /// Risk analysis, guardrail blocks and error replies are only ever tagged by
    /// the component that produced them.
    pub fn is_backfillable(&self) -> bool {
        !matches!(
            self,
            AgentLabel::AnaliseRiscoAgent | AgentLabel::Guardrail | AgentLabel::AssistantErro
        )
    }
}

impl fmt::Display for AgentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Labels sort by name so listings and map keys are deterministic.
impl Ord for AgentLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for AgentLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Error returned when parsing a name outside the label set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAgent(pub String);

impl fmt::Display for UnknownAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid: Vec<&str> = AgentLabel::ALL.iter().map(|l| l.as_str()).collect();
        write!(f, "unknown agent '{}' (expected one of: {})", self.0, valid.join(", "))
    }
}

impl std::error::Error for UnknownAgent {}

impl FromStr for AgentLabel {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        AgentLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == name)
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}
