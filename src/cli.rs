use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::history::AgentLabel;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "chattag",
    about = "Agent tags for chat histories - query, count and backfill",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: $CHATTAG_DIR/logs/chattag.log when CHATTAG_DIR is set,\notherwise ~/.local/share/chattag/logs/chattag.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to chattag.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List a user's messages from one agent
    Messages {
        /// User identifier (history file name)
        user_id: String,

        /// Agent label
        #[arg(long, short = 'a')]
        agent: AgentLabel,

        /// Only the last N messages
        #[arg(long)]
        last: Option<usize>,

        /// Only messages whose content matches this regex
        #[arg(long)]
        grep: Option<String>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// List the agents that have answered a user
    Agents {
        /// User identifier
        user_id: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Count a user's messages per agent
    Stats {
        /// User identifier
        user_id: String,

        /// Summarize a single agent instead
        #[arg(long, short = 'a')]
        agent: Option<AgentLabel>,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Tag untagged assistant messages by keyword
    Backfill {
        /// Users to backfill
        user_ids: Vec<String>,

        /// Backfill every stored history
        #[arg(long, conflicts_with = "user_ids")]
        all: bool,

        /// Show what would be tagged without saving
        #[arg(long)]
        dry_run: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show which agent the classifier assigns to some text
    Classify {
        /// Text to classify (reads stdin when omitted)
        text: Vec<String>,
    },

    /// Build the prompt context for an agent answering a new question
    Context {
        /// User identifier
        user_id: String,

        /// Agent label
        #[arg(long, short = 'a')]
        agent: AgentLabel,

        /// The new user question
        question: String,

        /// How many of the agent's latest replies to include (default: from config)
        #[arg(long)]
        last: Option<usize>,
    },

    /// List every agent label
    Labels,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Key (e.g. paths.history)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Key (e.g. history.per_agent_limit)
        key: String,

        /// Value
        value: String,
    },
}
