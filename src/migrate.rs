//! Agent tag backfill
//!
//! Tags historical assistant messages that predate the `agent` field, using the
//! keyword classifier. Messages that already carry a tag are never changed, so
//! running the backfill again is a no-op.

use chrono::{DateTime, Local};
use eyre::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::history::classify::classify;
use crate::history::store::HistoryBackend;
use crate::history::{AgentLabel, History};

/// What a backfill pass did to one history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Newly assigned tags per agent
    pub tagged: BTreeMap<AgentLabel, usize>,
    /// Assistant messages that were already tagged
    pub already_tagged: usize,
}

impl Tally {
    pub fn total_tagged(&self) -> usize {
        self.tagged.values().sum()
    }

    pub fn is_noop(&self) -> bool {
        self.tagged.is_empty()
    }
}

/// Result of backfilling one user's history
#[derive(Debug, Clone, Serialize)]
pub struct BackfillOutcome {
    pub user_id: String,
    pub tally: Tally,
    pub saved: bool,
    pub dry_run: bool,
    /// Why this history could not be loaded or saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: DateTime<Local>,
}

impl BackfillOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Tag every untagged assistant message in place
pub fn backfill(history: &mut History) -> Tally {
    let mut tally = Tally::default();

    for message in history.messages_mut() {
        if message.needs_tag() {
            let agent = classify(&message.content);
            message.agent = Some(agent);
            *tally.tagged.entry(agent).or_insert(0) += 1;
        } else if message.tag().is_some() {
            tally.already_tagged += 1;
        }
    }

    tally
}

/// Backfill the stored histories of `users`
///
/// Histories are only written back when a tag was added and `dry_run` is off.
/// A history that fails to load or save is recorded on its outcome and the
/// remaining users are still processed.
pub fn run_backfill(store: &dyn HistoryBackend, users: &[String], dry_run: bool) -> Vec<BackfillOutcome> {
    let mut outcomes = Vec::new();

    for user_id in users {
        let (tally, saved, error) = match backfill_user(store, user_id, dry_run) {
            Ok((tally, saved)) => {
                log::info!(
                    "Backfill {}{}: {} tagged, {} already tagged",
                    user_id,
                    if dry_run { " [dry-run]" } else { "" },
                    tally.total_tagged(),
                    tally.already_tagged
                );
                (tally, saved, None)
            }
            Err(e) => {
                let message = e.chain().map(|c| c.to_string()).collect::<Vec<_>>().join(": ");
                log::warn!("Backfill {} failed: {}", user_id, message);
                (Tally::default(), false, Some(message))
            }
        };

        outcomes.push(BackfillOutcome {
            user_id: user_id.clone(),
            tally,
            saved,
            dry_run,
            error,
            finished_at: Local::now(),
        });
    }

    outcomes
}

fn backfill_user(store: &dyn HistoryBackend, user_id: &str, dry_run: bool) -> Result<(Tally, bool)> {
    let mut history = store
        .load(user_id)
        .with_context(|| format!("Failed to load history for {}", user_id))?;

    let tally = backfill(&mut history);
    let saved = !dry_run && !tally.is_noop();

    if saved {
        store
            .save(user_id, &history)
            .with_context(|| format!("Failed to save history for {}", user_id))?;
    }

    Ok((tally, saved))
}
