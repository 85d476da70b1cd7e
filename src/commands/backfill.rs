use colored::*;
use eyre::Result;

use super::{open_store, print_structured};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::history::store::HistoryBackend;
use crate::migrate::{BackfillOutcome, run_backfill};

pub fn run(
    user_ids: Vec<String>,
    all: bool,
    dry_run: bool,
    format: Option<OutputFormat>,
    quiet: bool,
    config: &Config,
) -> Result<()> {
    let store = open_store(config);

    let users = if all { store.users()? } else { user_ids };
    if users.is_empty() {
        eyre::bail!("No users to backfill (pass user ids or --all)");
    }

    log::info!("Backfilling {} histories in {}", users.len(), store.base_path().display());
    let outcomes = run_backfill(&store, &users, dry_run);

    if !print_structured(&outcomes, OutputFormat::resolve(format))? && !quiet {
        print_outcomes(&outcomes, dry_run);
    }

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.failed())
        .map(|o| o.user_id.as_str())
        .collect();
    if !failed.is_empty() {
        eyre::bail!("Backfill failed for {} histories: {}", failed.len(), failed.join(", "));
    }

    Ok(())
}

fn print_outcomes(outcomes: &[BackfillOutcome], dry_run: bool) {
    if dry_run {
        println!("{} {}", "[dry-run]".yellow(), "No histories will be modified".dimmed());
        println!();
    }

    let mut total = 0;
    for outcome in outcomes {
        let tagged = outcome.tally.total_tagged();
        total += tagged;

        if let Some(error) = &outcome.error {
            println!("  {} {}: {}", "✗".red(), outcome.user_id.bold(), error.red());
            continue;
        }

        let marker = if outcome.tally.is_noop() {
            "·".dimmed()
        } else if outcome.saved {
            "✓".green()
        } else {
            "→".blue()
        };

        println!(
            "  {} {}: {} tagged, {} already tagged",
            marker,
            outcome.user_id.bold(),
            tagged,
            outcome.tally.already_tagged
        );
        for (agent, count) in &outcome.tally.tagged {
            println!("      {:22} {}", agent.as_str().cyan(), count);
        }
    }

    println!();
    let verb = if dry_run { "would tag" } else { "tagged" };
    println!(
        "{} {} {} messages across {} histories",
        "Done:".bold(),
        verb,
        total,
        outcomes.len()
    );
}
