use colored::*;
use eyre::{Context, Result};
use std::io::Read;

use crate::history::AgentLabel;
use crate::history::classify::classify;

pub fn run(text: &[String]) -> Result<()> {
    let content = if text.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        text.join(" ")
    };

    let agent = classify(&content);
    log::debug!("Classified {} chars as {}", content.chars().count(), agent);
    println!("{}", agent);
    Ok(())
}

pub fn labels() -> Result<()> {
    for agent in AgentLabel::ALL {
        let note = if agent.is_backfillable() {
            String::new()
        } else {
            "(assigned by its producer only)".dimmed().to_string()
        };
        println!("{:22} {}", agent.as_str(), note);
    }
    Ok(())
}
