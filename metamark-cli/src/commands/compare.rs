//! Compare command implementation.

use std::path::PathBuf;

use anyhow::{bail, Result};
use colored::Colorize;
use metamark_core::compare;
use tracing::{info, warn};

use crate::utils::{display_value, ensure_input_exists};

/// Execute the compare command.
pub fn execute(original: PathBuf, suspect: PathBuf, json: bool, quiet: bool) -> Result<()> {
    ensure_input_exists(&original)?;
    ensure_input_exists(&suspect)?;

    let report = compare(&original, &suspect);
    info!(
        original = %original.display(),
        suspect = %suspect.display(),
        differences = report.entries.len(),
        "Compared metadata"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.has_differences() {
        if !quiet && !json {
            println!();
            println!("{}", "╔════════════════════════════════════════╗".green());
            println!(
                "{}",
                "║             METADATA MATCH             ║".green().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".green());
            println!();
            println!("   {} {}", "Original:".dimmed(), original.display());
            println!("   {} {}", "Suspect:".dimmed(), suspect.display());
        }
        return Ok(());
    }

    warn!(differences = report.entries.len(), "Metadata differs");
    if !quiet && !json {
        println!();
        println!("{}", "╔════════════════════════════════════════╗".red());
        println!(
            "{}",
            "║            METADATA DIFFERS            ║".red().bold()
        );
        println!("{}", "╚════════════════════════════════════════╝".red());
        println!();
        println!("   {} {}", "Original:".dimmed(), original.display());
        println!("   {} {}", "Suspect:".dimmed(), suspect.display());
        for entry in &report.entries {
            println!();
            println!(
                "   {} {}",
                format!("{}:", entry.field).red().bold(),
                entry.explanation()
            );
            println!(
                "      {} {}",
                "original:".dimmed(),
                rendered(entry.original.as_deref())
            );
            println!(
                "      {} {}",
                "suspect:".dimmed(),
                rendered(entry.suspect.as_deref())
            );
        }
    }

    bail!(
        "comparison found {} differing {}",
        report.entries.len(),
        if report.entries.len() == 1 {
            "field"
        } else {
            "fields"
        }
    )
}

fn rendered(value: Option<&str>) -> String {
    match value {
        Some(value) => display_value(value),
        None => "(absent)".to_string(),
    }
}
