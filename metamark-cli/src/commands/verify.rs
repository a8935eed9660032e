//! Verify command implementation.

use std::path::PathBuf;

use anyhow::{bail, Result};
use colored::Colorize;
use metamark_core::{verify, VerificationReport, WatermarkStatus};
use tracing::{info, warn};

use crate::utils::{display_value, ensure_input_exists, print_record};

/// Execute the verify command.
pub fn execute(file: PathBuf, identity: String, json: bool, quiet: bool) -> Result<()> {
    ensure_input_exists(&file)?;

    let report = verify(&file, &identity);
    info!(
        path = %file.display(),
        status = ?report.status,
        missing = report.missing_critical.len(),
        "Checked watermark"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match &report.status {
        WatermarkStatus::Matches => {
            if !quiet && !json {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".green());
                println!(
                    "{}",
                    "║              WATERMARK OK              ║".green().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".green());
                println!();
                println!("   {} {}", "File:".dimmed(), file.display());
                println!("   {} {}", "Watermark:".dimmed(), identity.green());
                print_details(&report);
            }
            Ok(())
        }
        WatermarkStatus::Absent => {
            warn!(path = %file.display(), "No watermark found");
            if !quiet && !json {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".yellow());
                println!(
                    "{}",
                    "║              NO WATERMARK              ║".yellow().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".yellow());
                println!();
                println!("   {} {}", "File:".dimmed(), file.display());
                println!("   {} {}", "Expected:".dimmed(), identity);
                print_details(&report);
            }
            bail!("verification failed: watermark absent")
        }
        WatermarkStatus::Foreign(actual) => {
            warn!(path = %file.display(), found = %actual, "Foreign watermark");
            if !quiet && !json {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".red());
                println!(
                    "{}",
                    "║           FOREIGN WATERMARK            ║".red().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".red());
                println!();
                println!("   {} {}", "File:".dimmed(), file.display());
                println!("   {} {}", "Expected:".dimmed(), identity);
                println!("   {} {}", "Found:".dimmed(), display_value(actual).red());
                print_details(&report);
            }
            bail!("verification failed: foreign watermark {:?}", actual)
        }
    }
}

/// Print the decoded record followed by any missing critical fields.
fn print_details(report: &VerificationReport) {
    if !report.record.is_empty() {
        println!();
        print_record(&report.record);
    }
    if report.missing_critical.is_empty() {
        return;
    }
    let fields: Vec<String> = report
        .missing_critical
        .iter()
        .map(|tag| tag.name().into_owned())
        .collect();
    println!();
    println!(
        "   {} {}",
        "Missing critical fields:".dimmed(),
        fields.join(", ").yellow()
    );
}
