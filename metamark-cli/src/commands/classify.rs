//! Classify command implementation.

use std::path::PathBuf;

use anyhow::{bail, Result};
use colored::Colorize;
use metamark_core::{
    missing_critical_fields, read_metadata, vectorize_record, TamperVerdict, TrainedModel,
    VERDICT_THRESHOLD,
};
use tracing::{info, warn};

use crate::utils::{ensure_input_exists, format_timestamp};

/// Execute the classify command.
pub fn execute(file: PathBuf, model: PathBuf, json: bool, quiet: bool) -> Result<()> {
    ensure_input_exists(&file)?;

    let trained = TrainedModel::load(&model)?;
    let record = read_metadata(&file);
    let result = trained.classify(&vectorize_record(&record))?;
    info!(
        path = %file.display(),
        verdict = %result.verdict,
        probability = result.tamper_probability,
        "Classified file"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    match result.verdict {
        TamperVerdict::Normal => {
            if !quiet && !json {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".green());
                println!(
                    "{}",
                    "║           NO TAMPER DETECTED           ║".green().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".green());
                println!();
                println!("   {} {}", "File:".dimmed(), file.display());
                println!(
                    "   {} {} (trained {})",
                    "Model:".dimmed(),
                    model.display(),
                    format_timestamp(&trained.trained_at)
                );
                println!(
                    "   {} {:.2}",
                    "Tamper probability:".dimmed(),
                    result.tamper_probability
                );
            }
            Ok(())
        }
        TamperVerdict::Suspect => {
            warn!(
                path = %file.display(),
                probability = result.tamper_probability,
                "Tamper suspected"
            );
            if !quiet && !json {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".red());
                println!(
                    "{}",
                    "║            TAMPER SUSPECTED            ║".red().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".red());
                println!();
                println!("   {} {}", "File:".dimmed(), file.display());
                println!(
                    "   {} {} (trained {})",
                    "Model:".dimmed(),
                    model.display(),
                    format_timestamp(&trained.trained_at)
                );
                println!(
                    "   {} {}",
                    "Tamper probability:".dimmed(),
                    format!("{:.2}", result.tamper_probability).red()
                );
                let missing = missing_critical_fields(&record);
                if !missing.is_empty() {
                    let fields: Vec<String> =
                        missing.iter().map(|tag| tag.name().into_owned()).collect();
                    println!(
                        "   {} {}",
                        "Missing critical fields:".dimmed(),
                        fields.join(", ").yellow()
                    );
                }
            }
            bail!(
                "tamper suspected (probability {:.2}, threshold {:.2})",
                result.tamper_probability,
                VERDICT_THRESHOLD
            )
        }
    }
}
