//! Tamper command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use metamark_core::{ClassLabel, CorpusLayout, CorpusWriter, FsCorpus, TamperForge, TamperMode};
use tracing::info;

use crate::utils::{build_tampered_path, ensure_input_exists};

/// Execute the tamper command.
pub fn execute(
    file: PathBuf,
    mode: TamperMode,
    seed: Option<u64>,
    output: Option<PathBuf>,
    archive: bool,
    corpus: PathBuf,
    quiet: bool,
) -> Result<()> {
    ensure_input_exists(&file)?;
    let output = output.unwrap_or_else(|| build_tampered_path(&file));

    let mut forge = match seed {
        Some(seed) => TamperForge::with_seed(seed),
        None => TamperForge::new(),
    };
    let applied = forge
        .tamper(&file, &output, mode)
        .with_context(|| format!("Failed to tamper {}", file.display()))?;

    if archive {
        let bytes = std::fs::read(&output)
            .with_context(|| format!("Failed to read file: {}", output.display()))?;
        let name = output
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("tampered.jpg");
        FsCorpus::new(&corpus)
            .archive(ClassLabel::Tampered, name, &bytes)
            .context("Failed to archive tampered copy")?;
    }

    info!(
        source = %file.display(),
        output = %output.display(),
        applied = %applied,
        "Wrote tampered copy"
    );

    if !quiet {
        println!();
        println!("{}", "Tampered copy written!".yellow().bold());
        println!();
        println!("   {} {}", "Output:".dimmed(), output.display());
        println!("   {} {}", "Applied:".dimmed(), applied);
        if archive {
            println!(
                "   {} {}",
                "Corpus:".dimmed(),
                CorpusLayout::new(&corpus)
                    .class_dir(ClassLabel::Tampered)
                    .display()
            );
        }
    }

    Ok(())
}
