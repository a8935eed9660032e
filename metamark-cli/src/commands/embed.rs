//! Embed command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use metamark_core::{ClassLabel, CorpusLayout, Embedder, FsCorpus, NoopCorpus};
use tracing::info;

use crate::utils::{build_embedded_path, ensure_input_exists};

/// Execute the embed command.
pub fn execute(
    file: PathBuf,
    identity: String,
    output: Option<PathBuf>,
    corpus: PathBuf,
    no_archive: bool,
    quiet: bool,
) -> Result<()> {
    ensure_input_exists(&file)?;
    let output = output.unwrap_or_else(|| build_embedded_path(&file));

    // Archiving feeds the training corpus; --no-archive swaps in a sink
    if no_archive {
        Embedder::new(NoopCorpus)
            .embed(&file, &identity, &output)
            .with_context(|| format!("Failed to watermark {}", file.display()))?;
    } else {
        Embedder::new(FsCorpus::new(&corpus))
            .embed(&file, &identity, &output)
            .with_context(|| format!("Failed to watermark {}", file.display()))?;
    }

    info!(
        source = %file.display(),
        output = %output.display(),
        identity = %identity,
        "Embedded watermark"
    );

    if !quiet {
        println!();
        println!("{}", "Watermark embedded!".green().bold());
        println!();
        println!("   {} {}", "Output:".dimmed(), output.display());
        println!("   {} {}", "Identity:".dimmed(), identity);
        if no_archive {
            println!("   {} skipped", "Corpus:".dimmed());
        } else {
            println!(
                "   {} {}",
                "Corpus:".dimmed(),
                CorpusLayout::new(&corpus)
                    .class_dir(ClassLabel::Normal)
                    .display()
            );
        }
    }

    Ok(())
}
