//! Train command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use metamark_core::{CorpusLayout, TrainOptions, Trainer};
use tracing::info;

/// Execute the train command.
pub fn execute(
    corpus: PathBuf,
    model: PathBuf,
    trees: usize,
    seed: u64,
    holdout: f64,
    quiet: bool,
) -> Result<()> {
    let options = TrainOptions {
        trees,
        seed,
        holdout,
        ..TrainOptions::default()
    };
    let report = Trainer::new(CorpusLayout::new(&corpus), &model)
        .with_options(options)
        .run()
        .context("Training failed")?;

    info!(
        model = %report.model_path.display(),
        accuracy = report.evaluation.accuracy,
        "Training complete"
    );

    if !quiet {
        println!();
        println!("{}", "Model trained!".green().bold());
        println!();
        println!("   {} {}", "Model:".dimmed(), report.model_path.display());
        println!(
            "   {} {} normal, {} tampered",
            "Examples:".dimmed(),
            report.normal_examples,
            report.tampered_examples
        );
        println!(
            "   {} {:.1}% on {} held-out examples",
            "Accuracy:".dimmed(),
            report.evaluation.accuracy * 100.0,
            report.evaluation.evaluated
        );
        for class in &report.evaluation.classes {
            println!(
                "   {} precision {:.2}, recall {:.2}, f1 {:.2}",
                format!("{}:", class.label).dimmed(),
                class.precision,
                class.recall,
                class.f1
            );
        }
    }

    Ok(())
}
