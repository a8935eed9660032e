//! Metamark CLI - EXIF watermarking and tamper detection tool.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODE_HELP: &str = "\
Exit codes:
  0   success
  1   unexpected error
  64  invalid command line usage
  65  verification failed, metadata differs, or tamper suspected
  66  missing or unreadable input
  69  no trained model available
  74  output could not be written";

#[derive(Parser)]
#[command(name = "metamark")]
#[command(author, version, about = "EXIF watermarking and metadata tamper detection", long_about = None)]
#[command(after_help = EXIT_CODE_HELP)]
struct Cli {
    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value = "auto")]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TamperModeArg {
    /// Remove the metadata block entirely
    Strip,
    /// Replace watermark and timestamp with forged values
    Modify,
    /// Pick strip or modify at random
    Random,
}

impl From<TamperModeArg> for metamark_core::TamperMode {
    fn from(mode: TamperModeArg) -> Self {
        match mode {
            TamperModeArg::Strip => metamark_core::TamperMode::Strip,
            TamperModeArg::Modify => metamark_core::TamperMode::Modify,
            TamperModeArg::Random => metamark_core::TamperMode::Random,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Embed an identity watermark into a JPEG's metadata
    Embed {
        /// Path to the JPEG to watermark
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Identity to embed as the watermark
        #[arg(short, long, value_name = "IDENTITY")]
        identity: String,

        /// Output path (defaults to wm_<FILE> beside the input)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Corpus directory that archives a copy for training
        #[arg(long, value_name = "DIR", default_value = "dataset")]
        corpus: PathBuf,

        /// Skip archiving the marked copy into the corpus
        #[arg(long)]
        no_archive: bool,
    },

    /// Verify that a file carries the expected watermark
    Verify {
        /// Path to the file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Identity the watermark is expected to match
        #[arg(short, long, value_name = "IDENTITY")]
        identity: String,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compare metadata between an original and a suspect file
    Compare {
        /// Path to the original file
        #[arg(value_name = "ORIGINAL")]
        original: PathBuf,

        /// Path to the suspect file
        #[arg(value_name = "SUSPECT")]
        suspect: PathBuf,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Produce a deliberately tampered copy for the training corpus
    Tamper {
        /// Path to the JPEG to tamper with
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Tampering to apply
        #[arg(short, long, value_enum, default_value = "random")]
        mode: TamperModeArg,

        /// Seed for reproducible random tampering
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Output path (defaults to tampered_<FILE> beside the input)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Archive the tampered copy into the corpus
        #[arg(long)]
        archive: bool,

        /// Corpus directory used with --archive
        #[arg(long, value_name = "DIR", default_value = "dataset")]
        corpus: PathBuf,
    },

    /// Train the tamper classifier from the corpus
    Train {
        /// Corpus directory with normal/ and tampered/ classes
        #[arg(long, value_name = "DIR", default_value = "dataset")]
        corpus: PathBuf,

        /// Where to write the trained model
        #[arg(long, value_name = "PATH", default_value = "exif_model.cbor")]
        model: PathBuf,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        trees: usize,

        /// Seed for the training run
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Fraction of each class held out for evaluation
        #[arg(long, default_value_t = 0.3)]
        holdout: f64,
    },

    /// Classify a file with the trained model
    Classify {
        /// Path to the file to score
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the trained model
        #[arg(long, value_name = "PATH", default_value = "exif_model.cbor")]
        model: PathBuf,

        /// Print the result as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let code = match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
            _ => exit_codes::USAGE_ERROR,
        };
        let _ = err.print();
        process::exit(code);
    });

    init_tracing(cli.verbose);
    match cli.color {
        ColorMode::Auto => {}
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
    }

    if let Err(err) = run(cli) {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = &exit.message {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
        process::exit(exit.code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Embed {
            file,
            identity,
            output,
            corpus,
            no_archive,
        } => commands::embed::execute(file, identity, output, corpus, no_archive, quiet),
        Commands::Verify {
            file,
            identity,
            json,
        } => commands::verify::execute(file, identity, json, quiet),
        Commands::Compare {
            original,
            suspect,
            json,
        } => commands::compare::execute(original, suspect, json, quiet),
        Commands::Tamper {
            file,
            mode,
            seed,
            output,
            archive,
            corpus,
        } => commands::tamper::execute(file, mode.into(), seed, output, archive, corpus, quiet),
        Commands::Train {
            corpus,
            model,
            trees,
            seed,
            holdout,
        } => commands::train::execute(corpus, model, trees, seed, holdout, quiet),
        Commands::Classify { file, model, json } => {
            commands::classify::execute(file, model, json, quiet)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
