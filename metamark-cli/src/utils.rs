//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use metamark_core::MetadataRecord;

/// Build the default output path for a watermarked copy.
///
/// Transforms `dir/image.jpg` into `dir/wm_image.jpg`.
pub fn build_embedded_path(file: &Path) -> PathBuf {
    prefixed_path(file, "wm_")
}

/// Build the default output path for a tampered copy.
///
/// Transforms `dir/image.jpg` into `dir/tampered_image.jpg`.
pub fn build_tampered_path(file: &Path) -> PathBuf {
    prefixed_path(file, "tampered_")
}

fn prefixed_path(file: &Path, prefix: &str) -> PathBuf {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("out.jpg");
    file.with_file_name(format!("{prefix}{name}"))
}

/// Fail early with a uniform message when an input file is absent.
///
/// Several library entry points degrade a missing file to an empty record;
/// at the command line a missing input is an error, not an empty answer.
pub fn ensure_input_exists(file: &Path) -> Result<()> {
    if !file.is_file() {
        bail!("Failed to read file: {}", file.display());
    }
    Ok(())
}

/// Render a metadata value for terminal display.
///
/// Metadata comes from untrusted files, so control characters are replaced
/// and long values truncated before they reach the terminal.
pub fn display_value(value: &str) -> String {
    const MAX_CHARS: usize = 60;
    let sanitized: String = value
        .chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect();
    if sanitized.chars().count() > MAX_CHARS {
        let truncated: String = sanitized.chars().take(MAX_CHARS).collect();
        format!("{truncated}…")
    } else {
        sanitized
    }
}

/// Format an RFC 3339 timestamp as a human-readable UTC string.
pub fn format_timestamp(rfc3339: &str) -> String {
    match DateTime::parse_from_rfc3339(rfc3339) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => rfc3339.to_string(),
    }
}

/// Print every field of a record as dimmed label/value lines.
pub fn print_record(record: &MetadataRecord) {
    for (tag, value) in record.iter() {
        println!(
            "   {} {}",
            format!("{}:", tag.name()).dimmed(),
            display_value(&value.to_string())
        );
    }
}
