//! CLI integration tests for metamark-cli.
//!
//! These tests verify the CLI behavior by running the actual binary
//! and checking outputs, exit codes, and file artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use metamark_core::{write_metadata_bytes, MetadataRecord, Tag, Value};
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the metamark binary.
fn metamark() -> Command {
    Command::cargo_bin("metamark").unwrap()
}

fn sample_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_fn(8, 8, |x, y| image::Rgb([x as u8 * 16, y as u8 * 16, 128]));
    let mut bytes = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 90);
    img.write_with_encoder(encoder).unwrap();
    bytes
}

/// Write a JPEG carrying every critical field under `dir`.
fn write_complete_jpeg(dir: &Path, name: &str) -> PathBuf {
    let record = MetadataRecord::from_entries([
        (Tag::DateTime, Value::text("2024:05:01 10:00:00")),
        (Tag::Make, Value::text("Canon")),
        (Tag::Model, Value::text("EOS R5")),
        (Tag::Software, Value::text("Firmware 1.2")),
        (Tag::GpsInfo, Value::int(0)),
    ]);
    let bytes = write_metadata_bytes(&sample_jpeg(), &record).unwrap();
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    metamark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "EXIF watermarking and metadata tamper detection",
        ))
        .stdout(predicate::str::contains("embed"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("train"));
}

#[test]
fn test_version_displays_version() {
    metamark()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("metamark"));
}

#[test]
fn test_help_shows_exit_codes() {
    metamark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("65"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_embed_help_shows_options() {
    metamark()
        .args(["embed", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--identity"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--corpus"))
        .stdout(predicate::str::contains("--no-archive"));
}

#[test]
fn test_train_help_shows_options() {
    metamark()
        .args(["train", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--trees"))
        .stdout(predicate::str::contains("--holdout"))
        .stdout(predicate::str::contains("--model"))
        .stdout(predicate::str::contains("--seed"));
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_missing_file_returns_input_error() {
    // Exit code 66 = EX_NOINPUT
    metamark()
        .args(["verify", "nonexistent_file.jpg", "--identity", "metamark:alice"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_classify_without_model_returns_unavailable() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let model = temp.path().join("missing.cbor");

    // Exit code 69 = EX_UNAVAILABLE (model not trained yet)
    metamark()
        .args([
            "classify",
            photo.to_str().unwrap(),
            "--model",
            model.to_str().unwrap(),
        ])
        .assert()
        .code(69)
        .stderr(predicate::str::contains("No trained model"));
}

#[test]
fn test_train_empty_corpus_returns_input_error() {
    let temp = TempDir::new().unwrap();
    let corpus = temp.path().join("corpus");
    let model = temp.path().join("model.cbor");

    metamark()
        .args([
            "train",
            "--corpus",
            corpus.to_str().unwrap(),
            "--model",
            model.to_str().unwrap(),
        ])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Empty training dataset"));
    assert!(!model.exists(), "No model should be written");
}

// ============================================================================
// Embed Tests
// ============================================================================

#[test]
fn test_embed_writes_marked_copy_and_archives() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let corpus = temp.path().join("corpus");

    metamark()
        .args([
            "embed",
            photo.to_str().unwrap(),
            "--identity",
            "metamark:alice",
            "--corpus",
            corpus.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Watermark embedded"));

    let marked = temp.path().join("wm_photo.jpg");
    assert!(marked.is_file(), "Marked copy should be created");

    let archived = corpus.join("normal").join("wm_photo.jpg");
    assert!(archived.is_file(), "Marked copy should be archived");
    assert_eq!(fs::read(&marked).unwrap(), fs::read(&archived).unwrap());
}

#[test]
fn test_embed_no_archive_leaves_corpus_untouched() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let corpus = temp.path().join("corpus");

    metamark()
        .args([
            "embed",
            photo.to_str().unwrap(),
            "--identity",
            "metamark:alice",
            "--corpus",
            corpus.to_str().unwrap(),
            "--no-archive",
        ])
        .assert()
        .success();

    assert!(temp.path().join("wm_photo.jpg").is_file());
    assert!(!corpus.exists(), "Corpus should not be created");
}

#[test]
fn test_embed_explicit_output_path() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let output = temp.path().join("published.jpg");

    metamark()
        .args([
            "embed",
            photo.to_str().unwrap(),
            "-i",
            "metamark:alice",
            "-o",
            output.to_str().unwrap(),
            "--no-archive",
        ])
        .assert()
        .success();

    assert!(output.is_file());
}

// ============================================================================
// Verify Tests
// ============================================================================

#[test]
fn test_embed_verify_roundtrip() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let marked = temp.path().join("wm_photo.jpg");

    metamark()
        .args([
            "embed",
            photo.to_str().unwrap(),
            "-i",
            "metamark:alice",
            "--no-archive",
        ])
        .assert()
        .success();

    metamark()
        .args(["verify", marked.to_str().unwrap(), "-i", "metamark:alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WATERMARK OK"));
}

#[test]
fn test_verify_absent_watermark_fails() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");

    // Exit code 65 = EX_DATAERR
    metamark()
        .args(["verify", photo.to_str().unwrap(), "-i", "metamark:alice"])
        .assert()
        .code(65)
        .stdout(predicate::str::contains("NO WATERMARK"))
        .stderr(predicate::str::contains("verification failed"));
}

#[test]
fn test_verify_foreign_watermark_fails() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let marked = temp.path().join("wm_photo.jpg");

    metamark()
        .args([
            "embed",
            photo.to_str().unwrap(),
            "-i",
            "metamark:alice",
            "--no-archive",
        ])
        .assert()
        .success();

    metamark()
        .args(["verify", marked.to_str().unwrap(), "-i", "metamark:bob"])
        .assert()
        .code(65)
        .stdout(predicate::str::contains("FOREIGN WATERMARK"))
        .stdout(predicate::str::contains("metamark:alice"));
}

#[test]
fn test_verify_json_report() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let marked = temp.path().join("wm_photo.jpg");

    metamark()
        .args([
            "embed",
            photo.to_str().unwrap(),
            "-i",
            "metamark:alice",
            "--no-archive",
        ])
        .assert()
        .success();

    let output = metamark()
        .args([
            "verify",
            marked.to_str().unwrap(),
            "-i",
            "metamark:alice",
            "--json",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["status"]["state"], "matches");
    assert_eq!(report["record"]["Make"], "Canon");
    assert_eq!(report["missing_critical"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Compare Tests
// ============================================================================

#[test]
fn test_compare_identical_files_match() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let copy = temp.path().join("copy.jpg");
    fs::copy(&photo, &copy).unwrap();

    metamark()
        .args(["compare", photo.to_str().unwrap(), copy.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("METADATA MATCH"));
}

#[test]
fn test_compare_tampered_file_fails() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let forged = temp.path().join("forged.jpg");

    metamark()
        .args([
            "tamper",
            photo.to_str().unwrap(),
            "--mode",
            "modify",
            "-o",
            forged.to_str().unwrap(),
        ])
        .assert()
        .success();

    metamark()
        .args(["compare", photo.to_str().unwrap(), forged.to_str().unwrap()])
        .assert()
        .code(65)
        .stdout(predicate::str::contains("METADATA DIFFERS"))
        .stderr(predicate::str::contains("differing"));
}

// ============================================================================
// Tamper Tests
// ============================================================================

#[test]
fn test_tamper_strip_removes_watermark() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let stripped = temp.path().join("tampered_photo.jpg");

    metamark()
        .args(["tamper", photo.to_str().unwrap(), "--mode", "strip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tampered copy written"));

    metamark()
        .args(["verify", stripped.to_str().unwrap(), "-i", "metamark:alice"])
        .assert()
        .code(65)
        .stdout(predicate::str::contains("NO WATERMARK"));
}

#[test]
fn test_tamper_random_is_reproducible_for_a_seed() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let out_a = temp.path().join("a.jpg");
    let out_b = temp.path().join("b.jpg");

    for out in [&out_a, &out_b] {
        metamark()
            .args([
                "tamper",
                photo.to_str().unwrap(),
                "--seed",
                "9",
                "-o",
                out.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    assert_eq!(fs::read(&out_a).unwrap(), fs::read(&out_b).unwrap());
}

#[test]
fn test_tamper_archive_copies_into_corpus() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let corpus = temp.path().join("corpus");

    metamark()
        .args([
            "tamper",
            photo.to_str().unwrap(),
            "--mode",
            "strip",
            "--archive",
            "--corpus",
            corpus.to_str().unwrap(),
        ])
        .assert()
        .success();

    let output = temp.path().join("tampered_photo.jpg");
    let archived = corpus.join("tampered").join("tampered_photo.jpg");
    assert!(archived.is_file(), "Tampered copy should be archived");
    assert_eq!(fs::read(&output).unwrap(), fs::read(&archived).unwrap());
}

// ============================================================================
// Train and Classify Pipeline Tests
// ============================================================================

#[test]
fn test_train_and_classify_pipeline() {
    let temp = TempDir::new().unwrap();
    let corpus = temp.path().join("corpus");
    let model = temp.path().join("model.cbor");

    // Watermark six photos, archiving each into the normal class
    for i in 0..6 {
        let photo = write_complete_jpeg(temp.path(), &format!("n{i}.jpg"));
        metamark()
            .args([
                "embed",
                photo.to_str().unwrap(),
                "-i",
                "metamark:alice",
                "--corpus",
                corpus.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    // Six tampered counterparts into the tampered class
    let source = write_complete_jpeg(temp.path(), "source.jpg");
    for i in 0..6 {
        let mode = if i % 2 == 0 { "strip" } else { "modify" };
        let out = temp.path().join(format!("t{i}.jpg"));
        metamark()
            .args([
                "tamper",
                source.to_str().unwrap(),
                "--mode",
                mode,
                "-o",
                out.to_str().unwrap(),
                "--archive",
                "--corpus",
                corpus.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    metamark()
        .args([
            "train",
            "--corpus",
            corpus.to_str().unwrap(),
            "--model",
            model.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Model trained"));
    assert!(model.is_file(), "Model artifact should be written");

    // A marked file scores as normal
    let marked = temp.path().join("wm_n0.jpg");
    metamark()
        .args([
            "classify",
            marked.to_str().unwrap(),
            "--model",
            model.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("NO TAMPER DETECTED"));

    // A stripped file scores as suspect with exit code 65
    let stripped = temp.path().join("t0.jpg");
    metamark()
        .args([
            "classify",
            stripped.to_str().unwrap(),
            "--model",
            model.to_str().unwrap(),
        ])
        .assert()
        .code(65)
        .stdout(predicate::str::contains("TAMPER SUSPECTED"))
        .stderr(predicate::str::contains("tamper suspected"));
}

// ============================================================================
// Quiet and Color Mode Tests
// ============================================================================

#[test]
fn test_quiet_mode_minimal_output() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");

    let output = metamark()
        .args([
            "--quiet",
            "embed",
            photo.to_str().unwrap(),
            "-i",
            "metamark:alice",
            "--no-archive",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(
        stdout.trim().is_empty(),
        "Quiet mode should have no stdout, got: {}",
        stdout
    );
}

#[test]
fn test_color_never_no_ansi() {
    let temp = TempDir::new().unwrap();
    let photo = write_complete_jpeg(temp.path(), "photo.jpg");
    let marked = temp.path().join("wm_photo.jpg");

    metamark()
        .args([
            "embed",
            photo.to_str().unwrap(),
            "-i",
            "metamark:alice",
            "--no-archive",
        ])
        .assert()
        .success();

    let output = metamark()
        .args([
            "--color=never",
            "verify",
            marked.to_str().unwrap(),
            "-i",
            "metamark:alice",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    assert!(
        !stdout.contains("\x1b["),
        "Color=never stdout should not contain ANSI codes"
    );
}

#[test]
fn test_conflicting_verbose_quiet_rejected() {
    metamark()
        .args(["--verbose", "--quiet", "verify", "x.jpg", "-i", "metamark:alice"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("cannot be used with"));
}
