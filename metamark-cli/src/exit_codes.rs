//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

#![allow(dead_code)] // Constants may be used in future or for documentation

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (verification failed, metadata differs, tamper suspected).
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Cannot open input file, or the training corpus is empty.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Required artifact unavailable (no trained model on disk).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const UNAVAILABLE: i32 = 69;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify error by inspecting the chain
        let code = if message.contains("Failed to read file")
            || message.contains("Empty training dataset")
        {
            INPUT_ERROR
        } else if message.contains("No trained model") {
            UNAVAILABLE
        } else if message.contains("verification failed")
            || message.contains("differing field")
            || message.contains("tamper suspected")
        {
            VERIFICATION_FAILED
        } else if message.contains("Failed to write") || message.contains("I/O error") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_maps_to_input_error() {
        let err = anyhow::anyhow!("Failed to read file: photo.jpg");
        assert_eq!(ExitCode::from_anyhow(&err).code, INPUT_ERROR);
    }

    #[test]
    fn test_empty_corpus_maps_to_input_error() {
        let err = anyhow::anyhow!("Empty training dataset: no JPEG examples in dataset/normal");
        assert_eq!(ExitCode::from_anyhow(&err).code, INPUT_ERROR);
    }

    #[test]
    fn test_missing_model_maps_to_unavailable() {
        let err = anyhow::anyhow!("No trained model at exif_model.cbor: run a training pass first");
        assert_eq!(ExitCode::from_anyhow(&err).code, UNAVAILABLE);
    }

    #[test]
    fn test_failed_checks_map_to_verification_failed() {
        for message in [
            "verification failed: watermark absent",
            "comparison found 3 differing fields",
            "tamper suspected (probability 0.92, threshold 0.50)",
        ] {
            let err = anyhow::anyhow!(message);
            assert_eq!(ExitCode::from_anyhow(&err).code, VERIFICATION_FAILED);
        }
    }

    #[test]
    fn test_write_failures_map_to_io_error() {
        for message in [
            "Training failed: I/O error: permission denied",
            "Failed to write output: /readonly/out.jpg",
        ] {
            let err = anyhow::anyhow!(message);
            assert_eq!(ExitCode::from_anyhow(&err).code, IO_ERROR);
        }
    }

    #[test]
    fn test_unclassified_error_is_general() {
        let err = anyhow::anyhow!("something else went wrong");
        let exit = ExitCode::from_anyhow(&err);
        assert_eq!(exit.code, GENERAL_ERROR);
        assert_eq!(exit.message.as_deref(), Some("something else went wrong"));
    }
}
