//! Error types for the historico-report library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`ReportError`] — **Fatal**: the run cannot proceed or its artifacts
//!   cannot be trusted (input folder missing, output not writable, invalid
//!   configuration). Returned as `Err(ReportError)` from the `run*` functions.
//!
//! * [`ExtractionError`] — **Non-fatal, per file**: one transcript could not
//!   be read. The run records the file as "no pending components" and moves
//!   on to the next one.
//!
//! * [`PercentageError`] — **Non-fatal, per run**: the percentage spreadsheet
//!   could not be loaded. The run continues with empty percentages.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the historico-report library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// The folder of transcripts does not exist or is not a directory.
    #[error("Input folder not found: '{path}'\nCheck the path exists and is a directory.")]
    InputFolderNotFound { path: PathBuf },

    /// The folder exists but could not be listed.
    #[error("Cannot list input folder '{path}': {source}")]
    InputFolderUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create, write or move one of the report files.
    #[error("Failed to write report file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// umya-spreadsheet refused to serialise the workbook.
    #[error("Failed to save spreadsheet '{path}': {detail}")]
    SpreadsheetSaveFailed { path: PathBuf, detail: String },

    // ── Setup errors ──────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`ReportError`], for callers that map failures
/// to user-facing messages or status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Bad input folder; nothing was processed.
    Precondition,
    /// A report artifact could not be written; no artifact is valid.
    OutputWrite,
    /// Configuration problem.
    Setup,
    /// Anything else.
    Internal,
}

impl ReportError {
    /// Which failure class this error belongs to.
    pub fn class(&self) -> FailureClass {
        match self {
            ReportError::InputFolderNotFound { .. } | ReportError::InputFolderUnreadable { .. } => {
                FailureClass::Precondition
            }
            ReportError::OutputWriteFailed { .. } | ReportError::SpreadsheetSaveFailed { .. } => {
                FailureClass::OutputWrite
            }
            ReportError::InvalidConfig(_) => FailureClass::Setup,
            ReportError::Internal(_) => FailureClass::Internal,
        }
    }
}

/// A non-fatal error for a single transcript file.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ExtractionError {
    /// The file could not be opened as a PDF (corrupt, encrypted, not a PDF).
    #[error("Cannot open '{path}': {detail}")]
    OpenFailed { path: PathBuf, detail: String },

    /// A page of an otherwise readable PDF failed.
    #[error("Page {page}: {detail}")]
    PageFailed { page: usize, detail: String },
}

/// Why the percentage spreadsheet could not be (fully) loaded.
#[derive(Debug, Error)]
pub enum PercentageError {
    /// The configured path does not exist.
    #[error("percentage file not found: '{path}'")]
    NotFound { path: PathBuf },

    /// The extension is neither a legacy `.xls` nor an OOXML workbook.
    #[error("unsupported percentage file format: '{path}'")]
    UnsupportedFormat { path: PathBuf },

    /// calamine failed to open or read the first sheet.
    #[error("cannot read percentage workbook '{path}': {detail}")]
    Workbook { path: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_folder_display() {
        let e = ReportError::InputFolderNotFound {
            path: PathBuf::from("/tmp/nowhere"),
        };
        assert!(e.to_string().contains("/tmp/nowhere"));
        assert_eq!(e.class(), FailureClass::Precondition);
    }

    #[test]
    fn output_errors_are_output_class() {
        let e = ReportError::OutputWriteFailed {
            path: PathBuf::from("relatorio_final.csv"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(e.to_string().contains("disk full"));
        assert_eq!(e.class(), FailureClass::OutputWrite);

        let e = ReportError::SpreadsheetSaveFailed {
            path: PathBuf::from("relatorio_componentes.xlsx"),
            detail: "zip error".into(),
        };
        assert_eq!(e.class(), FailureClass::OutputWrite);
    }

    #[test]
    fn setup_errors() {
        assert_eq!(
            ReportError::InvalidConfig("bad".into()).class(),
            FailureClass::Setup
        );
    }

    #[test]
    fn extraction_error_display() {
        let e = ExtractionError::PageFailed {
            page: 2,
            detail: "text layer missing".into(),
        };
        assert_eq!(e.to_string(), "Page 2: text layer missing");
    }
}
