//! # historico-report
//!
//! Extract pending curricular components from academic-transcript PDFs and
//! build three consolidated reports.
//!
//! ## Pipeline Overview
//!
//! ```text
//! folder of PDFs
//!  │
//!  ├─ 1. List        *.pdf in name order (the report order)
//!  ├─ 2. Percentages registration → percentage from an .xls/.xlsx, once
//!  ├─ 3. Read        page text + ruled tables (pdfplumber)
//!  ├─ 4. Extract     pending-components table, or the text section as fallback
//!  ├─ 5. Identify    registration from the file name, name from page 1
//!  ├─ 6. Summarise   "2 componentes + 40h optativos; 120 h"
//!  └─ 7. Write       relatorio_componentes.xlsx, relatorio_final.csv,
//!                    relatorio_historicos.txt, all in the same row order
//! ```
//!
//! A transcript that cannot be read is reported as having nothing pending;
//! only a missing input folder or an unwritable artifact fails the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use historico_report::{run, ReportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReportConfig::default();
//!     let artifacts = run("historicos", None, "relatorios", &config).await?;
//!     eprintln!(
//!         "{} rows from {} files",
//!         artifacts.stats.rows_written, artifacts.stats.files_total
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `historico-report` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! historico-report = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ReportConfig, ReportConfigBuilder, SharedReader};
pub use error::{ExtractionError, FailureClass, PercentageError, ReportError};
pub use model::{HourSummary, PendingComponent, StudentRecord};
pub use output::{ReportArtifacts, ReportNames, RunStats};
pub use pipeline::source::{
    PageContent, PlumberReader, Table, TranscriptDocument, TranscriptReader,
};
pub use progress::{NoopProgressCallback, Progress, ProgressCallback, ReportProgressCallback, WatchProgress};
pub use run::{list_pdfs, run, run_blocking, run_sync};
