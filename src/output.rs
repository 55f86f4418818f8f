//! Result types returned by a completed run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name of the formatted spreadsheet.
pub const EXCEL_REPORT_NAME: &str = "relatorio_componentes.xlsx";
/// Default file name of the semicolon-delimited file.
pub const CSV_REPORT_NAME: &str = "relatorio_final.csv";
/// Default file name of the plain-text log.
pub const TXT_REPORT_NAME: &str = "relatorio_historicos.txt";

/// File names of the three report artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportNames {
    pub excel: String,
    pub csv: String,
    pub txt: String,
}

impl Default for ReportNames {
    fn default() -> Self {
        Self {
            excel: EXCEL_REPORT_NAME.to_string(),
            csv: CSV_REPORT_NAME.to_string(),
            txt: TXT_REPORT_NAME.to_string(),
        }
    }
}

/// The three artifacts produced by a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifacts {
    /// File name of the spreadsheet inside `output_dir`.
    pub excel_report: String,
    /// File name of the delimited file inside `output_dir`.
    pub csv_report: String,
    /// File name of the text log inside `output_dir`.
    pub txt_report: String,
    /// Folder the artifacts were written to.
    pub output_dir: PathBuf,
    pub stats: RunStats,
}

impl ReportArtifacts {
    /// Absolute or relative paths of the three artifacts, in
    /// spreadsheet / delimited / text order.
    pub fn paths(&self) -> [PathBuf; 3] {
        [
            self.output_dir.join(&self.excel_report),
            self.output_dir.join(&self.csv_report),
            self.output_dir.join(&self.txt_report),
        ]
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// PDFs found in the input folder.
    pub files_total: usize,
    /// PDFs that could not be read and were reported as empty.
    pub files_failed: usize,
    /// Data rows written to each artifact (identical across the three).
    pub rows_written: usize,
    /// Entries in the percentage table.
    pub percentages_loaded: usize,
    pub duration_ms: u64,
}
