//! Configuration types for a report run.
//!
//! All run behaviour is controlled through [`ReportConfig`], built via its
//! [`ReportConfigBuilder`]. Collaborators that differ between the CLI, a web
//! wrapper and tests (the transcript reader and the progress sink) are
//! injected here rather than passed through every call.

use crate::error::ReportError;
use crate::output::ReportNames;
use crate::pipeline::source::TranscriptReader;
use crate::progress::ProgressCallback;
use pdfplumber::TableSettings;
use std::fmt;
use std::sync::Arc;

/// Shared transcript reader type stored in [`ReportConfig`].
pub type SharedReader = Arc<dyn TranscriptReader + Send + Sync>;

/// Configuration for a report run.
///
/// # Example
/// ```rust
/// use historico_report::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .header_rows(9)
///     .build()
///     .unwrap();
/// assert_eq!(config.percentage_column, 6);
/// ```
#[derive(Clone)]
pub struct ReportConfig {
    /// Leading sheet rows (header/metadata) skipped by the percentage loader. Default: 9.
    ///
    /// Counted in absolute sheet rows, so a sheet whose used range starts
    /// below row 1 still skips the same logical region.
    pub header_rows: usize,

    /// 0-based sheet column holding the registration number. Default: 1 (column B).
    pub registration_column: usize,

    /// 0-based sheet column holding the completion percentage. Default: 6 (column G).
    pub percentage_column: usize,

    /// File names of the three artifacts.
    pub report_names: ReportNames,

    /// Table detection settings for the built-in PDF reader.
    ///
    /// Transcripts draw their tables with ruling lines, which the default
    /// lattice strategy picks up.
    pub table_settings: TableSettings,

    /// Pre-constructed transcript reader. Takes precedence over the built-in one.
    pub reader: Option<SharedReader>,

    /// Receives per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            header_rows: 9,
            registration_column: 1,
            percentage_column: 6,
            report_names: ReportNames::default(),
            table_settings: TableSettings::default(),
            reader: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("header_rows", &self.header_rows)
            .field("registration_column", &self.registration_column)
            .field("percentage_column", &self.percentage_column)
            .field("report_names", &self.report_names)
            .field("table_settings", &self.table_settings)
            .field("reader", &self.reader.as_ref().map(|_| "<dyn TranscriptReader>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ReportProgressCallback>"),
            )
            .finish()
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn header_rows(mut self, n: usize) -> Self {
        self.config.header_rows = n;
        self
    }

    pub fn registration_column(mut self, col: usize) -> Self {
        self.config.registration_column = col;
        self
    }

    pub fn percentage_column(mut self, col: usize) -> Self {
        self.config.percentage_column = col;
        self
    }

    pub fn report_names(mut self, names: ReportNames) -> Self {
        self.config.report_names = names;
        self
    }

    pub fn table_settings(mut self, settings: TableSettings) -> Self {
        self.config.table_settings = settings;
        self
    }

    pub fn reader(mut self, reader: SharedReader) -> Self {
        self.config.reader = Some(reader);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        let c = &self.config;
        if c.registration_column == c.percentage_column {
            return Err(ReportError::InvalidConfig(format!(
                "registration and percentage columns must differ, both are {}",
                c.registration_column
            )));
        }
        let names = [&c.report_names.excel, &c.report_names.csv, &c.report_names.txt];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(ReportError::InvalidConfig(
                "report file names must not be empty".into(),
            ));
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(ReportError::InvalidConfig(
                "report file names must be distinct".into(),
            ));
        }
        let t = &c.table_settings;
        let tolerances = [
            t.snap_tolerance,
            t.join_tolerance,
            t.intersection_tolerance,
            t.text_tolerance,
            t.edge_min_length,
        ];
        if !tolerances.iter().all(|v| v.is_finite() && *v >= 0.0) {
            return Err(ReportError::InvalidConfig(format!(
                "table tolerances must be non-negative: {:?}",
                tolerances
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_columns_b_and_g() {
        let c = ReportConfig::default();
        assert_eq!(c.header_rows, 9);
        assert_eq!(c.registration_column, 1);
        assert_eq!(c.percentage_column, 6);
        assert_eq!(c.report_names.csv, "relatorio_final.csv");
    }

    #[test]
    fn rejects_same_columns() {
        let err = ReportConfig::builder()
            .registration_column(3)
            .percentage_column(3)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn rejects_duplicate_names() {
        let names = ReportNames {
            excel: "a.xlsx".into(),
            csv: "same".into(),
            txt: "same".into(),
        };
        assert!(ReportConfig::builder().report_names(names).build().is_err());
    }

    #[test]
    fn rejects_negative_table_tolerance() {
        let settings = TableSettings {
            snap_tolerance: -1.0,
            ..TableSettings::default()
        };
        let err = ReportConfig::builder()
            .table_settings(settings)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn debug_hides_trait_objects() {
        let cb: ProgressCallback = Arc::new(crate::progress::NoopProgressCallback);
        let c = ReportConfig::builder().progress_callback(cb).build().unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn ReportProgressCallback>"));
    }
}
