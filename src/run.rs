//! Report run entry points.
//!
//! [`run_blocking`] is the sequential core. [`run`] moves it onto a
//! blocking thread for async hosts and [`run_sync`] wraps [`run`] for
//! callers without a runtime.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::model::StudentRecord;
use crate::output::{ReportArtifacts, RunStats};
use crate::pipeline::identity::{registration_from_file_name, student_name};
use crate::pipeline::percentages::{load_percentages, PercentageTable};
use crate::pipeline::source::{PlumberReader, TranscriptDocument, TranscriptReader};
use crate::pipeline::summary::build_rows;
use crate::pipeline::transcript::extract_transcript;
use crate::pipeline::writer::ReportWriters;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Build the three reports for every PDF in `input_dir`.
///
/// # Arguments
/// * `input_dir`       — folder holding the transcripts (`*.pdf`, any case)
/// * `percentage_file` — optional `.xls`/`.xlsx` of completion percentages
/// * `output_dir`      — where the artifacts land; created if missing
/// * `config`          — run configuration
///
/// # Returns
/// `Ok(ReportArtifacts)` even if some transcripts could not be read
/// (check `artifacts.stats.files_failed`).
///
/// # Errors
/// Returns `Err(ReportError)` only for fatal errors:
/// - input folder missing or unreadable
/// - any artifact could not be written
///
/// # Example
/// ```rust,no_run
/// use historico_report::{run, ReportConfig};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ReportConfig::default();
/// let out = run("uploads", Some(Path::new("percentuais.xlsx")), "reports", &config).await?;
/// println!("{}", out.csv_report);
/// # Ok(())
/// # }
/// ```
pub async fn run(
    input_dir: impl AsRef<Path>,
    percentage_file: Option<&Path>,
    output_dir: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportArtifacts, ReportError> {
    let input_dir = input_dir.as_ref().to_path_buf();
    let percentage_file = percentage_file.map(Path::to_path_buf);
    let output_dir = output_dir.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || {
        run_blocking(&input_dir, percentage_file.as_deref(), &output_dir, &config)
    })
    .await
    .map_err(|e| ReportError::Internal(format!("report task panicked: {}", e)))?
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(
    input_dir: impl AsRef<Path>,
    percentage_file: Option<&Path>,
    output_dir: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportArtifacts, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(input_dir, percentage_file, output_dir, config))
}

/// The sequential pipeline. Files are processed one at a time in name order.
pub fn run_blocking(
    input_dir: &Path,
    percentage_file: Option<&Path>,
    output_dir: &Path,
    config: &ReportConfig,
) -> Result<ReportArtifacts, ReportError> {
    let start = Instant::now();

    // ── Step 1: List transcripts ─────────────────────────────────────────
    let files = list_pdfs(input_dir)?;
    let total = files.len();
    info!("Found {} PDF files in {}", total, input_dir.display());

    // ── Step 2: Percentages ──────────────────────────────────────────────
    let percentages = load_percentages(percentage_file, config);
    info!("{} percentages loaded", percentages.len());

    // ── Step 3: Reader ───────────────────────────────────────────────────
    let plumber_reader;
    let reader: &dyn TranscriptReader = match &config.reader {
        Some(injected) => injected.as_ref(),
        None => {
            plumber_reader = PlumberReader::new(config.table_settings.clone());
            &plumber_reader
        }
    };

    // ── Step 4: Open artifacts ───────────────────────────────────────────
    let mut writers = ReportWriters::create(output_dir, &config.report_names)?;

    let progress: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));
    progress.on_run_start(total);

    // ── Step 5: One transcript at a time ─────────────────────────────────
    let mut sequence = 1u32;
    let mut failed = 0usize;
    for (idx, file_name) in files.iter().enumerate() {
        let index = idx + 1;
        progress.on_file_start(index, total, file_name);
        info!("Processing [{}/{}]: {}", index, total, file_name);

        let record = match reader.read(&input_dir.join(file_name)) {
            Ok(document) => student_record(file_name, &document, &percentages),
            Err(e) => {
                warn!("Could not read {}: {}", file_name, e);
                failed += 1;
                progress.on_file_error(index, total, file_name, &e.to_string());
                student_record(file_name, &TranscriptDocument::default(), &percentages)
            }
        };
        debug!(
            "{}: registration '{}', {} pending components",
            file_name,
            record.registration,
            record.components.len()
        );

        let rows = build_rows(&record, &mut sequence);
        writers.write_student(&record, &rows)?;
        progress.on_file_complete(index, total);
    }

    progress.on_run_complete(total, failed);

    // ── Step 6: Move artifacts into place ────────────────────────────────
    let rows_written = writers.finish()?;
    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Wrote {} rows for {} files ({} unreadable) in {}ms",
        rows_written, total, failed, duration_ms
    );

    let names = &config.report_names;
    Ok(ReportArtifacts {
        excel_report: names.excel.clone(),
        csv_report: names.csv.clone(),
        txt_report: names.txt.clone(),
        output_dir: output_dir.to_path_buf(),
        stats: RunStats {
            files_total: total,
            files_failed: failed,
            rows_written,
            percentages_loaded: percentages.len(),
            duration_ms,
        },
    })
}

/// Names of the `*.pdf` files (extension in any case) directly inside `dir`,
/// sorted.
pub fn list_pdfs(dir: &Path) -> Result<Vec<String>, ReportError> {
    if !dir.is_dir() {
        return Err(ReportError::InputFolderNotFound {
            path: dir.to_path_buf(),
        });
    }
    let unreadable = |e| ReportError::InputFolderUnreadable {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if name.to_lowercase().ends_with(".pdf") {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

fn student_record(
    file_name: &str,
    document: &TranscriptDocument,
    percentages: &PercentageTable,
) -> StudentRecord {
    let transcript = extract_transcript(document);
    let registration = registration_from_file_name(file_name);
    let name = document.first_page_text().map(student_name).unwrap_or_default();
    let percentage = percentages.lookup(&registration);

    StudentRecord {
        file_name: file_name.to_string(),
        registration,
        name,
        components: transcript.components,
        hours: transcript.hours,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HourSummary;

    #[test]
    fn lists_only_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "c.Pdf"] {
            std::fs::write(dir.path().join(name), b"%PDF").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();
        assert_eq!(list_pdfs(dir.path()).unwrap(), ["A.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn missing_folder_is_a_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_pdfs(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.class(), crate::error::FailureClass::Precondition);
    }

    #[test]
    fn unreadable_document_keeps_registration_and_percentage() {
        let table: PercentageTable = [("123".to_string(), "50".to_string())].into_iter().collect();
        let record = student_record("historico_123.pdf", &TranscriptDocument::default(), &table);
        assert_eq!(record.registration, "123");
        assert_eq!(record.percentage, "50");
        assert!(record.name.is_empty());
        assert!(record.components.is_empty());
        assert_eq!(record.hours, HourSummary::default());
    }
}
