//! CLI binary for historico-report.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ReportConfig` and prints where the reports went.

use anyhow::{Context, Result};
use clap::Parser;
use historico_report::{run, ProgressCallback, ReportConfig, ReportProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the whole folder plus a log line
/// per transcript.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the transcript currently being read.
    file_started: Mutex<Option<Instant>>,
    /// Set by `on_file_error` for the transcript in flight.
    current_failed: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Listing transcripts…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            file_started: Mutex::new(None),
            current_failed: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.file_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ReportProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_files: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Reading {total_files} transcripts…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, file_name: &str) {
        if let Ok(mut started) = self.file_started.lock() {
            *started = Some(Instant::now());
        }
        self.current_failed.store(0, Ordering::SeqCst);
        self.bar.set_message(file_name.to_string());
    }

    fn on_file_error(&self, index: usize, total: usize, file_name: &str, error: &str) {
        self.current_failed.store(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            red("✗"),
            index,
            total,
            file_name,
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
    }

    fn on_file_complete(&self, completed: usize, total: usize) {
        if self.current_failed.load(Ordering::SeqCst) == 0 {
            self.bar.println(format!(
                "  {} {:>3}/{:<3}  {}",
                green("✓"),
                completed,
                total,
                dim(&format!("{:.1}s", self.elapsed_secs())),
            ));
        }
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_files: usize, failed_files: usize) {
        self.bar.finish_and_clear();
        if failed_files == 0 {
            eprintln!(
                "{} {} transcripts read",
                green("✔"),
                bold(&total_files.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} transcripts read  ({} unreadable, reported as \"não contém\")",
                cyan("⚠"),
                bold(&(total_files - failed_files).to_string()),
                total_files,
                red(&failed_files.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Reports for every PDF in ./historicos, written to ./generated_reports
  historico-report historicos

  # Join completion percentages from a spreadsheet
  historico-report historicos -p percentuais.xlsx -o relatorios

  # Machine-readable summary
  historico-report --json historicos > run.json

FILE NAMES:
  Registration numbers are read from names like historico_20230012345.pdf.
  The percentage spreadsheet (.xls or .xlsx) keeps its data from row 10 on,
  registration in column B and percentage in column G.

OUTPUT:
  relatorio_componentes.xlsx   one sheet, "Componentes Pendentes"
  relatorio_final.csv          "Linha Consolidada;Arquivo", UTF-8 with BOM
  relatorio_historicos.txt     one line per report row, UTF-8 with BOM

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. historico_report=debug)
"#;

/// Build pending-component reports from academic-transcript PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "historico-report",
    version,
    about = "Build pending-component reports from academic-transcript PDFs",
    long_about = "Read every transcript PDF in a folder, extract the pending curricular \
components and hour totals, join completion percentages by registration number, and write \
a spreadsheet, a semicolon-delimited file and a text log with one row group per transcript.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the transcript PDFs.
    input: PathBuf,

    /// Spreadsheet (.xls/.xlsx) with completion percentages.
    #[arg(short, long, env = "HISTORICO_PERCENTAGES")]
    percentages: Option<PathBuf>,

    /// Folder the three reports are written to (created if missing).
    #[arg(short, long, env = "HISTORICO_OUTPUT", default_value = "generated_reports")]
    output: PathBuf,

    /// Leading rows of the percentage sheet to skip.
    #[arg(long, env = "HISTORICO_HEADER_ROWS", default_value_t = 9)]
    header_rows: usize,

    /// Print the run result (ReportArtifacts) as JSON on stdout.
    #[arg(long, env = "HISTORICO_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "HISTORICO_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HISTORICO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HISTORICO_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless -v is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ReportProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let artifacts = run(&cli.input, cli.percentages.as_deref(), &cli.output, &config)
        .await
        .with_context(|| format!("Report run over {:?} failed", cli.input))?;

    if cli.json {
        let json =
            serde_json::to_string_pretty(&artifacts).context("Failed to serialise result")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &artifacts.stats;
        eprintln!(
            "{}  {} files  {} rows  {} percentages  {}ms",
            if stats.files_failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.files_total,
            stats.rows_written,
            stats.percentages_loaded,
            stats.duration_ms,
        );
        for path in artifacts.paths() {
            eprintln!("   →  {}", bold(&path.display().to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ReportConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReportConfig> {
    let mut builder = ReportConfig::builder().header_rows(cli.header_rows);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
