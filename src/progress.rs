//! Progress-callback trait for per-file report events.
//!
//! Inject an [`Arc<dyn ReportProgressCallback>`] via
//! [`crate::config::ReportConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the input folder.
//!
//! Callbacks are fire-and-forget: the pipeline never waits for a reply, so
//! implementations must return quickly. [`WatchProgress`] is the ready-made
//! bridge for hosts that stream progress elsewhere (an SSE endpoint, a
//! WebSocket): it keeps only the latest counter in a `tokio::sync::watch`
//! channel and never blocks, however slow the consumer is.
//!
//! # Example
//!
//! ```rust
//! use historico_report::{ReportConfig, ReportProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl ReportProgressCallback for Counter {
//!     fn on_file_complete(&self, completed: usize, total: usize) {
//!         self.0.store(completed, Ordering::SeqCst);
//!         eprintln!("{completed}/{total}");
//!     }
//! }
//!
//! let config = ReportConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Called by the pipeline as it processes each transcript.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed sequentially, but the trait is
/// `Send + Sync` because the pipeline runs on a blocking worker thread.
pub trait ReportProgressCallback: Send + Sync {
    /// Called once, before the first file, with the number of PDFs found.
    fn on_run_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is read.
    ///
    /// # Arguments
    /// * `index`     — 1-indexed position in the sorted listing
    /// * `total`     — number of PDFs in the run
    /// * `file_name` — name of the PDF inside the input folder
    fn on_file_start(&self, index: usize, total: usize, file_name: &str) {
        let _ = (index, total, file_name);
    }

    /// Called after a file's rows are written to all three outputs.
    ///
    /// `completed` runs from 1 to `total`; `total` never changes during a run.
    fn on_file_complete(&self, completed: usize, total: usize) {
        let _ = (completed, total);
    }

    /// Called when a file could not be read. The file is still reported
    /// (as having no pending components) and `on_file_complete` follows.
    fn on_file_error(&self, index: usize, total: usize, file_name: &str, error: &str) {
        let _ = (index, total, file_name, error);
    }

    /// Called once after the last file, before the artifacts are moved into place.
    fn on_run_complete(&self, total_files: usize, failed_files: usize) {
        let _ = (total_files, failed_files);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReportConfig`].
pub type ProgressCallback = Arc<dyn ReportProgressCallback>;

/// Latest progress snapshot published by [`WatchProgress`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Set by `on_run_complete`.
    pub done: bool,
}

/// Publishes [`Progress`] on a `tokio::sync::watch` channel.
///
/// Sending never blocks and succeeds even when every receiver is gone;
/// slow receivers simply observe the most recent value.
pub struct WatchProgress {
    tx: watch::Sender<Progress>,
}

impl WatchProgress {
    /// Create the sink and a receiver for the host side.
    pub fn channel() -> (Arc<Self>, watch::Receiver<Progress>) {
        let (tx, rx) = watch::channel(Progress::default());
        (Arc::new(Self { tx }), rx)
    }

    /// Another receiver on the same channel.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }
}

impl ReportProgressCallback for WatchProgress {
    fn on_run_start(&self, total_files: usize) {
        self.tx.send_replace(Progress {
            completed: 0,
            total: total_files,
            done: false,
        });
    }

    fn on_file_complete(&self, completed: usize, total: usize) {
        self.tx.send_replace(Progress {
            completed,
            total,
            done: false,
        });
    }

    fn on_run_complete(&self, total_files: usize, _failed_files: usize) {
        self.tx.send_modify(|p| {
            p.total = total_files;
            p.done = true;
        });
    }
}
