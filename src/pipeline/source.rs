//! Transcript access: turn a PDF file into per-page tables and text.
//!
//! The rest of the pipeline never touches the PDF parser directly. It
//! consumes [`TranscriptDocument`]s produced by a [`TranscriptReader`], which
//! keeps the extraction rules testable on canned pages and lets a host
//! substitute another backend.

use crate::error::ExtractionError;
use pdfplumber::{Page, Pdf, TableSettings, TextOptions};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A table as a grid of optional cell texts; row 0 is the header.
pub type Table = Vec<Vec<Option<String>>>;

/// What one page offers to the extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Tables found on the page, top to bottom.
    pub tables: Vec<Table>,
    /// Raw page text, lines separated by `\n` (or `\r\n`).
    pub text: String,
}

/// All pages of one transcript, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptDocument {
    pub pages: Vec<PageContent>,
}

impl TranscriptDocument {
    /// Text of page 1, or `None` for a document without pages.
    pub fn first_page_text(&self) -> Option<&str> {
        self.pages.first().map(|p| p.text.as_str())
    }
}

/// Reads a transcript file into pages.
///
/// A failure here is local to one file: the caller logs it and reports the
/// student with no pending components.
pub trait TranscriptReader {
    fn read(&self, path: &Path) -> Result<TranscriptDocument, ExtractionError>;
}

/// [`TranscriptReader`] backed by pdfplumber.
///
/// Tables come from the ruling lines drawn around them; the page text is
/// read line by line in reading order.
#[derive(Debug, Clone, Default)]
pub struct PlumberReader {
    tables: TableSettings,
    text: TextOptions,
}

impl PlumberReader {
    pub fn new(tables: TableSettings) -> Self {
        Self {
            tables,
            text: TextOptions::default(),
        }
    }

    fn read_page(&self, page: &Page, page_num: usize) -> PageContent {
        let tables = page.extract_tables(&self.tables);
        let text = page.extract_text(&self.text);
        debug!(
            "Page {}: {} chars, {} tables",
            page_num,
            page.chars().len(),
            tables.len()
        );
        PageContent { tables, text }
    }
}

impl TranscriptReader for PlumberReader {
    fn read(&self, path: &Path) -> Result<TranscriptDocument, ExtractionError> {
        check_pdf_magic(path)?;

        let pdf = Pdf::open_file(path, None).map_err(|e| ExtractionError::OpenFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let mut pages = Vec::with_capacity(pdf.page_count());
        for (idx, page) in pdf.pages().iter().enumerate() {
            let page = page.map_err(|e| ExtractionError::PageFailed {
                page: idx + 1,
                detail: e.to_string(),
            })?;
            pages.push(self.read_page(&page, idx + 1));
        }
        Ok(TranscriptDocument { pages })
    }
}

/// Reject files that are not PDFs before the parser sees them.
fn check_pdf_magic(path: &Path) -> Result<(), ExtractionError> {
    let open_failed = |detail: String| ExtractionError::OpenFailed {
        path: path.to_path_buf(),
        detail,
    };
    let mut file = std::fs::File::open(path).map_err(|e| open_failed(e.to_string()))?;
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .map_err(|e| open_failed(format!("too short to be a PDF: {e}")))?;
    if &magic != b"%PDF" {
        return Err(open_failed(format!("not a PDF, first bytes {:?}", magic)));
    }
    Ok(())
}
