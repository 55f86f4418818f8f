//! Pipeline stages for transcript-to-report conversion.
//!
//! Each submodule implements one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//!             percentages ───────────────────────────────┐
//!             (xls/xlsx)                                 ▼
//! PDF ──▶ source ──▶ transcript ──▶ identity ──▶ summary ──▶ writer
//!     (pdfplumber)   (tables or     (file name,  (digest,     (xlsx, csv,
//!                     text lines)    page 1)      rows)        txt)
//! ```
//!
//! 1. [`source`] reads every page once: raw text plus the ruled tables.
//!    Parsing is CPU-bound, so runs happen on a blocking thread
//! 2. [`transcript`] picks a [`transcript::PageParse`] per page and reads
//!    the hour summary
//! 3. [`identity`] derives registration number and student name
//! 4. [`percentages`] is loaded once per run and joined by registration
//! 5. [`summary`] renders the digest and the rows of one student
//! 6. [`writer`] appends those rows to the three documents in lockstep

pub mod identity;
pub mod normalize;
pub mod percentages;
pub mod source;
pub mod summary;
pub mod transcript;
pub mod writer;
