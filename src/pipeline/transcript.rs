//! Transcript extraction: pending components and the hour summary.
//!
//! Each page is parsed on its own. A page carrying a pending-components
//! table is authoritative for that page; any other page is scanned line by
//! line for the "pending components" section instead. Hour-summary tables
//! are looked for on every page regardless of which path fired.

use crate::model::{HourSummary, PendingComponent, ENROLLED_SUFFIX, EXAM_MARKER};
use crate::pipeline::normalize::{clean_cell, clean_text, digits_or_zero};
use crate::pipeline::source::{PageContent, Table, TranscriptDocument};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Components and hour totals read from one transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptData {
    pub components: Vec<PendingComponent>,
    pub hours: HourSummary,
}

/// How a single page yielded its pending components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageParse {
    /// A pending-components table was found. It may hold no usable rows.
    Table(Vec<PendingComponent>),
    /// No table; the text section produced at least one component.
    TextFallback(Vec<PendingComponent>),
    /// Nothing pending on this page.
    Empty,
}

impl PageParse {
    pub fn into_components(self) -> Vec<PendingComponent> {
        match self {
            PageParse::Table(c) | PageParse::TextFallback(c) => c,
            PageParse::Empty => Vec::new(),
        }
    }
}

/// Extract pending components and the hour summary from every page.
///
/// When several summary rows are found, the last one wins.
pub fn extract_transcript(document: &TranscriptDocument) -> TranscriptData {
    let mut data = TranscriptData::default();

    for (idx, page) in document.pages.iter().enumerate() {
        if let Some(hours) = find_hour_summary(&page.tables) {
            data.hours = hours;
        }

        let parsed = parse_page(page);
        match &parsed {
            PageParse::Table(c) => debug!("Page {}: {} components from table", idx + 1, c.len()),
            PageParse::TextFallback(c) => {
                debug!("Page {}: {} components from text", idx + 1, c.len())
            }
            PageParse::Empty => debug!("Page {}: no pending components", idx + 1),
        }
        data.components.extend(parsed.into_components());
    }

    data
}

/// Pick the extraction path for one page.
pub fn parse_page(page: &PageContent) -> PageParse {
    let mut found_table = false;
    let mut components = Vec::new();

    for table in &page.tables {
        if is_pending_table(table) {
            found_table = true;
            components.extend(table.iter().skip(1).filter_map(|row| component_from_row(row)));
        }
    }

    if found_table {
        return PageParse::Table(components);
    }

    let fallback = components_from_text(&page.text);
    if fallback.is_empty() {
        PageParse::Empty
    } else {
        PageParse::TextFallback(fallback)
    }
}

// ── Hour summary ─────────────────────────────────────────────────────────────

fn header_text(table: &Table) -> Option<String> {
    let header = table.first()?;
    let joined = header
        .iter()
        .flatten()
        .map(|c| clean_text(Some(c.as_str())))
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined.to_uppercase())
}

fn is_summary_table(table: &Table) -> bool {
    match header_text(table) {
        Some(h) => (h.contains("CARGA") && h.contains("HORÁRIA")) || h.contains("OBRIGATÓRIAS"),
        None => false,
    }
}

/// The last "PENDENTE" row of the last summary table on the page.
pub fn find_hour_summary(tables: &[Table]) -> Option<HourSummary> {
    let mut found = None;
    for table in tables.iter().filter(|t| is_summary_table(t)) {
        for row in table {
            let first = row.first().map(clean_cell).unwrap_or_default();
            if !first.to_uppercase().contains("PENDENTE") {
                continue;
            }
            let cells: Vec<String> = row
                .iter()
                .flatten()
                .map(|c| clean_text(Some(c.as_str())))
                .collect();
            if let [.., optional, complementary, total] = cells.as_slice() {
                found = Some(HourSummary {
                    optional_hours: digits_or_zero(optional),
                    complementary_hours: digits_or_zero(complementary),
                    total_hours: digits_or_zero(total),
                });
            }
        }
    }
    found
}

// ── Pending-components table ─────────────────────────────────────────────────

static RE_HOURS_CELL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d+) *h?$").unwrap());

fn is_pending_table(table: &Table) -> bool {
    let Some(header) = table.first() else {
        return false;
    };
    let cells: Vec<String> = header
        .iter()
        .flatten()
        .map(|c| clean_text(Some(c.as_str())).to_uppercase())
        .collect();
    cells.iter().any(|c| c == "CÓDIGO") && cells.iter().any(|c| c == "COMPONENTE CURRICULAR")
}

fn component_from_row(row: &[Option<String>]) -> Option<PendingComponent> {
    if row.len() < 2 {
        return None;
    }
    let code = clean_cell(&row[0]);
    let mut title = clean_cell(&row[1]);
    if code.is_empty() || title.is_empty() || mentions_exam(&code, &title) {
        return None;
    }

    let hours = row[2..]
        .iter()
        .map(clean_cell)
        .find_map(|cell| {
            RE_HOURS_CELL
                .captures(&cell)
                .map(|caps| format!("{} h", &caps[1]))
        })
        .unwrap_or_default();

    let enrolled = row
        .iter()
        .flatten()
        .any(|c| c.to_uppercase().contains("MATRICULADO"));
    if enrolled {
        mark_enrolled(&mut title);
    }

    Some(PendingComponent { code, title, hours })
}

// ── Text fallback ────────────────────────────────────────────────────────────

const SECTION_START: &str = "COMPONENTES CURRICULARES OBRIGATÓRIOS PENDENTES";
const SECTION_END: [&str; 6] = [
    "INTEGRALIZADOS",
    "SITUAÇÃO",
    "CARGA HORÁRIA",
    "TOTAL",
    "OBSERVAÇÕES:",
    "EQUIVALÊNCIAS:",
];

static RE_COMPONENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z0-9]{6,})\s+(.+)$").unwrap());
static RE_TRAILING_HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*h$").unwrap());

/// Parse the pending section of a page's raw text.
pub fn components_from_text(text: &str) -> Vec<PendingComponent> {
    let mut components = Vec::new();
    let mut capturing = false;

    for line in text
        .lines()
        .map(|l| clean_text(Some(l)))
        .filter(|l| !l.is_empty())
    {
        let upper = line.to_uppercase();
        if upper.contains(SECTION_START) {
            capturing = true;
            continue;
        }
        if !capturing {
            continue;
        }
        if SECTION_END.iter().any(|stop| upper.contains(stop)) {
            break;
        }
        if let Some(component) = component_from_line(&line) {
            components.push(component);
        }
    }

    components
}

fn component_from_line(line: &str) -> Option<PendingComponent> {
    let caps = RE_COMPONENT_LINE.captures(line)?;
    let code = caps[1].to_string();
    let rest = caps.get(2)?.as_str();

    let (mut title, hours) = match RE_TRAILING_HOURS.captures(rest) {
        Some(h) => {
            let digits = h.get(1)?;
            (
                rest[..digits.start()].trim().to_string(),
                format!("{} h", digits.as_str()),
            )
        }
        None => (rest.to_string(), String::new()),
    };

    if title.is_empty() || mentions_exam(&code, &title) {
        return None;
    }
    if title.to_uppercase().contains("MATRICULADO") {
        mark_enrolled(&mut title);
    }

    Some(PendingComponent { code, title, hours })
}

// ── Shared rules ─────────────────────────────────────────────────────────────

fn mentions_exam(code: &str, title: &str) -> bool {
    code.to_uppercase().contains(EXAM_MARKER) || title.to_uppercase().contains(EXAM_MARKER)
}

/// Append the enrollment suffix unless the title already carries it, in any
/// letter case.
fn mark_enrolled(title: &mut String) {
    let marker = ENROLLED_SUFFIX.trim().to_uppercase();
    if !title.to_uppercase().contains(&marker) {
        title.push_str(ENROLLED_SUFFIX);
    }
}
