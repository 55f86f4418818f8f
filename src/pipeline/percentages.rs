//! Percentage table: registration number → completion percentage.
//!
//! The spreadsheet comes from the academic system's export and carries a
//! block of title/metadata rows before the data. Two container formats are
//! accepted: the legacy binary `.xls` and the OOXML family (`.xlsx`,
//! `.xlsm`, `.xltx`, `.xltm`). Both are read through calamine and both
//! address rows by their *absolute* sheet index, so the skipped header
//! region is identical whichever format the file uses and wherever the
//! sheet's used range happens to begin.
//!
//! Loading never fails the run: [`load_percentages`] logs the problem and
//! returns what it has. [`try_load_percentages`] exposes the error for
//! callers that want it.

use crate::config::ReportConfig;
use crate::error::PercentageError;
use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Registration number → percentage, both as display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PercentageTable {
    entries: HashMap<String, String>,
}

impl PercentageTable {
    /// Percentage for a registration number; `None` if absent or the
    /// registration is empty.
    pub fn get(&self, registration: &str) -> Option<&str> {
        if registration.is_empty() {
            return None;
        }
        self.entries.get(registration).map(String::as_str)
    }

    /// Percentage for a registration number, empty when unknown.
    pub fn lookup(&self, registration: &str) -> String {
        self.get(registration).unwrap_or_default().to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, registration: String, percentage: String) {
        self.entries.insert(registration, percentage);
    }
}

impl FromIterator<(String, String)> for PercentageTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Spreadsheet container formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// BIFF `.xls`.
    Legacy,
    /// Office Open XML workbook or template.
    OpenXml,
}

impl SheetFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xls" => Some(SheetFormat::Legacy),
            "xlsx" | "xlsm" | "xltx" | "xltm" => Some(SheetFormat::OpenXml),
            _ => None,
        }
    }
}

/// Load the percentage table, logging and swallowing every failure.
///
/// * `None` → empty table, no warning.
/// * missing file / unsupported extension → warning, empty table.
/// * unreadable workbook → warning, rows gathered so far.
pub fn load_percentages(path: Option<&Path>, config: &ReportConfig) -> PercentageTable {
    let Some(path) = path else {
        info!("No percentage file given; reports will carry no percentages");
        return PercentageTable::default();
    };

    let mut table = PercentageTable::default();
    match read_into(path, config, &mut table) {
        Ok(()) => info!("{} percentages loaded from {}", table.len(), path.display()),
        Err(e) => warn!(
            "Could not load percentages ({}); continuing with {} entries",
            e,
            table.len()
        ),
    }
    table
}

/// Strict variant of [`load_percentages`] for callers that want the error.
pub fn try_load_percentages(
    path: &Path,
    config: &ReportConfig,
) -> Result<PercentageTable, PercentageError> {
    let mut table = PercentageTable::default();
    read_into(path, config, &mut table)?;
    Ok(table)
}

fn read_into(
    path: &Path,
    config: &ReportConfig,
    table: &mut PercentageTable,
) -> Result<(), PercentageError> {
    if !path.exists() {
        return Err(PercentageError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = SheetFormat::from_path(path).ok_or_else(|| PercentageError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    debug!("Reading percentages from {} as {:?}", path.display(), format);

    let range = match format {
        SheetFormat::Legacy => {
            let workbook: Xls<_> = open_workbook(path).map_err(|e| workbook_error(path, e))?;
            first_sheet(workbook, path)?
        }
        SheetFormat::OpenXml => {
            let workbook: Xlsx<_> = open_workbook(path).map_err(|e| workbook_error(path, e))?;
            first_sheet(workbook, path)?
        }
    };

    collect_rows(&range, format, config, table);
    Ok(())
}

fn first_sheet<R, RS>(mut workbook: R, path: &Path) -> Result<Range<Data>, PercentageError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(workbook_error(path, e)),
        None => Err(PercentageError::Workbook {
            path: path.to_path_buf(),
            detail: "workbook has no sheets".to_string(),
        }),
    }
}

fn workbook_error(path: &Path, e: impl Display) -> PercentageError {
    PercentageError::Workbook {
        path: PathBuf::from(path),
        detail: e.to_string(),
    }
}

/// Walk the data region of `range` and insert every complete row.
fn collect_rows(
    range: &Range<Data>,
    format: SheetFormat,
    config: &ReportConfig,
    table: &mut PercentageTable,
) {
    let Some((first_row, first_col)) = range.start() else {
        return;
    };
    let (first_row, first_col) = (first_row as usize, first_col as usize);
    let width = first_col + range.width();
    let needed = config.registration_column.max(config.percentage_column);
    if width <= needed {
        debug!("Sheet has {} columns, need {}; nothing to read", width, needed + 1);
        return;
    }

    for (offset, row) in range.rows().enumerate() {
        if first_row + offset < config.header_rows {
            continue;
        }
        let cell = |col: usize| col.checked_sub(first_col).and_then(|i| row.get(i));
        let registration = cell(config.registration_column)
            .map(registration_text)
            .unwrap_or_default();
        let percentage = cell(config.percentage_column)
            .map(|c| percentage_text(c, format))
            .unwrap_or_default();
        if !registration.is_empty() && !percentage.is_empty() {
            table.insert(registration, percentage);
        }
    }
}

/// Registration numbers typed as numbers come back as floats; render them
/// as plain integers ("2019001234", never "2019001234.0" or "2.019e9").
fn registration_text(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.is_finite() => format!("{}", f.trunc() as i64),
        Data::Int(i) => i.to_string(),
        Data::String(s) => s.trim().to_string(),
        Data::Bool(b) => bool_text(*b).to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Percentage cell as the academic system's exports have always shown it.
///
/// Blank, zero and `FALSE` cells carry no percentage. Legacy `.xls` numbers
/// are always floating point (`100.0`, `87.5`); OOXML stores whole numbers
/// without a fraction, so those stay integral (`100`).
fn percentage_text(cell: &Data, format: SheetFormat) -> String {
    match cell {
        Data::Float(f) if *f == 0.0 => String::new(),
        Data::Float(f) if format == SheetFormat::OpenXml && is_whole(*f) => {
            format!("{}", *f as i64)
        }
        Data::Float(f) => float_text(*f),
        Data::Int(0) | Data::Bool(false) => String::new(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => bool_text(true).to_string(),
        Data::String(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn is_whole(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16
}

/// Shortest round-trip form, keeping a `.0` on whole numbers.
fn float_text(f: f64) -> String {
    if is_whole(f) {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn bool_text(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), value);
            }
        }
        range
    }

    fn data_row(registration: Data, percentage: Data) -> Vec<Data> {
        vec![
            Data::Int(1),
            registration,
            Data::String("NOME".into()),
            Data::Empty,
            Data::Empty,
            Data::Empty,
            percentage,
        ]
    }

    fn metadata_rows(n: usize) -> Vec<Vec<Data>> {
        (0..n)
            .map(|_| data_row(Data::String("MATRICULA".into()), Data::String("PERCENTUAL".into())))
            .collect()
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SheetFormat::from_path(Path::new("p.XLS")), Some(SheetFormat::Legacy));
        assert_eq!(SheetFormat::from_path(Path::new("p.xlsx")), Some(SheetFormat::OpenXml));
        assert_eq!(SheetFormat::from_path(Path::new("p.xltm")), Some(SheetFormat::OpenXml));
        assert_eq!(SheetFormat::from_path(Path::new("p.ods")), None);
        assert_eq!(SheetFormat::from_path(Path::new("p")), None);
    }

    #[test]
    fn skips_first_nine_rows() {
        let mut rows = metadata_rows(9);
        rows.push(data_row(Data::Float(2019001234.0), Data::Float(87.5)));
        rows.push(data_row(Data::String(" 2020000001 ".into()), Data::String("45,2".into())));
        let mut table = PercentageTable::default();
        collect_rows(&sheet(rows), SheetFormat::OpenXml, &ReportConfig::default(), &mut table);

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("2019001234"), "87.5");
        assert_eq!(table.lookup("2020000001"), "45,2");
        assert_eq!(table.lookup("MATRICULA"), "");
    }

    #[test]
    fn row_ten_is_the_first_data_row() {
        // Only 8 metadata rows: the ninth row is still skipped even though
        // it carries data.
        let mut rows = metadata_rows(8);
        rows.push(data_row(Data::Int(111), Data::Int(10)));
        rows.push(data_row(Data::Int(222), Data::Int(20)));
        let mut table = PercentageTable::default();
        collect_rows(&sheet(rows), SheetFormat::OpenXml, &ReportConfig::default(), &mut table);
        assert_eq!(table.get("111"), None);
        assert_eq!(table.get("222"), Some("20"));
    }

    #[test]
    fn absolute_rows_when_range_starts_late() {
        // Used range begins at sheet row 4 (0-based 3); data still starts at row 10.
        let mut range = Range::new((3, 0), (10, 6));
        for r in 3..=10u32 {
            range.set_value((r, 1), Data::Int(i64::from(r)));
            range.set_value((r, 6), Data::Int(50));
        }
        let mut table = PercentageTable::default();
        collect_rows(&range, SheetFormat::OpenXml, &ReportConfig::default(), &mut table);
        assert_eq!(table.len(), 2);
        assert!(table.get("9").is_some());
        assert!(table.get("10").is_some());
        assert!(table.get("8").is_none());
    }

    #[test]
    fn incomplete_rows_are_skipped() {
        let mut rows = metadata_rows(9);
        rows.push(data_row(Data::Empty, Data::Float(10.0)));
        rows.push(data_row(Data::Int(5), Data::Empty));
        rows.push(data_row(Data::Int(6), Data::Float(100.0)));
        let mut table = PercentageTable::default();
        collect_rows(&sheet(rows), SheetFormat::OpenXml, &ReportConfig::default(), &mut table);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("6"), "100");
    }

    #[test]
    fn zero_and_false_percentages_are_blank() {
        let mut rows = metadata_rows(9);
        rows.push(data_row(Data::Int(111), Data::Float(0.0)));
        rows.push(data_row(Data::Int(112), Data::Int(0)));
        rows.push(data_row(Data::Int(113), Data::Bool(false)));
        rows.push(data_row(Data::Int(114), Data::String("0".into())));
        let mut table = PercentageTable::default();
        collect_rows(&sheet(rows), SheetFormat::Legacy, &ReportConfig::default(), &mut table);
        assert_eq!(table.get("111"), None);
        assert_eq!(table.get("112"), None);
        assert_eq!(table.get("113"), None);
        assert_eq!(table.get("114"), Some("0"));
    }

    #[test]
    fn legacy_floats_keep_their_fraction() {
        let mut rows = metadata_rows(9);
        rows.push(data_row(Data::Float(222.0), Data::Float(100.0)));
        rows.push(data_row(Data::Float(223.0), Data::Float(87.5)));
        let mut legacy = PercentageTable::default();
        collect_rows(&sheet(rows.clone()), SheetFormat::Legacy, &ReportConfig::default(), &mut legacy);
        assert_eq!(legacy.get("222"), Some("100.0"));
        assert_eq!(legacy.get("223"), Some("87.5"));

        let mut open_xml = PercentageTable::default();
        collect_rows(&sheet(rows), SheetFormat::OpenXml, &ReportConfig::default(), &mut open_xml);
        assert_eq!(open_xml.get("222"), Some("100"));
        assert_eq!(open_xml.get("223"), Some("87.5"));
    }

    #[test]
    fn boolean_cells_render_capitalised() {
        assert_eq!(registration_text(&Data::Bool(true)), "True");
        assert_eq!(percentage_text(&Data::Bool(true), SheetFormat::OpenXml), "True");
        assert_eq!(percentage_text(&Data::Bool(false), SheetFormat::OpenXml), "");
    }

    #[test]
    fn narrow_sheet_yields_nothing() {
        let rows: Vec<Vec<Data>> = (0..12)
            .map(|i| vec![Data::Int(i), Data::Int(i * 10)])
            .collect();
        let mut table = PercentageTable::default();
        collect_rows(&sheet(rows), SheetFormat::OpenXml, &ReportConfig::default(), &mut table);
        assert!(table.is_empty());
    }

    #[test]
    fn none_path_is_empty_table() {
        assert!(load_percentages(None, &ReportConfig::default()).is_empty());
    }

    #[test]
    fn missing_file_is_empty_table() {
        let table = load_percentages(
            Some(Path::new("/definitely/not/here.xlsx")),
            &ReportConfig::default(),
        );
        assert!(table.is_empty());
        let err = try_load_percentages(
            Path::new("/definitely/not/here.xlsx"),
            &ReportConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PercentageError::NotFound { .. }));
    }

    #[test]
    fn unsupported_extension_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("percentuais.csv");
        std::fs::write(&path, "a;b\n").unwrap();
        assert!(load_percentages(Some(&path), &ReportConfig::default()).is_empty());
        assert!(matches!(
            try_load_percentages(&path, &ReportConfig::default()),
            Err(PercentageError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn corrupt_workbook_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("percentuais.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        assert!(load_percentages(Some(&path), &ReportConfig::default()).is_empty());
        assert!(matches!(
            try_load_percentages(&path, &ReportConfig::default()),
            Err(PercentageError::Workbook { .. })
        ));
    }

    #[test]
    fn empty_registration_never_matches() {
        let table: PercentageTable = vec![(String::new(), "50".to_string())].into_iter().collect();
        assert_eq!(table.get(""), None);
    }
}
