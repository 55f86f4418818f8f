//! The three report documents, written in lockstep.
//!
//! Every artifact is built in a temp file inside the output folder and only
//! renamed to its final name by [`ReportWriters::finish`]. Dropping the
//! writers before that (a failed run) deletes the temp files, so a failed
//! run never leaves a half-written report under a final name.

use crate::error::ReportError;
use crate::model::{ReportRow, StudentRecord};
use crate::output::ReportNames;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use umya_spreadsheet::{HorizontalAlignmentValues, Spreadsheet, VerticalAlignmentValues};

/// Title of the only worksheet.
pub const SHEET_NAME: &str = "Componentes Pendentes";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const SHEET_HEADER: [&str; 8] = [
    "",
    "Matrícula",
    "Nome",
    "E-mail",
    "Componentes Pendentes",
    "Quantidade de \n Componentes",
    "CH Pendente",
    "Percentual\nCumprido",
];

const CSV_HEADER: [&str; 2] = ["Linha Consolidada", "Arquivo"];

/// Open spreadsheet, delimited file and text log for one run.
pub struct ReportWriters {
    output_dir: PathBuf,
    names: ReportNames,
    book: Spreadsheet,
    next_sheet_row: u32,
    csv: csv::Writer<NamedTempFile>,
    txt: BufWriter<NamedTempFile>,
    rows_written: usize,
}

impl ReportWriters {
    /// Create the temp artifacts and write the three headers.
    pub fn create(output_dir: &Path, names: &ReportNames) -> Result<Self, ReportError> {
        std::fs::create_dir_all(output_dir).map_err(|e| ReportError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

        let mut csv_tmp = temp_artifact(output_dir, &names.csv)?;
        csv_tmp
            .write_all(UTF8_BOM)
            .map_err(|e| write_failed(output_dir, &names.csv, e))?;
        let mut csv = csv::WriterBuilder::new()
            .delimiter(b';')
            .terminator(csv::Terminator::CRLF)
            .from_writer(csv_tmp);
        csv.write_record(CSV_HEADER)
            .map_err(|e| write_failed(output_dir, &names.csv, e.into()))?;

        let mut txt = BufWriter::new(temp_artifact(output_dir, &names.txt)?);
        txt.write_all(UTF8_BOM)
            .map_err(|e| write_failed(output_dir, &names.txt, e))?;

        let mut book = umya_spreadsheet::new_file();
        let sheet = book
            .get_sheet_mut(&0)
            .ok_or_else(|| ReportError::Internal("new workbook has no sheet".into()))?;
        sheet.set_name(SHEET_NAME);
        for (idx, title) in SHEET_HEADER.iter().enumerate() {
            if title.is_empty() {
                continue;
            }
            let coord = (idx as u32 + 1, 1);
            sheet.get_cell_mut(coord).set_value(*title);
            let style = sheet.get_style_mut(coord);
            style.get_font_mut().set_bold(true);
            let alignment = style.get_alignment_mut();
            alignment.set_horizontal(HorizontalAlignmentValues::Center);
            alignment.set_vertical(VerticalAlignmentValues::Center);
            alignment.set_wrap_text(true);
        }

        debug!("Opened report artifacts in {}", output_dir.display());
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            names: names.clone(),
            book,
            next_sheet_row: 2,
            csv,
            txt,
            rows_written: 0,
        })
    }

    /// Append one student's rows to all three documents.
    pub fn write_student(
        &mut self,
        record: &StudentRecord,
        rows: &[ReportRow],
    ) -> Result<(), ReportError> {
        for row in rows {
            self.csv
                .write_record([row.consolidated.as_str(), record.file_name.as_str()])
                .map_err(|e| write_failed(&self.output_dir, &self.names.csv, e.into()))?;

            self.txt
                .write_all(row.consolidated.as_bytes())
                .and_then(|_| self.txt.write_all(b"\n"))
                .map_err(|e| write_failed(&self.output_dir, &self.names.txt, e))?;

            self.write_sheet_row(record, row)?;
            self.rows_written += 1;
        }
        Ok(())
    }

    fn write_sheet_row(
        &mut self,
        record: &StudentRecord,
        row: &ReportRow,
    ) -> Result<(), ReportError> {
        let r = self.next_sheet_row;
        let sheet = self
            .book
            .get_sheet_mut(&0)
            .ok_or_else(|| ReportError::Internal("workbook lost its sheet".into()))?;

        let mut text = |col: u32, value: &str| {
            if !value.is_empty() {
                sheet.get_cell_mut((col, r)).set_value(value);
            }
        };
        text(2, &record.registration);
        text(3, &record.name);
        text(5, &row.component_text);
        if let Some(lead) = &row.lead {
            text(6, &lead.summary);
            text(7, &lead.total_label);
            text(8, &lead.percentage);
            sheet.get_cell_mut((1, r)).set_value_number(lead.sequence);
        }

        self.next_sheet_row += 1;
        Ok(())
    }

    /// Flush everything and move the artifacts to their final names.
    pub fn finish(self) -> Result<usize, ReportError> {
        let Self {
            output_dir,
            names,
            book,
            mut csv,
            txt,
            rows_written,
            ..
        } = self;

        let mut excel_tmp = temp_artifact(&output_dir, &names.excel)?;
        umya_spreadsheet::writer::xlsx::write_writer(&book, &mut excel_tmp).map_err(|e| {
            ReportError::SpreadsheetSaveFailed {
                path: output_dir.join(&names.excel),
                detail: e.to_string(),
            }
        })?;

        csv.flush()
            .map_err(|e| write_failed(&output_dir, &names.csv, e))?;
        let csv_tmp = csv.into_inner().map_err(|e| {
            let source = io::Error::new(e.error().kind(), e.error().to_string());
            write_failed(&output_dir, &names.csv, source)
        })?;
        let txt_tmp = txt
            .into_inner()
            .map_err(|e| write_failed(&output_dir, &names.txt, e.into_error()))?;

        for (tmp, name) in [
            (excel_tmp, &names.excel),
            (csv_tmp, &names.csv),
            (txt_tmp, &names.txt),
        ] {
            persist(tmp, &output_dir.join(name))?;
        }

        debug!("Persisted {} rows to {}", rows_written, output_dir.display());
        Ok(rows_written)
    }
}

fn temp_artifact(output_dir: &Path, name: &str) -> Result<NamedTempFile, ReportError> {
    tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(output_dir)
        .map_err(|e| write_failed(output_dir, name, e))
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<File, ReportError> {
    tmp.as_file()
        .sync_all()
        .map_err(|e| ReportError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tmp.persist(path).map_err(|e| ReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e.error,
    })
}

fn write_failed(output_dir: &Path, name: &str, source: io::Error) -> ReportError {
    ReportError::OutputWriteFailed {
        path: output_dir.join(name),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HourSummary, PendingComponent};
    use crate::pipeline::summary::build_rows;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn student(file: &str, components: &[(&str, &str)]) -> StudentRecord {
        StudentRecord {
            file_name: file.into(),
            registration: "2023001".into(),
            name: "ANA LIMA".into(),
            components: components
                .iter()
                .map(|(code, title)| PendingComponent {
                    code: code.to_string(),
                    title: title.to_string(),
                    hours: "60 h".into(),
                })
                .collect(),
            hours: HourSummary {
                total_hours: "120".into(),
                ..HourSummary::default()
            },
            percentage: "75".into(),
        }
    }

    #[test]
    fn writes_three_synchronised_documents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let names = ReportNames::default();
        let mut w = ReportWriters::create(&out, &names).unwrap();

        let mut seq = 1;
        let a = student("historico_1.pdf", &[("DIM0120", "Dados"), ("DIM0121", "Redes")]);
        w.write_student(&a, &build_rows(&a, &mut seq)).unwrap();
        let b = student("historico_2.pdf", &[]);
        w.write_student(&b, &build_rows(&b, &mut seq)).unwrap();
        assert_eq!(w.finish().unwrap(), 3);

        let csv_bytes = std::fs::read(out.join(&names.csv)).unwrap();
        assert!(csv_bytes.starts_with(UTF8_BOM));
        let csv_text = String::from_utf8(csv_bytes[3..].to_vec()).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(
            lines,
            [
                "Linha Consolidada;Arquivo",
                "DIM0120 Dados 60 h ; 2 componentes; 120 h;historico_1.pdf",
                "DIM0121 Redes 60 h;historico_1.pdf",
                "não contém ; 120 h;historico_2.pdf",
            ]
        );

        let txt = std::fs::read_to_string(out.join(&names.txt)).unwrap();
        assert_eq!(
            txt.trim_start_matches('\u{feff}'),
            "DIM0120 Dados 60 h ; 2 componentes; 120 h\nDIM0121 Redes 60 h\nnão contém ; 120 h\n"
        );

        let mut wb: Xlsx<_> = open_workbook(out.join(&names.excel)).unwrap();
        assert_eq!(wb.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = wb.worksheet_range(SHEET_NAME).unwrap();
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][1], Data::String("Matrícula".into()));
        assert_eq!(rows[1][0], Data::Float(1.0));
        assert_eq!(rows[1][4], Data::String("DIM0120 Dados 60 h".into()));
        assert_eq!(rows[1][7], Data::String("75".into()));
        assert_eq!(rows[2][0], Data::Empty);
        assert_eq!(rows[2][1], Data::String("2023001".into()));
        assert_eq!(rows[2][5], Data::Empty);
        assert_eq!(rows[3][0], Data::Float(2.0));
        assert_eq!(rows[3][4], Data::String("não contém".into()));

        let leftovers: Vec<_> = std::fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn dropped_writers_leave_no_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let names = ReportNames::default();
        {
            let mut w = ReportWriters::create(dir.path(), &names).unwrap();
            let a = student("historico_1.pdf", &[("DIM0120", "Dados")]);
            let mut seq = 1;
            w.write_student(&a, &build_rows(&a, &mut seq)).unwrap();
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn csv_quotes_fields_containing_the_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let names = ReportNames::default();
        let mut w = ReportWriters::create(dir.path(), &names).unwrap();
        let a = student("a;b.pdf", &[]);
        let mut seq = 1;
        w.write_student(&a, &build_rows(&a, &mut seq)).unwrap();
        w.finish().unwrap();

        let text = std::fs::read_to_string(dir.path().join(&names.csv)).unwrap();
        assert!(text.contains("não contém ; 120 h;\"a;b.pdf\""));
    }
}
