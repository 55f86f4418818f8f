//! Domain records produced by the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Suffix appended to a component title when the student is currently
/// enrolled in it.
pub const ENROLLED_SUFFIX: &str = " (Matriculado)";

/// Marker for the national exam pseudo-component, never a real pending item.
pub const EXAM_MARKER: &str = "ENADE";

/// One curricular component the student has not completed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingComponent {
    pub code: String,
    pub title: String,
    /// `"<digits> h"`, or empty when the workload could not be resolved.
    pub hours: String,
}

impl PendingComponent {
    /// `"<code> <title> <hours>"`, trimmed (no trailing space when `hours` is empty).
    pub fn display_text(&self) -> String {
        format!("{} {} {}", self.code, self.title, self.hours)
            .trim()
            .to_string()
    }
}

/// Pending curricular-hour totals read from the transcript's summary table.
///
/// Every field is a digit string; `"0"` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSummary {
    pub optional_hours: String,
    pub complementary_hours: String,
    pub total_hours: String,
}

impl Default for HourSummary {
    fn default() -> Self {
        Self {
            optional_hours: "0".to_string(),
            complementary_hours: "0".to_string(),
            total_hours: "0".to_string(),
        }
    }
}

impl HourSummary {
    /// `"<total> h"`, falling back to `"0 h"`.
    pub fn total_label(&self) -> String {
        if self.total_hours.is_empty() {
            "0 h".to_string()
        } else {
            format!("{} h", self.total_hours)
        }
    }
}

/// Everything the report needs about one transcript file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Name of the PDF inside the input folder.
    pub file_name: String,
    /// Registration number taken from the file name; empty if absent.
    pub registration: String,
    /// Student name from page 1; empty if not found.
    pub name: String,
    pub components: Vec<PendingComponent>,
    pub hours: HourSummary,
    /// Looked-up completion percentage; empty if unknown.
    pub percentage: String,
}

/// One row of the report, already rendered for all three outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Text for the delimited file and the text log.
    pub consolidated: String,
    /// Text for the "Componentes Pendentes" spreadsheet column.
    pub component_text: String,
    /// `Some` only on the first row of a student: sequence, summary,
    /// total-hours label and percentage.
    pub lead: Option<LeadColumns>,
}

/// Columns carried only by the first row of a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadColumns {
    pub sequence: u32,
    pub summary: String,
    pub total_label: String,
    pub percentage: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_without_hours_has_no_trailing_space() {
        let c = PendingComponent {
            code: "DIM0120".into(),
            title: "Estruturas de Dados".into(),
            hours: String::new(),
        };
        assert_eq!(c.display_text(), "DIM0120 Estruturas de Dados");
    }

    #[test]
    fn display_text_with_hours() {
        let c = PendingComponent {
            code: "DIM0120".into(),
            title: "Estruturas de Dados".into(),
            hours: "60 h".into(),
        };
        assert_eq!(c.display_text(), "DIM0120 Estruturas de Dados 60 h");
    }

    #[test]
    fn hour_summary_defaults_to_zero() {
        let h = HourSummary::default();
        assert_eq!(h.optional_hours, "0");
        assert_eq!(h.total_label(), "0 h");
    }

    #[test]
    fn empty_total_label() {
        let h = HourSummary {
            total_hours: String::new(),
            ..HourSummary::default()
        };
        assert_eq!(h.total_label(), "0 h");
    }
}
