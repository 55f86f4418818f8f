//! One-line digest of a student's pending load and the report rows built from it.

use crate::model::{HourSummary, LeadColumns, PendingComponent, ReportRow, StudentRecord};

/// Text used when a student has nothing pending.
pub const NOTHING_PENDING: &str = "não contém";

/// Render the pending-load digest.
///
/// ```rust
/// use historico_report::pipeline::summary::format_summary;
/// use historico_report::HourSummary;
///
/// assert_eq!(format_summary(&[], &HourSummary::default()), "não contém");
/// ```
pub fn format_summary(components: &[PendingComponent], hours: &HourSummary) -> String {
    let mut parts = Vec::new();

    match components.len() {
        0 => {}
        1 => parts.push("1 componente".to_string()),
        n => parts.push(format!("{n} componentes")),
    }
    if is_present(&hours.optional_hours) {
        parts.push(format!("{}h optativos", hours.optional_hours));
    }
    if is_present(&hours.complementary_hours) {
        parts.push(format!("complementares {}h", hours.complementary_hours));
    }

    let total = hours.total_label();
    if !parts.is_empty() {
        format!("{}; {}", parts.join(" + "), total)
    } else if is_present(&hours.total_hours) {
        total
    } else {
        NOTHING_PENDING.to_string()
    }
}

fn is_present(hours: &str) -> bool {
    !hours.is_empty() && hours != "0"
}

/// Rows a student contributes to every artifact.
///
/// Always at least one. Only the first row carries [`LeadColumns`], and it
/// takes the next value of `sequence`.
pub fn build_rows(record: &StudentRecord, sequence: &mut u32) -> Vec<ReportRow> {
    let summary = format_summary(&record.components, &record.hours);
    let lead = LeadColumns {
        sequence: *sequence,
        summary: summary.clone(),
        total_label: record.hours.total_label(),
        percentage: record.percentage.clone(),
    };
    *sequence += 1;

    if record.components.is_empty() {
        return vec![ReportRow {
            consolidated: format!("{NOTHING_PENDING} ; {summary}"),
            component_text: NOTHING_PENDING.to_string(),
            lead: Some(lead),
        }];
    }

    let mut lead = Some(lead);
    record
        .components
        .iter()
        .map(|component| {
            let text = component.display_text();
            match lead.take() {
                Some(lead) => ReportRow {
                    consolidated: format!("{text} ; {summary}").trim().to_string(),
                    component_text: text,
                    lead: Some(lead),
                },
                None => ReportRow {
                    consolidated: text.clone(),
                    component_text: text,
                    lead: None,
                },
            }
        })
        .collect()
}
