//! Whitespace normalisation for extracted cell and line text.

/// Collapse every whitespace run (newlines included) to one space and trim.
///
/// Absent input yields an empty string.
pub fn clean_text(input: Option<&str>) -> String {
    match input {
        Some(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

/// [`clean_text`] for a table cell.
pub fn clean_cell(cell: &Option<String>) -> String {
    clean_text(cell.as_deref())
}

/// Keep only ASCII digits, defaulting to `"0"` when none remain.
pub fn digits_or_zero(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        "0".to_string()
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_and_newlines() {
        assert_eq!(
            clean_text(Some("  Cálculo\n  Diferencial \t I ")),
            "Cálculo Diferencial I"
        );
    }

    #[test]
    fn absent_is_empty() {
        assert_eq!(clean_text(None), "");
        assert_eq!(clean_cell(&None), "");
        assert_eq!(clean_text(Some(" \r\n ")), "");
    }

    #[test]
    fn digits_only() {
        assert_eq!(digits_or_zero("  45h  "), "45");
        assert_eq!(digits_or_zero("1.200 h"), "1200");
        assert_eq!(digits_or_zero("abc"), "0");
        assert_eq!(digits_or_zero(""), "0");
    }
}
