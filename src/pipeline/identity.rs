//! Student identity: registration number and name.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_REGISTRATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)historico[_-]?(\d+)").unwrap());

static RE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)Nome:\s*([A-ZÀ-Ú\s]+?)(?:\s+Matrícula:|\s*$)").unwrap()
});

/// Registration number embedded in a transcript file name, e.g.
/// `historico_20230012345.pdf`. Empty when the name does not follow the
/// pattern.
pub fn registration_from_file_name(file_name: &str) -> String {
    RE_REGISTRATION
        .captures(file_name)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Student name printed after `Nome:` on the first page.
///
/// Only upper-case letters (accented included) and whitespace are accepted,
/// so a name followed by `Matrícula:` on the same line is cut there.
pub fn student_name(first_page_text: &str) -> String {
    let text = first_page_text.replace("\r\n", "\n");
    RE_NAME
        .captures(&text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}
