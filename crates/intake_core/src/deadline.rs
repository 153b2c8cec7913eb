use std::sync::OnceLock;

use regex::Regex;
use shared::domain::DEADLINE_DELIMITER;

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("regex for iso dates"))
}

/// Shape check only (`YYYY-MM-DD`); calendar validity is not enforced.
pub fn looks_like_date(value: &str) -> bool {
    date_pattern().is_match(value)
}

fn first_segment(details: &str) -> &str {
    details.split(DEADLINE_DELIMITER).next().unwrap_or_default()
}

fn second_segment(details: &str) -> Option<&str> {
    details.split(DEADLINE_DELIMITER).nth(1)
}

/// Replaces the date half, keeping any note that follows the delimiter.
pub fn with_date(details: &str, date: &str) -> String {
    match second_segment(details).filter(|note| !note.is_empty()) {
        Some(note) => format!("{date}{DEADLINE_DELIMITER}{note}"),
        None => date.to_string(),
    }
}

/// Replaces the note half. A leading segment that is not a date is discarded.
pub fn with_note(details: &str, note: &str) -> String {
    let current = first_segment(details);
    if looks_like_date(current) {
        format!("{current}{DEADLINE_DELIMITER}{note}")
    } else {
        note.to_string()
    }
}

/// Value for the date picker.
pub fn date_part(details: &str) -> Option<&str> {
    Some(first_segment(details)).filter(|segment| looks_like_date(segment))
}

/// Value for the free-text input.
pub fn note_part(details: &str) -> &str {
    if details.contains(DEADLINE_DELIMITER) {
        second_segment(details).unwrap_or_default()
    } else {
        details
    }
}
