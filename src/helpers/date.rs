//! Date helper functions

use chrono::{DateTime, NaiveDate};

use crate::content::parse_iso_date;

/// Format an ISO-8601 date for display, e.g. `Aug 25, 2025`.
///
/// Date-times keep the offset they were written in, so the calendar day is
/// the author's. Unparseable input is returned unchanged.
pub fn display_date(iso: &str, format: &str) -> String {
    if let Ok(date) = DateTime::parse_from_rfc3339(iso) {
        return date.naive_local().format(format).to_string();
    }
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format(format).to_string(),
        Err(_) => iso.to_string(),
    }
}

/// Machine-readable form for `<time datetime>`
pub fn date_xml(iso: &str) -> String {
    match parse_iso_date(iso) {
        Some(_) if is_date_only(iso) => iso.to_string(),
        Some(date) => date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => iso.to_string(),
    }
}

fn is_date_only(iso: &str) -> bool {
    iso.len() == 10
}
