//! Date and field-name normalization shared by the flattener and the edit path.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::record::DateValue;

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

/// How a date is rendered into the canonical document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// "Jan 2023"
    MonthYear,
    /// "2023", used for education ranges.
    YearOnly,
}

/// Formats a record date for display.
///
/// Typed dates and ISO strings for the same calendar day produce the same
/// output. Timestamps are read in UTC. Missing or blank input yields `""`, as
/// do epoch milliseconds outside chrono's range; non-empty text that is not a
/// recognizable date is returned trimmed.
pub fn format_date(value: Option<&DateValue>, style: DateStyle) -> String {
    let date = match value {
        None => return String::new(),
        Some(DateValue::Date(d)) => *d,
        Some(DateValue::Timestamp(ts)) => ts.date_naive(),
        Some(DateValue::Millis(ms)) => match DateTime::from_timestamp_millis(*ms) {
            Some(ts) => ts.date_naive(),
            None => return String::new(),
        },
        Some(DateValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return String::new();
            }
            match parse_iso_date(text) {
                Some(d) => d,
                None => return text.to_string(),
            }
        }
    };

    match style {
        DateStyle::MonthYear => date.format("%b %Y").to_string(),
        DateStyle::YearOnly => date.format("%Y").to_string(),
    }
}

/// Parses the machine formats a record may carry as text.
fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    // Offsets written without a colon, e.g. "+0000"
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(ts) = DateTime::parse_from_str(text, fmt) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
    }
    // SQL text output uses a space instead of 'T'
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    // <input type="month"> values
    NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok()
}

/// Reads a date back out of an edited display string.
///
/// Accepts everything `format_date` can emit ("Jan 2023", "2023") as well as
/// the ISO forms. Month-year resolves to the first of the month, year-only
/// to January 1st.
pub fn parse_display_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(d) = parse_iso_date(text) {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("1 {text}"), "%d %b %Y") {
        return Some(d);
    }
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        let year = text.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Field names
// ────────────────────────────────────────────────────────────────────────────

/// Record-side collections a field delta can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordSection {
    ContactInfo,
    Summary,
    Experiences,
    Educations,
    Projects,
    Certifications,
    Languages,
    CustomSections,
}

impl RecordSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSection::ContactInfo => "contactInfo",
            RecordSection::Summary => "summary",
            RecordSection::Experiences => "experiences",
            RecordSection::Educations => "educations",
            RecordSection::Projects => "projects",
            RecordSection::Certifications => "certifications",
            RecordSection::Languages => "languages",
            RecordSection::CustomSections => "customSections",
        }
    }
}

/// UI field name → record field name, per section. Anything not listed is
/// spelled the same on both sides.
const FIELD_NAME_MAP: &[(RecordSection, &str, &str)] = &[
    (RecordSection::ContactInfo, "name", "fullName"),
    (RecordSection::ContactInfo, "website", "websiteUrl"),
    (RecordSection::ContactInfo, "linkedin", "linkedinUrl"),
    (RecordSection::Summary, "summary", "content"),
    (RecordSection::Experiences, "title", "jobTitle"),
    (RecordSection::Experiences, "current", "isCurrent"),
    (RecordSection::Projects, "title", "name"),
    (RecordSection::Projects, "link", "url"),
    (RecordSection::Certifications, "date", "issueDate"),
];

/// Maps a UI field name to the record field it is persisted under.
/// Unmapped names pass through unchanged.
pub fn map_field_name<'a>(section: RecordSection, ui_field: &'a str) -> &'a str {
    FIELD_NAME_MAP
        .iter()
        .find(|(s, ui, _)| *s == section && *ui == ui_field)
        .map(|(_, _, record)| *record)
        .unwrap_or(ui_field)
}

/// Reverse of [`map_field_name`].
pub fn unmap_field_name<'a>(section: RecordSection, record_field: &'a str) -> &'a str {
    FIELD_NAME_MAP
        .iter()
        .find(|(s, _, record)| *s == section && *record == record_field)
        .map(|(_, ui, _)| *ui)
        .unwrap_or(record_field)
}
