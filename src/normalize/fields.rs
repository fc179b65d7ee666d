//! Field-level derivations shared by the source mappings.
//!
//! Every function here is total: unparseable input is passed through or
//! degraded to an empty string, never reported as an error.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Output format of [`standardize_date`].
pub const DATE_FORMAT: &str = "%m/%d/%Y";
/// Output format of [`standardize_time`].
pub const TIME_FORMAT: &str = "%I:%M %p";

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_INPUTS: &[&str] = &[
    "%m/%d/%Y",
    "%m/%d/%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b. %d, %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

const TIME_INPUTS: &[&str] = &["%I:%M %p", "%H:%M", "%I:%M:%S %p", "%H:%M:%S"];

static ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());
static COUNTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\w+)\s+County").unwrap());
static COUNTY_TENNESSEE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\w+)\s+County,?\s+Tennessee").unwrap());
static SALE_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d{1,2}:\d{2}\s*[AP]M)").unwrap());

fn plausible(date: NaiveDate) -> bool {
    (1900..=2100).contains(&date.year())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    let from_datetime = DATETIME_INPUTS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .find(|d| plausible(*d));
    if from_datetime.is_some() {
        return from_datetime;
    }
    DATE_INPUTS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .find(|d| plausible(*d))
}

/// Normalize a sale date to `MM/DD/YYYY`, passing unparseable text through.
pub fn standardize_date(raw: &str) -> String {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return String::new();
    }
    let text = ORDINAL.replace_all(&text, "$1");
    match parse_date(&text) {
        Some(d) => d.format(DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Normalize a sale time to `HH:MM AM/PM`, passing unparseable text through.
pub fn standardize_time(raw: &str) -> String {
    let text = raw.trim();
    if text.is_empty() {
        return String::new();
    }
    TIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| text.to_string())
}

/// First letter of a county name, uppercased.
pub fn priority_letter(county: &str) -> String {
    county
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// Priority letter from a "<Name> County" mention anywhere in the text.
pub fn priority_letter_from_text(text: &str) -> String {
    letter_from(&COUNTY, text)
}

/// Priority letter from a "<Name> County, Tennessee" mention.
pub fn priority_letter_from_sale_text(text: &str) -> String {
    letter_from(&COUNTY_TENNESSEE, text)
}

fn letter_from(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| priority_letter(m.as_str()))
        .unwrap_or_default()
}

/// The first "H:MM AM/PM" mention in free text, standardized.
pub fn extract_sale_time(text: &str) -> String {
    SALE_TIME
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| standardize_time(m.as_str()))
        .unwrap_or_default()
}
