use crate::domain::model::{Record, StandardizedFields};
use crate::quality::dates::parse_date;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("USA", "US"),
    ("US", "US"),
    ("United States", "US"),
    ("United States of America", "US"),
    ("United Kingdom", "GB"),
    ("UK", "GB"),
    ("Great Britain", "GB"),
    ("Deutschland", "DE"),
    ("Germany", "DE"),
    ("European Union", "EU"),
    ("EU", "EU"),
    ("Europe", "EU"),
    ("France", "FR"),
    ("Frankreich", "FR"),
    ("Japan", "JP"),
    ("Canada", "CA"),
    ("Kanada", "CA"),
    ("Australia", "AU"),
    ("Australien", "AU"),
    ("Switzerland", "CH"),
    ("Schweiz", "CH"),
    ("China", "CN"),
    ("Brazil", "BR"),
    ("Brasilien", "BR"),
];

// Order matters: the first key contained in the lowercased category wins.
const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("510k", "FDA 510(k) Clearance"),
    ("510(k)", "FDA 510(k) Clearance"),
    ("pma", "FDA PMA Approval"),
    ("de novo", "FDA De Novo Classification"),
    ("recall", "Safety Recall"),
    ("safety", "Safety Communication"),
    ("guidance", "Guidance Document"),
    ("guideline", "Guidance Document"),
    ("ce mark", "CE Marking"),
    ("mdr", "EU MDR"),
    ("ivdr", "EU IVDR"),
    ("standard", "Standard Update"),
    ("approval", "Approval"),
    ("regulation", "Regulation"),
];

static TITLE_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-():,.]").expect("title allow-list pattern is valid"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Map a free-text region/country to its code, if the alias table knows it.
pub fn normalize_country(raw: &str) -> Option<&'static str> {
    let raw = raw.trim();
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, code)| *code)
}

pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    parse_date(raw)
}

pub fn standardize_category(raw: &str) -> Option<&'static str> {
    let lowered = raw.to_lowercase();
    CATEGORY_ALIASES
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, label)| *label)
}

/// Remove characters outside the title allow-list and collapse whitespace.
pub fn clean_title(raw: &str) -> String {
    let stripped = TITLE_DISALLOWED.replace_all(raw, "");
    WHITESPACE_RUN.replace_all(stripped.trim(), " ").into_owned()
}

/// Best-effort normalization of one record.
///
/// Only fields with a recognized mapping are populated; the record itself is
/// left untouched.
pub fn standardize(record: &Record) -> StandardizedFields {
    let title = clean_title(&record.title);

    StandardizedFields {
        country_code: record
            .region
            .as_deref()
            .and_then(normalize_country)
            .map(str::to_string),
        normalized_date: record.published_at.as_deref().and_then(normalize_date),
        standardized_category: record
            .category
            .as_deref()
            .and_then(standardize_category)
            .map(str::to_string),
        cleaned_title: (!title.is_empty()).then_some(title),
    }
}
