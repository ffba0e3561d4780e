use crate::domain::model::{Priority, Record, ValidationResult};
use crate::quality::dates::parse_date;
use chrono::{Datelike, NaiveDate, Utc};
use std::collections::HashSet;
use url::Url;

const MIN_TITLE_CHARS: usize = 10;
const MIN_CONTENT_CHARS: usize = 50;
const EARLIEST_PLAUSIBLE_YEAR: i32 = 2000;

const PLACEHOLDER_PHRASES: &[&str] = &[
    "lorem ipsum",
    "placeholder",
    "todo",
    "coming soon",
    "[mock data]",
];

const REPETITION_MIN_WORDS: usize = 20;
const REPETITION_MIN_UNIQUE_RATIO: f64 = 0.3;

/// Accumulates findings and the running score for one record.
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
    score: i32,
}

impl Findings {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            score: 100,
        }
    }

    fn error(&mut self, message: impl Into<String>, penalty: i32) {
        self.errors.push(message.into());
        self.score -= penalty;
    }

    fn warning(&mut self, message: impl Into<String>, penalty: i32) {
        self.warnings.push(message.into());
        self.score -= penalty;
    }

    fn finish(self, record_id: &str) -> ValidationResult {
        ValidationResult {
            record_id: record_id.to_string(),
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            score: self.score.clamp(0, 100) as u8,
        }
    }
}

/// Rule-based record checker producing a 0-100 quality score.
///
/// Deductions are independent and additive; errors make a record invalid,
/// warnings only lower its score.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator {
    reference_date: Option<NaiveDate>,
}

impl RecordValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "today" for the future-date rule.
    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self {
            reference_date: Some(reference_date),
        }
    }

    pub fn validate(&self, record: &Record) -> ValidationResult {
        let mut findings = Findings::new();

        self.check_title(record, &mut findings);
        self.check_content(record, &mut findings);
        self.check_provenance(record, &mut findings);
        self.check_published_date(record, &mut findings);
        self.check_priority(record, &mut findings);
        self.check_urls(record, &mut findings);

        findings.finish(&record.id)
    }

    pub fn validate_batch(&self, records: &[Record]) -> Vec<ValidationResult> {
        let results: Vec<ValidationResult> = records.iter().map(|r| self.validate(r)).collect();
        let invalid = results.iter().filter(|r| !r.is_valid).count();
        tracing::debug!("Validated {} records, {} invalid", results.len(), invalid);
        results
    }

    fn check_title(&self, record: &Record, findings: &mut Findings) {
        let title = record.title.trim();
        if title.is_empty() {
            findings.error("Title is missing", 20);
        } else if title.chars().count() < MIN_TITLE_CHARS {
            findings.warning(
                format!("Title is shorter than {} characters", MIN_TITLE_CHARS),
                5,
            );
        }
    }

    fn check_content(&self, record: &Record, findings: &mut Findings) {
        let Some(content) = record.content_text() else {
            findings.error("Content is missing", 15);
            return;
        };

        if content.chars().count() < MIN_CONTENT_CHARS {
            findings.warning(
                format!("Content is shorter than {} characters", MIN_CONTENT_CHARS),
                5,
            );
        }

        let lowered = content.to_lowercase();
        if let Some(phrase) = PLACEHOLDER_PHRASES.iter().find(|p| lowered.contains(*p)) {
            findings.warning(
                format!("Mock data detected: content contains placeholder text '{}'", phrase),
                10,
            );
        }

        let words: Vec<&str> = lowered.split_whitespace().collect();
        if words.len() > REPETITION_MIN_WORDS {
            let unique: HashSet<&str> = words.iter().copied().collect();
            let ratio = unique.len() as f64 / words.len() as f64;
            if ratio < REPETITION_MIN_UNIQUE_RATIO {
                findings.warning(
                    format!("Content is highly repetitive ({:.0}% unique words)", ratio * 100.0),
                    5,
                );
            }
        }
    }

    fn check_provenance(&self, record: &Record, findings: &mut Findings) {
        let fields = [
            ("source", &record.source),
            ("authority", &record.authority),
            ("region", &record.region),
        ];
        for (name, value) in fields {
            if is_blank(value) {
                findings.warning(format!("Missing {}", name), 10);
            }
        }
    }

    fn check_published_date(&self, record: &Record, findings: &mut Findings) {
        let Some(raw) = record.published_at.as_deref().filter(|d| !d.trim().is_empty()) else {
            return;
        };

        let Some(date) = parse_date(raw) else {
            findings.error(format!("Invalid publication date '{}'", raw), 10);
            return;
        };

        let today = self
            .reference_date
            .unwrap_or_else(|| Utc::now().date_naive());
        if date > today {
            findings.warning(format!("Publication date {} is in the future", date), 5);
        }
        if date.year() < EARLIEST_PLAUSIBLE_YEAR {
            findings.warning(
                format!("Publication date {} is before {}", date, EARLIEST_PLAUSIBLE_YEAR),
                5,
            );
        }
    }

    fn check_priority(&self, record: &Record, findings: &mut Findings) {
        if let Some(priority) = record.priority.as_deref().filter(|p| !p.trim().is_empty()) {
            if priority.parse::<Priority>().is_err() {
                findings.error(
                    format!(
                        "Invalid priority '{}' (expected low, medium, high or critical)",
                        priority
                    ),
                    5,
                );
            }
        }
    }

    fn check_urls(&self, record: &Record, findings: &mut Findings) {
        let mut url_fields: Vec<(&String, &str)> = record
            .metadata
            .iter()
            .filter(|(key, _)| is_url_field(key))
            .filter_map(|(key, value)| value.as_str().map(|v| (key, v.trim())))
            .filter(|(_, value)| !value.is_empty())
            .collect();
        url_fields.sort_by(|a, b| a.0.cmp(b.0));

        for (key, value) in url_fields {
            if let Err(e) = Url::parse(value) {
                findings.warning(format!("Field '{}' is not a valid URL: {}", key, e), 3);
            }
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn is_url_field(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.ends_with("url") || key == "link" || key == "href"
}
