use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    #[default]
    RegulatoryUpdate,
    LegalCase,
    KnowledgeArticle,
}

/// One regulatory update, legal case or knowledge article, after the source
/// adapter has mapped its fields.
///
/// Free-text fields are kept raw; judging them is the quality engine's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default)]
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Content if present and not blank.
    pub fn content_text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Title and content joined with a space, used for keyword scans.
    pub fn full_text(&self) -> String {
        match self.content_text() {
            Some(content) => format!("{} {}", self.title, content),
            None => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Semantic,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchKind::Exact => "exact",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::Semantic => "semantic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityMatch {
    pub source_id: String,
    pub record_id: String,
    pub similarity: f64,
    pub kind: MatchKind,
}

impl SimilarityMatch {
    pub fn is_self_match(&self) -> bool {
        self.source_id == self.record_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub canonical_id: String,
    pub duplicate_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub record_id: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standardized_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    Manufacturer,
    ClinicalStudy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReferenceMapping {
    pub primary_id: String,
    pub related_ids: Vec<String>,
    pub mapping_type: MappingType,
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

impl CrossReferenceMapping {
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_id.as_str()).chain(self.related_ids.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardMapping {
    pub standard: String,
    pub title: String,
    pub record_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub record_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub primary_id: String,
    pub entries: Vec<TimelineEntry>,
}

/// Where the analysed records came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Sample { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardizedRecord {
    pub record_id: String,
    #[serde(flatten)]
    pub fields: StandardizedFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub generated_at: DateTime<Utc>,
    pub data_origin: DataOrigin,
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub average_score: f64,
    pub quality_level: QualityLevel,
    pub duplicates: Vec<SimilarityMatch>,
    pub duplicate_groups: Vec<DuplicateGroup>,
    pub validations: Vec<ValidationResult>,
    pub standardized: Vec<StandardizedRecord>,
    pub cross_references: Vec<CrossReferenceMapping>,
    pub standard_mappings: Vec<StandardMapping>,
    pub timelines: Vec<Timeline>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" critical ".parse::<Priority>(), Ok(Priority::Critical));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = Record::new("r1", "FDA 510(k): Device X").with_published_at("2024-03-01");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["publishedAt"], "2024-03-01");
        assert_eq!(json["kind"], "regulatory_update");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_content_text_ignores_blank_content() {
        let record = Record::new("r1", "Title").with_content("   ");
        assert_eq!(record.content_text(), None);
        assert_eq!(record.full_text(), "Title");
    }

    #[test]
    fn test_data_origin_is_tagged() {
        let origin = DataOrigin::Sample {
            reason: "timeout".to_string(),
        };
        let json = serde_json::to_value(&origin).unwrap();
        assert_eq!(json["type"], "sample");
        assert_eq!(json["reason"], "timeout");
    }
}
