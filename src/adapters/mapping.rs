//! Maps upstream JSON payloads onto [`Record`].
//!
//! Upstream feeds disagree on field names (`description` vs `content`,
//! `publishedDate` vs `published_at`, ...). Every alias is resolved here so
//! the quality engine only ever sees one shape.

use crate::domain::model::{Record, RecordKind};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

const ID_KEYS: &[&str] = &["id", "_id", "uuid"];
const TITLE_KEYS: &[&str] = &["title", "name", "subject"];
const CONTENT_KEYS: &[&str] = &["content", "description", "summary", "body"];
const PUBLISHED_KEYS: &[&str] = &[
    "publishedAt",
    "published_at",
    "publishedDate",
    "published_date",
    "decisionDate",
    "decision_date",
    "date",
];
const REGION_KEYS: &[&str] = &["region", "jurisdiction", "country"];
const CATEGORY_KEYS: &[&str] = &["category", "type", "updateType", "update_type"];
const SOURCE_KEYS: &[&str] = &["source", "sourceId", "source_id"];

// (upstream key, metadata key)
const METADATA_KEYS: &[(&str, &str)] = &[
    ("documentUrl", "document_url"),
    ("document_url", "document_url"),
    ("sourceUrl", "source_url"),
    ("source_url", "source_url"),
    ("url", "url"),
    ("manufacturer", "manufacturer"),
    ("deviceName", "device_name"),
    ("deviceClass", "device_class"),
    ("fdaNumber", "fda_number"),
    ("ceMarkNumber", "ce_mark_number"),
    ("caseNumber", "case_number"),
    ("verdict", "verdict"),
    ("impactLevel", "impact_level"),
    ("author", "author"),
    ("tags", "tags"),
    ("keywords", "keywords"),
];

pub fn record_from_regulatory_update(value: &Value) -> Result<Record, MappingError> {
    let obj = as_object(value)?;
    let mut record = base_record(obj, RecordKind::RegulatoryUpdate)?;
    record.authority = text(obj, &["authority", "agency"]);
    Ok(record)
}

/// Legal cases carry the deciding court where updates carry an authority.
pub fn record_from_legal_case(value: &Value) -> Result<Record, MappingError> {
    let obj = as_object(value)?;
    let mut record = base_record(obj, RecordKind::LegalCase)?;
    record.authority = text(obj, &["court", "authority"]);
    Ok(record)
}

pub fn record_from_knowledge_article(value: &Value) -> Result<Record, MappingError> {
    let obj = as_object(value)?;
    let mut record = base_record(obj, RecordKind::KnowledgeArticle)?;
    record.authority = text(obj, &["authority", "author"]);
    Ok(record)
}

/// Map a payload that is either a bare array, an object wrapping the array
/// under `data`/`items`/`results`, or a single record object.
///
/// Entries that cannot be mapped are skipped with a warning.
pub fn records_from_json(payload: &Value, kind: RecordKind) -> Vec<Record> {
    let items: Vec<&Value> = match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match ["data", "items", "results"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
        {
            Some(items) => items.iter().collect(),
            None => vec![payload],
        },
        _ => Vec::new(),
    };

    let mapper: fn(&Value) -> Result<Record, MappingError> = match kind {
        RecordKind::RegulatoryUpdate => record_from_regulatory_update,
        RecordKind::LegalCase => record_from_legal_case,
        RecordKind::KnowledgeArticle => record_from_knowledge_article,
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match mapper(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("⚠️ Skipping {:?} entry #{}: {}", kind, index, e);
                None
            }
        })
        .collect()
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, MappingError> {
    value
        .as_object()
        .ok_or_else(|| MappingError::NotAnObject(json_type(value)))
}

fn base_record(obj: &Map<String, Value>, kind: RecordKind) -> Result<Record, MappingError> {
    let id = text(obj, ID_KEYS).ok_or(MappingError::MissingField("id"))?;

    let metadata = METADATA_KEYS
        .iter()
        .filter_map(|(from, to)| {
            obj.get(*from)
                .filter(|v| !v.is_null())
                .map(|v| (to.to_string(), v.clone()))
        })
        .collect();

    Ok(Record {
        id,
        title: raw_text(obj, TITLE_KEYS).unwrap_or_default(),
        content: text(obj, CONTENT_KEYS),
        published_at: text(obj, PUBLISHED_KEYS),
        region: text(obj, REGION_KEYS),
        category: text(obj, CATEGORY_KEYS),
        priority: priority(obj),
        source: text(obj, SOURCE_KEYS),
        authority: None,
        kind,
        metadata,
    })
}

/// First key holding a non-blank scalar, as a string.
fn text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Like [`text`] but keeps blank strings, so an empty title stays visible to
/// validation instead of falling through to another key.
fn raw_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Numeric priorities 1-4 map onto the named levels; anything else is kept
/// raw for the validator to judge.
fn priority(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("priority")? {
        Value::Number(n) => Some(match n.as_i64() {
            Some(1) => "low".to_string(),
            Some(2) => "medium".to_string(),
            Some(3) => "high".to_string(),
            Some(4) => "critical".to_string(),
            _ => n.to_string(),
        }),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
