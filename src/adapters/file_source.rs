use crate::adapters::mapping::records_from_json;
use crate::domain::model::{Record, RecordKind};
use crate::domain::ports::{RecordSource, Storage};
use crate::utils::error::{FetchError, QualityError};
use async_trait::async_trait;
use serde_json::Value;

const REGULATORY_UPDATE_KEYS: &[&str] = &["regulatoryUpdates", "regulatory_updates"];
const LEGAL_CASE_KEYS: &[&str] = &["legalCases", "legal_cases"];
const KNOWLEDGE_ARTICLE_KEYS: &[&str] = &["knowledgeArticles", "knowledge_articles"];

/// Reads a JSON snapshot through [`Storage`].
///
/// The file is either a bare array of regulatory updates or an object with
/// `regulatoryUpdates`, `legalCases` and `knowledgeArticles` arrays.
pub struct FileRecordSource<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> FileRecordSource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    async fn load(&self) -> Result<Value, FetchError> {
        let bytes = self
            .storage
            .read_file(&self.path)
            .await
            .map_err(|e| match e {
                QualityError::IoError(source) => FetchError::Io {
                    path: self.path.clone(),
                    source,
                },
                other => FetchError::Decode {
                    origin: self.path.clone(),
                    message: other.to_string(),
                },
            })?;

        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
            origin: self.path.clone(),
            message: e.to_string(),
        })
    }

    async fn section(&self, keys: &[&str], kind: RecordKind) -> Result<Vec<Record>, FetchError> {
        let document = self.load().await?;

        let records = match &document {
            Value::Array(_) if kind == RecordKind::RegulatoryUpdate => {
                records_from_json(&document, kind)
            }
            Value::Array(_) => Vec::new(),
            Value::Object(obj) => keys
                .iter()
                .find_map(|key| obj.get(*key))
                .map(|section| records_from_json(section, kind))
                .unwrap_or_default(),
            other => {
                return Err(FetchError::Decode {
                    origin: self.path.clone(),
                    message: format!("expected a JSON array or object, got {}", other),
                })
            }
        };

        tracing::debug!("Read {} {:?} records from {}", records.len(), kind, self.path);
        Ok(records)
    }
}

#[async_trait]
impl<S: Storage> RecordSource for FileRecordSource<S> {
    fn describe(&self) -> String {
        format!("file {}", self.path)
    }

    async fn get_all_regulatory_updates(&self) -> Result<Vec<Record>, FetchError> {
        self.section(REGULATORY_UPDATE_KEYS, RecordKind::RegulatoryUpdate)
            .await
    }

    async fn get_all_legal_cases(&self) -> Result<Vec<Record>, FetchError> {
        self.section(LEGAL_CASE_KEYS, RecordKind::LegalCase).await
    }

    async fn get_all_knowledge_articles(&self) -> Result<Vec<Record>, FetchError> {
        self.section(KNOWLEDGE_ARTICLE_KEYS, RecordKind::KnowledgeArticle)
            .await
    }
}
