use crate::domain::model::{DataOrigin, QualityReport, Record};
use crate::quality::cross_reference::DEFAULT_CLINICAL_SIMILARITY;
use crate::utils::error::{FetchError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn title_threshold(&self) -> f64;
    fn content_threshold(&self) -> f64;
    fn mapping_confidence(&self) -> f64;
    fn clinical_similarity(&self) -> f64 {
        DEFAULT_CLINICAL_SIMILARITY
    }
    fn zip_output(&self) -> bool;
    fn fallback_to_sample(&self) -> bool;
}

/// Upstream collaborator that hands over record snapshots.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn describe(&self) -> String;
    async fn get_all_regulatory_updates(&self) -> std::result::Result<Vec<Record>, FetchError>;
    async fn get_all_legal_cases(&self) -> std::result::Result<Vec<Record>, FetchError>;

    /// Sources without an article feed answer with nothing.
    async fn get_all_knowledge_articles(&self) -> std::result::Result<Vec<Record>, FetchError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<Record>,
    pub origin: DataOrigin,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub report: QualityReport,
    pub csv_output: String,
    pub tsv_output: String,
    /// Input records with duplicates removed.
    pub cleaned_records: Vec<Record>,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extraction>;
    async fn transform(&self, extraction: Extraction) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
