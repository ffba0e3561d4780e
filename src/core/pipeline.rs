use crate::adapters::sample::sample_records;
use crate::domain::model::{DataOrigin, Record};
use crate::domain::ports::{ConfigProvider, Extraction, Pipeline, RecordSource, Storage, TransformResult};
use crate::quality::cross_reference::CrossReferenceMapper;
use crate::quality::duplicates::DuplicateDetector;
use crate::quality::validator::RecordValidator;
use crate::quality::QualityEngine;
use crate::utils::error::{FetchError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_FILE: &str = "quality_report.json";
pub const CSV_FILE: &str = "quality_summary.csv";
pub const TSV_FILE: &str = "quality_summary.tsv";
pub const CLEANED_FILE: &str = "cleaned_records.json";
pub const ZIP_FILE: &str = "quality_report.zip";

/// Fetch records, run the quality engine and write the report.
pub struct QualityPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    source: Box<dyn RecordSource>,
    engine: QualityEngine,
}

impl<S: Storage, C: ConfigProvider> QualityPipeline<S, C> {
    pub fn new(storage: S, config: C, source: Box<dyn RecordSource>) -> Self {
        Self::with_validator(storage, config, source, RecordValidator::new())
    }

    /// Same as [`QualityPipeline::new`] with a caller-supplied validator, e.g.
    /// one pinned to a reference date.
    pub fn with_validator(
        storage: S,
        config: C,
        source: Box<dyn RecordSource>,
        validator: RecordValidator,
    ) -> Self {
        let engine = QualityEngine::new(
            DuplicateDetector::new(config.title_threshold(), config.content_threshold()),
            validator,
            CrossReferenceMapper::new(config.mapping_confidence(), config.clinical_similarity()),
        );

        Self {
            storage,
            config,
            source,
            engine,
        }
    }

    async fn fetch_all(&self) -> std::result::Result<Vec<Record>, FetchError> {
        let mut records = self.source.get_all_regulatory_updates().await?;
        let updates = records.len();
        records.extend(self.source.get_all_legal_cases().await?);
        let cases = records.len() - updates;
        records.extend(self.source.get_all_knowledge_articles().await?);

        tracing::debug!(
            "Fetched {} regulatory updates, {} legal cases, {} knowledge articles",
            updates,
            cases,
            records.len() - updates - cases
        );
        Ok(records)
    }

    fn zip_outputs(&self, files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for (name, data) in files {
            zip.start_file::<_, ()>(*name, FileOptions::default())?;
            zip.write_all(data)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for QualityPipeline<S, C> {
    async fn extract(&self) -> Result<Extraction> {
        tracing::debug!("Reading records from {}", self.source.describe());

        match self.fetch_all().await {
            Ok(records) => Ok(Extraction {
                records,
                origin: DataOrigin::Live,
            }),
            Err(e) if self.config.fallback_to_sample() => {
                tracing::warn!("📝 {} unavailable ({}), analyzing sample data", self.source.describe(), e);
                Ok(Extraction {
                    records: sample_records(),
                    origin: DataOrigin::Sample {
                        reason: e.to_string(),
                    },
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn transform(&self, extraction: Extraction) -> Result<TransformResult> {
        let Extraction { records, origin } = extraction;

        let report = self.engine.analyze(&records, origin);
        let csv_output = report.to_csv(&records)?;
        let tsv_output = report.to_tsv(&records)?;
        let cleaned_records = self.engine.detector().remove_duplicates(records);

        Ok(TransformResult {
            report,
            csv_output,
            tsv_output,
            cleaned_records,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let report_json = serde_json::to_string_pretty(&result.report)?;
        let cleaned_json = serde_json::to_string_pretty(&result.cleaned_records)?;

        let files: [(&str, &[u8]); 4] = [
            (REPORT_FILE, report_json.as_bytes()),
            (CSV_FILE, result.csv_output.as_bytes()),
            (TSV_FILE, result.tsv_output.as_bytes()),
            (CLEANED_FILE, cleaned_json.as_bytes()),
        ];

        if self.config.zip_output() {
            let zip_data = self.zip_outputs(&files)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(ZIP_FILE, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), ZIP_FILE));
        }

        for (name, data) in files {
            self.storage.write_file(name, data).await?;
        }
        Ok(format!("{}/{}", self.config.output_path(), REPORT_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{QualityReport, RecordKind};
    use crate::utils::error::QualityError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                QualityError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        zip: bool,
        fallback: bool,
    }

    impl ConfigProvider for MockConfig {
        fn output_path(&self) -> &str {
            "test_output"
        }

        fn title_threshold(&self) -> f64 {
            0.85
        }

        fn content_threshold(&self) -> f64 {
            0.9
        }

        fn mapping_confidence(&self) -> f64 {
            0.75
        }

        fn zip_output(&self) -> bool {
            self.zip
        }

        fn fallback_to_sample(&self) -> bool {
            self.fallback
        }
    }

    enum MockSource {
        Records(Vec<Record>, Vec<Record>),
        Unreachable,
    }

    #[async_trait]
    impl RecordSource for MockSource {
        fn describe(&self) -> String {
            "mock".to_string()
        }

        async fn get_all_regulatory_updates(&self) -> std::result::Result<Vec<Record>, FetchError> {
            match self {
                MockSource::Records(updates, _) => Ok(updates.clone()),
                MockSource::Unreachable => Err(FetchError::Status {
                    endpoint: "mock/regulatory-updates".to_string(),
                    status: 503,
                }),
            }
        }

        async fn get_all_legal_cases(&self) -> std::result::Result<Vec<Record>, FetchError> {
            match self {
                MockSource::Records(_, cases) => Ok(cases.clone()),
                MockSource::Unreachable => Ok(Vec::new()),
            }
        }
    }

    fn pipeline(
        source: MockSource,
        zip: bool,
        fallback: bool,
    ) -> (MockStorage, QualityPipeline<MockStorage, MockConfig>) {
        let storage = MockStorage::new();
        let pipeline = QualityPipeline::with_validator(
            storage.clone(),
            MockConfig { zip, fallback },
            Box::new(source),
            RecordValidator::with_reference_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        );
        (storage, pipeline)
    }

    fn updates() -> Vec<Record> {
        vec![
            Record::new("a", "FDA recalls infusion pump model X").with_authority("FDA"),
            Record::new("b", "FDA recalls infusion pump model X ").with_authority("FDA"),
        ]
    }

    fn cases() -> Vec<Record> {
        vec![Record {
            kind: RecordKind::LegalCase,
            ..Record::new("c", "Smith v. Acme Medical").with_authority("BGH")
        }]
    }

    #[tokio::test]
    async fn test_extract_merges_updates_and_cases() {
        let (_, pipeline) = pipeline(MockSource::Records(updates(), cases()), false, false);

        let extraction = pipeline.extract().await.unwrap();

        assert_eq!(extraction.records.len(), 3);
        assert_eq!(extraction.records[2].id, "c");
        assert_eq!(extraction.origin, DataOrigin::Live);
    }

    #[tokio::test]
    async fn test_extract_failure_without_fallback_is_error() {
        let (_, pipeline) = pipeline(MockSource::Unreachable, false, false);

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, QualityError::Fetch(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_extract_failure_with_fallback_is_labelled_sample() {
        let (_, pipeline) = pipeline(MockSource::Unreachable, false, true);

        let extraction = pipeline.extract().await.unwrap();

        assert!(!extraction.records.is_empty());
        match extraction.origin {
            DataOrigin::Sample { reason } => assert!(reason.contains("503")),
            DataOrigin::Live => panic!("fallback data must not be labelled live"),
        }
    }

    #[tokio::test]
    async fn test_empty_source_is_not_replaced_by_samples() {
        let (_, pipeline) = pipeline(MockSource::Records(vec![], vec![]), false, true);

        let extraction = pipeline.extract().await.unwrap();

        assert!(extraction.records.is_empty());
        assert_eq!(extraction.origin, DataOrigin::Live);
    }

    #[tokio::test]
    async fn test_transform_reports_and_dedups() {
        let (_, pipeline) = pipeline(MockSource::Records(vec![], vec![]), false, false);
        let extraction = Extraction {
            records: updates(),
            origin: DataOrigin::Live,
        };

        let result = pipeline.transform(extraction).await.unwrap();

        assert_eq!(result.report.total_records, 2);
        assert_eq!(result.report.duplicate_count(), 1);
        assert_eq!(result.cleaned_records.len(), 1);
        assert_eq!(result.cleaned_records[0].id, "a");
        assert_eq!(result.csv_output.lines().count(), 3);
        assert!(result.tsv_output.starts_with("id\ttitle\tscore"));
    }

    #[tokio::test]
    async fn test_load_writes_plain_files() {
        let (storage, pipeline) = pipeline(MockSource::Records(updates(), vec![]), false, false);

        let extraction = pipeline.extract().await.unwrap();
        let result = pipeline.transform(extraction).await.unwrap();
        let output = pipeline.load(result).await.unwrap();

        assert_eq!(output, "test_output/quality_report.json");
        for name in [REPORT_FILE, CSV_FILE, TSV_FILE, CLEANED_FILE] {
            assert!(storage.get_file(name).await.is_some(), "missing {}", name);
        }

        let report: QualityReport =
            serde_json::from_slice(&storage.get_file(REPORT_FILE).await.unwrap()).unwrap();
        assert_eq!(report.total_records, 2);
    }

    #[tokio::test]
    async fn test_load_writes_zip() {
        let (storage, pipeline) = pipeline(MockSource::Records(updates(), cases()), true, false);

        let extraction = pipeline.extract().await.unwrap();
        let result = pipeline.transform(extraction).await.unwrap();
        let output = pipeline.load(result).await.unwrap();

        assert_eq!(output, "test_output/quality_report.zip");
        assert!(storage.get_file(REPORT_FILE).await.is_none());

        let zip_data = storage.get_file(ZIP_FILE).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 4);

        let mut csv = String::new();
        archive
            .by_name(CSV_FILE)
            .unwrap()
            .read_to_string(&mut csv)
            .unwrap();
        assert!(csv.starts_with("id,title,score"));
    }
}
