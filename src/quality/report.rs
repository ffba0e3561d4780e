use crate::domain::model::{
    DataOrigin, QualityLevel, QualityReport, Record, SimilarityMatch, StandardizedRecord,
    ValidationResult,
};
use crate::quality::cross_reference::CrossReferenceReport;
use crate::quality::duplicates::duplicate_groups;
use crate::utils::error::{QualityError, Result};
use chrono::Utc;

const HIGH_QUALITY_MIN_SCORE: f64 = 80.0;
const MEDIUM_QUALITY_MIN_SCORE: f64 = 60.0;

const SUMMARY_HEADER: [&str; 8] = [
    "id",
    "title",
    "score",
    "is_valid",
    "errors",
    "warnings",
    "country_code",
    "category",
];

impl QualityReport {
    pub fn build(
        origin: DataOrigin,
        validations: Vec<ValidationResult>,
        duplicates: Vec<SimilarityMatch>,
        standardized: Vec<StandardizedRecord>,
        cross: CrossReferenceReport,
    ) -> Self {
        let total_records = validations.len();
        let valid_records = validations.iter().filter(|v| v.is_valid).count();
        let average_score = if total_records == 0 {
            0.0
        } else {
            validations.iter().map(|v| f64::from(v.score)).sum::<f64>() / total_records as f64
        };

        let quality_level = if average_score >= HIGH_QUALITY_MIN_SCORE && duplicates.is_empty() {
            QualityLevel::High
        } else if average_score >= MEDIUM_QUALITY_MIN_SCORE {
            QualityLevel::Medium
        } else {
            QualityLevel::Low
        };

        Self {
            generated_at: Utc::now(),
            data_origin: origin,
            total_records,
            valid_records,
            invalid_records: total_records - valid_records,
            average_score,
            quality_level,
            duplicate_groups: duplicate_groups(&duplicates),
            duplicates,
            validations,
            standardized,
            cross_references: cross.mappings,
            standard_mappings: cross.standard_mappings,
            timelines: cross.timelines,
        }
    }

    /// Number of records that would be dropped by de-duplication.
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_groups
            .iter()
            .map(|g| g.duplicate_ids.len())
            .sum()
    }

    pub fn to_csv(&self, records: &[Record]) -> Result<String> {
        self.summary_table(records, b',')
    }

    pub fn to_tsv(&self, records: &[Record]) -> Result<String> {
        self.summary_table(records, b'\t')
    }

    /// One row per record, in validation order.
    fn summary_table(&self, records: &[Record], delimiter: u8) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(SUMMARY_HEADER)?;

        for (index, validation) in self.validations.iter().enumerate() {
            let title = records.get(index).map(|r| r.title.as_str()).unwrap_or_default();
            let standardized = self
                .standardized
                .get(index)
                .filter(|s| s.record_id == validation.record_id)
                .map(|s| &s.fields);

            let score = validation.score.to_string();
            let is_valid = validation.is_valid.to_string();
            let errors = validation.errors.len().to_string();
            let warnings = validation.warnings.len().to_string();

            writer.write_record([
                validation.record_id.as_str(),
                title,
                score.as_str(),
                is_valid.as_str(),
                errors.as_str(),
                warnings.as_str(),
                standardized
                    .and_then(|f| f.country_code.as_deref())
                    .unwrap_or_default(),
                standardized
                    .and_then(|f| f.standardized_category.as_deref())
                    .unwrap_or_default(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| QualityError::ProcessingError {
                message: format!("Failed to flush summary table: {}", e),
            })?;
        String::from_utf8(bytes).map_err(|e| QualityError::ProcessingError {
            message: format!("Summary table is not valid UTF-8: {}", e),
        })
    }
}
