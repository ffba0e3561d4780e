pub mod cross_reference;
pub mod dates;
pub mod duplicates;
pub mod report;
pub mod similarity;
pub mod standardizer;
pub mod validator;

use crate::domain::model::{DataOrigin, QualityReport, Record, StandardizedRecord};
use cross_reference::CrossReferenceMapper;
use duplicates::DuplicateDetector;
use validator::RecordValidator;

/// Runs every quality stage over one batch and assembles the report.
#[derive(Debug, Clone, Default)]
pub struct QualityEngine {
    detector: DuplicateDetector,
    validator: RecordValidator,
    mapper: CrossReferenceMapper,
}

impl QualityEngine {
    pub fn new(
        detector: DuplicateDetector,
        validator: RecordValidator,
        mapper: CrossReferenceMapper,
    ) -> Self {
        Self {
            detector,
            validator,
            mapper,
        }
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn analyze(&self, records: &[Record], origin: DataOrigin) -> QualityReport {
        tracing::info!("🔎 Analyzing {} records", records.len());

        let validations = self.validator.validate_batch(records);
        let duplicates = self.detector.find_duplicates(records);
        tracing::debug!("Duplicate detector produced {} matches", duplicates.len());

        let standardized = records
            .iter()
            .map(|record| StandardizedRecord {
                record_id: record.id.clone(),
                fields: standardizer::standardize(record),
            })
            .collect();

        let cross = self.mapper.map_across_jurisdictions(records);
        tracing::debug!(
            "Cross-reference mapper produced {} mappings, {} standard groups",
            cross.mappings.len(),
            cross.standard_mappings.len()
        );

        let report = QualityReport::build(origin, validations, duplicates, standardized, cross);
        tracing::info!(
            "📊 Quality level {:?}: {}/{} valid, average score {:.1}",
            report.quality_level,
            report.valid_records,
            report.total_records,
            report.average_score
        );
        report
    }
}
