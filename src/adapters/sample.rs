use crate::domain::model::{Record, RecordKind};

/// Built-in records analyzed when the configured source is unavailable and
/// fallback is enabled.
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new("sample-1", "FDA 510(k): CardioSense ECG patch")
            .with_content(
                "Manufacturer: Acme Medical. The CardioSense ECG patch received 510(k) \
                 clearance for continuous ambulatory monitoring. Quality system per ISO 13485.",
            )
            .with_authority("FDA")
            .with_region("US")
            .with_category("510k")
            .with_source("sample")
            .with_priority("medium")
            .with_published_at("2024-03-15"),
        Record::new("sample-2", "EMA CE Mark: CardioSense ECG patch")
            .with_content(
                "Manufacturer: Acme Medical. CE marking granted under the EU MDR for the \
                 CardioSense ECG patch after notified body review.",
            )
            .with_authority("EMA")
            .with_region("European Union")
            .with_category("CE Mark")
            .with_source("sample")
            .with_priority("medium")
            .with_published_at("2024-06-02"),
        Record::new("sample-3", "FDA 510(k): CardioSense ECG patch ")
            .with_content(
                "Manufacturer: Acme Medical. Duplicate feed entry for the CardioSense clearance.",
            )
            .with_authority("FDA")
            .with_region("USA")
            .with_category("510k")
            .with_source("sample")
            .with_published_at("2024-03-15"),
        Record::new("sample-4", "Class II recall of infusion pump software")
            .with_content(
                "Software anomaly may cause under-infusion. Firms must apply the patch; \
                 software lifecycle documentation per IEC 62304 is under review.",
            )
            .with_authority("FDA")
            .with_region("United States")
            .with_category("Recall")
            .with_source("sample")
            .with_priority("high")
            .with_published_at("2024-09-20"),
        Record {
            kind: RecordKind::LegalCase,
            ..Record::new("sample-5", "Product liability ruling on hip implants")
                .with_content(
                    "The court held the manufacturer liable for defective metal-on-metal \
                     hip implants and awarded damages to the plaintiffs.",
                )
                .with_authority("BGH")
                .with_region("Deutschland")
                .with_source("sample")
                .with_published_at("15.01.2024")
        },
        Record::new("sample-6", "Update")
            .with_content("Lorem ipsum placeholder")
            .with_source("sample"),
    ]
}
