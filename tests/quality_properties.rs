use chrono::NaiveDate;
use helix_quality::domain::model::{MappingType, MatchKind, Record};
use helix_quality::quality::cross_reference::CrossReferenceMapper;
use helix_quality::quality::duplicates::DuplicateDetector;
use helix_quality::quality::similarity::similarity;
use helix_quality::quality::standardizer::standardize;
use helix_quality::quality::validator::RecordValidator;

const STRINGS: &[&str] = &[
    "",
    " ",
    "a",
    "FDA 510(k): Device X",
    "EMA Guideline on AI",
    "EMA Guidance for AI",
    "Überwachung von Medizinprodukten",
    "!!!???",
    "💊 recall 💊",
    "MDR Article 120 transition",
];

fn validator() -> RecordValidator {
    RecordValidator::with_reference_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
}

#[test]
fn similarity_is_reflexive() {
    for s in STRINGS {
        assert_eq!(similarity(s, s), 1.0, "similarity({:?}, itself)", s);
    }
}

#[test]
fn similarity_is_symmetric_and_bounded() {
    for a in STRINGS {
        for b in STRINGS {
            let ab = similarity(a, b);
            assert_eq!(ab, similarity(b, a), "{:?} vs {:?}", a, b);
            assert!((0.0..=1.0).contains(&ab));
        }
    }
}

#[test]
fn duplicates_never_pair_a_record_with_itself_as_different() {
    let records: Vec<Record> = STRINGS
        .iter()
        .enumerate()
        .flat_map(|(i, s)| {
            [
                Record::new(format!("r{}", i), *s).with_content(*s),
                Record::new(format!("r{}-copy", i), *s),
            ]
        })
        .collect();

    for m in DuplicateDetector::default().find_duplicates(&records) {
        if m.source_id == m.record_id {
            assert_eq!(m.kind, MatchKind::Exact);
            assert_eq!(m.similarity, 1.0);
        }
    }
}

#[test]
fn validation_score_is_always_in_range() {
    let validator = validator();
    for s in STRINGS {
        let record = Record::new(*s, *s)
            .with_content(*s)
            .with_published_at(*s)
            .with_priority(*s)
            .with_region(*s)
            .with_metadata("url", serde_json::json!(s));
        let result = validator.validate(&record);
        assert!(result.score <= 100);
    }
    assert!(validator.validate(&Record::default()).score <= 100);
}

#[test]
fn empty_title_is_always_invalid() {
    let validator = validator();
    for s in STRINGS {
        let record = Record::new("r", "")
            .with_content(*s)
            .with_authority("FDA")
            .with_region("US")
            .with_source("feed");
        assert!(!validator.validate(&record).is_valid);
    }
}

#[test]
fn standardize_accepts_any_input() {
    for s in STRINGS.iter().chain(["2024-02-30", "31.12.99999", "\u{0}"].iter()) {
        let record = Record::new(*s, *s)
            .with_region(*s)
            .with_published_at(*s)
            .with_category(*s);
        let _ = standardize(&record);
    }
}

#[test]
fn trailing_space_title_is_exact() {
    let records = vec![
        Record::new("a", "FDA 510(k): Device X"),
        Record::new("b", "FDA 510(k): Device X "),
    ];
    let matches = DuplicateDetector::default().find_duplicates(&records);

    let pair = matches
        .iter()
        .find(|m| m.source_id == "a" && m.record_id == "b")
        .expect("pair should be reported");
    assert_eq!(pair.kind, MatchKind::Exact);
    assert_eq!(pair.similarity, 1.0);
}

#[test]
fn guideline_and_guidance_titles_are_fuzzy() {
    let records = vec![
        Record::new("a", "EMA Guideline on AI"),
        Record::new("b", "EMA Guidance for AI"),
    ];

    let score = similarity("EMA Guideline on AI", "EMA Guidance for AI");
    assert!((score - 13.0 / 19.0).abs() < 1e-9);

    let strict = DuplicateDetector::default().find_duplicates(&records);
    assert!(strict.is_empty());

    let lenient = DuplicateDetector::new(0.65, 0.9).find_duplicates(&records);
    let pair = lenient
        .iter()
        .find(|m| m.record_id == "b")
        .expect("pair should be reported");
    assert_eq!(pair.kind, MatchKind::Fuzzy);
}

#[test]
fn placeholder_content_is_flagged_as_mock_data() {
    let base = Record::new("r1", "FDA safety communication on pumps")
        .with_authority("FDA")
        .with_region("US")
        .with_source("fda_feed");

    let clean = validator().validate(&base.clone().with_content(
        "The FDA informs patients and providers about infusion pump programming errors \
         observed in the field.",
    ));
    let mock = validator().validate(&base.with_content("Lorem ipsum placeholder text"));

    assert!(mock
        .warnings
        .iter()
        .any(|w| w.starts_with("Mock data detected")));
    assert!(clean.score >= mock.score + 10);
}

#[test]
fn standardize_country_codes() {
    let usa = standardize(&Record::new("r1", "t").with_region("USA"));
    assert_eq!(usa.country_code.as_deref(), Some("US"));

    let atlantis = standardize(&Record::new("r2", "t").with_region("Atlantis"));
    assert_eq!(atlantis.country_code, None);
}

#[test]
fn acme_records_map_across_authorities() {
    let body = "manufacturer: Acme Medical. The CardioPatch wearable ECG monitor records \
        continuous single lead data for up to fourteen days and flags arrhythmia events for \
        physician review";
    let records = vec![
        Record::new("fda-1", "FDA 510(k): CardioPatch ECG monitor")
            .with_content(body)
            .with_authority("FDA"),
        Record::new("ema-1", "EMA CE Mark: CardioPatch ECG monitor")
            .with_content(body)
            .with_authority("EMA"),
    ];

    let report = CrossReferenceMapper::default().map_across_jurisdictions(&records);
    let manufacturer: Vec<_> = report
        .mappings
        .iter()
        .filter(|m| m.mapping_type == MappingType::Manufacturer)
        .collect();

    assert_eq!(manufacturer.len(), 1);
    let ids: Vec<&str> = manufacturer[0].member_ids().collect();
    assert!(ids.contains(&"fda-1"));
    assert!(ids.contains(&"ema-1"));
}
