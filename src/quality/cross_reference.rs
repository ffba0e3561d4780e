use crate::domain::model::{
    CrossReferenceMapping, MappingType, Record, StandardMapping, Timeline, TimelineEntry,
};
use crate::quality::dates::parse_date;
use crate::quality::similarity::{normalize, similarity, token_overlap};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

pub const DEFAULT_MAPPING_CONFIDENCE: f64 = 0.75;
pub const DEFAULT_CLINICAL_SIMILARITY: f64 = 0.8;
/// Confidence reported on every clinical-study mapping.
pub const CLINICAL_STUDY_CONFIDENCE: f64 = 0.8;

const UNKNOWN: &str = "unknown";

static MANUFACTURER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bmanufacturer\s*:\s*([^\n,;.]+)",
        r"(?i)\bapplicant\s*:\s*([^\n,;.]+)",
        r"(?i)\bsponsor\s*:\s*([^\n,;.]+)",
        r"(?i)\bhersteller\s*:\s*([^\n,;.]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("manufacturer pattern is valid"))
    .collect()
});

// Leading run of authority names and submission types, e.g. "FDA 510(k):".
static TITLE_PREFIXES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:(?:health canada|swissmedic|bfarm|mhra|pmda|fda|ema|tga|de novo|ce mark|pma|mdr|ivdr|ide|510k)\b|510\s*\(k\))[\s:,/-]*)+",
    )
    .expect("title prefix pattern is valid")
});

const STUDY_KEYWORDS: &[&str] = &["clinical", "study", "trial"];
const APPROVAL_KEYWORDS: &[&str] = &["approval", "approved", "clearance", "cleared"];

struct KnownStandard {
    code: &'static str,
    title: &'static str,
    pattern: &'static str,
}

const KNOWN_STANDARDS: &[KnownStandard] = &[
    KnownStandard {
        code: "ISO 13485",
        title: "Medical devices - Quality management systems",
        pattern: r"(?i)\biso\s*-?\s*13485\b",
    },
    KnownStandard {
        code: "ISO 14971",
        title: "Medical devices - Application of risk management",
        pattern: r"(?i)\biso\s*-?\s*14971\b",
    },
    KnownStandard {
        code: "ISO 10993",
        title: "Biological evaluation of medical devices",
        pattern: r"(?i)\biso\s*-?\s*10993\b",
    },
    KnownStandard {
        code: "IEC 62304",
        title: "Medical device software - Software life cycle processes",
        pattern: r"(?i)\biec\s*-?\s*62304\b",
    },
];

static STANDARD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    KNOWN_STANDARDS
        .iter()
        .map(|s| Regex::new(s.pattern).expect("standard pattern is valid"))
        .collect()
});

/// Manufacturer and device keys heuristically pulled out of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeviceProfile {
    manufacturer: Option<String>,
    device: Option<String>,
}

impl DeviceProfile {
    fn of(record: &Record) -> Self {
        Self {
            manufacturer: extract_manufacturer(&record.full_text()),
            device: extract_device_name(&record.title),
        }
    }

    fn group_key(&self) -> (String, String) {
        (
            self.manufacturer.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            self.device.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        )
    }
}

/// First `manufacturer:` / `applicant:` / `sponsor:` value found, lowercased.
pub fn extract_manufacturer(text: &str) -> Option<String> {
    MANUFACTURER_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| normalize(m.as_str()))
            .filter(|name| !name.is_empty())
    })
}

/// Title without its leading authority and submission-type prefix, normalized.
pub fn extract_device_name(title: &str) -> Option<String> {
    let stripped = TITLE_PREFIXES.replace(title, "");
    let device = normalize(&stripped);
    (!device.is_empty()).then_some(device)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossReferenceReport {
    pub mappings: Vec<CrossReferenceMapping>,
    pub standard_mappings: Vec<StandardMapping>,
    pub timelines: Vec<Timeline>,
}

/// Links records about the same device or manufacturer across authorities.
#[derive(Debug, Clone, Copy)]
pub struct CrossReferenceMapper {
    confidence_threshold: f64,
    clinical_similarity: f64,
}

impl Default for CrossReferenceMapper {
    fn default() -> Self {
        Self::new(DEFAULT_MAPPING_CONFIDENCE, DEFAULT_CLINICAL_SIMILARITY)
    }
}

impl CrossReferenceMapper {
    pub fn new(confidence_threshold: f64, clinical_similarity: f64) -> Self {
        Self {
            confidence_threshold,
            clinical_similarity,
        }
    }

    pub fn map_across_jurisdictions(&self, records: &[Record]) -> CrossReferenceReport {
        let now = Utc::now();
        let profiles: Vec<DeviceProfile> = records.iter().map(DeviceProfile::of).collect();

        let mut found = self.manufacturer_mappings(records, &profiles, now);
        found.extend(self.clinical_study_mappings(records, &profiles, now));

        let timelines = found
            .iter()
            .map(|(mapping, members)| build_timeline(&mapping.primary_id, members, records))
            .collect();
        let mappings: Vec<CrossReferenceMapping> = found.into_iter().map(|(m, _)| m).collect();
        let standard_mappings = map_standards(records);

        tracing::debug!(
            "Cross-referenced {} records: {} mappings, {} standards",
            records.len(),
            mappings.len(),
            standard_mappings.len()
        );

        CrossReferenceReport {
            mappings,
            standard_mappings,
            timelines,
        }
    }

    fn manufacturer_mappings(
        &self,
        records: &[Record],
        profiles: &[DeviceProfile],
        now: DateTime<Utc>,
    ) -> Vec<(CrossReferenceMapping, Vec<usize>)> {
        let mut group_index: HashMap<(String, String), usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (i, profile) in profiles.iter().enumerate() {
            let slot = *group_index.entry(profile.group_key()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(i);
        }

        let mut mappings = Vec::new();
        for members in groups {
            if members.len() < 2 {
                continue;
            }

            let authorities: HashSet<Option<String>> = members
                .iter()
                .map(|&i| {
                    records[i]
                        .authority
                        .as_deref()
                        .map(|a| a.trim().to_lowercase())
                })
                .collect();
            if authorities.len() < 2 {
                continue;
            }

            let texts: Vec<String> = members.iter().map(|&i| records[i].full_text()).collect();
            let confidence = mean_pairwise_overlap(&texts);
            if confidence < self.confidence_threshold {
                tracing::debug!(
                    "Group around '{}' below confidence ({:.2})",
                    records[members[0]].id,
                    confidence
                );
                continue;
            }

            mappings.push((
                CrossReferenceMapping {
                    primary_id: records[members[0]].id.clone(),
                    related_ids: members[1..].iter().map(|&i| records[i].id.clone()).collect(),
                    mapping_type: MappingType::Manufacturer,
                    confidence,
                    last_updated: now,
                },
                members,
            ));
        }

        mappings
    }

    /// Link clinical study records to approvals of the same manufacturer's device.
    ///
    /// `clinical_similarity` gates which approvals are linked; the mapping
    /// itself always carries [`CLINICAL_STUDY_CONFIDENCE`].
    fn clinical_study_mappings(
        &self,
        records: &[Record],
        profiles: &[DeviceProfile],
        now: DateTime<Utc>,
    ) -> Vec<(CrossReferenceMapping, Vec<usize>)> {
        let studies: Vec<usize> = (0..records.len())
            .filter(|&i| mentions_any(&records[i], STUDY_KEYWORDS))
            .collect();
        let approvals: Vec<usize> = (0..records.len())
            .filter(|&i| {
                !mentions_any(&records[i], STUDY_KEYWORDS)
                    && mentions_any(&records[i], APPROVAL_KEYWORDS)
            })
            .collect();

        let mut mappings = Vec::new();
        for &study in &studies {
            let (Some(manufacturer), Some(device)) =
                (&profiles[study].manufacturer, &profiles[study].device)
            else {
                continue;
            };

            let linked: Vec<(usize, f64)> = approvals
                .iter()
                .filter(|&&a| profiles[a].manufacturer.as_ref() == Some(manufacturer))
                .filter_map(|&a| {
                    let other = profiles[a].device.as_deref()?;
                    let score = similarity(device, other);
                    (score >= self.clinical_similarity).then_some((a, score))
                })
                .collect();
            if linked.is_empty() {
                continue;
            }

            tracing::debug!(
                "Study '{}' linked to {} approvals (best device similarity {:.2})",
                records[study].id,
                linked.len(),
                linked.iter().map(|(_, score)| *score).fold(0.0, f64::max)
            );
            let mut members = vec![study];
            members.extend(linked.iter().map(|(a, _)| *a));

            mappings.push((
                CrossReferenceMapping {
                    primary_id: records[study].id.clone(),
                    related_ids: linked.iter().map(|(a, _)| records[*a].id.clone()).collect(),
                    mapping_type: MappingType::ClinicalStudy,
                    confidence: CLINICAL_STUDY_CONFIDENCE,
                    last_updated: now,
                },
                members,
            ));
        }

        mappings
    }
}

fn mentions_any(record: &Record, keywords: &[&str]) -> bool {
    let haystack = format!(
        "{} {}",
        record.category.as_deref().unwrap_or_default(),
        record.title
    )
    .to_lowercase();
    keywords.iter().any(|k| haystack.contains(k))
}

fn mean_pairwise_overlap(texts: &[String]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..texts.len() {
        for j in (i + 1)..texts.len() {
            total += token_overlap(&texts[i], &texts[j]);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        total / pairs as f64
    }
}

/// Records mentioning each of the known device standards.
pub fn map_standards(records: &[Record]) -> Vec<StandardMapping> {
    KNOWN_STANDARDS
        .iter()
        .zip(STANDARD_PATTERNS.iter())
        .filter_map(|(standard, pattern)| {
            let record_ids: Vec<String> = records
                .iter()
                .filter(|r| pattern.is_match(&r.full_text()))
                .map(|r| r.id.clone())
                .collect();
            (!record_ids.is_empty()).then(|| StandardMapping {
                standard: standard.code.to_string(),
                title: standard.title.to_string(),
                record_ids,
            })
        })
        .collect()
}

/// Members ordered by publication date; undated records go last.
fn build_timeline(primary_id: &str, members: &[usize], records: &[Record]) -> Timeline {
    let mut entries: Vec<TimelineEntry> = members
        .iter()
        .map(|&i| {
            let record = &records[i];
            TimelineEntry {
                record_id: record.id.clone(),
                title: record.title.clone(),
                authority: record.authority.clone(),
                date: record.published_at.as_deref().and_then(parse_date),
            }
        })
        .collect();
    entries.sort_by_key(|e| (e.date.is_none(), e.date));

    Timeline {
        primary_id: primary_id.to_string(),
        entries,
    }
}
