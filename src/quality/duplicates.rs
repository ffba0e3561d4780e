use crate::domain::model::{DuplicateGroup, MatchKind, Record, SimilarityMatch};
use crate::quality::similarity::{normalize, normalized_similarity};
use std::collections::HashSet;

pub const DEFAULT_TITLE_THRESHOLD: f64 = 0.85;
pub const DEFAULT_CONTENT_THRESHOLD: f64 = 0.9;

/// Index-level match, before ids are attached.
#[derive(Debug, Clone, Copy)]
struct IndexedMatch {
    base: usize,
    other: usize,
    similarity: f64,
    kind: MatchKind,
}

/// Pairwise near-duplicate finder over a record snapshot.
///
/// Quadratic in the number of records; meant for the tens-to-hundreds range a
/// single request deals with.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector {
    title_threshold: f64,
    content_threshold: f64,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_THRESHOLD, DEFAULT_CONTENT_THRESHOLD)
    }
}

impl DuplicateDetector {
    pub fn new(title_threshold: f64, content_threshold: f64) -> Self {
        Self {
            title_threshold,
            content_threshold,
        }
    }

    /// Matches grouped per comparison base.
    ///
    /// Each base that matched anything is emitted first as an `exact`
    /// self-match, followed by its matches. A record that was matched is never
    /// used as a base afterwards, so chains like A~B~C with A!~C are reported
    /// as the pair A~B only.
    pub fn find_duplicates(&self, records: &[Record]) -> Vec<SimilarityMatch> {
        let indexed = self.find_indexed(records);
        let mut matches = Vec::with_capacity(indexed.len());
        let mut last_base = None;

        for m in &indexed {
            if last_base != Some(m.base) {
                last_base = Some(m.base);
                matches.push(SimilarityMatch {
                    source_id: records[m.base].id.clone(),
                    record_id: records[m.base].id.clone(),
                    similarity: 1.0,
                    kind: MatchKind::Exact,
                });
            }
            matches.push(SimilarityMatch {
                source_id: records[m.base].id.clone(),
                record_id: records[m.other].id.clone(),
                similarity: m.similarity,
                kind: m.kind,
            });
        }

        matches
    }

    /// Input records minus every record that was matched against an earlier base.
    pub fn remove_duplicates(&self, records: Vec<Record>) -> Vec<Record> {
        let dropped: HashSet<usize> = self.find_indexed(&records).iter().map(|m| m.other).collect();
        let before = records.len();

        let kept: Vec<Record> = records
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !dropped.contains(index))
            .map(|(_, record)| record)
            .collect();

        tracing::debug!("Removed {} duplicates ({} -> {})", before - kept.len(), before, kept.len());
        kept
    }

    fn find_indexed(&self, records: &[Record]) -> Vec<IndexedMatch> {
        let titles: Vec<String> = records.iter().map(|r| normalize(&r.title)).collect();
        let contents: Vec<Option<String>> = records
            .iter()
            .map(|r| r.content_text().map(normalize))
            .collect();

        let mut processed = vec![false; records.len()];
        let mut matches = Vec::new();

        for i in 0..records.len() {
            if processed[i] {
                continue;
            }

            let first_match = matches.len();
            for j in (i + 1)..records.len() {
                if processed[j] {
                    continue;
                }
                let before = matches.len();

                let title_score = normalized_similarity(&titles[i], &titles[j]);
                if records[i].title == records[j].title || title_score >= 1.0 {
                    matches.push(IndexedMatch {
                        base: i,
                        other: j,
                        similarity: 1.0,
                        kind: MatchKind::Exact,
                    });
                } else if title_score >= self.title_threshold {
                    matches.push(IndexedMatch {
                        base: i,
                        other: j,
                        similarity: title_score,
                        kind: MatchKind::Fuzzy,
                    });
                }

                if let (Some(a), Some(b)) = (&contents[i], &contents[j]) {
                    let content_score = normalized_similarity(a, b);
                    if content_score >= self.content_threshold {
                        matches.push(IndexedMatch {
                            base: i,
                            other: j,
                            similarity: content_score,
                            kind: MatchKind::Semantic,
                        });
                    }
                }

                if matches.len() > before {
                    processed[j] = true;
                }
            }

            if matches.len() > first_match {
                processed[i] = true;
            }
        }

        tracing::debug!(
            "Duplicate scan over {} records produced {} matches",
            records.len(),
            matches.len()
        );
        matches
    }
}

/// Collapse a match list into one group per comparison base.
pub fn duplicate_groups(matches: &[SimilarityMatch]) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for m in matches {
        if m.is_self_match() {
            groups.push(DuplicateGroup {
                canonical_id: m.source_id.clone(),
                duplicate_ids: Vec::new(),
            });
            continue;
        }

        let starts_group = groups
            .last()
            .map_or(true, |group| group.canonical_id != m.source_id);
        if starts_group {
            groups.push(DuplicateGroup {
                canonical_id: m.source_id.clone(),
                duplicate_ids: Vec::new(),
            });
        }

        if let Some(group) = groups.last_mut() {
            if !group.duplicate_ids.contains(&m.record_id) {
                group.duplicate_ids.push(m.record_id.clone());
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str) -> Record {
        Record::new(id, title)
    }

    #[test]
    fn test_empty_input_yields_no_matches() {
        let detector = DuplicateDetector::default();
        assert!(detector.find_duplicates(&[]).is_empty());
        assert!(duplicate_groups(&[]).is_empty());
    }

    #[test]
    fn test_trailing_space_is_exact_match() {
        let records = vec![
            record("a", "FDA 510(k): Device X"),
            record("b", "FDA 510(k): Device X "),
        ];
        let matches = DuplicateDetector::default().find_duplicates(&records);

        assert_eq!(matches.len(), 2);
        assert!(matches[0].is_self_match());
        assert_eq!(matches[0].source_id, "a");
        assert_eq!(matches[1].record_id, "b");
        assert_eq!(matches[1].kind, MatchKind::Exact);
        assert_eq!(matches[1].similarity, 1.0);
    }

    #[test]
    fn test_fuzzy_match_above_threshold() {
        let records = vec![
            record("a", "EMA Guideline on AI Devices"),
            record("b", "EMA Guidelines on AI Devices"),
            record("c", "Recall of infusion pumps"),
        ];
        let matches = DuplicateDetector::default().find_duplicates(&records);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].record_id, "b");
        assert_eq!(matches[1].kind, MatchKind::Fuzzy);
        assert!(matches[1].similarity >= 0.85 && matches[1].similarity < 1.0);
    }

    #[test]
    fn test_guidance_pair_is_fuzzy_at_lower_threshold() {
        let records = vec![
            record("a", "EMA Guideline on AI"),
            record("b", "EMA Guidance for AI"),
        ];

        assert!(DuplicateDetector::default().find_duplicates(&records).is_empty());

        let matches = DuplicateDetector::new(0.65, 0.9).find_duplicates(&records);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].kind, MatchKind::Fuzzy);
    }

    #[test]
    fn test_semantic_match_is_independent_of_title() {
        let body = "The manufacturer recalls all lots of the infusion pump due to a software defect in the dosing module.";
        let records = vec![
            record("a", "Urgent field safety notice").with_content(body),
            record("b", "Completely different heading").with_content(body),
        ];
        let matches = DuplicateDetector::default().find_duplicates(&records);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].kind, MatchKind::Semantic);
    }

    #[test]
    fn test_pair_can_match_fuzzy_and_semantic() {
        let body = "Identical body text describing the clearance decision for the device.";
        let records = vec![
            record("a", "EMA Guideline on AI Devices").with_content(body),
            record("b", "EMA Guidelines on AI Devices").with_content(body),
        ];
        let matches = DuplicateDetector::default().find_duplicates(&records);

        let kinds: Vec<MatchKind> = matches.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MatchKind::Exact, MatchKind::Fuzzy, MatchKind::Semantic]);

        let groups = duplicate_groups(&matches);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].duplicate_ids, vec!["b".to_string()]);
    }

    #[test]
    fn test_missing_content_skips_semantic_check() {
        let records = vec![
            record("a", "Alpha").with_content("same words here"),
            record("b", "Omega"),
        ];
        assert!(DuplicateDetector::default().find_duplicates(&records).is_empty());
    }

    #[test]
    fn test_matched_records_are_not_bases() {
        let records = vec![
            record("a", "Device X"),
            record("b", "Device X"),
            record("c", "Device X"),
            record("d", "Other"),
            record("e", "Other"),
        ];
        let matches = DuplicateDetector::default().find_duplicates(&records);
        let groups = duplicate_groups(&matches);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].canonical_id, "a");
        assert_eq!(groups[0].duplicate_ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(groups[1].canonical_id, "d");
        assert!(matches
            .iter()
            .filter(|m| m.is_self_match())
            .all(|m| m.kind == MatchKind::Exact && m.similarity == 1.0));
    }

    #[test]
    fn test_no_record_matched_to_itself_as_different() {
        let records = vec![
            record("a", "Same"),
            record("b", "Same"),
            record("c", "Same "),
            record("d", "Different entirely"),
        ];
        for m in DuplicateDetector::default().find_duplicates(&records) {
            if m.source_id == m.record_id {
                assert_eq!(m.kind, MatchKind::Exact);
                assert_eq!(m.similarity, 1.0);
            }
        }
    }

    #[test]
    fn test_remove_duplicates_keeps_canonical_records() {
        let records = vec![
            record("a", "Device X"),
            record("b", "Unrelated notice"),
            record("c", "Device X"),
        ];
        let kept = DuplicateDetector::default().remove_duplicates(records);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
