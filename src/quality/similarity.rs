//! String similarity used by duplicate detection and cross-referencing.

use std::collections::HashSet;

/// Lowercase, drop punctuation, collapse whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Levenshtein similarity of the normalized strings, in `[0, 1]`.
///
/// Two strings that normalize to the same text (including two empty ones)
/// score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_similarity(&normalize(a), &normalize(b))
}

/// [`similarity`] for inputs that already went through [`normalize`].
pub(crate) fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = strsim::levenshtein(a, b);
    (max_len - distance.min(max_len)) as f64 / max_len as f64
}

/// Jaccard index of the normalized word sets, in `[0, 1]`.
///
/// An empty union scores 1.0, matching [`similarity`] on empty input.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 1.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_whitespace() {
        assert_eq!(normalize("  FDA 510(k):   Device X "), "fda 510k device x");
        assert_eq!(normalize("BfArM—Mitteilung, Nr. 5"), "bfarmmitteilung nr 5");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_similarity_is_reflexive() {
        for s in ["", "a", "EMA Guideline on AI", "   ", "Über-Gerät 3.0"] {
            assert_eq!(similarity(s, s), 1.0, "similarity({:?}, itself)", s);
            assert_eq!(token_overlap(s, s), 1.0, "token_overlap({:?}, itself)", s);
        }
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let pairs = [
            ("EMA Guideline on AI", "EMA Guidance for AI"),
            ("kitten", "sitting"),
            ("", "non-empty"),
            ("Recall: pump", "Recall of infusion pump"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
            assert_eq!(token_overlap(a, b), token_overlap(b, a));
        }
    }

    #[test]
    fn test_similarity_ignores_trailing_space_and_punctuation() {
        assert_eq!(similarity("FDA 510(k): Device X", "FDA 510(k): Device X "), 1.0);
        assert_eq!(similarity("Device, X!", "device x"), 1.0);
    }

    #[test]
    fn test_similarity_levenshtein_ratio() {
        // "kitten" -> "sitting" is the textbook distance of 3 over 7 chars.
        let score = similarity("kitten", "sitting");
        assert!((score - 4.0 / 7.0).abs() < 1e-9);

        // 6 edits over 19 chars.
        let score = similarity("EMA Guideline on AI", "EMA Guidance for AI");
        assert!((score - 13.0 / 19.0).abs() < 1e-9);

        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_token_overlap_jaccard() {
        // {recall, of, pump} vs {recall, pump, class, i}: 2 shared of 5.
        let score = token_overlap("Recall of pump", "recall pump, class I");
        assert!((score - 0.4).abs() < 1e-9);
        assert_eq!(token_overlap("alpha", "beta"), 0.0);
        assert_eq!(token_overlap("", ""), 1.0);
        assert_eq!(token_overlap("", "something"), 0.0);
    }
}
