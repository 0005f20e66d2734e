//! Near-duplicate detection between a proposed fact and existing entries.
//!
//! Purely advisory: a match never blocks a proposal.

use std::collections::BTreeSet;

use a2p_types::{MemoryEntry, MemoryId};
use serde::{Deserialize, Serialize};

const STOP_WORDS: &[&str] = &[
    "about", "also", "been", "does", "from", "have", "into", "just", "like", "more", "much",
    "only", "over", "same", "some", "such", "than", "that", "them", "then", "there", "these",
    "they", "this", "very", "were", "what", "when", "which", "while", "will", "with", "would",
    "your",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarMatch {
    pub memory_id: MemoryId,
    pub content: String,
    pub score: f64,
}

/// Lowercase alphanumeric tokens longer than three characters, minus stop words.
pub fn significant_words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 3)
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Score in `[0, 1]`: the share of the candidate's significant words that
/// also appear in `existing`.
pub fn similarity(candidate: &BTreeSet<String>, existing: &str) -> f64 {
    if candidate.is_empty() {
        return 0.0;
    }
    let other = significant_words(existing);
    let shared = candidate.intersection(&other).count();
    shared as f64 / candidate.len() as f64
}

/// Entries at or above `threshold`, best first.
pub fn find_similar(existing: &[MemoryEntry], candidate: &str, threshold: f64) -> Vec<SimilarMatch> {
    let words = significant_words(candidate);
    if words.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<SimilarMatch> = existing
        .iter()
        .filter_map(|entry| {
            let score = similarity(&words, &entry.content);
            (score >= threshold).then(|| SimilarMatch {
                memory_id: entry.id.clone(),
                content: entry.content.clone(),
                score,
            })
        })
        .collect();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2p_types::MemorySource;
    use chrono::{TimeZone, Utc};

    fn entry(content: &str) -> MemoryEntry {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        MemoryEntry::builder(content, MemorySource::user_manual(at)).build()
    }

    #[test]
    fn significant_words_drop_short_and_stop_words() {
        let words = significant_words("I like the Rust language, and this is GREAT!");
        let expected: BTreeSet<String> =
            ["rust", "language", "great"].iter().map(|s| s.to_string()).collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn scores_against_candidate_vocabulary() {
        let existing = vec![
            entry("Prefers morning meetings on Mondays"),
            entry("Allergic to peanuts"),
            entry("Prefers meetings"),
        ];
        let found = find_similar(&existing, "Prefers morning meetings", 0.5);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].content, "Prefers morning meetings on Mondays");
        assert_eq!(found[0].score, 1.0);
        assert!((found[1].score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_is_inclusive() {
        let existing = vec![entry("rust programming")];
        let found = find_similar(&existing, "rust python", 0.5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].score, 0.5);
        assert!(find_similar(&existing, "rust python", 0.51).is_empty());
    }

    #[test]
    fn candidate_without_significant_words_matches_nothing() {
        let existing = vec![entry("a b c")];
        assert!(find_similar(&existing, "the a of", 0.0).is_empty());
    }
}
