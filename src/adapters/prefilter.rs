//! Fuzzy pre-filter deciding whether an item is worth judging.
//!
//! Items whose text is too far from the query are skipped. Skipped items are
//! left out of the ranked list entirely; scoring them as 0 would drag NDCG
//! down for items the judge never saw.

use serde::{Deserialize, Serialize};

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "from",
    "by", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "should", "could", "may", "might", "must", "can", "i", "me",
    "my", "we", "our", "you", "your",
];

/// Lowercase, strip punctuation, collapse whitespace and drop stopwords.
///
/// Stopwords are kept when removing them would leave nothing.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    let kept: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !STOPWORDS.contains(w))
        .collect();
    if kept.is_empty() {
        words.join(" ")
    } else {
        kept.join(" ")
    }
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Word-order-insensitive similarity in `[0, 1]` of two normalized strings.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a, &b)
}

/// Similarities computed for one query/item pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FuzzyScores {
    pub query_to_item: f64,
    /// Best match between the item text and the store's top menu items
    pub item_to_top_item: f64,
}

/// Threshold gate on query/item text similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyPrefilter {
    threshold: f64,
}

impl FuzzyPrefilter {
    /// Similarity threshold used by the recommendation evaluator.
    pub const DEFAULT_THRESHOLD: f64 = 0.7;

    /// `threshold` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Similarities of `item_text` to the query and to the store's top items.
    #[must_use]
    pub fn scores(&self, query: &str, item_text: &str, top_items: &[String]) -> FuzzyScores {
        let item_norm = normalize_text(item_text);
        let query_to_item = token_sort_ratio(&normalize_text(query), &item_norm);
        let item_to_top_item = top_items
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| token_sort_ratio(&item_norm, &normalize_text(t)))
            .fold(0.0, f64::max);
        FuzzyScores {
            query_to_item,
            item_to_top_item,
        }
    }

    /// Whether scores clear the threshold. Only query similarity decides;
    /// top-item similarity is informational.
    #[must_use]
    pub fn accepts(&self, scores: &FuzzyScores) -> bool {
        scores.query_to_item >= self.threshold
    }
}

impl Default for FuzzyPrefilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
