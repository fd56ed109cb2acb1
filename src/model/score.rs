//! Scored items and the ranked lists they form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::answer::CheckAnswer;

/// Round a percentage for reporting. Aggregation always uses raw values.
#[must_use]
pub fn round_pct(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Earned/applicable ratio as a percentage, 0 when nothing applied.
#[must_use]
pub fn percentage(earned: f64, applicable: f64) -> f64 {
    if applicable > 0.0 {
        earned / applicable * 100.0
    } else {
        0.0
    }
}

/// Sub-score for one rubric dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub name: String,
    pub earned_points: f64,
    pub applicable_points: f64,
    pub score_pct: f64,
}

/// Result of scoring one item against a rubric.
///
/// When a gate is violated or a critical check fails, `score_pct` (and any
/// dimension or composite percentage) is 0 while the point totals keep their
/// computed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    pub item_id: String,
    pub earned_points: f64,
    pub applicable_points: f64,
    pub score_pct: f64,
    pub is_gate_violated: bool,
    pub is_critical_failed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_checks: Vec<String>,
    pub per_check: IndexMap<String, CheckAnswer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_pct: Option<f64>,
    /// Set when the item's judgment could not be scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemScore {
    /// Zero-score placeholder for an item whose judgment was unusable.
    #[must_use]
    pub fn errored(item_id: impl Into<String>, error: impl ToString) -> Self {
        Self {
            item_id: item_id.into(),
            earned_points: 0.0,
            applicable_points: 0.0,
            score_pct: 0.0,
            is_gate_violated: false,
            is_critical_failed: false,
            failed_checks: Vec::new(),
            per_check: IndexMap::new(),
            dimensions: Vec::new(),
            composite_pct: None,
            error: Some(error.to_string()),
        }
    }

    /// Whether a gate or critical check forced the score to 0.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.is_gate_violated || self.is_critical_failed
    }

    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }

    /// The percentage the item would have had without overrides.
    #[must_use]
    pub fn unadjusted_pct(&self) -> f64 {
        percentage(self.earned_points, self.applicable_points)
    }

    /// Composite score when the rubric defines one, otherwise `score_pct`.
    #[must_use]
    pub fn headline_pct(&self) -> f64 {
        self.composite_pct.unwrap_or(self.score_pct)
    }

    /// Headline score on the `[0, 1]` relevance scale used for ranking.
    #[must_use]
    pub fn relevance(&self) -> f64 {
        self.headline_pct() / 100.0
    }

    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

/// Outcome of the rank aggregator for one list.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NdcgResult {
    pub dcg: f64,
    pub idcg: f64,
    pub ndcg: f64,
}

/// Items of one query in the order they were shown (index 0 = top slot).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedList {
    pub query_id: String,
    pub items: Vec<ItemScore>,
    /// Items dropped before judging; they take no part in ranking metrics
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl RankedList {
    #[must_use]
    pub fn new(query_id: impl Into<String>, items: Vec<ItemScore>) -> Self {
        Self {
            query_id: query_id.into(),
            items,
            skipped: Vec::new(),
        }
    }

    /// Build a list from items tagged with their presentation position,
    /// whatever order they were scored in.
    #[must_use]
    pub fn from_positioned(
        query_id: impl Into<String>,
        mut items: Vec<(usize, ItemScore)>,
    ) -> Self {
        items.sort_by_key(|(position, _)| *position);
        Self::new(query_id, items.into_iter().map(|(_, item)| item).collect())
    }

    #[must_use]
    pub fn with_skipped(mut self, skipped: Vec<String>) -> Self {
        self.skipped = skipped;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Headline relevance per slot, in presentation order.
    #[must_use]
    pub fn relevances(&self) -> Vec<f64> {
        self.items.iter().map(ItemScore::relevance).collect()
    }

    #[must_use]
    pub fn mean_score_pct(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.items.iter().map(ItemScore::headline_pct).sum::<f64>() / self.items.len() as f64
    }

    /// Share of items whose `dimension` scored 0.
    ///
    /// `None` when the list is empty or no item carries that dimension.
    #[must_use]
    pub fn irrelevance_rate(&self, dimension: &str) -> Option<f64> {
        let scores: Vec<f64> = self
            .items
            .iter()
            .filter_map(|item| item.dimension(dimension).map(|d| d.score_pct))
            .collect();
        if scores.is_empty() {
            return None;
        }
        let zero = scores.iter().filter(|pct| **pct <= 0.0).count();
        Some(zero as f64 / scores.len() as f64)
    }
}
