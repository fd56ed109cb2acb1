//! Normalized discounted cumulative gain.
//!
//! All functions here take relevance on the `[0, 1]` scale. Percentages
//! (`score_pct`) are converted once, in [`ndcg_pct`]. Values outside the
//! scale are clamped to it and non-finite values count as 0.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::NdcgResult;

/// How the ideal DCG is computed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum IdealOrdering {
    /// The observed relevances sorted descending
    #[default]
    Sorted,
    /// Every slot fully relevant
    Perfect,
}

impl std::fmt::Display for IdealOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sorted => write!(f, "sorted"),
            Self::Perfect => write!(f, "perfect"),
        }
    }
}

/// Discount for 0-indexed `position`: `1 / log2(position + 2)`.
#[must_use]
pub fn discount(position: usize) -> f64 {
    1.0 / ((position + 2) as f64).log2()
}

/// DCG over the first `k` relevances (all of them when `k` is `None`).
#[must_use]
pub fn dcg(relevances: &[f64], k: Option<usize>) -> f64 {
    relevances
        .iter()
        .take(cutoff(relevances.len(), k))
        .enumerate()
        .map(|(i, rel)| sanitize(*rel) * discount(i))
        .sum()
}

/// NDCG against the best ordering of the same relevances.
#[must_use]
pub fn ndcg(relevances: &[f64], k: Option<usize>) -> NdcgResult {
    ndcg_with_ideal(relevances, k, IdealOrdering::Sorted)
}

/// NDCG for `score_pct` values (0-100).
#[must_use]
pub fn ndcg_pct(scores_pct: &[f64], k: Option<usize>) -> NdcgResult {
    let relevances: Vec<f64> = scores_pct.iter().map(|pct| pct / 100.0).collect();
    ndcg(&relevances, k)
}

/// NDCG with an explicit choice of ideal ordering.
///
/// An empty list, an all-zero list or `k == Some(0)` yields zeros.
#[must_use]
pub fn ndcg_with_ideal(relevances: &[f64], k: Option<usize>, ideal: IdealOrdering) -> NdcgResult {
    let dcg = dcg(relevances, k);
    let idcg = match ideal {
        IdealOrdering::Sorted => {
            let mut sorted: Vec<f64> = relevances.iter().copied().map(sanitize).collect();
            sorted.sort_by(|a, b| b.total_cmp(a));
            self::dcg(&sorted, k)
        }
        IdealOrdering::Perfect => (0..cutoff(relevances.len(), k)).map(discount).sum(),
    };
    let ndcg = if idcg > 0.0 { dcg / idcg } else { 0.0 };
    NdcgResult { dcg, idcg, ndcg }
}

fn cutoff(len: usize, k: Option<usize>) -> usize {
    k.map_or(len, |k| k.min(len))
}

fn sanitize(relevance: f64) -> f64 {
    if relevance.is_finite() {
        relevance.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_top_slot_is_one() {
        assert_eq!(discount(0), 1.0);
        assert!((discount(2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_worked_example() {
        let result = ndcg_pct(&[100.0, 0.0, 50.0], Some(3));
        assert!((result.dcg - 1.25).abs() < 1e-12);
        assert!((result.idcg - (1.0 + 0.5 / 3f64.log2())).abs() < 1e-12);
        assert!((result.ndcg - 0.950_2).abs() < 1e-3, "{}", result.ndcg);
    }

    #[test]
    fn test_empty_and_zero() {
        assert_eq!(ndcg(&[], None), NdcgResult::default());
        assert_eq!(ndcg(&[0.0, 0.0], Some(5)).ndcg, 0.0);
        assert_eq!(ndcg(&[1.0, 0.5], Some(0)).ndcg, 0.0);
    }

    #[test]
    fn test_k_limits_both_orders() {
        // Only the top slot counts: actual [0.2], ideal [0.9]
        let result = ndcg(&[0.2, 0.9, 0.1], Some(1));
        assert!((result.dcg - 0.2).abs() < 1e-12);
        assert!((result.idcg - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_k_larger_than_list() {
        assert_eq!(ndcg(&[1.0, 0.5], Some(10)), ndcg(&[1.0, 0.5], None));
    }

    #[test]
    fn test_sorted_input_scores_one() {
        assert_eq!(ndcg(&[0.9, 0.4, 0.4, 0.0], None).ndcg, 1.0);
    }

    #[test]
    fn test_perfect_ideal() {
        let result = ndcg_with_ideal(&[1.0, 0.0], None, IdealOrdering::Perfect);
        assert!((result.idcg - (1.0 + 1.0 / 3f64.log2())).abs() < 1e-12);
        assert!(result.ndcg < 1.0);

        let all_good = ndcg_with_ideal(&[1.0, 1.0, 1.0], None, IdealOrdering::Perfect);
        assert_eq!(all_good.ndcg, 1.0);
    }

    #[test]
    fn test_non_finite_treated_as_zero() {
        let result = ndcg(&[f64::NAN, 1.0], None);
        assert!(result.ndcg.is_finite());
        assert!(result.ndcg < 1.0);
    }

    #[test]
    fn test_out_of_range_relevance_clamped() {
        let result = ndcg(&[-1.0, 1.0], None);
        assert_eq!(result.dcg, ndcg(&[0.0, 1.0], None).dcg);
        assert!((0.0..=1.0).contains(&result.ndcg));

        let over = ndcg_with_ideal(&[3.0, 1.0], None, IdealOrdering::Perfect);
        assert_eq!(over.ndcg, 1.0);
        assert!((ndcg_pct(&[-50.0, 150.0], None).ndcg - 1.0 / 3f64.log2()).abs() < 1e-12);
    }
}
