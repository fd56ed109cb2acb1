//! Query-level and corpus-level ranking metrics.

use serde::{Deserialize, Serialize};

use crate::model::{ItemScore, RankedList};

use super::ndcg::{ndcg_with_ideal, IdealOrdering};

/// Metrics for one ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetrics {
    pub query_id: String,
    pub ndcg: f64,
    pub dcg: f64,
    pub idcg: f64,
    pub mean_score_pct: f64,
    pub item_count: usize,
    /// Items zeroed by a gate violation or critical failure
    pub overridden_count: usize,
    pub errored_count: usize,
    pub skipped_count: usize,
}

impl QueryMetrics {
    #[must_use]
    pub fn from_list(list: &RankedList, k: Option<usize>, ideal: IdealOrdering) -> Self {
        let result = ndcg_with_ideal(&list.relevances(), k, ideal);
        Self {
            query_id: list.query_id.clone(),
            ndcg: result.ndcg,
            dcg: result.dcg,
            idcg: result.idcg,
            mean_score_pct: list.mean_score_pct(),
            item_count: list.len(),
            overridden_count: list.items.iter().filter(|i| i.is_overridden()).count(),
            errored_count: list.items.iter().filter(|i| i.is_errored()).count(),
            skipped_count: list.skipped.len(),
        }
    }
}

/// Metrics across every query of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorpusMetrics {
    pub query_count: usize,
    /// Mean of per-query NDCG
    pub mean_ndcg: f64,
    /// Mean of per-item headline scores over all queries
    pub mean_score_pct: f64,
    pub item_count: usize,
    pub overridden_count: usize,
    pub errored_count: usize,
    pub skipped_count: usize,
}

impl CorpusMetrics {
    #[must_use]
    pub fn from_queries(lists: &[RankedList], queries: &[QueryMetrics]) -> Self {
        if queries.is_empty() {
            return Self::default();
        }
        let items: Vec<&ItemScore> = lists.iter().flat_map(|l| l.items.iter()).collect();
        let mean_score_pct = if items.is_empty() {
            0.0
        } else {
            items.iter().map(|i| i.headline_pct()).sum::<f64>() / items.len() as f64
        };
        Self {
            query_count: queries.len(),
            mean_ndcg: queries.iter().map(|q| q.ndcg).sum::<f64>() / queries.len() as f64,
            mean_score_pct,
            item_count: queries.iter().map(|q| q.item_count).sum(),
            overridden_count: queries.iter().map(|q| q.overridden_count).sum(),
            errored_count: queries.iter().map(|q| q.errored_count).sum(),
            skipped_count: queries.iter().map(|q| q.skipped_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, pct: f64) -> ItemScore {
        ItemScore {
            score_pct: pct,
            earned_points: pct,
            applicable_points: 100.0,
            error: None,
            ..ItemScore::errored(id, "")
        }
    }

    #[test]
    fn test_query_metrics_counts() {
        let mut gated = item("b", 0.0);
        gated.is_gate_violated = true;
        let items = vec![item("a", 100.0), gated, ItemScore::errored("c", "bad")];
        let list = RankedList::new("q1", items).with_skipped(vec!["d".to_string()]);
        let metrics = QueryMetrics::from_list(&list, Some(5), IdealOrdering::Sorted);
        assert_eq!(metrics.item_count, 3);
        assert_eq!(metrics.overridden_count, 1);
        assert_eq!(metrics.errored_count, 1);
        assert_eq!(metrics.skipped_count, 1);
        assert_eq!(metrics.ndcg, 1.0);
        assert!((metrics.mean_score_pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_corpus_means() {
        let lists = vec![
            RankedList::new("q1", vec![item("a", 100.0), item("b", 0.0)]),
            RankedList::new("q2", vec![item("c", 0.0), item("d", 100.0)]),
        ];
        let queries: Vec<QueryMetrics> = lists
            .iter()
            .map(|l| QueryMetrics::from_list(l, None, IdealOrdering::Sorted))
            .collect();
        let corpus = CorpusMetrics::from_queries(&lists, &queries);
        assert_eq!(corpus.query_count, 2);
        assert_eq!(corpus.item_count, 4);
        assert_eq!(corpus.mean_score_pct, 50.0);
        let expected = (1.0 + (1.0 / 3f64.log2())) / 2.0;
        assert!((corpus.mean_ndcg - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_corpus() {
        assert_eq!(CorpusMetrics::from_queries(&[], &[]), CorpusMetrics::default());
    }
}
