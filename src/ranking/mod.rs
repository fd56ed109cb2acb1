//! Rank aggregation: NDCG over presentation order, plus per-query and
//! per-corpus summaries.

mod ndcg;
mod summary;

pub use ndcg::{dcg, discount, ndcg, ndcg_pct, ndcg_with_ideal, IdealOrdering};
pub use summary::{CorpusMetrics, QueryMetrics};

use crate::model::{NdcgResult, RankedList};

impl RankedList {
    /// NDCG of this list's headline relevances.
    #[must_use]
    pub fn ndcg(&self, k: Option<usize>, ideal: IdealOrdering) -> NdcgResult {
        ndcg_with_ideal(&self.relevances(), k, ideal)
    }
}
