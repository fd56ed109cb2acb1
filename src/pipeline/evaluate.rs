//! Scoring of whole query batches.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::{
    derive_store_answers, parse_explanation, FuzzyPrefilter, FuzzyScores, StoreSignals,
};
use crate::config::{read_structured, AppConfig};
use crate::error::{ErrorContext, Result};
use crate::facets::{FacetItem, FacetQuery};
use crate::model::{ItemScore, Judgment, RankedList, Rubric};
use crate::ranking::{CorpusMetrics, IdealOrdering, QueryMetrics};
use crate::scoring::{verify_claimed_score, ClaimedScore, RubricScorer, ScoreVerification};

/// One judged item as it arrives from the judging step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JudgedItem {
    pub item_id: String,
    /// Presentation slot; defaults to the item's index in the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Item text for the fuzzy pre-filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// The store's best-selling menu items, compared against `text`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_items: Vec<String>,
    #[serde(default, alias = "judgment")]
    pub answers: Judgment,
    /// Legacy one-line explanation; structured answers take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed: Option<ClaimedScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<StoreSignals>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
}

impl JudgedItem {
    /// Raw answers after merging the explanation and applying store facts,
    /// plus whatever score the judge claimed.
    fn assemble(&self, rubric: &Rubric) -> (Judgment, Option<ClaimedScore>) {
        let mut judgment = Judgment::new();
        let mut claimed = self.claimed;

        if let Some(text) = &self.explanation {
            let explanation = parse_explanation(text);
            claimed = claimed.or_else(|| explanation.claimed_score());
            judgment = explanation.answers;
        }
        judgment.extend(self.answers.iter().map(|(k, v)| (k.clone(), v.clone())));

        if let (Some(signals), Some(thresholds)) = (&self.signals, rubric.thresholds()) {
            if !signals.is_empty() {
                judgment = derive_store_answers(thresholds, signals, &judgment);
            }
        }

        (judgment, claimed)
    }
}

/// All judged items for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryJudgments {
    pub query_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Facets every item of this query belongs to
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub items: Vec<JudgedItem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchFile {
    Wrapped { queries: Vec<QueryJudgments> },
    Bare(Vec<QueryJudgments>),
}

/// Read a batch of query judgments from a JSON or YAML file.
///
/// The file holds either a list of queries or an object with a `queries` list.
pub fn load_judgments(path: &Path) -> Result<Vec<QueryJudgments>> {
    let file: BatchFile = read_structured(path)
        .with_context(|| format!("loading judgments from {}", path.display()))?;
    Ok(match file {
        BatchFile::Wrapped { queries } | BatchFile::Bare(queries) => queries,
    })
}

/// Knobs for [`evaluate_query`] and [`evaluate_batch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationOptions {
    pub k: Option<usize>,
    pub ideal: IdealOrdering,
    pub prefilter: Option<FuzzyPrefilter>,
    pub verify_claimed: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            k: Some(crate::config::DEFAULT_NDCG_K),
            ideal: IdealOrdering::Sorted,
            prefilter: None,
            verify_claimed: true,
        }
    }
}

impl EvaluationOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            k: config.scoring.k,
            ideal: config.scoring.ideal,
            prefilter: config.prefilter.threshold.map(FuzzyPrefilter::new),
            verify_claimed: config.scoring.verify_claimed,
        }
    }
}

/// A claimed-score check for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemVerification {
    pub item_id: String,
    #[serde(flatten)]
    pub verification: ScoreVerification,
}

/// Pre-filter similarities for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSimilarity {
    pub item_id: String,
    #[serde(flatten)]
    pub scores: FuzzyScores,
    pub skipped: bool,
}

/// Scored and ranked result for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub metrics: QueryMetrics,
    pub list: RankedList,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verifications: Vec<ItemVerification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similarities: Vec<ItemSimilarity>,
    /// Facet membership per item id
    #[serde(skip)]
    memberships: HashMap<String, BTreeSet<String>>,
}

impl QueryEvaluation {
    /// Verifications whose claim fell outside tolerance.
    pub fn mismatches(&self) -> impl Iterator<Item = &ItemVerification> {
        self.verifications
            .iter()
            .filter(|v| !v.verification.within_tolerance)
    }

    /// Scored items in facet-aggregator form. Errored items carry no answers
    /// and are left out.
    #[must_use]
    pub fn facet_query(&self) -> FacetQuery {
        let items = self
            .list
            .items
            .iter()
            .filter(|item| !item.is_errored())
            .map(|item| FacetItem {
                item_id: item.item_id.clone(),
                answers: item.per_check.clone(),
                categories: self
                    .memberships
                    .get(&item.item_id)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();
        FacetQuery {
            query_id: self.list.query_id.clone(),
            query: self.query.clone(),
            items,
        }
    }
}

/// Score every item of one query and rank them by presentation position.
///
/// Pre-filtered items are recorded as skipped and take no part in ranking.
/// Items whose judgments cannot be scored stay in the list with a zero score
/// and an error message.
#[must_use]
pub fn evaluate_query(
    rubric: &Rubric,
    judgments: &QueryJudgments,
    options: &EvaluationOptions,
) -> QueryEvaluation {
    let scorer = RubricScorer::new(rubric);
    let mut positioned: Vec<(usize, ItemScore)> = Vec::with_capacity(judgments.items.len());
    let mut skipped = Vec::new();
    let mut verifications = Vec::new();
    let mut similarities = Vec::new();
    let mut memberships = HashMap::new();

    for (index, item) in judgments.items.iter().enumerate() {
        if let (Some(filter), Some(query), Some(text)) =
            (&options.prefilter, &judgments.query, &item.text)
        {
            let scores = filter.scores(query, text, &item.top_items);
            let skip = !filter.accepts(&scores);
            similarities.push(ItemSimilarity {
                item_id: item.item_id.clone(),
                scores,
                skipped: skip,
            });
            if skip {
                debug!(
                    query = %judgments.query_id,
                    item = %item.item_id,
                    similarity = scores.query_to_item,
                    threshold = filter.threshold(),
                    "Skipping item below fuzzy threshold"
                );
                skipped.push(item.item_id.clone());
                continue;
            }
        }

        let (judgment, claimed) = item.assemble(rubric);
        let score = scorer.score_item(&item.item_id, &judgment);

        if options.verify_claimed && !score.is_errored() {
            if let Some(claimed) = claimed {
                verifications.push(ItemVerification {
                    item_id: item.item_id.clone(),
                    verification: verify_claimed_score(&score, claimed),
                });
            }
        }

        let categories: BTreeSet<String> = judgments
            .categories
            .iter()
            .chain(&item.categories)
            .cloned()
            .collect();
        memberships
            .entry(item.item_id.clone())
            .or_insert_with(BTreeSet::new)
            .extend(categories);

        positioned.push((item.position.unwrap_or(index), score));
    }

    let list = RankedList::from_positioned(judgments.query_id.clone(), positioned)
        .with_skipped(skipped);
    let metrics = QueryMetrics::from_list(&list, options.k, options.ideal);
    debug!(
        query = %list.query_id,
        ndcg = metrics.ndcg,
        items = list.len(),
        skipped = list.skipped.len(),
        "Evaluated query"
    );

    QueryEvaluation {
        query: judgments.query.clone(),
        metrics,
        list,
        verifications,
        similarities,
        memberships,
    }
}

/// Results for a batch of queries, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEvaluation {
    pub corpus: CorpusMetrics,
    pub queries: Vec<QueryEvaluation>,
}

impl BatchEvaluation {
    #[must_use]
    pub fn lists(&self) -> Vec<RankedList> {
        self.queries.iter().map(|q| q.list.clone()).collect()
    }

    #[must_use]
    pub fn facet_queries(&self) -> Vec<FacetQuery> {
        self.queries.iter().map(QueryEvaluation::facet_query).collect()
    }

    /// Mean irrelevance rate of `dimension` over queries that report one.
    #[must_use]
    pub fn irrelevance_rate(&self, dimension: &str) -> Option<f64> {
        let rates: Vec<f64> = self
            .queries
            .iter()
            .filter_map(|q| q.list.irrelevance_rate(dimension))
            .collect();
        if rates.is_empty() {
            None
        } else {
            Some(rates.iter().sum::<f64>() / rates.len() as f64)
        }
    }
}

/// Evaluate independent queries in parallel.
#[must_use]
pub fn evaluate_batch(
    rubric: &Rubric,
    batch: &[QueryJudgments],
    options: &EvaluationOptions,
) -> BatchEvaluation {
    let queries: Vec<QueryEvaluation> = batch
        .par_iter()
        .map(|judgments| evaluate_query(rubric, judgments, options))
        .collect();

    let lists: Vec<RankedList> = queries.iter().map(|q| q.list.clone()).collect();
    let metrics: Vec<QueryMetrics> = queries.iter().map(|q| q.metrics.clone()).collect();
    let corpus = CorpusMetrics::from_queries(&lists, &metrics);
    info!(
        queries = corpus.query_count,
        mean_ndcg = corpus.mean_ndcg,
        "Batch evaluated"
    );

    BatchEvaluation { corpus, queries }
}
