//! Per-facet and per-check diagnostic NDCG.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScoringError;
use crate::model::{CheckKind, CheckState, FacetDefinition, Rubric, RankedList, Scorecard};
use crate::ranking::ndcg;
use crate::scoring::RubricScorer;

/// One item as seen by the facet aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetItem {
    pub item_id: String,
    pub answers: Scorecard,
    /// Facet names this item's query belongs to
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

/// Items of one query, in presentation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FacetQuery {
    pub query_id: String,
    /// Query text used to look up categories; falls back to `query_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub items: Vec<FacetItem>,
}

impl FacetQuery {
    /// Key for category lookups.
    #[must_use]
    pub fn lookup_key(&self) -> &str {
        self.query.as_deref().unwrap_or(&self.query_id)
    }
}

/// Aggregate metrics for one facet (or one check).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FacetMetrics {
    /// Mean NDCG over contributing queries; 0 when none contributed
    pub ndcg: f64,
    /// Mean facet-local relevance over contributing items, in `[0, 1]`
    pub mean_relevance: f64,
    /// Number of queries that contributed
    pub count: usize,
    pub item_count: usize,
    /// Member items left out because their answers could not be re-scored
    #[serde(default)]
    pub errored_count: usize,
}

#[derive(Default)]
struct Accumulator {
    ndcg_sum: f64,
    relevance_sum: f64,
    queries: usize,
    items: usize,
    errored: usize,
}

impl Accumulator {
    fn add_list(&mut self, relevances: &[f64], k: Option<usize>) {
        if relevances.is_empty() {
            return;
        }
        self.ndcg_sum += ndcg(relevances, k).ndcg;
        self.relevance_sum += relevances.iter().sum::<f64>();
        self.queries += 1;
        self.items += relevances.len();
    }

    fn finish(self) -> FacetMetrics {
        if self.queries == 0 {
            return FacetMetrics {
                errored_count: self.errored,
                ..FacetMetrics::default()
            };
        }
        FacetMetrics {
            ndcg: self.ndcg_sum / self.queries as f64,
            mean_relevance: self.relevance_sum / self.items as f64,
            count: self.queries,
            item_count: self.items,
            errored_count: self.errored,
        }
    }
}

/// Restrict `rubric` to a facet's member checks, carrying the facet's weights.
pub fn facet_rubric(rubric: &Rubric, facet: &FacetDefinition) -> Result<Rubric, ScoringError> {
    let mut builder = Rubric::builder(format!("{}/{}", rubric.name(), facet.facet_name));
    for member in &facet.member_checks {
        let check = rubric
            .check(&member.check)
            .ok_or_else(|| ScoringError::UnknownCheck {
                check: member.check.clone(),
                context: format!("facet '{}'", facet.facet_name),
            })?;
        builder = builder.check(check.reweighted(member.weight));
    }
    builder.build().map_err(|err| ScoringError::InvalidFacet {
        facet: facet.facet_name.clone(),
        message: err.to_string(),
    })
}

/// Facet metrics for a single ranked list.
pub fn aggregate_by_facet(
    rubric: &Rubric,
    facets: &[FacetDefinition],
    items: &[FacetItem],
    k: Option<usize>,
) -> Result<IndexMap<String, FacetMetrics>, ScoringError> {
    let query = FacetQuery {
        query_id: String::new(),
        query: None,
        items: items.to_vec(),
    };
    aggregate_queries_by_facet(rubric, facets, std::slice::from_ref(&query), k)
}

/// Facet metrics over many queries.
///
/// For each facet, each query's list is filtered to items in that facet,
/// keeping their relative order, and every kept item is re-scored using only
/// the facet's checks and weights. Facets nobody belongs to report zeros.
/// A member item that cannot be re-scored (say, it lacks one of the facet's
/// checks) is logged, counted in `errored_count` and left out; the rest of
/// the facet and every other facet are unaffected. Only a facet naming a
/// check the rubric does not define is an error.
pub fn aggregate_queries_by_facet(
    rubric: &Rubric,
    facets: &[FacetDefinition],
    queries: &[FacetQuery],
    k: Option<usize>,
) -> Result<IndexMap<String, FacetMetrics>, ScoringError> {
    let mut out = IndexMap::with_capacity(facets.len());
    for facet in facets {
        let restricted = facet_rubric(rubric, facet)?;
        let scorer = RubricScorer::new(&restricted).quiet_unknown();
        let mut acc = Accumulator::default();

        for query in queries {
            let mut relevances = Vec::new();
            for item in query
                .items
                .iter()
                .filter(|item| item.categories.contains(&facet.facet_name))
            {
                match scorer.score(&item.item_id, &item.answers) {
                    Ok(score) => relevances.push(score.relevance()),
                    Err(err) => {
                        warn!(
                            facet = %facet.facet_name,
                            query = %query.query_id,
                            "Leaving item out of facet: {err}"
                        );
                        acc.errored += 1;
                    }
                }
            }
            acc.add_list(&relevances, k);
        }

        out.insert(facet.facet_name.clone(), acc.finish());
    }
    Ok(out)
}

/// NDCG of every rubric check taken on its own.
///
/// Each list is restricted to items where the check applied; pass counts as
/// 1, fail as 0 and a graded tier as its share of the ceiling. Errored items
/// carry no answers and drop out.
#[must_use]
pub fn aggregate_by_check(
    rubric: &Rubric,
    lists: &[RankedList],
    k: Option<usize>,
) -> IndexMap<String, FacetMetrics> {
    rubric
        .checks()
        .map(|check| {
            let mut acc = Accumulator::default();
            for list in lists {
                let relevances: Vec<f64> = list
                    .items
                    .iter()
                    .filter_map(|item| item.per_check.get(&check.name))
                    .filter_map(|answer| match (answer.state, check.kind) {
                        (CheckState::Pass, _) => Some(1.0),
                        (CheckState::Fail, _) => Some(0.0),
                        (CheckState::Tier(tier), CheckKind::GradedTier) => {
                            let points = check.tiers.points(tier).or(answer.raw_points)?;
                            Some(points / check.max_points())
                        }
                        _ => None,
                    })
                    .collect();
                acc.add_list(&relevances, k);
            }
            (check.name.clone(), acc.finish())
        })
        .collect()
}
