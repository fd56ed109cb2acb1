//! Evaluation report assembly and rendering.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::evaluate::{BatchEvaluation, EvaluationOptions};
use super::output::OutputFormat;
use crate::facets::FacetMetrics;
use crate::model::{round_pct, Rubric};
use crate::ranking::IdealOrdering;

/// Everything a scoring run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub rubric: String,
    pub k: Option<usize>,
    pub ideal: IdealOrdering,
    #[serde(flatten)]
    pub batch: BatchEvaluation,
    /// Mean irrelevance rate per rubric dimension
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub irrelevance_rates: IndexMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<IndexMap<String, FacetMetrics>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<IndexMap<String, FacetMetrics>>,
}

impl EvaluationReport {
    #[must_use]
    pub fn new(rubric: &Rubric, options: &EvaluationOptions, batch: BatchEvaluation) -> Self {
        let irrelevance_rates = rubric
            .dimensions()
            .iter()
            .filter_map(|d| batch.irrelevance_rate(&d.name).map(|r| (d.name.clone(), r)))
            .collect();
        Self {
            generated_at: Utc::now(),
            rubric: rubric.name().to_string(),
            k: options.k,
            ideal: options.ideal,
            batch,
            irrelevance_rates,
            facets: None,
            checks: None,
        }
    }

    #[must_use]
    pub fn with_facets(
        mut self,
        facets: IndexMap<String, FacetMetrics>,
        checks: IndexMap<String, FacetMetrics>,
    ) -> Self {
        self.facets = Some(facets);
        self.checks = Some(checks);
        self
    }

    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.batch.queries.iter().map(|q| q.mismatches().count()).sum()
    }

    /// Render in the requested format.
    pub fn render(&self, format: OutputFormat) -> crate::Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Summary => Ok(self.summary()),
        }
    }

    /// Plain-text digest for terminals and CI logs.
    #[must_use]
    pub fn summary(&self) -> String {
        let corpus = &self.batch.corpus;
        let cutoff = self
            .k
            .map_or_else(|| "full".to_string(), |k| k.to_string());
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Rubric: {} (k={cutoff}, ideal={})",
            self.rubric, self.ideal
        );
        let _ = writeln!(
            out,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "Queries: {}  Items: {}  Skipped: {}  Overridden: {}  Errored: {}",
            corpus.query_count,
            corpus.item_count,
            corpus.skipped_count,
            corpus.overridden_count,
            corpus.errored_count
        );
        let _ = writeln!(out, "Mean NDCG: {:.4}", corpus.mean_ndcg);
        let _ = writeln!(out, "Mean score: {:.2}%", round_pct(corpus.mean_score_pct));
        for (dimension, rate) in &self.irrelevance_rates {
            let _ = writeln!(
                out,
                "Irrelevance rate ({dimension}): {:.2}%",
                round_pct(rate * 100.0)
            );
        }

        if !self.batch.queries.is_empty() {
            let _ = writeln!(out, "\nQueries:");
            for query in &self.batch.queries {
                let m = &query.metrics;
                let _ = writeln!(
                    out,
                    "  {:<24} ndcg={:.4}  mean={:>6.2}%  items={}",
                    m.query_id,
                    m.ndcg,
                    round_pct(m.mean_score_pct),
                    m.item_count
                );
            }
        }

        write_metrics_table(&mut out, "Facets", self.facets.as_ref());
        write_metrics_table(&mut out, "Checks", self.checks.as_ref());

        let mismatches = self.mismatch_count();
        if mismatches > 0 {
            let _ = writeln!(
                out,
                "\n{mismatches} claimed score(s) disagreed with recomputed scores"
            );
        }
        out
    }
}

fn write_metrics_table(
    out: &mut String,
    title: &str,
    table: Option<&IndexMap<String, FacetMetrics>>,
) {
    let Some(table) = table else {
        return;
    };
    let _ = writeln!(out, "\n{title}:");
    for (name, metrics) in table {
        let _ = write!(
            out,
            "  {:<32} ndcg={:.4}  relevance={:.4}  queries={}  items={}",
            name, metrics.ndcg, metrics.mean_relevance, metrics.count, metrics.item_count
        );
        if metrics.errored_count > 0 {
            let _ = write!(out, "  errored={}", metrics.errored_count);
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckDefinition, DimensionDefinition, RawAnswer};
    use crate::pipeline::{evaluate_batch, JudgedItem, QueryJudgments};

    fn rubric() -> Rubric {
        Rubric::builder("mini")
            .check(CheckDefinition::standard("intent", 2.0))
            .check(CheckDefinition::standard("price", 1.0))
            .dimension(DimensionDefinition::new("intent_match", &["intent"]))
            .build()
            .unwrap()
    }

    fn batch() -> BatchEvaluation {
        let items = [("s1", "Yes"), ("s2", "No")]
            .iter()
            .map(|(id, intent)| JudgedItem {
                item_id: (*id).to_string(),
                answers: [
                    ("intent".to_string(), RawAnswer::text(*intent)),
                    ("price".to_string(), RawAnswer::text("Yes")),
                ]
                .into_iter()
                .collect(),
                ..JudgedItem::default()
            })
            .collect();
        let queries = vec![QueryJudgments {
            query_id: "cheap tacos".to_string(),
            items,
            ..QueryJudgments::default()
        }];
        evaluate_batch(&rubric(), &queries, &EvaluationOptions::default())
    }

    #[test]
    fn test_irrelevance_rate_per_dimension() {
        let report = EvaluationReport::new(&rubric(), &EvaluationOptions::default(), batch());
        assert_eq!(report.irrelevance_rates.get("intent_match"), Some(&0.5));
    }

    #[test]
    fn test_summary_mentions_queries() {
        let report = EvaluationReport::new(&rubric(), &EvaluationOptions::default(), batch());
        let text = report.summary();
        assert!(text.contains("Rubric: mini (k=5, ideal=sorted)"));
        assert!(text.contains("cheap tacos"));
        assert!(text.contains("Irrelevance rate (intent_match): 50.00%"));
        assert!(!text.contains("Facets:"));
    }

    #[test]
    fn test_json_render_flattens_batch() {
        let report = EvaluationReport::new(&rubric(), &EvaluationOptions::default(), batch());
        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["rubric"], "mini");
        assert_eq!(json["corpus"]["query_count"], 1);
        assert_eq!(json["queries"][0]["list"]["items"][1]["item_id"], "s2");
        assert!(json.get("facets").is_none());
    }
}
