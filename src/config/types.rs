//! Configuration types for relevance-judge.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pipeline::OutputFormat;
use crate::ranking::IdealOrdering;

/// Default NDCG cutoff.
pub const DEFAULT_NDCG_K: usize = 5;
/// Default rubric preset.
pub const DEFAULT_RUBRIC: &str = "store-relevance";

/// Unified application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub facets: FacetsConfig,
    pub prefilter: PrefilterConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// Rubric and ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringConfig {
    /// Preset name (e.g. `store-relevance`, `fuzzy-query:3`) or rubric file path
    pub rubric: String,
    /// NDCG cutoff; `null` scores the whole list
    pub k: Option<usize>,
    /// Ideal ordering for IDCG
    pub ideal: IdealOrdering,
    /// Compare judge-reported totals with recomputed scores
    pub verify_claimed: bool,
    /// Fail the run (exit 1) when mean NDCG is below this value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ndcg: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rubric: DEFAULT_RUBRIC.to_string(),
            k: Some(DEFAULT_NDCG_K),
            ideal: IdealOrdering::Sorted,
            verify_claimed: true,
            min_ndcg: None,
        }
    }
}

/// Facet breakdown settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FacetsConfig {
    pub enabled: bool,
    /// Facet definitions file; built-in store facets when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<PathBuf>,
    /// Query-to-category table used to backfill membership
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<PathBuf>,
}

/// Fuzzy pre-filter settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PrefilterConfig {
    /// Minimum similarity in `[0, 1]`; no pre-filter when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Output file path (stdout when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`AppConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn rubric(mut self, rubric: impl Into<String>) -> Self {
        self.config.scoring.rubric = rubric.into();
        self
    }

    pub fn k(mut self, k: Option<usize>) -> Self {
        self.config.scoring.k = k;
        self
    }

    pub const fn ideal(mut self, ideal: IdealOrdering) -> Self {
        self.config.scoring.ideal = ideal;
        self
    }

    pub const fn min_ndcg(mut self, min_ndcg: f64) -> Self {
        self.config.scoring.min_ndcg = Some(min_ndcg);
        self
    }

    pub fn facets(mut self, definitions: Option<PathBuf>, categories: Option<PathBuf>) -> Self {
        self.config.facets.enabled = true;
        self.config.facets.definitions = definitions;
        self.config.facets.categories = categories;
        self
    }

    pub const fn prefilter(mut self, threshold: f64) -> Self {
        self.config.prefilter.threshold = Some(threshold);
        self
    }

    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}
