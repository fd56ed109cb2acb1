//! **Rubric scoring and ranking-quality aggregation for LLM-as-judge evaluation.**
//!
//! `relevance-judge` turns per-check judgments from a language model ("does
//! this store serve what the user asked for? is it open? is it nearby?") into
//! item scores, and ordered lists of item scores into NDCG. It does not call
//! any model; it consumes judgments that have already been produced.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: rubrics ([`Rubric`], [`CheckDefinition`]), answers
//!   ([`CheckAnswer`], [`RawAnswer`]) and results ([`ItemScore`], [`RankedList`]).
//! - **[`scoring`]**: the normalizer, which maps raw labels (`Yes`, `NA to
//!   Query`, tier numbers) onto check states, and the [`RubricScorer`], which
//!   excludes non-applicable checks from the denominator and zeroes items
//!   that violate a gate or fail a critical check.
//! - **[`ranking`]**: NDCG over presentation order plus query and corpus summaries.
//! - **[`facets`]**: NDCG broken down by query category or by single check.
//! - **[`rubric`]**: built-in rubric presets and rubric files.
//! - **[`adapters`]**: legacy explanation strings, store facts, fuzzy pre-filter.
//! - **[`pipeline`]**: batch evaluation and report rendering used by the CLI.
//!
//! ## Scoring a ranked list
//!
//! ```
//! use relevance_judge::model::{Judgment, RankedList, RawAnswer};
//! use relevance_judge::ranking::IdealOrdering;
//! use relevance_judge::rubric::store_relevance;
//! use relevance_judge::scoring::RubricScorer;
//!
//! let rubric = store_relevance()?;
//! let scorer = RubricScorer::new(&rubric);
//!
//! let judged = |open: &str| -> Judgment {
//!     rubric
//!         .checks()
//!         .map(|check| {
//!             let label = if check.name == "is_store_open" { open } else { "Yes" };
//!             (check.name.clone(), RawAnswer::text(label))
//!         })
//!         .collect()
//! };
//!
//! let items = vec![
//!     scorer.score_item("closed-store", &judged("No")),
//!     scorer.score_item("open-store", &judged("Yes")),
//! ];
//! assert_eq!(items[0].score_pct, 0.0);
//! assert_eq!(items[1].score_pct, 100.0);
//!
//! let list = RankedList::new("burgers near me", items);
//! let result = list.ndcg(Some(5), IdealOrdering::Sorted);
//! assert!(result.ndcg < 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Counts become f64 for means; they never approach 2^52
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod facets;
pub mod model;
pub mod pipeline;
pub mod ranking;
pub mod rubric;
pub mod scoring;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use error::{ErrorContext, JudgeError, OptionContext, Result, RubricError, ScoringError};
pub use facets::{aggregate_by_check, aggregate_by_facet, FacetMetrics};
pub use model::{
    CheckAnswer, CheckDefinition, CheckKind, CheckState, FacetDefinition, ItemScore, Judgment,
    RankedList, RawAnswer, Rubric, Scorecard,
};
pub use pipeline::{evaluate_batch, evaluate_query, EvaluationOptions, QueryJudgments};
pub use ranking::{ndcg, IdealOrdering};
pub use rubric::{preset, resolve_rubric};
pub use scoring::{normalize, verify_claimed_score, ClaimedScore, RubricScorer};
