//! Pipeline orchestration for scoring runs.
//!
//! Shared load → evaluate → report logic used by the CLI handlers. The
//! scoring core stays pure; this layer adds batching, pre-filtering, claim
//! verification and report rendering.

mod evaluate;
mod output;
mod report;

pub use evaluate::{
    evaluate_batch, evaluate_query, load_judgments, BatchEvaluation, EvaluationOptions,
    ItemSimilarity, ItemVerification, JudgedItem, QueryEvaluation, QueryJudgments,
};
pub use output::{write_output, OutputFormat, OutputTarget};
pub use report::EvaluationReport;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Mean NDCG fell below `--min-ndcg`
    pub const THRESHOLD_NOT_MET: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
