#![no_main]
use libfuzzer_sys::fuzz_target;
use relevance_judge::pipeline::{evaluate_query, EvaluationOptions, QueryJudgments};

/// Fuzz judged-query deserialization and the full per-query evaluation.
fuzz_target!(|data: &[u8]| {
    let Ok(judgments) = serde_json::from_slice::<QueryJudgments>(data) else {
        return;
    };
    if let Ok(rubric) = relevance_judge::rubric::store_relevance() {
        let eval = evaluate_query(&rubric, &judgments, &EvaluationOptions::default());
        assert!((0.0..=1.0).contains(&eval.metrics.ndcg));
    }
});
