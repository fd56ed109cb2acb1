#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the legacy `Y | ...; N | ...` explanation parser, then score what it
/// recovered so label normalization sees the same input.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let explanation = relevance_judge::adapters::parse_explanation(s);
        if let Ok(rubric) = relevance_judge::rubric::store_relevance() {
            let scorer = relevance_judge::scoring::RubricScorer::new(&rubric);
            let _ = scorer.score_item("fuzz", &explanation.answers);
        }
    }
});
