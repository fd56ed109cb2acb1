//! Benchmarks for item scoring and ranking aggregation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use relevance_judge::model::{Judgment, RawAnswer};
use relevance_judge::pipeline::{evaluate_batch, EvaluationOptions, JudgedItem, QueryJudgments};
use relevance_judge::ranking::ndcg;
use relevance_judge::rubric::store_relevance;
use relevance_judge::scoring::RubricScorer;
use std::hint::black_box;

const LABELS: [&str; 3] = ["Yes", "No", "NA"];

fn judgment(rubric: &relevance_judge::Rubric, seed: usize) -> Judgment {
    rubric
        .checks()
        .enumerate()
        .map(|(i, check)| {
            let label = if check.name == "is_store_open" {
                "Yes"
            } else {
                LABELS[(seed + i) % LABELS.len()]
            };
            (check.name.clone(), RawAnswer::text(label))
        })
        .collect()
}

fn bench_score_item(c: &mut Criterion) {
    let rubric = store_relevance().unwrap();
    let scorer = RubricScorer::new(&rubric);
    let raw = judgment(&rubric, 7);
    c.bench_function("score_item/store_relevance", |b| {
        b.iter(|| black_box(scorer.score_item("store", black_box(&raw))));
    });
}

fn bench_ndcg(c: &mut Criterion) {
    let mut group = c.benchmark_group("ndcg");
    for len in [10usize, 100, 1000] {
        let rels: Vec<f64> = (0..len).map(|i| ((i * 37) % 101) as f64 / 100.0).collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &rels, |b, rels| {
            b.iter(|| black_box(ndcg(black_box(rels), Some(10))));
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let rubric = store_relevance().unwrap();
    let batch: Vec<QueryJudgments> = (0..200)
        .map(|q| QueryJudgments {
            query_id: format!("q{q}"),
            items: (0..10)
                .map(|i| JudgedItem {
                    item_id: format!("s{i}"),
                    answers: judgment(&rubric, q + i),
                    ..JudgedItem::default()
                })
                .collect(),
            ..QueryJudgments::default()
        })
        .collect();
    let options = EvaluationOptions::default();
    c.bench_function("evaluate_batch/200x10", |b| {
        b.iter(|| black_box(evaluate_batch(&rubric, black_box(&batch), &options)));
    });
}

criterion_group!(benches, bench_score_item, bench_ndcg, bench_batch);
criterion_main!(benches);
