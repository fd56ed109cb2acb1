//! Score command handler.
//!
//! Implements the `score` subcommand: judge records in, ranking report out.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::config::{AppConfig, Validatable};
use crate::facets::{
    aggregate_by_check, aggregate_queries_by_facet, backfill_membership, builtin_facets_for,
    load_facets, CategoryTable,
};
use crate::pipeline::{
    evaluate_batch, exit_codes, load_judgments, write_output, EvaluationOptions,
    EvaluationReport, OutputTarget,
};
use crate::rubric::resolve_rubric;

/// Run the score command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_score(input: PathBuf, config: &AppConfig, quiet: bool) -> Result<i32> {
    let problems = config.validate();
    if !problems.is_empty() {
        let listed: Vec<String> = problems.iter().map(ToString::to_string).collect();
        bail!("invalid configuration:\n  {}", listed.join("\n  "));
    }

    let rubric = resolve_rubric(&config.scoring.rubric)?;
    let judgments = load_judgments(&input)?;
    tracing::info!(
        "Scoring {} queries from {} with rubric '{}'",
        judgments.len(),
        input.display(),
        rubric.name()
    );

    let options = EvaluationOptions::from_config(config);
    let batch = evaluate_batch(&rubric, &judgments, &options);

    let facet_breakdown = if config.facets.enabled {
        let definitions = match &config.facets.definitions {
            Some(path) => load_facets(path)?,
            None => builtin_facets_for(&rubric),
        };
        let mut queries = batch.facet_queries();
        if let Some(path) = &config.facets.categories {
            let table = CategoryTable::from_path(path)?;
            let filled = backfill_membership(&mut queries, &table);
            tracing::info!("Backfilled facet membership for {filled} items");
        }
        let facets = aggregate_queries_by_facet(&rubric, &definitions, &queries, options.k)
            .context("facet aggregation failed")?;
        let checks = aggregate_by_check(&rubric, &batch.lists(), options.k);
        Some((facets, checks))
    } else {
        None
    };

    let mut report = EvaluationReport::new(&rubric, &options, batch);
    if let Some((facets, checks)) = facet_breakdown {
        report = report.with_facets(facets, checks);
    }

    let mismatches = report.mismatch_count();
    if mismatches > 0 && !quiet {
        tracing::warn!("{mismatches} claimed scores disagreed with recomputed scores");
    }

    let rendered = report.render(config.output.format)?;
    let target = OutputTarget::from_option(config.output.file.clone());
    write_output(&rendered, &target, quiet)?;

    if let Some(min) = config.scoring.min_ndcg {
        let mean = report.batch.corpus.mean_ndcg;
        if mean < min {
            if !quiet {
                tracing::warn!("Mean NDCG {mean:.4} is below the required {min:.4}");
            }
            return Ok(exit_codes::THRESHOLD_NOT_MET);
        }
    }

    Ok(exit_codes::SUCCESS)
}
