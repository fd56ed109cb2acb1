//! Rubric scorer.
//!
//! Turns a complete set of normalized answers into an [`ItemScore`]:
//! NotApplicable checks leave both totals untouched, binary checks add their
//! weight to the applicable total, graded checks add their ceiling. Gate
//! violations and critical failures force every percentage to 0 while the
//! point totals stay as computed, so reports can show what the item would
//! otherwise have scored.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::ScoringError;
use crate::model::{
    percentage, CheckAnswer, CheckDefinition, CheckKind, CheckState, DimensionScore, ItemScore,
    Judgment, Rubric, Scorecard,
};

use super::normalize::normalize_judgment;

/// Points one answered check contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Contribution {
    earned: f64,
    applicable: f64,
}

impl std::ops::AddAssign for Contribution {
    fn add_assign(&mut self, rhs: Self) {
        self.earned += rhs.earned;
        self.applicable += rhs.applicable;
    }
}

/// Scores items against one rubric.
#[derive(Debug, Clone, Copy)]
pub struct RubricScorer<'a> {
    rubric: &'a Rubric,
    warn_unknown: bool,
}

impl<'a> RubricScorer<'a> {
    #[must_use]
    pub const fn new(rubric: &'a Rubric) -> Self {
        Self {
            rubric,
            warn_unknown: true,
        }
    }

    /// Stop logging answers for checks outside the rubric.
    ///
    /// Facet scoring feeds full scorecards to restricted rubrics, where the
    /// extras are expected.
    #[must_use]
    pub const fn quiet_unknown(mut self) -> Self {
        self.warn_unknown = false;
        self
    }

    #[must_use]
    pub const fn rubric(&self) -> &'a Rubric {
        self.rubric
    }

    /// Score normalized answers.
    ///
    /// Every rubric check needs an answer; answers for other checks are
    /// ignored.
    pub fn score(&self, item_id: &str, answers: &Scorecard) -> Result<ItemScore, ScoringError> {
        let missing: Vec<String> = self
            .rubric
            .checks()
            .filter(|check| !answers.contains_key(&check.name))
            .map(|check| check.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ScoringError::IncompleteScorecard {
                item_id: item_id.to_string(),
                missing,
            });
        }

        if self.warn_unknown {
            for name in answers.keys().filter(|name| !self.rubric.contains(name)) {
                warn!(item = item_id, check = %name, "Ignoring answer for unknown check");
            }
        }

        let mut total = Contribution::default();
        let mut contributions: IndexMap<&str, Contribution> =
            IndexMap::with_capacity(self.rubric.len());
        let mut per_check = IndexMap::with_capacity(self.rubric.len());
        let mut failed_checks = Vec::new();
        let mut is_gate_violated = false;
        let mut is_critical_failed = false;

        for check in self.rubric.checks() {
            let Some(answer) = answers.get(&check.name) else {
                continue;
            };
            let contribution = contribution(check, answer)?;

            if answer.state == CheckState::Fail {
                failed_checks.push(check.name.clone());
            }
            match check.kind {
                CheckKind::BinaryGate if answer.is_gate_violation => is_gate_violated = true,
                CheckKind::BinaryCritical if answer.state == CheckState::Fail => {
                    is_critical_failed = true;
                }
                _ => {}
            }

            total += contribution;
            contributions.insert(check.name.as_str(), contribution);
            per_check.insert(check.name.clone(), answer.clone());
        }

        let overridden = is_gate_violated || is_critical_failed;
        if overridden {
            debug!(
                item = item_id,
                gate = is_gate_violated,
                critical = is_critical_failed,
                unadjusted_pct = percentage(total.earned, total.applicable),
                "Score forced to 0"
            );
        }

        let dimensions: Vec<DimensionScore> = self
            .rubric
            .dimensions()
            .iter()
            .map(|dim| {
                let mut sum = Contribution::default();
                for name in &dim.checks {
                    if let Some(c) = contributions.get(name.as_str()) {
                        sum += *c;
                    }
                }
                DimensionScore {
                    name: dim.name.clone(),
                    earned_points: sum.earned,
                    applicable_points: sum.applicable,
                    score_pct: if overridden {
                        0.0
                    } else {
                        percentage(sum.earned, sum.applicable)
                    },
                }
            })
            .collect();

        let composite_pct = self.composite(&dimensions);

        Ok(ItemScore {
            item_id: item_id.to_string(),
            earned_points: total.earned,
            applicable_points: total.applicable,
            score_pct: if overridden {
                0.0
            } else {
                percentage(total.earned, total.applicable)
            },
            is_gate_violated,
            is_critical_failed,
            failed_checks,
            per_check,
            dimensions,
            composite_pct,
            error: None,
        })
    }

    /// Normalize a raw judgment and score it.
    pub fn score_raw(&self, item_id: &str, judgment: &Judgment) -> Result<ItemScore, ScoringError> {
        let answers = normalize_judgment(self.rubric, judgment)?;
        self.score(item_id, &answers)
    }

    /// Score a raw judgment, turning any failure into a zero-score item that
    /// carries the error message.
    #[must_use]
    pub fn score_item(&self, item_id: &str, judgment: &Judgment) -> ItemScore {
        self.score_raw(item_id, judgment).unwrap_or_else(|err| {
            warn!(item = item_id, error = %err, "Item could not be scored");
            ItemScore::errored(item_id, err)
        })
    }

    /// Weighted mean of dimension percentages when every dimension is weighted.
    fn composite(&self, dimensions: &[DimensionScore]) -> Option<f64> {
        let defs = self.rubric.dimensions();
        if defs.is_empty() {
            return None;
        }
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (def, score) in defs.iter().zip(dimensions) {
            let weight = def.weight?;
            weighted += weight * score.score_pct;
            total_weight += weight;
        }
        Some(if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        })
    }
}

fn contribution(
    check: &CheckDefinition,
    answer: &CheckAnswer,
) -> Result<Contribution, ScoringError> {
    let mismatch = || ScoringError::InvalidAnswer {
        check: check.name.clone(),
        value: answer.state.to_string(),
    };

    match (check.kind, answer.state) {
        (_, CheckState::NotApplicable) => Ok(Contribution::default()),
        (CheckKind::GradedTier, CheckState::Tier(tier)) => {
            let points = check
                .tiers
                .points(tier)
                .or(answer.raw_points)
                .ok_or_else(mismatch)?;
            Ok(Contribution {
                earned: points.clamp(0.0, check.max_points()),
                applicable: check.max_points(),
            })
        }
        (CheckKind::GradedTier, _) | (_, CheckState::Tier(_)) => Err(mismatch()),
        (_, CheckState::Pass) => Ok(Contribution {
            earned: check.weight,
            applicable: check.weight,
        }),
        (_, CheckState::Fail) => Ok(Contribution {
            earned: 0.0,
            applicable: check.weight,
        }),
    }
}

/// Score `answers` against `rubric`.
pub fn score(
    rubric: &Rubric,
    item_id: &str,
    answers: &Scorecard,
) -> Result<ItemScore, ScoringError> {
    RubricScorer::new(rubric).score(item_id, answers)
}
