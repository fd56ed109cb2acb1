//! Raw judge answers to canonical check states.

use tracing::warn;

use crate::error::ScoringError;
use crate::model::{
    CheckAnswer, CheckDefinition, CheckKind, CheckState, DetailedAnswer, Judgment, RawAnswer,
    Rubric, Scorecard,
};

/// Map a yes/no/NA label to a state. Case-insensitive, surrounding space ignored.
#[must_use]
pub fn parse_label(label: &str) -> Option<CheckState> {
    match label.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "pass" => Some(CheckState::Pass),
        "no" | "n" | "false" | "fail" => Some(CheckState::Fail),
        "na" | "n/a" | "not applicable" | "na to query" => Some(CheckState::NotApplicable),
        _ => None,
    }
}

/// Normalize one raw answer against its check definition.
///
/// Never coerces: anything that does not map to a state for this kind of
/// check is an [`ScoringError::InvalidAnswer`].
pub fn normalize(raw: &RawAnswer, check: &CheckDefinition) -> Result<CheckAnswer, ScoringError> {
    if check.kind == CheckKind::GradedTier {
        return normalize_graded(raw, check);
    }

    let invalid = || ScoringError::InvalidAnswer {
        check: check.name.clone(),
        value: raw.to_string(),
    };

    let (state, explicit_violation) = match raw {
        RawAnswer::Flag(true) => (CheckState::Pass, None),
        RawAnswer::Flag(false) => (CheckState::Fail, None),
        RawAnswer::Text(text) => (parse_label(text).ok_or_else(invalid)?, None),
        RawAnswer::Detailed(detail) => (
            detailed_state(detail).ok_or_else(invalid)?,
            detail.is_gate_violation,
        ),
        RawAnswer::Tier(_) | RawAnswer::Number(_) | RawAnswer::Graded { .. } => {
            return Err(invalid())
        }
    };

    let is_gate_violation = match check.kind {
        CheckKind::BinaryGate => explicit_violation.unwrap_or(state == CheckState::Fail),
        _ => false,
    };

    Ok(CheckAnswer {
        check_name: check.name.clone(),
        state,
        raw_points: None,
        is_gate_violation,
    })
}

fn detailed_state(detail: &DetailedAnswer) -> Option<CheckState> {
    match (&detail.answer, detail.passed) {
        (Some(text), _) => parse_label(text),
        (None, Some(true)) => Some(CheckState::Pass),
        (None, Some(false)) => Some(CheckState::Fail),
        (None, None) => None,
    }
}

fn normalize_graded(raw: &RawAnswer, check: &CheckDefinition) -> Result<CheckAnswer, ScoringError> {
    let invalid = || ScoringError::InvalidAnswer {
        check: check.name.clone(),
        value: raw.to_string(),
    };

    let tier = match raw {
        RawAnswer::Tier(n) => *n,
        RawAnswer::Number(n) | RawAnswer::Graded { tier: n } => {
            whole_number(*n).ok_or_else(invalid)?
        }
        RawAnswer::Text(text) => {
            if parse_label(text) == Some(CheckState::NotApplicable) {
                return Ok(CheckAnswer::not_applicable(check.name.clone()));
            }
            text.trim().parse::<i64>().map_err(|_| invalid())?
        }
        RawAnswer::Flag(_) | RawAnswer::Detailed(_) => return Err(invalid()),
    };

    let tier = u8::try_from(tier).map_err(|_| invalid())?;
    let points = check.tiers.points(tier).ok_or_else(invalid)?;
    Ok(CheckAnswer::tier(check.name.clone(), tier, points))
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= f64::from(u16::MAX))
        .then(|| value as i64)
}

/// Normalize every answer of a judgment that the rubric knows about.
///
/// Answers for checks outside the rubric are logged and dropped; missing
/// checks are left for the scorer to report.
pub fn normalize_judgment(rubric: &Rubric, judgment: &Judgment) -> Result<Scorecard, ScoringError> {
    let mut answers = Scorecard::with_capacity(judgment.len());
    for (name, raw) in judgment {
        match rubric.check(name) {
            Some(check) => {
                answers.insert(name.clone(), normalize(raw, check)?);
            }
            None => warn!(
                check = %name,
                rubric = rubric.name(),
                "Ignoring answer for unknown check"
            ),
        }
    }
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novelty() -> CheckDefinition {
        CheckDefinition::graded("novelty_tier", [(1, 0.0), (2, 1.0), (6, 5.0)])
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let check = CheckDefinition::standard("is_nearby", 2.0);
        for (raw, expected) in [
            (" yes ", CheckState::Pass),
            ("YES", CheckState::Pass),
            ("No", CheckState::Fail),
            ("na", CheckState::NotApplicable),
            ("NA to Query", CheckState::NotApplicable),
        ] {
            let answer = normalize(&RawAnswer::text(raw), &check).unwrap();
            assert_eq!(answer.state, expected, "{raw}");
            assert!(!answer.is_gate_violation);
        }
    }

    #[test]
    fn test_booleans() {
        let check = CheckDefinition::standard("a", 1.0);
        assert_eq!(normalize(&RawAnswer::Flag(true), &check).unwrap().state, CheckState::Pass);
        assert_eq!(normalize(&RawAnswer::Flag(false), &check).unwrap().state, CheckState::Fail);
    }

    #[test]
    fn test_unrecognized_text_is_invalid() {
        let check = CheckDefinition::standard("is_flavor_match", 1.0);
        let err = normalize(&RawAnswer::text("maybe"), &check).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidAnswer {
                check: "is_flavor_match".to_string(),
                value: "\"maybe\"".to_string(),
            }
        );
    }

    #[test]
    fn test_tier_on_binary_check_is_invalid() {
        let check = CheckDefinition::standard("a", 1.0);
        assert!(normalize(&RawAnswer::Tier(3), &check).is_err());
    }

    #[test]
    fn test_gate_failure_defaults_to_violation() {
        let gate = CheckDefinition::gate("profile_dietary_gate", 1.0);
        let answer = normalize(&RawAnswer::text("No"), &gate).unwrap();
        assert!(answer.is_gate_violation);

        let answer = normalize(&RawAnswer::text("Yes"), &gate).unwrap();
        assert!(!answer.is_gate_violation);
    }

    #[test]
    fn test_gate_explicit_flag_wins() {
        let gate = CheckDefinition::gate("profile_dietary_gate", 1.0);
        let raw = RawAnswer::Detailed(DetailedAnswer {
            answer: Some("No".to_string()),
            is_gate_violation: Some(false),
            ..DetailedAnswer::default()
        });
        let answer = normalize(&raw, &gate).unwrap();
        assert_eq!(answer.state, CheckState::Fail);
        assert!(!answer.is_gate_violation);
    }

    #[test]
    fn test_violation_flag_ignored_on_standard_check() {
        let check = CheckDefinition::standard("a", 1.0);
        let raw = RawAnswer::Detailed(DetailedAnswer {
            passed: Some(false),
            is_gate_violation: Some(true),
            ..DetailedAnswer::default()
        });
        assert!(!normalize(&raw, &check).unwrap().is_gate_violation);
    }

    #[test]
    fn test_empty_detailed_answer_is_invalid() {
        let check = CheckDefinition::standard("a", 1.0);
        let raw = RawAnswer::Detailed(DetailedAnswer::default());
        assert!(normalize(&raw, &check).is_err());
    }

    #[test]
    fn test_graded_tiers() {
        let check = novelty();
        let answer = normalize(&RawAnswer::Graded { tier: 6.0 }, &check).unwrap();
        assert_eq!(answer.state, CheckState::Tier(6));
        assert_eq!(answer.raw_points, Some(5.0));

        let answer = normalize(&RawAnswer::text("2"), &check).unwrap();
        assert_eq!(answer.raw_points, Some(1.0));

        let answer = normalize(&RawAnswer::text("NA"), &check).unwrap();
        assert_eq!(answer.state, CheckState::NotApplicable);
    }

    #[test]
    fn test_graded_rejects_unknown_tiers() {
        let check = novelty();
        assert!(normalize(&RawAnswer::Tier(4), &check).is_err());
        assert!(normalize(&RawAnswer::Tier(-1), &check).is_err());
        assert!(normalize(&RawAnswer::Tier(300), &check).is_err());
        assert!(normalize(&RawAnswer::text("Yes"), &check).is_err());
        assert!(normalize(&RawAnswer::Flag(true), &check).is_err());
    }

    #[test]
    fn test_graded_accepts_whole_floats() {
        let check = novelty();
        let answer = normalize(&RawAnswer::Graded { tier: 2.0 }, &check).unwrap();
        assert_eq!(answer.state, CheckState::Tier(2));

        let answer = normalize(&RawAnswer::Number(6.0), &check).unwrap();
        assert_eq!(answer.state, CheckState::Tier(6));
        assert_eq!(answer.raw_points, Some(5.0));

        assert!(normalize(&RawAnswer::Graded { tier: 2.5 }, &check).is_err());
        assert!(normalize(&RawAnswer::Number(f64::NAN), &check).is_err());
        let binary = CheckDefinition::standard("a", 1.0);
        assert!(normalize(&RawAnswer::Number(2.0), &binary).is_err());
    }

    #[test]
    fn test_normalize_judgment_drops_unknown() {
        let rubric = Rubric::builder("r")
            .check(CheckDefinition::standard("a", 1.0))
            .build()
            .unwrap();
        let mut judgment = Judgment::new();
        judgment.insert("a".to_string(), RawAnswer::text("Yes"));
        judgment.insert("legacy".to_string(), RawAnswer::text("No"));
        let answers = normalize_judgment(&rubric, &judgment).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers["a"].state, CheckState::Pass);
    }
}
