//! Parser for the legacy one-line explanation format.
//!
//! Older judge prompts return a single string instead of per-check objects:
//!
//! ```text
//! Y | is_serving_matched, is_nearby; N | is_flavor_match; NA | is_dietary_serving; SUM | 5; RATIONAL | Serves burgers nearby
//! ```
//!
//! Sections are separated by `;` and split on the first `|`. `Y`, `N` and
//! `NA` list check names; `SUM` is the judge's own earned-points total;
//! `RATIONAL` is free text and runs to the end of the string, so it may
//! itself contain `;`. Unknown sections are ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Judgment, RawAnswer};
use crate::scoring::ClaimedScore;

/// Raw answers recovered from an explanation string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub answers: Judgment,
    /// The judge's `SUM`, if present and numeric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Explanation {
    /// The `SUM` section as a claim on earned points.
    #[must_use]
    pub fn claimed_score(&self) -> Option<ClaimedScore> {
        self.claimed_sum.map(ClaimedScore::EarnedPoints)
    }
}

/// Parse an explanation string. A criterion listed twice keeps its last label.
#[must_use]
pub fn parse_explanation(text: &str) -> Explanation {
    let mut explanation = Explanation::default();
    let mut rest = text;

    while !rest.trim().is_empty() {
        let (section, remainder) = rest.split_once(';').unwrap_or((rest, ""));
        rest = remainder;

        let Some((key, value)) = section.split_once('|') else {
            continue;
        };
        let key = key.trim().to_ascii_uppercase();
        let value = value.trim();

        let label = match key.as_str() {
            "Y" | "YES" => "Yes",
            "N" | "NO" => "No",
            "NA" | "N/A" => "NA",
            "SUM" => {
                explanation.claimed_sum = value.parse().ok();
                if explanation.claimed_sum.is_none() {
                    debug!(value, "Ignoring non-numeric SUM");
                }
                continue;
            }
            "RATIONAL" | "RATIONALE" => {
                let full = if remainder.is_empty() {
                    value.to_string()
                } else {
                    format!("{value};{remainder}")
                };
                let full = full.trim();
                if !full.is_empty() {
                    explanation.rationale = Some(full.to_string());
                }
                break;
            }
            _ => {
                debug!(section = %key, "Ignoring unknown explanation section");
                continue;
            }
        };

        for criterion in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            explanation
                .answers
                .insert(criterion.to_string(), RawAnswer::text(label));
        }
    }

    explanation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_explanation() {
        let parsed = parse_explanation(
            "Y | is_serving_matched, is_primary_serving, is_nearby; N | is_flavor_match; \
             NA | is_dietary_serving, is_exact_restaurant; SUM | 10; RATIONAL | Serves burgers nearby",
        );
        assert_eq!(parsed.answers.len(), 6);
        assert_eq!(parsed.answers["is_nearby"], RawAnswer::text("Yes"));
        assert_eq!(parsed.answers["is_flavor_match"], RawAnswer::text("No"));
        assert_eq!(parsed.answers["is_exact_restaurant"], RawAnswer::text("NA"));
        assert_eq!(parsed.claimed_sum, Some(10.0));
        assert_eq!(parsed.claimed_score(), Some(ClaimedScore::EarnedPoints(10.0)));
        assert_eq!(parsed.rationale.as_deref(), Some("Serves burgers nearby"));
    }

    #[test]
    fn test_rationale_keeps_semicolons() {
        let parsed = parse_explanation("Y | a; RATIONAL | open late; cheap too");
        assert_eq!(parsed.rationale.as_deref(), Some("open late; cheap too"));
    }

    #[test]
    fn test_last_label_wins() {
        let parsed = parse_explanation("Y | a, b; N | a");
        assert_eq!(parsed.answers["a"], RawAnswer::text("No"));
        assert_eq!(parsed.answers["b"], RawAnswer::text("Yes"));
    }

    #[test]
    fn test_empty_and_malformed() {
        assert_eq!(parse_explanation(""), Explanation::default());
        let parsed = parse_explanation("garbage; ; FOO | x; SUM | lots");
        assert!(parsed.answers.is_empty());
        assert_eq!(parsed.claimed_sum, None);
    }

    #[test]
    fn test_empty_lists() {
        let parsed = parse_explanation("Y | ; N | a,, ; NA |");
        assert_eq!(parsed.answers.len(), 1);
        assert_eq!(parsed.answers["a"], RawAnswer::text("No"));
    }
}
