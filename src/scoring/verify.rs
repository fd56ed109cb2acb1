//! Cross-check of judge self-reported scores.
//!
//! Judges are asked to report a total alongside their per-check answers. The
//! recomputed score is always the one that counts; a disagreement beyond the
//! tolerance of the claimed scale is logged and noted.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::ItemScore;

/// Tolerance for scores on a 0-10 scale.
pub const TEN_POINT_TOLERANCE: f64 = 0.15;
/// Tolerance for scores on a 0-100 scale.
pub const PERCENT_TOLERANCE: f64 = 1.5;
/// Tolerance for a claimed earned-points total.
pub const POINTS_TOLERANCE: f64 = 0.15;

const EPSILON: f64 = 1e-9;

/// A score the judge reported about its own answers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimedScore {
    TenPoint(f64),
    Percent(f64),
    EarnedPoints(f64),
}

impl ClaimedScore {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::TenPoint(v) | Self::Percent(v) | Self::EarnedPoints(v) => v,
        }
    }

    #[must_use]
    pub const fn tolerance(self) -> f64 {
        match self {
            Self::TenPoint(_) => TEN_POINT_TOLERANCE,
            Self::Percent(_) => PERCENT_TOLERANCE,
            Self::EarnedPoints(_) => POINTS_TOLERANCE,
        }
    }

    /// The recomputed score expressed on this claim's scale.
    #[must_use]
    pub fn recomputed_from(self, score: &ItemScore) -> f64 {
        match self {
            Self::TenPoint(_) => score.headline_pct() / 10.0,
            Self::Percent(_) => score.headline_pct(),
            Self::EarnedPoints(_) => score.earned_points,
        }
    }
}

/// Outcome of comparing a claimed score with the recomputed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreVerification {
    pub claimed: ClaimedScore,
    /// Authoritative value, on the claim's scale
    pub recomputed: f64,
    pub difference: f64,
    pub within_tolerance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Compare `claimed` with what `score` recomputed.
#[must_use]
pub fn verify_claimed_score(score: &ItemScore, claimed: ClaimedScore) -> ScoreVerification {
    let recomputed = claimed.recomputed_from(score);
    let difference = (claimed.value() - recomputed).abs();
    let within_tolerance = difference <= claimed.tolerance() + EPSILON;

    let note = if within_tolerance {
        None
    } else {
        warn!(
            item = %score.item_id,
            claimed = claimed.value(),
            recomputed,
            "Claimed score disagrees with recomputed score; using recomputed"
        );
        Some(format!(
            "claimed {:.2} but checks add up to {:.2}; recomputed value kept",
            claimed.value(),
            recomputed
        ))
    };

    ScoreVerification {
        claimed,
        recomputed,
        difference,
        within_tolerance,
        note,
    }
}
