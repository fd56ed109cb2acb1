//! Raw judge output and normalized per-check answers.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Canonical state of one check after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Pass,
    Fail,
    NotApplicable,
    Tier(u8),
}

impl CheckState {
    #[must_use]
    pub const fn is_applicable(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "Yes"),
            Self::Fail => write!(f, "No"),
            Self::NotApplicable => write!(f, "NA"),
            Self::Tier(n) => write!(f, "tier {n}"),
        }
    }
}

/// One normalized judgment for one check on one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckAnswer {
    pub check_name: String,
    pub state: CheckState,
    /// Points for the answered tier (graded checks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_points: Option<f64>,
    #[serde(default)]
    pub is_gate_violation: bool,
}

impl CheckAnswer {
    #[must_use]
    pub fn new(check_name: impl Into<String>, state: CheckState) -> Self {
        Self {
            check_name: check_name.into(),
            state,
            raw_points: None,
            is_gate_violation: false,
        }
    }

    #[must_use]
    pub fn pass(check_name: impl Into<String>) -> Self {
        Self::new(check_name, CheckState::Pass)
    }

    #[must_use]
    pub fn fail(check_name: impl Into<String>) -> Self {
        Self::new(check_name, CheckState::Fail)
    }

    #[must_use]
    pub fn not_applicable(check_name: impl Into<String>) -> Self {
        Self::new(check_name, CheckState::NotApplicable)
    }

    #[must_use]
    pub fn tier(check_name: impl Into<String>, tier: u8, points: f64) -> Self {
        Self {
            raw_points: Some(points),
            ..Self::new(check_name, CheckState::Tier(tier))
        }
    }

    #[must_use]
    pub fn with_gate_violation(mut self, violated: bool) -> Self {
        self.is_gate_violation = violated;
        self
    }
}

/// A judge's answer for one check, as it arrives from the judgment layer.
///
/// Accepts `"Yes"`/`"No"`/`"NA"`, booleans, bare tier numbers, `{"tier": n}`
/// and an object form that can carry a gate-violation flag. Tier numbers may
/// arrive as floats (`4.0`); only whole values name a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Flag(bool),
    Tier(i64),
    Number(f64),
    Text(String),
    Graded { tier: f64 },
    Detailed(DetailedAnswer),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    /// Absent means "a failure is a violation"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_gate_violation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RawAnswer {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<&str> for RawAnswer {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for RawAnswer {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl fmt::Display for RawAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Tier(n) => write!(f, "tier {n}"),
            Self::Number(n) | Self::Graded { tier: n } => write!(f, "tier {n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Detailed(d) => match (&d.answer, d.passed) {
                (Some(a), _) => write!(f, "{a:?}"),
                (None, Some(p)) => write!(f, "{p}"),
                (None, None) => write!(f, "empty answer"),
            },
        }
    }
}

/// All raw answers for one item, keyed by check name.
pub type Judgment = IndexMap<String, RawAnswer>;

/// Normalized answers for one item, keyed by check name.
pub type Scorecard = IndexMap<String, CheckAnswer>;
