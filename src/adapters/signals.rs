//! Store facts that override judge answers.
//!
//! Some store checks are matters of record (open now, rating, ETA,
//! distance). When the data is available the answer is computed from it
//! rather than trusted to the judge.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{CheckState, Judgment, RawAnswer, StoreThresholds};
use crate::scoring::parse_label;

/// Known facts about a store at evaluation time.
///
/// Numeric fields win over the display strings the store page shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSignals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    /// Displayed ETA, e.g. `"25 min"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_display: Option<String>,
    /// Displayed ASAP time, e.g. `"25 min"` or `"Closed - opens 5pm"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asap_display: Option<String>,
}

impl StoreSignals {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open().is_none()
            && self.rating.is_none()
            && self.eta().is_none()
            && self.distance_miles.is_none()
    }

    /// Open flag, from `is_open` or else the ASAP display.
    #[must_use]
    pub fn open(&self) -> Option<bool> {
        self.is_open
            .or_else(|| self.asap_display.as_deref().map(is_open_from_display))
    }

    /// ETA in minutes, from `eta_minutes` or else a parseable display ETA.
    #[must_use]
    pub fn eta(&self) -> Option<f64> {
        self.eta_minutes.or_else(|| {
            let eta_display = self.eta_display.as_deref()?;
            let parsed = parse_eta_minutes(eta_display);
            if parsed.is_none() {
                debug!(display = eta_display, "Unparseable store ETA");
            }
            parsed
        })
    }
}

fn eta_pattern() -> Option<&'static Regex> {
    static ETA: OnceLock<Option<Regex>> = OnceLock::new();
    ETA.get_or_init(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:-\s*\d+(?:\.\d+)?\s*)?min").ok())
        .as_ref()
}

/// Minutes from a display ETA such as `"25 min"` or `"20-30 min"` (lower bound).
#[must_use]
pub fn parse_eta_minutes(display: &str) -> Option<f64> {
    let trimmed = display.trim();
    if let Ok(minutes) = trimmed.parse::<f64>() {
        return Some(minutes);
    }
    eta_pattern()?
        .captures(trimmed)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Open flag from an ASAP display string; anything mentioning "close" is closed.
#[must_use]
pub fn is_open_from_display(display: &str) -> bool {
    !display.to_lowercase().contains("close")
}

fn yes_no(value: bool) -> RawAnswer {
    RawAnswer::text(if value { "Yes" } else { "No" })
}

fn answered_applicable(judgment: &Judgment, check: &str) -> bool {
    match judgment.get(check) {
        Some(RawAnswer::Text(text)) => {
            matches!(parse_label(text), Some(CheckState::Pass | CheckState::Fail))
        }
        Some(RawAnswer::Flag(_)) => true,
        _ => false,
    }
}

/// Overwrite judge answers with facts derived from `signals`.
///
/// Open, rating-good and ETA checks are always derived when their data is
/// present. Fast-delivery, top-rated and nearby are re-derived only where the
/// judge found them applicable to the query. An exact restaurant match also
/// counts as a similar-restaurant match.
#[must_use]
pub fn derive_store_answers(
    thresholds: &StoreThresholds,
    signals: &StoreSignals,
    judgment: &Judgment,
) -> Judgment {
    let mut out = judgment.clone();
    let mut set = |check: &str, value: bool| {
        debug!(check, value, "Derived store answer");
        out.insert(check.to_string(), yes_no(value));
    };

    if let Some(open) = signals.open() {
        set("is_store_open", open);
    }
    if let Some(rating) = signals.rating {
        set("is_overall_rating_good", rating >= thresholds.good_rating_min);
        if answered_applicable(judgment, "is_top_rated") {
            set("is_top_rated", rating >= thresholds.top_rated_min_rating);
        }
    }
    if let Some(eta) = signals.eta() {
        let fast = eta <= thresholds.fast_delivery_max_minutes;
        set("is_fast_delivery_check", fast);
        if answered_applicable(judgment, "is_fast_delivery") {
            set("is_fast_delivery", fast);
        }
    }
    if let Some(distance) = signals.distance_miles {
        if answered_applicable(judgment, "is_nearby") {
            set("is_nearby", distance <= thresholds.nearby_max_miles);
        }
    }

    let exact = matches!(
        judgment.get("is_exact_restaurant"),
        Some(RawAnswer::Text(text)) if parse_label(text) == Some(CheckState::Pass)
    ) || matches!(judgment.get("is_exact_restaurant"), Some(RawAnswer::Flag(true)));
    if exact {
        set("is_similar_restaurant", true);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::STRICT_STORE_THRESHOLDS;

    fn judgment(pairs: &[(&str, &str)]) -> Judgment {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), RawAnswer::text(*v)))
            .collect()
    }

    #[test]
    fn test_parse_eta() {
        assert_eq!(parse_eta_minutes("25 min"), Some(25.0));
        assert_eq!(parse_eta_minutes("20-30 min"), Some(20.0));
        assert_eq!(parse_eta_minutes(" 41 "), Some(41.0));
        assert_eq!(parse_eta_minutes("soon"), None);
    }

    #[test]
    fn test_open_from_display() {
        assert!(is_open_from_display("25 min"));
        assert!(!is_open_from_display("Closed - opens 5pm"));
    }

    #[test]
    fn test_always_derived_checks() {
        let signals = StoreSignals {
            is_open: Some(false),
            rating: Some(4.6),
            eta_minutes: Some(45.0),
            ..StoreSignals::default()
        };
        let out = derive_store_answers(
            &STRICT_STORE_THRESHOLDS,
            &signals,
            &judgment(&[("is_store_open", "Yes")]),
        );
        assert_eq!(out["is_store_open"], RawAnswer::text("No"));
        assert_eq!(out["is_overall_rating_good"], RawAnswer::text("Yes"));
        assert_eq!(out["is_fast_delivery_check"], RawAnswer::text("No"));
    }

    #[test]
    fn test_na_answers_stay_na() {
        let signals = StoreSignals {
            rating: Some(4.9),
            eta_minutes: Some(10.0),
            distance_miles: Some(0.5),
            ..StoreSignals::default()
        };
        let out = derive_store_answers(
            &STRICT_STORE_THRESHOLDS,
            &signals,
            &judgment(&[
                ("is_top_rated", "NA"),
                ("is_fast_delivery", "NA to Query"),
                ("is_nearby", "No"),
            ]),
        );
        assert_eq!(out["is_top_rated"], RawAnswer::text("NA"));
        assert_eq!(out["is_fast_delivery"], RawAnswer::text("NA to Query"));
        assert_eq!(out["is_nearby"], RawAnswer::text("Yes"));
    }

    #[test]
    fn test_exact_implies_similar() {
        let out = derive_store_answers(
            &STRICT_STORE_THRESHOLDS,
            &StoreSignals::default(),
            &judgment(&[("is_exact_restaurant", "Yes"), ("is_similar_restaurant", "No")]),
        );
        assert_eq!(out["is_similar_restaurant"], RawAnswer::text("Yes"));
    }

    #[test]
    fn test_display_strings_feed_derivation() {
        let signals = StoreSignals {
            eta_display: Some("25 min".to_string()),
            asap_display: Some("Closed - opens 5pm".to_string()),
            ..StoreSignals::default()
        };
        assert!(!signals.is_empty());
        assert_eq!(signals.open(), Some(false));
        assert_eq!(signals.eta(), Some(25.0));

        let out = derive_store_answers(
            &STRICT_STORE_THRESHOLDS,
            &signals,
            &judgment(&[("is_store_open", "Yes"), ("is_fast_delivery", "No")]),
        );
        assert_eq!(out["is_store_open"], RawAnswer::text("No"));
        assert_eq!(out["is_fast_delivery_check"], RawAnswer::text("Yes"));
        assert_eq!(out["is_fast_delivery"], RawAnswer::text("Yes"));
    }

    #[test]
    fn test_numeric_signals_win_over_display() {
        let signals = StoreSignals {
            is_open: Some(true),
            eta_minutes: Some(50.0),
            eta_display: Some("10 min".to_string()),
            asap_display: Some("Closed".to_string()),
            ..StoreSignals::default()
        };
        assert_eq!(signals.open(), Some(true));
        assert_eq!(signals.eta(), Some(50.0));
    }

    #[test]
    fn test_unparseable_eta_derives_nothing() {
        let signals = StoreSignals {
            eta_display: Some("soon".to_string()),
            ..StoreSignals::default()
        };
        assert!(signals.is_empty());
        let out = derive_store_answers(&STRICT_STORE_THRESHOLDS, &signals, &Judgment::new());
        assert!(!out.contains_key("is_fast_delivery_check"));
    }

    #[test]
    fn test_no_signals_is_identity() {
        let input = judgment(&[("is_nearby", "Yes"), ("is_exact_restaurant", "No")]);
        assert_eq!(
            derive_store_answers(&STRICT_STORE_THRESHOLDS, &StoreSignals::default(), &input),
            input
        );
    }
}
