//! Named rubrics and rubric files.
//!
//! A rubric is chosen either by preset name (`store-relevance`,
//! `fuzzy-query:3`, ...) or by a path to a YAML/JSON rubric file.

mod presets;

use std::path::Path;

pub use presets::{
    fuzzy_query, recommendation, store_relevance, store_relevance_lenient,
    DEFAULT_PREFERENCE_WEIGHT, LENIENT_STORE_THRESHOLDS, STRICT_STORE_THRESHOLDS,
};

use crate::config::read_structured;
use crate::error::{ErrorContext, Result, RubricError};
use crate::model::Rubric;

/// Built-in rubric presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubricPreset {
    StoreRelevance,
    StoreRelevanceLenient,
    FuzzyQuery,
    Recommendation,
}

impl RubricPreset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StoreRelevance => "store-relevance",
            Self::StoreRelevanceLenient => "store-relevance-lenient",
            Self::FuzzyQuery => "fuzzy-query",
            Self::Recommendation => "recommendation",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "store-relevance" | "store" | "structured" => Some(Self::StoreRelevance),
            "store-relevance-lenient" | "store-lenient" => Some(Self::StoreRelevanceLenient),
            "fuzzy-query" | "fuzzy" => Some(Self::FuzzyQuery),
            "recommendation" | "rec" => Some(Self::Recommendation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::StoreRelevance => {
                "Structured query vs. store, strict thresholds (top-rated 4.7, good 4.5, fast 39 min)"
            }
            Self::StoreRelevanceLenient => {
                "Structured query vs. store, lenient thresholds (top-rated 4.5, good 4.0, fast 30 min)"
            }
            Self::FuzzyQuery => "Fuzzy query vs. store, Q1-Q9; append :N (1-3) for the Q8 weight",
            Self::Recommendation => "Recommendation relevance/format and serendipity, 70/30",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::StoreRelevance,
            Self::StoreRelevanceLenient,
            Self::FuzzyQuery,
            Self::Recommendation,
        ]
    }

    /// Build this preset's rubric.
    pub fn build(self) -> std::result::Result<Rubric, RubricError> {
        match self {
            Self::StoreRelevance => store_relevance(),
            Self::StoreRelevanceLenient => store_relevance_lenient(),
            Self::FuzzyQuery => fuzzy_query(DEFAULT_PREFERENCE_WEIGHT),
            Self::Recommendation => recommendation(),
        }
    }
}

impl std::fmt::Display for RubricPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn unknown_preset(name: &str) -> RubricError {
    RubricError::UnknownPreset {
        name: name.to_string(),
        available: RubricPreset::all()
            .iter()
            .map(RubricPreset::name)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Build a preset rubric by name. `fuzzy-query:N` sets the Q8 weight.
pub fn preset(name: &str) -> std::result::Result<Rubric, RubricError> {
    if let Some((base, param)) = name.split_once(':') {
        return match RubricPreset::from_name(base) {
            Some(RubricPreset::FuzzyQuery) => {
                let weight = param.trim().parse::<u8>().map_err(|_| unknown_preset(name))?;
                fuzzy_query(weight)
            }
            _ => Err(unknown_preset(name)),
        };
    }
    RubricPreset::from_name(name)
        .ok_or_else(|| unknown_preset(name))?
        .build()
}

/// Load a rubric file (YAML or JSON by extension).
pub fn load_rubric(path: &Path) -> Result<Rubric> {
    read_structured(path).with_context(|| format!("loading rubric {}", path.display()))
}

/// Resolve a preset name or, failing that, a rubric file path.
pub fn resolve_rubric(name_or_path: &str) -> Result<Rubric> {
    match preset(name_or_path) {
        Ok(rubric) => Ok(rubric),
        Err(err @ RubricError::UnknownPreset { .. }) => {
            let path = Path::new(name_or_path);
            if path.exists() {
                load_rubric(path)
            } else {
                Err(err.into())
            }
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JudgeError;
    use std::io::Write;

    #[test]
    fn test_every_preset_builds() {
        for preset in RubricPreset::all() {
            let rubric = preset.build().unwrap();
            assert_eq!(rubric.name(), preset.name());
            assert_eq!(RubricPreset::from_name(preset.name()), Some(*preset));
        }
    }

    #[test]
    fn test_fuzzy_weight_suffix() {
        let rubric = preset("fuzzy-query:1").unwrap();
        assert_eq!(
            rubric.check("q8_matches_customer_preferences").unwrap().weight,
            1.0
        );
        assert!(matches!(
            preset("fuzzy-query:9"),
            Err(RubricError::InvalidWeight { .. })
        ));
        assert!(matches!(
            preset("store-relevance:2"),
            Err(RubricError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn test_unknown_preset_lists_available() {
        let err = preset("nope").unwrap_err();
        assert!(err.to_string().contains("store-relevance-lenient"));
    }

    #[test]
    fn test_resolve_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"name":"custom","checks":[{{"name":"a","weight":2}},{{"name":"b","weight":1,"kind":"gate"}}]}}"#
        )
        .unwrap();
        let rubric = resolve_rubric(file.path().to_str().unwrap()).unwrap();
        assert_eq!(rubric.name(), "custom");
        assert_eq!(rubric.len(), 2);
    }

    #[test]
    fn test_resolve_missing() {
        let err = resolve_rubric("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, JudgeError::Rubric(RubricError::UnknownPreset { .. })));
    }

    #[test]
    fn test_invalid_rubric_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "name: bad\nchecks:\n  - {{name: a, weight: -1}}").unwrap();
        let err = load_rubric(file.path()).unwrap_err();
        assert!(err.to_string().contains("loading rubric"), "{err}");
    }
}
