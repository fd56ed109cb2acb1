//! Configuration validation.

use super::types::{AppConfig, FacetsConfig, OutputConfig, PrefilterConfig, ScoringConfig};
use crate::rubric::preset;
use crate::error::RubricError;

/// One problem found in a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted path of the offending field
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.scoring.validate();
        errors.extend(self.facets.validate());
        errors.extend(self.prefilter.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for ScoringConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.rubric.trim().is_empty() {
            errors.push(ConfigError::new("scoring.rubric", "must not be empty"));
        } else if !std::path::Path::new(&self.rubric).exists() {
            match preset(&self.rubric) {
                Ok(_) => {}
                Err(RubricError::UnknownPreset { available, .. }) => errors.push(ConfigError::new(
                    "scoring.rubric",
                    format!(
                        "'{}' is neither a rubric file nor a preset ({available})",
                        self.rubric
                    ),
                )),
                Err(err) => errors.push(ConfigError::new("scoring.rubric", err.to_string())),
            }
        }

        if self.k == Some(0) {
            errors.push(ConfigError::new("scoring.k", "must be at least 1 when set"));
        }

        if let Some(min) = self.min_ndcg {
            if !(0.0..=1.0).contains(&min) {
                errors.push(ConfigError::new(
                    "scoring.min_ndcg",
                    format!("{min} is outside [0, 1]"),
                ));
            }
        }

        errors
    }
}

impl Validatable for FacetsConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (field, path) in [
            ("facets.definitions", &self.definitions),
            ("facets.categories", &self.categories),
        ] {
            if let Some(path) = path {
                if !path.exists() {
                    errors.push(ConfigError::new(
                        field,
                        format!("{} does not exist", path.display()),
                    ));
                }
            }
        }
        errors
    }
}

impl Validatable for PrefilterConfig {
    fn validate(&self) -> Vec<ConfigError> {
        match self.threshold {
            Some(t) if !(0.0..=1.0).contains(&t) => vec![ConfigError::new(
                "prefilter.threshold",
                format!("{t} is outside [0, 1]"),
            )],
            _ => Vec::new(),
        }
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        match &self.file {
            Some(file) if file.as_os_str().is_empty() => {
                vec![ConfigError::new("output.file", "must not be empty when set")]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_unknown_rubric() {
        let config = AppConfig::builder().rubric("no-such-rubric").build();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "scoring.rubric");
        assert!(errors[0].message.contains("store-relevance"));
    }

    #[test]
    fn test_fuzzy_weight_out_of_range() {
        let config = AppConfig::builder().rubric("fuzzy-query:7").build();
        assert!(!config.is_valid());
    }

    #[test]
    fn test_ranges() {
        let mut config = AppConfig::builder().k(Some(0)).prefilter(1.5).min_ndcg(-0.1).build();
        config.facets.categories = Some(PathBuf::from("/nonexistent/categories.yaml"));
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                "scoring.k",
                "scoring.min_ndcg",
                "facets.categories",
                "prefilter.threshold"
            ]
        );
    }
}
