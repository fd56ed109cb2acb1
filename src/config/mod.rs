//! Configuration for relevance-judge.
//!
//! - Typed sections with defaults ([`AppConfig`])
//! - Validation ([`Validatable`])
//! - YAML config file discovery and loading
//! - JSON Schema generation for editors
//!
//! # Configuration File
//!
//! Place a `.relevance-judge.yaml` file in your project root or
//! `~/.config/relevance-judge/`:
//!
//! ```yaml
//! scoring:
//!   rubric: store-relevance-lenient
//!   k: 5
//! facets:
//!   enabled: true
//!   categories: ./query_categories.yaml
//! prefilter:
//!   threshold: 0.7
//! ```

pub mod file;
mod types;
mod validation;

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    read_structured,
};
pub use types::{
    AppConfig, AppConfigBuilder, FacetsConfig, OutputConfig, PrefilterConfig, ScoringConfig,
    DEFAULT_NDCG_K, DEFAULT_RUBRIC,
};
pub use validation::{ConfigError, Validatable};

/// JSON Schema for the configuration file format.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_sections() {
        let schema = generate_json_schema();
        for section in ["scoring", "facets", "prefilter", "output"] {
            assert!(schema.contains(section), "{section} missing");
        }
    }
}
