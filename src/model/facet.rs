use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named subset of rubric checks, re-weighted for diagnostic sub-scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FacetDefinition {
    pub facet_name: String,
    pub member_checks: Vec<FacetMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FacetMember {
    pub check: String,
    pub weight: f64,
}

impl FacetDefinition {
    #[must_use]
    pub fn new(facet_name: impl Into<String>, members: &[(&str, f64)]) -> Self {
        Self {
            facet_name: facet_name.into(),
            member_checks: members
                .iter()
                .map(|(check, weight)| FacetMember {
                    check: (*check).to_string(),
                    weight: *weight,
                })
                .collect(),
        }
    }

    pub fn checks(&self) -> impl Iterator<Item = &str> {
        self.member_checks.iter().map(|m| m.check.as_str())
    }
}
