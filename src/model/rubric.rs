//! Rubric configuration: check definitions, tier tables and dimensions.
//!
//! A [`Rubric`] can only be obtained through [`RubricBuilder::build`] (or
//! deserialization, which goes through the same validation), so every rubric
//! in memory has unique check names, positive weights and well-formed tiers.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::RubricError;

/// How a check contributes to an item's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Fails flagged as violations zero the whole item
    #[serde(alias = "gate")]
    BinaryGate,
    /// Any failure zeroes the whole item
    #[serde(alias = "critical")]
    BinaryCritical,
    /// Plain weighted yes/no check
    #[default]
    #[serde(alias = "standard")]
    BinaryStandard,
    /// Integer tier mapped to points through a tier table
    #[serde(alias = "graded")]
    GradedTier,
}

impl CheckKind {
    /// Whether answers are pass/fail rather than tiers.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Self::GradedTier)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BinaryGate => "gate",
            Self::BinaryCritical => "critical",
            Self::BinaryStandard => "standard",
            Self::GradedTier => "graded",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier number to awarded points for a graded check.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TierTable {
    points: BTreeMap<u8, f64>,
}

impl TierTable {
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (u8, f64)>) -> Self {
        Self {
            points: entries.into_iter().collect(),
        }
    }

    /// Points awarded for `tier`, if the tier exists.
    #[must_use]
    pub fn points(&self, tier: u8) -> Option<f64> {
        self.points.get(&tier).copied()
    }

    /// Highest number of points any tier awards.
    #[must_use]
    pub fn max_points(&self) -> f64 {
        self.points.values().copied().fold(0.0, f64::max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.points.iter().map(|(tier, points)| (*tier, *points))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Same tiers with every point value multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.iter().map(|(tier, points)| (tier, points * factor)))
    }
}

/// One weighted criterion of a rubric.
///
/// For graded checks `weight` is the ceiling: the points an item can earn at
/// the best tier, and what the check adds to the applicable total.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDefinition {
    pub name: String,
    pub weight: f64,
    pub kind: CheckKind,
    pub tiers: TierTable,
}

impl CheckDefinition {
    #[must_use]
    pub fn standard(name: impl Into<String>, weight: f64) -> Self {
        Self::binary(name, weight, CheckKind::BinaryStandard)
    }

    #[must_use]
    pub fn gate(name: impl Into<String>, weight: f64) -> Self {
        Self::binary(name, weight, CheckKind::BinaryGate)
    }

    #[must_use]
    pub fn critical(name: impl Into<String>, weight: f64) -> Self {
        Self::binary(name, weight, CheckKind::BinaryCritical)
    }

    /// A graded check whose ceiling is the best tier's points.
    #[must_use]
    pub fn graded(name: impl Into<String>, tiers: impl IntoIterator<Item = (u8, f64)>) -> Self {
        let tiers = TierTable::new(tiers);
        Self {
            name: name.into(),
            weight: tiers.max_points(),
            kind: CheckKind::GradedTier,
            tiers,
        }
    }

    fn binary(name: impl Into<String>, weight: f64, kind: CheckKind) -> Self {
        Self {
            name: name.into(),
            weight,
            kind,
            tiers: TierTable::default(),
        }
    }

    /// Maximum points this check can add to an item's applicable total.
    #[must_use]
    pub fn max_points(&self) -> f64 {
        self.weight
    }

    /// Copy of this check carrying `weight` instead; graded tiers scale with it.
    #[must_use]
    pub fn reweighted(&self, weight: f64) -> Self {
        let tiers = if self.kind == CheckKind::GradedTier && self.weight > 0.0 {
            self.tiers.scaled(weight / self.weight)
        } else {
            self.tiers.clone()
        };
        Self {
            name: self.name.clone(),
            weight,
            kind: self.kind,
            tiers,
        }
    }

    fn validate(&self) -> Result<(), RubricError> {
        if self.name.trim().is_empty() {
            return Err(RubricError::EmptyCheckName);
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(RubricError::InvalidWeight {
                check: self.name.clone(),
                weight: self.weight,
            });
        }
        match self.kind {
            CheckKind::GradedTier => {
                if self.tiers.is_empty() {
                    return Err(RubricError::MissingTiers(self.name.clone()));
                }
                for (tier, points) in self.tiers.iter() {
                    if !points.is_finite() || points < 0.0 || points > self.weight {
                        return Err(RubricError::TierOutOfRange {
                            check: self.name.clone(),
                            tier,
                            points,
                            max: self.weight,
                        });
                    }
                }
            }
            _ if !self.tiers.is_empty() => {
                return Err(RubricError::UnexpectedTiers(self.name.clone()));
            }
            _ => {}
        }
        Ok(())
    }
}

/// A named group of checks scored together, e.g. "serendipity".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionDefinition {
    pub name: String,
    pub checks: Vec<String>,
    /// Share of the composite score; unweighted dimensions are diagnostic only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl DimensionDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, checks: &[&str]) -> Self {
        Self {
            name: name.into(),
            checks: checks.iter().map(|c| (*c).to_string()).collect(),
            weight: None,
        }
    }

    #[must_use]
    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Store-data thresholds used to derive factual checks.
///
/// Different rubric revisions disagree on these, so they travel with the
/// rubric instead of being constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoreThresholds {
    pub top_rated_min_rating: f64,
    pub good_rating_min: f64,
    pub fast_delivery_max_minutes: f64,
    pub nearby_max_miles: f64,
}

/// An immutable, validated set of weighted checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RubricSpec", into = "RubricSpec")]
pub struct Rubric {
    name: String,
    description: Option<String>,
    checks: IndexMap<String, CheckDefinition>,
    dimensions: Vec<DimensionDefinition>,
    thresholds: Option<StoreThresholds>,
}

impl Rubric {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RubricBuilder {
        RubricBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Checks in definition order.
    pub fn checks(&self) -> impl Iterator<Item = &CheckDefinition> {
        self.checks.values()
    }

    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CheckDefinition> {
        self.checks.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    #[must_use]
    pub fn dimensions(&self) -> &[DimensionDefinition] {
        &self.dimensions
    }

    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&DimensionDefinition> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    #[must_use]
    pub fn thresholds(&self) -> Option<&StoreThresholds> {
        self.thresholds.as_ref()
    }

    /// Sum of every check's ceiling.
    #[must_use]
    pub fn total_points(&self) -> f64 {
        self.checks().map(CheckDefinition::max_points).sum()
    }
}

/// Incremental constructor for [`Rubric`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RubricBuilder {
    name: String,
    description: Option<String>,
    checks: Vec<CheckDefinition>,
    dimensions: Vec<DimensionDefinition>,
    thresholds: Option<StoreThresholds>,
}

impl RubricBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            checks: Vec::new(),
            dimensions: Vec::new(),
            thresholds: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn check(mut self, check: CheckDefinition) -> Self {
        self.checks.push(check);
        self
    }

    pub fn checks(mut self, checks: impl IntoIterator<Item = CheckDefinition>) -> Self {
        self.checks.extend(checks);
        self
    }

    pub fn dimension(mut self, dimension: DimensionDefinition) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn thresholds(mut self, thresholds: StoreThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Validate and freeze the rubric.
    pub fn build(self) -> Result<Rubric, RubricError> {
        if self.checks.is_empty() {
            return Err(RubricError::Empty { rubric: self.name });
        }

        let mut checks = IndexMap::with_capacity(self.checks.len());
        for check in self.checks {
            check.validate()?;
            if checks.contains_key(&check.name) {
                return Err(RubricError::DuplicateCheck(check.name));
            }
            checks.insert(check.name.clone(), check);
        }

        for (idx, dim) in self.dimensions.iter().enumerate() {
            let invalid = |message: String| RubricError::InvalidDimension {
                dimension: dim.name.clone(),
                message,
            };
            if dim.name.trim().is_empty() {
                return Err(invalid("name must not be empty".to_string()));
            }
            if self.dimensions[..idx].iter().any(|d| d.name == dim.name) {
                return Err(invalid("defined more than once".to_string()));
            }
            if dim.checks.is_empty() {
                return Err(invalid("has no checks".to_string()));
            }
            if let Some(unknown) = dim.checks.iter().find(|c| !checks.contains_key(*c)) {
                return Err(invalid(format!("unknown check '{unknown}'")));
            }
            if let Some(w) = dim.weight {
                if !w.is_finite() || w < 0.0 {
                    return Err(invalid(format!("weight {w} must be finite and >= 0")));
                }
            }
        }

        Ok(Rubric {
            name: self.name,
            description: self.description,
            checks,
            dimensions: self.dimensions,
            thresholds: self.thresholds,
        })
    }
}

// ============================================================================
// File form
// ============================================================================

/// Serialized shape of a rubric (YAML or JSON).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RubricSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub checks: Vec<CheckSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<StoreThresholds>,
}

/// Serialized shape of one check.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckSpec {
    pub name: String,
    /// Required for binary checks; graded checks default to their best tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub kind: CheckKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiers: Vec<TierPoints>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct TierPoints {
    pub tier: u8,
    pub points: f64,
}

impl TryFrom<CheckSpec> for CheckDefinition {
    type Error = RubricError;

    fn try_from(spec: CheckSpec) -> Result<Self, Self::Error> {
        let mut seen = Vec::with_capacity(spec.tiers.len());
        for tp in &spec.tiers {
            if seen.contains(&tp.tier) {
                return Err(RubricError::DuplicateTier {
                    check: spec.name,
                    tier: tp.tier,
                });
            }
            seen.push(tp.tier);
        }
        let tiers = TierTable::new(spec.tiers.iter().map(|tp| (tp.tier, tp.points)));
        let weight = match (spec.weight, spec.kind) {
            (Some(w), _) => w,
            (None, CheckKind::GradedTier) => tiers.max_points(),
            (None, _) => f64::NAN,
        };
        Ok(Self {
            name: spec.name,
            weight,
            kind: spec.kind,
            tiers,
        })
    }
}

impl From<&CheckDefinition> for CheckSpec {
    fn from(def: &CheckDefinition) -> Self {
        Self {
            name: def.name.clone(),
            weight: Some(def.weight),
            kind: def.kind,
            tiers: def
                .tiers
                .iter()
                .map(|(tier, points)| TierPoints { tier, points })
                .collect(),
        }
    }
}

impl TryFrom<RubricSpec> for Rubric {
    type Error = RubricError;

    fn try_from(spec: RubricSpec) -> Result<Self, Self::Error> {
        let mut builder = Rubric::builder(spec.name);
        if let Some(description) = spec.description {
            builder = builder.description(description);
        }
        for check in spec.checks {
            builder = builder.check(CheckDefinition::try_from(check)?);
        }
        for dim in spec.dimensions {
            builder = builder.dimension(dim);
        }
        if let Some(thresholds) = spec.thresholds {
            builder = builder.thresholds(thresholds);
        }
        builder.build()
    }
}

impl From<Rubric> for RubricSpec {
    fn from(rubric: Rubric) -> Self {
        Self {
            checks: rubric.checks.values().map(CheckSpec::from).collect(),
            name: rubric.name,
            description: rubric.description,
            dimensions: rubric.dimensions,
            thresholds: rubric.thresholds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn novelty() -> CheckDefinition {
        CheckDefinition::graded(
            "novelty_tier",
            [(1, 0.0), (2, 1.0), (3, 2.0), (4, 3.0), (5, 4.0), (6, 5.0)],
        )
    }

    #[test]
    fn test_graded_weight_is_best_tier() {
        let check = novelty();
        assert_eq!(check.weight, 5.0);
        assert_eq!(check.tiers.points(4), Some(3.0));
        assert_eq!(check.tiers.points(9), None);
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let err = Rubric::builder("dup")
            .check(CheckDefinition::standard("a", 1.0))
            .check(CheckDefinition::standard("a", 2.0))
            .build()
            .unwrap_err();
        assert_eq!(err, RubricError::DuplicateCheck("a".to_string()));
    }

    #[test]
    fn test_build_rejects_bad_weight() {
        let err = Rubric::builder("w")
            .check(CheckDefinition::standard("a", 0.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RubricError::InvalidWeight { .. }));

        let err = Rubric::builder("w")
            .check(CheckDefinition::standard("a", f64::INFINITY))
            .build()
            .unwrap_err();
        assert!(matches!(err, RubricError::InvalidWeight { .. }));
    }

    #[test]
    fn test_build_rejects_empty() {
        let err = Rubric::builder("none").build().unwrap_err();
        assert!(matches!(err, RubricError::Empty { .. }));
    }

    #[test]
    fn test_tier_points_above_ceiling() {
        let mut check = novelty();
        check.weight = 3.0;
        let err = Rubric::builder("t").check(check).build().unwrap_err();
        assert!(matches!(err, RubricError::TierOutOfRange { tier: 5, .. }));
    }

    #[test]
    fn test_dimension_unknown_check() {
        let err = Rubric::builder("d")
            .check(CheckDefinition::standard("a", 1.0))
            .dimension(DimensionDefinition::new("rel", &["a", "b"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, RubricError::InvalidDimension { .. }));
    }

    #[test]
    fn test_reweighted_graded_scales_tiers() {
        let half = novelty().reweighted(2.5);
        assert_eq!(half.weight, 2.5);
        assert_eq!(half.tiers.points(6), Some(2.5));
        assert_eq!(half.tiers.points(3), Some(1.0));
    }

    #[test]
    fn test_yaml_round_trip_keeps_order() {
        let yaml = r"
name: mini
checks:
  - name: is_store_open
    weight: 3
    kind: critical
  - name: is_nearby
    weight: 2
  - name: novelty_tier
    kind: graded
    tiers:
      - { tier: 1, points: 0 }
      - { tier: 2, points: 2 }
dimensions:
  - name: all
    checks: [is_store_open, is_nearby]
";
        let rubric: Rubric = serde_yaml_ng::from_str(yaml).unwrap();
        let names: Vec<&str> = rubric.checks().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["is_store_open", "is_nearby", "novelty_tier"]);
        assert_eq!(
            rubric.check("is_store_open").unwrap().kind,
            CheckKind::BinaryCritical
        );
        assert_eq!(rubric.check("novelty_tier").unwrap().weight, 2.0);

        let back: Rubric =
            serde_yaml_ng::from_str(&serde_yaml_ng::to_string(&rubric).unwrap()).unwrap();
        assert_eq!(back, rubric);
    }

    #[test]
    fn test_binary_without_weight_is_rejected() {
        let yaml = "name: x\nchecks:\n  - name: a\n";
        let result: Result<Rubric, _> = serde_yaml_ng::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_tier_rejected() {
        let json = r#"{"name":"x","checks":[{"name":"t","kind":"graded","tiers":[{"tier":1,"points":0},{"tier":1,"points":1}]}]}"#;
        let result: Result<Rubric, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
