use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::read_structured;
use crate::error::{ErrorContext, Result};
use crate::model::{FacetDefinition, Rubric};

/// Facets over the `store-relevance` rubric, keyed by category.
#[must_use]
pub fn store_relevance_facets() -> Vec<FacetDefinition> {
    vec![
        FacetDefinition::new(
            "main_dish___cuisine",
            &[
                ("is_serving_matched", 3.0),
                ("is_primary_serving", 3.0),
                ("is_serving_more_than_three_items", 1.0),
            ],
        ),
        FacetDefinition::new("dietary_restrictions", &[("is_dietary_serving", 1.0)]),
        FacetDefinition::new(
            "restaurant___store_name",
            &[("is_exact_restaurant", 3.0), ("is_similar_restaurant", 2.0)],
        ),
        FacetDefinition::new("flavor", &[("is_flavor_match", 1.0)]),
        FacetDefinition::new("preparation_style", &[("is_prep_style_matched", 1.0)]),
        FacetDefinition::new("portion_size", &[("is_portion_matched", 1.0)]),
        FacetDefinition::new("groups", &[("is_group_matched", 1.0)]),
        FacetDefinition::new("ingredients", &[("is_ingredient_present", 1.0)]),
        FacetDefinition::new("location", &[("is_nearby", 1.0)]),
        FacetDefinition::new(
            "speed",
            &[("is_fast_delivery", 1.0), ("is_fast_delivery_check", 2.0)],
        ),
        FacetDefinition::new(
            "quality___rating",
            &[("is_top_rated", 1.0), ("is_overall_rating_good", 1.0)],
        ),
        FacetDefinition::new("price", &[("is_price_match", 1.0)]),
        FacetDefinition::new("open_hour_check", &[("is_store_open", 1.0)]),
        FacetDefinition::new(
            "quality_rating_larger_than_45",
            &[("is_overall_rating_good", 1.0)],
        ),
    ]
}

/// Facets over the `fuzzy-query` rubric, using the same category keys.
#[must_use]
pub fn fuzzy_query_facets() -> Vec<FacetDefinition> {
    vec![
        FacetDefinition::new(
            "main_dish___cuisine",
            &[
                ("q1_menu_matches_query_intent", 3.0),
                ("q2_covers_all_modifiers", 2.0),
            ],
        ),
        FacetDefinition::new("price", &[("q3_price_limit_met", 1.0)]),
        FacetDefinition::new("location", &[("q4_location_within_range", 1.0)]),
        FacetDefinition::new("speed", &[("q5_speed_requirement_met", 1.0)]),
        FacetDefinition::new("quality___rating", &[("q6_quality_rating_met", 1.0)]),
        FacetDefinition::new("dietary_restrictions", &[("q7_dietary_need_met", 1.0)]),
    ]
}

/// Built-in facets that apply to `rubric`.
///
/// A built-in facet is kept only when the rubric defines every one of its
/// member checks. The first facet of a given name wins.
#[must_use]
pub fn builtin_facets_for(rubric: &Rubric) -> Vec<FacetDefinition> {
    let mut seen = HashSet::new();
    let facets: Vec<FacetDefinition> = store_relevance_facets()
        .into_iter()
        .chain(fuzzy_query_facets())
        .filter(|facet| {
            let covered = facet.checks().all(|check| rubric.check(check).is_some());
            if !covered {
                debug!(
                    facet = %facet.facet_name,
                    rubric = rubric.name(),
                    "Built-in facet does not apply"
                );
            }
            covered
        })
        .filter(|facet| seen.insert(facet.facet_name.clone()))
        .collect();
    if facets.is_empty() {
        warn!(
            "No built-in facets apply to rubric '{}'; supply facet definitions for a breakdown",
            rubric.name()
        );
    }
    facets
}

/// Load facet definitions from a YAML or JSON list.
pub fn load_facets(path: &Path) -> Result<Vec<FacetDefinition>> {
    read_structured(path).with_context(|| format!("loading facets {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::facet_rubric;
    use crate::rubric::{fuzzy_query, recommendation, store_relevance};

    #[test]
    fn test_store_facets_resolve_against_rubric() {
        let rubric = store_relevance().unwrap();
        for facet in store_relevance_facets() {
            let restricted = facet_rubric(&rubric, &facet).unwrap();
            assert_eq!(restricted.len(), facet.member_checks.len());
        }
    }

    #[test]
    fn test_builtin_facets_follow_rubric() {
        let store = store_relevance().unwrap();
        assert_eq!(builtin_facets_for(&store), store_relevance_facets());

        let fuzzy = fuzzy_query(2).unwrap();
        let facets = builtin_facets_for(&fuzzy);
        assert_eq!(facets, fuzzy_query_facets());
        for facet in &facets {
            assert!(facet_rubric(&fuzzy, facet).is_ok());
        }

        assert!(builtin_facets_for(&recommendation().unwrap()).is_empty());
    }

    #[test]
    fn test_facet_names_unique() {
        let facets = store_relevance_facets();
        let mut names: Vec<&str> = facets.iter().map(|f| f.facet_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), facets.len());
    }
}
