//! Built-in rubrics.
//!
//! Each factory returns a fresh, validated [`Rubric`]; there is no shared
//! default instance.

use crate::error::RubricError;
use crate::model::{CheckDefinition, DimensionDefinition, Rubric, StoreThresholds};

/// Weights of the structured `<query, store>` rubric, in judge output order.
const STORE_CHECKS: &[(&str, f64)] = &[
    ("is_serving_matched", 3.0),
    ("is_serving_more_than_three_items", 2.0),
    ("is_primary_serving", 2.0),
    ("is_dietary_serving", 3.0),
    ("is_flavor_match", 1.0),
    ("is_ingredient_present", 3.0),
    ("is_prep_style_matched", 1.0),
    ("is_exact_restaurant", 3.0),
    ("is_similar_restaurant", 2.0),
    ("is_portion_matched", 1.0),
    ("is_group_matched", 1.0),
    ("is_nearby", 2.0),
    ("is_fast_delivery", 2.0),
    ("is_top_rated", 2.0),
    ("is_overall_rating_good", 2.0),
    ("is_store_open", 3.0),
    ("is_price_match", 2.0),
    ("is_fast_delivery_check", 2.0),
];

/// A closed store cannot serve the query, whatever else matches.
const STORE_CRITICAL: &str = "is_store_open";

pub const STRICT_STORE_THRESHOLDS: StoreThresholds = StoreThresholds {
    top_rated_min_rating: 4.7,
    good_rating_min: 4.5,
    fast_delivery_max_minutes: 39.0,
    nearby_max_miles: 2.0,
};

pub const LENIENT_STORE_THRESHOLDS: StoreThresholds = StoreThresholds {
    top_rated_min_rating: 4.5,
    good_rating_min: 4.0,
    fast_delivery_max_minutes: 30.0,
    nearby_max_miles: 2.0,
};

fn store_rubric(
    name: &str,
    description: &str,
    thresholds: StoreThresholds,
) -> Result<Rubric, RubricError> {
    Rubric::builder(name)
        .description(description)
        .checks(STORE_CHECKS.iter().map(|(check, weight)| {
            if *check == STORE_CRITICAL {
                CheckDefinition::critical(*check, *weight)
            } else {
                CheckDefinition::standard(*check, *weight)
            }
        }))
        .thresholds(thresholds)
        .build()
}

/// Structured store relevance, strict thresholds (rating 4.7/4.5, 39 min).
pub fn store_relevance() -> Result<Rubric, RubricError> {
    store_rubric(
        "store-relevance",
        "Structured query vs. store, 18 checks; top-rated >= 4.7, good rating >= 4.5, fast <= 39 min",
        STRICT_STORE_THRESHOLDS,
    )
}

/// Structured store relevance, lenient thresholds (rating 4.5/4.0, 30 min).
pub fn store_relevance_lenient() -> Result<Rubric, RubricError> {
    store_rubric(
        "store-relevance-lenient",
        "Structured query vs. store, 18 checks; top-rated >= 4.5, good rating >= 4.0, fast <= 30 min",
        LENIENT_STORE_THRESHOLDS,
    )
}

/// Weight of the profile-preference question when the query's intent class
/// is unknown.
pub const DEFAULT_PREFERENCE_WEIGHT: u8 = 2;

/// Fuzzy query vs. store: intent, constraints, personalization.
///
/// `preference_weight` (1..=3) depends on how much room the query leaves for
/// the customer's profile.
pub fn fuzzy_query(preference_weight: u8) -> Result<Rubric, RubricError> {
    let q8 = "q8_matches_customer_preferences";
    if !(1..=3).contains(&preference_weight) {
        return Err(RubricError::InvalidWeight {
            check: q8.to_string(),
            weight: f64::from(preference_weight),
        });
    }
    Rubric::builder("fuzzy-query")
        .description("Fuzzy query vs. store: intent match, constraints, personalization (Q1-Q9)")
        .check(CheckDefinition::standard("q1_menu_matches_query_intent", 3.0))
        .check(CheckDefinition::standard("q2_covers_all_modifiers", 2.0))
        .check(CheckDefinition::standard("q3_price_limit_met", 1.0))
        .check(CheckDefinition::standard("q4_location_within_range", 1.0))
        .check(CheckDefinition::standard("q5_speed_requirement_met", 1.0))
        .check(CheckDefinition::standard("q6_quality_rating_met", 1.0))
        .check(CheckDefinition::standard("q7_dietary_need_met", 2.0))
        .check(CheckDefinition::standard(q8, f64::from(preference_weight)))
        .check(CheckDefinition::standard("q9_avoids_customer_hard_avoids", 2.0))
        .dimension(DimensionDefinition::new(
            "intent_match",
            &["q1_menu_matches_query_intent", "q2_covers_all_modifiers"],
        ))
        .build()
}

/// Recommendation quality: relevance/format (70%) and serendipity (30%).
pub fn recommendation() -> Result<Rubric, RubricError> {
    let relevance = [
        CheckDefinition::standard("primary_intent", 3.0),
        CheckDefinition::standard("descriptive_traits", 2.0),
        CheckDefinition::standard("category_dietary", 2.0),
        CheckDefinition::standard("situational", 2.0),
        CheckDefinition::standard("explicit_constraints", 2.0),
        CheckDefinition::gate("profile_dietary_gate", 1.0),
        CheckDefinition::standard("output_clarity", 2.0),
        CheckDefinition::standard("mainstream_availability", 2.0),
        CheckDefinition::standard("format_correctness", 2.0),
        CheckDefinition::standard("no_redundant_info", 1.0),
        CheckDefinition::standard("no_vague_filler", 1.0),
    ];
    let serendipity = [
        CheckDefinition::graded(
            "novelty_tier",
            [(1, 0.0), (2, 1.0), (3, 2.0), (4, 3.0), (5, 4.0), (6, 5.0)],
        ),
        CheckDefinition::standard("low_discoverability", 1.0),
        CheckDefinition::standard("familiar_ingredients_new_context", 1.0),
        CheckDefinition::standard("context_fit_while_novel", 1.0),
        CheckDefinition::standard("aha_moment", 1.0),
        CheckDefinition::standard("creates_curiosity", 1.0),
    ];

    let names = |checks: &[CheckDefinition]| -> Vec<String> {
        checks.iter().map(|c| c.name.clone()).collect()
    };
    let relevance_dim = DimensionDefinition {
        name: "relevance_format".to_string(),
        checks: names(&relevance),
        weight: Some(0.7),
    };
    let serendipity_dim = DimensionDefinition {
        name: "serendipity".to_string(),
        checks: names(&serendipity),
        weight: Some(0.3),
    };

    Rubric::builder("recommendation")
        .description("Recommendation relevance/format (20 pts, dietary gate) and serendipity (10 pts)")
        .checks(relevance)
        .checks(serendipity)
        .dimension(relevance_dim)
        .dimension(serendipity_dim)
        .build()
}
