//! Category/facet aggregation.
//!
//! A facet re-scores items using only a handful of checks (price, dietary,
//! speed...) so ranking quality can be broken down by what a query asked for.
//! Membership comes from the items themselves or is backfilled from a
//! [`CategorySource`] before aggregation.

mod aggregator;
mod membership;
mod presets;

pub use aggregator::{
    aggregate_by_check, aggregate_by_facet, aggregate_queries_by_facet, facet_rubric,
    FacetItem, FacetMetrics, FacetQuery,
};
pub use membership::{backfill_membership, facet_key, CategorySource, CategoryTable};
pub use presets::{builtin_facets_for, fuzzy_query_facets, load_facets, store_relevance_facets};
