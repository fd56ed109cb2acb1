//! Data model shared by the scorer, the rank aggregator and the facet
//! aggregator.
//!
//! Configuration types ([`Rubric`], [`CheckDefinition`], [`FacetDefinition`])
//! are loaded once and read-only afterwards. Evaluation types ([`CheckAnswer`],
//! [`ItemScore`], [`RankedList`]) are built per call and never mutated in
//! place; re-scoring produces a new value.

mod answer;
mod facet;
mod rubric;
mod score;

pub use answer::*;
pub use facet::*;
pub use rubric::*;
pub use score::*;
