//! Normalizer, rubric scorer and claimed-score verification.
//!
//! ```
//! use relevance_judge::model::{CheckAnswer, CheckDefinition, Rubric, Scorecard};
//! use relevance_judge::scoring::RubricScorer;
//!
//! let rubric = Rubric::builder("example")
//!     .check(CheckDefinition::standard("a", 3.0))
//!     .check(CheckDefinition::standard("b", 2.0))
//!     .check(CheckDefinition::standard("c", 1.0))
//!     .build()?;
//!
//! let answers: Scorecard = [
//!     CheckAnswer::pass("a"),
//!     CheckAnswer::fail("b"),
//!     CheckAnswer::not_applicable("c"),
//! ]
//! .into_iter()
//! .map(|a| (a.check_name.clone(), a))
//! .collect();
//!
//! let score = RubricScorer::new(&rubric).score("store-1", &answers)?;
//! assert_eq!(score.score_pct, 60.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod normalize;
mod scorer;
mod verify;

pub use normalize::{normalize, normalize_judgment, parse_label};
pub use scorer::{score, RubricScorer};
pub use verify::{
    verify_claimed_score, ClaimedScore, ScoreVerification, PERCENT_TOLERANCE, POINTS_TOLERANCE,
    TEN_POINT_TOLERANCE,
};
