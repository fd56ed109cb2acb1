//! Boundary adapters feeding the scoring core.
//!
//! None of these take part in scoring itself: they turn legacy judge output
//! into raw answers, replace judged answers with known store facts, and
//! decide which items get judged at all.

pub mod explanation;
pub mod prefilter;
pub mod signals;

pub use explanation::{parse_explanation, Explanation};
pub use prefilter::{normalize_text, token_sort_ratio, FuzzyPrefilter, FuzzyScores};
pub use signals::{derive_store_answers, is_open_from_display, parse_eta_minutes, StoreSignals};
