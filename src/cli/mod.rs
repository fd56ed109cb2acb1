//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod rubrics;
mod score;

pub use rubrics::run_rubrics;
pub use score::run_score;
