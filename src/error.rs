//! Unified error types for relevance-judge.
//!
//! Scoring errors are per-item and recoverable: a batch records the failing
//! item and carries on. Rubric and configuration errors surface when a rubric
//! or config file is built, before any judgment is scored.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for relevance-judge operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum JudgeError {
    /// A single item could not be scored
    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    /// A rubric definition is invalid
    #[error("Invalid rubric: {0}")]
    Rubric(#[from] RubricError),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Structured input (JSON/YAML) could not be decoded
    #[error("Failed to parse {context}: {message}")]
    Parse { context: String, message: String },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Errors raised while normalizing or scoring one item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    /// The raw judgment for a check does not map to a known state
    #[error("Invalid answer for check '{check}': {value}")]
    InvalidAnswer { check: String, value: String },

    /// The judgment set lacks answers for rubric checks
    #[error("Incomplete scorecard for item '{item_id}': missing {}", missing.join(", "))]
    IncompleteScorecard {
        item_id: String,
        missing: Vec<String>,
    },

    /// A facet or dimension names a check the rubric does not define
    #[error("Unknown check '{check}' in {context}")]
    UnknownCheck { check: String, context: String },

    /// A facet's member checks do not form a valid rubric
    #[error("Invalid facet '{facet}': {message}")]
    InvalidFacet { facet: String, message: String },
}

/// Problems found while building a rubric from configuration.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RubricError {
    #[error("Rubric '{rubric}' has no checks")]
    Empty { rubric: String },

    #[error("Check name must not be empty")]
    EmptyCheckName,

    #[error("Duplicate check '{0}'")]
    DuplicateCheck(String),

    #[error("Check '{check}' has invalid weight {weight} (must be finite and > 0)")]
    InvalidWeight { check: String, weight: f64 },

    #[error("Graded check '{0}' defines no tiers")]
    MissingTiers(String),

    #[error("Check '{check}' tier {tier} awards {points} points (allowed 0..={max})")]
    TierOutOfRange {
        check: String,
        tier: u8,
        points: f64,
        max: f64,
    },

    #[error("Check '{check}' defines tier {tier} more than once")]
    DuplicateTier { check: String, tier: u8 },

    #[error("Binary check '{0}' must not define tiers")]
    UnexpectedTiers(String),

    #[error("Dimension '{dimension}' is invalid: {message}")]
    InvalidDimension { dimension: String, message: String },

    #[error("Unknown rubric preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for relevance-judge operations
pub type Result<T> = std::result::Result<T, JudgeError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl JudgeError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for JudgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for JudgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse("JSON", err.to_string())
    }
}

impl From<serde_yaml_ng::Error> for JudgeError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::parse("YAML", err.to_string())
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain, outermost first:
///
/// ```ignore
/// use relevance_judge::error::ErrorContext;
///
/// let rubric = load_rubric(path).with_context(|| format!("loading {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<JudgeError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
///
/// Scoring and rubric errors carry structured fields; they are wrapped as
/// validation errors so the context is not lost.
fn add_context_to_error(err: JudgeError, new_ctx: &str) -> JudgeError {
    match err {
        JudgeError::Parse { context, message } => JudgeError::Parse {
            context: chain_context(new_ctx, &context),
            message,
        },
        JudgeError::Io {
            path,
            message,
            source,
        } => JudgeError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        JudgeError::Config(msg) => JudgeError::Config(chain_context(new_ctx, &msg)),
        JudgeError::Validation(msg) => JudgeError::Validation(chain_context(new_ctx, &msg)),
        JudgeError::Scoring(err) => {
            JudgeError::Validation(chain_context(new_ctx, &err.to_string()))
        }
        JudgeError::Rubric(err) => JudgeError::Config(chain_context(new_ctx, &err.to_string())),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| JudgeError::Validation(context.into()))
    }
}
