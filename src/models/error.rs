//! Error types for taskrun.
//!
//! Failure taxonomy:
//! - Expected failures: bad configuration, bad input
//! - Infrastructure failures: file system, serialization
//! - Invariant violations: counter underflow (bugs)

use thiserror::Error;

/// Top-level error type for taskrun.
#[derive(Debug, Error)]
pub enum TaskrunError {
    // ═══════════════════════════════════════════════════════════════════
    // EXPECTED: caller supplied something unusable
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ═══════════════════════════════════════════════════════════════════
    // INFRASTRUCTURE: the environment let us down
    // ═══════════════════════════════════════════════════════════════════

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════
    // INVARIANT VIOLATED: bug, should not happen
    // ═══════════════════════════════════════════════════════════════════

    #[error("Completion counter underflow: done() called with nothing pending")]
    CounterUnderflow,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskrunError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error indicates a bug rather than bad input or environment.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::CounterUnderflow | Self::Internal(_))
    }
}

/// Result type alias for taskrun.
pub type Result<T> = std::result::Result<T, TaskrunError>;
