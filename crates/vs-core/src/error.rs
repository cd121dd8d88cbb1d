//! Error taxonomy shared by every engine.
//!
//! The variants mirror the "kinds, not types" table in the design spec: each
//! one carries enough context to decide the right recovery and log level at
//! the call site, without engines having to invent their own error enums.

use thiserror::Error;

/// The VulnSentinel error taxonomy.
#[derive(Debug, Error)]
pub enum VsError {
    /// Transient transport failure (5xx, timeout, rate-limit 403). The
    /// underlying client already retried with backoff; this variant means
    /// retries were exhausted.
    #[error("transient transport error: {0}")]
    Transient(String),

    /// The LLM returned content that could not be parsed into the expected
    /// schema. Callers should leave the target in its previous state and let
    /// the scheduler retry on the next tick.
    #[error("parse/schema error: {0}")]
    ParseSchema(String),

    /// A unique-constraint violation on a batch insert that should be
    /// swallowed and treated as "already present".
    #[error("idempotency conflict: {0}")]
    IdempotencyConflict(String),

    /// A precondition the engine depends on (e.g. a call-graph snapshot)
    /// isn't ready yet. The target stays in its current pipeline state for a
    /// later retry.
    #[error("precondition missing: {0}")]
    PreconditionMissing(String),

    /// An attempted state transition isn't in the allowed graph.
    #[error("invalid state transition: from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Database access failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client failure (GitHub, LLM provider, webhook, reachability
    /// collaborator).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failure on a JSON payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else. Logged at ERROR; the engine continues with other
    /// targets.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl VsError {
    /// Whether this error should be retried on the next scheduler tick
    /// rather than surfaced as a terminal failure.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VsError::Transient(_)
                | VsError::ParseSchema(_)
                | VsError::PreconditionMissing(_)
                | VsError::IdempotencyConflict(_)
        )
    }
}

/// Result alias used throughout the workspace.
pub type VsResult<T> = Result<T, VsError>;
