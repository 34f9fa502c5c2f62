//! Domain error taxonomy.
//!
//! Kinds map directly to the error handling design: each is owned by a
//! specific layer and each has a specific recovery policy at the call site
//! (see the scan loops in `application::alerts`, `application::portfolio`,
//! `application::stop_loss`). None of these propagate past a single scan
//! item; callers log and continue.

use thiserror::Error;

/// Errors surfaced by the Store. `NotFound` is routinely upgraded to a
/// create in upsert paths; `Conflict` triggers a single re-read-then-retry;
/// `Backend` is fatal for the current job invocation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Errors surfaced by a venue call, after the HTTP fabric has exhausted its
/// retry budget. `ClientError` (4xx other than 429) is terminal for the
/// current tick; `Transient` and `Unreachable` are handled identically by
/// callers (log, mark credential failure, continue other venues).
#[derive(Debug, Error)]
pub enum VenueError {
    #[error("venue client error ({status}): {message}")]
    ClientError { status: u16, message: String },

    #[error("venue transient error ({status}): {message}")]
    Transient { status: u16, message: String },

    #[error("venue unreachable: {0}")]
    Unreachable(String),

    #[error("venue response could not be normalized: {0}")]
    Malformed(String),
}

/// Errors raised while parsing or validating a cron job's schedule or
/// payload. A job hitting this is disabled with the reason recorded rather
/// than deleted, per the scheduler's `job:skipped` policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("unknown payload kind: {0}")]
    UnknownPayloadKind(String),
}

/// Execution-adapter failure for the stop-loss hand-off. Always results in
/// a persisted trigger row with `status = failed`, never an aborted scan.
#[derive(Debug, Error)]
#[error("execution failed: {0}")]
pub struct ExecutionError(pub String);
