//! Failure taxonomy for submissions and queries.
//!
//! [`EngineError::InvalidInput`] and [`EngineError::ComplianceRejected`] are
//! expected control-flow outcomes; [`EngineError::StoreUnavailable`] leaves the
//! submission indeterminate and callers must reconcile via document lookup.

use thiserror::Error;

/// Failure of a single store operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the matching engine and ledger.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Non-positive price or quantity, blank userId or instrument. No state change.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A compliance predicate returned false. No state change.
    #[error("compliance check failed for order {0}")]
    ComplianceRejected(String),

    /// A store operation failed mid-submission; state is indeterminate.
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    /// A stored document failed to decode. Non-fatal during enumeration
    /// (skipped with a diagnostic); fatal only on direct lookups.
    #[error("malformed record at {key}: {reason}")]
    MalformedRecord { key: String, reason: String },

    /// The engine failed to serialize a record it constructed itself.
    #[error("failed to encode {what}: {reason}")]
    InternalEncodeError { what: &'static str, reason: String },
}
