//! Error types for the popup core
//!
//! Only two failures are ever surfaced to callers: a template that cannot be
//! resolved, and a category/slide tag that does not name a known variant when
//! parsed from text. Lookups that miss are not errors; they are logged and
//! ignored by the registry.

use thiserror::Error;

/// Errors produced by the popup registry and its collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PopupError {
    /// A tag outside a closed enumeration reached the core. This is a
    /// programming or data error, never a recoverable condition.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The asset resolver has no template for the requested identity.
    /// Nothing is registered when this is returned.
    #[error("cannot resolve popup '{identity}' at '{path}': {reason}")]
    Resolution {
        identity: String,
        path: String,
        reason: String,
    },
}

pub type PopupResult<T> = std::result::Result<T, PopupError>;
