//! Error types.
//!
//! `EvalError` is returned to callers of session and permission checks.
//! `StorageError` is produced by persistence adapters and never leaves the
//! record store: it is logged and replaced by defaults or a skipped write.

use thiserror::Error;

use crate::id::EntityId;
use crate::session::Capability;

/// Errors surfaced to callers of the session and permission layer.
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    /// Username/credential pair did not match a stored user.
    #[error("invalid username or credential")]
    InvalidCredentials,

    /// No session, or the session token has expired.
    #[error("session is missing or expired")]
    AuthExpired,

    /// The user's role lacks the required capability.
    #[error("user {user_id} lacks the {capability} capability")]
    PermissionDenied {
        user_id: EntityId,
        capability: Capability,
    },

    /// An identifier did not resolve to a stored entity.
    #[error("{kind} {id} not found")]
    UnresolvedReference { kind: &'static str, id: String },
}

impl EvalError {
    /// Returns `true` if the caller should send the user back to login.
    pub fn requires_login(&self) -> bool {
        matches!(self, EvalError::InvalidCredentials | EvalError::AuthExpired)
    }
}

/// Failures raised by a persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded or decoded.
    #[error("value for key '{key}' could not be (de)serialized: {message}")]
    Serialize { key: String, message: String },

    /// Injected failure (used by the in-memory adapter in tests).
    #[error("adapter rejected operation on key '{0}'")]
    Rejected(String),
}
