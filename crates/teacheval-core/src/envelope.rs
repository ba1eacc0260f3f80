//! Interpretation of the backend's standard response envelope.
//!
//! The HTTP client lives outside this crate. Whatever performs the request
//! hands the decoded envelope and the response `Authorization` header here,
//! and this module applies the session side effects: refresh on success,
//! invalidation on 401 (except for the login and role endpoints, whose
//! callers handle 401 themselves).

use serde::{Deserialize, Serialize};

use crate::persistence::PersistenceAdapter;
use crate::session::Token;
use crate::store::RecordStore;

pub const CODE_OK: i64 = 200;
pub const CODE_UNAUTHORIZED: i64 = 401;

/// Endpoints whose 401 responses must not force re-authentication.
const SELF_HANDLED_401: [&str; 2] = ["/user/login", "/user/role"];

/// `{code, message, data}` as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub code: i64,
    #[serde(default, alias = "msg")]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

/// What the caller should do with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Business success; `data` is the payload, if any.
    Success(Option<T>),
    /// The session was rejected. When `reauthenticate` is set the session has
    /// been cleared and the user must log in again.
    Unauthorized { reauthenticate: bool, message: String },
    /// Any other code.
    BusinessFailure { code: i64, message: String },
}

fn handles_own_401(endpoint: &str) -> bool {
    SELF_HANDLED_401.iter().any(|p| endpoint.contains(p))
}

impl<A: PersistenceAdapter> RecordStore<A> {
    /// Apply the session effects of a response from `endpoint`.
    pub fn interpret<T>(
        &mut self,
        endpoint: &str,
        envelope: ResponseEnvelope<T>,
        authorization: Option<&str>,
    ) -> Outcome<T> {
        match envelope.code {
            CODE_OK => {
                if let Some(header) = authorization {
                    match Token::from_bearer(header) {
                        Some(token) => {
                            self.refresh_token(token);
                        }
                        None => tracing::warn!(endpoint, "unparseable authorization header ignored"),
                    }
                }
                Outcome::Success(envelope.data)
            }
            CODE_UNAUTHORIZED if handles_own_401(endpoint) => Outcome::Unauthorized {
                reauthenticate: false,
                message: envelope.message,
            },
            CODE_UNAUTHORIZED => {
                tracing::info!(endpoint, "session rejected by server");
                self.clear_session();
                Outcome::Unauthorized {
                    reauthenticate: true,
                    message: envelope.message,
                }
            }
            code => Outcome::BusinessFailure {
                code,
                message: envelope.message,
            },
        }
    }
}
