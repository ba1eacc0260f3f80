//! Login, logout, token expiry, and role capabilities.
//!
//! A session holds a credential-free user snapshot and one token with an
//! absolute expiry in epoch milliseconds. Expiry is checked lazily whenever
//! the session is used; an expired session is treated exactly like a missing
//! one and is cleared at that point.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::id::EntityId;
use crate::model::{Role, UserProfile};
use crate::persistence::{PersistenceAdapter, StorageKey};
use crate::store::{remove_value, write_value, RecordStore, Snapshot};

/// Lifetime of an issued token.
pub const TOKEN_TTL_MS: i64 = 3_600_000;

const BEARER_PREFIX: &str = "Bearer ";

/// Session token: owning user plus absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub user_id: EntityId,
    /// Expiry as epoch milliseconds.
    #[serde(rename = "exp")]
    pub expires_at_ms: i64,
}

impl Token {
    pub fn issue(user_id: EntityId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            expires_at_ms: now.timestamp_millis() + TOKEN_TTL_MS,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expires_at_ms
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires_at_ms)
    }

    /// The token as carried in an `Authorization` header, without the scheme.
    pub fn to_bearer(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a header value, with or without the `Bearer ` scheme.
    pub fn from_bearer(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let raw = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim();
        serde_json::from_str(raw).ok()
    }
}

/// The active login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub current_user: UserProfile,
    pub token: Token,
}

/// Something a role is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Submit evaluations and observation records.
    Evaluate,
    /// View the scoped summary of supervised teachers.
    Supervise,
    /// View college-wide record lists.
    ViewCollege,
}

impl Capability {
    pub fn granted_to(self, role: Role) -> bool {
        match self {
            Capability::Evaluate => matches!(role, Role::Teacher | Role::Supervisor),
            Capability::Supervise => role == Role::Supervisor,
            Capability::ViewCollege => matches!(
                role,
                Role::Supervisor | Role::CollegeAdmin | Role::SchoolAdmin
            ),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Evaluate => write!(f, "evaluate"),
            Capability::Supervise => write!(f, "supervise"),
            Capability::ViewCollege => write!(f, "view_college"),
        }
    }
}

/// Whether the stored user may evaluate. Unknown users may not.
pub fn can_evaluate(snapshot: &Snapshot, user_id: &EntityId) -> bool {
    snapshot
        .user(user_id)
        .is_some_and(|u| Capability::Evaluate.granted_to(u.role))
}

/// Whether `listener_id` may record an observation of `teacher_id`'s class.
pub fn can_observe(snapshot: &Snapshot, listener_id: &EntityId, teacher_id: &EntityId) -> bool {
    if !can_evaluate(snapshot, listener_id) {
        return false;
    }
    snapshot.config.allow_self_observation || listener_id != teacher_id
}

impl<A: PersistenceAdapter> RecordStore<A> {
    pub fn login(&mut self, username: &str, secret: &str) -> Result<Session, EvalError> {
        self.login_at(username, secret, Utc::now())
    }

    /// Verify the credential and open a session that expires one hour after `now`.
    /// A failed attempt leaves the store untouched.
    pub fn login_at(
        &mut self,
        username: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, EvalError> {
        let Some(user) = self
            .snapshot
            .users
            .iter()
            .find(|u| u.username == username && u.credential.verify(secret))
        else {
            tracing::info!(username, "login rejected");
            return Err(EvalError::InvalidCredentials);
        };

        let session = Session {
            current_user: user.profile(),
            token: Token::issue(user.id.clone(), now),
        };
        write_value(&mut self.adapter, StorageKey::CurrentUser, &session.current_user);
        write_value(&mut self.adapter, StorageKey::Token, &session.token);
        tracing::info!(user_id = %session.current_user.id, "login succeeded");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// End the session. Stored roles are unaffected.
    pub fn logout(&mut self) {
        if let Some(session) = &self.session {
            tracing::info!(user_id = %session.current_user.id, "logout");
        }
        self.clear_session();
    }

    /// The session as loaded, without an expiry check.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn authenticate(&mut self) -> Result<&Session, EvalError> {
        self.authenticate_at(Utc::now())
    }

    /// The live session, or `AuthExpired`. An expired session is cleared here.
    pub fn authenticate_at(&mut self, now: DateTime<Utc>) -> Result<&Session, EvalError> {
        let expired = match &self.session {
            None => return Err(EvalError::AuthExpired),
            Some(session) => session.token.is_expired_at(now),
        };
        if expired {
            tracing::info!("session token expired");
            self.clear_session();
            return Err(EvalError::AuthExpired);
        }
        self.session.as_ref().ok_or(EvalError::AuthExpired)
    }

    pub fn require(&mut self, capability: Capability) -> Result<UserProfile, EvalError> {
        self.require_at(capability, Utc::now())
    }

    /// Authenticate, then check `capability` against the user's stored role.
    pub fn require_at(
        &mut self,
        capability: Capability,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, EvalError> {
        let profile = self.authenticate_at(now)?.current_user.clone();
        let role = self
            .snapshot
            .user(&profile.id)
            .map(|u| u.role)
            .ok_or_else(|| EvalError::UnresolvedReference {
                kind: "user",
                id: profile.id.to_string(),
            })?;
        if capability.granted_to(role) {
            Ok(profile)
        } else {
            Err(EvalError::PermissionDenied {
                user_id: profile.id,
                capability,
            })
        }
    }

    pub fn require_supervisor_view(
        &mut self,
        supervisor_id: &EntityId,
    ) -> Result<UserProfile, EvalError> {
        self.require_supervisor_view_at(supervisor_id, Utc::now())
    }

    /// Authenticate for reading a supervisor's scope or ranking. The
    /// supervisor may read their own; anyone else needs `ViewCollege`.
    pub fn require_supervisor_view_at(
        &mut self,
        supervisor_id: &EntityId,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, EvalError> {
        let profile = self.authenticate_at(now)?.current_user.clone();
        if &profile.id == supervisor_id {
            return Ok(profile);
        }
        self.require_at(Capability::ViewCollege, now)
    }

    pub fn can_evaluate(&self, user_id: &EntityId) -> bool {
        can_evaluate(&self.snapshot, user_id)
    }

    /// `Authorization` header value for the live session.
    pub fn bearer_header_at(&mut self, now: DateTime<Utc>) -> Option<String> {
        let session = self.authenticate_at(now).ok()?;
        Some(format!("{BEARER_PREFIX}{}", session.token.to_bearer()))
    }

    /// Replace the session token with a refreshed one for the same user.
    pub fn refresh_token(&mut self, token: Token) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.token.user_id != token.user_id {
            tracing::warn!("refreshed token names another user, ignoring");
            return false;
        }
        session.token = token;
        write_value(&mut self.adapter, StorageKey::Token, &session.token);
        true
    }

    pub(crate) fn clear_session(&mut self) {
        self.session = None;
        remove_value(&mut self.adapter, StorageKey::CurrentUser);
        remove_value(&mut self.adapter, StorageKey::Token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryAdapter;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap()
    }

    fn store() -> RecordStore<MemoryAdapter> {
        RecordStore::hydrate(MemoryAdapter::new())
    }

    #[test]
    fn login_strips_credential_and_issues_hour_token() {
        let mut store = store();
        let session = store.login_at("teacher1", "123456", now()).unwrap();

        assert_eq!(session.current_user.username, "teacher1");
        assert_eq!(
            session.token.expires_at_ms,
            now().timestamp_millis() + 3_600_000
        );

        let stored_user = store.adapter().raw("currentUser").unwrap();
        assert!(!stored_user.contains("credential"));
        assert!(!stored_user.contains("password"));
        assert!(!stored_user.contains("$2b$"));
        assert!(store.adapter().raw("token").is_some());
    }

    #[test]
    fn wall_clock_login_expires_about_an_hour_out() {
        let mut store = store();
        let before = Utc::now().timestamp_millis();
        let session = store.login("teacher1", "123456").unwrap();
        let delta = session.token.expires_at_ms - before;
        assert!((3_600_000..3_600_000 + 5_000).contains(&delta), "delta {delta}");
    }

    #[test]
    fn failed_login_has_no_side_effects() {
        let mut store = store();
        let writes = store.adapter().write_count();
        assert_eq!(
            store.login_at("teacher1", "wrong", now()),
            Err(EvalError::InvalidCredentials)
        );
        assert_eq!(
            store.login_at("nobody", "123456", now()),
            Err(EvalError::InvalidCredentials)
        );
        assert!(store.session().is_none());
        assert_eq!(store.adapter().write_count(), writes);
    }

    #[test]
    fn expired_token_is_treated_as_absent_and_cleared() {
        let mut store = store();
        store.login_at("teacher1", "123456", now()).unwrap();
        assert!(store.authenticate_at(now() + Duration::minutes(59)).is_ok());

        let later = now() + Duration::milliseconds(TOKEN_TTL_MS);
        assert_eq!(store.authenticate_at(later).err(), Some(EvalError::AuthExpired));
        assert!(store.session().is_none());
        assert!(store.adapter().raw("token").is_none());
        assert!(store.adapter().raw("currentUser").is_none());
    }

    #[test]
    fn logout_clears_session_but_not_permissions() {
        let mut store = store();
        let session = store.login_at("teacher1", "123456", now()).unwrap();
        let id = session.current_user.id.clone();

        store.logout();
        assert!(store.session().is_none());
        assert!(store.adapter().raw("token").is_none());
        assert_eq!(store.authenticate_at(now()).err(), Some(EvalError::AuthExpired));
        assert!(store.can_evaluate(&id));
    }

    #[test]
    fn can_evaluate_by_role() {
        let store = store();
        assert!(store.can_evaluate(&EntityId::from(1u64)));
        assert!(store.can_evaluate(&EntityId::from(5u64)));
        assert!(!store.can_evaluate(&EntityId::from(3u64)));
        assert!(!store.can_evaluate(&EntityId::from(4u64)));
        assert!(!store.can_evaluate(&EntityId::from(99u64)));
        assert!(!store.can_evaluate(&EntityId::new("")));
    }

    #[test]
    fn require_checks_stored_role() {
        let mut store = store();
        store.login_at("college1", "123456", now()).unwrap();
        assert_eq!(
            store.require_at(Capability::Evaluate, now()),
            Err(EvalError::PermissionDenied {
                user_id: EntityId::from(3u64),
                capability: Capability::Evaluate,
            })
        );
        assert!(store.require_at(Capability::ViewCollege, now()).is_ok());

        store.login_at("supervisor1", "123456", now()).unwrap();
        let profile = store.require_at(Capability::Supervise, now()).unwrap();
        assert_eq!(profile.username, "supervisor1");
    }

    #[test]
    fn supervisor_view_is_self_or_view_college() {
        let mut store = store();
        let supervisor = EntityId::from(5u64);
        assert_eq!(
            store.require_supervisor_view_at(&supervisor, now()),
            Err(EvalError::AuthExpired)
        );

        store.login_at("teacher1", "123456", now()).unwrap();
        assert_eq!(
            store.require_supervisor_view_at(&supervisor, now()),
            Err(EvalError::PermissionDenied {
                user_id: EntityId::from(1u64),
                capability: Capability::ViewCollege,
            })
        );

        store.login_at("supervisor1", "123456", now()).unwrap();
        assert!(store.require_supervisor_view_at(&supervisor, now()).is_ok());

        store.login_at("school1", "123456", now()).unwrap();
        assert!(store.require_supervisor_view_at(&supervisor, now()).is_ok());
    }

    #[test]
    fn require_without_session_is_auth_expired() {
        let mut store = store();
        assert_eq!(
            store.require_at(Capability::Evaluate, now()),
            Err(EvalError::AuthExpired)
        );
    }

    #[test]
    fn self_observation_follows_config() {
        let mut store = store();
        let teacher = EntityId::from(1u64);
        assert!(can_observe(store.snapshot(), &teacher, &teacher));

        store.snapshot.config.allow_self_observation = false;
        assert!(!can_observe(store.snapshot(), &teacher, &teacher));
        assert!(can_observe(store.snapshot(), &teacher, &EntityId::from(2u64)));
        assert!(!can_observe(store.snapshot(), &EntityId::from(3u64), &teacher));
    }

    #[test]
    fn session_survives_restart() {
        let mut first = store();
        let session = first.login_at("teacher2", "123456", now()).unwrap();

        let mut second = RecordStore::hydrate(first.into_adapter());
        assert_eq!(second.session(), Some(&session));
        assert!(second.authenticate_at(now()).is_ok());
    }

    #[test]
    fn bearer_round_trip_and_refresh() {
        let mut store = store();
        let session = store.login_at("teacher1", "123456", now()).unwrap();
        let header = store.bearer_header_at(now()).unwrap();
        assert!(header.starts_with("Bearer "));
        assert_eq!(Token::from_bearer(&header), Some(session.token.clone()));

        let newer = Token::issue(session.token.user_id.clone(), now() + Duration::minutes(30));
        assert!(store.refresh_token(newer.clone()));
        assert_eq!(store.session().unwrap().token, newer);

        let foreign = Token::issue(EntityId::from(2u64), now());
        assert!(!store.refresh_token(foreign));
    }
}
