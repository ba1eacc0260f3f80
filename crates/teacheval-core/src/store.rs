//! The record store: typed in-memory collections hydrated from a
//! persistence adapter.
//!
//! Hydration reads every key once. Misses and unreadable values fall back to
//! the bundled seed data. Within a stored collection, elements that fail to
//! parse are skipped one by one and the rest are kept. A one-time migration then removes legacy student
//! evaluations, re-derives stored totals, and hashes plaintext credentials,
//! writing each changed collection back once. After that every read path is
//! side-effect free.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;
use crate::id::EntityId;
use crate::model::{
    College, Config, Course, EvaluationRecord, EvaluatorRole, Notice, ObservationRecord, User,
    UserProfile,
};
use crate::persistence::{PersistenceAdapter, StorageKey};
use crate::seed;
use crate::session::{Session, Token};

/// All reference data and records held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub colleges: Vec<College>,
    pub courses: Vec<Course>,
    pub evaluations: Vec<EvaluationRecord>,
    pub observations: Vec<ObservationRecord>,
    pub config: Config,
    pub notices: Vec<Notice>,
}

impl Snapshot {
    /// The bundled reference data, before migration.
    pub fn seeded() -> Self {
        Self {
            users: seed::users(),
            colleges: seed::colleges(),
            courses: seed::courses(),
            evaluations: seed::evaluations(),
            observations: seed::observations(),
            config: seed::config(),
            notices: seed::notices(),
        }
    }

    pub fn user(&self, id: &EntityId) -> Option<&User> {
        if id.is_blank() {
            return None;
        }
        self.users.iter().find(|u| &u.id == id)
    }

    pub fn course(&self, id: &EntityId) -> Option<&Course> {
        if id.is_blank() {
            return None;
        }
        self.courses.iter().find(|c| &c.id == id)
    }
}

/// What the load-time migration changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Evaluations authored by the legacy student role that were dropped.
    pub dropped_student_records: usize,
    /// Records whose stored total disagreed with their score sheet.
    pub resynced_totals: usize,
    /// Plaintext credentials replaced with bcrypt hashes.
    pub rehashed_credentials: usize,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.dropped_student_records == 0 && self.resynced_totals == 0 && self.rehashed_credentials == 0
    }
}

/// How a key was obtained during hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Loaded {
    Stored,
    Missing,
    /// Read failure or corrupt value. Never overwritten by migration.
    Unreadable,
    /// A stored collection with some elements skipped. Never overwritten by
    /// migration, so the skipped raw elements survive.
    Partial,
}

impl Loaded {
    fn writable(self) -> bool {
        matches!(self, Loaded::Stored | Loaded::Missing)
    }
}

/// Owner of one in-memory snapshot and its session.
///
/// All mutation goes through `&mut self`, so one store has exactly one
/// writer. Independent stores share nothing.
pub struct RecordStore<A: PersistenceAdapter> {
    pub(crate) adapter: A,
    pub(crate) snapshot: Snapshot,
    pub(crate) session: Option<Session>,
    migration: MigrationReport,
}

impl<A: PersistenceAdapter> RecordStore<A> {
    /// Load every collection from `adapter` and run the migration.
    pub fn hydrate(adapter: A) -> Self {
        let (users, users_src) = load_list_or(&adapter, StorageKey::Users, seed::users);
        let (colleges, _) = load_list_or(&adapter, StorageKey::Colleges, seed::colleges);
        let (courses, _) = load_list_or(&adapter, StorageKey::Courses, seed::courses);
        let (evaluations, evaluations_src) =
            load_list_or(&adapter, StorageKey::Evaluations, seed::evaluations);
        let (observations, observations_src) =
            load_list_or(&adapter, StorageKey::Observations, seed::observations);
        let (config, _) = load_or(&adapter, StorageKey::Config, seed::config);
        let (notices, _) = load_list_or(&adapter, StorageKey::Notices, seed::notices);

        let snapshot = Snapshot {
            users,
            colleges,
            courses,
            evaluations,
            observations,
            config,
            notices,
        };
        let session = restore_session(&adapter);

        let mut store = Self {
            adapter,
            snapshot,
            session,
            migration: MigrationReport::default(),
        };
        store.migration = store.migrate(users_src, evaluations_src, observations_src);
        store
    }

    /// Build a store around an explicit snapshot, running the same migration.
    /// Nothing is read from `adapter`; migrated collections are written to it.
    pub fn with_snapshot(adapter: A, snapshot: Snapshot) -> Self {
        let mut store = Self {
            adapter,
            snapshot,
            session: None,
            migration: MigrationReport::default(),
        };
        store.migration = store.migrate(Loaded::Stored, Loaded::Stored, Loaded::Stored);
        store
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    pub fn migration_report(&self) -> &MigrationReport {
        &self.migration
    }

    /// Write every collection to the adapter. Failures are logged per key.
    pub fn persist_all(&mut self) {
        let snap = &self.snapshot;
        write_value(&mut self.adapter, StorageKey::Users, &snap.users);
        write_value(&mut self.adapter, StorageKey::Colleges, &snap.colleges);
        write_value(&mut self.adapter, StorageKey::Courses, &snap.courses);
        write_value(&mut self.adapter, StorageKey::Evaluations, &snap.evaluations);
        write_value(&mut self.adapter, StorageKey::Observations, &snap.observations);
        write_value(&mut self.adapter, StorageKey::Config, &snap.config);
        write_value(&mut self.adapter, StorageKey::Notices, &snap.notices);
    }

    fn migrate(
        &mut self,
        users_src: Loaded,
        evaluations_src: Loaded,
        observations_src: Loaded,
    ) -> MigrationReport {
        let mut report = MigrationReport::default();
        let snap = &mut self.snapshot;

        let before = snap.evaluations.len();
        snap.evaluations
            .retain(|e| e.evaluator_role != EvaluatorRole::Student);
        report.dropped_student_records = before - snap.evaluations.len();

        let eval_resynced = snap
            .evaluations
            .iter_mut()
            .map(|e| e.body.sync_total())
            .filter(|changed| *changed)
            .count();
        let obs_resynced = snap
            .observations
            .iter_mut()
            .map(|o| o.body.sync_total())
            .filter(|changed| *changed)
            .count();
        report.resynced_totals = eval_resynced + obs_resynced;

        report.rehashed_credentials = snap
            .users
            .iter_mut()
            .map(|u| u.credential.upgrade())
            .filter(|changed| *changed)
            .count();

        if (report.dropped_student_records > 0 || eval_resynced > 0) && evaluations_src.writable() {
            write_value(&mut self.adapter, StorageKey::Evaluations, &snap.evaluations);
        }
        if obs_resynced > 0 && observations_src.writable() {
            write_value(&mut self.adapter, StorageKey::Observations, &snap.observations);
        }
        if report.rehashed_credentials > 0 && users_src.writable() {
            write_value(&mut self.adapter, StorageKey::Users, &snap.users);
        }

        if !report.is_empty() {
            tracing::info!(
                dropped_student_records = report.dropped_student_records,
                resynced_totals = report.resynced_totals,
                rehashed_credentials = report.rehashed_credentials,
                "migrated stored state"
            );
        }
        report
    }
}

/// Read `key`, falling back to `default` on a miss, failure, or corrupt value.
fn load_or<T, A, F>(adapter: &A, key: StorageKey, default: F) -> (T, Loaded)
where
    T: DeserializeOwned,
    A: PersistenceAdapter,
    F: FnOnce() -> T,
{
    match adapter.get(key.as_str()) {
        Ok(Some(raw)) if !raw.trim().is_empty() => match serde_json::from_str(&raw) {
            Ok(value) => (value, Loaded::Stored),
            Err(e) => {
                let err = serialize_error(key, e);
                tracing::warn!(key = %key, "stored value is corrupt, using defaults: {err}");
                (default(), Loaded::Unreadable)
            }
        },
        Ok(_) => (default(), Loaded::Missing),
        Err(e) => {
            tracing::warn!(key = %key, "read failed, using defaults: {e}");
            (default(), Loaded::Unreadable)
        }
    }
}

/// Read a collection element by element. A value that is not a JSON array
/// falls back to `default` as in [`load_or`]; inside an array, elements that
/// do not parse are logged and skipped.
fn load_list_or<T, A, F>(adapter: &A, key: StorageKey, default: F) -> (Vec<T>, Loaded)
where
    T: DeserializeOwned,
    A: PersistenceAdapter,
    F: FnOnce() -> Vec<T>,
{
    let (elements, loaded) = load_or(adapter, key, Vec::<serde_json::Value>::new);
    if loaded != Loaded::Stored {
        return (default(), loaded);
    }

    let mut skipped = 0usize;
    let items = elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                let err = serialize_error(key, e);
                tracing::warn!(key = %key, index, "skipping unreadable record: {err}");
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        (items, Loaded::Partial)
    } else {
        (items, Loaded::Stored)
    }
}

fn serialize_error(key: StorageKey, e: serde_json::Error) -> StorageError {
    StorageError::Serialize {
        key: key.to_string(),
        message: e.to_string(),
    }
}

/// Read an optional value; anything unreadable counts as absent.
fn load_optional<T: DeserializeOwned, A: PersistenceAdapter>(adapter: &A, key: StorageKey) -> Option<T> {
    let raw = match adapter.get(key.as_str()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key = %key, "read failed: {e}");
            return None;
        }
    };
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    // Older clients stored some values as a JSON string holding JSON.
    let value = match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner).ok()?,
        other => other,
    };
    serde_json::from_value(value).ok()
}

fn restore_session<A: PersistenceAdapter>(adapter: &A) -> Option<Session> {
    let current_user: UserProfile = load_optional(adapter, StorageKey::CurrentUser)?;
    let token: Token = load_optional(adapter, StorageKey::Token)?;
    if token.user_id != current_user.id {
        tracing::warn!("stored token belongs to another user, ignoring session");
        return None;
    }
    Some(Session {
        current_user,
        token,
    })
}

/// Serialize and store `value`. Failures are logged, never returned.
pub(crate) fn write_value<T: Serialize + ?Sized, A: PersistenceAdapter>(
    adapter: &mut A,
    key: StorageKey,
    value: &T,
) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            let err = serialize_error(key, e);
            tracing::warn!(key = %key, "write skipped: {err}");
            return;
        }
    };
    if let Err(e) = adapter.set(key.as_str(), &raw) {
        tracing::warn!(key = %key, "write failed: {e}");
    }
}

pub(crate) fn remove_value<A: PersistenceAdapter>(adapter: &mut A, key: StorageKey) {
    if let Err(e) = adapter.remove(key.as_str()) {
        tracing::warn!(key = %key, "remove failed: {e}");
    }
}
