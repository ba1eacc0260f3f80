//! teacheval-core: Role-scoped evaluation store, scope resolution, and ranking.
//!
//! This crate holds the data model for teaching evaluations and observation
//! records, the record store that hydrates them from a key-value persistence
//! adapter, session handling, and the read paths that decide what a
//! supervisory actor may see and how teachers rank against each other.

pub mod aggregate;
pub mod config;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod id;
pub mod model;
pub mod persistence;
pub mod scope;
pub mod seed;
pub mod session;
pub mod store;
pub mod visibility;

pub use error::{EvalError, StorageError};
pub use id::EntityId;
pub use store::{MigrationReport, RecordStore, Snapshot};
