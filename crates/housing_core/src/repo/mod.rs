//! Repository contracts over the housing tables.
//!
//! # Responsibility
//! - Define the per-entity CRUD contract (`Repository<T>`) and the commit
//!   boundary (`UnitOfWork`) required by the services.
//! - Ship a SQLite store and an in-memory store implementing both.
//!
//! # Invariants
//! - Writes validate the entity before touching storage.
//! - Writes are staged in a pending unit until `persist`; reads observe
//!   staged changes.
//! - `persist` rejects units that would leave an address or garage without
//!   its house.

pub mod memory;
pub mod sqlite;

use crate::db::DbError;
use crate::model::{Address, Entity, EntityKind, Garage, House, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use memory::{MemoryHousingStore, StoreOp};
pub use sqlite::SqliteHousingStore;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of a repository read, write or commit.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { kind: EntityKind, id: i64 },
    /// Commit would break referential integrity.
    Integrity(String),
    /// Store refused the operation (connectivity, injected fault).
    Unavailable(String),
    /// Persisted row cannot be decoded into the model.
    InvalidData(String),
    /// Connection has not been migrated to the housing schema.
    MissingRequiredTable(&'static str),
    /// Connection already has a transaction the store does not own.
    TransactionInProgress,
}

impl RepoError {
    pub fn not_found<T: Entity>(id: i64) -> Self {
        Self::NotFound { kind: T::KIND, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Integrity(message) => write!(f, "referential integrity violated: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "housing store requires table `{table}`")
            }
            Self::TransactionInProgress => {
                write!(f, "connection already has an open transaction")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD contract for one entity kind.
///
/// A store implements this once per kind, so call sites name the kind:
/// `Repository::<House>::fetch_all(&store)`.
pub trait Repository<T: Entity> {
    fn fetch_all(&self) -> RepoResult<Vec<T>> {
        self.fetch_where(&T::Filter::default())
    }

    /// Rows matching `filter`, in natural store order (ascending id).
    fn fetch_where(&self, filter: &T::Filter) -> RepoResult<Vec<T>>;

    fn fetch_by_id(&self, id: i64) -> RepoResult<Option<T>>;

    /// Stages an insert and returns the row with its assigned id.
    fn add(&self, draft: &T::Draft) -> RepoResult<T>;

    /// Stages a write of every mutable column. `NotFound` when absent.
    fn update(&self, entity: &T) -> RepoResult<()>;

    /// Stages a delete. `NotFound` when absent.
    fn remove(&self, entity: &T) -> RepoResult<()>;

    fn remove_range(&self, entities: &[T]) -> RepoResult<()> {
        for entity in entities {
            self.remove(entity)?;
        }
        Ok(())
    }
}

/// Commit boundary shared by all repositories of one store.
pub trait UnitOfWork {
    /// Commits every change staged since the last persist.
    ///
    /// On failure the staged changes are rolled back.
    fn persist(&self) -> RepoResult<()>;

    /// Drops every staged change.
    fn discard(&self) -> RepoResult<()>;

    fn has_pending(&self) -> bool;
}

/// Everything the services need from a storage collaborator.
pub trait HousingStore:
    Repository<House> + Repository<Address> + Repository<Garage> + UnitOfWork
{
}

impl<S> HousingStore for S where
    S: Repository<House> + Repository<Address> + Repository<Garage> + UnitOfWork
{
}
