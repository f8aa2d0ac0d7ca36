//! Use-case services over a `HousingStore`.
//!
//! # Responsibility
//! - Compose house filters from raw UI input (`filter`).
//! - Load dependents of a selected house (`loader`).
//! - Apply edits and cascade deletes with one commit each (`mutation`).
//! - Keep the view state in step with the store (`browser`).
//!
//! # Invariants
//! - View state changes only after the store has persisted successfully.

pub mod browser;
pub mod filter;
pub mod loader;
pub mod mutation;

use crate::model::{EntityKind, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a service action.
#[derive(Debug)]
pub enum ServiceError {
    /// Target record is not in the store; nothing was written.
    NotFound { kind: EntityKind, id: i64 },
    /// Edited values break a field bound; nothing was written.
    Validation(ValidationError),
    /// Store read/write/commit failure; staged changes were discarded.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}
